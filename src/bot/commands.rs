//! Command handlers: `/start`, `/dish` and `/symptom`

use anyhow::Result;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::localization::{get_localization_manager, t_lang};
use crate::records::Actor;

use super::context::BotContext;
use super::session::{ChatSession, Menu};

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "report a dish (text or photo)")]
    Dish,
    #[command(description = "report a symptom")]
    Symptom,
}

impl Command {
    /// Main-menu button labels, in any shipped language, stand in for their command
    pub fn from_menu_label(text: &str) -> Option<Self> {
        let manager = get_localization_manager();
        if manager.matches_any_language("menu-dish", text) {
            Some(Command::Dish)
        } else if manager.matches_any_language("menu-symptom", text) {
            Some(Command::Symptom)
        } else {
            None
        }
    }
}

pub async fn handle_command(
    ctx: &BotContext,
    actor: &Actor,
    command: Command,
    session: &dyn ChatSession,
) -> Result<()> {
    let lang = actor.language();

    if !ctx.access.authorized(actor.id) {
        warn!(user_id = actor.id, ?command, "Unauthorized command");
        session.send_text(&t_lang("access-denied", lang)).await?;
        return Ok(());
    }

    info!(user_id = actor.id, ?command, "Handling command");

    match command {
        Command::Start => {
            session
                .send_with_menu(&t_lang("start-greeting", lang), Menu::Main)
                .await?;
        }
        Command::Dish => {
            ctx.conversations.begin_dish_report(actor.id).await;
            session.send_text(&t_lang("dish-prompt", lang)).await?;
        }
        Command::Symptom => {
            session
                .send_with_menu(&t_lang("symptom-prompt", lang), Menu::Symptoms)
                .await?;
        }
    }

    Ok(())
}
