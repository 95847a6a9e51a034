//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::ledger::Table;
use crate::localization::{t_args_lang, t_lang};
use crate::records::{Actor, SymptomRecord};

use super::callback_data::CallbackToken;
use super::context::BotContext;
use super::session::{ChatSession, Menu};
use super::ui_builder::{severity_label, symptom_label};

/// Handle callback queries from the symptom and severity keyboards
pub async fn callback_handler(
    ctx: &BotContext,
    actor: &Actor,
    data: Option<&str>,
    session: &dyn ChatSession,
) -> Result<()> {
    let lang = actor.language();

    if !ctx.access.authorized(actor.id) {
        warn!(user_id = actor.id, "Unauthorized callback query");
        session.alert(&t_lang("access-denied-alert", lang)).await?;
        return Ok(());
    }

    debug!(user_id = actor.id, data = ?data, "Received callback query from user");

    let edited = match data.and_then(CallbackToken::parse) {
        Some(CallbackToken::Symptom(symptom)) => {
            let label = symptom_label(symptom, lang);
            let prompt = t_args_lang("severity-prompt", &[("symptom", label.as_str())], lang);
            session
                .edit_with_menu(&prompt, Menu::Severity(symptom))
                .await
        }
        Some(CallbackToken::Severity(symptom, severity)) => {
            let record = SymptomRecord::new(actor.display_name(), symptom, severity);
            match ctx.ledger.append(Table::Symptoms, record.to_row()).await {
                Ok(()) => info!(user_id = actor.id, symptom = symptom.name(), severity = severity.name(), "Symptom recorded"),
                Err(e) => error!(user_id = actor.id, table = %Table::Symptoms, error = %e, "Failed to write symptom to ledger"),
            }

            let symptom_text = symptom_label(symptom, lang);
            let severity_text = severity_label(severity, lang);
            let confirmation = t_args_lang(
                "symptom-recorded",
                &[
                    ("symptom", symptom_text.as_str()),
                    ("severity", severity_text.as_str()),
                ],
                lang,
            );
            session.edit_text(&confirmation).await
        }
        None => {
            // Ignore buttons we did not issue
            debug!(user_id = actor.id, data = ?data, "Unrecognized callback data");
            Ok(())
        }
    };

    // Answer the callback query to remove the loading state, even when the edit failed
    session.acknowledge().await?;

    edited
}
