//! # Assistant Gateway Module
//!
//! One-shot exchanges with a hosted OpenAI assistant. A prompt (text, optionally
//! with one image) goes in, the assistant's text reply comes out.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::config::AssistantConfig;
use crate::errors::AssistantError;

/// Image sent along with a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// What the assistant is asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<ImageAttachment>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: ImageAttachment) -> Self {
        Self {
            text: text.into(),
            image: Some(image),
        }
    }
}

/// Assistant seam used by the dish handler
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Run the assistant on `prompt` and return its reply text
    async fn analyze(&self, prompt: Prompt) -> Result<String, AssistantError>;
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Run {
    id: String,
    status: String,
}

/// Page of thread messages, newest first
#[derive(Debug, Default, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub value: String,
}

/// Statuses after which a run can still change
pub fn is_pending_status(status: &str) -> bool {
    matches!(status, "queued" | "in_progress" | "cancelling")
}

/// Text of the newest assistant message
///
/// Fails with [`AssistantError::EmptyResponse`] when there is no assistant message,
/// the message has no content, or its first part carries no text.
pub fn first_reply_text(messages: &MessageList) -> Result<String, AssistantError> {
    messages
        .data
        .iter()
        .find(|m| m.role == "assistant")
        .and_then(|m| m.content.first())
        .and_then(|part| part.text.as_ref())
        .map(|text| text.value.clone())
        .filter(|value| !value.trim().is_empty())
        .ok_or(AssistantError::EmptyResponse)
}

/// OpenAI Assistants API (v2) client
#[derive(Debug, Clone)]
pub struct OpenAiAssistant {
    client: Client,
    config: AssistantConfig,
}

impl OpenAiAssistant {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AssistantError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Assistant API error");
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AssistantError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .json(&body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AssistantError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn upload_image(&self, image: ImageAttachment) -> Result<String, AssistantError> {
        let size = image.bytes.len();
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new()
            .text("purpose", "vision")
            .part("file", part);

        let response = self
            .client
            .post(self.url("files"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;
        let file: CreatedObject = Self::read_json(response).await?;
        debug!(file_id = %file.id, bytes = size, "Image uploaded");
        Ok(file.id)
    }

    async fn wait_for_run(&self, thread_id: &str, mut run: Run) -> Result<(), AssistantError> {
        while is_pending_status(&run.status) {
            tokio::time::sleep(self.config.poll_interval).await;
            run = self
                .get_json(&format!("threads/{thread_id}/runs/{}", run.id))
                .await?;
        }

        if run.status == "completed" {
            Ok(())
        } else {
            error!(thread_id, run_id = %run.id, status = %run.status, "Assistant run did not complete");
            Err(AssistantError::RunFailed(run.status))
        }
    }
}

#[async_trait]
impl AssistantGateway for OpenAiAssistant {
    async fn analyze(&self, prompt: Prompt) -> Result<String, AssistantError> {
        let content = match prompt.image {
            Some(image) => {
                let file_id = self.upload_image(image).await?;
                json!([
                    { "type": "text", "text": prompt.text },
                    { "type": "image_file", "image_file": { "file_id": file_id } }
                ])
            }
            None => json!(prompt.text),
        };

        let thread: CreatedObject = self.post_json("threads", json!({})).await?;
        let _: CreatedObject = self
            .post_json(
                &format!("threads/{}/messages", thread.id),
                json!({ "role": "user", "content": content }),
            )
            .await?;

        let run: Run = self
            .post_json(
                &format!("threads/{}/runs", thread.id),
                json!({ "assistant_id": self.config.assistant_id }),
            )
            .await?;
        info!(thread_id = %thread.id, run_id = %run.id, "Assistant run started");

        self.wait_for_run(&thread.id, run).await?;

        let messages: MessageList = self
            .get_json(&format!("threads/{}/messages?order=desc", thread.id))
            .await?;
        first_reply_text(&messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> MessageList {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_first_reply_text_takes_newest_assistant_message() {
        let messages = parse(
            r#"{"data": [
                {"role": "assistant", "content": [{"type": "text", "text": {"value": "Dish: Rice", "annotations": []}}]},
                {"role": "user", "content": [{"type": "text", "text": {"value": "rice"}}]}
            ]}"#,
        );
        assert_eq!(first_reply_text(&messages).unwrap(), "Dish: Rice");
    }

    #[test]
    fn test_empty_message_list_is_empty_response() {
        let messages = parse(r#"{"object": "list", "data": []}"#);
        assert!(matches!(
            first_reply_text(&messages),
            Err(AssistantError::EmptyResponse)
        ));
    }

    #[test]
    fn test_missing_content_or_text_is_empty_response() {
        let no_content = parse(r#"{"data": [{"role": "assistant", "content": []}]}"#);
        assert!(matches!(
            first_reply_text(&no_content),
            Err(AssistantError::EmptyResponse)
        ));

        let image_only = parse(
            r#"{"data": [{"role": "assistant", "content": [{"type": "image_file", "image_file": {"file_id": "f"}}]}]}"#,
        );
        assert!(matches!(
            first_reply_text(&image_only),
            Err(AssistantError::EmptyResponse)
        ));
    }

    #[test]
    fn test_user_message_is_never_taken_as_reply() {
        let messages = parse(r#"{"data": [{"role": "user", "content": [{"type": "text", "text": {"value": "rice"}}]}]}"#);
        assert!(first_reply_text(&messages).is_err());
    }

    #[test]
    fn test_pending_statuses() {
        assert!(is_pending_status("queued"));
        assert!(is_pending_status("in_progress"));
        assert!(!is_pending_status("completed"));
        assert!(!is_pending_status("requires_action"));
        assert!(!is_pending_status("failed"));
    }
}
