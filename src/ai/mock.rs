use super::DialogueService;
use crate::intake::ImagePayload;
use crate::models::LearnerProfile;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const DEFAULT_DIALOGUE_JSON: &str = r#"{"dialogue": [
    {"speaker": "Barista", "line": "¡Hola! ¿Qué te pongo?"},
    {"speaker": "Cliente", "line": "Un café con leche, por favor."}
]}"#;

/// Scripted reply for one mock call.
#[derive(Clone)]
pub enum MockReply {
    Text(String),
    ServiceError(String),
    /// Wait until the gate is notified, then produce the inner reply.
    Gated(Arc<Notify>, Box<MockReply>),
}

#[derive(Clone)]
pub struct MockDialogueClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    profiles: Arc<Mutex<Vec<LearnerProfile>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockDialogueClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            profiles: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.with_reply(MockReply::Text(text.into()))
    }

    pub fn with_service_error(self, message: impl Into<String>) -> Self {
        self.with_reply(MockReply::ServiceError(message.into()))
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Profiles received, in call order.
    pub fn recorded_profiles(&self) -> Vec<LearnerProfile> {
        self.profiles.lock().unwrap().clone()
    }

    async fn resolve(reply: MockReply) -> Result<String> {
        let mut reply = reply;
        loop {
            match reply {
                MockReply::Text(text) => return Ok(text),
                MockReply::ServiceError(message) => return Err(Error::AiProvider(message)),
                MockReply::Gated(gate, inner) => {
                    gate.notified().await;
                    reply = *inner;
                }
            }
        }
    }
}

impl Default for MockDialogueClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialogueService for MockDialogueClient {
    async fn generate_dialogue(
        &self,
        _image: &ImagePayload,
        profile: &LearnerProfile,
    ) -> Result<String> {
        let reply = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            self.profiles.lock().unwrap().push(profile.clone());

            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockReply::Text(DEFAULT_DIALOGUE_JSON.to_string())
            } else {
                let index = (*count - 1) % replies.len();
                replies[index].clone()
            }
        };

        Self::resolve(reply).await
    }
}
