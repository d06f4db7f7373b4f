//! AI service integration for dialogue generation
//!
//! Provides the interface to Gemini's multimodal `generateContent` API for
//! turning a photo and a learner profile into a practice dialogue.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiDialogueClient;
pub use mock::{MockDialogueClient, MockReply};

use crate::intake::ImagePayload;
use crate::models::LearnerProfile;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait DialogueService: Send + Sync {
    /// Ask the model for a dialogue and return its raw JSON text, unvalidated.
    async fn generate_dialogue(
        &self,
        image: &ImagePayload,
        profile: &LearnerProfile,
    ) -> Result<String>;
}
