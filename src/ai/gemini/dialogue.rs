use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerationConfig, InlineData, Part, Schema};
use crate::ai::DialogueService;
use crate::intake::ImagePayload;
use crate::models::LearnerProfile;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Response schema the model must follow: `{ dialogue: [{ speaker, line }] }`.
pub fn dialogue_schema() -> Schema {
    Schema::object(
        None,
        vec![(
            "dialogue",
            Schema::array(
                "A list of dialogue lines.",
                Schema::object(
                    None,
                    vec![
                        (
                            "speaker",
                            Schema::string(
                                "The name of the speaker (e.g., 'Barista', 'Customer').",
                            ),
                        ),
                        ("line", Schema::string("The text spoken by the speaker.")),
                    ],
                ),
            ),
        )],
    )
}

pub struct GeminiDialogueClient {
    http: GeminiHttpClient,
}

impl GeminiDialogueClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new(client, api_key, &model, Duration::from_secs(30)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn build_request(image: &ImagePayload, profile: &LearnerProfile) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.media_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                    Part::text(prompts::dialogue_prompt(profile)),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: dialogue_schema(),
            },
        }
    }
}

#[async_trait]
impl DialogueService for GeminiDialogueClient {
    async fn generate_dialogue(
        &self,
        image: &ImagePayload,
        profile: &LearnerProfile,
    ) -> Result<String> {
        tracing::debug!(
            "Requesting {} dialogue in {} ({} image, {} base64 chars)",
            profile.proficiency,
            profile.target_language,
            image.media_type,
            image.data.len()
        );

        let request = Self::build_request(image, profile);
        let response = self.http.generate_content(&request).await?;

        let text = response.text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            tracing::warn!("Gemini returned no dialogue text ({})", reason);
            Error::MalformedResponse(format!("no text in Gemini response ({})", reason))
        })?;

        Ok(text.trim().to_string())
    }
}
