//! Data models and structures
//!
//! Defines the learner profile, the dialogue returned by the model, and the
//! runtime configuration read from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_AGE: u8 = 5;
pub const MAX_AGE: u8 = 100;
pub const DEFAULT_AGE: u8 = 30;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ESPEAK_BIN: &str = "espeak-ng";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Proficiency {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Proficiency {
    pub const ALL: [Proficiency; 3] = [
        Proficiency::Beginner,
        Proficiency::Intermediate,
        Proficiency::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Proficiency {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        Proficiency::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| {
                format!(
                    "Invalid proficiency '{}'. Expected one of: Beginner, Intermediate, Advanced",
                    input
                )
            })
    }
}

/// Clamp a requested age into the supported range.
pub fn clamp_age(age: u32) -> u8 {
    age.clamp(MIN_AGE as u32, MAX_AGE as u32) as u8
}

/// Settings chosen by the learner; lives for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerProfile {
    pub native_language: String,
    pub target_language: String,
    age: u8,
    pub proficiency: Proficiency,
}

impl LearnerProfile {
    pub fn new(
        native_language: impl Into<String>,
        target_language: impl Into<String>,
        age: u32,
        proficiency: Proficiency,
    ) -> Self {
        Self {
            native_language: native_language.into(),
            target_language: target_language.into(),
            age: clamp_age(age),
            proficiency,
        }
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn set_age(&mut self, age: u32) {
        self.age = clamp_age(age);
    }
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self::new("en-US", "es-ES", DEFAULT_AGE as u32, Proficiency::Beginner)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: String,
    pub line: String,
}

impl DialogueLine {
    pub fn new(speaker: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            line: line.into(),
        }
    }
}

/// Ordered lines of one generated dialogue.
pub type DialogueResult = Vec<DialogueLine>;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub espeak_bin: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| {
                crate::Error::Config("GEMINI_API_KEY (or API_KEY) not set".to_string())
            })?;

        Ok(Self {
            gemini_api_key,
            gemini_model: non_empty("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            espeak_bin: non_empty("ESPEAK_BIN").unwrap_or_else(|| DEFAULT_ESPEAK_BIN.to_string()),
        })
    }
}
