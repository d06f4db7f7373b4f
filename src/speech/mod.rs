//! Read-aloud playback of dialogue lines
//!
//! The platform voice facility sits behind [`SpeechEngine`] so the player can
//! be driven by `espeak-ng` on a desktop or by a mock in tests. The player only
//! allows one utterance in flight at a time.

pub mod espeak;
pub mod mock;

pub use espeak::EspeakEngine;
pub use mock::MockSpeechEngine;

use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_RATE: f32 = 0.9;
pub const DEFAULT_PITCH: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP-47 style language tag, e.g. `es-ES` or `en-us`.
    pub lang: String,
    /// Other tags the voice also answers to, e.g. `zh` for a `cmn` voice.
    pub aliases: Vec<String>,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    fn tags(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(&self.lang)
            .chain(&self.aliases)
            .map(|tag| normalize_tag(tag))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>,
    /// 1.0 is the engine's normal speaking rate.
    pub rate: f32,
    /// 1.0 is the engine's normal pitch.
    pub pitch: f32,
}

#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Voices currently known to the engine. May grow over time.
    async fn voices(&self) -> Result<Vec<Voice>>;

    /// Speak an utterance. Resolves once it has ended; an error means it failed.
    async fn speak(&self, utterance: &Utterance) -> Result<()>;

    /// Stop whatever the engine is currently saying.
    async fn cancel(&self) -> Result<()>;
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

/// Pick the best voice for a language tag: exact match first, then the first
/// voice sharing the primary subtag. A voice's aliases count as its tags.
pub fn select_voice<'a>(voices: &'a [Voice], lang: &str) -> Option<&'a Voice> {
    let wanted = normalize_tag(lang);
    if wanted.is_empty() {
        return None;
    }

    voices
        .iter()
        .find(|voice| voice.tags().any(|tag| tag == wanted))
        .or_else(|| {
            let primary = primary_subtag(&wanted);
            voices
                .iter()
                .find(|voice| voice.tags().any(|tag| primary_subtag(&tag) == primary))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Spoken,
    /// Another utterance was active, or there was nothing to say.
    Ignored,
}

/// Clears the speaking flag when playback ends, including on error or drop.
struct SpeakingGuard<'a>(&'a AtomicBool);

impl Drop for SpeakingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Player {
    engine: Arc<dyn SpeechEngine>,
    speaking: AtomicBool,
    rate: f32,
    pitch: f32,
}

impl Player {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            speaking: AtomicBool::new(false),
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Read one line aloud in the given language.
    pub async fn play(&self, text: &str, lang: &str) -> Result<PlayOutcome> {
        if text.trim().is_empty() {
            return Ok(PlayOutcome::Ignored);
        }
        if self
            .speaking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Playback already active, ignoring request");
            return Ok(PlayOutcome::Ignored);
        }
        let _guard = SpeakingGuard(&self.speaking);

        self.engine.cancel().await?;

        let voice = match self.engine.voices().await {
            Ok(voices) => select_voice(&voices, lang).cloned(),
            Err(e) => {
                tracing::warn!("Could not list voices, using language tag only: {}", e);
                None
            }
        };
        if voice.is_none() {
            tracing::debug!("No voice matches {}, relying on engine default", lang);
        }

        let utterance = Utterance {
            text: text.to_string(),
            lang: lang.to_string(),
            voice,
            rate: self.rate,
            pitch: self.pitch,
        };
        self.engine.speak(&utterance).await?;
        Ok(PlayOutcome::Spoken)
    }

    pub async fn cancel(&self) -> Result<()> {
        self.engine.cancel().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tokio::sync::Notify;

    fn voice(name: &str, lang: &str) -> Voice {
        Voice::new(name, lang)
    }

    #[test]
    fn test_select_voice_prefers_exact_match() {
        let voices = vec![voice("mx", "es-MX"), voice("es", "es-ES")];
        assert_eq!(select_voice(&voices, "es-ES").unwrap().name, "es");
    }

    #[test]
    fn test_select_voice_normalizes_tags() {
        let voices = vec![voice("us", "en_US")];
        assert_eq!(select_voice(&voices, "EN-us").unwrap().name, "us");
    }

    #[test]
    fn test_select_voice_falls_back_to_primary_subtag() {
        let voices = vec![voice("et", "et"), voice("mx", "es-MX"), voice("es", "es")];
        assert_eq!(select_voice(&voices, "es-ES").unwrap().name, "mx");
        assert!(select_voice(&voices, "fr-FR").is_none());
        assert!(select_voice(&voices, "").is_none());
    }

    #[test]
    fn test_select_voice_matches_aliases() {
        let voices = vec![
            voice("English", "en-us").with_aliases(["en"]),
            voice("Chinese (Mandarin)", "cmn").with_aliases(["zh-cmn", "zh"]),
        ];
        assert_eq!(
            select_voice(&voices, "zh-CN").unwrap().name,
            "Chinese (Mandarin)"
        );
        assert_eq!(select_voice(&voices, "zh-cmn").unwrap().lang, "cmn");
        assert_eq!(select_voice(&voices, "en").unwrap().name, "English");
    }

    #[tokio::test]
    async fn test_cancel_reaches_engine() {
        let engine = Arc::new(MockSpeechEngine::new());
        let player = Player::new(engine.clone());

        player.cancel().await.unwrap();
        player.cancel().await.unwrap();

        assert_eq!(engine.cancel_count(), 2);
        assert!(engine.spoken().is_empty());
        assert!(!player.is_speaking());
    }

    #[tokio::test]
    async fn test_play_uses_selected_voice_and_defaults() {
        let engine = Arc::new(MockSpeechEngine::new().with_voice(voice("es", "es-ES")));
        let player = Player::new(engine.clone());

        let outcome = player.play("Hola", "es-ES").await.unwrap();
        assert_eq!(outcome, PlayOutcome::Spoken);
        assert!(!player.is_speaking());

        let spoken = engine.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].text, "Hola");
        assert_eq!(spoken[0].lang, "es-ES");
        assert_eq!(spoken[0].voice.as_ref().unwrap().name, "es");
        assert_eq!(spoken[0].rate, DEFAULT_RATE);
        assert_eq!(spoken[0].pitch, DEFAULT_PITCH);
        assert_eq!(engine.cancel_count(), 1);
    }

    #[tokio::test]
    async fn test_play_ignores_blank_text() {
        let engine = Arc::new(MockSpeechEngine::new());
        let player = Player::new(engine.clone());

        assert_eq!(player.play("  ", "es-ES").await.unwrap(), PlayOutcome::Ignored);
        assert!(engine.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_play_while_speaking_is_ignored() {
        let gate = Arc::new(Notify::new());
        let engine = Arc::new(MockSpeechEngine::new().with_gate(gate.clone()));
        let player = Player::new(engine.clone());

        let (first, second) = tokio::join!(player.play("Hola", "es-ES"), async {
            assert!(player.is_speaking());
            let outcome = player.play("Adiós", "es-ES").await;
            gate.notify_one();
            outcome
        });

        assert_eq!(first.unwrap(), PlayOutcome::Spoken);
        assert_eq!(second.unwrap(), PlayOutcome::Ignored);
        assert_eq!(engine.spoken().len(), 1);
        assert!(!player.is_speaking());
    }

    #[tokio::test]
    async fn test_engine_failure_clears_flag() {
        let engine = Arc::new(MockSpeechEngine::new().failing("audio device busy"));
        let player = Player::new(engine);

        let err = player.play("Hola", "es-ES").await.unwrap_err();
        assert!(matches!(err, Error::Speech(_)));
        assert!(!player.is_speaking());
        assert!(player.play("Hola", "es-ES").await.is_err());
    }
}
