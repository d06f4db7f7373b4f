use super::{SpeechEngine, Utterance, Voice};
use crate::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::Notify;

const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;

/// Speech engine backed by the `espeak-ng` command-line synthesizer.
pub struct EspeakEngine {
    binary: String,
    cancelled: Notify,
}

impl EspeakEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            cancelled: Notify::new(),
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        Error::Speech(format!("failed to run {}: {}", self.binary, e))
    }

    fn speak_args(utterance: &Utterance) -> Vec<String> {
        let voice = utterance
            .voice
            .as_ref()
            .map(|voice| voice.lang.clone())
            .unwrap_or_else(|| utterance.lang.to_ascii_lowercase());
        let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate)
            .round()
            .clamp(80.0, 450.0) as u32;
        let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0) as u32;

        vec![
            "-v".to_string(),
            voice,
            "-s".to_string(),
            words_per_minute.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "--".to_string(),
            utterance.text.clone(),
        ]
    }
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// The trailing "Other Languages" column lists `(tag priority)` groups, which
/// may run together as in `(zh-cmn 5)(zh 5)`.
fn parse_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [_priority, lang, _age_gender, name, rest @ ..] => {
                    let others = rest.iter().skip(1).copied().collect::<Vec<_>>().join(" ");
                    let aliases = others
                        .split('(')
                        .skip(1)
                        .filter_map(|group| group.split_whitespace().next())
                        .map(|tag| tag.trim_end_matches(')'));
                    Some(Voice::new(name.replace('_', " "), *lang).with_aliases(aliases))
                }
                _ => None,
            }
        })
        .collect()
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    async fn voices(&self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.binary)
            .arg("--voices")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(Error::Speech(format!(
                "{} --voices exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let voices = parse_voices(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!("espeak-ng reported {} voices", voices.len());
        Ok(voices)
    }

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        // Registered before the child exists so a cancel() racing the spawn
        // is still observed.
        let cancelled = self.cancelled.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let mut child = Command::new(&self.binary)
            .args(Self::speak_args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let status = tokio::select! {
            status = child.wait() => Some(status?),
            () = &mut cancelled => None,
        };

        match status {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(Error::Speech(format!(
                "{} exited with {}",
                self.binary, status
            ))),
            None => {
                tracing::debug!("Utterance cancelled");
                child.kill().await?;
                Ok(())
            }
        }
    }

    async fn cancel(&self) -> Result<()> {
        self.cancelled.notify_waiters();
        Ok(())
    }
}
