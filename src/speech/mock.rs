use super::{SpeechEngine, Utterance, Voice};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct MockSpeechEngine {
    voices: Arc<Mutex<Vec<Voice>>>,
    spoken: Arc<Mutex<Vec<Utterance>>>,
    cancel_count: Arc<Mutex<usize>>,
    gate: Option<Arc<Notify>>,
    failure: Option<String>,
}

impl MockSpeechEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voice(self, voice: Voice) -> Self {
        self.voices.lock().unwrap().push(voice);
        self
    }

    /// Hold each utterance open until the gate is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Make every `speak` call fail with the given message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        *self.cancel_count.lock().unwrap()
    }
}

#[async_trait]
impl SpeechEngine for MockSpeechEngine {
    async fn voices(&self) -> Result<Vec<Voice>> {
        Ok(self.voices.lock().unwrap().clone())
    }

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(Error::Speech(message.clone()));
        }
        self.spoken.lock().unwrap().push(utterance.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(())
    }

    async fn cancel(&self) -> Result<()> {
        *self.cancel_count.lock().unwrap() += 1;
        Ok(())
    }
}
