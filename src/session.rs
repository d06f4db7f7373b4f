//! Learner session state
//!
//! Holds the learner's settings, the selected image, and the state of the most
//! recent dialogue request. Every submit is tagged with a monotonic sequence
//! number; a completion only lands in the session if no newer submit has been
//! made since, so the latest submission always wins.

use crate::ai::DialogueService;
use crate::dialogue::parse_dialogue;
use crate::intake::{self, ImagePayload};
use crate::models::{DialogueResult, LearnerProfile, Proficiency};
use crate::{Error, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

pub const MISSING_INPUT_MESSAGE: &str = "Please upload an image first.";
pub const SERVICE_ERROR_MESSAGE: &str =
    "Failed to communicate with the AI model. Please check your API key and try again.";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Failed to generate a valid dialogue. The response might be empty or malformed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingInput,
    Service,
    MalformedResponse,
}

/// User-facing failure of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn from_error(err: &Error) -> Self {
        let (kind, message) = match err {
            Error::MissingInput => (FailureKind::MissingInput, MISSING_INPUT_MESSAGE),
            Error::MalformedResponse(_) => {
                (FailureKind::MalformedResponse, MALFORMED_RESPONSE_MESSAGE)
            }
            _ => (FailureKind::Service, SERVICE_ERROR_MESSAGE),
        };
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded(DialogueResult),
    Failed(Failure),
}

#[derive(Default)]
struct Inner {
    profile: LearnerProfile,
    image: Option<ImagePayload>,
    state: RequestState,
    latest: u64,
}

pub struct DialogueSession {
    service: Box<dyn DialogueService>,
    inner: Mutex<Inner>,
}

impl DialogueSession {
    pub fn new(service: Box<dyn DialogueService>) -> Self {
        Self::with_profile(service, LearnerProfile::default())
    }

    pub fn with_profile(service: Box<dyn DialogueService>, profile: LearnerProfile) -> Self {
        Self {
            service,
            inner: Mutex::new(Inner {
                profile,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn profile(&self) -> LearnerProfile {
        self.lock().profile.clone()
    }

    pub fn state(&self) -> RequestState {
        self.lock().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.lock().state, RequestState::Pending)
    }

    pub fn set_native_language(&self, code: impl Into<String>) {
        self.lock().profile.native_language = code.into();
    }

    pub fn set_target_language(&self, code: impl Into<String>) {
        self.lock().profile.target_language = code.into();
    }

    /// Out-of-range ages are clamped into 5..=100.
    pub fn set_age(&self, age: u32) {
        self.lock().profile.set_age(age);
    }

    pub fn set_proficiency(&self, proficiency: Proficiency) {
        self.lock().profile.proficiency = proficiency;
    }

    pub fn select_image(&self, image: ImagePayload) {
        self.lock().image = Some(image);
    }

    pub fn clear_image(&self) {
        self.lock().image = None;
    }

    pub fn has_image(&self) -> bool {
        self.lock().image.is_some()
    }

    /// Read an image from disk and make it the current selection.
    pub async fn load_image(&self, path: &Path) -> Result<()> {
        let image = intake::load_image(path).await?;
        self.select_image(image);
        Ok(())
    }

    /// Request a dialogue for the current profile and image.
    ///
    /// Issues at most one service call. The returned value is this
    /// submission's own outcome; the session state only reflects it if no
    /// newer submit was made while it was in flight.
    pub async fn submit(&self) -> Result<DialogueResult> {
        let (seq, image, profile) = {
            let mut inner = self.lock();
            inner.latest += 1;
            let seq = inner.latest;

            let Some(image) = inner.image.clone() else {
                warn!("Submit #{} rejected: no image selected", seq);
                inner.state = RequestState::Failed(Failure::from_error(&Error::MissingInput));
                return Err(Error::MissingInput);
            };

            inner.state = RequestState::Pending;
            (seq, image, inner.profile.clone())
        };

        info!(
            "Submit #{}: {} -> {}, age {}, {}",
            seq,
            profile.native_language,
            profile.target_language,
            profile.age(),
            profile.proficiency
        );

        let outcome = self
            .service
            .generate_dialogue(&image, &profile)
            .await
            .and_then(|text| parse_dialogue(&text));

        if let Err(e) = &outcome {
            error!("Submit #{} failed: {}", seq, e);
        }

        let mut inner = self.lock();
        if inner.latest != seq {
            debug!(
                "Discarding stale completion of submit #{} (latest is #{})",
                seq, inner.latest
            );
            return outcome;
        }

        inner.state = match &outcome {
            Ok(lines) => {
                info!("Submit #{} produced {} dialogue lines", seq, lines.len());
                RequestState::Succeeded(lines.clone())
            }
            Err(e) => RequestState::Failed(Failure::from_error(e)),
        };
        outcome
    }
}
