//! The session state machine.
//!
//! A session owns the running belief distribution, the answers given so
//! far, and the termination decision. It exposes a pull-based protocol
//! to the presentation layer: ask for the next question, hand back a
//! label, repeat until no question comes back. One session per
//! concurrent game; the catalog behind it is shared read-only.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answer::AnswerLabel;
use crate::catalog::Catalog;
use crate::engine::{choose_next_characteristic, update_beliefs, BeliefDistribution};
use crate::error::ValidationError;

/// Identifier correlating a running session across log lines and
/// callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tunables for a session. Currently a single knob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Probability at which the session commits to a prediction
    /// instead of asking further questions. Must lie in (0.0, 1.0].
    pub confidence_threshold: f64,
}

impl SessionConfig {
    /// The default confidence threshold.
    pub const DEFAULT_THRESHOLD: f64 = 0.8;

    /// Creates a config with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ThresholdOutOfRange`] if the
    /// threshold is not in (0.0, 1.0].
    pub fn new(confidence_threshold: f64) -> Result<Self, ValidationError> {
        let config = Self {
            confidence_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let value = self.confidence_threshold;
        if value.is_nan() || value <= 0.0 || value > 1.0 {
            return Err(ValidationError::ThresholdOutOfRange { value });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

/// Where a session currently sits in the question/answer protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready to hand out the next question.
    AwaitingQuestion,

    /// A question is pending; the next submitted answer applies to it.
    AwaitingAnswer,

    /// Terminal. A prediction is fixed; answers are rejected.
    Finished,
}

/// A single game of adaptive guessing.
///
/// Single-writer, single-owner: do not share one session across
/// concurrent callers without external serialization.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use guesswork::{AnswerLabel, Catalog, Session, SessionConfig};
///
/// let mut builder = Catalog::builder();
/// builder.weight("Cat", "furry", 1.0);
/// builder.weight("Fish", "furry", 0.0);
/// let catalog = Arc::new(builder.build()?);
///
/// let mut session = Session::new(catalog, SessionConfig::default())?;
/// while let Some(question) = session.next_question() {
///     // The presentation layer would show `question` here.
///     let _ = question;
///     session.submit_answer(AnswerLabel::Yes);
/// }
/// assert_eq!(session.prediction(), "Cat");
/// # Ok::<(), guesswork::GuessworkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    catalog: Arc<Catalog>,
    config: SessionConfig,
    distribution: BeliefDistribution,
    answers: BTreeMap<String, AnswerLabel>,
    pending: Option<String>,
    prediction: Option<String>,
}

impl Session {
    /// Opens a session over `catalog` with a uniform prior.
    ///
    /// # Errors
    ///
    /// Returns an error if the config threshold is out of range. An
    /// empty catalog cannot reach this point; [`Catalog`] construction
    /// already rejects it.
    pub fn new(catalog: Arc<Catalog>, config: SessionConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let distribution = BeliefDistribution::uniform(&catalog);
        Ok(Self {
            id: SessionId::new(),
            catalog,
            config,
            distribution,
            answers: BTreeMap::new(),
            pending: None,
            prediction: None,
        })
    }

    /// Hands out the prompt for the next most-informative question, or
    /// `None` once the session has finished.
    ///
    /// Finishes the session either when the leading entity's
    /// probability reaches the confidence threshold or when no unasked
    /// characteristic remains.
    pub fn next_question(&mut self) -> Option<String> {
        if self.is_finished() {
            return None;
        }

        let (best, best_p) = {
            let (entity, p) = self.distribution.best()?;
            (entity.to_string(), p)
        };
        if best_p >= self.config.confidence_threshold {
            self.finish(best, "confidence threshold reached");
            return None;
        }

        let asked: BTreeSet<String> = self.answers.keys().cloned().collect();
        match choose_next_characteristic(&self.distribution, &self.catalog, &asked) {
            Some(characteristic) => {
                let prompt = self.catalog.prompt(&characteristic);
                self.pending = Some(characteristic);
                Some(prompt)
            }
            None => {
                self.finish(best, "no discriminating questions remain");
                None
            }
        }
    }

    /// Applies `label` to the pending question and recomputes the
    /// belief distribution over the full answer history.
    ///
    /// A no-op when no question is pending or the session has finished;
    /// protocol misuse is not an error.
    pub fn submit_answer(&mut self, label: AnswerLabel) {
        if self.is_finished() {
            tracing::debug!(session = %self.id, "answer after finish ignored");
            return;
        }
        let Some(characteristic) = self.pending.take() else {
            tracing::debug!(session = %self.id, "answer with no pending question ignored");
            return;
        };
        self.answers.insert(characteristic, label);
        self.distribution = update_beliefs(&self.catalog, &self.answers);
    }

    /// Normalizes free-form text to an [`AnswerLabel`] (unrecognized
    /// input becomes neutral) and submits it.
    pub fn submit_answer_str(&mut self, label: &str) {
        self.submit_answer(AnswerLabel::normalize(label));
    }

    /// The finalized prediction once finished; before that, the current
    /// highest-probability entity as a provisional guess.
    #[must_use]
    pub fn prediction(&self) -> &str {
        match &self.prediction {
            Some(entity) => entity,
            None => self.distribution.best().map_or("", |(entity, _)| entity),
        }
    }

    /// Current protocol state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.prediction.is_some() {
            SessionState::Finished
        } else if self.pending.is_some() {
            SessionState::AwaitingAnswer
        } else {
            SessionState::AwaitingQuestion
        }
    }

    /// Returns true once a prediction has been fixed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.prediction.is_some()
    }

    /// The current belief distribution.
    #[must_use]
    pub fn distribution(&self) -> &BeliefDistribution {
        &self.distribution
    }

    /// Number of characteristics answered so far.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// This session's identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    fn finish(&mut self, prediction: String, reason: &str) {
        tracing::debug!(
            session = %self.id,
            %prediction,
            questions = self.answers.len(),
            reason,
            "session finished"
        );
        self.pending = None;
        self.prediction = Some(prediction);
    }
}
