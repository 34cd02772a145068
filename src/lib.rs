//! # guesswork — an adaptive guessing engine
//!
//! guesswork plays the asking side of a 20-questions-style game. Given
//! a catalog of candidate entities with fuzzy (weighted) characteristics,
//! it repeatedly selects the most informative unasked question, folds
//! each graded answer into a posterior over entities, and commits to a
//! prediction once one entity's probability clears a confidence
//! threshold — or once no discriminating question remains.
//!
//! ## Core Concepts
//!
//! - **Catalog**: immutable snapshot of entities, characteristics,
//!   question prompts, and entity-characteristic weights in [0, 1]
//! - **AnswerLabel**: one of five graded responses, each backed by a
//!   fixed pair of evidence-strength constants
//! - **BeliefDistribution**: normalized posterior over entities,
//!   recomputed from the full answer history on every update
//! - **Session**: the state machine sequencing question selection,
//!   belief updates, and termination
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use guesswork::{AnswerLabel, Catalog, Session, SessionConfig};
//!
//! let mut builder = Catalog::builder();
//! builder.characteristic("furry", Some("Is it furry?"));
//! builder.weight("Cat", "furry", 1.0);
//! builder.weight("Fish", "furry", 0.0);
//! let catalog = Arc::new(builder.build()?);
//!
//! let mut session = Session::new(catalog, SessionConfig::default())?;
//! let question = session.next_question().expect("a question is available");
//! assert_eq!(question, "Is it furry?");
//! session.submit_answer(AnswerLabel::Yes);
//! assert!(session.next_question().is_none());
//! assert_eq!(session.prediction(), "Cat");
//! # Ok::<(), guesswork::GuessworkError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod answer;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod session;

// Re-export primary types at crate root for convenience
pub use answer::{AnswerLabel, Likelihood};
pub use catalog::{Catalog, CatalogBuilder, IngestDiagnostic};
pub use engine::{choose_next_characteristic, update_beliefs, BeliefDistribution};
pub use error::{GuessResult, GuessworkError, IngestError, ValidationError};
pub use ingest::{load_from_files, load_from_strings};
pub use session::{Session, SessionConfig, SessionId, SessionState};
