//! Baseline assessment — questionnaire, attention task and scoring.
//!
//! The user answers four Likert sections, then runs a timed breath-count
//! task. The responses and the task outcome produce four domain scores, a
//! composite REwired Index and a tier, persisted as the baseline record.

pub mod catalog;
pub mod controller;
pub mod engine;
pub mod model;
pub mod result;
pub mod scoring;
pub mod stage;
pub mod task;

pub use controller::{AssessmentController, Completion};
pub use engine::{AssessmentEngine, Progress, QuestionView};
pub use model::{Domain, Question, Response, ScaleKind, Section};
pub use result::ResultRecord;
pub use scoring::{DomainScores, Tier};
pub use stage::Stage;
pub use task::{BreathCountTask, TaskOutcome, TerminationReason};
