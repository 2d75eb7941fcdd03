//! Error types for the REwired installer.

use crate::assessment::Stage;

/// Storage-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Schema setup failed: {0}")]
    Schema(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Assessment flow errors.
///
/// Most of these are precondition gates rather than faults: the caller
/// attempted an action the current stage does not accept.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AssessmentError {
    #[error("Action requires stage {expected}, but assessment is in {actual}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("No answer selected")]
    NoSelection,

    #[error("Answer value {0} is outside the 0-4 scale")]
    InvalidValue(u8),

    #[error("Section {0} has no recorded responses")]
    EmptySection(String),

    #[error("Attention task has already finished")]
    TaskFinished,

    #[error("Attention task has not been started")]
    TaskNotStarted,

    #[error("Attention task is still running")]
    TaskRunning,
}

/// Why the persisted baseline could not be read back.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("missing value for {0}")]
    Missing(&'static str),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Dialogue driver errors.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("Baseline not initialized: {0}")]
    NotInitialized(String),
}
