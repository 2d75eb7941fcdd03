//! Onboarding dialogue — a scripted conversation over the stored baseline.
//!
//! The driver reads the baseline once, greets the user with their scores and
//! walks them through the stage-1 introduction, branching on keyword checks
//! of their replies.

pub mod driver;
pub mod intent;
pub mod model;
pub mod pacing;
pub mod script;
pub mod state;

pub use driver::DialogueDriver;
pub use intent::{Intent, classify};
pub use model::{BaselineSnapshot, ChatMessage, PacedMessage, Role};
pub use pacing::{forward_batch, spawn_pacer};
pub use state::ConversationState;
