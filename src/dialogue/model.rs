//! Conversation messages and the baseline snapshot the dialogue reads.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::result::{current_stage, is_initialized};
use crate::assessment::{DomainScores, Tier};
use crate::error::SnapshotError;
use crate::store::{Storage, keys, read_json};

use super::state::ConversationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

/// One entry of the append-only transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// An assistant message waiting for display.
#[derive(Debug, Clone)]
pub struct PacedMessage {
    pub message: ChatMessage,
    /// Pause after the previous message before showing this one.
    pub delay: Duration,
    /// State the conversation settles into once this message is handed to
    /// the presentation layer.
    pub then: Option<ConversationState>,
}

/// The four persisted values the dialogue needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineSnapshot {
    pub rewired_index: u8,
    pub tier: Tier,
    pub domain_scores: DomainScores,
    pub current_stage: u32,
}

impl BaselineSnapshot {
    /// Load the snapshot. Errors when the system is not initialized or any
    /// value is missing or unparsable.
    pub async fn load(store: &dyn Storage) -> Result<Self, SnapshotError> {
        if !is_initialized(store).await? {
            return Err(SnapshotError::Missing(keys::SYSTEM_INITIALIZED));
        }
        let rewired_index = read_json::<u8>(store, keys::REWIRED_INDEX)
            .await?
            .ok_or(SnapshotError::Missing(keys::REWIRED_INDEX))?;
        let tier = read_json::<Tier>(store, keys::TIER)
            .await?
            .ok_or(SnapshotError::Missing(keys::TIER))?;
        let domain_scores = read_json::<DomainScores>(store, keys::DOMAIN_SCORES)
            .await?
            .ok_or(SnapshotError::Missing(keys::DOMAIN_SCORES))?;
        let current_stage = current_stage(store)
            .await?
            .ok_or(SnapshotError::Missing(keys::CURRENT_STAGE))?;

        Ok(Self {
            rewired_index,
            tier,
            domain_scores,
            current_stage,
        })
    }
}
