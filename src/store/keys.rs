//! Storage keys used by the baseline record and stage tracking.

/// Per-section raw score key for a section id.
pub fn section_score(section_id: &str) -> String {
    format!("ios:baseline:{section_id}")
}

pub const PRESENCE_TEST: &str = "ios:baseline:presence_test";
pub const PRESENCE_TEST_ELAPSED: &str = "ios:baseline:presence_test_elapsed";
pub const DOMAIN_SCORES: &str = "ios:baseline:domain_scores";
pub const REWIRED_INDEX: &str = "ios:baseline:rewired_index";
pub const TIER: &str = "ios:baseline:tier";
pub const BASELINE_DATE: &str = "ios:baseline:date";

/// Initialization marker; `true` once a baseline has been persisted.
pub const SYSTEM_INITIALIZED: &str = "ios:system_initialized";
pub const CURRENT_STAGE: &str = "ios:current_stage";
pub const STAGE_START_DATE: &str = "ios:stage_start_date";
/// Ordered list of weekly progression deltas, empty at install time.
pub const WEEKLY_DELTAS: &str = "ios:weekly_deltas";
