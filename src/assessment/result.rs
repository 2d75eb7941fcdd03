//! Baseline result record and its persistence.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::store::{Storage, keys, read_json, write_json};

use super::catalog::{PRESENCE_TEST_ID, SECTIONS};
use super::scoring::{DomainScores, Tier};

/// Stage the progression system starts in.
pub const INITIAL_STAGE: u32 = 1;

/// Snapshot of one completed assessment. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Raw score per section id, including the attention task under
    /// `presence_test`.
    pub section_scores: BTreeMap<String, f64>,
    pub domain_scores: DomainScores,
    pub rewired_index: u8,
    pub tier: Tier,
    pub bct_elapsed: u32,
    pub bct_score: f64,
    pub timestamp: DateTime<Utc>,
}

impl ResultRecord {
    /// Persist the record and the stage-tracking flags.
    ///
    /// Writes go out in a fixed order, sections in catalog order; the first
    /// failure aborts the rest.
    pub async fn persist(&self, store: &dyn Storage) -> Result<(), DatabaseError> {
        for section in SECTIONS {
            if let Some(score) = self.section_scores.get(section.id) {
                write_json(store, &keys::section_score(section.id), score).await?;
            }
        }
        write_json(store, keys::PRESENCE_TEST, &self.bct_score).await?;
        write_json(store, keys::PRESENCE_TEST_ELAPSED, &self.bct_elapsed).await?;
        write_json(store, keys::DOMAIN_SCORES, &self.domain_scores).await?;
        write_json(store, keys::REWIRED_INDEX, &self.rewired_index).await?;
        write_json(store, keys::TIER, &self.tier).await?;
        write_json(store, keys::BASELINE_DATE, &self.timestamp).await?;

        write_json(store, keys::SYSTEM_INITIALIZED, &true).await?;
        write_json(store, keys::CURRENT_STAGE, &INITIAL_STAGE).await?;
        write_json(store, keys::STAGE_START_DATE, &self.timestamp).await?;
        write_json(store, keys::WEEKLY_DELTAS, &Vec::<serde_json::Value>::new()).await?;
        Ok(())
    }

    /// Reload a persisted record. `Ok(None)` when the system is not
    /// initialized or any part of the record is missing.
    pub async fn load(
        store: &dyn Storage,
        section_ids: &[&str],
    ) -> Result<Option<Self>, DatabaseError> {
        if !is_initialized(store).await? {
            return Ok(None);
        }

        let mut section_scores = BTreeMap::new();
        for id in section_ids {
            match read_json::<f64>(store, &keys::section_score(id)).await? {
                Some(score) => {
                    section_scores.insert(id.to_string(), score);
                }
                None => return Ok(None),
            }
        }

        let (
            Some(bct_score),
            Some(bct_elapsed),
            Some(domain_scores),
            Some(rewired_index),
            Some(tier),
            Some(timestamp),
        ) = (
            read_json::<f64>(store, keys::PRESENCE_TEST).await?,
            read_json::<u32>(store, keys::PRESENCE_TEST_ELAPSED).await?,
            read_json::<DomainScores>(store, keys::DOMAIN_SCORES).await?,
            read_json::<u8>(store, keys::REWIRED_INDEX).await?,
            read_json::<Tier>(store, keys::TIER).await?,
            read_json::<DateTime<Utc>>(store, keys::BASELINE_DATE).await?,
        )
        else {
            return Ok(None);
        };

        section_scores.insert(PRESENCE_TEST_ID.to_string(), bct_score);
        Ok(Some(Self {
            section_scores,
            domain_scores,
            rewired_index,
            tier,
            bct_elapsed,
            bct_score,
            timestamp,
        }))
    }
}

/// Whether the initialization marker is present and `true`.
pub async fn is_initialized(store: &dyn Storage) -> Result<bool, DatabaseError> {
    Ok(read_json::<bool>(store, keys::SYSTEM_INITIALIZED)
        .await?
        .unwrap_or(false))
}

/// Current progression stage, if recorded.
pub async fn current_stage(store: &dyn Storage) -> Result<Option<u32>, DatabaseError> {
    read_json::<u32>(store, keys::CURRENT_STAGE).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::catalog::SECTIONS;
    use crate::store::MemoryStorage;

    fn section_ids() -> Vec<&'static str> {
        SECTIONS.iter().map(|s| s.id).collect()
    }

    fn sample() -> ResultRecord {
        let mut section_scores = BTreeMap::new();
        for section in SECTIONS {
            section_scores.insert(section.id.to_string(), 2.0);
        }
        section_scores.insert(PRESENCE_TEST_ID.to_string(), 5.0);
        ResultRecord {
            section_scores,
            domain_scores: DomainScores {
                regulation: 2.0,
                awareness: 2.0,
                outlook: 2.0,
                attention: 3.5,
            },
            rewired_index: 48,
            tier: Tier::Operational,
            bct_elapsed: 180,
            bct_score: 5.0,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn partial_write_follows_catalog_order() {
        let store = MemoryStorage::new();
        store.fail_after(3);
        assert!(sample().persist(&store).await.is_err());

        // Sorted listing; the written set is the first three catalog sections.
        assert_eq!(
            store.keys().await,
            vec![
                "ios:baseline:calm_core".to_string(),
                "ios:baseline:observer_index".to_string(),
                "ios:baseline:vitality_index".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn persist_writes_every_key() {
        let store = MemoryStorage::new();
        sample().persist(&store).await.unwrap();

        let stored = store.keys().await;
        for key in [
            "ios:baseline:calm_core",
            "ios:baseline:observer_index",
            "ios:baseline:vitality_index",
            "ios:baseline:focus_diagnostic",
            keys::PRESENCE_TEST,
            keys::PRESENCE_TEST_ELAPSED,
            keys::DOMAIN_SCORES,
            keys::REWIRED_INDEX,
            keys::TIER,
            keys::BASELINE_DATE,
            keys::SYSTEM_INITIALIZED,
            keys::CURRENT_STAGE,
            keys::STAGE_START_DATE,
            keys::WEEKLY_DELTAS,
        ] {
            assert!(stored.contains(&key.to_string()), "missing {key}");
        }

        assert_eq!(store.read(keys::WEEKLY_DELTAS).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.read(keys::CURRENT_STAGE).await.unwrap().as_deref(), Some("1"));
        assert_eq!(
            store.read(keys::TIER).await.unwrap().as_deref(),
            Some("\"Operational (Stabilizing)\"")
        );
        assert!(is_initialized(&store).await.unwrap());
        assert_eq!(current_stage(&store).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn load_returns_what_was_persisted() {
        let store = MemoryStorage::new();
        let record = sample();
        record.persist(&store).await.unwrap();

        let loaded = ResultRecord::load(&store, &section_ids())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn load_without_marker_is_none() {
        let store = MemoryStorage::new();
        assert!(!is_initialized(&store).await.unwrap());
        assert!(
            ResultRecord::load(&store, &section_ids())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn failed_persist_reports_error() {
        let store = MemoryStorage::new();
        store.set_fail_writes(true);
        assert!(sample().persist(&store).await.is_err());
        assert!(!is_initialized(&store).await.unwrap());
    }
}
