//! Per-user session context shared by the assessment and the dialogue.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::InstallerConfig;
use crate::navigation::Navigator;
use crate::store::Storage;

/// Everything a component needs from its surroundings, passed explicitly.
#[derive(Clone)]
pub struct SessionContext {
    pub id: Uuid,
    pub store: Arc<dyn Storage>,
    pub navigator: Arc<dyn Navigator>,
    pub config: InstallerConfig,
}

impl SessionContext {
    pub fn new(
        store: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
        config: InstallerConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            navigator,
            config,
        }
    }
}
