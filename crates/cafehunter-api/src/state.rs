//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use cafehunter_chat::DialogueEngine;
use cafehunter_core::config::CafeHunterConfig;
use cafehunter_storage::repository::CafeRepository;

use crate::messenger::Messenger;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CafeHunterConfig>,
    pub engine: Arc<DialogueEngine>,
    pub messenger: Arc<dyn Messenger>,
    /// Cafe store, used for health reporting.
    pub cafes: CafeRepository,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: CafeHunterConfig,
        engine: DialogueEngine,
        messenger: Arc<dyn Messenger>,
        cafes: CafeRepository,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            messenger,
            cafes,
            start_time: Instant::now(),
        }
    }
}
