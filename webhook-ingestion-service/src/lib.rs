pub mod backoff;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod ingestion;
pub mod ledger;
pub mod model;
pub mod processor;
pub mod verifier;
pub mod worker;

use std::sync::Arc;

use config::Config;
use ledger::EventLedger;
use processor::Processor;

/// Shared application state handed to every HTTP handler and the worker loop.
///
/// Mirrors the teacher's `AppContext`: one `Arc`-wrapped struct, cloned
/// cheaply per request, with no field requiring external synchronization
/// beyond what the ledger itself provides.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<dyn EventLedger>,
    pub processor: Arc<dyn Processor>,
}

impl AppState {
    pub fn new(config: Config, ledger: Arc<dyn EventLedger>, processor: Arc<dyn Processor>) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
            processor,
        }
    }
}
