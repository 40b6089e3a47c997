use std::sync::Arc;

use tokio::sync::Mutex;

use gamerank_core::{
    Aggregator, CandidateSource, Config, Enricher, SanitizedConfig, SearchIndex,
};

/// Shared application state
pub struct AppState {
    config: Config,
    /// The one ranking session this process serves. Every batch, reset and
    /// search holds the lock for its whole duration.
    aggregator: Mutex<Aggregator>,
    search: SearchIndex,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn CandidateSource>,
        enricher: Arc<dyn Enricher>,
    ) -> Self {
        let aggregator = Aggregator::new(
            Arc::clone(&source),
            Arc::clone(&enricher),
            config.ranking.clone(),
        );
        let search = SearchIndex::new(source, enricher, config.search.clone());

        Self {
            config,
            aggregator: Mutex::new(aggregator),
            search,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn aggregator(&self) -> &Mutex<Aggregator> {
        &self.aggregator
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search
    }
}
