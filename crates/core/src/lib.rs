pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod metrics;
pub mod ranking;
pub mod relay;
pub mod scoring;
pub mod testing;

pub use catalog::{CandidateRef, CandidateSource, CatalogError, PaginationCursor, SteamSpyClient};
pub use config::{
    load_config, load_config_from_str, validate_config, BatchPolicy, Config, ConfigError,
    RankingMode, SanitizedConfig,
};
pub use enrichment::{
    EnrichedRecord, Enricher, EnrichmentOutcome, SteamStoreClient, StoreApi, StoreEnricher,
};
pub use ranking::{
    Aggregator, BatchReport, RankedRecord, RankingError, SearchIndex, SearchResults, SessionInfo,
};
pub use relay::RelayConfig;
