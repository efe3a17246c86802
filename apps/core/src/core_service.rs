use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::aggregator;
use crate::catalog::StaticCatalog;
use crate::config::{validate, Config, ConfigError};
use crate::dispatcher::{FetchError, QueryDispatcher};
use crate::model::SearchResult;
use crate::search::RankingEngine;
use crate::transport::{HttpTransport, QueryTransport, TransportError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("transport setup error: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// One search round end to end: fetch, merge with the catalog, rank.
pub struct OmnisearchService {
    dispatcher: QueryDispatcher,
    catalog: &'static StaticCatalog,
    ranking: RankingEngine,
    max_displayed: usize,
}

impl OmnisearchService {
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        validate(config)?;
        let transport = HttpTransport::from_config(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn QueryTransport>) -> Result<Self, ServiceError> {
        validate(config)?;
        Ok(Self {
            dispatcher: QueryDispatcher::new(transport, config.per_kind_fetch_cap),
            catalog: StaticCatalog::global(),
            ranking: RankingEngine::new(config.match_threshold),
            max_displayed: config.max_displayed,
        })
    }

    pub fn max_displayed(&self) -> usize {
        self.max_displayed
    }

    pub async fn search(&self, text: &str) -> Result<Vec<SearchResult>, ServiceError> {
        let dynamic = self.dispatcher.fetch(text).await?;
        if !dynamic.rejected.is_empty() {
            debug!(rejected = dynamic.rejected.len(), "some records were dropped during normalization");
        }

        let pool = aggregator::merge(self.catalog, &dynamic);
        let candidates = pool.len();
        let ranked = self.ranking.rank(pool, text, self.max_displayed);
        info!(candidates, displayed = ranked.len(), "search round ranked");
        Ok(ranked)
    }
}
