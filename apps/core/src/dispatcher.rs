use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::entity_source::{EntityKind, NormalizeError};
use crate::model::SearchResult;
use crate::transport::{QueryRequest, QueryTransport, TransportError};

pub const FIND_MATCHES_QUERY: &str = r#"
query FindMatches($performer_filter: FindFilterType, $tag_filter: FindFilterType, $scene_filter: FindFilterType, $studio_filter: FindFilterType) {
  findStudios(filter: $studio_filter) {
    count
    studios {
      id
      name
      image_path
    }
  }
  findPerformers(filter: $performer_filter) {
    count
    performers {
      id
      name
      details
      disambiguation
      alias_list
      image_path
    }
  }
  findTags(filter: $tag_filter) {
    count
    tags {
      id
      name
      aliases
      image_path
    }
  }
  findScenes(filter: $scene_filter) {
    count
    scenes {
      id
      title
      files {
        path
      }
      paths {
        screenshot
      }
      details
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Transport(#[from] TransportError),
    #[error("fetch failed: response is missing {field}")]
    MissingCollection { field: String },
}

/// Normalized results of one round, one list per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicResults {
    pub tags: Vec<SearchResult>,
    pub performers: Vec<SearchResult>,
    pub scenes: Vec<SearchResult>,
    pub studios: Vec<SearchResult>,
    /// Records dropped because they could not be normalized.
    pub rejected: Vec<NormalizeError>,
}

impl DynamicResults {
    pub fn list(&self, kind: EntityKind) -> &[SearchResult] {
        match kind {
            EntityKind::Tag => &self.tags,
            EntityKind::Performer => &self.performers,
            EntityKind::Scene => &self.scenes,
            EntityKind::Studio => &self.studios,
        }
    }

    fn list_mut(&mut self, kind: EntityKind) -> &mut Vec<SearchResult> {
        match kind {
            EntityKind::Tag => &mut self.tags,
            EntityKind::Performer => &mut self.performers,
            EntityKind::Scene => &mut self.scenes,
            EntityKind::Studio => &mut self.studios,
        }
    }

    pub fn len(&self) -> usize {
        EntityKind::ALL.iter().map(|kind| self.list(*kind).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All results in candidate-pool order: tags, performers, scenes, studios.
    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        EntityKind::ALL
            .into_iter()
            .flat_map(move |kind| self.list(kind).iter())
    }
}

/// Trims the raw input and strips every `/`.
pub fn sanitize_term(raw: &str) -> String {
    raw.trim().replace('/', "")
}

pub struct QueryDispatcher {
    transport: Arc<dyn QueryTransport>,
    per_kind_fetch_cap: u32,
}

impl QueryDispatcher {
    pub fn new(transport: Arc<dyn QueryTransport>, per_kind_fetch_cap: u32) -> Self {
        Self {
            transport,
            per_kind_fetch_cap,
        }
    }

    pub fn per_kind_fetch_cap(&self) -> u32 {
        self.per_kind_fetch_cap
    }

    pub fn build_request(&self, term: &str) -> QueryRequest {
        let term = sanitize_term(term);
        let variables = EntityKind::ALL
            .into_iter()
            .map(|kind| {
                let filter = kind.filter(&term, self.per_kind_fetch_cap);
                (kind.variable_name().to_string(), filter.to_variable())
            })
            .collect();

        QueryRequest {
            query: FIND_MATCHES_QUERY.to_string(),
            variables,
        }
    }

    /// Issues one round trip for all entity kinds. Transport or shape
    /// failures fail the whole fetch; bad individual records are dropped.
    pub async fn fetch(&self, term: &str) -> Result<DynamicResults, FetchError> {
        let request = self.build_request(term);
        debug!(endpoint = self.transport.endpoint_name(), "dispatching combined entity query");
        let data = self.transport.execute(request).await?;
        decode_results(&data)
    }
}

/// Splits a response `data` object into normalized per-kind lists.
pub fn decode_results(data: &serde_json::Value) -> Result<DynamicResults, FetchError> {
    let mut collections = Vec::with_capacity(EntityKind::ALL.len());
    for kind in EntityKind::ALL {
        let records = data
            .get(kind.query_field())
            .and_then(|query| query.get(kind.collection_field()))
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| FetchError::MissingCollection {
                field: format!("{}.{}", kind.query_field(), kind.collection_field()),
            })?;
        collections.push((kind, records));
    }

    let mut results = DynamicResults::default();
    for (kind, records) in collections {
        for record in records {
            match kind.decode(record.clone()).and_then(|raw| raw.normalize()) {
                Ok(result) => results.list_mut(kind).push(result),
                Err(error) => {
                    warn!(%error, "dropping record that could not be normalized");
                    results.rejected.push(error);
                }
            }
        }
    }
    Ok(results)
}
