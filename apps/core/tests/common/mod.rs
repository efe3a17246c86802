#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use omnisearch_core::transport::{QueryRequest, QueryTransport, TransportError};

type Responder = dyn Fn(&str) -> (Duration, Result<serde_json::Value, TransportError>) + Send + Sync;

/// In-memory endpoint answering from a closure keyed on the query term.
/// Records every term it receives.
pub struct FixtureTransport {
    responder: Box<Responder>,
    terms: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new(data: serde_json::Value) -> Self {
        Self::from_fn(move |_| (Duration::ZERO, Ok(data.clone())))
    }

    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> (Duration, Result<serde_json::Value, TransportError>) + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            terms: Mutex::new(Vec::new()),
        }
    }

    pub fn terms(&self) -> Vec<String> {
        self.terms.lock().map(|terms| terms.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QueryTransport for FixtureTransport {
    fn endpoint_name(&self) -> &str {
        "fixture"
    }

    async fn execute(&self, request: QueryRequest) -> Result<serde_json::Value, TransportError> {
        let term = request.term().unwrap_or_default().to_string();
        if let Ok(mut terms) = self.terms.lock() {
            terms.push(term.clone());
        }

        let (delay, reply) = (self.responder)(&term);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// Builds a response `data` object from per-kind record lists.
pub fn fixture_data(
    tags: Vec<serde_json::Value>,
    performers: Vec<serde_json::Value>,
    scenes: Vec<serde_json::Value>,
    studios: Vec<serde_json::Value>,
) -> serde_json::Value {
    serde_json::json!({
        "findTags": {"count": tags.len(), "tags": tags},
        "findPerformers": {"count": performers.len(), "performers": performers},
        "findScenes": {"count": scenes.len(), "scenes": scenes},
        "findStudios": {"count": studios.len(), "studios": studios},
    })
}
