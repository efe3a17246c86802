use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Performer,
    Scene,
    Tag,
    Studio,
    Navigation,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Performer => "performer",
            Self::Scene => "scene",
            Self::Tag => "tag",
            Self::Studio => "studio",
            Self::Navigation => "navigation",
        }
    }

    /// Path segment used when resolving an entity to its page, e.g. `/performers/12`.
    pub fn route_segment(self) -> Option<&'static str> {
        match self {
            Self::Performer => Some("performers"),
            Self::Scene => Some("scenes"),
            Self::Tag => Some("tags"),
            Self::Studio => Some("studios"),
            Self::Navigation => None,
        }
    }
}

impl Display for ResultKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate in the search overlay, either a remote entity or a
/// navigation entry. Fields are private so `label` and `kind` keep their
/// construction-time guarantees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    id: String,
    kind: ResultKind,
    label: String,
    details: String,
    alias_terms: Vec<String>,
    image_ref: Option<String>,
    destination: Option<String>,
}

impl SearchResult {
    /// Builds an entity result. Returns `None` when `label` is blank or
    /// `kind` is `Navigation` (use [`SearchResult::navigation`] for those).
    pub fn entity(id: impl Into<String>, kind: ResultKind, label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        if kind == ResultKind::Navigation || label.trim().is_empty() {
            return None;
        }
        Some(Self {
            id: id.into(),
            kind,
            label,
            details: String::new(),
            alias_terms: Vec::new(),
            image_ref: None,
            destination: None,
        })
    }

    pub fn navigation(
        id: impl Into<String>,
        label: impl Into<String>,
        destination: impl Into<String>,
    ) -> Option<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return None;
        }
        Some(Self {
            id: id.into(),
            kind: ResultKind::Navigation,
            label,
            details: String::new(),
            alias_terms: Vec::new(),
            image_ref: None,
            destination: Some(destination.into()),
        })
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_alias_terms(mut self, alias_terms: Vec<String>) -> Self {
        self.alias_terms = alias_terms;
        self
    }

    pub fn with_image_ref(mut self, image_ref: Option<String>) -> Self {
        self.image_ref = image_ref.filter(|value| !value.is_empty());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn alias_terms(&self) -> &[String] {
        &self.alias_terms
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
}

/// Display-order comparison for labels: case-folded first so "apple" and
/// "Banana" interleave the way a reader expects, raw text as the tiebreak.
pub fn compare_labels(left: &str, right: &str) -> Ordering {
    let folded = left
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase));
    folded.then_with(|| left.cmp(right))
}
