use std::sync::OnceLock;

use crate::model::SearchResult;

pub const SECTIONS: [&str; 8] = [
    "scenes",
    "images",
    "movies",
    "markers",
    "galleries",
    "performers",
    "tags",
    "studios",
];

pub const SETTINGS_PANELS: [&str; 5] = ["tasks", "plugins", "interface", "security", "stats"];

static CATALOG: OnceLock<StaticCatalog> = OnceLock::new();

/// Navigation entries that are searchable without a remote round trip.
/// Built once and shared for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCatalog {
    entries: Vec<SearchResult>,
}

impl StaticCatalog {
    pub fn global() -> &'static StaticCatalog {
        CATALOG.get_or_init(Self::build)
    }

    fn build() -> Self {
        let sections = SECTIONS
            .iter()
            .filter_map(|section| SearchResult::navigation(*section, *section, format!("/{section}")));
        let panels = SETTINGS_PANELS.iter().filter_map(|panel| {
            SearchResult::navigation(
                *panel,
                format!("settings -> {panel}"),
                format!("/settings?tab={panel}"),
            )
        });

        Self {
            entries: sections.chain(panels).collect(),
        }
    }

    pub fn entries(&self) -> &[SearchResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
