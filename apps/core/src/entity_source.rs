use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ResultKind, SearchResult};

/// Remote entity collections, in the order their results join the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tag,
    Performer,
    Scene,
    Studio,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Tag, Self::Performer, Self::Scene, Self::Studio];

    pub fn result_kind(self) -> ResultKind {
        match self {
            Self::Tag => ResultKind::Tag,
            Self::Performer => ResultKind::Performer,
            Self::Scene => ResultKind::Scene,
            Self::Studio => ResultKind::Studio,
        }
    }

    pub fn sort_field(self) -> &'static str {
        match self {
            Self::Tag | Self::Studio => "name",
            Self::Performer => "rating",
            Self::Scene => "created_at",
        }
    }

    pub fn sort_direction(self) -> SortDirection {
        match self {
            Self::Tag | Self::Studio => SortDirection::Asc,
            Self::Performer | Self::Scene => SortDirection::Desc,
        }
    }

    /// Name of the GraphQL variable carrying this kind's filter.
    pub fn variable_name(self) -> &'static str {
        match self {
            Self::Tag => "tag_filter",
            Self::Performer => "performer_filter",
            Self::Scene => "scene_filter",
            Self::Studio => "studio_filter",
        }
    }

    /// Top-level field of the response `data` object.
    pub fn query_field(self) -> &'static str {
        match self {
            Self::Tag => "findTags",
            Self::Performer => "findPerformers",
            Self::Scene => "findScenes",
            Self::Studio => "findStudios",
        }
    }

    /// Field holding the record list inside the query field.
    pub fn collection_field(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Performer => "performers",
            Self::Scene => "scenes",
            Self::Studio => "studios",
        }
    }

    pub fn filter(self, term: &str, per_page: u32) -> FetchFilter {
        FetchFilter {
            q: term.to_string(),
            page: 1,
            per_page,
            sort: self.sort_field().to_string(),
            direction: self.sort_direction(),
        }
    }

    pub fn decode(self, value: serde_json::Value) -> Result<RawRecord, NormalizeError> {
        let record = match self {
            Self::Tag => RawRecord::Tag(decode_as(self, value)?),
            Self::Performer => RawRecord::Performer(decode_as(self, value)?),
            Self::Scene => RawRecord::Scene(decode_as(self, value)?),
            Self::Studio => RawRecord::Studio(decode_as(self, value)?),
        };
        Ok(record)
    }
}

fn decode_as<T: DeserializeOwned>(kind: EntityKind, value: serde_json::Value) -> Result<T, NormalizeError> {
    let id = value
        .get("id")
        .map(|id| match id {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    serde_json::from_value(value).map_err(|error| NormalizeError::MalformedRecord {
        kind,
        id,
        reason: error.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Per-kind fetch parameters sent as one GraphQL filter variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFilter {
    pub q: String,
    pub page: u32,
    pub per_page: u32,
    pub sort: String,
    pub direction: SortDirection,
}

impl FetchFilter {
    /// The filter as a GraphQL variable value.
    pub fn to_variable(&self) -> serde_json::Value {
        serde_json::json!({
            "q": self.q,
            "page": self.page,
            "per_page": self.per_page,
            "sort": self.sort,
            "direction": self.direction.as_str(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("malformed {kind:?} record '{id}': {reason}")]
    MalformedRecord {
        kind: EntityKind,
        id: String,
        reason: String,
    },
}

impl NormalizeError {
    fn missing(kind: EntityKind, id: &str, reason: &str) -> Self {
        Self::MalformedRecord {
            kind,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId(pub String);

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(i64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(text) => Self(text),
            Wire::Number(number) => Self(number.to_string()),
        })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTag {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPerformer {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub disambiguation: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alias_list: Vec<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSceneFile {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawScenePaths {
    #[serde(default)]
    pub screenshot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawScene {
    pub id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<RawSceneFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paths: RawScenePaths,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawStudio {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Tag(RawTag),
    Performer(RawPerformer),
    Scene(RawScene),
    Studio(RawStudio),
}

impl RawRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Tag(_) => EntityKind::Tag,
            Self::Performer(_) => EntityKind::Performer,
            Self::Scene(_) => EntityKind::Scene,
            Self::Studio(_) => EntityKind::Studio,
        }
    }

    pub fn normalize(&self) -> Result<SearchResult, NormalizeError> {
        match self {
            Self::Tag(tag) => normalize_tag(tag),
            Self::Performer(performer) => normalize_performer(performer),
            Self::Scene(scene) => normalize_scene(scene),
            Self::Studio(studio) => normalize_studio(studio),
        }
    }
}

fn named_entity(kind: EntityKind, id: &RecordId, name: Option<&str>) -> Result<SearchResult, NormalizeError> {
    let label = name.unwrap_or_default();
    SearchResult::entity(id.0.as_str(), kind.result_kind(), label)
        .ok_or_else(|| NormalizeError::missing(kind, &id.0, "record has no name"))
}

pub fn normalize_tag(tag: &RawTag) -> Result<SearchResult, NormalizeError> {
    Ok(named_entity(EntityKind::Tag, &tag.id, tag.name.as_deref())?
        .with_alias_terms(tag.aliases.clone())
        .with_image_ref(tag.image_path.clone()))
}

pub fn normalize_performer(performer: &RawPerformer) -> Result<SearchResult, NormalizeError> {
    let mut alias_terms = performer.alias_list.clone();
    if let Some(disambiguation) = performer.disambiguation.as_deref().filter(|d| !d.is_empty()) {
        alias_terms.push(disambiguation.to_string());
    }

    Ok(
        named_entity(EntityKind::Performer, &performer.id, performer.name.as_deref())?
            .with_alias_terms(alias_terms)
            .with_image_ref(performer.image_path.clone()),
    )
}

pub fn normalize_scene(scene: &RawScene) -> Result<SearchResult, NormalizeError> {
    let label = match scene.title.as_deref().filter(|title| !title.is_empty()) {
        Some(title) => title,
        None => scene
            .files
            .first()
            .and_then(|file| file.path.as_deref())
            .ok_or_else(|| {
                NormalizeError::missing(EntityKind::Scene, &scene.id.0, "scene has neither title nor file path")
            })?,
    };

    let result = SearchResult::entity(scene.id.0.as_str(), ResultKind::Scene, label).ok_or_else(|| {
        NormalizeError::missing(EntityKind::Scene, &scene.id.0, "scene label is blank")
    })?;

    Ok(result
        .with_details(scene.details.clone().unwrap_or_default())
        .with_image_ref(scene.paths.screenshot.clone()))
}

pub fn normalize_studio(studio: &RawStudio) -> Result<SearchResult, NormalizeError> {
    Ok(named_entity(EntityKind::Studio, &studio.id, studio.name.as_deref())?
        .with_image_ref(studio.image_path.clone()))
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, NormalizeError, RawRecord, SortDirection};
    use serde_json::json;

    fn decode(kind: EntityKind, value: serde_json::Value) -> RawRecord {
        kind.decode(value).unwrap()
    }

    #[test]
    fn sort_parameters_are_fixed_per_kind() {
        let tag = EntityKind::Tag.filter("x", 10);
        assert_eq!((tag.sort.as_str(), tag.direction), ("name", SortDirection::Asc));
        let performer = EntityKind::Performer.filter("x", 10);
        assert_eq!(
            (performer.sort.as_str(), performer.direction),
            ("rating", SortDirection::Desc)
        );
        let scene = EntityKind::Scene.filter("x", 10);
        assert_eq!((scene.sort.as_str(), scene.direction), ("created_at", SortDirection::Desc));
        let studio = EntityKind::Studio.filter("x", 10);
        assert_eq!((studio.sort.as_str(), studio.direction), ("name", SortDirection::Asc));
        assert_eq!(studio.page, 1);
        assert_eq!(studio.per_page, 10);
    }

    #[test]
    fn filter_variable_uses_upper_case_direction() {
        let filter = EntityKind::Performer.filter("jane", 10);
        let expected = json!({"q": "jane", "page": 1, "per_page": 10, "sort": "rating", "direction": "DESC"});
        assert_eq!(filter.to_variable(), expected);
        assert_eq!(serde_json::to_value(&filter).unwrap(), expected);
    }

    #[test]
    fn scene_falls_back_to_first_file_path() {
        let record = decode(
            EntityKind::Scene,
            json!({"id": "7", "title": "", "files": [{"path": "/a/b.mp4"}, {"path": "/c.mp4"}], "paths": {"screenshot": "/shot/7"}, "details": "d"}),
        );
        let result = record.normalize().unwrap();
        assert_eq!(result.label(), "/a/b.mp4");
        assert_eq!(result.details(), "d");
        assert_eq!(result.image_ref(), Some("/shot/7"));
    }

    #[test]
    fn scene_title_wins_over_file_path() {
        let record = decode(
            EntityKind::Scene,
            json!({"id": "7", "title": "Beach Day", "files": [{"path": "/a/b.mp4"}]}),
        );
        assert_eq!(record.normalize().unwrap().label(), "Beach Day");
    }

    #[test]
    fn scene_without_title_or_files_is_malformed() {
        let record = decode(EntityKind::Scene, json!({"id": "9", "title": null, "files": []}));
        match record.normalize() {
            Err(NormalizeError::MalformedRecord { kind, id, .. }) => {
                assert_eq!(kind, EntityKind::Scene);
                assert_eq!(id, "9");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn performer_aliases_include_disambiguation() {
        let record = decode(
            EntityKind::Performer,
            json!({"id": 3, "name": "Jane Doe", "alias_list": ["JD"], "disambiguation": "the second", "details": "ignored"}),
        );
        let result = record.normalize().unwrap();
        assert_eq!(result.id(), "3");
        assert_eq!(result.alias_terms(), ["JD".to_string(), "the second".to_string()]);
        assert_eq!(result.details(), "");
    }

    #[test]
    fn tag_aliases_pass_through_and_studio_has_none() {
        let tag = decode(
            EntityKind::Tag,
            json!({"id": "1", "name": "Outdoor", "aliases": ["outside", "open air"], "image_path": "/tag/1"}),
        )
        .normalize()
        .unwrap();
        assert_eq!(tag.alias_terms().len(), 2);
        assert_eq!(tag.image_ref(), Some("/tag/1"));

        let studio = decode(
            EntityKind::Studio,
            json!({"id": "4", "name": "Acme", "image_path": "/studio/4"}),
        )
        .normalize()
        .unwrap();
        assert!(studio.alias_terms().is_empty());
        assert_eq!(studio.details(), "");
    }

    #[test]
    fn null_alias_lists_decode_as_empty() {
        let tag = decode(EntityKind::Tag, json!({"id": "1", "name": "Solo", "aliases": null}));
        assert!(tag.normalize().unwrap().alias_terms().is_empty());
    }

    #[test]
    fn undecodable_record_reports_its_id() {
        let error = EntityKind::Tag
            .decode(json!({"id": "5", "name": ["not", "a", "string"]}))
            .unwrap_err();
        match error {
            NormalizeError::MalformedRecord { id, .. } => assert_eq!(id, "5"),
        }
    }

    #[test]
    fn normalization_is_repeatable() {
        let record = decode(
            EntityKind::Performer,
            json!({"id": "3", "name": "Jane Doe", "alias_list": ["JD"], "image_path": "/p/3"}),
        );
        assert_eq!(record.normalize().unwrap(), record.normalize().unwrap());
    }
}
