//! Domain DTOs for the character API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently,
//! so the FFI surface never depends on Axum internals. Integration tests catch
//! any schema drift between the two crates.
//!
//! Unknown fields in upstream payloads (episode lists, timestamps, ...) are
//! ignored by serde. Fields the detail screen shows but the list does not are
//! `#[serde(default)]` so a sparse payload still parses.

use serde::{Deserialize, Serialize};

/// The reduced character shape shown in the list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterSummary {
    pub id: u32,
    pub name: String,
    pub species: String,
    pub status: String,
    pub image: String,
}

/// A named place with its API link (origin, last known location).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// The character shape shown on the detail screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterRecord {
    pub id: u32,
    pub name: String,
    pub species: String,
    pub status: String,
    pub image: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: Place,
    #[serde(default)]
    pub location: Place,
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Envelope of `GET /character?page={n}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterPage {
    #[serde(default)]
    pub info: Option<PageInfo>,
    pub results: Vec<CharacterSummary>,
}

impl From<&CharacterRecord> for CharacterSummary {
    fn from(record: &CharacterRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            species: record.species.clone(),
            status: record.status.clone(),
            image: record.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tolerates_missing_detail_fields() {
        let record: CharacterRecord = serde_json::from_str(
            r#"{"id":5,"name":"Rick Sanchez","species":"Human","status":"Alive","image":"x.jpeg"}"#,
        )
        .unwrap();
        assert_eq!(record.id, 5);
        assert!(record.gender.is_empty());
        assert_eq!(record.origin, Place::default());
    }

    #[test]
    fn page_ignores_unknown_fields() {
        let page: CharacterPage = serde_json::from_str(
            r#"{
                "info": {"count": 1, "pages": 1, "next": null, "prev": null},
                "results": [{
                    "id": 1, "name": "Rick Sanchez", "status": "Alive", "species": "Human",
                    "type": "", "gender": "Male", "image": "a.jpeg",
                    "episode": ["https://rickandmortyapi.com/api/episode/1"],
                    "created": "2017-11-04T18:48:46.250Z"
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.info.unwrap().pages, 1);
    }

    #[test]
    fn page_without_info_parses() {
        let page: CharacterPage = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert!(page.info.is_none());
        assert!(page.results.is_empty());
    }
}
