//! Display mappings and derived views.
//!
//! Everything here is pure: field values are read, never rewritten. The
//! species and status mappings are total over arbitrary strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{CharacterRecord, CharacterSummary};

/// Language of the user-facing labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pt" | "pt-br" | "pt_br" => Ok(Locale::PtBr),
            "en" | "en-us" | "en_us" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Localized strings used by the views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub human: &'static str,
    pub alien: &'static str,
    pub not_found: &'static str,
    pub species_caption: &'static str,
    pub status_caption: &'static str,
}

impl Labels {
    pub fn portuguese() -> Self {
        Self {
            human: "Humano",
            alien: "Alien",
            not_found: "Personagem não encontrado.",
            species_caption: "Espécie",
            status_caption: "Status",
        }
    }

    pub fn english() -> Self {
        Self {
            human: "Human",
            alien: "Alien",
            not_found: "Character not found.",
            species_caption: "Species",
            status_caption: "Status",
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::PtBr => Self::portuguese(),
            Locale::En => Self::english(),
        }
    }

    /// `"Human"` maps to the human label, anything else to the alien one.
    pub fn species(&self, species: &str) -> &'static str {
        if species == "Human" {
            self.human
        } else {
            self.alien
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::portuguese()
    }
}

/// Coloured dot shown next to a character's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMarker {
    Green,
    Red,
    Yellow,
}

impl StatusMarker {
    pub fn from_status(status: &str) -> Self {
        match status {
            "Alive" => StatusMarker::Green,
            "Dead" => StatusMarker::Red,
            _ => StatusMarker::Yellow,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            StatusMarker::Green => "🟢",
            StatusMarker::Red => "🔴",
            StatusMarker::Yellow => "🟡",
        }
    }
}

impl fmt::Display for StatusMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A character ready to render, shared by list rows and the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCard {
    pub id: u32,
    pub name: String,
    pub image: String,
    pub species_label: &'static str,
    pub status: StatusMarker,
}

impl CharacterCard {
    pub fn from_summary(summary: &CharacterSummary, labels: &Labels) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            image: summary.image.clone(),
            species_label: labels.species(&summary.species),
            status: StatusMarker::from_status(&summary.status),
        }
    }

    pub fn from_record(record: &CharacterRecord, labels: &Labels) -> Self {
        Self::from_summary(&CharacterSummary::from(record), labels)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// `"{name}-{index}"`; unique even when the same character repeats.
    pub key: String,
    pub card: CharacterCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<ListRow>,
    pub loading_footer: bool,
}

impl ListView {
    pub fn new(cards: impl IntoIterator<Item = CharacterCard>, busy: bool) -> Self {
        let rows = cards
            .into_iter()
            .enumerate()
            .map(|(index, card)| ListRow {
                key: format!("{}-{index}", card.name),
                card,
            })
            .collect();
        Self {
            rows,
            loading_footer: busy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Loading,
    NotFound(&'static str),
    Loaded(CharacterCard),
}

impl DetailView {
    /// Busy wins over everything; no record after loading means not found.
    pub fn derive(busy: bool, record: Option<&CharacterRecord>, labels: &Labels) -> Self {
        if busy {
            return DetailView::Loading;
        }
        match record {
            None => DetailView::NotFound(labels.not_found),
            Some(record) => DetailView::Loaded(CharacterCard::from_record(record, labels)),
        }
    }
}
