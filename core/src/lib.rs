//! Fetch-and-render core for a character browser.
//!
//! # Overview
//! Lists characters from the Rick and Morty REST API page by page and loads
//! a single character for a detail screen. Rendering, navigation and image
//! loading belong to the host; this crate owns the state those screens read
//! and the events that mutate it.
//!
//! # Design
//! - `CharacterClient` is stateless and sans-IO: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `Fetcher` / `CharacterSource` form the async fetch boundary;
//!   `RemoteSource` connects the client to any fetcher.
//! - `ListState` / `DetailState` are I/O-free state machines driven by
//!   tickets, so a C host can run the same logic. `ListController` /
//!   `DetailController` drive them over a `CharacterSource`.
//! - Fetch failures are logged through `tracing` and never stored in
//!   presentation state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod http;
pub mod list;
pub mod present;
pub mod types;

pub use client::{CharacterClient, DEFAULT_BASE_URL};
pub use config::{ClientConfig, ConfigError};
pub use detail::{DetailController, DetailState, RecordTicket, StalePolicy};
pub use error::ApiError;
pub use fetch::{CharacterSource, Fetcher, RemoteSource};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::{ListController, ListState, PageTicket, DEFAULT_END_REACHED_THRESHOLD};
pub use present::{CharacterCard, DetailView, Labels, ListRow, ListView, Locale, StatusMarker};
pub use types::{CharacterPage, CharacterRecord, CharacterSummary, PageInfo, Place};
