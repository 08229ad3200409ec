use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

/// Results per page, matching the public API.
pub const PAGE_SIZE: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub status: String,
    pub species: String,
    pub gender: String,
    pub origin: Place,
    pub location: Place,
    pub image: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Info {
    pub count: u32,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page {
    pub info: Info,
    pub results: Vec<Character>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

pub type Db = Arc<Vec<Character>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

const SEED: &[(&str, &str, &str, &str)] = &[
    ("Rick Sanchez", "Alive", "Human", "Male"),
    ("Morty Smith", "Alive", "Human", "Male"),
    ("Summer Smith", "Alive", "Human", "Female"),
    ("Beth Smith", "Alive", "Human", "Female"),
    ("Jerry Smith", "Alive", "Human", "Male"),
    ("Abadango Cluster Princess", "Alive", "Alien", "Female"),
    ("Abradolf Lincler", "unknown", "Human", "Male"),
    ("Adjudicator Rick", "Dead", "Human", "Male"),
    ("Agency Director", "Dead", "Human", "Male"),
    ("Alan Rails", "Dead", "Human", "Male"),
    ("Albert Einstein", "Dead", "Human", "Male"),
    ("Alexander", "Dead", "Human", "Male"),
    ("Alien Googah", "unknown", "Alien", "unknown"),
    ("Alien Morty", "unknown", "Alien", "Male"),
    ("Alien Rick", "unknown", "Alien", "Male"),
    ("Amish Cyborg", "Dead", "Alien", "Male"),
    ("Annie", "Alive", "Human", "Female"),
    ("Antenna Morty", "Alive", "Human", "Male"),
    ("Antenna Rick", "unknown", "Human", "Male"),
    ("Ants in my Eyes Johnson", "unknown", "Human", "Male"),
    ("Aqua Morty", "unknown", "Humanoid", "Male"),
    ("Aqua Rick", "unknown", "Humanoid", "Male"),
    ("Arcade Alien", "unknown", "Alien", "Male"),
    ("Armagheadon", "Alive", "Alien", "Male"),
    ("Armothy", "Dead", "unknown", "Male"),
];

/// Deterministic dataset of `count` characters. Names repeat once the seed
/// table runs out, the same way the upstream dataset has many "Ricks".
pub fn seed_characters(count: u32) -> Vec<Character> {
    (1..=count)
        .map(|id| {
            let (name, status, species, gender) = SEED[(id as usize - 1) % SEED.len()];
            let origin = Place {
                name: "Earth (C-137)".to_string(),
                url: "https://rickandmortyapi.com/api/location/1".to_string(),
            };
            Character {
                id,
                name: name.to_string(),
                status: status.to_string(),
                species: species.to_string(),
                gender: gender.to_string(),
                location: origin.clone(),
                origin,
                image: format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
            }
        })
        .collect()
}

pub fn app() -> Router {
    app_with(seed_characters(45))
}

pub fn app_with(characters: Vec<Character>) -> Router {
    let db: Db = Arc::new(characters);
    Router::new()
        .route("/api/character", get(list_characters))
        .route("/api/character/{id}", get(get_character))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found(message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn page_link(headers: &HeaderMap, page: u32) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/api/character?page={page}")
}

async fn list_characters(
    State(db): State<Db>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> ApiResult<Page> {
    let page = query.page.unwrap_or(1).max(1);
    let count = db.len() as u32;
    let pages = db.len().div_ceil(PAGE_SIZE) as u32;
    if page > pages {
        debug!(page, pages, "page out of range");
        return Err(not_found("There is nothing here"));
    }

    let start = (page as usize - 1) * PAGE_SIZE;
    let results = db.iter().skip(start).take(PAGE_SIZE).cloned().collect();
    let info = Info {
        count,
        pages,
        next: (page < pages).then(|| page_link(&headers, page + 1)),
        prev: (page > 1).then(|| page_link(&headers, page - 1)),
    };
    Ok(Json(Page { info, results }))
}

async fn get_character(State(db): State<Db>, Path(id): Path<u32>) -> ApiResult<Character> {
    db.iter()
        .find(|c| c.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            debug!(id, "character not found");
            not_found("Character not found")
        })
}
