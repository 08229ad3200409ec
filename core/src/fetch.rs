//! The fetch boundary between the controllers and the network.
//!
//! `Fetcher` is the lowest seam: it executes one `HttpRequest`. A
//! `CharacterSource` speaks in domain terms (a page, a record) and is what the
//! controllers hold. `RemoteSource` glues a `CharacterClient` to any
//! `Fetcher`; tests swap in scripted sources instead.
//!
//! Futures are `?Send`: controllers run on a single cooperative thread.

use async_trait::async_trait;
use tracing::debug;

use crate::client::CharacterClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CharacterRecord, CharacterSummary};

/// Executes an HTTP round-trip. Non-2xx statuses are returned as data, not
/// as errors; only a failure to get any response is an `Err`.
#[async_trait(?Send)]
pub trait Fetcher {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Where the controllers get characters from.
#[async_trait(?Send)]
pub trait CharacterSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<CharacterSummary>, ApiError>;

    async fn fetch_character(&self, id: u32) -> Result<CharacterRecord, ApiError>;
}

/// `CharacterSource` backed by the HTTP API.
#[derive(Debug, Clone)]
pub struct RemoteSource<F> {
    client: CharacterClient,
    fetcher: F,
}

impl<F: Fetcher> RemoteSource<F> {
    pub fn new(client: CharacterClient, fetcher: F) -> Self {
        Self { client, fetcher }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "fetching");
        self.fetcher.fetch(request).await
    }
}

#[async_trait(?Send)]
impl<F: Fetcher> CharacterSource for RemoteSource<F> {
    async fn fetch_page(&self, page: u32) -> Result<Vec<CharacterSummary>, ApiError> {
        let request = self.client.build_list_characters(page);
        let response = self.round_trip(request).await?;
        Ok(self.client.parse_list_characters(response)?.results)
    }

    async fn fetch_character(&self, id: u32) -> Result<CharacterRecord, ApiError> {
        let request = self.client.build_get_character(id);
        let response = self.round_trip(request).await?;
        self.client.parse_get_character(response)
    }
}

#[async_trait(?Send)]
impl<S: CharacterSource + ?Sized> CharacterSource for std::rc::Rc<S> {
    async fn fetch_page(&self, page: u32) -> Result<Vec<CharacterSummary>, ApiError> {
        (**self).fetch_page(page).await
    }

    async fn fetch_character(&self, id: u32) -> Result<CharacterRecord, ApiError> {
        (**self).fetch_character(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Replies with a canned response and records every requested path.
    struct CannedFetcher {
        status: u16,
        body: String,
        seen: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.path);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct DownFetcher;

    #[async_trait(?Send)]
    impl Fetcher for DownFetcher {
        async fn fetch(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }
    }

    fn source(status: u16, body: &str) -> RemoteSource<CannedFetcher> {
        RemoteSource::new(
            CharacterClient::new("http://api.test"),
            CannedFetcher {
                status,
                body: body.to_string(),
                seen: RefCell::new(Vec::new()),
            },
        )
    }

    #[tokio::test]
    async fn fetch_page_unwraps_results() {
        let src = source(
            200,
            r#"{"results":[{"id":1,"name":"Rick Sanchez","species":"Human","status":"Alive","image":"1.jpeg"}]}"#,
        );
        let page = src.fetch_page(2).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(src.fetcher.seen.borrow().as_slice(), ["http://api.test/character?page=2"]);
    }

    #[tokio::test]
    async fn fetch_character_maps_404() {
        let src = source(404, r#"{"error":"Character not found"}"#);
        let err = src.fetch_character(999).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(src.fetcher.seen.borrow().as_slice(), ["http://api.test/character/999"]);
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let src = RemoteSource::new(CharacterClient::new("http://api.test"), DownFetcher);
        let err = src.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
