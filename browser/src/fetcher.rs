use async_trait::async_trait;
use character_core::{ApiError, Fetcher, HttpMethod, HttpRequest, HttpResponse};

/// Executes core requests with a shared `reqwest::Client`.
///
/// Non-2xx statuses are returned as data; only connection-level failures
/// become `ApiError::Transport`.
#[derive(Clone, Default)]
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

#[async_trait(?Send)]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.path),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use character_core::CharacterClient;

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(mock_server::run(listener));
        format!("http://{addr}/api")
    }

    #[tokio::test]
    async fn fetches_a_page_and_passes_statuses_through() {
        let client = CharacterClient::new(&spawn_server().await);
        let fetcher = ReqwestFetcher::default();

        let response = fetcher.fetch(client.build_list_characters(1)).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.parse_list_characters(response).unwrap().results.len(), 20);

        let response = fetcher.fetch(client.build_get_character(999)).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(matches!(
            client.parse_get_character(response),
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = CharacterClient::new(&format!("http://127.0.0.1:{port}/api"));

        let err = ReqwestFetcher::default()
            .fetch(client.build_get_character(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
