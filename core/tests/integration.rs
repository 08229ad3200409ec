//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the core client
//! and both controllers over real HTTP using ureq. Validates that request
//! building, response parsing and controller state transitions work with the
//! actual server.

use async_trait::async_trait;
use character_core::{
    ApiError, CharacterClient, DetailController, DetailView, Fetcher, HttpMethod, HttpRequest,
    HttpResponse, Labels, ListController, RemoteSource, StatusMarker,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match req.method {
        HttpMethod::Get => agent.get(&req.path).call(),
    }
    .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

/// Blocking fetcher. Fine here: the server runs on its own thread.
struct UreqFetcher;

#[async_trait(?Send)]
impl Fetcher for UreqFetcher {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        execute(request)
    }
}

/// Start the mock server on a random port and return its API base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

fn remote(base_url: &str) -> RemoteSource<UreqFetcher> {
    RemoteSource::new(CharacterClient::new(base_url), UreqFetcher)
}

#[test]
fn client_walks_pages_and_fetches_records() {
    let client = CharacterClient::new(&start_server());

    // Step 1: first page is full and links to the next.
    let page = client.parse_list_characters(execute(client.build_list_characters(1)).unwrap()).unwrap();
    assert_eq!(page.results.len(), 20);
    let info = page.info.expect("mock server always sends info");
    assert_eq!(info.pages, 3);
    assert!(info.next.is_some());

    // Step 2: last page is partial.
    let page = client.parse_list_characters(execute(client.build_list_characters(3)).unwrap()).unwrap();
    assert_eq!(page.results.len(), 5);

    // Step 3: past the end is NotFound.
    let err = client
        .parse_list_characters(execute(client.build_list_characters(4)).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 4: a record carries the detail-only fields.
    let record = client.parse_get_character(execute(client.build_get_character(1)).unwrap()).unwrap();
    assert_eq!(record.name, "Rick Sanchez");
    assert_eq!(record.origin.name, "Earth (C-137)");

    // Step 5: unknown id is NotFound.
    let err = client
        .parse_get_character(execute(client.build_get_character(999)).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test]
async fn list_controller_pages_until_exhausted() {
    let list = ListController::new(remote(&start_server()));

    list.activate().await;
    assert_eq!(list.len(), 20);
    assert_eq!(list.page(), 1);
    assert!(!list.is_busy());

    // Scrolled to the last row of a 10-row viewport.
    list.scrolled(19, 10).await;
    assert_eq!(list.len(), 40);
    assert_eq!(list.page(), 2);

    list.end_reached().await;
    assert_eq!(list.len(), 45);
    assert_eq!(list.page(), 3);

    // Page 4 does not exist: indistinguishable from "no more pages".
    list.end_reached().await;
    assert_eq!(list.len(), 45);
    assert_eq!(list.page(), 3);
    assert!(!list.is_busy());

    let ids: Vec<u32> = list.items().iter().map(|c| c.id).collect();
    assert_eq!(ids, (1..=45).collect::<Vec<u32>>());
}

#[tokio::test]
async fn detail_controller_loads_and_survives_missing_ids() {
    let base_url = start_server();
    let labels = Labels::portuguese();

    let detail = DetailController::new(remote(&base_url));
    assert_eq!(detail.view(&labels), DetailView::Loading);

    detail.focus(1).await;
    match detail.view(&labels) {
        DetailView::Loaded(card) => {
            assert_eq!(card.name, "Rick Sanchez");
            assert_eq!(card.species_label, "Humano");
            assert_eq!(card.status, StatusMarker::Green);
        }
        other => panic!("expected loaded view, got {other:?}"),
    }

    // A failing refetch keeps the stale record on screen.
    detail.focus(999).await;
    assert_eq!(detail.record().unwrap().id, 1);
    assert!(!detail.is_busy());

    let fresh = DetailController::new(remote(&base_url));
    fresh.focus(999).await;
    assert!(fresh.record().is_none());
    assert_eq!(fresh.view(&labels), DetailView::NotFound("Personagem não encontrado."));
}

#[tokio::test]
async fn unreachable_server_is_a_logged_failure() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let list = ListController::new(remote(&format!("http://127.0.0.1:{port}/api")));

    list.activate().await;
    assert!(list.is_empty());
    assert_eq!(list.page(), 1);
    assert!(!list.is_busy());
}
