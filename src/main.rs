#![forbid(unsafe_code)]

use std::sync::Arc;

use lazy_static::lazy_static;
use log::info;
use poem::{get, handler, listener::TcpListener, Route};
use poem_openapi::OpenApiService;

// QAPI Utilities
use crate::utils::bug_store::{BugStore, InMemoryBugStore};
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;
use crate::v1::bugs::bugs_create::CreateBugApi;
use crate::v1::bugs::bugs_delete::DeleteBugApi;
use crate::v1::bugs::bugs_get::GetBugApi;
use crate::v1::bugs::bugs_list::ListBugsApi;
use crate::v1::bugs::bugs_update::UpdateBugApi;
use crate::v1::version::VersionApi;

// Modules
mod utils;
mod v1;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "QapiServer"; // for poem logging
const WELCOME_MSG : &str = "Welcome to QAPI Bugs!";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize QAPI ----------------
    // Announce ourselves.
    println!("QAPI bug server is starting...");

    // Initialize the server.
    qapi_init();

    // --------------- Main Loop Set Up ---------------
    // Assign base URL.
    let api_url = format!("{}:{}{}",
        RUNTIME_CTX.parms.config.http_addr, 
        RUNTIME_CTX.parms.config.http_port, 
        "/v1");

    // Everything shares one store.
    let store: Arc<dyn BugStore> = Arc::new(InMemoryBugStore::new());
    let app = make_app(store, &RUNTIME_CTX.parms.config.title, &api_url);

    // ------------------ Main Loop -------------------
    let addr = format!("{}{}", "0.0.0.0:", RUNTIME_CTX.parms.config.http_port);
    info!("Listening on {}.", addr);
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// qapi_init:
// ---------------------------------------------------------------------------
/** Initialize all subsystems and data structures other than those needed
 * to configure the main loop processor.
 */
fn qapi_init() {
    // Configure our log.
    init_log();
    
    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    // Log build info.
    print_version_info();
}

// ---------------------------------------------------------------------------
// make_app:
// ---------------------------------------------------------------------------
/** Assemble the routes.  The bug api lives under /v1, the welcome page at
 * the root only; every other path gets poem's 404.
 */
fn make_app(store: Arc<dyn BugStore>, title: &str, api_url: &str) -> Route {
    let endpoints = (
        ListBugsApi::new(store.clone()),
        CreateBugApi::new(store.clone()),
        GetBugApi::new(store.clone()),
        UpdateBugApi::new(store.clone()),
        DeleteBugApi::new(store),
        VersionApi,
    );
    let api_service = OpenApiService::new(endpoints, title, 
        option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")).server(api_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .at("/", get(welcome))
        .nest("/v1", api_service)
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running QAPI={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}.",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("SOURCE_TIMESTAMP"),
          env!("RUSTC_VERSION"));
}

// ***************************************************************************
//                             Welcome Endpoint
// ***************************************************************************
#[handler]
fn welcome() -> &'static str {
    WELCOME_MSG
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use poem::http::StatusCode;
    use poem::test::{TestClient, TestResponse};
    use poem::Route;
    use serde::de::DeserializeOwned;
    use serde_json::json;

    use super::{make_app, WELCOME_MSG};
    use crate::utils::bug_store::{BugStore, InMemoryBugStore};
    use crate::utils::bug_types::{Bug, BugInput};

    fn test_client(store: Arc<dyn BugStore>) -> TestClient<Route> {
        TestClient::new(make_app(store, "QAPI Bugs Server", "http://localhost:8080/v1"))
    }

    // A client over a store holding one bug titled "New bug" with id 1.
    fn seeded_client() -> (Arc<dyn BugStore>, TestClient<Route>) {
        let store: Arc<dyn BugStore> = Arc::new(InMemoryBugStore::new());
        store.create_bug(BugInput::new("New bug".to_string(), String::new(), String::new()))
            .unwrap();
        let cli = test_client(store.clone());
        (store, cli)
    }

    async fn body_json<T: DeserializeOwned>(resp: TestResponse) -> T {
        resp.0.into_body().into_json::<T>().await.unwrap()
    }

    #[tokio::test]
    async fn root_gives_welcome() {
        let (_, cli) = seeded_client();
        let resp = cli.get("/").send().await;
        resp.assert_status_is_ok();
        resp.assert_text(WELCOME_MSG).await;
    }

    #[tokio::test]
    async fn unknown_routes_give_404() {
        let (_, cli) = seeded_client();
        for path in ["/foo", "/v1", "/v1/", "/v1/bugs/1/extra"] {
            let resp = cli.get(path).send().await;
            resp.assert_status(StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn list_empty_store() {
        let cli = test_client(Arc::new(InMemoryBugStore::new()));
        let resp = cli.get("/v1/bugs").send().await;
        resp.assert_status_is_ok();
        let bugs: Vec<Bug> = body_json(resp).await;
        assert!(bugs.is_empty());
    }

    #[tokio::test]
    async fn list_seeded_store() {
        let (_, cli) = seeded_client();
        let resp = cli.get("/v1/bugs").send().await;
        resp.assert_status_is_ok();
        let bugs: Vec<Bug> = body_json(resp).await;
        assert_eq!(bugs.len(), 1);
        assert_eq!(bugs[0].id, 1);
        assert_eq!(bugs[0].title, "New bug");
    }

    #[tokio::test]
    async fn get_single_bug() {
        let (store, cli) = seeded_client();
        let resp = cli.get("/v1/bugs/1").send().await;
        resp.assert_status_is_ok();
        let bug: Bug = body_json(resp).await;
        assert_eq!(bug, store.get_bug(1).unwrap());
    }

    #[tokio::test]
    async fn bad_bug_ids_give_400() {
        let (_, cli) = seeded_client();
        for path in ["/v1/bugs/abc", "/v1/bugs/-1", "/v1/bugs/ff3%293",
                     "/v1/bugs/12345679012345678901234567890",
                     "/v1/bugs/9223372036854775808",
                     "/v1/bugs/18446744073709551615"] {
            let resp = cli.get(path).send().await;
            resp.assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn absent_bug_gives_404() {
        let (_, cli) = seeded_client();
        cli.get("/v1/bugs/2").send().await.assert_status(StatusCode::NOT_FOUND);
        cli.put("/v1/bugs/2").body_json(&json!({"title": "x"})).send().await
            .assert_status(StatusCode::NOT_FOUND);
        cli.delete("/v1/bugs/2").send().await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_bug() {
        let (store, cli) = seeded_client();
        let resp = cli.post("/v1/bugs")
            .body_json(&json!({"id": 99, "title": "New bug", "description": "New description"}))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);

        let created: Bug = body_json(resp).await;
        assert_eq!(created.id, 2);
        assert_eq!(created.title, "New bug");
        assert_eq!(created.description, "New description");
        assert_eq!(created.status, "");
        assert_eq!(store.get_bug(2).unwrap(), created);
    }

    #[tokio::test]
    async fn create_with_bad_body_gives_400() {
        let (store, cli) = seeded_client();
        let resp = cli.post("/v1/bugs")
            .content_type("application/json")
            .body("{not json")
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(store.list_bugs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_without_content_type() {
        let (store, cli) = seeded_client();
        let resp = cli.post("/v1/bugs")
            .body(r#"{"title":"New bug","description":"New description"}"#)
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);

        let created: Bug = body_json(resp).await;
        assert_eq!(created.title, "New bug");
        assert_eq!(created.description, "New description");
        assert_eq!(store.list_bugs().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_with_empty_body_gives_400() {
        let (store, cli) = seeded_client();
        cli.post("/v1/bugs").send().await.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(store.list_bugs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_without_content_type() {
        let (store, cli) = seeded_client();
        let resp = cli.put("/v1/bugs/1")
            .body(r#"{"title":"Renamed","status":"Open"}"#)
            .send()
            .await;
        resp.assert_status_is_ok();
        assert_eq!(store.get_bug(1).unwrap().title, "Renamed");

        cli.put("/v1/bugs/1").body("{not json").send().await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_bug() {
        let (store, cli) = seeded_client();
        let before = store.get_bug(1).unwrap();

        let resp = cli.put("/v1/bugs/1")
            .body_json(&json!({"title": "Updated", "description": "d", "status": "Closed"}))
            .send()
            .await;
        resp.assert_status_is_ok();

        let updated: Bug = body_json(resp).await;
        assert_eq!(updated.id, 1);
        assert_eq!(updated.created_at, before.created_at);
        assert_eq!(updated.title, "Updated");
        assert_eq!(updated.status, "Closed");
        assert_eq!(store.get_bug(1).unwrap(), updated);
    }

    #[tokio::test]
    async fn update_with_bad_id_gives_400() {
        let (_, cli) = seeded_client();
        cli.put("/v1/bugs/abc").body_json(&json!({"title": "x"})).send().await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_then_get_gives_404() {
        let (_, cli) = seeded_client();
        cli.delete("/v1/bugs/1").send().await.assert_status_is_ok();
        cli.get("/v1/bugs/1").send().await.assert_status(StatusCode::NOT_FOUND);
        cli.delete("/v1/bugs/-1").send().await.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn version_and_spec_are_served() {
        let (_, cli) = seeded_client();
        cli.get("/v1/version").send().await.assert_status_is_ok();
        cli.get("/spec").send().await.assert_status_is_ok();
    }
}
