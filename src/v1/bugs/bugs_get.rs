#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, ApiResponse };
use anyhow::Result;

use crate::utils::bug_store::BugStore;
use crate::utils::bug_utils::{self, RequestDebug};
use crate::utils::errors::{BugStoreError, HttpResult};
use crate::v1::bugs::{parse_bug_id, RespBug};
use log::error;

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct GetBugApi {
    store: Arc<dyn BugStore>,
}

struct ReqGetBug
{
    id: u64,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqGetBug {
    type Req = ReqGetBug;
    fn get_request_info(&self) -> String {
        format!("  Request path:\n    id: {}", self.id)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum BugResponse {
    #[oai(status = 200)]
    Http200(Json<RespBug>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 404)]
    Http404(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: RespBug) -> BugResponse {
    BugResponse::Http200(Json(resp))
}
fn make_http_400(msg: String) -> BugResponse {
    BugResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
}
fn make_http_404(msg: String) -> BugResponse {
    BugResponse::Http404(Json(HttpResult::new(404.to_string(), msg)))
}
fn make_http_500(msg: String) -> BugResponse {
    BugResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl GetBugApi {
    #[oai(path = "/bugs/:id", method = "get")]
    async fn get_bug_api(&self, http_req: &Request, id: Path<String>) -> BugResponse {
        // Package the path parameter.
        let req = match parse_bug_id(&id.0) {
            Ok(id) => ReqGetBug {id},
            Err(msg) => return make_http_400(msg),
        };

        // -------------------- Process Request ----------------------
        match self.process(http_req, &req) {
            Ok(r) => r,
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl GetBugApi {
    pub fn new(store: Arc<dyn BugStore>) -> Self {
        Self {store}
    }

    /// Process the request.
    fn process(&self, http_req: &Request, req: &ReqGetBug) -> Result<BugResponse> {
        // Conditional logging depending on log level.
        bug_utils::debug_request(http_req, req);

        // Distinguish a missing record from a real store failure.
        match self.store.get_bug(req.id) {
            Ok(bug) => Ok(make_http_200(bug.into())),
            Err(e @ BugStoreError::NotFound(_)) => Ok(make_http_404(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
