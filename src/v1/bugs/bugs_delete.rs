#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, Object, ApiResponse };
use anyhow::Result;

use crate::utils::bug_store::BugStore;
use crate::utils::bug_utils::{self, RequestDebug};
use crate::utils::errors::{BugStoreError, HttpResult};
use crate::v1::bugs::parse_bug_id;
use log::{error, info};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct DeleteBugApi {
    store: Arc<dyn BugStore>,
}

struct ReqDeleteBug
{
    id: u64,
}

#[derive(Object, Debug)]
pub struct RespDeleteBug
{
    result_code: String,
    result_msg: String,
    id: u64,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqDeleteBug {
    type Req = ReqDeleteBug;
    fn get_request_info(&self) -> String {
        format!("  Request path:\n    id: {}", self.id)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum BugResponse {
    #[oai(status = 200)]
    Http200(Json<RespDeleteBug>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 404)]
    Http404(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: RespDeleteBug) -> BugResponse {
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
impl DeleteBugApi {
    #[oai(path = "/bugs/:id", method = "delete")]
    async fn delete_bug_api(&self, http_req: &Request, id: Path<String>) -> BugResponse {
        let req = match parse_bug_id(&id.0) {
            Ok(id) => ReqDeleteBug {id},
            Err(msg) => return make_http_400(msg),
        };

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
impl RespDeleteBug {
    fn new(result_code: &str, result_msg: String, id: u64) -> Self {
        Self {result_code: result_code.to_string(), result_msg, id}
    }
}

impl DeleteBugApi {
    pub fn new(store: Arc<dyn BugStore>) -> Self {
        Self {store}
    }

    /// Process the request.
    fn process(&self, http_req: &Request, req: &ReqDeleteBug) -> Result<BugResponse> {
        // Conditional logging depending on log level.
        bug_utils::debug_request(http_req, req);

        match self.store.delete_bug(req.id) {
            Ok(()) => {
                let msg = format!("Bug #{} deleted", req.id);
                info!("{}", msg);
                Ok(make_http_200(RespDeleteBug::new("0", msg, req.id)))
            },
            Err(e @ BugStoreError::NotFound(_)) => Ok(make_http_404(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
