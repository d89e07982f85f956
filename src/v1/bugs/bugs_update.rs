#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Path, ApiResponse };
use anyhow::Result;

use crate::utils::bug_store::BugStore;
use crate::utils::bug_utils::{self, RequestDebug};
use crate::utils::errors::{BugStoreError, HttpResult};
use crate::v1::bugs::{decode_bug_fields, parse_bug_id, ReqBugFields, RespBug};
use log::{error, info};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct UpdateBugApi {
    store: Arc<dyn BugStore>,
}

struct ReqUpdateBug
{
    id: u64,
    fields: ReqBugFields,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqUpdateBug {
    type Req = ReqUpdateBug;
    fn get_request_info(&self) -> String {
        let mut s = format!("  Request path:\n    id: {}\n", self.id);
        s.push_str(&self.fields.get_request_info());
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
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

// Unreadable request bodies.
fn bad_request_handler(err: poem::Error) -> BugResponse {
    make_http_400(err.to_string())
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl UpdateBugApi {
    #[oai(path = "/bugs/:id", method = "put")]
    async fn update_bug_api(&self, http_req: &Request, id: Path<String>, 
                            body: Vec<u8>) -> BugResponse {
        // Package the path and body parameters.  Any id in the body is ignored.
        let id = match parse_bug_id(&id.0) {
            Ok(id) => id,
            Err(msg) => return make_http_400(msg),
        };
        let req = match decode_bug_fields(&body) {
            Ok(fields) => ReqUpdateBug {id, fields},
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
impl UpdateBugApi {
    pub fn new(store: Arc<dyn BugStore>) -> Self {
        Self {store}
    }

    /// Process the request.
    fn process(&self, http_req: &Request, req: &ReqUpdateBug) -> Result<BugResponse> {
        // Conditional logging depending on log level.
        bug_utils::debug_request(http_req, req);

        match self.store.update_bug(req.id, req.fields.to_input()) {
            Ok(bug) => {
                info!("Bug #{} updated.", bug.id);
                Ok(make_http_200(bug.into()))
            },
            Err(e @ BugStoreError::NotFound(_)) => Ok(make_http_404(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
