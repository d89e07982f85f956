#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, ApiResponse };
use anyhow::Result;

use crate::utils::bug_store::BugStore;
use crate::utils::bug_utils;
use crate::utils::errors::HttpResult;
use crate::v1::bugs::{decode_bug_fields, ReqBugFields, RespBug};
use log::{error, info};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct CreateBugApi {
    store: Arc<dyn BugStore>,
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
enum BugResponse {
    #[oai(status = 201)]
    Http201(Json<RespBug>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_201(resp: RespBug) -> BugResponse {
    BugResponse::Http201(Json(resp))
}
fn make_http_400(msg: String) -> BugResponse {
    BugResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
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
impl CreateBugApi {
    #[oai(path = "/bugs", method = "post")]
    async fn create_bug_api(&self, http_req: &Request, body: Vec<u8>) -> BugResponse {
        // The body is JSON whatever the Content-Type header says.
        let req = match decode_bug_fields(&body) {
            Ok(r) => r,
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
impl CreateBugApi {
    pub fn new(store: Arc<dyn BugStore>) -> Self {
        Self {store}
    }

    /// Process the request.
    fn process(&self, http_req: &Request, req: &ReqBugFields) -> Result<BugResponse> {
        // Conditional logging depending on log level.
        bug_utils::debug_request(http_req, req);

        let bug = self.store.create_bug(req.to_input())?;
        info!("Bug #{} created: '{}'.", bug.id, bug.title);
        Ok(make_http_201(bug.into()))
    }
}
