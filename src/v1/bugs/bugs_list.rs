#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, ApiResponse };
use anyhow::Result;

use crate::utils::bug_store::BugStore;
use crate::utils::bug_utils::{self, RequestDebug};
use crate::utils::errors::HttpResult;
use crate::v1::bugs::RespBug;
use log::error;

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct ListBugsApi {
    store: Arc<dyn BugStore>,
}

struct ReqListBugs;

impl RequestDebug for ReqListBugs {
    type Req = ReqListBugs;
    fn get_request_info(&self) -> String {
        "  * No Request Body".to_string()
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum BugResponse {
    #[oai(status = 200)]
    Http200(Json<Vec<RespBug>>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: Vec<RespBug>) -> BugResponse {
    BugResponse::Http200(Json(resp))
}
fn make_http_500(msg: String) -> BugResponse {
    BugResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ListBugsApi {
    #[oai(path = "/bugs", method = "get")]
    async fn list_bugs_api(&self, http_req: &Request) -> BugResponse {
        match self.process(http_req, &ReqListBugs) {
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
impl ListBugsApi {
    pub fn new(store: Arc<dyn BugStore>) -> Self {
        Self {store}
    }

    /// Process the request.
    fn process(&self, http_req: &Request, req: &ReqListBugs) -> Result<BugResponse> {
        // Conditional logging depending on log level.
        bug_utils::debug_request(http_req, req);

        let bugs = self.store.list_bugs()?;
        Ok(make_http_200(bugs.into_iter().map(RespBug::from).collect()))
    }
}
