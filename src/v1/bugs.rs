#![forbid(unsafe_code)]

use poem_openapi::Object;
use serde::Deserialize;

use crate::utils::bug_types::{Bug, BugInput};
use crate::utils::bug_utils::RequestDebug;

pub mod bugs_create;
pub mod bugs_delete;
pub mod bugs_get;
pub mod bugs_list;
pub mod bugs_update;

// ***************************************************************************
//                          Shared Request/Response Definitions
// ***************************************************************************
// ---------------------------------------------------------------------------
// RespBug:
// ---------------------------------------------------------------------------
/// The wire form of a bug record.
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct RespBug
{
    id: u64,
    title: String,
    description: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<Bug> for RespBug {
    fn from(bug: Bug) -> Self {
        Self {id: bug.id, title: bug.title, description: bug.description, status: bug.status,
              created_at: bug.created_at, updated_at: bug.updated_at}
    }
}

// ---------------------------------------------------------------------------
// ReqBugFields:
// ---------------------------------------------------------------------------
/// Payload of create and update requests.  Missing fields are empty strings;
/// anything else the client sends, such as an id, is ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ReqBugFields
{
    title: String,
    description: String,
    status: String,
}

impl ReqBugFields {
    pub fn to_input(&self) -> BugInput {
        BugInput::new(self.title.clone(), self.description.clone(), self.status.clone())
    }
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqBugFields {
    type Req = ReqBugFields;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    title: ");
        s.push_str(&self.title);
        s.push_str("\n    description: ");
        s.push_str(&self.description);
        s.push_str("\n    status: ");
        s.push_str(&self.status);
        s
    }
}

// ---------------------------------------------------------------------------
// decode_bug_fields:
// ---------------------------------------------------------------------------
/** Decode a create or update body as JSON whatever Content-Type the client
 * sent.  Empty and malformed bodies are rejected with a message suitable for
 * a 400 response.
 */
pub fn decode_bug_fields(body: &[u8]) -> Result<ReqBugFields, String> {
    serde_json::from_slice(body).map_err(|e| format!("Invalid bug body: {}", e))
}

// ---------------------------------------------------------------------------
// parse_bug_id:
// ---------------------------------------------------------------------------
/** Convert a path segment into a bug id.  Ids are non-negative and fit in an
 * i64; anything else, including negative and overflowing numbers, is rejected 
 * with a message suitable for a 400 response.
 */
pub fn parse_bug_id(raw: &str) -> Result<u64, String> {
    match raw.parse::<i64>() {
        Ok(id) => u64::try_from(id).map_err(|_| format!("Invalid bug ID: {}", raw)),
        Err(_) => Err(format!("Invalid bug ID: {}", raw)),
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::{decode_bug_fields, parse_bug_id};

    #[test]
    fn bug_ids() {
        assert_eq!(parse_bug_id("0"), Ok(0));
        assert_eq!(parse_bug_id("42"), Ok(42));
        assert!(parse_bug_id("abc").is_err());
        assert!(parse_bug_id("-1").is_err());
        assert!(parse_bug_id("12345679012345678901234567890").is_err());
        assert!(parse_bug_id("").is_err());
        assert!(parse_bug_id("9223372036854775808").is_err());
        assert!(parse_bug_id("18446744073709551615").is_err());
        assert_eq!(parse_bug_id("9223372036854775807"), Ok(i64::MAX as u64));
    }

    #[test]
    fn bug_bodies() {
        let fields = decode_bug_fields(br#"{"id": 7, "title": "t", "status": "New"}"#).unwrap();
        assert_eq!(fields.title, "t");
        assert_eq!(fields.description, "");
        assert_eq!(fields.status, "New");

        assert!(decode_bug_fields(b"").is_err());
        assert!(decode_bug_fields(b"{not json").is_err());
        assert!(decode_bug_fields(br#"{"title": 5}"#).is_err());
    }
}
