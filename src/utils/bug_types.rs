// This file contains the bug record structs.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bug:
// ---------------------------------------------------------------------------
/// A stored bug record.  The id and both timestamps are owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Bug {
    pub fn new(id: u64, input: BugInput, created_at: String, updated_at: String) -> Bug {
        Bug {
            id,
            title: input.title,
            description: input.description,
            status: input.status,
            created_at,
            updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// BugInput:
// ---------------------------------------------------------------------------
/// The caller controlled fields of a bug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugInput {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl BugInput {
    pub fn new(title: String, description: String, status: String) -> BugInput {
        BugInput {title, description, status}
    }
}
