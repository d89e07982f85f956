// Bug storage contract and its in-memory implementation.
#![forbid(unsafe_code)]

use std::sync::{Mutex, MutexGuard};

use crate::utils::bug_types::{Bug, BugInput};
use crate::utils::bug_utils::{timestamp_utc, timestamp_utc_to_str};
use crate::utils::errors::BugStoreError;

// ***************************************************************************
//                                  Traits
// ***************************************************************************
/// Data access for bugs.  Implementations may keep records in memory or in a
/// database; handlers only see this trait.
pub trait BugStore: Send + Sync {
    /// All bugs in insertion order.
    fn list_bugs(&self) -> Result<Vec<Bug>, BugStoreError>;

    /// The bug with the given id or NotFound.
    fn get_bug(&self, id: u64) -> Result<Bug, BugStoreError>;

    /// Store a new bug under a freshly assigned id and return the stored copy.
    fn create_bug(&self, input: BugInput) -> Result<Bug, BugStoreError>;

    /// Replace the caller controlled fields of an existing bug and return the
    /// stored copy.  The id and creation time never change.
    fn update_bug(&self, id: u64, input: BugInput) -> Result<Bug, BugStoreError>;

    /// Remove a bug.  Its id is never handed out again.
    fn delete_bug(&self, id: u64) -> Result<(), BugStoreError>;
}

// ***************************************************************************
//                             In-Memory Store
// ***************************************************************************
#[derive(Debug, Default)]
struct BugState {
    bugs: Vec<Bug>,
    last_id: u64,
}

// ---------------------------------------------------------------------------
// InMemoryBugStore:
// ---------------------------------------------------------------------------
/// A BugStore that keeps everything in a vector.  One mutex guards both the
/// records and the id counter.
#[derive(Debug, Default)]
pub struct InMemoryBugStore {
    state: Mutex<BugState>,
}

impl InMemoryBugStore {
    pub fn new() -> Self {
        InMemoryBugStore::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BugState>, BugStoreError> {
        self.state
            .lock()
            .map_err(|e| BugStoreError::Internal(format!("lock poisoned: {}", e)))
    }
}

impl BugStore for InMemoryBugStore {
    fn list_bugs(&self) -> Result<Vec<Bug>, BugStoreError> {
        Ok(self.lock()?.bugs.clone())
    }

    fn get_bug(&self, id: u64) -> Result<Bug, BugStoreError> {
        self.lock()?
            .bugs
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(BugStoreError::NotFound(id))
    }

    fn create_bug(&self, input: BugInput) -> Result<Bug, BugStoreError> {
        let mut state = self.lock()?;
        state.last_id += 1;

        // Both timestamps come from the same instant.
        let now = timestamp_utc_to_str(timestamp_utc());
        let bug = Bug::new(state.last_id, input, now.clone(), now);
        state.bugs.push(bug.clone());
        Ok(bug)
    }

    fn update_bug(&self, id: u64, input: BugInput) -> Result<Bug, BugStoreError> {
        let mut state = self.lock()?;
        let bug = state
            .bugs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BugStoreError::NotFound(id))?;

        bug.title = input.title;
        bug.description = input.description;
        bug.status = input.status;
        bug.updated_at = timestamp_utc_to_str(timestamp_utc());
        Ok(bug.clone())
    }

    fn delete_bug(&self, id: u64) -> Result<(), BugStoreError> {
        let mut state = self.lock()?;
        match state.bugs.iter().position(|b| b.id == id) {
            Some(i) => {
                state.bugs.remove(i);
                Ok(())
            }
            None => Err(BugStoreError::NotFound(id)),
        }
    }
}
