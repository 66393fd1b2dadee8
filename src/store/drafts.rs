use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::{keys, load, save, KeyValueStore};

/// Snapshot of an unfinished quiz session.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub session_id: String,
    pub quiz_id: String,
    pub quiz_title: String,
    pub total_questions: usize,
    pub current_index: usize,
    pub answers: Vec<Option<String>>,
    pub favorites: Vec<bool>,
    pub notes: Vec<String>,
    pub per_question_secs: Option<u64>,
    pub total_secs: Option<u64>,
    pub total_left_secs: Option<u64>,
    pub time_left_secs: Option<u64>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub auto_next: bool,
}

/// Drafts keyed by learner session id, at most one per session.
pub struct DraftStore<S> {
    store: S,
}

impl<S: KeyValueStore> DraftStore<S> {
    pub fn new(store: S) -> Self {
        DraftStore { store }
    }

    fn drafts(&self) -> Result<HashMap<String, Draft>> {
        Ok(load(&self.store, keys::DRAFTS)?)
    }

    pub fn get(&self, session_id: &str) -> Result<Option<Draft>> {
        Ok(self.drafts()?.remove(session_id))
    }

    pub fn put(&self, draft: &Draft) -> Result<()> {
        let mut drafts = self.drafts()?;
        drafts.insert(draft.session_id.clone(), draft.clone());
        debug!(
            "Saved draft for session {} at question {}",
            draft.session_id, draft.current_index
        );
        Ok(save(&self.store, keys::DRAFTS, &drafts)?)
    }

    pub fn remove(&self, session_id: &str) -> Result<bool> {
        let mut drafts = self.drafts()?;
        if drafts.remove(session_id).is_none() {
            return Ok(false);
        }
        save(&self.store, keys::DRAFTS, &drafts)?;
        Ok(true)
    }
}

/// The learner's session id, created on first use.
pub fn session_id<S: KeyValueStore + ?Sized>(store: &S) -> Result<String> {
    if let Some(existing) = store.get(keys::SESSION_ID)? {
        let existing = existing.trim();
        if !existing.is_empty() {
            return Ok(existing.to_owned());
        }
    }
    let session_id = Utc::now().timestamp_millis().to_string();
    store.set(keys::SESSION_ID, &session_id)?;
    Ok(session_id)
}
