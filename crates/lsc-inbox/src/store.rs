//! The submission store.
//!
//! All submissions live as one JSON array under a single key, newest first.
//! Every operation reads the whole array, changes it, and writes the whole
//! array back. Nothing is indexed and nothing is cached.
//!
//! Reads never fail because of what is stored: a missing key is an empty
//! list, and entries that don't decode as a [`Submission`] are skipped with a
//! warning. So that skipped entries aren't destroyed by the next write, every
//! write first appends them to a quarantine key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::submission::{Payload, Submission};

/// Default key holding the submission list.
pub const SUBMISSIONS_KEY: &str = "site_submissions";

/// Default key holding the admin flag.
pub const ADMIN_KEY: &str = "admin_authenticated";

/// Default key holding raw entries that failed to decode.
pub const QUARANTINE_KEY: &str = "site_submissions_quarantine";

/// The stored value that means "authenticated".
const ADMIN_FLAG_VALUE: &str = "true";

/// Storage keys used by a [`SubmissionStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Key of the JSON array of submissions.
    pub submissions: String,
    /// Key of the admin flag.
    pub admin: String,
    /// Key of the JSON array of quarantined raw entries.
    pub quarantine: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            submissions: SUBMISSIONS_KEY.to_string(),
            admin: ADMIN_KEY.to_string(),
            quarantine: QUARANTINE_KEY.to_string(),
        }
    }
}

/// Result of reading the submission list.
#[derive(Debug, Default)]
struct Loaded {
    submissions: Vec<Submission>,
    rejected: Vec<Value>,
}

/// Submission list and admin flag on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct SubmissionStore<S> {
    backend: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> SubmissionStore<S> {
    /// Create a store using the default keys.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self::with_keys(backend, StorageKeys::default())
    }

    /// Create a store using custom keys.
    #[must_use]
    pub fn with_keys(backend: S, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    /// The underlying key-value backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// The keys this store reads and writes.
    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Append a new unread submission at the front of the list.
    ///
    /// Returns the stored submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn save(&self, payload: impl Into<Payload>) -> Result<Submission> {
        let submission = Submission::new(payload);
        let mut loaded = self.load()?;
        loaded.submissions.insert(0, submission.clone());
        self.persist(&loaded)?;

        info!(id = %submission.id, kind = %submission.kind(), "saved submission");
        Ok(submission)
    }

    /// All decodable submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn all(&self) -> Result<Vec<Submission>> {
        Ok(self.load()?.submissions)
    }

    /// Mark a submission read. Returns `false` (and writes nothing) if no
    /// submission has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn mark_read(&self, id: &str) -> Result<bool> {
        self.set_read(id, true)
    }

    /// Mark a submission unread. Returns `false` (and writes nothing) if no
    /// submission has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn mark_unread(&self, id: &str) -> Result<bool> {
        self.set_read(id, false)
    }

    fn set_read(&self, id: &str, read: bool) -> Result<bool> {
        let mut loaded = self.load()?;
        let Some(submission) = loaded.submissions.iter_mut().find(|s| s.id == id) else {
            debug!(id, "no submission to mark");
            return Ok(false);
        };
        submission.read = read;
        self.persist(&loaded)?;

        info!(id, read, "updated read state");
        Ok(true)
    }

    /// Remove every submission with the given id, keeping the order of the
    /// rest. The filtered list is written back even when nothing matched.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut loaded = self.load()?;
        let before = loaded.submissions.len();
        loaded.submissions.retain(|s| s.id != id);
        let removed = loaded.submissions.len() < before;
        self.persist(&loaded)?;

        if removed {
            info!(id, "deleted submission");
        }
        Ok(removed)
    }

    /// Remove the whole submission list. Quarantined entries are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn clear_all(&self) -> Result<()> {
        self.backend.remove(&self.keys.submissions)?;
        info!("cleared all submissions");
        Ok(())
    }

    /// Number of unread submissions, counted fresh on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn unread_count(&self) -> Result<usize> {
        Ok(self.all()?.iter().filter(|s| !s.read).count())
    }

    /// Set or clear the admin flag.
    ///
    /// This is a convenience gate for the dashboard, not a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn set_admin_authenticated(&self, value: bool) -> Result<()> {
        if value {
            self.backend.set(&self.keys.admin, ADMIN_FLAG_VALUE)?;
        } else {
            self.backend.remove(&self.keys.admin)?;
        }
        info!(authenticated = value, "admin flag updated");
        Ok(())
    }

    /// Whether the admin flag is set to exactly `"true"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn is_admin_authenticated(&self) -> Result<bool> {
        Ok(self.backend.get(&self.keys.admin)?.as_deref() == Some(ADMIN_FLAG_VALUE))
    }

    /// Raw entries set aside because they failed to decode.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn quarantined(&self) -> Result<Vec<Value>> {
        Ok(self
            .backend
            .get(&self.keys.quarantine)?
            .map(|raw| parse_quarantine(&raw))
            .unwrap_or_default())
    }

    /// Drop all quarantined entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn clear_quarantine(&self) -> Result<()> {
        self.backend.remove(&self.keys.quarantine)
    }

    fn load(&self) -> Result<Loaded> {
        let Some(raw) = self.backend.get(&self.keys.submissions)? else {
            return Ok(Loaded::default());
        };
        if raw.trim().is_empty() {
            return Ok(Loaded::default());
        }
        let loaded = decode_list(&raw);
        debug!(
            count = loaded.submissions.len(),
            rejected = loaded.rejected.len(),
            "loaded submissions"
        );
        Ok(loaded)
    }

    fn persist(&self, loaded: &Loaded) -> Result<()> {
        if !loaded.rejected.is_empty() {
            self.quarantine(&loaded.rejected)?;
        }
        let encoded = serde_json::to_string(&loaded.submissions)?;
        self.backend.set(&self.keys.submissions, &encoded)
    }

    /// Append rejected values to the quarantine key. Values already held are
    /// skipped: a list write that fails after this leaves them in the list,
    /// and the next write rejects them again.
    fn quarantine(&self, rejected: &[Value]) -> Result<()> {
        let mut held = self.quarantined()?;
        let fresh: Vec<Value> = rejected
            .iter()
            .filter(|value| !held.contains(value))
            .cloned()
            .collect();
        if fresh.is_empty() {
            debug!("rejected submissions already quarantined");
            return Ok(());
        }
        held.extend_from_slice(&fresh);
        self.backend
            .set(&self.keys.quarantine, &serde_json::to_string(&held)?)?;

        warn!(
            count = fresh.len(),
            key = %self.keys.quarantine,
            "moved undecodable submissions to quarantine"
        );
        Ok(())
    }
}

/// Decode a stored list, separating good entries from bad ones.
fn decode_list(raw: &str) -> Loaded {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            warn!("stored submissions are not a JSON array; treating as empty");
            return Loaded {
                submissions: Vec::new(),
                rejected: vec![other],
            };
        }
        Err(e) => {
            warn!(error = %e, "stored submissions are not valid JSON; treating as empty");
            return Loaded {
                submissions: Vec::new(),
                rejected: vec![Value::String(raw.to_string())],
            };
        }
    };

    let mut loaded = Loaded::default();
    for item in items {
        match Submission::deserialize(&item) {
            Ok(submission) => loaded.submissions.push(submission),
            Err(e) => {
                warn!(error = %e, "skipping undecodable submission");
                loaded.rejected.push(item);
            }
        }
    }
    loaded
}

fn parse_quarantine(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => vec![other],
        Err(_) => vec![Value::String(raw.to_string())],
    }
}
