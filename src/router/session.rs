use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const LOGGED_IN_KEY: &str = "isLoggedIn";
pub const ONBOARDING_COMPLETED_KEY: &str = "userOnboardingCompleted";

/// Read access to the persisted string flags written by the login and
/// onboarding flows.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
}

impl SessionStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl SessionStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Snapshot of persisted storage kept as a flat JSON object on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonFileStore {
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// A missing file is an empty store.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "session file missing, using empty session");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let store = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse session file {}: {}", path.display(), e))?;
        Ok(store)
    }
}

impl SessionStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Authentication and onboarding flags the guards decide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub logged_in: bool,
    pub onboarding_completed: bool,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(onboarding_completed: bool) -> Self {
        Self {
            logged_in: true,
            onboarding_completed,
        }
    }

    /// Only the literal `"true"` counts as logged in; onboarding counts as
    /// completed for any non-empty value.
    pub fn from_store<S: SessionStore + ?Sized>(store: &S) -> Self {
        Self {
            logged_in: store.get(LOGGED_IN_KEY).as_deref() == Some("true"),
            onboarding_completed: store
                .get(ONBOARDING_COMPLETED_KEY)
                .is_some_and(|value| !value.is_empty()),
        }
    }
}
