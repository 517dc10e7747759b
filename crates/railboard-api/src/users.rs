//! User-identity lookup with permission degradation.
//!
//! The ladder: bulk listing first; a 403 degrades to per-id lookup; a 403
//! there disables lookup entirely and ids render literally for the rest of
//! the generation. The cache is only ever mutated by the orchestrating
//! task, even though lookups are triggered from within per-run processing.

use crate::client::ApiClient;
use crate::endpoints;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupMode {
    Bulk,
    PerId,
    Disabled,
}

/// Cached id-to-name resolution with graceful permission degradation.
#[derive(Debug)]
pub struct UserLookup {
    mode: LookupMode,
    primed: bool,
    cache: HashMap<u64, String>,
}

impl Default for UserLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl UserLookup {
    pub fn new() -> Self {
        Self {
            mode: LookupMode::Bulk,
            primed: false,
            cache: HashMap::new(),
        }
    }

    /// Resolve an assignee id to a display name. Never fails: when lookup
    /// is forbidden or the id is unknown, the literal id string is returned
    /// (and cached, so the API is not asked twice).
    pub async fn resolve(&mut self, client: &dyn ApiClient, id: u64) -> String {
        if let Some(name) = self.cache.get(&id) {
            return name.clone();
        }

        if self.mode == LookupMode::Bulk && !self.primed {
            self.prime(client).await;
            if let Some(name) = self.cache.get(&id) {
                return name.clone();
            }
        }

        if self.mode == LookupMode::PerId {
            match endpoints::get_user(client, id).await {
                Ok((user_id, name)) => {
                    self.cache.insert(user_id, name.clone());
                    return name;
                }
                Err(e) if e.is_forbidden() => {
                    warn!("per-id user lookup forbidden; ids will render literally");
                    self.mode = LookupMode::Disabled;
                }
                Err(e) => warn!("lookup of user {id} failed: {e}"),
            }
        }

        let literal = id.to_string();
        self.cache.insert(id, literal.clone());
        literal
    }

    async fn prime(&mut self, client: &dyn ApiClient) {
        self.primed = true;
        match endpoints::get_users(client).await {
            Ok(users) => {
                for (id, name) in users {
                    self.cache.insert(id, name);
                }
            }
            Err(e) if e.is_forbidden() => {
                warn!("bulk user lookup forbidden; falling back to per-id lookup");
                self.mode = LookupMode::PerId;
            }
            Err(e) => {
                warn!("bulk user lookup failed: {e}; unknown ids will render literally");
            }
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.mode == LookupMode::Disabled
    }
}
