//! # Draft Lock Protocol
//!
//! A draft is either unlocked or leased to one holder until `expires_at`.
//!
//! - an actor may acquire when the draft is unlocked, the lease has
//!   expired, or it already holds the lease (refresh)
//! - any other acquisition is a conflict and leaves the lease untouched
//! - there is no release; leases end by expiring
//!
//! Stores apply [`DraftLock::acquire`] under their own atomic update.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLock {
    pub draft_id: String,
    pub holder_id: String,
    pub expires_at: DateTime<Utc>,
}

impl DraftLock {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// `actor_id` holds a lease that is still valid at `now`
    pub fn is_held_by(&self, actor_id: &str, now: DateTime<Utc>) -> bool {
        self.holder_id == actor_id && !self.is_expired(now)
    }

    /// Lock transition for `actor_id` against the `current` lease.
    ///
    /// Returns the new lease, or the holder that blocks acquisition.
    pub fn acquire(
        current: Option<&DraftLock>,
        draft_id: &str,
        actor_id: &str,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> Result<DraftLock, String> {
        match current {
            Some(lock) if !lock.is_expired(now) && lock.holder_id != actor_id => {
                Err(lock.holder_id.clone())
            }
            _ => Ok(DraftLock {
                draft_id: draft_id.to_string(),
                holder_id: actor_id.to_string(),
                expires_at: now + lease,
            }),
        }
    }

    /// Push the expiry out by a fresh lease
    pub fn refresh(&mut self, now: DateTime<Utc>, lease: Duration) {
        self.expires_at = now + lease;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    Acquired { expires_at: DateTime<Utc> },

    /// Locked by another user
    Conflict { holder: String },
}

impl LockOutcome {
    pub fn is_acquired(&self) -> bool {
        matches!(self, LockOutcome::Acquired { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockConfig {
    #[serde(default = "default_lease_seconds")]
    pub lease_seconds: i64,
}

fn default_lease_seconds() -> i64 {
    300
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            lease_seconds: default_lease_seconds(),
        }
    }
}

impl LockConfig {
    pub fn lease(&self) -> Duration {
        Duration::seconds(self.lease_seconds)
    }
}
