//! Allow/deny decisions over a decoded credential.
//!
//! Permission and ownership are checked separately: list-all and delete are
//! gated on permission alone, get-one and update need both.

use crate::auth::credential::Credential;

/// Exact-match scan of the embedded permission list.
pub fn has_permission(credential: &Credential, required: &str) -> bool {
    credential.permissions.iter().any(|p| p == required)
}

pub fn is_owner(subject_id: u64, owner_id: u64) -> bool {
    subject_id == owner_id
}

impl Credential {
    pub fn has_permission(&self, required: &str) -> bool {
        has_permission(self, required)
    }

    pub fn owns(&self, owner_id: u64) -> bool {
        is_owner(self.subject_id, owner_id)
    }
}
