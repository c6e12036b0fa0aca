//! Permission catalog: the closed set of roles and the permission tags each
//! one is granted when a credential is issued.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission tags. Membership checks are exact string equality.
pub mod permission {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const GET_ONE: &str = "get_one";
    pub const LIST_OWN_TASKS: &str = "list_own_tasks";
    pub const LIST: &str = "list";
    pub const DELETE: &str = "delete";
    pub const NOTIFIED: &str = "notified";
}

const TECHNICIAN_PERMISSIONS: &[&str] = &[
    permission::CREATE,
    permission::UPDATE,
    permission::GET_ONE,
    permission::LIST_OWN_TASKS,
];

const MANAGER_PERMISSIONS: &[&str] = &[permission::LIST, permission::DELETE, permission::NOTIFIED];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Technician,
    Manager,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Technician, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Technician => "Technician",
            Role::Manager => "Manager",
        }
    }

    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Technician => TECHNICIAN_PERMISSIONS,
            Role::Manager => MANAGER_PERMISSIONS,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Owned copy of the permission list for `role`, in catalog order.
pub fn permissions_for(role: Role) -> Vec<String> {
    role.permissions().iter().map(|p| p.to_string()).collect()
}
