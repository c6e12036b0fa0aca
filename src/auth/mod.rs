pub mod catalog;
pub mod credential;
pub mod evaluator;

pub use catalog::{permission, permissions_for, Role};
pub use credential::{Credential, CredentialCodec, CredentialError};
pub use evaluator::{has_permission, is_owner};
