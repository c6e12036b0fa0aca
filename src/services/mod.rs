pub mod accounts;
pub mod memory;
pub mod notifier;
pub mod redis_service;
pub mod store;
pub mod task_access;

pub use accounts::AccountService;
pub use memory::MemoryStore;
pub use notifier::{LogNotifier, Notifier, NotifyError, RedisNotifier};
pub use redis_service::RedisService;
pub use store::{StoreError, StoreResult, TaskStore, UserStore};
pub use task_access::{TaskAccessController, TaskOperation};
