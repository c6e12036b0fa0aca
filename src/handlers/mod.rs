mod auth;
mod json;
mod task;

pub use auth::{handle_login, handle_signup};
pub use json::JsonBody;
pub use task::{create_task, delete_task, get_task, list_tasks, list_user_tasks, update_task};
