mod task;
mod user;

pub use task::{NewTask, Task, TaskPayload, MAX_SUMMARY_CHARS};
pub use user::{AuthenticationData, LoginRequest, NewUser, SignupRequest, User, UserResponse};
