//! # Task access controller
//!
//! One pass per request: permission check, then (for single-task operations)
//! the lookup, then the ownership check, then the storage call. A failed
//! permission check never reaches storage; a missing task is reported as
//! not found before ownership is considered.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{permission, Credential};
use crate::errors::{AppError, AppResult};
use crate::models::{NewTask, Task, TaskPayload};
use crate::services::notifier::{task_created_message, Notifier};
use crate::services::store::TaskStore;

/// The operations the controller gates, with their required permission and
/// the message returned when that permission is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOperation {
    Create,
    Update,
    GetOne,
    ListOwn,
    ListAll,
    Delete,
}

impl TaskOperation {
    pub fn required_permission(&self) -> &'static str {
        match self {
            TaskOperation::Create => permission::CREATE,
            TaskOperation::Update => permission::UPDATE,
            TaskOperation::GetOne => permission::GET_ONE,
            TaskOperation::ListOwn => permission::LIST_OWN_TASKS,
            TaskOperation::ListAll => permission::LIST,
            TaskOperation::Delete => permission::DELETE,
        }
    }

    fn denied_message(&self) -> &'static str {
        match self {
            TaskOperation::Create => "The user doesn't have the right permission to create a task",
            TaskOperation::Update => "The user doesn't have the right permission to update a task",
            TaskOperation::GetOne => {
                "The user doesn't have the right permission to get a specific task"
            }
            TaskOperation::ListOwn => "The user doesn't have the right permission to list his tasks",
            TaskOperation::ListAll => "The user doesn't have the right permission to get all tasks",
            TaskOperation::Delete => {
                "The user doesn't have the right permission to delete a specific task"
            }
        }
    }
}

fn parse_task_id(raw: &str) -> AppResult<u64> {
    raw.parse::<u64>().map_err(|_| {
        AppError::BadRequest(format!("not possible to convert {} into a number", raw))
    })
}

#[derive(Clone)]
pub struct TaskAccessController {
    store: Arc<dyn TaskStore>,
    notifier: Arc<dyn Notifier>,
}

impl TaskAccessController {
    pub fn new(store: Arc<dyn TaskStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn authorize(&self, credential: &Credential, operation: TaskOperation) -> AppResult<()> {
        if credential.has_permission(operation.required_permission()) {
            debug!(subject = credential.subject_id, ?operation, "permission granted");
            Ok(())
        } else {
            warn!(subject = credential.subject_id, ?operation, "permission denied");
            Err(AppError::Forbidden(operation.denied_message().to_string()))
        }
    }

    /// Loads the task and checks the requester owns it.
    async fn load_owned(
        &self,
        credential: &Credential,
        id: u64,
        mismatch: &'static str,
    ) -> AppResult<Task> {
        let task = self.store.get(id).await?;
        if !credential.owns(task.user_id) {
            warn!(
                subject = credential.subject_id,
                task_id = id,
                owner = task.user_id,
                "ownership mismatch"
            );
            return Err(AppError::Forbidden(mismatch.to_string()));
        }
        Ok(task)
    }

    /// The body is decoded by the caller but only inspected once the
    /// permission check has passed, so a denied request never reports a
    /// body problem.
    pub async fn create(
        &self,
        credential: &Credential,
        body: AppResult<TaskPayload>,
    ) -> AppResult<Task> {
        self.authorize(credential, TaskOperation::Create)?;

        let payload = body?;
        if let Some(claimed) = payload.user_id.filter(|id| *id != credential.subject_id) {
            debug!(claimed, subject = credential.subject_id, "ignoring owner from request body");
        }
        payload.validate()?;

        let task = self
            .store
            .create(NewTask {
                summary: payload.summary,
                user_id: credential.subject_id,
            })
            .await?;
        info!(task_id = task.id, owner = task.user_id, "task created");

        let message = task_created_message(credential.subject_id, task.id, task.created_at);
        if let Err(e) = self.notifier.publish(&message).await {
            warn!(error = %e, task_id = task.id, "task notification failed");
        }

        Ok(task)
    }

    pub async fn update(
        &self,
        credential: &Credential,
        raw_id: &str,
        body: AppResult<TaskPayload>,
    ) -> AppResult<Task> {
        self.authorize(credential, TaskOperation::Update)?;
        let id = parse_task_id(raw_id)?;
        self.load_owned(
            credential,
            id,
            "Not possible to update a task that does not belong to you",
        )
        .await?;

        let payload = body?;
        payload.validate()?;

        let task = self.store.update_summary(id, &payload.summary).await?;
        info!(task_id = id, "task updated");
        Ok(task)
    }

    pub async fn get_one(&self, credential: &Credential, raw_id: &str) -> AppResult<Task> {
        self.authorize(credential, TaskOperation::GetOne)?;
        let id = parse_task_id(raw_id)?;
        self.load_owned(
            credential,
            id,
            "Not possible to see a task that does not belong to you",
        )
        .await
    }

    pub async fn list_own(&self, credential: &Credential) -> AppResult<Vec<Task>> {
        self.authorize(credential, TaskOperation::ListOwn)?;
        Ok(self.store.list_by_owner(credential.subject_id).await?)
    }

    pub async fn list_all(&self, credential: &Credential) -> AppResult<Vec<Task>> {
        self.authorize(credential, TaskOperation::ListAll)?;
        Ok(self.store.list_all().await?)
    }

    /// Permission-gated only: any holder of `delete` may remove any task.
    pub async fn delete(&self, credential: &Credential, raw_id: &str) -> AppResult<()> {
        self.authorize(credential, TaskOperation::Delete)?;
        let id = parse_task_id(raw_id)?;
        self.store.delete(id).await?;
        info!(task_id = id, subject = credential.subject_id, "task deleted");
        Ok(())
    }
}
