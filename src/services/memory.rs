use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::models::{NewTask, NewUser, Task, User};
use crate::services::store::{StoreError, StoreResult, TaskStore, UserStore};

#[derive(Default)]
struct Tables {
    tasks: BTreeMap<u64, Task>,
    users: BTreeMap<u64, User>,
    users_by_email: HashMap<String, u64>,
    last_task_id: u64,
    last_user_id: u64,
}

/// Process-local storage. Each call takes the lock once, so every write is
/// atomic per record.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write();
        tables.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.last_task_id,
            summary: task.summary,
            user_id: task.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: u64) -> StoreResult<Task> {
        self.tables
            .read()
            .tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_summary(&self, id: u64, summary: &str) -> StoreResult<Task> {
        let mut tables = self.tables.write();
        let task = tables.tasks.get_mut(&id).ok_or(StoreError::NotFound)?;
        task.summary = summary.to_string();
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        self.tables
            .write()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        Ok(self.tables.read().tasks.values().cloned().collect())
    }

    async fn list_by_owner(&self, owner_id: u64) -> StoreResult<Vec<Task>> {
        Ok(self
            .tables
            .read()
            .tasks
            .values()
            .filter(|task| task.user_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write();
        if tables.users_by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict("email already taken".into()));
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users_by_email.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let tables = self.tables.read();
        tables
            .users_by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn new_task(owner: u64, summary: &str) -> NewTask {
        NewTask {
            summary: summary.into(),
            user_id: owner,
        }
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Technician,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_from_one() {
        let store = MemoryStore::new();
        let first = TaskStore::create(&store, new_task(1, "a")).await.unwrap();
        let second = TaskStore::create(&store, new_task(1, "b")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
    }

    #[tokio::test]
    async fn update_keeps_owner_and_creation_time() {
        let store = MemoryStore::new();
        let task = TaskStore::create(&store, new_task(7, "old")).await.unwrap();
        let updated = store.update_summary(task.id, "new").await.unwrap();

        assert_eq!(updated.summary, "new");
        assert_eq!(updated.user_id, 7);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn list_by_owner_filters() {
        let store = MemoryStore::new();
        TaskStore::create(&store, new_task(1, "a")).await.unwrap();
        TaskStore::create(&store, new_task(2, "b")).await.unwrap();
        TaskStore::create(&store, new_task(1, "c")).await.unwrap();

        let mine = store.list_by_owner(1).await.unwrap();
        assert_eq!(
            mine.iter().map(|t| t.summary.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(TaskStore::get(&store, 9).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(9).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.update_summary(9, "x").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.get_by_email("nobody@example.com").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("ana@example.com"))
            .await
            .unwrap();
        let err = UserStore::create(&store, new_user("ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
