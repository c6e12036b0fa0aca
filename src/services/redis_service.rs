use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client};

use crate::models::{NewTask, NewUser, Task, User};
use crate::services::store::{StoreError, StoreResult, TaskStore, UserStore};

const TASK_SEQUENCE: &str = "task:seq";
const TASK_INDEX: &str = "tasks";
const USER_SEQUENCE: &str = "user:seq";

fn task_key(id: u64) -> String {
    format!("task:{}", id)
}

fn owner_index_key(owner_id: u64) -> String {
    format!("user_tasks:{}", owner_id)
}

fn user_key(id: u64) -> String {
    format!("user:{}", id)
}

fn email_key(email: &str) -> String {
    format!("user_email:{}", email)
}

/// Redis-backed storage for users and tasks. Records are JSON strings;
/// ids come from `INCR` sequences and set indexes back the list queries.
pub struct RedisService {
    client: Arc<Client>,
}

impl RedisService {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    async fn load_tasks(&self, ids: Vec<u64>) -> StoreResult<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.client.get_async_connection().await?;
        let keys: Vec<String> = ids.into_iter().map(task_key).collect();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut tasks = values
            .into_iter()
            .flatten()
            .map(|data| serde_json::from_str::<Task>(&data))
            .collect::<Result<Vec<_>, _>>()?;
        tasks.sort_by_key(|task| task.id);
        Ok(tasks)
    }
}

#[async_trait]
impl TaskStore for RedisService {
    async fn create(&self, task: NewTask) -> StoreResult<Task> {
        let mut conn = self.client.get_async_connection().await?;
        let id: u64 = conn.incr(TASK_SEQUENCE, 1).await?;
        let now = Utc::now();
        let task = Task {
            id,
            summary: task.summary,
            user_id: task.user_id,
            created_at: now,
            updated_at: now,
        };

        // Record and both indexes land in one MULTI/EXEC.
        redis::pipe()
            .atomic()
            .set(task_key(id), serde_json::to_string(&task)?)
            .ignore()
            .sadd(TASK_INDEX, id)
            .ignore()
            .sadd(owner_index_key(task.user_id), id)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        tracing::debug!(task_id = id, owner = task.user_id, "task stored");
        Ok(task)
    }

    async fn get(&self, id: u64) -> StoreResult<Task> {
        let mut conn = self.client.get_async_connection().await?;
        let data: Option<String> = conn.get(task_key(id)).await?;
        match data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(StoreError::NotFound),
        }
    }

    async fn update_summary(&self, id: u64, summary: &str) -> StoreResult<Task> {
        let mut task = TaskStore::get(self, id).await?;
        task.summary = summary.to_string();
        task.updated_at = Utc::now();

        // XX: a task deleted since the read above stays deleted.
        let mut conn = self.client.get_async_connection().await?;
        let written: Option<String> = redis::cmd("SET")
            .arg(task_key(id))
            .arg(serde_json::to_string(&task)?)
            .arg("XX")
            .query_async(&mut conn)
            .await?;
        if written.is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(task)
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let task = TaskStore::get(self, id).await?;

        let mut conn = self.client.get_async_connection().await?;
        let (removed,): (u64,) = redis::pipe()
            .atomic()
            .del(task_key(id))
            .srem(TASK_INDEX, id)
            .ignore()
            .srem(owner_index_key(task.user_id), id)
            .ignore()
            .query_async(&mut conn)
            .await?;
        if removed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        let mut conn = self.client.get_async_connection().await?;
        let ids: Vec<u64> = conn.smembers(TASK_INDEX).await?;
        self.load_tasks(ids).await
    }

    async fn list_by_owner(&self, owner_id: u64) -> StoreResult<Vec<Task>> {
        let mut conn = self.client.get_async_connection().await?;
        let ids: Vec<u64> = conn.smembers(owner_index_key(owner_id)).await?;
        self.load_tasks(ids).await
    }
}

#[async_trait]
impl UserStore for RedisService {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut conn = self.client.get_async_connection().await?;
        let id: u64 = conn.incr(USER_SEQUENCE, 1).await?;

        let now = Utc::now();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        let data = serde_json::to_string(&user)?;

        // The record is written before the email index claims it, so the
        // index never points at a user that does not exist.
        conn.set::<_, _, ()>(user_key(id), data).await?;

        // The email index doubles as the uniqueness constraint.
        let claimed = match conn.set_nx::<_, _, bool>(email_key(&user.email), id).await {
            Ok(claimed) => claimed,
            Err(e) => {
                let _: Result<(), _> = conn.del(user_key(id)).await;
                return Err(e.into());
            }
        };
        if !claimed {
            conn.del::<_, ()>(user_key(id)).await?;
            return Err(StoreError::Conflict("email already taken".into()));
        }

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let mut conn = self.client.get_async_connection().await?;
        let id: Option<u64> = conn.get(email_key(email)).await?;
        let id = id.ok_or(StoreError::NotFound)?;

        let data: Option<String> = conn.get(user_key(id)).await?;
        match data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(StoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    // Needs a live server: REDIS_URL=redis://... cargo test -- --ignored
    fn store() -> RedisService {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        RedisService::new(Arc::new(Client::open(url).unwrap()))
    }

    // Owner ids and emails that cannot collide with earlier runs.
    fn unique() -> u64 {
        Utc::now().timestamp_nanos_opt().unwrap() as u64
    }

    async fn members(store: &RedisService, key: &str) -> Vec<u64> {
        let mut conn = store.client.get_async_connection().await.unwrap();
        conn.smembers(key).await.unwrap()
    }

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
    #[ignore]
    async fn created_task_reads_back() {
        let store = store();
        let owner = unique();
        let task = TaskStore::create(&store, new_task(owner, "fix the pump"))
            .await
            .unwrap();

        let loaded = TaskStore::get(&store, task.id).await.unwrap();
        assert_eq!(loaded.summary, "fix the pump");
        assert_eq!(loaded.user_id, owner);
        assert_eq!(loaded.created_at, task.created_at);
        assert!(members(&store, TASK_INDEX).await.contains(&task.id));
    }

    #[tokio::test]
    #[ignore]
    async fn list_by_owner_filters() {
        let store = store();
        let owner = unique();
        let a = TaskStore::create(&store, new_task(owner, "a")).await.unwrap();
        TaskStore::create(&store, new_task(owner + 1, "b")).await.unwrap();
        let c = TaskStore::create(&store, new_task(owner, "c")).await.unwrap();

        let mine = store.list_by_owner(owner).await.unwrap();
        assert_eq!(
            mine.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![a.id, c.id]
        );
    }

    #[tokio::test]
    #[ignore]
    async fn delete_clears_both_indexes() {
        let store = store();
        let owner = unique();
        let task = TaskStore::create(&store, new_task(owner, "gone")).await.unwrap();

        store.delete(task.id).await.unwrap();

        assert!(matches!(TaskStore::get(&store, task.id).await, Err(StoreError::NotFound)));
        assert!(!members(&store, TASK_INDEX).await.contains(&task.id));
        assert!(members(&store, &owner_index_key(owner)).await.is_empty());
        assert!(matches!(store.delete(task.id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    #[ignore]
    async fn update_on_missing_task_is_not_found() {
        let store = store();
        let task = TaskStore::create(&store, new_task(unique(), "old")).await.unwrap();
        store.delete(task.id).await.unwrap();

        assert!(matches!(
            store.update_summary(task.id, "new").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(TaskStore::get(&store, task.id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    #[ignore]
    async fn update_keeps_owner_and_creation_time() {
        let store = store();
        let owner = unique();
        let task = TaskStore::create(&store, new_task(owner, "old")).await.unwrap();

        let updated = store.update_summary(task.id, "new").await.unwrap();
        let loaded = TaskStore::get(&store, task.id).await.unwrap();
        assert_eq!(loaded.summary, "new");
        assert_eq!(loaded.user_id, owner);
        assert_eq!(loaded.created_at, task.created_at);
        assert_eq!(loaded.updated_at, updated.updated_at);
    }

    #[tokio::test]
    #[ignore]
    async fn duplicate_email_conflicts_and_keeps_first_user() {
        let store = store();
        let email = format!("ana+{}@example.com", unique());
        let first = UserStore::create(&store, new_user(&email)).await.unwrap();

        let err = UserStore::create(&store, new_user(&email)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let found = store.get_by_email(&email).await.unwrap();
        assert_eq!(found.id, first.id);
        assert!(matches!(
            store.get_by_email("nobody@example.invalid").await,
            Err(StoreError::NotFound)
        ));
    }
}
