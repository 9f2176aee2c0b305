//! Postgres adapter for [`TodoStore`]. Expects the tables from `migrations/0001_todo.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{MediaType, PermissionType, PriorityType, StatusType, TodoItem, TodoList, TodoListShare, User};
use crate::database::store::{StoreError, TodoStore};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, FromRow)]
struct ListRow {
    id: Uuid,
    title: Option<String>,
    owner_id: Uuid,
    version: i64,
}

impl From<ListRow> for TodoList {
    fn from(row: ListRow) -> Self {
        TodoList {
            id: row.id,
            title: row.title,
            owner_id: row.owner_id,
            version: row.version,
            items: Vec::new(),
            shares: Vec::new(),
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    list_id: Uuid,
    name: String,
    description: String,
    due_date: Option<DateTime<Utc>>,
    status: String,
    priority: String,
    media_url: Option<String>,
    media_type: Option<String>,
}

impl TryFrom<ItemRow> for TodoItem {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let status = StatusType::from_raw(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("item {} status '{}'", row.id, row.status)))?;
        let priority = PriorityType::from_raw(&row.priority)
            .ok_or_else(|| StoreError::Corrupt(format!("item {} priority '{}'", row.id, row.priority)))?;
        let media_type = match row.media_type.as_deref() {
            Some(raw) => Some(
                MediaType::from_raw(raw)
                    .ok_or_else(|| StoreError::Corrupt(format!("item {} media type '{}'", row.id, raw)))?,
            ),
            None => None,
        };
        Ok(TodoItem {
            id: row.id,
            list_id: row.list_id,
            name: row.name,
            description: row.description,
            due_date: row.due_date,
            status,
            priority,
            media_url: row.media_url,
            media_type,
        })
    }
}

#[derive(Debug, FromRow)]
struct ShareRow {
    id: Uuid,
    list_id: Uuid,
    shared_with_user_id: Uuid,
    permission: String,
}

impl TryFrom<ShareRow> for TodoListShare {
    type Error = StoreError;

    fn try_from(row: ShareRow) -> Result<Self, Self::Error> {
        let permission = PermissionType::from_raw(&row.permission)
            .ok_or_else(|| StoreError::Corrupt(format!("share {} permission '{}'", row.id, row.permission)))?;
        Ok(TodoListShare {
            id: row.id,
            list_id: row.list_id,
            shared_with_user_id: row.shared_with_user_id,
            permission,
        })
    }
}

const ITEM_COLUMNS: &str =
    "id, list_id, name, description, due_date, status, priority, media_url, media_type";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compare-and-set bump of the list version inside `tx`.
    async fn bump_version(
        tx: &mut Transaction<'_, Postgres>,
        list_id: Uuid,
        expected: i64,
    ) -> Result<i64, StoreError> {
        let bumped: Option<(i64,)> = sqlx::query_as(
            "UPDATE todo_lists SET version = version + 1 WHERE id = $1 AND version = $2 RETURNING version",
        )
        .bind(list_id)
        .bind(expected)
        .fetch_optional(&mut **tx)
        .await?;

        match bumped {
            Some((version,)) => Ok(version),
            None => Err(Self::version_mismatch(&mut **tx, list_id, expected).await),
        }
    }

    /// Explain why a compare-and-set matched no row.
    async fn version_mismatch<'e, E>(executor: E, list_id: Uuid, expected: i64) -> StoreError
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let current: Result<Option<(i64,)>, sqlx::Error> =
            sqlx::query_as("SELECT version FROM todo_lists WHERE id = $1")
                .bind(list_id)
                .fetch_optional(executor)
                .await;
        match current {
            Ok(Some((actual,))) => StoreError::Conflict { list_id, expected, actual },
            Ok(None) => StoreError::NotFound(format!("list {}", list_id)),
            Err(e) => e.into(),
        }
    }

    async fn items_for(&self, list_ids: &[Uuid]) -> Result<Vec<TodoItem>, StoreError> {
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM todo_items WHERE list_id = ANY($1) ORDER BY seq",
            ITEM_COLUMNS
        ))
        .bind(list_ids)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TodoItem::try_from).collect()
    }

    async fn shares_for(&self, list_ids: &[Uuid]) -> Result<Vec<TodoListShare>, StoreError> {
        let rows: Vec<ShareRow> = sqlx::query_as(
            "SELECT id, list_id, shared_with_user_id, permission FROM todo_list_shares WHERE list_id = ANY($1)",
        )
        .bind(list_ids)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TodoListShare::try_from).collect()
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (id, display_name, created_at) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.display_name)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate(format!("user {}", user.display_name))
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, display_name, created_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_name(&self, display_name: &str) -> Result<Option<User>, StoreError> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, display_name, created_at FROM users WHERE display_name = $1")
                .bind(display_name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn insert_list(&self, list: &TodoList) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO todo_lists (id, title, owner_id, version) VALUES ($1, $2, $3, $4)")
            .bind(list.id)
            .bind(&list.title)
            .bind(list.owner_id)
            .bind(list.version)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_list(&self, list_id: Uuid) -> Result<Option<TodoList>, StoreError> {
        let row: Option<ListRow> =
            sqlx::query_as("SELECT id, title, owner_id, version FROM todo_lists WHERE id = $1")
                .bind(list_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(TodoList::from))
    }

    async fn update_list(&self, list: &TodoList, expected_version: i64) -> Result<i64, StoreError> {
        let updated: Option<(i64,)> = sqlx::query_as(
            "UPDATE todo_lists SET title = $2, version = version + 1 \
             WHERE id = $1 AND version = $3 RETURNING version",
        )
        .bind(list.id)
        .bind(&list.title)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some((version,)) => Ok(version),
            None => Err(Self::version_mismatch(&self.pool, list.id, expected_version).await),
        }
    }

    async fn delete_list(&self, list_id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM todo_items WHERE list_id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM todo_list_shares WHERE list_id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM todo_lists WHERE id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(StoreError::NotFound(format!("list {}", list_id)));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_items(&self, list_id: Uuid) -> Result<Vec<TodoItem>, StoreError> {
        self.items_for(&[list_id]).await
    }

    async fn insert_item(&self, item: &TodoItem, expected_version: i64) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let version = Self::bump_version(&mut tx, item.list_id, expected_version).await?;
        sqlx::query(&format!(
            "INSERT INTO todo_items ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            ITEM_COLUMNS
        ))
        .bind(item.id)
        .bind(item.list_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.due_date)
        .bind(item.status.as_str())
        .bind(item.priority.as_str())
        .bind(&item.media_url)
        .bind(item.media_type.map(|m| m.as_str()))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(version)
    }

    async fn delete_item(&self, list_id: Uuid, item_id: Uuid, expected_version: i64) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let version = Self::bump_version(&mut tx, list_id, expected_version).await?;
        let deleted = sqlx::query("DELETE FROM todo_items WHERE id = $1 AND list_id = $2")
            .bind(item_id)
            .bind(list_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("item {}", item_id)));
        }
        tx.commit().await?;
        Ok(version)
    }

    async fn list_shares(&self, list_id: Uuid) -> Result<Vec<TodoListShare>, StoreError> {
        self.shares_for(&[list_id]).await
    }

    async fn find_share(&self, list_id: Uuid, user_id: Uuid) -> Result<Option<TodoListShare>, StoreError> {
        let row: Option<ShareRow> = sqlx::query_as(
            "SELECT id, list_id, shared_with_user_id, permission FROM todo_list_shares \
             WHERE list_id = $1 AND shared_with_user_id = $2",
        )
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TodoListShare::try_from).transpose()
    }

    async fn insert_share(&self, share: &TodoListShare) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO todo_list_shares (id, list_id, shared_with_user_id, permission) VALUES ($1, $2, $3, $4)",
        )
        .bind(share.id)
        .bind(share.list_id)
        .bind(share.shared_with_user_id)
        .bind(share.permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(format!(
                    "share of list {} with user {}",
                    share.list_id, share.shared_with_user_id
                ))
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn delete_share(&self, share_id: Uuid) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM todo_list_shares WHERE id = $1")
            .bind(share_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("share {}", share_id)));
        }
        Ok(())
    }

    async fn lists_for_user(&self, user_id: Uuid) -> Result<Vec<TodoList>, StoreError> {
        let rows: Vec<ListRow> = sqlx::query_as(
            "SELECT l.id, l.title, l.owner_id, l.version FROM todo_lists l \
             WHERE l.owner_id = $1 \
                OR EXISTS (SELECT 1 FROM todo_list_shares s WHERE s.list_id = l.id AND s.shared_with_user_id = $1) \
             ORDER BY l.title NULLS FIRST, l.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut lists: Vec<TodoList> = rows.into_iter().map(TodoList::from).collect();
        if lists.is_empty() {
            return Ok(lists);
        }

        let ids: Vec<Uuid> = lists.iter().map(|l| l.id).collect();
        let items = self.items_for(&ids).await?;
        let shares = self.shares_for(&ids).await?;
        for list in lists.iter_mut() {
            list.items = items.iter().filter(|i| i.list_id == list.id).cloned().collect();
            list.shares = shares.iter().filter(|s| s.list_id == list.id).cloned().collect();
        }
        Ok(lists)
    }
}
