use crate::domain::models::Role;
use crate::domain::repository::UserRepository;
use crate::domain::user::{User, UserRecord};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let role_str: String = row.try_get("role")?;
    let role = Role::parse(&role_str).ok_or_else(|| anyhow!("unknown role in store: {role_str}"))?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        role,
        specialty: row.try_get("specialty")?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self, password_hash), fields(username = username))]
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        specialty: Option<&str>,
    ) -> Result<i64> {
        trace!("Inserting user row");
        let result = sqlx::query(
            "INSERT INTO users (username, password, role, specialty) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(specialty)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(user_id = id, username = username, "User row inserted");
        Ok(id)
    }

    #[instrument(skip(self), fields(username = username))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        trace!("Looking up user by username");
        let row = sqlx::query(
            "SELECT id, username, password, role, specialty FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        trace!("Looking up user by id");
        let row =
            sqlx::query("SELECT id, username, password, role, specialty FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        trace!("Listing users");
        let rows = sqlx::query("SELECT id, username, role FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let role_str: String = row.try_get("role")?;
                let role = Role::parse(&role_str)
                    .ok_or_else(|| anyhow!("unknown role in store: {role_str}"))?;
                Ok(UserRecord {
                    id: row.try_get("id")?,
                    username: row.try_get("username")?,
                    role,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn delete_user(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(
            user_id = id,
            rows = result.rows_affected(),
            "User delete executed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::db::test_pool;

    #[tokio::test]
    async fn test_create_and_find_user_by_username() {
        let repo = SqliteUserRepository::new(test_pool().await);

        let id = repo
            .create_user("alice", "hash123", Role::Admin, None)
            .await
            .unwrap();

        let found = repo.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.username, "alice");
        assert_eq!(found.password_hash, "hash123");
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.specialty, None);
    }

    #[tokio::test]
    async fn test_find_user_by_username_returns_none_when_absent() {
        let repo = SqliteUserRepository::new(test_pool().await);

        let found = repo.find_user_by_username("nobody").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_username() {
        let repo = SqliteUserRepository::new(test_pool().await);

        repo.create_user("bob", "h1", Role::Registrar, None)
            .await
            .unwrap();
        let second = repo.create_user("bob", "h2", Role::Registrar, None).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_doctor_user_keeps_specialty() {
        let repo = SqliteUserRepository::new(test_pool().await);

        let id = repo
            .create_user("drx", "h", Role::Doctor, Some("Cardio"))
            .await
            .unwrap();

        let found = repo.find_user_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Doctor);
        assert_eq!(found.specialty.as_deref(), Some("Cardio"));
    }

    #[tokio::test]
    async fn test_list_users_returns_all_without_credentials() {
        let repo = SqliteUserRepository::new(test_pool().await);

        repo.create_user("a", "h", Role::Admin, None).await.unwrap();
        repo.create_user("b", "h", Role::Registrar, None)
            .await
            .unwrap();

        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "a");
        assert_eq!(users[1].role, Role::Registrar);
    }

    #[tokio::test]
    async fn test_delete_user_removes_row() {
        let repo = SqliteUserRepository::new(test_pool().await);

        let id = repo
            .create_user("gone", "h", Role::Admin, None)
            .await
            .unwrap();
        repo.delete_user(id).await.unwrap();

        assert!(repo.find_user_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_user_is_noop() {
        let repo = SqliteUserRepository::new(test_pool().await);

        repo.delete_user(9999).await.unwrap();
    }
}
