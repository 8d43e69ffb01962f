use chrono::Utc;
use sqlx::SqlitePool;

use crate::{errors::RequestError, models::User};

pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password, created_at)
        VALUES ($1, $2, $3)
        RETURNING id, email, password, created_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now().naive_utc())
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<_, User>(
        "SELECT id, email, password, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<_, User>(
        "SELECT id, email, password, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::test_support::test_pool;

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let pool = test_pool().await;
        insert_user(&pool, "a@example.com", "hash").await.unwrap();
        let err = insert_user(&pool, "a@example.com", "other")
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn lookups_by_email_and_id() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "a@example.com", "hash").await.unwrap();

        let by_email = get_user_by_email(&pool, "a@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));

        let by_id = get_user_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@example.com");

        assert!(get_user_by_email(&pool, "b@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
