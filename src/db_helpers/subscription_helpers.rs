use chrono::Utc;
use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Subscription};

/// Inserts the (user, channel) pair unless it already exists.
pub async fn subscribe(
    pool: &SqlitePool,
    user_id: i64,
    channel_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, channel_id, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, channel_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(channel_id)
    .bind(Utc::now().naive_utc())
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn unsubscribe(
    pool: &SqlitePool,
    user_id: i64,
    channel_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND channel_id = $2")
        .bind(user_id)
        .bind(channel_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn get_subscription(
    pool: &SqlitePool,
    user_id: i64,
    channel_id: i64,
) -> Result<Option<Subscription>, RequestError> {
    let result = sqlx::query_as::<_, Subscription>(
        r#"
        SELECT id, user_id, channel_id, created_at
        FROM subscriptions
        WHERE user_id = $1 AND channel_id = $2
        "#,
    )
    .bind(user_id)
    .bind(channel_id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn count_subscriptions(pool: &SqlitePool, user_id: i64) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_subscribers(pool: &SqlitePool, channel_id: i64) -> Result<i64, RequestError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
            .bind(channel_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::test_support::{channel, test_pool, user};

    #[tokio::test]
    async fn subscribe_is_idempotent() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let fan = user(&pool, "fan@example.com").await;
        let ch = channel(&pool, &owner, "Mine").await;

        subscribe(&pool, fan.id, ch.id).await.unwrap();
        subscribe(&pool, fan.id, ch.id).await.unwrap();
        subscribe(&pool, fan.id, ch.id).await.unwrap();

        assert_eq!(count_subscribers(&pool, ch.id).await.unwrap(), 1);
        assert_eq!(count_subscriptions(&pool, fan.id).await.unwrap(), 1);
        assert!(get_subscription(&pool, fan.id, ch.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn subscribe_then_unsubscribe_leaves_nothing() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let fan = user(&pool, "fan@example.com").await;
        let ch = channel(&pool, &owner, "Mine").await;

        subscribe(&pool, fan.id, ch.id).await.unwrap();
        unsubscribe(&pool, fan.id, ch.id).await.unwrap();
        unsubscribe(&pool, fan.id, ch.id).await.unwrap();

        assert_eq!(count_subscribers(&pool, ch.id).await.unwrap(), 0);
        assert!(get_subscription(&pool, fan.id, ch.id).await.unwrap().is_none());
    }
}
