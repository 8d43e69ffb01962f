use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Channel};

const CHANNEL_COLUMNS: &str = "id, name, icon, banner, user_id";

pub async fn insert_channel(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
    icon: Option<&str>,
    banner: Option<&str>,
) -> Result<Channel, RequestError> {
    let mut tx = pool.begin().await?;
    let channel = sqlx::query_as::<_, Channel>(&format!(
        r#"
        INSERT INTO channels (name, icon, banner, user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING {CHANNEL_COLUMNS}
        "#
    ))
    .bind(name)
    .bind(icon)
    .bind(banner)
    .bind(user_id)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(channel)
}

pub async fn get_channel_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Channel>, RequestError> {
    let result = sqlx::query_as::<_, Channel>(&format!(
        "SELECT {CHANNEL_COLUMNS} FROM channels WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn get_channel_by_owner(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<Channel>, RequestError> {
    let result = sqlx::query_as::<_, Channel>(&format!(
        "SELECT {CHANNEL_COLUMNS} FROM channels WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn list_channels(pool: &SqlitePool) -> Result<Vec<Channel>, RequestError> {
    let result = sqlx::query_as::<_, Channel>(&format!(
        "SELECT {CHANNEL_COLUMNS} FROM channels ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::test_support::{test_pool, user};

    #[tokio::test]
    async fn one_channel_per_user() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        insert_channel(&pool, owner.id, "First", Some("icon.png"), None)
            .await
            .unwrap();

        let err = insert_channel(&pool, owner.id, "Second", None, None)
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(list_channels(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookups_by_owner_and_id() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let stranger = user(&pool, "stranger@example.com").await;
        let channel = insert_channel(&pool, owner.id, "Mine", None, Some("banner.jpg"))
            .await
            .unwrap();

        let found = get_channel_by_owner(&pool, owner.id).await.unwrap().unwrap();
        assert_eq!(found.id, channel.id);
        assert_eq!(found.banner.as_deref(), Some("banner.jpg"));
        assert!(get_channel_by_owner(&pool, stranger.id)
            .await
            .unwrap()
            .is_none());
        assert!(get_channel_by_id(&pool, channel.id + 1)
            .await
            .unwrap()
            .is_none());
    }
}
