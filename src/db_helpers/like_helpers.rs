use sqlx::SqlitePool;

use crate::{
    errors::RequestError,
    models::{LikeDislike, Vote},
};

/// Records the user's vote on a video, overwriting any earlier vote.
pub async fn set_vote(
    pool: &SqlitePool,
    user_id: i64,
    video_id: i64,
    vote: Vote,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO like_dislikes (user_id, video_id, value)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, video_id) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .bind(vote.value())
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn get_vote(
    pool: &SqlitePool,
    user_id: i64,
    video_id: i64,
) -> Result<Option<LikeDislike>, RequestError> {
    let result = sqlx::query_as::<_, LikeDislike>(
        "SELECT id, user_id, video_id, value FROM like_dislikes WHERE user_id = $1 AND video_id = $2",
    )
    .bind(user_id)
    .bind(video_id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::test_support::{channel, test_pool, user, video};

    #[tokio::test]
    async fn repeat_votes_overwrite_instead_of_accumulating() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let viewer = user(&pool, "viewer@example.com").await;
        let ch = channel(&pool, &owner, "Mine").await;
        let clip = video(&pool, &ch, "Clip").await;

        set_vote(&pool, viewer.id, clip.id, Vote::Like).await.unwrap();
        set_vote(&pool, viewer.id, clip.id, Vote::Like).await.unwrap();
        set_vote(&pool, viewer.id, clip.id, Vote::Dislike).await.unwrap();

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM like_dislikes WHERE user_id = $1 AND video_id = $2",
        )
        .bind(viewer.id)
        .bind(clip.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);

        let vote = get_vote(&pool, viewer.id, clip.id).await.unwrap().unwrap();
        assert_eq!(Vote::from_value(vote.value), Some(Vote::Dislike));
    }

    #[tokio::test]
    async fn no_vote_is_none() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let ch = channel(&pool, &owner, "Mine").await;
        let clip = video(&pool, &ch, "Clip").await;
        assert!(get_vote(&pool, owner.id, clip.id).await.unwrap().is_none());
    }
}
