use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    errors::RequestError,
    models::{Comment, CommentView},
};

const COMMENT_COLUMNS: &str = "id, content, user_id, video_id, created_at, updated_at";

pub async fn insert_comment(
    pool: &SqlitePool,
    user_id: i64,
    video_id: i64,
    content: &str,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;
    let comment = sqlx::query_as::<_, Comment>(&format!(
        r#"
        INSERT INTO comments (content, user_id, video_id, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {COMMENT_COLUMNS}
        "#
    ))
    .bind(content)
    .bind(user_id)
    .bind(video_id)
    .bind(Utc::now().naive_utc())
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(comment)
}

pub async fn get_comment_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Comment>, RequestError> {
    let result = sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

/// Replaces the content and stamps `updated_at`.
pub async fn update_comment_in_db(
    pool: &SqlitePool,
    id: i64,
    content: &str,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE comments SET content = $1, updated_at = $2 WHERE id = $3")
        .bind(content)
        .bind(Utc::now().naive_utc())
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete_comment_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Oldest first, each with its author's channel name, else email.
pub async fn get_comments_for_video_in_db(
    pool: &SqlitePool,
    video_id: i64,
) -> Result<Vec<CommentView>, RequestError> {
    let result = sqlx::query_as::<_, CommentView>(
        r#"
            SELECT comments.id                                 AS "id",
                   comments.content                            AS "content",
                   comments.user_id                            AS "user_id",
                   comments.created_at                         AS "created_at",
                   comments.updated_at                         AS "updated_at",
                   COALESCE(channels.name, users.email, 'Unknown') AS "author_name"
            FROM   comments
                LEFT JOIN users
                        ON users.id = comments.user_id
                LEFT JOIN channels
                        ON channels.user_id = comments.user_id
            WHERE  comments.video_id = $1
            ORDER  BY comments.created_at ASC, comments.id ASC
        "#,
    )
    .bind(video_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::test_support::{channel, test_pool, user, video};

    #[tokio::test]
    async fn author_name_prefers_channel_over_email() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let lurker = user(&pool, "lurker@example.com").await;
        let ch = channel(&pool, &owner, "Owner TV").await;
        let clip = video(&pool, &ch, "Clip").await;

        insert_comment(&pool, owner.id, clip.id, "first!").await.unwrap();
        insert_comment(&pool, lurker.id, clip.id, "second").await.unwrap();

        let comments = get_comments_for_video_in_db(&pool, clip.id).await.unwrap();
        let authors: Vec<&str> = comments.iter().map(|c| c.author_name.as_str()).collect();
        assert_eq!(authors, vec!["Owner TV", "lurker@example.com"]);
        assert_eq!(comments[0].content, "first!");
    }

    #[tokio::test]
    async fn update_stamps_updated_at() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let ch = channel(&pool, &owner, "Owner TV").await;
        let clip = video(&pool, &ch, "Clip").await;
        let comment = insert_comment(&pool, owner.id, clip.id, "typo").await.unwrap();
        assert!(comment.updated_at.is_none());

        update_comment_in_db(&pool, comment.id, "fixed").await.unwrap();

        let comment = get_comment_by_id(&pool, comment.id).await.unwrap().unwrap();
        assert_eq!(comment.content, "fixed");
        assert!(comment.updated_at.is_some());
    }

    #[tokio::test]
    async fn delete_removes_only_that_comment() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let ch = channel(&pool, &owner, "Owner TV").await;
        let clip = video(&pool, &ch, "Clip").await;
        let doomed = insert_comment(&pool, owner.id, clip.id, "bye").await.unwrap();
        insert_comment(&pool, owner.id, clip.id, "stay").await.unwrap();

        delete_comment_in_db(&pool, doomed.id).await.unwrap();

        assert!(get_comment_by_id(&pool, doomed.id).await.unwrap().is_none());
        assert_eq!(
            get_comments_for_video_in_db(&pool, clip.id).await.unwrap().len(),
            1
        );
    }
}
