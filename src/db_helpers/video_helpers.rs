use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    errors::RequestError,
    models::{ChannelVideo, Video, VideoListing},
};

use super::count_subscriptions;

pub const RECENT_VIDEO_LIMIT: i64 = 50;
pub const RECOMMENDATION_LIMIT: i64 = 5;

const LISTING_QUERY: &str = r#"
            SELECT videos.id          AS "id",
                   videos.title       AS "title",
                   videos.filename    AS "filename",
                   videos.channel_id  AS "channel_id",
                   channels.name      AS "channel_name",
                   videos.uploaded_at AS "uploaded_at"
            FROM   videos
                JOIN channels
                    ON channels.id = videos.channel_id
"#;

pub async fn insert_video(
    pool: &SqlitePool,
    channel_id: i64,
    title: &str,
    filename: &str,
) -> Result<Video, RequestError> {
    let mut tx = pool.begin().await?;
    let video = sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (title, filename, channel_id, uploaded_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, filename, channel_id, uploaded_at
        "#,
    )
    .bind(title)
    .bind(filename)
    .bind(channel_id)
    .bind(Utc::now().naive_utc())
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(video)
}

pub async fn get_video_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Video>, RequestError> {
    let result = sqlx::query_as::<_, Video>(
        "SELECT id, title, filename, channel_id, uploaded_at FROM videos WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

/// Most recent videos first. A non-blank `search` keeps only titles that
/// contain it, ignoring ASCII case.
pub async fn list_recent_videos(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
) -> Result<Vec<VideoListing>, RequestError> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let query = format!(
        r#"{LISTING_QUERY}
            WHERE  ( $1 IS NULL
                    OR instr(lower(videos.title), lower($1)) > 0 )
            ORDER  BY videos.uploaded_at DESC, videos.id DESC
            LIMIT  $2
        "#
    );
    let result = sqlx::query_as::<_, VideoListing>(&query)
        .bind(search)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

/// Every video of a channel in upload order, with like and dislike counts.
pub async fn list_channel_videos(
    pool: &SqlitePool,
    channel_id: i64,
) -> Result<Vec<ChannelVideo>, RequestError> {
    let result = sqlx::query_as::<_, ChannelVideo>(
        r#"
            SELECT videos.id          AS "id",
                   videos.title       AS "title",
                   videos.filename    AS "filename",
                   videos.uploaded_at AS "uploaded_at",
                   (SELECT Count(*)
                    FROM   like_dislikes
                    WHERE  like_dislikes.video_id = videos.id
                        AND like_dislikes.value = 1)  AS "likes",
                   (SELECT Count(*)
                    FROM   like_dislikes
                    WHERE  like_dislikes.video_id = videos.id
                        AND like_dislikes.value = -1) AS "dislikes"
            FROM   videos
            WHERE  videos.channel_id = $1
            ORDER  BY videos.id ASC
        "#,
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}

/// Up to `limit` newest videos from the viewer's subscribed channels when
/// they have any subscription; otherwise a uniform random sample.
pub async fn recommended_videos(
    pool: &SqlitePool,
    viewer_id: Option<i64>,
    limit: i64,
) -> Result<Vec<VideoListing>, RequestError> {
    let subscribed_viewer = match viewer_id {
        Some(id) if count_subscriptions(pool, id).await? > 0 => Some(id),
        _ => None,
    };

    let result = match subscribed_viewer {
        Some(id) => {
            let query = format!(
                r#"{LISTING_QUERY}
                WHERE  videos.channel_id IN (SELECT channel_id
                                             FROM   subscriptions
                                             WHERE  user_id = $1)
                ORDER  BY videos.uploaded_at DESC, videos.id DESC
                LIMIT  $2
                "#
            );
            sqlx::query_as::<_, VideoListing>(&query)
                .bind(id)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
        None => {
            let query = format!("{LISTING_QUERY} ORDER BY RANDOM() LIMIT $1");
            sqlx::query_as::<_, VideoListing>(&query)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::{
        set_vote, subscribe,
        test_support::{channel, test_pool, user, video},
    };
    use crate::models::Vote;

    fn titles(videos: &[VideoListing]) -> Vec<&str> {
        videos.iter().map(|v| v.title.as_str()).collect()
    }

    #[tokio::test]
    async fn search_filters_by_title_substring() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let ch = channel(&pool, &owner, "Pets").await;
        video(&pool, &ch, "Cats").await;
        video(&pool, &ch, "Dogs").await;
        video(&pool, &ch, "Catapult").await;

        let found = list_recent_videos(&pool, Some("Cat"), RECENT_VIDEO_LIMIT)
            .await
            .unwrap();
        let mut found = titles(&found);
        found.sort();
        assert_eq!(found, vec!["Catapult", "Cats"]);
    }

    #[tokio::test]
    async fn blank_search_lists_everything_newest_first() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let ch = channel(&pool, &owner, "Pets").await;
        video(&pool, &ch, "First").await;
        video(&pool, &ch, "Second").await;

        let found = list_recent_videos(&pool, Some("   "), RECENT_VIDEO_LIMIT)
            .await
            .unwrap();
        assert_eq!(titles(&found), vec!["Second", "First"]);
        assert_eq!(found[0].channel_name, "Pets");
    }

    #[tokio::test]
    async fn recent_listing_respects_limit() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let ch = channel(&pool, &owner, "Bulk").await;
        for i in 0..4 {
            video(&pool, &ch, &format!("Video {i}")).await;
        }
        let found = list_recent_videos(&pool, None, 3).await.unwrap();
        assert_eq!(titles(&found), vec!["Video 3", "Video 2", "Video 1"]);
    }

    #[tokio::test]
    async fn recommendations_come_only_from_subscriptions() {
        let pool = test_pool().await;
        let alice = user(&pool, "alice@example.com").await;
        let bob = user(&pool, "bob@example.com").await;
        let viewer = user(&pool, "viewer@example.com").await;
        let channel_a = channel(&pool, &alice, "A").await;
        let channel_b = channel(&pool, &bob, "B").await;
        for i in 0..6 {
            video(&pool, &channel_a, &format!("A{i}")).await;
        }
        video(&pool, &channel_b, "B newest").await;
        subscribe(&pool, viewer.id, channel_a.id).await.unwrap();

        let recommended = recommended_videos(&pool, Some(viewer.id), RECOMMENDATION_LIMIT)
            .await
            .unwrap();
        assert_eq!(titles(&recommended), vec!["A5", "A4", "A3", "A2", "A1"]);
        assert!(recommended.iter().all(|v| v.channel_id == channel_a.id));
    }

    #[tokio::test]
    async fn recommendations_without_subscriptions_sample_all_videos() {
        let pool = test_pool().await;
        let alice = user(&pool, "alice@example.com").await;
        let viewer = user(&pool, "viewer@example.com").await;
        let ch = channel(&pool, &alice, "A").await;
        for i in 0..8 {
            video(&pool, &ch, &format!("V{i}")).await;
        }

        let recommended = recommended_videos(&pool, Some(viewer.id), RECOMMENDATION_LIMIT)
            .await
            .unwrap();
        assert_eq!(recommended.len(), 5);

        let mut ids: Vec<i64> = recommended.iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);

        let anonymous = recommended_videos(&pool, None, RECOMMENDATION_LIMIT)
            .await
            .unwrap();
        assert_eq!(anonymous.len(), 5);
    }

    #[tokio::test]
    async fn channel_videos_carry_vote_counts() {
        let pool = test_pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let fan = user(&pool, "fan@example.com").await;
        let critic = user(&pool, "critic@example.com").await;
        let ch = channel(&pool, &owner, "Mine").await;
        let first = video(&pool, &ch, "First").await;
        video(&pool, &ch, "Second").await;

        set_vote(&pool, fan.id, first.id, Vote::Like)
            .await
            .unwrap();
        set_vote(&pool, critic.id, first.id, Vote::Dislike)
            .await
            .unwrap();
        set_vote(&pool, owner.id, first.id, Vote::Like)
            .await
            .unwrap();

        let videos = list_channel_videos(&pool, ch.id).await.unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].title, "First");
        assert_eq!((videos[0].likes, videos[0].dislikes), (2, 1));
        assert_eq!((videos[1].likes, videos[1].dislikes), (0, 0));
    }
}
