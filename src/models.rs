use chrono::NaiveDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub banner: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub channel_id: i64,
    pub uploaded_at: NaiveDateTime,
}

/// A video joined with the name of the channel it belongs to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoListing {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub channel_id: i64,
    pub channel_name: String,
    pub uploaded_at: NaiveDateTime,
}

/// A channel-page video with its vote counts computed at read time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChannelVideo {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub uploaded_at: NaiveDateTime,
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LikeDislike {
    pub id: i64,
    pub user_id: i64,
    pub video_id: i64,
    pub value: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub video_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// A comment with the display name of its author: channel name, else email.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentView {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub author_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub channel_id: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    pub fn value(self) -> i64 {
        match self {
            Vote::Like => 1,
            Vote::Dislike => -1,
        }
    }

    pub fn from_value(value: i64) -> Option<Vote> {
        match value {
            1 => Some(Vote::Like),
            -1 => Some(Vote::Dislike),
            _ => None,
        }
    }
}
