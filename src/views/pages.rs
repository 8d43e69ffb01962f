use axum::response::Html;

use crate::{
    authentication::Session,
    models::{Channel, ChannelVideo, Comment, CommentView, VideoListing},
};

use super::{escape, format_timestamp, layout};

/// One video on a channel page with its comments, oldest first.
pub struct ChannelVideoSection {
    pub video: ChannelVideo,
    pub comments: Vec<CommentView>,
}

pub struct ChannelPageData {
    pub channel: Channel,
    pub videos: Vec<ChannelVideoSection>,
    pub subscriber_count: i64,
    pub subscribed: bool,
}

fn video_tag(filename: &str) -> String {
    format!(
        "<video width='480' controls><source src='/videos/{}' type='video/mp4'>\
         Your browser does not support the video tag.</video><br>",
        escape(filename)
    )
}

fn listing_panel(video: &VideoListing) -> String {
    format!(
        "<div class='panel' style='margin-bottom:12px;'>\
         <h3>{title} <small class='muted'>by <a href='/channel/{channel_id}'>{channel}</a></small></h3>\
         {tag}<small class='muted'>Uploaded: {uploaded}</small></div>",
        title = escape(&video.title),
        channel_id = video.channel_id,
        channel = escape(&video.channel_name),
        tag = video_tag(&video.filename),
        uploaded = format_timestamp(&video.uploaded_at),
    )
}

pub fn home_page(
    session: &Session,
    recommended: &[VideoListing],
    recent: &[VideoListing],
    query: Option<&str>,
) -> Html<String> {
    let query_value = escape(query.unwrap_or_default());
    let mut body = format!(
        "<form method='post' action='/' style='margin-bottom:12px;'>\
         <input type='text' name='q' placeholder='Search videos' value='{query_value}'> \
         <input class='btn' type='submit' value='Search'></form>"
    );

    body.push_str("<section id='recommended'><h2>Recommended</h2>");
    if recommended.is_empty() {
        body.push_str("<p>Nothing to recommend yet.</p>");
    } else {
        for video in recommended {
            body.push_str(&listing_panel(video));
        }
    }
    body.push_str("</section>");

    body.push_str("<section id='recent'>");
    match query {
        Some(query) => body.push_str(&format!("<h1>Results for \"{}\"</h1>", escape(query))),
        None => body.push_str("<h1>Recent Videos</h1>"),
    }
    if recent.is_empty() {
        body.push_str("<p>No videos yet.</p>");
    } else {
        for video in recent {
            body.push_str(&listing_panel(video));
        }
    }
    body.push_str("</section>");

    layout(session, "Home", &body)
}

fn credentials_form(heading: &str, button: &str, footer: &str) -> String {
    format!(
        "<div class='panel'><h2>{heading}</h2><form method='post'>\
         Email: <input type='email' name='email' required><br><br>\
         Password: <input type='password' name='password' required><br><br>\
         <input class='btn' type='submit' value='{button}'></form><br>{footer}</div>"
    )
}

pub fn login_page(session: &Session) -> Html<String> {
    let body = credentials_form(
        "Login",
        "Login",
        "Don't have an account? <a href='/create_account'>Create one here</a><br>\
         <a href='/forgot_password'>Forgot your password?</a>",
    );
    layout(session, "Login", &body)
}

pub fn register_page(session: &Session) -> Html<String> {
    let body = credentials_form(
        "Create Account",
        "Create Account",
        "Already have an account? <a href='/login'>Login here</a>",
    );
    layout(session, "Create Account", &body)
}

pub fn forgot_password_page(session: &Session, submitted: bool) -> Html<String> {
    let notice = if submitted {
        "<p>Password resets are not available yet. Please contact the site administrator.</p>"
    } else {
        ""
    };
    let body = format!(
        "<div class='panel'><h2>Forgot Password</h2>{notice}<form method='post'>\
         Email: <input type='email' name='email' required><br><br>\
         <input class='btn' type='submit' value='Reset password'></form><br>\
         <a href='/login'>Back to login</a></div>"
    );
    layout(session, "Forgot Password", &body)
}

pub fn create_channel_page(session: &Session) -> Html<String> {
    let body = "<div class='panel'><h2>Create Channel</h2>\
         <form method='post' enctype='multipart/form-data'>\
         Channel Name: <input type='text' name='name' required><br><br>\
         Channel Icon: <input type='file' name='icon' accept='.png,.jpg,.jpeg,.bmp,.tiff,.gif'><br><br>\
         Channel Banner: <input type='file' name='banner' accept='.png,.jpg,.jpeg,.bmp,.tiff,.gif'><br><br>\
         <input class='btn' type='submit' value='Create Channel'></form></div>";
    layout(session, "Create Channel", body)
}

pub fn upload_video_page(session: &Session) -> Html<String> {
    let body = "<div class='panel'><h2>Upload Video to Your Channel</h2>\
         <form method='post' enctype='multipart/form-data'>\
         Title: <input type='text' name='title' required><br><br>\
         Video File: <input type='file' name='video' accept='video/*' required><br><br>\
         <input class='btn' type='submit' value='Upload Video'></form></div>";
    layout(session, "Upload Video", body)
}

pub fn edit_comment_page(session: &Session, comment: &Comment) -> Html<String> {
    let body = format!(
        "<div class='panel'><h3>Edit Comment</h3><form method='post'>\
         <textarea name='content' rows='4' required>{}</textarea><br>\
         <input class='btn' type='submit' value='Save'></form></div>",
        escape(&comment.content)
    );
    layout(session, "Edit Comment", &body)
}

pub fn channels_page(session: &Session, channels: &[Channel]) -> Html<String> {
    let mut body = String::from("<h1>All Channels</h1><ul>");
    for channel in channels {
        let icon = channel
            .icon
            .as_deref()
            .map(|icon| {
                format!(
                    "<img src='/uploads/{}' width='100' height='100'>",
                    escape(icon)
                )
            })
            .unwrap_or_default();
        body.push_str(&format!(
            "<li style='margin-bottom:20px;' class='panel'>\
             <a href='/channel/{}' style='font-size:20px;'>{}</a><br>{}</li>",
            channel.id,
            escape(&channel.name),
            icon
        ));
    }
    body.push_str("</ul>");
    layout(session, "Channels", &body)
}

fn comment_block(session: &Session, comment: &CommentView) -> String {
    let edited = comment
        .updated_at
        .as_ref()
        .map(|at| format!(" (edited {})", format_timestamp(at)))
        .unwrap_or_default();
    let mut html = format!(
        "<div style='border-top:1px solid var(--muted); padding-top:6px; margin-top:6px;'>\
         <b>{author}</b> <small class='muted'>{created}{edited}</small><p>{content}</p>",
        author = escape(&comment.author_name),
        created = format_timestamp(&comment.created_at),
        content = escape(&comment.content),
    );
    if session.user_id() == Some(comment.user_id) {
        html.push_str(&format!(
            "<form style='display:inline' method='get' action='/comment/{id}/edit'>\
             <button class='btn' type='submit'>Edit</button></form> \
             <form style='display:inline' method='post' action='/comment/{id}/delete' \
             onsubmit=\"return confirm('Delete comment?');\">\
             <button class='btn' type='submit'>Delete</button></form>",
            id = comment.id
        ));
    }
    html.push_str("</div>");
    html
}

fn video_section(session: &Session, section: &ChannelVideoSection) -> String {
    let video = &section.video;
    let mut html = format!(
        "<div class='panel' style='margin-bottom:18px;'><h3>{title}</h3>\
         <small class='muted'>Uploaded: {uploaded}</small><br>{tag}\
         <a class='btn' href='/video/{id}/like'>👍 Like ({likes})</a> \
         <a class='btn' href='/video/{id}/dislike'>👎 Dislike ({dislikes})</a>\
         <h4>Comments</h4>",
        title = escape(&video.title),
        uploaded = format_timestamp(&video.uploaded_at),
        tag = video_tag(&video.filename),
        id = video.id,
        likes = video.likes,
        dislikes = video.dislikes,
    );

    if session.user.is_some() {
        html.push_str(&format!(
            "<form method='post' action='/video/{}/comment'>\
             <textarea name='content' rows='2' required></textarea><br>\
             <input class='btn' type='submit' value='Add Comment'></form>",
            video.id
        ));
    } else {
        html.push_str("<p><a href='/login'>Login</a> to comment.</p>");
    }

    if section.comments.is_empty() {
        html.push_str("<p>No comments yet!</p>");
    } else {
        for comment in &section.comments {
            html.push_str(&comment_block(session, comment));
        }
    }
    html.push_str("</div>");
    html
}

pub fn channel_page(session: &Session, data: &ChannelPageData) -> Html<String> {
    let channel = &data.channel;
    let mut body = String::new();

    if let Some(banner) = &channel.banner {
        body.push_str(&format!(
            "<img class='banner' src='/uploads/{}'><br>",
            escape(banner)
        ));
    }
    body.push_str(&format!("<h1>{}</h1>", escape(&channel.name)));
    if let Some(icon) = &channel.icon {
        body.push_str(&format!(
            "<img src='/uploads/{}' width='150' height='150'><br>",
            escape(icon)
        ));
    }

    let subscribers = match data.subscriber_count {
        1 => "1 subscriber".to_string(),
        n => format!("{n} subscribers"),
    };
    body.push_str(&format!("<p class='muted'>{subscribers}</p>"));

    let is_owner = session
        .user
        .as_ref()
        .map_or(false, |user| user.owns_channel(channel.id));
    if session.user.is_some() && !is_owner {
        let (action, label) = if data.subscribed {
            ("unsubscribe", "Unsubscribe")
        } else {
            ("subscribe", "Subscribe")
        };
        body.push_str(&format!(
            "<form method='post' action='/channel/{}/{action}'>\
             <button class='btn' type='submit'>{label}</button></form>",
            channel.id
        ));
    }

    body.push_str("<h2>Videos</h2>");
    if data.videos.is_empty() {
        body.push_str("<p>No videos yet!</p>");
    } else {
        for section in &data.videos {
            body.push_str(&video_section(session, section));
        }
    }

    if is_owner {
        body.push_str("<br><a class='btn' href='/upload_video'>Upload a Video</a>");
    }
    body.push_str(" | <a class='btn' href='/channels'>Back to Channels</a>");

    layout(session, &channel.name, &body)
}
