//! HTML rendering. Views receive already-loaded data and never touch the
//! database.

mod pages;

pub use pages::*;

use axum::response::Html;
use chrono::NaiveDateTime;

use crate::{authentication::Session, theme::Theme};

const SITE_NAME: &str = "H Kingdom";

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn style_block(theme: Theme) -> String {
    let palette = theme.palette();
    format!(
        r#"<style>
  :root {{
    --bg: {bg};
    --fg: {fg};
    --muted: {muted};
    --panel: {panel};
    --accent: {accent};
  }}
  body {{ background: var(--bg); color: var(--fg); font-family: Arial, sans-serif; margin: 0; padding: 20px; }}
  a {{ color: var(--accent); text-decoration: none; }}
  .topbar {{ display:flex; gap:10px; align-items:center; margin-bottom:12px; }}
  .btn {{ background:var(--panel); border:1px solid var(--muted); padding:6px 10px; border-radius:6px; cursor:pointer; color:var(--fg); }}
  .panel {{ background: var(--panel); padding:12px; border-radius:8px; border:1px solid var(--muted); }}
  .muted {{ color: var(--muted); }}
  .banner {{ width:100%; max-height:220px; object-fit:cover; border-radius:8px; }}
  textarea {{ width:100%; }}
</style>"#,
        bg = palette.bg,
        fg = palette.fg,
        muted = palette.muted,
        panel = palette.panel,
        accent = palette.accent,
    )
}

fn topbar(session: &Session) -> String {
    let mut links = String::from("<a class='btn' href='/channels'>Channels</a>");
    match &session.user {
        Some(user) => {
            if user.channel.is_some() {
                links.push_str("<a class='btn' href='/upload_video'>Upload</a>");
            } else {
                links.push_str("<a class='btn' href='/create_channel'>Create channel</a>");
            }
            links.push_str("<a class='btn' href='/logout'>Logout</a>");
        }
        None => {
            links.push_str("<a class='btn' href='/login'>Login</a>");
            links.push_str("<a class='btn' href='/create_account'>Sign up</a>");
        }
    }

    let themes: String = Theme::ALL
        .iter()
        .map(|theme| {
            format!(
                "<a class='btn' href='/set_theme/{}'>{}</a>",
                theme.name(),
                theme.label()
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "<div class='topbar'><strong><a href='/'>{SITE_NAME}</a></strong> | {links}\
         <div style='margin-left:auto'>Theme: {themes}</div></div>"
    )
}

/// Wraps a page body with the themed style block and navigation bar.
pub fn layout(session: &Session, title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'><title>{title} - {SITE_NAME}</title>{style}</head>\
         <body>{topbar}{body}</body></html>",
        title = escape(title),
        style = style_block(session.theme),
        topbar = topbar(session),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn layout_uses_session_theme() {
        let session = Session {
            user: None,
            theme: Theme::Gold,
        };
        let Html(page) = layout(&session, "Home", "<p>hi</p>");
        assert!(page.contains("--bg: #fffaf0;"));
        assert!(page.contains("href='/login'"));
        assert!(page.contains("<p>hi</p>"));
    }
}
