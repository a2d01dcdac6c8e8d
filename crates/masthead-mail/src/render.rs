//! Newsletter body rendering.
//!
//! One self-contained HTML document per post announcement: site header, post
//! title, a capped excerpt of the content, and a link to the full post.

/// Maximum characters of post content shown in the email body.
pub const EXCERPT_MAX_CHARS: usize = 300;

/// Subject line for a post announcement.
pub fn newsletter_subject(post_title: &str) -> String {
    format!("New Post: {post_title}")
}

/// Truncate `content` to [`EXCERPT_MAX_CHARS`] characters, appending an
/// ellipsis marker when anything was cut. Splits on a char boundary, never
/// mid-codepoint.
pub fn excerpt(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(EXCERPT_MAX_CHARS) {
        None => content.to_string(),
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
    }
}

/// Render the announcement HTML for a published post.
pub fn newsletter_html(site_title: &str, post_title: &str, content: &str, post_url: &str) -> String {
    let excerpt = excerpt(content);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{post_title}</title>
    <style>
      body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
      .header {{ background: #f8f9fa; padding: 20px; text-align: center; border-radius: 8px; margin-bottom: 20px; }}
      .content {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
      .footer {{ text-align: center; margin-top: 20px; padding: 20px; color: #666; font-size: 14px; }}
      .button {{ display: inline-block; background: #007bff; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; margin: 20px 0; }}
    </style>
  </head>
  <body>
    <div class="header">
      <h1>{site_title}</h1>
      <p>New post published!</p>
    </div>
    <div class="content">
      <h2>{post_title}</h2>
      <div>{excerpt}</div>
      <a href="{post_url}" class="button">Read Full Post</a>
    </div>
    <div class="footer">
      <p>You're receiving this because you subscribed to our newsletter.</p>
    </div>
  </body>
</html>
"#
    )
}
