//! Text parsing and rendering utilities for tweet content.
//!
//! This module turns plain tweet text into the HTML used as feed item content,
//! linking URLs, @mentions and #hashtags the way twitter.com renders them.

use super::types::UrlEntity;

/// Characters that end a sentence rather than a link.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Escapes the characters that are significant in HTML and XML text.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Undoes the entity encoding Twitter applies to `text` and `full_text`.
///
/// Only `&amp;`, `&lt;` and `&gt;` are encoded by the API; `&amp;` is decoded
/// last so `&amp;lt;` becomes `&lt;` and not `<`.
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Renders tweet text as HTML.
///
/// Text is escaped and every URL, `@mention` and `#hashtag` becomes a link.
/// A mention must start the text or follow a non-word character, so e-mail
/// addresses are left alone.
///
/// # Example
///
/// ```rust
/// use opensearch_twitter::twitter::text_as_html;
///
/// assert_eq!(
///     text_as_html("hi @ESA_EO"),
///     r#"hi <a href="http://twitter.com/ESA_EO">@ESA_EO</a>"#
/// );
/// ```
pub fn text_as_html(text: &str) -> String {
    tweet_as_html(text, &[])
}

/// Renders tweet text as HTML, expanding shortened links.
///
/// # Parameters
///
/// - `text`: The tweet text as sent by the API, entity-encoded
/// - `urls`: The tweet's link entities; a t.co link listed there is shown as
///   its `display_url` and points at its `expanded_url`
pub fn tweet_as_html(text: &str, urls: &[UrlEntity]) -> String {
    let re = match regex::Regex::new(r"(https?://[^\s<>]+)|(^|[^\w&])([@#])(\w+)") {
        Ok(re) => re,
        Err(_) => return escape_html(&decode_entities(text)),
    };

    let text = decode_entities(text);
    let mut html = String::with_capacity(text.len() + 64);
    let mut last = 0;

    for cap in re.captures_iter(&text) {
        let Some(whole) = cap.get(0) else { continue };
        html.push_str(&escape_html(&text[last..whole.start()]));

        if let Some(url) = cap.get(1) {
            let link = url.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            let entity = urls.iter().find(|e| e.url.as_deref() == Some(link));
            let href = entity
                .and_then(|e| e.expanded_url.as_deref())
                .unwrap_or(link);
            let label = entity
                .and_then(|e| e.display_url.as_deref())
                .unwrap_or(link);
            html.push_str(&format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(href),
                escape_html(label)
            ));
            last = url.start() + link.len();
            continue;
        }

        if let (Some(lead), Some(sigil), Some(word)) = (cap.get(2), cap.get(3), cap.get(4)) {
            html.push_str(&escape_html(lead.as_str()));
            let word = word.as_str();
            let href = if sigil.as_str() == "@" {
                format!("http://twitter.com/{}", word)
            } else {
                format!("http://twitter.com/hashtag/{}", word)
            };
            html.push_str(&format!(
                r#"<a href="{}">{}{}</a>"#,
                escape_html(&href),
                sigil.as_str(),
                escape_html(word)
            ));
        }

        last = whole.end();
    }

    html.push_str(&escape_html(&text[last..]));
    html
}
