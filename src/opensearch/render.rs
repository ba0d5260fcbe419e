//! Atom and HTML rendering of feed collections.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::feed::{FeedCollection, FeedItem};
use crate::twitter::escape_html;

use super::description::{OPENSEARCH_NS, TWIT_NS};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Feed-level metadata that does not come from the items.
#[derive(Debug, Clone)]
pub struct FeedMeta {
    /// Absolute URL of the request that produced the feed, used as its id
    pub id: String,
    pub title: String,
    /// Used as `updated` when the feed has no items
    pub generated_at: DateTime<Utc>,
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Renders a collection as an Atom 1.0 feed with OpenSearch response elements.
pub fn render_atom(collection: &FeedCollection, meta: &FeedMeta) -> String {
    let updated = collection.updated().unwrap_or(meta.generated_at);

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<feed xmlns=\"{}\" xmlns:os=\"{}\" xmlns:twit=\"{}\">\n",
        ATOM_NS, OPENSEARCH_NS, TWIT_NS
    ));
    xml.push_str(&format!("  <id>{}</id>\n", escape_html(&meta.id)));
    xml.push_str(&format!("  <title>{}</title>\n", escape_html(&meta.title)));
    xml.push_str(&format!("  <updated>{}</updated>\n", rfc3339(updated)));
    xml.push_str(&format!(
        "  <link rel=\"self\" type=\"application/atom+xml\" href=\"{}\"/>\n",
        escape_html(&meta.id)
    ));
    xml.push_str(&format!(
        "  <os:totalResults>{}</os:totalResults>\n",
        collection.total_count
    ));
    xml.push_str(&format!(
        "  <os:startIndex>{}</os:startIndex>\n",
        collection.start_index
    ));
    xml.push_str(&format!(
        "  <os:itemsPerPage>{}</os:itemsPerPage>\n",
        collection.items_per_page
    ));

    for item in &collection.items {
        render_entry(&mut xml, item);
    }

    xml.push_str("</feed>\n");
    xml
}

fn render_entry(xml: &mut String, item: &FeedItem) {
    let published = rfc3339(item.published_at);
    xml.push_str("  <entry>\n");
    xml.push_str(&format!("    <id>{}</id>\n", escape_html(&item.identifier)));
    xml.push_str(&format!("    <title>{}</title>\n", escape_html(&item.title)));
    xml.push_str(&format!(
        "    <link rel=\"alternate\" type=\"text/html\" href=\"{}\"/>\n",
        escape_html(&item.url)
    ));
    xml.push_str(&format!("    <published>{}</published>\n", published));
    xml.push_str(&format!("    <updated>{}</updated>\n", published));
    xml.push_str("    <category term=\"twitter\"/>\n");
    for tag in &item.hashtags {
        xml.push_str(&format!(
            "    <category term=\"{}\" scheme=\"http://twitter.com/hashtag\"/>\n",
            escape_html(tag)
        ));
    }
    xml.push_str("    <author>\n");
    xml.push_str(&format!("      <name>{}</name>\n", escape_html(&item.title)));
    xml.push_str(&format!(
        "      <uri>http://twitter.com/{}</uri>\n",
        escape_html(&item.author)
    ));
    xml.push_str(&format!(
        "      <twit:screenName>{}</twit:screenName>\n",
        escape_html(&item.author)
    ));
    if let Some(avatar) = &item.author_image_url {
        xml.push_str(&format!(
            "      <twit:avatar>{}</twit:avatar>\n",
            escape_html(avatar)
        ));
    }
    xml.push_str("    </author>\n");
    xml.push_str(&format!(
        "    <content type=\"html\">{}</content>\n",
        escape_html(&item.content)
    ));
    xml.push_str("  </entry>\n");
}

/// Renders a collection as a standalone HTML page.
pub fn render_html(collection: &FeedCollection, meta: &FeedMeta) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
"#,
    );
    html.push_str(&format!("    <title>{}</title>\n", escape_html(&meta.title)));
    html.push_str(
        r#"    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .container {
            max-width: 800px;
            margin: 0 auto;
            background-color: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .tweet {
            display: flex;
            gap: 12px;
            padding: 12px 0;
            border-bottom: 1px solid #ddd;
        }
        .tweet img {
            width: 48px;
            height: 48px;
            border-radius: 50%;
        }
        .meta {
            color: #555;
            font-size: 0.9em;
        }
    </style>
</head>
<body>
    <div class="container">
"#,
    );
    html.push_str(&format!("        <h1>{}</h1>\n", escape_html(&meta.title)));
    html.push_str(&format!(
        "        <p class=\"meta\">{} result(s), showing {} from #{}</p>\n",
        collection.total_count,
        collection.items.len(),
        collection.start_index
    ));

    for item in &collection.items {
        html.push_str("        <div class=\"tweet\">\n");
        if let Some(avatar) = &item.author_image_url {
            html.push_str(&format!(
                "            <img src=\"{}\" alt=\"\">\n",
                escape_html(avatar)
            ));
        }
        html.push_str(&format!(
            "            <div>\n                <strong>{}</strong> <span class=\"meta\">@{} · <a href=\"{}\">{}</a></span>\n                <p>{}</p>\n            </div>\n",
            escape_html(&item.title),
            escape_html(&item.author),
            escape_html(&item.url),
            rfc3339(item.published_at),
            item.content
        ));
        html.push_str("        </div>\n");
    }

    html.push_str(
        r#"    </div>
</body>
</html>"#,
    );
    html
}
