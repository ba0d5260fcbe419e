//! OpenSearch adapter.
//!
//! Exposes the configured Twitter accounts as an OpenSearch collection:
//! query execution, response format negotiation, rendering, and the
//! description document advertising the search templates.

mod collection;
mod description;
mod format;
mod render;

pub use collection::TwitterCollection;
pub use description::{DescriptionUrl, OpenSearchDescription, TEMPLATE_PARAMETERS};
pub use format::{
    ResponseFormat, ATOM_MIME_TYPE, DESCRIPTION_MIME_TYPE, HTML_MIME_TYPE, JSON_MIME_TYPE,
};
pub use render::{render_atom, render_html, FeedMeta};
