//! Response format negotiation.

/// MIME type of Atom feeds, the default response format.
pub const ATOM_MIME_TYPE: &str = "application/atom+xml";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const DESCRIPTION_MIME_TYPE: &str = "application/opensearchdescription+xml";

/// The representations a search result can be rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Atom,
    Json,
    Html,
}

impl ResponseFormat {
    pub const ALL: [ResponseFormat; 3] = [Self::Atom, Self::Json, Self::Html];

    /// Value of the `format` request parameter for this representation.
    pub fn name(self) -> &'static str {
        match self {
            Self::Atom => "atom",
            Self::Json => "json",
            Self::Html => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Atom => ATOM_MIME_TYPE,
            Self::Json => JSON_MIME_TYPE,
            Self::Html => HTML_MIME_TYPE,
        }
    }

    /// Parses a `format` parameter (`atom`, `json`, `html`) or a MIME type.
    pub fn from_name(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let value = value.split(';').next().unwrap_or_default().trim();
        match value {
            "atom" | ATOM_MIME_TYPE | "application/xml" | "text/xml" => Some(Self::Atom),
            "json" | JSON_MIME_TYPE => Some(Self::Json),
            "html" | HTML_MIME_TYPE | "application/html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Picks the response format for a request.
    ///
    /// An explicit `format` parameter wins. Otherwise the first recognised
    /// entry of the `Accept` header is used, and Atom when nothing matches.
    pub fn negotiate(format: Option<&str>, accept: Option<&str>) -> Self {
        if let Some(format) = format.and_then(Self::from_name) {
            return format;
        }
        accept
            .into_iter()
            .flat_map(|header| header.split(','))
            .find_map(Self::from_name)
            .unwrap_or_default()
    }
}
