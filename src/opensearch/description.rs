//! OpenSearch description documents.
//!
//! The description advertises one search URL template per response format
//! and the parameters the collection understands.

use serde::Serialize;
use url::Url;

use crate::error::{TwitterError, TwitterResult};
use crate::twitter::escape_html;

use super::format::ResponseFormat;

pub const OPENSEARCH_NS: &str = "http://a9.com/-/spec/opensearch/1.1/";
/// Namespace of the Twitter-specific template parameters.
pub const TWIT_NS: &str = "http://twitter.com/opensearch/1.0/";

/// Template parameters shared by every URL, in advertised order.
pub const TEMPLATE_PARAMETERS: [(&str, &str); 7] = [
    ("count", "{count?}"),
    ("startPage", "{startPage?}"),
    ("startIndex", "{startIndex?}"),
    ("q", "{searchTerms?}"),
    ("scn", "{twit:screenname?}"),
    ("searchtype", "{twit:searchtype?}"),
    ("author", "{twit:author?}"),
];

/// One `<Url>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionUrl {
    pub mime_type: String,
    pub template: String,
    pub rel: String,
}

/// An OpenSearch description document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSearchDescription {
    pub short_name: String,
    pub description: String,
    pub contact: String,
    pub developer: String,
    pub attribution: String,
    pub syndication_right: String,
    pub adult_content: bool,
    pub language: String,
    pub input_encoding: String,
    pub output_encoding: String,
    pub urls: Vec<DescriptionUrl>,
}

impl OpenSearchDescription {
    /// Builds the description of the collection served at
    /// `<base_url>/<identifier>/search`.
    pub fn for_collection(identifier: &str, base_url: &str) -> TwitterResult<Self> {
        let mut search_url = Url::parse(base_url)
            .map_err(|e| TwitterError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;
        search_url.set_path(&format!(
            "{}/{}/search",
            search_url.path().trim_end_matches('/'),
            identifier
        ));

        let urls = ResponseFormat::ALL
            .iter()
            .map(|format| {
                let mut template = search_url.clone();
                let query: Vec<String> = TEMPLATE_PARAMETERS
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .chain(std::iter::once(format!("format={}", format.name())))
                    .collect();
                template.set_query(Some(&query.join("&")));
                DescriptionUrl {
                    mime_type: format.mime_type().to_string(),
                    template: template.to_string(),
                    rel: "results".to_string(),
                }
            })
            .collect();

        Ok(Self {
            short_name: format!("Twitter {}", identifier),
            description: format!(
                "Searches the tweets of the accounts configured for the '{}' collection. \
                 URL templates return results as Atom, JSON or HTML.",
                identifier
            ),
            contact: "info@opensearch-twitter.invalid".to_string(),
            developer: "opensearch-twitter".to_string(),
            attribution: "Twitter".to_string(),
            syndication_right: "open".to_string(),
            adult_content: false,
            language: "en-us".to_string(),
            input_encoding: "UTF-8".to_string(),
            output_encoding: "UTF-8".to_string(),
            urls,
        })
    }

    /// The template advertised for a MIME type.
    pub fn url_for(&self, mime_type: &str) -> Option<&DescriptionUrl> {
        self.urls.iter().find(|url| url.mime_type == mime_type)
    }

    /// Serializes the document as OpenSearch 1.1 XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<OpenSearchDescription xmlns=\"{}\" xmlns:twit=\"{}\">\n",
            OPENSEARCH_NS, TWIT_NS
        ));
        for (tag, value) in [
            ("ShortName", self.short_name.as_str()),
            ("Description", self.description.as_str()),
            ("Contact", self.contact.as_str()),
            ("Developer", self.developer.as_str()),
            ("Attribution", self.attribution.as_str()),
            ("SyndicationRight", self.syndication_right.as_str()),
            ("AdultContent", if self.adult_content { "true" } else { "false" }),
            ("Language", self.language.as_str()),
            ("InputEncoding", self.input_encoding.as_str()),
            ("OutputEncoding", self.output_encoding.as_str()),
        ] {
            xml.push_str(&format!("  <{tag}>{}</{tag}>\n", escape_html(value)));
        }
        for url in &self.urls {
            xml.push_str(&format!(
                "  <Url type=\"{}\" rel=\"{}\" template=\"{}\"/>\n",
                escape_html(&url.mime_type),
                escape_html(&url.rel),
                escape_html(&url.template)
            ));
        }
        xml.push_str("</OpenSearchDescription>\n");
        xml
    }
}
