//! Command-line OpenSearch query against the live Twitter API.
//!
//! Runs one query through the same collection the web service uses and
//! prints the result. Arguments are OpenSearch parameters as `name=value`:
//!
//! ```bash
//! TWITTER_ACCOUNTS=ESA_EO:EGU17,terradue cargo run --bin search_tweets -- q=volcano count=5
//! cargo run --bin search_tweets -- searchtype=timeline author=ESA_EO format=json
//! ```

use std::collections::HashMap;

use opensearch_twitter::opensearch::{render_atom, render_html};
use opensearch_twitter::{
    get_server_port, CollectionConfig, ResponseFormat, TwitterClient, TwitterCollection,
    TwitterConfig,
};

/// Parses `name=value` arguments into request parameters.
fn parse_args(args: impl Iterator<Item = String>) -> Result<HashMap<String, String>, String> {
    args.map(|arg| match arg.split_once('=') {
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(format!("Expected name=value, got '{}'", arg)),
    })
    .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let params = parse_args(std::env::args().skip(1))?;

    let twitter_config = TwitterConfig::from_env()?;
    let collection_config = CollectionConfig::from_env(get_server_port());
    let collection = TwitterCollection::new(
        collection_config.identifier,
        collection_config.base_url,
        collection_config.accounts,
        TwitterClient::new(&twitter_config)?,
    );

    let feed = collection.query(&params).await?;
    let meta = collection.feed_meta(&params);

    let output = match ResponseFormat::negotiate(params.get("format").map(String::as_str), None) {
        ResponseFormat::Atom => render_atom(&feed, &meta),
        ResponseFormat::Json => serde_json::to_string_pretty(&feed)?,
        ResponseFormat::Html => render_html(&feed, &meta),
    };
    println!("{}", output);

    eprintln!(
        "{} tweet(s) fetched, {} shown",
        feed.total_count,
        feed.items.len()
    );
    Ok(())
}
