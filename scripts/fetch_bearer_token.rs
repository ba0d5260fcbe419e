//! Twitter Bearer Token Utility
//!
//! This script exchanges your application's consumer key and secret for an
//! application-only Bearer Token, which is handy for checking credentials
//! before deploying the service.

use std::io::{self, Write};

use opensearch_twitter::config::DEFAULT_API_URL;
use opensearch_twitter::oauth::request_bearer_token;

/// Reads one trimmed line from stdin after printing `prompt`.
fn prompt(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    println!("🔑 Twitter Bearer Token Utility");
    println!("===============================");

    // Get credentials from the environment, or ask for them
    let consumer_key = match std::env::var("xapi_consumer_key") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => prompt("Enter your Twitter App Consumer Key: ")?,
    };
    let consumer_secret = match std::env::var("xapi_consumer_secret") {
        Ok(secret) if !secret.trim().is_empty() => secret,
        _ => prompt("Enter your Twitter App Consumer Secret: ")?,
    };
    if consumer_key.is_empty() || consumer_secret.is_empty() {
        return Err("Consumer key and secret are required".into());
    }

    let api_url = std::env::var("TWITTER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

    println!("\n🔄 Requesting bearer token from {}...", api_url);
    let client = reqwest::Client::new();
    let token = request_bearer_token(
        &client,
        api_url.trim_end_matches('/'),
        &consumer_key,
        &consumer_secret,
    )
    .await?;

    println!("\n✅ Success! Your bearer token is:");
    println!("{}", token);
    println!("\n📝 The service fetches this token itself from xapi_consumer_key and");
    println!("   xapi_consumer_secret; keep those set in your deployment:");
    println!("   - Fly.io: fly secrets set xapi_consumer_key=\"...\" xapi_consumer_secret=\"...\"");
    println!("   - Local: export xapi_consumer_key=\"...\" xapi_consumer_secret=\"...\"");

    Ok(())
}
