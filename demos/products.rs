use std::sync::Arc;

use jewelry_api_client::{ApiClient, Config, LoginRedirectHook};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let hook = Arc::new(LoginRedirectHook::new(config.login_url()));
    let client = ApiClient::from_config(&config, hook)?;

    if let (Ok(email), Ok(password)) = (
        std::env::var("JEWELRY_EMAIL"),
        std::env::var("JEWELRY_PASSWORD"),
    ) {
        client.login(&email, &password).await?;
    }

    match client.get::<serde_json::Value>("/products").await {
        Ok(products) => println!("{products:#}"),
        Err(err) => eprintln!("request failed: kind={} key={}", err.kind(), err.message_key()),
    }
    Ok(())
}
