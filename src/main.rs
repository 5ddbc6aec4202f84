use noxpay_sdk::config::Config;
use noxpay_sdk::observability::init_tracing;
use noxpay_sdk::payments::V2Client;
use noxpay_sdk::webhook::WebhookServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_tracing(config.log_format);

    tracing::info!("Starting NoxPay webhook listener");
    tracing::info!(
        "TLS: {}",
        if config.webhook.tls.is_some() { "enabled" } else { "disabled" }
    );

    let server = match &config.v2 {
        Some(v2) => {
            let client = V2Client::new(v2)?;
            // a bad token is reported but does not stop the listener
            match client.get_account().await {
                Ok(_) => tracing::info!("v2 API credentials verified"),
                Err(e) => tracing::warn!("v2 API credential check failed: {}", e),
            }
            client.webhook_server()
        }
        None => WebhookServer::new(config.webhook.secret_key.clone()),
    };
    let mut server = server.with_shutdown_grace(config.webhook.shutdown_grace);

    server
        .start(
            &config.webhook.host,
            config.webhook.port,
            config.webhook.tls.as_ref(),
        )
        .await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    server.stop().await?;
    Ok(())
}
