use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use train_weather_bot::{
    api::routes::create_router,
    bot::Bot,
    config::Config,
    line::LineClient,
    scraper::HttpFetcher,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,train_weather_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;

    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let bot = Bot::new(Arc::new(fetcher), config.targets.clone());
    let replier = LineClient::new(
        &config.line_api_base,
        &config.channel_token,
        config.fetch_timeout,
    )?;

    let app_state = AppState {
        config: Arc::new(config),
        bot: Arc::new(bot),
        replier: Arc::new(replier),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
