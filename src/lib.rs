pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod formatter;
pub mod intent;
pub mod line;
pub mod scraper;

use std::sync::Arc;
use bot::Bot;
use config::Config;
use line::ReplySender;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub bot: Arc<Bot>,
    pub replier: Arc<dyn ReplySender>,
}
