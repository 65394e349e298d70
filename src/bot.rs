use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use scraper::Html;
use tracing::{debug, error, warn};

use crate::api::models::{Event, MessageContent};
use crate::config::ScrapeTargets;
use crate::error::Result;
use crate::formatter::{self, APOLOGY};
use crate::intent::Intent;
use crate::line::ReplySender;
use crate::scraper::{
    extract_area_status, extract_forecast, extract_service_status, parse_document, PageSource,
};

/// Turns inbound text into reply text.
pub struct Bot {
    source: Arc<dyn PageSource>,
    targets: ScrapeTargets,
}

impl Bot {
    pub fn new(source: Arc<dyn PageSource>, targets: ScrapeTargets) -> Self {
        Self { source, targets }
    }

    pub async fn respond(&self, text: &str) -> String {
        self.respond_at(text, formatter::tokyo_now()).await
    }

    /// Like [`Bot::respond`] with an explicit clock for the greeting.
    /// Always returns a non-empty reply; any failure yields [`APOLOGY`].
    pub async fn respond_at(&self, text: &str, now: DateTime<FixedOffset>) -> String {
        let intent = Intent::from_text(text);
        debug!(?intent, "Routing message");

        let reply = match intent {
            Intent::Canned(reply) => return reply.to_string(),
            Intent::TrainLine => self.train_line().await,
            Intent::TrainArea => self.train_area().await,
            Intent::Weather => self.weather().await,
            Intent::Greeting => self.summary(now).await,
        };

        match reply {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!(?intent, "Composed reply was empty");
                APOLOGY.to_string()
            }
            Err(e) => {
                warn!(?intent, error = %e, "Failed to compose reply");
                APOLOGY.to_string()
            }
        }
    }

    // The parsed document never lives across an await.
    async fn scrape<T, F>(&self, url: &str, extract: F) -> Result<T>
    where
        F: FnOnce(&Html) -> T + Send,
    {
        let page = self.source.fetch(url).await?;
        let document = parse_document(&page.body)?;
        Ok(extract(&document))
    }

    async fn train_line(&self) -> Result<String> {
        let status = self
            .scrape(&self.targets.train_line_url, extract_service_status)
            .await?;
        Ok(formatter::format_train_line(&status))
    }

    async fn train_area(&self) -> Result<String> {
        let names = &self.targets.area_lines;
        let area = self
            .scrape(&self.targets.train_area_url, |doc| extract_area_status(doc, names))
            .await?;
        Ok(formatter::format_train_area(&area))
    }

    async fn weather(&self) -> Result<String> {
        let days = self.scrape(&self.targets.weather_url, extract_forecast).await?;
        Ok(formatter::format_weather(&days))
    }

    async fn summary(&self, now: DateTime<FixedOffset>) -> Result<String> {
        let train = self.train_area().await?;
        let weather = self.weather().await?;
        Ok(formatter::format_combined(now, &train, &weather))
    }
}

/// Handles a webhook batch in delivery order and returns how many replies
/// were sent. Events that are not text messages are skipped; one event's
/// failure never stops the rest of the batch.
pub async fn handle_events(bot: &Bot, replier: &dyn ReplySender, events: Vec<Event>) -> usize {
    let mut replied = 0;

    for event in events {
        let (reply_token, text) = match event {
            Event::Message {
                reply_token,
                message: MessageContent::Text { text },
            } => (reply_token, text),
            Event::Message { .. } => {
                debug!("Skipping non-text message");
                continue;
            }
            Event::Other => {
                debug!("Skipping non-message event");
                continue;
            }
        };

        let reply = bot.respond(&text).await;

        match replier.reply(&reply_token, &reply).await {
            Ok(()) => replied += 1,
            Err(e) => error!(reply_token = %reply_token, error = %e, "Failed to send reply"),
        }
    }

    replied
}
