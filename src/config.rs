use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

const DEFAULT_PORT: &str = "8080";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";

/// Pages the bot scrapes. Fixed per deployment, never taken from user input.
#[derive(Clone, Debug)]
pub struct ScrapeTargets {
    /// Keisei Main Line status page.
    pub train_line_url: String,
    /// Kanto area overview listing every line's status.
    pub train_area_url: String,
    pub weather_url: String,
    /// The two lines reported in the area summary, in display order.
    pub area_lines: [String; 2],
}

impl Default for ScrapeTargets {
    fn default() -> Self {
        Self {
            train_line_url: "https://transit.yahoo.co.jp/traininfo/detail/96/0/".to_string(),
            train_area_url: "https://transit.yahoo.co.jp/traininfo/area/4/".to_string(),
            weather_url: "https://tenki.jp/forecast/3/15/4510/12100/".to_string(),
            area_lines: ["京成本線".to_string(), "総武線快速".to_string()],
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub channel_secret: String,
    pub channel_token: String,
    pub fetch_timeout: Duration,
    pub line_api_base: String,
    pub targets: ScrapeTargets,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let channel_secret = required("CHANNEL_SECRET")?;
        let channel_token = required("CHANNEL_TOKEN")?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| {
            tracing::info!("PORT not set, using default {}", DEFAULT_PORT);
            DEFAULT_PORT.to_string()
        });
        let port = port
            .parse::<u16>()
            .map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let fetch_timeout = match env::var("FETCH_TIMEOUT_SECS") {
            Ok(secs) => {
                let secs = secs
                    .parse::<u64>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid fetch timeout: {}", e)))?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        let line_api_base =
            env::var("LINE_API_BASE").unwrap_or_else(|_| DEFAULT_LINE_API_BASE.to_string());

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            channel_secret,
            channel_token,
            fetch_timeout,
            line_api_base,
            targets: ScrapeTargets::default(),
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|e| AppError::ConfigError(format!("{} must be set: {}", name, e)))
}
