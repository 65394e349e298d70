use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, StatusCode};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// Body of a page that answered 200.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawPage>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage> {
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "page fetch failed");
            AppError::from(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or_default().to_string();
            warn!(url = %url, status = status.as_u16(), reason = %reason, "unexpected status code");
            return Err(AppError::StatusError {
                status: status.as_u16(),
                reason,
            });
        }

        let body = response.bytes().await?;
        debug!(url = %url, bytes = body.len(), elapsed = ?start.elapsed(), "fetched page");

        Ok(RawPage {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

pub fn parse_document(body: &[u8]) -> Result<Html> {
    let html = std::str::from_utf8(body)
        .map_err(|e| AppError::ParseError(format!("Page body is not valid UTF-8: {}", e)))?;

    Ok(Html::parse_document(html))
}

#[derive(Debug, Clone)]
enum Step {
    Css(Selector),
    First,
}

/// Ordered selector steps, each narrowing the current node set to the
/// descendants that match it.
#[derive(Debug, Clone, Default)]
pub struct SelectorPath {
    steps: Vec<Step>,
}

impl SelectorPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(steps: &[&str]) -> Result<Self> {
        steps.iter().try_fold(Self::new(), |path, step| path.css(step))
    }

    pub fn css(mut self, selector: &str) -> Result<Self> {
        let parsed = Selector::parse(selector).map_err(|e| {
            AppError::ParseError(format!("Invalid selector `{}`: {:?}", selector, e))
        })?;
        self.steps.push(Step::Css(parsed));
        Ok(self)
    }

    /// Keep only the first node of the current set.
    pub fn first(mut self) -> Self {
        self.steps.push(Step::First);
        self
    }

    pub fn select<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let mut current = vec![scope];

        for step in &self.steps {
            current = match step {
                Step::Css(selector) => {
                    let mut seen = HashSet::new();
                    current
                        .iter()
                        .flat_map(|element| element.select(selector))
                        .filter(|element| seen.insert(element.id()))
                        .collect()
                }
                Step::First => current.into_iter().take(1).collect(),
            };

            if current.is_empty() {
                break;
            }
        }

        current
    }
}

/// Text of every node the path reaches, in document order, trimmed.
/// A path that matches nothing yields an empty string.
pub fn extract_text(scope: ElementRef<'_>, path: &SelectorPath) -> String {
    path.select(scope)
        .iter()
        .flat_map(|element| element.text())
        .collect::<String>()
        .trim()
        .to_string()
}

// Static selector paths for the scraped pages
static SERVICE_STATUS_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["div#mdServiceStatus", "p"])
        .expect("Failed to parse service status selector")
});

static AREA_TITLE_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["div.labelLarge", "h1.title"])
        .expect("Failed to parse area title selector")
        .first()
});

static AREA_UPDATED_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["div.labelLarge", "span.subText"])
        .expect("Failed to parse area timestamp selector")
        .first()
});

static AREA_ROW_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["div.elmTblLstLine", "table tr"])
        .expect("Failed to parse area row selector")
});

static AREA_ROW_NAME_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["td:nth-of-type(1)"]).expect("Failed to parse line name selector")
});

static AREA_ROW_STATUS_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["td:nth-of-type(2)"]).expect("Failed to parse line status selector")
});

static FORECAST_DAY_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["div.forecast-days-wrap > section"])
        .expect("Failed to parse forecast day selector")
});

static FORECAST_DATE_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["h3.left-style"]).expect("Failed to parse forecast date selector")
});

static FORECAST_WEATHER_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["p.weather-telop"]).expect("Failed to parse forecast weather selector")
});

static FORECAST_HIGH_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["dd.high-temp", "span.value"])
        .expect("Failed to parse high temperature selector")
});

static FORECAST_LOW_PATH: Lazy<SelectorPath> = Lazy::new(|| {
    SelectorPath::parse(&["dd.low-temp", "span.value"])
        .expect("Failed to parse low temperature selector")
});

/// Status paragraph of a single line's detail page.
pub fn extract_service_status(document: &Html) -> String {
    extract_text(document.root_element(), &SERVICE_STATUS_PATH)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStatus {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaStatus {
    pub title: String,
    pub updated_at: String,
    pub lines: Vec<LineStatus>,
}

/// Status cell of the area table row whose first cell is `name`.
pub fn extract_line_status(document: &Html, name: &str) -> String {
    AREA_ROW_PATH
        .select(document.root_element())
        .into_iter()
        .find(|row| extract_text(*row, &AREA_ROW_NAME_PATH) == name)
        .map(|row| extract_text(row, &AREA_ROW_STATUS_PATH))
        .unwrap_or_default()
}

pub fn extract_area_status(document: &Html, line_names: &[String]) -> AreaStatus {
    let root = document.root_element();

    AreaStatus {
        title: extract_text(root, &AREA_TITLE_PATH),
        updated_at: extract_text(root, &AREA_UPDATED_PATH),
        lines: line_names
            .iter()
            .map(|name| LineStatus {
                name: name.clone(),
                status: extract_line_status(document, name),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayForecast {
    pub date: String,
    pub weather: String,
    pub high_temp: String,
    pub low_temp: String,
}

/// One entry per forecast day block, in page order.
pub fn extract_forecast(document: &Html) -> Vec<DayForecast> {
    FORECAST_DAY_PATH
        .select(document.root_element())
        .into_iter()
        .map(|day| DayForecast {
            date: extract_text(day, &FORECAST_DATE_PATH),
            weather: extract_text(day, &FORECAST_WEATHER_PATH),
            high_temp: extract_text(day, &FORECAST_HIGH_PATH),
            low_temp: extract_text(day, &FORECAST_LOW_PATH),
        })
        .collect()
}
