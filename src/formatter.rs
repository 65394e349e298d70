use chrono::{DateTime, FixedOffset, Timelike, Utc};
use once_cell::sync::Lazy;

use crate::scraper::{AreaStatus, DayForecast};

pub const APOLOGY: &str =
    "大変申し訳ございません。エラーが発生しました。時間をおいて試してみて下さい。";

pub const PSY_LYRICS: &str = "オッパン カンナムスタイル！\nEh- Sexy Lady\nオッパン カンナムスタイル！";
pub const THANKS_REPLY: &str = "どういたしまして！またいつでも聞いてくださいね。";
pub const USAGE_REPLY: &str = "使い方:\n\
・「運行情報」京成本線の運行情報\n\
・「路線情報」関東エリアの運行情報\n\
・「天気」今日と明日の天気予報\n\
・それ以外: あいさつと運行情報・天気のまとめ";

pub const CLEAR: &str = "\u{2600}\u{fe0f}";
pub const CLOUDY: &str = "\u{2601}\u{fe0f}";
pub const RAIN: &str = "\u{2614}";
pub const SNOW: &str = "\u{26c4}";
pub const UNKNOWN: &str = "\u{2753}";

pub const LATER: &str = "\u{2192}";
pub const SOMETIMES: &str = "/";
pub const TEMPORARILY: &str = "|";
pub const CONNECTOR: &str = "-";

static TOKYO: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(9 * 3600).expect("Failed to build Asia/Tokyo offset"));

pub fn tokyo() -> FixedOffset {
    *TOKYO
}

pub fn tokyo_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&tokyo())
}

fn condition_symbol(c: char) -> Option<&'static str> {
    match c {
        '晴' => Some(CLEAR),
        '曇' => Some(CLOUDY),
        '雨' => Some(RAIN),
        '雪' => Some(SNOW),
        _ => None,
    }
}

fn marker_symbol(marker: &str) -> &'static str {
    match marker {
        "のち" => LATER,
        "時々" => SOMETIMES,
        "一時" => TEMPORARILY,
        _ => CONNECTOR,
    }
}

/// Turns forecast text such as `晴のち雨` into a pictogram sequence.
///
/// Reads the primary condition from the first character, then, when at
/// least four characters are present, a two-character transition marker
/// and a secondary condition. Any unknown condition collapses the whole
/// result to [`UNKNOWN`].
pub fn pictogram(weather: &str) -> String {
    let chars: Vec<char> = weather.chars().collect();

    let Some(primary) = chars.first().and_then(|c| condition_symbol(*c)) else {
        return UNKNOWN.to_string();
    };

    if chars.len() < 4 {
        return primary.to_string();
    }

    let marker: String = chars[1..3].iter().collect();
    let connector = marker_symbol(&marker);

    match condition_symbol(chars[3]) {
        Some(secondary) => format!("{}{}{}", primary, connector, secondary),
        None => UNKNOWN.to_string(),
    }
}

pub fn format_train_line(status: &str) -> String {
    status.to_string()
}

pub fn format_train_area(area: &AreaStatus) -> String {
    let mut result = format!("【{}】\n{}", area.title, area.updated_at);

    for line in &area.lines {
        result.push_str(&format!("\n\n■{}\n{}", line.name, line.status));
    }

    result
}

fn format_day(day: &DayForecast) -> String {
    format!(
        "【{}】\n天気: {} {}\n最高気温: {}℃\n最低気温: {}℃",
        day.date,
        day.weather,
        pictogram(&day.weather),
        day.high_temp,
        day.low_temp
    )
}

pub fn format_weather(days: &[DayForecast]) -> String {
    days.iter().map(format_day).collect::<Vec<_>>().join("\n\n")
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "おはようございます！",
        12..=17 => "こんにちは！",
        18..=23 => "こんばんは！",
        _ => "夜更かしさんですね。そろそろおやすみなさい。",
    }
}

pub fn format_combined(now: DateTime<FixedOffset>, train: &str, weather: &str) -> String {
    format!("{}\n\n{}\n\n{}", greeting(now.hour()), train, weather)
}
