use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::info;

use super::{Condition, Temperature};
use crate::error::Result;
use crate::extract::reader::{attr, first, first_attr, first_text, text, text_containing};
use crate::extract::text::{
    NOT_AVAILABLE, Reading, celsius_to_fahrenheit, first_number, format_number, high_low, reading,
};
use crate::extract::{Stage, region, stage};
use crate::selector;

#[derive(Debug, Clone, Serialize)]
pub struct TimeAndDateWeather {
    pub location: String,
    pub temperature: Temperature,
    pub feels_like: Temperature,
    pub condition: Condition,
    pub forecast: String,
    pub additional_conditions: TimeAndDateConditions,
    #[serde(rename = "fiveHourForecast")]
    pub five_hour_forecast: Vec<FiveHourEntry>,
    pub astronomy: AstronomyData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAndDateConditions {
    pub pressure: Reading,
    pub visibility: Reading,
    pub humidity: Reading,
    pub dew_point: Reading,
    pub wind: String,
}

impl Default for TimeAndDateConditions {
    fn default() -> Self {
        Self {
            pressure: Reading::missing(),
            visibility: Reading::missing(),
            humidity: Reading::missing(),
            dew_point: Reading::missing(),
            wind: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiveHourEntry {
    pub time: String,
    pub temperature: String,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AstronomyData {
    pub sun_moon: SunMoon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunMoon {
    pub moon_percent: String,
    pub moon_title: String,
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub daylight_hours: String,
}

impl Default for SunMoon {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            moon_percent: na(),
            moon_title: na(),
            sunrise: na(),
            sunset: na(),
            moonrise: na(),
            moonset: na(),
            daylight_hours: na(),
        }
    }
}

/// Parses the weather page. Astronomy comes from its own page and is left
/// at `N/A` here.
pub fn parse_timeanddate(html: &str) -> Result<TimeAndDateWeather> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let focus = region(root, selector!("section.bk-focus"), "current weather")?;

    let location = first_text(root, selector!("div.headline-banner__content h1.headline-banner__title"))
        .map(|title| title.replace("Weather in ", "").trim().to_string())
        .unwrap_or_else(|| "Unknown Location".to_string());

    let temperature = first_text(focus, selector!("div.h2")).and_then(|t| celsius_in(&t));
    let feels_like = text_containing(focus, selector!("p"), "Feels Like:")
        .and_then(|line| line.split_once("Feels Like:").and_then(|(_, rest)| celsius_in(rest)));

    let condition = Condition {
        icon: first_attr(focus, selector!("img#cur-weather"), "src"),
        description: first_text(focus, selector!("p")).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    };

    let forecast = focus
        .select(selector!("span[title]"))
        .find(|span| {
            attr(*span, "title").is_some_and(|title| title.contains("High and low forecasted temperature today"))
        })
        .and_then(|span| high_low(&text(span)))
        .map(|(high, low)| format!("High: {}°C, Low: {}°C", format_number(high), format_number(low)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let additional_conditions = conditions(focus);
    let five_hour_forecast = stage(Stage::Forecast, || five_hour_forecast(root));

    info!(
        location = %location,
        forecast_hours = five_hour_forecast.len(),
        "Parsed timeanddate conditions"
    );
    Ok(TimeAndDateWeather {
        location,
        temperature: Temperature::from_celsius(temperature),
        feels_like: Temperature::from_celsius(feels_like),
        condition,
        forecast,
        additional_conditions,
        five_hour_forecast,
        astronomy: AstronomyData::default(),
    })
}

/// Sun and moon rows of the astronomy page; absent rows stay `N/A`.
pub fn parse_sun_moon(html: &str) -> SunMoon {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let row = |label: &str| {
        text_containing(root, selector!("tr"), label)
            .and_then(|line| line.split_once(": ").map(|(_, value)| value.trim().to_string()))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    SunMoon {
        moon_percent: first_text(root, selector!("span#cur-moon-percent"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        moon_title: first_text(root, selector!("div.bk-focus__qlook a"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        sunrise: row("Sunrise Today:"),
        sunset: row("Sunset Today:"),
        moonrise: row("Moonrise Today:"),
        moonset: row("Moonset Today:"),
        daylight_hours: row("Daylight Hours:"),
    }
}

/// The first number of `text` when it is a Celsius reading.
fn celsius_in(text: &str) -> Option<f64> {
    if text.contains("°C") { first_number(text) } else { None }
}

/// Wind is read from the summary lines, the rest from the info table.
fn conditions(focus: ElementRef<'_>) -> TimeAndDateConditions {
    let wind = text_containing(focus, selector!("p"), "Wind:")
        .and_then(|line| line.split_once("Wind:").map(|(_, rest)| rest.trim().to_string()))
        .filter(|wind| !wind.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let info = first(focus, selector!("div.bk-focus__info"));
    let row = |label: &str| reading(info.and_then(|info| text_containing(info, selector!("tr"), label)).as_deref());

    TimeAndDateConditions {
        pressure: row("Pressure:"),
        visibility: row("Visibility:"),
        humidity: row("Humidity:"),
        dew_point: row("Dew Point:"),
        wind,
    }
}

/// Rows of `table#wt-5hr`: hours, icons, temperatures. Columns whose
/// temperature does not parse are skipped.
fn five_hour_forecast(root: ElementRef<'_>) -> Result<Vec<FiveHourEntry>> {
    let table = region(root, selector!("table#wt-5hr"), "five hour forecast")?;
    let rows: Vec<Vec<ElementRef<'_>>> = table
        .select(selector!("tr"))
        .take(3)
        .map(|row| row.select(selector!("td")).collect())
        .collect();
    let [hours, icons, temps] = rows.as_slice() else {
        return Ok(Vec::new());
    };

    Ok(hours
        .iter()
        .zip(icons)
        .zip(temps)
        .filter_map(|((hour, icon), temp)| {
            let celsius: f64 = text(*temp).replace('\u{a0}', "").replace("°C", "").trim().parse().ok()?;
            let img = first(*icon, selector!("img"));
            Some(FiveHourEntry {
                time: text(*hour),
                temperature: format!(
                    "{} °C / {} °F",
                    format_number(celsius),
                    format_number(celsius_to_fahrenheit(celsius))
                ),
                description: img
                    .and_then(|img| attr(img, "title"))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                icon: img.and_then(|img| attr(img, "src")),
            })
        })
        .collect())
}
