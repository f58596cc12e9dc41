use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::info;

use super::{Condition, Temperature};
use crate::error::Result;
use crate::extract::reader::{first, first_attr, first_text, text};
use crate::extract::text::{NOT_AVAILABLE, first_number};
use crate::extract::{Stage, region, stage};
use crate::selector;

const NO_DATA: &str = "No data";

#[derive(Debug, Clone, Serialize)]
pub struct WundergroundWeather {
    pub location: String,
    pub temperature: Temperature,
    pub feels_like: Temperature,
    pub condition: Condition,
    pub forecast: String,
    pub pollen: String,
    pub air_quality: AirQuality,
    pub additional_conditions: AdditionalConditions,
    pub astronomy: Astronomy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQuality {
    pub aqi_value: String,
    pub aqi_type: String,
    pub aqi_icon: String,
    pub aqi_suggestion: String,
    pub dominant_pollutant: String,
    pub pollutant_desc: String,
}

impl AirQuality {
    fn no_data() -> Self {
        Self {
            aqi_value: NO_DATA.to_string(),
            aqi_type: NO_DATA.to_string(),
            aqi_icon: NO_DATA.to_string(),
            aqi_suggestion: NO_DATA.to_string(),
            dominant_pollutant: NO_DATA.to_string(),
            pollutant_desc: NO_DATA.to_string(),
        }
    }
}

/// What the linked health page contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub air_quality: AirQuality,
    pub pollen: String,
}

impl HealthReport {
    pub fn no_data() -> Self {
        Self {
            air_quality: AirQuality::no_data(),
            pollen: NO_DATA.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueUnit {
    pub value: String,
    pub unit: String,
}

impl Default for ValueUnit {
    fn default() -> Self {
        Self {
            value: NOT_AVAILABLE.to_string(),
            unit: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalConditions {
    pub pressure: ValueUnit,
    pub visibility: ValueUnit,
    pub clouds: String,
    pub dew_point: ValueUnit,
    pub humidity: ValueUnit,
    pub rainfall: ValueUnit,
    pub snow_depth: ValueUnit,
}

impl Default for AdditionalConditions {
    fn default() -> Self {
        Self {
            pressure: ValueUnit::default(),
            visibility: ValueUnit::default(),
            clouds: NOT_AVAILABLE.to_string(),
            dew_point: ValueUnit::default(),
            humidity: ValueUnit::default(),
            rainfall: ValueUnit::default(),
            snow_depth: ValueUnit::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sun {
    pub sunrise: String,
    pub sunset: String,
    pub length_of_day: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moon {
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub moon_illumination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Astronomy {
    pub sun: Sun,
    pub moon: Moon,
}

impl Default for Astronomy {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            sun: Sun {
                sunrise: na(),
                sunset: na(),
                length_of_day: na(),
            },
            moon: Moon {
                moonrise: na(),
                moonset: na(),
                moon_phase: na(),
                moon_illumination: na(),
            },
        }
    }
}

/// Parses the conditions page. Also returns the site-relative link of the
/// health page when the page has one; air quality and pollen are left as
/// `No data` until that page is merged in.
pub fn parse_wunderground(html: &str) -> Result<(WundergroundWeather, Option<String>)> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let main = region(root, selector!("div.region-content-main"), "weather conditions")?;

    let location = first_text(root, selector!("div.city-header h1 span"))
        .map(|header| drop_last_words(&header, 2))
        .unwrap_or_else(|| "Unknown".to_string());
    let temperature = first_text(main, selector!("span.wu-value.wu-value-to")).and_then(|t| first_number(&t));
    let feels_like = first_text(main, selector!("div.feels-like span.temp")).and_then(|t| first_number(&t));

    let condition = match first(main, selector!("div.condition-icon")) {
        Some(icon) => Condition {
            icon: first_attr(icon, selector!("img"), "src"),
            description: first_text(icon, selector!("p")).unwrap_or_else(|| "Unknown".to_string()),
        },
        None => Condition {
            icon: None,
            description: "Unknown".to_string(),
        },
    };
    let forecast = first_text(main, selector!("p.weather-quickie"))
        .unwrap_or_else(|| "No forecast available".to_string());

    let additional_conditions = stage(Stage::Conditions, || additional_conditions(root));
    let astronomy = stage(Stage::Astronomy, || astronomy(root));
    let health_link = root
        .select(selector!("div.city-forecast"))
        .nth(1)
        .and_then(|section| first_attr(section, selector!("lib-air-quality-tile a"), "href"));

    info!(location = %location, health_page = health_link.is_some(), "Parsed Wunderground conditions");
    let health = HealthReport::no_data();
    Ok((
        WundergroundWeather {
            location,
            temperature: Temperature::from_fahrenheit(temperature),
            feels_like: Temperature::from_fahrenheit(feels_like),
            condition,
            forecast,
            pollen: health.pollen,
            air_quality: health.air_quality,
            additional_conditions,
            astronomy,
        },
        health_link,
    ))
}

/// Air quality and pollen from the health page. Every missing node is `No data`.
pub fn parse_health(html: &str) -> HealthReport {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let no_data = || NO_DATA.to_string();

    let current = first(root, selector!("div.aqi-current"));
    let data = current.and_then(|c| first(c, selector!("div.data")));
    let in_data = |sel: &Selector| data.and_then(|d| first_text(d, sel));

    let air_quality = AirQuality {
        aqi_value: first_text(root, selector!("div.aqi-value")).unwrap_or_else(no_data),
        aqi_type: first_text(root, selector!("div.aqi-type")).unwrap_or_else(no_data),
        aqi_icon: current
            .and_then(|c| first_attr(c, selector!("img[alt=\"icon\"]"), "src"))
            .unwrap_or_else(no_data),
        aqi_suggestion: in_data(selector!("p")).unwrap_or_else(no_data),
        dominant_pollutant: data
            .and_then(|d| d.select(selector!("div.aqi-value")).nth(1))
            .map(text)
            .unwrap_or_else(no_data),
        pollutant_desc: in_data(selector!("p.pollutant-desc")).unwrap_or_else(no_data),
    };
    let pollen = first_text(root, selector!("div.region-pollen div.status")).unwrap_or_else(no_data);

    HealthReport { air_quality, pollen }
}

/// `Chicago, IL Weather Conditions` → `Chicago, IL`.
fn drop_last_words(text: &str, count: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    words[..words.len().saturating_sub(count)].join(" ")
}

/// The value cell is the second `div` of a row, the label the first.
fn additional_conditions(root: ElementRef<'_>) -> Result<AdditionalConditions> {
    let module = region(root, selector!("div.data-module.additional-conditions"), "additional conditions")?;
    let mut conditions = AdditionalConditions::default();

    for row in module.select(selector!("div.row")) {
        let mut divs = row.select(selector!("div"));
        let (Some(label), Some(cell)) = (divs.next(), divs.next()) else {
            continue;
        };
        let label = text(label).to_lowercase();
        if label.starts_with("clouds") {
            if let Some(clouds) = first_text(cell, selector!("span.wx-value")) {
                conditions.clouds = clouds;
            }
            continue;
        }
        let slot = match label.as_str() {
            l if l.starts_with("pressure") => &mut conditions.pressure,
            l if l.starts_with("visibility") => &mut conditions.visibility,
            l if l.starts_with("dew point") => &mut conditions.dew_point,
            l if l.starts_with("humidity") => &mut conditions.humidity,
            l if l.starts_with("rainfall") => &mut conditions.rainfall,
            l if l.starts_with("snow depth") => &mut conditions.snow_depth,
            _ => continue,
        };
        *slot = value_unit(cell);
    }
    Ok(conditions)
}

fn value_unit(cell: ElementRef<'_>) -> ValueUnit {
    ValueUnit {
        value: first_text(cell, selector!("span.wu-value.wu-value-to"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        unit: first_text(cell, selector!("span.wu-label"))
            .map(|unit| unit.replace('°', "").trim().to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

fn astronomy(root: ElementRef<'_>) -> Result<Astronomy> {
    let module = region(root, selector!("div.data-module.city-astronomy"), "astronomy")?;
    let mut astronomy = Astronomy::default();
    let nth_text = |node: ElementRef<'_>, sel: &Selector, n: usize| node.select(sel).nth(n).map(text).filter(|t| !t.is_empty());

    if let Some(row) = module.select(selector!("div.row.collapse")).nth(1) {
        let times = selector!("div.columns.small-3");
        if let Some(sunrise) = nth_text(row, times, 0) {
            astronomy.sun.sunrise = sunrise;
        }
        if let Some(sunset) = nth_text(row, times, 1) {
            astronomy.sun.sunset = sunset;
        }
    }
    if let Some(length) = first(module, selector!("div.row.collapse.ng-star-inserted"))
        .and_then(|row| nth_text(row, selector!("div.columns.small-6"), 1))
    {
        astronomy.sun.length_of_day = length;
    }

    if let Some(row) = first(module, selector!("div.row.collapse.moon-rise-set")) {
        let mut times = row
            .select(selector!("div.columns.small-3"))
            .map(|column| first_text(column, selector!("span.data-point")));
        if let Some(Some(moonrise)) = times.next() {
            astronomy.moon.moonrise = moonrise;
        }
        if let Some(Some(moonset)) = times.next() {
            astronomy.moon.moonset = moonset;
        }
    }
    if let Some(phase) = first(module, selector!("div.row.collapse.phase-today")) {
        if let Some(name) = first_text(phase, selector!("div.phase-name")) {
            astronomy.moon.moon_phase = name;
        }
        if let Some(illumination) = first_text(phase, selector!("span.data-point")) {
            astronomy.moon.moon_illumination = illumination;
        }
    }
    Ok(astronomy)
}
