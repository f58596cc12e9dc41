//! Current conditions from Wunderground (Fahrenheit) and timeanddate (Celsius).

mod timeanddate;
mod wunderground;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};

pub use timeanddate::{
    AstronomyData, FiveHourEntry, SunMoon, TimeAndDateConditions, TimeAndDateWeather, parse_sun_moon,
    parse_timeanddate,
};
pub use wunderground::{
    AdditionalConditions, AirQuality, Astronomy, HealthReport, Moon, Sun, ValueUnit,
    WundergroundWeather, parse_health, parse_wunderground,
};

use crate::error::{Result, ScrapeError};
use crate::extract::text::{celsius_to_fahrenheit, fahrenheit_to_celsius};
use crate::fetch::Fetcher;

/// A temperature known in one scale and derived in the other.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Temperature {
    #[serde(rename = "C")]
    pub celsius: Option<f64>,
    #[serde(rename = "F")]
    pub fahrenheit: Option<f64>,
}

impl Temperature {
    pub fn from_fahrenheit(fahrenheit: Option<f64>) -> Self {
        Self {
            celsius: fahrenheit.map(fahrenheit_to_celsius),
            fahrenheit,
        }
    }

    pub fn from_celsius(celsius: Option<f64>) -> Self {
        Self {
            celsius,
            fahrenheit: celsius.map(celsius_to_fahrenheit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub icon: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherSource {
    Wunderground,
    TimeAndDate,
}

impl fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeatherSource::Wunderground => "wunderground",
            WeatherSource::TimeAndDate => "timeanddate",
        })
    }
}

impl FromStr for WeatherSource {
    type Err = ScrapeError;

    fn from_str(source: &str) -> Result<Self> {
        match source {
            "wunderground" => Ok(WeatherSource::Wunderground),
            "timeanddate" => Ok(WeatherSource::TimeAndDate),
            other => Err(ScrapeError::invalid(format!(
                "Invalid source: {other}. Must be 'wunderground' or 'timeanddate'"
            ))),
        }
    }
}

/// Either source's report, serialized as that source's own shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WeatherReport {
    Wunderground(WundergroundWeather),
    TimeAndDate(TimeAndDateWeather),
}

#[derive(Clone)]
pub struct Weather {
    fetcher: Fetcher,
    wunderground: String,
    timeanddate: String,
}

impl Weather {
    pub fn new(fetcher: Fetcher, wunderground: impl Into<String>, timeanddate: impl Into<String>) -> Self {
        Self {
            fetcher,
            wunderground: wunderground.into(),
            timeanddate: timeanddate.into(),
        }
    }

    pub async fn current(&self, source: WeatherSource, country: &str, location: &str) -> Result<WeatherReport> {
        for (what, value) in [("country", country), ("location", location)] {
            if !(2..=50).contains(&value.chars().count()) {
                return Err(ScrapeError::invalid(format!("{what} must be 2 to 50 characters")));
            }
        }
        info!(%source, country, location, "Scraping weather");
        match source {
            WeatherSource::Wunderground => self.wunderground(country, location).await.map(WeatherReport::Wunderground),
            WeatherSource::TimeAndDate => self.timeanddate(country, location).await.map(WeatherReport::TimeAndDate),
        }
    }

    /// The health page is a second fetch; losing it only blanks the
    /// air quality fields.
    pub async fn wunderground(&self, country: &str, location: &str) -> Result<WundergroundWeather> {
        let url = format!("{}/weather/{country}/{location}", self.wunderground);
        let html = self.fetcher.fetch(&url).await?;
        let (mut weather, health_link) = parse_wunderground(&html)?;

        let health = match health_link {
            Some(href) => match self.fetcher.fetch(&format!("{}{href}", self.wunderground)).await {
                Ok(page) => parse_health(&page),
                Err(err) => {
                    warn!(error = %err, "Health page unavailable");
                    HealthReport::no_data()
                }
            },
            None => HealthReport::no_data(),
        };
        weather.air_quality = health.air_quality;
        weather.pollen = health.pollen;
        Ok(weather)
    }

    pub async fn timeanddate(&self, country: &str, location: &str) -> Result<TimeAndDateWeather> {
        let weather_url = format!("{}/weather/{country}/{location}", self.timeanddate);
        let astronomy_url = format!("{}/astronomy/{country}/{location}", self.timeanddate);
        let (weather_page, astronomy_page) = tokio::try_join!(
            self.fetcher.fetch(&weather_url),
            self.fetcher.fetch(&astronomy_url)
        )?;

        let mut weather = parse_timeanddate(&weather_page)?;
        weather.astronomy.sun_moon = parse_sun_moon(&astronomy_page);
        Ok(weather)
    }
}
