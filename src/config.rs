use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PLACES_HOST: &str = "https://maps.googleapis.com/maps/api";
pub const DEFAULT_GEOLOCATION_ENDPOINT: &str = "http://ip-api.com/json/";
pub const DEFAULT_SEARCH_RADIUS: u32 = 5000;
pub const DEFAULT_ZOOM: u8 = 15;

/// Keyword presets offered next to free-text search.
pub const PRESETS: &[(&str, &str)] = &[("golf", "打ちっぱなし ゴルフ練習場"), ("ramen", "ラーメン")];

pub fn preset(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, keyword)| *keyword)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {name}")]
    Missing { name: &'static str },
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(rename = "places_api_key")]
    pub api_key: Secret<String>,
    #[serde(rename = "places_api_host")]
    pub places_host: String,
    #[serde(rename = "places_language", default)]
    pub language: Option<String>,
    #[serde(rename = "places_default_keyword")]
    pub default_keyword: String,
    #[serde(rename = "places_search_radius")]
    pub search_radius: u32,
    #[serde(rename = "map_default_zoom")]
    pub zoom: u8,
    #[serde(rename = "geolocation_permission")]
    pub geolocation: Permission,
    pub geolocation_endpoint: String,
    #[serde(skip_deserializing, default = "location_timeout")]
    pub location_timeout: Duration,
    #[serde(skip_deserializing, default = "search_timeout")]
    pub search_timeout: Duration,
    #[serde(skip_deserializing, default = "details_timeout")]
    pub details_timeout: Duration,
}

fn location_timeout() -> Duration {
    Duration::from_secs(10)
}

fn search_timeout() -> Duration {
    Duration::from_secs(15)
}

fn details_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Settings {
    pub fn new(api_key: &str) -> Settings {
        Settings {
            api_key: Secret::new(api_key.to_owned()),
            places_host: DEFAULT_PLACES_HOST.to_owned(),
            language: None,
            default_keyword: PRESETS[0].1.to_owned(),
            search_radius: DEFAULT_SEARCH_RADIUS,
            zoom: DEFAULT_ZOOM,
            geolocation: Permission::Granted,
            geolocation_endpoint: DEFAULT_GEOLOCATION_ENDPOINT.to_owned(),
            location_timeout: location_timeout(),
            search_timeout: search_timeout(),
            details_timeout: details_timeout(),
        }
    }

    pub fn from_env() -> Result<Settings, ConfigError> {
        Settings::parse(config::Environment::default())
    }

    fn parse(source: config::Environment) -> Result<Settings, ConfigError> {
        let settings = config::Config::builder()
            .set_default("places_api_key", "")?
            .set_default("places_api_host", DEFAULT_PLACES_HOST)?
            .set_default("places_default_keyword", PRESETS[0].1)?
            .set_default("places_search_radius", i64::from(DEFAULT_SEARCH_RADIUS))?
            .set_default("map_default_zoom", i64::from(DEFAULT_ZOOM))?
            .set_default("geolocation_permission", "granted")?
            .set_default("geolocation_endpoint", DEFAULT_GEOLOCATION_ENDPOINT)?
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        if settings.api_key.expose_secret().is_empty() {
            return Err(ConfigError::Missing {
                name: "PLACES_API_KEY",
            });
        }

        Ok(Settings {
            places_host: settings.places_host.trim_end_matches('/').to_owned(),
            language: settings.language.filter(|l| !l.is_empty()),
            ..settings
        })
    }
}
