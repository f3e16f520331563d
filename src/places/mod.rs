use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::map::LatLng;

pub use google::GooglePlaces;
pub use status::StatusCode;

mod google;
mod status;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceId(String);

impl From<String> for PlaceId {
    fn from(value: String) -> Self {
        PlaceId(value)
    }
}

impl From<&str> for PlaceId {
    fn from(value: &str) -> Self {
        PlaceId(value.to_owned())
    }
}

impl AsRef<str> for PlaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSummary {
    pub id: PlaceId,
    pub name: String,
    pub rating: Option<f64>,
    pub location: LatLng,
    pub vicinity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetail {
    pub name: String,
    pub rating: Option<f64>,
    pub formatted_address: Option<String>,
    pub opening_hours: Option<OpeningHours>,
}

impl PlaceDetail {
    /// Unknown opening state counts as closed.
    pub fn is_open_now(&self) -> bool {
        self.opening_hours
            .as_ref()
            .and_then(|hours| hours.open_now)
            .unwrap_or(false)
    }

    /// Text shown in the info panel.
    pub fn render(&self) -> String {
        let rating = self
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| UNKNOWN.to_owned());
        let address = self.formatted_address.as_deref().unwrap_or(UNKNOWN);
        let hours = match &self.opening_hours {
            Some(hours) if !hours.weekday_text.is_empty() => hours.weekday_text.join("\n"),
            _ => UNKNOWN.to_owned(),
        };
        format!(
            "{}\nRating: {}\nAddress: {}\nHours:\n{}",
            self.name, rating, address, hours
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Name,
    Rating,
    OpeningHours,
    FormattedAddress,
}

impl DetailField {
    pub fn api_name(&self) -> &'static str {
        match self {
            DetailField::Name => "name",
            DetailField::Rating => "rating",
            DetailField::OpeningHours => "opening_hours",
            DetailField::FormattedAddress => "formatted_address",
        }
    }
}

/// The fields the info panel needs.
pub const DETAIL_FIELDS: [DetailField; 4] = [
    DetailField::Name,
    DetailField::Rating,
    DetailField::OpeningHours,
    DetailField::FormattedAddress,
];

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub location: LatLng,
    pub radius: u32,
    pub keyword: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FailureReason {
    #[error("status {0}")]
    Status(StatusCode),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("cannot deserialize response: {0}")]
    Decode(String),
    #[error("timed out")]
    Timeout,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlacesError {
    #[error("nearby search failed: {0}")]
    Search(FailureReason),
    #[error("place details failed: {0}")]
    Details(FailureReason),
}

#[async_trait]
pub trait PlacesService: Send + Sync {
    async fn nearby_search(&self, request: &NearbyRequest)
        -> Result<Vec<PlaceSummary>, PlacesError>;

    async fn details(
        &self,
        place_id: &PlaceId,
        fields: &[DetailField],
    ) -> Result<PlaceDetail, PlacesError>;
}
