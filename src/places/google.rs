use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use super::{
    DetailField, FailureReason, NearbyRequest, OpeningHours, PlaceDetail, PlaceId, PlaceSummary,
    PlacesError, PlacesService, StatusCode,
};
use crate::{config::Settings, map::LatLng};

const NEARBY_SEARCH_PATH: &str = "/place/nearbysearch/json";
const PLACE_DETAILS_PATH: &str = "/place/details/json";

#[derive(Deserialize)]
struct NearbyResponse {
    status: StatusCode,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Deserialize)]
struct NearbyResult {
    place_id: String,
    name: String,
    rating: Option<f64>,
    geometry: Geometry,
    vicinity: Option<String>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: StatusCode,
    result: Option<DetailsResult>,
}

#[derive(Deserialize)]
struct DetailsResult {
    #[serde(default)]
    name: String,
    rating: Option<f64>,
    formatted_address: Option<String>,
    opening_hours: Option<DetailsOpeningHours>,
}

#[derive(Deserialize)]
struct DetailsOpeningHours {
    open_now: Option<bool>,
    #[serde(default)]
    weekday_text: Vec<String>,
}

/// Google Places web service client.
pub struct GooglePlaces {
    client: Client,
    host: String,
    api_key: Secret<String>,
    language: Option<String>,
}

impl GooglePlaces {
    pub fn new(settings: &Settings) -> Result<GooglePlaces, reqwest::Error> {
        Ok(GooglePlaces {
            client: Client::builder().build()?,
            host: settings.places_host.clone(),
            api_key: settings.api_key.clone(),
            language: settings.language.clone(),
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FailureReason> {
        let mut params = params.to_vec();
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params.push(("key", self.api_key.expose_secret().clone()));
        Url::parse_with_params(&format!("{}{}", self.host, path), &params)
            .map_err(|err| FailureReason::Transport(format!("failed to build url: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FailureReason> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|err| FailureReason::Transport(err.to_string()))?
            .json::<T>()
            .await
            .map_err(|err| FailureReason::Decode(err.to_string()))
    }
}

#[async_trait]
impl PlacesService for GooglePlaces {
    async fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        let url = self
            .url(
                NEARBY_SEARCH_PATH,
                &[
                    ("location", request.location.to_string()),
                    ("radius", request.radius.to_string()),
                    ("keyword", request.keyword.clone()),
                ],
            )
            .map_err(PlacesError::Search)?;
        let response = self
            .get_json::<NearbyResponse>(url)
            .await
            .map_err(PlacesError::Search)?;

        if !response.status.is_ok() {
            return Err(PlacesError::Search(FailureReason::Status(response.status)));
        }

        Ok(response
            .results
            .into_iter()
            .map(|r| PlaceSummary {
                id: r.place_id.into(),
                name: r.name,
                rating: r.rating,
                location: LatLng::new(r.geometry.location.lat, r.geometry.location.lng),
                vicinity: r.vicinity,
            })
            .collect())
    }

    async fn details(
        &self,
        place_id: &PlaceId,
        fields: &[DetailField],
    ) -> Result<PlaceDetail, PlacesError> {
        let fields = fields
            .iter()
            .map(DetailField::api_name)
            .collect::<Vec<_>>()
            .join(",");
        let url = self
            .url(
                PLACE_DETAILS_PATH,
                &[("place_id", place_id.to_string()), ("fields", fields)],
            )
            .map_err(PlacesError::Details)?;
        let response = self
            .get_json::<DetailsResponse>(url)
            .await
            .map_err(PlacesError::Details)?;

        match (response.status, response.result) {
            (StatusCode::OK, Some(result)) => Ok(PlaceDetail {
                name: result.name,
                rating: result.rating,
                formatted_address: result.formatted_address,
                opening_hours: result.opening_hours.map(|hours| OpeningHours {
                    open_now: hours.open_now,
                    weekday_text: hours.weekday_text,
                }),
            }),
            (StatusCode::OK, None) => Err(PlacesError::Details(FailureReason::Decode(
                "OK response without result".to_owned(),
            ))),
            (status, _) => Err(PlacesError::Details(FailureReason::Status(status))),
        }
    }
}
