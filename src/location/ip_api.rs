use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{Coordinates, Geolocation, LocationError};

#[derive(Deserialize)]
struct Response {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate position from the caller's public IP address.
pub struct IpApi {
    client: Client,
    endpoint: Url,
}

impl IpApi {
    pub fn new(endpoint: &str) -> Result<IpApi, LocationError> {
        let endpoint = Url::parse(endpoint).map_err(|err| LocationError::Unavailable {
            msg: format!("invalid geolocation endpoint {endpoint}: {err}"),
        })?;
        Ok(IpApi {
            client: Client::builder()
                .build()
                .map_err(|_| LocationError::Unavailable {
                    msg: "cannot create reqwest client".to_owned(),
                })?,
            endpoint,
        })
    }
}

#[async_trait]
impl Geolocation for IpApi {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|err| LocationError::Unavailable {
                msg: format!("failed to reach {}: {}", self.endpoint, err),
            })?
            .json::<Response>()
            .await
            .map_err(|_| LocationError::Unavailable {
                msg: "cannot deserialize response".to_owned(),
            })?;

        if response.status != "success" {
            return Err(LocationError::Unavailable {
                msg: response
                    .message
                    .unwrap_or_else(|| format!("lookup status {}", response.status)),
            });
        }

        match (response.lat, response.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(LocationError::Unavailable {
                msg: "response without coordinates".to_owned(),
            }),
        }
    }
}
