use async_trait::async_trait;

use super::{Coordinates, Geolocation, LocationError};

/// Position given up front, e.g. on the command line.
pub struct FixedPosition {
    coordinates: Coordinates,
}

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Result<FixedPosition, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::Unavailable {
                msg: format!("coordinates out of range: {latitude},{longitude}"),
            });
        }
        Ok(FixedPosition {
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        })
    }
}

#[async_trait]
impl Geolocation for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}
