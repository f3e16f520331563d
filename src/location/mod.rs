use std::{convert::identity, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;
use tokio::time::timeout;

use crate::{
    config::Permission,
    map::{Icon, LatLng, MapSurface, MapView, MarkerId, MarkerOptions},
};

pub use fixed::FixedPosition;
pub use ip_api::IpApi;

mod fixed;
mod ip_api;

pub const CURRENT_LOCATION_TITLE: &str = "Current location";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinates> for LatLng {
    fn from(c: Coordinates) -> Self {
        LatLng::new(c.latitude, c.longitude)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("timed out waiting for a position")]
    Timeout,
    #[error("position unavailable: {msg}")]
    Unavailable { msg: String },
}

/// Single-shot source of the device position.
#[async_trait]
pub trait Geolocation: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

#[async_trait]
impl<G: Geolocation + ?Sized> Geolocation for Arc<G> {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        (**self).current_position().await
    }
}

/// Permission gate in front of a geolocation source.
pub struct Gated<G> {
    inner: G,
    permission: Permission,
}

impl<G> Gated<G> {
    pub fn new(inner: G, permission: Permission) -> Gated<G> {
        Gated { inner, permission }
    }
}

#[async_trait]
impl<G: Geolocation> Geolocation for Gated<G> {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        match self.permission {
            Permission::Granted => self.inner.current_position().await,
            Permission::Denied => Err(LocationError::PermissionDenied),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentLocationMarker {
    pub id: MarkerId,
    pub position: LatLng,
}

pub struct LocationAcquirer {
    geolocation: Arc<dyn Geolocation>,
    surface: MapSurface,
    zoom: u8,
    timeout: Duration,
}

impl LocationAcquirer {
    pub fn new(
        geolocation: Arc<dyn Geolocation>,
        surface: MapSurface,
        zoom: u8,
        timeout: Duration,
    ) -> LocationAcquirer {
        LocationAcquirer {
            geolocation,
            surface,
            zoom,
            timeout,
        }
    }

    /// Mounts a fresh view centered on the device position. Nothing is
    /// mounted when the position cannot be obtained.
    pub async fn acquire(&self) -> Result<(MapView, CurrentLocationMarker), LocationError> {
        let coordinates = timeout(self.timeout, self.geolocation.current_position())
            .await
            .map_err(|_| LocationError::Timeout)
            .and_then(identity)
            .map_err(|err| {
                warn!("Failed to acquire current location: {}", err);
                err
            })?;

        let position = LatLng::from(coordinates);
        let view = self.surface.mount(position, self.zoom);
        let id = view.add_marker(MarkerOptions {
            position,
            title: CURRENT_LOCATION_TITLE.to_owned(),
            icon: Icon::CurrentLocation,
        });
        info!("Map centered on current location {}", position);

        Ok((view, CurrentLocationMarker { id, position }))
    }
}
