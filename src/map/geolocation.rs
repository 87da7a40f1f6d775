//! Best-effort lookup of the device position, used once to center the map.
//!
//! A lookup may fail, may never resolve, or may not be available at all; every
//! outcome is tolerated by falling back to the configured default viewport.

use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::models::{Coordinate, CoordinateError};

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("geolocation is not available")]
    Unsupported,

    #[error("location request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("location service returned an invalid position: {0}")]
    InvalidPosition(#[from] CoordinateError),

    #[error("location lookup was cancelled")]
    Cancelled,
}

/// Something that can report where the device is.
pub trait Geolocator: Send + Sync + 'static {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Approximate position derived from the public IP address.
///
/// Accepts either `{"lat": .., "lon": ..}` or `{"latitude": .., "longitude": ..}`
/// response bodies.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct IpPosition {
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "longitude")]
    lon: f64,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }
}

impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        let position: IpPosition = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Coordinate::new(position.lat, position.lon)?)
    }
}

/// The position source chosen at startup.
#[derive(Debug, Clone)]
pub enum DeviceLocation {
    Ip(IpGeolocator),
    Fixed(Coordinate),
    Unsupported,
}

impl DeviceLocation {
    pub fn from_url(url: Option<&str>) -> Self {
        match url {
            Some(url) => Self::Ip(IpGeolocator::new(url)),
            None => Self::Unsupported,
        }
    }
}

impl Geolocator for DeviceLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        match self {
            Self::Ip(ip) => ip.current_position().await,
            Self::Fixed(coordinate) => Ok(*coordinate),
            Self::Unsupported => Err(LocationError::Unsupported),
        }
    }
}

/// A one-shot position lookup running in the background.
///
/// Dropping the task or calling [`LocateTask::cancel`] aborts the lookup.
pub struct LocateTask {
    handle: JoinHandle<Result<Coordinate, LocationError>>,
}

impl LocateTask {
    /// Start a lookup. Must be called from within a Tokio runtime.
    pub fn spawn<G: Geolocator>(locator: Arc<G>) -> Self {
        let handle = tokio::spawn(async move { locator.current_position().await });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the lookup. Cancel-safe, so it can sit in a `select!` loop.
    pub async fn resolved(&mut self) -> Result<Coordinate, LocationError> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Location lookup task failed");
                }
                Err(LocationError::Cancelled)
            }
        }
    }
}

impl Drop for LocateTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
