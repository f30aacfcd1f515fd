//! Geocoding with bounded retries, and the map surface that shows the result.
//!
//! The provider and the map are reached through the [`Geocoder`] and
//! [`MapBackend`] traits; [`crate::maps`] implements them for the browser.

use crate::config::{GEOCODE_INITIAL_BACKOFF_MS, GEOCODE_MAX_ATTEMPTS, GEOCODE_REGION};
use futures::future::LocalBoxFuture;
use log::{info, warn};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// South-west / north-east corners of a search box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

/// Lower 48 states.
pub const CONTINENTAL_US: LatLngBounds = LatLngBounds {
    south_west: LatLng {
        lat: 24.396308,
        lng: -125.0,
    },
    north_east: LatLng {
        lat: 49.384358,
        lng: -66.93457,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub address: String,
    pub region: &'static str,
    pub bounds: LatLngBounds,
}

impl GeocodeRequest {
    pub fn us(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            region: GEOCODE_REGION,
            bounds: CONTINENTAL_US,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub location: LatLng,
    pub formatted_address: String,
}

/// Provider status codes other than `OK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeStatus {
    OverQueryLimit,
    ZeroResults,
    UnknownError,
    RequestDenied,
    InvalidRequest,
    Error,
    Other(String),
}

impl GeocodeStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "OVER_QUERY_LIMIT" => GeocodeStatus::OverQueryLimit,
            "ZERO_RESULTS" => GeocodeStatus::ZeroResults,
            "UNKNOWN_ERROR" => GeocodeStatus::UnknownError,
            "REQUEST_DENIED" => GeocodeStatus::RequestDenied,
            "INVALID_REQUEST" => GeocodeStatus::InvalidRequest,
            "ERROR" => GeocodeStatus::Error,
            other => GeocodeStatus::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            GeocodeStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            GeocodeStatus::ZeroResults => "ZERO_RESULTS",
            GeocodeStatus::UnknownError => "UNKNOWN_ERROR",
            GeocodeStatus::RequestDenied => "REQUEST_DENIED",
            GeocodeStatus::InvalidRequest => "INVALID_REQUEST",
            GeocodeStatus::Error => "ERROR",
            GeocodeStatus::Other(code) => code,
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeocodeStatus::OverQueryLimit | GeocodeStatus::ZeroResults | GeocodeStatus::UnknownError
        )
    }
}

impl fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Terminal geocoding failure; the message embeds the last status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to load map location ({status})")]
pub struct GeocodeFailure {
    pub status: GeocodeStatus,
    pub attempts: u32,
}

/// A single geocode call against the provider.
pub trait Geocoder {
    fn geocode<'a>(
        &'a self,
        request: &'a GeocodeRequest,
    ) -> LocalBoxFuture<'a, Result<GeocodeHit, GeocodeStatus>>;
}

/// Attempt budget and exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: GEOCODE_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(GEOCODE_INITIAL_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt number `attempt` (1-based): 1s, 2s, 4s...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .checked_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            .unwrap_or(Duration::MAX)
    }
}

/// Geocode `request`, retrying transient failures per `policy`. `sleep` is
/// awaited between attempts.
pub async fn geocode_with_retry<G, S, F>(
    geocoder: &G,
    request: &GeocodeRequest,
    policy: RetryPolicy,
    mut sleep: S,
) -> Result<GeocodeHit, GeocodeFailure>
where
    G: Geocoder + ?Sized,
    S: FnMut(Duration) -> F,
    F: Future<Output = ()>,
{
    let mut attempt = 1;
    loop {
        match geocoder.geocode(request).await {
            Ok(hit) => {
                info!("Geocoded {:?} to {}", request.address, hit.formatted_address);
                return Ok(hit);
            }
            Err(status) => {
                warn!(
                    "Geocoding failed for {:?} (attempt {}/{}): {}",
                    request.address, attempt, policy.max_attempts, status
                );
                if !status.is_retryable() || attempt >= policy.max_attempts {
                    return Err(GeocodeFailure {
                        status,
                        attempts: attempt,
                    });
                }
                sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
        }
    }
}

/// The provider's map and marker primitives.
pub trait MapBackend {
    type Map;
    type Marker;

    fn create_map(&self, center: LatLng) -> Self::Map;
    fn recenter(&self, map: &Self::Map, center: LatLng);
    fn place_marker(&self, map: &Self::Map, position: LatLng, title: &str) -> Self::Marker;
    fn remove_marker(&self, marker: &Self::Marker);
}

/// One map and at most one marker for a rendered map area.
pub struct MapSurface<B: MapBackend> {
    backend: B,
    map: Option<B::Map>,
    marker: Option<B::Marker>,
}

impl<B: MapBackend> MapSurface<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            map: None,
            marker: None,
        }
    }

    /// Create the map on first use, recenter it afterwards, and swap the marker.
    pub fn show(&mut self, location: LatLng, title: &str) {
        let map = match self.map.take() {
            Some(map) => {
                self.backend.recenter(&map, location);
                map
            }
            None => self.backend.create_map(location),
        };
        self.clear_marker();
        self.marker = Some(self.backend.place_marker(&map, location, title));
        self.map = Some(map);
    }

    pub fn clear_marker(&mut self) {
        if let Some(marker) = self.marker.take() {
            self.backend.remove_marker(&marker);
        }
    }

    pub fn has_map(&self) -> bool {
        self.map.is_some()
    }

    pub fn has_marker(&self) -> bool {
        self.marker.is_some()
    }
}

/// The map area went away before a geocoded location could be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unable to display the map")]
pub struct MapUnavailable;

/// Show `location` on the surface in `slot`, creating it with `mount` when
/// there is none yet. `mount` returning `None` means nothing can be drawn.
pub fn show_on_surface<B, M>(
    slot: &mut Option<MapSurface<B>>,
    mount: M,
    location: LatLng,
    title: &str,
) -> Result<(), MapUnavailable>
where
    B: MapBackend,
    M: FnOnce() -> Option<B>,
{
    if slot.is_none() {
        *slot = Some(MapSurface::new(mount().ok_or(MapUnavailable)?));
    }
    if let Some(surface) = slot.as_mut() {
        surface.show(location, title);
    }
    Ok(())
}

impl<B: MapBackend> Drop for MapSurface<B> {
    fn drop(&mut self) {
        self.clear_marker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::FutureExt;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    struct ScriptedGeocoder {
        replies: RefCell<VecDeque<Result<GeocodeHit, GeocodeStatus>>>,
        calls: RefCell<u32>,
    }

    impl ScriptedGeocoder {
        fn new(replies: Vec<Result<GeocodeHit, GeocodeStatus>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(0),
            }
        }
    }

    impl Geocoder for ScriptedGeocoder {
        fn geocode<'a>(
            &'a self,
            _request: &'a GeocodeRequest,
        ) -> LocalBoxFuture<'a, Result<GeocodeHit, GeocodeStatus>> {
            *self.calls.borrow_mut() += 1;
            let reply = self
                .replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(GeocodeStatus::Error));
            async move { reply }.boxed_local()
        }
    }

    #[derive(Default)]
    struct BackendLog {
        maps: u32,
        recenters: u32,
        live_markers: Vec<u32>,
        next_marker: u32,
    }

    #[derive(Clone, Default)]
    struct FakeBackend(Rc<RefCell<BackendLog>>);

    impl MapBackend for FakeBackend {
        type Map = ();
        type Marker = u32;

        fn create_map(&self, _center: LatLng) {
            self.0.borrow_mut().maps += 1;
        }

        fn recenter(&self, _map: &(), _center: LatLng) {
            self.0.borrow_mut().recenters += 1;
        }

        fn place_marker(&self, _map: &(), _position: LatLng, _title: &str) -> u32 {
            let mut log = self.0.borrow_mut();
            log.next_marker += 1;
            let id = log.next_marker;
            log.live_markers.push(id);
            id
        }

        fn remove_marker(&self, marker: &u32) {
            self.0.borrow_mut().live_markers.retain(|m| m != marker);
        }
    }

    fn hit() -> GeocodeHit {
        GeocodeHit {
            location: LatLng {
                lat: 41.7,
                lng: -86.2,
            },
            formatted_address: "123 Main St, South Bend, IN 46601, USA".into(),
        }
    }

    fn run(
        geocoder: &ScriptedGeocoder,
        delays: &RefCell<Vec<Duration>>,
    ) -> Result<GeocodeHit, GeocodeFailure> {
        block_on(geocode_with_retry(
            geocoder,
            &GeocodeRequest::us("123 Main Street, South Bend, IN"),
            RetryPolicy::default(),
            |d| {
                delays.borrow_mut().push(d);
                futures::future::ready(())
            },
        ))
    }

    #[test]
    fn backoff_doubles_from_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
    }

    #[test]
    fn success_after_two_zero_results_places_one_marker() {
        let geocoder = ScriptedGeocoder::new(vec![
            Err(GeocodeStatus::ZeroResults),
            Err(GeocodeStatus::ZeroResults),
            Ok(hit()),
        ]);
        let delays = RefCell::new(Vec::new());
        let backend = FakeBackend::default();
        let mut surface = MapSurface::new(backend.clone());

        let result = run(&geocoder, &delays);
        let found = result.expect("third attempt succeeds");
        surface.show(found.location, "Golden Dragon");

        assert_eq!(*geocoder.calls.borrow(), 3);
        assert_eq!(*delays.borrow(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
        assert_eq!(backend.0.borrow().live_markers.len(), 1);
        assert_eq!(backend.0.borrow().maps, 1);
    }

    #[test]
    fn missing_map_area_is_an_error_not_a_silent_stop() {
        let mut slot: Option<MapSurface<FakeBackend>> = None;

        let result = show_on_surface(&mut slot, || None, hit().location, "Golden Dragon");

        assert_eq!(result, Err(MapUnavailable));
        assert_eq!(MapUnavailable.to_string(), "Unable to display the map");
        assert!(slot.is_none());
    }

    #[test]
    fn existing_surface_is_reused_without_mounting() {
        let backend = FakeBackend::default();
        let mut slot = None;

        show_on_surface(&mut slot, || Some(backend.clone()), hit().location, "A").unwrap();
        show_on_surface(&mut slot, || None, hit().location, "B").unwrap();

        assert_eq!(backend.0.borrow().maps, 1);
        assert_eq!(backend.0.borrow().recenters, 1);
        assert_eq!(backend.0.borrow().live_markers, vec![2]);
    }

    #[test]
    fn exhausted_retries_surface_last_status() {
        let geocoder = ScriptedGeocoder::new(vec![
            Err(GeocodeStatus::ZeroResults),
            Err(GeocodeStatus::ZeroResults),
            Err(GeocodeStatus::ZeroResults),
        ]);
        let delays = RefCell::new(Vec::new());

        let failure = run(&geocoder, &delays).unwrap_err();

        assert_eq!(failure.status, GeocodeStatus::ZeroResults);
        assert_eq!(failure.attempts, 3);
        assert_eq!(failure.to_string(), "Unable to load map location (ZERO_RESULTS)");
        assert_eq!(*geocoder.calls.borrow(), 3);
    }

    #[test]
    fn non_retryable_status_stops_immediately() {
        let geocoder = ScriptedGeocoder::new(vec![Err(GeocodeStatus::RequestDenied), Ok(hit())]);
        let delays = RefCell::new(Vec::new());

        let failure = run(&geocoder, &delays).unwrap_err();

        assert_eq!(failure.status, GeocodeStatus::RequestDenied);
        assert_eq!(*geocoder.calls.borrow(), 1);
        assert!(delays.borrow().is_empty());
    }

    #[test]
    fn unknown_error_and_quota_are_retryable() {
        assert!(GeocodeStatus::from_code("UNKNOWN_ERROR").is_retryable());
        assert!(GeocodeStatus::from_code("OVER_QUERY_LIMIT").is_retryable());
        assert!(!GeocodeStatus::from_code("INVALID_REQUEST").is_retryable());
        assert_eq!(GeocodeStatus::from_code("WEIRD").code(), "WEIRD");
    }

    #[test]
    fn surface_recenters_and_replaces_marker() {
        let backend = FakeBackend::default();
        let mut surface = MapSurface::new(backend.clone());
        let here = hit().location;

        surface.show(here, "first");
        surface.show(here, "second");

        let log = backend.0.borrow();
        assert_eq!(log.maps, 1);
        assert_eq!(log.recenters, 1);
        assert_eq!(log.live_markers, vec![2]);
    }

    #[test]
    fn dropping_surface_detaches_marker() {
        let backend = FakeBackend::default();
        {
            let mut surface = MapSurface::new(backend.clone());
            surface.show(hit().location, "gone soon");
            assert!(surface.has_marker());
        }
        assert!(backend.0.borrow().live_markers.is_empty());
    }
}
