//! Google Maps integration: the process-wide script loader and the browser
//! implementations of [`Geocoder`] and [`MapBackend`].
//!
//! The loader keeps its state in a thread-local. The wasm event loop is single
//! threaded, so the "already pending?" check and the assignment that follows
//! cannot interleave with another caller.

use crate::config::{maps_api_key, MAPS_SCRIPT_URL, MAP_ZOOM};
use crate::geocode::{GeocodeHit, GeocodeRequest, GeocodeStatus, Geocoder, LatLng, MapBackend};
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture, Shared};
use futures::FutureExt;
use log::{debug, error, info};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, HtmlScriptElement};

#[wasm_bindgen(module = "/maps_helpers.js")]
extern "C" {
    #[wasm_bindgen(js_name = isMapsLoaded)]
    fn is_maps_loaded() -> bool;

    #[wasm_bindgen(js_name = geocodeAddress)]
    fn geocode_address(
        address: &str,
        region: &str,
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    ) -> js_sys::Promise;

    #[wasm_bindgen(js_name = createMap)]
    fn create_map(element: &HtmlElement, lat: f64, lng: f64, zoom: u32) -> JsValue;

    #[wasm_bindgen(js_name = setMapCenter)]
    fn set_map_center(map: &JsValue, lat: f64, lng: f64);

    #[wasm_bindgen(js_name = placeMarker)]
    fn place_marker(map: &JsValue, lat: f64, lng: f64, title: &str) -> JsValue;

    #[wasm_bindgen(js_name = removeMarker)]
    fn remove_marker(marker: &JsValue);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapsError {
    #[error("Google Maps API key is not configured")]
    MissingApiKey,

    #[error("Failed to load Google Maps script")]
    ScriptLoad,

    #[error("Google Maps is unavailable: {0}")]
    Dom(String),
}

impl MapsError {
    fn from_js(value: JsValue) -> Self {
        MapsError::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

pub type LoadResult = Result<(), MapsError>;
type PendingLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

/// Where the Maps library comes from.
pub trait ScriptSource {
    fn is_loaded(&self) -> bool;
    fn inject(&self, api_key: &str) -> LocalBoxFuture<'static, LoadResult>;
}

enum LoadState {
    Idle,
    Pending(PendingLoad),
    Ready,
    Failed(MapsError),
}

/// Loads the Maps script at most once and shares the in-flight load.
pub struct MapsLoader<S> {
    api_key: Option<String>,
    source: S,
    state: Rc<RefCell<LoadState>>,
}

impl<S: ScriptSource> MapsLoader<S> {
    pub fn new(api_key: Option<String>, source: S) -> Self {
        Self {
            api_key,
            source,
            state: Rc::new(RefCell::new(LoadState::Idle)),
        }
    }

    /// Resolves once the library is usable. Concurrent callers share one load;
    /// a missing key fails every caller without touching the network; a failed
    /// script load lets the next caller try again.
    pub fn load(&self) -> LocalBoxFuture<'static, LoadResult> {
        if self.source.is_loaded() {
            *self.state.borrow_mut() = LoadState::Ready;
            return future::ready(Ok(())).boxed_local();
        }

        let mut state = self.state.borrow_mut();
        match &*state {
            LoadState::Ready => return future::ready(Ok(())).boxed_local(),
            LoadState::Failed(err) => return future::ready(Err(err.clone())).boxed_local(),
            LoadState::Pending(pending) => return pending.clone().boxed_local(),
            LoadState::Idle => {}
        }

        let Some(key) = self.api_key.as_deref() else {
            error!("Google Maps API key missing from build configuration");
            *state = LoadState::Failed(MapsError::MissingApiKey);
            return future::ready(Err(MapsError::MissingApiKey)).boxed_local();
        };

        let injected = self.source.inject(key);
        let slot = Rc::downgrade(&self.state);
        let pending = async move {
            let result = injected.await;
            if let Some(slot) = slot.upgrade() {
                *slot.borrow_mut() = match &result {
                    Ok(()) => LoadState::Ready,
                    Err(_) => LoadState::Idle,
                };
            }
            result
        }
        .boxed_local()
        .shared();

        *state = LoadState::Pending(pending.clone());
        pending.boxed_local()
    }
}

/// Injects a `<script>` tag into the document head.
pub struct DomScriptSource;

impl ScriptSource for DomScriptSource {
    fn is_loaded(&self) -> bool {
        is_maps_loaded()
    }

    fn inject(&self, api_key: &str) -> LocalBoxFuture<'static, LoadResult> {
        let src = format!("{}?key={}", MAPS_SCRIPT_URL, api_key);
        async move {
            let script: HtmlScriptElement = gloo_utils::document()
                .create_element("script")
                .map_err(MapsError::from_js)?
                .dyn_into()
                .map_err(|el| MapsError::from_js(el.into()))?;
            script.set_src(&src);
            script.set_async(true);
            script.set_defer(true);

            let (tx, rx) = oneshot::channel::<LoadResult>();
            let tx = Rc::new(RefCell::new(Some(tx)));
            let settle = move |result: LoadResult| {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(result);
                }
            };
            let on_load = {
                let settle = settle.clone();
                Closure::<dyn FnMut()>::new(move || settle(Ok(())))
            };
            let on_error = Closure::<dyn FnMut()>::new(move || settle(Err(MapsError::ScriptLoad)));
            script.set_onload(Some(on_load.as_ref().unchecked_ref()));
            script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

            gloo_utils::head()
                .append_child(&script)
                .map_err(MapsError::from_js)?;

            let result = rx.await.unwrap_or(Err(MapsError::ScriptLoad));
            script.set_onload(None);
            script.set_onerror(None);
            match &result {
                Ok(()) => info!("Google Maps script loaded successfully"),
                Err(err) => {
                    error!("{}", err);
                    script.remove();
                }
            }
            result
        }
        .boxed_local()
    }
}

thread_local! {
    static GOOGLE_MAPS: MapsLoader<DomScriptSource> =
        MapsLoader::new(maps_api_key(), DomScriptSource);
}

/// Process-wide entry point used by the map view.
pub fn load_google_maps() -> LocalBoxFuture<'static, LoadResult> {
    GOOGLE_MAPS.with(MapsLoader::load)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeocode {
    status: String,
    lat: Option<f64>,
    lng: Option<f64>,
    formatted_address: Option<String>,
}

impl RawGeocode {
    fn into_result(self) -> Result<GeocodeHit, GeocodeStatus> {
        match (self.status.as_str(), self.lat, self.lng) {
            ("OK", Some(lat), Some(lng)) => Ok(GeocodeHit {
                location: LatLng { lat, lng },
                formatted_address: self.formatted_address.unwrap_or_default(),
            }),
            ("OK", _, _) => Err(GeocodeStatus::ZeroResults),
            (code, _, _) => Err(GeocodeStatus::from_code(code)),
        }
    }
}

/// `google.maps.Geocoder` behind the [`Geocoder`] trait.
pub struct GoogleGeocoder;

impl Geocoder for GoogleGeocoder {
    fn geocode<'a>(
        &'a self,
        request: &'a GeocodeRequest,
    ) -> LocalBoxFuture<'a, Result<GeocodeHit, GeocodeStatus>> {
        async move {
            debug!("Attempting to geocode address: {}", request.address);
            let bounds = request.bounds;
            let promise = geocode_address(
                &request.address,
                request.region,
                bounds.south_west.lat,
                bounds.south_west.lng,
                bounds.north_east.lat,
                bounds.north_east.lng,
            );
            let value = JsFuture::from(promise)
                .await
                .map_err(|_| GeocodeStatus::UnknownError)?;
            serde_wasm_bindgen::from_value::<RawGeocode>(value)
                .map_err(|_| GeocodeStatus::UnknownError)?
                .into_result()
        }
        .boxed_local()
    }
}

/// `google.maps.Map` / `Marker` rendered into `element`.
pub struct GoogleMapBackend {
    element: HtmlElement,
}

impl GoogleMapBackend {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl MapBackend for GoogleMapBackend {
    type Map = JsValue;
    type Marker = JsValue;

    fn create_map(&self, center: LatLng) -> JsValue {
        create_map(&self.element, center.lat, center.lng, MAP_ZOOM)
    }

    fn recenter(&self, map: &JsValue, center: LatLng) {
        set_map_center(map, center.lat, center.lng);
    }

    fn place_marker(&self, map: &JsValue, position: LatLng, title: &str) -> JsValue {
        place_marker(map, position.lat, position.lng, title)
    }

    fn remove_marker(&self, marker: &JsValue) {
        remove_marker(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    /// Resolves each injected load by hand.
    #[derive(Clone, Default)]
    struct ManualSource {
        injections: Rc<Cell<u32>>,
        senders: Rc<RefCell<Vec<oneshot::Sender<LoadResult>>>>,
    }

    impl ManualSource {
        fn settle(&self, result: LoadResult) {
            for tx in self.senders.borrow_mut().drain(..) {
                let _ = tx.send(result.clone());
            }
        }
    }

    impl ScriptSource for ManualSource {
        fn is_loaded(&self) -> bool {
            false
        }

        fn inject(&self, _api_key: &str) -> LocalBoxFuture<'static, LoadResult> {
            self.injections.set(self.injections.get() + 1);
            let (tx, rx) = oneshot::channel();
            self.senders.borrow_mut().push(tx);
            async move { rx.await.unwrap_or(Err(MapsError::ScriptLoad)) }.boxed_local()
        }
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let source = ManualSource::default();
        let loader = MapsLoader::new(Some("key".into()), source.clone());

        let first = loader.load();
        let second = loader.load();
        assert_eq!(source.injections.get(), 1);

        source.settle(Ok(()));
        assert_eq!(block_on(first), Ok(()));
        assert_eq!(block_on(second), Ok(()));

        assert_eq!(block_on(loader.load()), Ok(()));
        assert_eq!(source.injections.get(), 1);
    }

    #[test]
    fn missing_key_fails_everyone_without_network() {
        let source = ManualSource::default();
        let loader = MapsLoader::new(None, source.clone());

        assert_eq!(block_on(loader.load()), Err(MapsError::MissingApiKey));
        assert_eq!(block_on(loader.load()), Err(MapsError::MissingApiKey));
        assert_eq!(source.injections.get(), 0);
    }

    #[test]
    fn failed_script_load_allows_a_retry() {
        let source = ManualSource::default();
        let loader = MapsLoader::new(Some("key".into()), source.clone());

        let first = loader.load();
        source.settle(Err(MapsError::ScriptLoad));
        assert_eq!(block_on(first), Err(MapsError::ScriptLoad));

        let second = loader.load();
        assert_eq!(source.injections.get(), 2);
        source.settle(Ok(()));
        assert_eq!(block_on(second), Ok(()));
    }

    #[test]
    fn raw_geocode_results_map_to_statuses() {
        let ok = RawGeocode {
            status: "OK".into(),
            lat: Some(41.68),
            lng: Some(-86.25),
            formatted_address: Some("South Bend, IN, USA".into()),
        };
        let hit = ok.into_result().unwrap();
        assert_eq!(hit.location, LatLng { lat: 41.68, lng: -86.25 });

        let zero = RawGeocode {
            status: "ZERO_RESULTS".into(),
            lat: None,
            lng: None,
            formatted_address: None,
        };
        assert_eq!(zero.into_result(), Err(GeocodeStatus::ZeroResults));
    }
}
