//! Embedded map for a single recommended restaurant.

use futures::future::{AbortHandle, Abortable};
use futures::FutureExt;
use nutrigo::address::format_for_geocoding;
use nutrigo::geocode::{
    geocode_with_retry, show_on_surface, GeocodeRequest, MapSurface, RetryPolicy,
};
use nutrigo::maps::{load_google_maps, GoogleGeocoder, GoogleMapBackend};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct RestaurantMapProps {
    pub address: String,
    pub restaurant_name: String,
}

#[derive(Clone, PartialEq)]
enum MapStatus {
    Loading,
    Ready,
    Failed(String),
}

#[function_component(RestaurantMap)]
pub fn restaurant_map(props: &RestaurantMapProps) -> Html {
    let container = use_node_ref();
    let status = use_state(|| MapStatus::Loading);
    let surface = use_mut_ref(|| None::<MapSurface<GoogleMapBackend>>);

    // Unmount: dropping the surface detaches its marker.
    {
        let surface = surface.clone();
        use_effect_with((), move |_| {
            move || {
                surface.borrow_mut().take();
            }
        });
    }

    {
        let container = container.clone();
        let status = status.clone();
        let surface = surface.clone();
        use_effect_with(
            (props.address.clone(), props.restaurant_name.clone()),
            move |(address, name)| {
                status.set(MapStatus::Loading);
                let (abort, registration) = AbortHandle::new_pair();
                let address = address.clone();
                let name = name.clone();
                let task_surface = surface.clone();

                let task = async move {
                    if let Err(err) = load_google_maps().await {
                        log::error!("Map initialization error: {}", err);
                        status.set(MapStatus::Failed(err.to_string()));
                        return;
                    }

                    let request = GeocodeRequest::us(format_for_geocoding(&address));
                    let outcome = geocode_with_retry(
                        &GoogleGeocoder,
                        &request,
                        RetryPolicy::default(),
                        gloo_timers::future::sleep,
                    )
                    .await;

                    match outcome {
                        Ok(hit) => {
                            let shown = show_on_surface(
                                &mut task_surface.borrow_mut(),
                                || container.cast::<HtmlElement>().map(GoogleMapBackend::new),
                                hit.location,
                                &name,
                            );
                            match shown {
                                Ok(()) => status.set(MapStatus::Ready),
                                Err(err) => {
                                    log::error!("Map container for {:?} is not mounted", name);
                                    status.set(MapStatus::Failed(err.to_string()));
                                }
                            }
                        }
                        Err(failure) => {
                            // The error panel replaces the map element.
                            task_surface.borrow_mut().take();
                            status.set(MapStatus::Failed(failure.to_string()));
                        }
                    }
                };
                spawn_local(Abortable::new(task, registration).map(|_| ()));

                move || {
                    abort.abort();
                    if let Some(surface) = surface.borrow_mut().as_mut() {
                        surface.clear_marker();
                    }
                }
            },
        );
    }

    match &*status {
        MapStatus::Failed(message) => html! {
            <div class="map-error">{ message }</div>
        },
        MapStatus::Loading | MapStatus::Ready => html! {
            <div
                ref={container}
                class={classes!("restaurant-map", (*status == MapStatus::Loading).then_some("loading"))}
            />
        },
    }
}
