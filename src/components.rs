//! Yew view components for the NutriGo form and its results.
//!
//! Most of these only render props and report user intent through callbacks;
//! the store and the submission state stay with `PreferencesForm`.

use crate::hooks::use_global_mouseup;
use crate::map_view::RestaurantMap;
use nutrigo::api::{ApiClient, ApiStatus, Restaurant};
use nutrigo::cuisine::{available_options, cuisine_label, NO_CUISINE};
use nutrigo::form::{macro_placeholder, parse_quantity_input};
use nutrigo::price::{apply_drag, apply_manual_edit, slider_geometry, track_fraction, PriceHandle};
use nutrigo::{MacroKind, Recommendation};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

const LOADING_STEPS: [&str; 4] = [
    "Finding restaurants in your area...",
    "Analyzing menu items and nutritional information...",
    "Matching with your dietary preferences...",
    "Generating personalized recommendations...",
];

#[derive(Properties, PartialEq)]
pub struct LoadingSpinnerProps {
    pub current_step: u8,
}

#[function_component(LoadingSpinner)]
pub fn loading_spinner(props: &LoadingSpinnerProps) -> Html {
    html! {
        <div class="loading-container">
            <div class="loading-spinner" />
            <div class="loading-text">
                { "Please wait while we find the perfect restaurants for you" }
            </div>
            <div class="loading-steps">
                { LOADING_STEPS.iter().enumerate().map(|(idx, step)| {
                    let done = idx <= usize::from(props.current_step);
                    html! {
                        <div class={classes!("loading-step", done.then_some("active"))}>
                            { if done { "✓ " } else { "○ " } }{ *step }
                        </div>
                    }
                }).collect::<Html>() }
            </div>
        </div>
    }
}

/// One macro input with its skip/specify toggle.
#[derive(Properties, PartialEq)]
pub struct MacroInputProps {
    pub kind: MacroKind,
    pub value: Option<u32>,
    pub skipped: bool,
    pub target_calories: Option<u32>,
    pub on_input: Callback<(MacroKind, Option<u32>)>,
    pub on_toggle_skip: Callback<MacroKind>,
}

#[function_component(MacroInput)]
pub fn macro_input(props: &MacroInputProps) -> Html {
    let kind = props.kind;
    let oninput = props.on_input.reform(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        (kind, parse_quantity_input(&input.value()))
    });
    let onclick = props.on_toggle_skip.reform(move |_: MouseEvent| kind);

    html! {
        <div class="form-group">
            <label for={kind.input_id()}>{ format!("{} (g)", kind.label()) }</label>
            <div class="input-with-skip">
                <input
                    type="number"
                    id={kind.input_id()}
                    name={kind.input_id()}
                    min="0"
                    value={props.value.map(|v| v.to_string()).unwrap_or_default()}
                    required={!props.skipped}
                    disabled={props.skipped}
                    placeholder={macro_placeholder(kind, props.target_calories, props.skipped)}
                    {oninput}
                />
                <button
                    type="button"
                    class={classes!("skip-button", props.skipped.then_some("skipped"))}
                    {onclick}
                >
                    { if props.skipped { "Specify" } else { "Skip" } }
                </button>
            </div>
        </div>
    }
}

/// Selected cuisine tags plus the picker that adds more.
#[derive(Properties, PartialEq)]
pub struct CuisinePickerProps {
    pub cuisines: Vec<String>,
    pub on_select: Callback<String>,
    pub on_remove: Callback<String>,
}

#[function_component(CuisinePicker)]
pub fn cuisine_picker(props: &CuisinePickerProps) -> Html {
    let onchange = {
        let on_select = props.on_select.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            // Back to the placeholder so the control is ready for the next pick.
            select.set_value("");
            if !value.is_empty() {
                on_select.emit(value);
            }
        })
    };

    html! {
        <div class="form-group">
            <label for="cuisine">{ "Preferred Cuisines" }</label>
            <div class="cuisine-select-container">
                <div class="selected-cuisines">
                    { props.cuisines.iter().map(|cuisine| {
                        let label = cuisine_label(cuisine).unwrap_or(cuisine.as_str());
                        let remove = (cuisine != NO_CUISINE).then(|| {
                            let value = cuisine.clone();
                            let onclick = props.on_remove.reform(move |_: MouseEvent| value.clone());
                            html! {
                                <button type="button" class="remove-cuisine" {onclick}>{ "×" }</button>
                            }
                        });
                        html! {
                            <div key={cuisine.clone()} class="cuisine-tag">
                                { label }
                                { remove }
                            </div>
                        }
                    }).collect::<Html>() }
                </div>
                <select id="cuisine" name="cuisine" class="cuisine-select" {onchange}>
                    <option value="" selected={true}>{ "Add a cuisine..." }</option>
                    { available_options(&props.cuisines).map(|(value, label)| html! {
                        <option key={value} {value}>{ label }</option>
                    }).collect::<Html>() }
                </select>
            </div>
        </div>
    }
}

/// Two numeric inputs and a dual-handle slider over the price domain.
#[derive(Properties, PartialEq)]
pub struct PriceRangeProps {
    pub min: u32,
    pub max: u32,
    pub on_change: Callback<(PriceHandle, u32)>,
}

#[function_component(PriceRangeSlider)]
pub fn price_range_slider(props: &PriceRangeProps) -> Html {
    let dragging = use_state(|| None::<PriceHandle>);
    let (min, max) = (props.min, props.max);

    {
        let dragging = dragging.setter();
        use_global_mouseup(Callback::from(move |_| dragging.set(None)));
    }

    let manual_edit = |handle: PriceHandle| {
        props.on_change.reform(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            (handle, apply_manual_edit(handle, &input.value(), min, max))
        })
    };

    let start_drag = |handle: PriceHandle| {
        let dragging = dragging.clone();
        Callback::from(move |_: MouseEvent| dragging.set(Some(handle)))
    };

    let onmousemove = {
        let dragging = *dragging;
        let on_change = props.on_change.clone();
        Callback::from(move |e: MouseEvent| {
            let Some(handle) = dragging else { return };
            let Some(track) = e.current_target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let rect = track.get_bounding_client_rect();
            let fraction = track_fraction(f64::from(e.client_x()), rect.left(), rect.width());
            on_change.emit((handle, apply_drag(handle, fraction, min, max)));
        })
    };

    let geometry = slider_geometry(min, max);

    html! {
        <div class="form-group">
            <label for="minPrice">{ "Price Range ($)" }</label>
            <div class="price-range-container">
                <div class="price-range-inputs">
                    <input type="number" id="minPrice" name="minPrice" class="price-input"
                        min="1" max="49" value={min.to_string()}
                        oninput={manual_edit(PriceHandle::Min)} />
                    <span>{ "to" }</span>
                    <input type="number" id="maxPrice" name="maxPrice" class="price-input"
                        min="2" max="50" value={max.to_string()}
                        oninput={manual_edit(PriceHandle::Max)} />
                </div>
                <div class="price-range-slider-container" {onmousemove}>
                    <div class="slider-track"></div>
                    <div class="slider-range"
                        style={format!("left: {}%; width: {}%;", geometry.fill_left(), geometry.fill_width())}>
                    </div>
                    <div class="slider-handle min-handle"
                        style={format!("left: {}%;", geometry.min_percent)}
                        onmousedown={start_drag(PriceHandle::Min)}>
                    </div>
                    <div class="slider-handle max-handle"
                        style={format!("left: {}%;", geometry.max_percent)}
                        onmousedown={start_drag(PriceHandle::Max)}>
                    </div>
                </div>
                <div class="price-range-labels">
                    <span>{ "1" }</span>
                    <span>{ "50" }</span>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RecommendationListProps {
    pub recommendations: Rc<Vec<Recommendation>>,
}

#[function_component(RecommendationList)]
pub fn recommendation_list(props: &RecommendationListProps) -> Html {
    html! {
        <div class="recommendations">
            <h2>{ "Recommended Restaurants" }</h2>
            { props.recommendations.iter().map(|rec| html! {
                <RecommendationCard recommendation={rec.clone()} />
            }).collect::<Html>() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RecommendationCardProps {
    pub recommendation: Recommendation,
}

#[function_component(RecommendationCard)]
pub fn recommendation_card(props: &RecommendationCardProps) -> Html {
    let show_map = use_state(|| false);
    let rec = &props.recommendation;
    let toggle_map = {
        let show_map = show_map.clone();
        Callback::from(move |_: MouseEvent| show_map.set(!*show_map))
    };

    html! {
        <div class={classes!("recommendation-card", rec.matches_all_targets.then_some("perfect-match"))}>
            <h3>{ &rec.restaurant_name }</h3>
            <p>{ &rec.address }</p>
            <p><strong>{ "Recommended Dish: " }</strong>{ &rec.dish_name }</p>
            <p><strong>{ "Calories: " }</strong>{ rec.calories.to_string() }</p>
            <p>
                <strong>{ "Macros: " }</strong>
                { format!("Protein: {}g, Carbs: {}g, Fats: {}g",
                          rec.macronutrients.protein, rec.macronutrients.carbs, rec.macronutrients.fats) }
            </p>
            <p><strong>{ "Price: " }</strong>{ format!("${}", rec.price_range) }</p>
            <p><strong>{ "Why: " }</strong>{ &rec.reason }</p>
            if !rec.missing_targets.is_empty() {
                <div class="missing-targets">
                    <p><strong>{ "Missing Targets:" }</strong></p>
                    <ul>{ rec.missing_targets.iter().map(|t| html! { <li>{ t }</li> }).collect::<Html>() }</ul>
                </div>
            }
            if !rec.suggestions.is_empty() {
                <div class="suggestions">
                    <p><strong>{ "Suggestions to Meet Targets:" }</strong></p>
                    <ul>{ rec.suggestions.iter().map(|s| html! { <li>{ s }</li> }).collect::<Html>() }</ul>
                </div>
            }
            if !rec.address.is_empty() {
                <button type="button" class="btn-secondary small" onclick={toggle_map}>
                    { if *show_map { "Hide map" } else { "Show on map" } }
                </button>
                if *show_map {
                    <RestaurantMap
                        address={rec.address.clone()}
                        restaurant_name={rec.restaurant_name.clone()} />
                }
            }
        </div>
    }
}

#[derive(Clone, PartialEq)]
enum StatusView {
    Checking,
    Known(ApiStatus),
    Offline,
}

/// Backend availability, fetched once on mount.
#[function_component(ApiStatusBadge)]
pub fn api_status_badge() -> Html {
    let status = use_state(|| StatusView::Checking);
    {
        let status = status.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match ApiClient::default().check_status().await {
                    Ok(s) => status.set(StatusView::Known(s)),
                    Err(err) => {
                        log::warn!("Backend status check failed: {}", err);
                        status.set(StatusView::Offline);
                    }
                }
            });
        });
    }

    match &*status {
        StatusView::Checking => html! { <div class="api-status">{ "Checking backend..." }</div> },
        StatusView::Offline => html! { <div class="api-status offline">{ "Backend offline" }</div> },
        StatusView::Known(s) => html! {
            <div class="api-status">
                { format!("Backend {} · AI {} · Maps {}", s.status, s.ai_api, s.maps_api) }
            </div>
        },
    }
}

#[derive(Clone, PartialEq)]
enum NearbyView {
    Idle,
    Loading,
    Loaded(Rc<Vec<Restaurant>>),
    Failed(String),
}

#[derive(Properties, PartialEq)]
pub struct NearbyRestaurantsProps {
    pub zip_code: String,
}

/// Raw restaurant listing around the entered ZIP code.
#[function_component(NearbyRestaurants)]
pub fn nearby_restaurants(props: &NearbyRestaurantsProps) -> Html {
    let view = use_state(|| NearbyView::Idle);
    let zip_ok = nutrigo::form::is_valid_zip(&props.zip_code);

    let onclick = {
        let view = view.clone();
        let zip = props.zip_code.clone();
        Callback::from(move |_: MouseEvent| {
            let view = view.clone();
            let zip = zip.clone();
            view.set(NearbyView::Loading);
            spawn_local(async move {
                match ApiClient::default().get_restaurants(&zip, None).await {
                    Ok(list) => view.set(NearbyView::Loaded(Rc::new(list))),
                    Err(err) => {
                        log::error!("Error fetching nearby restaurants: {}", err);
                        view.set(NearbyView::Failed(err.to_string()));
                    }
                }
            });
        })
    };

    let body = match &*view {
        NearbyView::Idle => html! {},
        NearbyView::Loading => html! { <p class="nearby-loading">{ "Searching..." }</p> },
        NearbyView::Failed(msg) => html! { <div class="error-message">{ msg }</div> },
        NearbyView::Loaded(list) if list.is_empty() => {
            html! { <p class="no-results-message">{ "No restaurants found nearby" }</p> }
        }
        NearbyView::Loaded(list) => html! {
            <ul class="nearby-list">
                { list.iter().map(|r| html! {
                    <li>
                        <strong>{ &r.name }</strong>{ " " }{ &r.formatted_address }
                        if let Some(rating) = r.rating {
                            <span class="rating">{ format!(" ★ {:.1}", rating) }</span>
                        }
                        if r.opening_hours.as_ref().is_some_and(|h| h.open_now) {
                            <span class="open-now">{ " · open now" }</span>
                        }
                    </li>
                }).collect::<Html>() }
            </ul>
        },
    };

    html! {
        <div class="nearby-restaurants">
            <button type="button" class="btn-secondary small"
                disabled={!zip_ok || *view == NearbyView::Loading} {onclick}>
                { "Browse nearby" }
            </button>
            { body }
        </div>
    }
}
