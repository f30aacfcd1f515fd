//! NutriGo front end: the preferences form, its submission lifecycle and the
//! recommendation results, mounted under a shared preferences provider.

use log::{error, info};
use nutrigo::cuisine::{remove_cuisine, select_cuisine};
use nutrigo::form::{format_allergies, parse_allergies, parse_quantity_input};
use nutrigo::price::PriceHandle;
use nutrigo::submission::{RequestSequence, SubmissionAction, SubmissionState};
use nutrigo::{ApiClient, MacroKind, PreferencesPatch, SkippedMacros, UserPreferences};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

mod components;
mod hooks;
mod map_view;

use components::{
    ApiStatusBadge, CuisinePicker, LoadingSpinner, MacroInput, NearbyRestaurants,
    PriceRangeSlider, RecommendationList,
};
use hooks::{use_loading_ticker, use_preferences, PreferencesProvider};

// ──────────────────────────────────────────────────────────────────────────────
// Preferences form

#[function_component(PreferencesForm)]
fn preferences_form() -> Html {
    let prefs = use_preferences();
    let submission = use_reducer(SubmissionState::default);
    let skipped = use_state(SkippedMacros::default);
    let sequence = use_mut_ref(RequestSequence::default);
    let client = use_memo((), |_| ApiClient::default());
    let busy = submission.is_submitting();

    {
        let submission = submission.dispatcher();
        use_loading_ticker(
            busy,
            Callback::from(move |_| submission.dispatch(SubmissionAction::Tick)),
        );
    }

    let on_calories = {
        let prefs = prefs.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            prefs.dispatch(PreferencesPatch::target_calories(parse_quantity_input(
                &input.value(),
            )));
        })
    };

    let on_macro = {
        let prefs = prefs.clone();
        Callback::from(move |(kind, value): (MacroKind, Option<u32>)| {
            prefs.dispatch(PreferencesPatch::macro_grams(kind, value));
        })
    };

    let on_toggle_skip = {
        let prefs = prefs.clone();
        let skipped = skipped.clone();
        Callback::from(move |kind: MacroKind| {
            let mut next = *skipped;
            if let Some(clear) = next.toggle(kind) {
                prefs.dispatch(clear);
            }
            skipped.set(next);
        })
    };

    let on_allergies = {
        let prefs = prefs.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            prefs.dispatch(PreferencesPatch::allergies(parse_allergies(&input.value())));
        })
    };

    let on_zip = {
        let prefs = prefs.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            prefs.dispatch(PreferencesPatch::zip_code(input.value()));
        })
    };

    let on_cuisine_select = {
        let prefs = prefs.clone();
        Callback::from(move |value: String| {
            if let Some(next) = select_cuisine(&prefs.cuisines, &value) {
                prefs.dispatch(PreferencesPatch::cuisines(next));
            }
        })
    };

    let on_cuisine_remove = {
        let prefs = prefs.clone();
        Callback::from(move |value: String| {
            prefs.dispatch(PreferencesPatch::cuisines(remove_cuisine(&prefs.cuisines, &value)));
        })
    };

    let on_price = {
        let prefs = prefs.clone();
        Callback::from(move |(handle, value): (PriceHandle, u32)| {
            prefs.dispatch(match handle {
                PriceHandle::Min => PreferencesPatch::min_price(value),
                PriceHandle::Max => PreferencesPatch::max_price(value),
            });
        })
    };

    let on_submit = {
        let prefs = prefs.clone();
        let submission = submission.dispatcher();
        let skipped = skipped.clone();
        let sequence = sequence.clone();
        let client = client.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let seq = sequence.borrow().next();
            submission.dispatch(SubmissionAction::Begin { seq });

            let payload = UserPreferences::from_form(&prefs, &skipped);
            info!("Requesting recommendations (#{}) for {}", seq, payload.zipcode);
            let submission = submission.clone();
            let client = client.clone();
            spawn_local(async move {
                let outcome = client.get_recommendations(&payload).await.map_err(|err| {
                    error!("Error getting recommendations: {}", err);
                    err.to_string()
                });
                submission.dispatch(SubmissionAction::Resolved { seq, outcome });
            });
        })
    };

    html! {
        <div class="preferences-container">
            <form class="preferences-form" onsubmit={on_submit}>
                <h2>{ "Your Preferences" }</h2>

                <div class="form-group">
                    <label for="targetCalories">{ "Target Calories" }</label>
                    <input type="number" id="targetCalories" name="targetCalories" min="0"
                        placeholder="Enter target calories" required={true}
                        value={prefs.target_calories.map(|v| v.to_string()).unwrap_or_default()}
                        oninput={on_calories} />
                </div>

                <div class="macros-group">
                    { MacroKind::ALL.iter().map(|&kind| html! {
                        <MacroInput
                            key={kind.input_id()}
                            {kind}
                            value={prefs.macro_grams(kind)}
                            skipped={skipped.is_skipped(kind)}
                            target_calories={prefs.target_calories}
                            on_input={on_macro.clone()}
                            on_toggle_skip={on_toggle_skip.clone()} />
                    }).collect::<Html>() }
                </div>

                <div class="form-group">
                    <label for="allergies">{ "Allergies (comma-separated)" }</label>
                    <input type="text" id="allergies" name="allergies"
                        placeholder="e.g., peanuts, shellfish, dairy"
                        value={format_allergies(&prefs.allergies)}
                        oninput={on_allergies} />
                </div>

                <div class="form-group">
                    <label for="zipCode">{ "ZIP Code" }</label>
                    <input type="text" id="zipCode" name="zipCode" pattern="[0-9]{5}"
                        placeholder="Enter ZIP code" required={true}
                        value={prefs.zip_code.clone()}
                        oninput={on_zip} />
                </div>

                <CuisinePicker
                    cuisines={prefs.cuisines.clone()}
                    on_select={on_cuisine_select}
                    on_remove={on_cuisine_remove} />

                <PriceRangeSlider min={prefs.min_price} max={prefs.max_price} on_change={on_price} />

                <button type="submit" class="submit-button" disabled={busy}>
                    { if busy { "Finding Restaurants..." } else { "Find Restaurants" } }
                </button>
            </form>

            <NearbyRestaurants zip_code={prefs.zip_code.clone()} />

            if busy {
                <LoadingSpinner current_step={submission.loading_step} />
            }
            if let Some(message) = submission.error.clone() {
                <div class="error-message">{ message }</div>
            }
            if submission.has_results() {
                <RecommendationList recommendations={submission.recommendations.clone()} />
            }
        </div>
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// App shell

/// Header, backend status and the form, all under the preferences store.
#[function_component]
pub fn App() -> Html {
    html! {
        <PreferencesProvider>
            <div class="app">
                <header class="app-header">
                    <h1>{ "NutriGo" }</h1>
                    <p>{ "Find restaurant dishes that fit your nutrition goals and budget" }</p>
                    <ApiStatusBadge />
                </header>
                <main>
                    <PreferencesForm />
                </main>
            </div>
        </PreferencesProvider>
    }
}

fn main() {
    nutrigo::logging::init(nutrigo::config::log_level());
    yew::Renderer::<App>::new().render();
}
