//! Custom hooks: the preferences context plus timers and listeners that must
//! be released when their view goes away.

use gloo_timers::callback::Interval;
use nutrigo::config::LOADING_STEP_INTERVAL_MS;
use nutrigo::logging::warn_on_err;
use nutrigo::Preferences;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use yew::prelude::*;

/// Shared handle to the session's preferences store.
pub type PreferencesContext = UseReducerHandle<Preferences>;

#[derive(Properties, PartialEq)]
pub struct PreferencesProviderProps {
    #[prop_or_default]
    pub children: Html,
}

/// Owns the preferences store for every descendant.
#[function_component(PreferencesProvider)]
pub fn preferences_provider(props: &PreferencesProviderProps) -> Html {
    let store = use_reducer(Preferences::default);
    html! {
        <ContextProvider<PreferencesContext> context={store}>
            { props.children.clone() }
        </ContextProvider<PreferencesContext>>
    }
}

/// Current preferences plus `dispatch(PreferencesPatch)` for merge updates.
#[hook]
pub fn use_preferences() -> PreferencesContext {
    use_context::<PreferencesContext>()
        .expect("use_preferences must be used within a PreferencesProvider")
}

/// Fires `on_tick` every loading-step period while `active` is true. The
/// interval is dropped as soon as `active` flips or the component unmounts.
#[hook]
pub fn use_loading_ticker(active: bool, on_tick: Callback<()>) {
    let latest = use_mut_ref(|| on_tick.clone());
    *latest.borrow_mut() = on_tick;

    use_effect_with(active, move |&active| {
        let interval = active.then(|| {
            Interval::new(LOADING_STEP_INTERVAL_MS, move || latest.borrow().emit(()))
        });
        move || drop(interval)
    });
}

/// Calls `on_up` for any mouse-up in the document, including outside the
/// component. The listener is removed on unmount.
#[hook]
pub fn use_global_mouseup(on_up: Callback<()>) {
    let latest = use_mut_ref(|| on_up.clone());
    *latest.borrow_mut() = on_up;

    use_effect_with((), move |_| {
        let listener =
            Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| latest.borrow().emit(()));
        let document = gloo_utils::document();
        warn_on_err(
            "register mouseup listener",
            document.add_event_listener_with_callback("mouseup", listener.as_ref().unchecked_ref()),
        );
        move || {
            warn_on_err(
                "remove mouseup listener",
                document
                    .remove_event_listener_with_callback("mouseup", listener.as_ref().unchecked_ref()),
            );
        }
    });
}
