//! NutriGo client: collects dietary and budget preferences, asks the
//! recommendation backend for restaurant dishes, and plots a chosen
//! restaurant on a Google map.
//!
//! Everything here is framework-light logic plus browser bindings; the Yew
//! component tree lives in the binary.

pub mod address;
pub mod api;
pub mod config;
pub mod cuisine;
pub mod form;
pub mod geocode;
pub mod logging;
pub mod maps;
pub mod preferences;
pub mod price;
pub mod submission;

pub use api::{ApiClient, ApiError, Recommendation, UserPreferences};
pub use preferences::{MacroKind, Preferences, PreferencesPatch, SkippedMacros};
