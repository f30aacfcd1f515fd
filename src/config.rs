//! Application-level configuration constants.
//!
//! Deployment values are baked in at compile time through `option_env!`,
//! everything else is a plain constant.

use log::LevelFilter;

// Deployment configuration
const API_BASE_OVERRIDE: Option<&str> = option_env!("NUTRIGO_API_BASE");
const MAPS_API_KEY: Option<&str> = option_env!("NUTRIGO_MAPS_API_KEY");

pub const DEFAULT_API_BASE: &str = "http://localhost:5001/api";
pub const MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";

// Default preference values
pub const DEFAULT_MIN_PRICE: u32 = 10;
pub const DEFAULT_MAX_PRICE: u32 = 25;
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 5000;

// Price slider domain
pub const PRICE_DOMAIN_MIN: u32 = 1;
pub const PRICE_DOMAIN_MAX: u32 = 50;

// Loading indicator
pub const LOADING_STEP_INTERVAL_MS: u32 = 2_000;
pub const MAX_LOADING_STEP: u8 = 3;

// Geocoding
pub const GEOCODE_MAX_ATTEMPTS: u32 = 3;
pub const GEOCODE_INITIAL_BACKOFF_MS: u64 = 1_000;
pub const GEOCODE_REGION: &str = "us";
pub const MAP_ZOOM: u32 = 15;

// Macro energy split
pub const PROTEIN_CALORIE_SHARE: f64 = 0.3;
pub const CARBS_CALORIE_SHARE: f64 = 0.4;
pub const FATS_CALORIE_SHARE: f64 = 0.3;
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Base URL of the recommendation backend, without a trailing slash.
pub fn api_base() -> &'static str {
    API_BASE_OVERRIDE
        .map(|base| base.trim_end_matches('/'))
        .filter(|base| !base.is_empty())
        .unwrap_or(DEFAULT_API_BASE)
}

/// Maps API key, `None` when the build was not given one.
pub fn maps_api_key() -> Option<String> {
    MAPS_API_KEY
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
}

pub fn log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
