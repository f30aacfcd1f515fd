//! HTTP client for the recommendation backend.
//!
//! Translates the form's [`Preferences`] into the backend's wire shape and
//! issues exactly one request per call; there is no retry at this layer.

use crate::config::{api_base, DEFAULT_SEARCH_RADIUS_M};
use crate::cuisine::wire_cuisines;
use crate::preferences::{MacroKind, Preferences, SkippedMacros};
use gloo_net::http::{Request, Response};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors surfaced by [`ApiClient`]. `Display` is the user-facing message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Request(#[from] gloo_net::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    fn from_status(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            message: status_error_message(status, body),
        }
    }
}

/// Prefer the backend's own `{"error": ...}` text over a generic status line.
pub fn status_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status))
}

/// Requested grams per macro; skipped macros are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MacroTargets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_grams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_grams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fats_grams: Option<u32>,
}

/// Outbound preferences as the backend expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPreferences {
    pub allergies: Vec<String>,
    pub calorie_count: Option<u32>,
    pub macronutrients: MacroTargets,
    pub zipcode: String,
    pub cuisine_preferences: Vec<String>,
    pub price_range: [u32; 2],
}

impl UserPreferences {
    pub fn from_form(prefs: &Preferences, skipped: &SkippedMacros) -> Self {
        let grams = |kind: MacroKind| {
            if skipped.is_skipped(kind) {
                None
            } else {
                prefs.macro_grams(kind)
            }
        };
        Self {
            allergies: prefs.allergies.clone(),
            calorie_count: prefs.target_calories,
            macronutrients: MacroTargets {
                protein_grams: grams(MacroKind::Protein),
                carbs_grams: grams(MacroKind::Carbs),
                fats_grams: grams(MacroKind::Fats),
            },
            zipcode: prefs.zip_code.clone(),
            cuisine_preferences: wire_cuisines(&prefs.cuisines),
            price_range: [prefs.min_price, prefs.max_price],
        }
    }
}

#[derive(Serialize)]
struct RecommendationRequest<'a> {
    preferences: &'a UserPreferences,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Macronutrients {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
}

/// The backend sends either an estimated amount or a free-text label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceLabel {
    Amount(f64),
    Text(String),
}

impl Default for PriceLabel {
    fn default() -> Self {
        PriceLabel::Text(String::new())
    }
}

impl fmt::Display for PriceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceLabel::Amount(v) => write!(f, "{}", v),
            PriceLabel::Text(s) => f.write_str(s),
        }
    }
}

/// One restaurant + dish suggestion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub dish_name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub macronutrients: Macronutrients,
    #[serde(default)]
    pub price_range: PriceLabel,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub missing_targets: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub matches_all_targets: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default, deserialize_with = "lenient_records")]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Records are model output passed through by the backend; one that does not
/// decode is dropped instead of failing the whole list.
fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<Recommendation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value(value) {
            Ok(rec) => Some(rec),
            Err(err) => {
                warn!("Skipping malformed recommendation #{}: {}", idx, err);
                None
            }
        })
        .collect())
}

impl RecommendationsResponse {
    /// A body with an `error` and nothing to show counts as a failure.
    pub fn into_result(self) -> Result<Vec<Recommendation>, ApiError> {
        match self.error {
            Some(error) if self.recommendations.is_empty() => Err(ApiError::Backend(error)),
            _ => Ok(self.recommendations),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "openai_api", default)]
    pub ai_api: String,
    #[serde(rename = "google_maps_api", default)]
    pub maps_api: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: bool,
}

/// Raw restaurant record from the nearby search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Restaurant {
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

/// Thin façade over the backend's JSON endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClient {
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(api_base())
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /status`
    pub async fn check_status(&self) -> Result<ApiStatus, ApiError> {
        let response = Request::get(&self.endpoint("status")).send().await?;
        read_json(response).await
    }

    /// `GET /restaurants?zipcode&radius`
    pub async fn get_restaurants(
        &self,
        zipcode: &str,
        radius: Option<u32>,
    ) -> Result<Vec<Restaurant>, ApiError> {
        let radius = radius.unwrap_or(DEFAULT_SEARCH_RADIUS_M).to_string();
        debug!("Fetching restaurants near {} (radius {} m)", zipcode, radius);
        let response = Request::get(&self.endpoint("restaurants"))
            .query([("zipcode", zipcode), ("radius", radius.as_str())])
            .send()
            .await?;
        read_json(response).await
    }

    /// `POST /recommendations`
    pub async fn get_recommendations(
        &self,
        preferences: &UserPreferences,
    ) -> Result<Vec<Recommendation>, ApiError> {
        let response = Request::post(&self.endpoint("recommendations"))
            .json(&RecommendationRequest { preferences })?
            .send()
            .await?;
        let body: RecommendationsResponse = read_json(response).await?;
        body.into_result()
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.ok() {
        let status = response.status();
        warn!("{} returned status {}", response.url(), status);
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status, &body));
    }
    Ok(response.json::<T>().await?)
}
