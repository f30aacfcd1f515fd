//! Price range bounds and the dual-handle slider math.
//!
//! Every mutation keeps `min < max` inside the slider domain.

use crate::config::{PRICE_DOMAIN_MAX, PRICE_DOMAIN_MIN};
use crate::form::parse_leading_int;

/// Which slider handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceHandle {
    Min,
    Max,
}

fn clamp_to_domain(value: i64) -> u32 {
    value.clamp(i64::from(PRICE_DOMAIN_MIN), i64::from(PRICE_DOMAIN_MAX)) as u32
}

/// New lower bound for a requested value, kept below `max`.
pub fn clamp_min(requested: i64, max: u32) -> u32 {
    clamp_to_domain(requested).min(max.saturating_sub(1)).max(PRICE_DOMAIN_MIN)
}

/// New upper bound for a requested value, kept above `min`.
pub fn clamp_max(requested: i64, min: u32) -> u32 {
    clamp_to_domain(requested).max(min + 1).min(PRICE_DOMAIN_MAX)
}

/// Manual edit of one of the numeric inputs. Unparseable text counts as 1.
pub fn apply_manual_edit(handle: PriceHandle, input: &str, min: u32, max: u32) -> u32 {
    let requested = match parse_leading_int(input) {
        Some(0) | None => i64::from(PRICE_DOMAIN_MIN),
        Some(v) => v,
    };
    match handle {
        PriceHandle::Min => clamp_min(requested, max),
        PriceHandle::Max => clamp_max(requested, min),
    }
}

/// Pointer position over the track as a fraction in `[0, 1]`.
pub fn track_fraction(pointer_x: f64, track_left: f64, track_width: f64) -> f64 {
    if track_width.is_nan() || track_width <= 0.0 {
        return 0.0;
    }
    let fraction = (pointer_x - track_left) / track_width;
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Linear map of a track fraction onto the integer domain.
pub fn fraction_to_price(fraction: f64) -> u32 {
    let span = f64::from(PRICE_DOMAIN_MAX - PRICE_DOMAIN_MIN);
    (fraction.clamp(0.0, 1.0) * span).round() as u32 + PRICE_DOMAIN_MIN
}

/// Value for the dragged handle after the pointer moved to `fraction`.
pub fn apply_drag(handle: PriceHandle, fraction: f64, min: u32, max: u32) -> u32 {
    let requested = i64::from(fraction_to_price(fraction));
    match handle {
        PriceHandle::Min => clamp_min(requested, max),
        PriceHandle::Max => clamp_max(requested, min),
    }
}

/// Handle and fill placement in percent of the track width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderGeometry {
    pub min_percent: f64,
    pub max_percent: f64,
}

impl SliderGeometry {
    pub fn fill_left(&self) -> f64 {
        self.min_percent
    }

    pub fn fill_width(&self) -> f64 {
        self.max_percent - self.min_percent
    }
}

pub fn slider_geometry(min: u32, max: u32) -> SliderGeometry {
    let span = f64::from(PRICE_DOMAIN_MAX - PRICE_DOMAIN_MIN);
    let percent = |v: u32| f64::from(v.saturating_sub(PRICE_DOMAIN_MIN)) / span * 100.0;
    SliderGeometry {
        min_percent: percent(min),
        max_percent: percent(max),
    }
}
