//! Field-level input rules for the preferences form.

use crate::config::{
    CARBS_CALORIE_SHARE, FATS_CALORIE_SHARE, KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT,
    KCAL_PER_GRAM_PROTEIN, PROTEIN_CALORIE_SHARE,
};
use crate::preferences::MacroKind;

/// Parse a leading integer the way a lenient number field does: optional sign,
/// then digits, trailing junk ignored. `None` when no digits are present.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Calorie/macro input: empty clears the field, anything unparseable becomes 0.
pub fn parse_quantity_input(input: &str) -> Option<u32> {
    if input.is_empty() {
        return None;
    }
    let value = parse_leading_int(input).unwrap_or(0);
    Some(value.clamp(0, i64::from(u32::MAX)) as u32)
}

/// Suggested grams per macro for a calorie target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroSplit {
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

impl MacroSplit {
    pub fn grams(&self, kind: MacroKind) -> u32 {
        match kind {
            MacroKind::Protein => self.protein,
            MacroKind::Carbs => self.carbs,
            MacroKind::Fats => self.fats,
        }
    }
}

/// 30/40/30 protein/carbs/fats energy split at 4/4/9 kcal per gram.
pub fn recommended_macros(calories: u32) -> MacroSplit {
    let kcal = f64::from(calories);
    let grams = |share: f64, per_gram: f64| (kcal * share / per_gram).round() as u32;
    MacroSplit {
        protein: grams(PROTEIN_CALORIE_SHARE, KCAL_PER_GRAM_PROTEIN),
        carbs: grams(CARBS_CALORIE_SHARE, KCAL_PER_GRAM_CARBS),
        fats: grams(FATS_CALORIE_SHARE, KCAL_PER_GRAM_FAT),
    }
}

/// Placeholder for a macro input. The hint never fills the field.
pub fn macro_placeholder(kind: MacroKind, target_calories: Option<u32>, skipped: bool) -> String {
    match target_calories {
        Some(calories) if calories > 0 && !skipped => {
            format!("Recommended: {}g", recommended_macros(calories).grams(kind))
        }
        _ => format!("Enter {} in grams", kind.label().to_lowercase()),
    }
}

/// Split the comma-separated allergy field. Segments are trimmed but empty
/// ones are kept, so `"peanuts, "` yields `["peanuts", ""]`.
pub fn parse_allergies(input: &str) -> Vec<String> {
    input.split(',').map(|s| s.trim().to_string()).collect()
}

pub fn format_allergies(allergies: &[String]) -> String {
    allergies.join(", ")
}

/// Five ASCII digits, the same hint the ZIP field's `pattern` gives the browser.
pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}
