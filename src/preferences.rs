//! The user's preferences record and its merge-style store.
//!
//! The store does not validate anything; field rules live in [`crate::form`],
//! [`crate::cuisine`] and [`crate::price`], which produce patches for it.

use crate::config::{DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};
use crate::cuisine::NO_CUISINE;
use std::rc::Rc;
use yew::Reducible;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub target_calories: Option<u32>,
    pub protein_grams: Option<u32>,
    pub carbs_grams: Option<u32>,
    pub fats_grams: Option<u32>,
    pub allergies: Vec<String>,
    pub zip_code: String,
    pub cuisines: Vec<String>,
    pub min_price: u32,
    pub max_price: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            target_calories: None,
            protein_grams: None,
            carbs_grams: None,
            fats_grams: None,
            allergies: Vec::new(),
            zip_code: String::new(),
            cuisines: vec![NO_CUISINE.to_string()],
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl Preferences {
    pub fn macro_grams(&self, kind: MacroKind) -> Option<u32> {
        match kind {
            MacroKind::Protein => self.protein_grams,
            MacroKind::Carbs => self.carbs_grams,
            MacroKind::Fats => self.fats_grams,
        }
    }

    /// Shallow-merge `patch` into this record. Only the named fields change;
    /// a named optional field set to `None` is cleared.
    pub fn apply(&mut self, patch: PreferencesPatch) {
        let PreferencesPatch {
            target_calories,
            protein_grams,
            carbs_grams,
            fats_grams,
            allergies,
            zip_code,
            cuisines,
            min_price,
            max_price,
        } = patch;

        if let Some(v) = target_calories {
            self.target_calories = v;
        }
        if let Some(v) = protein_grams {
            self.protein_grams = v;
        }
        if let Some(v) = carbs_grams {
            self.carbs_grams = v;
        }
        if let Some(v) = fats_grams {
            self.fats_grams = v;
        }
        if let Some(v) = allergies {
            self.allergies = v;
        }
        if let Some(v) = zip_code {
            self.zip_code = v;
        }
        if let Some(v) = cuisines {
            self.cuisines = v;
        }
        if let Some(v) = min_price {
            self.min_price = v;
        }
        if let Some(v) = max_price {
            self.max_price = v;
        }
    }
}

/// A partial update. The outer `Option` says whether a field is named at all;
/// for optional fields the inner `Option` is the new value, so
/// `Some(None)` clears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub target_calories: Option<Option<u32>>,
    pub protein_grams: Option<Option<u32>>,
    pub carbs_grams: Option<Option<u32>>,
    pub fats_grams: Option<Option<u32>>,
    pub allergies: Option<Vec<String>>,
    pub zip_code: Option<String>,
    pub cuisines: Option<Vec<String>>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
}

impl PreferencesPatch {
    pub fn target_calories(value: Option<u32>) -> Self {
        Self {
            target_calories: Some(value),
            ..Self::default()
        }
    }

    pub fn macro_grams(kind: MacroKind, value: Option<u32>) -> Self {
        let mut patch = Self::default();
        match kind {
            MacroKind::Protein => patch.protein_grams = Some(value),
            MacroKind::Carbs => patch.carbs_grams = Some(value),
            MacroKind::Fats => patch.fats_grams = Some(value),
        }
        patch
    }

    pub fn allergies(value: Vec<String>) -> Self {
        Self {
            allergies: Some(value),
            ..Self::default()
        }
    }

    pub fn zip_code(value: impl Into<String>) -> Self {
        Self {
            zip_code: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn cuisines(value: Vec<String>) -> Self {
        Self {
            cuisines: Some(value),
            ..Self::default()
        }
    }

    pub fn min_price(value: u32) -> Self {
        Self {
            min_price: Some(value),
            ..Self::default()
        }
    }

    pub fn max_price(value: u32) -> Self {
        Self {
            max_price: Some(value),
            ..Self::default()
        }
    }
}

impl Reducible for Preferences {
    type Action = PreferencesPatch;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/// One of the three macronutrients the form asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    Protein,
    Carbs,
    Fats,
}

impl MacroKind {
    pub const ALL: [MacroKind; 3] = [MacroKind::Protein, MacroKind::Carbs, MacroKind::Fats];

    pub fn label(self) -> &'static str {
        match self {
            MacroKind::Protein => "Protein",
            MacroKind::Carbs => "Carbs",
            MacroKind::Fats => "Fats",
        }
    }

    pub fn input_id(self) -> &'static str {
        match self {
            MacroKind::Protein => "proteinGrams",
            MacroKind::Carbs => "carbsGrams",
            MacroKind::Fats => "fatsGrams",
        }
    }
}

/// Which macros the user chose not to specify. Owned by the form, not the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkippedMacros {
    pub protein: bool,
    pub carbs: bool,
    pub fats: bool,
}

impl SkippedMacros {
    pub fn is_skipped(&self, kind: MacroKind) -> bool {
        match kind {
            MacroKind::Protein => self.protein,
            MacroKind::Carbs => self.carbs,
            MacroKind::Fats => self.fats,
        }
    }

    /// Flip `kind`. When it becomes skipped, the returned patch clears the
    /// stored value; switching back to "specify" leaves the value unset.
    pub fn toggle(&mut self, kind: MacroKind) -> Option<PreferencesPatch> {
        let flag = match kind {
            MacroKind::Protein => &mut self.protein,
            MacroKind::Carbs => &mut self.carbs,
            MacroKind::Fats => &mut self.fats,
        };
        *flag = !*flag;
        let now_skipped = *flag;
        now_skipped.then(|| PreferencesPatch::macro_grams(kind, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_session() {
        let prefs = Preferences::default();
        assert_eq!(prefs.target_calories, None);
        assert_eq!(prefs.cuisines, vec!["None".to_string()]);
        assert_eq!((prefs.min_price, prefs.max_price), (10, 25));
        assert!(prefs.allergies.is_empty());
    }

    #[test]
    fn patch_replaces_only_named_fields() {
        let mut prefs = Preferences::default();
        prefs.apply(PreferencesPatch::target_calories(Some(2000)));
        prefs.apply(PreferencesPatch::zip_code("46556"));

        assert_eq!(prefs.target_calories, Some(2000));
        assert_eq!(prefs.zip_code, "46556");
        assert_eq!(prefs.min_price, 10);
    }

    #[test]
    fn explicit_none_clears_a_field() {
        let mut prefs = Preferences::default();
        prefs.apply(PreferencesPatch::macro_grams(MacroKind::Carbs, Some(120)));
        assert_eq!(prefs.carbs_grams, Some(120));

        prefs.apply(PreferencesPatch::macro_grams(MacroKind::Carbs, None));
        assert_eq!(prefs.carbs_grams, None);
    }

    #[test]
    fn reducer_returns_a_new_snapshot() {
        let before = Rc::new(Preferences::default());
        let after = before.clone().reduce(PreferencesPatch::min_price(5));
        assert_eq!(before.min_price, 10);
        assert_eq!(after.min_price, 5);
    }

    #[test]
    fn skip_then_specify_leaves_macro_unset() {
        let mut prefs = Preferences::default();
        let mut skipped = SkippedMacros::default();
        prefs.apply(PreferencesPatch::macro_grams(MacroKind::Protein, Some(150)));

        let patch = skipped.toggle(MacroKind::Protein);
        assert!(skipped.is_skipped(MacroKind::Protein));
        prefs.apply(patch.expect("skipping clears the value"));

        assert_eq!(skipped.toggle(MacroKind::Protein), None);
        assert!(!skipped.is_skipped(MacroKind::Protein));
        assert_eq!(prefs.macro_grams(MacroKind::Protein), None);
    }
}
