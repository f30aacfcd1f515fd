//! Cuisine options and the rules that keep the sentinel `"None"` exclusive.

/// Placeholder meaning "no cuisine preference".
pub const NO_CUISINE: &str = "None";

/// `(value, label)` pairs offered by the picker, sentinel first.
pub const CUISINE_OPTIONS: [(&str, &str); 11] = [
    (NO_CUISINE, "None"),
    ("american", "American"),
    ("italian", "Italian"),
    ("mexican", "Mexican"),
    ("chinese", "Chinese"),
    ("japanese", "Japanese"),
    ("indian", "Indian"),
    ("mediterranean", "Mediterranean"),
    ("thai", "Thai"),
    ("vietnamese", "Vietnamese"),
    ("korean", "Korean"),
];

pub fn cuisine_label(value: &str) -> Option<&'static str> {
    CUISINE_OPTIONS
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

pub fn is_sentinel_only(cuisines: &[String]) -> bool {
    cuisines.first().map(String::as_str) == Some(NO_CUISINE)
}

/// Result of picking `value` from the picker. `None` means nothing changes
/// (the placeholder, an unknown value, or an already selected cuisine).
pub fn select_cuisine(current: &[String], value: &str) -> Option<Vec<String>> {
    if value == NO_CUISINE {
        return Some(vec![NO_CUISINE.to_string()]);
    }
    if cuisine_label(value).is_none() || current.iter().any(|c| c == value) {
        return None;
    }
    if is_sentinel_only(current) {
        Some(vec![value.to_string()])
    } else {
        let mut next = current.to_vec();
        next.push(value.to_string());
        Some(next)
    }
}

/// Drop `value`; removing the last concrete cuisine falls back to the sentinel.
pub fn remove_cuisine(current: &[String], value: &str) -> Vec<String> {
    let next: Vec<String> = current.iter().filter(|c| *c != value).cloned().collect();
    if next.is_empty() {
        vec![NO_CUISINE.to_string()]
    } else {
        next
    }
}

/// Options still worth offering: anything not selected, plus the sentinel.
pub fn available_options(current: &[String]) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
    CUISINE_OPTIONS
        .iter()
        .copied()
        .filter(move |(value, _)| *value == NO_CUISINE || !current.iter().any(|c| c == value))
}

/// The list sent to the backend: empty when there is no preference.
pub fn wire_cuisines(current: &[String]) -> Vec<String> {
    if is_sentinel_only(current) {
        Vec::new()
    } else {
        current.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_concrete_pick_replaces_sentinel() {
        let next = select_cuisine(&list(&["None"]), "thai").unwrap();
        assert_eq!(next, list(&["thai"]));
    }

    #[test]
    fn picks_append_without_duplicates() {
        let next = select_cuisine(&list(&["thai"]), "korean").unwrap();
        assert_eq!(next, list(&["thai", "korean"]));
        assert_eq!(select_cuisine(&next, "thai"), None);
    }

    #[test]
    fn selecting_none_resets_to_sentinel() {
        let next = select_cuisine(&list(&["thai", "korean"]), "None").unwrap();
        assert_eq!(next, list(&["None"]));
    }

    #[test]
    fn placeholder_and_unknown_values_are_ignored() {
        assert_eq!(select_cuisine(&list(&["None"]), ""), None);
        assert_eq!(select_cuisine(&list(&["None"]), "martian"), None);
    }

    #[test]
    fn removing_last_concrete_cuisine_restores_sentinel() {
        assert_eq!(remove_cuisine(&list(&["indian"]), "indian"), list(&["None"]));
        assert_eq!(
            remove_cuisine(&list(&["indian", "thai"]), "indian"),
            list(&["thai"])
        );
    }

    #[test]
    fn sentinel_never_coexists_with_concrete_entries() {
        let mut current = list(&["None"]);
        for value in ["italian", "None", "mexican", "chinese"] {
            if let Some(next) = select_cuisine(&current, value) {
                current = next;
            }
            let has_sentinel = current.iter().any(|c| c == NO_CUISINE);
            assert!(!has_sentinel || current.len() == 1, "{current:?}");
        }
        assert_eq!(current, list(&["mexican", "chinese"]));
    }

    #[test]
    fn picker_hides_selected_options_but_keeps_sentinel() {
        let current = list(&["thai"]);
        let values: Vec<&str> = available_options(&current).map(|(v, _)| v).collect();
        assert!(values.contains(&"None"));
        assert!(!values.contains(&"thai"));
        assert_eq!(values.len(), CUISINE_OPTIONS.len() - 1);
    }

    #[test]
    fn wire_list_is_empty_for_sentinel() {
        assert!(wire_cuisines(&list(&["None"])).is_empty());
        assert_eq!(wire_cuisines(&list(&["thai"])), list(&["thai"]));
    }
}
