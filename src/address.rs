//! Address clean-up ahead of geocoding.
//!
//! Pure string rewriting: whitespace and separators are canonicalised,
//! common street-suffix abbreviations are spelled out and a trailing
//! country marker is dropped. Nothing is ever synthesised; a missing ZIP or
//! state is left for the geocoder's region bias to resolve.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static COMMA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());
static UNIT_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*#\s*").unwrap());
static COMMA_COUNTRY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*,\s*\bUSA\.?\s*$").unwrap());
// Without a comma, "USA" only counts as the country right after a state or ZIP.
static BARE_COUNTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\b[A-Z]{2}|\b\d{5}(?:-\d{4})?)\s+(?i:USA)\.?\s*$").unwrap()
});
// A bare "IL" or "IL 62701" segment is a state, not a street suffix ("CT", "DR").
static STATE_SEGMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2}(?:\s+\d{5}(?:-\d{4})?)?$").unwrap());
static STATE_ZIP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2}\s+\d{5}(?:-\d{4})?\b").unwrap());
static CITY_STATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*[^,]+,\s*[A-Z]{2}\s*$").unwrap());

/// Abbreviation expansions, applied in order.
static SUFFIX_EXPANSIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bState\s+Hwy\b\.?", "State Highway"),
        (r"(?i)\bSuite\b", "Suite"),
        (r"(?i)\bSte\b\.?", "Suite"),
        (r"(?i)\bRd\b\.?", "Road"),
        (r"(?i)\bSt\b\.?", "Street"),
        (r"(?i)\bAve\b\.?", "Avenue"),
        (r"(?i)\bBlvd\b\.?", "Boulevard"),
        (r"(?i)\bHwy\b\.?", "Highway"),
        (r"(?i)\bDr\b\.?", "Drive"),
        (r"(?i)\bLn\b\.?", "Lane"),
        (r"(?i)\bCt\b\.?", "Court"),
    ]
    .into_iter()
    .map(|(pattern, word)| (Regex::new(pattern).unwrap(), word))
    .collect()
});

/// How much location context a normalized address carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressShape {
    StateAndZip,
    CityAndState,
    Unqualified,
}

fn expand_abbreviations(text: &str) -> String {
    SUFFIX_EXPANSIONS
        .iter()
        .fold(text.to_string(), |acc, (re, word)| {
            re.replace_all(&acc, *word).into_owned()
        })
}

/// Expand one comma segment. State+ZIP spans are copied through untouched,
/// so "Hartford CT 06103" keeps its state even without a comma.
fn expand_suffixes(segment: &str) -> String {
    if STATE_SEGMENT_REGEX.is_match(segment) {
        return segment.to_string();
    }
    let mut out = String::with_capacity(segment.len());
    let mut last = 0;
    for span in STATE_ZIP_REGEX.find_iter(segment) {
        out.push_str(&expand_abbreviations(&segment[last..span.start()]));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&expand_abbreviations(&segment[last..]));
    out
}

fn strip_country(address: &str) -> String {
    let without_comma = COMMA_COUNTRY_REGEX.replace(address, "");
    BARE_COUNTRY_REGEX
        .replace(&without_comma, "${1}")
        .into_owned()
}

/// Canonical, geocoder-friendly form of a free-form address.
pub fn normalize_address(address: &str) -> String {
    let collapsed = WHITESPACE_REGEX.replace_all(address.trim(), " ");
    let commas = COMMA_REGEX.replace_all(&collapsed, ", ");
    let units = UNIT_MARKER_REGEX.replace_all(&commas, " # ");

    let expanded = units
        .split(", ")
        .map(|segment| expand_suffixes(segment.trim()))
        .collect::<Vec<_>>()
        .join(", ");

    let without_country = strip_country(&expanded);
    WHITESPACE_REGEX
        .replace_all(without_country.trim(), " ")
        .trim_end_matches(',')
        .trim()
        .to_string()
}

pub fn classify_address(normalized: &str) -> AddressShape {
    if STATE_ZIP_REGEX.is_match(normalized) {
        AddressShape::StateAndZip
    } else if CITY_STATE_REGEX.is_match(normalized) {
        AddressShape::CityAndState
    } else {
        AddressShape::Unqualified
    }
}

/// Normalize and report how complete the address is. The string handed to
/// the geocoder is the normalized form whatever its shape.
pub fn format_for_geocoding(address: &str) -> String {
    let normalized = normalize_address(address);
    let shape = classify_address(&normalized);
    debug!("Geocoding input {:?} classified as {:?}", normalized, shape);
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_street_and_drops_country() {
        assert_eq!(
            normalize_address("123 Main St, Springfield, IL, USA"),
            "123 Main Street, Springfield, IL"
        );
    }

    #[test]
    fn collapses_whitespace_and_comma_spacing() {
        assert_eq!(
            normalize_address("  42   Oak Ave ,South Bend,IN   46601 "),
            "42 Oak Avenue, South Bend, IN 46601"
        );
    }

    #[test]
    fn pads_unit_markers() {
        assert_eq!(
            normalize_address("500 Elm Blvd#12, Austin, TX 78701"),
            "500 Elm Boulevard # 12, Austin, TX 78701"
        );
    }

    #[test]
    fn expands_abbreviations_case_insensitively() {
        assert_eq!(
            normalize_address("7 pine rd ste 4, Reno, NV"),
            "7 pine Road Suite 4, Reno, NV"
        );
        assert_eq!(normalize_address("1 Lake DR."), "1 Lake Drive");
        assert_eq!(normalize_address("3 Birch ln"), "3 Birch Lane");
        assert_eq!(normalize_address("10 Court ct"), "10 Court Court");
        assert_eq!(normalize_address("Hwy 31 N"), "Highway 31 N");
        assert_eq!(normalize_address("1200 State Hwy 23"), "1200 State Highway 23");
    }

    #[test]
    fn does_not_touch_words_containing_abbreviations() {
        assert_eq!(
            normalize_address("9 Stevens Drive, Streator, IL"),
            "9 Stevens Drive, Streator, IL"
        );
    }

    #[test]
    fn state_segments_are_left_alone() {
        assert_eq!(
            normalize_address("55 Elm St, Hartford, CT 06103"),
            "55 Elm Street, Hartford, CT 06103"
        );
    }

    #[test]
    fn strips_country_case_insensitively_without_comma() {
        assert_eq!(normalize_address("1 A St Chicago IL usa"), "1 A Street Chicago IL");
    }

    #[test]
    fn state_before_zip_survives_without_commas() {
        let normalized = normalize_address("55 Elm St Hartford CT 06103");
        assert_eq!(normalized, "55 Elm Street Hartford CT 06103");
        assert_eq!(classify_address(&normalized), AddressShape::StateAndZip);

        assert_eq!(
            normalize_address("8 Oak Ct Dover DE 19901-1234 USA"),
            "8 Oak Court Dover DE 19901-1234"
        );
    }

    #[test]
    fn usa_inside_a_name_is_kept() {
        assert_eq!(normalize_address("Pizza USA"), "Pizza USA");
        assert_eq!(
            normalize_address("Burger USA, Springfield, IL, usa."),
            "Burger USA, Springfield, IL"
        );
        assert_eq!(normalize_address("9 Main St Peoria IL 61602 USA"), "9 Main Street Peoria IL 61602");
    }

    #[test]
    fn classifies_available_context() {
        assert_eq!(
            classify_address("1 A Street, Chicago, IL 60601"),
            AddressShape::StateAndZip
        );
        assert_eq!(
            classify_address("1 A Street, Chicago, IL 60601-1234"),
            AddressShape::StateAndZip
        );
        assert_eq!(
            classify_address("1 A Street, Chicago, IL"),
            AddressShape::CityAndState
        );
        assert_eq!(classify_address("1 A Street"), AddressShape::Unqualified);
    }

    #[test]
    fn formatting_never_invents_missing_parts() {
        for input in ["1 A St", "1 A St, Chicago, IL", "1 A St, Chicago, IL 60601"] {
            assert_eq!(format_for_geocoding(input), normalize_address(input));
        }
    }
}
