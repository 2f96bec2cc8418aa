//! Address normalization.
//!
//! Addresses reach the planner in several shapes:
//! - Free text: `"Plaza Mayor, Madrid"`
//! - Coordinate pairs: `"41.4,2.2"` or `{"lat": 41.4, "lng": 2.2}`
//! - Structured records: `{"formatted_address": "...", "geometry":
//!   {"location": {"lat": ..., "lng": ...}}}`
//!
//! [`input_from_json`] is the only place that understands the legacy JSON
//! shapes; [`normalize`] turns any [`AddressInput`] into the single string
//! form every URL builder consumes.

use std::sync::LazyLock;

use regex::Regex;
use route_planner_route_models::{AddressInput, Coordinates};
use serde_json::Value;

/// A plain decimal literal: optional sign, digits, optional fraction.
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("valid regex"));

/// Normalizes an address into its canonical string form.
///
/// Prefers `formatted_address`, then `address`, then `"{lat},{lng}"`.
/// Blank strings count as absent. Returns `None` when nothing usable is
/// left, which callers treat as "unresolvable".
#[must_use]
pub fn normalize(input: &AddressInput) -> Option<String> {
    match input {
        AddressInput::Text { text } => non_blank(text),
        AddressInput::Coordinates { .. } => input.location().map(|c| c.to_string()),
        AddressInput::Structured {
            address,
            formatted_address,
            ..
        } => formatted_address
            .as_deref()
            .and_then(non_blank)
            .or_else(|| address.as_deref().and_then(non_blank))
            .or_else(|| input.location().map(|c| c.to_string())),
    }
}

/// Parses `"lat,lng"` when both components are decimal literals.
///
/// `"41.4,2.2"` and `" -3.70 , 40.41 "` parse; `"Calle 5, Madrid"`,
/// `"1e5,2"` and `"41.4"` do not.
#[must_use]
pub fn parse_coordinate_pair(s: &str) -> Option<Coordinates> {
    let (lat, lng) = s.trim().split_once(',')?;
    let (lat, lng) = (lat.trim(), lng.trim());

    if !DECIMAL_RE.is_match(lat) || !DECIMAL_RE.is_match(lng) {
        return None;
    }

    let coords = Coordinates::new(lat.parse().ok()?, lng.parse().ok()?);
    coords.is_finite().then_some(coords)
}

/// Converts any of the legacy JSON address shapes into an
/// [`AddressInput`].
///
/// Recognized shapes:
/// - a string
/// - a `[lat, lng]` array
/// - an object with any of `formatted_address` / `formattedAddress`,
///   `address`, `location: {lat, lng}`, `geometry: {location: {lat, lng}}`
///   or top-level `lat` + `lng` / `lon`
///
/// Coordinate components may be numbers or numeric strings; a pair with a
/// missing or non-numeric component is treated as absent. Anything else
/// yields [`AddressInput::empty`].
#[must_use]
pub fn input_from_json(value: &Value) -> AddressInput {
    match value {
        Value::String(s) => AddressInput::text(s.clone()),
        Value::Array(items) => match items.as_slice() {
            [lat, lng] => coordinates_from_values(lat, lng)
                .map_or_else(AddressInput::empty, |location| AddressInput::Coordinates {
                    location,
                }),
            _ => AddressInput::empty(),
        },
        Value::Object(map) => {
            let text_field = |key: &str| map.get(key).and_then(Value::as_str).and_then(non_blank);

            let formatted_address =
                text_field("formatted_address").or_else(|| text_field("formattedAddress"));
            let address = text_field("address");
            let location = map
                .get("location")
                .and_then(coordinates_from_object)
                .or_else(|| {
                    value
                        .pointer("/geometry/location")
                        .and_then(coordinates_from_object)
                })
                .or_else(|| coordinates_from_object(value));

            match (address, formatted_address, location) {
                (None, None, Some(location)) => AddressInput::Coordinates { location },
                (address, formatted_address, location) => AddressInput::Structured {
                    address,
                    formatted_address,
                    location,
                },
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => AddressInput::empty(),
    }
}

fn coordinates_from_object(value: &Value) -> Option<Coordinates> {
    let lat = value.get("lat")?;
    let lng = value.get("lng").or_else(|| value.get("lon"))?;
    coordinates_from_values(lat, lng)
}

fn coordinates_from_values(lat: &Value, lng: &Value) -> Option<Coordinates> {
    let coords = Coordinates::new(numeric(lat)?, numeric(lng)?);
    coords.is_finite().then_some(coords)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if DECIMAL_RE.is_match(s.trim()) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
