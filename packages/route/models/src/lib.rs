#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address, itinerary and provider link types for the route planner.
//!
//! This crate contains only data types and simple conversions. It has no
//! I/O and no knowledge of any geocoding service or map provider URL
//! grammar; those live in `route_planner_geocoder` and
//! `route_planner_route`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Minimum number of characters an address must have (after trimming)
/// before it is searched, stored in a point list, or edited in place.
pub const MIN_ADDRESS_LEN: usize = 3;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` when both components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Any of the address shapes a caller may hand to the planner.
///
/// Legacy JSON shapes are converted into this type in one place
/// (`route_planner_geocoder::address::input_from_json`); everything
/// downstream only sees these three variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AddressInput {
    /// Free text typed by the user or picked from a suggestion label.
    Text {
        /// The raw text.
        text: String,
    },
    /// A bare coordinate pair.
    Coordinates {
        /// The coordinates.
        location: Coordinates,
    },
    /// A structured record, typically the output of a previous
    /// resolution.
    Structured {
        /// Short address as entered.
        address: Option<String>,
        /// Canonical address reported by a geocoder.
        formatted_address: Option<String>,
        /// Position, when known.
        location: Option<Coordinates>,
    },
}

impl AddressInput {
    /// Wraps free text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Wraps a coordinate pair.
    #[must_use]
    pub const fn coordinates(lat: f64, lng: f64) -> Self {
        Self::Coordinates {
            location: Coordinates::new(lat, lng),
        }
    }

    /// An input with no usable field at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Structured {
            address: None,
            formatted_address: None,
            location: None,
        }
    }

    /// Coordinates carried by the input, if both components are present
    /// and finite.
    #[must_use]
    pub fn location(&self) -> Option<Coordinates> {
        match self {
            Self::Text { .. } => None,
            Self::Coordinates { location } => Some(*location).filter(Coordinates::is_finite),
            Self::Structured { location, .. } => location.filter(Coordinates::is_finite),
        }
    }
}

impl From<&str> for AddressInput {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for AddressInput {
    fn from(value: String) -> Self {
        Self::Text { text: value }
    }
}

/// One raw entry of an itinerary: the address as the user provided it,
/// plus the provider place id when it was picked from a suggestion list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    /// The address as entered or selected.
    pub input: AddressInput,
    /// Provider place id of the selected suggestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl RouteEntry {
    /// An entry made of free text only.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            input: AddressInput::text(text),
            place_id: None,
        }
    }

    /// An entry selected from a suggestion list.
    #[must_use]
    pub fn selected(suggestion: &Suggestion) -> Self {
        Self {
            input: AddressInput::text(suggestion.description.clone()),
            place_id: Some(suggestion.place_id.clone()).filter(|id| !id.is_empty()),
        }
    }
}

impl From<AddressInput> for RouteEntry {
    fn from(input: AddressInput) -> Self {
        Self {
            input,
            place_id: None,
        }
    }
}

/// An autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Human-readable label.
    pub description: String,
    /// Provider place id used to resolve the suggestion.
    pub place_id: String,
}

/// A point after resolution.
///
/// `address` is always populated; it falls back to `query` when nothing
/// could be resolved. Coordinates are either fully present or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPoint {
    /// The label that was resolved.
    pub query: String,
    /// Provider place id, when the point was resolved through one.
    pub place_id: Option<String>,
    /// Canonical address, or the query verbatim.
    pub address: String,
    /// Resolved position.
    #[serde(flatten)]
    pub location: Option<Coordinates>,
}

impl ResolvedPoint {
    /// The echo fallback: the label is returned as the address, with no
    /// place id and no coordinates.
    #[must_use]
    pub fn echo(label: impl Into<String>) -> Self {
        let query = label.into();
        Self {
            address: query.clone(),
            query,
            place_id: None,
            location: None,
        }
    }

    /// Latitude, if resolved.
    #[must_use]
    pub fn lat(&self) -> Option<f64> {
        self.location.map(|c| c.lat)
    }

    /// Longitude, if resolved.
    #[must_use]
    pub fn lng(&self) -> Option<f64> {
        self.location.map(|c| c.lng)
    }
}

/// A circular region that influences autocomplete ranking without
/// excluding results outside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBias {
    /// Circle center.
    pub center: Coordinates,
    /// Circle radius in metres.
    pub radius_m: u32,
}

impl LocationBias {
    /// Default radius used when a caller only knows a center point.
    pub const DEFAULT_RADIUS_M: u32 = 20_000;

    /// Creates a bias circle.
    #[must_use]
    pub const fn circle(lat: f64, lng: f64, radius_m: u32) -> Self {
        Self {
            center: Coordinates::new(lat, lng),
            radius_m,
        }
    }

    /// Formats the bias as a Google Places `locationbias` value:
    /// `circle:{radius}@{lat},{lng}`.
    #[must_use]
    pub fn to_places_param(&self) -> String {
        format!(
            "circle:{}@{},{}",
            self.radius_m, self.center.lat, self.center.lng
        )
    }
}

/// Travel mode understood by the providers.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TravelMode {
    /// By car.
    #[default]
    Driving,
    /// On foot.
    Walking,
    /// By bicycle.
    Bicycling,
    /// Public transport.
    Transit,
}

impl TravelMode {
    /// All modes.
    pub const ALL: &[Self] = &[
        Self::Driving,
        Self::Walking,
        Self::Bicycling,
        Self::Transit,
    ];

    /// Parses a mode, falling back to [`TravelMode::Driving`] for any
    /// unrecognized value.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

/// Route feature a provider may be asked to avoid.
///
/// The derived ordering is the canonical order used when encoding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Avoid {
    /// Toll roads.
    Tolls,
    /// Highways / motorways.
    Highways,
    /// Ferries.
    Ferries,
    /// Indoor steps (walking and transit).
    Indoor,
}

impl Avoid {
    /// All avoidable features, in canonical order.
    pub const ALL: &[Self] = &[Self::Tolls, Self::Highways, Self::Ferries, Self::Indoor];

    /// Parses a list of avoid values, silently dropping anything that is
    /// not one of the allowed features.
    ///
    /// Items may themselves be comma separated (`"tolls,ferries"`).
    pub fn parse_set<'a>(values: impl IntoIterator<Item = &'a str>) -> BTreeSet<Self> {
        values
            .into_iter()
            .flat_map(|v| v.split(','))
            .filter_map(|v| v.trim().parse().ok())
            .collect()
    }
}

/// Routing preferences passed through to the providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptions {
    /// Travel mode.
    #[serde(default)]
    pub mode: TravelMode,
    /// Features to avoid.
    #[serde(default)]
    pub avoid: BTreeSet<Avoid>,
    /// Ask the provider to optimize waypoint order. Never computed
    /// locally.
    #[serde(default)]
    pub optimize: bool,
}

/// A resolved itinerary ready for URL building.
///
/// Built fresh for every generation attempt and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// First point.
    pub origin: ResolvedPoint,
    /// Last point.
    pub destination: ResolvedPoint,
    /// Interior points, in itinerary order.
    pub waypoints: Vec<ResolvedPoint>,
    /// Routing preferences.
    pub options: RouteOptions,
}

/// Map provider a link is generated for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// Google Maps.
    Google,
    /// Waze.
    Waze,
    /// Apple Maps.
    Apple,
}

impl Provider {
    /// All providers.
    pub const ALL: &[Self] = &[Self::Google, Self::Waze, Self::Apple];

    /// Human-readable product name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Google => "Google Maps",
            Self::Waze => "Waze",
            Self::Apple => "Apple Maps",
        }
    }
}

/// Outcome of one provider's URL builder.
///
/// A `None` url means the provider cannot express the request; this is a
/// normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUrlResult {
    /// The provider.
    pub provider: Provider,
    /// Deep link, when the provider could express the request.
    pub url: Option<String>,
}

impl ProviderUrlResult {
    /// Returns `true` when a link was produced.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.url.is_some()
    }
}

/// The three provider links for one generated route, along with the
/// points they were built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLinks {
    /// Google Maps result.
    pub google: ProviderUrlResult,
    /// Waze result.
    pub waze: ProviderUrlResult,
    /// Apple Maps result.
    pub apple: ProviderUrlResult,
    /// Resolved origin.
    pub origin: ResolvedPoint,
    /// Resolved destination.
    pub destination: ResolvedPoint,
    /// Resolved waypoints, in itinerary order.
    pub waypoints: Vec<ResolvedPoint>,
}

impl RouteLinks {
    /// The three results in provider order.
    #[must_use]
    pub fn results(&self) -> [&ProviderUrlResult; 3] {
        [&self.google, &self.waze, &self.apple]
    }

    /// Returns `true` when no provider produced a link.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results().iter().all(|r| !r.is_available())
    }
}

/// The planner tab a session belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlannerMode {
    /// Freeform ordered point list with reorder, edit and delete.
    Professional,
    /// Origin, destination and one optional stop.
    Traveler,
    /// Origin, destination and a free-text list of stops.
    Tourist,
}

impl PlannerMode {
    /// All modes.
    pub const ALL: &[Self] = &[Self::Professional, Self::Traveler, Self::Tourist];
}
