#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the route planner server.
//!
//! Addresses arrive as loose JSON (a string, a coordinate pair or a
//! geocoder-shaped object) and are kept as [`serde_json::Value`] here; the
//! server converts them into typed route entries at the boundary.

use route_planner_route_models::{Avoid, LocationBias, PlannerMode, RouteOptions, TravelMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether a geocoding provider is configured.
    pub geocoder: bool,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable reason.
    pub error: String,
}

/// Query parameters for `GET /api/suggest`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestParams {
    /// Partial address typed by the user.
    #[serde(default)]
    pub term: String,
    /// Bias center latitude.
    pub lat: Option<f64>,
    /// Bias center longitude.
    pub lng: Option<f64>,
    /// Bias radius in metres.
    pub radius: Option<u32>,
}

impl SuggestParams {
    /// The bias circle, when both center coordinates are given.
    #[must_use]
    pub fn bias(&self) -> Option<LocationBias> {
        let (lat, lng) = (self.lat?, self.lng?);
        let bias = LocationBias::circle(
            lat,
            lng,
            self.radius.unwrap_or(LocationBias::DEFAULT_RADIUS_M),
        );
        bias.center.is_finite().then_some(bias)
    }
}

/// Body of `POST /api/resolve`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    /// Label shown to the user.
    pub label: String,
    /// Place id of the picked suggestion.
    pub place_id: Option<String>,
}

/// Avoid values given either as one comma separated string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AvoidList {
    One(String),
    Many(Vec<String>),
}

impl AvoidList {
    /// The recognized values; anything else is dropped.
    #[must_use]
    pub fn to_set(&self) -> BTreeSet<Avoid> {
        match self {
            Self::One(value) => Avoid::parse_set([value.as_str()]),
            Self::Many(values) => Avoid::parse_set(values.iter().map(String::as_str)),
        }
    }
}

/// Partial routing preferences. Absent fields leave the current value
/// alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPatch {
    /// Travel mode; unknown modes mean driving.
    pub mode: Option<String>,
    /// Features to avoid.
    pub avoid: Option<AvoidList>,
    /// Ask the provider to optimize waypoint order.
    pub optimize: Option<bool>,
}

impl OptionsPatch {
    /// Applies the given fields onto `options`.
    pub fn apply(&self, options: &mut RouteOptions) {
        if let Some(mode) = &self.mode {
            options.mode = TravelMode::parse_or_default(mode);
        }
        if let Some(avoid) = &self.avoid {
            options.avoid = avoid.to_set();
        }
        if let Some(optimize) = self.optimize {
            options.optimize = optimize;
        }
    }
}

/// Body of `POST /api/route`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBody {
    /// Ordered points, first = origin, last = destination.
    pub points: Vec<Value>,
    #[serde(flatten)]
    pub options: OptionsPatch,
}

/// Body of `POST /api/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSession {
    /// Planner mode of the new session.
    pub mode: PlannerMode,
}

/// Response of `POST /api/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    /// Session id.
    pub id: String,
    /// Planner mode.
    pub mode: PlannerMode,
}

/// A point to add or to replace the active point with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointBody {
    /// Address as a string, coordinate pair or address object.
    pub value: Value,
    /// Place id of the picked suggestion.
    pub place_id: Option<String>,
}

/// Body of `POST /api/sessions/{id}/points/select`.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectBody {
    /// Index to make active; clamped into range.
    pub index: usize,
}

/// Body of `POST /api/sessions/{id}/points/move`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveBody {
    /// `up` or `down`.
    pub direction: String,
}

/// Response of `POST /api/sessions/{id}/points/move`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResult {
    /// `false` when the active point was already at the boundary.
    pub moved: bool,
}

/// Body of `PUT /api/sessions/{id}/slots`.
///
/// Absent fields are left unchanged; a blank value clears the slot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsBody {
    pub origin: Option<Value>,
    pub destination: Option<Value>,
    /// Traveler sessions only.
    pub stop: Option<Value>,
    /// Tourist sessions only: one stop per line.
    pub stops_text: Option<String>,
}

/// Body of `PUT /api/sessions/{id}/options`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptionsBody {
    #[serde(flatten)]
    pub options: OptionsPatch,
    /// Professional route type: `fastest`, `shortest` or `economic`.
    pub preset: Option<String>,
    /// New autocomplete bias.
    pub bias: Option<LocationBias>,
    /// Drop the current bias.
    #[serde(default)]
    pub clear_bias: bool,
}
