#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route planning: the editable point list, deep-link builders for Google
//! Maps, Waze and Apple Maps, and the assembler that ties them together.
//!
//! A route is generated in three steps:
//!
//! 1. The caller collects entries, either in a [`point_list::RoutePointList`]
//!    or in the fixed slots of a [`planner`] session.
//! 2. [`assembler::build_route`] resolves every entry through the
//!    geocoder's resolver, concurrently and in order.
//! 3. Each [`providers::UrlBuilder`] encodes the itinerary. A provider
//!    that cannot express it returns no link; the others are unaffected.
//!
//! The only hard failure is asking for a route with fewer than two
//! points.

pub mod assembler;
pub mod planner;
pub mod point_list;
pub mod providers;

use thiserror::Error;

pub use assembler::{build_route, links_for};
pub use planner::{PlannerError, PlannerSession};
pub use point_list::{Direction, PointListError, RoutePointList};

/// Errors from route generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A route needs at least an origin and a destination.
    #[error("A route needs at least 2 points (got {count})")]
    InsufficientPoints {
        /// Number of points supplied.
        count: usize,
    },
}
