//! Turns an ordered list of entries into provider links.

use futures::future::join_all;
use route_planner_geocoder::resolver::AddressResolver;
use route_planner_route_models::{
    Provider, ResolvedPoint, RouteEntry, RouteLinks, RouteOptions, RouteRequest,
};

use crate::RouteError;
use crate::point_list::MIN_ROUTE_POINTS;
use crate::providers::{Stops, build_with, builder_for};

/// Resolves every entry and builds a link for each provider.
///
/// The first entry is the origin, the last the destination, everything in
/// between a waypoint. Entries are resolved concurrently but keep their
/// order. A provider that cannot express the itinerary yields a `None`
/// url; that is not an error.
///
/// # Errors
///
/// * [`RouteError::InsufficientPoints`] if fewer than two entries are given
pub async fn build_route(
    resolver: &AddressResolver,
    entries: &[RouteEntry],
    options: &RouteOptions,
) -> Result<RouteLinks, RouteError> {
    if entries.len() < MIN_ROUTE_POINTS {
        return Err(RouteError::InsufficientPoints {
            count: entries.len(),
        });
    }

    let resolved = join_all(entries.iter().map(|entry| resolver.resolve_entry(entry))).await;

    let request = request_from(resolved, options)?;
    let links = links_for(request);

    log::info!(
        "Built route with {} waypoint(s): {} of {} providers available",
        links.waypoints.len(),
        links.results().iter().filter(|r| r.is_available()).count(),
        Provider::ALL.len()
    );

    Ok(links)
}

/// Splits resolved points into origin, waypoints and destination.
fn request_from(
    resolved: Vec<ResolvedPoint>,
    options: &RouteOptions,
) -> Result<RouteRequest, RouteError> {
    let count = resolved.len();
    let mut points = resolved.into_iter();
    let (Some(origin), Some(destination)) = (points.next(), points.next_back()) else {
        return Err(RouteError::InsufficientPoints { count });
    };

    Ok(RouteRequest {
        origin,
        destination,
        waypoints: points.collect(),
        options: options.clone(),
    })
}

/// Runs every builder against an already resolved request.
#[must_use]
pub fn links_for(request: RouteRequest) -> RouteLinks {
    let stops = Stops::from_request(&request);
    let build = |provider| build_with(builder_for(provider), &stops, &request.options);

    let google = build(Provider::Google);
    let waze = build(Provider::Waze);
    let apple = build(Provider::Apple);

    RouteLinks {
        google,
        waze,
        apple,
        origin: request.origin,
        destination: request.destination,
        waypoints: request.waypoints,
    }
}
