//! Per-session planner state for the three planner modes.
//!
//! Every session owns its own points, options, location bias and last
//! generated route. Nothing is shared between sessions.

use route_planner_geocoder::{address, resolver::AddressResolver};
use route_planner_route_models::{
    Avoid, LocationBias, PlannerMode, RouteEntry, RouteLinks, RouteOptions,
};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::RouteError;
use crate::assembler::build_route;
use crate::point_list::{PointListError, RoutePointList};

/// Errors from planner session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// A point list edit was rejected.
    #[error(transparent)]
    PointList(#[from] PointListError),

    /// Route generation failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Origin or destination has not been filled in.
    #[error("Origin and destination are required")]
    MissingEndpoints,

    /// The operation does not exist for this kind of session.
    #[error("Not available in {mode} mode")]
    WrongMode {
        /// Mode of the session the operation was attempted on.
        mode: PlannerMode,
    },
}

/// Route type offered by the professional planner.
///
/// Providers have no "shortest" switch, so only [`RoutePreset::Economic`]
/// changes the generated links (it avoids tolls). Presets never reorder
/// points.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoutePreset {
    #[default]
    Fastest,
    Shortest,
    Economic,
}

impl RoutePreset {
    pub const ALL: &[Self] = &[Self::Fastest, Self::Shortest, Self::Economic];

    /// Features this preset asks the provider to avoid.
    #[must_use]
    pub const fn avoid(self) -> Option<Avoid> {
        match self {
            Self::Fastest | Self::Shortest => None,
            Self::Economic => Some(Avoid::Tolls),
        }
    }
}

/// Single-choice avoid selector.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AvoidChoice {
    #[default]
    None,
    Tolls,
    Highways,
    Ferries,
}

impl AvoidChoice {
    pub const ALL: &[Self] = &[Self::None, Self::Tolls, Self::Highways, Self::Ferries];

    #[must_use]
    pub const fn avoid(self) -> Option<Avoid> {
        match self {
            Self::None => None,
            Self::Tolls => Some(Avoid::Tolls),
            Self::Highways => Some(Avoid::Highways),
            Self::Ferries => Some(Avoid::Ferries),
        }
    }
}

/// Options, bias and last result, common to every planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSettings {
    /// Preferences passed to the providers.
    #[serde(default)]
    pub options: RouteOptions,
    /// Autocomplete bias circle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<LocationBias>,
    /// Links from the last successful generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_route: Option<RouteLinks>,
}

impl RouteSettings {
    /// Replaces the avoid set with what `preset` and `choice` ask for.
    pub fn apply_preferences(&mut self, preset: RoutePreset, choice: AvoidChoice) {
        self.apply_preset(preset, choice.avoid());
    }

    /// Replaces the avoid set with what `preset` asks for plus `extra`.
    ///
    /// Avoids left over from an earlier preset do not survive.
    pub fn apply_preset(&mut self, preset: RoutePreset, extra: impl IntoIterator<Item = Avoid>) {
        self.options.avoid = preset.avoid().into_iter().chain(extra).collect();
    }

    async fn generate(
        &mut self,
        resolver: &AddressResolver,
        entries: &[RouteEntry],
    ) -> Result<RouteLinks, PlannerError> {
        let links = build_route(resolver, entries, &self.options).await?;
        self.last_route = Some(links.clone());
        Ok(links)
    }
}

/// Freeform ordered list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalPlanner {
    /// The itinerary.
    pub points: RoutePointList,
    #[serde(flatten)]
    pub settings: RouteSettings,
}

impl Default for ProfessionalPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfessionalPlanner {
    /// An empty planner that lets Google optimize waypoint order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: RoutePointList::new(),
            settings: RouteSettings {
                options: RouteOptions {
                    optimize: true,
                    ..RouteOptions::default()
                },
                ..RouteSettings::default()
            },
        }
    }

    /// Generates links for the current list.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::Route`] if the list has fewer than two points
    pub async fn generate(
        &mut self,
        resolver: &AddressResolver,
    ) -> Result<RouteLinks, PlannerError> {
        self.settings
            .generate(resolver, self.points.entries())
            .await
    }
}

/// Origin and destination with one optional stop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerPlanner {
    pub origin: Option<RouteEntry>,
    pub destination: Option<RouteEntry>,
    pub stop: Option<RouteEntry>,
    #[serde(flatten)]
    pub settings: RouteSettings,
}

impl TravelerPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_origin(&mut self, entry: Option<RouteEntry>) {
        self.origin = filled(entry);
    }

    pub fn set_destination(&mut self, entry: Option<RouteEntry>) {
        self.destination = filled(entry);
    }

    pub fn set_stop(&mut self, entry: Option<RouteEntry>) {
        self.stop = filled(entry);
    }

    /// `[origin, stop?, destination]`.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::MissingEndpoints`] if origin or destination is unset
    pub fn entries(&self) -> Result<Vec<RouteEntry>, PlannerError> {
        itinerary(
            self.origin.as_ref(),
            self.stop.iter(),
            self.destination.as_ref(),
        )
    }

    /// Generates links for the current slots.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::MissingEndpoints`] if origin or destination is unset
    pub async fn generate(
        &mut self,
        resolver: &AddressResolver,
    ) -> Result<RouteLinks, PlannerError> {
        let entries = self.entries()?;
        self.settings.generate(resolver, &entries).await
    }
}

/// Origin and destination plus any number of sights, entered one per
/// line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouristPlanner {
    pub origin: Option<RouteEntry>,
    pub destination: Option<RouteEntry>,
    #[serde(default)]
    pub stops: Vec<RouteEntry>,
    #[serde(flatten)]
    pub settings: RouteSettings,
}

impl TouristPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_origin(&mut self, entry: Option<RouteEntry>) {
        self.origin = filled(entry);
    }

    pub fn set_destination(&mut self, entry: Option<RouteEntry>) {
        self.destination = filled(entry);
    }

    /// Replaces the stops with the non-blank lines of `text`.
    pub fn set_stops_text(&mut self, text: &str) {
        self.stops = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(RouteEntry::text)
            .collect();
    }

    /// The stops back as one line each.
    #[must_use]
    pub fn stops_text(&self) -> String {
        self.stops
            .iter()
            .filter_map(|stop| address::normalize(&stop.input))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `[origin, stops.., destination]`.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::MissingEndpoints`] if origin or destination is unset
    pub fn entries(&self) -> Result<Vec<RouteEntry>, PlannerError> {
        itinerary(
            self.origin.as_ref(),
            self.stops.iter(),
            self.destination.as_ref(),
        )
    }

    /// Generates links for the current itinerary.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::MissingEndpoints`] if origin or destination is unset
    pub async fn generate(
        &mut self,
        resolver: &AddressResolver,
    ) -> Result<RouteLinks, PlannerError> {
        let entries = self.entries()?;
        self.settings.generate(resolver, &entries).await
    }
}

/// One planner session of any mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PlannerSession {
    Professional(ProfessionalPlanner),
    Traveler(TravelerPlanner),
    Tourist(TouristPlanner),
}

impl PlannerSession {
    /// A fresh session for `mode`.
    #[must_use]
    pub fn new(mode: PlannerMode) -> Self {
        match mode {
            PlannerMode::Professional => Self::Professional(ProfessionalPlanner::new()),
            PlannerMode::Traveler => Self::Traveler(TravelerPlanner::new()),
            PlannerMode::Tourist => Self::Tourist(TouristPlanner::new()),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> PlannerMode {
        match self {
            Self::Professional(_) => PlannerMode::Professional,
            Self::Traveler(_) => PlannerMode::Traveler,
            Self::Tourist(_) => PlannerMode::Tourist,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &RouteSettings {
        match self {
            Self::Professional(p) => &p.settings,
            Self::Traveler(p) => &p.settings,
            Self::Tourist(p) => &p.settings,
        }
    }

    pub const fn settings_mut(&mut self) -> &mut RouteSettings {
        match self {
            Self::Professional(p) => &mut p.settings,
            Self::Traveler(p) => &mut p.settings,
            Self::Tourist(p) => &mut p.settings,
        }
    }

    /// The ordered entries a route would be generated from.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::MissingEndpoints`] if a slot-based session lacks
    ///   an origin or destination
    pub fn entries(&self) -> Result<Vec<RouteEntry>, PlannerError> {
        match self {
            Self::Professional(p) => Ok(p.points.entries().to_vec()),
            Self::Traveler(p) => p.entries(),
            Self::Tourist(p) => p.entries(),
        }
    }

    /// Returns `true` once a route can be generated.
    #[must_use]
    pub fn can_route(&self) -> bool {
        match self {
            Self::Professional(p) => p.points.can_route(),
            Self::Traveler(_) | Self::Tourist(_) => self.entries().is_ok(),
        }
    }

    /// The point list of a professional session.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::WrongMode`] for traveler and tourist sessions
    pub fn points_mut(&mut self) -> Result<&mut RoutePointList, PlannerError> {
        match self {
            Self::Professional(p) => Ok(&mut p.points),
            other => Err(PlannerError::WrongMode { mode: other.mode() }),
        }
    }

    /// Sets the origin slot.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::WrongMode`] for professional sessions
    pub fn set_origin(&mut self, entry: Option<RouteEntry>) -> Result<(), PlannerError> {
        match self {
            Self::Traveler(p) => p.set_origin(entry),
            Self::Tourist(p) => p.set_origin(entry),
            Self::Professional(_) => return Err(self.wrong_mode()),
        }
        Ok(())
    }

    /// Sets the destination slot.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::WrongMode`] for professional sessions
    pub fn set_destination(&mut self, entry: Option<RouteEntry>) -> Result<(), PlannerError> {
        match self {
            Self::Traveler(p) => p.set_destination(entry),
            Self::Tourist(p) => p.set_destination(entry),
            Self::Professional(_) => return Err(self.wrong_mode()),
        }
        Ok(())
    }

    /// Sets the traveler's optional stop.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::WrongMode`] for other sessions
    pub fn set_stop(&mut self, entry: Option<RouteEntry>) -> Result<(), PlannerError> {
        match self {
            Self::Traveler(p) => {
                p.set_stop(entry);
                Ok(())
            }
            _ => Err(self.wrong_mode()),
        }
    }

    /// Sets the tourist's stops from one-per-line text.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::WrongMode`] for other sessions
    pub fn set_stops_text(&mut self, text: &str) -> Result<(), PlannerError> {
        match self {
            Self::Tourist(p) => {
                p.set_stops_text(text);
                Ok(())
            }
            _ => Err(self.wrong_mode()),
        }
    }

    /// Generates links and remembers them as the last route.
    ///
    /// # Errors
    ///
    /// * [`PlannerError::MissingEndpoints`] if a slot is empty
    /// * [`PlannerError::Route`] if fewer than two points are available
    pub async fn generate(
        &mut self,
        resolver: &AddressResolver,
    ) -> Result<RouteLinks, PlannerError> {
        let result = match self {
            Self::Professional(p) => p.generate(resolver).await,
            Self::Traveler(p) => p.generate(resolver).await,
            Self::Tourist(p) => p.generate(resolver).await,
        };

        if let Err(e) = &result {
            log::debug!("{} session cannot generate a route: {e}", self.mode());
        }
        result
    }

    const fn wrong_mode(&self) -> PlannerError {
        PlannerError::WrongMode { mode: self.mode() }
    }
}

/// Drops entries that normalize to nothing.
fn filled(entry: Option<RouteEntry>) -> Option<RouteEntry> {
    entry.filter(|e| address::normalize(&e.input).is_some())
}

fn itinerary<'a>(
    origin: Option<&'a RouteEntry>,
    stops: impl Iterator<Item = &'a RouteEntry>,
    destination: Option<&'a RouteEntry>,
) -> Result<Vec<RouteEntry>, PlannerError> {
    let (Some(origin), Some(destination)) = (origin, destination) else {
        return Err(PlannerError::MissingEndpoints);
    };

    Ok(std::iter::once(origin)
        .chain(stops)
        .chain(std::iter::once(destination))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_list::Direction;
    use route_planner_route_models::Suggestion;

    fn labels(entries: &[RouteEntry]) -> Vec<String> {
        entries
            .iter()
            .filter_map(|e| address::normalize(&e.input))
            .collect()
    }

    #[test]
    fn economic_preset_avoids_tolls() {
        let mut settings = RouteSettings::default();
        settings.apply_preferences(RoutePreset::Economic, AvoidChoice::Ferries);
        assert_eq!(
            settings.options.avoid.into_iter().collect::<Vec<_>>(),
            vec![Avoid::Tolls, Avoid::Ferries]
        );

        let mut settings = RouteSettings::default();
        settings.apply_preferences(RoutePreset::Fastest, AvoidChoice::None);
        assert!(settings.options.avoid.is_empty());
    }

    #[test]
    fn switching_preset_drops_the_previous_one() {
        let mut settings = RouteSettings::default();
        settings.apply_preset(RoutePreset::Economic, [Avoid::Highways]);
        settings.apply_preset(RoutePreset::Fastest, []);
        assert!(settings.options.avoid.is_empty());

        settings.apply_preset(RoutePreset::Shortest, [Avoid::Ferries]);
        assert_eq!(
            settings.options.avoid.into_iter().collect::<Vec<_>>(),
            vec![Avoid::Ferries]
        );
    }

    #[test]
    fn presets_parse_from_lowercase() {
        assert_eq!("economic".parse::<RoutePreset>(), Ok(RoutePreset::Economic));
        assert_eq!("Highways".parse::<AvoidChoice>(), Ok(AvoidChoice::Highways));
    }

    #[test]
    fn professional_optimizes_by_default() {
        assert!(ProfessionalPlanner::new().settings.options.optimize);
        assert!(!TravelerPlanner::new().settings.options.optimize);
    }

    #[test]
    fn traveler_requires_both_endpoints() {
        let mut planner = TravelerPlanner::new();
        planner.set_origin(Some(RouteEntry::text("Madrid")));
        planner.set_destination(Some(RouteEntry::text("   ")));
        assert_eq!(planner.entries(), Err(PlannerError::MissingEndpoints));

        planner.set_destination(Some(RouteEntry::text("Barcelona")));
        assert_eq!(labels(&planner.entries().unwrap()), vec!["Madrid", "Barcelona"]);
    }

    #[test]
    fn traveler_stop_sits_between_endpoints() {
        let mut planner = TravelerPlanner::new();
        planner.set_origin(Some(RouteEntry::text("Madrid")));
        planner.set_destination(Some(RouteEntry::text("Barcelona")));
        planner.set_stop(Some(RouteEntry::selected(&Suggestion {
            description: "Zaragoza, Spain".to_string(),
            place_id: "pid-zgz".to_string(),
        })));

        let entries = planner.entries().unwrap();
        assert_eq!(labels(&entries), vec!["Madrid", "Zaragoza, Spain", "Barcelona"]);
        assert_eq!(entries[1].place_id.as_deref(), Some("pid-zgz"));
    }

    #[test]
    fn tourist_stops_come_from_non_blank_lines() {
        let mut planner = TouristPlanner::new();
        planner.set_stops_text(
            "Sagrada Familia, Barcelona\n\n   \n  Parc Güell, Barcelona  \r\nCasa Batlló",
        );
        assert_eq!(
            planner.stops_text(),
            "Sagrada Familia, Barcelona\nParc Güell, Barcelona\nCasa Batlló"
        );
        assert_eq!(planner.entries(), Err(PlannerError::MissingEndpoints));
    }

    #[test]
    fn slot_operations_reject_other_modes() {
        let mut session = PlannerSession::new(PlannerMode::Professional);
        assert_eq!(
            session.set_origin(Some(RouteEntry::text("Madrid"))),
            Err(PlannerError::WrongMode {
                mode: PlannerMode::Professional
            })
        );

        let mut session = PlannerSession::new(PlannerMode::Traveler);
        assert_eq!(
            session.set_stops_text("Zaragoza"),
            Err(PlannerError::WrongMode {
                mode: PlannerMode::Traveler
            })
        );
        assert!(session.points_mut().is_err());

        let mut session = PlannerSession::new(PlannerMode::Tourist);
        assert!(session.set_stop(Some(RouteEntry::text("Zaragoza"))).is_err());
    }

    #[test]
    fn wrong_mode_error_names_the_mode() {
        let err = PlannerError::WrongMode {
            mode: PlannerMode::Tourist,
        };
        assert_eq!(err.to_string(), "Not available in tourist mode");
    }

    #[test]
    fn session_serializes_with_mode_tag() {
        let session = PlannerSession::new(PlannerMode::Tourist);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["mode"], "tourist");
        assert_eq!(json["stops"], serde_json::json!([]));
        assert_eq!(json["options"]["mode"], "driving");
    }

    #[tokio::test]
    async fn professional_session_generates_and_remembers() {
        let resolver = AddressResolver::unavailable();
        let mut session = PlannerSession::new(PlannerMode::Professional);

        {
            let points = session.points_mut().unwrap();
            points.add("Madrid").unwrap();
            assert!(session.settings().last_route.is_none());
        }
        assert!(!session.can_route());
        assert!(matches!(
            session.generate(&resolver).await,
            Err(PlannerError::Route(RouteError::InsufficientPoints { count: 1 }))
        ));

        let points = session.points_mut().unwrap();
        points.add("Barcelona").unwrap();
        points.add("Zaragoza").unwrap();
        assert!(points.move_active(Direction::Up));
        assert!(session.can_route());

        let links = session.generate(&resolver).await.unwrap();
        let google = links.google.url.as_deref().unwrap();
        assert!(
            google.contains("waypoints=optimize%3Atrue%7CZaragoza"),
            "{google}"
        );
        assert_eq!(session.settings().last_route.as_ref(), Some(&links));
    }

    #[tokio::test]
    async fn tourist_session_generates_with_stops() {
        let resolver = AddressResolver::unavailable();
        let mut session = PlannerSession::new(PlannerMode::Tourist);
        session
            .set_origin(Some(RouteEntry::text("Plaça de Catalunya")))
            .unwrap();
        session
            .set_destination(Some(RouteEntry::text("Park Güell")))
            .unwrap();
        session
            .set_stops_text("Sagrada Familia\nCasa Batlló")
            .unwrap();

        assert!(session.can_route());
        let links = session.generate(&resolver).await.unwrap();
        assert_eq!(links.waypoints.len(), 2);
        assert_eq!(
            links.waze.url.as_deref(),
            Some("https://waze.com/ul?q=Park+G%C3%BCell&navigate=yes")
        );
    }

    #[tokio::test]
    async fn traveler_session_without_destination_cannot_generate() {
        let resolver = AddressResolver::unavailable();
        let mut session = PlannerSession::new(PlannerMode::Traveler);
        session.set_origin(Some(RouteEntry::text("Madrid"))).unwrap();

        assert!(!session.can_route());
        assert_eq!(
            session.generate(&resolver).await,
            Err(PlannerError::MissingEndpoints)
        );
        assert!(session.settings().last_route.is_none());
    }
}
