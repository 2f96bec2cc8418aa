//! Autocomplete and place resolution with guaranteed fallbacks.
//!
//! Nothing here returns an error. A missing client, a failed request, a
//! malformed response and a timeout all look the same to the caller:
//! [`AddressResolver::suggest`] returns an empty list and the `resolve*`
//! functions echo the label back as the address.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use route_planner_route_models::{
    LocationBias, MIN_ADDRESS_LEN, ResolvedPoint, RouteEntry, Suggestion,
};

use crate::{GeocodeError, GeocodedPlace, GeocodingClient, address, service_registry};

/// Resolver tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Terms shorter than this (after trimming) are not searched.
    pub min_term_len: usize,
    /// Maximum number of suggestions returned.
    pub max_results: usize,
    /// Upper bound on every geocoder call.
    pub timeout: Duration,
    /// Forward-geocode entries that carry no place id. Off by default:
    /// such entries are echoed exactly as typed.
    pub geocode_free_text: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_term_len: MIN_ADDRESS_LEN,
            max_results: 8,
            timeout: Duration::from_secs(6),
            geocode_free_text: false,
        }
    }
}

impl ResolverConfig {
    /// Reads overrides from `GEOCODER_TIMEOUT_MS`, `GEOCODER_MAX_RESULTS`
    /// and `GEOCODER_FREE_TEXT`. Unparseable values keep the default.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str| std::env::var(key).ok();

        Self {
            timeout: var("GEOCODER_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .map_or(defaults.timeout, Duration::from_millis),
            max_results: var("GEOCODER_MAX_RESULTS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_results),
            geocode_free_text: var("GEOCODER_FREE_TEXT").map_or(defaults.geocode_free_text, |v| {
                matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes")
            }),
            ..defaults
        }
    }
}

/// Wraps an optional [`GeocodingClient`] behind the never-failing
/// suggest/resolve contract.
#[derive(Clone)]
pub struct AddressResolver {
    client: Option<Arc<dyn GeocodingClient>>,
    config: ResolverConfig,
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("provider", &self.client.as_ref().map(|c| c.provider()))
            .field("config", &self.config)
            .finish()
    }
}

impl AddressResolver {
    /// Creates a resolver around `client`; `None` means no geocoder is
    /// available.
    #[must_use]
    pub fn new(client: Option<Arc<dyn GeocodingClient>>, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    /// A resolver with no geocoder: no suggestions, every point echoes.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(None, ResolverConfig::default())
    }

    /// Builds a resolver from the service registry and environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(service_registry::client_from_env(), ResolverConfig::from_env())
    }

    /// Returns `true` when a geocoder is configured.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Autocomplete suggestions for `term`, in provider order, capped at
    /// `max_results`.
    ///
    /// Empty when the term is too short, no geocoder is configured, or the
    /// geocoder fails or times out.
    pub async fn suggest(&self, term: &str, bias: Option<&LocationBias>) -> Vec<Suggestion> {
        let term = term.trim();
        if term.chars().count() < self.config.min_term_len {
            return Vec::new();
        }

        let Some(client) = &self.client else {
            return Vec::new();
        };

        let mut suggestions = self
            .call("autocomplete", term, client.autocomplete(term, bias))
            .await
            .unwrap_or_default();
        suggestions.truncate(self.config.max_results);
        suggestions
    }

    /// Resolves a selected suggestion.
    ///
    /// Without a place id or a geocoder this is the echo fallback
    /// `{query: label, address: label}`. Otherwise the place details
    /// populate the address and coordinates; any failure echoes.
    pub async fn resolve(&self, label: &str, place_id: Option<&str>) -> ResolvedPoint {
        let (Some(client), Some(place_id)) = (&self.client, place_id.filter(|p| !p.is_empty()))
        else {
            return ResolvedPoint::echo(label);
        };

        let place = self
            .call("place details", place_id, client.place_details(place_id))
            .await
            .flatten();

        place.map_or_else(
            || ResolvedPoint::echo(label),
            |place| resolved_from(label, Some(place_id.to_string()), place),
        )
    }

    /// Forward-geocodes free text; echoes on any failure or no match.
    pub async fn resolve_text(&self, label: &str) -> ResolvedPoint {
        let Some(client) = &self.client else {
            return ResolvedPoint::echo(label);
        };

        let place = self
            .call("geocode", label, client.geocode(label))
            .await
            .flatten();

        place.map_or_else(
            || ResolvedPoint::echo(label),
            |place| {
                let place_id = place.place_id.clone();
                resolved_from(label, place_id, place)
            },
        )
    }

    /// Resolves one itinerary entry.
    ///
    /// The entry is normalized first; an unresolvable entry yields an
    /// empty point. Entries picked from suggestions go through
    /// [`Self::resolve`]; entries that already carry coordinates keep
    /// them; plain text is echoed unless `geocode_free_text` is set.
    pub async fn resolve_entry(&self, entry: &RouteEntry) -> ResolvedPoint {
        let Some(label) = address::normalize(&entry.input) else {
            log::debug!("Unresolvable route entry: {:?}", entry.input);
            return ResolvedPoint::echo(String::new());
        };

        let known_location = entry.input.location();

        let mut point = if entry.place_id.is_some() {
            self.resolve(&label, entry.place_id.as_deref()).await
        } else if known_location.is_none() && self.config.geocode_free_text {
            self.resolve_text(&label).await
        } else {
            ResolvedPoint::echo(label)
        };

        if point.location.is_none() {
            point.location = known_location;
        }
        point
    }

    /// Runs a geocoder call under the configured timeout, logging and
    /// swallowing every failure.
    async fn call<T>(
        &self,
        what: &str,
        subject: &str,
        fut: impl Future<Output = Result<T, GeocodeError>> + Send,
    ) -> Option<T> {
        let result = match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(GeocodeError::Timeout {
                millis: self.config.timeout.as_millis(),
            }),
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Geocoder {what} failed for '{subject}': {e}");
                None
            }
        }
    }
}

fn resolved_from(label: &str, place_id: Option<String>, place: GeocodedPlace) -> ResolvedPoint {
    let address = place
        .formatted_address
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| label.to_string());

    ResolvedPoint {
        query: label.to_string(),
        place_id,
        address,
        location: Some(place.location).filter(|c| c.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeocodingProvider;
    use route_planner_route_models::{AddressInput, Coordinates};
    use std::sync::Mutex;

    /// How the fake geocoder answers.
    #[derive(Clone, Copy)]
    pub enum Behaviour {
        Answer,
        Fail,
        Hang,
    }

    /// In-memory geocoder: every label resolves to `"{label}, Spain"` at a
    /// position derived from its length.
    pub struct FakeGeocoder {
        pub behaviour: Behaviour,
        pub seen_bias: Mutex<Option<LocationBias>>,
    }

    impl FakeGeocoder {
        pub fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                seen_bias: Mutex::new(None),
            })
        }

        async fn answer<T>(&self, value: T) -> Result<T, GeocodeError> {
            match self.behaviour {
                Behaviour::Answer => Ok(value),
                Behaviour::Fail => Err(GeocodeError::Parse {
                    message: "boom".to_string(),
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(value)
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        fn place(label: &str, place_id: &str) -> GeocodedPlace {
            GeocodedPlace {
                formatted_address: Some(format!("{label}, Spain")),
                location: Coordinates::new(40.0 + label.len() as f64 / 100.0, -3.0),
                place_id: Some(place_id.to_string()),
            }
        }
    }

    #[async_trait::async_trait]
    impl GeocodingClient for FakeGeocoder {
        fn provider(&self) -> GeocodingProvider {
            GeocodingProvider::GooglePlaces
        }

        async fn autocomplete(
            &self,
            text: &str,
            bias: Option<&LocationBias>,
        ) -> Result<Vec<Suggestion>, GeocodeError> {
            *self.seen_bias.lock().unwrap() = bias.copied();
            let suggestions = (1..=10)
                .map(|i| Suggestion {
                    description: format!("{text} {i}"),
                    place_id: format!("pid-{i}"),
                })
                .collect();
            self.answer(suggestions).await
        }

        async fn place_details(
            &self,
            place_id: &str,
        ) -> Result<Option<GeocodedPlace>, GeocodeError> {
            let place = (place_id != "missing").then(|| Self::place(place_id, place_id));
            self.answer(place).await
        }

        async fn geocode(&self, text: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            self.answer(Some(Self::place(text, "geo"))).await
        }
    }

    pub fn resolver(behaviour: Behaviour) -> AddressResolver {
        AddressResolver::new(
            Some(FakeGeocoder::new(behaviour)),
            ResolverConfig {
                timeout: Duration::from_millis(50),
                ..ResolverConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn short_terms_get_no_suggestions() {
        let resolver = resolver(Behaviour::Answer);
        for term in ["", "a", "ab", "  ab  "] {
            assert!(resolver.suggest(term, None).await.is_empty(), "{term:?}");
        }
    }

    #[tokio::test]
    async fn suggestions_are_capped_and_ordered() {
        let resolver = resolver(Behaviour::Answer);
        let suggestions = resolver.suggest("Madrid", None).await;
        assert_eq!(suggestions.len(), 8);
        assert_eq!(suggestions[0].description, "Madrid 1");
        assert_eq!(suggestions[7].place_id, "pid-8");
    }

    #[tokio::test]
    async fn bias_is_forwarded_as_is() {
        let fake = FakeGeocoder::new(Behaviour::Answer);
        let resolver = AddressResolver::new(Some(fake.clone()), ResolverConfig::default());
        let bias = LocationBias::circle(41.4, 2.2, 50_000);

        resolver.suggest("Sagrada", Some(&bias)).await;
        assert_eq!(*fake.seen_bias.lock().unwrap(), Some(bias));

        resolver.suggest("Sagrada", None).await;
        assert_eq!(*fake.seen_bias.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn failures_and_timeouts_give_no_suggestions() {
        assert!(resolver(Behaviour::Fail).suggest("Madrid", None).await.is_empty());
        assert!(resolver(Behaviour::Hang).suggest("Madrid", None).await.is_empty());
        assert!(
            AddressResolver::unavailable()
                .suggest("Madrid", None)
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn resolve_without_place_id_echoes() {
        let point = resolver(Behaviour::Answer).resolve("Plaza Mayor", None).await;
        assert_eq!(point, ResolvedPoint::echo("Plaza Mayor"));
        assert!(point.lat().is_none() && point.lng().is_none());
    }

    #[tokio::test]
    async fn resolve_with_place_id_populates_point() {
        let point = resolver(Behaviour::Answer)
            .resolve("Zaragoza", Some("zgz"))
            .await;
        assert_eq!(point.query, "Zaragoza");
        assert_eq!(point.address, "zgz, Spain");
        assert_eq!(point.place_id.as_deref(), Some("zgz"));
        assert!(point.lat().is_some() && point.lng().is_some());
    }

    #[tokio::test]
    async fn resolve_failures_echo() {
        for behaviour in [Behaviour::Fail, Behaviour::Hang] {
            let point = resolver(behaviour).resolve("Zaragoza", Some("zgz")).await;
            assert_eq!(point, ResolvedPoint::echo("Zaragoza"));
        }

        let point = resolver(Behaviour::Answer)
            .resolve("Zaragoza", Some("missing"))
            .await;
        assert_eq!(point, ResolvedPoint::echo("Zaragoza"));

        let point = AddressResolver::unavailable()
            .resolve("Zaragoza", Some("zgz"))
            .await;
        assert_eq!(point, ResolvedPoint::echo("Zaragoza"));
    }

    #[tokio::test]
    async fn resolve_text_geocodes_or_echoes() {
        let point = resolver(Behaviour::Answer).resolve_text("Bilbao").await;
        assert_eq!(point.address, "Bilbao, Spain");
        assert_eq!(point.place_id.as_deref(), Some("geo"));

        let point = resolver(Behaviour::Fail).resolve_text("Bilbao").await;
        assert_eq!(point, ResolvedPoint::echo("Bilbao"));
    }

    #[tokio::test]
    async fn plain_text_entries_echo_by_default() {
        let point = resolver(Behaviour::Answer)
            .resolve_entry(&RouteEntry::text(" Madrid "))
            .await;
        assert_eq!(point, ResolvedPoint::echo("Madrid"));
    }

    #[tokio::test]
    async fn plain_text_entries_geocode_when_enabled() {
        let resolver = AddressResolver::new(
            Some(FakeGeocoder::new(Behaviour::Answer)),
            ResolverConfig {
                geocode_free_text: true,
                ..ResolverConfig::default()
            },
        );
        let point = resolver.resolve_entry(&RouteEntry::text("Madrid")).await;
        assert_eq!(point.address, "Madrid, Spain");
    }

    #[tokio::test]
    async fn coordinate_entries_keep_their_location() {
        let point = resolver(Behaviour::Fail)
            .resolve_entry(&AddressInput::coordinates(41.4, 2.2).into())
            .await;
        assert_eq!(point.address, "41.4,2.2");
        assert_eq!(point.location, Some(Coordinates::new(41.4, 2.2)));
    }

    #[tokio::test]
    async fn unresolvable_entries_are_empty() {
        let point = resolver(Behaviour::Answer)
            .resolve_entry(&AddressInput::empty().into())
            .await;
        assert_eq!(point.address, "");
        assert!(point.location.is_none());
    }
}
