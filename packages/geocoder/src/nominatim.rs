//! Nominatim / OpenStreetMap geocoder client.
//!
//! Intended for self-hosted instances only: the public instance's usage
//! policy forbids autocomplete-style traffic. Place ids are OSM ids
//! prefixed with the element type initial (`N123`, `W456`, `R789`), the
//! form accepted by the `/lookup` endpoint.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use route_planner_route_models::{Coordinates, LocationBias, Suggestion};
use serde_json::Value;

use crate::{GeocodeError, GeocodedPlace, GeocodingClient, GeocodingProvider};

/// Metres per degree of latitude (mean).
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Number of search results requested for autocomplete.
const AUTOCOMPLETE_LIMIT: &str = "10";

/// Nominatim API client.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Creates a client for the given instance root (e.g.
    /// `"http://localhost:8088"`).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("route-planner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, GeocodeError> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("format", "jsonv2")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                provider: GeocodingProvider::Nominatim,
                status: resp.status().to_string(),
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait::async_trait]
impl GeocodingClient for NominatimClient {
    fn provider(&self) -> GeocodingProvider {
        GeocodingProvider::Nominatim
    }

    async fn autocomplete(
        &self,
        text: &str,
        bias: Option<&LocationBias>,
    ) -> Result<Vec<Suggestion>, GeocodeError> {
        let viewbox = bias.map(viewbox);
        let mut params = vec![("q", text), ("limit", AUTOCOMPLETE_LIMIT)];
        if let Some(viewbox) = viewbox.as_deref() {
            // Unbounded: the viewbox only boosts results inside it.
            params.push(("viewbox", viewbox));
        }

        let body = self.get("search", &params).await?;
        parse_suggestions(&body)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let body = self.get("lookup", &[("osm_ids", place_id)]).await?;
        parse_first_place(&body)
    }

    async fn geocode(&self, text: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let body = self.get("search", &[("q", text), ("limit", "1")]).await?;
        parse_first_place(&body)
    }
}

/// Formats a bias circle as a Nominatim `viewbox`
/// (`left,top,right,bottom`) enclosing the circle.
fn viewbox(bias: &LocationBias) -> String {
    let radius = f64::from(bias.radius_m);
    let lat_delta = radius / METRES_PER_DEGREE;
    let lng_delta = radius / (METRES_PER_DEGREE * bias.center.lat.to_radians().cos().max(0.01));
    format!(
        "{},{},{},{}",
        bias.center.lng - lng_delta,
        bias.center.lat + lat_delta,
        bias.center.lng + lng_delta,
        bias.center.lat - lat_delta,
    )
}

fn results(body: &Value) -> Result<&Vec<Value>, GeocodeError> {
    body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })
}

/// Builds the `/lookup` id for a search result (`W123456`).
fn osm_place_id(result: &Value) -> Option<String> {
    let initial = result["osm_type"]
        .as_str()?
        .chars()
        .next()?
        .to_ascii_uppercase();
    let id = result["osm_id"].as_u64()?;
    Some(format!("{initial}{id}"))
}

fn parse_suggestions(body: &Value) -> Result<Vec<Suggestion>, GeocodeError> {
    Ok(results(body)?
        .iter()
        .filter_map(|r| {
            Some(Suggestion {
                description: r["display_name"].as_str()?.to_string(),
                place_id: osm_place_id(r).unwrap_or_default(),
            })
        })
        .collect())
}

fn parse_first_place(body: &Value) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let Some(first) = results(body)?.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some(GeocodedPlace {
        formatted_address: first["display_name"].as_str().map(String::from),
        location: Coordinates::new(lat, lon),
        place_id: osm_place_id(first),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nominatim_place() {
        let body = json!([{
            "osm_type": "way",
            "osm_id": 4_231_772,
            "lat": "41.4036",
            "lon": "2.1744",
            "display_name": "Sagrada Família, Barcelona, Catalunya, España"
        }]);
        let place = parse_first_place(&body).unwrap().unwrap();
        assert!((place.location.lat - 41.4036).abs() < 1e-4);
        assert!((place.location.lng - 2.1744).abs() < 1e-4);
        assert_eq!(place.place_id.as_deref(), Some("W4231772"));
    }

    #[test]
    fn parses_nominatim_empty() {
        assert!(parse_first_place(&json!([])).unwrap().is_none());
        assert!(parse_suggestions(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn non_array_response_is_a_parse_error() {
        let body = json!({ "error": "Unable to geocode" });
        assert!(matches!(
            parse_first_place(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn suggestions_use_display_name_and_osm_id() {
        let body = json!([
            { "osm_type": "node", "osm_id": 1, "display_name": "Plaza Mayor, Madrid" },
            { "osm_type": "relation", "osm_id": 2, "display_name": "Plaza Mayor, Valladolid" },
            { "osm_type": "node", "osm_id": 3 }
        ]);
        let suggestions = parse_suggestions(&body).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].place_id, "N1");
        assert_eq!(suggestions[1].place_id, "R2");
        assert_eq!(suggestions[1].description, "Plaza Mayor, Valladolid");
    }

    #[test]
    fn viewbox_encloses_bias_circle() {
        let bias = LocationBias::circle(0.0, 0.0, 111_320);
        let parts: Vec<f64> = viewbox(&bias)
            .split(',')
            .map(|p| p.parse().unwrap())
            .collect();
        assert_eq!(parts.len(), 4);
        assert!((parts[0] + 1.0).abs() < 1e-9);
        assert!((parts[1] - 1.0).abs() < 1e-9);
        assert!((parts[2] - 1.0).abs() < 1e-9);
        assert!((parts[3] + 1.0).abs() < 1e-9);
    }
}
