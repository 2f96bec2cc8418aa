//! Google Places / Geocoding API client.
//!
//! - Autocomplete: `GET /place/autocomplete/json`
//! - Details: `GET /place/details/json`
//! - Forward geocode: `GET /geocode/json`
//!
//! Every endpoint answers `200 OK` with a `status` field; anything other
//! than `OK` or `ZERO_RESULTS` is reported as an error.
//!
//! See <https://developers.google.com/maps/documentation/places/web-service/autocomplete>

use route_planner_route_models::{Coordinates, LocationBias, Suggestion};
use serde_json::Value;

use crate::{GeocodeError, GeocodedPlace, GeocodingClient, GeocodingProvider};

/// Google Places API client.
pub struct GooglePlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    /// Creates a client for the given API base URL (e.g.
    /// `"https://maps.googleapis.com/maps/api"`).
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, GeocodeError> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                provider: GeocodingProvider::GooglePlaces,
                status: resp.status().to_string(),
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait::async_trait]
impl GeocodingClient for GooglePlacesClient {
    fn provider(&self) -> GeocodingProvider {
        GeocodingProvider::GooglePlaces
    }

    async fn autocomplete(
        &self,
        text: &str,
        bias: Option<&LocationBias>,
    ) -> Result<Vec<Suggestion>, GeocodeError> {
        let bias_param = bias.map(LocationBias::to_places_param);
        let mut params = vec![("input", text), ("types", "geocode")];
        if let Some(bias) = bias_param.as_deref() {
            params.push(("locationbias", bias));
        }

        let body = self.get("place/autocomplete/json", &params).await?;
        parse_autocomplete(&body)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let body = self
            .get(
                "place/details/json",
                &[
                    ("place_id", place_id),
                    ("fields", "formatted_address,geometry"),
                ],
            )
            .await?;

        let Some(result) = check_status(&body)?.then(|| &body["result"]) else {
            return Ok(None);
        };

        let mut place = parse_place(result)?;
        place.place_id = Some(place_id.to_string());
        Ok(Some(place))
    }

    async fn geocode(&self, text: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let body = self.get("geocode/json", &[("address", text)]).await?;
        parse_geocode(&body)
    }
}

/// Checks the `status` field. Returns `Ok(false)` for `ZERO_RESULTS`.
fn check_status(body: &Value) -> Result<bool, GeocodeError> {
    match body["status"].as_str() {
        Some("OK") => Ok(true),
        Some("ZERO_RESULTS") => Ok(false),
        Some("OVER_QUERY_LIMIT") => Err(GeocodeError::RateLimited),
        Some(other) => Err(GeocodeError::Status {
            provider: GeocodingProvider::GooglePlaces,
            status: other.to_string(),
        }),
        None => Err(GeocodeError::Parse {
            message: "Google response missing 'status'".to_string(),
        }),
    }
}

/// Parses an autocomplete response into suggestions, keeping the
/// provider's order.
fn parse_autocomplete(body: &Value) -> Result<Vec<Suggestion>, GeocodeError> {
    if !check_status(body)? {
        return Ok(Vec::new());
    }

    let predictions = body["predictions"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Autocomplete response missing 'predictions' array".to_string(),
        })?;

    Ok(predictions
        .iter()
        .filter_map(|p| {
            let description = p["description"].as_str()?.trim();
            if description.is_empty() {
                return None;
            }
            Some(Suggestion {
                description: description.to_string(),
                place_id: p["place_id"].as_str().unwrap_or_default().to_string(),
            })
        })
        .collect())
}

/// Parses a forward geocode response, taking the first result.
fn parse_geocode(body: &Value) -> Result<Option<GeocodedPlace>, GeocodeError> {
    if !check_status(body)? {
        return Ok(None);
    }

    let Some(first) = body["results"].as_array().and_then(|r| r.first()) else {
        return Ok(None);
    };

    let mut place = parse_place(first)?;
    place.place_id = first["place_id"].as_str().map(String::from);
    Ok(Some(place))
}

/// Parses a place object carrying `formatted_address` and
/// `geometry.location`.
fn parse_place(place: &Value) -> Result<GeocodedPlace, GeocodeError> {
    let location = place
        .pointer("/geometry/location")
        .ok_or_else(|| GeocodeError::Parse {
            message: "Place missing geometry.location".to_string(),
        })?;

    let lat = location["lat"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "latitude is not a number".to_string(),
    })?;
    let lng = location["lng"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "longitude is not a number".to_string(),
    })?;

    Ok(GeocodedPlace {
        formatted_address: place["formatted_address"].as_str().map(String::from),
        location: Coordinates::new(lat, lng),
        place_id: None,
    })
}
