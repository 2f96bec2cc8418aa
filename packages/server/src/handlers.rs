//! HTTP handler functions for the route planner API.

use actix_web::{HttpResponse, web};
use route_planner_geocoder::address;
use route_planner_route::planner::RoutePreset;
use route_planner_route::{Direction, PlannerError, PlannerSession, build_route};
use route_planner_route_models::{AddressInput, RouteEntry, RouteOptions};
use route_planner_server_models::{
    ApiHealth, AvoidList, CreateSession, MoveBody, MoveResult, PointBody, ResolveRequest,
    RouteBody, SelectBody, SessionCreated, SessionOptionsBody, SlotsBody, SuggestParams,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::sessions::SessionHandle;
use crate::{AppState, ServerError};

/// A session as returned by the session endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    id: Uuid,
    can_route: bool,
    #[serde(flatten)]
    session: &'a PlannerSession,
}

fn view(id: Uuid, session: &PlannerSession) -> HttpResponse {
    HttpResponse::Ok().json(SessionView {
        id,
        can_route: session.can_route(),
        session,
    })
}

async fn session(state: &AppState, id: Uuid) -> Result<SessionHandle, ServerError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or(ServerError::SessionNotFound(id))
}

/// Converts a loose JSON address into a route entry. A place id may come
/// from the body or from the address object itself.
fn entry_from_json(value: &Value, place_id: Option<String>) -> RouteEntry {
    let input = match value {
        Value::String(text) => AddressInput::text(text.trim()),
        other => address::input_from_json(other),
    };

    let place_id = place_id
        .or_else(|| {
            value
                .get("placeId")
                .or_else(|| value.get("place_id"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|id| !id.trim().is_empty());

    RouteEntry { input, place_id }
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        geocoder: state.resolver.is_available(),
    })
}

/// `GET /api/suggest`
///
/// Autocomplete suggestions for a partial address. Always answers with a
/// list, empty when the term is too short or the geocoder fails.
pub async fn suggest(
    state: web::Data<AppState>,
    params: web::Query<SuggestParams>,
) -> HttpResponse {
    let bias = params.bias();
    let suggestions = state.resolver.suggest(&params.term, bias.as_ref()).await;
    HttpResponse::Ok().json(suggestions)
}

/// `GET /api/sessions/{id}/suggest`
///
/// Same as `/api/suggest`, but biased around the session's stored circle
/// when the query carries no `lat`/`lng` of its own.
pub async fn session_suggest(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    params: web::Query<SuggestParams>,
) -> Result<HttpResponse, ServerError> {
    let handle = session(&state, id.into_inner()).await?;
    let bias = match params.bias() {
        Some(bias) => Some(bias),
        None => handle.lock().await.settings().bias,
    };
    let suggestions = state.resolver.suggest(&params.term, bias.as_ref()).await;
    Ok(HttpResponse::Ok().json(suggestions))
}

/// `POST /api/resolve`
///
/// Resolves a picked suggestion. Falls back to echoing the label.
pub async fn resolve(
    state: web::Data<AppState>,
    body: web::Json<ResolveRequest>,
) -> HttpResponse {
    let point = state
        .resolver
        .resolve(&body.label, body.place_id.as_deref())
        .await;
    HttpResponse::Ok().json(point)
}

/// `POST /api/route`
///
/// Builds provider links for an ordered list of points without a session.
pub async fn route(
    state: web::Data<AppState>,
    body: web::Json<RouteBody>,
) -> Result<HttpResponse, ServerError> {
    let entries: Vec<RouteEntry> = body
        .points
        .iter()
        .map(|point| entry_from_json(point, None))
        .collect();

    let mut options = RouteOptions::default();
    body.options.apply(&mut options);

    let links = build_route(&state.resolver, &entries, &options).await?;
    Ok(HttpResponse::Ok().json(links))
}

/// `POST /api/sessions`
///
/// Answers 503 once [`crate::sessions::SessionStore::limit`] sessions are
/// open. Clients free slots with `DELETE /api/sessions/{id}`.
pub async fn create_session(
    state: web::Data<AppState>,
    body: web::Json<CreateSession>,
) -> Result<HttpResponse, ServerError> {
    let id = state
        .sessions
        .create(body.mode)
        .await
        .ok_or_else(|| ServerError::SessionLimit(state.sessions.limit()))?;
    Ok(HttpResponse::Created().json(SessionCreated {
        id: id.to_string(),
        mode: body.mode,
    }))
}

/// `GET /api/sessions/{id}`
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let session = handle.lock().await;
    Ok(view(id, &session))
}

/// `DELETE /api/sessions/{id}`
pub async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    if state.sessions.remove(id).await {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ServerError::SessionNotFound(id))
    }
}

/// `POST /api/sessions/{id}/points`
pub async fn add_point(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<PointBody>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let body = body.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    session
        .points_mut()?
        .add_entry(entry_from_json(&body.value, body.place_id))
        .map_err(PlannerError::from)?;

    Ok(view(id, &session))
}

/// `PUT /api/sessions/{id}/points/active`
pub async fn edit_active(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<PointBody>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let body = body.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    session
        .points_mut()?
        .edit_active_entry(entry_from_json(&body.value, body.place_id))
        .map_err(PlannerError::from)?;

    Ok(view(id, &session))
}

/// `DELETE /api/sessions/{id}/points/active`
///
/// Answers with the removed entry (`null` when the list was empty) and
/// the updated session.
pub async fn delete_active(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    let removed = session.points_mut()?.delete_active();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "removed": removed,
        "session": SessionView {
            id,
            can_route: session.can_route(),
            session: &session,
        },
    })))
}

/// `POST /api/sessions/{id}/points/select`
pub async fn select_point(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<SelectBody>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    session.points_mut()?.select(body.index);

    Ok(view(id, &session))
}

/// `POST /api/sessions/{id}/points/move`
pub async fn move_point(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<MoveBody>,
) -> Result<HttpResponse, ServerError> {
    let direction: Direction = body
        .direction
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("Unknown direction '{}'", body.direction)))?;

    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    let moved = session.points_mut()?.move_active(direction);

    Ok(HttpResponse::Ok().json(MoveResult { moved }))
}

/// `DELETE /api/sessions/{id}/points`
pub async fn clear_points(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    session.points_mut()?.clear();

    Ok(view(id, &session))
}

/// `PUT /api/sessions/{id}/slots`
///
/// Fills the origin, destination and stop slots of traveler and tourist
/// sessions.
pub async fn put_slots(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<SlotsBody>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    if let Some(origin) = &body.origin {
        session.set_origin(Some(entry_from_json(origin, None)))?;
    }
    if let Some(destination) = &body.destination {
        session.set_destination(Some(entry_from_json(destination, None)))?;
    }
    if let Some(stop) = &body.stop {
        session.set_stop(Some(entry_from_json(stop, None)))?;
    }
    if let Some(text) = &body.stops_text {
        session.set_stops_text(text)?;
    }

    Ok(view(id, &session))
}

/// `PUT /api/sessions/{id}/options`
pub async fn put_options(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<SessionOptionsBody>,
) -> Result<HttpResponse, ServerError> {
    let preset = body
        .preset
        .as_deref()
        .map(str::parse::<RoutePreset>)
        .transpose()
        .map_err(|_| ServerError::BadRequest("Unknown route preset".to_string()))?;

    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;
    let settings = session.settings_mut();

    body.options.apply(&mut settings.options);
    if let Some(preset) = preset {
        let explicit = body
            .options
            .avoid
            .as_ref()
            .map(AvoidList::to_set)
            .unwrap_or_default();
        settings.apply_preset(preset, explicit);
    }

    if body.clear_bias {
        settings.bias = None;
    }
    if let Some(bias) = body.bias.filter(|b| b.center.is_finite()) {
        settings.bias = Some(bias);
    }

    Ok(view(id, &session))
}

/// `POST /api/sessions/{id}/route`
///
/// Generates links for the session and stores them as its last route.
pub async fn generate_route(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let id = id.into_inner();
    let handle = session(&state, id).await?;
    let mut session = handle.lock().await;

    let links = session.generate(&state.resolver).await?;
    Ok(HttpResponse::Ok().json(links))
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_planner_route_models::Coordinates;
    use serde_json::json;

    #[test]
    fn plain_strings_are_trimmed_text() {
        let entry = entry_from_json(&json!("  Plaza Mayor  "), None);
        assert_eq!(entry.input, AddressInput::text("Plaza Mayor"));
        assert_eq!(entry.place_id, None);
    }

    #[test]
    fn place_id_comes_from_body_or_object() {
        let entry = entry_from_json(&json!("Plaza Mayor"), Some("pid".to_string()));
        assert_eq!(entry.place_id.as_deref(), Some("pid"));

        let entry = entry_from_json(
            &json!({"formatted_address": "Plaza Mayor, Madrid", "place_id": "abc"}),
            None,
        );
        assert_eq!(entry.place_id.as_deref(), Some("abc"));

        let entry = entry_from_json(&json!({"address": "Sol", "placeId": "  "}), None);
        assert_eq!(entry.place_id, None);
    }

    #[test]
    fn geometry_objects_keep_coordinates() {
        let entry = entry_from_json(
            &json!({"geometry": {"location": {"lat": 40.4, "lng": -3.7}}}),
            None,
        );
        assert_eq!(entry.input.location(), Some(Coordinates::new(40.4, -3.7)));
    }
}
