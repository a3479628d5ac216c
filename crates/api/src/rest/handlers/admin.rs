//! REST-Handler fuer die Konto-Verwaltung unter /api/admin

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde_json::{json, Value};

use warenhaus_auth::AuthKontext;

use crate::antwort::Antwort;
use crate::error::ApiResult;
use crate::rest::handlers::GeloeschteAbfrage;
use crate::rest::{id_parsen, ApiJson, AppState};
use crate::validierung;

pub async fn list_users(
    State(state): State<AppState>,
    Query(abfrage): Query<GeloeschteAbfrage>,
) -> ApiResult<Antwort> {
    let konten = state.konten.liste(abfrage.mit_geloeschten()).await?;
    Ok(Antwort::ok("Users retrieved").mit_daten(json!({ "users": konten })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(abfrage): Query<GeloeschteAbfrage>,
) -> ApiResult<Antwort> {
    let konto = state
        .konten
        .laden(id_parsen(&id)?, abfrage.mit_geloeschten())
        .await?;
    Ok(Antwort::ok("User retrieved").mit_daten(json!({ "user": konto })))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Antwort> {
    let id = id_parsen(&id)?;
    let felder = validierung::admin_konto_aendern(&body)?;
    let konto = state.konten.admin_aendern(id, &felder).await?;
    Ok(Antwort::ok("User updated").mit_daten(json!({ "user": konto })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
    Path(id): Path<String>,
) -> ApiResult<Antwort> {
    state
        .konten
        .admin_loeschen(kontext.konto.id, id_parsen(&id)?)
        .await?;
    Ok(Antwort::ok("User account deactivated"))
}
