//! REST-Handler fuer das eigene Profil (/api/users/profile)

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use warenhaus_auth::AuthKontext;

use crate::antwort::Antwort;
use crate::error::ApiResult;
use crate::rest::{ApiJson, AppState};
use crate::validierung;

pub async fn get_profile(Extension(kontext): Extension<AuthKontext>) -> Antwort {
    Antwort::ok("").mit_daten(json!({ "user": kontext.konto }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Antwort> {
    let felder = validierung::profil_aendern(&body)?;
    let konto = state.konten.profil_aendern(kontext.konto.id, &felder).await?;
    Ok(Antwort::ok("Profile updated").mit_daten(json!({ "user": konto })))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
) -> ApiResult<Antwort> {
    state.konten.profil_loeschen(kontext.konto.id).await?;
    Ok(Antwort::ok("Account deactivated"))
}
