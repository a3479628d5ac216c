//! REST-Handler fuer /api/auth

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use warenhaus_auth::{Anmeldung, AuthKontext};

use crate::antwort::Antwort;
use crate::error::ApiResult;
use crate::rest::{ApiJson, AppState};
use crate::validierung;

fn anmeldedaten(state: &AppState, anmeldung: Anmeldung) -> Value {
    json!({
        "user": anmeldung.konto,
        "accessToken": anmeldung.token.token,
        "expiresIn": state.auth.tokens().gueltigkeit_text(),
    })
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Antwort> {
    let eingabe = validierung::registrierung(&body)?;
    let anmeldung = state
        .auth
        .registrieren(&eingabe.name, &eingabe.email, &eingabe.password)
        .await?;

    Ok(Antwort::erstellt("Registration successful.").mit_daten(anmeldedaten(&state, anmeldung)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Antwort> {
    let eingabe = validierung::login(&body)?;
    let anmeldung = state.auth.anmelden(&eingabe.email, &eingabe.password).await?;

    Ok(Antwort::ok("Login successful.").mit_daten(anmeldedaten(&state, anmeldung)))
}

pub async fn me(Extension(kontext): Extension<AuthKontext>) -> Antwort {
    Antwort::ok("").mit_daten(json!({ "user": kontext.konto }))
}

/// Serverseitig zustandslos; der Client verwirft seinen Token
pub async fn logout(Extension(kontext): Extension<AuthKontext>) -> Antwort {
    tracing::debug!(user_id = %kontext.konto.id, "Abmeldung");
    Antwort::ok("Logout successful.")
}

pub async fn logout_all(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
) -> ApiResult<Antwort> {
    state.auth.abmelden_ueberall(kontext.konto.id).await?;
    Ok(Antwort::ok("Logged out from all devices."))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Antwort> {
    let eingabe = validierung::passwortwechsel(&body)?;
    state
        .auth
        .passwort_aendern(kontext.konto.id, &eingabe.current_password, &eingabe.new_password)
        .await?;

    Ok(Antwort::ok("Password changed successfully. Please log in again."))
}
