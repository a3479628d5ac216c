//! REST-Handler fuer /api/products und die Produkt-Routen unter /api/admin

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde_json::{json, Value};

use warenhaus_auth::AuthKontext;

use crate::antwort::Antwort;
use crate::error::{ApiError, ApiResult};
use crate::rest::{id_parsen, ApiJson, AppState};
use crate::services::ProduktAbfrage;
use crate::validierung;

fn daten<T: serde::Serialize>(wert: T) -> ApiResult<Value> {
    serde_json::to_value(wert).map_err(|e| ApiError::intern(e.to_string()))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(abfrage): Query<ProduktAbfrage>,
) -> ApiResult<Antwort> {
    let seite = state.produkte.liste(&abfrage).await?;
    Ok(Antwort::ok("").mit_daten(daten(seite)?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Antwort> {
    let produkt = state.produkte.laden(id_parsen(&id)?).await?;
    Ok(Antwort::ok("").mit_daten(json!({ "product": produkt })))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Antwort> {
    let eingabe = validierung::produkt_anlegen(&body)?;
    let produkt = state.produkte.anlegen(&kontext.konto, eingabe).await?;
    Ok(Antwort::erstellt("Product created").mit_daten(json!({ "product": produkt })))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Antwort> {
    let id = id_parsen(&id)?;
    let felder = validierung::produkt_aendern(&body)?;
    let produkt = state.produkte.aendern(&kontext.konto, id, &felder).await?;
    Ok(Antwort::ok("Product updated").mit_daten(json!({ "product": produkt })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(kontext): Extension<AuthKontext>,
    Path(id): Path<String>,
) -> ApiResult<Antwort> {
    state.produkte.loeschen(&kontext.konto, id_parsen(&id)?).await?;
    Ok(Antwort::ok("Product deleted"))
}
