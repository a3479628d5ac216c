//! Erfolgs-Umschlag `{status: "success", message, data?}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Erfolgreiche API-Antwort
#[derive(Debug, Clone)]
pub struct Antwort {
    status: StatusCode,
    nachricht: String,
    daten: Option<Value>,
}

impl Antwort {
    /// 200 OK
    pub fn ok(nachricht: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            nachricht: nachricht.into(),
            daten: None,
        }
    }

    /// 201 Created
    pub fn erstellt(nachricht: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(nachricht)
        }
    }

    pub fn mit_daten(mut self, daten: Value) -> Self {
        self.daten = Some(daten);
        self
    }
}

impl IntoResponse for Antwort {
    fn into_response(self) -> Response {
        let mut koerper = json!({
            "status": "success",
            "message": self.nachricht,
        });
        if let Some(daten) = self.daten {
            koerper["data"] = daten;
        }
        (self.status, Json(koerper)).into_response()
    }
}
