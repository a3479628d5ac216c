//! REST-Handler Module

pub mod admin;
pub mod auth;
pub mod benutzer;
pub mod produkte;

use serde::Deserialize;

/// `?includeDeleted=true` fuer Admin-Abfragen
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeloeschteAbfrage {
    #[serde(default)]
    pub include_deleted: Option<String>,
}

impl GeloeschteAbfrage {
    pub fn mit_geloeschten(&self) -> bool {
        matches!(self.include_deleted.as_deref(), Some("true") | Some("1"))
    }
}
