//! Datenbankmodelle fuer Warenhaus
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Die `Serialize`-Implementierungen bestimmen, was nach aussen sichtbar ist:
//! Passwort-Hash und Loesch-Markierungen werden nie serialisiert.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use warenhaus_core::Rolle;

// ---------------------------------------------------------------------------
// Konten
// ---------------------------------------------------------------------------

/// Konto-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KontoRecord {
    pub id: Uuid,
    pub name: String,
    /// Immer kleingeschrieben gespeichert
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Rolle,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KontoRecord {
    /// Gibt `true` zurueck wenn das Konto weich geloescht wurde
    pub fn ist_geloescht(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Daten zum Erstellen eines neuen Kontos
#[derive(Debug, Clone)]
pub struct NeuesKonto<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Rolle,
}

/// Daten zum Aktualisieren eines Kontos
///
/// `None` bedeutet "unveraendert".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KontoUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Rolle>,
    pub is_active: Option<bool>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
    /// `Some(None)` hebt die weiche Loeschung auf
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl KontoUpdate {
    pub fn ist_leer(&self) -> bool {
        *self == Self::default()
    }
}

/// Filter fuer Konto-Listen
#[derive(Debug, Clone, Default)]
pub struct KontoFilter {
    /// Weich geloeschte Konten mit ausgeben
    pub mit_geloeschten: bool,
}

// ---------------------------------------------------------------------------
// Produkte
// ---------------------------------------------------------------------------

/// Produkt-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduktRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    /// ID des anlegenden Kontos (Eigentuemer)
    pub created_by: Uuid,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Produkts
#[derive(Debug, Clone)]
pub struct NeuesProdukt<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub price: f64,
    pub stock: i64,
    pub created_by: Uuid,
}

/// Daten zum Aktualisieren eines Produkts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProduktUpdate {
    pub title: Option<String>,
    /// `Some(None)` entfernt die Beschreibung
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl ProduktUpdate {
    pub fn ist_leer(&self) -> bool {
        *self == Self::default()
    }
}

/// Sortierung fuer Produkt-Listen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProduktSortierung {
    /// Neueste zuerst
    #[default]
    Neueste,
    PreisAufsteigend,
    PreisAbsteigend,
}

impl ProduktSortierung {
    /// Liest den `sort`-Query-Parameter; Unbekanntes faellt auf `Neueste` zurueck
    pub fn aus_query(wert: Option<&str>) -> Self {
        match wert {
            Some("price_asc") => Self::PreisAufsteigend,
            Some("price_desc") => Self::PreisAbsteigend,
            _ => Self::Neueste,
        }
    }

    pub(crate) fn als_sql(&self) -> &'static str {
        match self {
            Self::Neueste => "created_at DESC, rowid DESC",
            Self::PreisAufsteigend => "price ASC, rowid ASC",
            Self::PreisAbsteigend => "price DESC, rowid DESC",
        }
    }
}

/// Filter fuer Produkt-Listen und -Zaehlungen
#[derive(Debug, Clone, Default)]
pub struct ProduktFilter {
    /// Teilstring-Suche im Titel (Gross-/Kleinschreibung egal)
    pub suche: Option<String>,
    /// Weich geloeschte Produkte mit ausgeben
    pub mit_geloeschten: bool,
}
