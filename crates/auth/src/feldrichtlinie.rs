//! Feldrichtlinien fuer schreibende Zugriffe
//!
//! Eine Richtlinie ist entweder eine Positivliste (nur diese Felder) oder
//! eine Sperrliste (alle ausser diesen). Nicht zulaessige oder unbekannte
//! Felder werden stillschweigend verworfen, nie mit einem Fehler beantwortet.

use serde_json::{Map, Value};
use warenhaus_db::models::{KontoUpdate, ProduktUpdate};

/// Welche Felder ein Aufrufer aendern darf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feldrichtlinie {
    /// Nur die genannten Felder
    Erlaubt(&'static [&'static str]),
    /// Alle Felder ausser den genannten
    Gesperrt(&'static [&'static str]),
}

impl Feldrichtlinie {
    /// Eigenes Profil
    pub const KONTO_SELBST: Self = Self::Gesperrt(&[
        "password",
        "role",
        "isActive",
        "emailVerified",
        "createdAt",
        "updatedAt",
        "lastLoginAt",
        "passwordChangedAt",
        "deletedAt",
    ]);

    /// Konto-Bearbeitung ueber /admin; Zeitstempel bleiben gesperrt
    pub const KONTO_ADMIN: Self = Self::Gesperrt(&[
        "password",
        "role",
        "createdAt",
        "updatedAt",
        "lastLoginAt",
        "passwordChangedAt",
        "deletedAt",
    ]);

    /// Produkt-Bearbeitung (Eigentuemer oder Admin)
    pub const PRODUKT: Self = Self::Erlaubt(&["title", "description", "price", "stock"]);

    /// Ob das Feld unter dieser Richtlinie geschrieben werden darf
    pub fn zulaessig(&self, feld: &str) -> bool {
        match self {
            Self::Erlaubt(liste) => liste.contains(&feld),
            Self::Gesperrt(liste) => !liste.contains(&feld),
        }
    }

    /// Schnittmenge bzw. Differenz zwischen angefragten Feldern und Richtlinie
    pub fn filtern<'a>(&self, angefragt: &'a Map<String, Value>) -> Vec<(&'a str, &'a Value)> {
        angefragt
            .iter()
            .filter(|(feld, _)| self.zulaessig(feld))
            .map(|(feld, wert)| (feld.as_str(), wert))
            .collect()
    }

    /// Uebernimmt die zulaessigen Felder ins Ziel
    ///
    /// Gibt die tatsaechlich gesetzten Feldnamen zurueck. Felder, die das
    /// Ziel nicht kennt, zaehlen nicht.
    pub fn anwenden<T: Aenderbar>(&self, ziel: &mut T, angefragt: &Map<String, Value>) -> Vec<String> {
        self.filtern(angefragt)
            .into_iter()
            .filter(|(feld, wert)| ziel.feld_uebernehmen(feld, wert))
            .map(|(feld, _)| feld.to_string())
            .collect()
    }
}

/// Ziel einer Feldzuweisung ueber JSON-Feldnamen
pub trait Aenderbar {
    /// Setzt ein Feld; `false` wenn Feld unbekannt oder Wert unpassend
    fn feld_uebernehmen(&mut self, feld: &str, wert: &Value) -> bool;
}

impl Aenderbar for KontoUpdate {
    fn feld_uebernehmen(&mut self, feld: &str, wert: &Value) -> bool {
        match (feld, wert) {
            ("name", Value::String(s)) => self.name = Some(s.clone()),
            ("email", Value::String(s)) => self.email = Some(s.clone()),
            ("isActive", Value::Bool(b)) => {
                self.is_active = Some(*b);
                // Reaktivierung hebt die weiche Loeschung auf
                if *b {
                    self.deleted_at = Some(None);
                }
            }
            _ => return false,
        }
        true
    }
}

impl Aenderbar for ProduktUpdate {
    fn feld_uebernehmen(&mut self, feld: &str, wert: &Value) -> bool {
        match (feld, wert) {
            ("title", Value::String(s)) => self.title = Some(s.clone()),
            ("description", Value::Null) => self.description = Some(None),
            ("description", Value::String(s)) if s.is_empty() => self.description = Some(None),
            ("description", Value::String(s)) => self.description = Some(Some(s.clone())),
            ("price", Value::Number(n)) => match n.as_f64() {
                Some(p) => self.price = Some(p),
                None => return false,
            },
            ("stock", Value::Number(n)) => match n.as_i64() {
                Some(s) => self.stock = Some(s),
                None => return false,
            },
            _ => return false,
        }
        true
    }
}
