//! Ressourcen-Services fuer Konten und Produkte
//!
//! Die Services wenden Feldrichtlinien sowie Eigentuemer- und Rollenpruefungen
//! an, bevor sie in die Repositories schreiben. Geloescht wird nur weich.

pub mod konten;
pub mod produkte;

pub use konten::KontoService;
pub use produkte::{ProduktAbfrage, ProduktAnsicht, ProduktSeite, ProduktService};

/// Meldung fuer Updates, von denen nach der Feldrichtlinie nichts uebrig bleibt
pub const KEINE_GUELTIGEN_FELDER: &str = "No valid fields to update.";
