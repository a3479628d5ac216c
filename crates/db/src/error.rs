//! Fehlertypen fuer das Datenbank-Crate

use thiserror::Error;

/// Datenbank-Fehlertypen
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Datensatz nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Eindeutigkeitsverletzung: {0}")]
    Eindeutigkeit(String),

    #[error("Ungueltige Daten: {0}")]
    UngueltigeDaten(String),

    #[error("SQLx-Fehler: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration-Fehler: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Interner DB-Fehler: {0}")]
    Intern(String),
}

/// Result-Alias fuer Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Ordnet einen SQLx-Fehler anhand der Constraint-Art ein
    ///
    /// UNIQUE-Verletzungen werden zu [`DbError::Eindeutigkeit`],
    /// CHECK-Verletzungen zu [`DbError::UngueltigeDaten`].
    pub fn aus_sqlx(e: sqlx::Error, kontext: &str) -> Self {
        if let sqlx::Error::Database(db_fehler) = &e {
            if db_fehler.is_unique_violation() {
                return Self::Eindeutigkeit(kontext.to_string());
            }
            if db_fehler.is_check_violation() {
                return Self::UngueltigeDaten(format!("{kontext}: {}", db_fehler.message()));
            }
        }
        Self::Sqlx(e)
    }

    /// Gibt true zurueck wenn es sich um einen Eindeutigkeitsfehler handelt
    pub fn ist_eindeutigkeit(&self) -> bool {
        matches!(self, Self::Eindeutigkeit(_))
            || matches!(self, Self::Sqlx(sqlx::Error::Database(e)) if e.is_unique_violation())
    }
}
