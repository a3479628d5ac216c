//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod konten;
pub mod pool;
pub mod produkte;

pub use pool::SqliteDb;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::error::{DbError, DbResult};

/// Aktuelle Zeit in der Genauigkeit, die [`zeit_text`] speichert
pub(crate) fn jetzt() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Zeitstempel als Text mit fester Breite, damit ORDER BY auf der Spalte
/// chronologisch sortiert
pub(crate) fn zeit_text(zeit: &DateTime<Utc>) -> String {
    zeit.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn zeit_parsen(spalte: &str, wert: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige {spalte} '{wert}': {e}")))
}

pub(crate) fn optionale_zeit_parsen(
    spalte: &str,
    wert: Option<String>,
) -> DbResult<Option<DateTime<Utc>>> {
    wert.as_deref().map(|s| zeit_parsen(spalte, s)).transpose()
}

pub(crate) fn uuid_parsen(wert: &str) -> DbResult<uuid::Uuid> {
    uuid::Uuid::parse_str(wert)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{wert}': {e}")))
}
