//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Die Traits sind objekt-sicher (`async-trait`),
//! damit Services sie als `Arc<dyn ...>` halten koennen.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{
    KontoFilter, KontoRecord, KontoUpdate, NeuesKonto, NeuesProdukt, ProduktFilter,
    ProduktRecord, ProduktSortierung, ProduktUpdate,
};

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://warenhaus.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://warenhaus.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Konto-Datenzugriffe
///
/// Lesezugriffe per ID oder E-Mail liefern auch weich geloeschte Konten,
/// damit die Authentifizierung "deaktiviert" von "existiert nicht"
/// unterscheiden kann. Listen filtern geloeschte Konten standardmaessig.
#[async_trait]
pub trait KontoRepository: Send + Sync {
    /// Legt ein neues Konto an; doppelte E-Mail ergibt `DbError::Eindeutigkeit`
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<KontoRecord>>;

    /// Sucht ohne Beachtung der Gross-/Kleinschreibung
    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>>;

    /// Aendert nur die gesetzten Felder und aktualisiert `updated_at`
    async fn update(&self, id: Uuid, data: KontoUpdate) -> DbResult<KontoRecord>;

    /// Neueste zuerst
    async fn list(&self, filter: &KontoFilter) -> DbResult<Vec<KontoRecord>>;
}

/// Repository fuer Produkt-Datenzugriffe
///
/// Alle Lesezugriffe blenden weich geloeschte Produkte aus, sofern der
/// Filter nicht ausdruecklich etwas anderes verlangt.
#[async_trait]
pub trait ProduktRepository: Send + Sync {
    async fn create(&self, data: NeuesProdukt<'_>) -> DbResult<ProduktRecord>;

    /// Nur nicht geloeschte Produkte
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<ProduktRecord>>;

    /// Aendert ein nicht geloeschtes Produkt
    async fn update(&self, id: Uuid, data: ProduktUpdate) -> DbResult<ProduktRecord>;

    /// Setzt Loesch-Flag und -Zeitpunkt; `false` wenn nichts geloescht wurde
    async fn soft_delete(&self, id: Uuid) -> DbResult<bool>;

    async fn list(
        &self,
        filter: &ProduktFilter,
        sortierung: ProduktSortierung,
        skip: u32,
        limit: u32,
    ) -> DbResult<Vec<ProduktRecord>>;

    async fn count(&self, filter: &ProduktFilter) -> DbResult<u64>;
}
