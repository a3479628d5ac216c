//! warenhaus-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern bereit: die Geschaeftslogik
//! kennt nur die Traits in [`repository`], die SQLite-Implementierung in
//! [`sqlite`] ist austauschbar.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::{DbError, DbResult};
pub use repository::{DatabaseConfig, KontoRepository, ProduktRepository};
pub use sqlite::SqliteDb;
