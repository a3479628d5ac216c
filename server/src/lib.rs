//! warenhaus-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::ServerConfig;

use warenhaus_api::{AppState, RateLimiter, RestServer};
use warenhaus_auth::{PasswortHasher, TokenService};
use warenhaus_db::{KontoRepository, ProduktRepository, SqliteDb};
use warenhaus_observability::HealthState;

/// Intervall fuer das Aufraeumen voller Rate-Limit-Buckets
const RATE_LIMIT_CLEANUP: Duration = Duration::from_secs(5 * 60);
/// Intervall fuer die Erreichbarkeitspruefung der Datenbank
const DB_PRUEFUNG: Duration = Duration::from_secs(30);

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbankverbindung herstellen, Migrationen ausfuehren
    /// 2. Hasher und Token-Service aus der Konfiguration bauen
    /// 3. Hintergrund-Tasks (Rate-Limit-Cleanup, DB-Pruefung) starten
    /// 4. REST-API starten und auf Ctrl-C warten
    pub async fn starten(self) -> Result<()> {
        let cfg = &self.config;
        let rest_konfig = cfg.rest_konfig()?;

        tracing::info!(
            umgebung = %cfg.server.umgebung,
            adresse = %rest_konfig.bind_addr,
            "Server startet"
        );

        let db = Arc::new(
            SqliteDb::oeffnen(&cfg.datenbank_config())
                .await
                .with_context(|| format!("Datenbank '{}' nicht verfuegbar", cfg.datenbank.url))?,
        );

        let hasher = Arc::new(PasswortHasher::neu(cfg.auth.arbeitsfaktor)?);
        let tokens = Arc::new(TokenService::neu(
            &cfg.auth.jwt_geheimnis,
            cfg.auth.token_gueltigkeit_sekunden,
        )?);
        tracing::info!(
            arbeitsfaktor = hasher.arbeitsfaktor(),
            token_gueltigkeit = %tokens.gueltigkeit_text(),
            "Auth konfiguriert"
        );

        let konten: Arc<dyn KontoRepository> = db.clone();
        let produkte: Arc<dyn ProduktRepository> = db.clone();
        let state = AppState::neu(konten, produkte, hasher, tokens, cfg.server.umgebung);

        let rate_limiter = RateLimiter::neu(cfg.rate_limit_konfig());
        rate_limit_cleanup_starten(rate_limiter.clone());

        let health = HealthState::neu(cfg.server.umgebung);
        db_pruefung_starten(db, health.clone());

        let app = warenhaus_api::app(state, &rest_konfig, rate_limiter, health);
        RestServer::neu(rest_konfig)
            .starten(app)
            .await
            .context("REST-Server beendet mit Fehler")?;

        tracing::info!("Server beendet");
        Ok(())
    }
}

fn rate_limit_cleanup_starten(limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        let mut intervall = tokio::time::interval(RATE_LIMIT_CLEANUP);
        loop {
            intervall.tick().await;
            let entfernt = limiter.cleanup();
            if entfernt > 0 {
                tracing::debug!(entfernt, "Rate-Limit-Buckets aufgeraeumt");
            }
        }
    });
}

fn db_pruefung_starten(db: Arc<SqliteDb>, health: HealthState) {
    tokio::spawn(async move {
        let mut intervall = tokio::time::interval(DB_PRUEFUNG);
        loop {
            intervall.tick().await;
            let verbunden = db.erreichbar().await;
            if verbunden != health.db_verbunden() {
                if verbunden {
                    tracing::info!("Datenbank wieder erreichbar");
                } else {
                    tracing::warn!("Datenbank nicht erreichbar");
                }
            }
            health.db_status_setzen(verbunden);
        }
    });
}
