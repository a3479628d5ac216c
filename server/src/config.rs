//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Einzige Ausnahme ist das JWT-Geheimnis: ohne Geheimnis
//! startet der Server nicht.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use warenhaus_api::{RateLimitKonfig, RestServerKonfig};
use warenhaus_auth::{STANDARD_ARBEITSFAKTOR, STANDARD_GUELTIGKEIT_SEKUNDEN};
use warenhaus_core::Umgebung;
use warenhaus_db::DatabaseConfig;
use warenhaus_observability::logging::{log_format_gueltig, log_level_gueltig};

/// Umgebungsvariable, die das JWT-Geheimnis aus der Datei ueberschreibt
pub const GEHEIMNIS_ENV: &str = "WARENHAUS_JWT_SECRET";

/// Fehler bei der Pruefung einer geladenen Konfiguration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KonfigFehler {
    #[error("Kein JWT-Geheimnis konfiguriert ([auth].jwt_geheimnis oder WARENHAUS_JWT_SECRET)")]
    KeinGeheimnis,

    #[error("Ungueltige Bind-Adresse: {0}")]
    UngueltigeAdresse(String),

    #[error("Ungueltiges Log-Level: {0}")]
    UngueltigesLogLevel(String),

    #[error("Ungueltiges Log-Format: {0} (erlaubt: text, json)")]
    UngueltigesLogFormat(String),

    #[error("Rate-Limit braucht Fenster und Maximum groesser 0")]
    UngueltigesRateLimit,
}

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP-Einstellungen
    pub server: ServerEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Token und Passwort-Hashing
    pub auth: AuthEinstellungen,
    /// Rate Limiting pro Client-IP
    pub rate_limit: RateLimitEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// HTTP-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    pub bind_adresse: String,
    pub port: u16,
    /// development, test oder production
    pub umgebung: Umgebung,
    /// Maximale JSON-Body-Groesse in KiB
    pub json_limit_kb: usize,
    /// CORS-Origins (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 5000,
            umgebung: Umgebung::Development,
            json_limit_kb: 10,
            cors_origins: vec![],
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://warenhaus.db".into(),
            max_verbindungen: 5,
        }
    }
}

/// Token- und Hashing-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// HS256-Geheimnis; wird von `WARENHAUS_JWT_SECRET` ueberschrieben
    pub jwt_geheimnis: String,
    pub token_gueltigkeit_sekunden: u64,
    /// Argon2-Arbeitsfaktor (Speicher = 2^n KiB)
    pub arbeitsfaktor: u8,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            jwt_geheimnis: String::new(),
            token_gueltigkeit_sekunden: STANDARD_GUELTIGKEIT_SEKUNDEN,
            arbeitsfaktor: STANDARD_ARBEITSFAKTOR,
        }
    }
}

/// Rate-Limit-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitEinstellungen {
    pub fenster_minuten: u64,
    pub max_anfragen: u32,
    /// Client-IP aus `X-Forwarded-For` statt aus der Socket-Adresse
    pub proxy_vertrauen: bool,
}

impl Default for RateLimitEinstellungen {
    fn default() -> Self {
        Self {
            fenster_minuten: 15,
            max_anfragen: 100,
            proxy_vertrauen: false,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    /// Das JWT-Geheimnis aus der Umgebung hat Vorrang vor der Datei.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        config.geheimnis_ueberschreiben(std::env::var(GEHEIMNIS_ENV).ok());
        config.pruefen()?;
        Ok(config)
    }

    /// Nicht-leere Werte ersetzen das Geheimnis aus der Datei
    pub fn geheimnis_ueberschreiben(&mut self, geheimnis: Option<String>) {
        if let Some(g) = geheimnis.filter(|g| !g.trim().is_empty()) {
            self.auth.jwt_geheimnis = g;
        }
    }

    /// Prueft Werte, die serde allein nicht absichern kann
    pub fn pruefen(&self) -> Result<(), KonfigFehler> {
        if self.auth.jwt_geheimnis.trim().is_empty() {
            return Err(KonfigFehler::KeinGeheimnis);
        }
        self.bind_adresse()?;
        if !log_level_gueltig(&self.logging.level) {
            return Err(KonfigFehler::UngueltigesLogLevel(self.logging.level.clone()));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(KonfigFehler::UngueltigesLogFormat(self.logging.format.clone()));
        }
        if self.rate_limit.fenster_minuten == 0 || self.rate_limit.max_anfragen == 0 {
            return Err(KonfigFehler::UngueltigesRateLimit);
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer die REST-API zurueck
    pub fn bind_adresse(&self) -> Result<SocketAddr, KonfigFehler> {
        let adresse = format!("{}:{}", self.server.bind_adresse, self.server.port);
        adresse
            .parse()
            .map_err(|_| KonfigFehler::UngueltigeAdresse(adresse))
    }

    pub fn rest_konfig(&self) -> Result<RestServerKonfig, KonfigFehler> {
        Ok(RestServerKonfig {
            bind_addr: self.bind_adresse()?,
            cors_origins: self.server.cors_origins.clone(),
            json_limit: self.server.json_limit_kb.saturating_mul(1024),
        })
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            ..DatabaseConfig::default()
        }
    }

    pub fn rate_limit_konfig(&self) -> RateLimitKonfig {
        RateLimitKonfig {
            fenster: Duration::from_secs(self.rate_limit.fenster_minuten * 60),
            max_anfragen: self.rate_limit.max_anfragen,
            proxy_vertrauen: self.rate_limit.proxy_vertrauen,
        }
    }
}
