//! Signierte Bearer-Token (JWT, HS256)
//!
//! Token tragen nur Konto-ID, Ausstellungs- und Ablaufzeitpunkt. Es gibt
//! keinen serverseitigen Token-Speicher: ungueltig wird ein Token durch
//! Ablauf oder durch ein spaeteres `password_changed_at` am Konto.

use chrono::{DateTime, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Standard-Gueltigkeit: 24 Stunden
pub const STANDARD_GUELTIGKEIT_SEKUNDEN: u64 = 24 * 60 * 60;

/// Nutzdaten eines Bearer-Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Konto-ID
    pub sub: Uuid,
    /// Ausstellungszeitpunkt (Unix-Sekunden)
    pub iat: i64,
    /// Ablaufzeitpunkt (Unix-Sekunden)
    pub exp: i64,
}

/// Frisch ausgestellter Token
#[derive(Debug, Clone)]
pub struct AusgestellterToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Stellt Token aus und prueft sie
///
/// Schluessel und Gueltigkeit werden einmal beim Start gesetzt.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    gueltigkeit_sekunden: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("gueltigkeit_sekunden", &self.gueltigkeit_sekunden)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Erstellt den Service; leeres Geheimnis oder Gueltigkeit 0 werden abgelehnt
    pub fn neu(geheimnis: &str, gueltigkeit_sekunden: u64) -> AuthResult<Self> {
        if geheimnis.is_empty() {
            return Err(AuthError::Konfiguration(
                "JWT-Geheimnis darf nicht leer sein".into(),
            ));
        }
        if gueltigkeit_sekunden == 0 || gueltigkeit_sekunden > i64::MAX as u64 {
            return Err(AuthError::Konfiguration(format!(
                "Ungueltige Token-Gueltigkeit: {gueltigkeit_sekunden}s"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(geheimnis.as_bytes()),
            decoding: DecodingKey::from_secret(geheimnis.as_bytes()),
            validation,
            gueltigkeit_sekunden,
        })
    }

    pub fn gueltigkeit_sekunden(&self) -> u64 {
        self.gueltigkeit_sekunden
    }

    /// Gueltigkeit in Kurzform fuer Antworten ("24h", "30m", "45s")
    pub fn gueltigkeit_text(&self) -> String {
        let s = self.gueltigkeit_sekunden;
        if s % 3600 == 0 {
            format!("{}h", s / 3600)
        } else if s % 60 == 0 {
            format!("{}m", s / 60)
        } else {
            format!("{s}s")
        }
    }

    /// Stellt einen Token fuer das Konto aus, gueltig ab jetzt
    pub fn ausstellen(&self, sub: Uuid) -> AuthResult<AusgestellterToken> {
        self.ausstellen_zum(sub, Utc::now())
    }

    /// Stellt einen Token mit explizitem Ausstellungszeitpunkt aus
    pub fn ausstellen_zum(&self, sub: Uuid, jetzt: DateTime<Utc>) -> AuthResult<AusgestellterToken> {
        let iat = jetzt.timestamp();
        let claims = TokenClaims {
            sub,
            iat,
            exp: iat.saturating_add(self.gueltigkeit_sekunden as i64),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenSignierung(e.to_string()))?;

        Ok(AusgestellterToken { token, claims })
    }

    /// Prueft Signatur und Ablauf und gibt die Claims zurueck
    pub fn verifizieren(&self, token: &str) -> AuthResult<TokenClaims> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|daten| daten.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenAbgelaufen,
                _ => {
                    tracing::debug!(fehler = %e, "Token-Pruefung fehlgeschlagen");
                    AuthError::TokenUngueltig
                }
            })
    }
}
