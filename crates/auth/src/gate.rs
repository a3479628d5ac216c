//! Authentifizierungs-Gate
//!
//! Ablauf je Anfrage: Header lesen → Token pruefen → Konto laden →
//! Aktiv-Status und Passwortwechsel pruefen. Jede Stufe kann mit einem
//! eigenen 401-Grund abbrechen.

use std::sync::Arc;

use warenhaus_db::{models::KontoRecord, KontoRepository};

use crate::error::{AuthError, AuthResult};
use crate::token::{TokenClaims, TokenService};

/// Ergebnis einer erfolgreichen Authentifizierung
///
/// Wird als Request-Extension an nachgelagerte Handler weitergereicht.
#[derive(Debug, Clone)]
pub struct AuthKontext {
    pub konto: KontoRecord,
    /// Roher Bearer-Token der Anfrage
    pub token: String,
    pub claims: TokenClaims,
}

/// Loest einen Bearer-Token zu einem aktiven Konto auf
#[derive(Clone)]
pub struct AuthGate {
    konten: Arc<dyn KontoRepository>,
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn neu(konten: Arc<dyn KontoRepository>, tokens: Arc<TokenService>) -> Self {
        Self { konten, tokens }
    }

    /// Prueft den Inhalt des `Authorization`-Headers
    pub async fn pruefen(&self, authorization: Option<&str>) -> AuthResult<AuthKontext> {
        let token = bearer_token(authorization).ok_or(AuthError::KeinToken)?;

        let claims = self.tokens.verifizieren(token)?;

        let konto = self
            .konten
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::KontoExistiertNicht)?;

        if !konto.is_active {
            tracing::debug!(user_id = %konto.id, "Token fuer deaktiviertes Konto");
            return Err(AuthError::KontoDeaktiviert);
        }

        if token_veraltet(&konto, &claims) {
            tracing::debug!(user_id = %konto.id, iat = claims.iat, "Token vor Passwortwechsel ausgestellt");
            return Err(AuthError::PasswortGeaendert);
        }

        Ok(AuthKontext {
            konto,
            token: token.to_string(),
            claims,
        })
    }
}

/// Extrahiert den Token aus "Bearer <token>"
fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Sekundengenau: gleicher Zeitpunkt gilt noch als gueltig
fn token_veraltet(konto: &KontoRecord, claims: &TokenClaims) -> bool {
    konto
        .password_changed_at
        .is_some_and(|geaendert| geaendert.timestamp() > claims.iat)
}
