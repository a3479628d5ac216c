//! Auth-Service fuer Warenhaus
//!
//! Registrierung, Login, Abmeldung auf allen Geraeten und Passwortwechsel.
//! Hashing und Zeitstempel werden hier explizit vor dem Schreiben gesetzt.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use warenhaus_core::Rolle;
use warenhaus_db::{
    models::{KontoRecord, KontoUpdate, NeuesKonto},
    DbError, KontoRepository,
};

use crate::{
    error::{AuthError, AuthResult},
    password::PasswortHasher,
    token::{AusgestellterToken, TokenService},
};

/// Ergebnis von Registrierung und Login
#[derive(Debug, Clone)]
pub struct Anmeldung {
    pub konto: KontoRecord,
    pub token: AusgestellterToken,
}

/// Auth-Service – zentraler Einstiegspunkt fuer alle Anmeldevorgaenge
#[derive(Clone)]
pub struct AuthService {
    konten: Arc<dyn KontoRepository>,
    hasher: Arc<PasswortHasher>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn neu(
        konten: Arc<dyn KontoRepository>,
        hasher: Arc<PasswortHasher>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            konten,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Registriert ein neues Konto mit Rolle `user` und stellt einen Token aus
    ///
    /// Die Vorpruefung der E-Mail ist nur ein Hinweis; massgeblich ist der
    /// UNIQUE-Index, dessen Verletzung ebenfalls `EmailVergeben` ergibt.
    pub async fn registrieren(
        &self,
        name: &str,
        email: &str,
        passwort: &str,
    ) -> AuthResult<Anmeldung> {
        if self.konten.get_by_email(email).await?.is_some() {
            return Err(AuthError::EmailVergeben);
        }

        let passwort_hash = self.hasher.hashen(passwort)?;

        let konto = self
            .konten
            .create(NeuesKonto {
                name,
                email,
                password_hash: &passwort_hash,
                role: Rolle::User,
            })
            .await
            .map_err(|e| match e {
                e if e.ist_eindeutigkeit() => AuthError::EmailVergeben,
                e => AuthError::Datenbank(e),
            })?;

        tracing::info!(
            user_id = %konto.id,
            email = %konto.email,
            "Neues Konto registriert"
        );

        let token = self.tokens.ausstellen(konto.id)?;
        Ok(Anmeldung { konto, token })
    }

    /// Meldet ein Konto an und vermerkt `last_login_at`
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<Anmeldung> {
        let konto = self
            .konten
            .get_by_email(email)
            .await?
            .ok_or(AuthError::UngueltigeAnmeldedaten)?;

        if !konto.is_active {
            tracing::warn!(user_id = %konto.id, "Login auf deaktiviertes Konto");
            return Err(AuthError::KontoDeaktiviert);
        }

        if !self.hasher.verifizieren(passwort, &konto.password_hash)? {
            tracing::warn!(email = %konto.email, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let konto = self
            .konten
            .update(
                konto.id,
                KontoUpdate {
                    last_login_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %konto.id, "Konto angemeldet");

        let token = self.tokens.ausstellen(konto.id)?;
        Ok(Anmeldung { konto, token })
    }

    /// Macht alle bisher ausgestellten Token des Kontos ungueltig
    pub async fn abmelden_ueberall(&self, konto_id: Uuid) -> AuthResult<()> {
        self.konten
            .update(
                konto_id,
                KontoUpdate {
                    password_changed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .map_err(nicht_gefunden_als_konto)?;

        tracing::info!(user_id = %konto_id, "Auf allen Geraeten abgemeldet");
        Ok(())
    }

    /// Aendert das Passwort nach Pruefung des aktuellen Passworts
    ///
    /// Setzt `password_changed_at`, wodurch alle aelteren Token verfallen.
    pub async fn passwort_aendern(
        &self,
        konto_id: Uuid,
        aktuelles_passwort: &str,
        neues_passwort: &str,
    ) -> AuthResult<()> {
        let konto = self.konto_laden(konto_id).await?;

        if !self
            .hasher
            .verifizieren(aktuelles_passwort, &konto.password_hash)?
        {
            tracing::warn!(user_id = %konto_id, "Passwortwechsel mit falschem Passwort");
            return Err(AuthError::AktuellesPasswortFalsch);
        }

        let neuer_hash = self.hasher.hashen(neues_passwort)?;
        self.konten
            .update(
                konto_id,
                KontoUpdate {
                    password_hash: Some(neuer_hash),
                    password_changed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .map_err(nicht_gefunden_als_konto)?;

        tracing::info!(user_id = %konto_id, "Passwort geaendert, aeltere Token ungueltig");
        Ok(())
    }

    /// Laedt ein nicht geloeschtes Konto
    pub async fn konto_laden(&self, konto_id: Uuid) -> AuthResult<KontoRecord> {
        self.konten
            .get_by_id(konto_id)
            .await?
            .filter(|k| !k.ist_geloescht())
            .ok_or(AuthError::KontoNichtGefunden)
    }
}

fn nicht_gefunden_als_konto(e: DbError) -> AuthError {
    match e {
        DbError::NichtGefunden(_) => AuthError::KontoNichtGefunden,
        e => AuthError::Datenbank(e),
    }
}
