//! Fehlertypen fuer den Auth-Service
//!
//! Die Display-Texte der Anmelde- und Token-Fehler gehen unveraendert an
//! den Client und sind deshalb englisch.

use thiserror::Error;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Anmeldung ---
    #[error("Invalid email or password.")]
    UngueltigeAnmeldedaten,

    #[error("Current password is incorrect.")]
    AktuellesPasswortFalsch,

    // --- Bearer-Token ---
    #[error("Access denied. No token provided.")]
    KeinToken,

    #[error("Token has expired. Please log in again.")]
    TokenAbgelaufen,

    #[error("Invalid token. Please log in again.")]
    TokenUngueltig,

    #[error("Token-Signierung fehlgeschlagen: {0}")]
    TokenSignierung(String),

    // --- Konto ---
    #[error("User no longer exists.")]
    KontoExistiertNicht,

    #[error("Account has been deactivated.")]
    KontoDeaktiviert,

    #[error("Password was changed. Please log in again.")]
    PasswortGeaendert,

    #[error("User not found.")]
    KontoNichtGefunden,

    #[error("User already exists with this email.")]
    EmailVergeben,

    // --- Konfiguration ---
    #[error("Ungueltige Auth-Konfiguration: {0}")]
    Konfiguration(String),

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] warenhaus_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Fehler, die mit 401 beantwortet werden
    pub fn ist_unauthentifiziert(&self) -> bool {
        matches!(
            self,
            Self::UngueltigeAnmeldedaten
                | Self::AktuellesPasswortFalsch
                | Self::KeinToken
                | Self::TokenAbgelaufen
                | Self::TokenUngueltig
                | Self::KontoExistiertNicht
                | Self::KontoDeaktiviert
                | Self::PasswortGeaendert
        )
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
