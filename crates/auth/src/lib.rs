//! warenhaus-auth – Authentifizierung und Feldrichtlinien
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id und einstellbarem Arbeitsfaktor
//! - Signierte Bearer-Token (JWT) mit Ablaufzeit
//! - Das Authentifizierungs-Gate (Token → aktives Konto)
//! - Feldrichtlinien fuer schreibende Zugriffe
//! - AuthService (Registrierung, Login, Abmeldung, Passwortwechsel)

pub mod error;
pub mod feldrichtlinie;
pub mod gate;
pub mod password;
pub mod service;
pub mod token;

#[cfg(test)]
mod testdaten;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult};
pub use feldrichtlinie::{Aenderbar, Feldrichtlinie};
pub use gate::{AuthGate, AuthKontext};
pub use password::{PasswortHasher, STANDARD_ARBEITSFAKTOR};
pub use service::{Anmeldung, AuthService};
pub use token::{AusgestellterToken, TokenClaims, TokenService, STANDARD_GUELTIGKEIT_SEKUNDEN};
