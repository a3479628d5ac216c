//! warenhaus-api – REST-Schicht fuer Warenhaus
//!
//! Stellt die JSON-API unter /api/... bereit:
//! - **auth**: Registrierung, Login, Token-Widerruf, Passwortwechsel
//! - **users**: eigenes Profil
//! - **products**: oeffentliche Liste, Anlage und Pflege durch Eigentuemer
//! - **admin**: Konto-Verwaltung und Produktpflege fuer Admins
//!
//! Jede Antwort nutzt den Umschlag `{status, message, data?}`.

pub mod antwort;
pub mod error;
pub mod rate_limit;
pub mod rest;
pub mod services;
pub mod validierung;

pub use antwort::Antwort;
pub use error::{ApiError, ApiResult};
pub use rate_limit::{RateLimitKonfig, RateLimiter};
pub use rest::server::app;
pub use rest::{AppState, RestServer, RestServerKonfig};
