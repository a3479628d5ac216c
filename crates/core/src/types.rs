//! Gemeinsame Typen fuer Warenhaus
//!
//! Rollen und Laufzeitumgebung werden von Datenbank, Auth und REST-Schicht
//! gleichermassen benoetigt und liegen deshalb hier.

use serde::{Deserialize, Serialize};

/// Rolle eines Kontos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rolle {
    /// Normaler Benutzer
    #[default]
    User,
    /// Administrator mit Zugriff auf /admin
    Admin,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn ist_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::str::FromStr for Rolle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unbekannte Rolle: {other}")),
        }
    }
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

/// Laufzeitumgebung des Servers
///
/// Steuert u.a. ob Fehlerantworten Diagnose-Details enthalten duerfen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Umgebung {
    #[default]
    Development,
    Test,
    Production,
}

impl Umgebung {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    /// Diagnose-Details nur ausserhalb von Produktion
    pub fn diagnose_erlaubt(&self) -> bool {
        !matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Umgebung {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}
