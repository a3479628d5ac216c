//! Passwort-Hashing mit Argon2id
//!
//! Der Arbeitsfaktor ist der Zweierlogarithmus des Speicherbedarfs in KiB
//! (12 → 4 MiB). Jede Erhoehung um 1 verdoppelt die Kosten.
//! Die Verifikation liest Algorithmus und Parameter aus dem gespeicherten
//! PHC-String, aeltere Hashes bleiben nach einer Faktor-Aenderung gueltig.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AuthError, AuthResult};

/// Standard-Arbeitsfaktor (4 MiB)
pub const STANDARD_ARBEITSFAKTOR: u8 = 12;

/// Zulaessiger Bereich fuer den Arbeitsfaktor
pub const ARBEITSFAKTOR_BEREICH: std::ops::RangeInclusive<u8> = 3..=22;

/// Einweg-Hasher fuer Passwoerter
#[derive(Clone)]
pub struct PasswortHasher {
    argon2: Argon2<'static>,
    arbeitsfaktor: u8,
}

impl std::fmt::Debug for PasswortHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswortHasher")
            .field("arbeitsfaktor", &self.arbeitsfaktor)
            .finish()
    }
}

impl PasswortHasher {
    /// Erstellt einen Hasher; Faktoren ausserhalb von 3..=22 werden abgelehnt
    pub fn neu(arbeitsfaktor: u8) -> AuthResult<Self> {
        if !ARBEITSFAKTOR_BEREICH.contains(&arbeitsfaktor) {
            return Err(AuthError::Konfiguration(format!(
                "Arbeitsfaktor {arbeitsfaktor} ausserhalb von {}..={}",
                ARBEITSFAKTOR_BEREICH.start(),
                ARBEITSFAKTOR_BEREICH.end()
            )));
        }

        let params = Params::new(
            1u32 << arbeitsfaktor, // m_cost in KiB
            3,                     // t_cost: 3 Iterationen
            1,                     // p_cost: 1 Thread
            None,                  // output_len: Standard (32 Bytes)
        )
        .map_err(|e| AuthError::Konfiguration(format!("Argon2-Parameter ungueltig: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            arbeitsfaktor,
        })
    }

    pub fn arbeitsfaktor(&self) -> u8 {
        self.arbeitsfaktor
    }

    /// Hasht ein Passwort mit zufaelligem Salt und gibt den PHC-String zurueck
    pub fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(passwort.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    /// Prueft ein Passwort gegen einen gespeicherten PHC-Hash
    ///
    /// Falsches Passwort ergibt `Ok(false)`, nur ein kaputter Hash ist ein Fehler.
    pub fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

        match self.argon2.verify_password(passwort.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswortHasher {
        PasswortHasher::neu(4).expect("Faktor 4 ist gueltig")
    }

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let passwort = "Sicheres_Passwort_123!";
        let hash = hasher().hashen(passwort).expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$"),
            "Hash muss mit $argon2id$ beginnen"
        );
        assert_ne!(hash, passwort);
        assert!(hash.contains("m=16,"), "Faktor 4 entspricht 16 KiB");

        let korrekt = hasher()
            .verifizieren(passwort, &hash)
            .expect("Verifikation fehlgeschlagen");
        assert!(korrekt, "Passwort muss korrekt verifiziert werden");
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let hash = hasher().hashen("Richtig1!").unwrap();

        let korrekt = hasher().verifizieren("Falsch1!", &hash).unwrap();
        assert!(!korrekt, "Falsches Passwort muss abgelehnt werden");
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let hash1 = hasher().hashen("Gleich1!").unwrap();
        let hash2 = hasher().hashen("Gleich1!").unwrap();

        assert_ne!(hash1, hash2, "Salt muss die Hashes unterscheiden");
    }

    #[test]
    fn alter_faktor_bleibt_verifizierbar() {
        let hash = PasswortHasher::neu(3).unwrap().hashen("Alt1234!").unwrap();

        assert!(PasswortHasher::neu(5).unwrap().verifizieren("Alt1234!", &hash).unwrap());
    }

    #[test]
    fn faktor_ausserhalb_des_bereichs() {
        assert!(matches!(
            PasswortHasher::neu(2),
            Err(AuthError::Konfiguration(_))
        ));
        assert!(PasswortHasher::neu(23).is_err());
        assert_eq!(PasswortHasher::neu(STANDARD_ARBEITSFAKTOR).unwrap().arbeitsfaktor(), 12);
    }

    #[test]
    fn ungueltiges_hash_format_gibt_fehler() {
        let ergebnis = hasher().verifizieren("passwort", "kein_gueltiger_hash");
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }
}
