//! Eingabe-Validierung
//!
//! Jedes Schema prueft ein JSON-Objekt vollstaendig (kein Abbruch beim
//! ersten Fehler) und meldet alle Verstoesse als eine, mit ", " verbundene
//! Nachricht. Bekannte Felder werden normalisiert (getrimmt, E-Mail
//! kleingeschrieben, Zahlen aus Strings konvertiert). Unbekannte Felder
//! bleiben unangetastet; ueber sie entscheidet die Feldrichtlinie.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::{ApiError, ApiResult};

const PASSWORT_SONDERZEICHEN: &str = "!@#$%^&*()_-+=[]{};:'\",<.>/?\\|`~";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .unwrap_or_else(|e| panic!("E-Mail-Regex ungueltig: {e}"))
    })
}

/// Gueltige E-Mail-Adresse mit mindestens einer Domain-Stufe
pub fn email_gueltig(email: &str) -> bool {
    email.len() <= 254 && email_regex().is_match(email)
}

/// Mindestens 8 Zeichen mit Klein- und Grossbuchstabe, Ziffer und Sonderzeichen
pub fn passwort_stark(passwort: &str) -> bool {
    passwort.chars().count() >= 8
        && passwort.chars().any(|c| c.is_ascii_lowercase())
        && passwort.chars().any(|c| c.is_ascii_uppercase())
        && passwort.chars().any(|c| c.is_ascii_digit())
        && passwort.chars().any(|c| PASSWORT_SONDERZEICHEN.contains(c))
}

// ---------------------------------------------------------------------------
// Pruefer
// ---------------------------------------------------------------------------

/// Regeln fuer ein Textfeld
#[derive(Debug, Clone, Copy, Default)]
struct TextRegel {
    pflicht: bool,
    trimmen: bool,
    min: Option<usize>,
    max: Option<usize>,
    email: bool,
    passwort: bool,
    /// `""` und `null` zulassen (beides bedeutet "leer")
    leer_erlaubt: bool,
}

/// Regeln fuer ein Zahlenfeld
#[derive(Debug, Clone, Copy, Default)]
struct ZahlRegel {
    pflicht: bool,
    min: Option<f64>,
    ganzzahl: bool,
}

/// Sammelt Fehler und normalisierte Werte fuer ein Eingabe-Objekt
struct Pruefer<'a> {
    eingabe: &'a Map<String, Value>,
    ausgabe: Map<String, Value>,
    fehler: Vec<String>,
}

impl<'a> Pruefer<'a> {
    fn neu(eingabe: &'a Value) -> ApiResult<Self> {
        let Value::Object(objekt) = eingabe else {
            return Err(ApiError::Validierung("value must be of type object".into()));
        };
        Ok(Self {
            eingabe: objekt,
            ausgabe: objekt.clone(),
            fehler: Vec::new(),
        })
    }

    fn melden(&mut self, meldung: String) {
        self.fehler.push(meldung);
    }

    fn text(&mut self, feld: &str, regel: TextRegel) {
        let eingabe = self.eingabe;
        let wert = match eingabe.get(feld) {
            None => {
                if regel.pflicht {
                    self.melden(format!("{feld} is required"));
                }
                return;
            }
            Some(Value::Null) if regel.leer_erlaubt => return,
            Some(Value::String(s)) => s,
            Some(_) => {
                self.melden(format!("{feld} must be a string"));
                return;
            }
        };

        let normalisiert = if regel.trimmen { wert.trim() } else { wert.as_str() };
        let normalisiert = if regel.email {
            normalisiert.to_lowercase()
        } else {
            normalisiert.to_string()
        };

        if normalisiert.is_empty() {
            if regel.leer_erlaubt {
                self.ausgabe.insert(feld.into(), Value::String(normalisiert));
            } else {
                self.melden(format!("{feld} is not allowed to be empty"));
            }
            return;
        }

        let laenge = normalisiert.chars().count();
        if let Some(min) = regel.min {
            if laenge < min {
                self.melden(format!(
                    "{feld} length must be at least {min} characters long"
                ));
            }
        }
        if let Some(max) = regel.max {
            if laenge > max {
                self.melden(format!(
                    "{feld} length must be less than or equal to {max} characters long"
                ));
            }
        }
        if regel.email && !email_gueltig(&normalisiert) {
            self.melden(format!("{feld} must be a valid email"));
        }
        if regel.passwort && !passwort_stark(&normalisiert) {
            self.melden(format!(
                "{feld} must be at least 8 characters long and contain an uppercase letter, \
                 a lowercase letter, a digit and a special character"
            ));
        }

        self.ausgabe.insert(feld.into(), Value::String(normalisiert));
    }

    fn zahl(&mut self, feld: &str, regel: ZahlRegel) {
        let eingabe = self.eingabe;
        let zahl = match eingabe.get(feld) {
            None => {
                if regel.pflicht {
                    self.melden(format!("{feld} is required"));
                }
                return;
            }
            Some(Value::Number(n)) => n.as_f64(),
            // Numerische Strings werden konvertiert
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|z| z.is_finite()),
            Some(_) => None,
        };

        let Some(zahl) = zahl else {
            self.melden(format!("{feld} must be a number"));
            return;
        };

        if regel.ganzzahl && zahl.fract() != 0.0 {
            self.melden(format!("{feld} must be an integer"));
            return;
        }
        if let Some(min) = regel.min {
            if zahl < min {
                self.melden(format!("{feld} must be greater than or equal to {min}"));
                return;
            }
        }

        let wert = if regel.ganzzahl {
            Value::Number(Number::from(zahl as i64))
        } else {
            match Number::from_f64(zahl) {
                Some(n) => Value::Number(n),
                None => {
                    self.melden(format!("{feld} must be a number"));
                    return;
                }
            }
        };
        self.ausgabe.insert(feld.into(), wert);
    }

    fn wahrheitswert(&mut self, feld: &str) {
        let eingabe = self.eingabe;
        match eingabe.get(feld) {
            None | Some(Value::Bool(_)) => {}
            Some(Value::String(s)) if s == "true" || s == "false" => {
                self.ausgabe.insert(feld.into(), Value::Bool(s == "true"));
            }
            Some(_) => self.melden(format!("{feld} must be a boolean")),
        }
    }

    /// Verlangt mindestens einen Schluessel im Objekt
    fn nicht_leer(&mut self) {
        if self.eingabe.is_empty() {
            self.melden("value must have at least 1 key".into());
        }
    }

    fn standard(&mut self, feld: &str, wert: Value) {
        self.ausgabe.entry(feld.to_string()).or_insert(wert);
    }

    fn ergebnis(self) -> ApiResult<Map<String, Value>> {
        if self.fehler.is_empty() {
            Ok(self.ausgabe)
        } else {
            Err(ApiError::Validierung(self.fehler.join(", ")))
        }
    }
}

fn string_feld(objekt: &Map<String, Value>, feld: &str) -> String {
    objekt
        .get(feld)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

const NAME: TextRegel = TextRegel {
    pflicht: false,
    trimmen: true,
    min: Some(2),
    max: Some(50),
    email: false,
    passwort: false,
    leer_erlaubt: false,
};

const EMAIL: TextRegel = TextRegel {
    pflicht: false,
    trimmen: true,
    min: None,
    max: None,
    email: true,
    passwort: false,
    leer_erlaubt: false,
};

const PASSWORT: TextRegel = TextRegel {
    pflicht: true,
    trimmen: false,
    min: None,
    max: None,
    email: false,
    passwort: false,
    leer_erlaubt: false,
};

const TITEL: TextRegel = TextRegel {
    pflicht: false,
    trimmen: true,
    min: Some(1),
    max: None,
    email: false,
    passwort: false,
    leer_erlaubt: false,
};

const BESCHREIBUNG: TextRegel = TextRegel {
    pflicht: false,
    trimmen: true,
    min: None,
    max: None,
    email: false,
    passwort: false,
    leer_erlaubt: true,
};

const PREIS: ZahlRegel = ZahlRegel {
    pflicht: false,
    min: Some(0.0),
    ganzzahl: false,
};

const BESTAND: ZahlRegel = ZahlRegel {
    pflicht: false,
    min: Some(0.0),
    ganzzahl: true,
};

/// Validierte Registrierungsdaten
#[derive(Debug, Clone)]
pub struct RegistrierungEingabe {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn registrierung(eingabe: &Value) -> ApiResult<RegistrierungEingabe> {
    let mut p = Pruefer::neu(eingabe)?;
    p.text("name", TextRegel { pflicht: true, ..NAME });
    p.text("email", TextRegel { pflicht: true, ..EMAIL });
    p.text("password", TextRegel { passwort: true, ..PASSWORT });
    let o = p.ergebnis()?;

    Ok(RegistrierungEingabe {
        name: string_feld(&o, "name"),
        email: string_feld(&o, "email"),
        password: string_feld(&o, "password"),
    })
}

/// Validierte Login-Daten
#[derive(Debug, Clone)]
pub struct LoginEingabe {
    pub email: String,
    pub password: String,
}

pub fn login(eingabe: &Value) -> ApiResult<LoginEingabe> {
    let mut p = Pruefer::neu(eingabe)?;
    p.text("email", TextRegel { pflicht: true, ..EMAIL });
    p.text("password", PASSWORT);
    let o = p.ergebnis()?;

    Ok(LoginEingabe {
        email: string_feld(&o, "email"),
        password: string_feld(&o, "password"),
    })
}

/// Validierte Daten fuer den Passwortwechsel
#[derive(Debug, Clone)]
pub struct PasswortwechselEingabe {
    pub current_password: String,
    pub new_password: String,
}

pub fn passwortwechsel(eingabe: &Value) -> ApiResult<PasswortwechselEingabe> {
    let mut p = Pruefer::neu(eingabe)?;
    p.text("currentPassword", PASSWORT);
    p.text("newPassword", TextRegel { passwort: true, ..PASSWORT });
    let o = p.ergebnis()?;

    Ok(PasswortwechselEingabe {
        current_password: string_feld(&o, "currentPassword"),
        new_password: string_feld(&o, "newPassword"),
    })
}

/// Validierte Daten fuer ein neues Produkt
#[derive(Debug, Clone)]
pub struct ProduktEingabe {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

/// Titel und Preis fehlen → 422; sonstige Schema-Fehler → 400
pub fn produkt_anlegen(eingabe: &Value) -> ApiResult<ProduktEingabe> {
    // Falsche Typen meldet erst das Schema
    let titel_fehlt = match eingabe.get("title") {
        None | Some(Value::Null) => true,
        Some(Value::String(t)) => t.is_empty(),
        Some(_) => false,
    };
    let preis_fehlt = eingabe.get("price").map_or(true, Value::is_null);
    if titel_fehlt || preis_fehlt {
        return Err(ApiError::Unverarbeitbar("Title and price are required.".into()));
    }

    let mut p = Pruefer::neu(eingabe)?;
    p.text("title", TextRegel { pflicht: true, ..TITEL });
    p.text("description", BESCHREIBUNG);
    p.zahl("price", ZahlRegel { pflicht: true, ..PREIS });
    p.zahl("stock", BESTAND);
    p.standard("stock", Value::from(0));
    let o = p.ergebnis()?;

    Ok(ProduktEingabe {
        title: string_feld(&o, "title"),
        description: o
            .get("description")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        price: o.get("price").and_then(Value::as_f64).unwrap_or_default(),
        stock: o.get("stock").and_then(Value::as_i64).unwrap_or_default(),
    })
}

/// Produkt-Update; mindestens ein Schluessel
pub fn produkt_aendern(eingabe: &Value) -> ApiResult<Map<String, Value>> {
    let mut p = Pruefer::neu(eingabe)?;
    p.nicht_leer();
    p.text("title", TITEL);
    p.text("description", BESCHREIBUNG);
    p.zahl("price", PREIS);
    p.zahl("stock", BESTAND);
    p.ergebnis()
}

/// Eigenes Profil; mindestens ein Schluessel
pub fn profil_aendern(eingabe: &Value) -> ApiResult<Map<String, Value>> {
    let mut p = Pruefer::neu(eingabe)?;
    p.nicht_leer();
    p.text("name", NAME);
    p.text("email", EMAIL);
    p.ergebnis()
}

/// Konto-Bearbeitung durch Admins
pub fn admin_konto_aendern(eingabe: &Value) -> ApiResult<Map<String, Value>> {
    let mut p = Pruefer::neu(eingabe)?;
    p.nicht_leer();
    p.text("name", NAME);
    p.text("email", EMAIL);
    p.wahrheitswert("isActive");
    p.ergebnis()
}
