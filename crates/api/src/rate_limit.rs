//! Rate Limiter fuer die REST-API
//!
//! Token-Bucket pro Client-IP: der Bucket fasst `max_anfragen` Token und
//! fuellt sich gleichmaessig ueber das Zeitfenster wieder auf.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Konfiguration fuer den Rate Limiter
#[derive(Debug, Clone)]
pub struct RateLimitKonfig {
    /// Zeitfenster, in dem sich ein leerer Bucket vollstaendig auffuellt
    pub fenster: Duration,
    /// Maximale Anfragen pro Fenster und IP (= Burst-Limit)
    pub max_anfragen: u32,
    /// `X-Forwarded-For`/`X-Real-IP` als Client-IP akzeptieren.
    /// Nur hinter einem vertrauenswuerdigen Reverse-Proxy setzen.
    pub proxy_vertrauen: bool,
}

impl Default for RateLimitKonfig {
    fn default() -> Self {
        Self {
            fenster: Duration::from_secs(15 * 60),
            max_anfragen: 100,
            proxy_vertrauen: false,
        }
    }
}

/// Ein Token-Bucket fuer eine einzelne IP
#[derive(Debug)]
struct TokenBucket {
    /// Aktuelle Token-Anzahl (als f64 fuer Bruchteil-Auffuellung)
    token: f64,
    max_token: f64,
    /// Auffuellrate in Token pro Sekunde
    fuellrate: f64,
    letzte_auffuellung: Instant,
}

impl TokenBucket {
    fn neu(konfig: &RateLimitKonfig) -> Self {
        let max = f64::from(konfig.max_anfragen);
        let sekunden = konfig.fenster.as_secs_f64().max(1.0);
        Self {
            token: max,
            max_token: max,
            fuellrate: max / sekunden,
            letzte_auffuellung: Instant::now(),
        }
    }

    /// Versucht ein Token zu verbrauchen. Gibt `true` zurueck wenn erlaubt.
    fn verbrauchen(&mut self) -> bool {
        self.auffuellen();
        if self.token >= 1.0 {
            self.token -= 1.0;
            true
        } else {
            false
        }
    }

    /// Sekunden bis zum naechsten verfuegbaren Token
    fn retry_after_secs(&mut self) -> u64 {
        self.auffuellen();
        let fehlend = 1.0 - self.token;
        if fehlend <= 0.0 || self.fuellrate <= 0.0 {
            return 0;
        }
        (fehlend / self.fuellrate).ceil() as u64
    }

    fn auffuellen(&mut self) {
        let jetzt = Instant::now();
        let vergangen = jetzt.duration_since(self.letzte_auffuellung).as_secs_f64();
        self.token = (self.token + vergangen * self.fuellrate).min(self.max_token);
        self.letzte_auffuellung = jetzt;
    }
}

/// Rate Limiter mit Token-Bucket-Algorithmus pro IP
pub struct RateLimiter {
    konfig: RateLimitKonfig,
    ip_buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn neu(konfig: RateLimitKonfig) -> Arc<Self> {
        Arc::new(Self {
            konfig,
            ip_buckets: Mutex::new(HashMap::new()),
        })
    }

    /// Prueft und verbraucht ein Token fuer eine IP-Adresse.
    ///
    /// Gibt `Ok(())` zurueck wenn erlaubt, `Err(retry_after_secs)` sonst.
    pub fn pruefe_ip(&self, ip: &str) -> Result<(), u64> {
        let mut buckets = self.ip_buckets.lock();
        let bucket = buckets
            .entry(ip.to_string())
            .or_insert_with(|| TokenBucket::neu(&self.konfig));
        if bucket.verbrauchen() {
            Ok(())
        } else {
            Err(bucket.retry_after_secs())
        }
    }

    /// Entfernt Buckets, die laenger als ein Fenster unbenutzt sind
    ///
    /// Ein solcher Bucket waere ohnehin wieder voll.
    pub fn cleanup(&self) -> usize {
        let jetzt = Instant::now();
        let fenster = self.konfig.fenster;

        let mut buckets = self.ip_buckets.lock();
        let vorher = buckets.len();
        buckets.retain(|_, b| jetzt.duration_since(b.letzte_auffuellung) < fenster);
        vorher - buckets.len()
    }

    pub fn fenster(&self) -> Duration {
        self.konfig.fenster
    }

    pub fn proxy_vertrauen(&self) -> bool {
        self.konfig.proxy_vertrauen
    }
}
