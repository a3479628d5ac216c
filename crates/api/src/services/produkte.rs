//! Produkt-Service: oeffentliche Liste, Anlage und Eigentuemer-Aenderungen

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use warenhaus_auth::Feldrichtlinie;
use warenhaus_db::{
    models::{KontoRecord, NeuesProdukt, ProduktFilter, ProduktRecord, ProduktSortierung, ProduktUpdate},
    KontoRepository, ProduktRepository,
};

use crate::error::{ApiError, ApiResult};
use crate::services::KEINE_GUELTIGEN_FELDER;
use crate::validierung::ProduktEingabe;

const STANDARD_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

fn nicht_gefunden() -> ApiError {
    ApiError::NichtGefunden("Product not found".into())
}

/// Oeffentliche Angaben zum anlegenden Konto
#[derive(Debug, Clone, Serialize)]
pub struct ErstellerAnsicht {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Produkt mit aufgeloestem Ersteller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduktAnsicht {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    /// `null` wenn das anlegende Konto nicht mehr existiert
    pub created_by: Option<ErstellerAnsicht>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProduktAnsicht {
    fn aus(produkt: ProduktRecord, ersteller: Option<&KontoRecord>) -> Self {
        Self {
            id: produkt.id,
            title: produkt.title,
            description: produkt.description,
            price: produkt.price,
            stock: produkt.stock,
            created_by: ersteller.map(|k| ErstellerAnsicht {
                id: k.id,
                name: k.name.clone(),
                email: k.email.clone(),
            }),
            created_at: produkt.created_at,
            updated_at: produkt.updated_at,
        }
    }
}

/// Query-Parameter der Produktliste
///
/// Werte kommen als Text an und werden nachsichtig gelesen: Unlesbares
/// faellt auf den Standard zurueck.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProduktAbfrage {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl ProduktAbfrage {
    /// Seite ab 1
    pub fn seite(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map_or(1, |p| p.clamp(1, i64::from(u32::MAX)) as u32)
    }

    /// 1..=100, Standard 10
    pub fn limit(&self) -> u32 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map_or(STANDARD_LIMIT, |l| l.min(i64::from(MAX_LIMIT)) as u32)
    }
}

/// Seiten-Angaben der Produktliste
#[derive(Debug, Clone, Serialize)]
pub struct Seiteninfo {
    pub total: u64,
    pub page: u32,
    pub pages: u64,
    pub limit: u32,
}

/// Eine Seite der Produktliste
#[derive(Debug, Clone, Serialize)]
pub struct ProduktSeite {
    pub products: Vec<ProduktAnsicht>,
    pub pagination: Seiteninfo,
}

/// Produkt-Operationen fuer oeffentliche, Benutzer- und Admin-Routen
#[derive(Clone)]
pub struct ProduktService {
    produkte: Arc<dyn ProduktRepository>,
    konten: Arc<dyn KontoRepository>,
}

impl ProduktService {
    pub fn neu(produkte: Arc<dyn ProduktRepository>, konten: Arc<dyn KontoRepository>) -> Self {
        Self { produkte, konten }
    }

    pub async fn anlegen(
        &self,
        ersteller: &KontoRecord,
        eingabe: ProduktEingabe,
    ) -> ApiResult<ProduktAnsicht> {
        let produkt = self
            .produkte
            .create(NeuesProdukt {
                title: &eingabe.title,
                description: eingabe.description.as_deref(),
                price: eingabe.price,
                stock: eingabe.stock,
                created_by: ersteller.id,
            })
            .await?;

        tracing::info!(product_id = %produkt.id, user_id = %ersteller.id, "Produkt angelegt");
        Ok(ProduktAnsicht::aus(produkt, Some(ersteller)))
    }

    /// Suche, Sortierung und Seitenaufteilung; geloeschte Produkte fehlen
    pub async fn liste(&self, abfrage: &ProduktAbfrage) -> ApiResult<ProduktSeite> {
        let seite = abfrage.seite();
        let limit = abfrage.limit();
        let skip = (seite - 1).saturating_mul(limit);

        let filter = ProduktFilter {
            suche: abfrage.search.clone(),
            mit_geloeschten: false,
        };
        let sortierung = ProduktSortierung::aus_query(abfrage.sort.as_deref());

        let produkte = self.produkte.list(&filter, sortierung, skip, limit).await?;
        let total = self.produkte.count(&filter).await?;

        let ersteller = self.ersteller_laden(&produkte).await?;
        let products = produkte
            .into_iter()
            .map(|p| {
                let konto = ersteller.get(&p.created_by);
                ProduktAnsicht::aus(p, konto)
            })
            .collect();

        Ok(ProduktSeite {
            products,
            pagination: Seiteninfo {
                total,
                page: seite,
                pages: total.div_ceil(u64::from(limit)),
                limit,
            },
        })
    }

    pub async fn laden(&self, id: Uuid) -> ApiResult<ProduktAnsicht> {
        let produkt = self.produkte.get_by_id(id).await?.ok_or_else(nicht_gefunden)?;
        let ersteller = self.konten.get_by_id(produkt.created_by).await?;
        Ok(ProduktAnsicht::aus(produkt, ersteller.as_ref()))
    }

    /// Aendert Titel, Beschreibung, Preis oder Bestand
    ///
    /// Nur Eigentuemer oder Admins; die Pruefung erfolgt vor der Feldrichtlinie.
    pub async fn aendern(
        &self,
        akteur: &KontoRecord,
        id: Uuid,
        eingabe: &Map<String, Value>,
    ) -> ApiResult<ProduktAnsicht> {
        let produkt = self.eigenes_laden(akteur, id).await?;

        let mut update = ProduktUpdate::default();
        let felder = Feldrichtlinie::PRODUKT.anwenden(&mut update, eingabe);
        if felder.is_empty() {
            return Err(ApiError::Unverarbeitbar(KEINE_GUELTIGEN_FELDER.into()));
        }

        let produkt = match self.produkte.update(produkt.id, update).await {
            Ok(p) => p,
            Err(warenhaus_db::DbError::NichtGefunden(_)) => return Err(nicht_gefunden()),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(product_id = %id, user_id = %akteur.id, ?felder, "Produkt geaendert");

        let ersteller = self.konten.get_by_id(produkt.created_by).await?;
        Ok(ProduktAnsicht::aus(produkt, ersteller.as_ref()))
    }

    pub async fn loeschen(&self, akteur: &KontoRecord, id: Uuid) -> ApiResult<()> {
        self.eigenes_laden(akteur, id).await?;

        if !self.produkte.soft_delete(id).await? {
            return Err(nicht_gefunden());
        }
        tracing::info!(product_id = %id, user_id = %akteur.id, "Produkt geloescht");
        Ok(())
    }

    async fn eigenes_laden(&self, akteur: &KontoRecord, id: Uuid) -> ApiResult<ProduktRecord> {
        let produkt = self.produkte.get_by_id(id).await?.ok_or_else(nicht_gefunden)?;

        if produkt.created_by != akteur.id && !akteur.role.ist_admin() {
            tracing::warn!(product_id = %id, user_id = %akteur.id, "Zugriff auf fremdes Produkt");
            return Err(ApiError::Verboten("Forbidden".into()));
        }
        Ok(produkt)
    }

    async fn ersteller_laden(
        &self,
        produkte: &[ProduktRecord],
    ) -> ApiResult<HashMap<Uuid, KontoRecord>> {
        let mut ersteller = HashMap::new();
        for produkt in produkte {
            if ersteller.contains_key(&produkt.created_by) {
                continue;
            }
            if let Some(konto) = self.konten.get_by_id(produkt.created_by).await? {
                ersteller.insert(konto.id, konto);
            }
        }
        Ok(ersteller)
    }
}
