//! Konto-Service: eigenes Profil und Admin-Verwaltung

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use warenhaus_auth::Feldrichtlinie;
use warenhaus_db::{
    models::{KontoFilter, KontoRecord, KontoUpdate},
    KontoRepository,
};

use crate::error::{ApiError, ApiResult};
use crate::services::KEINE_GUELTIGEN_FELDER;

fn nicht_gefunden() -> ApiError {
    ApiError::NichtGefunden("User not found".into())
}

/// Konto-Operationen fuer Profil- und Admin-Routen
#[derive(Clone)]
pub struct KontoService {
    konten: Arc<dyn KontoRepository>,
}

impl KontoService {
    pub fn neu(konten: Arc<dyn KontoRepository>) -> Self {
        Self { konten }
    }

    /// Laedt ein Konto; weich geloeschte nur mit `mit_geloeschten`
    pub async fn laden(&self, id: Uuid, mit_geloeschten: bool) -> ApiResult<KontoRecord> {
        self.konten
            .get_by_id(id)
            .await?
            .filter(|k| mit_geloeschten || !k.ist_geloescht())
            .ok_or_else(nicht_gefunden)
    }

    /// Aendert das eigene Profil (Sperrliste fuer Rolle, Status, Zeitstempel)
    pub async fn profil_aendern(
        &self,
        konto_id: Uuid,
        eingabe: &Map<String, Value>,
    ) -> ApiResult<KontoRecord> {
        self.aendern(konto_id, false, eingabe, Feldrichtlinie::KONTO_SELBST)
            .await
    }

    /// Deaktiviert das eigene Konto
    pub async fn profil_loeschen(&self, konto_id: Uuid) -> ApiResult<()> {
        self.weich_loeschen(konto_id).await?;
        tracing::info!(user_id = %konto_id, "Konto durch Inhaber deaktiviert");
        Ok(())
    }

    /// Alle Konten, neueste zuerst
    pub async fn liste(&self, mit_geloeschten: bool) -> ApiResult<Vec<KontoRecord>> {
        Ok(self.konten.list(&KontoFilter { mit_geloeschten }).await?)
    }

    /// Admin-Bearbeitung; darf zusaetzlich den Aktiv-Status setzen
    ///
    /// Wirkt auch auf deaktivierte Konten, `isActive: true` reaktiviert sie.
    pub async fn admin_aendern(
        &self,
        konto_id: Uuid,
        eingabe: &Map<String, Value>,
    ) -> ApiResult<KontoRecord> {
        let konto = self
            .aendern(konto_id, true, eingabe, Feldrichtlinie::KONTO_ADMIN)
            .await?;
        tracing::info!(user_id = %konto_id, "Konto durch Admin geaendert");
        Ok(konto)
    }

    /// Admin-Loeschung; das eigene Konto ist ausgenommen
    pub async fn admin_loeschen(&self, admin_id: Uuid, konto_id: Uuid) -> ApiResult<()> {
        if admin_id == konto_id {
            return Err(ApiError::UngueltigeOperation(
                "You cannot delete your own account".into(),
            ));
        }

        self.weich_loeschen(konto_id).await?;
        tracing::info!(user_id = %konto_id, admin_id = %admin_id, "Konto durch Admin deaktiviert");
        Ok(())
    }

    async fn aendern(
        &self,
        konto_id: Uuid,
        mit_geloeschten: bool,
        eingabe: &Map<String, Value>,
        richtlinie: Feldrichtlinie,
    ) -> ApiResult<KontoRecord> {
        self.laden(konto_id, mit_geloeschten).await?;

        let mut update = KontoUpdate::default();
        let felder = richtlinie.anwenden(&mut update, eingabe);
        if felder.is_empty() {
            return Err(ApiError::Unverarbeitbar(KEINE_GUELTIGEN_FELDER.into()));
        }
        tracing::debug!(user_id = %konto_id, ?felder, "Konto-Update");

        match self.konten.update(konto_id, update).await {
            Ok(konto) => Ok(konto),
            Err(e) if e.ist_eindeutigkeit() => Err(ApiError::Konflikt(
                "User already exists with this email.".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn weich_loeschen(&self, konto_id: Uuid) -> ApiResult<()> {
        self.laden(konto_id, false).await?;

        self.konten
            .update(
                konto_id,
                KontoUpdate {
                    is_active: Some(false),
                    deleted_at: Some(Some(Utc::now())),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }
}
