//! Minimaler In-Memory KontoRepository fuer Tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use warenhaus_db::{
    models::{KontoFilter, KontoRecord, KontoUpdate, NeuesKonto},
    DbError, DbResult, KontoRepository,
};

#[derive(Default)]
pub(crate) struct TestKontoRepo {
    konten: Mutex<Vec<KontoRecord>>,
}

#[async_trait]
impl KontoRepository for TestKontoRepo {
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord> {
        let mut konten = self.konten.lock().unwrap();
        let email = data.email.to_lowercase();
        if konten.iter().any(|k| k.email == email) {
            return Err(DbError::Eindeutigkeit(email));
        }
        let record = KontoRecord {
            id: Uuid::new_v4(),
            name: data.name.to_string(),
            email,
            password_hash: data.password_hash.to_string(),
            role: data.role,
            is_active: true,
            last_login_at: None,
            password_changed_at: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        konten.push(record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<KontoRecord>> {
        Ok(self.konten.lock().unwrap().iter().find(|k| k.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>> {
        let email = email.to_lowercase();
        Ok(self.konten.lock().unwrap().iter().find(|k| k.email == email).cloned())
    }

    async fn update(&self, id: Uuid, data: KontoUpdate) -> DbResult<KontoRecord> {
        let mut konten = self.konten.lock().unwrap();
        let konto = konten
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))?;
        if let Some(v) = data.name {
            konto.name = v;
        }
        if let Some(v) = data.email {
            konto.email = v.to_lowercase();
        }
        if let Some(v) = data.password_hash {
            konto.password_hash = v;
        }
        if let Some(v) = data.role {
            konto.role = v;
        }
        if let Some(v) = data.is_active {
            konto.is_active = v;
        }
        if let Some(v) = data.last_login_at {
            konto.last_login_at = Some(v);
        }
        if let Some(v) = data.password_changed_at {
            konto.password_changed_at = Some(v);
        }
        if let Some(v) = data.deleted_at {
            konto.deleted_at = v;
        }
        konto.updated_at = Utc::now();
        Ok(konto.clone())
    }

    async fn list(&self, filter: &KontoFilter) -> DbResult<Vec<KontoRecord>> {
        let konten = self.konten.lock().unwrap();
        Ok(konten
            .iter()
            .rev()
            .filter(|k| filter.mit_geloeschten || !k.ist_geloescht())
            .cloned()
            .collect())
    }
}
