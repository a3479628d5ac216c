//! SQLite-Implementierung des KontoRepository

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{KontoFilter, KontoRecord, KontoUpdate, NeuesKonto};
use crate::repository::KontoRepository;
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{jetzt, optionale_zeit_parsen, uuid_parsen, zeit_parsen, zeit_text};

const SPALTEN: &str = "id, name, email, password_hash, role, is_active, last_login_at, \
                       password_changed_at, deleted_at, created_at, updated_at";

#[async_trait]
impl KontoRepository for SqliteDb {
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord> {
        let id = Uuid::new_v4();
        let now = jetzt();
        let now_str = zeit_text(&now);
        let email = data.email.trim().to_lowercase();

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.name)
        .bind(&email)
        .bind(data.password_hash)
        .bind(data.role.als_str())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::aus_sqlx(e, &format!("E-Mail '{email}' bereits vergeben")))?;

        Ok(KontoRecord {
            id,
            name: data.name.to_string(),
            email,
            password_hash: data.password_hash.to_string(),
            role: data.role,
            is_active: true,
            last_login_at: None,
            password_changed_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<KontoRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_konto(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE email = ?"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_konto(&r)).transpose()
    }

    async fn update(&self, id: Uuid, data: KontoUpdate) -> DbResult<KontoRecord> {
        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.name.is_some() {
            sets.push("name = ?");
        }
        if data.email.is_some() {
            sets.push("email = ?");
        }
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }
        if data.role.is_some() {
            sets.push("role = ?");
        }
        if data.is_active.is_some() {
            sets.push("is_active = ?");
        }
        if data.last_login_at.is_some() {
            sets.push("last_login_at = ?");
        }
        if data.password_changed_at.is_some() {
            sets.push("password_changed_at = ?");
        }
        if data.deleted_at.is_some() {
            sets.push("deleted_at = ?");
        }

        if sets.is_empty() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("Konto {id}")));
        }
        sets.push("updated_at = ?");

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.name {
            q = q.bind(v);
        }
        if let Some(ref v) = data.email {
            q = q.bind(v.trim().to_lowercase());
        }
        if let Some(ref v) = data.password_hash {
            q = q.bind(v);
        }
        if let Some(v) = data.role {
            q = q.bind(v.als_str());
        }
        if let Some(v) = data.is_active {
            q = q.bind(v as i64);
        }
        if let Some(ref v) = data.last_login_at {
            q = q.bind(zeit_text(v));
        }
        if let Some(ref v) = data.password_changed_at {
            q = q.bind(zeit_text(v));
        }
        if let Some(ref v) = data.deleted_at {
            q = q.bind(v.as_ref().map(zeit_text));
        }
        q = q.bind(zeit_text(&jetzt()));
        q = q.bind(id.to_string());

        let affected = q
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::aus_sqlx(e, "E-Mail bereits vergeben"))?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Konto {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Konto nach Update nicht gefunden"))
    }

    async fn list(&self, filter: &KontoFilter) -> DbResult<Vec<KontoRecord>> {
        let sql = if filter.mit_geloeschten {
            format!("SELECT {SPALTEN} FROM users ORDER BY created_at DESC, rowid DESC")
        } else {
            format!(
                "SELECT {SPALTEN} FROM users WHERE deleted_at IS NULL
                 ORDER BY created_at DESC, rowid DESC"
            )
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_konto).collect()
    }
}

fn row_to_konto(row: &sqlx::sqlite::SqliteRow) -> DbResult<KontoRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let role_str: String = row.try_get("role")?;
    let role = role_str.parse().map_err(DbError::Intern)?;
    let is_active: i64 = row.try_get("is_active")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(KontoRecord {
        id: uuid_parsen(&id_str)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role,
        is_active: is_active != 0,
        last_login_at: optionale_zeit_parsen("last_login_at", row.try_get("last_login_at")?)?,
        password_changed_at: optionale_zeit_parsen(
            "password_changed_at",
            row.try_get("password_changed_at")?,
        )?,
        deleted_at: optionale_zeit_parsen("deleted_at", row.try_get("deleted_at")?)?,
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
    })
}
