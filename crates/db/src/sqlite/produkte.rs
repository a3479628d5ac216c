//! SQLite-Implementierung des ProduktRepository

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{
    NeuesProdukt, ProduktFilter, ProduktRecord, ProduktSortierung, ProduktUpdate,
};
use crate::repository::ProduktRepository;
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{jetzt, optionale_zeit_parsen, uuid_parsen, zeit_parsen, zeit_text};

const SPALTEN: &str = "id, title, description, price, stock, created_by, is_deleted, \
                       deleted_at, created_at, updated_at";

/// WHERE-Klausel fuer Listen und Zaehlungen; Parameter: mit_geloeschten, suchmuster
const FILTER_SQL: &str =
    "WHERE (? = 1 OR is_deleted = 0) AND (? IS NULL OR title LIKE ? ESCAPE '\\')";

#[async_trait]
impl ProduktRepository for SqliteDb {
    async fn create(&self, data: NeuesProdukt<'_>) -> DbResult<ProduktRecord> {
        let id = Uuid::new_v4();
        let now = jetzt();
        let now_str = zeit_text(&now);

        sqlx::query(
            "INSERT INTO products (id, title, description, price, stock, created_by, is_deleted, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.title)
        .bind(data.description)
        .bind(data.price)
        .bind(data.stock)
        .bind(data.created_by.to_string())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::aus_sqlx(e, "Produkt"))?;

        Ok(ProduktRecord {
            id,
            title: data.title.to_string(),
            description: data.description.map(str::to_string),
            price: data.price,
            stock: data.stock,
            created_by: data.created_by,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<ProduktRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM products WHERE id = ? AND is_deleted = 0"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_produkt(&r)).transpose()
    }

    async fn update(&self, id: Uuid, data: ProduktUpdate) -> DbResult<ProduktRecord> {
        let mut sets: Vec<&str> = Vec::new();
        if data.title.is_some() {
            sets.push("title = ?");
        }
        if data.description.is_some() {
            sets.push("description = ?");
        }
        if data.price.is_some() {
            sets.push("price = ?");
        }
        if data.stock.is_some() {
            sets.push("stock = ?");
        }

        if sets.is_empty() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("Produkt {id}")));
        }
        sets.push("updated_at = ?");

        let sql = format!(
            "UPDATE products SET {} WHERE id = ? AND is_deleted = 0",
            sets.join(", ")
        );
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.title {
            q = q.bind(v);
        }
        if let Some(ref v) = data.description {
            q = q.bind(v.as_deref());
        }
        if let Some(v) = data.price {
            q = q.bind(v);
        }
        if let Some(v) = data.stock {
            q = q.bind(v);
        }
        q = q.bind(zeit_text(&jetzt()));
        q = q.bind(id.to_string());

        let affected = q
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::aus_sqlx(e, "Produkt"))?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Produkt {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Produkt nach Update nicht gefunden"))
    }

    async fn soft_delete(&self, id: Uuid) -> DbResult<bool> {
        let now = zeit_text(&jetzt());
        let affected = sqlx::query(
            "UPDATE products SET is_deleted = 1, deleted_at = ?, updated_at = ?
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    async fn list(
        &self,
        filter: &ProduktFilter,
        sortierung: ProduktSortierung,
        skip: u32,
        limit: u32,
    ) -> DbResult<Vec<ProduktRecord>> {
        let sql = format!(
            "SELECT {SPALTEN} FROM products {FILTER_SQL} ORDER BY {} LIMIT ? OFFSET ?",
            sortierung.als_sql()
        );
        let muster = suchmuster(filter);

        let rows = sqlx::query(&sql)
            .bind(filter.mit_geloeschten as i64)
            .bind(muster.as_deref())
            .bind(muster.as_deref())
            .bind(i64::from(limit))
            .bind(i64::from(skip))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_produkt).collect()
    }

    async fn count(&self, filter: &ProduktFilter) -> DbResult<u64> {
        use sqlx::Row as _;

        let sql = format!("SELECT COUNT(*) AS anzahl FROM products {FILTER_SQL}");
        let muster = suchmuster(filter);

        let row = sqlx::query(&sql)
            .bind(filter.mit_geloeschten as i64)
            .bind(muster.as_deref())
            .bind(muster.as_deref())
            .fetch_one(&self.pool)
            .await?;

        let anzahl: i64 = row.try_get("anzahl")?;
        Ok(anzahl.max(0) as u64)
    }
}

/// LIKE-Muster fuer die Titelsuche; `%` und `_` im Suchtext gelten woertlich
fn suchmuster(filter: &ProduktFilter) -> Option<String> {
    filter
        .suche
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}

fn row_to_produkt(row: &sqlx::sqlite::SqliteRow) -> DbResult<ProduktRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let created_by: String = row.try_get("created_by")?;
    let is_deleted: i64 = row.try_get("is_deleted")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(ProduktRecord {
        id: uuid_parsen(&id_str)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        stock: row.try_get("stock")?,
        created_by: uuid_parsen(&created_by)?,
        is_deleted: is_deleted != 0,
        deleted_at: optionale_zeit_parsen("deleted_at", row.try_get("deleted_at")?)?,
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
    })
}
