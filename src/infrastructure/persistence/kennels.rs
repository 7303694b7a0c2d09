use crate::domain::entities::Kennel;
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::kennel_repository::KennelRepository;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

const KENNEL_COLUMNS: &str =
    "id, name, capacity, building, floor, is_active, archived_at, created_at, updated_at";

fn kennel_from_row(row: &SqliteRow) -> EngineResult<Kennel> {
    let capacity: i64 = row.try_get("capacity")?;
    Ok(Kennel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        capacity: u32::try_from(capacity).map_err(|_| {
            EngineError::Internal(format!("Stored capacity {} is out of range", capacity))
        })?,
        building: row.try_get("building")?,
        floor: row.try_get("floor")?,
        is_active: row.try_get("is_active")?,
        archived_at: row.try_get("archived_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl KennelRepository for Database {
    async fn create_kennel(&self, kennel: &Kennel) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO kennels (id, name, capacity, building, floor, is_active, archived_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&kennel.id)
        .bind(&kennel.name)
        .bind(kennel.capacity as i64)
        .bind(&kennel.building)
        .bind(&kennel.floor)
        .bind(kennel.is_active)
        .bind(&kennel.archived_at)
        .bind(&kennel.created_at)
        .bind(&kennel.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Kennel row inserted: id={}", kennel.id);
        Ok(())
    }

    async fn get_kennel(&self, id: &str) -> EngineResult<Option<Kennel>> {
        let row = sqlx::query(&format!("SELECT {} FROM kennels WHERE id = ?", KENNEL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(kennel_from_row).transpose()
    }

    async fn list_kennels(&self) -> EngineResult<Vec<Kennel>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM kennels
             WHERE archived_at IS NULL
             ORDER BY building, floor, name, id",
            KENNEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(kennel_from_row).collect()
    }

    async fn update_kennel(&self, kennel: &Kennel) -> EngineResult<()> {
        let result = sqlx::query(
            "UPDATE kennels
             SET name = ?, capacity = ?, building = ?, floor = ?, is_active = ?, archived_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&kennel.name)
        .bind(kennel.capacity as i64)
        .bind(&kennel.building)
        .bind(&kennel.floor)
        .bind(kennel.is_active)
        .bind(&kennel.archived_at)
        .bind(&kennel.updated_at)
        .bind(&kennel.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("Kennel {} not found", kennel.id)));
        }
        Ok(())
    }

    async fn delete_kennel(&self, id: &str) -> EngineResult<()> {
        let referenced: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM segments WHERE kennel_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if referenced > 0 {
            return Err(EngineError::Guard(format!(
                "Kennel {} is still referenced by segments",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM kennels WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("Kennel {} not found", id)));
        }
        Ok(())
    }
}
