//! PostgreSQL implementation of VisitStore.
//!
//! One row per visit in the `visits` table. Scalar fields get their own
//! columns so history and daily lookups can use indexes; the stops are kept
//! as a JSONB array of segment records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{ContactId, DomainError, ErrorCode, Timestamp, VisitId};
use crate::domain::visit::{SegmentRecord, Visit, VisitRecord, VisitStatus};
use crate::ports::VisitStore;

const SELECT_COLUMNS: &str = r#"
    SELECT id, visitor_name, company_or_phone, contact_id, status,
           check_in_time, check_out_time, scheduled_check_in_time, called_at,
           daily_sequence_number, card_number, primary_host, staff_name,
           staff_email, segments, created_at
    FROM visits
"#;

/// PostgreSQL implementation of VisitStore.
#[derive(Clone)]
pub struct PostgresVisitStore {
    pool: PgPool,
}

impl PostgresVisitStore {
    /// Creates a new PostgresVisitStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| db_error("run migrations", e))
    }
}

#[async_trait]
impl VisitStore for PostgresVisitStore {
    async fn list_visits(&self) -> Result<Vec<Visit>, DomainError> {
        let rows = sqlx::query(&format!("{} ORDER BY created_at", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list visits", e))?;

        rows.iter().map(row_to_visit).collect()
    }

    async fn list_visits_for_contact(&self, contact_id: &ContactId) -> Result<Vec<Visit>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE contact_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(contact_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list contact visits", e))?;

        rows.iter().map(row_to_visit).collect()
    }

    async fn get_visit(&self, id: &VisitId) -> Result<Option<Visit>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch visit", e))?;

        row.as_ref().map(row_to_visit).transpose()
    }

    async fn create_visit(&self, visit: &Visit) -> Result<Visit, DomainError> {
        let record = visit.to_record();
        sqlx::query(
            r#"
            INSERT INTO visits (
                id, visitor_name, company_or_phone, contact_id, status,
                check_in_time, check_out_time, scheduled_check_in_time, called_at,
                daily_sequence_number, card_number, primary_host, staff_name,
                staff_email, segments, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(visit.id().as_str())
        .bind(visit.visitor_name())
        .bind(visit.company_or_phone())
        .bind(visit.contact_id().map(|c| c.as_str()))
        .bind(visit.status().label())
        .bind(as_datetime(visit.check_in_time()))
        .bind(as_datetime(visit.check_out_time()))
        .bind(as_datetime(visit.scheduled_check_in_time()))
        .bind(as_datetime(visit.called_at()))
        .bind(visit.daily_sequence_number().map(|n| n as i32))
        .bind(visit.card_number())
        .bind(visit.primary_host())
        .bind(visit.staff_name())
        .bind(visit.staff_email())
        .bind(Json(&record.visit_segments))
        .bind(visit.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert visit", e))?;

        Ok(visit.clone())
    }

    async fn update_visit(&self, visit: &Visit) -> Result<Visit, DomainError> {
        let record = visit.to_record();
        let result = sqlx::query(
            r#"
            UPDATE visits SET
                visitor_name = $2,
                company_or_phone = $3,
                contact_id = $4,
                status = $5,
                check_in_time = $6,
                check_out_time = $7,
                scheduled_check_in_time = $8,
                called_at = $9,
                daily_sequence_number = $10,
                card_number = $11,
                primary_host = $12,
                staff_name = $13,
                staff_email = $14,
                segments = $15
            WHERE id = $1
            "#,
        )
        .bind(visit.id().as_str())
        .bind(visit.visitor_name())
        .bind(visit.company_or_phone())
        .bind(visit.contact_id().map(|c| c.as_str()))
        .bind(visit.status().label())
        .bind(as_datetime(visit.check_in_time()))
        .bind(as_datetime(visit.check_out_time()))
        .bind(as_datetime(visit.scheduled_check_in_time()))
        .bind(as_datetime(visit.called_at()))
        .bind(visit.daily_sequence_number().map(|n| n as i32))
        .bind(visit.card_number())
        .bind(visit.primary_host())
        .bind(visit.staff_name())
        .bind(visit.staff_email())
        .bind(Json(&record.visit_segments))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update visit", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(visit.id()));
        }
        Ok(visit.clone())
    }

    async fn delete_visit(&self, id: &VisitId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete visit", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn as_datetime(ts: Option<&Timestamp>) -> Option<DateTime<Utc>> {
    ts.map(|t| *t.as_datetime())
}

fn db_error(action: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

fn not_found(id: &VisitId) -> DomainError {
    DomainError::new(ErrorCode::VisitNotFound, format!("Visit not found: {}", id))
        .with_detail("visit_id", id.as_str())
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| db_error(&format!("read column {}", name), e))
}

fn rfc3339(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| Timestamp::from_datetime(dt).to_rfc3339())
}

fn row_to_visit(row: &PgRow) -> Result<Visit, DomainError> {
    let status: String = column(row, "status")?;
    let status = VisitStatus::from_label(&status).ok_or_else(|| {
        DomainError::new(ErrorCode::DatabaseError, format!("Unknown visit status: {}", status))
    })?;
    let segments: Json<Vec<SegmentRecord>> = column(row, "segments")?;
    let sequence: Option<i32> = column(row, "daily_sequence_number")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;

    let record = VisitRecord {
        id: column(row, "id")?,
        name: column(row, "visitor_name")?,
        company: column(row, "company_or_phone")?,
        host: column(row, "primary_host")?,
        status,
        scheduled_check_in: rfc3339(column(row, "scheduled_check_in_time")?),
        check_in: rfc3339(column(row, "check_in_time")?),
        check_out: rfc3339(column(row, "check_out_time")?),
        called_at: rfc3339(column(row, "called_at")?),
        card_number: column(row, "card_number")?,
        purpose: None,
        contact_id: column(row, "contact_id")?,
        daily_sequence_number: sequence.and_then(|n| u32::try_from(n).ok()),
        staff_email: column(row, "staff_email")?,
        staff_name: column(row, "staff_name")?,
        created_at: rfc3339(Some(created_at)),
        visit_segments: segments.0,
    };
    Visit::from_record(record)
}
