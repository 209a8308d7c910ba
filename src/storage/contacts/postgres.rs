//! PostgreSQL contact repository. All SQL text for contacts lives in this file.

use crate::domain::contact::now_utc;
use crate::domain::{
    ColumnValue, Contact, ContactError, ContactInput, ContactPage, ContactResult, PageRequest,
    PatchPlan, ValidationError,
};
use crate::infra::config::DatabaseSettings;
use crate::storage::contacts::{classify_storage_error, ContactRepository};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS contacts (
    id BIGSERIAL PRIMARY KEY,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    company VARCHAR(255),
    email VARCHAR(255) NOT NULL,
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT date_trunc('second', now()),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT date_trunc('second', now()),
    CONSTRAINT contacts_email_key UNIQUE (email)
)";

// Refreshes updated_at on any row change that did not assign it explicitly.
const TOUCH_FUNCTION_SQL: &str = "CREATE OR REPLACE FUNCTION contacts_touch_updated_at()
RETURNS trigger AS $$
BEGIN
    IF NEW.updated_at IS NOT DISTINCT FROM OLD.updated_at THEN
        NEW.updated_at := date_trunc('second', now());
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql";

const DROP_TRIGGER_SQL: &str = "DROP TRIGGER IF EXISTS contacts_touch_updated_at ON contacts";

const CREATE_TRIGGER_SQL: &str = "CREATE TRIGGER contacts_touch_updated_at
    BEFORE UPDATE ON contacts
    FOR EACH ROW EXECUTE FUNCTION contacts_touch_updated_at()";

/// Contact repository backed by a bounded `PgPool`.
#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the connection pool described by `settings`.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .max_lifetime(settings.max_lifetime)
            .acquire_timeout(settings.acquire_timeout)
            .connect(&settings.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `contacts` table and its `updated_at` trigger if missing.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        for sql in [
            CREATE_TABLE_SQL,
            TOUCH_FUNCTION_SQL,
            DROP_TRIGGER_SQL,
            CREATE_TRIGGER_SQL,
        ] {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Whether the `contacts` table exists in the current schema.
    pub async fn schema_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT to_regclass('contacts') IS NOT NULL")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count(&self) -> ContactResult<i64> {
        sqlx::query_scalar("SELECT count(*) FROM contacts")
            .fetch_one(&self.pool)
            .await
            .map_err(classify_storage_error)
    }

    /// Closes the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn map_row(row: PgRow) -> ContactResult<Contact> {
        let map = |row: PgRow| -> Result<Contact, sqlx::Error> {
            Ok(Contact {
                id: row.try_get("id")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                company: row.try_get("company")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        };
        map(row).map_err(classify_storage_error)
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, input: &ContactInput) -> ContactResult<Contact> {
        let now = now_utc();
        let row = sqlx::query(
            "INSERT INTO contacts (first_name, last_name, company, email, phone, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, first_name, last_name, company, email, phone, created_at, updated_at",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.company.as_deref())
        .bind(&input.email)
        .bind(input.phone.as_deref())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_storage_error)?;

        let contact = Self::map_row(row)?;
        tracing::debug!(id = contact.id, "contact created");
        Ok(contact)
    }

    async fn get_by_id(&self, id: i64) -> ContactResult<Contact> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, company, email, phone, created_at, updated_at
             FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify_storage_error)?
        .ok_or(ContactError::NotFound(id))?;

        Self::map_row(row)
    }

    async fn list(&self, page: PageRequest) -> ContactResult<ContactPage> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, company, email, phone, created_at, updated_at
             FROM contacts
             ORDER BY id
             LIMIT $1 OFFSET $2",
        )
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(classify_storage_error)?;

        let items = rows
            .into_iter()
            .map(Self::map_row)
            .collect::<ContactResult<Vec<_>>>()?;

        Ok(ContactPage {
            page: page.page(),
            page_size: page.page_size(),
            items,
        })
    }

    async fn update(&self, id: i64, input: &ContactInput) -> ContactResult<Contact> {
        let result = sqlx::query(
            "UPDATE contacts
             SET first_name = $1, last_name = $2, company = $3, email = $4, phone = $5, updated_at = $6
             WHERE id = $7",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.company.as_deref())
        .bind(&input.email)
        .bind(input.phone.as_deref())
        .bind(now_utc())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(classify_storage_error)?;

        tracing::debug!(id, rows = result.rows_affected(), "contact updated");
        if result.rows_affected() == 0 {
            return Err(ContactError::NotFound(id));
        }

        self.get_by_id(id).await
    }

    async fn patch(&self, plan: &PatchPlan) -> ContactResult<()> {
        if plan.assignments.is_empty() {
            return Err(ValidationError::EmptyPatch.into());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE contacts SET ");
        for (i, assignment) in plan.assignments.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(assignment.column.as_sql()).push(" = ");
            match &assignment.value {
                ColumnValue::Text(v) => {
                    qb.push_bind(v.clone());
                }
                ColumnValue::Null => {
                    qb.push_bind(None::<String>);
                }
                ColumnValue::Timestamp(ts) => {
                    qb.push_bind(*ts);
                }
            }
        }
        qb.push(" WHERE id = ").push_bind(plan.id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(classify_storage_error)?;

        tracing::debug!(id = plan.id, rows = result.rows_affected(), "contact patched");
        if result.rows_affected() == 0 {
            return Err(ContactError::NotFound(plan.id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> ContactResult<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify_storage_error)?;

        tracing::debug!(id, rows = result.rows_affected(), "contact deleted");
        if result.rows_affected() == 0 {
            return Err(ContactError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> ContactResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify_storage_error)?;
        Ok(())
    }
}
