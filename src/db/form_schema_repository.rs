use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};

use crate::models::form_schema::FormSchema;

#[async_trait]
pub trait FormSchemaRepository: Send + Sync {
    async fn find_schema(
        &self,
        customer_id: &str,
        form_id: &str,
    ) -> Result<Option<FormSchema>, sqlx::Error>;

    async fn upsert_schema(
        &self,
        customer_id: &str,
        form_id: &str,
        schema: &FormSchema,
    ) -> Result<(), sqlx::Error>;
}

pub struct PostgresFormSchemaRepository {
    pub pool: PgPool,
}

#[async_trait]
impl FormSchemaRepository for PostgresFormSchemaRepository {
    async fn find_schema(
        &self,
        customer_id: &str,
        form_id: &str,
    ) -> Result<Option<FormSchema>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT schema
            FROM form_schemas
            WHERE customer_id = $1 AND form_id = $2
            "#,
        )
        .bind(customer_id)
        .bind(form_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| row.try_get::<Json<FormSchema>, _>("schema"))
            .transpose()
            .map(|schema| schema.map(|Json(schema)| schema))
    }

    async fn upsert_schema(
        &self,
        customer_id: &str,
        form_id: &str,
        schema: &FormSchema,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO form_schemas (customer_id, form_id, schema, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (customer_id, form_id)
            DO UPDATE SET schema = EXCLUDED.schema, updated_at = now()
            "#,
        )
        .bind(customer_id)
        .bind(form_id)
        .bind(Json(schema))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
