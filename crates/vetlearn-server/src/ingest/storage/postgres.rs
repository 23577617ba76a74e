// PostgreSQL ingest store

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use vetlearn_common::types::{ComponentKind, ProcessedFlag};

use super::{IngestStore, StoreError, StoreResult};
use crate::ingest::models::{
    ComponentRecord, PackageRecord, ParsedCriterion, ParsedElement, ReplaceSummary, UnitRecord,
};

/// sqlx-backed store over the catalog tables
#[derive(Clone)]
pub struct PgIngestStore {
    db: PgPool,
}

impl PgIngestStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    /// Shared upsert for the two package-owned metadata tables
    async fn upsert_component(
        &self,
        kind: ComponentKind,
        record: &ComponentRecord,
    ) -> StoreResult<i64> {
        // Table names come from a closed enum, never from input
        let sql = format!(
            r#"
            INSERT INTO {table} AS t (
                code, training_package_id, title, description, status,
                release_date, xml_file, processed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'N')
            ON CONFLICT (code) DO UPDATE SET
                training_package_id = EXCLUDED.training_package_id,
                title = EXCLUDED.title,
                description = COALESCE(EXCLUDED.description, t.description),
                status = COALESCE(EXCLUDED.status, t.status),
                release_date = COALESCE(EXCLUDED.release_date, t.release_date),
                xml_file = COALESCE(EXCLUDED.xml_file, t.xml_file),
                processed = 'N',
                updated_at = NOW()
            RETURNING id
            "#,
            table = kind.table_name()
        );

        let id: i64 = sqlx::query_scalar(&sql)
            .bind(&record.code)
            .bind(record.training_package_id)
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.status)
            .bind(record.release_date)
            .bind(&record.xml_file)
            .fetch_one(&self.db)
            .await?;

        debug!(kind = %kind, code = %record.code, id, "Upserted component");
        Ok(id)
    }

    async fn insert_elements(
        tx: &mut Transaction<'_, Postgres>,
        unit_id: i64,
        elements: &[ParsedElement],
    ) -> StoreResult<ReplaceSummary> {
        let mut summary = ReplaceSummary::default();

        for element in elements {
            let element_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO unit_elements (unit_id, element_num, element_text)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(unit_id)
            .bind(&element.element_number)
            .bind(&element.element_text)
            .fetch_one(&mut **tx)
            .await?;
            summary.elements += 1;

            for pc in &element.performance_criteria {
                sqlx::query(
                    r#"
                    INSERT INTO unit_performance_criteria (element_id, unit_id, pc_num, pc_text)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(element_id)
                .bind(unit_id)
                .bind(&pc.pc_number)
                .bind(&pc.pc_text)
                .execute(&mut **tx)
                .await?;
                summary.criteria += 1;
            }
        }

        Ok(summary)
    }
}

#[async_trait]
impl IngestStore for PgIngestStore {
    #[tracing::instrument(skip(self, record), fields(code = %record.code))]
    async fn upsert_training_package(&self, record: &PackageRecord) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO training_packages AS t (
                code, title, description, status, release_date, xml_file, processed
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'N')
            ON CONFLICT (code) DO UPDATE SET
                title = EXCLUDED.title,
                description = COALESCE(EXCLUDED.description, t.description),
                status = COALESCE(EXCLUDED.status, t.status),
                release_date = COALESCE(EXCLUDED.release_date, t.release_date),
                xml_file = COALESCE(EXCLUDED.xml_file, t.xml_file),
                processed = 'N',
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(&record.code)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.status)
        .bind(record.release_date)
        .bind(&record.xml_file)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    async fn upsert_qualification(&self, record: &ComponentRecord) -> StoreResult<i64> {
        self.upsert_component(ComponentKind::Qualification, record).await
    }

    async fn upsert_skillset(&self, record: &ComponentRecord) -> StoreResult<i64> {
        self.upsert_component(ComponentKind::Skillset, record).await
    }

    #[tracing::instrument(skip(self, record), fields(code = %record.code))]
    async fn upsert_unit(&self, record: &UnitRecord) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO units AS t (
                code, training_package_id, title, description, status,
                release_date, xml_file, assessment_requirements_file, processed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'N')
            ON CONFLICT (code) DO UPDATE SET
                training_package_id = COALESCE(EXCLUDED.training_package_id, t.training_package_id),
                title = EXCLUDED.title,
                description = COALESCE(EXCLUDED.description, t.description),
                status = COALESCE(EXCLUDED.status, t.status),
                release_date = COALESCE(EXCLUDED.release_date, t.release_date),
                xml_file = COALESCE(EXCLUDED.xml_file, t.xml_file),
                assessment_requirements_file =
                    COALESCE(EXCLUDED.assessment_requirements_file, t.assessment_requirements_file),
                processed = 'N',
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(&record.code)
        .bind(record.training_package_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.status)
        .bind(record.release_date)
        .bind(&record.xml_file)
        .bind(&record.assessment_requirements_file)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    async fn find_package_id_for_unit(&self, unit_code: &str) -> StoreResult<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM training_packages
            WHERE left($1, length(code)) = code
            ORDER BY length(code) DESC
            LIMIT 1
            "#,
        )
        .bind(unit_code)
        .fetch_optional(&self.db)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self, elements), fields(elements = elements.len()))]
    async fn replace_unit_elements(
        &self,
        unit_id: i64,
        elements: &[ParsedElement],
    ) -> StoreResult<ReplaceSummary> {
        let mut tx = self.db.begin().await?;

        // Serializes concurrent replacements of the same unit
        let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM units WHERE id = $1 FOR UPDATE")
            .bind(unit_id)
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            warn!(unit_id, "Unit row missing, nothing replaced");
            return Err(StoreError::NotFound(format!("Unit {} not found", unit_id)));
        }

        sqlx::query("DELETE FROM unit_performance_criteria WHERE unit_id = $1")
            .bind(unit_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM unit_elements WHERE unit_id = $1")
            .bind(unit_id)
            .execute(&mut *tx)
            .await?;

        let summary = Self::insert_elements(&mut tx, unit_id, elements).await?;

        sqlx::query("UPDATE units SET processed = 'Y', updated_at = NOW() WHERE id = $1")
            .bind(unit_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            unit_id,
            elements = summary.elements,
            criteria = summary.criteria,
            "Replaced unit elements"
        );
        Ok(summary)
    }

    async fn store_assessment_requirements(&self, unit_id: i64, xml: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE units SET assessment_requirements_xml = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(unit_id)
        .bind(xml)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Unit {} not found", unit_id)));
        }
        Ok(())
    }

    async fn unit_elements(&self, unit_id: i64) -> StoreResult<Vec<ParsedElement>> {
        let rows: Vec<(i64, String, String, Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT e.id, e.element_num, e.element_text, pc.pc_num, pc.pc_text
            FROM unit_elements e
            LEFT JOIN unit_performance_criteria pc ON pc.element_id = e.id
            WHERE e.unit_id = $1
            ORDER BY e.id, pc.id
            "#,
        )
        .bind(unit_id)
        .fetch_all(&self.db)
        .await?;

        let mut elements: Vec<ParsedElement> = Vec::new();
        let mut current_id = None;

        for (element_id, element_num, element_text, pc_num, pc_text) in rows {
            if current_id != Some(element_id) {
                elements.push(ParsedElement::new(element_num, element_text));
                current_id = Some(element_id);
            }
            if let (Some(number), Some(text), Some(open)) = (pc_num, pc_text, elements.last_mut()) {
                open.performance_criteria.push(ParsedCriterion {
                    pc_number: number,
                    pc_text: text,
                });
            }
        }

        Ok(elements)
    }

    async fn processed_status(
        &self,
        kind: ComponentKind,
        codes: &[String],
    ) -> StoreResult<HashMap<String, ProcessedFlag>> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT code, processed FROM {} WHERE code = ANY($1)",
            kind.table_name()
        );
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .bind(codes)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(code, flag)| {
                let flag = flag.parse().unwrap_or_default();
                (code, flag)
            })
            .collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
