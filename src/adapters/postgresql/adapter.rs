//! PostgreSQL adapter implementing the target and state traits
//!
//! Every table batch runs in one transaction. Rows are written with
//! `INSERT .. ON CONFLICT (<natural key>)`: `DO NOTHING` for insert-only
//! batches, `DO UPDATE .. WHERE .. IS DISTINCT FROM ..` for upserts, so an
//! unchanged row is neither rewritten nor counted as updated. `RETURNING
//! (xmax = 0)` tells a fresh insert apart from an update.

use crate::adapters::database::traits::{BatchOutcome, StateStorage, TargetStore};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    film_actor_pair, film_category_pair, PostgreSQLFactPayment, PostgreSQLFactRental,
    PostgreSQLWatermark,
};
use crate::core::state::watermark::Watermark;
use crate::domain::target::{DimDate, KeyMap, TargetBatch, WriteMode};
use crate::domain::{Result, StarsyncError, SurrogateKey, SyncTable, TargetError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_postgres::Row;

const FILM_COLUMNS: &[&str] = &[
    "film_id",
    "title",
    "rating",
    "length",
    "language",
    "release_year",
    "last_update",
];
const ACTOR_COLUMNS: &[&str] = &["actor_id", "first_name", "last_name", "last_update"];
const CATEGORY_COLUMNS: &[&str] = &["category_id", "name", "last_update"];
const STORE_COLUMNS: &[&str] = &["store_id", "city", "country", "last_update"];
const CUSTOMER_COLUMNS: &[&str] = &[
    "customer_id",
    "first_name",
    "last_name",
    "active",
    "city",
    "country",
    "last_update",
];
const RENTAL_COLUMNS: &[&str] = &[
    "rental_id",
    "date_key_rented",
    "date_key_returned",
    "film_key",
    "store_key",
    "customer_key",
    "staff_id",
    "rental_duration_days",
];
const PAYMENT_COLUMNS: &[&str] = &[
    "payment_id",
    "date_key_paid",
    "customer_key",
    "store_key",
    "staff_id",
    "amount",
];

/// Builds the write statement for a keyed table
///
/// `columns[0]` is the natural key.
fn upsert_sql(table: &str, columns: &[&str], mode: WriteMode) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    let key = columns[0];
    let mut sql = format!(
        "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT ({key}) ",
        columns.join(", "),
        placeholders.join(", ")
    );

    match mode {
        WriteMode::InsertOnly => sql.push_str("DO NOTHING"),
        WriteMode::Upsert => {
            let attributes = &columns[1..];
            let assignments: Vec<String> = attributes
                .iter()
                .map(|c| format!("{c} = EXCLUDED.{c}"))
                .collect();
            let current: Vec<String> = attributes.iter().map(|c| format!("{table}.{c}")).collect();
            let incoming: Vec<String> = attributes.iter().map(|c| format!("EXCLUDED.{c}")).collect();
            sql.push_str(&format!(
                "DO UPDATE SET {} WHERE ({}) IS DISTINCT FROM ({})",
                assignments.join(", "),
                current.join(", "),
                incoming.join(", ")
            ));
        }
    }

    sql.push_str(" RETURNING (xmax = 0) AS inserted");
    sql
}

/// Builds the insert-only statement for a bridge table
fn bridge_sql(table: &str, left: &str, right: &str) -> String {
    format!(
        "INSERT INTO {table} ({left}, {right}) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING RETURNING true AS inserted"
    )
}

/// Natural key and surrogate key columns of a dimension
fn dimension_columns(table: SyncTable) -> Option<(&'static str, &'static str)> {
    match table {
        SyncTable::Film => Some(("film_id", "film_key")),
        SyncTable::Actor => Some(("actor_id", "actor_key")),
        SyncTable::Category => Some(("category_id", "category_key")),
        SyncTable::Store => Some(("store_id", "store_key")),
        SyncTable::Customer => Some(("customer_id", "customer_key")),
        _ => None,
    }
}

fn tally(outcome: &mut BatchOutcome, returned: &[Row]) {
    match returned.first() {
        None => outcome.skipped += 1,
        Some(row) if row.get::<_, bool>("inserted") => outcome.inserted += 1,
        Some(_) => outcome.updated += 1,
    }
}

/// PostgreSQL implementation of the target and state traits
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    async fn write_batch(
        tx: &deadpool_postgres::Transaction<'_>,
        batch: &TargetBatch,
        mode: WriteMode,
    ) -> std::result::Result<BatchOutcome, tokio_postgres::Error> {
        let mut outcome = BatchOutcome::default();

        match batch {
            TargetBatch::Films(rows) => {
                let stmt = tx.prepare(&upsert_sql("dim_film", FILM_COLUMNS, mode)).await?;
                for r in rows {
                    let returned = tx
                        .query(
                            &stmt,
                            &[
                                &r.film_id,
                                &r.title,
                                &r.rating,
                                &r.length,
                                &r.language,
                                &r.release_year,
                                &r.last_update,
                            ],
                        )
                        .await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::Actors(rows) => {
                let stmt = tx.prepare(&upsert_sql("dim_actor", ACTOR_COLUMNS, mode)).await?;
                for r in rows {
                    let returned = tx
                        .query(&stmt, &[&r.actor_id, &r.first_name, &r.last_name, &r.last_update])
                        .await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::Categories(rows) => {
                let stmt = tx
                    .prepare(&upsert_sql("dim_category", CATEGORY_COLUMNS, mode))
                    .await?;
                for r in rows {
                    let returned = tx
                        .query(&stmt, &[&r.category_id, &r.name, &r.last_update])
                        .await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::Stores(rows) => {
                let stmt = tx.prepare(&upsert_sql("dim_store", STORE_COLUMNS, mode)).await?;
                for r in rows {
                    let returned = tx
                        .query(&stmt, &[&r.store_id, &r.city, &r.country, &r.last_update])
                        .await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::Customers(rows) => {
                let stmt = tx
                    .prepare(&upsert_sql("dim_customer", CUSTOMER_COLUMNS, mode))
                    .await?;
                for r in rows {
                    let returned = tx
                        .query(
                            &stmt,
                            &[
                                &r.customer_id,
                                &r.first_name,
                                &r.last_name,
                                &r.active,
                                &r.city,
                                &r.country,
                                &r.last_update,
                            ],
                        )
                        .await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::FilmActors(pairs) => {
                let stmt = tx
                    .prepare(&bridge_sql("bridge_film_actor", "film_key", "actor_key"))
                    .await?;
                for pair in pairs {
                    let (film_key, actor_key) = film_actor_pair(pair);
                    let returned = tx.query(&stmt, &[&film_key, &actor_key]).await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::FilmCategories(pairs) => {
                let stmt = tx
                    .prepare(&bridge_sql("bridge_film_category", "film_key", "category_key"))
                    .await?;
                for pair in pairs {
                    let (film_key, category_key) = film_category_pair(pair);
                    let returned = tx.query(&stmt, &[&film_key, &category_key]).await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::Rentals(rows) => {
                let stmt = tx
                    .prepare(&upsert_sql("fact_rental", RENTAL_COLUMNS, mode))
                    .await?;
                for row in rows {
                    let r = PostgreSQLFactRental::from_domain(row);
                    let returned = tx
                        .query(
                            &stmt,
                            &[
                                &r.rental_id,
                                &r.date_key_rented,
                                &r.date_key_returned,
                                &r.film_key,
                                &r.store_key,
                                &r.customer_key,
                                &r.staff_id,
                                &r.rental_duration_days,
                            ],
                        )
                        .await?;
                    tally(&mut outcome, &returned);
                }
            }
            TargetBatch::Payments(rows) => {
                let stmt = tx
                    .prepare(&upsert_sql("fact_payment", PAYMENT_COLUMNS, mode))
                    .await?;
                for row in rows {
                    let p = PostgreSQLFactPayment::from_domain(row);
                    let returned = tx
                        .query(
                            &stmt,
                            &[
                                &p.payment_id,
                                &p.date_key_paid,
                                &p.customer_key,
                                &p.store_key,
                                &p.staff_id,
                                &p.amount,
                            ],
                        )
                        .await?;
                    tally(&mut outcome, &returned);
                }
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl TargetStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn calendar_seeded(&self) -> Result<bool> {
        let rows = self
            .client
            .query("SELECT EXISTS (SELECT 1 FROM dim_date) AS seeded", &[])
            .await?;
        Ok(rows.first().map(|r| r.get::<_, bool>("seeded")).unwrap_or(false))
    }

    async fn insert_calendar(&self, days: &[DimDate]) -> Result<u64> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| TargetError::TransactionFailed(e.to_string()))?;

        let insert = r#"
            INSERT INTO dim_date (
                date_key, date, year, quarter, month, day_of_month, day_of_week, is_weekend
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (date_key) DO NOTHING
        "#;
        let stmt = tx
            .prepare(insert)
            .await
            .map_err(|e| StarsyncError::batch_write("dim_date", e))?;

        let mut inserted = 0;
        for day in days {
            inserted += tx
                .execute(
                    &stmt,
                    &[
                        &day.date_key.value(),
                        &day.date,
                        &day.year,
                        &day.quarter,
                        &day.month,
                        &day.day_of_month,
                        &day.day_of_week,
                        &day.is_weekend,
                    ],
                )
                .await
                .map_err(|e| StarsyncError::batch_write("dim_date", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| StarsyncError::batch_write("dim_date", e))?;
        Ok(inserted)
    }

    async fn dimension_keys(&self, table: SyncTable) -> Result<KeyMap> {
        let Some((natural, surrogate)) = dimension_columns(table) else {
            return Ok(KeyMap::new());
        };

        let query = format!(
            "SELECT {natural}, {surrogate} FROM {}",
            table.target_table()
        );
        let rows = self.client.query(&query, &[]).await?;

        Ok(rows
            .iter()
            .map(|row| {
                (
                    row.get::<_, i32>(0),
                    SurrogateKey::new(row.get::<_, i32>(1)),
                )
            })
            .collect())
    }

    async fn apply_batch(&self, batch: &TargetBatch, mode: WriteMode) -> Result<BatchOutcome> {
        let table = batch.table().target_table();
        let mode = if batch.table().is_bridge() {
            WriteMode::InsertOnly
        } else {
            mode
        };

        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| TargetError::TransactionFailed(e.to_string()))?;

        // Dropping `tx` on error rolls the batch back.
        let outcome = Self::write_batch(&tx, batch, mode)
            .await
            .map_err(|e| StarsyncError::batch_write(table, e))?;

        tx.commit()
            .await
            .map_err(|e| StarsyncError::batch_write(table, e))?;

        tracing::debug!(
            table = table,
            rows = batch.len(),
            inserted = outcome.inserted,
            updated = outcome.updated,
            skipped = outcome.skipped,
            "Batch committed to PostgreSQL"
        );

        Ok(outcome)
    }

    async fn count_rows(&self, table: SyncTable) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table.target_table());
        let rows = self.client.query(&query, &[]).await?;
        Ok(rows.first().map(|r| r.get::<_, i64>(0)).unwrap_or(0) as u64)
    }

    async fn payment_total(&self) -> Result<Decimal> {
        let rows = self
            .client
            .query("SELECT COALESCE(SUM(amount), 0) FROM fact_payment", &[])
            .await?;
        Ok(rows
            .first()
            .map(|r| r.get::<_, Decimal>(0))
            .unwrap_or(Decimal::ZERO))
    }

    async fn payment_totals_by_store(&self) -> Result<BTreeMap<i32, Decimal>> {
        let query = r#"
            SELECT s.store_id, SUM(p.amount)
            FROM fact_payment p
            JOIN dim_store s ON s.store_key = p.store_key
            GROUP BY s.store_id
        "#;
        let rows = self.client.query(query, &[]).await?;
        Ok(rows
            .iter()
            .map(|r| (r.get::<_, i32>(0), r.get::<_, Decimal>(1)))
            .collect())
    }

    async fn close(&self) -> Result<()> {
        self.client.close();
        Ok(())
    }
}

#[async_trait]
impl StateStorage for PostgreSQLAdapter {
    async fn load_watermark(&self, table: SyncTable) -> Result<Option<Watermark>> {
        let query = "SELECT table_name, last_updated FROM sync_state WHERE table_name = $1";
        let rows = self.client.query(query, &[&table.as_str()]).await?;

        match rows.first() {
            Some(row) => {
                let pg_watermark = PostgreSQLWatermark {
                    table_name: row.get("table_name"),
                    last_updated: row.get("last_updated"),
                };
                Ok(Some(pg_watermark.to_domain()?))
            }
            None => {
                tracing::debug!(table = %table, "No watermark found (first sync)");
                Ok(None)
            }
        }
    }

    async fn save_watermark(&self, watermark: &Watermark) -> Result<()> {
        let pg_watermark = PostgreSQLWatermark::from_domain(watermark);

        let upsert_query = r#"
            INSERT INTO sync_state (table_name, last_updated)
            VALUES ($1, $2)
            ON CONFLICT (table_name) DO UPDATE SET
                last_updated = EXCLUDED.last_updated
        "#;

        self.client
            .execute(
                upsert_query,
                &[&pg_watermark.table_name, &pg_watermark.last_updated],
            )
            .await?;

        Ok(())
    }

    async fn get_all_watermarks(&self) -> Result<Vec<Watermark>> {
        let query = "SELECT table_name, last_updated FROM sync_state ORDER BY table_name";
        let rows = self.client.query(query, &[]).await?;

        let mut watermarks = Vec::new();
        for row in rows {
            let pg_watermark = PostgreSQLWatermark {
                table_name: row.get("table_name"),
                last_updated: row.get("last_updated"),
            };
            match pg_watermark.to_domain() {
                Ok(watermark) => watermarks.push(watermark),
                Err(e) => tracing::warn!(error = %e, "Skipping sync_state row"),
            }
        }

        watermarks.sort_by_key(|w| w.table);
        Ok(watermarks)
    }
}
