// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, StatusCount, UpcomingEvent},
        quotation::QuotationStatus,
    },
};

const UPCOMING_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resumo geral. `today` decide o que já conta como expirado.
    pub async fn get_summary(&self, today: NaiveDate) -> Result<DashboardSummary, AppError> {
        // Snapshot consistente dos números
        let mut tx = self.pool.begin().await?;

        let (clients,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clients")
            .fetch_one(&mut *tx)
            .await?;

        let (active_products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE active")
            .fetch_one(&mut *tx)
            .await?;

        // Mesmo critério de QuotationStatus::effective, só que no banco
        let rows: Vec<(QuotationStatus, i64)> = sqlx::query_as(
            r#"
            SELECT
                CASE WHEN status IN ('draft', 'sent') AND valid_until < $1
                     THEN 'expired'::quotation_status
                     ELSE status
                END AS effective_status,
                COUNT(*)
            FROM quotations
            GROUP BY 1
            "#,
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        let (accepted_value,): (Option<Decimal>,) =
            sqlx::query_as("SELECT SUM(total) FROM quotations WHERE status = 'accepted'")
                .fetch_one(&mut *tx)
                .await?;

        let (open_orders,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status NOT IN ('completed', 'cancelled')")
                .fetch_one(&mut *tx)
                .await?;

        let upcoming_events = sqlx::query_as::<_, UpcomingEvent>(
            r#"
            SELECT q.id AS quotation_id, q.number, q.event_name, q.event_date,
                   COALESCE(c.company, c.name) AS client_name, q.status, q.total
            FROM quotations q
            JOIN clients c ON c.id = q.client_id
            WHERE q.event_date >= $1
              AND (q.status = 'accepted' OR (q.status IN ('draft', 'sent') AND q.valid_until >= $1))
            ORDER BY q.event_date, q.start_time NULLS LAST
            LIMIT $2
            "#,
        )
        .bind(today)
        .bind(UPCOMING_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            clients,
            active_products,
            quotations_by_status: fill_status_counts(rows),
            accepted_value: accepted_value.unwrap_or(Decimal::ZERO),
            open_orders,
            upcoming_events,
        })
    }
}

// Todos os status aparecem, mesmo com zero, na ordem da tabela de estados.
fn fill_status_counts(rows: Vec<(QuotationStatus, i64)>) -> Vec<StatusCount> {
    QuotationStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: rows.iter().filter(|(s, _)| s == status).map(|(_, c)| *c).sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_statuses_are_reported_as_zero() {
        let counts = fill_status_counts(vec![(QuotationStatus::Sent, 3), (QuotationStatus::Expired, 1)]);

        assert_eq!(counts.len(), QuotationStatus::ALL.len());
        assert_eq!(counts[0].status, QuotationStatus::Draft);
        assert_eq!(counts[0].count, 0);
        assert_eq!(counts[1].count, 3);
        assert_eq!(counts[4].count, 1);
    }
}
