use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use vibe_core::{
    models::{default_plans, SubscriptionPlan, Transaction, TransactionStatus, TransactionSummary},
    AppError,
};

use crate::db::transaction::TransactionGuard;

const PLAN_COLUMNS: &str = "id, name, display_name, price_monthly, price_yearly, features, max_projects, max_storage_gb, max_video_length, max_resolution, allows_white_labeling, created_at";

/// Repository for subscription plans and payment transactions
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "select"))]
    pub async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, AppError> {
        let plans = sqlx::query_as::<Postgres, SubscriptionPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM subscription_plans ORDER BY price_monthly ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "select", db.record_id = %id))]
    pub async fn get_plan(&self, id: i64) -> Result<Option<SubscriptionPlan>, AppError> {
        let plan = sqlx::query_as::<Postgres, SubscriptionPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM subscription_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "count"))]
    pub async fn count_plans(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM subscription_plans")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Insert the default plans when the table is empty. Returns how many rows were inserted.
    #[tracing::instrument(skip(self), fields(db.table = "subscription_plans", db.operation = "insert"))]
    pub async fn seed_default_plans(&self) -> Result<usize, AppError> {
        if self.count_plans().await? > 0 {
            return Ok(0);
        }

        let plans = default_plans();
        let mut tx = TransactionGuard::begin(&self.pool).await?;
        for plan in &plans {
            sqlx::query(
                r#"
                INSERT INTO subscription_plans (
                    name, display_name, price_monthly, price_yearly, features,
                    max_projects, max_storage_gb, max_video_length, max_resolution,
                    allows_white_labeling
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(plan.name)
            .bind(plan.display_name)
            .bind(plan.price_monthly)
            .bind(plan.price_yearly)
            .bind(serde_json::json!(plan.features))
            .bind(plan.max_projects)
            .bind(plan.max_storage_gb)
            .bind(plan.max_video_length)
            .bind(plan.max_resolution)
            .bind(plan.allows_white_labeling)
            .execute(&mut **tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(count = plans.len(), "Seeded default subscription plans");
        Ok(plans.len())
    }

    /// Record a completed payment and move the user onto the plan, atomically.
    ///
    /// Returns `AppError::Conflict` when the transaction id was already recorded.
    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.operation = "insert"))]
    pub async fn subscribe(
        &self,
        user_id: i64,
        plan: &SubscriptionPlan,
        amount: Decimal,
        transaction_id: &str,
    ) -> Result<Transaction, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let transaction = sqlx::query_as::<Postgres, Transaction>(
            r#"
            INSERT INTO transactions (user_id, subscription_plan_id, amount, transaction_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, subscription_plan_id, amount, transaction_id, status, transaction_date
            "#,
        )
        .bind(user_id)
        .bind(plan.id)
        .bind(amount)
        .bind(transaction_id)
        .bind(TransactionStatus::Completed)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("Transaction already recorded".to_string())
            }
            other => other,
        })?;

        sqlx::query("UPDATE users SET subscription_plan = $2 WHERE id = $1")
            .bind(user_id)
            .bind(&plan.name)
            .execute(&mut **tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = user_id,
            plan = %plan.name,
            transaction = transaction.id,
            "Subscription recorded"
        );
        Ok(transaction)
    }

    /// Transactions for a user with the plan's display name, newest first
    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.operation = "select"))]
    pub async fn list_transactions(
        &self,
        user_id: i64,
    ) -> Result<Vec<TransactionSummary>, AppError> {
        let transactions = sqlx::query_as::<Postgres, TransactionSummary>(
            r#"
            SELECT t.id, p.display_name AS plan_name, t.amount, t.transaction_date, t.status
            FROM transactions t
            JOIN subscription_plans p ON p.id = t.subscription_plan_id
            WHERE t.user_id = $1
            ORDER BY t.transaction_date DESC, t.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}
