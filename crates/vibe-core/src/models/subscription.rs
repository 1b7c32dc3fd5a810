use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Subscription tier with its limits
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[schema(value_type = f64)]
    pub price_monthly: Decimal,
    #[schema(value_type = f64)]
    pub price_yearly: Decimal,
    /// List of feature descriptions
    pub features: serde_json::Value,
    /// -1 for unlimited
    pub max_projects: i32,
    pub max_storage_gb: f64,
    /// Minutes, -1 for unlimited
    pub max_video_length: i32,
    pub max_resolution: String,
    pub allows_white_labeling: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// Seed definition for a plan row
#[derive(Debug, Clone)]
pub struct PlanSeed {
    pub name: &'static str,
    pub display_name: &'static str,
    pub price_monthly: Decimal,
    pub price_yearly: Decimal,
    pub features: &'static [&'static str],
    pub max_projects: i32,
    pub max_storage_gb: f64,
    pub max_video_length: i32,
    pub max_resolution: &'static str,
    pub allows_white_labeling: bool,
}

/// The four plans every installation starts with.
pub fn default_plans() -> Vec<PlanSeed> {
    vec![
        PlanSeed {
            name: "free",
            display_name: "Free",
            price_monthly: Decimal::ZERO,
            price_yearly: Decimal::ZERO,
            features: &[
                "5 projects",
                "720p max resolution",
                "5 minutes max video length",
                "Basic effects only",
                "Watermarked exports",
            ],
            max_projects: 5,
            max_storage_gb: 1.0,
            max_video_length: 5,
            max_resolution: "720p",
            allows_white_labeling: false,
        },
        PlanSeed {
            name: "basic",
            display_name: "Basic",
            price_monthly: Decimal::new(999, 2),
            price_yearly: Decimal::new(9999, 2),
            features: &[
                "Unlimited projects",
                "1080p resolution",
                "15 minutes max video length",
                "All standard effects",
                "No watermark",
            ],
            max_projects: -1,
            max_storage_gb: 10.0,
            max_video_length: 15,
            max_resolution: "1080p",
            allows_white_labeling: false,
        },
        PlanSeed {
            name: "pro",
            display_name: "Pro",
            price_monthly: Decimal::new(1999, 2),
            price_yearly: Decimal::new(19999, 2),
            features: &[
                "Unlimited projects",
                "4K resolution",
                "Unlimited video length",
                "All premium effects",
                "AI-powered editing",
                "Priority support",
            ],
            max_projects: -1,
            max_storage_gb: 50.0,
            max_video_length: -1,
            max_resolution: "4k",
            allows_white_labeling: false,
        },
        PlanSeed {
            name: "enterprise",
            display_name: "Enterprise",
            price_monthly: Decimal::new(4999, 2),
            price_yearly: Decimal::new(49999, 2),
            features: &[
                "Unlimited projects",
                "8K resolution",
                "Unlimited video length",
                "All premium effects",
                "AI-powered editing",
                "Team collaboration",
                "White labeling",
                "Dedicated support",
            ],
            max_projects: -1,
            max_storage_gb: 200.0,
            max_video_length: -1,
            max_resolution: "8k",
            allows_white_labeling: true,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
            TransactionStatus::Refunded => write!(f, "refunded"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub subscription_plan_id: i64,
    pub amount: Decimal,
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub transaction_date: DateTime<Utc>,
}

/// Transaction joined with its plan's display name
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TransactionSummary {
    pub id: i64,
    pub plan_name: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub status: TransactionStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub plan_id: Option<i64>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}
