//! Plans, subscribing and payment history

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use vibe_core::models::{SubscribeRequest, SubscriptionPlan, TransactionSummary};
use vibe_core::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscribedResponse {
    pub msg: &'static str,
    /// Row id of the recorded transaction
    pub transaction_id: i64,
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/subscription_plans",
    tag = "subscriptions",
    responses(
        (status = 200, description = "All plans, cheapest first", body = Vec<SubscriptionPlan>)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_plans(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let plans = state.db.subscriptions.list_plans().await?;
    Ok(Json(plans))
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/subscribe",
    tag = "subscriptions",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscription recorded", body = SubscribedResponse),
        (status = 400, description = "Missing required subscription data", body = ErrorResponse),
        (status = 404, description = "Subscription plan not found", body = ErrorResponse),
        (status = 409, description = "Transaction already recorded", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SubscribeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let transaction_id = request
        .transaction_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let (Some(plan_id), Some(amount), Some(transaction_id)) =
        (request.plan_id, request.amount, transaction_id)
    else {
        return Err(
            AppError::BadRequest("Missing required subscription data".to_string()).into(),
        );
    };
    if amount < Decimal::ZERO {
        return Err(AppError::BadRequest("Amount must not be negative".to_string()).into());
    }

    let plan = state
        .db
        .subscriptions
        .get_plan(plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))?;

    let transaction = state
        .db
        .subscriptions
        .subscribe(auth.user_id, &plan, amount.round_dp(2), transaction_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscribedResponse {
            msg: "Subscription successful",
            transaction_id: transaction.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/transactions",
    tag = "subscriptions",
    responses(
        (status = 200, description = "The caller's transactions, newest first", body = Vec<TransactionSummary>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let transactions = state.db.subscriptions.list_transactions(auth.user_id).await?;
    Ok(Json(transactions))
}
