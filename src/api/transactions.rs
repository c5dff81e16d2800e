//! Transaction notification endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::server::AppState;

use super::models::{BatchAcceptedResponse, StatusResponse, TransactionRequest, TransactionResponse};

/// POST /v1/transactions - Process one transaction and wait for the notification
pub async fn process_transaction(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> Result<Json<TransactionResponse>> {
    let transaction = request.into_transaction()?;
    let result = state.processor.process(transaction).await?;
    Ok(Json(result.into()))
}

/// POST /v1/transactions/batch - Accept transactions for background notification
pub async fn process_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<TransactionRequest>>,
) -> Result<(StatusCode, Json<BatchAcceptedResponse>)> {
    let transactions = requests
        .into_iter()
        .map(TransactionRequest::into_transaction)
        .collect::<Result<Vec<_>>>()?;

    let ids = state.batch_processor.process_batch(transactions).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(BatchAcceptedResponse {
            accepted: ids.len(),
            ids,
        }),
    ))
}

/// GET /v1/transactions/status/{id} - Latest delivery status
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    // An ID that is not a UUID can never have been stored.
    let not_found = || AppError::NotFound(format!("No delivery status for transaction {}", id));

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let record = state.store.find_by_id(id).await?.ok_or_else(not_found)?;

    Ok(Json(record.into()))
}
