//! Rent payment handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use core_kernel::RentPaymentId;
use domain_rental::{CurrentUser, RentPayment, RentPaymentDraft};

use crate::dto::rent::*;
use crate::handlers::validated;
use crate::{error::ApiError, AppState};

/// Records a month's rent, replacing that month's earlier record
pub async fn record_rent_payment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<RecordRentPaymentRequest>,
) -> Result<Json<RentPayment>, ApiError> {
    let draft = RentPaymentDraft::try_from(validated(request)?)?;
    Ok(Json(state.rental.record_rent_payment(&user, draft).await?))
}

pub async fn set_rent_paid(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<RentPaymentId>,
    Json(request): Json<SetPaidRequest>,
) -> Result<Json<RentPayment>, ApiError> {
    let payment = state
        .rental
        .set_rent_paid(&user, id, request.paid, request.paid_on)
        .await?;
    Ok(Json(payment))
}

/// Rent records of one tenant, oldest month first
pub async fn list_rent_payments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<RentPaymentsQuery>,
) -> Result<Json<Vec<RentPayment>>, ApiError> {
    Ok(Json(state.rental.list_rent_payments(&user, query.tenant_id).await?))
}
