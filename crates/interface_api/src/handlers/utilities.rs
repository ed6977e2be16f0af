//! Utility reading and billing handlers
//!
//! The billing service knows nothing about accounts or roles. Every handler
//! here checks the role first, then proves the reading's unit or pairing is
//! visible to the user before touching readings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use core_kernel::ReadingId;
use domain_billing::{
    summarize_billing_units, BillingExport, BillingUnitKey, BillingUnitSummary, LatestReadings,
    UtilityPayment, UtilityReading,
};
use domain_rental::{CurrentUser, Permission};

use crate::dto::utility::*;
use crate::handlers::validated;
use crate::{error::ApiError, AppState};

/// Name of the unit or pairing behind `key`, failing if the user cannot see it
async fn billing_unit_name(state: &AppState, user: &CurrentUser, key: BillingUnitKey) -> Result<String, ApiError> {
    match key {
        BillingUnitKey::Unit(id) => Ok(state.rental.get_unit(user, id).await?.name),
        BillingUnitKey::Pairing(id) => Ok(state.rental.get_pairing(user, id).await?.name),
        BillingUnitKey::Unknown => Err(ApiError::validation("reading has no unit or pairing")),
    }
}

/// Loads a reading the user is allowed to see, with the name of its owner
async fn visible_reading(
    state: &AppState,
    user: &CurrentUser,
    id: ReadingId,
) -> Result<(UtilityReading, String), ApiError> {
    let reading = state.billing.get_reading(id).await?;
    match billing_unit_name(state, user, BillingUnitKey::of(&reading)).await {
        Ok(name) => Ok((reading, name)),
        Err(ApiError::NotFound(_)) => Err(ApiError::NotFound(format!("Reading not found: {}", id))),
        Err(e) => Err(e),
    }
}

/// Records a meter reading for a unit or pairing
pub async fn record_reading(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<RecordReadingRequest>,
) -> Result<(StatusCode, Json<UtilityReading>), ApiError> {
    let request = validated(request)?;
    user.require(Permission::RecordReadings)?;
    billing_unit_name(&state, &user, request.billing_unit()?).await?;

    let reading = state.billing.record_reading(request.into_reading()?).await?;
    Ok((StatusCode::CREATED, Json(reading)))
}

/// Readings of one unit or pairing, payments joined
pub async fn list_readings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<Vec<UtilityReading>>, ApiError> {
    let key = query.billing_unit()?;
    billing_unit_name(&state, &user, key).await?;
    Ok(Json(state.billing.list_readings(key, query.utility_type).await?))
}

/// Latest (previous, current) readings of one unit or pairing
pub async fn latest_readings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<LatestReadingsQuery>,
) -> Result<Json<LatestReadings>, ApiError> {
    let key = query.billing_unit()?;
    billing_unit_name(&state, &user, key).await?;
    Ok(Json(state.billing.latest_readings(key, query.utility_type).await?))
}

/// Billing status of every unit and pairing of a property
pub async fn billing_summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Vec<BillingUnitSummary>>, ApiError> {
    let pairings = state.rental.list_pairings(&user, query.property_id).await?;
    let units = state.rental.list_units(&user, query.property_id).await?;

    let keys: Vec<BillingUnitKey> = pairings
        .iter()
        .map(|p| BillingUnitKey::Pairing(p.id))
        .chain(units.iter().map(|u| BillingUnitKey::Unit(u.id)))
        .collect();
    let readings = state
        .billing
        .list_readings_for(&keys, Some(query.utility_type))
        .await?;
    Ok(Json(summarize_billing_units(&readings, query.utility_type)))
}

pub async fn get_reading(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ReadingId>,
) -> Result<Json<UtilityReading>, ApiError> {
    let (reading, _) = visible_reading(&state, &user, id).await?;
    Ok(Json(reading))
}

/// Marks a reading's bill paid or unpaid
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ReadingId>,
    Json(request): Json<UtilityPaymentRequest>,
) -> Result<Json<UtilityPayment>, ApiError> {
    let request = validated(request)?;
    user.require(Permission::RecordPayments)?;
    visible_reading(&state, &user, id).await?;

    let payment = state
        .billing
        .record_payment(id, request.paid, &user.id, request.comments)
        .await?;
    Ok(Json(payment))
}

/// Apportioned bill for a reading against the one before it
pub async fn generate_billing(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ReadingId>,
    Query(query): Query<BillingQuery>,
) -> Result<Json<BillingExport>, ApiError> {
    user.require(Permission::GenerateDocuments)?;
    let (_, unit_name) = visible_reading(&state, &user, id).await?;

    let data = state
        .billing
        .generate_billing(id, &unit_name, &user.display_name)
        .await?;
    Ok(Json(BillingExport::new(
        data,
        query.format,
        state.rental.currency(),
        Utc::now(),
    )))
}

pub async fn delete_reading(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ReadingId>,
) -> Result<StatusCode, ApiError> {
    user.require(Permission::RecordReadings)?;
    visible_reading(&state, &user, id).await?;
    state.billing.delete_reading(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
