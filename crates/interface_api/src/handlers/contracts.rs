//! Contract handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use core_kernel::ContractId;
use domain_rental::{Contract, CurrentUser, LeaseDocumentData};

use crate::dto::contract::*;
use crate::handlers::validated;
use crate::{error::ApiError, AppState};

/// Creates a draft contract for a tenant and unit
pub async fn create_contract(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<Contract>), ApiError> {
    let request = validated(request)?;
    let contract = state.rental.create_contract(&user, request.into()).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

pub async fn get_contract(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ContractId>,
) -> Result<Json<Contract>, ApiError> {
    Ok(Json(state.rental.get_contract(&user, id).await?))
}

pub async fn sign_contract(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ContractId>,
) -> Result<Json<Contract>, ApiError> {
    Ok(Json(state.rental.sign_contract(&user, id).await?))
}

pub async fn notarize_contract(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ContractId>,
) -> Result<Json<Contract>, ApiError> {
    Ok(Json(state.rental.notarize_contract(&user, id).await?))
}

/// Terminates a contract; the body is optional
pub async fn terminate_contract(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ContractId>,
    request: Option<Json<TerminateContractRequest>>,
) -> Result<Json<Contract>, ApiError> {
    let request = validated(request.map(|Json(r)| r).unwrap_or_default())?;
    Ok(Json(state.rental.terminate_contract(&user, id, request.reason).await?))
}

/// Data for the printable lease agreement
pub async fn lease_document(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ContractId>,
) -> Result<Json<LeaseDocumentData>, ApiError> {
    Ok(Json(state.rental.lease_document(&user, id).await?))
}

/// Contract months without a paid rent record
pub async fn outstanding_rent(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<ContractId>,
    Query(query): Query<OutstandingRentQuery>,
) -> Result<Json<OutstandingRentResponse>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let periods = state.rental.outstanding_rent(&user, id, as_of).await?;
    Ok(Json(OutstandingRentResponse::new(id, as_of, &periods)))
}
