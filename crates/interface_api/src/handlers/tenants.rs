//! Tenant handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::TenantId;
use domain_rental::{Contract, CurrentUser, Tenant};

use crate::dto::tenant::TenantRequest;
use crate::handlers::validated;
use crate::{error::ApiError, AppState};

pub async fn create_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<TenantRequest>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    let request = validated(request)?;
    let tenant = state.rental.create_tenant(&user, request.into()).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

pub async fn list_tenants(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    Ok(Json(state.rental.list_tenants(&user).await?))
}

pub async fn get_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<TenantId>,
) -> Result<Json<Tenant>, ApiError> {
    Ok(Json(state.rental.get_tenant(&user, id).await?))
}

pub async fn update_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<TenantId>,
    Json(request): Json<TenantRequest>,
) -> Result<Json<Tenant>, ApiError> {
    let request = validated(request)?;
    Ok(Json(state.rental.update_tenant(&user, id, request.into()).await?))
}

/// Deletes a tenant without an active contract
pub async fn delete_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<TenantId>,
) -> Result<StatusCode, ApiError> {
    state.rental.delete_tenant(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Contracts of a tenant in creation order
pub async fn list_contracts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<TenantId>,
) -> Result<Json<Vec<Contract>>, ApiError> {
    Ok(Json(state.rental.list_contracts_for_tenant(&user, id).await?))
}
