//! Property, unit and pairing handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::{PairingId, PropertyId, UnitId};
use domain_rental::{CurrentUser, Property, Unit, UnitPairing};

use crate::dto::property::*;
use crate::handlers::validated;
use crate::{error::ApiError, AppState};

/// Creates a property
pub async fn create_property(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<PropertyRequest>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let request = validated(request)?;
    let property = state.rental.create_property(&user, request.into()).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// Lists the account's properties
pub async fn list_properties(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Property>>, ApiError> {
    Ok(Json(state.rental.list_properties(&user).await?))
}

pub async fn get_property(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<PropertyId>,
) -> Result<Json<Property>, ApiError> {
    Ok(Json(state.rental.get_property(&user, id).await?))
}

pub async fn update_property(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<PropertyId>,
    Json(request): Json<PropertyRequest>,
) -> Result<Json<Property>, ApiError> {
    let request = validated(request)?;
    Ok(Json(state.rental.update_property(&user, id, request.into()).await?))
}

/// Deletes a property that has no units
pub async fn delete_property(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<PropertyId>,
) -> Result<StatusCode, ApiError> {
    state.rental.delete_property(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds a unit to a property
pub async fn create_unit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(property_id): Path<PropertyId>,
    Json(request): Json<UnitRequest>,
) -> Result<(StatusCode, Json<Unit>), ApiError> {
    let request = validated(request)?;
    let unit = state.rental.create_unit(&user, property_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn list_units(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(property_id): Path<PropertyId>,
) -> Result<Json<Vec<Unit>>, ApiError> {
    Ok(Json(state.rental.list_units(&user, property_id).await?))
}

pub async fn get_unit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<UnitId>,
) -> Result<Json<Unit>, ApiError> {
    Ok(Json(state.rental.get_unit(&user, id).await?))
}

pub async fn update_unit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<UnitId>,
    Json(request): Json<UnitRequest>,
) -> Result<Json<Unit>, ApiError> {
    let request = validated(request)?;
    Ok(Json(state.rental.update_unit(&user, id, request.into()).await?))
}

/// Deletes an unpaired unit without an active contract
pub async fn delete_unit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<UnitId>,
) -> Result<StatusCode, ApiError> {
    state.rental.delete_unit(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pairs two units of the same property
pub async fn create_pairing(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreatePairingRequest>,
) -> Result<(StatusCode, Json<UnitPairing>), ApiError> {
    let request = validated(request)?;
    let pairing = state
        .rental
        .create_pairing(&user, request.first_unit_id, request.second_unit_id, request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(pairing)))
}

pub async fn get_pairing(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<PairingId>,
) -> Result<Json<UnitPairing>, ApiError> {
    Ok(Json(state.rental.get_pairing(&user, id).await?))
}

pub async fn list_pairings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(property_id): Path<PropertyId>,
) -> Result<Json<Vec<UnitPairing>>, ApiError> {
    Ok(Json(state.rental.list_pairings(&user, property_id).await?))
}
