//! Request handlers, one module per resource

pub mod contracts;
pub mod health;
pub mod properties;
pub mod rent;
pub mod tenants;
pub mod utilities;

use validator::Validate;

use crate::error::ApiError;

/// Runs the request's declarative checks before it reaches a service
pub(crate) fn validated<T: Validate>(request: T) -> Result<T, ApiError> {
    request.validate()?;
    Ok(request)
}
