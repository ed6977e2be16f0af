//! Current-user identity and role checks
//!
//! Authentication happens outside the domain. Services receive an already
//! resolved [`CurrentUser`] and check two things: that the role allows the
//! action, and that the entity belongs to the user's account. Entities of
//! other accounts are reported as not found so their existence never leaks.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use core_kernel::AccountId;

use crate::error::RentalError;

/// Role of a user within an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owner or property manager; full access
    Manager,
    /// Staff who record readings and payments
    Contributor,
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            Role::Manager => true,
            Role::Contributor => matches!(
                permission,
                Permission::View
                    | Permission::RecordReadings
                    | Permission::RecordPayments
                    | Permission::GenerateDocuments
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Contributor => "contributor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manager" | "owner" | "admin" => Ok(Role::Manager),
            "contributor" | "staff" => Ok(Role::Contributor),
            other => Err(RentalError::validation(format!("unknown role '{}'", other))),
        }
    }
}

/// Actions guarded by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    View,
    ManageProperties,
    ManageTenants,
    ManageContracts,
    RecordReadings,
    RecordPayments,
    GenerateDocuments,
}

impl Permission {
    fn describe(&self) -> &'static str {
        match self {
            Permission::View => "view records",
            Permission::ManageProperties => "manage properties and units",
            Permission::ManageTenants => "manage tenants",
            Permission::ManageContracts => "manage contracts",
            Permission::RecordReadings => "record utility readings",
            Permission::RecordPayments => "record payments",
            Permission::GenerateDocuments => "generate documents",
        }
    }
}

/// Entities owned by an account
pub trait AccountScoped {
    fn account_id(&self) -> AccountId;
}

/// Authenticated user as seen by the domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    pub account_id: AccountId,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: Role, account_id: AccountId) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            account_id,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    /// Fails with `Forbidden` unless the role grants `permission`
    pub fn require(&self, permission: Permission) -> Result<(), RentalError> {
        if self.role.allows(permission) {
            return Ok(());
        }
        warn!(
            user = %self.id,
            role = %self.role,
            action = permission.describe(),
            "Permission denied"
        );
        Err(RentalError::Forbidden {
            user: self.id.clone(),
            action: permission.describe().to_string(),
        })
    }

    /// Passes `entity` through when it belongs to the user's account
    pub fn scope<T: AccountScoped>(
        &self,
        entity: T,
        entity_name: &'static str,
        id: impl fmt::Display,
    ) -> Result<T, RentalError> {
        if entity.account_id() == self.account_id {
            Ok(entity)
        } else {
            Err(RentalError::not_found(entity_name, id))
        }
    }
}
