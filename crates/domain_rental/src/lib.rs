//! Rental Domain - Properties, Tenants and Leases
//!
//! Account-scoped records of a small rental business and the rules around
//! them:
//!
//! - **Properties** contain **units**; two units of a property can be paired
//!   to share a utility meter
//! - **Tenants** occupy units under **contracts** that move from draft to
//!   signed to notarized, and may be terminated at any point
//! - **Rent** is tracked per contract month
//!
//! All service operations run on behalf of a [`CurrentUser`] whose role
//! decides what they may change.

pub mod access;
pub mod contract;
pub mod error;
pub mod lease;
pub mod property;
pub mod rent;
pub mod service;
pub mod tenant;
pub mod unit;

pub use access::{AccountScoped, CurrentUser, Permission, Role};
pub use contract::{Contract, ContractDraft, ContractStatus};
pub use error::RentalError;
pub use lease::LeaseDocumentData;
pub use property::{Property, PropertyDraft};
pub use rent::{outstanding_periods, RentPayment, RentPeriod};
pub use service::{RentPaymentDraft, RentalService};
pub use tenant::{Tenant, TenantDraft};
pub use unit::{Unit, UnitDraft, UnitPairing};
