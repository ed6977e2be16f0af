//! Billing Domain - Utility Reading Apportionment
//!
//! Rental units share water and electricity meters across two floors. Each
//! period a reading records the unit meter, both sub-meters and the bill
//! amount. This crate turns two consecutive readings into a bill split by
//! each floor's share of consumption.
//!
//! # Pipeline
//!
//! 1. [`grouping`] buckets readings per billing unit (pairing, else unit)
//! 2. [`resolver`] picks the (previous, current) pair
//! 3. [`calculator`] apportions the current amount
//! 4. [`export`] packages the result for document writers
//!
//! The resolver, calculator and grouping helpers are synchronous and pure;
//! [`BillingService`] does the loading and persistence around them.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{calculate_billing, resolve_previous_of};
//!
//! let pair = resolve_previous_of(&readings, reading_id)?;
//! let billing = calculate_billing(pair.previous, pair.current, "Unit 3A", "Maria");
//! assert_eq!(billing.apportioned_total(), billing.amount);
//! ```

pub mod calculator;
pub mod error;
pub mod export;
pub mod format;
pub mod grouping;
pub mod reading;
pub mod resolver;
pub mod service;

pub use calculator::{apportion, calculate_billing, BillingDataForExport, PaymentRemark};
pub use error::BillingError;
pub use export::{export_file_name, BillingExport, DocumentRow, ExportFormat};
pub use format::{format_currency, format_number, format_percentage};
pub use grouping::{group_by_billing_unit, BillingUnitGroup, BillingUnitKey};
pub use reading::{UtilityPayment, UtilityReading, UtilityType};
pub use resolver::{resolve_latest_pair, resolve_previous_of, ReadingPair, ResolvedPair};
pub use service::{summarize_billing_units, BillingService, BillingUnitSummary, LatestReadings};
