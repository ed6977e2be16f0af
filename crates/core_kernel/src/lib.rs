//! Core Kernel - Foundational types for the rental core
//!
//! This crate provides the building blocks shared by the rental and utility
//! billing domains:
//! - Money types with precise decimal arithmetic
//! - Strongly typed identifiers
//! - The record store port and its in-memory adapter

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod store;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    AccountId, PropertyId, UnitId, PairingId, TenantId, ContractId,
    RentPaymentId, ReadingId, UtilityPaymentId,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use store::{Record, RecordFilter, RecordStore, Repository};
pub use store::memory::InMemoryRecordStore;
