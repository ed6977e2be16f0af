//! Monthly rent tracking
//!
//! One [`RentPayment`] exists per contract and calendar month. Months of a
//! contract that have no paid record are outstanding.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, ContractId, Money, Record, RentPaymentId, TenantId};

use crate::access::AccountScoped;
use crate::contract::{Contract, ContractStatus};
use crate::error::RentalError;

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RentPeriod {
    year: i32,
    month: u32,
}

impl RentPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, RentalError> {
        if !(1..=12).contains(&month) {
            return Err(RentalError::validation(format!("invalid month {}", month)));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month >= 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month <= 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Last month touched by a span ending (exclusive) at `end`
    pub(crate) fn last_before(end: NaiveDate) -> Self {
        let period = Self::of(end);
        if end.day() == 1 {
            period.previous()
        } else {
            period
        }
    }

    /// Inclusive range of months
    pub fn range(from: RentPeriod, to: RentPeriod) -> Vec<RentPeriod> {
        let mut periods = Vec::new();
        let mut current = from;
        while current <= to {
            periods.push(current);
            current = current.next();
        }
        periods
    }
}

impl fmt::Display for RentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for RentPeriod {
    type Err = RentalError;

    /// Parses `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RentalError::validation(format!("invalid rent period '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

/// Rent record of one contract month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentPayment {
    pub id: RentPaymentId,
    pub account_id: AccountId,
    pub contract_id: ContractId,
    pub tenant_id: TenantId,
    pub period: RentPeriod,
    pub amount: Money,
    pub paid: bool,
    pub paid_on: Option<NaiveDate>,
    pub recorded_by_user_id: String,
    pub comments: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl RentPayment {
    /// Unpaid record for `period`, due at the contract's monthly rent
    pub fn for_period(contract: &Contract, period: RentPeriod, recorded_by: &str) -> Self {
        Self {
            id: RentPaymentId::new_v7(),
            account_id: contract.account_id,
            contract_id: contract.id,
            tenant_id: contract.tenant_id,
            period,
            amount: contract.monthly_rent,
            paid: false,
            paid_on: None,
            recorded_by_user_id: recorded_by.to_string(),
            comments: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn mark_paid(&mut self, paid_on: NaiveDate, recorded_by: &str) {
        self.paid = true;
        self.paid_on = Some(paid_on);
        self.touch(recorded_by);
    }

    pub fn mark_unpaid(&mut self, recorded_by: &str) {
        self.paid = false;
        self.paid_on = None;
        self.touch(recorded_by);
    }

    fn touch(&mut self, recorded_by: &str) {
        self.recorded_by_user_id = recorded_by.to_string();
        self.recorded_at = Utc::now();
    }
}

impl Record for RentPayment {
    type Id = RentPaymentId;
    const COLLECTION: &'static str = "rent_payments";
    const ENTITY: &'static str = "RentPayment";

    fn record_id(&self) -> RentPaymentId {
        self.id
    }
}

impl AccountScoped for RentPayment {
    fn account_id(&self) -> AccountId {
        self.account_id
    }
}

/// Months of `contract` up to `as_of` that have no paid record
///
/// Draft contracts owe nothing. A terminated contract stops accruing in the
/// month it was terminated. Payments of other contracts are ignored.
pub fn outstanding_periods(
    contract: &Contract,
    payments: &[RentPayment],
    as_of: NaiveDate,
) -> Vec<RentPeriod> {
    if contract.status == ContractStatus::Draft || as_of < contract.start_date {
        return Vec::new();
    }

    let mut last = RentPeriod::last_before(contract.end_date).min(RentPeriod::of(as_of));
    if let Some(terminated_at) = contract.terminated_at {
        last = last.min(RentPeriod::of(terminated_at.date_naive()));
    }

    RentPeriod::range(RentPeriod::of(contract.start_date), last)
        .into_iter()
        .filter(|period| {
            !payments
                .iter()
                .any(|p| p.contract_id == contract.id && p.period == *period && p.paid)
        })
        .collect()
}
