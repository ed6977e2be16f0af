//! Billing application service
//!
//! Loads readings and their payments from the record store, hands fully
//! materialized data to the pure resolver and calculator, and persists what
//! users record. All waiting happens here; the core functions never await.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::{ReadingId, RecordFilter, RecordStore, Repository};

use crate::calculator::{calculate_billing, BillingDataForExport};
use crate::error::BillingError;
use crate::grouping::{group_by_billing_unit, BillingUnitKey};
use crate::reading::{UtilityPayment, UtilityReading, UtilityType};
use crate::resolver::{resolve_latest_pair, resolve_previous_of};

/// Owned form of the latest (previous, current) readings of a billing unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestReadings {
    pub previous: Option<UtilityReading>,
    pub current: Option<UtilityReading>,
}

/// Per-billing-unit status derived from a batch of readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingUnitSummary {
    pub key: BillingUnitKey,
    pub utility_type: UtilityType,
    pub reading_count: usize,
    pub current_reading_id: Option<ReadingId>,
    pub current_is_paid: bool,
    /// False when the unit has fewer than two readings
    pub billable: bool,
}

/// Groups a batch of readings and summarizes each billing unit
pub fn summarize_billing_units(
    readings: &[UtilityReading],
    utility_type: UtilityType,
) -> Vec<BillingUnitSummary> {
    group_by_billing_unit(readings, utility_type)
        .into_iter()
        .map(|group| {
            let pair = resolve_latest_pair(group.readings.iter().copied());
            BillingUnitSummary {
                key: group.key,
                utility_type,
                reading_count: group.readings.len(),
                current_reading_id: pair.current.map(|r| r.id),
                current_is_paid: pair.current.is_some_and(UtilityReading::is_paid),
                billable: pair.resolved().is_ok(),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct BillingService {
    readings: Repository<UtilityReading>,
    payments: Repository<UtilityPayment>,
}

impl BillingService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            readings: Repository::new(Arc::clone(&store)),
            payments: Repository::new(store),
        }
    }

    /// Validates and stores a new reading
    ///
    /// Any payment attached to the input is ignored; payments are recorded
    /// through [`BillingService::record_payment`].
    #[instrument(skip(self, reading), fields(reading_id = %reading.id))]
    pub async fn record_reading(&self, reading: UtilityReading) -> Result<UtilityReading, BillingError> {
        reading.validate()?;
        let stored = reading.without_payment();
        self.readings.save(&stored).await?;

        info!(
            utility_type = %stored.utility_type,
            billing_unit = %BillingUnitKey::of(&stored),
            date_of_reading = %stored.date_of_reading,
            "Recorded utility reading"
        );
        Ok(stored)
    }

    /// Fetches a reading with its payment joined
    pub async fn get_reading(&self, id: ReadingId) -> Result<UtilityReading, BillingError> {
        let reading = self.readings.get(id).await?;
        self.attach_payment(reading).await
    }

    /// Lists the readings of one billing unit, payments joined, in store order
    pub async fn list_readings(
        &self,
        key: BillingUnitKey,
        utility_type: Option<UtilityType>,
    ) -> Result<Vec<UtilityReading>, BillingError> {
        let mut filter = match key {
            BillingUnitKey::Pairing(pairing_id) => RecordFilter::new().eq("pairing_id", pairing_id),
            BillingUnitKey::Unit(unit_id) => RecordFilter::new()
                .eq("unit_id", unit_id)
                .eq("pairing_id", serde_json::Value::Null),
            BillingUnitKey::Unknown => {
                return Err(BillingError::InvalidReading(
                    "readings without a unit or pairing cannot be listed".to_string(),
                ))
            }
        };
        if let Some(utility_type) = utility_type {
            filter = filter.eq("utility_type", utility_type);
        }

        let mut readings = Vec::new();
        for reading in self.readings.list(&filter).await? {
            readings.push(self.attach_payment(reading).await?);
        }
        Ok(readings)
    }

    /// Loads readings of several billing units together
    pub async fn list_readings_for(
        &self,
        keys: &[BillingUnitKey],
        utility_type: Option<UtilityType>,
    ) -> Result<Vec<UtilityReading>, BillingError> {
        let mut readings = Vec::new();
        for key in keys {
            readings.extend(self.list_readings(*key, utility_type).await?);
        }
        Ok(readings)
    }

    /// Most recent reading of a billing unit and the one before it
    pub async fn latest_readings(
        &self,
        key: BillingUnitKey,
        utility_type: UtilityType,
    ) -> Result<LatestReadings, BillingError> {
        let readings = self.list_readings(key, Some(utility_type)).await?;
        let pair = resolve_latest_pair(&readings);
        Ok(LatestReadings {
            previous: pair.previous.cloned(),
            current: pair.current.cloned(),
        })
    }

    /// Records whether a reading's bill has been paid, replacing any earlier record
    #[instrument(skip(self, comments))]
    pub async fn record_payment(
        &self,
        reading_id: ReadingId,
        paid: bool,
        recorded_by_user_id: &str,
        comments: Option<String>,
    ) -> Result<UtilityPayment, BillingError> {
        // Ensures the reading exists before a payment can reference it.
        self.readings.get(reading_id).await?;

        let existing = self.payment_for(reading_id).await?;
        let mut payment = UtilityPayment::new(reading_id, paid, recorded_by_user_id);
        if let Some(existing) = existing {
            payment.id = existing.id;
        }
        if let Some(comments) = comments {
            payment = payment.with_comments(comments);
        }
        self.payments.save(&payment).await?;

        info!(%reading_id, paid, recorded_by = recorded_by_user_id, "Recorded utility payment");
        Ok(payment)
    }

    /// Builds the export record for `reading_id` billed against its predecessor
    ///
    /// # Errors
    ///
    /// `PreviousReadingNotFound` when the reading is the oldest of its type for
    /// its billing unit; the calculator is not invoked in that case.
    #[instrument(skip(self))]
    pub async fn generate_billing(
        &self,
        reading_id: ReadingId,
        unit_name: &str,
        prepared_by: &str,
    ) -> Result<BillingDataForExport, BillingError> {
        let target = self.readings.get(reading_id).await?;
        let series = self
            .list_readings(BillingUnitKey::of(&target), Some(target.utility_type))
            .await?;

        let pair = resolve_previous_of(&series, reading_id)?;
        let billing = calculate_billing(pair.previous, pair.current, unit_name, prepared_by);

        info!(
            %reading_id,
            previous_reading_id = %billing.previous_reading_id,
            total_usage = %billing.total_usage,
            remarks = %billing.remarks,
            "Generated utility billing"
        );
        Ok(billing)
    }

    /// Removes a reading together with its payment record
    pub async fn delete_reading(&self, reading_id: ReadingId) -> Result<(), BillingError> {
        if let Some(payment) = self.payment_for(reading_id).await? {
            self.payments.delete(payment.id).await?;
        }
        self.readings.delete(reading_id).await?;
        info!(%reading_id, "Deleted utility reading");
        Ok(())
    }

    async fn payment_for(&self, reading_id: ReadingId) -> Result<Option<UtilityPayment>, BillingError> {
        let filter = RecordFilter::new().eq("reading_id", reading_id);
        Ok(self.payments.list(&filter).await?.into_iter().last())
    }

    async fn attach_payment(&self, mut reading: UtilityReading) -> Result<UtilityReading, BillingError> {
        reading.payment = self.payment_for(reading.id).await?;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use core_kernel::{InMemoryRecordStore, PairingId, UnitId};

    fn service() -> BillingService {
        BillingService::new(Arc::new(InMemoryRecordStore::new()))
    }

    fn water(unit: UnitId, day: u32, first: rust_decimal::Decimal, second: rust_decimal::Decimal) -> UtilityReading {
        let date = NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
        UtilityReading::for_unit(unit, UtilityType::WaterUtility, date, date)
            .with_readings(first + second, first, second)
            .with_amount(dec!(1000))
    }

    #[tokio::test]
    async fn test_generate_billing_uses_previous_reading() {
        let service = service();
        let unit = UnitId::new();
        service.record_reading(water(unit, 1, dec!(100), dec!(50))).await.unwrap();
        let current = service.record_reading(water(unit, 31, dec!(80), dec!(45))).await.unwrap();

        let billing = service.generate_billing(current.id, "Unit 1", "Ana").await.unwrap();
        assert_eq!(billing.first_floor_amount, dec!(800));
        assert_eq!(billing.second_floor_amount, dec!(200));
    }

    #[tokio::test]
    async fn test_generate_billing_for_first_reading_fails() {
        let service = service();
        let first = service
            .record_reading(water(UnitId::new(), 1, dec!(100), dec!(50)))
            .await
            .unwrap();

        let err = service.generate_billing(first.id, "Unit 1", "Ana").await.unwrap_err();
        assert!(matches!(err, BillingError::PreviousReadingNotFound(_)));
    }

    #[tokio::test]
    async fn test_payment_is_joined_and_replaced() {
        let service = service();
        let reading = service
            .record_reading(water(UnitId::new(), 1, dec!(1), dec!(1)))
            .await
            .unwrap();

        let first = service.record_payment(reading.id, false, "user-1", None).await.unwrap();
        let second = service
            .record_payment(reading.id, true, "user-2", Some("cash".into()))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let loaded = service.get_reading(reading.id).await.unwrap();
        assert!(loaded.is_paid());
        assert_eq!(loaded.payment.unwrap().recorded_by_user_id, "user-2");
    }

    #[tokio::test]
    async fn test_unit_listing_excludes_pairing_readings() {
        let service = service();
        let unit = UnitId::new();
        service.record_reading(water(unit, 1, dec!(5), dec!(5))).await.unwrap();

        let mut shared = water(unit, 2, dec!(5), dec!(5));
        shared.pairing_id = Some(PairingId::new());
        service.record_reading(shared).await.unwrap();

        let readings = service.list_readings(BillingUnitKey::Unit(unit), None).await.unwrap();
        assert_eq!(readings.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_reading_removes_payment() {
        let service = service();
        let reading = service
            .record_reading(water(UnitId::new(), 1, dec!(1), dec!(1)))
            .await
            .unwrap();
        service.record_payment(reading.id, true, "u", None).await.unwrap();

        service.delete_reading(reading.id).await.unwrap();
        assert!(service.get_reading(reading.id).await.is_err());
        assert!(service.payment_for(reading.id).await.unwrap().is_none());
    }

    #[test]
    fn test_summaries_flag_single_reading_units() {
        let unit_a = UnitId::new();
        let unit_b = UnitId::new();
        let readings = vec![
            water(unit_a, 1, dec!(10), dec!(10)),
            water(unit_b, 1, dec!(10), dec!(10)),
            water(unit_a, 31, dec!(5), dec!(5)),
        ];

        let summaries = summarize_billing_units(&readings, UtilityType::WaterUtility);
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].billable);
        assert_eq!(summaries[0].current_reading_id, Some(readings[2].id));
        assert!(!summaries[1].billable);
    }
}
