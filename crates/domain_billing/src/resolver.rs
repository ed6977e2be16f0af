//! Reading-pair resolution
//!
//! Selects the (previous, current) readings of one billing period. Two
//! strategies exist and they fail differently:
//!
//! - [`resolve_latest_pair`] looks at the two most recent readings and simply
//!   reports what is missing.
//! - [`resolve_previous_of`] bills a specific reading against the one right
//!   before it and errors when there is none.
//!
//! Both order readings newest first with a *stable* sort, so readings sharing
//! a `date_of_reading` keep the order in which the caller supplied them.

use tracing::debug;

use core_kernel::ReadingId;

use crate::error::BillingError;
use crate::reading::UtilityReading;

/// Result of [`resolve_latest_pair`]; either side may be missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingPair<'a> {
    pub previous: Option<&'a UtilityReading>,
    pub current: Option<&'a UtilityReading>,
}

impl<'a> ReadingPair<'a> {
    /// Converts to a billable pair, failing with `InsufficientData` when
    /// fewer than two readings were available
    pub fn resolved(&self) -> Result<ResolvedPair<'a>, BillingError> {
        match (self.previous, self.current) {
            (Some(previous), Some(current)) => Ok(ResolvedPair { previous, current }),
            (None, Some(_)) => Err(BillingError::InsufficientData { found: 1 }),
            _ => Err(BillingError::InsufficientData { found: 0 }),
        }
    }
}

/// Two adjacent readings ready for the calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPair<'a> {
    pub previous: &'a UtilityReading,
    pub current: &'a UtilityReading,
}

fn newest_first<'a>(readings: impl IntoIterator<Item = &'a UtilityReading>) -> Vec<&'a UtilityReading> {
    let mut sorted: Vec<&UtilityReading> = readings.into_iter().collect();
    // `sort_by` is stable; equal dates keep input order.
    sorted.sort_by(|a, b| b.date_of_reading.cmp(&a.date_of_reading));
    sorted
}

/// Returns the most recent reading and the one immediately preceding it
///
/// The caller supplies readings of a single unit and utility type; no
/// filtering happens here.
pub fn resolve_latest_pair<'a, I>(readings: I) -> ReadingPair<'a>
where
    I: IntoIterator<Item = &'a UtilityReading>,
{
    let sorted = newest_first(readings);
    ReadingPair {
        current: sorted.first().copied(),
        previous: sorted.get(1).copied(),
    }
}

/// Pairs `target` with the next-older reading of the same utility type
///
/// # Errors
///
/// * `ReadingNotFound` if `target` is not in `readings`
/// * `PreviousReadingNotFound` if `target` is the oldest reading of its type
pub fn resolve_previous_of<'a, I>(readings: I, target: ReadingId) -> Result<ResolvedPair<'a>, BillingError>
where
    I: IntoIterator<Item = &'a UtilityReading>,
{
    let readings: Vec<&UtilityReading> = readings.into_iter().collect();
    let current = readings
        .iter()
        .copied()
        .find(|r| r.id == target)
        .ok_or(BillingError::ReadingNotFound(target))?;

    let same_type = newest_first(
        readings
            .into_iter()
            .filter(|r| r.utility_type == current.utility_type),
    );

    let index = same_type
        .iter()
        .position(|r| r.id == target)
        .ok_or(BillingError::ReadingNotFound(target))?;

    let previous = same_type
        .get(index + 1)
        .copied()
        .ok_or(BillingError::PreviousReadingNotFound(target))?;

    debug!(
        current = %current.id,
        previous = %previous.id,
        utility_type = %current.utility_type,
        "Resolved reading pair"
    );

    Ok(ResolvedPair { previous, current })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use core_kernel::UnitId;
    use crate::reading::UtilityType;

    fn reading(unit: UnitId, utility_type: UtilityType, day: u32) -> UtilityReading {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        UtilityReading::for_unit(unit, utility_type, date, date)
            .with_readings(dec!(100), dec!(60), dec!(40))
    }

    #[test]
    fn test_empty_series_resolves_to_nothing() {
        let readings: Vec<UtilityReading> = Vec::new();
        let pair = resolve_latest_pair(&readings);
        assert!(pair.current.is_none());
        assert!(pair.previous.is_none());
        assert!(matches!(pair.resolved(), Err(BillingError::InsufficientData { found: 0 })));
    }

    #[test]
    fn test_single_reading_has_no_previous() {
        let readings = vec![reading(UnitId::new(), UtilityType::WaterUtility, 5)];
        let pair = resolve_latest_pair(&readings);
        assert_eq!(pair.current.map(|r| r.id), Some(readings[0].id));
        assert!(pair.previous.is_none());
        assert!(matches!(pair.resolved(), Err(BillingError::InsufficientData { found: 1 })));
    }

    #[test]
    fn test_latest_pair_ignores_input_order() {
        let unit = UnitId::new();
        let readings = vec![
            reading(unit, UtilityType::WaterUtility, 10),
            reading(unit, UtilityType::WaterUtility, 30),
            reading(unit, UtilityType::WaterUtility, 1),
            reading(unit, UtilityType::WaterUtility, 20),
        ];
        let pair = resolve_latest_pair(&readings).resolved().unwrap();
        assert_eq!(pair.current.id, readings[1].id);
        assert_eq!(pair.previous.id, readings[3].id);
    }

    #[test]
    fn test_equal_dates_keep_input_order() {
        let unit = UnitId::new();
        let readings = vec![
            reading(unit, UtilityType::WaterUtility, 15),
            reading(unit, UtilityType::WaterUtility, 15),
        ];
        let pair = resolve_latest_pair(&readings).resolved().unwrap();
        assert_eq!(pair.current.id, readings[0].id);
        assert_eq!(pair.previous.id, readings[1].id);
    }

    #[test]
    fn test_previous_of_skips_other_utility_types() {
        let unit = UnitId::new();
        let readings = vec![
            reading(unit, UtilityType::WaterUtility, 1),
            reading(unit, UtilityType::ElectricityUtility, 15),
            reading(unit, UtilityType::WaterUtility, 30),
        ];
        let pair = resolve_previous_of(&readings, readings[2].id).unwrap();
        assert_eq!(pair.current.id, readings[2].id);
        assert_eq!(pair.previous.id, readings[0].id);
    }

    #[test]
    fn test_previous_of_oldest_reading_fails() {
        let unit = UnitId::new();
        let readings = vec![
            reading(unit, UtilityType::WaterUtility, 1),
            reading(unit, UtilityType::WaterUtility, 30),
        ];
        let err = resolve_previous_of(&readings, readings[0].id).unwrap_err();
        assert!(matches!(err, BillingError::PreviousReadingNotFound(id) if id == readings[0].id));
        assert!(err.is_resolution_failure());
    }

    #[test]
    fn test_previous_of_middle_reading() {
        let unit = UnitId::new();
        let readings = vec![
            reading(unit, UtilityType::WaterUtility, 30),
            reading(unit, UtilityType::WaterUtility, 1),
            reading(unit, UtilityType::WaterUtility, 15),
        ];
        let pair = resolve_previous_of(&readings, readings[2].id).unwrap();
        assert_eq!(pair.previous.id, readings[1].id);
    }

    #[test]
    fn test_previous_of_unknown_target() {
        let readings = vec![reading(UnitId::new(), UtilityType::WaterUtility, 1)];
        let missing = ReadingId::new();
        assert!(matches!(
            resolve_previous_of(&readings, missing),
            Err(BillingError::ReadingNotFound(id)) if id == missing
        ));
    }
}
