//! Integration tests for domain_rental

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, Currency, Money};
use domain_rental::{
    outstanding_periods, Contract, ContractStatus, CurrentUser, PropertyDraft, RentPayment,
    RentPaymentDraft, RentPeriod, RentalError, RentalService, TenantDraft, UnitDraft,
};
use test_utils::{assert_err_variant, memory_store, ContractDraftBuilder, UserFixtures};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn period(y: i32, m: u32) -> RentPeriod {
    RentPeriod::new(y, m).unwrap()
}

struct Setup {
    service: RentalService,
    manager: CurrentUser,
    contributor: CurrentUser,
}

fn setup() -> Setup {
    let account = AccountId::new();
    Setup {
        service: RentalService::new(memory_store(), Currency::PHP),
        manager: UserFixtures::manager(account),
        contributor: UserFixtures::contributor(account),
    }
}

/// Property with one unit, a tenant, and a signed 2024 contract
async fn leased(setup: &Setup) -> Contract {
    let s = &setup.service;
    let property = s
        .create_property(&setup.manager, PropertyDraft::new("Narra Townhomes", "Pasig City"))
        .await
        .unwrap();
    let unit = s
        .create_unit(&setup.manager, property.id, UnitDraft::new("Unit 1", dec!(15000)))
        .await
        .unwrap();
    let tenant = s
        .create_tenant(&setup.manager, TenantDraft::new("Ana Lim"))
        .await
        .unwrap();
    let contract = s
        .create_contract(&setup.manager, ContractDraftBuilder::new(tenant.id, unit.id).build())
        .await
        .unwrap();
    s.sign_contract(&setup.manager, contract.id).await.unwrap()
}

// ============================================================================
// Access control
// ============================================================================

mod access_tests {
    use super::*;

    #[tokio::test]
    async fn test_contributor_cannot_manage_properties() {
        let setup = setup();
        assert_err_variant!(
            setup
                .service
                .create_property(&setup.contributor, PropertyDraft::new("X", "Y"))
                .await,
            RentalError::Forbidden { .. }
        );
    }

    #[tokio::test]
    async fn test_contributor_cannot_change_contract_state() {
        let setup = setup();
        let contract = leased(&setup).await;
        assert_err_variant!(
            setup.service.notarize_contract(&setup.contributor, contract.id).await,
            RentalError::Forbidden { .. }
        );
    }

    #[tokio::test]
    async fn test_contributor_can_read_and_record_rent() {
        let setup = setup();
        let contract = leased(&setup).await;

        let fetched = setup.service.get_contract(&setup.contributor, contract.id).await.unwrap();
        assert_eq!(fetched.id, contract.id);

        let payment = setup
            .service
            .record_rent_payment(
                &setup.contributor,
                RentPaymentDraft {
                    contract_id: contract.id,
                    period: period(2024, 1),
                    paid: true,
                    paid_on: Some(date(2024, 1, 5)),
                    amount: None,
                    comments: None,
                },
            )
            .await
            .unwrap();
        assert!(payment.paid);
        assert_eq!(payment.recorded_by_user_id, setup.contributor.id);
    }

    #[tokio::test]
    async fn test_other_accounts_see_not_found() {
        let setup = setup();
        let contract = leased(&setup).await;
        let outsider = UserFixtures::manager(AccountId::new());

        assert_err_variant!(
            setup.service.get_contract(&outsider, contract.id).await,
            RentalError::NotFound { entity: "Contract", .. }
        );
        assert!(setup.service.list_properties(&outsider).await.unwrap().is_empty());
    }
}

// ============================================================================
// Contracts and rent
// ============================================================================

mod contract_tests {
    use super::*;

    #[tokio::test]
    async fn test_contract_inherits_unit_rent_and_lifecycle() {
        let setup = setup();
        let contract = leased(&setup).await;
        assert_eq!(contract.status, ContractStatus::Signed);
        assert_eq!(contract.monthly_rent, Money::new(dec!(15000), Currency::PHP));

        let notarized = setup.service.notarize_contract(&setup.manager, contract.id).await.unwrap();
        assert!(notarized.is_notarized());

        let terminated = setup
            .service
            .terminate_contract(&setup.manager, contract.id, Some("lease ended".into()))
            .await
            .unwrap();
        assert_eq!(terminated.status, ContractStatus::Terminated);
        assert_err_variant!(
            setup.service.sign_contract(&setup.manager, contract.id).await,
            RentalError::InvalidStateTransition { .. }
        );
    }

    #[tokio::test]
    async fn test_unit_allows_one_active_contract() {
        let setup = setup();
        let contract = leased(&setup).await;
        let other = setup
            .service
            .create_tenant(&setup.manager, TenantDraft::new("Ben Cruz"))
            .await
            .unwrap();

        assert_err_variant!(
            setup
                .service
                .create_contract(&setup.manager, ContractDraftBuilder::new(other.id, contract.unit_id).build())
                .await,
            RentalError::Conflict(_)
        );
    }

    #[tokio::test]
    async fn test_outstanding_rent_excludes_paid_months() {
        let setup = setup();
        let contract = leased(&setup).await;
        for month in [1, 2, 4] {
            setup
                .service
                .record_rent_payment(
                    &setup.manager,
                    RentPaymentDraft {
                        contract_id: contract.id,
                        period: period(2024, month),
                        paid: true,
                        paid_on: None,
                        amount: None,
                        comments: None,
                    },
                )
                .await
                .unwrap();
        }

        let outstanding = setup
            .service
            .outstanding_rent(&setup.manager, contract.id, date(2024, 5, 20))
            .await
            .unwrap();
        assert_eq!(outstanding, vec![period(2024, 3), period(2024, 5)]);
    }

    #[tokio::test]
    async fn test_recording_same_month_updates_record() {
        let setup = setup();
        let contract = leased(&setup).await;
        let draft = RentPaymentDraft {
            contract_id: contract.id,
            period: period(2024, 3),
            paid: false,
            paid_on: None,
            amount: Some(dec!(14000)),
            comments: Some("partial".into()),
        };
        let first = setup.service.record_rent_payment(&setup.manager, draft.clone()).await.unwrap();
        let second = setup
            .service
            .record_rent_payment(&setup.manager, RentPaymentDraft { paid: true, ..draft })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.paid);
        assert_eq!(second.amount, Money::new(dec!(14000), Currency::PHP));

        let payments = setup
            .service
            .list_rent_payments(&setup.manager, contract.tenant_id)
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);

        let unpaid = setup
            .service
            .set_rent_paid(&setup.manager, second.id, false, None)
            .await
            .unwrap();
        assert!(!unpaid.paid);
        assert!(unpaid.paid_on.is_none());
    }

    #[tokio::test]
    async fn test_rent_outside_term_rejected() {
        let setup = setup();
        let contract = leased(&setup).await;
        assert_err_variant!(
            setup
                .service
                .record_rent_payment(
                    &setup.manager,
                    RentPaymentDraft {
                        contract_id: contract.id,
                        period: period(2025, 1),
                        paid: true,
                        paid_on: None,
                        amount: None,
                        comments: None,
                    },
                )
                .await,
            RentalError::Validation(_)
        );
    }

    #[tokio::test]
    async fn test_lease_document_uses_display_name() {
        let setup = setup();
        let contract = leased(&setup).await;
        let lease = setup.service.lease_document(&setup.contributor, contract.id).await.unwrap();
        assert_eq!(lease.prepared_by, setup.contributor.display_name);
        assert_eq!(lease.unit_name, "Unit 1");
        assert_eq!(lease.term_months, 12);
    }

    #[test]
    fn test_draft_and_terminated_contracts_accrue_differently() {
        let unit = domain_rental::Unit::new(
            core_kernel::PropertyId::new(),
            AccountId::new(),
            UnitDraft::new("U", dec!(1000)),
            Currency::PHP,
        )
        .unwrap();
        let mut contract = Contract::new(
            ContractDraftBuilder::new(core_kernel::TenantId::new(), unit.id).build(),
            &unit,
        )
        .unwrap();
        let no_payments: Vec<RentPayment> = Vec::new();

        assert!(outstanding_periods(&contract, &no_payments, date(2024, 6, 1)).is_empty());

        contract.sign().unwrap();
        assert_eq!(outstanding_periods(&contract, &no_payments, date(2024, 6, 1)).len(), 6);
        assert_eq!(outstanding_periods(&contract, &no_payments, date(2030, 1, 1)).len(), 12);
    }
}

// ============================================================================
// Properties, units and pairings
// ============================================================================

mod property_tests {
    use super::*;

    #[tokio::test]
    async fn test_pairing_marks_both_units() {
        let setup = setup();
        let s = &setup.service;
        let property = s
            .create_property(&setup.manager, PropertyDraft::new("Molave Flats", "Makati"))
            .await
            .unwrap();
        let a = s.create_unit(&setup.manager, property.id, UnitDraft::new("A", dec!(9000))).await.unwrap();
        let b = s.create_unit(&setup.manager, property.id, UnitDraft::new("B", dec!(9000))).await.unwrap();

        let pairing = s.create_pairing(&setup.manager, a.id, b.id, None).await.unwrap();

        let a = s.get_unit(&setup.manager, a.id).await.unwrap();
        assert_eq!(a.pairing_id, Some(pairing.id));
        assert_eq!(s.list_pairings(&setup.manager, property.id).await.unwrap().len(), 1);

        assert_err_variant!(s.delete_unit(&setup.manager, a.id).await, RentalError::Conflict(_));
        assert_err_variant!(
            s.delete_property(&setup.manager, property.id).await,
            RentalError::Conflict(_)
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_empty_property() {
        let setup = setup();
        let s = &setup.service;
        let property = s
            .create_property(&setup.manager, PropertyDraft::new("Old Name", "Cebu"))
            .await
            .unwrap();

        let updated = s
            .update_property(&setup.manager, property.id, PropertyDraft::new("New Name", "Cebu City"))
            .await
            .unwrap();
        assert_eq!(updated.name, "New Name");

        s.delete_property(&setup.manager, property.id).await.unwrap();
        assert_err_variant!(
            s.get_property(&setup.manager, property.id).await,
            RentalError::NotFound { .. }
        );
    }
}

// ============================================================================
// Rent period properties
// ============================================================================

mod period_properties {
    use super::*;
    use chrono::{Days, Months};
    use core_kernel::{PropertyId, TenantId};
    use domain_rental::Unit;
    use proptest::prelude::*;

    fn signed_contract(start: NaiveDate, months: u32) -> Contract {
        let unit = Unit::new(
            PropertyId::new(),
            AccountId::new(),
            UnitDraft::new("1A", dec!(5000)),
            Currency::PHP,
        )
        .unwrap();
        let end = start.checked_add_months(Months::new(months)).unwrap();
        let draft = ContractDraftBuilder::new(TenantId::new(), unit.id)
            .term(start, end)
            .build();
        let mut contract = Contract::new(draft, &unit).unwrap();
        contract.sign().unwrap();
        contract
    }

    proptest! {
        #[test]
        fn outstanding_months_are_unpaid_term_months_up_to_as_of(
            start_offset in 0u64..3000,
            months in 1u32..36,
            paid_mask in proptest::collection::vec(any::<bool>(), 37),
            as_of_offset in 0u64..1500,
        ) {
            let start = date(2020, 1, 1) + Days::new(start_offset);
            let contract = signed_contract(start, months);
            let term = contract.periods();
            let payments: Vec<RentPayment> = term
                .iter()
                .zip(&paid_mask)
                .filter(|(_, paid)| **paid)
                .map(|(period, _)| {
                    let mut payment = RentPayment::for_period(&contract, *period, "user-staff");
                    payment.mark_paid(start, "user-staff");
                    payment
                })
                .collect();

            let as_of = start + Days::new(as_of_offset);
            let cutoff = RentPeriod::of(as_of);
            let outstanding = outstanding_periods(&contract, &payments, as_of);

            prop_assert!(outstanding.windows(2).all(|w| w[0] < w[1]));
            for period in &outstanding {
                prop_assert!(term.contains(period));
                prop_assert!(*period <= cutoff);
                prop_assert!(!payments.iter().any(|p| p.period == *period));
            }
            let due = term.iter().filter(|p| **p <= cutoff).count();
            let paid = payments.iter().filter(|p| p.period <= cutoff).count();
            prop_assert_eq!(outstanding.len() + paid, due);
        }

        #[test]
        fn period_text_form_parses_back(year in 1990i32..2100, month in 1u32..=12) {
            let p = period(year, month);
            prop_assert_eq!(p.to_string().parse::<RentPeriod>().unwrap(), p);
            prop_assert_eq!(p.next().previous(), p);
        }
    }
}
