//! Rental application service
//!
//! Every operation takes the [`CurrentUser`] resolved by the caller. Role
//! checks happen before any store access; account scoping happens on every
//! loaded entity.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::{
    ContractId, Currency, Money, PairingId, PropertyId, Record, RecordFilter, RecordStore,
    RentPaymentId, Repository, TenantId, UnitId,
};

use crate::access::{AccountScoped, CurrentUser, Permission};
use crate::contract::{Contract, ContractDraft, ContractStatus};
use crate::error::RentalError;
use crate::lease::LeaseDocumentData;
use crate::property::{Property, PropertyDraft};
use crate::rent::{outstanding_periods, RentPayment, RentPeriod};
use crate::tenant::{Tenant, TenantDraft};
use crate::unit::{Unit, UnitDraft, UnitPairing};

/// Input for recording a month's rent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentPaymentDraft {
    pub contract_id: ContractId,
    pub period: RentPeriod,
    pub paid: bool,
    /// Defaults to today when `paid` is set
    pub paid_on: Option<NaiveDate>,
    /// Defaults to the contract's monthly rent
    pub amount: Option<Decimal>,
    pub comments: Option<String>,
}

async fn load<T>(repo: &Repository<T>, user: &CurrentUser, id: T::Id) -> Result<T, RentalError>
where
    T: Record + AccountScoped,
{
    match repo.find_by_id(id).await? {
        Some(entity) => user.scope(entity, T::ENTITY, id),
        None => Err(RentalError::not_found(T::ENTITY, id)),
    }
}

#[derive(Debug, Clone)]
pub struct RentalService {
    currency: Currency,
    properties: Repository<Property>,
    units: Repository<Unit>,
    pairings: Repository<UnitPairing>,
    tenants: Repository<Tenant>,
    contracts: Repository<Contract>,
    rent_payments: Repository<RentPayment>,
}

impl RentalService {
    /// Creates the service; new units are priced in `currency`
    pub fn new(store: Arc<dyn RecordStore>, currency: Currency) -> Self {
        Self {
            currency,
            properties: Repository::new(Arc::clone(&store)),
            units: Repository::new(Arc::clone(&store)),
            pairings: Repository::new(Arc::clone(&store)),
            tenants: Repository::new(Arc::clone(&store)),
            contracts: Repository::new(Arc::clone(&store)),
            rent_payments: Repository::new(store),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    // Properties

    #[instrument(skip(self, user, draft), fields(user = %user.id))]
    pub async fn create_property(&self, user: &CurrentUser, draft: PropertyDraft) -> Result<Property, RentalError> {
        user.require(Permission::ManageProperties)?;
        let property = Property::new(user.account_id, draft)?;
        self.properties.save(&property).await?;
        info!(property_id = %property.id, name = %property.name, "Created property");
        Ok(property)
    }

    pub async fn list_properties(&self, user: &CurrentUser) -> Result<Vec<Property>, RentalError> {
        user.require(Permission::View)?;
        let filter = RecordFilter::new().eq("account_id", user.account_id);
        Ok(self.properties.list(&filter).await?)
    }

    pub async fn get_property(&self, user: &CurrentUser, id: PropertyId) -> Result<Property, RentalError> {
        user.require(Permission::View)?;
        load(&self.properties, user, id).await
    }

    pub async fn update_property(
        &self,
        user: &CurrentUser,
        id: PropertyId,
        draft: PropertyDraft,
    ) -> Result<Property, RentalError> {
        user.require(Permission::ManageProperties)?;
        let mut property = load(&self.properties, user, id).await?;
        property.update(draft)?;
        self.properties.save(&property).await?;
        info!(property_id = %id, "Updated property");
        Ok(property)
    }

    /// Deletes a property that has no units left
    pub async fn delete_property(&self, user: &CurrentUser, id: PropertyId) -> Result<(), RentalError> {
        user.require(Permission::ManageProperties)?;
        load(&self.properties, user, id).await?;
        let units = self.units.list(&RecordFilter::new().eq("property_id", id)).await?;
        if !units.is_empty() {
            return Err(RentalError::conflict(format!(
                "property {} still has {} unit(s)",
                id,
                units.len()
            )));
        }
        self.properties.delete(id).await?;
        info!(property_id = %id, "Deleted property");
        Ok(())
    }

    // Units and pairings

    pub async fn create_unit(
        &self,
        user: &CurrentUser,
        property_id: PropertyId,
        draft: UnitDraft,
    ) -> Result<Unit, RentalError> {
        user.require(Permission::ManageProperties)?;
        let property = load(&self.properties, user, property_id).await?;
        let unit = Unit::new(property.id, property.account_id, draft, self.currency)?;
        self.units.save(&unit).await?;
        info!(unit_id = %unit.id, %property_id, name = %unit.name, "Created unit");
        Ok(unit)
    }

    pub async fn list_units(&self, user: &CurrentUser, property_id: PropertyId) -> Result<Vec<Unit>, RentalError> {
        user.require(Permission::View)?;
        load(&self.properties, user, property_id).await?;
        Ok(self.units.list(&RecordFilter::new().eq("property_id", property_id)).await?)
    }

    pub async fn get_unit(&self, user: &CurrentUser, id: UnitId) -> Result<Unit, RentalError> {
        user.require(Permission::View)?;
        load(&self.units, user, id).await
    }

    pub async fn update_unit(&self, user: &CurrentUser, id: UnitId, draft: UnitDraft) -> Result<Unit, RentalError> {
        user.require(Permission::ManageProperties)?;
        let mut unit = load(&self.units, user, id).await?;
        unit.update(draft)?;
        self.units.save(&unit).await?;
        info!(unit_id = %id, "Updated unit");
        Ok(unit)
    }

    /// Deletes a unit that is neither paired nor under an active contract
    pub async fn delete_unit(&self, user: &CurrentUser, id: UnitId) -> Result<(), RentalError> {
        user.require(Permission::ManageProperties)?;
        let unit = load(&self.units, user, id).await?;
        if unit.is_paired() {
            return Err(RentalError::conflict(format!("unit '{}' is paired", unit.name)));
        }
        let contracts = self.contracts.list(&RecordFilter::new().eq("unit_id", id)).await?;
        if contracts.iter().any(|c| c.status != ContractStatus::Terminated) {
            return Err(RentalError::conflict(format!(
                "unit '{}' has an active contract",
                unit.name
            )));
        }
        self.units.delete(id).await?;
        info!(unit_id = %id, "Deleted unit");
        Ok(())
    }

    /// Pairs two units of one property so they share meter readings
    pub async fn create_pairing(
        &self,
        user: &CurrentUser,
        first: UnitId,
        second: UnitId,
        name: Option<String>,
    ) -> Result<UnitPairing, RentalError> {
        user.require(Permission::ManageProperties)?;
        let mut first = load(&self.units, user, first).await?;
        let mut second = load(&self.units, user, second).await?;

        let pairing = UnitPairing::new(&first, &second, name)?;
        self.pairings.save(&pairing).await?;
        for unit in [&mut first, &mut second] {
            unit.pairing_id = Some(pairing.id);
            unit.updated_at = pairing.created_at;
            self.units.save(unit).await?;
        }

        info!(pairing_id = %pairing.id, name = %pairing.name, "Created unit pairing");
        Ok(pairing)
    }

    pub async fn get_pairing(&self, user: &CurrentUser, id: PairingId) -> Result<UnitPairing, RentalError> {
        user.require(Permission::View)?;
        load(&self.pairings, user, id).await
    }

    pub async fn list_pairings(
        &self,
        user: &CurrentUser,
        property_id: PropertyId,
    ) -> Result<Vec<UnitPairing>, RentalError> {
        user.require(Permission::View)?;
        load(&self.properties, user, property_id).await?;
        Ok(self.pairings.list(&RecordFilter::new().eq("property_id", property_id)).await?)
    }

    // Tenants

    pub async fn create_tenant(&self, user: &CurrentUser, draft: TenantDraft) -> Result<Tenant, RentalError> {
        user.require(Permission::ManageTenants)?;
        if let Some(unit_id) = draft.unit_id {
            load(&self.units, user, unit_id).await?;
        }
        let tenant = Tenant::new(user.account_id, draft)?;
        self.tenants.save(&tenant).await?;
        info!(tenant_id = %tenant.id, "Created tenant");
        Ok(tenant)
    }

    pub async fn list_tenants(&self, user: &CurrentUser) -> Result<Vec<Tenant>, RentalError> {
        user.require(Permission::View)?;
        Ok(self.tenants.list(&RecordFilter::new().eq("account_id", user.account_id)).await?)
    }

    pub async fn get_tenant(&self, user: &CurrentUser, id: TenantId) -> Result<Tenant, RentalError> {
        user.require(Permission::View)?;
        load(&self.tenants, user, id).await
    }

    pub async fn update_tenant(&self, user: &CurrentUser, id: TenantId, draft: TenantDraft) -> Result<Tenant, RentalError> {
        user.require(Permission::ManageTenants)?;
        let mut tenant = load(&self.tenants, user, id).await?;
        if let Some(unit_id) = draft.unit_id {
            load(&self.units, user, unit_id).await?;
        }
        tenant.update(draft)?;
        self.tenants.save(&tenant).await?;
        info!(tenant_id = %id, "Updated tenant");
        Ok(tenant)
    }

    /// Deletes a tenant without an active contract
    pub async fn delete_tenant(&self, user: &CurrentUser, id: TenantId) -> Result<(), RentalError> {
        user.require(Permission::ManageTenants)?;
        load(&self.tenants, user, id).await?;
        let contracts = self.contracts.list(&RecordFilter::new().eq("tenant_id", id)).await?;
        if contracts.iter().any(|c| c.status != ContractStatus::Terminated) {
            return Err(RentalError::conflict(format!("tenant {} has an active contract", id)));
        }
        self.tenants.delete(id).await?;
        info!(tenant_id = %id, "Deleted tenant");
        Ok(())
    }

    // Contracts

    /// Drafts a contract; a unit holds at most one non-terminated contract
    pub async fn create_contract(&self, user: &CurrentUser, draft: ContractDraft) -> Result<Contract, RentalError> {
        user.require(Permission::ManageContracts)?;
        load(&self.tenants, user, draft.tenant_id).await?;
        let unit = load(&self.units, user, draft.unit_id).await?;

        let existing = self.contracts.list(&RecordFilter::new().eq("unit_id", unit.id)).await?;
        if existing.iter().any(|c| c.status != ContractStatus::Terminated) {
            return Err(RentalError::conflict(format!(
                "unit '{}' already has an active contract",
                unit.name
            )));
        }

        let contract = Contract::new(draft, &unit)?;
        self.contracts.save(&contract).await?;
        info!(
            contract_id = %contract.id,
            tenant_id = %contract.tenant_id,
            unit_id = %contract.unit_id,
            "Created contract"
        );
        Ok(contract)
    }

    pub async fn get_contract(&self, user: &CurrentUser, id: ContractId) -> Result<Contract, RentalError> {
        user.require(Permission::View)?;
        load(&self.contracts, user, id).await
    }

    pub async fn list_contracts_for_tenant(
        &self,
        user: &CurrentUser,
        tenant_id: TenantId,
    ) -> Result<Vec<Contract>, RentalError> {
        user.require(Permission::View)?;
        load(&self.tenants, user, tenant_id).await?;
        Ok(self.contracts.list(&RecordFilter::new().eq("tenant_id", tenant_id)).await?)
    }

    async fn change_contract<F>(
        &self,
        user: &CurrentUser,
        id: ContractId,
        change: F,
    ) -> Result<Contract, RentalError>
    where
        F: FnOnce(&mut Contract) -> Result<(), RentalError>,
    {
        user.require(Permission::ManageContracts)?;
        let mut contract = load(&self.contracts, user, id).await?;
        let from = contract.status;
        change(&mut contract)?;
        self.contracts.save(&contract).await?;
        info!(contract_id = %id, %from, to = %contract.status, "Contract status changed");
        Ok(contract)
    }

    pub async fn sign_contract(&self, user: &CurrentUser, id: ContractId) -> Result<Contract, RentalError> {
        self.change_contract(user, id, Contract::sign).await
    }

    pub async fn notarize_contract(&self, user: &CurrentUser, id: ContractId) -> Result<Contract, RentalError> {
        self.change_contract(user, id, Contract::notarize).await
    }

    pub async fn terminate_contract(
        &self,
        user: &CurrentUser,
        id: ContractId,
        reason: Option<String>,
    ) -> Result<Contract, RentalError> {
        self.change_contract(user, id, |contract| contract.terminate(reason)).await
    }

    pub async fn lease_document(&self, user: &CurrentUser, id: ContractId) -> Result<LeaseDocumentData, RentalError> {
        user.require(Permission::GenerateDocuments)?;
        let contract = load(&self.contracts, user, id).await?;
        let tenant = load(&self.tenants, user, contract.tenant_id).await?;
        let unit = load(&self.units, user, contract.unit_id).await?;
        let property = load(&self.properties, user, unit.property_id).await?;
        LeaseDocumentData::assemble(&contract, &tenant, &unit, &property, &user.display_name)
    }

    // Rent

    /// Months of a contract still unpaid as of `as_of`
    pub async fn outstanding_rent(
        &self,
        user: &CurrentUser,
        id: ContractId,
        as_of: NaiveDate,
    ) -> Result<Vec<RentPeriod>, RentalError> {
        user.require(Permission::View)?;
        let contract = load(&self.contracts, user, id).await?;
        let payments = self.rent_payments.list(&RecordFilter::new().eq("contract_id", id)).await?;
        Ok(outstanding_periods(&contract, &payments, as_of))
    }

    /// Records a month's rent, updating the month's existing record if any
    #[instrument(skip(self, user, draft), fields(user = %user.id, contract_id = %draft.contract_id, period = %draft.period))]
    pub async fn record_rent_payment(
        &self,
        user: &CurrentUser,
        draft: RentPaymentDraft,
    ) -> Result<RentPayment, RentalError> {
        user.require(Permission::RecordPayments)?;
        let contract = load(&self.contracts, user, draft.contract_id).await?;
        if !contract.periods().contains(&draft.period) {
            return Err(RentalError::validation(format!(
                "{} is outside the term of contract {}",
                draft.period, contract.id
            )));
        }
        if draft.amount.is_some_and(|a| a.is_sign_negative()) {
            return Err(RentalError::validation("rent amount must not be negative"));
        }

        let existing = self
            .rent_payments
            .list(&RecordFilter::new().eq("contract_id", contract.id))
            .await?
            .into_iter()
            .find(|p| p.period == draft.period);
        let mut payment = existing.unwrap_or_else(|| RentPayment::for_period(&contract, draft.period, &user.id));

        if let Some(amount) = draft.amount {
            payment.amount = Money::new(amount, contract.monthly_rent.currency());
        }
        if draft.comments.is_some() {
            payment.comments = draft.comments;
        }
        if draft.paid {
            payment.mark_paid(draft.paid_on.unwrap_or_else(|| Utc::now().date_naive()), &user.id);
        } else {
            payment.mark_unpaid(&user.id);
        }

        self.rent_payments.save(&payment).await?;
        info!(payment_id = %payment.id, paid = payment.paid, "Recorded rent payment");
        Ok(payment)
    }

    pub async fn set_rent_paid(
        &self,
        user: &CurrentUser,
        id: RentPaymentId,
        paid: bool,
        paid_on: Option<NaiveDate>,
    ) -> Result<RentPayment, RentalError> {
        user.require(Permission::RecordPayments)?;
        let mut payment = load(&self.rent_payments, user, id).await?;
        if paid {
            payment.mark_paid(paid_on.unwrap_or_else(|| Utc::now().date_naive()), &user.id);
        } else {
            payment.mark_unpaid(&user.id);
        }
        self.rent_payments.save(&payment).await?;
        info!(payment_id = %id, paid, "Updated rent payment");
        Ok(payment)
    }

    /// Rent records of a tenant, oldest month first
    pub async fn list_rent_payments(
        &self,
        user: &CurrentUser,
        tenant_id: TenantId,
    ) -> Result<Vec<RentPayment>, RentalError> {
        user.require(Permission::View)?;
        load(&self.tenants, user, tenant_id).await?;
        let mut payments = self.rent_payments.list(&RecordFilter::new().eq("tenant_id", tenant_id)).await?;
        payments.sort_by_key(|p| p.period);
        Ok(payments)
    }
}
