// lib/src/ledger.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use log::info;
use uuid::Uuid;

use models::errors::{HospitalError, HospitalResult};
use models::medical::{
    Payment, PaymentMethod, PaymentState, PaymentStatus, Service, ServiceCategory, ServiceTier,
    ServiceType,
};

/// One priced line on an open bill. Pharmacy lines carry the
/// prescription they settle so the dispensing gate sees the payment.
#[derive(Debug, Clone, PartialEq)]
pub struct BillLine {
    pub service_id: Uuid,
    pub service_type: ServiceType,
    pub quantity: u32,
    pub tier: ServiceTier,
    pub amount: i64,
    pub prescription_id: Option<Uuid>,
}

/// A bill under construction at the cashier desk. Values only; nothing
/// is recorded in the ledger until `settle_bill`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub patient_id: Uuid,
    pub lines: Vec<BillLine>,
    pub discount: i64,
}

impl Bill {
    pub fn total(&self) -> i64 {
        let subtotal: i64 = self.lines.iter().map(|line| line.amount).sum();
        (subtotal - self.discount).max(0)
    }

    pub fn remove_service_line(&mut self, service_id: Uuid) {
        self.lines.retain(|line| line.service_id != service_id);
    }

    pub fn apply_discount(&mut self, discount: i64) {
        self.discount = discount.max(0);
    }
}

fn service_type_for(category: ServiceCategory) -> ServiceType {
    match category {
        ServiceCategory::Consultation | ServiceCategory::Surgery => ServiceType::Consultation,
        ServiceCategory::Diagnostic => ServiceType::Diagnostic,
        ServiceCategory::Pharmacy => ServiceType::Pharmacy,
        ServiceCategory::Optical => ServiceType::Optical,
    }
}

#[derive(Debug, Default)]
struct LedgerInner {
    payments: Vec<Payment>,
    services: HashMap<Uuid, Service>,
    next_receipt_seq: u32,
}

/// Records payments and answers the verification queries that gate
/// pharmacy dispensing. Other stores read it; none of them write it.
#[derive(Debug, Clone, Default)]
pub struct PaymentLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        PaymentLedger::default()
    }

    fn lock(&self) -> HospitalResult<MutexGuard<'_, LedgerInner>> {
        self.inner
            .lock()
            .map_err(|e| HospitalError::LockError(e.to_string()))
    }

    pub fn register_service(&self, service: Service) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        if inner.services.contains_key(&service.id) {
            return Err(HospitalError::AlreadyExists(format!(
                "service {}",
                service.id
            )));
        }
        inner.services.insert(service.id, service);
        Ok(())
    }

    pub fn service(&self, id: Uuid) -> HospitalResult<Service> {
        let inner = self.lock()?;
        inner
            .services
            .get(&id)
            .cloned()
            .ok_or_else(|| HospitalError::NotFound(format!("service {id}")))
    }

    pub fn services(&self) -> HospitalResult<Vec<Service>> {
        let inner = self.lock()?;
        Ok(inner.services.values().cloned().collect())
    }

    /// Records a completed payment. There is no payment gateway behind
    /// this ledger, so posting never fails for well-formed input;
    /// distinct calls always create distinct records.
    #[allow(clippy::too_many_arguments)]
    pub fn record_payment(
        &self,
        patient_id: Uuid,
        service_id: Uuid,
        amount: i64,
        method: PaymentMethod,
        service_type: ServiceType,
        prescription_id: Option<Uuid>,
        cashier: &str,
    ) -> HospitalResult<Payment> {
        if amount <= 0 {
            return Err(HospitalError::InvalidData(
                "payment amount must be positive".to_string(),
            ));
        }
        let mut inner = self.lock()?;
        inner.next_receipt_seq += 1;
        let seq = inner.next_receipt_seq;
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            patient_id,
            service_id,
            amount,
            status: PaymentStatus::Completed,
            method,
            service_type,
            prescription_id,
            reference: format!("REF-{}-{:04}", now.timestamp_millis(), seq),
            receipt_number: format!("RCP{}{:04}", now.format("%y%m%d"), seq),
            cashier: cashier.to_string(),
            created_at: now,
            completed_at: Some(now),
        };
        info!(
            "recorded {:?} payment {} of {} for patient {}",
            service_type, payment.receipt_number, amount, patient_id
        );
        inner.payments.push(payment.clone());
        Ok(payment)
    }

    pub fn start_bill(&self, patient_id: Uuid) -> Bill {
        Bill {
            patient_id,
            lines: Vec::new(),
            discount: 0,
        }
    }

    /// Adds a priced line, merging with an existing line for the same
    /// service and tier the way the cashier screen accumulates items.
    pub fn add_service_line(
        &self,
        bill: &mut Bill,
        service_id: Uuid,
        quantity: u32,
        tier: ServiceTier,
    ) -> HospitalResult<()> {
        self.push_line(bill, service_id, quantity, tier, None)
    }

    /// Pharmacy variant: the line carries the prescription id, so the
    /// payment posted on settlement satisfies the dispensing gate.
    pub fn add_prescription_line(
        &self,
        bill: &mut Bill,
        service_id: Uuid,
        prescription_id: Uuid,
        quantity: u32,
        tier: ServiceTier,
    ) -> HospitalResult<()> {
        self.push_line(bill, service_id, quantity, tier, Some(prescription_id))
    }

    fn push_line(
        &self,
        bill: &mut Bill,
        service_id: Uuid,
        quantity: u32,
        tier: ServiceTier,
        prescription_id: Option<Uuid>,
    ) -> HospitalResult<()> {
        if quantity == 0 {
            return Err(HospitalError::InvalidData(
                "quantity must be at least 1".to_string(),
            ));
        }
        let service = self.service(service_id)?;
        let amount = service.price.for_tier(tier) * quantity as i64;
        if let Some(line) = bill.lines.iter_mut().find(|line| {
            line.service_id == service_id
                && line.tier == tier
                && line.prescription_id == prescription_id
        }) {
            line.quantity += quantity;
            line.amount += amount;
        } else {
            bill.lines.push(BillLine {
                service_id,
                service_type: service_type_for(service.category),
                quantity,
                tier,
                amount,
                prescription_id,
            });
        }
        Ok(())
    }

    /// Settles the bill: one completed payment per billed line item.
    /// The discount is taken off the first line's amount.
    pub fn settle_bill(
        &self,
        bill: &Bill,
        method: PaymentMethod,
        cashier: &str,
    ) -> HospitalResult<Vec<Payment>> {
        if bill.lines.is_empty() {
            return Err(HospitalError::InvalidData(
                "cannot settle an empty bill".to_string(),
            ));
        }
        let mut remaining_discount = bill.discount.max(0);
        let mut payments = Vec::with_capacity(bill.lines.len());
        for line in &bill.lines {
            let deducted = remaining_discount.min(line.amount);
            remaining_discount -= deducted;
            let amount = line.amount - deducted;
            if amount == 0 {
                continue;
            }
            payments.push(self.record_payment(
                bill.patient_id,
                line.service_id,
                amount,
                method,
                line.service_type,
                line.prescription_id,
                cashier,
            )?);
        }
        if payments.is_empty() {
            return Err(HospitalError::InvalidData(
                "bill total is zero after discount".to_string(),
            ));
        }
        Ok(payments)
    }

    /// `Completed -> Refunded` is the only allowed reversal.
    pub fn refund_payment(&self, id: Uuid) -> HospitalResult<Payment> {
        let mut inner = self.lock()?;
        let payment = inner
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| HospitalError::NotFound(format!("payment {id}")))?;
        if payment.status != PaymentStatus::Completed {
            return Err(HospitalError::InvalidTransition {
                from: format!("{:?}", payment.status).to_lowercase(),
                to: "refunded".to_string(),
            });
        }
        payment.status = PaymentStatus::Refunded;
        Ok(payment.clone())
    }

    /// True iff some completed payment exists for that patient and
    /// service type.
    pub fn is_service_paid(&self, patient_id: Uuid, service_type: ServiceType) -> bool {
        let Ok(inner) = self.inner.lock() else {
            return false;
        };
        inner.payments.iter().any(|p| {
            p.patient_id == patient_id
                && p.service_type == service_type
                && p.status == PaymentStatus::Completed
        })
    }

    /// True iff some completed pharmacy payment for that patient
    /// carries the prescription's id. The foreign key is explicit; the
    /// receipt reference plays no part in the match.
    pub fn is_prescription_paid(&self, patient_id: Uuid, prescription_id: Uuid) -> bool {
        let Ok(inner) = self.inner.lock() else {
            return false;
        };
        inner.payments.iter().any(|p| {
            p.patient_id == patient_id
                && p.service_type == ServiceType::Pharmacy
                && p.status == PaymentStatus::Completed
                && p.prescription_id == Some(prescription_id)
        })
    }

    pub fn prescription_payment_state(
        &self,
        patient_id: Uuid,
        prescription_id: Uuid,
    ) -> HospitalResult<PaymentState> {
        let inner = self.lock()?;
        let mut state = PaymentState::None;
        for payment in inner.payments.iter().filter(|p| {
            p.patient_id == patient_id && p.prescription_id == Some(prescription_id)
        }) {
            match payment.status {
                PaymentStatus::Completed => return Ok(PaymentState::Paid),
                PaymentStatus::Pending => state = PaymentState::Pending,
                _ => {}
            }
        }
        Ok(state)
    }

    pub fn service_payment_state(
        &self,
        patient_id: Uuid,
        service_id: Uuid,
    ) -> HospitalResult<PaymentState> {
        let inner = self.lock()?;
        match inner
            .payments
            .iter()
            .find(|p| p.patient_id == patient_id && p.service_id == service_id)
        {
            Some(p) if p.status == PaymentStatus::Completed => Ok(PaymentState::Paid),
            Some(_) => Ok(PaymentState::Pending),
            None => Ok(PaymentState::None),
        }
    }

    pub fn payments_for_patient(&self, patient_id: Uuid) -> HospitalResult<Vec<Payment>> {
        let inner = self.lock()?;
        Ok(inner
            .payments
            .iter()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect())
    }

    pub fn pending_payments(&self) -> HospitalResult<Vec<Payment>> {
        let inner = self.lock()?;
        Ok(inner
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .cloned()
            .collect())
    }

    /// Sum of completed payments whose completion date matches.
    pub fn daily_revenue(&self, date: NaiveDate) -> HospitalResult<i64> {
        let inner = self.lock()?;
        Ok(inner
            .payments
            .iter()
            .filter(|p| {
                p.status == PaymentStatus::Completed
                    && p.completed_at.map(|t| t.date_naive()) == Some(date)
            })
            .map(|p| p.amount)
            .sum())
    }

    pub fn revenue_by_method(&self) -> HospitalResult<HashMap<PaymentMethod, i64>> {
        let inner = self.lock()?;
        let mut by_method = HashMap::new();
        for payment in inner
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
        {
            *by_method.entry(payment.method).or_insert(0) += payment.amount;
        }
        Ok(by_method)
    }

    pub fn revenue_by_service_type(&self) -> HospitalResult<HashMap<ServiceType, i64>> {
        let inner = self.lock()?;
        let mut by_type = HashMap::new();
        for payment in inner
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
        {
            *by_type.entry(payment.service_type).or_insert(0) += payment.amount;
        }
        Ok(by_type)
    }

    pub(crate) fn export(&self) -> HospitalResult<(Vec<Payment>, Vec<Service>)> {
        let inner = self.lock()?;
        Ok((
            inner.payments.clone(),
            inner.services.values().cloned().collect(),
        ))
    }

    pub(crate) fn import(
        &self,
        payments: Vec<Payment>,
        services: Vec<Service>,
    ) -> HospitalResult<()> {
        let mut inner = self.lock()?;
        inner.next_receipt_seq = payments.len() as u32;
        inner.payments = payments;
        inner.services = services.into_iter().map(|s| (s.id, s)).collect();
        Ok(())
    }
}
