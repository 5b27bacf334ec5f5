// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::catalog::{NOTE_KIND, SERVICE_PRIORITY};
use crate::{
    CustomerId, EquipmentId, FormKind, Money, Mutation, SaleId, ServiceOrderId, SupplierId,
    TechnicianId, parse_optional_input_date, parse_optional_money,
};

/// Field name to message, for every field that currently fails.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{} field(s) need attention -- fix them and retry", .0.len())]
    Invalid(FieldErrors),
    #[error("cannot encode form body: {0}")]
    Encode(String),
}

/// Typed input behind a create form.
///
/// `assign` parses raw text into the typed value; `check` validates the
/// typed value of one field. `related` lists fields whose check reads
/// `field`, so they are re-checked when it changes.
pub trait FormModel: Default + Clone + fmt::Debug + Serialize {
    type Field: Copy + Eq + fmt::Debug + 'static;

    const KIND: FormKind;
    const FIELDS: &'static [Self::Field];

    fn field_name(field: Self::Field) -> &'static str;

    fn field_label(field: Self::Field) -> &'static str;

    fn assign(&mut self, field: Self::Field, raw: &str) -> Result<(), String>;

    fn check(&self, field: Self::Field) -> Option<String>;

    fn related(_field: Self::Field) -> &'static [Self::Field] {
        &[]
    }

    /// Resets `field` to its default typed value.
    fn clear(&mut self, field: Self::Field) {
        if self.assign(field, "").is_err() {
            *self = Self::default();
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState<M: FormModel> {
    model: M,
    raw: BTreeMap<&'static str, String>,
    parse_errors: FieldErrors,
    errors: FieldErrors,
}

impl<M: FormModel> Default for FormState<M> {
    fn default() -> Self {
        Self {
            model: M::default(),
            raw: BTreeMap::new(),
            parse_errors: FieldErrors::new(),
            errors: FieldErrors::new(),
        }
    }
}

impl<M: FormModel> FormState<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `raw` for `field` and re-validates that field plus the
    /// already-touched fields whose rules depend on it. Text that fails to
    /// parse blanks the typed value, so an overwritten value never lingers.
    pub fn set(&mut self, field: M::Field, raw: impl Into<String>) {
        let name = M::field_name(field);
        let raw = raw.into();
        match self.model.assign(field, &raw) {
            Ok(()) => {
                self.parse_errors.remove(name);
            }
            Err(message) => {
                M::clear(&mut self.model, field);
                self.parse_errors.insert(name, message);
            }
        }
        self.raw.insert(name, raw);
        self.revalidate(field);
        for related in M::related(field) {
            if self.raw.contains_key(M::field_name(*related)) {
                self.revalidate(*related);
            }
        }
    }

    fn revalidate(&mut self, field: M::Field) {
        let name = M::field_name(field);
        let message = self
            .parse_errors
            .get(name)
            .cloned()
            .or_else(|| self.model.check(field));
        match message {
            Some(message) => {
                self.errors.insert(name, message);
            }
            None => {
                self.errors.remove(name);
            }
        }
    }

    pub fn raw(&self, field: M::Field) -> &str {
        self.raw
            .get(M::field_name(field))
            .map_or("", String::as_str)
    }

    pub fn error(&self, field: M::Field) -> Option<&str> {
        self.errors.get(M::field_name(field)).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Checks every field, recording each failure.
    pub fn validate(&mut self) -> Result<&M, FormError> {
        for field in M::FIELDS {
            self.revalidate(*field);
        }
        if self.errors.is_empty() {
            Ok(&self.model)
        } else {
            Err(FormError::Invalid(self.errors.clone()))
        }
    }

    pub fn body(&mut self) -> Result<serde_json::Value, FormError> {
        let model = self.validate()?;
        serde_json::to_value(model).map_err(|error| FormError::Encode(error.to_string()))
    }
}

mod wire_date {
    use serde::Serializer;
    use time::Date;
    use time::macros::format_description;

    pub fn serialize<S: Serializer>(
        value: &Option<Date>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => {
                let text = date
                    .format(&format_description!("[year]-[month]-[day]"))
                    .map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&text)
            }
            None => serializer.serialize_none(),
        }
    }
}

fn parse_id<I: From<i64>>(raw: &str) -> Result<Option<I>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<i64>() {
        Ok(value) if value > 0 => Ok(Some(I::from(value))),
        _ => Err(format!("{trimmed:?} is not a valid id -- enter a positive number")),
    }
}

fn parse_date(raw: &str) -> Result<Option<Date>, String> {
    parse_optional_input_date(raw)
        .map_err(|error| format!("{error} -- use YYYY-MM-DD or dd/mm/yyyy"))
}

fn parse_amount(raw: &str) -> Result<Option<Money>, String> {
    parse_optional_money(raw).map_err(|error| format!("{error} -- use 1.234,50 or 1234.50"))
}

fn required(present: bool, message: &str) -> Option<String> {
    (!present).then(|| message.to_owned())
}

fn not_before(later: Option<Date>, earlier: Option<Date>, message: &str) -> Option<String> {
    match (later, earlier) {
        (Some(later), Some(earlier)) if later < earlier => Some(message.to_owned()),
        _ => None,
    }
}

fn positive(amount: Option<Money>, label: &str) -> Option<String> {
    match amount {
        None => Some(format!("{label} is required -- enter an amount and retry")),
        Some(amount) if amount.cents() <= 0 => Some(format!("{label} must be positive")),
        Some(_) => None,
    }
}

// Purchase orders.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOrderFormField {
    Number,
    Supplier,
    IssuedOn,
    DueOn,
    Total,
    Notes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderForm {
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "proveedor_id")]
    pub supplier: Option<SupplierId>,
    #[serde(rename = "fecha", serialize_with = "wire_date::serialize")]
    pub issued_on: Option<Date>,
    #[serde(rename = "fecha_entrega", serialize_with = "wire_date::serialize")]
    pub due_on: Option<Date>,
    #[serde(rename = "monto_total")]
    pub total: Option<Money>,
    #[serde(rename = "estado")]
    pub status: &'static str,
    #[serde(rename = "observacion")]
    pub notes: String,
}

impl Default for PurchaseOrderForm {
    fn default() -> Self {
        Self {
            number: String::new(),
            supplier: None,
            issued_on: None,
            due_on: None,
            total: None,
            status: "pendiente",
            notes: String::new(),
        }
    }
}

impl FormModel for PurchaseOrderForm {
    type Field = PurchaseOrderFormField;

    const KIND: FormKind = FormKind::PurchaseOrder;
    const FIELDS: &'static [Self::Field] = &[
        PurchaseOrderFormField::Number,
        PurchaseOrderFormField::Supplier,
        PurchaseOrderFormField::IssuedOn,
        PurchaseOrderFormField::DueOn,
        PurchaseOrderFormField::Total,
        PurchaseOrderFormField::Notes,
    ];

    fn field_name(field: Self::Field) -> &'static str {
        match field {
            PurchaseOrderFormField::Number => "numero",
            PurchaseOrderFormField::Supplier => "proveedor_id",
            PurchaseOrderFormField::IssuedOn => "fecha",
            PurchaseOrderFormField::DueOn => "fecha_entrega",
            PurchaseOrderFormField::Total => "monto_total",
            PurchaseOrderFormField::Notes => "observacion",
        }
    }

    fn field_label(field: Self::Field) -> &'static str {
        match field {
            PurchaseOrderFormField::Number => "Número",
            PurchaseOrderFormField::Supplier => "Proveedor (id)",
            PurchaseOrderFormField::IssuedOn => "Fecha",
            PurchaseOrderFormField::DueOn => "Fecha de entrega",
            PurchaseOrderFormField::Total => "Monto total",
            PurchaseOrderFormField::Notes => "Observación",
        }
    }

    fn assign(&mut self, field: Self::Field, raw: &str) -> Result<(), String> {
        match field {
            PurchaseOrderFormField::Number => self.number = raw.trim().to_owned(),
            PurchaseOrderFormField::Supplier => self.supplier = parse_id(raw)?,
            PurchaseOrderFormField::IssuedOn => self.issued_on = parse_date(raw)?,
            PurchaseOrderFormField::DueOn => self.due_on = parse_date(raw)?,
            PurchaseOrderFormField::Total => self.total = parse_amount(raw)?,
            PurchaseOrderFormField::Notes => self.notes = raw.trim().to_owned(),
        }
        Ok(())
    }

    fn check(&self, field: Self::Field) -> Option<String> {
        match field {
            PurchaseOrderFormField::Number => required(
                !self.number.is_empty(),
                "order number is required -- enter a number and retry",
            ),
            PurchaseOrderFormField::Supplier => required(
                self.supplier.is_some(),
                "supplier is required -- choose a supplier and retry",
            ),
            PurchaseOrderFormField::IssuedOn => required(
                self.issued_on.is_some(),
                "order date is required -- enter a date and retry",
            ),
            PurchaseOrderFormField::DueOn => not_before(
                self.due_on,
                self.issued_on,
                "delivery date must be on/after the order date",
            ),
            PurchaseOrderFormField::Total => positive(self.total, "order total"),
            PurchaseOrderFormField::Notes => None,
        }
    }

    fn related(field: Self::Field) -> &'static [Self::Field] {
        match field {
            PurchaseOrderFormField::IssuedOn => &[PurchaseOrderFormField::DueOn],
            _ => &[],
        }
    }
}

// Service orders.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOrderFormField {
    Customer,
    Equipment,
    Technician,
    ReceivedOn,
    PromisedOn,
    Priority,
    Problem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOrderForm {
    #[serde(rename = "cliente_id")]
    pub customer: Option<CustomerId>,
    #[serde(rename = "equipo_id")]
    pub equipment: Option<EquipmentId>,
    #[serde(rename = "tecnico_id")]
    pub technician: Option<TechnicianId>,
    #[serde(rename = "fecha_ingreso", serialize_with = "wire_date::serialize")]
    pub received_on: Option<Date>,
    #[serde(rename = "fecha_entrega_estimada", serialize_with = "wire_date::serialize")]
    pub promised_on: Option<Date>,
    #[serde(rename = "prioridad")]
    pub priority: String,
    #[serde(rename = "descripcion_problema")]
    pub problem: String,
    #[serde(rename = "estado")]
    pub status: &'static str,
}

impl Default for ServiceOrderForm {
    fn default() -> Self {
        Self {
            customer: None,
            equipment: None,
            technician: None,
            received_on: None,
            promised_on: None,
            priority: "media".to_owned(),
            problem: String::new(),
            status: "recibido",
        }
    }
}

impl FormModel for ServiceOrderForm {
    type Field = ServiceOrderFormField;

    const KIND: FormKind = FormKind::ServiceOrder;
    const FIELDS: &'static [Self::Field] = &[
        ServiceOrderFormField::Customer,
        ServiceOrderFormField::Equipment,
        ServiceOrderFormField::Technician,
        ServiceOrderFormField::ReceivedOn,
        ServiceOrderFormField::PromisedOn,
        ServiceOrderFormField::Priority,
        ServiceOrderFormField::Problem,
    ];

    fn field_name(field: Self::Field) -> &'static str {
        match field {
            ServiceOrderFormField::Customer => "cliente_id",
            ServiceOrderFormField::Equipment => "equipo_id",
            ServiceOrderFormField::Technician => "tecnico_id",
            ServiceOrderFormField::ReceivedOn => "fecha_ingreso",
            ServiceOrderFormField::PromisedOn => "fecha_entrega_estimada",
            ServiceOrderFormField::Priority => "prioridad",
            ServiceOrderFormField::Problem => "descripcion_problema",
        }
    }

    fn field_label(field: Self::Field) -> &'static str {
        match field {
            ServiceOrderFormField::Customer => "Cliente (id)",
            ServiceOrderFormField::Equipment => "Equipo (id)",
            ServiceOrderFormField::Technician => "Técnico (id)",
            ServiceOrderFormField::ReceivedOn => "Fecha de ingreso",
            ServiceOrderFormField::PromisedOn => "Entrega estimada",
            ServiceOrderFormField::Priority => "Prioridad",
            ServiceOrderFormField::Problem => "Problema reportado",
        }
    }

    fn assign(&mut self, field: Self::Field, raw: &str) -> Result<(), String> {
        match field {
            ServiceOrderFormField::Customer => self.customer = parse_id(raw)?,
            ServiceOrderFormField::Equipment => self.equipment = parse_id(raw)?,
            ServiceOrderFormField::Technician => self.technician = parse_id(raw)?,
            ServiceOrderFormField::ReceivedOn => self.received_on = parse_date(raw)?,
            ServiceOrderFormField::PromisedOn => self.promised_on = parse_date(raw)?,
            ServiceOrderFormField::Priority => self.priority = raw.trim().to_lowercase(),
            ServiceOrderFormField::Problem => self.problem = raw.trim().to_owned(),
        }
        Ok(())
    }

    fn check(&self, field: Self::Field) -> Option<String> {
        match field {
            ServiceOrderFormField::Customer => required(
                self.customer.is_some(),
                "customer is required -- choose a customer and retry",
            ),
            ServiceOrderFormField::Equipment => required(
                self.equipment.is_some(),
                "equipment is required -- choose the equipment and retry",
            ),
            ServiceOrderFormField::Technician => None,
            ServiceOrderFormField::ReceivedOn => required(
                self.received_on.is_some(),
                "intake date is required -- enter a date and retry",
            ),
            ServiceOrderFormField::PromisedOn => not_before(
                self.promised_on,
                self.received_on,
                "estimated delivery must be on/after the intake date",
            ),
            ServiceOrderFormField::Priority => SERVICE_PRIORITY
                .get(&self.priority)
                .is_none()
                .then(|| {
                    format!(
                        "unknown priority {:?} -- use baja, media, alta or urgente",
                        self.priority
                    )
                }),
            ServiceOrderFormField::Problem => required(
                !self.problem.is_empty(),
                "problem description is required -- describe the fault and retry",
            ),
        }
    }

    fn related(field: Self::Field) -> &'static [Self::Field] {
        match field {
            ServiceOrderFormField::ReceivedOn => &[ServiceOrderFormField::PromisedOn],
            _ => &[],
        }
    }
}

// Service budgets.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceBudgetFormField {
    ServiceOrder,
    IssuedOn,
    ValidUntil,
    Labor,
    Parts,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceBudgetForm {
    #[serde(rename = "orden_servicio_id")]
    pub service_order: Option<ServiceOrderId>,
    #[serde(rename = "fecha", serialize_with = "wire_date::serialize")]
    pub issued_on: Option<Date>,
    #[serde(rename = "fecha_vencimiento", serialize_with = "wire_date::serialize")]
    pub valid_until: Option<Date>,
    #[serde(rename = "mano_obra")]
    pub labor: Option<Money>,
    #[serde(rename = "repuestos")]
    pub parts: Option<Money>,
    /// Labor plus parts; kept in step by `assign`.
    #[serde(rename = "monto_total")]
    pub total: Money,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: &'static str,
}

impl Default for ServiceBudgetForm {
    fn default() -> Self {
        Self {
            service_order: None,
            issued_on: None,
            valid_until: None,
            labor: None,
            parts: None,
            total: Money::ZERO,
            description: String::new(),
            status: "pendiente",
        }
    }
}

impl FormModel for ServiceBudgetForm {
    type Field = ServiceBudgetFormField;

    const KIND: FormKind = FormKind::ServiceBudget;
    const FIELDS: &'static [Self::Field] = &[
        ServiceBudgetFormField::ServiceOrder,
        ServiceBudgetFormField::IssuedOn,
        ServiceBudgetFormField::ValidUntil,
        ServiceBudgetFormField::Labor,
        ServiceBudgetFormField::Parts,
        ServiceBudgetFormField::Description,
    ];

    fn field_name(field: Self::Field) -> &'static str {
        match field {
            ServiceBudgetFormField::ServiceOrder => "orden_servicio_id",
            ServiceBudgetFormField::IssuedOn => "fecha",
            ServiceBudgetFormField::ValidUntil => "fecha_vencimiento",
            ServiceBudgetFormField::Labor => "mano_obra",
            ServiceBudgetFormField::Parts => "repuestos",
            ServiceBudgetFormField::Description => "descripcion",
        }
    }

    fn field_label(field: Self::Field) -> &'static str {
        match field {
            ServiceBudgetFormField::ServiceOrder => "Orden de servicio (id)",
            ServiceBudgetFormField::IssuedOn => "Fecha",
            ServiceBudgetFormField::ValidUntil => "Válido hasta",
            ServiceBudgetFormField::Labor => "Mano de obra",
            ServiceBudgetFormField::Parts => "Repuestos",
            ServiceBudgetFormField::Description => "Descripción",
        }
    }

    fn assign(&mut self, field: Self::Field, raw: &str) -> Result<(), String> {
        match field {
            ServiceBudgetFormField::ServiceOrder => self.service_order = parse_id(raw)?,
            ServiceBudgetFormField::IssuedOn => self.issued_on = parse_date(raw)?,
            ServiceBudgetFormField::ValidUntil => self.valid_until = parse_date(raw)?,
            ServiceBudgetFormField::Labor => self.labor = parse_amount(raw)?,
            ServiceBudgetFormField::Parts => self.parts = parse_amount(raw)?,
            ServiceBudgetFormField::Description => self.description = raw.trim().to_owned(),
        }
        self.total = self
            .labor
            .unwrap_or(Money::ZERO)
            .saturating_add(self.parts.unwrap_or(Money::ZERO));
        Ok(())
    }

    fn check(&self, field: Self::Field) -> Option<String> {
        match field {
            ServiceBudgetFormField::ServiceOrder => required(
                self.service_order.is_some(),
                "service order is required -- choose an order and retry",
            ),
            ServiceBudgetFormField::IssuedOn => required(
                self.issued_on.is_some(),
                "budget date is required -- enter a date and retry",
            ),
            ServiceBudgetFormField::ValidUntil => required(
                self.valid_until.is_some(),
                "expiry date is required -- enter a date and retry",
            )
            .or_else(|| {
                not_before(
                    self.valid_until,
                    self.issued_on,
                    "expiry date must be on/after the budget date",
                )
            }),
            ServiceBudgetFormField::Labor => (self.total.cents() <= 0)
                .then(|| "budget total must be positive -- enter labor or parts".to_owned()),
            ServiceBudgetFormField::Parts => None,
            ServiceBudgetFormField::Description => required(
                !self.description.is_empty(),
                "description is required -- describe the work and retry",
            ),
        }
    }

    fn related(field: Self::Field) -> &'static [Self::Field] {
        match field {
            ServiceBudgetFormField::IssuedOn => &[ServiceBudgetFormField::ValidUntil],
            ServiceBudgetFormField::Parts => &[ServiceBudgetFormField::Labor],
            _ => &[],
        }
    }
}

// Credit and debit notes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentNoteFormField {
    Kind,
    Sale,
    IssuedOn,
    Amount,
    Reason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjustmentNoteForm {
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "venta_id")]
    pub sale: Option<SaleId>,
    #[serde(rename = "fecha", serialize_with = "wire_date::serialize")]
    pub issued_on: Option<Date>,
    #[serde(rename = "monto")]
    pub amount: Option<Money>,
    #[serde(rename = "motivo")]
    pub reason: String,
}

impl Default for AdjustmentNoteForm {
    fn default() -> Self {
        Self {
            kind: "credito".to_owned(),
            sale: None,
            issued_on: None,
            amount: None,
            reason: String::new(),
        }
    }
}

impl FormModel for AdjustmentNoteForm {
    type Field = AdjustmentNoteFormField;

    const KIND: FormKind = FormKind::AdjustmentNote;
    const FIELDS: &'static [Self::Field] = &[
        AdjustmentNoteFormField::Kind,
        AdjustmentNoteFormField::Sale,
        AdjustmentNoteFormField::IssuedOn,
        AdjustmentNoteFormField::Amount,
        AdjustmentNoteFormField::Reason,
    ];

    fn field_name(field: Self::Field) -> &'static str {
        match field {
            AdjustmentNoteFormField::Kind => "tipo",
            AdjustmentNoteFormField::Sale => "venta_id",
            AdjustmentNoteFormField::IssuedOn => "fecha",
            AdjustmentNoteFormField::Amount => "monto",
            AdjustmentNoteFormField::Reason => "motivo",
        }
    }

    fn field_label(field: Self::Field) -> &'static str {
        match field {
            AdjustmentNoteFormField::Kind => "Tipo (credito/debito)",
            AdjustmentNoteFormField::Sale => "Venta (id)",
            AdjustmentNoteFormField::IssuedOn => "Fecha",
            AdjustmentNoteFormField::Amount => "Monto",
            AdjustmentNoteFormField::Reason => "Motivo",
        }
    }

    fn assign(&mut self, field: Self::Field, raw: &str) -> Result<(), String> {
        match field {
            AdjustmentNoteFormField::Kind => self.kind = raw.trim().to_lowercase(),
            AdjustmentNoteFormField::Sale => self.sale = parse_id(raw)?,
            AdjustmentNoteFormField::IssuedOn => self.issued_on = parse_date(raw)?,
            AdjustmentNoteFormField::Amount => self.amount = parse_amount(raw)?,
            AdjustmentNoteFormField::Reason => self.reason = raw.trim().to_owned(),
        }
        Ok(())
    }

    fn check(&self, field: Self::Field) -> Option<String> {
        match field {
            AdjustmentNoteFormField::Kind => NOTE_KIND
                .get(&self.kind)
                .is_none()
                .then(|| format!("unknown note type {:?} -- use credito or debito", self.kind)),
            AdjustmentNoteFormField::Sale => required(
                self.sale.is_some(),
                "sale is required -- choose the invoiced sale and retry",
            ),
            AdjustmentNoteFormField::IssuedOn => required(
                self.issued_on.is_some(),
                "note date is required -- enter a date and retry",
            ),
            AdjustmentNoteFormField::Amount => positive(self.amount, "note amount"),
            AdjustmentNoteFormField::Reason => required(
                !self.reason.is_empty(),
                "reason is required -- explain the adjustment and retry",
            ),
        }
    }
}

/// One form field as a presentation layer shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub label: &'static str,
    pub raw: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum FormPayload {
    PurchaseOrder(FormState<PurchaseOrderForm>),
    ServiceOrder(FormState<ServiceOrderForm>),
    ServiceBudget(FormState<ServiceBudgetForm>),
    AdjustmentNote(FormState<AdjustmentNoteForm>),
}

macro_rules! with_state {
    ($payload:expr, $state:ident => $body:expr) => {
        match $payload {
            FormPayload::PurchaseOrder($state) => $body,
            FormPayload::ServiceOrder($state) => $body,
            FormPayload::ServiceBudget($state) => $body,
            FormPayload::AdjustmentNote($state) => $body,
        }
    };
}

fn field_views<M: FormModel>(state: &FormState<M>) -> Vec<FieldView> {
    M::FIELDS
        .iter()
        .map(|field| FieldView {
            label: M::field_label(*field),
            raw: state.raw(*field).to_owned(),
            error: state.error(*field).map(str::to_owned),
        })
        .collect()
}

fn set_nth<M: FormModel>(state: &mut FormState<M>, index: usize, raw: String) -> bool {
    match M::FIELDS.get(index) {
        Some(field) => {
            state.set(*field, raw);
            true
        }
        None => false,
    }
}

impl FormPayload {
    pub fn blank_for(kind: FormKind) -> Self {
        match kind {
            FormKind::PurchaseOrder => Self::PurchaseOrder(FormState::new()),
            FormKind::ServiceOrder => Self::ServiceOrder(FormState::new()),
            FormKind::ServiceBudget => Self::ServiceBudget(FormState::new()),
            FormKind::AdjustmentNote => Self::AdjustmentNote(FormState::new()),
        }
    }

    pub fn kind(&self) -> FormKind {
        match self {
            Self::PurchaseOrder(_) => PurchaseOrderForm::KIND,
            Self::ServiceOrder(_) => ServiceOrderForm::KIND,
            Self::ServiceBudget(_) => ServiceBudgetForm::KIND,
            Self::AdjustmentNote(_) => AdjustmentNoteForm::KIND,
        }
    }

    pub fn fields(&self) -> Vec<FieldView> {
        with_state!(self, state => field_views(state))
    }

    /// Sets the field at `index` in display order; false when out of range.
    pub fn set_nth(&mut self, index: usize, raw: impl Into<String>) -> bool {
        let raw = raw.into();
        with_state!(self, state => set_nth(state, index, raw))
    }

    pub fn errors(&self) -> &FieldErrors {
        with_state!(self, state => state.errors())
    }

    pub fn body(&mut self) -> Result<serde_json::Value, FormError> {
        with_state!(self, state => state.body())
    }

    /// Validates every field and packages the body as a create request.
    pub fn mutation(&mut self) -> Result<Mutation, FormError> {
        Ok(Mutation::Create {
            view: self.kind().view(),
            body: self.body()?,
        })
    }
}
