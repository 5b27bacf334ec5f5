// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::*;

/// Monetary amount in hundredths of the currency unit.
///
/// The backend sends amounts as JSON numbers or numeric strings in whole
/// currency units (`150000.5`, `"150000.50"`); both decode here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn from_units(units: f64) -> Option<Self> {
        if !units.is_finite() {
            return None;
        }
        let cents = (units * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub fn units(self) -> f64 {
        (self.0 as f64) / 100.0
    }

    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.units())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Float(f64),
            Text(String),
        }

        let invalid = |raw: &str| serde::de::Error::custom(format!("invalid amount {raw:?}"));
        match Raw::deserialize(deserializer)? {
            Raw::Integer(units) => units
                .checked_mul(100)
                .map(Self)
                .ok_or_else(|| invalid(&units.to_string())),
            Raw::Float(units) => Self::from_units(units).ok_or_else(|| invalid(&units.to_string())),
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Self::from_units)
                .ok_or_else(|| invalid(&text)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    PurchaseOrders,
    ServiceOrders,
    ServiceBudgets,
    AdjustmentNotes,
    Equipment,
    Pickups,
}

impl ViewKind {
    pub const ALL: [Self; 6] = [
        Self::PurchaseOrders,
        Self::ServiceOrders,
        Self::ServiceBudgets,
        Self::AdjustmentNotes,
        Self::Equipment,
        Self::Pickups,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::PurchaseOrders => "compras",
            Self::ServiceOrders => "servicios",
            Self::ServiceBudgets => "presupuestos",
            Self::AdjustmentNotes => "notas",
            Self::Equipment => "equipos",
            Self::Pickups => "retiros",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::PurchaseOrders => "Órdenes de compra",
            Self::ServiceOrders => "Órdenes de servicio",
            Self::ServiceBudgets => "Presupuestos de servicio",
            Self::AdjustmentNotes => "Notas de crédito y débito",
            Self::Equipment => "Equipos",
            Self::Pickups => "Retiros de equipos",
        }
    }

    pub const fn resource(self) -> &'static str {
        match self {
            Self::PurchaseOrders => "/api/compras/ordenes",
            Self::ServiceOrders => "/api/servicios/ordenes",
            Self::ServiceBudgets => "/api/servicios/presupuestos",
            Self::AdjustmentNotes => "/api/ventas/notas",
            Self::Equipment => "/api/equipos",
            Self::Pickups => "/api/servicios/retiros",
        }
    }

    pub const fn form(self) -> Option<FormKind> {
        match self {
            Self::PurchaseOrders => Some(FormKind::PurchaseOrder),
            Self::ServiceOrders => Some(FormKind::ServiceOrder),
            Self::ServiceBudgets => Some(FormKind::ServiceBudget),
            Self::AdjustmentNotes => Some(FormKind::AdjustmentNote),
            Self::Equipment | Self::Pickups => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|view| view.label().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    PurchaseOrder,
    ServiceOrder,
    ServiceBudget,
    AdjustmentNote,
}

impl FormKind {
    pub const fn view(self) -> ViewKind {
        match self {
            Self::PurchaseOrder => ViewKind::PurchaseOrders,
            Self::ServiceOrder => ViewKind::ServiceOrders,
            Self::ServiceBudget => ViewKind::ServiceBudgets,
            Self::AdjustmentNote => ViewKind::AdjustmentNotes,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "nueva orden de compra",
            Self::ServiceOrder => "nueva orden de servicio",
            Self::ServiceBudget => "nuevo presupuesto",
            Self::AdjustmentNote => "nueva nota",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(rename = "orden_compra_id")]
    pub id: PurchaseOrderId,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "proveedor_nombre", default)]
    pub supplier: Option<String>,
    #[serde(rename = "usuario", default)]
    pub requested_by: Option<String>,
    #[serde(rename = "fecha", default)]
    pub issued_on: Option<String>,
    #[serde(rename = "fecha_entrega", default)]
    pub due_on: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "monto_total", default)]
    pub total: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrder {
    #[serde(rename = "orden_servicio_id")]
    pub id: ServiceOrderId,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "cliente_nombre", default)]
    pub customer: Option<String>,
    #[serde(rename = "equipo_descripcion", default)]
    pub equipment: Option<String>,
    #[serde(rename = "tecnico_nombre", default)]
    pub technician: Option<String>,
    #[serde(rename = "fecha_ingreso", default)]
    pub received_on: Option<String>,
    #[serde(rename = "fecha_entrega_estimada", default)]
    pub promised_on: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "prioridad", default)]
    pub priority: Option<String>,
    #[serde(rename = "monto_total", default)]
    pub total: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBudget {
    #[serde(rename = "presupuesto_id")]
    pub id: ServiceBudgetId,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "cliente_nombre", default)]
    pub customer: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "fecha", default)]
    pub issued_on: Option<String>,
    #[serde(rename = "fecha_vencimiento", default)]
    pub valid_until: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "monto_total", default)]
    pub total: Option<Money>,
}

/// Credit or debit note issued against a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentNote {
    #[serde(rename = "nota_id")]
    pub id: AdjustmentNoteId,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "tipo", default)]
    pub kind: Option<String>,
    #[serde(rename = "cliente_nombre", default)]
    pub customer: Option<String>,
    #[serde(rename = "motivo", default)]
    pub reason: Option<String>,
    #[serde(rename = "fecha", default)]
    pub issued_on: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "monto", default)]
    pub amount: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "equipo_id")]
    pub id: EquipmentId,
    #[serde(rename = "numero_serie", default)]
    pub serial_number: Option<String>,
    #[serde(rename = "tipo", default)]
    pub kind: Option<String>,
    #[serde(rename = "marca", default)]
    pub brand: Option<String>,
    #[serde(rename = "modelo", default)]
    pub model: Option<String>,
    #[serde(rename = "cliente_nombre", default)]
    pub customer: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "fecha_registro", default)]
    pub registered_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    #[serde(rename = "retiro_id")]
    pub id: PickupId,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "cliente_nombre", default)]
    pub customer: Option<String>,
    #[serde(rename = "equipo_descripcion", default)]
    pub equipment: Option<String>,
    #[serde(rename = "fecha_programada", default)]
    pub scheduled_on: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "saldo_pendiente", default)]
    pub balance: Option<Money>,
}

#[cfg(test)]
mod tests {
    use super::{Money, PurchaseOrder, ViewKind};

    #[test]
    fn money_decodes_numbers_and_numeric_strings() {
        let values: Vec<Money> =
            serde_json::from_str(r#"[150000, 1234.5, "99.99", " 10 "]"#).expect("decode money");
        assert_eq!(
            values,
            vec![
                Money::from_cents(15_000_000),
                Money::from_cents(123_450),
                Money::from_cents(9_999),
                Money::from_cents(1_000),
            ]
        );
    }

    #[test]
    fn money_rejects_non_numeric_strings() {
        let error = serde_json::from_str::<Money>(r#""mucho""#).expect_err("text is not money");
        assert!(error.to_string().contains("invalid amount"));
    }

    #[test]
    fn money_serializes_whole_units_as_integers() {
        assert_eq!(
            serde_json::to_string(&Money::from_cents(150_000)).expect("encode"),
            "1500"
        );
        assert_eq!(
            serde_json::to_string(&Money::from_cents(150_050)).expect("encode"),
            "1500.5"
        );
    }

    #[test]
    fn record_decodes_with_missing_optional_fields() {
        let order: PurchaseOrder =
            serde_json::from_str(r#"{"orden_compra_id": 7, "numero": "OC-007"}"#)
                .expect("decode sparse order");
        assert_eq!(order.number, "OC-007");
        assert!(order.status.is_none());
        assert!(order.total.is_none());
    }

    #[test]
    fn view_kind_parses_labels_case_insensitively() {
        assert_eq!(ViewKind::parse("Compras"), Some(ViewKind::PurchaseOrders));
        assert_eq!(ViewKind::parse(" retiros "), Some(ViewKind::Pickups));
        assert_eq!(ViewKind::parse("ventas"), None);
    }
}
