// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Field sets, badge tables, deadline rules and metric specs for every
//! list page.

use crate::{
    AdjustmentNote, BadgeStyle, CategoricalLookup, Column, Condition, DeadlineRule, Equipment,
    FieldValue, FilterMode, ListRecord, ListSchema, LookupEntry, MetricSpec, Pickup,
    PurchaseOrder, RecordField, ServiceBudget, ServiceOrder, ViewKind,
};

macro_rules! record_fields {
    ($name:ident { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl RecordField for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn wire_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    };
}

const fn entry(
    value: &'static str,
    label: &'static str,
    style: BadgeStyle,
    icon: &'static str,
) -> LookupEntry {
    LookupEntry {
        value,
        label,
        style,
        icon,
    }
}

// Badge tables.

pub static PURCHASE_STATUS: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("pendiente", "Pendiente", BadgeStyle::Warning, "clock"),
        entry("aprobada", "Aprobada", BadgeStyle::Info, "check"),
        entry("enviada", "Enviada", BadgeStyle::Info, "send"),
        entry("recibida", "Recibida", BadgeStyle::Success, "package"),
        entry("cancelada", "Cancelada", BadgeStyle::Danger, "x"),
    ],
};

pub static SERVICE_STATUS: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("recibido", "Recibido", BadgeStyle::Neutral, "inbox"),
        entry("en_diagnostico", "En diagnóstico", BadgeStyle::Info, "search"),
        entry("en_reparacion", "En reparación", BadgeStyle::Warning, "wrench"),
        entry("listo", "Listo", BadgeStyle::Success, "check"),
        entry("entregado", "Entregado", BadgeStyle::Success, "truck"),
        entry("cancelado", "Cancelado", BadgeStyle::Danger, "x"),
    ],
};

pub static SERVICE_PRIORITY: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("baja", "Baja", BadgeStyle::Neutral, "arrow-down"),
        entry("media", "Media", BadgeStyle::Info, "minus"),
        entry("alta", "Alta", BadgeStyle::Warning, "arrow-up"),
        entry("urgente", "Urgente", BadgeStyle::Danger, "alert"),
    ],
};

pub static BUDGET_STATUS: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("pendiente", "Pendiente", BadgeStyle::Warning, "clock"),
        entry("aprobado", "Aprobado", BadgeStyle::Success, "check"),
        entry("rechazado", "Rechazado", BadgeStyle::Danger, "x"),
        entry("vencido", "Vencido", BadgeStyle::Neutral, "calendar"),
    ],
};

pub static NOTE_KIND: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("credito", "Nota de crédito", BadgeStyle::Info, "arrow-left"),
        entry("debito", "Nota de débito", BadgeStyle::Warning, "arrow-right"),
    ],
};

pub static NOTE_STATUS: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("pendiente", "Pendiente", BadgeStyle::Warning, "clock"),
        entry("emitida", "Emitida", BadgeStyle::Success, "check"),
        entry("anulada", "Anulada", BadgeStyle::Danger, "ban"),
    ],
};

pub static EQUIPMENT_KIND: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("notebook", "Notebook", BadgeStyle::Info, "laptop"),
        entry("desktop", "Escritorio", BadgeStyle::Info, "monitor"),
        entry("impresora", "Impresora", BadgeStyle::Info, "printer"),
        entry("celular", "Celular", BadgeStyle::Info, "phone"),
        entry("tablet", "Tablet", BadgeStyle::Info, "tablet"),
        entry("otro", "Otro", BadgeStyle::Neutral, "box"),
    ],
};

pub static EQUIPMENT_STATUS: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("activo", "Activo", BadgeStyle::Success, "check"),
        entry("en_servicio", "En servicio", BadgeStyle::Warning, "wrench"),
        entry("baja", "De baja", BadgeStyle::Danger, "archive"),
    ],
};

pub static PICKUP_STATUS: CategoricalLookup = CategoricalLookup {
    entries: &[
        entry("programado", "Programado", BadgeStyle::Info, "calendar"),
        entry("pendiente", "Pendiente", BadgeStyle::Warning, "clock"),
        entry("retirado", "Retirado", BadgeStyle::Success, "check"),
        entry("cancelado", "Cancelado", BadgeStyle::Danger, "x"),
    ],
};

// Purchase orders.

record_fields!(PurchaseOrderField {
    Number => ("numero", "Número"),
    Supplier => ("proveedor_nombre", "Proveedor"),
    RequestedBy => ("usuario", "Usuario"),
    IssuedOn => ("fecha", "Fecha"),
    DueOn => ("fecha_entrega", "Entrega"),
    Status => ("estado", "Estado"),
    Total => ("monto_total", "Monto"),
});

static PURCHASE_ORDER_SCHEMA: ListSchema<PurchaseOrderField> = ListSchema {
    columns: &[
        Column {
            field: PurchaseOrderField::Number,
            label: "Número",
        },
        Column {
            field: PurchaseOrderField::Supplier,
            label: "Proveedor",
        },
        Column {
            field: PurchaseOrderField::IssuedOn,
            label: "Fecha",
        },
        Column {
            field: PurchaseOrderField::DueOn,
            label: "Entrega",
        },
        Column {
            field: PurchaseOrderField::Status,
            label: "Estado",
        },
        Column {
            field: PurchaseOrderField::Total,
            label: "Monto",
        },
    ],
    search: &[
        PurchaseOrderField::Number,
        PurchaseOrderField::Supplier,
        PurchaseOrderField::RequestedBy,
    ],
    categorical: &[PurchaseOrderField::Status],
    lookups: &[(PurchaseOrderField::Status, &PURCHASE_STATUS)],
    deadline: Some(DeadlineRule {
        deadline: PurchaseOrderField::DueOn,
        status: PurchaseOrderField::Status,
        terminal: &["recibida", "cancelada"],
    }),
    mode: FilterMode::Live,
};

impl ListRecord for PurchaseOrder {
    type Field = PurchaseOrderField;

    const VIEW: ViewKind = ViewKind::PurchaseOrders;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn key(&self) -> String {
        self.number.clone()
    }

    fn value(&self, field: Self::Field) -> FieldValue<'_> {
        match field {
            PurchaseOrderField::Number => FieldValue::Text(Some(&self.number)),
            PurchaseOrderField::Supplier => FieldValue::Text(self.supplier.as_deref()),
            PurchaseOrderField::RequestedBy => FieldValue::Text(self.requested_by.as_deref()),
            PurchaseOrderField::IssuedOn => FieldValue::Date(self.issued_on.as_deref()),
            PurchaseOrderField::DueOn => FieldValue::Date(self.due_on.as_deref()),
            PurchaseOrderField::Status => FieldValue::Category(self.status.as_deref()),
            PurchaseOrderField::Total => FieldValue::Money(self.total),
        }
    }

    fn schema() -> &'static ListSchema<Self::Field> {
        &PURCHASE_ORDER_SCHEMA
    }

    fn metric_specs() -> Vec<MetricSpec<Self::Field>> {
        use PurchaseOrderField::{Status, Total};
        vec![
            MetricSpec::Count { label: "Órdenes" },
            MetricSpec::CountWhere {
                label: "Pendientes",
                condition: Condition::Equals(Status, "pendiente"),
            },
            MetricSpec::SumBy {
                label: "Monto total",
                field: Total,
            },
            MetricSpec::SumByWhere {
                label: "Por recibir",
                field: Total,
                condition: Condition::OneOf(Status, &["pendiente", "aprobada", "enviada"]),
            },
            MetricSpec::DistributionBy { field: Status },
        ]
    }
}

// Service orders.

record_fields!(ServiceOrderField {
    Number => ("numero", "Número"),
    Customer => ("cliente_nombre", "Cliente"),
    Equipment => ("equipo_descripcion", "Equipo"),
    Technician => ("tecnico_nombre", "Técnico"),
    ReceivedOn => ("fecha_ingreso", "Ingreso"),
    PromisedOn => ("fecha_entrega_estimada", "Entrega estimada"),
    Status => ("estado", "Estado"),
    Priority => ("prioridad", "Prioridad"),
    Total => ("monto_total", "Monto"),
});

static SERVICE_ORDER_SCHEMA: ListSchema<ServiceOrderField> = ListSchema {
    columns: &[
        Column {
            field: ServiceOrderField::Number,
            label: "Número",
        },
        Column {
            field: ServiceOrderField::Customer,
            label: "Cliente",
        },
        Column {
            field: ServiceOrderField::Equipment,
            label: "Equipo",
        },
        Column {
            field: ServiceOrderField::Technician,
            label: "Técnico",
        },
        Column {
            field: ServiceOrderField::ReceivedOn,
            label: "Ingreso",
        },
        Column {
            field: ServiceOrderField::PromisedOn,
            label: "Entrega",
        },
        Column {
            field: ServiceOrderField::Priority,
            label: "Prioridad",
        },
        Column {
            field: ServiceOrderField::Status,
            label: "Estado",
        },
        Column {
            field: ServiceOrderField::Total,
            label: "Monto",
        },
    ],
    search: &[
        ServiceOrderField::Number,
        ServiceOrderField::Customer,
        ServiceOrderField::Equipment,
        ServiceOrderField::Technician,
    ],
    categorical: &[ServiceOrderField::Status, ServiceOrderField::Priority],
    lookups: &[
        (ServiceOrderField::Status, &SERVICE_STATUS),
        (ServiceOrderField::Priority, &SERVICE_PRIORITY),
    ],
    deadline: Some(DeadlineRule {
        deadline: ServiceOrderField::PromisedOn,
        status: ServiceOrderField::Status,
        terminal: &["entregado", "cancelado"],
    }),
    mode: FilterMode::Live,
};

impl ListRecord for ServiceOrder {
    type Field = ServiceOrderField;

    const VIEW: ViewKind = ViewKind::ServiceOrders;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn key(&self) -> String {
        self.number.clone()
    }

    fn value(&self, field: Self::Field) -> FieldValue<'_> {
        match field {
            ServiceOrderField::Number => FieldValue::Text(Some(&self.number)),
            ServiceOrderField::Customer => FieldValue::Text(self.customer.as_deref()),
            ServiceOrderField::Equipment => FieldValue::Text(self.equipment.as_deref()),
            ServiceOrderField::Technician => FieldValue::Text(self.technician.as_deref()),
            ServiceOrderField::ReceivedOn => FieldValue::Date(self.received_on.as_deref()),
            ServiceOrderField::PromisedOn => FieldValue::Date(self.promised_on.as_deref()),
            ServiceOrderField::Status => FieldValue::Category(self.status.as_deref()),
            ServiceOrderField::Priority => FieldValue::Category(self.priority.as_deref()),
            ServiceOrderField::Total => FieldValue::Money(self.total),
        }
    }

    fn schema() -> &'static ListSchema<Self::Field> {
        &SERVICE_ORDER_SCHEMA
    }

    fn metric_specs() -> Vec<MetricSpec<Self::Field>> {
        use ServiceOrderField::{Priority, Status, Total};
        vec![
            MetricSpec::Count { label: "Órdenes" },
            MetricSpec::CountWhere {
                label: "En taller",
                condition: Condition::OneOf(Status, &["en_diagnostico", "en_reparacion"]),
            },
            MetricSpec::CountWhere {
                label: "Urgentes",
                condition: Condition::Equals(Priority, "urgente"),
            },
            MetricSpec::SumBy {
                label: "Monto total",
                field: Total,
            },
            MetricSpec::DistributionBy { field: Status },
        ]
    }
}

// Service budgets.

record_fields!(ServiceBudgetField {
    Number => ("numero", "Número"),
    Customer => ("cliente_nombre", "Cliente"),
    Description => ("descripcion", "Descripción"),
    IssuedOn => ("fecha", "Fecha"),
    ValidUntil => ("fecha_vencimiento", "Vence"),
    Status => ("estado", "Estado"),
    Total => ("monto_total", "Monto"),
});

static SERVICE_BUDGET_SCHEMA: ListSchema<ServiceBudgetField> = ListSchema {
    columns: &[
        Column {
            field: ServiceBudgetField::Number,
            label: "Número",
        },
        Column {
            field: ServiceBudgetField::Customer,
            label: "Cliente",
        },
        Column {
            field: ServiceBudgetField::Description,
            label: "Descripción",
        },
        Column {
            field: ServiceBudgetField::IssuedOn,
            label: "Fecha",
        },
        Column {
            field: ServiceBudgetField::ValidUntil,
            label: "Vence",
        },
        Column {
            field: ServiceBudgetField::Status,
            label: "Estado",
        },
        Column {
            field: ServiceBudgetField::Total,
            label: "Monto",
        },
    ],
    search: &[
        ServiceBudgetField::Number,
        ServiceBudgetField::Customer,
        ServiceBudgetField::Description,
    ],
    categorical: &[ServiceBudgetField::Status],
    lookups: &[(ServiceBudgetField::Status, &BUDGET_STATUS)],
    deadline: Some(DeadlineRule {
        deadline: ServiceBudgetField::ValidUntil,
        status: ServiceBudgetField::Status,
        terminal: &["aprobado", "rechazado"],
    }),
    mode: FilterMode::Live,
};

impl ListRecord for ServiceBudget {
    type Field = ServiceBudgetField;

    const VIEW: ViewKind = ViewKind::ServiceBudgets;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn key(&self) -> String {
        self.number.clone()
    }

    fn value(&self, field: Self::Field) -> FieldValue<'_> {
        match field {
            ServiceBudgetField::Number => FieldValue::Text(Some(&self.number)),
            ServiceBudgetField::Customer => FieldValue::Text(self.customer.as_deref()),
            ServiceBudgetField::Description => FieldValue::Text(self.description.as_deref()),
            ServiceBudgetField::IssuedOn => FieldValue::Date(self.issued_on.as_deref()),
            ServiceBudgetField::ValidUntil => FieldValue::Date(self.valid_until.as_deref()),
            ServiceBudgetField::Status => FieldValue::Category(self.status.as_deref()),
            ServiceBudgetField::Total => FieldValue::Money(self.total),
        }
    }

    fn schema() -> &'static ListSchema<Self::Field> {
        &SERVICE_BUDGET_SCHEMA
    }

    fn metric_specs() -> Vec<MetricSpec<Self::Field>> {
        use ServiceBudgetField::{Status, Total};
        vec![
            MetricSpec::Count {
                label: "Presupuestos",
            },
            MetricSpec::CountWhere {
                label: "Aprobados",
                condition: Condition::Equals(Status, "aprobado"),
            },
            MetricSpec::SumByWhere {
                label: "Monto aprobado",
                field: Total,
                condition: Condition::Equals(Status, "aprobado"),
            },
            MetricSpec::DistributionBy { field: Status },
        ]
    }
}

// Credit and debit notes. The notes page is a report: filters are staged
// and applied with "Generar Informe".

record_fields!(AdjustmentNoteField {
    Number => ("numero", "Número"),
    Kind => ("tipo", "Tipo"),
    Customer => ("cliente_nombre", "Cliente"),
    Reason => ("motivo", "Motivo"),
    IssuedOn => ("fecha", "Fecha"),
    Status => ("estado", "Estado"),
    Amount => ("monto", "Monto"),
});

static ADJUSTMENT_NOTE_SCHEMA: ListSchema<AdjustmentNoteField> = ListSchema {
    columns: &[
        Column {
            field: AdjustmentNoteField::Number,
            label: "Número",
        },
        Column {
            field: AdjustmentNoteField::Kind,
            label: "Tipo",
        },
        Column {
            field: AdjustmentNoteField::Customer,
            label: "Cliente",
        },
        Column {
            field: AdjustmentNoteField::Reason,
            label: "Motivo",
        },
        Column {
            field: AdjustmentNoteField::IssuedOn,
            label: "Fecha",
        },
        Column {
            field: AdjustmentNoteField::Status,
            label: "Estado",
        },
        Column {
            field: AdjustmentNoteField::Amount,
            label: "Monto",
        },
    ],
    search: &[
        AdjustmentNoteField::Number,
        AdjustmentNoteField::Customer,
        AdjustmentNoteField::Reason,
    ],
    categorical: &[AdjustmentNoteField::Kind, AdjustmentNoteField::Status],
    lookups: &[
        (AdjustmentNoteField::Kind, &NOTE_KIND),
        (AdjustmentNoteField::Status, &NOTE_STATUS),
    ],
    deadline: None,
    mode: FilterMode::Staged,
};

impl ListRecord for AdjustmentNote {
    type Field = AdjustmentNoteField;

    const VIEW: ViewKind = ViewKind::AdjustmentNotes;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn key(&self) -> String {
        self.number.clone()
    }

    fn value(&self, field: Self::Field) -> FieldValue<'_> {
        match field {
            AdjustmentNoteField::Number => FieldValue::Text(Some(&self.number)),
            AdjustmentNoteField::Kind => FieldValue::Category(self.kind.as_deref()),
            AdjustmentNoteField::Customer => FieldValue::Text(self.customer.as_deref()),
            AdjustmentNoteField::Reason => FieldValue::Text(self.reason.as_deref()),
            AdjustmentNoteField::IssuedOn => FieldValue::Date(self.issued_on.as_deref()),
            AdjustmentNoteField::Status => FieldValue::Category(self.status.as_deref()),
            AdjustmentNoteField::Amount => FieldValue::Money(self.amount),
        }
    }

    fn schema() -> &'static ListSchema<Self::Field> {
        &ADJUSTMENT_NOTE_SCHEMA
    }

    fn metric_specs() -> Vec<MetricSpec<Self::Field>> {
        use AdjustmentNoteField::{Amount, Kind, Status};
        vec![
            MetricSpec::Count { label: "Notas" },
            MetricSpec::SumByWhere {
                label: "Crédito",
                field: Amount,
                condition: Condition::Equals(Kind, "credito"),
            },
            MetricSpec::SumByWhere {
                label: "Débito",
                field: Amount,
                condition: Condition::Equals(Kind, "debito"),
            },
            MetricSpec::CountWhere {
                label: "Anuladas",
                condition: Condition::Equals(Status, "anulada"),
            },
            MetricSpec::DistributionBy { field: Kind },
        ]
    }
}

// Equipment.

record_fields!(EquipmentField {
    SerialNumber => ("numero_serie", "Serie"),
    Kind => ("tipo", "Tipo"),
    Brand => ("marca", "Marca"),
    Model => ("modelo", "Modelo"),
    Customer => ("cliente_nombre", "Cliente"),
    Status => ("estado", "Estado"),
    RegisteredOn => ("fecha_registro", "Registro"),
});

static EQUIPMENT_SCHEMA: ListSchema<EquipmentField> = ListSchema {
    columns: &[
        Column {
            field: EquipmentField::SerialNumber,
            label: "Serie",
        },
        Column {
            field: EquipmentField::Kind,
            label: "Tipo",
        },
        Column {
            field: EquipmentField::Brand,
            label: "Marca",
        },
        Column {
            field: EquipmentField::Model,
            label: "Modelo",
        },
        Column {
            field: EquipmentField::Customer,
            label: "Cliente",
        },
        Column {
            field: EquipmentField::Status,
            label: "Estado",
        },
        Column {
            field: EquipmentField::RegisteredOn,
            label: "Registro",
        },
    ],
    search: &[
        EquipmentField::SerialNumber,
        EquipmentField::Brand,
        EquipmentField::Model,
        EquipmentField::Customer,
    ],
    categorical: &[EquipmentField::Kind, EquipmentField::Status],
    lookups: &[
        (EquipmentField::Kind, &EQUIPMENT_KIND),
        (EquipmentField::Status, &EQUIPMENT_STATUS),
    ],
    deadline: None,
    mode: FilterMode::Live,
};

impl ListRecord for Equipment {
    type Field = EquipmentField;

    const VIEW: ViewKind = ViewKind::Equipment;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn value(&self, field: Self::Field) -> FieldValue<'_> {
        match field {
            EquipmentField::SerialNumber => FieldValue::Text(self.serial_number.as_deref()),
            EquipmentField::Kind => FieldValue::Category(self.kind.as_deref()),
            EquipmentField::Brand => FieldValue::Text(self.brand.as_deref()),
            EquipmentField::Model => FieldValue::Text(self.model.as_deref()),
            EquipmentField::Customer => FieldValue::Text(self.customer.as_deref()),
            EquipmentField::Status => FieldValue::Category(self.status.as_deref()),
            EquipmentField::RegisteredOn => FieldValue::Date(self.registered_on.as_deref()),
        }
    }

    fn schema() -> &'static ListSchema<Self::Field> {
        &EQUIPMENT_SCHEMA
    }

    fn metric_specs() -> Vec<MetricSpec<Self::Field>> {
        use EquipmentField::{Kind, Status};
        vec![
            MetricSpec::Count { label: "Equipos" },
            MetricSpec::CountWhere {
                label: "En servicio",
                condition: Condition::Equals(Status, "en_servicio"),
            },
            MetricSpec::DistributionBy { field: Kind },
        ]
    }
}

// Pickups.

record_fields!(PickupField {
    Number => ("numero", "Número"),
    Customer => ("cliente_nombre", "Cliente"),
    Equipment => ("equipo_descripcion", "Equipo"),
    ScheduledOn => ("fecha_programada", "Programado"),
    Status => ("estado", "Estado"),
    Balance => ("saldo_pendiente", "Saldo"),
});

static PICKUP_SCHEMA: ListSchema<PickupField> = ListSchema {
    columns: &[
        Column {
            field: PickupField::Number,
            label: "Número",
        },
        Column {
            field: PickupField::Customer,
            label: "Cliente",
        },
        Column {
            field: PickupField::Equipment,
            label: "Equipo",
        },
        Column {
            field: PickupField::ScheduledOn,
            label: "Programado",
        },
        Column {
            field: PickupField::Status,
            label: "Estado",
        },
        Column {
            field: PickupField::Balance,
            label: "Saldo",
        },
    ],
    search: &[
        PickupField::Number,
        PickupField::Customer,
        PickupField::Equipment,
    ],
    categorical: &[PickupField::Status],
    lookups: &[(PickupField::Status, &PICKUP_STATUS)],
    deadline: Some(DeadlineRule {
        deadline: PickupField::ScheduledOn,
        status: PickupField::Status,
        terminal: &["retirado", "cancelado"],
    }),
    mode: FilterMode::Live,
};

impl ListRecord for Pickup {
    type Field = PickupField;

    const VIEW: ViewKind = ViewKind::Pickups;

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn key(&self) -> String {
        self.number.clone()
    }

    fn value(&self, field: Self::Field) -> FieldValue<'_> {
        match field {
            PickupField::Number => FieldValue::Text(Some(&self.number)),
            PickupField::Customer => FieldValue::Text(self.customer.as_deref()),
            PickupField::Equipment => FieldValue::Text(self.equipment.as_deref()),
            PickupField::ScheduledOn => FieldValue::Date(self.scheduled_on.as_deref()),
            PickupField::Status => FieldValue::Category(self.status.as_deref()),
            PickupField::Balance => FieldValue::Money(self.balance),
        }
    }

    fn schema() -> &'static ListSchema<Self::Field> {
        &PICKUP_SCHEMA
    }

    fn metric_specs() -> Vec<MetricSpec<Self::Field>> {
        use PickupField::{Balance, Status};
        vec![
            MetricSpec::Count { label: "Retiros" },
            MetricSpec::CountWhere {
                label: "Por retirar",
                condition: Condition::OneOf(Status, &["retirado", "cancelado"]).not(),
            },
            MetricSpec::SumByWhere {
                label: "Saldo por cobrar",
                field: Balance,
                condition: Condition::OneOf(Status, &["retirado", "cancelado"]).not(),
            },
            MetricSpec::DistributionBy { field: Status },
        ]
    }
}
