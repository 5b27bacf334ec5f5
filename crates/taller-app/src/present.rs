// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, OffsetDateTime, UtcOffset};

use crate::{FieldValue, ListRecord, Locale, format_date, format_money, parse_wire_date};

pub const DEFAULT_EXPIRING_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BadgeStyle {
    #[default]
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupEntry {
    pub value: &'static str,
    pub label: &'static str,
    pub style: BadgeStyle,
    pub icon: &'static str,
}

/// Static table mapping a categorical value to its badge.
#[derive(Debug)]
pub struct CategoricalLookup {
    pub entries: &'static [LookupEntry],
}

impl CategoricalLookup {
    pub const fn new(entries: &'static [LookupEntry]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [LookupEntry] {
        self.entries
    }

    pub fn get(&self, value: &str) -> Option<&'static LookupEntry> {
        let value = value.trim();
        self.entries
            .iter()
            .find(|entry| entry.value.eq_ignore_ascii_case(value))
    }

    pub fn badge(&self, value: Option<&str>) -> Badge {
        match value.and_then(|value| self.get(value)) {
            Some(entry) => Badge {
                label: entry.label.to_owned(),
                style: entry.style,
                icon: Some(entry.icon),
            },
            None => Badge::fallback(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub style: BadgeStyle,
    pub icon: Option<&'static str>,
}

impl Badge {
    /// Unknown and absent values keep their raw text with a neutral style.
    pub fn fallback(value: Option<&str>) -> Self {
        Self {
            label: value.unwrap_or_default().trim().to_owned(),
            style: BadgeStyle::Neutral,
            icon: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Badge(Badge),
    Date(String),
    Money(String),
}

impl Cell {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Date(text) | Self::Money(text) => text,
            Self::Badge(badge) => &badge.label,
        }
    }
}

/// Which fields make a record overdue, and which statuses close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineRule<F: 'static> {
    pub deadline: F,
    pub status: F,
    pub terminal: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeadlineFlags {
    pub overdue: bool,
    pub expiring_soon: bool,
    pub days_until: Option<i64>,
}

/// `overdue` and `expiring_soon` never hold together, and neither holds
/// for a record whose status is terminal.
pub fn deadline_flags(
    deadline: Option<Date>,
    status: Option<&str>,
    terminal: &[&str],
    today: Date,
    threshold_days: i64,
) -> DeadlineFlags {
    let Some(deadline) = deadline else {
        return DeadlineFlags::default();
    };
    let days = (deadline - today).whole_days();
    let closed = status.is_some_and(|status| {
        terminal
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(status.trim()))
    });
    DeadlineFlags {
        overdue: !closed && days < 0,
        expiring_soon: !closed && days > 0 && days <= threshold_days,
        days_until: Some(days),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentContext {
    pub locale: Locale,
    pub today: Date,
    pub expiring_days: i64,
}

impl PresentContext {
    pub fn new(locale: Locale, today: Date) -> Self {
        Self {
            locale,
            today,
            expiring_days: DEFAULT_EXPIRING_DAYS,
        }
    }
}

/// Calendar day at the shop. Deadlines are civil dates, so "today" must be
/// read at the shop's UTC offset rather than at UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopClock {
    offset: UtcOffset,
}

impl ShopClock {
    pub const fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub const fn offset(self) -> UtcOffset {
        self.offset
    }

    pub fn today(self) -> Date {
        self.day_at(OffsetDateTime::now_utc())
    }

    pub fn day_at(self, instant: OffsetDateTime) -> Date {
        instant.to_offset(self.offset).date()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowViewModel {
    pub key: String,
    pub cells: Vec<Cell>,
    pub deadline: DeadlineFlags,
}

pub fn present<T: ListRecord>(record: &T, context: &PresentContext) -> RowViewModel {
    let schema = T::schema();
    let cells = schema
        .columns
        .iter()
        .map(|column| match record.value(column.field) {
            FieldValue::Text(value) => Cell::Text(value.unwrap_or_default().to_owned()),
            FieldValue::Category(value) => Cell::Badge(match schema.lookup(column.field) {
                Some(lookup) => lookup.badge(value),
                None => Badge::fallback(value),
            }),
            FieldValue::Date(value) => Cell::Date(format_date(value.and_then(parse_wire_date))),
            FieldValue::Money(value) => Cell::Money(format_money(value, context.locale)),
        })
        .collect();

    let deadline = schema
        .deadline
        .map(|rule| {
            deadline_flags(
                record.value(rule.deadline).as_text().and_then(parse_wire_date),
                record.value(rule.status).as_text(),
                rule.terminal,
                context.today,
                context.expiring_days,
            )
        })
        .unwrap_or_default();

    RowViewModel {
        key: record.key(),
        cells,
        deadline,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Badge, BadgeStyle, Cell, DEFAULT_EXPIRING_DAYS, PresentContext, ShopClock,
        deadline_flags, present,
    };
    use crate::catalog::PURCHASE_STATUS;
    use crate::{Locale, Money, PurchaseOrder, PurchaseOrderId};
    use time::macros::{date, datetime, offset};
    use time::{Date, Duration, Month};

    const TERMINAL: &[&str] = &["recibida", "cancelada"];

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::June, 15).expect("valid date")
    }

    fn flags_at(offset: i64, status: &str) -> super::DeadlineFlags {
        deadline_flags(
            Some(today() + Duration::days(offset)),
            Some(status),
            TERMINAL,
            today(),
            DEFAULT_EXPIRING_DAYS,
        )
    }

    #[test]
    fn deadline_boundaries() {
        let due_today = flags_at(0, "pendiente");
        assert!(!due_today.overdue && !due_today.expiring_soon);

        assert!(flags_at(7, "pendiente").expiring_soon);
        assert!(flags_at(1, "pendiente").expiring_soon);

        let next_week = flags_at(8, "pendiente");
        assert!(!next_week.overdue && !next_week.expiring_soon);

        let yesterday = flags_at(-1, "pendiente");
        assert!(yesterday.overdue && !yesterday.expiring_soon);
        assert_eq!(yesterday.days_until, Some(-1));
    }

    #[test]
    fn deadline_flags_are_mutually_exclusive() {
        for offset in -30..=30 {
            let flags = flags_at(offset, "pendiente");
            assert!(!(flags.overdue && flags.expiring_soon), "offset {offset}");
        }
    }

    #[test]
    fn terminal_status_clears_deadline_flags() {
        let flags = flags_at(-10, "Recibida");
        assert!(!flags.overdue);
        assert!(!flags_at(3, "cancelada").expiring_soon);
    }

    #[test]
    fn shop_clock_reads_the_day_at_its_offset() {
        let evening_in_costa_rica = datetime!(2026-05-16 02:30 UTC);
        assert_eq!(
            ShopClock::new(offset!(-6)).day_at(evening_in_costa_rica),
            date!(2026 - 05 - 15)
        );
        assert_eq!(
            ShopClock::new(offset!(-3)).day_at(evening_in_costa_rica),
            date!(2026 - 05 - 15)
        );
        assert_eq!(
            ShopClock::new(offset!(UTC)).day_at(evening_in_costa_rica),
            date!(2026 - 05 - 16)
        );
    }

    #[test]
    fn due_today_in_local_time_is_not_overdue_late_in_the_day() {
        let clock = ShopClock::new(offset!(-6));
        let today = clock.day_at(datetime!(2026-05-16 03:00 UTC));
        let record = PurchaseOrder {
            id: PurchaseOrderId::new(2),
            number: "OC-002".to_owned(),
            supplier: None,
            requested_by: None,
            issued_on: None,
            due_on: Some("2026-05-15".to_owned()),
            status: Some("pendiente".to_owned()),
            total: None,
        };
        let row = present(&record, &PresentContext::new(Locale::EsCr, today));
        assert!(!row.deadline.overdue);
        assert_eq!(row.deadline.days_until, Some(0));
    }

    #[test]
    fn missing_deadline_has_no_flags() {
        let flags = deadline_flags(None, Some("pendiente"), TERMINAL, today(), 7);
        assert_eq!(flags, super::DeadlineFlags::default());
    }

    #[test]
    fn lookup_falls_back_to_neutral_raw_label() {
        let badge = PURCHASE_STATUS.badge(Some("en revisión"));
        assert_eq!(
            badge,
            Badge {
                label: "en revisión".to_owned(),
                style: BadgeStyle::Neutral,
                icon: None,
            }
        );
        assert_eq!(PURCHASE_STATUS.badge(None).label, "");
        assert_eq!(
            PURCHASE_STATUS.badge(Some("RECIBIDA")).style,
            BadgeStyle::Success
        );
    }

    #[test]
    fn present_tolerates_absent_fields() {
        let record = PurchaseOrder {
            id: PurchaseOrderId::new(9),
            number: "OC-009".to_owned(),
            supplier: None,
            requested_by: None,
            issued_on: None,
            due_on: Some("no es fecha".to_owned()),
            status: None,
            total: None,
        };
        let row = present(&record, &PresentContext::new(Locale::EsCr, today()));
        assert_eq!(row.key, "OC-009");
        assert!(row.cells.iter().any(|cell| *cell == Cell::Money("₡0,00".to_owned())));
        assert!(row.cells.iter().any(|cell| matches!(
            cell,
            Cell::Badge(badge) if badge.style == BadgeStyle::Neutral && badge.label.is_empty()
        )));
        assert!(row.cells.iter().any(|cell| *cell == Cell::Date(String::new())));
        assert!(!row.deadline.overdue && !row.deadline.expiring_soon);
    }

    #[test]
    fn present_formats_cells_and_flags_overdue_orders() {
        let record = PurchaseOrder {
            id: PurchaseOrderId::new(1),
            number: "OC-001".to_owned(),
            supplier: Some("Repuestos del Sur".to_owned()),
            requested_by: Some("mcastro".to_owned()),
            issued_on: Some("2026-06-01T09:30:00Z".to_owned()),
            due_on: Some("2026-06-10".to_owned()),
            status: Some("pendiente".to_owned()),
            total: Some(Money::from_cents(123_456_750)),
        };
        let row = present(&record, &PresentContext::new(Locale::EsPy, today()));
        let texts: Vec<&str> = row.cells.iter().map(Cell::text).collect();
        assert!(texts.contains(&"01/06/2026"));
        assert!(texts.contains(&"₲1.234.568"));
        assert!(texts.contains(&"Pendiente"));
        assert!(row.deadline.overdue);
    }
}
