// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;

use crate::{CategoricalLookup, DeadlineRule, MetricSpec, Money, QueryParams, ViewKind};

/// Query parameter carrying the free-text search on staged report pages.
pub const SEARCH_PARAM: &str = "busqueda";

/// Wire name of the lifecycle field every writable record carries.
pub const STATUS_FIELD: &str = "estado";

pub trait RecordField: Copy + Eq + Ord + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Key of the field in the record's JSON, also used as its query
    /// parameter and as the body key of status updates.
    fn wire_name(self) -> &'static str;

    fn label(self) -> &'static str;

    fn from_wire_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.wire_name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Category(Option<&'a str>),
    Date(Option<&'a str>),
    Money(Option<Money>),
}

impl<'a> FieldValue<'a> {
    pub fn as_text(self) -> Option<&'a str> {
        match self {
            Self::Text(value) | Self::Category(value) | Self::Date(value) => value,
            Self::Money(_) => None,
        }
    }

    pub fn as_money(self) -> Option<Money> {
        match self {
            Self::Money(value) => value,
            _ => None,
        }
    }
}

/// A backend record shown by a generic list view.
pub trait ListRecord: Clone + fmt::Debug + DeserializeOwned + Send + 'static {
    type Field: RecordField;

    const VIEW: ViewKind;

    /// Primary key, addressed by `PUT` and `DELETE <resource>/<id>`.
    fn id(&self) -> i64;

    fn key(&self) -> String;

    fn value(&self, field: Self::Field) -> FieldValue<'_>;

    fn schema() -> &'static ListSchema<Self::Field>;

    fn metric_specs() -> Vec<MetricSpec<Self::Field>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Every change re-filters the loaded collection.
    Live,
    /// Changes are staged until applied; applying re-fetches with the
    /// selections as query parameters.
    Staged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<F: 'static> {
    pub field: F,
    pub label: &'static str,
}

#[derive(Debug)]
pub struct ListSchema<F: 'static> {
    pub columns: &'static [Column<F>],
    pub search: &'static [F],
    pub categorical: &'static [F],
    pub lookups: &'static [(F, &'static CategoricalLookup)],
    pub deadline: Option<DeadlineRule<F>>,
    pub mode: FilterMode,
}

impl<F: RecordField> ListSchema<F> {
    pub fn lookup(&self, field: F) -> Option<&'static CategoricalLookup> {
        self.lookups
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, lookup)| *lookup)
    }

    pub fn is_categorical(&self, field: F) -> bool {
        self.categorical.contains(&field)
    }

    pub fn status_field(&self) -> Option<F> {
        self.categorical
            .iter()
            .copied()
            .find(|field| field.wire_name() == STATUS_FIELD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    /// Blank input and the `all`/`todos` sentinels select everything.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("all")
            || trimmed.eq_ignore_ascii_case("todos")
        {
            Self::All
        } else {
            Self::Value(trimmed.to_owned())
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Value(value) => Some(value),
        }
    }

    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Value(wanted) => value.is_some_and(|value| same_text(value, wanted)),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("todos"),
            Self::Value(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<F: Ord> {
    pub search_term: String,
    pub selections: BTreeMap<F, Selection>,
}

impl<F: Ord> Default for FilterState<F> {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            selections: BTreeMap::new(),
        }
    }
}

impl<F: RecordField> FilterState<F> {
    pub fn selection(&self, field: F) -> &Selection {
        static ALL: Selection = Selection::All;
        self.selections.get(&field).unwrap_or(&ALL)
    }

    /// `All` is stored as the absence of an entry.
    pub fn select(&mut self, field: F, selection: Selection) {
        match selection {
            Selection::All => {
                self.selections.remove(&field);
            }
            selection => {
                self.selections.insert(field, selection);
            }
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search_term.trim().is_empty() && self.selections.is_empty()
    }

    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.insert(SEARCH_PARAM, self.search_term.as_str());
        for (field, selection) in &self.selections {
            query.insert_opt(field.wire_name(), selection.value());
        }
        query
    }
}

pub fn matches<T: ListRecord>(
    record: &T,
    filter: &FilterState<T::Field>,
    text_fields: &[T::Field],
    categorical_fields: &[T::Field],
) -> bool {
    matches_search(record, &filter.search_term, text_fields)
        && categorical_fields
            .iter()
            .all(|field| filter.selection(*field).admits(record.value(*field).as_text()))
}

fn matches_search<T: ListRecord>(record: &T, term: &str, text_fields: &[T::Field]) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    text_fields.iter().any(|field| {
        record
            .value(*field)
            .as_text()
            .is_some_and(|value| value.to_lowercase().contains(&needle))
    })
}

/// Indices of the records that pass `filter` under the record's schema.
pub fn filter_indices<T: ListRecord>(records: &[T], filter: &FilterState<T::Field>) -> Vec<usize> {
    let schema = T::schema();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches(*record, filter, schema.search, schema.categorical))
        .map(|(index, _)| index)
        .collect()
}

/// Values a categorical filter can cycle through: the lookup table's
/// values first, then any other value observed in `records`.
pub fn filter_options<T: ListRecord>(records: &[T], field: T::Field) -> Vec<String> {
    let mut options: Vec<String> = T::schema()
        .lookup(field)
        .map(|lookup| {
            lookup
                .entries()
                .iter()
                .map(|entry| entry.value.to_owned())
                .collect()
        })
        .unwrap_or_default();
    for value in records
        .iter()
        .filter_map(|record| record.value(field).as_text())
    {
        let value = value.trim();
        if !value.is_empty() && !options.iter().any(|option| same_text(option, value)) {
            options.push(value.to_owned());
        }
    }
    options
}

/// Status following `record`'s current one in badge-table order, wrapping
/// to the first. Unknown or absent statuses advance to the first entry.
pub fn next_status<T: ListRecord>(record: &T) -> Option<(T::Field, &'static str)> {
    let schema = T::schema();
    let field = schema.status_field()?;
    let entries = schema.lookup(field)?.entries();
    if entries.is_empty() {
        return None;
    }
    let next = record
        .value(field)
        .as_text()
        .and_then(|current| {
            entries
                .iter()
                .position(|entry| same_text(entry.value, current))
        })
        .map_or(0, |index| (index + 1) % entries.len());
    Some((field, entries[next].value))
}

pub(crate) fn same_text(left: &str, right: &str) -> bool {
    let (left, right) = (left.trim(), right.trim());
    left.eq_ignore_ascii_case(right) || left.to_lowercase() == right.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{
        FilterState, ListRecord, RecordField, SEARCH_PARAM, Selection, filter_indices,
        filter_options, matches, next_status,
    };
    use crate::QueryValue;
    use crate::catalog::{EquipmentField, PurchaseOrderField};
    use crate::{Equipment, Money, PurchaseOrder, PurchaseOrderId};

    fn order(id: i64, number: &str, supplier: Option<&str>, status: Option<&str>) -> PurchaseOrder {
        PurchaseOrder {
            id: PurchaseOrderId::new(id),
            number: number.to_owned(),
            supplier: supplier.map(str::to_owned),
            requested_by: None,
            issued_on: Some("2026-02-01".to_owned()),
            due_on: None,
            status: status.map(str::to_owned),
            total: Some(Money::from_cents(10_000)),
        }
    }

    fn sample() -> Vec<PurchaseOrder> {
        vec![
            order(1, "OC-001", Some("Repuestos del Sur"), Some("pendiente")),
            order(2, "OC-002", Some("Importadora Central"), Some("recibida")),
            order(3, "OC-003", None, None),
        ]
    }

    #[test]
    fn default_filter_keeps_everything() {
        let records = sample();
        let filter = FilterState::default();
        assert_eq!(filter_indices(&records, &filter), vec![0, 1, 2]);
    }

    #[test]
    fn search_matches_exact_number_only() {
        let records = vec![
            order(1, "OC-001", None, None),
            order(2, "OC-002", None, None),
        ];
        let filter = FilterState {
            search_term: "OC-001".to_owned(),
            ..FilterState::default()
        };
        assert_eq!(filter_indices(&records, &filter), vec![0]);
    }

    #[test]
    fn search_is_case_insensitive_across_text_fields() {
        let records = sample();
        let filter = FilterState {
            search_term: "  central ".to_owned(),
            ..FilterState::default()
        };
        assert_eq!(filter_indices(&records, &filter), vec![1]);
    }

    #[test]
    fn absent_text_never_matches_a_search() {
        let record = order(3, "OC-003", None, None);
        let filter = FilterState {
            search_term: "sur".to_owned(),
            ..FilterState::default()
        };
        let schema_fields = [PurchaseOrderField::Supplier];
        assert!(!matches(&record, &filter, &schema_fields, &[]));
    }

    #[test]
    fn categorical_selection_combines_with_search() {
        let records = sample();
        let mut filter = FilterState::default();
        filter.select(
            PurchaseOrderField::Status,
            Selection::Value("PENDIENTE".to_owned()),
        );
        assert_eq!(filter_indices(&records, &filter), vec![0]);

        filter.search_term = "OC-002".to_owned();
        assert!(filter_indices(&records, &filter).is_empty());
    }

    #[test]
    fn filtered_rows_are_a_subset() {
        let records = sample();
        for term in ["", "oc", "sur", "zzz"] {
            for status in ["todos", "pendiente", "recibida", "cancelada"] {
                let mut filter = FilterState {
                    search_term: term.to_owned(),
                    ..FilterState::default()
                };
                filter.select(PurchaseOrderField::Status, Selection::parse(status));
                let indices = filter_indices(&records, &filter);
                assert!(indices.iter().all(|index| *index < records.len()));
                assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }
    }

    #[test]
    fn selecting_all_removes_the_entry() {
        let mut filter = FilterState::default();
        filter.select(
            PurchaseOrderField::Status,
            Selection::Value("pendiente".to_owned()),
        );
        filter.select(PurchaseOrderField::Status, Selection::All);
        assert!(filter.is_unfiltered());
        assert_eq!(filter.selection(PurchaseOrderField::Status), &Selection::All);
    }

    #[test]
    fn selection_parse_recognizes_sentinels() {
        assert_eq!(Selection::parse(""), Selection::All);
        assert_eq!(Selection::parse("Todos"), Selection::All);
        assert_eq!(
            Selection::parse(" aprobada "),
            Selection::Value("aprobada".to_owned())
        );
    }

    #[test]
    fn to_query_uses_wire_names() {
        let mut filter = FilterState {
            search_term: "sur".to_owned(),
            ..FilterState::default()
        };
        filter.select(
            PurchaseOrderField::Status,
            Selection::Value("pendiente".to_owned()),
        );
        let query = filter.to_query();
        assert_eq!(
            query.get("estado"),
            Some(&QueryValue::Text("pendiente".to_owned()))
        );
        assert_eq!(
            query.get(SEARCH_PARAM),
            Some(&QueryValue::Text("sur".to_owned()))
        );
    }

    #[test]
    fn field_lookup_by_wire_name() {
        assert_eq!(
            PurchaseOrderField::from_wire_name("ESTADO"),
            Some(PurchaseOrderField::Status)
        );
        assert_eq!(PurchaseOrderField::from_wire_name("color"), None);
    }

    #[test]
    fn options_list_lookup_values_then_observed_ones() {
        let mut records = sample();
        records.push(order(4, "OC-004", None, Some("en revisión")));
        let options = filter_options(&records, PurchaseOrderField::Status);
        assert_eq!(options.first().map(String::as_str), Some("pendiente"));
        assert_eq!(options.last().map(String::as_str), Some("en revisión"));
        assert_eq!(
            options.iter().filter(|option| option.as_str() == "pendiente").count(),
            1
        );
    }

    #[test]
    fn next_status_walks_the_badge_table_and_wraps() {
        let pending = order(1, "OC-001", None, Some("Pendiente"));
        assert_eq!(
            next_status(&pending),
            Some((PurchaseOrderField::Status, "aprobada"))
        );
        let cancelled = order(2, "OC-002", None, Some("cancelada"));
        assert_eq!(
            next_status(&cancelled),
            Some((PurchaseOrderField::Status, "pendiente"))
        );
        let unknown = order(3, "OC-003", None, None);
        assert_eq!(
            next_status(&unknown),
            Some((PurchaseOrderField::Status, "pendiente"))
        );
    }

    #[test]
    fn status_field_is_the_estado_column() {
        assert_eq!(
            PurchaseOrder::schema().status_field(),
            Some(PurchaseOrderField::Status)
        );
        assert_eq!(
            Equipment::schema().status_field(),
            Some(EquipmentField::Status)
        );
    }
}
