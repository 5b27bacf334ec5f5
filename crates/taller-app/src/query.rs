// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use time::Date;
use time::macros::format_description;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Date(Date),
}

impl QueryValue {
    /// Wire form of the value, or `None` when it should not be sent.
    pub fn encode(&self) -> Option<String> {
        match self {
            Self::Text(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            Self::Integer(value) => Some(value.to_string()),
            Self::Bool(value) => Some(value.to_string()),
            Self::Date(value) => value
                .format(&format_description!("[year]-[month]-[day]"))
                .ok(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for QueryValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    values: BTreeMap<String, QueryValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn insert_opt<V: Into<QueryValue>>(&mut self, name: impl Into<String>, value: Option<V>) {
        let name = name.into();
        match value {
            Some(value) => {
                self.values.insert(name, value.into());
            }
            None => {
                self.values.remove(&name);
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.values.get(name)
    }

    /// Name/value pairs to serialize, skipping values that encode to nothing.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter_map(|(name, value)| value.encode().map(|encoded| (name.clone(), encoded)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;
    use time::{Date, Month};

    #[test]
    fn pairs_skip_empty_text_values() {
        let params = QueryParams::new()
            .with("estado", "pendiente")
            .with("busqueda", "   ")
            .with("proveedor", "");
        assert_eq!(
            params.pairs(),
            vec![("estado".to_owned(), "pendiente".to_owned())]
        );
    }

    #[test]
    fn pairs_encode_scalars() {
        let date = Date::from_calendar_date(2026, Month::March, 4).expect("valid date");
        let params = QueryParams::new()
            .with("desde", date)
            .with("limite", 50_i64)
            .with("anulados", false);
        assert_eq!(
            params.pairs(),
            vec![
                ("anulados".to_owned(), "false".to_owned()),
                ("desde".to_owned(), "2026-03-04".to_owned()),
                ("limite".to_owned(), "50".to_owned()),
            ]
        );
    }

    #[test]
    fn insert_opt_none_removes_previous_value() {
        let mut params = QueryParams::new().with("estado", "pendiente");
        params.insert_opt::<&str>("estado", None);
        assert!(params.is_empty());
    }
}
