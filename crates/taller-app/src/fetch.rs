// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{ListRecord, QueryParams, RecordField, ViewKind, next_status};

/// Failure of a single list fetch or mutation. Every variant carries a
/// message fit for the status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("cannot reach the server: {0}")]
    Connection(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Anything that can hand back records for a REST resource path.
pub trait RecordSource {
    fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Vec<T>, FetchError>;

    fn create<B: Serialize>(&self, resource: &str, body: &B) -> Result<(), FetchError>;

    fn update<B: Serialize>(&self, resource: &str, id: i64, body: &B) -> Result<(), FetchError>;

    fn delete(&self, resource: &str, id: i64) -> Result<(), FetchError>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Vec<T>, FetchError> {
        (**self).fetch(resource, query)
    }

    fn create<B: Serialize>(&self, resource: &str, body: &B) -> Result<(), FetchError> {
        (**self).create(resource, body)
    }

    fn update<B: Serialize>(&self, resource: &str, id: i64, body: &B) -> Result<(), FetchError> {
        (**self).update(resource, id, body)
    }

    fn delete(&self, resource: &str, id: i64) -> Result<(), FetchError> {
        (**self).delete(resource, id)
    }
}

/// A write against one list resource, owned so it can move to a worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create {
        view: ViewKind,
        body: serde_json::Value,
    },
    Update {
        view: ViewKind,
        id: i64,
        body: serde_json::Value,
    },
    Delete {
        view: ViewKind,
        id: i64,
    },
}

impl Mutation {
    pub const fn view(&self) -> ViewKind {
        match self {
            Self::Create { view, .. } | Self::Update { view, .. } | Self::Delete { view, .. } => {
                *view
            }
        }
    }

    /// Moves `record` to its next status. `None` when the view is read-only
    /// or has no status column.
    pub fn advance_status<T: ListRecord>(record: &T) -> Option<Self> {
        T::VIEW.form()?;
        let (field, next) = next_status(record)?;
        let mut body = serde_json::Map::new();
        body.insert(field.wire_name().to_owned(), next.into());
        Some(Self::Update {
            view: T::VIEW,
            id: record.id(),
            body: body.into(),
        })
    }

    /// Deletes `record`, unless its view is read-only.
    pub fn remove<T: ListRecord>(record: &T) -> Option<Self> {
        T::VIEW.form()?;
        Some(Self::Delete {
            view: T::VIEW,
            id: record.id(),
        })
    }

    pub fn apply<S: RecordSource>(&self, source: &S) -> Result<(), FetchError> {
        let resource = self.view().resource();
        match self {
            Self::Create { body, .. } => source.create(resource, body),
            Self::Update { id, body, .. } => source.update(resource, *id, body),
            Self::Delete { id, .. } => source.delete(resource, *id),
        }
    }

    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}
