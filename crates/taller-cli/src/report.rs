// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! One-shot listing for scripts: fetch a view, apply filters and print its
//! rows and summary as plain text.

use crate::config::view_labels;
use anyhow::{Result, anyhow, bail};
use std::io::Write;
use taller_app::{
    AdjustmentNote, Equipment, FilterMode, ListCommand, ListRecord, ListView, Pickup,
    PresentContext, PurchaseOrder, RecordField, RecordSource, Selection, ServiceBudget,
    ServiceOrder, ViewKind, ViewPhase,
};
use taller_tui::format_metric;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRequest {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
}

pub fn parse_view(raw: &str) -> Result<ViewKind> {
    ViewKind::parse(raw)
        .ok_or_else(|| anyhow!("unknown view {raw:?}; expected one of {}", view_labels()))
}

pub fn run_report<S: RecordSource, W: Write>(
    source: &S,
    view: ViewKind,
    request: &ReportRequest,
    context: &PresentContext,
    out: &mut W,
) -> Result<()> {
    match view {
        ViewKind::PurchaseOrders => report::<PurchaseOrder, _, _>(source, request, context, out),
        ViewKind::ServiceOrders => report::<ServiceOrder, _, _>(source, request, context, out),
        ViewKind::ServiceBudgets => report::<ServiceBudget, _, _>(source, request, context, out),
        ViewKind::AdjustmentNotes => {
            report::<AdjustmentNote, _, _>(source, request, context, out)
        }
        ViewKind::Equipment => report::<Equipment, _, _>(source, request, context, out),
        ViewKind::Pickups => report::<Pickup, _, _>(source, request, context, out),
    }
}

fn report<T: ListRecord, S: RecordSource, W: Write>(
    source: &S,
    request: &ReportRequest,
    context: &PresentContext,
    out: &mut W,
) -> Result<()> {
    let schema = T::schema();
    let mut view: ListView<T> = ListView::new();

    if let Some(term) = &request.search {
        view.dispatch(ListCommand::SetSearch(term.clone()));
    }
    for (name, raw) in &request.filters {
        let field = T::Field::from_wire_name(name)
            .filter(|field| schema.is_categorical(*field))
            .ok_or_else(|| {
                let known: Vec<&str> = schema
                    .categorical
                    .iter()
                    .map(|field| field.wire_name())
                    .collect();
                anyhow!(
                    "{} cannot be filtered by {name:?}; use one of: {}",
                    T::VIEW.label(),
                    known.join(", ")
                )
            })?;
        view.dispatch(ListCommand::Select {
            field,
            selection: Selection::parse(raw),
        });
    }
    if view.mode() == FilterMode::Staged {
        view.dispatch(ListCommand::ApplyStaged);
    }

    view.load_blocking(source, ListCommand::Mount);
    if view.phase() != ViewPhase::Ready {
        match view.error() {
            Some(error) => bail!("load {}: {error}", T::VIEW.label()),
            None => bail!("load {} did not finish", T::VIEW.label()),
        }
    }
    info!(
        view = T::VIEW.label(),
        total = view.records().len(),
        visible = view.visible_len(),
        "report generated"
    );

    let header: Vec<&str> = schema.columns.iter().map(|column| column.label).collect();
    writeln!(
        out,
        "{} ({}/{})",
        T::VIEW.title(),
        view.visible_len(),
        view.records().len()
    )?;
    writeln!(out, "{}", header.join("\t"))?;
    for row in view.rows(context) {
        let mut cells: Vec<String> = row.cells.iter().map(|cell| cell.text().to_owned()).collect();
        if row.deadline.overdue {
            cells.push("VENCIDO".to_owned());
        } else if row.deadline.expiring_soon {
            cells.push("POR VENCER".to_owned());
        }
        writeln!(out, "{}", cells.join("\t"))?;
    }
    writeln!(out)?;
    for metric in view.metrics() {
        writeln!(out, "{}", format_metric(metric, context))?;
    }
    Ok(())
}
