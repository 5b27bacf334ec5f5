// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, warn};

use crate::{
    DerivedMetric, FetchError, FilterMode, FilterState, ListRecord, MetricSpec, PresentContext,
    QueryParams, RecordSource, RowViewModel, Selection, ViewKind, compute_metrics, filter_indices,
    present,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// A fetch the caller must run and report back through
/// [`ListCommand::FetchFinished`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub request_id: u64,
    pub view: ViewKind,
    pub resource: &'static str,
    pub query: QueryParams,
}

#[derive(Debug, Clone)]
pub enum ListCommand<T: ListRecord> {
    Mount,
    Refresh,
    FetchFinished {
        request_id: u64,
        result: Result<Vec<T>, FetchError>,
    },
    SetSearch(String),
    Select {
        field: T::Field,
        selection: Selection,
    },
    ClearFilters,
    /// Promotes the staged filters and re-fetches ("Generar Informe").
    ApplyStaged,
    ClearCollection,
    Unmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    PhaseChanged(ViewPhase),
    FetchRequested(FetchTicket),
    CollectionReplaced(usize),
    FetchFailed(FetchError),
    StaleResponseIgnored(u64),
    FilterChanged { visible: usize },
    FilterStaged,
}

impl ListEvent {
    pub fn ticket(&self) -> Option<&FetchTicket> {
        match self {
            Self::FetchRequested(ticket) => Some(ticket),
            _ => None,
        }
    }
}

/// List view controller: owns the full collection, the filter state, the
/// visible subset and the metrics derived from it.
///
/// The visible subset is kept as indices into the full collection, so
/// relaxing a filter never needs a re-fetch. Only the most recently issued
/// fetch may update the collection.
#[derive(Debug)]
pub struct ListView<T: ListRecord> {
    records: Vec<T>,
    visible: Vec<usize>,
    filter: FilterState<T::Field>,
    staged: FilterState<T::Field>,
    mode: FilterMode,
    metric_specs: Vec<MetricSpec<T::Field>>,
    metrics: Vec<DerivedMetric>,
    phase: ViewPhase,
    error: Option<FetchError>,
    last_request: u64,
    pending: Option<u64>,
    mounted: bool,
}

impl<T: ListRecord> Default for ListView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ListRecord> ListView<T> {
    pub fn new() -> Self {
        Self::with_mode(T::schema().mode)
    }

    pub fn with_mode(mode: FilterMode) -> Self {
        Self {
            records: Vec::new(),
            visible: Vec::new(),
            filter: FilterState::default(),
            staged: FilterState::default(),
            mode,
            metric_specs: T::metric_specs(),
            metrics: Vec::new(),
            phase: ViewPhase::Idle,
            error: None,
            last_request: 0,
            pending: None,
            mounted: false,
        }
    }

    pub fn dispatch(&mut self, command: ListCommand<T>) -> Vec<ListEvent> {
        match command {
            ListCommand::Mount => {
                self.mounted = true;
                self.issue_fetch()
            }
            ListCommand::Refresh => {
                if !self.mounted {
                    return Vec::new();
                }
                self.issue_fetch()
            }
            ListCommand::FetchFinished { request_id, result } => {
                self.finish_fetch(request_id, result)
            }
            ListCommand::SetSearch(term) => match self.mode {
                FilterMode::Live => {
                    self.filter.search_term = term;
                    self.refilter()
                }
                FilterMode::Staged => {
                    self.staged.search_term = term;
                    vec![ListEvent::FilterStaged]
                }
            },
            ListCommand::Select { field, selection } => match self.mode {
                FilterMode::Live => {
                    self.filter.select(field, selection);
                    self.refilter()
                }
                FilterMode::Staged => {
                    self.staged.select(field, selection);
                    vec![ListEvent::FilterStaged]
                }
            },
            ListCommand::ClearFilters => match self.mode {
                FilterMode::Live => {
                    self.filter = FilterState::default();
                    self.refilter()
                }
                FilterMode::Staged => {
                    self.staged = FilterState::default();
                    vec![ListEvent::FilterStaged]
                }
            },
            ListCommand::ApplyStaged => {
                if self.mode == FilterMode::Live {
                    return Vec::new();
                }
                self.filter = self.staged.clone();
                let mut events = self.refilter();
                if self.mounted {
                    events.extend(self.issue_fetch());
                }
                events
            }
            ListCommand::ClearCollection => {
                self.records.clear();
                self.visible.clear();
                self.recompute_metrics();
                vec![ListEvent::CollectionReplaced(0)]
            }
            ListCommand::Unmount => {
                self.mounted = false;
                self.pending = None;
                if self.phase == ViewPhase::Loading {
                    self.phase = ViewPhase::Idle;
                    return vec![ListEvent::PhaseChanged(self.phase)];
                }
                Vec::new()
            }
        }
    }

    /// Runs every ticket the controller asks for against `source` until it
    /// settles. Used where blocking on the fetch is acceptable.
    pub fn load_blocking<S: RecordSource>(
        &mut self,
        source: &S,
        command: ListCommand<T>,
    ) -> Vec<ListEvent> {
        let mut log = Vec::new();
        let mut pending = self.dispatch(command);
        while !pending.is_empty() {
            let tickets: Vec<FetchTicket> = pending
                .iter()
                .filter_map(ListEvent::ticket)
                .cloned()
                .collect();
            log.append(&mut pending);
            for ticket in tickets {
                let result = source.fetch::<T>(ticket.resource, &ticket.query);
                pending.extend(self.dispatch(ListCommand::FetchFinished {
                    request_id: ticket.request_id,
                    result,
                }));
            }
        }
        log
    }

    fn issue_fetch(&mut self) -> Vec<ListEvent> {
        self.last_request += 1;
        self.pending = Some(self.last_request);
        self.phase = ViewPhase::Loading;
        let ticket = FetchTicket {
            request_id: self.last_request,
            view: T::VIEW,
            resource: T::VIEW.resource(),
            query: self.request_query(),
        };
        debug!(
            view = T::VIEW.label(),
            request_id = ticket.request_id,
            "list fetch requested"
        );
        vec![
            ListEvent::PhaseChanged(self.phase),
            ListEvent::FetchRequested(ticket),
        ]
    }

    fn finish_fetch(
        &mut self,
        request_id: u64,
        result: Result<Vec<T>, FetchError>,
    ) -> Vec<ListEvent> {
        if !self.mounted || self.pending != Some(request_id) {
            debug!(
                view = T::VIEW.label(),
                request_id,
                latest = self.last_request,
                "ignoring stale list response"
            );
            return vec![ListEvent::StaleResponseIgnored(request_id)];
        }
        self.pending = None;

        match result {
            Ok(records) => {
                debug!(view = T::VIEW.label(), count = records.len(), "list fetch finished");
                self.records = records;
                self.error = None;
                self.phase = ViewPhase::Ready;
                let mut events = vec![
                    ListEvent::CollectionReplaced(self.records.len()),
                    ListEvent::PhaseChanged(self.phase),
                ];
                events.extend(self.refilter());
                events
            }
            Err(error) => {
                warn!(view = T::VIEW.label(), %error, "list fetch failed");
                self.error = Some(error.clone());
                self.phase = ViewPhase::Failed;
                vec![
                    ListEvent::FetchFailed(error),
                    ListEvent::PhaseChanged(self.phase),
                ]
            }
        }
    }

    /// Staged pages send their applied filters; live pages fetch everything.
    fn request_query(&self) -> QueryParams {
        match self.mode {
            FilterMode::Staged => self.filter.to_query(),
            FilterMode::Live => QueryParams::new(),
        }
    }

    fn refilter(&mut self) -> Vec<ListEvent> {
        self.visible = filter_indices(&self.records, &self.filter);
        self.recompute_metrics();
        vec![ListEvent::FilterChanged {
            visible: self.visible.len(),
        }]
    }

    fn recompute_metrics(&mut self) {
        let visible = self.visible.iter().map(|index| &self.records[*index]);
        self.metrics = compute_metrics(visible, &self.metric_specs);
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn visible(&self) -> impl Iterator<Item = &T> + '_ {
        self.visible.iter().map(|index| &self.records[*index])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Filters currently shaping the visible rows.
    pub fn filter(&self) -> &FilterState<T::Field> {
        &self.filter
    }

    /// Filters being edited; equal to [`Self::filter`] in live mode.
    pub fn editing_filter(&self) -> &FilterState<T::Field> {
        match self.mode {
            FilterMode::Live => &self.filter,
            FilterMode::Staged => &self.staged,
        }
    }

    pub fn has_unapplied_filters(&self) -> bool {
        self.mode == FilterMode::Staged && self.staged != self.filter
    }

    pub fn metrics(&self) -> &[DerivedMetric] {
        &self.metrics
    }

    pub fn rows(&self, context: &PresentContext) -> Vec<RowViewModel> {
        self.visible()
            .map(|record| present(record, context))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchTicket, ListCommand, ListEvent, ListView, ViewPhase};
    use crate::catalog::{AdjustmentNoteField, PurchaseOrderField};
    use crate::{
        AdjustmentNote, AdjustmentNoteId, FetchError, FilterMode, Money, PurchaseOrder,
        PurchaseOrderId, QueryValue, Selection,
    };

    fn order(id: i64, status: &str) -> PurchaseOrder {
        PurchaseOrder {
            id: PurchaseOrderId::new(id),
            number: format!("OC-{id:03}"),
            supplier: Some("Repuestos del Sur".to_owned()),
            requested_by: None,
            issued_on: Some("2026-05-02".to_owned()),
            due_on: None,
            status: Some(status.to_owned()),
            total: Some(Money::from_cents(id * 1_000)),
        }
    }

    fn note(id: i64, kind: &str) -> AdjustmentNote {
        AdjustmentNote {
            id: AdjustmentNoteId::new(id),
            number: format!("NC-{id:03}"),
            kind: Some(kind.to_owned()),
            customer: None,
            reason: None,
            issued_on: None,
            status: Some("emitida".to_owned()),
            amount: Some(Money::from_cents(5_000)),
        }
    }

    fn ticket(events: &[ListEvent]) -> FetchTicket {
        events
            .iter()
            .find_map(ListEvent::ticket)
            .cloned()
            .expect("a fetch should be requested")
    }

    fn mounted_with(records: Vec<PurchaseOrder>) -> ListView<PurchaseOrder> {
        let mut view = ListView::new();
        let issued = ticket(&view.dispatch(ListCommand::Mount));
        view.dispatch(ListCommand::FetchFinished {
            request_id: issued.request_id,
            result: Ok(records),
        });
        view
    }

    #[test]
    fn mount_requests_the_resource() {
        let mut view: ListView<PurchaseOrder> = ListView::new();
        assert_eq!(view.phase(), ViewPhase::Idle);

        let events = view.dispatch(ListCommand::Mount);
        let issued = ticket(&events);
        assert_eq!(issued.resource, "/api/compras/ordenes");
        assert_eq!(events[0], ListEvent::PhaseChanged(ViewPhase::Loading));
        assert!(view.is_loading());
    }

    #[test]
    fn successful_fetch_replaces_collection_and_metrics() {
        let view = mounted_with(vec![order(1, "pendiente"), order(2, "recibida")]);
        assert_eq!(view.phase(), ViewPhase::Ready);
        assert_eq!(view.visible_len(), 2);
        assert!(view.error().is_none());
        assert_eq!(view.metrics()[0].label, "Órdenes");
    }

    #[test]
    fn failed_fetch_keeps_previous_collection() {
        let mut view = mounted_with(vec![order(1, "pendiente"), order(2, "recibida")]);
        let refresh = ticket(&view.dispatch(ListCommand::Refresh));

        let error = FetchError::Status {
            status: 500,
            message: "error interno".to_owned(),
        };
        let events = view.dispatch(ListCommand::FetchFinished {
            request_id: refresh.request_id,
            result: Err(error.clone()),
        });

        assert_eq!(
            events,
            vec![
                ListEvent::FetchFailed(error.clone()),
                ListEvent::PhaseChanged(ViewPhase::Failed),
            ]
        );
        assert_eq!(view.phase(), ViewPhase::Failed);
        assert!(!view.is_loading());
        assert_eq!(view.error(), Some(&error));
        assert_eq!(view.records().len(), 2);
        assert_eq!(view.visible_len(), 2);
    }

    #[test]
    fn clear_collection_drops_stale_rows() {
        let mut view = mounted_with(vec![order(1, "pendiente")]);
        let events = view.dispatch(ListCommand::ClearCollection);
        assert_eq!(events, vec![ListEvent::CollectionReplaced(0)]);
        assert_eq!(view.visible_len(), 0);
    }

    #[test]
    fn older_response_is_ignored_after_a_newer_request() {
        let mut view = mounted_with(Vec::new());
        let first = ticket(&view.dispatch(ListCommand::Refresh));
        let second = ticket(&view.dispatch(ListCommand::Refresh));
        assert!(second.request_id > first.request_id);

        let events = view.dispatch(ListCommand::FetchFinished {
            request_id: first.request_id,
            result: Ok(vec![order(9, "pendiente")]),
        });
        assert_eq!(events, vec![ListEvent::StaleResponseIgnored(first.request_id)]);
        assert!(view.is_loading());

        view.dispatch(ListCommand::FetchFinished {
            request_id: second.request_id,
            result: Ok(vec![order(1, "pendiente"), order(2, "pendiente")]),
        });
        assert_eq!(view.records().len(), 2);
        assert_eq!(view.phase(), ViewPhase::Ready);
    }

    #[test]
    fn results_after_unmount_are_ignored() {
        let mut view: ListView<PurchaseOrder> = ListView::new();
        let issued = ticket(&view.dispatch(ListCommand::Mount));
        assert_eq!(
            view.dispatch(ListCommand::Unmount),
            vec![ListEvent::PhaseChanged(ViewPhase::Idle)]
        );

        let events = view.dispatch(ListCommand::FetchFinished {
            request_id: issued.request_id,
            result: Ok(vec![order(1, "pendiente")]),
        });
        assert_eq!(events, vec![ListEvent::StaleResponseIgnored(issued.request_id)]);
        assert!(view.records().is_empty());
        assert!(view.dispatch(ListCommand::Refresh).is_empty());
    }

    #[test]
    fn live_filters_narrow_and_relax_without_fetching() {
        let mut view = mounted_with(vec![
            order(1, "pendiente"),
            order(2, "recibida"),
            order(3, "pendiente"),
        ]);

        let events = view.dispatch(ListCommand::Select {
            field: PurchaseOrderField::Status,
            selection: Selection::Value("pendiente".to_owned()),
        });
        assert_eq!(events, vec![ListEvent::FilterChanged { visible: 2 }]);
        assert!(view.visible().all(|record| record.status.as_deref() == Some("pendiente")));

        let events = view.dispatch(ListCommand::SetSearch("OC-003".to_owned()));
        assert_eq!(events, vec![ListEvent::FilterChanged { visible: 1 }]);

        let events = view.dispatch(ListCommand::ClearFilters);
        assert_eq!(events, vec![ListEvent::FilterChanged { visible: 3 }]);
        assert!(view.dispatch(ListCommand::ApplyStaged).is_empty());
    }

    #[test]
    fn metrics_follow_the_visible_rows() {
        let mut view = mounted_with(vec![order(1, "pendiente"), order(2, "recibida")]);
        view.dispatch(ListCommand::SetSearch("OC-002".to_owned()));
        let count = view
            .metrics()
            .iter()
            .find(|metric| metric.label == "Órdenes")
            .expect("count metric");
        assert_eq!(count.value, crate::MetricValue::Count(1));
    }

    #[test]
    fn staged_filters_wait_for_apply() {
        let mut view: ListView<AdjustmentNote> = ListView::new();
        assert_eq!(view.mode(), FilterMode::Staged);
        let issued = ticket(&view.dispatch(ListCommand::Mount));
        view.dispatch(ListCommand::FetchFinished {
            request_id: issued.request_id,
            result: Ok(vec![note(1, "credito"), note(2, "debito")]),
        });

        let events = view.dispatch(ListCommand::Select {
            field: AdjustmentNoteField::Kind,
            selection: Selection::Value("credito".to_owned()),
        });
        assert_eq!(events, vec![ListEvent::FilterStaged]);
        assert_eq!(view.visible_len(), 2);
        assert!(view.has_unapplied_filters());

        let events = view.dispatch(ListCommand::ApplyStaged);
        let report = ticket(&events);
        assert_eq!(
            report.query.get("tipo"),
            Some(&QueryValue::Text("credito".to_owned()))
        );
        assert_eq!(view.visible_len(), 1);
        assert!(!view.has_unapplied_filters());
        assert!(view.is_loading());
    }
}
