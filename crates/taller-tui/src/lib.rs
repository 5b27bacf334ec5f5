// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use taller_app::{
    AdjustmentNote, AppCommand, AppEvent, AppMode, AppState, BadgeStyle, DerivedMetric, Equipment,
    FetchError, FetchTicket, FilterMode, FormPayload, ListCommand, ListEvent, ListRecord,
    ListView, MetricValue, Mutation, Pickup, PresentContext, PurchaseOrder, RecordField,
    RecordSource, RowViewModel, Selection, ServiceBudget, ServiceOrder, ViewKind, ViewPhase,
    filter_options, format_money,
};
use time::Date;
use tracing::{debug, error};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Records of one list resource, as delivered by a runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewSnapshot {
    PurchaseOrders(Vec<PurchaseOrder>),
    ServiceOrders(Vec<ServiceOrder>),
    ServiceBudgets(Vec<ServiceBudget>),
    AdjustmentNotes(Vec<AdjustmentNote>),
    Equipment(Vec<Equipment>),
    Pickups(Vec<Pickup>),
}

impl ViewSnapshot {
    pub const fn view(&self) -> ViewKind {
        match self {
            Self::PurchaseOrders(_) => ViewKind::PurchaseOrders,
            Self::ServiceOrders(_) => ViewKind::ServiceOrders,
            Self::ServiceBudgets(_) => ViewKind::ServiceBudgets,
            Self::AdjustmentNotes(_) => ViewKind::AdjustmentNotes,
            Self::Equipment(_) => ViewKind::Equipment,
            Self::Pickups(_) => ViewKind::Pickups,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::PurchaseOrders(rows) => rows.len(),
            Self::ServiceOrders(rows) => rows.len(),
            Self::ServiceBudgets(rows) => rows.len(),
            Self::AdjustmentNotes(rows) => rows.len(),
            Self::Equipment(rows) => rows.len(),
            Self::Pickups(rows) => rows.len(),
        }
    }
}

/// Runs `ticket` against `source`, decoding into the ticket view's record type.
pub fn load_snapshot<S: RecordSource>(
    source: &S,
    ticket: &FetchTicket,
) -> Result<ViewSnapshot, FetchError> {
    let (resource, query) = (ticket.resource, &ticket.query);
    Ok(match ticket.view {
        ViewKind::PurchaseOrders => ViewSnapshot::PurchaseOrders(source.fetch(resource, query)?),
        ViewKind::ServiceOrders => ViewSnapshot::ServiceOrders(source.fetch(resource, query)?),
        ViewKind::ServiceBudgets => ViewSnapshot::ServiceBudgets(source.fetch(resource, query)?),
        ViewKind::AdjustmentNotes => {
            ViewSnapshot::AdjustmentNotes(source.fetch(resource, query)?)
        }
        ViewKind::Equipment => ViewSnapshot::Equipment(source.fetch(resource, query)?),
        ViewKind::Pickups => ViewSnapshot::Pickups(source.fetch(resource, query)?),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Loaded {
        view: ViewKind,
        request_id: u64,
        result: Result<ViewSnapshot, FetchError>,
    },
    Mutated {
        mutation: Mutation,
        result: Result<(), FetchError>,
    },
}

/// Backend seen by the event loop. The `spawn_*` defaults run inline and
/// report on the channel; runtimes with real I/O override them with workers.
pub trait AppRuntime {
    fn load_view(&mut self, ticket: &FetchTicket) -> Result<ViewSnapshot, FetchError>;

    fn mutate(&mut self, mutation: &Mutation) -> Result<(), FetchError>;

    /// Calendar day deadlines are measured against.
    fn today(&self) -> Date;

    fn spawn_load(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.load_view(&ticket);
        tx.send(InternalEvent::Loaded {
            view: ticket.view,
            request_id: ticket.request_id,
            result,
        })
        .map_err(|_| anyhow!("load event channel closed"))?;
        Ok(())
    }

    fn spawn_mutation(&mut self, mutation: Mutation, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.mutate(&mutation);
        tx.send(InternalEvent::Mutated { mutation, result })
            .map_err(|_| anyhow!("mutation event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PaneCommand {
    Mount,
    Refresh,
    Unmount,
    SetSearch(String),
    ClearFilters,
    ApplyStaged,
}

#[derive(Debug)]
enum ListPane {
    PurchaseOrders(ListView<PurchaseOrder>),
    ServiceOrders(ListView<ServiceOrder>),
    ServiceBudgets(ListView<ServiceBudget>),
    AdjustmentNotes(ListView<AdjustmentNote>),
    Equipment(ListView<Equipment>),
    Pickups(ListView<Pickup>),
}

macro_rules! with_pane {
    ($pane:expr, $view:ident => $body:expr) => {
        match $pane {
            ListPane::PurchaseOrders($view) => $body,
            ListPane::ServiceOrders($view) => $body,
            ListPane::ServiceBudgets($view) => $body,
            ListPane::AdjustmentNotes($view) => $body,
            ListPane::Equipment($view) => $body,
            ListPane::Pickups($view) => $body,
        }
    };
}

impl ListPane {
    fn new(view: ViewKind) -> Self {
        match view {
            ViewKind::PurchaseOrders => Self::PurchaseOrders(ListView::new()),
            ViewKind::ServiceOrders => Self::ServiceOrders(ListView::new()),
            ViewKind::ServiceBudgets => Self::ServiceBudgets(ListView::new()),
            ViewKind::AdjustmentNotes => Self::AdjustmentNotes(ListView::new()),
            ViewKind::Equipment => Self::Equipment(ListView::new()),
            ViewKind::Pickups => Self::Pickups(ListView::new()),
        }
    }

    fn kind(&self) -> ViewKind {
        with_pane!(self, view => view_kind_of(view))
    }

    fn apply(&mut self, command: PaneCommand) -> Vec<ListEvent> {
        with_pane!(self, view => apply_pane_command(view, command))
    }

    fn finish(
        &mut self,
        request_id: u64,
        result: Result<ViewSnapshot, FetchError>,
    ) -> Vec<ListEvent> {
        match (self, result) {
            (Self::PurchaseOrders(view), Ok(ViewSnapshot::PurchaseOrders(rows))) => {
                finish_with(view, request_id, Ok(rows))
            }
            (Self::ServiceOrders(view), Ok(ViewSnapshot::ServiceOrders(rows))) => {
                finish_with(view, request_id, Ok(rows))
            }
            (Self::ServiceBudgets(view), Ok(ViewSnapshot::ServiceBudgets(rows))) => {
                finish_with(view, request_id, Ok(rows))
            }
            (Self::AdjustmentNotes(view), Ok(ViewSnapshot::AdjustmentNotes(rows))) => {
                finish_with(view, request_id, Ok(rows))
            }
            (Self::Equipment(view), Ok(ViewSnapshot::Equipment(rows))) => {
                finish_with(view, request_id, Ok(rows))
            }
            (Self::Pickups(view), Ok(ViewSnapshot::Pickups(rows))) => {
                finish_with(view, request_id, Ok(rows))
            }
            (pane, Err(failure)) => {
                with_pane!(pane, view => finish_with(view, request_id, Err(failure)))
            }
            (pane, Ok(snapshot)) => {
                debug!(
                    pane = pane.kind().label(),
                    snapshot = snapshot.view().label(),
                    "dropping snapshot for another view"
                );
                Vec::new()
            }
        }
    }

    fn cycle_filter(&mut self, focus: usize) -> Option<(String, Vec<ListEvent>)> {
        with_pane!(self, view => cycle_filter(view, focus))
    }

    fn projection(&self, context: &PresentContext, focus: usize) -> PaneProjection {
        with_pane!(self, view => project(view, context, focus))
    }

    fn status_change(&self, row: usize) -> Option<Mutation> {
        with_pane!(self, view => view.visible().nth(row).and_then(Mutation::advance_status))
    }

    /// Delete of the row at `row` with the key shown when confirming it.
    fn removal(&self, row: usize) -> Option<(Mutation, String)> {
        with_pane!(self, view => removal_at(view, row))
    }

    fn search_term(&self) -> String {
        with_pane!(self, view => view.editing_filter().search_term.clone())
    }

    fn visible_len(&self) -> usize {
        with_pane!(self, view => view.visible_len())
    }

    fn filter_count(&self) -> usize {
        with_pane!(self, view => categorical_len(view))
    }

    fn mode(&self) -> FilterMode {
        with_pane!(self, view => view.mode())
    }

    fn phase(&self) -> ViewPhase {
        with_pane!(self, view => view.phase())
    }
}

fn categorical_len<T: ListRecord>(_view: &ListView<T>) -> usize {
    T::schema().categorical.len()
}

fn removal_at<T: ListRecord>(view: &ListView<T>, row: usize) -> Option<(Mutation, String)> {
    let record = view.visible().nth(row)?;
    Some((Mutation::remove(record)?, record.key()))
}

fn view_kind_of<T: ListRecord>(_view: &ListView<T>) -> ViewKind {
    T::VIEW
}

fn apply_pane_command<T: ListRecord>(
    view: &mut ListView<T>,
    command: PaneCommand,
) -> Vec<ListEvent> {
    let command = match command {
        PaneCommand::Mount => ListCommand::Mount,
        PaneCommand::Refresh => ListCommand::Refresh,
        PaneCommand::Unmount => ListCommand::Unmount,
        PaneCommand::SetSearch(term) => ListCommand::SetSearch(term),
        PaneCommand::ClearFilters => ListCommand::ClearFilters,
        PaneCommand::ApplyStaged => ListCommand::ApplyStaged,
    };
    view.dispatch(command)
}

fn finish_with<T: ListRecord>(
    view: &mut ListView<T>,
    request_id: u64,
    result: Result<Vec<T>, FetchError>,
) -> Vec<ListEvent> {
    view.dispatch(ListCommand::FetchFinished { request_id, result })
}

/// Advances the focused categorical filter: all, then each option, then all.
fn cycle_filter<T: ListRecord>(
    view: &mut ListView<T>,
    focus: usize,
) -> Option<(String, Vec<ListEvent>)> {
    let categorical = T::schema().categorical;
    if categorical.is_empty() {
        return None;
    }
    let field = categorical[focus % categorical.len()];
    let options = filter_options(view.records(), field);
    let selection = next_selection(&options, view.editing_filter().selection(field));
    let message = format!("{}: {}", field.label().to_lowercase(), selection);
    let events = view.dispatch(ListCommand::Select { field, selection });
    Some((message, events))
}

fn next_selection(options: &[String], current: &Selection) -> Selection {
    let next = match current.value() {
        None => options.first(),
        Some(value) => options
            .iter()
            .position(|option| option.eq_ignore_ascii_case(value))
            .and_then(|index| options.get(index + 1)),
    };
    next.map_or(Selection::All, |option| Selection::Value(option.clone()))
}

#[derive(Debug, Clone, PartialEq)]
struct PaneProjection {
    view: ViewKind,
    columns: Vec<&'static str>,
    rows: Vec<RowViewModel>,
    metrics: Vec<DerivedMetric>,
    phase: ViewPhase,
    error: Option<String>,
    total: usize,
    search_term: String,
    filters: String,
    unapplied: bool,
}

fn project<T: ListRecord>(
    view: &ListView<T>,
    context: &PresentContext,
    focus: usize,
) -> PaneProjection {
    let schema = T::schema();
    PaneProjection {
        view: T::VIEW,
        columns: schema.columns.iter().map(|column| column.label).collect(),
        rows: view.rows(context),
        metrics: view.metrics().to_vec(),
        phase: view.phase(),
        error: view.error().map(ToString::to_string),
        total: view.records().len(),
        search_term: view.editing_filter().search_term.clone(),
        filters: filter_summary(view, focus),
        unapplied: view.has_unapplied_filters(),
    }
}

fn filter_summary<T: ListRecord>(view: &ListView<T>, focus: usize) -> String {
    let schema = T::schema();
    let categorical = schema.categorical;
    if categorical.is_empty() {
        return String::new();
    }
    let filter = view.editing_filter();
    let focus = focus % categorical.len();
    categorical
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let shown = match filter.selection(*field).value() {
                Some(value) => schema
                    .lookup(*field)
                    .and_then(|lookup| lookup.get(value))
                    .map_or(value, |entry| entry.label),
                None => "todos",
            };
            let label = field.label().to_lowercase();
            if index == focus {
                format!("[{label}: {shown}]")
            } else {
                format!("{label}: {shown}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

#[derive(Debug, Clone)]
struct FormUiState {
    payload: FormPayload,
    field_index: usize,
    saving: bool,
}

#[derive(Debug)]
struct ViewData {
    panes: Vec<ListPane>,
    context: PresentContext,
    search_input: String,
    filter_focus: usize,
    selected_row: usize,
    form: Option<FormUiState>,
    /// Delete armed by a first `d`; a second `d` on the same row sends it.
    pending_delete: Option<Mutation>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn new(context: PresentContext) -> Self {
        Self {
            panes: ViewKind::ALL.into_iter().map(ListPane::new).collect(),
            context,
            search_input: String::new(),
            filter_focus: 0,
            selected_row: 0,
            form: None,
            pending_delete: None,
            help_visible: false,
            status_token: 0,
        }
    }

    fn pane(&self, view: ViewKind) -> Option<&ListPane> {
        self.panes.iter().find(|pane| pane.kind() == view)
    }

    fn pane_mut(&mut self, view: ViewKind) -> Option<&mut ListPane> {
        self.panes.iter_mut().find(|pane| pane.kind() == view)
    }

    fn clamp_selection(&mut self, view: ViewKind) {
        let visible = self.pane(view).map_or(0, ListPane::visible_len);
        self.selected_row = self.selected_row.min(visible.saturating_sub(1));
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    context: PresentContext,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(context);
    let (internal_tx, internal_rx) = mpsc::channel();
    pane_command(
        state,
        runtime,
        &mut view_data,
        &internal_tx,
        PaneCommand::Mount,
    );

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
        {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Loaded {
                view,
                request_id,
                result,
            } => {
                let Some(pane) = view_data.pane_mut(view) else {
                    continue;
                };
                let failure = pane
                    .finish(request_id, result)
                    .into_iter()
                    .find_map(|event| match event {
                        ListEvent::FetchFailed(failure) => Some(failure),
                        _ => None,
                    });
                view_data.clamp_selection(state.active_view);
                if let Some(failure) = failure {
                    emit_status(
                        state,
                        view_data,
                        tx,
                        format!("{} load failed: {failure} -- press r to retry", view.label()),
                    );
                }
            }
            InternalEvent::Mutated { mutation, result } => {
                finish_mutation(state, runtime, view_data, tx, &mutation, result);
            }
        }
    }
}

fn finish_mutation<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    mutation: &Mutation,
    result: Result<(), FetchError>,
) {
    let view = mutation.view();
    if let Err(failure) = result {
        error!(view = view.label(), action = mutation.verb(), %failure, "save failed");
        if let Some(form) = view_data.form.as_mut() {
            form.saving = false;
        }
        emit_status(
            state,
            view_data,
            tx,
            format!("{} {} failed: {failure}", mutation.verb(), view.label()),
        );
        return;
    }

    let message = match mutation {
        Mutation::Create { .. } => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToBrowse);
            format!("saved {}", view.title())
        }
        Mutation::Update { id, .. } => format!("updated {} #{id}", view.label()),
        Mutation::Delete { id, .. } => format!("deleted {} #{id}", view.label()),
    };
    emit_status(state, view_data, tx, message);
    if state.active_view == view {
        pane_command(state, runtime, view_data, tx, PaneCommand::Refresh);
    }
}

fn start_mutation<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    mutation: Mutation,
) {
    debug!(
        view = mutation.view().label(),
        action = mutation.verb(),
        "mutation started"
    );
    if let Err(failure) = runtime.spawn_mutation(mutation, tx.clone()) {
        if let Some(form) = view_data.form.as_mut() {
            form.saving = false;
        }
        emit_status(state, view_data, tx, format!("save failed: {failure:#}"));
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::Notify(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn issue_tickets<R: AppRuntime>(
    runtime: &mut R,
    events: &[ListEvent],
    tx: &Sender<InternalEvent>,
) -> Result<()> {
    for ticket in events.iter().filter_map(ListEvent::ticket) {
        runtime.spawn_load(ticket.clone(), tx.clone())?;
    }
    Ok(())
}

fn pane_command<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: PaneCommand,
) -> Vec<ListEvent> {
    let view = state.active_view;
    if matches!(command, PaneCommand::Mount | PaneCommand::Refresh) {
        view_data.context.today = runtime.today();
    }
    let Some(pane) = view_data.pane_mut(view) else {
        return Vec::new();
    };
    let events = pane.apply(command);
    if let Err(failure) = issue_tickets(runtime, &events, tx) {
        emit_status(state, view_data, tx, format!("load failed: {failure:#}"));
    }
    view_data.clamp_selection(view);
    events
}

fn switch_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let previous = state.active_view;
    let events = state.dispatch(command);
    if !events
        .iter()
        .any(|event| matches!(event, AppEvent::ViewChanged(_)))
    {
        return;
    }
    if let Some(pane) = view_data.pane_mut(previous) {
        let _ = pane.apply(PaneCommand::Unmount);
    }
    view_data.selected_row = 0;
    view_data.filter_focus = 0;
    pane_command(state, runtime, view_data, tx, PaneCommand::Mount);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    match state.mode {
        AppMode::Search => handle_search_key(state, runtime, view_data, internal_tx, key),
        AppMode::Form(_) => handle_form_key(state, runtime, view_data, internal_tx, key),
        AppMode::Browse => handle_browse_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_browse_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let armed = view_data.pending_delete.take();
    match key.code {
        KeyCode::Tab => switch_view(state, runtime, view_data, tx, AppCommand::NextView),
        KeyCode::BackTab => switch_view(state, runtime, view_data, tx, AppCommand::PrevView),
        KeyCode::Char(digit @ '1'..='6') => {
            let index = (digit as usize) - ('1' as usize);
            if let Some(view) = ViewKind::ALL.get(index) {
                switch_view(state, runtime, view_data, tx, AppCommand::ShowView(*view));
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.selected_row = view_data.selected_row.saturating_add(1);
            view_data.clamp_selection(state.active_view);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('/') => {
            view_data.search_input = view_data
                .pane(state.active_view)
                .map(ListPane::search_term)
                .unwrap_or_default();
            state.dispatch(AppCommand::StartSearch);
        }
        KeyCode::Char('f') => {
            let focus = view_data.filter_focus;
            let cycled = view_data
                .pane_mut(state.active_view)
                .and_then(|pane| pane.cycle_filter(focus));
            match cycled {
                Some((message, _)) => {
                    view_data.clamp_selection(state.active_view);
                    emit_status(state, view_data, tx, message);
                }
                None => emit_status(state, view_data, tx, "no filters on this view"),
            }
        }
        KeyCode::Char('c') => {
            let count = view_data
                .pane(state.active_view)
                .map_or(0, ListPane::filter_count);
            if count > 1 {
                view_data.filter_focus = (view_data.filter_focus + 1) % count;
            }
        }
        KeyCode::Char('F') => {
            view_data.search_input.clear();
            pane_command(state, runtime, view_data, tx, PaneCommand::ClearFilters);
            emit_status(state, view_data, tx, "filters cleared");
        }
        KeyCode::Char('r') => {
            pane_command(state, runtime, view_data, tx, PaneCommand::Refresh);
        }
        KeyCode::Char('g') => {
            let events = pane_command(state, runtime, view_data, tx, PaneCommand::ApplyStaged);
            if events.is_empty() {
                emit_status(state, view_data, tx, "filters apply as you type here");
            }
        }
        KeyCode::Char('a') => {
            state.dispatch(AppCommand::OpenForm);
            match state.mode {
                AppMode::Form(kind) => {
                    view_data.form = Some(FormUiState {
                        payload: FormPayload::blank_for(kind),
                        field_index: 0,
                        saving: false,
                    });
                }
                _ => {
                    view_data.status_token = view_data.status_token.saturating_add(1);
                    schedule_status_clear(tx, view_data.status_token);
                }
            }
        }
        KeyCode::Char('s') => advance_selected_status(state, runtime, view_data, tx),
        KeyCode::Char('d') => delete_selected(state, runtime, view_data, tx, armed),
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
}

fn advance_selected_status<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let view = state.active_view;
    if view.form().is_none() {
        emit_status(state, view_data, tx, format!("{} is read-only", view.label()));
        return;
    }
    let row = view_data.selected_row;
    match view_data.pane(view).and_then(|pane| pane.status_change(row)) {
        Some(mutation) => start_mutation(state, runtime, view_data, tx, mutation),
        None => emit_status(state, view_data, tx, "no row selected"),
    }
}

fn delete_selected<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    armed: Option<Mutation>,
) {
    let view = state.active_view;
    if view.form().is_none() {
        emit_status(state, view_data, tx, format!("{} is read-only", view.label()));
        return;
    }
    let row = view_data.selected_row;
    let Some((mutation, key)) = view_data.pane(view).and_then(|pane| pane.removal(row)) else {
        emit_status(state, view_data, tx, "no row selected");
        return;
    };
    if armed.as_ref() == Some(&mutation) {
        start_mutation(state, runtime, view_data, tx, mutation);
    } else {
        view_data.pending_delete = Some(mutation);
        emit_status(state, view_data, tx, format!("press d again to delete {key}"));
    }
}

fn handle_search_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.search_input.clear();
            pane_command(state, runtime, view_data, tx, PaneCommand::SetSearch(String::new()));
            state.dispatch(AppCommand::ExitToBrowse);
        }
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToBrowse);
            let staged = view_data
                .pane(state.active_view)
                .is_some_and(|pane| pane.mode() == FilterMode::Staged);
            if staged {
                emit_status(state, view_data, tx, "press g to generate the report");
            }
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            let term = view_data.search_input.clone();
            pane_command(state, runtime, view_data, tx, PaneCommand::SetSearch(term));
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.push(ch);
            let term = view_data.search_input.clone();
            pane_command(state, runtime, view_data, tx, PaneCommand::SetSearch(term));
        }
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form) = view_data.form.as_mut() else {
        state.dispatch(AppCommand::ExitToBrowse);
        return;
    };
    let field_count = form.payload.fields().len().max(1);

    match key.code {
        KeyCode::Esc => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToBrowse);
            emit_status(state, view_data, tx, "form canceled");
        }
        KeyCode::Tab | KeyCode::Down => {
            form.field_index = (form.field_index + 1) % field_count;
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.field_index = (form.field_index + field_count - 1) % field_count;
        }
        KeyCode::Backspace => {
            let mut raw = current_raw(form);
            raw.pop();
            form.payload.set_nth(form.field_index, raw);
        }
        KeyCode::Enter => submit_form(state, runtime, view_data, tx),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            submit_form(state, runtime, view_data, tx);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut raw = current_raw(form);
            raw.push(ch);
            form.payload.set_nth(form.field_index, raw);
        }
        _ => {}
    }
}

fn current_raw(form: &FormUiState) -> String {
    form.payload
        .fields()
        .into_iter()
        .nth(form.field_index)
        .map(|field| field.raw)
        .unwrap_or_default()
}

/// Validates on the UI thread, then hands the create to the runtime. The
/// form stays open until the runtime reports back.
fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    if form.saving {
        return;
    }
    match form.payload.mutation() {
        Ok(mutation) => {
            form.saving = true;
            start_mutation(state, runtime, view_data, tx, mutation);
        }
        Err(failure) => emit_status(state, view_data, tx, failure.to_string()),
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|view| *view == state.active_view)
        .unwrap_or(0);
    let tab_titles = ViewKind::ALL
        .iter()
        .map(|view| tab_title(*view, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("taller").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let Some(projection) = view_data
        .pane(state.active_view)
        .map(|pane| pane.projection(&view_data.context, view_data.filter_focus))
    else {
        return;
    };

    let metrics = Paragraph::new(render_metrics_text(&projection.metrics, &view_data.context))
        .block(Block::default().title("resumen").borders(Borders::ALL));
    frame.render_widget(metrics, layout[1]);

    let filters = Paragraph::new(render_filter_text(state, view_data, &projection))
        .block(Block::default().title("filtros").borders(Borders::ALL));
    frame.render_widget(filters, layout[2]);

    render_table(frame, layout[3], view_data, &projection);

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[4]);

    if let Some(form) = &view_data.form {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_form_text(form)).block(
            Block::default()
                .title(form.payload.kind().title())
                .borders(Borders::ALL),
        );
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(72, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn tab_title(view: ViewKind, view_data: &ViewData) -> String {
    match view_data.pane(view).map(ListPane::phase) {
        Some(ViewPhase::Loading) => format!("{} …", view.label()),
        Some(ViewPhase::Failed) => format!("{} !", view.label()),
        _ => view.label().to_owned(),
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view_data: &ViewData,
    projection: &PaneProjection,
) {
    let widths = vec![Constraint::Min(8); projection.columns.len().max(1)];
    let header = Row::new(projection.columns.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = projection.rows.iter().enumerate().map(|(index, row)| {
        let mut row_style = Style::default();
        if row.deadline.overdue {
            row_style = row_style.fg(Color::Red);
        } else if row.deadline.expiring_soon {
            row_style = row_style.fg(Color::Yellow);
        }
        if index == view_data.selected_row {
            row_style = row_style.bg(Color::DarkGray);
        }
        let cells = row.cells.iter().map(|cell| match cell {
            taller_app::Cell::Badge(badge) => {
                Cell::from(badge.label.clone()).style(Style::default().fg(badge_color(badge.style)))
            }
            other => Cell::from(other.text().to_owned()),
        });
        Row::new(cells).style(row_style)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(projection))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn table_title(projection: &PaneProjection) -> String {
    let title = projection.view.title();
    match projection.phase {
        ViewPhase::Loading => format!("{title} (cargando…)"),
        _ if projection.rows.len() == projection.total => {
            format!("{title} ({})", projection.total)
        }
        _ => format!("{title} ({}/{})", projection.rows.len(), projection.total),
    }
}

const fn badge_color(style: BadgeStyle) -> Color {
    match style {
        BadgeStyle::Neutral => Color::Gray,
        BadgeStyle::Info => Color::Cyan,
        BadgeStyle::Success => Color::Green,
        BadgeStyle::Warning => Color::Yellow,
        BadgeStyle::Danger => Color::Red,
    }
}

/// A metric as the summary strip shows it, with its share and trend.
pub fn format_metric(metric: &DerivedMetric, context: &PresentContext) -> String {
    let value = match metric.value {
        MetricValue::Count(count) => count.to_string(),
        MetricValue::Money(amount) => format_money(Some(amount), context.locale),
    };
    let label = if metric.label.is_empty() {
        "(sin valor)"
    } else {
        metric.label.as_str()
    };
    let mut text = format!("{label} {value}");
    if let Some(share) = metric.porcentaje {
        text.push_str(&format!(" ({share:.1}%)"));
    }
    if let Some(trend) = metric.trend {
        text.push(' ');
        text.push_str(trend.arrow());
    }
    text
}

fn render_metrics_text(metrics: &[DerivedMetric], context: &PresentContext) -> String {
    metrics
        .iter()
        .map(|metric| format_metric(metric, context))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn render_filter_text(
    state: &AppState,
    view_data: &ViewData,
    projection: &PaneProjection,
) -> String {
    let search = if state.mode == AppMode::Search {
        format!("/{}▏", view_data.search_input)
    } else if projection.search_term.is_empty() {
        "/ buscar".to_owned()
    } else {
        format!("/{}", projection.search_term)
    };
    let mut parts = vec![search];
    if !projection.filters.is_empty() {
        parts.push(projection.filters.clone());
    }
    if projection.unapplied {
        parts.push("g genera informe".to_owned());
    }
    if projection.phase == ViewPhase::Failed
        && let Some(error) = &projection.error
    {
        parts.push(format!("error: {error}"));
    }
    parts.join(" | ")
}

fn render_form_text(form: &FormUiState) -> String {
    let mut lines = Vec::new();
    for (index, field) in form.payload.fields().into_iter().enumerate() {
        let cursor = if index == form.field_index { ">" } else { " " };
        lines.push(format!("{cursor} {}: {}", field.label, field.raw));
        if let Some(error) = field.error {
            lines.push(format!("    ! {error}"));
        }
    }
    lines.push(String::new());
    if form.saving {
        lines.push("saving…".to_owned());
    }
    lines.push("tab/shift+tab field | enter or ctrl+s save | esc cancel".to_owned());
    lines.join("\n")
}

fn status_text(state: &AppState) -> String {
    let mode = match state.mode {
        AppMode::Browse => "BROWSE",
        AppMode::Search => "SEARCH",
        AppMode::Form(_) => "FORM",
    };
    let hints = match state.mode {
        AppMode::Browse => {
            "tab views | / search | f/c filter | F reset | g report | r reload | a add | s status \
             | d delete | ? help | ctrl+q"
        }
        AppMode::Search => "type to search | enter done | esc clear",
        AppMode::Form(_) => "enter save | esc cancel",
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
views: tab/shift+tab next/prev | 1-6 jump | j/k rows\n\
filters: / search | f cycle value | c next filter | F reset | g generate report (staged views)\n\
data: r reload | a add | s next status | d d delete (compras, servicios, presupuestos, notas)\n\
form: tab/shift+tab field | enter or ctrl+s save | esc cancel\n\
rows: red overdue | yellow due soon"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
