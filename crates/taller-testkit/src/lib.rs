// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::{BTreeMap, VecDeque};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use taller_app::catalog::{
    BUDGET_STATUS, EQUIPMENT_KIND, EQUIPMENT_STATUS, NOTE_KIND, NOTE_STATUS, PICKUP_STATUS,
    PURCHASE_STATUS, SERVICE_PRIORITY, SERVICE_STATUS,
};
use taller_app::{
    AdjustmentNote, AdjustmentNoteId, CategoricalLookup, Equipment, EquipmentId, FetchError, Money,
    Pickup, PickupId, PurchaseOrder, PurchaseOrderId, QueryParams, RecordSource, SEARCH_PARAM,
    ServiceBudget, ServiceBudgetId, ServiceOrder, ServiceOrderId, ViewKind,
};
use time::macros::date;
use time::{Date, Duration};
use tiny_http::{Header, Method, Response, Server};
use tracing::debug;

const FIRST_NAMES: [&str; 16] = [
    "Ana", "Luis", "María", "Jorge", "Sofía", "Carlos", "Valeria", "Andrés", "Lucía", "Diego",
    "Camila", "Mateo", "Elena", "Pablo", "Daniela", "Rafael",
];
const LAST_NAMES: [&str; 16] = [
    "Mora", "Castro", "Rojas", "Vargas", "Jiménez", "Solano", "Araya", "Benítez", "Gómez",
    "Ortiz", "Chaves", "Acosta", "Brenes", "Villalba", "Núñez", "Quesada",
];

const SUPPLIERS: [&str; 8] = [
    "Repuestos del Sur",
    "Importadora Lux",
    "Distribuidora Central",
    "TecnoPartes",
    "Electro Insumos",
    "Mayorista Andina",
    "Componentes del Este",
    "Casa del Técnico",
];

const BRANDS: [&str; 10] = [
    "Lenovo", "HP", "Dell", "Samsung", "Epson", "Asus", "Acer", "Apple", "Brother", "Motorola",
];

const SERVICE_REASONS: [&str; 8] = [
    "no enciende",
    "pantalla dañada",
    "cambio de batería",
    "limpieza general",
    "falla de teclado",
    "recarga de cartuchos",
    "actualización de memoria",
    "sobrecalentamiento",
];

const NOTE_REASONS: [&str; 5] = [
    "devolución parcial",
    "descuento comercial",
    "error de facturación",
    "recargo por flete",
    "garantía aplicada",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible shop records. Dates are spread around a
/// fixed reference day so deadline highlighting has something to show.
#[derive(Debug, Clone)]
pub struct ShopFaker {
    rng: DeterministicRng,
    today: Date,
}

impl ShopFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            today: reference_day(),
        }
    }

    pub fn with_today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }

    pub fn purchase_order(&mut self, id: i64) -> PurchaseOrder {
        let issued = self.day_offset(-45, 0);
        PurchaseOrder {
            id: PurchaseOrderId::new(id),
            number: format!("OC-{id:04}"),
            supplier: Some(self.pick(&SUPPLIERS).to_owned()),
            requested_by: Some(self.person_name()),
            issued_on: Some(issued.to_string()),
            due_on: self.maybe(|faker| faker.day_offset(-5, 20).to_string()),
            status: Some(self.pick_value(&PURCHASE_STATUS)),
            total: Some(self.money(50_000, 2_500_000)),
        }
    }

    pub fn service_order(&mut self, id: i64) -> ServiceOrder {
        let received = self.day_offset(-30, 0);
        ServiceOrder {
            id: ServiceOrderId::new(id),
            number: format!("OS-{id:04}"),
            customer: Some(self.person_name()),
            equipment: Some(self.equipment_description()),
            technician: self.maybe(Self::person_name),
            received_on: Some(received.to_string()),
            promised_on: Some(self.day_offset(-3, 14).to_string()),
            status: Some(self.pick_value(&SERVICE_STATUS)),
            priority: Some(self.pick_value(&SERVICE_PRIORITY)),
            total: self.maybe(|faker| faker.money(10_000, 450_000)),
        }
    }

    pub fn service_budget(&mut self, id: i64) -> ServiceBudget {
        let issued = self.day_offset(-20, 0);
        ServiceBudget {
            id: ServiceBudgetId::new(id),
            number: format!("PR-{id:04}"),
            customer: Some(self.person_name()),
            description: Some(self.pick(&SERVICE_REASONS).to_owned()),
            issued_on: Some(issued.to_string()),
            valid_until: Some(self.day_offset(-2, 15).to_string()),
            status: Some(self.pick_value(&BUDGET_STATUS)),
            total: Some(self.money(15_000, 600_000)),
        }
    }

    pub fn adjustment_note(&mut self, id: i64) -> AdjustmentNote {
        let kind = self.pick_value(&NOTE_KIND);
        let prefix = if kind == "debito" { "ND" } else { "NC" };
        AdjustmentNote {
            id: AdjustmentNoteId::new(id),
            number: format!("{prefix}-{id:04}"),
            kind: Some(kind),
            customer: Some(self.person_name()),
            reason: Some(self.pick(&NOTE_REASONS).to_owned()),
            issued_on: Some(self.day_offset(-60, 0).to_string()),
            status: Some(self.pick_value(&NOTE_STATUS)),
            amount: Some(self.money(1_000, 300_000)),
        }
    }

    pub fn equipment(&mut self, id: i64) -> Equipment {
        let brand = self.pick(&BRANDS);
        Equipment {
            id: EquipmentId::new(id),
            serial_number: Some(format!(
                "{}{:08}",
                brand_prefix(brand),
                self.rng.next_u64() % 100_000_000
            )),
            kind: Some(self.pick_value(&EQUIPMENT_KIND)),
            brand: Some(brand.to_owned()),
            model: Some(format!("{}-{}", brand_prefix(brand), 100 + self.rng.int_n(900))),
            customer: Some(self.person_name()),
            status: Some(self.pick_value(&EQUIPMENT_STATUS)),
            registered_on: Some(self.day_offset(-400, 0).to_string()),
        }
    }

    pub fn pickup(&mut self, id: i64) -> Pickup {
        Pickup {
            id: PickupId::new(id),
            number: format!("RT-{id:04}"),
            customer: Some(self.person_name()),
            equipment: Some(self.equipment_description()),
            scheduled_on: Some(self.day_offset(-4, 10).to_string()),
            status: Some(self.pick_value(&PICKUP_STATUS)),
            balance: self.maybe(|faker| faker.money(0, 200_000)),
        }
    }

    pub fn person_name(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        format!("{first} {last}")
    }

    fn equipment_description(&mut self) -> String {
        let brand = self.pick(&BRANDS);
        let reason = self.pick(&SERVICE_REASONS);
        format!("{brand} ({reason})")
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_value(&mut self, lookup: &CategoricalLookup) -> String {
        let entries = lookup.entries();
        entries[self.rng.int_n(entries.len())].value.to_owned()
    }

    fn maybe<T>(&mut self, make: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.rng.int_n(5) == 0 {
            None
        } else {
            Some(make(self))
        }
    }

    fn day_offset(&mut self, min: i64, max: i64) -> Date {
        let span = (max - min + 1).max(1) as usize;
        let offset = min + self.rng.int_n(span) as i64;
        self.today.saturating_add(Duration::days(offset))
    }

    /// Whole amounts in the two-decimal currency, rounded to 50 units.
    fn money(&mut self, min_units: i64, max_units: i64) -> Money {
        let span = (max_units - min_units + 1).max(1) as usize;
        let units = min_units + self.rng.int_n(span) as i64;
        let rounded = units - units % 50;
        let cents = if self.rng.bool() { 50 } else { 0 };
        Money::from_cents(rounded * 100 + cents)
    }
}

pub fn brand_prefix(brand: &str) -> String {
    brand.chars().take(3).collect::<String>().to_uppercase()
}

/// Day every fixture is generated around unless a faker overrides it.
pub fn reference_day() -> Date {
    date!(2026 - 05 - 15)
}

/// Primary key field the backend returns for each list resource.
pub fn id_field(view: ViewKind) -> &'static str {
    match view {
        ViewKind::PurchaseOrders => "orden_compra_id",
        ViewKind::ServiceOrders => "orden_servicio_id",
        ViewKind::ServiceBudgets => "presupuesto_id",
        ViewKind::AdjustmentNotes => "nota_id",
        ViewKind::Equipment => "equipo_id",
        ViewKind::Pickups => "retiro_id",
    }
}

#[derive(Debug, Default)]
struct FixtureState {
    collections: BTreeMap<String, Vec<Value>>,
    failures: VecDeque<FetchError>,
    requests: Vec<(String, QueryParams)>,
}

/// In-process record source holding raw JSON rows per resource path.
///
/// Query parameters filter rows by case-insensitive equality on the named
/// field; `busqueda` matches any text field by substring.
#[derive(Debug, Default)]
pub struct FixtureSource {
    state: Mutex<FixtureState>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every list resource filled from one seeded faker.
    pub fn demo(faker: &mut ShopFaker, per_view: usize) -> Result<Self> {
        let source = Self::new();
        let count = per_view as i64;
        source.insert(
            ViewKind::PurchaseOrders.resource(),
            (1..=count).map(|id| faker.purchase_order(id)),
        )?;
        source.insert(
            ViewKind::ServiceOrders.resource(),
            (1..=count).map(|id| faker.service_order(id)),
        )?;
        source.insert(
            ViewKind::ServiceBudgets.resource(),
            (1..=count).map(|id| faker.service_budget(id)),
        )?;
        source.insert(
            ViewKind::AdjustmentNotes.resource(),
            (1..=count).map(|id| faker.adjustment_note(id)),
        )?;
        source.insert(
            ViewKind::Equipment.resource(),
            (1..=count).map(|id| faker.equipment(id)),
        )?;
        source.insert(
            ViewKind::Pickups.resource(),
            (1..=count).map(|id| faker.pickup(id)),
        )?;
        Ok(source)
    }

    pub fn insert<T: Serialize>(
        &self,
        resource: &str,
        records: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        let rows = records
            .into_iter()
            .map(|record| serde_json::to_value(record))
            .collect::<serde_json::Result<Vec<_>>>()
            .with_context(|| format!("serialize fixtures for {resource}"))?;
        self.lock()
            .collections
            .entry(resource.to_owned())
            .or_default()
            .extend(rows);
        Ok(())
    }

    /// Makes the next call, read or write, fail with `error` instead of answering.
    pub fn fail_next(&self, error: FetchError) {
        self.lock().failures.push_back(error);
    }

    pub fn len(&self, resource: &str) -> usize {
        self.lock()
            .collections
            .get(resource)
            .map_or(0, Vec::len)
    }

    /// Every fetch seen so far, oldest first.
    pub fn requests(&self) -> Vec<(String, QueryParams)> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn matching_rows(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Vec<Value>, FetchError> {
        let mut state = self.lock();
        state.requests.push((resource.to_owned(), query.clone()));
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        let Some(rows) = state.collections.get(resource) else {
            return Err(FetchError::Status {
                status: 404,
                message: format!("no fixtures for {resource}"),
            });
        };
        let pairs = query.pairs();
        Ok(rows
            .iter()
            .filter(|row| pairs.iter().all(|(name, value)| row_matches(row, name, value)))
            .cloned()
            .collect())
    }
}

impl RecordSource for FixtureSource {
    fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Vec<T>, FetchError> {
        let rows = self.matching_rows(resource, query)?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|error| {
                    FetchError::Decode(format!("decode {resource} fixture: {error}"))
                })
            })
            .collect()
    }

    fn create<B: Serialize>(&self, resource: &str, body: &B) -> Result<(), FetchError> {
        let mut row = serde_json::to_value(body)
            .map_err(|error| FetchError::Decode(format!("encode {resource} body: {error}")))?;
        let mut state = self.lock();
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        let rows = state.collections.entry(resource.to_owned()).or_default();
        if let (Some(view), Value::Object(fields)) = (view_for(resource), &mut row) {
            let key = id_field(view);
            if !fields.contains_key(key) {
                fields.insert(key.to_owned(), json!(rows.len() as i64 + 1));
            }
        }
        rows.push(row);
        Ok(())
    }

    /// Merges the body's fields into the row whose primary key is `id`.
    fn update<B: Serialize>(&self, resource: &str, id: i64, body: &B) -> Result<(), FetchError> {
        let changes = match serde_json::to_value(body) {
            Ok(Value::Object(changes)) => changes,
            Ok(_) => return Err(FetchError::Decode(format!("{resource} body is not an object"))),
            Err(error) => {
                return Err(FetchError::Decode(format!("encode {resource} body: {error}")));
            }
        };
        let mut state = self.lock();
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        let row = state
            .collections
            .get_mut(resource)
            .and_then(|rows| rows.iter_mut().find(|row| has_id(row, resource, id)))
            .ok_or_else(|| missing_record(resource, id))?;
        if let Value::Object(fields) = row {
            fields.extend(changes);
        }
        Ok(())
    }

    fn delete(&self, resource: &str, id: i64) -> Result<(), FetchError> {
        let mut state = self.lock();
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        let rows = state
            .collections
            .get_mut(resource)
            .ok_or_else(|| missing_record(resource, id))?;
        let before = rows.len();
        rows.retain(|row| !has_id(row, resource, id));
        if rows.len() == before {
            return Err(missing_record(resource, id));
        }
        Ok(())
    }
}

fn has_id(row: &Value, resource: &str, id: i64) -> bool {
    view_for(resource)
        .and_then(|view| row.get(id_field(view)))
        .and_then(Value::as_i64)
        == Some(id)
}

fn missing_record(resource: &str, id: i64) -> FetchError {
    FetchError::Status {
        status: 404,
        message: format!("no record {id} in {resource}"),
    }
}

fn view_for(resource: &str) -> Option<ViewKind> {
    ViewKind::ALL
        .into_iter()
        .find(|view| view.resource() == resource)
}

fn row_matches(row: &Value, name: &str, wanted: &str) -> bool {
    let Value::Object(fields) = row else {
        return false;
    };
    if name == SEARCH_PARAM {
        let wanted = wanted.to_lowercase();
        return fields.values().any(|value| match value {
            Value::String(text) => text.to_lowercase().contains(&wanted),
            _ => false,
        });
    }
    match fields.get(name) {
        Some(Value::String(text)) => text.eq_ignore_ascii_case(wanted),
        Some(Value::Number(number)) => number.to_string() == wanted,
        Some(Value::Bool(flag)) => flag.to_string() == wanted,
        _ => false,
    }
}

/// HTTP front for a [`FixtureSource`], speaking the backend's envelope.
/// Stops serving when dropped.
pub struct MockApi {
    addr: SocketAddr,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

impl MockApi {
    pub fn start(source: FixtureSource) -> Result<Self> {
        let server = Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("bind mock api: {error}"))?;
        let addr = server
            .server_addr()
            .to_ip()
            .context("mock api is not listening on an IP address")?;
        let server = Arc::new(server);
        let source = Arc::new(source);

        let worker = Arc::clone(&server);
        let handle = std::thread::spawn(move || {
            for request in worker.incoming_requests() {
                serve(&source, request);
            }
        });

        Ok(Self {
            addr,
            server,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(source: &FixtureSource, mut request: tiny_http::Request) {
    let (path, query) = split_url(request.url());
    let method = request.method().clone();
    debug!(%method, path = %path, "mock api request");

    let (status, body) = match (method, record_path(&path)) {
        (Method::Get, _) => match source.fetch::<Value>(&path, &query) {
            Ok(rows) => (200, json!({"success": true, "data": rows})),
            Err(error) => error_body(&error),
        },
        (Method::Post, _) => match read_json(&mut request) {
            Some(payload) => match source.create(&path, &payload) {
                Ok(()) => (201, json!({"success": true, "data": payload})),
                Err(error) => error_body(&error),
            },
            None => invalid_body(),
        },
        (Method::Put, Some((resource, id))) => match read_json(&mut request) {
            Some(payload) => match source.update(resource, id, &payload) {
                Ok(()) => (200, json!({"success": true, "data": payload})),
                Err(error) => error_body(&error),
            },
            None => invalid_body(),
        },
        (Method::Delete, Some((resource, id))) => match source.delete(resource, id) {
            Ok(()) => (200, json!({"success": true})),
            Err(error) => error_body(&error),
        },
        _ => (
            405,
            json!({"success": false, "message": "método no soportado"}),
        ),
    };

    let mut response = Response::from_string(body.to_string()).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    let _ = request.respond(response);
}

fn read_json(request: &mut tiny_http::Request) -> Option<Value> {
    let mut raw = String::new();
    request.as_reader().read_to_string(&mut raw).ok()?;
    serde_json::from_str(&raw).ok()
}

fn invalid_body() -> (u16, Value) {
    (
        400,
        json!({"success": false, "message": "cuerpo JSON inválido"}),
    )
}

/// Splits `<resource>/<id>` into its parts.
fn record_path(path: &str) -> Option<(&str, i64)> {
    let (resource, id) = path.rsplit_once('/')?;
    Some((resource, id.parse().ok()?))
}

fn error_body(error: &FetchError) -> (u16, Value) {
    let message = match error {
        FetchError::Status { message, .. } => message.clone(),
        other => other.to_string(),
    };
    (
        error.status().unwrap_or(500),
        json!({"success": false, "message": message}),
    )
}

fn split_url(raw: &str) -> (String, QueryParams) {
    let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
    let mut params = QueryParams::new();
    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.insert(name.into_owned(), value.into_owned());
    }
    (path.to_owned(), params)
}

#[cfg(test)]
mod tests {
    use super::{
        FixtureSource, ShopFaker, brand_prefix, id_field, record_path, reference_day, split_url,
    };
    use serde_json::json;
    use taller_app::catalog::{PURCHASE_STATUS, SERVICE_PRIORITY};
    use taller_app::{
        FetchError, PurchaseOrder, QueryParams, QueryValue, RecordSource, SEARCH_PARAM,
        ServiceOrder, ViewKind, parse_wire_date,
    };

    #[test]
    fn new_deterministic_seed() {
        let mut left = ShopFaker::new(42);
        let mut right = ShopFaker::new(42);
        assert_eq!(left.purchase_order(1), right.purchase_order(1));
        assert_eq!(left.pickup(2), right.pickup(2));
        assert_eq!(
            ShopFaker::new(0).purchase_order(1),
            ShopFaker::new(1).purchase_order(1)
        );
    }

    #[test]
    fn purchase_order_uses_known_statuses_and_wire_dates() {
        let mut faker = ShopFaker::new(7);
        for id in 1..=20 {
            let order = faker.purchase_order(id);
            let status = order.status.as_deref().expect("status");
            assert!(PURCHASE_STATUS.get(status).is_some(), "unknown status {status}");
            let issued = order.issued_on.as_deref().and_then(parse_wire_date);
            assert!(issued.is_some_and(|day| day <= reference_day()));
            assert!(order.total.is_some_and(|total| !total.is_negative()));
        }
    }

    #[test]
    fn service_order_priorities_come_from_the_catalog() {
        let mut faker = ShopFaker::new(11);
        let order: ServiceOrder = faker.service_order(3);
        assert_eq!(order.number, "OS-0003");
        let priority = order.priority.as_deref().expect("priority");
        assert!(SERVICE_PRIORITY.get(priority).is_some());
    }

    #[test]
    fn brand_prefix_handles_ascii_and_unicode_inputs() {
        assert_eq!(brand_prefix("Lenovo"), "LEN");
        assert_eq!(brand_prefix("HP"), "HP");
        assert_eq!(brand_prefix("ñandú"), "ÑAN");
    }

    #[test]
    fn demo_fills_every_resource() {
        let mut faker = ShopFaker::new(3);
        let source = FixtureSource::demo(&mut faker, 5).expect("demo fixtures");
        for view in ViewKind::ALL {
            assert_eq!(source.len(view.resource()), 5, "{}", view.label());
        }
    }

    #[test]
    fn fetch_filters_by_field_and_search() {
        let source = FixtureSource::new();
        source
            .insert(
                ViewKind::PurchaseOrders.resource(),
                [
                    json!({
                        "orden_compra_id": 1,
                        "numero": "OC-1",
                        "estado": "pendiente",
                        "proveedor_nombre": "Importadora Lux"
                    }),
                    json!({
                        "orden_compra_id": 2,
                        "numero": "OC-2",
                        "estado": "recibida",
                        "proveedor_nombre": "TecnoPartes"
                    }),
                    json!({
                        "orden_compra_id": 3,
                        "numero": "OC-3",
                        "estado": "Pendiente",
                        "proveedor_nombre": "TecnoPartes"
                    }),
                ],
            )
            .expect("insert");

        let pending: Vec<PurchaseOrder> = source
            .fetch(
                ViewKind::PurchaseOrders.resource(),
                &QueryParams::new().with("estado", "pendiente"),
            )
            .expect("fetch");
        assert_eq!(pending.len(), 2);

        let searched: Vec<PurchaseOrder> = source
            .fetch(
                ViewKind::PurchaseOrders.resource(),
                &QueryParams::new()
                    .with("estado", "pendiente")
                    .with(SEARCH_PARAM, "tecno"),
            )
            .expect("fetch");
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].number, "OC-3");
        assert_eq!(source.requests().len(), 2);
    }

    #[test]
    fn unknown_resource_is_not_found() {
        let source = FixtureSource::new();
        let error = source
            .fetch::<PurchaseOrder>("/api/nada", &QueryParams::new())
            .expect_err("missing resource");
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn injected_failure_applies_once() {
        let mut faker = ShopFaker::new(5);
        let source = FixtureSource::demo(&mut faker, 2).expect("demo fixtures");
        source.fail_next(FetchError::Connection("apagado".to_owned()));

        let resource = ViewKind::Equipment.resource();
        assert!(source.fetch::<serde_json::Value>(resource, &QueryParams::new()).is_err());
        assert_eq!(
            source
                .fetch::<serde_json::Value>(resource, &QueryParams::new())
                .expect("second fetch")
                .len(),
            2
        );
    }

    #[test]
    fn create_appends_and_assigns_an_id() {
        let source = FixtureSource::new();
        let resource = ViewKind::ServiceBudgets.resource();
        source
            .create(resource, &json!({"numero": "PR-1", "estado": "pendiente"}))
            .expect("create");
        let rows: Vec<serde_json::Value> = source
            .fetch(resource, &QueryParams::new())
            .expect("fetch");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][id_field(ViewKind::ServiceBudgets)], json!(1));
    }

    #[test]
    fn update_merges_fields_and_delete_removes_the_row() {
        let mut faker = ShopFaker::new(9);
        let source = FixtureSource::demo(&mut faker, 3).expect("demo fixtures");
        let resource = ViewKind::PurchaseOrders.resource();

        source
            .update(resource, 2, &json!({"estado": "recibida"}))
            .expect("update");
        let received: Vec<PurchaseOrder> = source
            .fetch(resource, &QueryParams::new().with("estado", "recibida"))
            .expect("fetch");
        assert!(received.iter().any(|order| order.id.get() == 2));

        source.delete(resource, 2).expect("delete");
        assert_eq!(source.len(resource), 2);
        let error = source.delete(resource, 2).expect_err("already gone");
        assert_eq!(error.status(), Some(404));
        source.fail_next(FetchError::Connection("apagado".to_owned()));
        assert!(source.delete(resource, 3).is_err());
        assert_eq!(source.len(resource), 2);
        assert_eq!(
            source
                .update(resource, 99, &json!({"estado": "recibida"}))
                .expect_err("unknown id")
                .status(),
            Some(404)
        );
    }

    #[test]
    fn record_path_needs_a_numeric_tail() {
        assert_eq!(
            record_path("/api/compras/ordenes/12"),
            Some(("/api/compras/ordenes", 12))
        );
        assert_eq!(record_path("/api/compras/ordenes"), None);
    }

    #[test]
    fn split_url_decodes_query_pairs() {
        let (path, query) = split_url("/api/equipos?tipo=notebook&busqueda=mar%C3%ADa");
        assert_eq!(path, "/api/equipos");
        assert_eq!(query.get("tipo"), Some(&QueryValue::Text("notebook".to_owned())));
        assert_eq!(
            query.get(SEARCH_PARAM),
            Some(&QueryValue::Text("maría".to_owned()))
        );
    }
}
