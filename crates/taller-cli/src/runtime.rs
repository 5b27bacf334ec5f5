// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::thread;
use taller_api::Client;
use taller_app::{FetchError, FetchTicket, Mutation, ShopClock};
use taller_tui::{InternalEvent, ViewSnapshot, load_snapshot};
use time::Date;
use tracing::debug;

/// Feeds the TUI from the REST backend. Loads and saves run on worker
/// threads so a slow server never blocks input.
pub struct ApiRuntime {
    client: Client,
    clock: ShopClock,
}

impl ApiRuntime {
    pub fn new(client: Client, clock: ShopClock) -> Self {
        Self { client, clock }
    }
}

impl taller_tui::AppRuntime for ApiRuntime {
    fn load_view(&mut self, ticket: &FetchTicket) -> Result<ViewSnapshot, FetchError> {
        load_snapshot(&self.client, ticket)
    }

    fn mutate(&mut self, mutation: &Mutation) -> Result<(), FetchError> {
        mutation.apply(&self.client)
    }

    fn today(&self) -> Date {
        self.clock.today()
    }

    fn spawn_load(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("fetch-{}", ticket.view.label()))
            .spawn(move || {
                let result = load_snapshot(&client, &ticket);
                if tx
                    .send(InternalEvent::Loaded {
                        view: ticket.view,
                        request_id: ticket.request_id,
                        result,
                    })
                    .is_err()
                {
                    debug!(request_id = ticket.request_id, "ui gone before load finished");
                }
            })
            .context("spawn fetch worker")?;
        Ok(())
    }

    fn spawn_mutation(&mut self, mutation: Mutation, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("{}-{}", mutation.verb(), mutation.view().label()))
            .spawn(move || {
                let result = mutation.apply(&client);
                if tx.send(InternalEvent::Mutated { mutation, result }).is_err() {
                    debug!("ui gone before save finished");
                }
            })
            .context("spawn save worker")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ApiRuntime;
    use anyhow::Result;
    use serde_json::json;
    use std::sync::mpsc;
    use std::time::Duration;
    use taller_api::Client;
    use taller_app::{FetchError, FetchTicket, Mutation, QueryParams, ShopClock, ViewKind};
    use taller_testkit::{FixtureSource, MockApi, ShopFaker};
    use taller_tui::{AppRuntime, InternalEvent, ViewSnapshot};
    use time::macros::offset;

    fn ticket(view: ViewKind, request_id: u64) -> FetchTicket {
        FetchTicket {
            request_id,
            view,
            resource: view.resource(),
            query: QueryParams::new(),
        }
    }

    fn runtime_for(api: &MockApi) -> Result<ApiRuntime> {
        Ok(ApiRuntime::new(
            Client::new(&api.base_url(), Duration::from_secs(5))?,
            ShopClock::new(offset!(-6)),
        ))
    }

    #[test]
    fn spawned_load_reports_back_on_the_channel() -> Result<()> {
        let mut faker = ShopFaker::new(11);
        let api = MockApi::start(FixtureSource::demo(&mut faker, 4)?)?;
        let mut runtime = runtime_for(&api)?;
        let (tx, rx) = mpsc::channel();

        runtime.spawn_load(ticket(ViewKind::ServiceBudgets, 9), tx)?;
        let event = rx.recv_timeout(Duration::from_secs(10))?;
        match event {
            InternalEvent::Loaded {
                view,
                request_id,
                result: Ok(ViewSnapshot::ServiceBudgets(rows)),
            } => {
                assert_eq!(view, ViewKind::ServiceBudgets);
                assert_eq!(request_id, 9);
                assert_eq!(rows.len(), 4);
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn backend_failures_travel_as_fetch_errors() -> Result<()> {
        let api = MockApi::start(FixtureSource::new())?;
        let mut runtime = runtime_for(&api)?;
        let (tx, rx) = mpsc::channel();

        runtime.spawn_load(ticket(ViewKind::Pickups, 1), tx)?;
        match rx.recv_timeout(Duration::from_secs(10))? {
            InternalEvent::Loaded {
                result: Err(FetchError::Status { status, .. }),
                ..
            } => assert_eq!(status, 404),
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn spawned_mutations_reach_the_backend() -> Result<()> {
        let mut faker = ShopFaker::new(3);
        let api = MockApi::start(FixtureSource::demo(&mut faker, 2)?)?;
        let mut runtime = runtime_for(&api)?;
        let (tx, rx) = mpsc::channel();

        let update = Mutation::Update {
            view: ViewKind::PurchaseOrders,
            id: 1,
            body: json!({"estado": "enviada"}),
        };
        runtime.spawn_mutation(update.clone(), tx.clone())?;
        match rx.recv_timeout(Duration::from_secs(10))? {
            InternalEvent::Mutated {
                mutation,
                result: Ok(()),
            } => assert_eq!(mutation, update),
            other => panic!("unexpected event {other:?}"),
        }

        let delete = Mutation::Delete {
            view: ViewKind::PurchaseOrders,
            id: 9,
        };
        runtime.spawn_mutation(delete, tx)?;
        match rx.recv_timeout(Duration::from_secs(10))? {
            InternalEvent::Mutated {
                result: Err(FetchError::Status { status, .. }),
                ..
            } => assert_eq!(status, 404),
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }
}
