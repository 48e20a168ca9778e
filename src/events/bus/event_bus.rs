// src/events/bus/event_bus.rs
//
// Synchronous, typed event dispatch.
//
// Handlers run on the emitting thread in subscription order. Nothing is
// retained after an emit returns; the debug log line is the only trace.

use log::{debug, error};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::RwLock;

use crate::events::types::DomainEvent;

type Handler = Box<dyn Fn(&dyn Any) + Send + Sync>;

/// Routes numbering events to their subscribers.
///
/// A panicking handler is logged and skipped; the remaining handlers still
/// run and the emitter never sees the panic.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<TypeId, Vec<Handler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let erased: Handler = Box::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });

        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(erased);
    }

    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let subscribed = handlers.get(&TypeId::of::<E>());

        debug!(
            "[EVENT] {} (id: {}, at: {}) | {} handlers",
            event.event_type(),
            event.event_id(),
            event.occurred_at().to_rfc3339(),
            subscribed.map_or(0, Vec::len)
        );

        for (idx, handler) in subscribed.into_iter().flatten().enumerate() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(&event as &dyn Any))) {
                error!(
                    "Handler {} for {} panicked: {:?}",
                    idx,
                    event.event_type(),
                    panic
                );
            }
        }
    }

    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}
