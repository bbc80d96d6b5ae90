//! Callback router
//!
//! Binds every event in the catalogue to the first component, in priority
//! order, that registered a handler named `on_<snake_case wire name>`.
//! Resolution happens once in [`CallbackRouter::new`]; dispatch is an index
//! into the bound table.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use crate::messages::{Event, EventKind};

/// A bound handler
pub type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

/// Prefix every handler name carries
pub const HANDLER_PREFIX: &str = "on_";

/// Convert a camelCase callback name to snake_case.
///
/// Acronyms stay together: `XMLParser` becomes `xml_parser`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let word_start = prev.is_lowercase() || prev.is_ascii_digit();
            if word_start || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Handler name a component registers for `kind`
pub fn handler_name(kind: EventKind) -> String {
    format!("{}{}", HANDLER_PREFIX, camel_to_snake(kind.wire_name()))
}

/// Named handlers one component exposes
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Callback>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`
    pub fn on<F>(mut self, name: &str, callback: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Arc::new(callback));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.handlers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A component that handles some subset of the event catalogue
pub trait EventHandler: Send + Sync {
    /// Component name, for logs and diagnostics
    fn name(&self) -> &str;

    /// Handlers this component exposes, keyed by handler name
    fn handlers(self: Arc<Self>) -> HandlerTable;
}

struct Binding {
    component: String,
    callback: Callback,
}

/// Event kind to handler table, resolved once
pub struct CallbackRouter {
    bindings: Vec<Option<Binding>>,
}

impl CallbackRouter {
    /// Resolve bindings over `candidates`, highest priority first
    pub fn new(candidates: &[Arc<dyn EventHandler>]) -> Self {
        let tables: Vec<(String, HandlerTable)> = candidates
            .iter()
            .map(|candidate| (candidate.name().to_string(), Arc::clone(candidate).handlers()))
            .collect();

        let mut bindings: Vec<Option<Binding>> = (0..EventKind::COUNT).map(|_| None).collect();

        for kind in EventKind::ALL {
            let method = handler_name(kind);
            let bound = tables.iter().find_map(|(component, table)| {
                table.get(&method).map(|callback| Binding {
                    component: component.clone(),
                    callback: Arc::clone(callback),
                })
            });

            match &bound {
                Some(binding) => debug!(
                    "Bound {} -> {}::{}",
                    kind.wire_name(),
                    binding.component,
                    method
                ),
                None => debug!("No handler for {}", kind.wire_name()),
            }
            bindings[kind.index()] = bound;
        }

        // Handler names that match nothing in the catalogue are almost always typos
        for (component, table) in &tables {
            for name in table.names() {
                if !EventKind::ALL.iter().any(|kind| handler_name(*kind) == name) {
                    warn!("{} registers {} which matches no event", component, name);
                }
            }
        }

        Self { bindings }
    }

    /// Deliver one event to its bound handler; unbound events are dropped
    pub fn dispatch(&self, event: &Event) {
        if let Some(binding) = &self.bindings[event.kind().index()] {
            (binding.callback)(event);
        }
    }

    /// Component bound to `kind`, if any
    pub fn bound_to(&self, kind: EventKind) -> Option<&str> {
        self.bindings[kind.index()]
            .as_ref()
            .map(|binding| binding.component.as_str())
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_some()).count()
    }
}
