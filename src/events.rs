//! Minimal stand-in for the event-dispatcher collaborator of spec.md §6.
//!
//! The real dispatcher supports arbitrary `type[.name]` typenames and
//! wildcard matching; this crate only ever needs the two concrete event
//! types the driver emits (`tick`, `end`), so it implements just that
//! surface rather than importing a general pub/sub crate for two event
//! names.

use std::sync::Arc;

/// The two events [`crate::Simulation::step`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Tick,
    End,
}

pub type Listener = Arc<dyn Fn(EventType) + Send + Sync>;

/// Registers named listeners per event type and invokes them in
/// registration order. `typenames` follows the upstream `"tick.foo end.foo"`
/// convention: whitespace-separated `type[.name]` tokens, where `.name`
/// lets a later call replace just that listener without disturbing others
/// on the same event type.
#[derive(Default)]
pub struct Dispatcher {
    tick: Vec<(Option<String>, Listener)>,
    end: Vec<(Option<String>, Listener)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or, if `typenames` repeats a `.name` suffix already in use,
    /// replace) a listener for one or more whitespace-separated typenames.
    pub fn on(&mut self, typenames: &str, listener: Listener) {
        for token in typenames.split_whitespace() {
            let (ty, name) = match token.split_once('.') {
                Some((ty, name)) => (ty, Some(name.to_string())),
                None => (token, None),
            };
            let bucket = match ty {
                "tick" => &mut self.tick,
                "end" => &mut self.end,
                _ => continue,
            };
            if let Some(name) = &name {
                bucket.retain(|(n, _)| n.as_deref() != Some(name.as_str()));
            }
            bucket.push((name, listener.clone()));
        }
    }

    /// Remove every listener registered under `typenames` (only the `.name`
    /// form is removable; bare `"tick"`/`"end"` clears all listeners for
    /// that type).
    pub fn off(&mut self, typenames: &str) {
        for token in typenames.split_whitespace() {
            let (ty, name) = match token.split_once('.') {
                Some((ty, name)) => (ty, Some(name)),
                None => (token, None),
            };
            let bucket = match ty {
                "tick" => &mut self.tick,
                "end" => &mut self.end,
                _ => continue,
            };
            match name {
                Some(name) => bucket.retain(|(n, _)| n.as_deref() != Some(name)),
                None => bucket.clear(),
            }
        }
    }

    pub fn call(&self, event: EventType) {
        let bucket = match event {
            EventType::Tick => &self.tick,
            EventType::End => &self.end,
        };
        for (_, listener) in bucket {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn listeners_fire_in_registration_order() {
        let mut dispatcher = Dispatcher::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let o1 = order.clone();
        let o2 = order.clone();
        dispatcher.on("tick", Arc::new(move |_| o1.lock().unwrap().push(1)));
        dispatcher.on("tick", Arc::new(move |_| o2.lock().unwrap().push(2)));
        dispatcher.call(EventType::Tick);
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn named_typename_replaces_only_that_listener() {
        let mut dispatcher = Dispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c1 = count.clone();
        dispatcher.on("tick.foo", Arc::new(move |_| { c1.fetch_add(1, Ordering::SeqCst); }));
        let c2 = count.clone();
        dispatcher.on("tick.foo", Arc::new(move |_| { c2.fetch_add(10, Ordering::SeqCst); }));
        dispatcher.call(EventType::Tick);
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn end_and_tick_are_independent() {
        let mut dispatcher = Dispatcher::new();
        let tick_fired = Arc::new(AtomicUsize::new(0));
        let t = tick_fired.clone();
        dispatcher.on("tick", Arc::new(move |_| { t.fetch_add(1, Ordering::SeqCst); }));
        dispatcher.call(EventType::End);
        assert_eq!(tick_fired.load(Ordering::SeqCst), 0);
    }
}
