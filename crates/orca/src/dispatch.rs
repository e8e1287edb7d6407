//! Minimal event dispatch with `type[.name]` typenames.
//!
//! Typenames are whitespace-separated; the optional name qualifies a
//! registration so it can be replaced or removed without touching other
//! listeners of the same type (`"tick.render"` vs `"tick.log"`).

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Listener<T> {
    kind: String,
    name: String,
    callback: Callback<T>,
}

/// Dispatches values of type `T` to named listeners of registered event
/// types.
pub struct Dispatch<T> {
    types: Vec<String>,
    listeners: Vec<Listener<T>>,
}

impl<T> Default for Dispatch<T> {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

impl<T> Dispatch<T> {
    pub fn new(types: &[&str]) -> Self {
        Self {
            types: types.iter().map(|t| t.to_string()).collect(),
            listeners: Vec::new(),
        }
    }

    /// Registers a listener under every parsed `type.name`, replacing any
    /// previous listener with the same typename. The same callback instance
    /// is shared when several typenames are given.
    pub fn on(&mut self, typenames: &str, callback: impl FnMut(&T) + 'static) -> Result<()> {
        let parsed = self.parse(typenames)?;
        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        for (kind, name) in parsed {
            // A bare ".name" registers nothing; it only has removal
            // semantics.
            if kind.is_empty() {
                continue;
            }
            self.listeners
                .retain(|l| !(l.kind == kind && l.name == name));
            self.listeners.push(Listener {
                kind,
                name,
                callback: Rc::clone(&callback),
            });
        }
        Ok(())
    }

    /// Removes listeners by typename. A bare `.name` removes that name from
    /// every type; a bare `type` removes that type's unnamed listener.
    pub fn remove(&mut self, typenames: &str) -> Result<()> {
        for (kind, name) in self.parse(typenames)? {
            if kind.is_empty() {
                self.listeners.retain(|l| l.name != name);
            } else {
                self.listeners
                    .retain(|l| !(l.kind == kind && l.name == name));
            }
        }
        Ok(())
    }

    /// Invokes every listener registered for `kind`, in registration order.
    pub fn call(&mut self, kind: &str, value: &T) {
        // Callbacks may not re-enter the dispatcher (it is moved out by the
        // caller during dispatch), so a plain iteration suffices.
        for listener in &self.listeners {
            if listener.kind == kind {
                (listener.callback.borrow_mut())(value);
            }
        }
    }

    fn parse(&self, typenames: &str) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for token in typenames.split_whitespace() {
            let (kind, name) = match token.split_once('.') {
                Some((kind, name)) => (kind.to_string(), name.to_string()),
                None => (token.to_string(), String::new()),
            };
            if !kind.is_empty() && !self.types.iter().any(|t| *t == kind) {
                return Err(Error::UnknownEventType {
                    typename: token.to_string(),
                });
            }
            out.push((kind, name));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::Dispatch;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn dispatch_calls_listeners_of_the_requested_type_in_order() {
        let mut d: Dispatch<i32> = Dispatch::new(&["tick", "end"]);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        d.on("tick", move |v| s.set(s.get() + *v)).unwrap();
        d.call("tick", &2);
        d.call("end", &100);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn dispatch_replaces_a_listener_with_the_same_typename() {
        let mut d: Dispatch<i32> = Dispatch::new(&["tick"]);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        d.on("tick.a", move |_| s.set(s.get() + 1)).unwrap();
        let s = Rc::clone(&seen);
        d.on("tick.a", move |_| s.set(s.get() + 10)).unwrap();
        d.call("tick", &0);
        assert_eq!(seen.get(), 10);
    }

    #[test]
    fn dispatch_removes_a_name_across_all_types() {
        let mut d: Dispatch<i32> = Dispatch::new(&["tick", "end"]);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        d.on("tick.a end.a", move |_| s.set(s.get() + 1)).unwrap();
        d.remove(".a").unwrap();
        d.call("tick", &0);
        d.call("end", &0);
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn dispatch_rejects_unknown_types() {
        let mut d: Dispatch<i32> = Dispatch::new(&["tick"]);
        assert!(d.on("frob", |_| {}).is_err());
        assert!(d.remove("frob.a").is_err());
    }
}
