//! # Opaque message payload.
//!
//! [`Payload`] carries application data through the bus without the bus ever
//! inspecting it. Internally it is an `Arc<dyn Any>`, so cloning is cheap and
//! the same payload can be shared between the delivery loop, spawned async
//! handlers, and the dead-letter buffer.
//!
//! Handlers recover the concrete type with [`Payload::downcast_ref`]:
//!
//! ```rust
//! use topicbus::Payload;
//!
//! let p = Payload::new(42_i64);
//! assert_eq!(p.downcast_ref::<i64>(), Some(&42));
//! assert!(p.downcast_ref::<String>().is_none());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque, cheaply clonable payload handed to handlers.
///
/// The bus never serializes or inspects payload contents; it only moves them
/// between producer and handlers within the process.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Payload {
    /// Wraps a value into a payload.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrows the payload as a concrete type, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// True if the payload holds a value of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Name of the wrapped type, for logs and debugging.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Payload").field(&self.type_name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_roundtrip() {
        let p = Payload::new(vec!["jan", "feb"]);
        assert!(p.is::<Vec<&str>>());
        assert_eq!(p.downcast_ref::<Vec<&str>>().unwrap().len(), 2);
        assert!(p.downcast_ref::<i64>().is_none());
    }

    #[test]
    fn test_clone_shares_value() {
        let p = Payload::new(7_u32);
        let q = p.clone();
        assert_eq!(q.downcast_ref::<u32>(), Some(&7));
        assert_eq!(p.type_name(), q.type_name());
    }

    #[test]
    fn test_debug_shows_type() {
        let p = Payload::new(1_i64);
        assert!(format!("{p:?}").contains("i64"));
    }
}
