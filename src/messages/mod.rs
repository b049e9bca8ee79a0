//! Message data model: the delivery record and its opaque payload.
//!
//! ## Contents
//! - [`Message`] the record describing one occurrence to deliver
//! - [`Payload`] cheaply clonable, type-erased payload container
//!
//! Messages are the sole wire contract between producers and the bus; they are
//! never serialized or transmitted — this is a strictly in-process system.

mod message;
mod payload;

pub use message::Message;
pub use payload::Payload;
