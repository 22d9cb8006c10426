//! Event Stream Hub (§4.8): a keyed collection of push channels, one per conversation id,
//! with at-most-one subscriber.
//!
//! Grounded in `stream-event`'s wire-shape discipline (`ProtocolEvent`, `Envelope`) and
//! `loom::stream::StreamWriter`, collapsed to spec.md's simpler tagged union and
//! collapsed registry — `dashmap::DashMap` replaces a `Mutex<HashMap<..>>` since the
//! teacher's own `loom` crate already depends on `dashmap` for exactly this kind of
//! concurrent per-key state.

pub mod event;
pub mod hub;

pub use event::ChatEvent;
pub use hub::EventStreamHub;
