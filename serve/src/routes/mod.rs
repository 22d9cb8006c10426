//! One handler module per route family (§6), mirroring the teacher's `serve::run` /
//! `serve::tools` per-concern split.

pub mod chat;
pub mod index;
pub mod search;
pub mod stream;
