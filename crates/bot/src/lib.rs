//! Chat backend integration for tabel.
//!
//! This crate connects the attendance resolver to concrete chat platforms:
//! - **Adapters** (`adapters`) - translate native webhook payloads into the
//!   core's normalized `InboundEvent` and render replies back out
//! - **Keyboards** (`keyboard`) - quick-reply button builders shared by the
//!   adapters
//! - **Dispatch** (`dispatch`) - outbound delivery over HTTP, plus a
//!   recording dispatcher for tests
//!
//! Adapters are deliberately thin: they pluck fields and nothing else. All
//! attendance decisions live in `tabel-core`.

pub mod adapters;
pub mod dispatch;
pub mod keyboard;
