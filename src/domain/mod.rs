//! Device-independent core: data model, decode state machines, settings.
//!
//! Everything in this module is synchronous, single-owner state that can be
//! exercised without a radio. The BLE transport in
//! [`crate::infrastructure::bluetooth`] feeds it raw notification payloads
//! and forwards the frames it produces.

pub mod filter;
pub mod models;
pub mod pipeline;
pub mod rle;
pub mod sequencer;
pub mod settings;
