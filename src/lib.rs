//! fxtrader — forex chart analysis over a key-routed, multi-provider AI gateway.
//!
//! ARCHITECTURE
//! ============
//! `routes` decode HTTP, `services` own the analysis and config logic, and
//! `llm` turns one provider-neutral request into exactly one vendor call.
//! The binary in `main.rs` wires these together from environment config.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod routes;
pub mod services;
pub mod state;
