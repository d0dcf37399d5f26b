//! Core library for the PIX fraud-report triage service.
//!
//! Reports of fraudulent instant-payment transfers are ingested through the
//! [`reports`] module, persisted behind storage traits, and scored by the
//! [`scoring`] engine, which delegates to a configured language-model backend
//! when a credential is available and otherwise degrades to deterministic
//! rule evaluation.

pub mod config;
pub mod error;
pub mod reports;
pub mod scoring;
pub mod telemetry;
