//! Service-level specifications for report intake and triage.

mod common;
