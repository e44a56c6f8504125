//! Audit logging for the data protection core
//!
//! Every privileged or consent-affecting operation is recorded in an
//! append-only log. Entries are immutable: the log exposes append and
//! read, nothing else.
//!
//! - [`AuditEntry`]: one record of who did what to whose data.
//! - [`AuditLog`]: the append-only JSONL writer with read and filter
//!   helpers, plus typed wrappers (`log_data_access`,
//!   `log_consent_change`, ...) that keep details payloads consistent
//!   across call sites.

mod entry;
mod logger;

pub use entry::{
    sanitize_details, ActorType, AuditAction, AuditDraft, AuditEntry, MAX_DETAILS_LEN,
};
pub use logger::AuditLog;
