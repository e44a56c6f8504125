//! Service layer for finguard
//!
//! Services tie the protection core together: every operation asks the
//! access policy first, transforms records through the object codec, and
//! pairs the result with an audit entry.

pub mod consent;
pub mod data;

pub use consent::ConsentService;
pub use data::DataService;

use serde_json::json;
use uuid::Uuid;

use crate::error::GuardResult;
use crate::masking::safe_error;

/// Handle the outcome of a paired audit write.
///
/// Best-effort by default: the audit failure is logged through the
/// masker and the primary operation proceeds. Under strict mode the
/// failure propagates and fails the operation it was recording.
pub(crate) fn report_audit(result: GuardResult<Uuid>, strict: bool) -> GuardResult<()> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if strict => Err(err),
        Err(err) => {
            safe_error("audit write failed", &[&json!(err.to_string())]);
            Ok(())
        }
    }
}
