//! Data sensitivity classification
//!
//! Maps field names to sensitivity tiers that drive encryption and
//! log-masking policy. Classification is a pure function over a fixed
//! table: no I/O, no failure modes. Unknown fields classify as the least
//! sensitive tier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensitivity tier of a field
///
/// Every field name used anywhere in the system maps to exactly one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityTier {
    /// Monetary quantities: encrypted at rest, fully masked in logs
    Financial,
    /// Identity data: partially masked in logs
    Personal,
    /// Everything else: no masking at the field level
    Behavioral,
}

impl fmt::Display for SensitivityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityTier::Financial => write!(f, "financial"),
            SensitivityTier::Personal => write!(f, "personal"),
            SensitivityTier::Behavioral => write!(f, "behavioral"),
        }
    }
}

/// Monetary field names, in normalized form (lowercase, separators removed).
///
/// The generic "amount" is included outright: an unqualified amount field
/// cannot be proven non-financial, so it is treated as financial.
const FINANCIAL_FIELDS: &[&str] = &[
    "amount",
    "balance",
    "contribution",
    "contributions",
    "currentbalance",
    "debt",
    "debttotal",
    "expense",
    "expenses",
    "income",
    "monthlyexpenses",
    "monthlyincome",
    "monthlypayment",
    "networth",
    "payment",
    "payments",
    "principal",
    "savings",
    "savingsbalance",
];

/// Identity field names, in normalized form.
const PERSONAL_FIELDS: &[&str] = &[
    "displayname",
    "email",
    "emailaddress",
    "fullname",
    "uid",
    "userid",
    "username",
];

/// Context keywords that mark a generic "amount" as financial.
const FINANCIAL_KEYWORDS: &[&str] = &[
    "income",
    "expense",
    "debt",
    "investment",
    "payment",
    "savings",
];

/// Normalize a field name for table lookup.
///
/// Lowercases and strips `_` and `-` so that `monthlyIncome`,
/// `monthly_income` and `MONTHLY-INCOME` all classify identically.
fn normalize(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Classify a field name into its sensitivity tier.
///
/// Unknown fields default to [`SensitivityTier::Behavioral`]. Nested
/// scalars inside behavioral fields are still subject to the masker's
/// numeric and string rules, so the default does not leak raw numbers
/// into logs.
pub fn classify(field: &str) -> SensitivityTier {
    let normalized = normalize(field);
    if FINANCIAL_FIELDS.contains(&normalized.as_str()) {
        SensitivityTier::Financial
    } else if PERSONAL_FIELDS.contains(&normalized.as_str()) {
        SensitivityTier::Personal
    } else {
        SensitivityTier::Behavioral
    }
}

/// Whether a field must be stored encrypted.
///
/// Holds exactly when the field classifies as financial.
pub fn requires_encryption(field: &str) -> bool {
    classify(field) == SensitivityTier::Financial
}

/// Heuristic: does this field hold a financial amount in this context?
///
/// A generic `amount` field is treated as financial when the surrounding
/// context string contains one of a fixed set of financial keywords. The
/// keyword list is inherently incomplete; `amount` itself is already in
/// the financial table, so the heuristic can only widen coverage for
/// callers that pass context for other field names.
pub fn is_financial_amount(field: &str, context: &str) -> bool {
    if requires_encryption(field) {
        return true;
    }
    let context = context.to_ascii_lowercase();
    normalize(field) == "amount" || FINANCIAL_KEYWORDS.iter().any(|kw| context.contains(kw))
}
