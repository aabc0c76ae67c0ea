//! Runner registration and removal tokens

use serde::{Deserialize, Serialize};

/// A short-lived organization runner token
///
/// Returned to callers exactly as the platform issued it, so `expires_at`
/// stays in the platform's own timestamp format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerToken {
    pub token: String,
    pub expires_at: String,
}
