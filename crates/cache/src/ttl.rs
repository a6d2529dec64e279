//! Cache TTL constants.
//!
//! TTLs stay in the minutes range: entries are a read accelerator, and a
//! bounded lifetime caps how stale any missed invalidation can be.

use std::time::Duration;

/// 5 minutes. Default for triage records, history lists, and
/// notification reads.
pub const SHORT: Duration = Duration::from_secs(5 * 60);
