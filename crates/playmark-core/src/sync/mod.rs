//! Remote sync throttling.
//!
//! The remote tier sits behind an account-wide write quota. A single shared
//! timestamp gates every rate-limited remote write so the store never exceeds
//! that quota, regardless of how many keys are being saved.

mod clock;
mod limiter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{window_for_quota, SyncLimiter};
