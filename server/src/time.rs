use std::time::Duration;

use lazy_static::lazy_static;

lazy_static! {
    /// Interval between cleanup sweeps.
    pub static ref ONE_HOUR: Duration = Duration::from_secs(60 * 60);
}
