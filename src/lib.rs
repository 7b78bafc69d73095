// Quartzite - Quartz-compatible cron expressions for Rust
//
// This library parses seven-field cron expressions and answers next, previous and
// "does it fire now" questions in any time zone.

// Re-export the engine
pub use quartzite_cron::*;

// Re-export the logging crate
pub use quartzite_log as log;

// Re-export time zone database
pub use chrono_tz;

// Prelude for common imports
pub mod prelude {
    pub use quartzite_cron::prelude::*;

    pub use chrono::{DateTime, TimeZone, Utc};
}
