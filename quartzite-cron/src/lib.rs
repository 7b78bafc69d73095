//! Quartz-style cron expressions for Rust.
//!
//! Provides a parser and fire time calculator with support for:
//! - Seconds and optional year fields
//! - `L`, `W` and `#` day rules
//! - Wrapping ranges such as `22-2`
//! - Next and previous fire times in any time zone
//!
//! ## Quick Start
//!
//! ```
//! use quartzite_cron::{CronExpression, Zone};
//! use chrono::{TimeZone, Utc};
//!
//! // Every day at noon
//! let expr = CronExpression::parse("0 0 12 * * ?")
//!     .unwrap()
//!     .with_time_zone(Zone::Utc);
//!
//! let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let next = expr.next_fire_time(after).unwrap();
//! assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
//!
//! assert!(expr.is_satisfied_by(next));
//! assert_eq!(expr.previous_fire_time(next), Some(next - chrono::Duration::days(1)));
//! ```
//!
//! ## Cron Expression Presets
//!
//! ```
//! use quartzite_cron::expression::{CronExpression, CronPresets};
//!
//! let every_minute = CronExpression::parse(CronPresets::EVERY_MINUTE).unwrap();
//! let month_end = CronExpression::parse(CronPresets::LAST_WEEKDAY_OF_MONTH).unwrap();
//!
//! let now = chrono::Utc::now();
//! assert!(every_minute.next_fire_time(now).unwrap() > now);
//! assert!(month_end.next_fire_time(now).unwrap() > now);
//! ```
//!
//! ## Configuration
//!
//! ```
//! use quartzite_cron::{CronConfig, Zone};
//!
//! let config = CronConfig::from_toml_str(r#"time_zone = "Europe/Berlin""#).unwrap();
//! let expr = config.parse_expression("0 30 8 ? * MON-FRI").unwrap();
//! assert_eq!(expr.time_zone(), Zone::Named(chrono_tz::Europe::Berlin));
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod expression;
pub mod field;
mod parser;
mod search;
pub mod zone;

pub use config::CronConfig;
pub use error::{CronError, CronResult, ParseError, ParseErrorKind};
pub use expression::{CronExpression, CronPresets, Upcoming};
pub use field::{Field, MAX_YEAR, MIN_YEAR, ValueSet};
pub use parser::DayRules;
pub use search::DEFAULT_SEARCH_YEAR_LIMIT;
pub use zone::Zone;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::CronConfig;
    pub use crate::error::{CronError, CronResult, ParseError, ParseErrorKind};
    pub use crate::expression::{CronExpression, CronPresets};
    pub use crate::zone::Zone;
}
