//! Cron expression parsing and evaluation.

use crate::error::ParseError;
use crate::field::{Field, ValueSet};
use crate::parser::{self, DayRules, ParsedFields};
use crate::search::{DEFAULT_SEARCH_YEAR_LIMIT, Search};
use crate::zone::Zone;
use chrono::{DateTime, Utc};
use quartzite_log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Parsed cron expression.
///
/// Immutable once built apart from the time zone, which may be changed before or between
/// queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    expression: String,
    fields: ParsedFields,
    time_zone: Zone,
    year_limit: i32,
}

impl CronExpression {
    /// Parse a cron expression.
    ///
    /// Six or seven whitespace-separated fields:
    /// - Second (0-59)
    /// - Minute (0-59)
    /// - Hour (0-23)
    /// - Day of month (1-31, `L`, `L-n`, `LW`, `nW`, `?`)
    /// - Month (1-12 or JAN-DEC)
    /// - Day of week (1-7 or SUN-SAT, Sunday = 1, `L`, `nL`, `n#m`, `?`)
    /// - Year (optional, 1970 onwards)
    ///
    /// Exactly one of the two day fields must be `?`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quartzite_cron::CronExpression;
    ///
    /// // Every day at noon
    /// let expr = CronExpression::parse("0 0 12 * * ?").unwrap();
    ///
    /// // Third Friday of every month at midnight
    /// let expr = CronExpression::parse("0 0 0 ? * 6#3").unwrap();
    ///
    /// // Last weekday of every month at 6 PM
    /// let expr = CronExpression::parse("0 0 18 LW * ?").unwrap();
    /// ```
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        let canonical = expression.to_uppercase();
        let fields = parser::parse(&canonical).inspect_err(|err| {
            debug!("rejected cron expression '{}': {}", expression, err);
        })?;

        Ok(Self {
            expression: canonical,
            fields,
            time_zone: Zone::default(),
            year_limit: DEFAULT_SEARCH_YEAR_LIMIT,
        })
    }

    /// Whether `expression` parses.
    pub fn is_valid_expression(expression: &str) -> bool {
        Self::validate_expression(expression).is_ok()
    }

    /// Parse `expression` only to report why it is rejected.
    pub fn validate_expression(expression: &str) -> Result<(), ParseError> {
        parser::parse(&expression.to_uppercase()).map(|_| ())
    }

    fn search(&self) -> Search<'_> {
        Search::new(&self.fields, self.time_zone, self.year_limit)
    }

    /// Earliest fire time strictly after `after`.
    pub fn next_fire_time(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.search().next_after(after)
    }

    /// Latest fire time strictly before `before`.
    ///
    /// The result is always a time [`next_fire_time`](Self::next_fire_time) would reach with
    /// nothing in between. A wall-clock time repeated by a DST fall-back is reached only once
    /// when walking forward, so a previous fire time taken from just after the repeated hour
    /// may be the first reading even though the second reading also satisfies the expression.
    pub fn previous_fire_time(&self, before: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.search().previous_before(before)
    }

    /// Earliest whole second after `after` at which the expression does not fire.
    ///
    /// `None` only when that second is not representable.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use quartzite_cron::{CronExpression, Zone};
    ///
    /// let expr = CronExpression::parse("0-10 * * ? * *").unwrap().with_time_zone(Zone::Utc);
    /// let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// assert_eq!(expr.next_invalid_time_after(after), Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 11).unwrap()));
    /// ```
    pub fn next_invalid_time_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.search().next_invalid_after(after)
    }

    /// Whether the expression fires at `instant`, ignoring fractions of a second.
    pub fn is_satisfied_by(&self, instant: DateTime<Utc>) -> bool {
        self.search().is_satisfied_by(instant)
    }

    /// Successive fire times after `after`.
    pub fn upcoming(&self, after: DateTime<Utc>) -> Upcoming<'_> {
        Upcoming {
            expression: self,
            cursor: Some(after),
        }
    }

    pub fn time_zone(&self) -> Zone {
        self.time_zone
    }

    pub fn set_time_zone(&mut self, zone: impl Into<Zone>) {
        self.time_zone = zone.into();
    }

    pub fn with_time_zone(mut self, zone: impl Into<Zone>) -> Self {
        self.set_time_zone(zone);
        self
    }

    /// Last year the forward search may reach before giving up.
    pub fn search_year_limit(&self) -> i32 {
        self.year_limit
    }

    pub fn with_search_year_limit(mut self, year: i32) -> Self {
        self.year_limit = year;
        self
    }

    /// The upper-cased expression text.
    pub fn to_canonical_string(&self) -> String {
        self.expression.clone()
    }

    /// Get the expression string.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Allowed values of one field.
    pub fn field(&self, field: Field) -> &ValueSet {
        self.fields.set(field)
    }

    pub fn seconds(&self) -> &ValueSet {
        self.field(Field::Second)
    }

    pub fn minutes(&self) -> &ValueSet {
        self.field(Field::Minute)
    }

    pub fn hours(&self) -> &ValueSet {
        self.field(Field::Hour)
    }

    pub fn days_of_month(&self) -> &ValueSet {
        self.field(Field::DayOfMonth)
    }

    pub fn months(&self) -> &ValueSet {
        self.field(Field::Month)
    }

    pub fn days_of_week(&self) -> &ValueSet {
        self.field(Field::DayOfWeek)
    }

    pub fn years(&self) -> &ValueSet {
        self.field(Field::Year)
    }

    pub fn day_rules(&self) -> DayRules {
        self.fields.rules
    }

    /// Multi-line dump of every field set and day flag.
    pub fn expression_summary(&self) -> String {
        let rules = self.fields.rules;
        let lines = [
            format!("seconds: {}", self.seconds()),
            format!("minutes: {}", self.minutes()),
            format!("hours: {}", self.hours()),
            format!("daysOfMonth: {}", self.days_of_month()),
            format!("months: {}", self.months()),
            format!("daysOfWeek: {}", self.days_of_week()),
            format!("lastdayOfWeek: {}", rules.last_day_of_week),
            format!("nearestWeekday: {}", rules.nearest_weekday),
            format!("NthDayOfWeek: {}", rules.nth_day_of_week),
            format!("lastdayOfMonth: {}", rules.last_day_of_month),
            format!("years: {}", self.years()),
        ];
        let mut summary = lines.join("\n");
        summary.push('\n');
        summary
    }
}

impl FromStr for CronExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl Serialize for CronExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.expression)
    }
}

impl<'de> Deserialize<'de> for CronExpression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Iterator returned by [`CronExpression::upcoming`].
#[derive(Debug, Clone)]
pub struct Upcoming<'a> {
    expression: &'a CronExpression,
    cursor: Option<DateTime<Utc>>,
}

impl Iterator for Upcoming<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.expression.next_fire_time(self.cursor?);
        self.cursor = next;
        next
    }
}

/// Common cron expression presets.
pub struct CronPresets;

impl CronPresets {
    /// Every second
    pub const EVERY_SECOND: &'static str = "* * * * * ?";

    /// Every minute
    pub const EVERY_MINUTE: &'static str = "0 * * * * ?";

    /// Every 5 minutes
    pub const EVERY_5_MINUTES: &'static str = "0 */5 * * * ?";

    /// Every 15 minutes
    pub const EVERY_15_MINUTES: &'static str = "0 */15 * * * ?";

    /// Every 30 minutes
    pub const EVERY_30_MINUTES: &'static str = "0 */30 * * * ?";

    /// Every hour
    pub const EVERY_HOUR: &'static str = "0 0 * * * ?";

    /// Every day at midnight
    pub const DAILY: &'static str = "0 0 0 * * ?";

    /// Every week on Sunday at midnight
    pub const WEEKLY: &'static str = "0 0 0 ? * SUN";

    /// Every month on the 1st at midnight
    pub const MONTHLY: &'static str = "0 0 0 1 * ?";

    /// Every year on January 1st at midnight
    pub const YEARLY: &'static str = "0 0 0 1 1 ?";

    /// Every weekday (Monday-Friday) at 9 AM
    pub const WEEKDAYS_9AM: &'static str = "0 0 9 ? * MON-FRI";

    /// Every weekend (Saturday-Sunday) at 10 AM
    pub const WEEKENDS_10AM: &'static str = "0 0 10 ? * SAT,SUN";

    /// Last day of every month at midnight
    pub const LAST_DAY_OF_MONTH: &'static str = "0 0 0 L * ?";

    /// Last weekday of every month at midnight
    pub const LAST_WEEKDAY_OF_MONTH: &'static str = "0 0 0 LW * ?";
}
