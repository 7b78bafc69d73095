//! Cron fields and their frozen value sets.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use std::fmt;

/// Earliest year an expression can name.
pub const MIN_YEAR: u32 = 1970;

/// Latest year an expression can name: the current year plus one hundred.
pub static MAX_YEAR: Lazy<u32> = Lazy::new(|| {
    let max = Utc::now().year().max(MIN_YEAR as i32) as u32 + 100;
    max.min(MIN_YEAR + ValueSet::CAPACITY - 1)
});

/// One of the seven positions of a cron expression, in expression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Second,
        Field::Minute,
        Field::Hour,
        Field::DayOfMonth,
        Field::Month,
        Field::DayOfWeek,
        Field::Year,
    ];

    pub fn min(self) -> u32 {
        match self {
            Field::Second | Field::Minute | Field::Hour => 0,
            Field::DayOfMonth | Field::Month | Field::DayOfWeek => 1,
            Field::Year => MIN_YEAR,
        }
    }

    pub fn max(self) -> u32 {
        match self {
            Field::Second | Field::Minute => 59,
            Field::Hour => 23,
            Field::DayOfMonth => 31,
            Field::Month => 12,
            Field::DayOfWeek => 7,
            Field::Year => *MAX_YEAR,
        }
    }

    /// Cycle length used to wrap ranges such as `22-2`. Years do not wrap.
    pub fn modulus(self) -> Option<u32> {
        match self {
            Field::Second | Field::Minute => Some(60),
            Field::Hour => Some(24),
            Field::DayOfMonth => Some(31),
            Field::Month => Some(12),
            Field::DayOfWeek => Some(7),
            Field::Year => None,
        }
    }

    /// Largest accepted `/n` increment.
    pub fn max_step(self) -> u32 {
        match self {
            Field::Year => u32::MAX,
            other => other.max(),
        }
    }

    /// Whether the field counts from one, so a wrapped `0` means the maximum.
    pub fn is_one_based(self) -> bool {
        matches!(self, Field::DayOfMonth | Field::Month | Field::DayOfWeek)
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Second => "Second",
            Field::Minute => "Minute",
            Field::Hour => "Hour",
            Field::DayOfMonth => "Day-of-Month",
            Field::Month => "Month",
            Field::DayOfWeek => "Day-of-Week",
            Field::Year => "Year",
        }
    }

    fn base(self) -> u32 {
        match self {
            Field::Year => MIN_YEAR,
            _ => 0,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered set of allowed values for one field.
///
/// A fixed 256-bit bitset offset by the field's base, plus the `*` and `?` markers. The
/// markers do not occupy a bit: `*` sets every bit of the domain as well.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueSet {
    words: [u64; 4],
    base: u32,
    all: bool,
    unspecified: bool,
}

impl ValueSet {
    pub const CAPACITY: u32 = 256;

    pub(crate) fn empty(field: Field) -> Self {
        Self {
            words: [0; 4],
            base: field.base(),
            all: false,
            unspecified: false,
        }
    }

    pub(crate) fn insert(&mut self, value: u32) {
        if let Some(index) = self.index(value) {
            self.words[index / 64] |= 1 << (index % 64);
        }
    }

    pub(crate) fn mark_all(&mut self) {
        self.all = true;
    }

    pub(crate) fn mark_unspecified(&mut self) {
        self.unspecified = true;
    }

    fn index(&self, value: u32) -> Option<usize> {
        value
            .checked_sub(self.base)
            .filter(|i| *i < Self::CAPACITY)
            .map(|i| i as usize)
    }

    pub fn contains(&self, value: u32) -> bool {
        self.index(value)
            .is_some_and(|i| self.words[i / 64] & (1 << (i % 64)) != 0)
    }

    /// `*` was given.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// `?` was given.
    pub fn is_unspecified(&self) -> bool {
        self.unspecified
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn first(&self) -> Option<u32> {
        self.at_or_after(self.base)
    }

    pub fn last(&self) -> Option<u32> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| self.base + (i as u32) * 64 + 63 - w.leading_zeros())
    }

    /// Smallest member `>= value`.
    pub fn at_or_after(&self, value: u32) -> Option<u32> {
        let start = value.saturating_sub(self.base);
        if start >= Self::CAPACITY {
            return None;
        }
        let mut word = (start / 64) as usize;
        let mut bits = self.words[word] & (u64::MAX << (start % 64));
        loop {
            if bits != 0 {
                return Some(self.base + (word as u32) * 64 + bits.trailing_zeros());
            }
            word += 1;
            if word == self.words.len() {
                return None;
            }
            bits = self.words[word];
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let mut next = self.first();
        std::iter::from_fn(move || {
            let current = next?;
            next = current.checked_add(1).and_then(|v| self.at_or_after(v));
            Some(current)
        })
    }

    /// Smallest distance between neighbouring members, counting the gap from the last
    /// member around to the first when the field cycles.
    pub(crate) fn min_gap(&self, modulus: Option<u32>) -> Option<u32> {
        let mut values = self.iter();
        let first = values.next()?;
        let mut previous = first;
        let mut gap = None::<u32>;
        for value in values {
            let diff = value - previous;
            gap = Some(gap.map_or(diff, |g| g.min(diff)));
            previous = value;
        }
        if let (Some(m), true) = (modulus, previous != first) {
            let wrap = first + m - previous;
            gap = Some(gap.map_or(wrap, |g| g.min(wrap)));
        }
        gap
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Summary form: `*`, `?`, or the comma-joined members.
impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unspecified {
            return f.write_str("?");
        }
        if self.all {
            return f.write_str("*");
        }
        let mut first = true;
        for value in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}", value)?;
            first = false;
        }
        Ok(())
    }
}
