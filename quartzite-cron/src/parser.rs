//! Cron expression parser.
//!
//! Turns the upper-cased text of an expression into one [`ValueSet`] per field plus the
//! special day rules (`L`, `W`, `#`). Parsing is all-or-nothing: the first problem found
//! is returned and nothing partially built escapes.

use crate::error::{ParseError, ParseErrorKind};
use crate::field::{Field, ValueSet};
use quartzite_log::trace;

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Special day-of-month / day-of-week rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DayRules {
    /// `L` in day-of-month
    pub last_day_of_month: bool,
    /// `n` in `L-n`
    pub last_day_offset: u32,
    /// `W` in day-of-month
    pub nearest_weekday: bool,
    /// `nL` in day-of-week
    pub last_day_of_week: bool,
    /// `m` in `n#m`, zero when unset
    pub nth_day_of_week: u32,
}

/// Output of a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ParsedFields {
    pub sets: [ValueSet; 7],
    pub rules: DayRules,
}

impl ParsedFields {
    pub fn set(&self, field: Field) -> &ValueSet {
        &self.sets[field as usize]
    }
}

/// Parse an already upper-cased expression.
pub(crate) fn parse(expression: &str) -> Result<ParsedFields, ParseError> {
    let tokens = split_fields(expression);

    if tokens.len() < 6 {
        return Err(ParseError::at(
            ParseErrorKind::FieldCount,
            format!(
                "Unexpected end of expression: expected 6 or 7 fields, got {}",
                tokens.len()
            ),
            expression.chars().count(),
        ));
    }
    if tokens.len() > 7 {
        return Err(ParseError::at(
            ParseErrorKind::FieldCount,
            format!("Too many fields: expected 6 or 7, got {}", tokens.len()),
            char_offset(expression, tokens[7].0),
        ));
    }

    let mut builder = Builder::new(expression);
    for (field, (start, token)) in Field::ALL.iter().zip(tokens.iter()) {
        builder.field(*field, *start, token)?;
    }
    if tokens.len() == 6 {
        builder.add_all(Field::Year);
    }

    let parsed = builder.finish(tokens[5].0)?;
    trace!("parsed cron expression '{}'", expression);
    Ok(parsed)
}

/// Whitespace-separated tokens with their byte offsets.
fn split_fields(expression: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::with_capacity(7);
    let mut start = None;
    for (i, c) in expression.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push((s, &expression[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, &expression[s..]));
    }
    tokens
}

fn char_offset(src: &str, byte: usize) -> usize {
    src.get(..byte).map_or(byte, |prefix| prefix.chars().count())
}

struct Builder<'a> {
    src: &'a str,
    sets: [ValueSet; 7],
    rules: DayRules,
}

impl<'a> Builder<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            sets: Field::ALL.map(ValueSet::empty),
            rules: DayRules::default(),
        }
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>, byte: usize) -> ParseError {
        ParseError::at(kind, message, char_offset(self.src, byte))
    }

    fn field(&mut self, field: Field, start: usize, token: &str) -> Result<(), ParseError> {
        let is_list = token.contains(',');
        if is_list {
            self.reject_special_in_list(field, start, token)?;
        }
        if field == Field::DayOfWeek {
            if let Some(first) = token.find('#') {
                if let Some(second) = token[first + 1..].find('#') {
                    return Err(self.error(
                        ParseErrorKind::MultipleNth,
                        "Support for specifying multiple \"nth\" days is not implemented",
                        start + first + 1 + second,
                    ));
                }
            }
        }

        let mut offset = start;
        for item in token.split(',') {
            if item.is_empty() {
                return Err(self.error(ParseErrorKind::IllegalCharacter, "Empty list element", offset));
            }
            self.item(field, offset, item)?;
            offset += item.len() + 1;
        }
        Ok(())
    }

    fn reject_special_in_list(&self, field: Field, start: usize, token: &str) -> Result<(), ParseError> {
        let day_field = matches!(field, Field::DayOfMonth | Field::DayOfWeek);
        if !day_field {
            return Ok(());
        }
        let symbols: &[char] = match field {
            Field::DayOfMonth => &['L', 'W', '?'],
            _ => &['L', '#', '?'],
        };
        if let Some(at) = token.find(symbols) {
            let symbol = &token[at..at + 1];
            return Err(self.error(
                ParseErrorKind::UnsupportedList,
                format!(
                    "Support for specifying '{}' with other {} values is not implemented",
                    symbol,
                    field.name()
                ),
                start + at,
            ));
        }
        Ok(())
    }

    fn item(&mut self, field: Field, start: usize, item: &str) -> Result<(), ParseError> {
        let mut cursor = Cursor {
            text: item,
            pos: 0,
            base: start,
        };

        match cursor.peek() {
            Some(b'?') => {
                cursor.bump();
                if !matches!(field, Field::DayOfMonth | Field::DayOfWeek) {
                    return Err(self.error(
                        ParseErrorKind::MisplacedOption,
                        "'?' can only be specified for Day-of-Month or Day-of-Week",
                        start,
                    ));
                }
                self.expect_end(&cursor, "after '?'")?;
                self.sets[field as usize].mark_unspecified();
                Ok(())
            }
            Some(b'*') => {
                cursor.bump();
                if cursor.at_end() {
                    self.add_all(field);
                    return Ok(());
                }
                if cursor.peek() != Some(b'/') {
                    return Err(self.unexpected(&cursor));
                }
                cursor.bump();
                let step = self.step(field, &mut cursor)?;
                self.expect_end(&cursor, "after the increment")?;
                self.add_range(field, field.min(), field.max(), step, start)
            }
            Some(b'/') => {
                cursor.bump();
                let step = self.step(field, &mut cursor)?;
                self.expect_end(&cursor, "after the increment")?;
                self.add_range(field, field.min(), field.max(), step, start)
            }
            Some(b'L') => self.last(field, &mut cursor),
            Some(c) if c.is_ascii_alphanumeric() => self.value_item(field, &mut cursor),
            _ => Err(self.unexpected(&cursor)),
        }
    }

    /// `L`, `L-n`, `LW`, `L-nW` on day-of-month; lone `L` on day-of-week.
    fn last(&mut self, field: Field, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        let at = cursor.offset();
        cursor.bump();
        match field {
            Field::DayOfMonth => {
                self.rules.last_day_of_month = true;
                if cursor.peek() == Some(b'-') {
                    cursor.bump();
                    let offset_at = cursor.offset();
                    let offset = self.number(cursor)?.ok_or_else(|| {
                        self.error(
                            ParseErrorKind::IllegalCharacter,
                            "'L-' must be followed by the number of days before the last day",
                            offset_at,
                        )
                    })?;
                    if offset > 30 {
                        return Err(self.error(
                            ParseErrorKind::OutOfRange,
                            format!("Offset from last day must be <= 30, got {}", offset),
                            offset_at,
                        ));
                    }
                    self.rules.last_day_offset = offset;
                }
                if cursor.peek() == Some(b'W') {
                    cursor.bump();
                    self.rules.nearest_weekday = true;
                }
                self.expect_end(cursor, "after 'L'")
            }
            Field::DayOfWeek => {
                self.expect_end(cursor, "after 'L'")?;
                self.sets[field as usize].insert(7);
                Ok(())
            }
            _ => Err(self.error(
                ParseErrorKind::MisplacedOption,
                format!("'L' option is not valid for {}", field.name()),
                at,
            )),
        }
    }

    /// Items that start with a number or a name.
    fn value_item(&mut self, field: Field, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        let start = cursor.offset();
        let value = self.value(field, cursor)?;

        match cursor.peek() {
            None => {
                self.check_value(field, value, start)?;
                self.sets[field as usize].insert(value);
                Ok(())
            }
            Some(b'L') => {
                let at = cursor.offset();
                if field != Field::DayOfWeek {
                    return Err(self.error(
                        ParseErrorKind::MisplacedOption,
                        format!("'L' option is not valid here for {}", field.name()),
                        at,
                    ));
                }
                cursor.bump();
                self.expect_end(cursor, "after 'L'")?;
                self.check_value(field, value, start)?;
                self.rules.last_day_of_week = true;
                self.sets[field as usize].insert(value);
                Ok(())
            }
            Some(b'W') => {
                let at = cursor.offset();
                if field != Field::DayOfMonth {
                    return Err(self.error(
                        ParseErrorKind::MisplacedOption,
                        format!("'W' option is not valid here for {}", field.name()),
                        at,
                    ));
                }
                cursor.bump();
                self.expect_end(cursor, "after 'W'")?;
                self.check_value(field, value, start)?;
                self.rules.nearest_weekday = true;
                self.sets[field as usize].insert(value);
                Ok(())
            }
            Some(b'#') => {
                let at = cursor.offset();
                if field != Field::DayOfWeek {
                    return Err(self.error(
                        ParseErrorKind::MisplacedOption,
                        format!("'#' option is not valid here for {}", field.name()),
                        at,
                    ));
                }
                cursor.bump();
                let nth_at = cursor.offset();
                let nth = self.number(cursor)?.filter(|n| (1..=5).contains(n)).ok_or_else(|| {
                    self.error(
                        ParseErrorKind::OutOfRange,
                        "A numeric value between 1 and 5 must follow the '#' option",
                        nth_at,
                    )
                })?;
                self.expect_end(cursor, "after the '#' option")?;
                self.check_value(field, value, start)?;
                self.rules.nth_day_of_week = nth;
                self.sets[field as usize].insert(value);
                Ok(())
            }
            Some(b'-') => {
                cursor.bump();
                let end = self.value(field, cursor)?;
                let step = if cursor.peek() == Some(b'/') {
                    cursor.bump();
                    self.step(field, cursor)?
                } else {
                    1
                };
                self.expect_end(cursor, "after the range")?;
                self.add_range(field, value, end, step, start)
            }
            Some(b'/') => {
                cursor.bump();
                let step = self.step(field, cursor)?;
                self.expect_end(cursor, "after the increment")?;
                self.add_range(field, value, field.max(), step, start)
            }
            Some(_) => Err(self.unexpected(cursor)),
        }
    }

    /// A number, or a month / weekday name where the field allows one.
    fn value(&self, field: Field, cursor: &mut Cursor<'_>) -> Result<u32, ParseError> {
        let at = cursor.offset();
        if let Some(n) = self.number(cursor)? {
            return Ok(n);
        }

        let name = cursor.letters(3);
        if name.is_empty() {
            return Err(self.unexpected(cursor));
        }
        if name.len() < 3 {
            let message = if field == Field::DayOfMonth && name.starts_with('W') {
                "'W' must follow a day of the month, as in '15W' or 'LW'".to_string()
            } else {
                format!("Illegal characters for this position: '{}'", name)
            };
            return Err(self.error(ParseErrorKind::IllegalCharacter, message, at));
        }
        let table: &[&str] = match field {
            Field::Month => &MONTH_NAMES,
            Field::DayOfWeek => &DAY_NAMES,
            _ => {
                return Err(self.error(
                    ParseErrorKind::IllegalCharacter,
                    format!("Illegal characters for this position: '{}'", name),
                    at,
                ));
            }
        };
        table
            .iter()
            .position(|candidate| *candidate == name)
            .map(|i| i as u32 + 1)
            .ok_or_else(|| {
                self.error(
                    ParseErrorKind::IllegalCharacter,
                    format!("Invalid {} value: '{}'", field.name(), name),
                    at,
                )
            })
    }

    fn number(&self, cursor: &mut Cursor<'_>) -> Result<Option<u32>, ParseError> {
        let at = cursor.offset();
        let digits = cursor.digits();
        if digits.is_empty() {
            return Ok(None);
        }
        digits.parse::<u32>().map(Some).map_err(|_| {
            self.error(
                ParseErrorKind::OutOfRange,
                format!("Numeric value '{}' is too large", digits),
                at,
            )
        })
    }

    fn step(&self, field: Field, cursor: &mut Cursor<'_>) -> Result<u32, ParseError> {
        let at = cursor.offset();
        let step = self.number(cursor)?.ok_or_else(|| {
            self.error(ParseErrorKind::InvalidStep, "'/' must be followed by an integer", at)
        })?;
        if step == 0 {
            return Err(self.error(ParseErrorKind::InvalidStep, "Increment must be at least 1", at));
        }
        if step > field.max_step() {
            return Err(self.error(
                ParseErrorKind::InvalidStep,
                format!(
                    "{} increment must be at most {}, got {}",
                    field.name(),
                    field.max_step(),
                    step
                ),
                at,
            ));
        }
        Ok(step)
    }

    fn check_value(&self, field: Field, value: u32, at: usize) -> Result<(), ParseError> {
        if value < field.min() || value > field.max() {
            return Err(self.error(
                ParseErrorKind::OutOfRange,
                format!(
                    "{} values must be between {} and {}, got {}",
                    field.name(),
                    field.min(),
                    field.max(),
                    value
                ),
                at,
            ));
        }
        Ok(())
    }

    fn add_all(&mut self, field: Field) {
        let set = &mut self.sets[field as usize];
        set.mark_all();
        for value in field.min()..=field.max() {
            set.insert(value);
        }
    }

    /// Inclusive `start..=end` every `step`. An end below the start wraps past the field's
    /// maximum.
    fn add_range(&mut self, field: Field, start: u32, end: u32, step: u32, at: usize) -> Result<(), ParseError> {
        self.check_value(field, start, at)?;
        self.check_value(field, end, at)?;

        let (stop, modulus) = if end < start {
            match field.modulus() {
                Some(m) => (end + m, Some(m)),
                None => {
                    return Err(self.error(
                        ParseErrorKind::OutOfRange,
                        format!("Start year must not be after stop year ({}-{})", start, end),
                        at,
                    ));
                }
            }
        } else {
            (end, None)
        };

        let set = &mut self.sets[field as usize];
        let mut value = start;
        while value <= stop {
            let reduced = match modulus {
                Some(m) => match value % m {
                    0 if field.is_one_based() => m,
                    r => r,
                },
                None => value,
            };
            set.insert(reduced);
            value = match value.checked_add(step) {
                Some(v) => v,
                None => break,
            };
        }
        Ok(())
    }

    fn expect_end(&self, cursor: &Cursor<'_>, context: &str) -> Result<(), ParseError> {
        match cursor.peek() {
            None => Ok(()),
            Some(c @ (b'L' | b'W' | b'#')) => Err(self.error(
                ParseErrorKind::UnsupportedList,
                format!("'{}' cannot be combined with a range, step or other option", c as char),
                cursor.offset(),
            )),
            Some(_) => Err(self.error(
                ParseErrorKind::IllegalCharacter,
                format!("Unexpected character {}: '{}'", context, cursor.rest()),
                cursor.offset(),
            )),
        }
    }

    fn unexpected(&self, cursor: &Cursor<'_>) -> ParseError {
        let found = cursor.rest().chars().next().map_or_else(|| "end of field".to_string(), |c| format!("'{}'", c));
        self.error(
            ParseErrorKind::IllegalCharacter,
            format!("Unexpected character: {}", found),
            cursor.offset(),
        )
    }

    fn finish(self, day_of_week_at: usize) -> Result<ParsedFields, ParseError> {
        let dom_unspecified = self.sets[Field::DayOfMonth as usize].is_unspecified();
        let dow_unspecified = self.sets[Field::DayOfWeek as usize].is_unspecified();

        match (dom_unspecified, dow_unspecified) {
            (true, false) | (false, true) => Ok(ParsedFields {
                sets: self.sets,
                rules: self.rules,
            }),
            (true, true) => Err(self.error(
                ParseErrorKind::DayFieldConflict,
                "'?' can only be specified for Day-of-Month -OR- Day-of-Week",
                day_of_week_at,
            )),
            (false, false) => Err(self.error(
                ParseErrorKind::DayFieldConflict,
                "Support for specifying both a day-of-week AND a day-of-month parameter is not implemented; use '?' in one of them",
                day_of_week_at,
            )),
        }
    }
}

/// Byte cursor over one comma-separated item.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    /// Byte offset of `text` within the whole expression
    base: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or("")
    }

    fn digits(&mut self) -> &'a str {
        self.take_while(|b| b.is_ascii_digit(), usize::MAX)
    }

    fn letters(&mut self, max: usize) -> &'a str {
        self.take_while(|b| b.is_ascii_uppercase(), max)
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool, max: usize) -> &'a str {
        let start = self.pos;
        while self.pos - start < max && self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(parsed: &ParsedFields, field: Field) -> Vec<u32> {
        parsed.set(field).iter().collect()
    }

    fn kind_of(expression: &str) -> ParseErrorKind {
        parse(expression).unwrap_err().kind()
    }

    #[test]
    fn test_split_fields_offsets() {
        let tokens = split_fields("  0 15\t10 * * ?");
        assert_eq!(tokens[0], (2, "0"));
        assert_eq!(tokens[1], (4, "15"));
        assert_eq!(tokens[2], (7, "10"));
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_wildcards_and_default_year() {
        let parsed = parse("* * * ? * *").unwrap();
        assert_eq!(parsed.set(Field::Second).len(), 60);
        assert!(parsed.set(Field::Second).is_all());
        assert!(parsed.set(Field::DayOfMonth).is_unspecified());
        assert_eq!(parsed.set(Field::DayOfWeek).len(), 7);
        assert!(parsed.set(Field::Year).is_all());
        assert_eq!(parsed.set(Field::Year).first(), Some(1970));
    }

    #[test]
    fn test_lists_ranges_and_steps() {
        let parsed = parse("0,15,30,45 10-12 */6 ? 1-12/3 MON-FRI").unwrap();
        assert_eq!(values(&parsed, Field::Second), vec![0, 15, 30, 45]);
        assert_eq!(values(&parsed, Field::Minute), vec![10, 11, 12]);
        assert_eq!(values(&parsed, Field::Hour), vec![0, 6, 12, 18]);
        assert_eq!(values(&parsed, Field::Month), vec![1, 4, 7, 10]);
        assert_eq!(values(&parsed, Field::DayOfWeek), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_value_with_step_runs_to_max() {
        let parsed = parse("5/20 0 0 ? * *").unwrap();
        assert_eq!(values(&parsed, Field::Second), vec![5, 25, 45]);

        let parsed = parse("/30 0 0 ? * *").unwrap();
        assert_eq!(values(&parsed, Field::Second), vec![0, 30]);
    }

    #[test]
    fn test_wrapping_ranges() {
        let parsed = parse("0 0 23-2 ? * *").unwrap();
        assert_eq!(values(&parsed, Field::Hour), vec![0, 1, 2, 23]);

        let parsed = parse("0 0 0 ? NOV-FEB FRI-MON").unwrap();
        assert_eq!(values(&parsed, Field::Month), vec![1, 2, 11, 12]);
        assert_eq!(values(&parsed, Field::DayOfWeek), vec![1, 2, 6, 7]);

        let parsed = parse("0 0 0 30-2 * ?").unwrap();
        assert_eq!(values(&parsed, Field::DayOfMonth), vec![1, 2, 30, 31]);

        let parsed = parse("50-10/10 0 0 ? * *").unwrap();
        assert_eq!(values(&parsed, Field::Second), vec![0, 10, 50]);
    }

    #[test]
    fn test_wrapping_year_range_rejected() {
        assert_eq!(kind_of("0 0 0 ? * * 2030-2025"), ParseErrorKind::OutOfRange);
    }

    #[test]
    fn test_last_day_variants() {
        let parsed = parse("0 0 0 L * ?").unwrap();
        assert!(parsed.rules.last_day_of_month);
        assert_eq!(parsed.rules.last_day_offset, 0);
        assert!(!parsed.rules.nearest_weekday);

        let parsed = parse("0 0 0 L-3W * ?").unwrap();
        assert!(parsed.rules.last_day_of_month);
        assert_eq!(parsed.rules.last_day_offset, 3);
        assert!(parsed.rules.nearest_weekday);

        let parsed = parse("0 0 0 LW * ?").unwrap();
        assert!(parsed.rules.nearest_weekday);

        assert_eq!(kind_of("0 0 0 L-31 * ?"), ParseErrorKind::OutOfRange);
    }

    #[test]
    fn test_day_of_week_specials() {
        let parsed = parse("0 0 0 ? * L").unwrap();
        assert_eq!(values(&parsed, Field::DayOfWeek), vec![7]);
        assert!(!parsed.rules.last_day_of_week);

        let parsed = parse("0 0 0 ? * 6L").unwrap();
        assert_eq!(values(&parsed, Field::DayOfWeek), vec![6]);
        assert!(parsed.rules.last_day_of_week);

        let parsed = parse("0 0 0 ? * FRIL").unwrap();
        assert_eq!(values(&parsed, Field::DayOfWeek), vec![6]);
        assert!(parsed.rules.last_day_of_week);

        let parsed = parse("0 0 0 ? * 6#3").unwrap();
        assert_eq!(values(&parsed, Field::DayOfWeek), vec![6]);
        assert_eq!(parsed.rules.nth_day_of_week, 3);

        let parsed = parse("0 0 0 ? * MON#1").unwrap();
        assert_eq!(values(&parsed, Field::DayOfWeek), vec![2]);
        assert_eq!(parsed.rules.nth_day_of_week, 1);
    }

    #[test]
    fn test_nearest_weekday_single_day() {
        let parsed = parse("0 0 0 15W * ?").unwrap();
        assert_eq!(values(&parsed, Field::DayOfMonth), vec![15]);
        assert!(parsed.rules.nearest_weekday);
        assert!(!parsed.rules.last_day_of_month);
    }

    #[test]
    fn test_field_count() {
        let err = parse("0 0 12 * *").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::FieldCount);
        assert_eq!(err.offset(), Some(10));

        let err = parse("0 0 12 * * ? 2025 extra").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::FieldCount);
        assert_eq!(err.offset(), Some(18));
    }

    #[test]
    fn test_out_of_range_names_field_and_offset() {
        let err = parse("0 0 24 ? * *").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::OutOfRange);
        assert!(err.message().contains("Hour"), "{}", err);
        assert!(err.message().contains("0 and 23"), "{}", err);
        assert_eq!(err.offset(), Some(4));

        assert_eq!(kind_of("60 * * ? * *"), ParseErrorKind::OutOfRange);
        assert_eq!(kind_of("0 0 0 0 * ?"), ParseErrorKind::OutOfRange);
        assert_eq!(kind_of("0 0 0 ? 13 *"), ParseErrorKind::OutOfRange);
        assert_eq!(kind_of("0 0 0 ? * 8"), ParseErrorKind::OutOfRange);
        assert_eq!(kind_of("0 0 0 ? * 0"), ParseErrorKind::OutOfRange);
        assert_eq!(kind_of("0 0 0 ? * * 1969"), ParseErrorKind::OutOfRange);
        assert_eq!(kind_of("0 0 0 ? * 6#6"), ParseErrorKind::OutOfRange);
        assert_eq!(kind_of("0 0 0 32W * ?"), ParseErrorKind::OutOfRange);
    }

    #[test]
    fn test_steps_are_validated() {
        assert_eq!(kind_of("*/0 * * ? * *"), ParseErrorKind::InvalidStep);
        assert_eq!(kind_of("*/60 * * ? * *"), ParseErrorKind::InvalidStep);
        assert_eq!(kind_of("0 0 */24 ? * *"), ParseErrorKind::InvalidStep);
        assert_eq!(kind_of("0 0 0 ? */13 *"), ParseErrorKind::InvalidStep);
        assert_eq!(kind_of("0 0 0 ? * */8"), ParseErrorKind::InvalidStep);
        assert_eq!(kind_of("*/ * * ? * *"), ParseErrorKind::InvalidStep);
        assert!(parse("0 0 0 ? * * 1970/50").is_ok());
    }

    #[test]
    fn test_misplaced_options() {
        assert_eq!(kind_of("? 0 0 ? * *"), ParseErrorKind::MisplacedOption);
        assert_eq!(kind_of("0 L 0 ? * *"), ParseErrorKind::MisplacedOption);
        assert_eq!(kind_of("0 0 0 ? * 5W"), ParseErrorKind::MisplacedOption);
        assert_eq!(kind_of("0 0 0 5L * ?"), ParseErrorKind::MisplacedOption);
        assert_eq!(kind_of("0 0 0 5#2 * ?"), ParseErrorKind::MisplacedOption);
    }

    #[test]
    fn test_specials_in_lists_rejected() {
        assert_eq!(kind_of("0 0 0 L,15 * ?"), ParseErrorKind::UnsupportedList);
        assert_eq!(kind_of("0 0 0 1W,15 * ?"), ParseErrorKind::UnsupportedList);
        assert_eq!(kind_of("0 0 0 ? * 6L,2"), ParseErrorKind::UnsupportedList);
        assert_eq!(kind_of("0 0 0 ? * 6#2,2"), ParseErrorKind::UnsupportedList);
        assert_eq!(kind_of("0 0 0 1-5W * ?"), ParseErrorKind::UnsupportedList);
    }

    #[test]
    fn test_multiple_nth_rejected() {
        let err = parse("0 0 0 ? * 6#2#3").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::MultipleNth);
        assert_eq!(err.offset(), Some(13));
    }

    #[test]
    fn test_day_field_conflicts() {
        let err = parse("0 0 0 1 1 1").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::DayFieldConflict);
        assert_eq!(kind_of("0 0 0 * * *"), ParseErrorKind::DayFieldConflict);
        assert_eq!(kind_of("0 0 0 ? * ?"), ParseErrorKind::DayFieldConflict);
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(kind_of("0 0 0 ? FOO *"), ParseErrorKind::IllegalCharacter);
        assert_eq!(kind_of("0 MON 0 ? * *"), ParseErrorKind::IllegalCharacter);
        assert_eq!(kind_of("0 0 0 ? * 1-"), ParseErrorKind::IllegalCharacter);
        assert_eq!(kind_of("0 0 0 ?X * *"), ParseErrorKind::IllegalCharacter);
        assert_eq!(kind_of("0,,1 0 0 ? * *"), ParseErrorKind::IllegalCharacter);
        assert_eq!(kind_of("0 0 0 ? * é"), ParseErrorKind::IllegalCharacter);
    }

    #[test]
    fn test_short_names_point_at_the_token() {
        let err = parse("0 0 0 W * ?").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::IllegalCharacter);
        assert_eq!(err.offset(), Some(6));
        assert!(err.message().contains("'W' must follow a day"), "{}", err);

        // What "ß" upper-cases to
        let err = parse("SS 0 0 ? * *").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::IllegalCharacter);
        assert_eq!(err.offset(), Some(0));
        assert!(err.message().contains("'SS'"), "{}", err);
    }
}
