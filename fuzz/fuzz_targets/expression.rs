//! Fuzz target for cron expression parsing.
//!
//! Feeds arbitrary text to the parser. Accepted expressions must keep their
//! canonical form stable across a second parse.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quartzite_cron::CronExpression;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 512 {
        return;
    }

    match CronExpression::parse(text) {
        Ok(expr) => {
            let canonical = expr.to_canonical_string();
            assert_eq!(canonical, text.to_uppercase());
            let again = CronExpression::parse(&canonical).expect("canonical form must parse");
            assert_eq!(again, expr);
            let _ = expr.expression_summary();
        }
        Err(err) => {
            if let Some(offset) = err.offset() {
                assert!(offset <= text.to_uppercase().chars().count());
            }
        }
    }
});
