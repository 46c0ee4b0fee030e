//! Human-entered duration strings such as `"1h30m"`, `"2d"` or `"45s"`.
//!
//! A duration is one or more `<integer><unit>` tokens whose values are
//! summed. Separators and other text between or after tokens are ignored,
//! so `"1h, 30m"` and `"2 days and 3 hours"` both parse. Units are
//! case-insensitive and accept their common long
//! forms (`m`, `min`, `minute`, `minutes`, ...). A string made of digits
//! only is read as a number of **minutes**.
//!
//! Bounds are not enforced here; the creation path decides what range of
//! durations a giveaway may have.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::GiveawayError;

static TOKEN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*([a-z]+)"));

/// Seconds contributed by one unit, or `None` for an unknown unit.
fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3_600),
        "d" | "day" | "days" => Some(86_400),
        "w" | "week" | "weeks" => Some(604_800),
        _ => None,
    }
}

/// Parses a duration string into a number of seconds.
///
/// # Errors
///
/// Returns [`GiveawayError::Validation`] when the string is empty, has no
/// token and is not a bare number, contains a token with an unknown unit,
/// or overflows `u64` seconds.
pub fn parse_duration(input: &str) -> Result<u64, GiveawayError> {
    let lowered = input.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Err(GiveawayError::Validation(
            "duration must not be empty".to_string(),
        ));
    }

    let token = TOKEN
        .as_ref()
        .map_err(|e| GiveawayError::Internal(format!("duration grammar: {e}")))?;

    let mut total: u64 = 0;
    let mut matched = false;

    for caps in token.captures_iter(&lowered) {
        let (Some(amount), Some(unit)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        let factor = unit_seconds(unit.as_str()).ok_or_else(|| {
            GiveawayError::Validation(format!("unknown time unit: {}", unit.as_str()))
        })?;
        let amount: u64 = amount
            .as_str()
            .parse()
            .map_err(|_| too_long(input))?;
        total = amount
            .checked_mul(factor)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| too_long(input))?;

        matched = true;
    }

    if !matched {
        // Bare number: minutes.
        let minutes: u64 = lowered.parse().map_err(|_| invalid_format(input))?;
        return minutes.checked_mul(60).ok_or_else(|| too_long(input));
    }

    Ok(total)
}

fn invalid_format(input: &str) -> GiveawayError {
    GiveawayError::Validation(format!("invalid duration format: {input:?}"))
}

fn too_long(input: &str) -> GiveawayError {
    GiveawayError::Validation(format!("duration is too long: {input:?}"))
}
