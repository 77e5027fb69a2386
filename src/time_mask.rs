//! `m:ss` masking for time inputs.
//!
//! Only digits are significant: the last two are seconds, everything before
//! them is minutes. Seconds above 59 are kept as typed (`":90"` is 90 seconds)
//! so that typing digit by digit never loses input.

use crate::error::WorkoutError;

/// Longest time a mask field accepts (`mm:ss`)
pub const MAX_MASK_DIGITS: usize = 4;

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn split(digits: &str) -> (&str, &str) {
    digits.split_at(digits.len().saturating_sub(2))
}

/// Normalizes free-form input into `m:ss`. Input without digits is `:00`.
pub fn to_time_mask(input: &str) -> String {
    let digits = digits(input);
    let (minutes, seconds) = split(&digits);
    let minutes = minutes.strip_prefix('0').unwrap_or(minutes);
    format!("{minutes}:{seconds:0>2}")
}

/// Converts masked (or raw digit) input to seconds. Empty input is zero.
pub fn seconds_from_mask(input: &str) -> Result<u32, WorkoutError> {
    let digits = digits(input);
    let (minutes, seconds) = split(&digits);
    let invalid = || WorkoutError::InvalidTime(input.to_string());

    let parse = |part: &str| -> Result<u32, WorkoutError> {
        if part.is_empty() {
            Ok(0)
        } else {
            part.parse::<u32>().map_err(|_| invalid())
        }
    };

    parse(minutes)?
        .checked_mul(60)
        .and_then(|m| m.checked_add(parse(seconds).ok()?))
        .ok_or_else(invalid)
}

/// Strict variant for command line arguments: only digits and `:` are
/// accepted, and no more digits than a mask field holds
pub fn parse_time_arg(input: &str) -> Result<u32, WorkoutError> {
    let trimmed = input.trim();
    if trimmed.is_empty()
        || !trimmed.chars().all(|c| c.is_ascii_digit() || c == ':')
        || digits(trimmed).len() > MAX_MASK_DIGITS
    {
        return Err(WorkoutError::InvalidTime(input.to_string()));
    }
    seconds_from_mask(trimmed)
}

/// Renders seconds back into the mask format used by the input fields
pub fn mask_from_seconds(secs: u32) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes == 0 {
        to_time_mask(&seconds.to_string())
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
