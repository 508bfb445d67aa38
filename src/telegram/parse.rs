use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ParseError;

/// Grammar of /ekle arguments: `<gun.ay[.yil]> [saat:dakika] <not...>`.
/// The year defaults to the current year, the time to 09:00. A time token is
/// recognized by the `:` in the second token; extra `:`-segments (seconds)
/// are ignored.
pub fn parse_add_args(args: &str, now: NaiveDateTime) -> Result<(NaiveDateTime, String), ParseError> {
    let mut tokens = args.split_whitespace();
    let date_token = tokens.next().ok_or(ParseError::MissingArguments)?;
    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        return Err(ParseError::MissingArguments);
    }

    let date = parse_date_token(date_token, now.year())?;

    let (time, note) = if rest[0].contains(':') {
        (parse_time_token(rest[0])?, rest[1..].join(" "))
    } else {
        let default = NaiveTime::from_hms_opt(9, 0, 0).expect("Will never fail.");
        (default, rest.join(" "))
    };

    Ok((date.and_time(time), note))
}

fn parse_date_token(token: &str, current_year: i32) -> Result<NaiveDate, ParseError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 2 || segments.len() > 3 {
        return Err(ParseError::InvalidDate(token.to_string()));
    }

    let mut numbers = segments.iter().map(|s| s.parse::<i32>());
    let day = next_number(&mut numbers, token)?;
    let month = next_number(&mut numbers, token)?;
    let year = match numbers.next() {
        Some(parsed) => parsed.map_err(|_| ParseError::InvalidDate(token.to_string()))?,
        None => current_year,
    };

    let (day, month) = (
        u32::try_from(day).map_err(|_| ParseError::InvalidDate(token.to_string()))?,
        u32::try_from(month).map_err(|_| ParseError::InvalidDate(token.to_string()))?,
    );

    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseError::NoSuchDate { day, month, year })
}

fn next_number(
    numbers: &mut impl Iterator<Item = Result<i32, std::num::ParseIntError>>,
    token: &str,
) -> Result<i32, ParseError> {
    numbers
        .next()
        .ok_or_else(|| ParseError::InvalidDate(token.to_string()))?
        .map_err(|_| ParseError::InvalidDate(token.to_string()))
}

fn parse_time_token(token: &str) -> Result<NaiveTime, ParseError> {
    let segments: Vec<&str> = token.split(':').collect();
    if segments.len() < 2 {
        return Err(ParseError::InvalidTime(token.to_string()));
    }

    let invalid = || ParseError::InvalidTime(token.to_string());
    let hour = segments[0].parse::<u32>().map_err(|_| invalid())?;
    let minute = segments[1].parse::<u32>().map_err(|_| invalid())?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}
