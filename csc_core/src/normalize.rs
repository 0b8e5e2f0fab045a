//! Token normalizers turning raw schedule text fragments into typed values.
//!
//! None of these recover from malformed input: a [`FormatError`] propagates
//! to the caller and aborts the extraction with the offending text.

use chrono::{NaiveDate, NaiveTime};

use crate::{error::FormatError, location::LocationTable, model::DayCode};

static TIME_FORMAT: &str = "%I:%M%p";
static DATE_FORMAT: &str = "%d/%m/%Y";
static RANGE_SEPARATOR: &str = " - ";

/// Room placeholder when the source gives no room number.
pub static NO_ROOM: &str = "N/A";

/// Parse a concatenated day-code prefix followed by a 12-hour time range.
///
/// Example input: `"MoWe 6:30PM - 8:10PM"`.
pub fn parse_days_and_time(
    text: &str,
) -> Result<(Vec<DayCode>, NaiveTime, NaiveTime), FormatError> {
    let (day_text, time_text) = text
        .split_once(' ')
        .ok_or_else(|| FormatError::DayTime(text.to_string()))?;
    let chars: Vec<char> = day_text.chars().collect();
    let mut days = Vec::with_capacity(chars.len() / 2);
    for chunk in chars.chunks(2) {
        days.push(DayCode::parse(&chunk.iter().collect::<String>())?);
    }
    let sides: Vec<&str> = time_text.split(RANGE_SEPARATOR).collect();
    let &[start_text, end_text] = sides.as_slice() else {
        return Err(FormatError::DayTime(text.to_string()));
    };
    let start_time = parse_time(start_text)?;
    let end_time = parse_time(end_text)?;
    if start_time >= end_time {
        return Err(FormatError::TimeOrder {
            start: start_text.to_string(),
            end: end_text.to_string(),
        });
    }
    Ok((days, start_time, end_time))
}

fn parse_time(text: &str) -> Result<NaiveTime, FormatError> {
    NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
        .map_err(|_| FormatError::Time(text.to_string()))
}

/// Parse a `"DD/MM/YYYY - DD/MM/YYYY"` range into start and end dates.
pub fn parse_date_range(text: &str) -> Result<(NaiveDate, NaiveDate), FormatError> {
    let sides: Vec<&str> = text.split(RANGE_SEPARATOR).collect();
    let &[start_text, end_text] = sides.as_slice() else {
        return Err(FormatError::DateRange(text.to_string()));
    };
    let parse = |side: &str| {
        NaiveDate::parse_from_str(side.trim(), DATE_FORMAT)
            .map_err(|_| FormatError::DateRange(text.to_string()))
    };
    Ok((parse(start_text)?, parse(end_text)?))
}

/// Split a location string into building and room.
///
/// `"H 521 SGW"` resolves the `H` code through the table and yields the full
/// address with room `"H521"`. A single token such as `"TBA"` becomes the
/// building as-is with room [`NO_ROOM`]. Unknown codes pass through
/// unmodified.
pub fn parse_room(text: &str, locations: &LocationTable) -> (String, String) {
    let mut tokens = text.split_whitespace();
    let (Some(building), Some(room)) = (tokens.next(), tokens.next()) else {
        return (text.to_string(), NO_ROOM.to_string());
    };
    match locations.resolve(&building.to_uppercase()) {
        Some(address) => (
            address.to_string(),
            format!("{}{room}", building.to_uppercase()),
        ),
        None => (building.to_string(), room.to_string()),
    }
}
