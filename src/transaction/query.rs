//! Turns the raw query string of a transactions request into a typed query.

use time::{
    Date, Month, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::pagination::{Pagination, PaginationConfig};

/// The query string parameters accepted by the transactions endpoint, exactly
/// as the client sent them.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct TransactionsQueryParams {
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// An inclusive range where either end may be open.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl TransactionsQueryParams {
    /// Collect the known parameters from decoded query string pairs.
    ///
    /// When a key is repeated the first value is used. Unknown keys are
    /// ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "search" => &mut params.search,
                "startDate" => &mut params.start_date,
                "endDate" => &mut params.end_date,
                "minAmount" => &mut params.min_amount,
                "maxAmount" => &mut params.max_amount,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value);
            }
        }

        params
    }
}

impl<T> Bounds<T> {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

/// One end of a date range.
///
/// Strings that are not recognised as a date are kept as-is and handed to the
/// store, which decides what they match.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DateBound {
    Parsed(OffsetDateTime),
    Unparsed(String),
}

/// A transactions request after defaults have been applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransactionQuery {
    /// Text to match against the text index.
    pub search: Option<String>,
    /// Inclusive bounds on the transaction date.
    pub date_range: Bounds<DateBound>,
    /// Inclusive bounds on the credit amount. May hold NaN.
    pub amount_range: Bounds<f64>,
    pub pagination: Pagination,
}

impl TransactionQuery {
    /// Parse the raw parameters.
    ///
    /// Empty strings are treated the same as missing parameters. Nothing here
    /// rejects a request: bad pagination values fall back to the defaults in
    /// `config`, and bad amounts become NaN.
    pub fn parse(params: TransactionsQueryParams, config: &PaginationConfig) -> Self {
        let pagination = Pagination::from_raw(params.page.as_deref(), params.limit.as_deref(), config);

        Self {
            search: non_empty(params.search),
            date_range: Bounds {
                min: non_empty(params.start_date).map(|raw| parse_date(&raw)),
                max: non_empty(params.end_date).map(|raw| parse_date(&raw)),
            },
            amount_range: Bounds {
                min: non_empty(params.min_amount).map(|raw| parse_leading_float(&raw)),
                max: non_empty(params.max_amount).map(|raw| parse_leading_float(&raw)),
            },
            pagination,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Parse a date or date-time, assuming UTC when no offset is given.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS[.fff]]`, `YYYY-MM-DD`, and the
/// short forms `YYYY-MM` and `YYYY`, which mean the start of that month or
/// year.
pub(crate) fn parse_date(raw: &str) -> DateBound {
    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return DateBound::Parsed(date_time);
    }

    let local_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    for format in local_formats {
        if let Ok(date_time) = PrimitiveDateTime::parse(raw, format) {
            return DateBound::Parsed(date_time.assume_utc());
        }
    }

    let date = Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| parse_year_month(raw));

    match date {
        Some(date) => DateBound::Parsed(date.midnight().assume_utc()),
        None => DateBound::Unparsed(raw.to_owned()),
    }
}

/// Parse `YYYY-MM` or `YYYY` as the first day of that month or year.
///
/// `time` cannot build a [Date] from a format without a day, so these are
/// split by hand.
fn parse_year_month(raw: &str) -> Option<Date> {
    let (year, month) = match raw.split_once('-') {
        Some((year, month)) => (year, Some(month)),
        None => (raw, None),
    };

    let year = parse_fixed_digits(year, 4)?;
    let month = match month {
        Some(month) => Month::try_from(parse_fixed_digits(month, 2)? as u8).ok()?,
        None => Month::January,
    };

    Date::from_calendar_date(year, month, 1).ok()
}

fn parse_fixed_digits(text: &str, digits: usize) -> Option<i32> {
    if text.len() != digits || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    text.parse().ok()
}

/// Parse the longest prefix of `raw` that reads as a decimal number, ignoring
/// leading whitespace and any trailing garbage.
///
/// Returns NaN if there is no such prefix, e.g. `"100abc"` is 100 and `"abc"`
/// is NaN.
pub(crate) fn parse_leading_float(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if text[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let integer_start = end;
    end = skip_digits(bytes, end);
    let mut mantissa_digits = end - integer_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = skip_digits(bytes, end + 1);
        let fraction_digits = fraction_end - (end + 1);
        if mantissa_digits + fraction_digits > 0 {
            end = fraction_end;
            mantissa_digits += fraction_digits;
        }
    }

    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_start = end + 1;
        if matches!(bytes.get(exponent_start), Some(b'+' | b'-')) {
            exponent_start += 1;
        }
        let exponent_end = skip_digits(bytes, exponent_start);
        // An exponent marker without digits is not part of the number.
        if exponent_end > exponent_start {
            end = exponent_end;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

fn skip_digits(bytes: &[u8], start: usize) -> usize {
    start
        + bytes
            .get(start..)
            .unwrap_or_default()
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
}
