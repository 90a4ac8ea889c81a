//! CONTROL.DAT creation-date parsing.
//!
//! Field 5 of CONTROL.DAT is the packet creation date/time, observed in the
//! wild in four date spellings (two delimiters, two year widths) always
//! followed by a comma and a 24-hour time. Tolerating all four — rather than
//! picking one as "correct" — is the entire reason this parser exists as
//! its own module instead of a `chrono::NaiveDateTime::parse_from_str` call.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{char, one_of},
    combinator::{map_res, opt},
    sequence::tuple,
    IResult,
};

use crate::validation::{ParseMode, ValidationContext};

/// A date/time that failed range validation (month, day, hour, ...) or
/// didn't match any recognised spelling at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DateError;

fn digits(input: &str, n_min: usize, n_max: usize) -> IResult<&str, u32> {
    map_res(take_while_m_n(n_min, n_max, |c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<u32>()
    })(input)
}

/// `date-delim = "-" / "/"`, and the same delimiter must be reused for both
/// separators within one date.
fn date_delim(input: &str) -> IResult<&str, char> {
    one_of("-/")(input)
}

struct RawDate {
    month: u32,
    day: u32,
    year: u32,
}

/// `MM<delim>DD<delim>YY` or `MM<delim>DD<delim>YYYY`, delimiter consistent.
fn raw_date(input: &str) -> IResult<&str, RawDate> {
    let (input, month) = digits(input, 1, 2)?;
    let (input, delim) = date_delim(input)?;
    let (input, day) = digits(input, 1, 2)?;
    let (input, _) = char(delim)(input)?;
    let (input, year) = alt((
        |i| digits(i, 4, 4),
        |i| digits(i, 2, 2),
    ))(input)?;
    Ok((input, RawDate { month, day, year }))
}

struct RawTime {
    hour: u32,
    minute: u32,
    second: u32,
}

/// `HH:MM` or `HH:MM:SS`.
fn raw_time(input: &str) -> IResult<&str, RawTime> {
    let (input, hour) = digits(input, 1, 2)?;
    let (input, _) = char(':')(input)?;
    let (input, minute) = digits(input, 1, 2)?;
    let (input, second) = opt(tuple((char(':'), |i| digits(i, 1, 2))))(input)?;
    let second = second.map(|(_, s)| s).unwrap_or(0);
    Ok((input, RawTime { hour, minute, second }))
}

fn raw_date_time(input: &str) -> IResult<&str, (RawDate, RawTime)> {
    let (input, date) = raw_date(input)?;
    let (input, _) = char(',')(input)?;
    let (input, time) = raw_time(input)?;
    Ok((input, (date, time)))
}

/// Two-digit year normalisation: 0–49 → 2000–2049, 50–99 → 1950–1999.
fn normalise_year(year: u32) -> u32 {
    if year >= 100 {
        year
    } else if year <= 49 {
        2000 + year
    } else {
        1950 + year
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| {
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        next_month
            .map(|n| (n - d).num_days() as u32)
            .unwrap_or(31)
    })
}

/// Parse a CONTROL.DAT creation date/time such as `01-01-91,23:59:59`.
///
/// On a format/range violation: in [`ParseMode::Strict`] returns
/// [`DateError`] (the caller surfaces this as a `FormatError` and substitutes
/// the Unix epoch); in Lenient/Salvage, records a warning in `ctx` and
/// returns the Unix epoch directly so the caller never has to duplicate the
/// substitution logic.
pub fn parse_creation_date(
    field: &str,
    mode: ParseMode,
    ctx: &mut ValidationContext,
) -> Result<NaiveDateTime, DateError> {
    match try_parse(field, ctx) {
        Ok(dt) => Ok(dt),
        Err(()) => {
            if mode == ParseMode::Strict {
                Err(DateError)
            } else {
                ctx.warning(format!("unparseable or out-of-range creation date {field:?}, substituting Unix epoch"));
                Ok(epoch())
            }
        }
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn try_parse(field: &str, ctx: &mut ValidationContext) -> Result<NaiveDateTime, ()> {
    let field = field.trim();
    let (remainder, (date, time)) = raw_date_time(field).map_err(|_| ())?;
    if !remainder.trim().is_empty() {
        return Err(());
    }

    if date.month < 1 || date.month > 12 {
        return Err(());
    }
    let year = normalise_year(date.year) as i32;
    if !(1980..=2099).contains(&year) {
        return Err(());
    }
    let max_day = days_in_month(year, date.month).ok_or(())?;
    if date.day < 1 || date.day > max_day {
        return Err(());
    }
    if time.hour > 23 || time.minute > 59 {
        return Err(());
    }
    // Out-of-range seconds clamp to 59, with a warning recorded regardless
    // of mode — the clamp itself is not a Strict/Lenient branch, it's a
    // tolerated quirk of the field per the creation-date grammar.
    let second = if time.second > 59 {
        ctx.warning(format!(
            "creation date {field:?} has out-of-range seconds {}, clamping to 59",
            time.second
        ));
        59
    } else {
        time.second
    };

    let naive_date = NaiveDate::from_ymd_opt(year, date.month, date.day).ok_or(())?;
    let naive_time = NaiveTime::from_hms_opt(time.hour, time.minute, second).ok_or(())?;
    Ok(NaiveDateTime::new(naive_date, naive_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Datelike;

    fn parse_ok(field: &str) -> NaiveDateTime {
        let mut ctx = ValidationContext::new(ParseMode::Strict);
        parse_creation_date(field, ParseMode::Strict, &mut ctx).unwrap()
    }

    #[test]
    fn s1_all_four_variants_parse() {
        assert_eq!(parse_ok("01-01-91,23:59:59").year(), 1991);
        assert_eq!(parse_ok("01/01/1991,23:59:59").year(), 1991);
        assert_eq!(parse_ok("12-31-25,00:00:00").year(), 2025);
        assert_eq!(parse_ok("12/31/2025,00:00:00").year(), 2025);
    }

    #[test]
    fn s1_strict_rejects_bad_month() {
        let mut ctx = ValidationContext::new(ParseMode::Strict);
        assert_eq!(
            parse_creation_date("13-01-91,00:00:00", ParseMode::Strict, &mut ctx),
            Err(DateError)
        );
    }

    #[test]
    fn s1_lenient_substitutes_epoch_and_warns() {
        let mut ctx = ValidationContext::new(ParseMode::Lenient);
        let dt = parse_creation_date("13-01-91,00:00:00", ParseMode::Lenient, &mut ctx).unwrap();
        assert_eq!(dt, epoch());
        assert_eq!(ctx.into_report().warnings.len(), 1);
    }

    #[test]
    fn mismatched_delimiters_are_rejected() {
        let mut ctx = ValidationContext::new(ParseMode::Strict);
        assert!(parse_creation_date("01-01/91,00:00:00", ParseMode::Strict, &mut ctx).is_err());
    }

    #[test]
    fn seconds_out_of_range_clamp_to_59_with_warning() {
        let mut ctx = ValidationContext::new(ParseMode::Strict);
        let dt = parse_creation_date("01-01-91,12:00:99", ParseMode::Strict, &mut ctx).unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(12, 0, 59).unwrap());
        assert_eq!(ctx.into_report().warnings.len(), 1);
    }
}
