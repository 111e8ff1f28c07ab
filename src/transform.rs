//! Value transforms for presentation-annotated fact literals.
//!
//! Japanese filings report dates in wareki (imperial era) or CJK notation
//! and numbers with digit-group commas plus a decimal `scale`. These
//! helpers rewrite such literals into ISO dates and plain decimal numbers.
//! Callers treat every transform as best-effort: on error the original
//! literal is kept.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::TransformError;

/// Era start years. Gregorian year = base + era year - 1.
const ERAS: [(&str, i32); 5] = [
    ("明治", 1868),
    ("大正", 1912),
    ("昭和", 1926),
    ("平成", 1989),
    ("令和", 2019),
];

static WAREKI_REGEX: OnceLock<Regex> = OnceLock::new();
static CJK_DATE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches 年月日 and 年月 wareki literals; the day group is optional.
fn wareki_regex() -> &'static Regex {
    WAREKI_REGEX.get_or_init(|| {
        Regex::new(r"(明治|大正|昭和|平成|令和)(元|[0-9０-９]+)年([0-9０-９]+)月(?:([0-9０-９]+)日)?")
            .expect("failed to compile wareki date regex")
    })
}

fn cjk_date_regex() -> &'static Regex {
    CJK_DATE_REGEX.get_or_init(|| {
        Regex::new(r"([0-9０-９]+)年([0-9０-９]+)月(?:([0-9０-９]+)日)?")
            .expect("failed to compile CJK date regex")
    })
}

/// Replace fullwidth digits (０-９) with their ASCII equivalents.
pub fn to_halfwidth_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            _ => c,
        })
        .collect()
}

fn parse_component(s: &str) -> Result<u32, TransformError> {
    to_halfwidth_digits(s)
        .parse()
        .map_err(|_| TransformError::DateLiteral {
            literal: s.to_string(),
        })
}

fn format_date(year: i32, month: u32, day: Option<u32>) -> Result<String, TransformError> {
    match day {
        Some(day) => {
            // Day precision can be checked against the calendar.
            NaiveDate::from_ymd_opt(year, month, day).ok_or(TransformError::InvalidDate {
                year,
                month,
                day,
            })?;
            Ok(format!("{year:04}-{month:02}-{day:02}"))
        }
        None => {
            if !(1..=12).contains(&month) {
                return Err(TransformError::InvalidDate {
                    year,
                    month,
                    day: 1,
                });
            }
            Ok(format!("{year:04}-{month:02}"))
        }
    }
}

/// Convert a wareki date literal to `YYYY-MM-DD`, or `YYYY-MM` when the
/// literal has no day component. The literal 元 is era year 1.
pub fn wareki_to_iso(literal: &str) -> Result<String, TransformError> {
    let captures = wareki_regex()
        .captures(literal)
        .ok_or_else(|| TransformError::DateLiteral {
            literal: literal.to_string(),
        })?;

    let era = captures.get(1).map_or("", |m| m.as_str());
    let year_text = captures.get(2).map_or("", |m| m.as_str());
    let era_year = if year_text == "元" {
        1
    } else {
        parse_component(year_text)?
    };

    let base = ERAS
        .iter()
        .find(|(name, _)| *name == era)
        .map(|(_, base)| *base)
        .ok_or_else(|| TransformError::DateLiteral {
            literal: literal.to_string(),
        })?;
    let year = base + era_year as i32 - 1;

    let month = parse_component(captures.get(3).map_or("", |m| m.as_str()))?;
    let day = match captures.get(4) {
        Some(m) => Some(parse_component(m.as_str())?),
        None => None,
    };

    format_date(year, month, day)
}

/// Convert a Gregorian CJK date literal (2021年4月1日) to `YYYY-MM-DD`, or
/// `YYYY-MM` when the literal has no day component.
pub fn cjk_date_to_iso(literal: &str) -> Result<String, TransformError> {
    let captures = cjk_date_regex()
        .captures(literal)
        .ok_or_else(|| TransformError::DateLiteral {
            literal: literal.to_string(),
        })?;

    let year = parse_component(captures.get(1).map_or("", |m| m.as_str()))? as i32;
    let month = parse_component(captures.get(2).map_or("", |m| m.as_str()))?;
    let day = match captures.get(3) {
        Some(m) => Some(parse_component(m.as_str())?),
        None => None,
    };

    format_date(year, month, day)
}

/// Multiply a decimal literal by `10^shift`, emitting the fewest digits that
/// round-trip. Digit-group commas are tolerated. `shift == 0` returns the
/// literal unchanged.
pub fn shift_decimal(literal: &str, shift: i32) -> Result<String, TransformError> {
    if shift == 0 {
        return Ok(literal.to_string());
    }

    let plain = literal.replace(',', "");
    let value: f64 = plain
        .trim()
        .parse()
        .map_err(|_| TransformError::NumericLiteral {
            literal: literal.to_string(),
        })?;

    let shifted = value * 10f64.powi(shift);
    Ok(format!("{shifted}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halfwidth_normalization() {
        assert_eq!(to_halfwidth_digits("令和３年"), "令和3年");
        assert_eq!(to_halfwidth_digits("０１２３４５６７８９"), "0123456789");
        assert_eq!(to_halfwidth_digits("2021"), "2021");
    }

    #[test]
    fn test_wareki_full_date() {
        assert_eq!(wareki_to_iso("令和３年４月１日").unwrap(), "2021-04-01");
        assert_eq!(wareki_to_iso("平成31年4月30日").unwrap(), "2019-04-30");
        assert_eq!(wareki_to_iso("昭和64年1月7日").unwrap(), "1989-01-07");
        assert_eq!(wareki_to_iso("明治1年1月1日").unwrap(), "1868-01-01");
    }

    #[test]
    fn test_wareki_first_year_literal() {
        assert_eq!(wareki_to_iso("令和元年5月1日").unwrap(), "2019-05-01");
        assert_eq!(wareki_to_iso("平成元年1月8日").unwrap(), "1989-01-08");
    }

    #[test]
    fn test_wareki_year_month_only() {
        assert_eq!(wareki_to_iso("令和３年４月").unwrap(), "2021-04");
        assert_eq!(wareki_to_iso("大正１５年１２月").unwrap(), "1926-12");
    }

    #[test]
    fn test_wareki_invalid() {
        assert!(wareki_to_iso("2021-04-01").is_err());
        assert!(wareki_to_iso("慶応3年1月1日").is_err());
        assert!(matches!(
            wareki_to_iso("令和3年13月1日"),
            Err(TransformError::InvalidDate { .. })
        ));
        assert!(matches!(
            wareki_to_iso("令和3年2月30日"),
            Err(TransformError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_wareki_every_era_round_trips() {
        for (era, base) in ERAS {
            for era_year in 1..=5 {
                let literal = format!("{era}{era_year}年3月15日");
                let expected = format!("{:04}-03-15", base + era_year - 1);
                assert_eq!(wareki_to_iso(&literal).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_cjk_date() {
        assert_eq!(cjk_date_to_iso("2021年4月1日").unwrap(), "2021-04-01");
        assert_eq!(cjk_date_to_iso("２０２１年４月").unwrap(), "2021-04");
        assert!(cjk_date_to_iso("April 2021").is_err());
        assert!(cjk_date_to_iso("2021年4月31日").is_err());
    }

    #[test]
    fn test_shift_decimal() {
        assert_eq!(shift_decimal("1234", 6).unwrap(), "1234000000");
        assert_eq!(shift_decimal("1,234", 6).unwrap(), "1234000000");
        assert_eq!(shift_decimal("1.5", 2).unwrap(), "150");
        assert_eq!(shift_decimal("120", -2).unwrap(), "1.2");
    }

    #[test]
    fn test_shift_decimal_zero_is_identity() {
        assert_eq!(shift_decimal("1234", 0).unwrap(), "1234");
        assert_eq!(shift_decimal("not a number", 0).unwrap(), "not a number");
    }

    #[test]
    fn test_shift_decimal_unparseable() {
        assert!(matches!(
            shift_decimal("n/a", 3),
            Err(TransformError::NumericLiteral { .. })
        ));
    }
}
