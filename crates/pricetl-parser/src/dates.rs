//! Resolution of Czech validity phrases into calendar date boundaries.
//!
//! Handles relative keywords (`dnes`, `zítra`, ...), numeric `d. m.[ yyyy]`
//! tokens, and `d. <month name>[ yyyy]` tokens. The reference date is always
//! an explicit argument so results never depend on when the code runs.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, TimeDelta};
use regex::Regex;

use pricetl_core::ValidityPeriod;

/// Relative keywords and their day offsets, checked in this order.
const RELATIVE_DAYS: &[(&str, i64)] = &[
    ("dnes", 0),
    ("zítra", 1),
    ("pozítří", 2),
    ("včera", -1),
    ("předevčírem", -2),
];

const UNTIL_MARKERS: &[&str] = &["do", "končí", "skončí", "konec"];
const FROM_MARKERS: &[&str] = &["od", "začíná", "začne"];

/// Nominative and genitive month names.
const MONTH_NAMES: &[(&str, u32)] = &[
    ("ledna", 1),
    ("leden", 1),
    ("února", 2),
    ("únor", 2),
    ("března", 3),
    ("březen", 3),
    ("dubna", 4),
    ("duben", 4),
    ("května", 5),
    ("květen", 5),
    ("června", 6),
    ("červen", 6),
    ("července", 7),
    ("červenec", 7),
    ("srpna", 8),
    ("srpen", 8),
    ("září", 9),
    ("října", 10),
    ("říjen", 10),
    ("listopadu", 11),
    ("listopad", 11),
    ("prosince", 12),
    ("prosinec", 12),
];

static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\.\s*(\d{1,2})\.(?:\s*(\d{4}))?").expect("valid numeric date regex")
});

static TEXTUAL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Longest names first so "července" is not cut short at "červen".
    let mut names: Vec<&str> = MONTH_NAMES.iter().map(|(name, _)| *name).collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
    Regex::new(&format!(
        r"\b(\d{{1,2}})\.\s*({})(?:\s+(\d{{4}}))?",
        names.join("|")
    ))
    .expect("valid textual date regex")
});

/// Phrase shapes that carry validity inside a longer offer text, most
/// specific first.
static VALIDITY_PHRASE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"od\s+\d{1,2}\.\s*\d{1,2}\.(?:\s*\d{4})?\s+do\s+\d{1,2}\.\s*\d{1,2}\.(?:\s*\d{4})?",
        r"platí[^.]*?\d{1,2}\.\s*\d{1,2}\.(?:\s*\d{4})?",
        r"(?:dnes|zítra|pozítří)\s+(?:končí|platí)",
        r"\b(?:po|út|st|čt|pá|so|ne)\s+\d{1,2}\.\s*\d{1,2}\.(?:\s*[–-]\s*(?:po|út|st|čt|pá|so|ne)\s+\d{1,2}\.\s*\d{1,2}\.)?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid validity phrase regex"))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Start,
    End,
}

/// Resolves free-form validity text into `(start_date, end_date)`.
///
/// - A relative keyword wins over any absolute date in the same text.
/// - One date becomes the end date unless only a "from" marker is present.
/// - Two or more dates span first to last; middle dates are ignored.
/// - Tokens that are not real calendar dates are skipped.
///
/// A missing year is taken from `reference`, moved to the next year when the
/// reference falls in November or December and the token's month is earlier
/// than the reference month.
#[must_use]
pub fn resolve(text: &str, reference: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return (None, None);
    }

    let words = words(&lower);

    if let Some(date) = relative_date(&words, reference) {
        return place(date, single_date_role(&words));
    }

    match absolute_dates(&lower, reference).as_slice() {
        [] => (None, None),
        [only] => place(*only, single_date_role(&words)),
        [first, .., last] => (Some(*first), Some(*last)),
    }
}

/// Resolves `text` and keeps the trimmed phrase alongside the dates.
#[must_use]
pub fn resolve_validity(text: &str, reference: NaiveDate) -> ValidityPeriod {
    let (start_date, end_date) = resolve(text, reference);
    let trimmed = text.trim();
    ValidityPeriod {
        start_date,
        end_date,
        source_text: (!trimmed.is_empty()).then(|| trimmed.to_string()),
    }
}

/// Finds the validity phrase inside a longer offer text, lowercased.
#[must_use]
pub fn find_validity_phrase(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    VALIDITY_PHRASE_RES
        .iter()
        .find_map(|re| re.find(&lower))
        .map(|m| m.as_str().trim().to_string())
}

fn words(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

fn relative_date(words: &[&str], reference: NaiveDate) -> Option<NaiveDate> {
    RELATIVE_DAYS
        .iter()
        .find(|(keyword, _)| words.contains(keyword))
        .and_then(|(_, offset)| reference.checked_add_signed(TimeDelta::days(*offset)))
}

/// Role of a lone date. The end date is the default when the text gives no
/// direction at all.
fn single_date_role(words: &[&str]) -> Role {
    if words.iter().any(|w| UNTIL_MARKERS.contains(w)) {
        Role::End
    } else if words.iter().any(|w| FROM_MARKERS.contains(w)) {
        Role::Start
    } else {
        Role::End
    }
}

fn place(date: NaiveDate, role: Role) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match role {
        Role::Start => (Some(date), None),
        Role::End => (None, Some(date)),
    }
}

/// Every valid date token in `lower`, in order of appearance.
fn absolute_dates(lower: &str, reference: NaiveDate) -> Vec<NaiveDate> {
    let mut found: Vec<(usize, NaiveDate)> = Vec::new();

    for caps in NUMERIC_DATE_RE.captures_iter(lower) {
        let day = capture_number::<u32>(&caps, 1);
        let month = capture_number::<u32>(&caps, 2);
        let year = capture_number::<i32>(&caps, 3);
        if let (Some(day), Some(month)) = (day, month) {
            if let Some(date) = calendar_date(day, month, year, reference) {
                found.push((caps.get(0).map_or(0, |m| m.start()), date));
            }
        }
    }

    for caps in TEXTUAL_DATE_RE.captures_iter(lower) {
        let day = capture_number::<u32>(&caps, 1);
        let month = caps.get(2).and_then(|m| month_number(m.as_str()));
        let year = capture_number::<i32>(&caps, 3);
        if let (Some(day), Some(month)) = (day, month) {
            if let Some(date) = calendar_date(day, month, year, reference) {
                found.push((caps.get(0).map_or(0, |m| m.start()), date));
            }
        }
    }

    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, date)| date).collect()
}

fn capture_number<T: std::str::FromStr>(caps: &regex::Captures<'_>, group: usize) -> Option<T> {
    caps.get(group).and_then(|m| m.as_str().parse::<T>().ok())
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, month)| *month)
}

fn calendar_date(
    day: u32,
    month: u32,
    explicit_year: Option<i32>,
    reference: NaiveDate,
) -> Option<NaiveDate> {
    let year = explicit_year.unwrap_or_else(|| assumed_year(month, reference));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Offers listed in late autumn regularly run into January.
fn assumed_year(month: u32, reference: NaiveDate) -> i32 {
    if month < reference.month() && reference.month() >= 11 {
        reference.year() + 1
    } else {
        reference.year()
    }
}

#[cfg(test)]
#[path = "dates_test.rs"]
mod tests;
