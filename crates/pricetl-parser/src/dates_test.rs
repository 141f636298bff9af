use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// -----------------------------------------------------------------------
// relative keywords
// -----------------------------------------------------------------------

#[test]
fn tomorrow_ends() {
    assert_eq!(
        resolve("zítra končí", date(2025, 12, 10)),
        (None, Some(date(2025, 12, 11)))
    );
}

#[test]
fn today_ends_capitalized() {
    assert_eq!(
        resolve("  Dnes končí ", date(2025, 12, 10)),
        (None, Some(date(2025, 12, 10)))
    );
}

#[test]
fn day_after_tomorrow_without_cue_defaults_to_end() {
    assert_eq!(
        resolve("pozítří", date(2025, 12, 30)),
        (None, Some(date(2026, 1, 1)))
    );
}

#[test]
fn tomorrow_starts_with_from_marker() {
    assert_eq!(
        resolve("od zítra", date(2025, 12, 10)),
        (Some(date(2025, 12, 11)), None)
    );
}

#[test]
fn yesterday_and_day_before() {
    assert_eq!(
        resolve("skončila včera, platí do", date(2025, 3, 1)),
        (None, Some(date(2025, 2, 28)))
    );
    assert_eq!(
        resolve("předevčírem", date(2025, 3, 1)),
        (None, Some(date(2025, 2, 27)))
    );
}

#[test]
fn relative_keyword_beats_absolute_date() {
    assert_eq!(
        resolve("zítra končí (17. 12.)", date(2025, 12, 10)),
        (None, Some(date(2025, 12, 11)))
    );
}

#[test]
fn keyword_inside_longer_word_is_not_relative() {
    // "dnešní" is not "dnes"; the absolute date is used instead.
    assert_eq!(
        resolve("dnešní akce do 14. 12.", date(2025, 12, 10)),
        (None, Some(date(2025, 12, 14)))
    );
}

// -----------------------------------------------------------------------
// absolute dates
// -----------------------------------------------------------------------

#[test]
fn weekday_range() {
    assert_eq!(
        resolve("čt 18. 12. – pá 19. 12.", date(2025, 12, 1)),
        (Some(date(2025, 12, 18)), Some(date(2025, 12, 19)))
    );
}

#[test]
fn compact_range() {
    assert_eq!(
        resolve("13.12. - 17.12.", date(2025, 6, 1)),
        (Some(date(2025, 12, 13)), Some(date(2025, 12, 17)))
    );
}

#[test]
fn until_single_date() {
    assert_eq!(
        resolve("platí do středy 17. 12.", date(2025, 12, 15)),
        (None, Some(date(2025, 12, 17)))
    );
}

#[test]
fn from_single_date() {
    assert_eq!(
        resolve("platí od 16. 12.", date(2025, 12, 15)),
        (Some(date(2025, 12, 16)), None)
    );
}

#[test]
fn single_date_without_cue_defaults_to_end() {
    assert_eq!(
        resolve("st 17. 12.", date(2025, 12, 15)),
        (None, Some(date(2025, 12, 17)))
    );
}

#[test]
fn from_until_range() {
    assert_eq!(
        resolve("platí od 16. 12. do 22. 12.", date(2025, 12, 15)),
        (Some(date(2025, 12, 16)), Some(date(2025, 12, 22)))
    );
}

#[test]
fn middle_dates_are_ignored() {
    assert_eq!(
        resolve("1. 12., 5. 12., 9. 12.", date(2025, 12, 1)),
        (Some(date(2025, 12, 1)), Some(date(2025, 12, 9)))
    );
}

#[test]
fn explicit_year_is_kept() {
    assert_eq!(
        resolve("do 3. 1. 2027", date(2025, 12, 15)),
        (None, Some(date(2027, 1, 3)))
    );
}

#[test]
fn january_in_december_rolls_to_next_year() {
    assert_eq!(
        resolve("29. 12. – 4. 1.", date(2025, 12, 20)),
        (Some(date(2025, 12, 29)), Some(date(2026, 1, 4)))
    );
}

#[test]
fn earlier_month_outside_year_end_does_not_roll() {
    assert_eq!(
        resolve("do 3. 2.", date(2025, 6, 10)),
        (None, Some(date(2025, 2, 3)))
    );
}

#[test]
fn invalid_month_is_skipped() {
    assert_eq!(resolve("13.13.", date(2025, 12, 1)), (None, None));
    assert_eq!(
        resolve("13.13. - 17.12.", date(2025, 12, 1)),
        (None, Some(date(2025, 12, 17)))
    );
}

#[test]
fn invalid_day_is_skipped() {
    assert_eq!(
        resolve("30. 2. – 5. 3.", date(2025, 2, 1)),
        (None, Some(date(2025, 3, 5)))
    );
}

#[test]
fn longer_number_does_not_supply_a_day() {
    assert_eq!(resolve("123.12.", date(2025, 12, 1)), (None, None));
    assert_eq!(resolve("kód 4517. prosince", date(2025, 12, 1)), (None, None));
    assert_eq!(
        resolve("č. 123.12. platí do 20.12.", date(2025, 12, 1)),
        (None, Some(date(2025, 12, 20)))
    );
}

#[test]
fn textual_month() {
    assert_eq!(
        resolve("platí do 17. prosince", date(2025, 12, 1)),
        (None, Some(date(2025, 12, 17)))
    );
}

#[test]
fn textual_month_full_genitive_not_truncated() {
    assert_eq!(
        resolve("od 3. července 2026", date(2026, 6, 1)),
        (Some(date(2026, 7, 3)), None)
    );
}

#[test]
fn mixed_numeric_and_textual_keep_text_order() {
    assert_eq!(
        resolve("od 30. listopadu do 4. 12.", date(2025, 11, 20)),
        (Some(date(2025, 11, 30)), Some(date(2025, 12, 4)))
    );
}

#[test]
fn no_dates() {
    assert_eq!(resolve("v akci", date(2025, 12, 1)), (None, None));
}

#[test]
fn empty_text() {
    assert_eq!(resolve("   ", date(2025, 12, 1)), (None, None));
}

#[test]
fn until_marker_must_be_whole_word() {
    // "doba" contains "do" but is not a marker; "od" then decides.
    assert_eq!(
        resolve("doba akce od 5. 12.", date(2025, 12, 1)),
        (Some(date(2025, 12, 5)), None)
    );
}

// -----------------------------------------------------------------------
// resolve_validity / find_validity_phrase
// -----------------------------------------------------------------------

#[test]
fn resolve_validity_keeps_trimmed_text() {
    let period = resolve_validity("  platí do středy 17. 12. ", date(2025, 12, 15));
    assert_eq!(period.source_text.as_deref(), Some("platí do středy 17. 12."));
    assert_eq!(period.end_date, Some(date(2025, 12, 17)));
    assert!(period.is_resolved());
}

#[test]
fn resolve_validity_empty_text_has_no_source() {
    let period = resolve_validity("", date(2025, 12, 15));
    assert!(period.source_text.is_none());
    assert!(!period.is_resolved());
}

#[test]
fn find_phrase_prefers_from_until() {
    assert_eq!(
        find_validity_phrase("Lidl 17,90 Kč Platí od 16. 12. do 22. 12. V letáku").as_deref(),
        Some("od 16. 12. do 22. 12.")
    );
}

#[test]
fn find_phrase_plati() {
    assert_eq!(
        find_validity_phrase("–55 % platí do středy 17. 12. Přidat").as_deref(),
        Some("platí do středy 17. 12.")
    );
}

#[test]
fn find_phrase_relative() {
    assert_eq!(
        find_validity_phrase("Penny –40 % Zítra končí").as_deref(),
        Some("zítra končí")
    );
}

#[test]
fn find_phrase_weekday_range() {
    assert_eq!(
        find_validity_phrase("Albert čt 18. 12. – pá 19. 12. V letáku").as_deref(),
        Some("čt 18. 12. – pá 19. 12.")
    );
}

#[test]
fn find_phrase_none() {
    assert!(find_validity_phrase("Lidl 17,90 Kč").is_none());
}
