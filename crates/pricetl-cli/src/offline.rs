//! `pricetl parse`: run the assembler over a saved page without network access.

use std::path::Path;

use chrono::{Local, NaiveDate, NaiveTime};

use pricetl_core::{ExtractedPage, FetchResult, ProcessedRecord};
use pricetl_parser::{RecordAssembler, RunContext};

pub(crate) fn run_parse_command(
    assembler: &RecordAssembler,
    file: &Path,
    url: &str,
    reference_date: Option<NaiveDate>,
    json: Option<&Path>,
) -> anyhow::Result<()> {
    let reference_date = reference_date.unwrap_or_else(|| Local::now().date_naive());
    let record = parse_saved_page(assembler, file, url, reference_date, json)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Builds a record from a saved page.
///
/// HTML files are converted to text and run through selector extraction
/// unless a structured JSON file is given. `crawled_at` is midnight UTC of
/// `reference_date`, so the output depends only on the inputs.
pub(crate) fn parse_saved_page(
    assembler: &RecordAssembler,
    file: &Path,
    url: &str,
    reference_date: NaiveDate,
    json: Option<&Path>,
) -> anyhow::Result<ProcessedRecord> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;

    let is_html = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));

    let structured = match json {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
            ExtractedPage::from_json(serde_json::from_str(&raw)?)?
        }
        None if is_html => Some(pricetl_scraper::extract_page(&content)),
        None => None,
    };
    let text = if is_html {
        pricetl_scraper::html_to_text(&content)
    } else {
        content
    };

    let fetch = FetchResult::success(url, structured, Some(text));
    let run = RunContext {
        reference_date,
        crawled_at: reference_date.and_time(NaiveTime::MIN).and_utc(),
    };
    assembler
        .assemble_fetch(&fetch, &run)
        .ok_or_else(|| anyhow::anyhow!("no record assembled for {url}"))
}
