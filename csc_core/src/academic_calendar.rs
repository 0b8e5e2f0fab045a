//! Scraper for the university's list of closed dates.
//!
//! The academic-dates page groups its events by year: a text section names
//! the year, the featured-events sections after it list the dates. Only
//! entries marked closed are kept; the resulting dates are handed to the
//! caller opaquely.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

static URL: &str =
    "https://www.concordia.ca/students/undergraduate/undergraduate-academic-dates.html";
static SHORT_MONTH_FORMAT: &str = "%a, %b %d %Y";
static LONG_MONTH_FORMAT: &str = "%a, %B %d %Y";

/// Fetch the academic-dates page and extract the closed dates.
pub async fn closed_dates() -> Result<Vec<NaiveDate>> {
    let response = reqwest::get(URL).await?;
    Ok(extract_closed_dates(&response.text().await?))
}

/// Extract the closed dates from the academic-dates HTML.
///
/// Entries that fail to parse are logged and skipped; an outdated page
/// layout degrades to an empty list instead of aborting the run.
pub fn extract_closed_dates(html: &str) -> Vec<NaiveDate> {
    let dom = Html::parse_document(html);
    let section_selector =
        Selector::parse("div.c-wysiwyg, div.c-list-featured-events").unwrap();
    let entry_selector = Selector::parse("li").unwrap();
    let year_regex = Regex::new(r"\b(\d{4})\b").unwrap();
    let mut year: Option<String> = None;
    let mut dates = vec![];
    for section in dom.select(&section_selector) {
        let section_text = section.text().collect::<String>();
        if section.value().classes().any(|class| class == "c-wysiwyg") {
            if let Some(captures) = year_regex.captures(&section_text) {
                year = Some(captures[1].to_string());
            }
            continue;
        }
        let Some(year) = &year else {
            continue;
        };
        for entry in section.select(&entry_selector) {
            let entry_text = entry.text().collect::<String>();
            let entry_text = entry_text.trim();
            if !entry_text.contains("closed") {
                continue;
            }
            let day_month = entry_text.lines().next().unwrap_or_default().trim();
            match parse_closed_date(day_month, year) {
                Some(date) => dates.push(date),
                None => warn!(text = %day_month, "cannot parse closed date"),
            }
        }
    }
    dates
}

fn parse_closed_date(day_month: &str, year: &str) -> Option<NaiveDate> {
    let text = format!("{} {year}", day_month.replace('.', ""));
    NaiveDate::parse_from_str(&text, SHORT_MONTH_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(&text, LONG_MONTH_FORMAT))
        .ok()
}
