//! This client parses a saved course-cart page into course data.
//!
//! The cart is the PeopleSoft enrollment table. Every meeting row carries
//! its sub-fields in elements whose ids share a fixed prefix followed by a
//! running counter (`MTG_COMP$0`, `MTG_COMP$1`, ...), so rows are collected
//! with id-prefix selectors and are self-describing; no counter is threaded
//! through the traversal.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::{
    error::FormatError,
    location::LocationTable,
    model::{Course, CourseSet, MeetingBlock},
    normalize::{parse_date_range, parse_days_and_time, parse_room},
};

/// Parse the course-cart HTML into the set of enrolled courses.
///
/// Malformed day/time, date or room text aborts the whole extraction; a
/// missing calendar entry is worse than a stopped pipeline.
pub fn parse_course_cart(html: &str, locations: &LocationTable) -> Result<CourseSet> {
    let dom = Html::parse_document(html);
    let table_selector = Selector::parse(r#"table[id="ACE_STDNT_ENRL_SSV2$0"]"#).unwrap();
    let course_row_selector =
        Selector::parse(r#"table[id="ACE_STDNT_ENRL_SSV2$0"] > tbody > tr"#).unwrap();
    dom.select(&table_selector)
        .next()
        .context("course cart table not found in document")?;
    let row_selectors = RowSelectors::new();
    let mut courses = CourseSet::new();
    for course_element in dom.select(&course_row_selector) {
        let course = assemble_course(course_element, &row_selectors, locations)?;
        debug!(
            title = %course.title,
            blocks = course.meeting_blocks.len(),
            "extracted course"
        );
        courses.insert(course.title.clone(), course);
    }
    Ok(courses)
}

/// Assemble one course from its cart row.
///
/// Consuming meeting rows stops at the first row without a class number;
/// the course keeps whatever blocks were collected up to that point.
fn assemble_course(
    course_element: ElementRef,
    row_selectors: &RowSelectors,
    locations: &LocationTable,
) -> Result<Course> {
    let heading_selector = Selector::parse("h3.ui-bar").unwrap();
    let units_selector = Selector::parse(r#"span[id^="DERIVED_REGFRM1_UNT_TAKEN$"]"#).unwrap();
    let meeting_row_selector =
        Selector::parse(r#"table[id^="CLASS_MTG_VW$scroll$"] table.ui-table > tbody > tr"#)
            .unwrap();
    let heading = find_text(course_element, &heading_selector)
        .context("course heading not found in cart row")?;
    let (title, subtitle) = heading
        .split_once(" - ")
        .unwrap_or((heading.as_str(), ""));
    let credit_units = find_text(course_element, &units_selector).unwrap_or_default();
    let mut meeting_blocks = BTreeMap::new();
    for row in course_element.select(&meeting_row_selector) {
        let Some(record) = RowRecord::from_row(row, row_selectors) else {
            // No class number means no more meeting rows for this course.
            break;
        };
        let block = build_block(record, locations)?;
        meeting_blocks.insert(component_key(&block.component), block);
    }
    Ok(Course {
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        credit_units,
        meeting_blocks,
    })
}

/// Raw text of one meeting row, collected before any normalization.
#[derive(Debug)]
struct RowRecord {
    class_number: String,
    section: String,
    component: String,
    day_time: String,
    location: String,
    instructor: String,
    dates: String,
}

impl RowRecord {
    /// Collect the row's sub-fields, or `None` when the class number is
    /// absent, which signals the end of the course's meeting rows.
    fn from_row(row: ElementRef, selectors: &RowSelectors) -> Option<Self> {
        let class_number = find_text(row, &selectors.class_number)?;
        Some(Self {
            class_number,
            section: find_text(row, &selectors.section).unwrap_or_default(),
            component: find_text(row, &selectors.component).unwrap_or_default(),
            day_time: find_text(row, &selectors.day_time).unwrap_or_default(),
            location: find_text(row, &selectors.location).unwrap_or_default(),
            instructor: find_text(row, &selectors.instructor).unwrap_or_default(),
            dates: find_text(row, &selectors.dates).unwrap_or_default(),
        })
    }
}

struct RowSelectors {
    class_number: Selector,
    section: Selector,
    component: Selector,
    day_time: Selector,
    location: Selector,
    instructor: Selector,
    dates: Selector,
}

impl RowSelectors {
    fn new() -> Self {
        Self {
            class_number: Selector::parse(r#"span[id^="DERIVED_CLS_DTL_CLASS_NBR$"]"#).unwrap(),
            section: Selector::parse(r#"a[id^="MTG_SECTION$"]"#).unwrap(),
            component: Selector::parse(r#"span[id^="MTG_COMP$"]"#).unwrap(),
            day_time: Selector::parse(r#"span[id^="MTG_SCHED$"]"#).unwrap(),
            location: Selector::parse(r#"span[id^="MTG_LOC$"]"#).unwrap(),
            instructor: Selector::parse(r#"span[id^="DERIVED_CLS_DTL_SSR_INSTR_LONG$"]"#).unwrap(),
            dates: Selector::parse(r#"span[id^="MTG_DATES$"]"#).unwrap(),
        }
    }
}

/// Run a row's raw fields through the token normalizers.
fn build_block(record: RowRecord, locations: &LocationTable) -> Result<MeetingBlock, FormatError> {
    let (days, start_time, end_time) = parse_days_and_time(&record.day_time)?;
    let (start_date, end_date) = parse_date_range(&record.dates)?;
    let (building, room) = parse_room(&record.location, locations);
    Ok(MeetingBlock {
        start_date,
        end_date,
        start_time,
        end_time,
        days,
        building,
        room,
        instructor: record.instructor,
        class_number: record.class_number,
        section: record.section,
        // Shorten the label, "Lecture" becomes "Lec".
        component: record.component.chars().take(3).collect(),
    })
}

/// Mapping key for a component label: first three characters, upper-cased.
fn component_key(component: &str) -> String {
    component.chars().take(3).collect::<String>().to_uppercase()
}

fn find_text(element: ElementRef, selector: &Selector) -> Option<String> {
    let found = element.select(selector).next()?;
    Some(found.text().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::{
        cart_client::{component_key, parse_course_cart},
        location::LocationTable,
        model::DayCode,
    };

    #[test]
    fn test_component_key() {
        assert_eq!(component_key("Lecture"), "LEC");
        assert_eq!(component_key("Tutorial"), "TUT");
        assert_eq!(component_key("Lab"), "LAB");
    }

    /// Parse the fixture cart saved from the enrollment page.
    ///
    /// This test is offline.
    #[test]
    fn test_parse_course_cart() {
        let html = include_str!("cart_client/tests/response.html");
        let courses = parse_course_cart(html, &LocationTable::default()).unwrap();
        assert_eq!(courses.len(), 2);

        let soen = &courses["SOEN 287"];
        assert_eq!(soen.subtitle, "Web Programming");
        assert_eq!(soen.credit_units, "3.00");
        assert_eq!(soen.meeting_blocks.len(), 2);

        let lecture = &soen.meeting_blocks["LEC"];
        assert_eq!(lecture.class_number, "2043");
        assert_eq!(lecture.section, "CC");
        assert_eq!(lecture.component, "Lec");
        assert_eq!(lecture.days, vec![DayCode::Mo, DayCode::We]);
        assert_eq!(
            lecture.start_time,
            NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        );
        assert_eq!(lecture.end_time, NaiveTime::from_hms_opt(20, 10, 0).unwrap());
        assert_eq!(
            lecture.start_date,
            NaiveDate::from_ymd_opt(2023, 7, 3).unwrap()
        );
        assert_eq!(
            lecture.end_date,
            NaiveDate::from_ymd_opt(2023, 8, 10).unwrap()
        );
        assert_eq!(lecture.building, "1455 de Maisonneuve Boulevard West");
        assert_eq!(lecture.room, "H521");
        assert_eq!(lecture.instructor, "MARIA TORRES");

        let tutorial = &soen.meeting_blocks["TUT"];
        assert_eq!(tutorial.class_number, "3103");
        assert_eq!(tutorial.days, vec![DayCode::We]);
        assert_eq!(tutorial.room, "H631");
    }

    /// A meeting row without a class number ends the course's rows; later
    /// rows in the same course are ignored.
    #[test]
    fn test_parse_course_cart_stops_at_missing_class_number() {
        let html = include_str!("cart_client/tests/response.html");
        let courses = parse_course_cart(html, &LocationTable::default()).unwrap();
        let engr = &courses["ENGR 213"];
        assert_eq!(engr.subtitle, "Applied Ordinary Differential Equations");
        assert_eq!(engr.meeting_blocks.len(), 1);
        assert!(engr.meeting_blocks.contains_key("LEC"));
        assert!(!engr.meeting_blocks.contains_key("LAB"));
        let lecture = &engr.meeting_blocks["LEC"];
        assert_eq!(lecture.building, "TBA");
        assert_eq!(lecture.room, "N/A");
    }

    #[test]
    fn test_parse_course_cart_rejects_malformed_time() {
        let html = include_str!("cart_client/tests/response.html")
            .replace("MoWe 6:30PM - 8:10PM", "MoWe 6:30PM");
        let error = parse_course_cart(&html, &LocationTable::default()).unwrap_err();
        assert!(error.to_string().contains("6:30PM"));
    }

    #[test]
    fn test_parse_course_cart_rejects_missing_table() {
        let error = parse_course_cart("<html><body></body></html>", &LocationTable::default())
            .unwrap_err();
        assert!(error.to_string().contains("course cart table"));
    }
}
