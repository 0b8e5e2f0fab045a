//! Offline iCalendar export of an extracted course set.

use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_property,
};
use regex::Regex;

use crate::{
    calendar_client::event_description,
    model::{weekly_rule, Course, CourseSet, MeetingBlock},
};

static PROD_ID: &str = "-//CourseSchedule//concordia.ca";
static TIMEZONE: &str = "America/Montreal";
static DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Build a calendar with one recurring event per meeting block.
pub fn to_ical(courses: &CourseSet) -> IcalCalendar {
    let changed = chrono::Local::now().format(DATETIME_FORMAT).to_string();
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PROD_ID)
        .build();
    for course in courses.values() {
        for block in course.meeting_blocks.values() {
            calendar.events.push(build_event(course, block, &changed));
        }
    }
    calendar
}

fn build_event(course: &Course, block: &MeetingBlock, changed: &str) -> IcalEvent {
    let format_at = |time: chrono::NaiveTime| {
        block
            .start_date
            .and_time(time)
            .format(DATETIME_FORMAT)
            .to_string()
    };
    IcalEventBuilder::tzid(TIMEZONE)
        .uid(uid(&course.title, &block.component))
        .changed(changed)
        .start(format_at(block.start_time))
        .end(format_at(block.end_time))
        .set(ical_property!(
            "RRULE",
            weekly_rule(&block.days, block.end_date)
        ))
        .set(ical_property!(
            "SUMMARY",
            format!("{} {} {}", course.title, block.component, block.room)
        ))
        .set(ical_property!("LOCATION", block.building.as_str()))
        .set(ical_property!(
            "DESCRIPTION",
            event_description(course, block)
        ))
        .build()
}

/// Get a unique id for a course component event.
///
/// Changing this function is a breaking change!
fn uid(title: &str, component: &str) -> String {
    let whitespace_regex = Regex::new(r"\s+").unwrap();
    let whitespace_rep = "-";
    let title = whitespace_regex.replace_all(title, whitespace_rep);
    let component = whitespace_regex.replace_all(component, whitespace_rep);
    format!("CourseSchedule_{title}_{component}@concordia.ca")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, NaiveTime};
    use ical::generator::{IcalCalendar, IcalEvent};

    use crate::{
        ics::to_ical,
        model::{Course, CourseSet, DayCode, MeetingBlock},
    };

    fn sample_courses() -> CourseSet {
        let block = MeetingBlock {
            start_date: NaiveDate::from_ymd_opt(2023, 7, 3).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 8, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 10, 0).unwrap(),
            days: vec![DayCode::Mo, DayCode::We],
            building: "1455 de Maisonneuve Boulevard West".to_string(),
            room: "H521".to_string(),
            instructor: "MARIA TORRES".to_string(),
            class_number: "2043".to_string(),
            section: "CC".to_string(),
            component: "Lec".to_string(),
        };
        BTreeMap::from([(
            "SOEN 287".to_string(),
            Course {
                title: "SOEN 287".to_string(),
                subtitle: "Web Programming".to_string(),
                credit_units: "3.00".to_string(),
                meeting_blocks: BTreeMap::from([("LEC".to_string(), block)]),
            },
        )])
    }

    fn property_value<'a>(event: &'a IcalEvent, name: &str) -> &'a str {
        event
            .properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_deref())
            .unwrap()
    }

    fn single_event(calendar: &IcalCalendar) -> &IcalEvent {
        assert_eq!(calendar.events.len(), 1);
        &calendar.events[0]
    }

    #[test]
    fn test_to_ical_event_properties() {
        let calendar = to_ical(&sample_courses());
        let event = single_event(&calendar);
        assert_eq!(property_value(event, "SUMMARY"), "SOEN 287 Lec H521");
        assert_eq!(
            property_value(event, "LOCATION"),
            "1455 de Maisonneuve Boulevard West"
        );
        assert_eq!(property_value(event, "DTSTART"), "20230703T183000");
        assert_eq!(property_value(event, "DTEND"), "20230703T201000");
        assert_eq!(
            property_value(event, "RRULE"),
            "FREQ=WEEKLY;BYDAY=MO,WE;UNTIL=20230810T000000Z"
        );
        assert_eq!(
            property_value(event, "UID"),
            "CourseSchedule_SOEN-287_Lec@concordia.ca"
        );
    }
}
