//! Derivation of the first real occurrence date for every meeting block.

use chrono::{Datelike, Duration};

use crate::model::CourseSet;

/// Shift every block's `start_date` forward to the first date whose weekday
/// matches the first entry of `days`.
///
/// The term start date handed out by the source is the same for all blocks
/// of a course, so a block meeting only on Wednesdays may carry a Monday
/// start date. Downstream consumers build `FREQ=WEEKLY;BYDAY=...` rules
/// straight from `days`, which requires the persisted start date to be a
/// true first occurrence. The shift is forward-only and at most six days,
/// so applying it twice is a no-op. Blocks with empty `days` are untouched.
pub fn shift_start_dates(courses: &mut CourseSet) {
    for course in courses.values_mut() {
        for block in course.meeting_blocks.values_mut() {
            let Some(first_day) = block.days.first() else {
                continue;
            };
            let target = first_day.weekday().num_days_from_monday();
            let current = block.start_date.weekday().num_days_from_monday();
            let offset = (target + 7 - current) % 7;
            if offset > 0 {
                block.start_date += Duration::days(i64::from(offset));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, NaiveTime};

    use crate::{
        model::{Course, CourseSet, DayCode, MeetingBlock},
        recurrence::shift_start_dates,
    };

    fn block(days: Vec<DayCode>, start_date: NaiveDate) -> MeetingBlock {
        MeetingBlock {
            start_date,
            end_date: NaiveDate::from_ymd_opt(2023, 8, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 10, 0).unwrap(),
            days,
            building: "1455 de Maisonneuve Boulevard West".to_string(),
            room: "H521".to_string(),
            instructor: "A. Instructor".to_string(),
            class_number: "3103".to_string(),
            section: "CC".to_string(),
            component: "Lec".to_string(),
        }
    }

    fn course_set(blocks: Vec<(&str, MeetingBlock)>) -> CourseSet {
        let meeting_blocks: BTreeMap<String, MeetingBlock> = blocks
            .into_iter()
            .map(|(component, block)| (component.to_string(), block))
            .collect();
        BTreeMap::from([(
            "SOEN 287".to_string(),
            Course {
                title: "SOEN 287".to_string(),
                subtitle: "Web Programming".to_string(),
                credit_units: "3.00".to_string(),
                meeting_blocks,
            },
        )])
    }

    /// 2023-07-03 is a Monday.
    #[test]
    fn test_shift_moves_wednesday_block_forward() {
        let monday = NaiveDate::from_ymd_opt(2023, 7, 3).unwrap();
        let mut courses = course_set(vec![
            ("LEC", block(vec![DayCode::Mo, DayCode::We], monday)),
            ("TUT", block(vec![DayCode::We], monday)),
        ]);
        shift_start_dates(&mut courses);
        let course = &courses["SOEN 287"];
        assert_eq!(course.meeting_blocks["LEC"].start_date, monday);
        assert_eq!(
            course.meeting_blocks["TUT"].start_date,
            NaiveDate::from_ymd_opt(2023, 7, 5).unwrap()
        );
    }

    #[test]
    fn test_shift_is_idempotent() {
        let monday = NaiveDate::from_ymd_opt(2023, 7, 3).unwrap();
        let mut courses = course_set(vec![("TUT", block(vec![DayCode::Th], monday))]);
        shift_start_dates(&mut courses);
        let once = courses["SOEN 287"].meeting_blocks["TUT"].start_date;
        shift_start_dates(&mut courses);
        let twice = courses["SOEN 287"].meeting_blocks["TUT"].start_date;
        assert_eq!(once, NaiveDate::from_ymd_opt(2023, 7, 6).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_shift_wraps_into_next_week() {
        // Wednesday start, Monday-only block: forward to next week's Monday.
        let wednesday = NaiveDate::from_ymd_opt(2023, 7, 5).unwrap();
        let mut courses = course_set(vec![("LAB", block(vec![DayCode::Mo], wednesday))]);
        shift_start_dates(&mut courses);
        assert_eq!(
            courses["SOEN 287"].meeting_blocks["LAB"].start_date,
            NaiveDate::from_ymd_opt(2023, 7, 10).unwrap()
        );
    }

    #[test]
    fn test_shift_skips_blocks_without_days() {
        let monday = NaiveDate::from_ymd_opt(2023, 7, 3).unwrap();
        let mut courses = course_set(vec![("LEC", block(vec![], monday))]);
        shift_start_dates(&mut courses);
        assert_eq!(courses["SOEN 287"].meeting_blocks["LEC"].start_date, monday);
    }
}
