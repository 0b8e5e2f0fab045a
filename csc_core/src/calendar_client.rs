//! This client pushes meeting blocks to Google Calendar as recurring events.
//!
//! One insert request is issued per meeting block, sequentially. A rejected
//! block is recorded in its outcome and does not abort the batch; already
//! submitted blocks are not rolled back.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::SyncError,
    model::{weekly_rule, Course, CourseSet, MeetingBlock},
};

static API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars";
static TIMEZONE: &str = "America/Montreal";
static DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
static REMINDER_MINUTES: [u32; 3] = [15, 30, 120];

/// Event shape accepted by the calendar service.
#[derive(Debug, Serialize)]
pub struct EventRequest {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub recurrence: Vec<String>,
    reminders: Reminders,
}

#[derive(Debug, Serialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Serialize)]
struct Reminders {
    #[serde(rename = "useDefault")]
    use_default: bool,
    overrides: Vec<Reminder>,
}

#[derive(Debug, Serialize)]
struct Reminder {
    method: String,
    minutes: u32,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    #[serde(rename = "htmlLink", default)]
    html_link: Option<String>,
}

/// Result of submitting one meeting block.
#[derive(Debug)]
pub struct SyncOutcome {
    pub course: String,
    pub component: String,
    /// Opaque link to the created event, or the rejection reason.
    pub result: Result<String, SyncError>,
}

/// Build the event request for one meeting block.
pub fn event_request(course: &Course, block: &MeetingBlock) -> EventRequest {
    let event_time = |time: chrono::NaiveTime| EventTime {
        date_time: block
            .start_date
            .and_time(time)
            .format(DATETIME_FORMAT)
            .to_string(),
        time_zone: TIMEZONE.to_string(),
    };
    EventRequest {
        summary: format!("{} {} {}", course.title, block.component, block.room),
        location: block.building.clone(),
        description: event_description(course, block),
        start: event_time(block.start_time),
        end: event_time(block.end_time),
        recurrence: vec![format!(
            "RRULE:{}",
            weekly_rule(&block.days, block.end_date)
        )],
        reminders: Reminders {
            use_default: false,
            overrides: REMINDER_MINUTES
                .into_iter()
                .map(|minutes| Reminder {
                    method: "popup".to_string(),
                    minutes,
                })
                .collect(),
        },
    }
}

/// Human-readable event body shared with the iCalendar export.
pub fn event_description(course: &Course, block: &MeetingBlock) -> String {
    format!(
        "Course name: {}\nCredits: {}\nInstructor: {}\nClass number: {}\nComponent: {}\nSection: {}",
        course.subtitle,
        course.credit_units,
        block.instructor,
        block.class_number,
        block.component,
        block.section
    )
}

/// Client for a single target calendar.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    calendar_id: String,
    access_token: String,
}

impl CalendarClient {
    pub fn new(calendar_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            calendar_id: calendar_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Submit every meeting block of every course, one request at a time.
    pub async fn push(&self, courses: &CourseSet) -> Vec<SyncOutcome> {
        let mut outcomes = vec![];
        for course in courses.values() {
            for (component_key, block) in &course.meeting_blocks {
                let request = event_request(course, block);
                debug!(summary = %request.summary, "submitting event");
                let result = self.insert(&request).await;
                outcomes.push(SyncOutcome {
                    course: course.title.clone(),
                    component: component_key.clone(),
                    result,
                });
            }
        }
        outcomes
    }

    async fn insert(&self, request: &EventRequest) -> Result<String, SyncError> {
        let sync_error = |reason: String| SyncError {
            summary: request.summary.clone(),
            reason,
        };
        let url = format!("{API_BASE}/{}/events", self.calendar_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|err| sync_error(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(sync_error(format!("{status}: {body}")));
        }
        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|err| sync_error(err.to_string()))?;
        Ok(inserted.html_link.unwrap_or_default())
    }
}
