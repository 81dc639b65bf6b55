use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const TIME_SLOTS: [&str; 6] = ["9 AM", "10 AM", "1 PM", "2 PM", "3 PM", "4 PM"];

pub const ALREADY_BOOKED_MESSAGE: &str =
    "This time is already booked for the selected date. Please choose another time.";

/// The shapes a consultation date can arrive in, either from a client
/// write or from rows written by older clients.
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    /// Milliseconds since the unix epoch.
    Millis(i64),
    Text(String),
    DateTime(DateTime<Utc>),
}

impl From<&str> for DateValue {
    fn from(value: &str) -> Self {
        DateValue::Text(value.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Consultation {
    pub id: Uuid,
    pub schedule_a_consultation: String,
    pub select_date: Option<DateValue>,
    pub preferred_time: Option<String>,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Field values of a pending create or update. Absent fields are left
/// untouched on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsultationData {
    pub schedule_a_consultation: Option<String>,
    pub select_date: Option<DateValue>,
    pub preferred_time: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl ConsultationData {
    pub fn apply_to(self, consultation: &mut Consultation) {
        if let Some(schedule_a_consultation) = self.schedule_a_consultation {
            consultation.schedule_a_consultation = schedule_a_consultation;
        }
        if let Some(select_date) = self.select_date {
            consultation.select_date = Some(select_date);
        }
        if let Some(preferred_time) = self.preferred_time {
            consultation.preferred_time = Some(preferred_time);
        }
        if let Some(full_name) = self.full_name {
            consultation.full_name = full_name;
        }
        if let Some(email) = self.email {
            consultation.email = email;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create,
    Update { item: Consultation },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationAvailability {
    pub date: String,
    pub booked_count: i32,
    pub booked_times: Vec<String>,
}

#[derive(Debug, Clone, InputObject, Validate)]
pub struct ConsultationCreateInput {
    #[graphql(name = "Schedule_a_Consultation")]
    #[validate(length(min = 1, message = "Schedule_a_Consultation must not be empty"))]
    pub schedule_a_consultation: String,
    #[validate(length(min = 1, message = "selectDate must not be empty"))]
    pub select_date: String,
    pub preferred_time: Option<String>,
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: String,
}

impl From<ConsultationCreateInput> for ConsultationData {
    fn from(input: ConsultationCreateInput) -> Self {
        ConsultationData {
            schedule_a_consultation: Some(input.schedule_a_consultation),
            select_date: Some(DateValue::Text(input.select_date)),
            preferred_time: input.preferred_time,
            full_name: Some(input.full_name),
            email: Some(input.email),
        }
    }
}

#[derive(Debug, Clone, Default, InputObject, Validate)]
pub struct ConsultationUpdateInput {
    #[graphql(name = "Schedule_a_Consultation")]
    #[validate(length(min = 1, message = "Schedule_a_Consultation must not be empty"))]
    pub schedule_a_consultation: Option<String>,
    #[validate(length(min = 1, message = "selectDate must not be empty"))]
    pub select_date: Option<String>,
    pub preferred_time: Option<String>,
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: Option<String>,
}

impl From<ConsultationUpdateInput> for ConsultationData {
    fn from(input: ConsultationUpdateInput) -> Self {
        ConsultationData {
            schedule_a_consultation: input.schedule_a_consultation,
            select_date: input.select_date.map(DateValue::Text),
            preferred_time: input.preferred_time,
            full_name: input.full_name,
            email: input.email,
        }
    }
}
