use crate::consultation_manager::ConsultationManager;
use crate::error::BookingError;
use crate::normalize::date_key;
use crate::types::{
    Consultation, ConsultationAvailability, ConsultationCreateInput, ConsultationUpdateInput,
    TIME_SLOTS,
};
use async_graphql::{
    Context, EmptySubscription, Error, ErrorExtensions, Object, Result, Schema, SimpleObject, ID,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type ConsultationSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn build_schema(consultation_manager: ConsultationManager) -> ConsultationSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(consultation_manager)
        .finish()
}

impl ErrorExtensions for BookingError {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, extensions| match self {
            BookingError::Validation(messages) => {
                extensions.set("code", "VALIDATION_FAILURE");
                extensions.set("messages", messages.clone());
            }
            BookingError::NotFound(_) => extensions.set("code", "NOT_FOUND"),
            BookingError::Backend(_) => extensions.set("code", "INTERNAL_SERVER_ERROR"),
        })
    }
}

fn parse_id(id: &ID) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::new(format!("invalid consultation id: {}", id.as_str())))
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Consultation")]
pub struct ConsultationObject {
    id: ID,
    #[graphql(name = "Schedule_a_Consultation")]
    schedule_a_consultation: String,
    select_date: Option<String>,
    preferred_time: Option<String>,
    full_name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<Consultation> for ConsultationObject {
    fn from(consultation: Consultation) -> Self {
        Self {
            id: ID(consultation.id.to_string()),
            schedule_a_consultation: consultation.schedule_a_consultation,
            select_date: consultation.select_date.as_ref().and_then(date_key),
            preferred_time: consultation.preferred_time,
            full_name: consultation.full_name,
            email: consultation.email,
            created_at: consultation.created_at,
        }
    }
}

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    async fn consultations_availability(
        &self,
        ctx: &Context<'_>,
        start: String,
        end: String,
    ) -> Result<Vec<ConsultationAvailability>> {
        ctx.data::<ConsultationManager>()?
            .availability(&start, &end)
            .map_err(|err| BookingError::from(err).extend())
    }

    async fn booked_times_for_date(&self, ctx: &Context<'_>, date: String) -> Result<Vec<String>> {
        ctx.data::<ConsultationManager>()?
            .booked_times_for_date(&date)
            .map_err(|err| BookingError::from(err).extend())
    }

    /// Times a consultation can be booked at.
    async fn time_slots(&self) -> Vec<String> {
        TIME_SLOTS.iter().map(|slot| slot.to_string()).collect()
    }

    async fn consultation(&self, ctx: &Context<'_>, id: ID) -> Result<Option<ConsultationObject>> {
        let id = parse_id(&id)?;
        let consultation = ctx
            .data::<ConsultationManager>()?
            .find(id)
            .map_err(|err| err.extend())?;
        Ok(consultation.map(ConsultationObject::from))
    }

    async fn consultations(&self, ctx: &Context<'_>) -> Result<Vec<ConsultationObject>> {
        let consultations = ctx
            .data::<ConsultationManager>()?
            .list()
            .map_err(|err| err.extend())?;
        Ok(consultations.into_iter().map(ConsultationObject::from).collect())
    }
}

#[derive(Default)]
pub struct Mutation;

#[Object]
impl Mutation {
    async fn create_consultation(
        &self,
        ctx: &Context<'_>,
        data: ConsultationCreateInput,
    ) -> Result<ConsultationObject> {
        let consultation = ctx
            .data::<ConsultationManager>()?
            .create(data)
            .map_err(|err| err.extend())?;
        Ok(consultation.into())
    }

    async fn update_consultation(
        &self,
        ctx: &Context<'_>,
        id: ID,
        data: ConsultationUpdateInput,
    ) -> Result<ConsultationObject> {
        let id = parse_id(&id)?;
        let consultation = ctx
            .data::<ConsultationManager>()?
            .update(id, data)
            .map_err(|err| err.extend())?;
        Ok(consultation.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_consultations::LocalConsultations;
    use crate::testutils::{consultation, MockConsultationBackend};
    use crate::types::ALREADY_BOOKED_MESSAGE;
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;

    fn create_mutation(date: &str, time: &str) -> String {
        format!(
            r#"mutation {{
                createConsultation(data: {{
                    Schedule_a_Consultation: "Free 30-minute Consultation",
                    selectDate: "{date}",
                    preferredTime: "{time}",
                    fullName: "Stefan",
                    email: "stefan@example.com"
                }}) {{ id selectDate preferredTime }}
            }}"#
        )
    }

    async fn execute(schema: &ConsultationSchema, query: &str) -> Value {
        let response = schema.execute(query).await;
        serde_json::to_value(&response).unwrap()
    }

    #[tokio::test]
    async fn test_schema_exposes_query_surface() {
        let schema = build_schema(ConsultationManager::new(LocalConsultations::default()));
        let sdl = schema.sdl();

        assert!(sdl.contains(
            "consultationsAvailability(start: String!, end: String!): [ConsultationAvailability!]!"
        ));
        assert!(sdl.contains("bookedTimesForDate(date: String!): [String!]!"));
        assert!(sdl.contains("bookedCount: Int!"));
        assert!(sdl.contains("bookedTimes: [String!]!"));
    }

    #[tokio::test]
    async fn test_book_and_query_availability() {
        let schema = build_schema(ConsultationManager::new(LocalConsultations::default()));

        let created = execute(&schema, &create_mutation("2024-06-01", "09:00am")).await;
        assert_eq!(
            created["data"]["createConsultation"]["preferredTime"],
            json!("9 AM")
        );
        execute(&schema, &create_mutation("2024-06-02", "10 AM")).await;

        let response = execute(
            &schema,
            r#"{
                consultationsAvailability(start: "2024-06-01", end: "2024-06-02") {
                    date bookedCount bookedTimes
                }
                bookedTimesForDate(date: "2024-06-01")
            }"#,
        )
        .await;

        assert_eq!(
            response["data"],
            json!({
                "consultationsAvailability": [
                    { "date": "2024-06-01", "bookedCount": 1, "bookedTimes": ["9 AM"] },
                    { "date": "2024-06-02", "bookedCount": 1, "bookedTimes": ["10 AM"] }
                ],
                "bookedTimesForDate": ["9 AM"]
            })
        );
    }

    #[tokio::test]
    async fn test_duplicate_booking_is_a_validation_error() {
        let schema = build_schema(ConsultationManager::new(LocalConsultations::default()));
        execute(&schema, &create_mutation("2024-06-01", "9 AM")).await;

        let response = execute(&schema, &create_mutation("2024-06-01", "9am")).await;

        assert_eq!(response["errors"][0]["message"], json!(ALREADY_BOOKED_MESSAGE));
        assert_eq!(
            response["errors"][0]["extensions"]["code"],
            json!("VALIDATION_FAILURE")
        );
        assert_eq!(
            response["errors"][0]["extensions"]["messages"],
            json!([ALREADY_BOOKED_MESSAGE])
        );
    }

    #[tokio::test]
    async fn test_update_consultation() {
        let stored = consultation(Some("2024-06-01".into()), Some("9 AM"));
        let mock_backend = MockConsultationBackend::with_consultations(vec![stored.clone()]);
        let schema = build_schema(ConsultationManager::new(mock_backend.clone()));

        let response = execute(
            &schema,
            &format!(
                r#"mutation {{ updateConsultation(id: "{}", data: {{ fullName: "Peter" }}) {{ fullName preferredTime }} }}"#,
                stored.id
            ),
        )
        .await;

        assert_eq!(
            response["data"]["updateConsultation"],
            json!({ "fullName": "Peter", "preferredTime": "9 AM" })
        );
        assert_eq!(mock_backend.0.calls_to_find_many.load(Ordering::SeqCst), 0);

        let response = execute(
            &schema,
            r#"mutation { updateConsultation(id: "not-a-uuid", data: {}) { id } }"#,
        )
        .await;
        assert_eq!(
            response["errors"][0]["message"],
            json!("invalid consultation id: not-a-uuid")
        );
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_error() {
        let mock_backend = MockConsultationBackend::new();
        mock_backend.0.success.store(false, Ordering::SeqCst);
        let schema = build_schema(ConsultationManager::new(mock_backend));

        let response = execute(&schema, r#"{ bookedTimesForDate(date: "2024-06-01") }"#).await;

        assert_eq!(
            response["errors"][0]["extensions"]["code"],
            json!("INTERNAL_SERVER_ERROR")
        );
    }

    #[tokio::test]
    async fn test_time_slots() {
        let schema = build_schema(ConsultationManager::new(LocalConsultations::default()));
        let response = execute(&schema, "{ timeSlots }").await;
        assert_eq!(
            response["data"]["timeSlots"],
            json!(["9 AM", "10 AM", "1 PM", "2 PM", "3 PM", "4 PM"])
        );
    }
}
