use crate::availability;
use crate::backend::{ConsultationBackend, ConsultationFilter};
use crate::booking_validation::{validate_input, ValidationContext};
use crate::error::{BackendError, BookingError};
use crate::types::{
    Consultation, ConsultationAvailability, ConsultationCreateInput, ConsultationData,
    ConsultationUpdateInput, Operation, ALREADY_BOOKED_MESSAGE,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

#[derive(Clone)]
pub struct ConsultationManager {
    backend: Arc<dyn ConsultationBackend>,
}

fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_values()
        .flat_map(|field_errors| field_errors.iter())
        .filter_map(|field_error| field_error.message.as_ref().map(|message| message.to_string()))
        .collect();
    messages.sort();
    messages
}

fn reject_taken_slot(err: BackendError) -> BookingError {
    match err {
        BackendError::UniqueViolation => BookingError::Validation(vec![ALREADY_BOOKED_MESSAGE.into()]),
        err => err.into(),
    }
}

impl ConsultationManager {
    pub fn new(backend: impl ConsultationBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn create(&self, input: ConsultationCreateInput) -> Result<Consultation, BookingError> {
        input
            .validate()
            .map_err(|errors| BookingError::Validation(validation_messages(&errors)))?;

        let mut data = ConsultationData::from(input);
        self.run_hooks(&Operation::Create, &mut data)?;

        let consultation = self.backend.create(data).map_err(reject_taken_slot)?;
        info!(id = %consultation.id, "Consultation booked");
        Ok(consultation)
    }

    pub fn update(
        &self,
        id: Uuid,
        input: ConsultationUpdateInput,
    ) -> Result<Consultation, BookingError> {
        input
            .validate()
            .map_err(|errors| BookingError::Validation(validation_messages(&errors)))?;

        let item = self.backend.find_one(id)?.ok_or(BookingError::NotFound(id))?;
        let mut data = ConsultationData::from(input);
        self.run_hooks(&Operation::Update { item }, &mut data)?;

        let consultation = self.backend.update(id, data).map_err(reject_taken_slot)?;
        info!(id = %consultation.id, "Consultation updated");
        Ok(consultation)
    }

    pub fn find(&self, id: Uuid) -> Result<Option<Consultation>, BookingError> {
        Ok(self.backend.find_one(id)?)
    }

    pub fn list(&self) -> Result<Vec<Consultation>, BookingError> {
        self.backend
            .find_many(&ConsultationFilter::default(), None)
            .map_err(|err| {
                error!(operation = "consultations", %err, "Failed to load consultations");
                err.into()
            })
    }

    pub fn availability(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<ConsultationAvailability>, BackendError> {
        availability::consultations_availability(self.backend.as_ref(), start, end)
    }

    pub fn booked_times_for_date(&self, date: &str) -> Result<Vec<String>, BackendError> {
        availability::booked_times_for_date(self.backend.as_ref(), date)
    }

    fn run_hooks(
        &self,
        operation: &Operation,
        data: &mut ConsultationData,
    ) -> Result<(), BookingError> {
        let mut context = ValidationContext::default();
        validate_input(self.backend.as_ref(), operation, data, &mut context)?;
        context.into_result()
    }
}
