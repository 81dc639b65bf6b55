//! Pre-write check that keeps a date and time slot from being booked twice.
//!
//! The check queries storage before the write happens, so two concurrent
//! writes can both pass it. Storage backends enforce the same rule with a
//! uniqueness constraint; this check exists to report a readable message.

use crate::backend::{ConsultationBackend, ConsultationFilter};
use crate::error::{BackendError, BookingError};
use crate::normalize::{normalize_input_date, normalize_preferred_time};
use crate::types::{Consultation, ConsultationData, DateValue, Operation, ALREADY_BOOKED_MESSAGE};
use tracing::{debug, error};

/// Collects rejections of the current write without aborting the hook.
#[derive(Debug, Default)]
pub struct ValidationContext {
    errors: Vec<String>,
}

impl ValidationContext {
    pub fn add_validation_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), BookingError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BookingError::Validation(self.errors))
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn date_changed(resolved: &Option<DateValue>, item: &Consultation) -> bool {
    match resolved.as_ref().map(normalize_input_date).and_then(non_empty) {
        Some(date) => item.select_date.as_ref().map(normalize_input_date) != Some(date),
        None => false,
    }
}

fn time_changed(resolved: &Option<String>, item: &Consultation) -> bool {
    match resolved
        .as_deref()
        .map(normalize_preferred_time)
        .and_then(non_empty)
    {
        Some(time) => item.preferred_time.as_ref() != Some(&time),
        None => false,
    }
}

/// Normalizes the date and time of a pending write and reports a validation
/// error when another consultation already holds that slot.
///
/// The time is normalized on every write. Updates that leave both date and
/// time untouched are not checked. The check itself needs both values present
/// on `resolved_data`.
pub fn validate_input(
    backend: &dyn ConsultationBackend,
    operation: &Operation,
    resolved_data: &mut ConsultationData,
    context: &mut ValidationContext,
) -> Result<(), BackendError> {
    let should_check = match operation {
        Operation::Create => true,
        Operation::Update { item } => {
            date_changed(&resolved_data.select_date, item)
                || time_changed(&resolved_data.preferred_time, item)
        }
    };

    // stored times are compared verbatim, so every write carries the canonical form
    let time = resolved_data
        .preferred_time
        .as_deref()
        .map(normalize_preferred_time)
        .and_then(non_empty);
    if let Some(time) = &time {
        resolved_data.preferred_time = Some(time.clone());
    }

    if !should_check {
        return Ok(());
    }

    let date = resolved_data
        .select_date
        .as_ref()
        .map(normalize_input_date)
        .and_then(non_empty);

    let (Some(date), Some(time)) = (date, time) else {
        return Ok(());
    };
    resolved_data.select_date = Some(DateValue::Text(date.clone()));

    let filter = ConsultationFilter::date_equals(date.as_str()).with_preferred_time(time.as_str());
    let existing = backend.find_many(&filter, Some(1)).map_err(|err| {
        error!(operation = "Consultation.validateInput", %err, "Failed to look up booked consultations");
        err
    })?;

    if !existing.is_empty() {
        debug!(%date, %time, "Slot already booked");
        context.add_validation_error(ALREADY_BOOKED_MESSAGE);
    }
    Ok(())
}
