use crate::backend::{ConsultationBackend, ConsultationFilter};
use crate::error::BackendError;
use crate::normalize::date_key;
use crate::types::{Consultation, ConsultationAvailability};
use std::collections::HashMap;
use tracing::error;

/// Distinct booked times per day between `start` and `end` (inclusive).
///
/// Days are listed in the order they first appear among the stored rows, not
/// sorted. A day whose rows carry no time is still listed, with a count of 0.
pub fn consultations_availability(
    backend: &dyn ConsultationBackend,
    start: &str,
    end: &str,
) -> Result<Vec<ConsultationAvailability>, BackendError> {
    let consultations = backend
        .find_many(&ConsultationFilter::date_between(start, end), None)
        .map_err(|err| {
            error!(operation = "consultationsAvailability", %err, start, end, "Failed to load booked consultations");
            err
        })?;
    Ok(group_booked_times(&consultations))
}

/// Booked times of a single day in storage order, empty times left out.
pub fn booked_times_for_date(
    backend: &dyn ConsultationBackend,
    date: &str,
) -> Result<Vec<String>, BackendError> {
    let consultations = backend
        .find_many(&ConsultationFilter::date_equals(date), None)
        .map_err(|err| {
            error!(operation = "bookedTimesForDate", %err, date, "Failed to load booked consultations");
            err
        })?;

    Ok(consultations
        .into_iter()
        .filter_map(|consultation| consultation.preferred_time)
        .filter(|preferred_time| !preferred_time.is_empty())
        .collect())
}

fn group_booked_times(consultations: &[Consultation]) -> Vec<ConsultationAvailability> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut days: Vec<(String, Vec<String>)> = Vec::new();

    for consultation in consultations {
        let Some(date) = consultation.select_date.as_ref().and_then(date_key) else {
            continue;
        };
        let position = *positions.entry(date.clone()).or_insert_with(|| {
            days.push((date, Vec::new()));
            days.len() - 1
        });

        if let Some(preferred_time) = consultation
            .preferred_time
            .as_deref()
            .filter(|preferred_time| !preferred_time.is_empty())
        {
            let booked_times = &mut days[position].1;
            if !booked_times.iter().any(|booked| booked == preferred_time) {
                booked_times.push(preferred_time.to_string());
            }
        }
    }

    days.into_iter()
        .map(|(date, booked_times)| ConsultationAvailability {
            date,
            booked_count: i32::try_from(booked_times.len()).unwrap_or(i32::MAX),
            booked_times,
        })
        .collect()
}
