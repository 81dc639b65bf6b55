use crate::{
    backend::{ConsultationBackend, ConsultationFilter},
    error::BackendError,
    normalize::date_key,
    types::{Consultation, ConsultationData},
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};
use uuid::Uuid;

/// Impersistent backend used when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalConsultations {
    consultations: Arc<Mutex<Vec<Consultation>>>,
}

impl LocalConsultations {
    fn slot_taken(consultations: &[Consultation], candidate: &Consultation) -> bool {
        let (Some(date), Some(preferred_time)) = (
            candidate.select_date.as_ref().and_then(date_key),
            candidate.preferred_time.as_ref(),
        ) else {
            return false;
        };
        consultations.iter().any(|consultation| {
            consultation.id != candidate.id
                && consultation.preferred_time.as_ref() == Some(preferred_time)
                && consultation.select_date.as_ref().and_then(date_key).as_ref() == Some(&date)
        })
    }
}

impl ConsultationBackend for LocalConsultations {
    fn find_many(
        &self,
        filter: &ConsultationFilter,
        take: Option<usize>,
    ) -> Result<Vec<Consultation>, BackendError> {
        let consultations = self
            .consultations
            .lock()
            .map_err(|_| BackendError::Poisoned)?;

        Ok(consultations
            .iter()
            .filter(|consultation| filter.matches(consultation))
            .take(take.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn find_one(&self, id: Uuid) -> Result<Option<Consultation>, BackendError> {
        let consultations = self
            .consultations
            .lock()
            .map_err(|_| BackendError::Poisoned)?;
        Ok(consultations
            .iter()
            .find(|consultation| consultation.id == id)
            .cloned())
    }

    fn create(&self, data: ConsultationData) -> Result<Consultation, BackendError> {
        let mut consultation = Consultation {
            id: Uuid::new_v4(),
            schedule_a_consultation: String::new(),
            select_date: None,
            preferred_time: None,
            full_name: String::new(),
            email: String::new(),
            created_at: Utc::now(),
        };
        data.apply_to(&mut consultation);

        let mut consultations = self
            .consultations
            .lock()
            .map_err(|_| BackendError::Poisoned)?;
        if Self::slot_taken(&consultations, &consultation) {
            let err = BackendError::UniqueViolation;
            error!(%err, "Consultation can't be added");
            return Err(err);
        }
        debug!(id = %consultation.id, "Consultation added");
        consultations.push(consultation.clone());
        Ok(consultation)
    }

    fn update(&self, id: Uuid, data: ConsultationData) -> Result<Consultation, BackendError> {
        let mut consultations = self
            .consultations
            .lock()
            .map_err(|_| BackendError::Poisoned)?;
        let Some(index) = consultations
            .iter()
            .position(|consultation| consultation.id == id)
        else {
            let err = BackendError::NotFound(id);
            error!(%err, "Consultation can't be updated");
            return Err(err);
        };

        let mut updated = consultations[index].clone();
        data.apply_to(&mut updated);
        if Self::slot_taken(&consultations, &updated) {
            let err = BackendError::UniqueViolation;
            error!(%err, "Consultation can't be updated");
            return Err(err);
        }
        consultations[index] = updated.clone();
        Ok(updated)
    }
}
