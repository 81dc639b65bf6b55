use crate::error::BackendError;
use crate::normalize::date_key;
use crate::types::{Consultation, ConsultationData};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    Equals(String),
    /// Inclusive on both ends.
    Between { start: String, end: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultationFilter {
    pub date: Option<DateFilter>,
    pub preferred_time: Option<String>,
}

impl ConsultationFilter {
    pub fn date_equals(date: impl Into<String>) -> Self {
        Self {
            date: Some(DateFilter::Equals(date.into())),
            preferred_time: None,
        }
    }

    pub fn date_between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            date: Some(DateFilter::Between {
                start: start.into(),
                end: end.into(),
            }),
            preferred_time: None,
        }
    }

    pub fn with_preferred_time(mut self, preferred_time: impl Into<String>) -> Self {
        self.preferred_time = Some(preferred_time.into());
        self
    }

    /// In-process evaluation, comparing stored dates by their canonical day.
    pub fn matches(&self, consultation: &Consultation) -> bool {
        if let Some(date_filter) = &self.date {
            let Some(key) = consultation.select_date.as_ref().and_then(date_key) else {
                return false;
            };
            let in_range = match date_filter {
                DateFilter::Equals(date) => key == *date,
                DateFilter::Between { start, end } => key >= *start && key <= *end,
            };
            if !in_range {
                return false;
            }
        }
        if let Some(preferred_time) = &self.preferred_time {
            if consultation.preferred_time.as_ref() != Some(preferred_time) {
                return false;
            }
        }
        true
    }
}

/// Storage for consultation bookings. Rows come back in creation order.
///
/// Implementations reject a second row with the same date and preferred
/// time with [`BackendError::UniqueViolation`].
pub trait ConsultationBackend: Send + Sync + 'static {
    fn find_many(
        &self,
        filter: &ConsultationFilter,
        take: Option<usize>,
    ) -> Result<Vec<Consultation>, BackendError>;
    fn find_one(&self, id: Uuid) -> Result<Option<Consultation>, BackendError>;
    fn create(&self, data: ConsultationData) -> Result<Consultation, BackendError>;
    fn update(&self, id: Uuid, data: ConsultationData) -> Result<Consultation, BackendError>;
}
