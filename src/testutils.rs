use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::Utc;
use diesel::result::Error as DieselError;
use uuid::Uuid;

use crate::{
    backend::{ConsultationBackend, ConsultationFilter},
    error::BackendError,
    types::{Consultation, ConsultationData, DateValue},
};

/// Returns every stored row from `find_many` regardless of the filter, so
/// tests control exactly what a query sees.
pub struct MockConsultationBackendInner {
    pub success: AtomicBool,
    pub calls_to_find_many: AtomicU64,
    pub calls_to_find_one: AtomicU64,
    pub calls_to_create: AtomicU64,
    pub calls_to_update: AtomicU64,
    pub consultations: Mutex<Vec<Consultation>>,
    pub last_query: Mutex<Option<(ConsultationFilter, Option<usize>)>>,
}

#[derive(Clone)]
pub struct MockConsultationBackend(pub Arc<MockConsultationBackendInner>);

impl MockConsultationBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_find_many: AtomicU64::default(),
            calls_to_find_one: AtomicU64::default(),
            calls_to_create: AtomicU64::default(),
            calls_to_update: AtomicU64::default(),
            consultations: Mutex::default(),
            last_query: Mutex::default(),
        }
    }
}

impl MockConsultationBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockConsultationBackendInner::new()))
    }

    pub fn with_consultations(consultations: Vec<Consultation>) -> Self {
        let mock_backend = Self::new();
        *mock_backend.0.consultations.lock().unwrap() = consultations;
        mock_backend
    }

    fn result(&self) -> Result<(), BackendError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BackendError::Database(DieselError::QueryBuilderError(
                "Supposed to fail".into(),
            ))),
        }
    }
}

impl ConsultationBackend for MockConsultationBackend {
    fn find_many(
        &self,
        filter: &ConsultationFilter,
        take: Option<usize>,
    ) -> Result<Vec<Consultation>, BackendError> {
        self.0.calls_to_find_many.fetch_add(1, Ordering::SeqCst);
        *self.0.last_query.lock().unwrap() = Some((filter.clone(), take));
        self.result()?;
        Ok(self.0.consultations.lock().unwrap().clone())
    }

    fn find_one(&self, id: Uuid) -> Result<Option<Consultation>, BackendError> {
        self.0.calls_to_find_one.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(self
            .0
            .consultations
            .lock()
            .unwrap()
            .iter()
            .find(|consultation| consultation.id == id)
            .cloned())
    }

    fn create(&self, data: ConsultationData) -> Result<Consultation, BackendError> {
        self.0.calls_to_create.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        let mut created = consultation(None, None);
        data.apply_to(&mut created);
        self.0.consultations.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn update(&self, id: Uuid, data: ConsultationData) -> Result<Consultation, BackendError> {
        self.0.calls_to_update.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        let mut consultations = self.0.consultations.lock().unwrap();
        let stored = consultations
            .iter_mut()
            .find(|consultation| consultation.id == id)
            .ok_or(BackendError::NotFound(id))?;
        data.apply_to(stored);
        Ok(stored.clone())
    }
}

pub fn consultation(select_date: Option<DateValue>, preferred_time: Option<&str>) -> Consultation {
    Consultation {
        id: Uuid::new_v4(),
        schedule_a_consultation: "Free 30-minute Consultation".into(),
        select_date,
        preferred_time: preferred_time.map(String::from),
        full_name: "Stefan".into(),
        email: "stefan@example.com".into(),
        created_at: Utc::now(),
    }
}
