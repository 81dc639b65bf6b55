use crate::backend::{ConsultationBackend, ConsultationFilter, DateFilter};
use crate::error::BackendError;
use crate::normalize::normalize_input_date;
use crate::schema::consultations::{self, dsl};
use crate::types::{Consultation, ConsultationData, DateValue};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::ConnectionError;
use std::sync::{Arc, Mutex};
use tracing::error;
use uuid::Uuid;

#[derive(Queryable, Debug)]
struct ConsultationRow {
    id: Uuid,
    schedule_a_consultation: String,
    select_date: String,
    preferred_time: Option<String>,
    full_name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<ConsultationRow> for Consultation {
    fn from(row: ConsultationRow) -> Self {
        Consultation {
            id: row.id,
            schedule_a_consultation: row.schedule_a_consultation,
            select_date: Some(DateValue::Text(row.select_date)),
            preferred_time: row.preferred_time,
            full_name: row.full_name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = consultations)]
struct NewConsultation<'a> {
    id: Uuid,
    schedule_a_consultation: &'a str,
    select_date: String,
    preferred_time: Option<&'a str>,
    full_name: &'a str,
    email: &'a str,
    created_at: DateTime<Utc>,
}

#[derive(AsChangeset)]
#[diesel(table_name = consultations)]
struct ConsultationChanges<'a> {
    schedule_a_consultation: &'a str,
    select_date: String,
    preferred_time: Option<&'a str>,
    full_name: &'a str,
    email: &'a str,
}

fn stored_date(select_date: &Option<DateValue>) -> String {
    select_date
        .as_ref()
        .map(normalize_input_date)
        .unwrap_or_default()
}

fn map_write_error(err: DieselError) -> BackendError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            BackendError::UniqueViolation
        }
        err => BackendError::Database(err),
    }
}

#[derive(Clone)]
pub struct DatabaseInterface {
    connection: Arc<Mutex<PgConnection>>,
}

impl DatabaseInterface {
    pub fn new(database_url: &str) -> Result<Self, ConnectionError> {
        let connection = Self::establish_connection(database_url)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn establish_connection(database_url: &str) -> Result<PgConnection, ConnectionError> {
        PgConnection::establish(database_url)
    }

    #[cfg(test)]
    fn remove_all_consultations(&self) {
        let mut connection = self.connection.lock().unwrap();
        diesel::delete(consultations::table)
            .execute(&mut *connection)
            .unwrap();
    }
}

impl ConsultationBackend for DatabaseInterface {
    fn find_many(
        &self,
        filter: &ConsultationFilter,
        take: Option<usize>,
    ) -> Result<Vec<Consultation>, BackendError> {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| BackendError::Poisoned)?;

        let mut query = consultations::table
            .order(dsl::created_at.asc())
            .into_boxed();
        match &filter.date {
            Some(DateFilter::Equals(date)) => {
                query = query.filter(dsl::select_date.eq(date.clone()));
            }
            Some(DateFilter::Between { start, end }) => {
                query = query.filter(dsl::select_date.between(start.clone(), end.clone()));
            }
            None => {}
        }
        if let Some(preferred_time) = &filter.preferred_time {
            query = query.filter(dsl::preferred_time.eq(preferred_time.clone()));
        }
        if let Some(take) = take {
            query = query.limit(take as i64);
        }

        let rows = query.load::<ConsultationRow>(&mut *connection)?;
        Ok(rows.into_iter().map(Consultation::from).collect())
    }

    fn find_one(&self, consultation_id: Uuid) -> Result<Option<Consultation>, BackendError> {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| BackendError::Poisoned)?;

        let row = consultations::table
            .find(consultation_id)
            .first::<ConsultationRow>(&mut *connection)
            .optional()?;
        Ok(row.map(Consultation::from))
    }

    fn create(&self, data: ConsultationData) -> Result<Consultation, BackendError> {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| BackendError::Poisoned)?;

        let consultation = NewConsultation {
            id: Uuid::new_v4(),
            schedule_a_consultation: data.schedule_a_consultation.as_deref().unwrap_or_default(),
            select_date: stored_date(&data.select_date),
            preferred_time: data.preferred_time.as_deref(),
            full_name: data.full_name.as_deref().unwrap_or_default(),
            email: data.email.as_deref().unwrap_or_default(),
            created_at: Utc::now(),
        };

        let row = diesel::insert_into(consultations::table)
            .values(&consultation)
            .get_result::<ConsultationRow>(&mut *connection)
            .map_err(|err| {
                error!(%err, "Consultation can't be added");
                map_write_error(err)
            })?;
        Ok(row.into())
    }

    fn update(
        &self,
        consultation_id: Uuid,
        data: ConsultationData,
    ) -> Result<Consultation, BackendError> {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| BackendError::Poisoned)?;

        let Some(row) = consultations::table
            .find(consultation_id)
            .first::<ConsultationRow>(&mut *connection)
            .optional()?
        else {
            return Err(BackendError::NotFound(consultation_id));
        };

        let mut consultation = Consultation::from(row);
        data.apply_to(&mut consultation);
        let changes = ConsultationChanges {
            schedule_a_consultation: &consultation.schedule_a_consultation,
            select_date: stored_date(&consultation.select_date),
            preferred_time: consultation.preferred_time.as_deref(),
            full_name: &consultation.full_name,
            email: &consultation.email,
        };

        let row = diesel::update(consultations::table.find(consultation_id))
            .set(&changes)
            .get_result::<ConsultationRow>(&mut *connection)
            .map_err(|err| {
                error!(%err, "Consultation can't be updated");
                map_write_error(err)
            })?;
        Ok(row.into())
    }
}
