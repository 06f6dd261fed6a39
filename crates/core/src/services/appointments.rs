use super::{found, non_null, optional_text, removed, text_patch};
use crate::clock;
use crate::models::{
    Appointment, AppointmentFilter, CreateAppointmentRequest, NewAppointment, TimeOfDay,
    UpdateAppointmentRequest,
};
use crate::repositories::{AppointmentStore, Datastore};
use crate::{DentalError, DentalResult};
use chrono::NaiveDate;
use std::sync::Arc;

/// Appointments of the calling dentist. Every operation takes the caller's user id and never
/// sees another dentist's rows.
#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentStore>,
}

impl AppointmentService {
    pub fn new(store: &Datastore) -> Self {
        Self {
            appointments: store.appointments.clone(),
        }
    }

    pub async fn list(
        &self,
        dentist_id: i64,
        filter: &AppointmentFilter,
    ) -> DentalResult<Vec<Appointment>> {
        self.appointments.list(dentist_id, filter).await
    }

    /// Today's appointments by start time.
    pub async fn today(&self, dentist_id: i64) -> DentalResult<Vec<Appointment>> {
        self.appointments
            .list(dentist_id, &AppointmentFilter::on(clock::today()))
            .await
    }

    pub async fn get(&self, dentist_id: i64, id: i64) -> DentalResult<Appointment> {
        found("Appointment", self.appointments.get(dentist_id, id).await?)
    }

    pub async fn create(
        &self,
        dentist_id: i64,
        req: CreateAppointmentRequest,
    ) -> DentalResult<Appointment> {
        check_not_past(req.appointment_date, clock::today())?;
        check_order(req.start_time, req.end_time)?;

        let appointment = self
            .appointments
            .create(&NewAppointment {
                patient_id: req.patient_id,
                dentist_id,
                appointment_date: req.appointment_date,
                start_time: req.start_time,
                end_time: req.end_time,
                status: req.status.unwrap_or_default(),
                notes: optional_text(req.notes),
            })
            .await?;
        tracing::info!(appointment_id = appointment.id, dentist_id, "booked appointment");
        Ok(appointment)
    }

    /// Checks the time window against the stored row, so changing only one end still keeps
    /// the start before the end.
    pub async fn update(
        &self,
        dentist_id: i64,
        id: i64,
        req: UpdateAppointmentRequest,
    ) -> DentalResult<Appointment> {
        non_null("patientId", &req.patient_id)?;
        non_null("appointmentDate", &req.appointment_date)?;
        non_null("startTime", &req.start_time)?;
        non_null("endTime", &req.end_time)?;
        non_null("status", &req.status)?;

        let current = self.get(dentist_id, id).await?;
        if let Some(date) = req.appointment_date.value() {
            check_not_past(*date, clock::today())?;
        }
        let start = req.start_time.value().copied().unwrap_or(current.start_time);
        let end = req.end_time.value().copied().unwrap_or(current.end_time);
        check_order(start, end)?;

        let patch = UpdateAppointmentRequest {
            notes: text_patch(&req.notes),
            ..req
        };
        found(
            "Appointment",
            self.appointments.update(dentist_id, id, &patch).await?,
        )
    }

    pub async fn delete(&self, dentist_id: i64, id: i64) -> DentalResult<()> {
        removed("Appointment", self.appointments.delete(dentist_id, id).await?)
    }
}

impl std::fmt::Debug for AppointmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppointmentService").finish_non_exhaustive()
    }
}

fn check_not_past(date: NaiveDate, today: NaiveDate) -> DentalResult<()> {
    if date < today {
        return Err(DentalError::validation(
            "appointmentDate cannot be in the past",
        ));
    }
    Ok(())
}

fn check_order(start: TimeOfDay, end: TimeOfDay) -> DentalResult<()> {
    if end <= start {
        return Err(DentalError::validation("endTime must be after startTime"));
    }
    Ok(())
}
