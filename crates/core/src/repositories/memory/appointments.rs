use super::{apply, touch, MemoryStore, Tables};
use crate::models::{Appointment, AppointmentFilter, NewAppointment, UpdateAppointmentRequest};
use crate::repositories::AppointmentStore;
use crate::DentalResult;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

fn hydrate(tables: &Tables, appointment: &Appointment) -> Appointment {
    Appointment {
        patient_name: tables.patient_name(appointment.patient_id),
        dentist_name: tables
            .user_name(appointment.dentist_id)
            .unwrap_or_default(),
        ..appointment.clone()
    }
}

fn matches(appointment: &Appointment, dentist_id: i64, filter: &AppointmentFilter) -> bool {
    appointment.dentist_id == dentist_id
        && filter.date.map_or(true, |d| appointment.appointment_date == d)
        && filter.status.map_or(true, |s| appointment.status == s)
        && filter.patient_id.map_or(true, |p| appointment.patient_id == p)
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn list(
        &self,
        dentist_id: i64,
        filter: &AppointmentFilter,
    ) -> DentalResult<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| matches(a, dentist_id, filter))
            .map(|a| hydrate(&tables, a))
            .collect();
        appointments.sort_by(|a, b| {
            b.appointment_date
                .cmp(&a.appointment_date)
                .then(a.start_time.cmp(&b.start_time))
                .then(a.id.cmp(&b.id))
        });
        Ok(appointments)
    }

    async fn get(&self, dentist_id: i64, id: i64) -> DentalResult<Option<Appointment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .get(id)
            .filter(|a| a.dentist_id == dentist_id)
            .map(|a| hydrate(&tables, a)))
    }

    async fn create(&self, new: &NewAppointment) -> DentalResult<Appointment> {
        let mut tables = self.tables.write().await;
        tables.require_patient(new.patient_id)?;
        tables.require_user(new.dentist_id)?;

        let now = Utc::now();
        let stored = tables.appointments.insert_with(|id| Appointment {
            id,
            patient_id: new.patient_id,
            dentist_id: new.dentist_id,
            patient_name: String::new(),
            dentist_name: String::new(),
            appointment_date: new.appointment_date,
            start_time: new.start_time,
            end_time: new.end_time,
            status: new.status,
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(hydrate(&tables, &stored))
    }

    async fn update(
        &self,
        dentist_id: i64,
        id: i64,
        patch: &UpdateAppointmentRequest,
    ) -> DentalResult<Option<Appointment>> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables
            .appointments
            .get(id)
            .filter(|a| a.dentist_id == dentist_id)
            .cloned()
        else {
            return Ok(None);
        };
        if let Some(patient_id) = patch.patient_id.value() {
            tables.require_patient(*patient_id)?;
        }

        let mut appointment = current;
        apply("patientId", &patch.patient_id, &mut appointment.patient_id)?;
        apply("appointmentDate", &patch.appointment_date, &mut appointment.appointment_date)?;
        apply("startTime", &patch.start_time, &mut appointment.start_time)?;
        apply("endTime", &patch.end_time, &mut appointment.end_time)?;
        apply("status", &patch.status, &mut appointment.status)?;
        apply("notes", &patch.notes, &mut appointment.notes)?;
        appointment.updated_at = touch(appointment.updated_at);

        if let Some(stored) = tables.appointments.get_mut(id) {
            *stored = appointment.clone();
        }
        Ok(Some(hydrate(&tables, &appointment)))
    }

    async fn delete(&self, dentist_id: i64, id: i64) -> DentalResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .appointments
            .get(id)
            .is_some_and(|a| a.dentist_id == dentist_id);
        Ok(owned && tables.appointments.remove(id))
    }

    async fn count_on(&self, dentist_id: i64, date: NaiveDate) -> DentalResult<i64> {
        let tables = self.tables.read().await;
        let filter = AppointmentFilter::on(date);
        let count = tables
            .appointments
            .values()
            .filter(|a| matches(a, dentist_id, &filter))
            .count();
        Ok(count as i64)
    }
}
