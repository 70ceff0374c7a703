// src/routes/appointment_routes.rs

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{ApiOk, AppState, OkResponse},
    schedule::hhmm,
    schedule::store::{
        Appointment, AppointmentFilter, AppointmentPatch, AppointmentStatus, NewAppointment,
    },
    schedule::view::{DateRange, Granularity, ScheduleGrid},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/appointments/{appointment_id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route("/appointments/{appointment_id}/move", post(move_appointment))
        .route("/appointments/{appointment_id}/status", patch(update_status))
        .route("/schedule", get(get_schedule))
}

/* ============================================================
   Validation helpers
   ============================================================ */

fn validate_patient_id(patient_id: &str) -> Result<(), ApiError> {
    if patient_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "patientId is required".into(),
        ));
    }
    Ok(())
}

fn validate_veterinarian(veterinarian: &str) -> Result<(), ApiError> {
    if veterinarian.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "veterinarian is required".into(),
        ));
    }
    Ok(())
}

fn validate_reason(reason: &str) -> Result<(), ApiError> {
    if reason.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "reason is required".into(),
        ));
    }
    Ok(())
}

fn validate_duration(minutes: u32) -> Result<(), ApiError> {
    if minutes == 0 {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "duration must be greater than 0".into(),
        ));
    }
    Ok(())
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest("VALIDATION_ERROR", format!("{field} must be YYYY-MM-DD"))
    })
}

/// The calendar month containing `start`, as an inclusive range.
fn month_range(start: NaiveDate) -> DateRange {
    let first = start.with_day(1).unwrap();
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1).unwrap()
    };
    DateRange {
        from: first,
        to: next_month - chrono::Duration::days(1),
    }
}

/* ============================================================
   GET /appointments
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    // YYYY-MM-DD bounds, both inclusive
    pub from: Option<String>,
    pub to: Option<String>,
    pub veterinarian: Option<String>,
    pub status: Option<AppointmentStatus>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiOk<Vec<Appointment>>>, ApiError> {
    let from = q.from.as_deref().map(|s| parse_date(s, "from")).transpose()?;
    let to = q.to.as_deref().map(|s| parse_date(s, "to")).transpose()?;
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            return Err(ApiError::BadRequest(
                "VALIDATION_ERROR",
                "to must not be before from".into(),
            ));
        }
    }

    let filter = AppointmentFilter {
        from,
        to,
        provider: q.veterinarian,
        status: q.status,
    };

    // Store order is meaningless; serve chronologically.
    let mut appointments = state.schedule.list(&filter);
    appointments.sort_by(|a, b| {
        (a.date, a.time, a.provider.as_str()).cmp(&(b.date, b.time, b.provider.as_str()))
    });

    Ok(Json(ApiOk { data: appointments }))
}

/* ============================================================
   GET /appointments/{id}
   ============================================================ */

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let appointment = state.schedule.get(appointment_id)?;
    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   POST /appointments (create)
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration: u32,
    pub reason: String,
    pub notes: Option<String>,
    pub veterinarian: String,
    pub status: Option<AppointmentStatus>,
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    validate_patient_id(&req.patient_id)?;
    validate_veterinarian(&req.veterinarian)?;
    validate_reason(&req.reason)?;
    validate_duration(req.duration)?;

    let appointment = state.schedule.create(NewAppointment {
        patient_id: req.patient_id.trim().to_string(),
        date: req.date,
        time: req.time,
        duration_minutes: req.duration,
        provider: req.veterinarian.trim().to_string(),
        reason: req.reason.trim().to_string(),
        notes: req.notes,
        status: req.status,
    })?;

    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   PUT /appointments/{id} (full-field update)
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration: u32,
    pub reason: String,
    pub notes: Option<String>,
    pub veterinarian: String,
    pub status: Option<AppointmentStatus>,
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    validate_patient_id(&req.patient_id)?;
    validate_veterinarian(&req.veterinarian)?;
    validate_reason(&req.reason)?;
    validate_duration(req.duration)?;

    // Full-field semantics: omitted notes clears, omitted status keeps the
    // stored one. Slot and status changes are checked inside the service as
    // one atomic operation.
    let updated = state.schedule.update(
        appointment_id,
        AppointmentPatch {
            patient_id: Some(req.patient_id.trim().to_string()),
            date: Some(req.date),
            time: Some(req.time),
            duration_minutes: Some(req.duration),
            provider: Some(req.veterinarian.trim().to_string()),
            reason: Some(req.reason.trim().to_string()),
            notes: Some(req.notes),
            status: req.status,
        },
    )?;

    Ok(Json(ApiOk { data: updated }))
}

/* ============================================================
   POST /appointments/{id}/move
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct MoveAppointmentRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

pub async fn move_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<MoveAppointmentRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let moved = state
        .schedule
        .move_appointment(appointment_id, req.date, req.time)?;
    Ok(Json(ApiOk { data: moved }))
}

/* ============================================================
   PATCH /appointments/{id}/status
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let updated = state.schedule.transition(appointment_id, req.status)?;
    Ok(Json(ApiOk { data: updated }))
}

/* ============================================================
   DELETE /appointments/{id}
   ============================================================ */

pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    state.schedule.delete(appointment_id)?;
    Ok(Json(OkResponse::ok()))
}

/* ============================================================
   GET /schedule
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    // YYYY-MM-DD
    pub start: String,
    pub granularity: Granularity,
    pub days: Option<i64>,
    pub veterinarian: Option<String>,
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Query(q): Query<ScheduleQuery>,
) -> Result<Json<ApiOk<ScheduleGrid>>, ApiError> {
    let start = parse_date(&q.start, "start")?;

    let range = match q.granularity {
        Granularity::Day => DateRange {
            from: start,
            to: start,
        },
        Granularity::Week => {
            let days = q.days.unwrap_or(7);
            if !(1..=14).contains(&days) {
                return Err(ApiError::BadRequest(
                    "VALIDATION_ERROR",
                    "days must be between 1 and 14".into(),
                ));
            }
            DateRange {
                from: start,
                to: start + chrono::Duration::days(days - 1),
            }
        }
        Granularity::Month => month_range(start),
    };

    let grid = state
        .schedule
        .project(range, q.granularity, q.veterinarian.as_deref());
    Ok(Json(ApiOk { data: grid }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_fields() {
        assert!(validate_patient_id("p1").is_ok());
        assert!(validate_patient_id("").is_err());
        assert!(validate_patient_id("   ").is_err());

        assert!(validate_veterinarian("vet-a").is_ok());
        assert!(validate_veterinarian("").is_err());

        assert!(validate_reason("annual vaccination").is_ok());
        assert!(validate_reason(" ").is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(15).is_ok());
        assert!(validate_duration(0).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-01-10", "from").is_ok());
        assert!(parse_date(" 2025-01-10 ", "from").is_ok());
        assert!(parse_date("10/01/2025", "from").is_err());
        assert!(parse_date("not-a-date", "from").is_err());
    }

    #[test]
    fn test_month_range_covers_whole_month() {
        let range = month_range(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());

        // December rolls into the next year.
        let range = month_range(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        // Leap February.
        let range = month_range(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
