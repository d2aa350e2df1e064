use std::sync::Arc;

use chrono::Utc;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, NewBooking};
use crate::state::AppState;

/// Validates a public submission and creates the booking. Notification mail
/// goes out on a detached task: the submission result depends only on the
/// store write, never on mail delivery.
pub async fn submit_booking(state: &Arc<AppState>, input: NewBooking) -> Result<Booking, AppError> {
    let name = required(input.name, "name")?;
    let email = required(input.email, "email")?;
    let date = required(input.date, "date")?;
    let time = required(input.time, "time")?;
    let service = required(input.service, "service")?;

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        email,
        phone: optional(input.phone),
        date,
        time,
        service,
        notes: optional(input.notes),
        status: BookingStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_booking(&db, &booking)?;
    }

    tracing::info!(booking_id = %booking.id, service = %booking.service, "booking created");

    let task_state = Arc::clone(state);
    let task_booking = booking.clone();
    tokio::spawn(async move {
        task_state.notifier.booking_received(&task_booking).await;
    });

    Ok(booking)
}

pub fn list_bookings(state: &AppState) -> Result<Vec<Booking>, AppError> {
    let db = state.db.lock().unwrap();
    Ok(queries::get_all_bookings(&db)?)
}

/// Any status may be set from any other, including re-setting the current
/// value. The requested status is checked before the record is looked up.
pub fn update_status(
    state: &AppState,
    id: &str,
    new_status: Option<&str>,
) -> Result<Booking, AppError> {
    let raw = new_status.map(str::trim).unwrap_or("");
    let Some(status) = BookingStatus::parse(raw) else {
        return Err(AppError::Validation(format!(
            "invalid status {raw:?}: expected pending, approved or declined"
        )));
    };

    let db = state.db.lock().unwrap();
    match queries::set_booking_status(&db, id, &status)? {
        Some(booking) => {
            tracing::info!(booking_id = %id, status = status.as_str(), "booking status updated");
            Ok(booking)
        }
        None => Err(AppError::NotFound(format!("booking {id} not found"))),
    }
}

pub fn delete_booking(state: &AppState, id: &str) -> Result<(), AppError> {
    let db = state.db.lock().unwrap();
    if !queries::delete_booking(&db, id)? {
        return Err(AppError::NotFound(format!("booking {id} not found")));
    }
    tracing::info!(booking_id = %id, "booking deleted");
    Ok(())
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db;
    use crate::services::notify::Notifier;
    use std::sync::Mutex;

    fn test_state() -> Arc<AppState> {
        let conn = db::init_db(":memory:").unwrap();
        Arc::new(AppState {
            db: Arc::new(Mutex::new(conn)),
            config: AppConfig {
                port: 3000,
                database_url: ":memory:".to_string(),
                admin_password: "pw".to_string(),
                jwt_secret: "secret".to_string(),
                smtp_host: String::new(),
                smtp_port: 587,
                smtp_username: String::new(),
                smtp_password: String::new(),
                from_email: String::new(),
                admin_email: String::new(),
            },
            notifier: Notifier::disabled(),
        })
    }

    fn valid_input() -> NewBooking {
        NewBooking {
            name: Some("Jane".to_string()),
            email: Some("jane@x.com".to_string()),
            phone: None,
            date: Some("2025-06-01".to_string()),
            time: Some("10:00".to_string()),
            service: Some("Notarization".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn submit_creates_pending_booking() {
        let state = test_state();
        let booking = submit_booking(&state, valid_input()).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(!booking.id.is_empty());

        let listed = list_bookings(&state).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, booking.id);
    }

    #[tokio::test]
    async fn submit_assigns_distinct_ids() {
        let state = test_state();
        let first = submit_booking(&state, valid_input()).await.unwrap();
        let second = submit_booking(&state, valid_input()).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn submit_rejects_missing_fields_without_writing() {
        let state = test_state();

        for field in ["name", "email", "date", "time", "service"] {
            let mut input = valid_input();
            match field {
                "name" => input.name = None,
                "email" => input.email = Some("   ".to_string()),
                "date" => input.date = None,
                "time" => input.time = Some(String::new()),
                "service" => input.service = None,
                _ => unreachable!(),
            }

            let err = submit_booking(&state, input).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "field: {field}");
        }

        assert!(list_bookings(&state).unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_trims_and_normalizes_optionals() {
        let state = test_state();
        let mut input = valid_input();
        input.name = Some("  Jane  ".to_string());
        input.phone = Some("   ".to_string());
        input.notes = Some(" bring two witnesses ".to_string());

        let booking = submit_booking(&state, input).await.unwrap();
        assert_eq!(booking.name, "Jane");
        assert_eq!(booking.phone, None);
        assert_eq!(booking.notes.as_deref(), Some("bring two witnesses"));
    }

    #[tokio::test]
    async fn update_status_validates_before_lookup() {
        let state = test_state();

        // Invalid status on a nonexistent id is still a validation error
        let err = update_status(&state, "no-such-id", Some("confirmed")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = update_status(&state, "no-such-id", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = update_status(&state, "no-such-id", Some("approved")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_status_is_idempotent() {
        let state = test_state();
        let booking = submit_booking(&state, valid_input()).await.unwrap();

        let updated = update_status(&state, &booking.id, Some("approved")).unwrap();
        assert_eq!(updated.status, BookingStatus::Approved);

        let again = update_status(&state, &booking.id, Some("approved")).unwrap();
        assert_eq!(again.status, BookingStatus::Approved);

        // Transitions are unrestricted, declined may go back to approved
        let declined = update_status(&state, &booking.id, Some("declined")).unwrap();
        assert_eq!(declined.status, BookingStatus::Declined);
        let reopened = update_status(&state, &booking.id, Some("approved")).unwrap();
        assert_eq!(reopened.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let state = test_state();
        let booking = submit_booking(&state, valid_input()).await.unwrap();

        delete_booking(&state, &booking.id).unwrap();
        assert!(list_bookings(&state).unwrap().is_empty());

        let err = delete_booking(&state, &booking.id).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
