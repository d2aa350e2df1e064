pub mod smtp;

use async_trait::async_trait;

use crate::models::Booking;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Best-effort outbound mail on booking creation. Constructed once at startup
/// and injected through `AppState`; with no provider configured every call is
/// a silent no-op. Failures are logged here and never reach the caller.
pub struct Notifier {
    provider: Option<Box<dyn EmailProvider>>,
    admin_email: String,
}

impl Notifier {
    pub fn new(provider: Option<Box<dyn EmailProvider>>, admin_email: String) -> Self {
        Self {
            provider,
            admin_email,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, String::new())
    }

    pub async fn booking_received(&self, booking: &Booking) {
        let Some(provider) = &self.provider else {
            tracing::info!("email not configured, skipping booking notifications");
            return;
        };

        if let Err(e) = provider
            .send_email(
                &booking.email,
                "Appointment request received",
                &client_email_body(booking),
            )
            .await
        {
            tracing::error!(error = %e, booking_id = %booking.id, "failed to email client");
        }

        if self.admin_email.is_empty() {
            tracing::warn!("admin email not configured, skipping admin notification");
            return;
        }

        if let Err(e) = provider
            .send_email(
                &self.admin_email,
                "New booking request",
                &admin_email_body(booking),
            )
            .await
        {
            tracing::error!(error = %e, booking_id = %booking.id, "failed to email admin");
        }
    }
}

fn client_email_body(booking: &Booking) -> String {
    format!(
        "Hi {name},\n\n\
         Thank you for submitting an appointment request.\n\n\
         Details:\n\
         - Service: {service}\n\
         - Preferred date: {date}\n\
         - Preferred time: {time}\n\
         - Notes: {notes}\n\n\
         Your request is currently in status: {status}.\n\
         We will review it and confirm by email or phone.\n\n\
         If this was not you, please ignore this message.",
        name = booking.name,
        service = booking.service,
        date = booking.date,
        time = booking.time,
        notes = booking.notes.as_deref().unwrap_or("None provided"),
        status = booking.status.as_str(),
    )
}

fn admin_email_body(booking: &Booking) -> String {
    format!(
        "New booking request:\n\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Service: {service}\n\
         Date: {date}\n\
         Time: {time}\n\
         Notes: {notes}\n\n\
         Log in to the admin panel to approve, decline or remove this request.",
        name = booking.name,
        email = booking.email,
        phone = booking.phone.as_deref().unwrap_or("N/A"),
        service = booking.service,
        date = booking.date,
        time = booking.time,
        notes = booking.notes.as_deref().unwrap_or("None"),
    )
}
