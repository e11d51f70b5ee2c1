//! Ticket issuance rules and QR confirmation rendering.
//!
//! The booking checks are pure functions over counts the repository layer
//! reads under a row lock, so the same rules apply whether or not requests
//! race each other.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Sub-directory of the media root holding rendered QR codes.
pub const QR_DIR: &str = "qrcodes";

/// Smallest edge length (pixels) of a rendered QR image.
const QR_MIN_DIMENSION: u32 = 240;

/// Format of the `booked_at` field inside the QR payload.
const BOOKED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the event `date` field inside the QR payload.
const EVENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

// ---------------------------------------------------------------------------
// Booking rules
// ---------------------------------------------------------------------------

/// Why a booking was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BookingRejection {
    #[error("You already have a ticket for this event!")]
    AlreadyBooked,
    #[error("Sorry, this event is sold out!")]
    SoldOut,
}

impl BookingRejection {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyBooked => "DUPLICATE_TICKET",
            Self::SoldOut => "SOLD_OUT",
        }
    }
}

/// Capacity minus issued tickets. Signed: a restore can leave it negative.
pub fn tickets_left(available_tickets: i32, issued: i64) -> i64 {
    i64::from(available_tickets) - issued
}

/// Decide whether a booking may proceed.
///
/// The duplicate check runs first, so a holder of the last ticket is told they
/// already have one rather than that the event is sold out.
pub fn check_booking(
    already_booked: bool,
    available_tickets: i32,
    issued: i64,
) -> Result<(), BookingRejection> {
    if already_booked {
        return Err(BookingRejection::AlreadyBooked);
    }
    if tickets_left(available_tickets, issued) <= 0 {
        return Err(BookingRejection::SoldOut);
    }
    Ok(())
}

/// An event is free when its price is exactly zero.
pub fn is_free(ticket_price: f64) -> bool {
    ticket_price == 0.0
}

// ---------------------------------------------------------------------------
// QR payload
// ---------------------------------------------------------------------------

/// JSON document encoded into a ticket's QR image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrPayload {
    pub username: String,
    pub enrollment_no: Option<String>,
    pub event: String,
    pub date: String,
    pub booked_at: String,
}

impl QrPayload {
    pub fn new(
        username: &str,
        enrollment_no: Option<&str>,
        event_title: &str,
        event_starts_at: Option<Timestamp>,
        booked_at: Timestamp,
    ) -> Self {
        Self {
            username: username.to_string(),
            enrollment_no: enrollment_no.map(str::to_string),
            event: event_title.to_string(),
            date: event_starts_at
                .map(|d| d.format(EVENT_DATE_FORMAT).to_string())
                .unwrap_or_else(|| "Not scheduled".to_string()),
            booked_at: booked_at.format(BOOKED_AT_FORMAT).to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Internal(format!("QR payload serialization failed: {e}")))
    }
}

/// Encode the payload as a QR code and return PNG bytes.
pub fn render_qr_png(payload: &QrPayload) -> Result<Vec<u8>, CoreError> {
    let json = payload.to_json()?;
    let code = QrCode::new(json.as_bytes())
        .map_err(|e| CoreError::Internal(format!("QR encoding failed: {e}")))?;

    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CoreError::Internal(format!("QR PNG encoding failed: {e}")))?;
    Ok(png)
}

/// Download name offered for a ticket's QR image: `qr_<username>_<event_id>.png`.
///
/// Characters outside `[A-Za-z0-9._-]` in the username become `_`, so the name
/// is always a valid header value. Not unique; never used as a storage path.
pub fn qr_download_name(username: &str, event_id: DbId) -> String {
    let safe: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("qr_{safe}_{event_id}.png")
}

/// Media-relative storage path of a ticket's QR image: `qrcodes/qr_<ticket_id>.png`.
///
/// Keyed by ticket id, so no two tickets ever share a file.
pub fn qr_relative_path(ticket_id: DbId) -> String {
    format!("{QR_DIR}/qr_{ticket_id}.png")
}
