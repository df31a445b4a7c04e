use crate::domain::model::Booking;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;

/// Rental length as printed on contracts: at least one day.
pub fn rental_days(booking: &Booking) -> u32 {
    let days = (booking.end_date - booking.start_date).num_days();
    days.max(1) as u32
}

pub fn daily_rate(booking: &Booking) -> f64 {
    (booking.total_price / f64::from(rental_days(booking))).round()
}

/// Figures shown on the printable contract and invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintForm {
    pub booking_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub car_name: String,
    pub start_date: String,
    pub end_date: String,
    pub rental_days: u32,
    pub daily_rate: f64,
    pub total_price: f64,
    pub status: String,
    pub payment_status: String,
}

impl PrintForm {
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id.clone(),
            customer_name: booking.customer_name.clone(),
            customer_email: booking.customer_email.clone(),
            customer_phone: booking.customer_phone.clone(),
            car_name: booking.car_name.clone(),
            start_date: booking.start_date.format("%d.%m.%Y").to_string(),
            end_date: booking.end_date.format("%d.%m.%Y").to_string(),
            rental_days: rental_days(booking),
            daily_rate: daily_rate(booking),
            total_price: booking.total_price,
            status: booking.status.label().to_string(),
            payment_status: booking.payment_status.label().to_string(),
        }
    }
}

/// Column names, in `PrintForm` field order.
pub const EXPORT_HEADERS: [&str; 12] = [
    "bookingId",
    "customerName",
    "customerEmail",
    "customerPhone",
    "carName",
    "startDate",
    "endDate",
    "rentalDays",
    "dailyRate",
    "totalPrice",
    "status",
    "paymentStatus",
];

/// Writes a header line and then one row per booking; returns the row count.
/// The header is written even when there is nothing to export.
pub fn export_bookings_csv<W: Write>(bookings: &[Booking], writer: W) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;
    for booking in bookings {
        csv_writer.serialize(PrintForm::from_booking(booking))?;
    }
    csv_writer.flush()?;
    tracing::info!("📊 Exported {} booking(s) to CSV", bookings.len());
    Ok(bookings.len())
}
