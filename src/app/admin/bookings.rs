use crate::core::access::require_admin;
use crate::core::api::ApiClient;
use crate::core::bookings::BookingQuery;
use crate::domain::model::{Booking, BookingStatus, BookingUpdate};
use crate::utils::error::Result;
use chrono::NaiveDate;

const ROUTE: &str = "/admin/bookings";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    /// Case-insensitive match on booking id, customer name or car name.
    pub search: Option<String>,
    pub status: Option<BookingStatus>,
    /// Keeps bookings whose rental period covers this day (both ends inclusive).
    pub date: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(term) = self.search.as_deref().map(str::to_lowercase) {
            let hit = booking.id.to_lowercase().contains(&term)
                || booking.customer_name.to_lowercase().contains(&term)
                || booking.car_name.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }

        match self.date {
            Some(day) => booking.start_date <= day && day <= booking.end_date,
            None => true,
        }
    }

    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        bookings.iter().filter(|b| self.matches(b)).collect()
    }
}

pub fn apply_status_change(bookings: &mut [Booking], id: &str, status: BookingStatus) -> bool {
    match bookings.iter_mut().find(|b| b.id == id) {
        Some(booking) => {
            booking.status = status;
            true
        }
        None => false,
    }
}

/// Returns how many bookings changed.
pub fn apply_bulk_status_change(bookings: &mut [Booking], ids: &[String], status: BookingStatus) -> usize {
    let mut changed = 0;
    for booking in bookings.iter_mut().filter(|b| ids.contains(&b.id)) {
        booking.status = status;
        changed += 1;
    }
    changed
}

/// Marks the booking cancelled and appends the reason to its notes.
pub fn apply_cancellation(booking: &mut Booking, reason: &str) {
    booking.status = BookingStatus::Cancelled;
    let line = format!("Cancelled: {}", reason);
    booking.notes = Some(match booking.notes.take() {
        Some(notes) if !notes.is_empty() => format!("{}\n{}", notes, line),
        _ => line,
    });
}

/// Ids ticked in the bookings table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.to_string());
        }
    }

    /// Selects every visible booking, or clears the selection when all of them
    /// are already selected.
    pub fn toggle_all(&mut self, visible: &[&Booking]) {
        if self.ids.len() == visible.len() {
            self.ids.clear();
        } else {
            self.ids = visible.iter().map(|b| b.id.clone()).collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[derive(Debug, Default)]
pub struct BulkUpdateReport {
    pub updated: Vec<Booking>,
    pub failed: Vec<(String, String)>,
}

/// Booking management for administrators; construction checks the session.
pub struct BookingAdmin<'a> {
    client: &'a ApiClient,
}

impl<'a> BookingAdmin<'a> {
    pub fn new(client: &'a ApiClient) -> Result<Self> {
        require_admin(&client.auth(), ROUTE)?;
        Ok(Self { client })
    }

    pub async fn list(&self, query: Option<&BookingQuery>, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let bookings = self.client.bookings().get_all(query).await?;
        let total = bookings.len();
        let visible: Vec<Booking> = bookings.into_iter().filter(|b| filter.matches(b)).collect();
        tracing::debug!("{} of {} bookings match the filter", visible.len(), total);
        Ok(visible)
    }

    pub async fn confirm(&self, id: &str) -> Result<serde_json::Value> {
        self.client.bookings().confirm_booking(id).await
    }

    pub async fn cancel(&self, id: &str, reason: &str) -> Result<serde_json::Value> {
        let reason = reason.trim();
        let reason = if reason.is_empty() { None } else { Some(reason) };
        self.client.bookings().cancel_booking(id, reason).await
    }

    pub async fn set_status(&self, id: &str, status: BookingStatus) -> Result<Booking> {
        let update = BookingUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.client.bookings().update(id, &update).await
    }

    /// Applies `status` to each id in turn; failures are collected, not fatal.
    pub async fn bulk_set_status(&self, ids: &[String], status: BookingStatus) -> BulkUpdateReport {
        let mut report = BulkUpdateReport::default();
        for id in ids {
            match self.set_status(id, status).await {
                Ok(booking) => report.updated.push(booking),
                Err(e) => {
                    tracing::error!("Error updating booking {}: {}", id, e);
                    report.failed.push((id.clone(), e.user_friendly_message()));
                }
            }
        }
        tracing::info!(
            "Bulk status change to '{}': {} updated, {} failed",
            status.label(),
            report.updated.len(),
            report.failed.len()
        );
        report
    }
}
