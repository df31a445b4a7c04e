use crate::domain::model::{Booking, BookingStatus, Car, CarStatus, PaymentStatus};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

/// Headline figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_cars: usize,
    pub available_cars: usize,
    pub active_bookings: usize,
    pub total_customers: usize,
    pub monthly_revenue: f64,
    pub pending_bookings: usize,
}

impl DashboardStats {
    /// `month` may be any day of the month to report on.
    pub fn compute(cars: &[Car], bookings: &[Booking], month: NaiveDate) -> Self {
        let active_bookings = bookings
            .iter()
            .filter(|b| matches!(b.status, BookingStatus::Active | BookingStatus::Confirmed))
            .count();

        let customers: HashSet<String> = bookings
            .iter()
            .map(|b| b.customer_email.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let monthly_revenue = bookings
            .iter()
            .filter(|b| {
                b.payment_status == PaymentStatus::Paid
                    && b.status != BookingStatus::Cancelled
                    && b.start_date.year() == month.year()
                    && b.start_date.month() == month.month()
            })
            .map(|b| b.total_price)
            .sum();

        Self {
            total_cars: cars.len(),
            available_cars: cars.iter().filter(|c| c.status == CarStatus::Available).count(),
            active_bookings,
            total_customers: customers.len(),
            monthly_revenue,
            pending_bookings: bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Pending)
                .count(),
        }
    }
}

/// The `limit` most recently created bookings, newest first.
pub fn recent_bookings(bookings: &[Booking], limit: usize) -> Vec<&Booking> {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CarCategory;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn booking(id: &str, email: &str, start: NaiveDate, status: BookingStatus, paid: bool, created_day: u32) -> Booking {
        Booking {
            id: id.to_string(),
            customer_name: "Customer".to_string(),
            customer_email: email.to_string(),
            customer_phone: String::new(),
            car_id: "CAR001".to_string(),
            car_name: "Toyota Camry".to_string(),
            start_date: start,
            end_date: start + chrono::Duration::days(3),
            status,
            total_price: 10000.0,
            payment_status: if paid { PaymentStatus::Paid } else { PaymentStatus::Pending },
            notes: None,
            created_at: day(4, created_day).and_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn car(id: &str, status: CarStatus) -> Car {
        Car {
            id: id.to_string(),
            title: "Car".to_string(),
            category: CarCategory::Economy,
            price: 2000.0,
            price_unit: "day".to_string(),
            features: vec![],
            image: String::new(),
            status,
            description: None,
            year: None,
            mileage: None,
            price_week: None,
            price_month: None,
        }
    }

    #[test]
    fn test_compute_stats() {
        let cars = vec![car("C1", CarStatus::Available), car("C2", CarStatus::Rented)];
        let bookings = vec![
            booking("B1", "ivan@example.com", day(5, 1), BookingStatus::Active, true, 1),
            booking("B2", "IVAN@example.com", day(5, 20), BookingStatus::Confirmed, true, 2),
            booking("B3", "anna@example.com", day(5, 3), BookingStatus::Cancelled, true, 3),
            booking("B4", "oleg@example.com", day(4, 28), BookingStatus::Completed, true, 4),
            booking("B5", "elena@example.com", day(5, 9), BookingStatus::Pending, false, 5),
        ];

        let stats = DashboardStats::compute(&cars, &bookings, day(5, 15));
        assert_eq!(stats.total_cars, 2);
        assert_eq!(stats.available_cars, 1);
        assert_eq!(stats.active_bookings, 2);
        assert_eq!(stats.total_customers, 4);
        // B1 and B2 only: B3 cancelled, B4 in April, B5 unpaid
        assert_eq!(stats.monthly_revenue, 20000.0);
        assert_eq!(stats.pending_bookings, 1);
    }

    #[test]
    fn test_recent_bookings_newest_first() {
        let bookings = vec![
            booking("B1", "a@example.com", day(5, 1), BookingStatus::Active, true, 3),
            booking("B2", "b@example.com", day(5, 1), BookingStatus::Active, true, 9),
            booking("B3", "c@example.com", day(5, 1), BookingStatus::Active, true, 6),
        ];

        let recent: Vec<&str> = recent_bookings(&bookings, 2).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(recent, vec!["B2", "B3"]);
        assert!(recent_bookings(&[], 5).is_empty());
    }
}
