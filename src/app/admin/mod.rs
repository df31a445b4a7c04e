//! Back-office operations. Every type that talks to the API checks for an
//! admin session when constructed.

pub mod bookings;
pub mod cars;
pub mod dashboard;
pub mod export;
pub mod users;

pub use bookings::{BookingAdmin, BookingFilter, Selection};
pub use cars::{CarAdmin, CarFilter};
pub use dashboard::{recent_bookings, DashboardStats};
pub use export::{export_bookings_csv, PrintForm};
pub use users::UserFilter;
