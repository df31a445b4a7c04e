pub mod access;
pub mod api;
pub mod auth;
pub mod bookings;
pub mod cars;
pub mod cart;
pub mod checkout;
pub mod inbox;
pub mod notifications;

pub use access::{require_admin, require_auth};
pub use api::ApiClient;
pub use auth::AuthApi;
pub use bookings::{BookingQuery, BookingsApi};
pub use cars::{CarQuery, CarsApi};
pub use cart::{Cart, OptionRates, RentalPlan};
pub use checkout::{CheckoutForm, OrderReceipt};
pub use inbox::NotificationCenter;
pub use notifications::{NotificationClient, NotificationHandle, NotificationMessage, ReconnectPolicy};
