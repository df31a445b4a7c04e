use crate::core::bookings::BookingsApi;
use crate::core::cart::Cart;
use crate::domain::model::{Booking, NewBooking, PaymentMethod};
use crate::utils::error::{RentalError, Result};
use crate::utils::validation::{validate_email, validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    pub fn delivery_address(&self) -> String {
        match self.zip.as_deref().map(str::trim).filter(|z| !z.is_empty()) {
            Some(zip) => format!("{}, {}, {}", self.address.trim(), self.city.trim(), zip),
            None => format!("{}, {}", self.address.trim(), self.city.trim()),
        }
    }
}

impl Validate for CheckoutForm {
    fn validate(&self) -> Result<()> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
        ];
        for (field, value) in required {
            validate_non_empty_string(field, value)
                .map_err(|_| RentalError::validation(format!("Field '{}' is required", field)))?;
        }
        validate_email("email", &self.email)
            .map_err(|_| RentalError::validation(format!("'{}' is not a valid e-mail", self.email)))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub bookings: Vec<Booking>,
    pub total_price: f64,
    pub payment_method: PaymentMethod,
}

/// Turns the cart into one booking per line. The cart is cleared only after
/// every booking was accepted; a failure leaves it as it was.
pub async fn submit(cart: &mut Cart, bookings: &BookingsApi<'_>, form: &CheckoutForm) -> Result<OrderReceipt> {
    if cart.is_empty() {
        return Err(RentalError::EmptyCart);
    }
    form.validate()?;

    let total_price = cart.total_price();
    let customer_name = form.customer_name();
    let delivery_address = form.delivery_address();
    tracing::info!(
        "🛒 Submitting order for {} with {} car(s), total {:.2}",
        customer_name,
        cart.item_count(),
        total_price
    );

    let mut created = Vec::with_capacity(cart.item_count());
    for item in cart.items() {
        let request = NewBooking {
            customer_name: customer_name.clone(),
            customer_email: form.email.trim().to_string(),
            customer_phone: form.phone.trim().to_string(),
            car_id: item.id.clone(),
            car_name: item.title.clone(),
            start_date: item.start_date,
            end_date: item.end_date,
            rental_days: item.rental_days,
            options: item.options,
            total_price: cart.line_total(item),
            payment_method: form.payment_method,
            delivery_address: Some(delivery_address.clone()),
            notes: None,
        };

        match bookings.create(&request).await {
            Ok(booking) => created.push(booking),
            Err(e) => {
                tracing::error!(
                    "❌ Booking for {} failed after {} created: {}",
                    item.id,
                    created.len(),
                    e
                );
                return Err(e);
            }
        }
    }

    cart.clear()?;
    tracing::info!("✅ Order placed, {} booking(s) created", created.len());

    Ok(OrderReceipt {
        bookings: created,
        total_price,
        payment_method: form.payment_method,
    })
}
