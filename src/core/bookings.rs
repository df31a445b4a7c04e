use crate::core::api::ApiClient;
use crate::domain::model::{Booking, BookingStatus, BookingUpdate, NewBooking};
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::Serialize;

/// Query string accepted by `GET /bookings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CancelRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

pub struct BookingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> BookingsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, params: Option<&BookingQuery>) -> Result<Vec<Booking>> {
        self.client.get("/bookings", params).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Booking> {
        self.client.get::<_, ()>(&format!("/bookings/{}", id), None).await
    }

    pub async fn create(&self, booking: &NewBooking) -> Result<Booking> {
        tracing::info!("Creating booking for car {} ({})", booking.car_id, booking.customer_email);
        self.client.post("/bookings", Some(booking)).await
    }

    pub async fn update(&self, id: &str, update: &BookingUpdate) -> Result<Booking> {
        tracing::info!("Updating booking {}", id);
        self.client.put(&format!("/bookings/{}", id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        tracing::info!("Deleting booking {}", id);
        self.client.delete(&format!("/bookings/{}", id)).await
    }

    pub async fn confirm_booking(&self, id: &str) -> Result<serde_json::Value> {
        tracing::info!("Confirming booking {}", id);
        self.client
            .post::<_, ()>(&format!("/bookings/{}/confirm", id), None)
            .await
    }

    pub async fn cancel_booking(&self, id: &str, reason: Option<&str>) -> Result<serde_json::Value> {
        tracing::info!("Cancelling booking {}", id);
        let body = CancelRequest { reason };
        self.client
            .post(&format!("/bookings/{}/cancel", id), Some(&body))
            .await
    }
}

impl ApiClient {
    pub fn bookings(&self) -> BookingsApi<'_> {
        BookingsApi::new(self)
    }
}
