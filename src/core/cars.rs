use crate::core::api::ApiClient;
use crate::domain::model::{Car, CarCategory, CarInput, CarStatus};
use crate::utils::error::Result;
use serde::Serialize;

/// Query string accepted by `GET /cars`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CarQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CarCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CarStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

pub struct CarsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CarsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, params: Option<&CarQuery>) -> Result<Vec<Car>> {
        self.client.get("/cars", params).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Car> {
        self.client.get::<_, ()>(&format!("/cars/{}", id), None).await
    }

    pub async fn create(&self, car: &CarInput) -> Result<Car> {
        tracing::info!("Creating car '{}'", car.title);
        self.client.post("/cars", Some(car)).await
    }

    pub async fn update(&self, id: &str, car: &CarInput) -> Result<Car> {
        tracing::info!("Updating car {}", id);
        self.client.put(&format!("/cars/{}", id), car).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        tracing::info!("Deleting car {}", id);
        self.client.delete(&format!("/cars/{}", id)).await
    }
}

impl ApiClient {
    pub fn cars(&self) -> CarsApi<'_> {
        CarsApi::new(self)
    }
}
