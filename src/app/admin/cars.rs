use crate::core::access::require_admin;
use crate::core::api::ApiClient;
use crate::core::cars::CarQuery;
use crate::domain::model::{Car, CarCategory, CarInput, CarStatus};
use crate::utils::error::{RentalError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};

const ROUTE: &str = "/admin/cars";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarFilter {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub category: Option<CarCategory>,
    pub status: Option<CarStatus>,
}

impl CarFilter {
    pub fn matches(&self, car: &Car) -> bool {
        let title_ok = match self.search.as_deref() {
            Some(term) => car.title.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        };
        title_ok
            && self.category.map_or(true, |c| car.category == c)
            && self.status.map_or(true, |s| car.status == s)
    }

    pub fn apply<'a>(&self, cars: &'a [Car]) -> Vec<&'a Car> {
        cars.iter().filter(|c| self.matches(c)).collect()
    }
}

impl Validate for CarInput {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(RentalError::validation(format!(
                "Price must be a positive amount, got {}",
                self.price
            )));
        }
        validate_non_empty_string("price_unit", &self.price_unit)?;
        Ok(())
    }
}

/// Fleet management for administrators.
pub struct CarAdmin<'a> {
    client: &'a ApiClient,
}

impl<'a> CarAdmin<'a> {
    pub fn new(client: &'a ApiClient) -> Result<Self> {
        require_admin(&client.auth(), ROUTE)?;
        Ok(Self { client })
    }

    pub async fn list(&self, query: Option<&CarQuery>, filter: &CarFilter) -> Result<Vec<Car>> {
        let cars = self.client.cars().get_all(query).await?;
        Ok(cars.into_iter().filter(|c| filter.matches(c)).collect())
    }

    pub async fn create(&self, input: &CarInput) -> Result<Car> {
        input.validate()?;
        let car = self.client.cars().create(input).await?;
        tracing::info!("✅ Car '{}' added as {}", car.title, car.id);
        Ok(car)
    }

    pub async fn update(&self, id: &str, input: &CarInput) -> Result<Car> {
        input.validate()?;
        self.client.cars().update(id, input).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.cars().delete(id).await?;
        tracing::info!("🗑️ Car {} removed", id);
        Ok(())
    }
}
