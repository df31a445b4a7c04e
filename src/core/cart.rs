use crate::domain::model::{Car, CartItem, CartItemPatch, RentalOptions};
use crate::domain::ports::{KeyValueStore, CART_ITEMS_KEY};
use crate::utils::error::{RentalError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-day surcharges for the optional extras.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionRates {
    #[serde(default = "default_full_insurance")]
    pub full_insurance: f64,
    #[serde(default = "default_child_seat")]
    pub child_seat: f64,
    #[serde(default = "default_gps")]
    pub gps: f64,
    #[serde(default = "default_additional_driver")]
    pub additional_driver: f64,
}

fn default_full_insurance() -> f64 {
    500.0
}

fn default_child_seat() -> f64 {
    300.0
}

fn default_gps() -> f64 {
    200.0
}

fn default_additional_driver() -> f64 {
    400.0
}

impl Default for OptionRates {
    fn default() -> Self {
        Self {
            full_insurance: default_full_insurance(),
            child_seat: default_child_seat(),
            gps: default_gps(),
            additional_driver: default_additional_driver(),
        }
    }
}

impl OptionRates {
    /// Sum of the enabled extras for one day.
    pub fn daily_surcharge(&self, options: &RentalOptions) -> f64 {
        let mut total = 0.0;
        if options.full_insurance {
            total += self.full_insurance;
        }
        if options.child_seat {
            total += self.child_seat;
        }
        if options.gps {
            total += self.gps;
        }
        if options.additional_driver {
            total += self.additional_driver;
        }
        total
    }
}

/// Tariff the customer picked on the car page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalPlan {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl RentalPlan {
    /// Weekly and monthly tariffs are spread over 7 and 30 days; a car without
    /// the tariff falls back to its daily price.
    pub fn effective_daily_price(&self, car: &Car) -> f64 {
        match self {
            Self::Daily => car.price,
            Self::Weekly => car.price_week.map(|p| p / 7.0).unwrap_or(car.price),
            Self::Monthly => car.price_month.map(|p| p / 30.0).unwrap_or(car.price),
        }
    }
}

impl std::str::FromStr for RentalPlan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown rental plan: {}", other)),
        }
    }
}

/// Whole days between pick-up and return; a same-day rental counts as one day.
pub fn rental_days_between(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    if end < start {
        return Err(RentalError::validation(format!(
            "End date {} precedes start date {}",
            end, start
        )));
    }
    let days = (end - start).num_days().max(1);
    u32::try_from(days).map_err(|_| RentalError::validation(format!("Rental of {} days is too long", days)))
}

fn validate_item(item: &CartItem) -> Result<()> {
    if item.rental_days == 0 {
        return Err(RentalError::validation(format!(
            "Rental days for '{}' must be at least 1",
            item.title
        )));
    }
    if let (Some(start), Some(end)) = (item.start_date, item.end_date) {
        if end < start {
            return Err(RentalError::validation(format!(
                "End date {} precedes start date {} for '{}'",
                end, start, item.title
            )));
        }
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(RentalError::validation(format!("Invalid price for '{}'", item.title)));
    }
    Ok(())
}

/// Shopping cart persisted under `cartItems`; every mutation rewrites the list.
pub struct Cart {
    items: Vec<CartItem>,
    store: Arc<dyn KeyValueStore>,
    rates: OptionRates,
}

impl Cart {
    pub fn load(store: Arc<dyn KeyValueStore>, rates: OptionRates) -> Self {
        let items = match store.get(CART_ITEMS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Stored cart is unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read stored cart, starting empty: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Cart loaded with {} item(s)", items.len());

        Self { items, store, rates }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn rates(&self) -> &OptionRates {
        &self.rates
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn commit(&mut self, items: Vec<CartItem>) -> Result<()> {
        let raw = serde_json::to_string(&items)?;
        self.store.set(CART_ITEMS_KEY, &raw)?;
        self.items = items;
        Ok(())
    }

    /// Adds a line, or merges into the line for the same car. Optional fields
    /// missing from `item` keep the values already in the cart.
    pub fn add_item(&mut self, item: CartItem) -> Result<()> {
        let mut items = self.items.clone();

        match items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                let merged = CartItem {
                    start_date: item.start_date.or(existing.start_date),
                    end_date: item.end_date.or(existing.end_date),
                    options: item.options.or(existing.options),
                    ..item
                };
                validate_item(&merged)?;
                tracing::debug!("Updating cart line {}", merged.id);
                *existing = merged;
            }
            None => {
                validate_item(&item)?;
                tracing::debug!("Adding cart line {}", item.id);
                items.push(item);
            }
        }

        self.commit(items)
    }

    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, id: &str) -> Result<bool> {
        let before = self.items.len();
        let items: Vec<CartItem> = self.items.iter().filter(|i| i.id != id).cloned().collect();
        let removed = items.len() != before;
        self.commit(items)?;
        Ok(removed)
    }

    /// Applies a partial update. Unknown ids are ignored and reported as `false`.
    pub fn update_item(&mut self, id: &str, patch: CartItemPatch) -> Result<bool> {
        let mut items = self.items.clone();
        let Some(existing) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };

        let mut updated = existing.clone();
        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(image) = patch.image {
            updated.image = image;
        }
        if let Some(price) = patch.price {
            updated.price = price;
        }
        if let Some(price_unit) = patch.price_unit {
            updated.price_unit = price_unit;
        }
        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(features) = patch.features {
            updated.features = features;
        }
        if let Some(days) = patch.rental_days {
            updated.rental_days = days;
        }
        if patch.start_date.is_some() {
            updated.start_date = patch.start_date;
        }
        if patch.end_date.is_some() {
            updated.end_date = patch.end_date;
        }
        if patch.options.is_some() {
            updated.options = patch.options;
        }

        validate_item(&updated)?;
        *existing = updated;
        self.commit(items)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }

    /// Number of lines, not rental days.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn options_price(&self, item: &CartItem) -> f64 {
        item.options
            .as_ref()
            .map(|o| self.rates.daily_surcharge(o) * item.rental_days as f64)
            .unwrap_or(0.0)
    }

    pub fn line_total(&self, item: &CartItem) -> f64 {
        item.price * item.rental_days as f64 + self.options_price(item)
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|i| self.line_total(i)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;

    fn item(id: &str, price: f64, days: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            title: format!("Car {}", id),
            image: String::new(),
            price,
            price_unit: "day".to_string(),
            category: "comfort".to_string(),
            features: vec![],
            rental_days: days,
            start_date: None,
            end_date: None,
            options: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_cart() -> (Cart, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Cart::load(store.clone(), OptionRates::default()), store)
    }

    #[test]
    fn test_adding_existing_item_updates_instead_of_duplicating() {
        let (mut cart, _) = empty_cart();
        cart.add_item(item("CAR001", 3500.0, 2)).unwrap();
        cart.add_item(item("CAR002", 2000.0, 1)).unwrap();
        cart.add_item(item("CAR001", 3500.0, 5)).unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.items()[0].id, "CAR001");
        assert_eq!(cart.items()[0].rental_days, 5);
    }

    #[test]
    fn test_merge_keeps_existing_optional_fields() {
        let (mut cart, _) = empty_cart();
        let mut first = item("CAR001", 3500.0, 2);
        first.start_date = Some(date(2025, 5, 1));
        first.end_date = Some(date(2025, 5, 3));
        first.options = Some(RentalOptions {
            gps: true,
            ..Default::default()
        });
        cart.add_item(first).unwrap();

        cart.add_item(item("CAR001", 3000.0, 2)).unwrap();

        let line = cart.get("CAR001").unwrap();
        assert_eq!(line.price, 3000.0);
        assert_eq!(line.start_date, Some(date(2025, 5, 1)));
        assert!(line.options.unwrap().gps);
    }

    #[test]
    fn test_total_price_includes_option_surcharges() {
        let (mut cart, _) = empty_cart();
        let mut camry = item("CAR001", 3500.0, 3);
        camry.options = Some(RentalOptions {
            full_insurance: true,
            child_seat: true,
            gps: false,
            additional_driver: true,
        });
        cart.add_item(camry).unwrap();
        cart.add_item(item("CAR003", 2000.0, 2)).unwrap();

        // 3500*3 + (500+300+400)*3 + 2000*2
        assert_eq!(cart.options_price(&cart.items()[0]), 3600.0);
        assert_eq!(cart.total_price(), 10500.0 + 3600.0 + 4000.0);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (mut cart, store) = empty_cart();
        cart.add_item(item("CAR001", 3500.0, 2)).unwrap();
        cart.add_item(item("CAR002", 2000.0, 1)).unwrap();

        let restored = Cart::load(store.clone(), OptionRates::default());
        assert_eq!(restored.item_count(), 2);

        assert!(cart.remove_item("CAR001").unwrap());
        assert!(!cart.remove_item("CAR001").unwrap());
        let raw = store.get(CART_ITEMS_KEY).unwrap().unwrap();
        let stored: Vec<CartItem> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, "CAR002");

        cart.clear().unwrap();
        assert_eq!(store.get(CART_ITEMS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_update_item_is_partial_and_ignores_unknown_ids() {
        let (mut cart, _) = empty_cart();
        cart.add_item(item("CAR001", 3500.0, 2)).unwrap();

        let changed = cart
            .update_item(
                "CAR001",
                CartItemPatch {
                    rental_days: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(changed);
        assert_eq!(cart.items()[0].rental_days, 7);
        assert_eq!(cart.items()[0].price, 3500.0);

        assert!(!cart.update_item("CAR404", CartItemPatch::default()).unwrap());
    }

    #[test]
    fn test_invalid_items_are_rejected_and_cart_unchanged() {
        let (mut cart, _) = empty_cart();
        cart.add_item(item("CAR001", 3500.0, 2)).unwrap();

        assert!(cart.add_item(item("CAR002", 2000.0, 0)).is_err());

        let mut backwards = item("CAR003", 2000.0, 2);
        backwards.start_date = Some(date(2025, 5, 10));
        backwards.end_date = Some(date(2025, 5, 1));
        assert!(cart.add_item(backwards).is_err());

        let zero_days = CartItemPatch {
            rental_days: Some(0),
            ..Default::default()
        };
        assert!(cart.update_item("CAR001", zero_days).is_err());

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].rental_days, 2);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(CART_ITEMS_KEY, "[{broken").unwrap();
        let cart = Cart::load(store, OptionRates::default());
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), 0.0);
    }

    #[test]
    fn test_rental_days_between() {
        assert_eq!(rental_days_between(date(2025, 5, 1), date(2025, 5, 4)).unwrap(), 3);
        assert_eq!(rental_days_between(date(2025, 5, 1), date(2025, 5, 1)).unwrap(), 1);
        assert!(rental_days_between(date(2025, 5, 4), date(2025, 5, 1)).is_err());
    }

    #[test]
    fn test_rental_plan_prices() {
        let car: Car = serde_json::from_value(serde_json::json!({
            "id": "CAR001",
            "title": "Toyota Camry",
            "category": "comfort",
            "price": 3500,
            "priceUnit": "day",
            "status": "available",
            "priceWeek": 21000,
            "priceMonth": 70000
        }))
        .unwrap();

        assert_eq!(RentalPlan::Daily.effective_daily_price(&car), 3500.0);
        assert_eq!(RentalPlan::Weekly.effective_daily_price(&car), 3000.0);
        assert!((RentalPlan::Monthly.effective_daily_price(&car) - 2333.333).abs() < 0.01);

        let mut plain = car.clone();
        plain.price_week = None;
        assert_eq!(RentalPlan::Weekly.effective_daily_price(&plain), 3500.0);
    }
}
