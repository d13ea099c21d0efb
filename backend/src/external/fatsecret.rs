//! FatSecret Platform API client for product nutrition data
//!
//! Authenticates with OAuth2 client credentials and maps provider servings
//! into the normalized [`NutritionFacts`] shape.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::NutritionApiConfig;
use crate::error::{AppError, AppResult};
use shared::{NutritionFacts, NutritionRecord};

/// Seconds shaved off the provider's token lifetime
const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// FatSecret API client
#[derive(Clone)]
pub struct FatSecretClient {
    client: Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    token: Arc<RwLock<Option<AccessToken>>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// `foods.search` response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    foods: Option<SearchFoods>,
}

#[derive(Debug, Deserialize)]
struct SearchFoods {
    #[serde(default)]
    food: OneOrMany<SearchFood>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchFood {
    food_id: String,
    food_name: String,
    brand_name: Option<String>,
}

/// `food.get.v2` response
#[derive(Debug, Deserialize)]
struct FoodResponse {
    food: Option<FoodDetail>,
}

#[derive(Debug, Deserialize)]
struct FoodDetail {
    servings: Option<Servings>,
}

#[derive(Debug, Deserialize)]
struct Servings {
    #[serde(default)]
    serving: OneOrMany<Serving>,
}

/// One provider serving. Numbers arrive as strings; absent ones are zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Serving {
    serving_description: String,
    calories: Option<Decimal>,
    carbohydrate: Option<Decimal>,
    protein: Option<Decimal>,
    fat: Option<Decimal>,
    saturated_fat: Option<Decimal>,
    trans_fat: Option<Decimal>,
    cholesterol: Option<Decimal>,
    sodium: Option<Decimal>,
    potassium: Option<Decimal>,
    fiber: Option<Decimal>,
    sugar: Option<Decimal>,
    calcium: Option<Decimal>,
    iron: Option<Decimal>,
}

/// The provider collapses single-element arrays into objects
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl FatSecretClient {
    /// Create a new FatSecretClient
    pub fn new(config: &NutritionApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Fetch nutrition data for a barcode
    pub async fn find_by_barcode(&self, barcode: &str) -> AppResult<NutritionRecord> {
        let search: SearchResponse = self
            .call(&[
                ("method", "foods.search"),
                ("search_expression", barcode),
                ("format", "json"),
            ])
            .await?;

        let food = search
            .foods
            .map(|f| f.food.into_vec())
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(AppError::ProductNotFound)?;

        let detail: FoodResponse = self
            .call(&[
                ("method", "food.get.v2"),
                ("food_id", food.food_id.as_str()),
                ("format", "json"),
            ])
            .await?;

        let serving = detail
            .food
            .and_then(|f| f.servings)
            .map(|s| s.serving.into_vec())
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::ExternalService("No nutrition data available for this food".to_string())
            })?;

        tracing::debug!(barcode, food_id = %food.food_id, "Fetched nutrition data");

        Ok(NutritionRecord {
            barcode: barcode.to_string(),
            product_name: food.food_name,
            brand_name: food.brand_name,
            serving_size: serving.serving_description.clone(),
            nutrition_facts: serving.into_facts(),
            // Not available from the basic API tier
            ingredients: Vec::new(),
            allergens: Vec::new(),
            retrieved_at: Utc::now(),
        })
    }

    /// Search products by name. Results carry no barcode and zeroed facts.
    pub async fn search_by_name(
        &self,
        query: &str,
        max_results: u32,
    ) -> AppResult<Vec<NutritionRecord>> {
        let max_results = max_results.to_string();
        let search: SearchResponse = self
            .call(&[
                ("method", "foods.search"),
                ("search_expression", query),
                ("max_results", max_results.as_str()),
                ("format", "json"),
            ])
            .await?;

        Ok(search
            .foods
            .map(|f| f.food.into_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|food| NutritionRecord::summary(food.food_name, food.brand_name))
            .collect())
    }

    /// Check if the API accepts our credentials
    pub async fn is_available(&self) -> bool {
        match self.access_token().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Nutrition API availability check failed: {}", e);
                false
            }
        }
    }

    async fn call<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> AppResult<T> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(&self.base_url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Nutrition API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse nutrition response: {}", e))
        })
    }

    /// Cached access token, refreshed when expired
    async fn access_token(&self) -> AppResult<String> {
        let now = Utc::now();
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_valid_at(now) {
                return Ok(token.value.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed while we waited
        if let Some(token) = slot.as_ref() {
            if token.is_valid_at(now) {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "basic")])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse token: {}", e)))?;

        let access = issue_token(token, Utc::now());
        tracing::debug!(expires_at = %access.expires_at, "Obtained nutrition API token");
        let value = access.value.clone();
        *slot = Some(access);
        Ok(value)
    }
}

fn issue_token(response: TokenResponse, now: DateTime<Utc>) -> AccessToken {
    let lifetime = (response.expires_in - TOKEN_EXPIRY_BUFFER_SECS).max(0);
    AccessToken {
        value: response.access_token,
        expires_at: now + chrono::Duration::seconds(lifetime),
    }
}

impl Serving {
    fn into_facts(self) -> NutritionFacts {
        NutritionFacts {
            calories: self.calories.unwrap_or_default(),
            total_fat: self.fat.unwrap_or_default(),
            saturated_fat: self.saturated_fat.unwrap_or_default(),
            trans_fat: self.trans_fat.unwrap_or_default(),
            cholesterol: self.cholesterol.unwrap_or_default(),
            sodium: self.sodium.unwrap_or_default(),
            total_carbohydrates: self.carbohydrate.unwrap_or_default(),
            dietary_fiber: self.fiber.unwrap_or_default(),
            total_sugars: self.sugar.unwrap_or_default(),
            // Not reported by the provider
            added_sugars: Decimal::ZERO,
            protein: self.protein.unwrap_or_default(),
            vitamin_d: Decimal::ZERO,
            calcium: self.calcium.unwrap_or_default(),
            iron: self.iron.unwrap_or_default(),
            potassium: self.potassium.unwrap_or_default(),
        }
    }
}

/// Map a non-success provider status to an application error
fn map_status(status: StatusCode, body: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::ProviderUnauthorized,
        StatusCode::FORBIDDEN => AppError::ProviderForbidden,
        StatusCode::NOT_FOUND => AppError::ProductNotFound,
        StatusCode::TOO_MANY_REQUESTS => AppError::ProviderRateLimited,
        s if s.is_server_error() => {
            AppError::ExternalService(format!("FatSecret server error: {}", s))
        }
        s => AppError::ExternalService(format!("Server error: {} - {}", s, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serving_strings_map_to_facts_with_missing_as_zero() {
        let json = r#"{
            "serving_description": "1 pouch (113 g)",
            "calories": "70",
            "fat": "0.50",
            "sodium": "15",
            "sugar": "9.00",
            "protein": "1"
        }"#;
        let serving: Serving = serde_json::from_str(json).unwrap();
        let facts = serving.into_facts();

        assert_eq!(facts.calories, Decimal::from(70));
        assert_eq!(facts.total_fat, Decimal::new(5, 1));
        assert_eq!(facts.total_sugars, Decimal::from(9));
        assert_eq!(facts.dietary_fiber, Decimal::ZERO);
        assert_eq!(facts.added_sugars, Decimal::ZERO);
        assert_eq!(facts.vitamin_d, Decimal::ZERO);
    }

    #[test]
    fn single_search_hit_is_an_object() {
        let json = r#"{"foods": {"food": {"food_id": "42", "food_name": "Apple Puree"}}}"#;
        let search: SearchResponse = serde_json::from_str(json).unwrap();
        let foods = search.foods.unwrap().food.into_vec();

        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].food_id, "42");
        assert!(foods[0].brand_name.is_none());
    }

    #[test]
    fn empty_search_has_no_food_key() {
        let json = r#"{"foods": {"max_results": "20", "total_results": "0"}}"#;
        let search: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(search.foods.unwrap().food.into_vec().is_empty());
    }

    #[test]
    fn multiple_servings_keep_order() {
        let json = r#"{"food": {"servings": {"serving": [
            {"serving_description": "100 g", "calories": "60"},
            {"serving_description": "1 cup", "calories": "140"}
        ]}}}"#;
        let food: FoodResponse = serde_json::from_str(json).unwrap();
        let servings = food.food.unwrap().servings.unwrap().serving.into_vec();

        assert_eq!(servings[0].serving_description, "100 g");
        assert_eq!(servings.len(), 2);
    }

    #[test]
    fn token_expiry_keeps_a_buffer() {
        let now = Utc::now();
        let token = issue_token(
            TokenResponse {
                access_token: "abc".to_string(),
                expires_in: 86400,
            },
            now,
        );

        assert!(token.is_valid_at(now + chrono::Duration::seconds(86400 - 61)));
        assert!(!token.is_valid_at(now + chrono::Duration::seconds(86400 - 60)));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, ""),
            AppError::ProviderUnauthorized
        ));
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, ""),
            AppError::ProductNotFound
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, ""),
            AppError::ProviderRateLimited
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_GATEWAY, ""),
            AppError::ExternalService(_)
        ));
    }

    #[test]
    fn client_starts_without_token() {
        let client = FatSecretClient::new(&NutritionApiConfig {
            base_url: "http://localhost:9/rest".to_string(),
            token_url: "http://localhost:9/token".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            timeout_ms: 500,
        })
        .unwrap();

        assert!(tokio_test::block_on(client.token.read()).is_none());
    }
}
