//! Request and response bodies for the REST routes, and the validation that turns them into
//! engine types.
//!
//! Validation failures name the offending field and reject the request before any side effect.

use std::fmt::Display;

use recharge_engine::db_types::{
    ApplicationStatus,
    GameUpdate,
    MerchantStatus,
    MerchantUpdate,
    NewGame,
    NewMerchant,
    NewMerchantApplication,
    NewSku,
    Role,
    SkuUpdate,
};
use rgp_common::{MinorUnits, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

const MAX_NAME_LEN: usize = 200;
const MIN_DESCRIPTION_LEN: usize = 10;
const MAX_DESCRIPTION_LEN: usize = 2000;

//--------------------------------------    JsonResponse     ---------------------------------------------------------
/// The ack body for fire-and-forget endpoints (the webhook) and for deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//--------------------------------------      Payments       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrderParams {
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalCaptureParams {
    pub order_id: String,
    /// The PayPal-side order id returned when the PayPal order was created.
    pub provider_order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeIntentResult {
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalOrderResult {
    pub paypal_order_id: String,
}

//--------------------------------------        Games        ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameParams {
    pub name_zh: String,
    pub name_ja: String,
    pub name_en: String,
    pub developer: String,
    pub icon_url: String,
    pub banner_url: String,
    pub badge: String,
    pub rating: Option<f64>,
    pub downloads: Option<String>,
}

impl GameParams {
    /// Validates the form and assigns the owning merchant.
    pub fn into_new_game(self, merchant_id: String) -> Result<NewGame, ServerError> {
        Ok(NewGame {
            merchant_id,
            name_zh: valid_name("name_zh", &self.name_zh)?,
            name_ja: valid_name("name_ja", &self.name_ja)?,
            name_en: valid_name("name_en", &self.name_en)?,
            developer: valid_name("developer", &self.developer)?,
            icon_url: valid_name("icon_url", &self.icon_url)?,
            banner_url: valid_name("banner_url", &self.banner_url)?,
            badge: valid_name("badge", &self.badge)?,
            rating: self.rating.map(valid_rating).transpose()?,
            downloads: self.downloads,
        })
    }
}

/// The admin variant carries the owning merchant in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminGameParams {
    pub merchant_id: String,
    #[serde(flatten)]
    pub game: GameParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameUpdateParams {
    pub name_zh: Option<String>,
    pub name_ja: Option<String>,
    pub name_en: Option<String>,
    pub developer: Option<String>,
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
    pub badge: Option<String>,
    pub rating: Option<f64>,
    pub downloads: Option<String>,
}

impl GameUpdateParams {
    /// Validates the present fields. The owning merchant is never changed through this form;
    /// reassignment is a separate admin-only field.
    pub fn into_update(self) -> Result<GameUpdate, ServerError> {
        Ok(GameUpdate {
            merchant_id: None,
            name_zh: self.name_zh.as_deref().map(|v| valid_name("name_zh", v)).transpose()?,
            name_ja: self.name_ja.as_deref().map(|v| valid_name("name_ja", v)).transpose()?,
            name_en: self.name_en.as_deref().map(|v| valid_name("name_en", v)).transpose()?,
            developer: self.developer.as_deref().map(|v| valid_name("developer", v)).transpose()?,
            icon_url: self.icon_url,
            banner_url: self.banner_url,
            badge: self.badge,
            rating: self.rating.map(valid_rating).transpose()?,
            downloads: self.downloads,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminGameUpdateParams {
    pub merchant_id: Option<String>,
    #[serde(flatten)]
    pub game: GameUpdateParams,
}

//--------------------------------------        SKUs         ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuParams {
    pub game_id: String,
    pub name_zh: String,
    pub name_ja: String,
    pub name_en: String,
    pub price: i64,
    pub original_price: Option<i64>,
    #[serde(default)]
    pub bonus: String,
    pub currency: Option<String>,
    pub limited: Option<bool>,
    pub image_url: Option<String>,
    pub sort_order: Option<i64>,
}

impl SkuParams {
    pub fn into_new_sku(self) -> Result<NewSku, ServerError> {
        let price = valid_price("price", self.price)?;
        let original_price = match self.original_price {
            Some(p) => valid_price("original_price", p)?,
            None => price,
        };
        let currency = match self.currency {
            Some(c) => valid_currency(&c)?,
            None => DEFAULT_CURRENCY.to_string(),
        };
        Ok(NewSku {
            game_id: self.game_id,
            name_zh: valid_name("name_zh", &self.name_zh)?,
            name_ja: valid_name("name_ja", &self.name_ja)?,
            name_en: valid_name("name_en", &self.name_en)?,
            price,
            original_price,
            bonus: self.bonus,
            currency,
            limited: self.limited,
            image_url: self.image_url,
            sort_order: self.sort_order,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkuUpdateParams {
    pub name_zh: Option<String>,
    pub name_ja: Option<String>,
    pub name_en: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub bonus: Option<String>,
    pub currency: Option<String>,
    pub limited: Option<bool>,
    pub image_url: Option<String>,
    pub sort_order: Option<i64>,
}

impl SkuUpdateParams {
    pub fn into_update(self) -> Result<SkuUpdate, ServerError> {
        Ok(SkuUpdate {
            name_zh: self.name_zh.as_deref().map(|v| valid_name("name_zh", v)).transpose()?,
            name_ja: self.name_ja.as_deref().map(|v| valid_name("name_ja", v)).transpose()?,
            name_en: self.name_en.as_deref().map(|v| valid_name("name_en", v)).transpose()?,
            price: self.price.map(|p| valid_price("price", p)).transpose()?,
            original_price: self.original_price.map(|p| valid_price("original_price", p)).transpose()?,
            bonus: self.bonus,
            currency: self.currency.as_deref().map(valid_currency).transpose()?,
            limited: self.limited,
            image_url: self.image_url,
            sort_order: self.sort_order,
        })
    }
}

/// `GET /merchant/skus?game_id=`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameIdQuery {
    pub game_id: String,
}

//--------------------------------------      Merchants      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMerchantParams {
    pub name: String,
    pub email: Option<String>,
    /// Games to bind the new merchant to, in the same transaction.
    #[serde(default)]
    pub game_ids: Vec<String>,
}

impl NewMerchantParams {
    pub fn into_parts(self) -> Result<(NewMerchant, Vec<String>), ServerError> {
        let name = valid_name("name", &self.name)?;
        let email = self.email.as_deref().map(|e| valid_email("email", e)).transpose()?;
        Ok((NewMerchant { name, email }, self.game_ids))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantUpdateParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<MerchantStatus>,
}

impl MerchantUpdateParams {
    pub fn into_update(self) -> Result<MerchantUpdate, ServerError> {
        Ok(MerchantUpdate {
            name: self.name.map(|n| valid_name("name", &n)).transpose()?,
            email: self.email.map(|e| valid_email("email", &e)).transpose()?,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantBindingsParams {
    pub game_ids: Vec<String>,
}

//--------------------------------------    Applications     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationParams {
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub description: String,
}

impl ApplicationParams {
    pub fn into_application(self) -> Result<NewMerchantApplication, ServerError> {
        let description = self.description.trim().to_string();
        let len = description.chars().count();
        if !(MIN_DESCRIPTION_LEN..=MAX_DESCRIPTION_LEN).contains(&len) {
            return Err(ServerError::InvalidRequestBody(format!(
                "description must be between {MIN_DESCRIPTION_LEN} and {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        Ok(NewMerchantApplication {
            company_name: valid_name("company_name", &self.company_name)?,
            contact_name: valid_name("contact_name", &self.contact_name)?,
            contact_email: valid_email("contact_email", &self.contact_email)?,
            description,
        })
    }
}

/// The optional note an admin attaches when approving or rejecting an application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewParams {
    #[serde(default)]
    pub review_note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationStatusQuery {
    pub status: Option<ApplicationStatus>,
}

//--------------------------------------        Users        ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateParams {
    pub role: Role,
}

//--------------------------------------     Validation      ---------------------------------------------------------
fn valid_name(field: &str, value: &str) -> Result<String, ServerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServerError::InvalidRequestBody(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ServerError::InvalidRequestBody(format!("{field} must be at most {MAX_NAME_LEN} characters")));
    }
    Ok(trimmed.to_string())
}

fn valid_price(field: &str, value: i64) -> Result<MinorUnits, ServerError> {
    if value < 0 {
        return Err(ServerError::InvalidRequestBody(format!("{field} must not be negative")));
    }
    Ok(MinorUnits::from(value))
}

fn valid_rating(value: f64) -> Result<f64, ServerError> {
    if !(0.0..=5.0).contains(&value) {
        return Err(ServerError::InvalidRequestBody("rating must be between 0 and 5".to_string()));
    }
    Ok(value)
}

fn valid_currency(value: &str) -> Result<String, ServerError> {
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(value.to_string())
    } else {
        Err(ServerError::InvalidRequestBody("currency must be a 3-letter uppercase code".to_string()))
    }
}

fn valid_email(field: &str, value: &str) -> Result<String, ServerError> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() &&
                !domain.is_empty() &&
                !domain.contains('@') &&
                domain.contains('.') &&
                !domain.starts_with('.') &&
                !domain.ends_with('.') &&
                !value.contains(char::is_whitespace)
        },
        None => false,
    };
    if valid {
        Ok(value.to_string())
    } else {
        Err(ServerError::InvalidRequestBody(format!("{field} must be a valid email address")))
    }
}
