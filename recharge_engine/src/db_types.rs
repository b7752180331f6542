//! Database types for the recharge engine.
//!
//! Every row type and insert type used by the storage traits lives here. The status fields are
//! closed enums that are stored as uppercase strings in the database.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use rgp_common::MinorUnits;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct StatusConversionError(pub String);

//--------------------------------------        Role         ---------------------------------------------------------
/// The closed set of roles a user can hold. Capability checks match on variants, never on raw
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Merchant,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Merchant => write!(f, "merchant"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "merchant" => Ok(Self::Merchant),
            "admin" => Ok(Self::Admin),
            s => Err(StatusConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------        Roles        ---------------------------------------------------------
/// The set of roles attached to an authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roles(Vec<Role>);

impl Roles {
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }
}

impl From<Vec<Role>> for Roles {
    fn from(value: Vec<Role>) -> Self {
        Self(value)
    }
}

impl FromIterator<Role> for Roles {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for Roles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let roles = self.0.iter().map(|r| r.to_string()).collect::<Vec<String>>().join(",");
        write!(f, "{roles}")
    }
}

//--------------------------------------    MerchantStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum MerchantStatus {
    /// The merchant may sell and be resolved onto new orders.
    Active,
    /// The merchant is blocked from selling. Existing orders keep their merchant reference.
    Suspended,
}

impl Display for MerchantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MerchantStatus::Active => write!(f, "ACTIVE"),
            MerchantStatus::Suspended => write!(f, "SUSPENDED"),
        }
    }
}

impl FromStr for MerchantStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "SUSPENDED" => Ok(Self::Suspended),
            s => Err(StatusConversionError(format!("Invalid merchant status: {s}"))),
        }
    }
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// The order has been created and no payment outcome has been received.
    Pending,
    /// Payment has been confirmed by a provider (or the demo shortcut).
    Paid,
    /// The provider reported a failed payment.
    Failed,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            s => Err(StatusConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------  ApplicationStatus  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "PENDING"),
            ApplicationStatus::Approved => write!(f, "APPROVED"),
            ApplicationStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            s => Err(StatusConversionError(format!("Invalid application status: {s}"))),
        }
    }
}

//--------------------------------------      Merchant       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub status: MerchantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMerchant {
    pub name: String,
    pub email: Option<String>,
}

/// Partial update for a merchant. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<MerchantStatus>,
}

//--------------------------------------        Game         ---------------------------------------------------------
/// A canonical product line. `merchant_id` is the owning merchant; additional sellers are bound
/// via [`MerchantGameLink`] rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: String,
    pub merchant_id: String,
    pub name_zh: String,
    pub name_ja: String,
    pub name_en: String,
    pub developer: String,
    pub icon_url: String,
    pub banner_url: String,
    pub badge: String,
    pub rating: f64,
    pub downloads: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGame {
    pub merchant_id: String,
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameUpdate {
    pub merchant_id: Option<String>,
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

impl GameUpdate {
    pub fn is_empty(&self) -> bool {
        self.merchant_id.is_none()
            && self.name_zh.is_none()
            && self.name_ja.is_none()
            && self.name_en.is_none()
            && self.developer.is_none()
            && self.icon_url.is_none()
            && self.banner_url.is_none()
            && self.badge.is_none()
            && self.rating.is_none()
            && self.downloads.is_none()
    }
}

//--------------------------------------        Sku          ---------------------------------------------------------
/// A purchasable price point belonging to exactly one game. `price` and `currency` are
/// snapshotted onto orders at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sku {
    pub id: String,
    pub game_id: String,
    pub name_zh: String,
    pub name_ja: String,
    pub name_en: String,
    pub price: MinorUnits,
    pub original_price: MinorUnits,
    pub bonus: String,
    pub currency: String,
    pub limited: bool,
    pub image_url: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSku {
    pub game_id: String,
    pub name_zh: String,
    pub name_ja: String,
    pub name_en: String,
    pub price: MinorUnits,
    pub original_price: MinorUnits,
    pub bonus: String,
    pub currency: String,
    pub limited: Option<bool>,
    pub image_url: Option<String>,
    /// When omitted, the insert assigns max(sort_order) + 1 within the game.
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkuUpdate {
    pub name_zh: Option<String>,
    pub name_ja: Option<String>,
    pub name_en: Option<String>,
    pub price: Option<MinorUnits>,
    pub original_price: Option<MinorUnits>,
    pub bonus: Option<String>,
    pub currency: Option<String>,
    pub limited: Option<bool>,
    pub image_url: Option<String>,
    pub sort_order: Option<i64>,
}

impl SkuUpdate {
    pub fn is_empty(&self) -> bool {
        self.name_zh.is_none()
            && self.name_ja.is_none()
            && self.name_en.is_none()
            && self.price.is_none()
            && self.original_price.is_none()
            && self.bonus.is_none()
            && self.currency.is_none()
            && self.limited.is_none()
            && self.image_url.is_none()
            && self.sort_order.is_none()
    }
}

//--------------------------------------  MerchantGameLink   ---------------------------------------------------------
/// A many-to-many binding between a merchant and a game. Unique per (merchant, game); the
/// creation timestamp orders default seller resolution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchantGameLink {
    pub id: i64,
    pub merchant_id: String,
    pub game_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Order         ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub merchant_id: String,
    pub game_id: String,
    pub sku_id: String,
    /// The verified identity subject of the purchaser at creation time.
    pub visitor_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: OrderStatus,
    pub provider: Option<String>,
    pub provider_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchase request before merchant resolution has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub sku_id: String,
    pub merchant_id: Option<String>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(sku_id: S) -> Self {
        Self { sku_id: sku_id.into(), merchant_id: None }
    }

    pub fn with_merchant<S: Into<String>>(mut self, merchant_id: S) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }
}

//--------------------------------------        User         ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    /// The identity-provider subject. Unique; the upsert key.
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A verified identity as presented by the server layer. Users are upserted from this on every
/// authenticated request that touches the user table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
}

//--------------------------------------   MerchantUserLink  ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchantUserLink {
    pub id: i64,
    pub merchant_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

//-------------------------------------- MerchantApplication ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchantApplication {
    pub id: String,
    pub user_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub description: String,
    pub status: ApplicationStatus,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMerchantApplication {
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub description: String,
}
