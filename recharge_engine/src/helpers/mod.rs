mod ids;
mod seller_resolution;

pub use ids::{new_application_id, new_game_id, new_merchant_id, new_order_id, new_sku_id, new_user_id};
pub use seller_resolution::{resolve_seller, ResolutionError, SellerCandidate};
