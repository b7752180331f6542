mod helpers;
mod money;
pub mod op;
mod secret;

pub use helpers::parse_boolean_flag;
pub use money::{is_zero_decimal_currency, MinorUnits, MinorUnitsConversionError, DEFAULT_CURRENCY};
pub use secret::Secret;
