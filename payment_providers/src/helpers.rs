use rgp_common::{is_zero_decimal_currency, MinorUnits};

/// PayPal wants amounts as decimal strings in major units. Zero-decimal currencies are sent as
/// plain integers; everything else is scaled down with two decimal places.
pub fn paypal_amount(amount: MinorUnits, currency: &str) -> String {
    let value = amount.value();
    if is_zero_decimal_currency(currency) {
        format!("{value}")
    } else {
        format!("{}.{:02}", value / 100, value % 100)
    }
}
