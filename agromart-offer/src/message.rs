use chrono::Duration;
use agromart_catalog::Product;

/// Whole hours plus remaining minutes, floored: 125 minutes is `"2h 5m"`.
pub fn format_time_left(left: Duration) -> String {
    let minutes = left.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// SMS body for the one-time expiry warning.
pub fn render_warning(product: &Product, time_left: &str) -> String {
    format!(
        "AgroMart: {}% off {} ends in {}. Order now before the offer closes!",
        product.offer.discount_percent, product.name, time_left
    )
}
