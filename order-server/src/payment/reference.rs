//! External order references: `<prefix>-<orderId>-<disambiguator>`

/// Build a reference for a new token request
///
/// The millisecond suffix makes every request unique, so a retried token
/// request never collides with an earlier transaction for the same order.
pub fn build_reference(prefix: &str, order_id: i64, now_millis: i64) -> String {
    format!("{prefix}-{order_id}-{now_millis}")
}

/// Extract the internal order id from a reference
///
/// The disambiguator may be anything (or absent); the prefix must match and
/// the id must be a positive integer.
pub fn parse_reference(prefix: &str, reference: &str) -> Option<i64> {
    let mut parts = reference.trim().splitn(3, '-');
    if parts.next()? != prefix {
        return None;
    }
    let id = parts.next()?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse::<i64>().ok().filter(|id| *id > 0)
}
