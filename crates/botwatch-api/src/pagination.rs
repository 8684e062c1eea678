use axum::extract::{Query, rejection::QueryRejection};

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_USER_LIMIT: u32 = 50;
pub const DEFAULT_MESSAGE_LIMIT: u32 = 25;

/// Raw query pairs. Read as a list so that a repeated `limit` does not fail
/// extraction; the first occurrence wins.
pub type ListQuery = Query<Vec<(String, String)>>;

/// Resolves the row limit for a listing. An unparseable query string behaves
/// like an absent `limit`.
pub fn resolve_limit(query: Result<ListQuery, QueryRejection>, fallback: u32) -> u32 {
    let raw = query.ok().and_then(|Query(pairs)| {
        pairs
            .into_iter()
            .find_map(|(key, value)| (key == "limit").then_some(value))
    });
    parse_limit(raw.as_deref(), fallback)
}

/// Parses a leading integer and clamps it to `[MIN_LIMIT, MAX_LIMIT]`.
/// Input without a leading integer yields `fallback`.
pub fn parse_limit(raw: Option<&str>, fallback: u32) -> u32 {
    match raw.and_then(leading_integer) {
        Some(n) => n.clamp(MIN_LIMIT, MAX_LIMIT) as u32,
        None => fallback,
    }
}

/// Reads an optionally signed run of digits after leading whitespace,
/// ignoring whatever follows (`"10abc"` is 10).
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    // Overlong digit runs saturate; they clamp to MAX_LIMIT either way.
    let value = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
