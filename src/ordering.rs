use std::cmp::Ordering;

use serde_json::Value;

/// Largest goal count a single side can score; anything above is malformed.
pub const MAX_GOALS: u32 = 999;

/// Parse a goal count typed by a user or sent by the backend.
///
/// Only non-negative integers up to [`MAX_GOALS`] count; empty, negative,
/// fractional, oversized and non-numeric input all yield `None`.
pub fn parse_goals(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok().filter(|g| *g <= MAX_GOALS)
}

/// Goal count from a JSON value (number or numeric string).
pub fn goals_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).ok().filter(|g| *g <= MAX_GOALS);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(MAX_GOALS) {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(s) => parse_goals(s),
        _ => None,
    }
}

/// Points from a JSON value. Integral floats and numeric strings are accepted,
/// fractional values are rounded to the nearest whole point.
pub fn points_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(round_points)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(round_points))
        }
        _ => None,
    }
}

fn round_points(f: f64) -> Option<i64> {
    if !f.is_finite() || f.abs() > 9.0e15 {
        return None;
    }
    Some(f.round() as i64)
}

/// Larger values first.
pub fn desc<T: Ord>(a: T, b: T) -> Ordering {
    b.cmp(&a)
}

/// Byte-wise, case-sensitive name order.
pub fn name_asc(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Competition ("1224") ranks for an already sorted slice.
///
/// Equal keys share the rank of the first entry in their run; the next distinct
/// key takes its 1-based position, so ties consume rank slots.
pub fn competition_ranks<T, K, F>(sorted: &[T], key: F) -> Vec<u32>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut ranks = Vec::with_capacity(sorted.len());
    let mut last: Option<K> = None;
    let mut current = 0u32;
    for (idx, item) in sorted.iter().enumerate() {
        let k = key(item);
        if last.as_ref() != Some(&k) {
            current = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            last = Some(k);
        }
        ranks.push(current);
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_goals_rejects_malformed_input() {
        assert_eq!(parse_goals("2"), Some(2));
        assert_eq!(parse_goals(" 10 "), Some(10));
        assert_eq!(parse_goals(""), None);
        assert_eq!(parse_goals("   "), None);
        assert_eq!(parse_goals("-1"), None);
        assert_eq!(parse_goals("1.5"), None);
        assert_eq!(parse_goals("two"), None);
        assert_eq!(parse_goals("+3"), None);
        assert_eq!(parse_goals("999"), Some(MAX_GOALS));
        assert_eq!(parse_goals("1000"), None);
        assert_eq!(parse_goals("3000000000"), None);
    }

    #[test]
    fn oversized_json_goals_are_rejected() {
        assert_eq!(goals_from_value(&serde_json::json!(3)), Some(3));
        assert_eq!(goals_from_value(&serde_json::json!(2.0)), Some(2));
        assert_eq!(goals_from_value(&serde_json::json!(3_000_000_000u64)), None);
        assert_eq!(goals_from_value(&serde_json::json!(1.0e12)), None);
        assert_eq!(goals_from_value(&serde_json::json!("4294967295")), None);
    }

    #[test]
    fn points_coercion() {
        assert_eq!(points_from_value(&serde_json::json!(7)), Some(7));
        assert_eq!(points_from_value(&serde_json::json!(7.0)), Some(7));
        assert_eq!(points_from_value(&serde_json::json!("12")), Some(12));
        assert_eq!(points_from_value(&serde_json::json!("n/a")), None);
        assert_eq!(points_from_value(&Value::Null), None);
    }

    #[test]
    fn ranks_skip_after_ties() {
        let points = [10, 10, 5, 5, 5, 1];
        assert_eq!(competition_ranks(&points, |p| *p), vec![1, 1, 3, 3, 3, 6]);
        assert!(competition_ranks::<i32, i32, _>(&[], |p| *p).is_empty());
    }
}
