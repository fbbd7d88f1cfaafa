//! Order item normalization and per-item / per-batch results.

use serde::Serialize;
use serde_json::Value;

/// Keys that may carry the menu name, in priority order.
const NAME_KEYS: [&str; 5] = ["name", "menu", "item", "displayName", "menuName"];

/// Keys that may carry the quantity, in priority order.
const COUNT_KEYS: [&str; 3] = ["count", "qty", "quantity"];

// ---------------------------------------------------------------------------
// OrderItem
// ---------------------------------------------------------------------------

/// One line of an order after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub name: String,
    /// Always at least 1.
    pub count: u32,
}

impl OrderItem {
    /// Normalize a loosely shaped order line.
    ///
    /// Returns `None` when no name key carries a non-empty string.  The count
    /// falls back to 1 when absent, unparseable or below 1.
    ///
    /// ```
    /// use kiosk_voice_macro::order::OrderItem;
    /// use serde_json::json;
    ///
    /// let item = OrderItem::normalize(&json!({"menuName": "라떼", "quantity": "3"})).unwrap();
    /// assert_eq!((item.name.as_str(), item.count), ("라떼", 3));
    /// assert!(OrderItem::normalize(&json!({"count": 2})).is_none());
    /// ```
    pub fn normalize(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let name = NAME_KEYS
            .iter()
            .filter_map(|k| obj.get(*k).and_then(Value::as_str))
            .find(|s| !s.is_empty())?;

        let count = COUNT_KEYS
            .iter()
            .filter_map(|k| obj.get(*k))
            .find(|v| !v.is_null())
            .map_or(1, coerce_count);

        Some(Self {
            name: name.to_string(),
            count,
        })
    }
}

fn coerce_count(v: &Value) -> u32 {
    let n = match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub name: String,
    pub count: u32,
    pub success: bool,
    pub error: Option<String>,
}

impl ItemResult {
    pub(crate) fn ok(name: &str, count: u32) -> Self {
        Self {
            name: name.to_string(),
            count,
            success: true,
            error: None,
        }
    }

    pub(crate) fn failed(name: &str, count: u32, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            count,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// `true` only when every item succeeded.
    pub success: bool,
    pub total_items: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub results: Vec<ItemResult>,
    pub payment_triggered: bool,
}

impl BatchResult {
    pub(crate) fn new(results: Vec<ItemResult>, payment_triggered: bool) -> Self {
        let total_items = results.len();
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            success: success_count == total_items,
            total_items,
            success_count,
            fail_count: total_items - success_count,
            results,
            payment_triggered,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
