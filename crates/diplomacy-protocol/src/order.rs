//! Order strings and the rejection shape returned when one doesn't validate.

use serde::{Deserialize, Serialize};

/// Maximum number of alternative orders suggested alongside a rejection.
pub const MAX_SUGGESTIONS: usize = 5;

/// An order as submitted by a player, kept as the raw notation string (e.g.
/// `"A PAR - BUR"`, `"F LON S A YOR - NTH"`). Validation and legality live in
/// the engine; this type is just the wire shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(String);

impl Order {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an order was rejected, plus up to `MAX_SUGGESTIONS` legal alternatives
/// for the same unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejection {
    pub order: Order,
    pub reason: String,
    pub suggestions: Vec<Order>,
}

impl OrderRejection {
    pub fn new(order: Order, reason: impl Into<String>, mut suggestions: Vec<Order>) -> Self {
        suggestions.truncate(MAX_SUGGESTIONS);
        Self {
            order,
            reason: reason.into(),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_capped() {
        let suggestions = (0..10).map(|i| Order::new(format!("A PAR - {i}"))).collect();
        let rejection = OrderRejection::new(Order::new("A PAR - XYZ"), "no such province", suggestions);
        assert_eq!(rejection.suggestions.len(), MAX_SUGGESTIONS);
    }
}
