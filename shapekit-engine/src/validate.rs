//! Cross-field business rules of a listing shape.
//!
//! Field presence and types are settled before this point; only the
//! relations between fields are checked. Every rule is evaluated and all
//! failures are reported together, in declaration order.

use shapekit_model::ShapeForm;
use std::fmt;
use thiserror::Error;

/// A business rule a shape form must satisfy. `Display` is the user-facing
/// message shown when the rule fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ShapeRule {
    #[error("Shipping can not be enabled without online payments")]
    ShippingRequiresOnlinePayments,

    #[error("Online payments can not be enabled without price")]
    OnlinePaymentsRequirePrice,

    #[error("Price units can not be used without price field")]
    UnitsRequirePrice,
}

impl ShapeRule {
    /// All rules, in the order their messages are reported.
    pub const ALL: [ShapeRule; 3] = [
        ShapeRule::ShippingRequiresOnlinePayments,
        ShapeRule::OnlinePaymentsRequirePrice,
        ShapeRule::UnitsRequirePrice,
    ];

    pub fn is_violated_by(&self, form: &ShapeForm) -> bool {
        match self {
            Self::ShippingRequiresOnlinePayments => form.shipping_enabled && !form.online_payments,
            Self::OnlinePaymentsRequirePrice => form.online_payments && !form.price_enabled,
            Self::UnitsRequirePrice => !form.units.is_empty() && !form.price_enabled,
        }
    }
}

/// The rules a form violated. Never empty when returned from [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ShapeRule>);

impl ValidationErrors {
    pub fn rules(&self) -> &[ShapeRule] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    pub fn contains(&self, rule: ShapeRule) -> bool {
        self.0.contains(&rule)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks `candidate` against every [`ShapeRule`].
///
/// Returns the candidate unchanged when no rule fails.
pub fn validate(candidate: ShapeForm) -> Result<ShapeForm, ValidationErrors> {
    let violated: Vec<ShapeRule> = ShapeRule::ALL
        .into_iter()
        .filter(|rule| rule.is_violated_by(&candidate))
        .collect();

    if violated.is_empty() {
        Ok(candidate)
    } else {
        Err(ValidationErrors(violated))
    }
}
