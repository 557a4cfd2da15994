use crate::{parse_units, Unit, UnitView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The writable configuration of a shape.
///
/// This is the record the validator judges: every field is present. The
/// default is an unnamed shape with everything switched off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeForm {
    #[serde(default)]
    pub name: BTreeMap<String, String>,
    #[serde(default)]
    pub shipping_enabled: bool,
    #[serde(default)]
    pub online_payments: bool,
    #[serde(default)]
    pub price_enabled: bool,
    #[serde(default)]
    pub units: Vec<Unit>,
}

/// A field of [`ShapeForm`] that a write request may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeField {
    Name,
    ShippingEnabled,
    OnlinePayments,
    PriceEnabled,
    Units,
}

impl ShapeField {
    pub const ALL: [ShapeField; 5] = [
        ShapeField::Name,
        ShapeField::ShippingEnabled,
        ShapeField::OnlinePayments,
        ShapeField::PriceEnabled,
        ShapeField::Units,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ShippingEnabled => "shipping_enabled",
            Self::OnlinePayments => "online_payments",
            Self::PriceEnabled => "price_enabled",
            Self::Units => "units",
        }
    }
}

impl fmt::Display for ShapeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write request: only the fields the caller sent are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_payments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<Unit>>,
}

impl ShapeInput {
    /// Sets `units` from the rows of an expanded unit form.
    pub fn with_unit_views(mut self, views: &[UnitView]) -> Self {
        self.units = Some(parse_units(views));
        self
    }

    pub fn is_set(&self, field: ShapeField) -> bool {
        match field {
            ShapeField::Name => self.name.is_some(),
            ShapeField::ShippingEnabled => self.shipping_enabled.is_some(),
            ShapeField::OnlinePayments => self.online_payments.is_some(),
            ShapeField::PriceEnabled => self.price_enabled.is_some(),
            ShapeField::Units => self.units.is_some(),
        }
    }

    /// Drops `field` from the request.
    pub fn clear(&mut self, field: ShapeField) {
        match field {
            ShapeField::Name => self.name = None,
            ShapeField::ShippingEnabled => self.shipping_enabled = None,
            ShapeField::OnlinePayments => self.online_payments = None,
            ShapeField::PriceEnabled => self.price_enabled = None,
            ShapeField::Units => self.units = None,
        }
    }

    /// Merges the fields present in this request onto `base`. Absent fields
    /// keep the base value.
    pub fn apply_to(self, base: &ShapeForm) -> ShapeForm {
        ShapeForm {
            name: self.name.unwrap_or_else(|| base.name.clone()),
            shipping_enabled: self.shipping_enabled.unwrap_or(base.shipping_enabled),
            online_payments: self.online_payments.unwrap_or(base.online_payments),
            price_enabled: self.price_enabled.unwrap_or(base.price_enabled),
            units: self.units.unwrap_or_else(|| base.units.clone()),
        }
    }
}

impl From<ShapeForm> for ShapeInput {
    fn from(form: ShapeForm) -> Self {
        Self {
            name: Some(form.name),
            shipping_enabled: Some(form.shipping_enabled),
            online_payments: Some(form.online_payments),
            price_enabled: Some(form.price_enabled),
            units: Some(form.units),
        }
    }
}
