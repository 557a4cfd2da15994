//! Pricing units and their display expansion.
//!
//! A shape stores only the units it uses (the canonical form). Admin forms
//! show every predefined unit as a toggle plus the shape's custom units (the
//! expanded form). [`expand_units`] and [`parse_units`] convert between the
//! two; the set of enabled unit types survives a round trip.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of pricing unit ("per hour", "per night", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Hour,
    Day,
    Night,
    Week,
    Month,
    /// Community-defined unit, labelled through its own translation key.
    Custom,
}

impl UnitType {
    /// Unit types every community can toggle, in display order.
    pub const PREDEFINED: [UnitType; 5] = [
        UnitType::Hour,
        UnitType::Day,
        UnitType::Night,
        UnitType::Week,
        UnitType::Month,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Night => "night",
            Self::Week => "week",
            Self::Month => "month",
            Self::Custom => "custom",
        }
    }

    pub fn is_predefined(&self) -> bool {
        !matches!(self, Self::Custom)
    }

    /// Translation key of the admin label for a predefined unit.
    pub fn label_key(&self) -> String {
        format!("admin.listing_shapes.units.{}", self.as_str())
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit as stored on a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Only meaningful for [`UnitType::Custom`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl Unit {
    /// An enabled predefined unit.
    pub fn new(unit_type: UnitType) -> Self {
        Self {
            unit_type,
            enabled: true,
            translation_key: None,
        }
    }

    /// An enabled custom unit labelled by `translation_key`.
    pub fn custom(translation_key: impl Into<String>) -> Self {
        Self {
            unit_type: UnitType::Custom,
            enabled: true,
            translation_key: Some(translation_key.into()),
        }
    }
}

/// One row of the expanded unit list shown in admin forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub enabled: bool,
    /// Translation key of the row label.
    pub label_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,
}

/// Expands a shape's units into one row per predefined type followed by one
/// row per custom unit the shape carries.
pub fn expand_units(shape_units: &[Unit]) -> Vec<UnitView> {
    let predefined = UnitType::PREDEFINED.iter().map(|unit_type| UnitView {
        unit_type: *unit_type,
        enabled: shape_units
            .iter()
            .any(|u| u.unit_type == *unit_type && u.enabled),
        label_key: unit_type.label_key(),
        translation_key: None,
    });

    let custom = shape_units
        .iter()
        .filter(|u| u.unit_type == UnitType::Custom)
        .map(|u| UnitView {
            unit_type: UnitType::Custom,
            enabled: u.enabled,
            label_key: u
                .translation_key
                .clone()
                .unwrap_or_else(|| UnitType::Custom.label_key()),
            translation_key: u.translation_key.clone(),
        });

    predefined.chain(custom).collect()
}

/// Collapses expanded rows back to the canonical unit list: every enabled
/// row becomes an enabled unit, disabled rows are dropped.
pub fn parse_units(views: &[UnitView]) -> Vec<Unit> {
    views
        .iter()
        .filter(|view| view.enabled)
        .map(|view| Unit {
            unit_type: view.unit_type,
            enabled: true,
            translation_key: view.translation_key.clone(),
        })
        .collect()
}
