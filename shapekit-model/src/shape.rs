use crate::{ShapeForm, Unit};
use serde::{Deserialize, Serialize};
use shapekit_types::{CategoryId, CommunityId, ShapeId};
use std::collections::{BTreeMap, BTreeSet};

/// A listing shape as persisted for one community.
///
/// `sort_priority` orders shapes within the community. It is neither unique
/// nor contiguous at rest; readers order by it and break ties by storage
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub community_id: CommunityId,
    /// Display name per locale code.
    pub name: BTreeMap<String, String>,
    pub sort_priority: i64,
    pub shipping_enabled: bool,
    pub online_payments: bool,
    pub price_enabled: bool,
    #[serde(default)]
    pub units: Vec<Unit>,
    /// Present only when the caller asked the store to include categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeSet<CategoryId>>,
}

impl Shape {
    /// The writable part of this shape.
    pub fn form(&self) -> ShapeForm {
        ShapeForm {
            name: self.name.clone(),
            shipping_enabled: self.shipping_enabled,
            online_payments: self.online_payments,
            price_enabled: self.price_enabled,
            units: self.units.clone(),
        }
    }

    /// Overwrites the writable fields with `form`, keeping identity and priority.
    pub fn apply_form(&mut self, form: ShapeForm) {
        self.name = form.name;
        self.shipping_enabled = form.shipping_enabled;
        self.online_payments = form.online_payments;
        self.price_enabled = form.price_enabled;
        self.units = form.units;
    }

    pub fn display_name(&self, locale: &str, fallback_locale: &str) -> Option<&str> {
        pick_translation(&self.name, locale, fallback_locale)
    }
}

/// Picks the translation for `locale`, then `fallback_locale`, then any.
pub fn pick_translation<'a>(
    translations: &'a BTreeMap<String, String>,
    locale: &str,
    fallback_locale: &str,
) -> Option<&'a str> {
    translations
        .get(locale)
        .or_else(|| translations.get(fallback_locale))
        .or_else(|| translations.values().next())
        .map(String::as_str)
}
