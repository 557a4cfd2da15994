//! Capability-gated editability of shape fields.
//!
//! Shipping and online payments only make sense when the community runs a
//! transaction process with pre-authorization. Without it both fields are
//! locked: the mask reports them as not editable and write requests have
//! them stripped before validation, so the stored values stay untouched.

use serde::{Deserialize, Serialize};
use shapekit_model::{ShapeField, ShapeInput};
use shapekit_types::{ProcessKind, TransactionProcess};
use std::collections::BTreeMap;

/// Per-request capabilities of a community, derived from its transaction
/// processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub preauthorize_available: bool,
}

impl CapabilitySet {
    pub fn from_processes(processes: &[TransactionProcess]) -> Self {
        Self {
            preauthorize_available: processes
                .iter()
                .any(|p| p.process == ProcessKind::Preauthorize),
        }
    }

    /// A community with a pre-authorizing process.
    pub fn with_preauthorize() -> Self {
        Self {
            preauthorize_available: true,
        }
    }
}

/// Field -> editable mapping for one community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditableFields {
    fields: BTreeMap<ShapeField, bool>,
}

impl EditableFields {
    pub fn is_editable(&self, field: ShapeField) -> bool {
        self.fields.get(&field).copied().unwrap_or(false)
    }

    /// Fields the community may not change.
    pub fn locked(&self) -> impl Iterator<Item = ShapeField> + '_ {
        self.fields
            .iter()
            .filter(|(_, editable)| !**editable)
            .map(|(field, _)| *field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeField, bool)> + '_ {
        self.fields.iter().map(|(field, editable)| (*field, *editable))
    }
}

/// Computes which fields are editable under `capabilities`.
pub fn editable_mask(capabilities: &CapabilitySet) -> EditableFields {
    let fields = ShapeField::ALL
        .into_iter()
        .map(|field| {
            let editable = match field {
                ShapeField::ShippingEnabled | ShapeField::OnlinePayments => {
                    capabilities.preauthorize_available
                }
                ShapeField::Name | ShapeField::PriceEnabled | ShapeField::Units => true,
            };
            (field, editable)
        })
        .collect();

    EditableFields { fields }
}

/// Removes every locked field from a write request.
pub fn filter_uneditable(mut input: ShapeInput, capabilities: &CapabilitySet) -> ShapeInput {
    let mask = editable_mask(capabilities);
    for field in mask.locked() {
        input.clear(field);
    }
    input
}
