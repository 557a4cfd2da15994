use crate::config::ShapeConfig;
use crate::editability::{editable_mask, filter_uneditable, CapabilitySet, EditableFields};
use crate::error::{RejectedShape, ShapeError, ShapeResult};
use crate::reorder::{reorder, PriorityUpdate};
use crate::store::{ListingDirectory, NewShape, ProcessLookup, ShapeStore, ShapeUpdate};
use crate::validate::validate;
use serde::Serialize;
use shapekit_model::{expand_units, Shape, ShapeForm, ShapeInput, UnitView};
use shapekit_types::{CommunityId, ShapeId};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Everything an admin form needs to render a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeView {
    /// `None` for a shape that has not been created yet.
    pub id: Option<ShapeId>,
    pub display_name: Option<String>,
    pub form: ShapeForm,
    pub units: Vec<UnitView>,
    pub editable: EditableFields,
    /// Open listings that closing or deleting the shape would affect.
    pub open_listings: u64,
}

/// Runs shape writes through the editability gate and the validator before
/// they reach the store.
pub struct ShapeService<S, P, L> {
    store: S,
    processes: P,
    listings: L,
    config: ShapeConfig,
}

impl<S, P, L> ShapeService<S, P, L>
where
    S: ShapeStore,
    P: ProcessLookup,
    L: ListingDirectory,
{
    pub fn new(store: S, processes: P, listings: L, config: ShapeConfig) -> Self {
        Self {
            store,
            processes,
            listings,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn listings(&self) -> &L {
        &self.listings
    }

    /// Capabilities of the community, from its current transaction processes.
    pub fn capabilities(&self, community_id: CommunityId) -> ShapeResult<CapabilitySet> {
        let processes = self.processes.processes(community_id)?;
        Ok(CapabilitySet::from_processes(&processes))
    }

    pub fn get(&self, community_id: CommunityId, shape_id: ShapeId) -> ShapeResult<Shape> {
        self.store
            .get(community_id, shape_id, false)?
            .ok_or(ShapeError::NotFound {
                community_id,
                shape_id,
            })
    }

    /// The community's shapes in display order.
    pub fn list(&self, community_id: CommunityId, include_categories: bool) -> ShapeResult<Vec<Shape>> {
        Ok(self.store.get_all(community_id, include_categories)?)
    }

    /// View of a blank shape for the "new shape" form.
    pub fn new_view(&self, community_id: CommunityId) -> ShapeResult<ShapeView> {
        let form = ShapeForm::default();
        Ok(ShapeView {
            id: None,
            display_name: None,
            units: expand_units(&form.units),
            form,
            editable: editable_mask(&self.capabilities(community_id)?),
            open_listings: 0,
        })
    }

    /// View of an existing shape for the edit form.
    pub fn edit_view(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        locale: Option<&str>,
    ) -> ShapeResult<ShapeView> {
        let shape = self.get(community_id, shape_id)?;
        let locale = self.config.display_locale(locale);

        Ok(ShapeView {
            id: Some(shape.id),
            display_name: shape
                .display_name(locale, &self.config.default_locale)
                .map(str::to_string),
            units: expand_units(&shape.units),
            form: shape.form(),
            editable: editable_mask(&self.capabilities(community_id)?),
            open_listings: self.listings.count_open_listings(shape_id)?,
        })
    }

    /// Creates a shape after the last one in display order.
    pub fn create(&self, community_id: CommunityId, input: ShapeInput) -> ShapeResult<Shape> {
        let capabilities = self.capabilities(community_id)?;
        let form = filter_uneditable(input, &capabilities).apply_to(&ShapeForm::default());
        let form = Self::checked(community_id, form)?;

        let sort_priority = match self
            .store
            .get_all(community_id, false)?
            .iter()
            .map(|s| s.sort_priority)
            .max()
        {
            None => self.config.first_sort_priority,
            Some(max) => max
                .checked_add(1)
                .ok_or(ShapeError::PriorityOverflow {
                    community_id,
                    after: max,
                })?,
        };

        let shape = self.store.create(
            community_id,
            NewShape {
                form,
                sort_priority,
                categories: BTreeSet::new(),
            },
        )?;
        info!(community_id = %community_id, shape_id = %shape.id, sort_priority, "Listing shape created");
        Ok(shape)
    }

    /// Updates a shape. Locked fields keep their stored values.
    pub fn update(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        input: ShapeInput,
    ) -> ShapeResult<Shape> {
        let current = self.get(community_id, shape_id)?;
        let capabilities = self.capabilities(community_id)?;
        let form = filter_uneditable(input, &capabilities).apply_to(&current.form());
        let form = Self::checked(community_id, form)?;

        let updated = self
            .store
            .update(community_id, shape_id, ShapeUpdate::Form(form))?
            .ok_or(ShapeError::NotFound {
                community_id,
                shape_id,
            })?;
        info!(community_id = %community_id, shape_id = %shape_id, "Listing shape updated");
        Ok(updated)
    }

    /// Puts the community's shapes in the order of `desired` and returns the
    /// priority changes that were written.
    ///
    /// The diff is computed against the snapshot read here; a concurrent
    /// reorder by another admin is not detected (last write wins).
    pub fn reorder(
        &self,
        community_id: CommunityId,
        desired: &[ShapeId],
    ) -> ShapeResult<Vec<PriorityUpdate>> {
        let snapshot: Vec<(ShapeId, i64)> = self
            .store
            .get_all(community_id, false)?
            .iter()
            .map(|s| (s.id, s.sort_priority))
            .collect();

        let updates = reorder(&snapshot, desired).inspect_err(|e| {
            warn!(community_id = %community_id, error = %e, "Rejected shape order");
        })?;
        debug!(community_id = %community_id, changed = updates.len(), ?updates, "Computed shape order diff");

        if !updates.is_empty() {
            self.store.apply_priorities(community_id, &updates)?;
            info!(community_id = %community_id, changed = updates.len(), "Listing shapes reordered");
        }
        Ok(updates)
    }

    /// Closes every open listing of the shape. Returns the number touched.
    pub fn close_listings(&self, community_id: CommunityId, shape_id: ShapeId) -> ShapeResult<u64> {
        self.get(community_id, shape_id)?;
        let closed = self.listings.close_listings(shape_id, false)?;
        info!(community_id = %community_id, shape_id = %shape_id, closed, "Closed listings of shape");
        Ok(closed)
    }

    /// Detaches and closes the shape's listings, then deletes the shape.
    pub fn delete(&self, community_id: CommunityId, shape_id: ShapeId) -> ShapeResult<Shape> {
        self.get(community_id, shape_id)?;
        let detached = self.listings.close_listings(shape_id, true)?;
        let deleted = self
            .store
            .delete(community_id, shape_id)?
            .ok_or(ShapeError::NotFound {
                community_id,
                shape_id,
            })?;
        info!(community_id = %community_id, shape_id = %shape_id, detached, "Listing shape deleted");
        Ok(deleted)
    }

    fn checked(community_id: CommunityId, form: ShapeForm) -> ShapeResult<ShapeForm> {
        match validate(form.clone()) {
            Ok(form) => Ok(form),
            Err(errors) => {
                warn!(community_id = %community_id, %errors, "Rejected listing shape");
                Err(RejectedShape { form, errors }.into())
            }
        }
    }
}
