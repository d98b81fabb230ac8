// SPDX-License-Identifier: MIT

//! Containment/equipment registry, containment half. A bidirectional
//! "X is in Y" graph kept as two maps so both directions are O(1); the
//! no-cycles forest invariant is enforced at `add`/`move_to` time by
//! walking ancestors rather than checked after the fact.

use std::collections::HashMap;

use jit_core::{ContainmentError, ObjectId};

#[derive(Debug, Default)]
pub struct ContainmentRegistry {
    child_to_parent: HashMap<ObjectId, ObjectId>,
    parent_to_children: HashMap<ObjectId, Vec<ObjectId>>,
}

impl ContainmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_container(&self, child: &ObjectId) -> Option<&ObjectId> {
        self.child_to_parent.get(child)
    }

    pub fn get_contents(&self, container: &ObjectId) -> &[ObjectId] {
        self.parent_to_children
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Establishes `child`'s containment edge under `container`. Rejects
    /// the edge if `child` is not already detached (callers use `move_to`
    /// for the general case).
    pub fn add(&mut self, container: ObjectId, child: ObjectId) -> Result<(), ContainmentError> {
        if self.would_cycle(&container, &child) {
            return Err(ContainmentError::Cycle {
                child,
                target: container,
            });
        }
        self.child_to_parent.insert(child.clone(), container.clone());
        self.parent_to_children.entry(container).or_default().push(child);
        Ok(())
    }

    pub fn remove(&mut self, child: &ObjectId) -> Result<ObjectId, ContainmentError> {
        let parent = self
            .child_to_parent
            .remove(child)
            .ok_or_else(|| ContainmentError::NotContained {
                child: child.clone(),
            })?;
        if let Some(children) = self.parent_to_children.get_mut(&parent) {
            children.retain(|c| c != child);
        }
        Ok(parent)
    }

    /// Atomic remove-from-old/add-to-new; one observable state throughout.
    /// A child with no prior container moves in cleanly.
    pub fn move_to(&mut self, child: ObjectId, new_container: ObjectId) -> Result<(), ContainmentError> {
        if self.would_cycle(&new_container, &child) {
            return Err(ContainmentError::Cycle {
                child,
                target: new_container,
            });
        }
        let _ = self.remove(&child);
        self.add(new_container, child)
    }

    /// True if placing `child` under `target` would create a cycle: either
    /// `target == child`, or `child` is an ancestor of `target`.
    fn would_cycle(&self, target: &ObjectId, child: &ObjectId) -> bool {
        if target == child {
            return true;
        }
        let mut cursor = target;
        while let Some(parent) = self.child_to_parent.get(cursor) {
            if parent == child {
                return true;
            }
            cursor = parent;
        }
        false
    }

    /// Every `(child, parent)` edge, for snapshot capture.
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &ObjectId)> {
        self.child_to_parent.iter()
    }

    /// Drops every edge touching `id`, both as child and as container
    /// (used by destruct/unload).
    pub fn purge(&mut self, id: &ObjectId) {
        let _ = self.remove(id);
        if let Some(children) = self.parent_to_children.remove(id) {
            for child in children {
                self.child_to_parent.remove(&child);
            }
        }
    }
}

#[cfg(test)]
#[path = "containment_tests.rs"]
mod tests;
