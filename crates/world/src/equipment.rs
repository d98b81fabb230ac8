// SPDX-License-Identifier: MIT

//! Containment/equipment registry, equipment half. Equipped children are
//! simultaneously contained by their wearer; `unequip` only clears the
//! slot assignment, never containment.

use std::collections::HashMap;

use indexmap::IndexMap;
use jit_core::{ContainmentError, ObjectId};

use crate::containment::ContainmentRegistry;

#[derive(Debug, Default)]
pub struct EquipmentRegistry {
    worn: HashMap<ObjectId, IndexMap<String, ObjectId>>,
}

impl EquipmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `equip` requires the item already contained by the wearer, or moves
    /// it there implicitly.
    pub fn equip(
        &mut self,
        containment: &mut ContainmentRegistry,
        wearer: ObjectId,
        slot: impl Into<String>,
        item: ObjectId,
    ) -> Result<(), ContainmentError> {
        let slot = slot.into();
        if containment.get_container(&item) != Some(&wearer) {
            containment.move_to(item.clone(), wearer.clone())?;
        }
        let slots = self.worn.entry(wearer.clone()).or_default();
        if slots.contains_key(&slot) {
            return Err(ContainmentError::SlotOccupied { wearer, slot });
        }
        slots.insert(slot, item);
        Ok(())
    }

    pub fn unequip(&mut self, wearer: &ObjectId, slot: &str) -> Result<ObjectId, ContainmentError> {
        let slots = self
            .worn
            .get_mut(wearer)
            .ok_or_else(|| ContainmentError::SlotEmpty {
                wearer: wearer.clone(),
                slot: slot.to_string(),
            })?;
        slots
            .shift_remove(slot)
            .ok_or_else(|| ContainmentError::SlotEmpty {
                wearer: wearer.clone(),
                slot: slot.to_string(),
            })
    }

    pub fn get_equipped(&self, wearer: &ObjectId) -> impl Iterator<Item = (&str, &ObjectId)> {
        self.worn
            .get(wearer)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|(s, i)| (s.as_str(), i)))
    }

    pub fn purge(&mut self, id: &ObjectId) {
        self.worn.remove(id);
        for slots in self.worn.values_mut() {
            slots.retain(|_, item| item != id);
        }
    }

    /// Every `(wearer, slot, item)` triple, for snapshot capture.
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &str, &ObjectId)> {
        self.worn
            .iter()
            .flat_map(|(wearer, slots)| slots.iter().map(move |(slot, item)| (wearer, slot.as_str(), item)))
    }
}

#[cfg(test)]
#[path = "equipment_tests.rs"]
mod tests;
