//! Fixed-capacity contact slots with an address index

use std::collections::HashMap;

use crate::aircraft::Contact;

/// Dense array of contact slots, keyed by address through a side index.
///
/// Each live address occupies exactly one slot. Slot positions are stable
/// until the contact is cleared or replaced.
#[derive(Debug, Clone)]
pub(crate) struct SlotTable {
    slots: Vec<Option<Contact>>,
    index: HashMap<u32, usize>,
}

impl SlotTable {
    pub fn new(capacity: usize) -> Self {
        SlotTable {
            slots: vec![None; capacity],
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn find(&self, address: u32) -> Option<usize> {
        self.index.get(&address).copied()
    }

    pub fn get(&self, slot: usize) -> Option<&Contact> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Contact> {
        self.slots.get_mut(slot).and_then(|s| s.as_mut())
    }

    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    /// Put a contact into a slot, returning whatever it displaced
    pub fn put(&mut self, slot: usize, contact: Contact) -> Option<Contact> {
        let address = contact.address;
        let old = self.slots[slot].replace(contact);
        if let Some(old) = &old {
            self.index.remove(&old.address);
        }
        self.index.insert(address, slot);
        old
    }

    pub fn clear(&mut self, slot: usize) -> Option<Contact> {
        let old = self.slots.get_mut(slot).and_then(|s| s.take());
        if let Some(old) = &old {
            self.index.remove(&old.address);
        }
        old
    }

    pub fn clear_all(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.index.clear();
    }

    /// Occupied slots with their positions
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Contact)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|c| (i, c)))
    }

    /// Positions of occupied slots, for mutation without holding a borrow
    pub fn occupied(&self) -> Vec<usize> {
        self.iter().map(|(i, _)| i).collect()
    }
}
