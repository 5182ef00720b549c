//! Form field identifiers and the per-field error map.

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use super::entities::AddressSide;
use super::messages::MessageKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum FieldId {
    ServiceKind,
    Origin,
    Destination,
    Weight,
    Volumes,
    Dimensions,
    ClientName,
    ClientEmail,
}

impl From<AddressSide> for FieldId {
    fn from(side: AddressSide) -> Self {
        match side {
            AddressSide::Origin => FieldId::Origin,
            AddressSide::Destination => FieldId::Destination,
        }
    }
}

/// One optional message per form field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    slots: [Option<MessageKey>; FieldId::COUNT],
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: FieldId, message: MessageKey) {
        self.slots[field as usize] = Some(message);
    }

    pub fn clear(&mut self, field: FieldId) {
        self.slots[field as usize] = None;
    }

    pub fn clear_all(&mut self) {
        self.slots = Default::default();
    }

    pub fn get(&self, field: FieldId) -> Option<MessageKey> {
        self.slots[field as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Fields that currently carry an error, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, MessageKey)> + '_ {
        FieldId::iter().filter_map(|field| self.get(field).map(|message| (field, message)))
    }

    /// Copies every error set in `other` over this map.
    pub fn merge(&mut self, other: &FieldErrors) {
        for (field, message) in other.iter() {
            self.set(field, message);
        }
    }
}
