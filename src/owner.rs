use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Arena slot of an owner: slot index plus the slot version at insert time.
    pub struct OwnerKey;
}

/// Arena of owner objects that timers may be bound to.
///
/// Destroying an owner frees its slot. A later [`spawn`](Owners::spawn) may
/// reuse the slot, but with a bumped version, so references to the destroyed
/// owner never resolve to the new one.
pub struct Owners<O> {
    slots: SlotMap<OwnerKey, O>,
}

impl<O> Default for Owners<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Owners<O> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn spawn(&mut self, owner: O) -> OwnerRef {
        OwnerRef(self.slots.insert(owner))
    }

    /// Removes the owner. Timers bound to it are evicted on the next advance.
    pub fn destroy(&mut self, owner: OwnerRef) -> Option<O> {
        self.slots.remove(owner.0)
    }

    #[inline(always)]
    pub fn get(&self, owner: OwnerRef) -> Option<&O> {
        self.slots.get(owner.0)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, owner: OwnerRef) -> Option<&mut O> {
        self.slots.get_mut(owner.0)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OwnerRef, &O)> {
        self.slots.iter().map(|(key, owner)| (OwnerRef(key), owner))
    }
}

/// Weak reference to an owner in an [`Owners`] arena.
///
/// The wrapped key carries the slot version seen at wrap time; the owner is
/// alive only while the slot is occupied at that same version. Holding an
/// `OwnerRef` never keeps anything alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OwnerRef(OwnerKey);

impl OwnerRef {
    /// Wraps a raw key. The null key gives the empty reference.
    pub fn wrap(key: OwnerKey) -> Self {
        Self(key)
    }

    #[inline(always)]
    pub fn key(self) -> OwnerKey {
        self.0
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.0.is_null()
    }

    #[inline(always)]
    pub fn is_alive<O>(self, owners: &Owners<O>) -> bool {
        owners.slots.contains_key(self.0)
    }

    #[inline(always)]
    pub fn resolve<O>(self, owners: &Owners<O>) -> Option<&O> {
        owners.slots.get(self.0)
    }

    #[inline(always)]
    pub fn resolve_mut<O>(self, owners: &mut Owners<O>) -> Option<&mut O> {
        owners.slots.get_mut(self.0)
    }
}
