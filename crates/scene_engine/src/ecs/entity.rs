//! Entity implementation
//!
//! Entities are generational slot keys. Destroying an entity bumps the
//! generation of its slot, so a stale handle never aliases the entity that
//! later reuses the slot.

use slotmap::Key;

slotmap::new_key_type! {
    /// Entity identifier (slot index + generation)
    pub struct Entity;
}

impl Entity {
    /// Slot index of this entity
    pub fn index(self) -> u32 {
        // as_ffi packs the version into the high half and the index into the low half
        (self.data().as_ffi() & 0xffff_ffff) as u32
    }

    /// Generation of the slot at the time this handle was issued
    pub fn generation(self) -> u32 {
        (self.data().as_ffi() >> 32) as u32
    }

    /// Whether this is the null handle that never refers to a live entity
    pub fn is_null_handle(self) -> bool {
        self.is_null()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}
