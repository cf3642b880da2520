//! Entity identity.
//!
//! Entities refer to each other through opaque ids rather than references, so
//! a projectile never keeps its thrower alive and no ownership cycles form.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Allocates a process-wide unique id.
    pub fn new_unique() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_ids_differ() {
        let a = EntityId::new_unique();
        let b = EntityId::new_unique();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
