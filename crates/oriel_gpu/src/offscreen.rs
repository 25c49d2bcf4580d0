//! Offscreen window pool
//!
//! Hidden native windows used as GL context hosts whenever the active render
//! target is not a visible surface. Native window creation is expensive, so
//! instances are pooled and reused: the pool grows to peak concurrent demand
//! and is only cleared at renderer teardown, never per frame.

use oriel_platform::{NativeHandle, OffscreenWindow, PlatformError, TargetId};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Arena key of a pooled offscreen window
    pub struct OffscreenId;
}

struct PoolEntry<W> {
    window: W,
    /// Live associations referring to this window; 0 = free
    referrers: u32,
}

/// Arena of pooled hidden windows plus the live target associations.
///
/// Invariant: a target has at most one association at a time, and an
/// association pins its window (the window is not handed out again until
/// every referrer releases it).
pub struct OffscreenWindowPool<W> {
    arena: SlotMap<OffscreenId, PoolEntry<W>>,
    /// `None` keys the renderer's own default context host
    associations: FxHashMap<Option<TargetId>, OffscreenId>,
}

impl<W: OffscreenWindow> OffscreenWindowPool<W> {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            associations: FxHashMap::default(),
        }
    }

    /// Resolve `target` to a pooled window, creating the association if
    /// needed. Idempotent while the association is live: a second call for
    /// the same target returns the same window. A free pooled instance is
    /// preferred; a new hidden window is only created when every pooled
    /// instance is busy.
    pub fn allocate(
        &mut self,
        target: Option<TargetId>,
        create: impl FnOnce() -> Result<W, PlatformError>,
    ) -> Result<OffscreenId, PlatformError> {
        if let Some(&id) = self.associations.get(&target) {
            return Ok(id);
        }
        let id = match self.arena.iter().find(|(_, entry)| entry.referrers == 0) {
            Some((id, _)) => id,
            None => {
                let window = create()?;
                let id = self.arena.insert(PoolEntry {
                    window,
                    referrers: 0,
                });
                tracing::debug!(pool_size = self.arena.len(), "created offscreen window");
                id
            }
        };
        self.arena[id].referrers += 1;
        self.associations.insert(target, id);
        Ok(id)
    }

    /// Release `target`'s association. The window returns to the free state
    /// once its referrer count reaches zero. No-op for targets with no live
    /// association.
    pub fn deallocate(&mut self, target: TargetId) {
        if let Some(id) = self.associations.remove(&Some(target)) {
            if let Some(entry) = self.arena.get_mut(id) {
                entry.referrers = entry.referrers.saturating_sub(1);
            }
        }
    }

    /// Native handle of a pooled window
    pub fn handle(&self, id: OffscreenId) -> NativeHandle {
        self.arena[id].window.handle()
    }

    pub fn window(&self, id: OffscreenId) -> &W {
        &self.arena[id].window
    }

    /// Drop every association and drain the pooled windows for destruction.
    /// Only called at renderer teardown.
    pub fn drain(&mut self) -> Vec<W> {
        self.associations.clear();
        let arena = std::mem::take(&mut self.arena);
        arena.into_iter().map(|(_, entry)| entry.window).collect()
    }

    /// Number of windows in the pool (free or busy)
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

impl<W: OffscreenWindow> Default for OffscreenWindowPool<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeWindow(u64);

    impl OffscreenWindow for FakeWindow {
        fn handle(&self) -> NativeHandle {
            NativeHandle(self.0)
        }
    }

    fn pool() -> OffscreenWindowPool<FakeWindow> {
        OffscreenWindowPool::new()
    }

    fn make(counter: &mut u64) -> impl FnOnce() -> Result<FakeWindow, PlatformError> + '_ {
        move || {
            *counter += 1;
            Ok(FakeWindow(*counter))
        }
    }

    #[test]
    fn allocate_is_idempotent_per_live_association() {
        let mut pool = pool();
        let mut counter = 0;
        let target = TargetId(1);
        let first = pool.allocate(Some(target), make(&mut counter)).unwrap();
        let second = pool.allocate(Some(target), make(&mut counter)).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn released_window_is_reused_for_another_target() {
        let mut pool = pool();
        let mut counter = 0;
        let first = pool.allocate(Some(TargetId(1)), make(&mut counter)).unwrap();
        pool.deallocate(TargetId(1));
        let second = pool.allocate(Some(TargetId(2)), make(&mut counter)).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn busy_pool_grows_instead_of_sharing() {
        let mut pool = pool();
        let mut counter = 0;
        let first = pool.allocate(Some(TargetId(1)), make(&mut counter)).unwrap();
        let second = pool.allocate(Some(TargetId(2)), make(&mut counter)).unwrap();
        assert_ne!(first, second);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn default_host_association_is_distinct_from_targets() {
        let mut pool = pool();
        let mut counter = 0;
        let default = pool.allocate(None, make(&mut counter)).unwrap();
        let target = pool.allocate(Some(TargetId(1)), make(&mut counter)).unwrap();
        assert_ne!(default, target);
        // releasing the target must not free the default host
        pool.deallocate(TargetId(1));
        let again = pool.allocate(None, make(&mut counter)).unwrap();
        assert_eq!(default, again);
    }

    #[test]
    fn deallocate_unknown_target_is_a_no_op() {
        let mut pool = pool();
        pool.deallocate(TargetId(42));
        assert!(pool.is_empty());
    }

    #[test]
    fn drain_empties_pool_and_associations() {
        let mut pool = pool();
        let mut counter = 0;
        pool.allocate(Some(TargetId(1)), make(&mut counter)).unwrap();
        pool.allocate(Some(TargetId(2)), make(&mut counter)).unwrap();
        let windows = pool.drain();
        assert_eq!(windows.len(), 2);
        assert!(pool.is_empty());
        // a fresh allocation creates a new window
        let id = pool.allocate(Some(TargetId(1)), make(&mut counter)).unwrap();
        assert_eq!(pool.handle(id), NativeHandle(3));
    }
}
