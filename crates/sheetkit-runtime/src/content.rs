#![forbid(unsafe_code)]

//! The narrow interface the sheet consumes content through.
//!
//! Content is shared as [`ContentRef`] (`Rc<dyn SheetContent>`). The
//! controller holds a unit while it is queued or displayed and calls
//! [`SheetContent::destroy`] exactly once when the unit is dropped by a
//! context change.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a content unit. Allocate one per unit with [`ContentId::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(u64);

impl ContentId {
    /// Allocate a fresh, process-unique id.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_CONTENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content#{}", self.0)
    }
}

/// Opaque handle to something the host can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// A logical unit of sheet content.
pub trait SheetContent {
    fn id(&self) -> ContentId;

    /// Scheduling priority. Higher values win.
    fn priority(&self) -> i32 {
        0
    }

    /// Surface shown in the sheet body.
    fn render_surface(&self) -> SurfaceId;

    /// Surface replacing the default toolbar, if any.
    fn toolbar_override(&self) -> Option<SurfaceId> {
        None
    }

    /// Vertical scroll position of the content; > 0 means it can scroll up.
    fn scroll_offset(&self) -> f32 {
        0.0
    }

    /// Give the content first refusal of a back press.
    fn handle_back_press(&self) -> bool {
        false
    }

    /// Release resources. Called once, when the unit is discarded.
    fn destroy(&self);
}

/// Shared handle to a content unit.
pub type ContentRef = Rc<dyn SheetContent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let a = ContentId::new();
        let b = ContentId::new();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn display() {
        let id = ContentId::new();
        assert_eq!(id.to_string(), format!("content#{}", id.get()));
    }
}
