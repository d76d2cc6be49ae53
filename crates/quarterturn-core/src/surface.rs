//! Visual side of the rotation engine.
//!
//! The session never touches a DOM directly. It tells a [`ThumbnailSurface`]
//! what each thumbnail should look like, addressing thumbnails by slot (their
//! position in document order).

/// Receiver of the engine's visual side effects.
pub trait ThumbnailSurface {
    /// Show or hide the selection outline.
    fn mark_selected(&mut self, slot: usize, selected: bool);

    /// Render a rotation preview of `degrees`.
    fn preview_rotation(&mut self, slot: usize, degrees: i32);

    /// Remove both the rotation preview and the selection outline.
    fn clear_preview(&mut self, slot: usize);

    /// Point the thumbnail at a new image source.
    fn replace_source(&mut self, slot: usize, src: &str);

    /// Token appended to a source to invalidate cached copies.
    ///
    /// Must differ between commits for cache busting to take effect, a
    /// millisecond timestamp is the usual choice.
    fn cache_token(&self) -> u64;
}

/// Visual state of a single thumbnail as recorded by [`MemorySurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailVisual {
    pub selected: bool,
    pub rotation: Option<i32>,
    pub src: Option<String>,
}

/// Headless surface that records the visual state of every thumbnail.
///
/// Useful for hosts without a DOM and for exercising the engine in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    visuals: Vec<ThumbnailVisual>,
    token: u64,
}

impl MemorySurface {
    /// Create a surface for `len` thumbnails.
    pub fn new(len: usize) -> Self {
        Self {
            visuals: vec![ThumbnailVisual::default(); len],
            token: 0,
        }
    }

    /// Use a fixed cache-busting token.
    pub fn with_cache_token(mut self, token: u64) -> Self {
        self.token = token;
        self
    }

    pub fn visual(&self, slot: usize) -> Option<&ThumbnailVisual> {
        self.visuals.get(slot)
    }

    fn slot_mut(&mut self, slot: usize) -> &mut ThumbnailVisual {
        if slot >= self.visuals.len() {
            self.visuals.resize(slot + 1, ThumbnailVisual::default());
        }
        &mut self.visuals[slot]
    }
}

impl ThumbnailSurface for MemorySurface {
    fn mark_selected(&mut self, slot: usize, selected: bool) {
        self.slot_mut(slot).selected = selected;
    }

    fn preview_rotation(&mut self, slot: usize, degrees: i32) {
        self.slot_mut(slot).rotation = Some(degrees);
    }

    fn clear_preview(&mut self, slot: usize) {
        let visual = self.slot_mut(slot);
        visual.selected = false;
        visual.rotation = None;
    }

    fn replace_source(&mut self, slot: usize, src: &str) {
        self.slot_mut(slot).src = Some(src.to_string());
    }

    fn cache_token(&self) -> u64 {
        self.token
    }
}
