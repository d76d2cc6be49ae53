//! The rotation session: one explicitly owned controller per set of thumbnails.
//!
//! A [`RotationSession`] owns the enumerated thumbnails, their identity keys,
//! the selection and angle state, and the surface that renders it. Several
//! sessions can live on one page without sharing anything.

use crate::config::AnglePolicy;
use crate::identity::{resolve, IdentityKey, ThumbnailRef};
use crate::state::RotationState;
use crate::surface::ThumbnailSurface;
use log::{debug, info, warn};
use std::collections::HashSet;

/// A thumbnail as tracked by the session.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    reference: ThumbnailRef,
    key: Option<IdentityKey>,
    display_src: String,
}

impl Thumbnail {
    pub fn reference(&self) -> &ThumbnailRef {
        &self.reference
    }

    /// Identity key, `None` for thumbnails that cannot be keyed.
    pub fn key(&self) -> Option<&IdentityKey> {
        self.key.as_ref()
    }

    /// Source the thumbnail currently displays.
    pub fn display_src(&self) -> &str {
        &self.display_src
    }
}

/// One thumbnail with a non-zero pending angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEntry<'a> {
    pub slot: usize,
    pub thumbnail: &'a ThumbnailRef,
    pub key: &'a IdentityKey,
    pub degrees: i32,
}

/// Lazy iterator over pending entries in document order.
///
/// Nothing is computed until the iterator is advanced. Each call to
/// [`RotationSession::pending_entries`] starts a fresh pass.
#[derive(Clone)]
pub struct PendingEntries<'a> {
    thumbnails: std::iter::Enumerate<std::slice::Iter<'a, Thumbnail>>,
    state: &'a RotationState,
}

impl<'a> Iterator for PendingEntries<'a> {
    type Item = PendingEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for (slot, thumbnail) in self.thumbnails.by_ref() {
            let Some(key) = thumbnail.key.as_ref() else {
                continue;
            };
            let degrees = self.state.angle(key);
            if degrees != 0 {
                return Some(PendingEntry {
                    slot,
                    thumbnail: &thumbnail.reference,
                    key,
                    degrees,
                });
            }
        }
        None
    }
}

/// Selection, preview and pending-rotation controller.
pub struct RotationSession<S> {
    thumbnails: Vec<Thumbnail>,
    state: RotationState,
    surface: S,
    generation: u64,
    committing: bool,
}

impl<S: ThumbnailSurface> RotationSession<S> {
    /// Start a session over thumbnails enumerated in document order.
    ///
    /// Thumbnails without an index receive their position. Keys that collide
    /// with an earlier thumbnail are made unique by appending the index.
    pub fn init(refs: Vec<ThumbnailRef>, surface: S, policy: AnglePolicy) -> Self {
        let mut seen = HashSet::new();
        let thumbnails = refs
            .into_iter()
            .enumerate()
            .map(|(slot, mut reference)| {
                let index = *reference.index.get_or_insert(slot);
                let key = resolve(&reference).map(|key| {
                    if !seen.contains(&key) {
                        return key;
                    }
                    // A suffixed key may itself be taken by an explicit filename
                    let mut unique = key.disambiguate(index);
                    while seen.contains(&unique) {
                        unique = unique.disambiguate(index);
                    }
                    warn!("duplicate thumbnail key {key}, using {unique}");
                    unique
                });
                if let Some(key) = &key {
                    seen.insert(key.clone());
                }
                let display_src = reference.src.clone();
                Thumbnail {
                    reference,
                    key,
                    display_src,
                }
            })
            .collect();

        Self {
            thumbnails,
            state: RotationState::new(policy),
            surface,
            generation: 0,
            committing: false,
        }
    }

    /// Toggle selection of the thumbnail at `slot`.
    ///
    /// Returns the new selection state, or `None` when the slot does not
    /// exist. Every initialized thumbnail carries an index, so any existing
    /// slot has a key.
    pub fn toggle_selection(&mut self, slot: usize) -> Option<bool> {
        let Some(key) = self.key_of(slot).cloned() else {
            debug!("ignoring selection of missing slot {slot}");
            return None;
        };

        let selected = self.state.toggle(&key);
        self.surface.mark_selected(slot, selected);
        if selected {
            self.surface.preview_rotation(slot, self.state.angle(&key));
            info!("selected {key}");
        } else {
            info!("deselected {key}");
        }
        Some(selected)
    }

    /// Add `delta` degrees to every selected thumbnail and refresh the preview.
    pub fn adjust_selection(&mut self, delta: i32) {
        if self.state.selected_count() == 0 {
            return;
        }
        self.state.adjust(delta);

        for (slot, thumbnail) in self.thumbnails.iter().enumerate() {
            let Some(key) = &thumbnail.key else { continue };
            if self.state.is_selected(key) {
                let degrees = self.state.angle(key);
                self.surface.preview_rotation(slot, degrees);
                info!("preview {key} -> {degrees}°");
            }
        }
    }

    /// Clear every selection and pending angle, and reset all visuals.
    pub fn cancel_all(&mut self) {
        self.state.clear();
        for slot in 0..self.thumbnails.len() {
            self.surface.clear_preview(slot);
        }
        self.generation += 1;
        info!("cancelled all pending rotations");
    }

    /// Explicit lifecycle alias of [`cancel_all`](Self::cancel_all).
    pub fn reset(&mut self) {
        self.cancel_all();
    }

    /// Thumbnails with a non-zero pending angle, selected or not.
    pub fn pending_entries(&self) -> PendingEntries<'_> {
        PendingEntries {
            thumbnails: self.thumbnails.iter().enumerate(),
            state: &self.state,
        }
    }

    pub fn pending_angle(&self, key: &IdentityKey) -> i32 {
        self.state.angle(key)
    }

    pub fn is_selected(&self, key: &IdentityKey) -> bool {
        self.state.is_selected(key)
    }

    pub fn is_tracked(&self, key: &IdentityKey) -> bool {
        self.state.is_tracked(key)
    }

    pub fn key_of(&self, slot: usize) -> Option<&IdentityKey> {
        self.thumbnails.get(slot)?.key.as_ref()
    }

    pub fn display_source(&self, slot: usize) -> Option<&str> {
        self.thumbnails.get(slot).map(Thumbnail::display_src)
    }

    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    pub fn selected_count(&self) -> usize {
        self.state.selected_count()
    }

    pub fn pending_count(&self) -> usize {
        self.state.pending_count()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_committing(&self) -> bool {
        self.committing
    }

    /// Counter bumped by every [`cancel_all`](Self::cancel_all).
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_committing(&mut self, committing: bool) {
        self.committing = committing;
    }

    /// Point the thumbnail at a new source, both in the session and on screen.
    pub(crate) fn replace_source(&mut self, slot: usize, src: String) {
        if let Some(thumbnail) = self.thumbnails.get_mut(slot) {
            self.surface.replace_source(slot, &src);
            thumbnail.display_src = src;
        }
    }

    /// Drop all state for a committed thumbnail and clear its visuals.
    pub(crate) fn finish_item(&mut self, slot: usize, key: &IdentityKey) {
        self.state.forget(key);
        self.surface.clear_preview(slot);
    }
}
