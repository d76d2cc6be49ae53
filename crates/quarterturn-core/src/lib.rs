//! Quarterturn Core - thumbnail rotation engine
//!
//! This crate provides the host-independent part of Quarterturn: selecting
//! thumbnails, previewing quarter-turn rotations, and committing them to a
//! backend one request at a time.
//!
//! # Module Structure
//!
//! - `identity` - Stable identity keys for thumbnails
//! - `state` - Pending angles and the selection set
//! - `session` - The controller that owns thumbnails, state and surface
//! - `surface` - Visual side effects (outline, preview, source swap)
//! - `commit` - Sequential commit pipeline and reply classification
//! - `config` - Serde-backed configuration
//!
//! # Example
//!
//! ```ignore
//! use quarterturn_core::{CommitPipeline, MemorySurface, RotationSession, ThumbnailRef};
//!
//! let refs = vec![ThumbnailRef::new(Some("a.jpg".into()), "/thumbs/a.jpg")];
//! let session = RefCell::new(RotationSession::init(refs, MemorySurface::new(1), Default::default()));
//! session.borrow_mut().toggle_selection(0);
//! session.borrow_mut().adjust_selection(90);
//!
//! let summary = CommitPipeline::new(backend).commit(&session).await?;
//! ```

pub mod commit;
pub mod config;
pub mod identity;
pub mod session;
pub mod state;
pub mod surface;

pub use commit::{
    classify, CommitError, CommitPipeline, CommitReport, CommitSummary, RotateBackend,
    RotateOutcome, RotateReply, RotateRequest, TransportError,
};
pub use config::{AnglePolicy, ConfigError, ControlIds, RotatorConfig};
pub use identity::{resolve, IdentityKey, ThumbnailRef};
pub use session::{PendingEntry, RotationSession};
pub use state::RotationState;
pub use surface::{MemorySurface, ThumbnailSurface};
