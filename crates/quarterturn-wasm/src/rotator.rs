//! The `ImageRotator` class exposed to JavaScript.
//!
//! Wires a [`RotationSession`] over the page's thumbnails to click handlers on
//! the thumbnails and the rotation controls, and commits through
//! [`FetchBackend`].

use crate::dom::{enumerate_thumbnails, DomSurface};
use crate::fetch::FetchBackend;
use crate::logger;
use gloo::events::EventListener;
use log::{info, warn};
use quarterturn_core::{CommitPipeline, RotationSession, RotatorConfig};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::Document;

type SharedSession = Rc<RefCell<RotationSession<DomSurface>>>;
type SharedPipeline = Rc<CommitPipeline<FetchBackend>>;

/// Pending rotation as seen from JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PendingEntryJs {
    slot: usize,
    key: String,
    filename: Option<String>,
    degrees: i32,
    selected: bool,
}

/// Thumbnail rotation controller for one page.
///
/// # Example (TypeScript)
///
/// ```typescript
/// import init, { ImageRotator } from '@quarterturn/wasm';
///
/// await init();
/// const rotator = new ImageRotator({ endpoint: '/image/rotate' });
/// rotator.attach();
///
/// // Or drive it programmatically
/// rotator.toggle(0);
/// rotator.rotate_clockwise();
/// const report = await rotator.save();
/// console.log(`${report.succeeded} rotated, ${report.failures.length} failed`);
/// ```
#[wasm_bindgen]
pub struct ImageRotator {
    session: SharedSession,
    pipeline: SharedPipeline,
    config: RotatorConfig,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl ImageRotator {
    /// Create a rotator over the thumbnails currently on the page.
    ///
    /// # Arguments
    /// * `config` - Partial config object, or `undefined` for defaults
    ///
    /// # Errors
    /// Returns error if the config is invalid or there is no document
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ImageRotator, JsValue> {
        let config = parse_config(config)?;
        logger::install(config.log_level);

        let document = document()?;
        let thumbs = enumerate_thumbnails(&document, &config)?;
        let count = thumbs.refs.len();
        let surface = DomSurface::new(thumbs.elements, &config);
        let session = RotationSession::init(thumbs.refs, surface, config.angle_policy);
        let pipeline = CommitPipeline::new(FetchBackend::new(config.endpoint.as_str()))
            .with_cache_bust_param(config.cache_bust_param.as_str());
        info!("found {count} thumbnails");

        Ok(ImageRotator {
            session: Rc::new(RefCell::new(session)),
            pipeline: Rc::new(pipeline),
            config,
            listeners: Vec::new(),
        })
    }

    /// Bind click handlers to the thumbnails and the control buttons.
    ///
    /// Controls missing from the page are skipped with a warning. Calling
    /// `attach` again replaces the previous bindings.
    pub fn attach(&mut self) -> Result<(), JsValue> {
        self.detach();
        let document = document()?;

        let elements = self.session.borrow().surface().elements().to_vec();
        for (slot, img) in elements.iter().enumerate() {
            let session = Rc::clone(&self.session);
            self.listeners.push(EventListener::new(img, "click", move |_| {
                session.borrow_mut().toggle_selection(slot);
            }));
        }

        let step = self.config.step_degrees;
        let controls = self.config.controls.clone();

        let session = Rc::clone(&self.session);
        self.bind_control(&document, &controls.clockwise, move || {
            session.borrow_mut().adjust_selection(step)
        });

        let session = Rc::clone(&self.session);
        self.bind_control(&document, &controls.anticlockwise, move || {
            session.borrow_mut().adjust_selection(-step)
        });

        let session = Rc::clone(&self.session);
        self.bind_control(&document, &controls.cancel, move || {
            session.borrow_mut().cancel_all()
        });

        let session = Rc::clone(&self.session);
        let pipeline = Rc::clone(&self.pipeline);
        self.bind_control(&document, &controls.save, move || {
            let session = Rc::clone(&session);
            let pipeline = Rc::clone(&pipeline);
            spawn_local(async move {
                // A rejected concurrent commit is already logged
                let _ = pipeline.commit(&*session).await;
            });
        });

        Ok(())
    }

    /// Remove every event binding made by `attach`.
    pub fn detach(&mut self) {
        self.listeners.clear();
    }

    /// Toggle selection of the thumbnail at `slot`.
    ///
    /// Returns the new selection state, or `undefined` when the slot does not
    /// exist or its thumbnail cannot be identified.
    pub fn toggle(&self, slot: usize) -> Option<bool> {
        self.session.borrow_mut().toggle_selection(slot)
    }

    /// Rotate the selection by one step clockwise.
    pub fn rotate_clockwise(&self) {
        self.rotate_by(self.config.step_degrees);
    }

    /// Rotate the selection by one step anticlockwise.
    pub fn rotate_anticlockwise(&self) {
        self.rotate_by(-self.config.step_degrees);
    }

    /// Rotate the selection by an arbitrary number of degrees.
    pub fn rotate_by(&self, degrees: i32) {
        self.session.borrow_mut().adjust_selection(degrees);
    }

    /// Drop every selection and pending rotation.
    pub fn cancel(&self) {
        self.session.borrow_mut().cancel_all();
    }

    /// Commit pending rotations.
    ///
    /// Resolves with `{ succeeded, failures: [{ filename, reason }], abandoned }`.
    /// Rejects only if another commit is still running.
    pub fn save(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let pipeline = Rc::clone(&self.pipeline);
        future_to_promise(async move {
            let summary = pipeline
                .commit(&*session)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            serde_wasm_bindgen::to_value(&summary.report())
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Pending rotations in document order.
    pub fn pending(&self) -> Result<JsValue, JsValue> {
        let entries = pending_entries(&*self.session.borrow());
        serde_wasm_bindgen::to_value(&entries).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn thumbnail_count(&self) -> usize {
        self.session.borrow().thumbnails().len()
    }

    #[wasm_bindgen(getter)]
    pub fn selected_count(&self) -> usize {
        self.session.borrow().selected_count()
    }

    #[wasm_bindgen(getter)]
    pub fn pending_count(&self) -> usize {
        self.session.borrow().pending_count()
    }

    #[wasm_bindgen(getter)]
    pub fn is_committing(&self) -> bool {
        self.session.borrow().is_committing()
    }
}

impl ImageRotator {
    fn bind_control(&mut self, document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        match document.get_element_by_id(id) {
            Some(element) => {
                self.listeners
                    .push(EventListener::new(&element, "click", move |_| handler()));
            }
            None => warn!("control #{id} not found, skipping"),
        }
    }
}

/// Parse a JS config object, `undefined` and `null` meaning defaults.
pub(crate) fn parse_config(value: JsValue) -> Result<RotatorConfig, JsValue> {
    let config = if value.is_undefined() || value.is_null() {
        RotatorConfig::default()
    } else {
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&format!("Invalid rotator config: {}", e)))?
    };
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config)
}

pub(crate) fn pending_entries<S: quarterturn_core::ThumbnailSurface>(
    session: &RotationSession<S>,
) -> Vec<PendingEntryJs> {
    session
        .pending_entries()
        .map(|entry| PendingEntryJs {
            slot: entry.slot,
            key: entry.key.to_string(),
            filename: entry.thumbnail.request_filename(),
            degrees: entry.degrees,
            selected: session.is_selected(entry.key),
        })
        .collect()
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("No document available"))
}
