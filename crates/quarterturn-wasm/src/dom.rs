//! DOM side of the rotator.
//!
//! Finds the thumbnail `<img>` elements on the page and renders the session's
//! visual state onto them through inline styles and a selection class.

use quarterturn_core::{RotatorConfig, ThumbnailRef, ThumbnailSurface};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlImageElement};

/// Attribute the assigned per-element index is written to.
const INDEX_ATTRIBUTE: &str = "data-image-index";

/// Thumbnail elements in document order, with their static attributes.
pub(crate) struct Thumbnails {
    pub elements: Vec<HtmlImageElement>,
    pub refs: Vec<ThumbnailRef>,
}

/// Enumerate `img.{thumbnail_class}` elements and assign indices 0, 1, 2, ...
pub(crate) fn enumerate_thumbnails(
    document: &Document,
    config: &RotatorConfig,
) -> Result<Thumbnails, JsValue> {
    let selector = format!("img.{}", config.thumbnail_class);
    let nodes = document.query_selector_all(&selector)?;

    let mut elements = Vec::with_capacity(nodes.length() as usize);
    let mut refs = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        let Some(img) = nodes
            .item(i)
            .and_then(|node| node.dyn_into::<HtmlImageElement>().ok())
        else {
            continue;
        };
        let index = elements.len();
        let filename = img.get_attribute(&config.filename_attribute);
        let _ = img.set_attribute(INDEX_ATTRIBUTE, &index.to_string());
        set_style(&img, "cursor", "pointer");

        refs.push(ThumbnailRef::new(filename, img.src()).with_index(index));
        elements.push(img);
    }

    Ok(Thumbnails { elements, refs })
}

/// Renders selection and rotation preview onto thumbnail elements.
pub struct DomSurface {
    elements: Vec<HtmlImageElement>,
    selected_class: String,
    outline: String,
    transition: String,
}

impl DomSurface {
    pub(crate) fn new(elements: Vec<HtmlImageElement>, config: &RotatorConfig) -> Self {
        Self {
            elements,
            selected_class: config.selected_class.clone(),
            outline: config.outline.clone(),
            transition: config.transition.clone(),
        }
    }

    pub(crate) fn elements(&self) -> &[HtmlImageElement] {
        &self.elements
    }

    fn element(&self, slot: usize) -> Option<&HtmlImageElement> {
        self.elements.get(slot)
    }
}

impl ThumbnailSurface for DomSurface {
    fn mark_selected(&mut self, slot: usize, selected: bool) {
        let Some(img) = self.element(slot) else { return };
        let classes = img.class_list();
        if selected {
            let _ = classes.add_1(&self.selected_class);
            set_style(img, "box-sizing", "border-box");
            set_style(img, "outline", &self.outline);
        } else {
            let _ = classes.remove_1(&self.selected_class);
            set_style(img, "outline", "");
        }
    }

    fn preview_rotation(&mut self, slot: usize, degrees: i32) {
        let Some(img) = self.element(slot) else { return };
        set_style(img, "transition", &self.transition);
        set_style(img, "transform", &rotate_transform(degrees));
    }

    fn clear_preview(&mut self, slot: usize) {
        let Some(img) = self.element(slot) else { return };
        let _ = img.class_list().remove_1(&self.selected_class);
        set_style(img, "transform", "");
        set_style(img, "outline", "");
    }

    fn replace_source(&mut self, slot: usize, src: &str) {
        if let Some(img) = self.element(slot) {
            img.set_src(src);
        }
    }

    fn cache_token(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

/// CSS transform previewing a rotation.
pub(crate) fn rotate_transform(degrees: i32) -> String {
    format!("rotate({degrees}deg)")
}

fn set_style(img: &HtmlImageElement, property: &str, value: &str) {
    if let Err(err) = img.style().set_property(property, value) {
        log::debug!("failed to set {property}: {err:?}");
    }
}


/// Browser tests. Run with `wasm-pack test --headless --chrome`.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_enumerate_reads_filename_and_assigns_index() {
        let doc = document();
        let body = doc.body().unwrap();
        body.set_inner_html(
            r#"<img class="allocation-thumbnail" data-image-filename="a.jpg" src="/t/a.jpg">
               <img class="allocation-thumbnail" src="/t/b.jpg?v=1">
               <img class="other" src="/t/c.jpg">"#,
        );

        let thumbs = enumerate_thumbnails(&doc, &RotatorConfig::default()).unwrap();
        assert_eq!(thumbs.elements.len(), 2);
        assert_eq!(thumbs.refs[0].filename.as_deref(), Some("a.jpg"));
        assert_eq!(thumbs.refs[1].filename, None);
        assert_eq!(thumbs.refs[1].index, Some(1));
        assert_eq!(
            thumbs.elements[1].get_attribute(INDEX_ATTRIBUTE).as_deref(),
            Some("1")
        );
    }

    #[wasm_bindgen_test]
    fn test_surface_applies_and_clears_styles() {
        let doc = document();
        let body = doc.body().unwrap();
        body.set_inner_html(r#"<img class="allocation-thumbnail" src="/t/a.jpg">"#);
        let config = RotatorConfig::default();
        let thumbs = enumerate_thumbnails(&doc, &config).unwrap();
        let mut surface = DomSurface::new(thumbs.elements, &config);

        surface.mark_selected(0, true);
        surface.preview_rotation(0, 90);
        let img = &surface.elements()[0];
        assert!(img.class_list().contains("selected-for-rotation"));
        assert_eq!(
            img.style().get_property_value("transform").unwrap(),
            "rotate(90deg)"
        );

        surface.clear_preview(0);
        let img = &surface.elements()[0];
        assert!(!img.class_list().contains("selected-for-rotation"));
        assert_eq!(img.style().get_property_value("transform").unwrap(), "");
    }
}
