//! Browser DOM backend.
//!
//! Only compiled for `wasm32` targets, where `reqwest` runs on the Fetch API.

use crate::{
    dom::{Document, InsertionPoint},
    FidoError, Result,
};

impl Document for web_sys::Document {
    type Target = web_sys::Element;

    fn target_by_id(&self, id: &str) -> Option<web_sys::Element> {
        self.get_element_by_id(id)
    }
}

impl InsertionPoint for web_sys::Element {
    fn append_html(&self, html: &str) -> Result<()> {
        self.insert_adjacent_html("beforeend", html).map_err(|err| {
            FidoError::Insert(format!(
                "insertAdjacentHTML into id={} failed: {err:?}",
                self.id()
            ))
        })
    }
}

/// Returns the page's `document`, if running in a window context.
pub fn window_document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}
