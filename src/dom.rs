//! Insertion targets for rendered markup.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::Result;

/// A document whose elements can be resolved by id.
pub trait Document {
    type Target: InsertionPoint;

    /// Resolves an element id, or `None` if no such element exists.
    fn target_by_id(&self, id: &str) -> Option<Self::Target>;
}

/// A resolved element that accepts HTML.
pub trait InsertionPoint {
    /// Appends `html` after the element's existing content.
    fn append_html(&self, html: &str) -> Result<()>;
}

/// In-memory document mapping element ids to their inner HTML.
///
/// Clones share the same elements, so one handle can be given to a
/// [`Renderer`](crate::Renderer) while another inspects the result.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocument {
    elements: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryDocument::insert_element`].
    pub fn with_element(self, id: impl Into<String>, inner_html: impl Into<String>) -> Self {
        self.insert_element(id, inner_html);
        self
    }

    /// Adds or replaces an element.
    pub fn insert_element(&self, id: impl Into<String>, inner_html: impl Into<String>) {
        self.lock().insert(id.into(), inner_html.into());
    }

    pub fn remove_element(&self, id: &str) -> Option<String> {
        self.lock().remove(id)
    }

    /// Current inner HTML of an element.
    pub fn inner_html(&self, id: &str) -> Option<String> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Document for MemoryDocument {
    type Target = MemoryElement;

    fn target_by_id(&self, id: &str) -> Option<MemoryElement> {
        self.lock().contains_key(id).then(|| MemoryElement {
            id: id.to_owned(),
            elements: Arc::clone(&self.elements),
        })
    }
}

/// Element handle returned by [`MemoryDocument::target_by_id`].
#[derive(Clone, Debug)]
pub struct MemoryElement {
    id: String,
    elements: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryElement {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl InsertionPoint for MemoryElement {
    /// Appends to the element's content. An element removed after it was
    /// resolved is detached: the append succeeds but changes nothing.
    fn append_html(&self, html: &str) -> Result<()> {
        let mut elements = self.elements.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(content) = elements.get_mut(&self.id) {
            content.push_str(html);
        }
        Ok(())
    }
}

impl<D: Document + ?Sized> Document for &D {
    type Target = D::Target;

    fn target_by_id(&self, id: &str) -> Option<Self::Target> {
        (**self).target_by_id(id)
    }
}
