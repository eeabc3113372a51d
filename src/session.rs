//! The editing session: one document, its unsaved-changes flag and the
//! operation currently selected for editing.

use std::path::{Path, PathBuf};

use crate::document::{OperationDraft, OperationKey, ProjectDocument};
use crate::error::{DocumentError, ExportError, ImportError};
use crate::loader;
use crate::types::{ExportOptions, ImportOptions};

#[derive(Debug, Clone, Default)]
pub struct Session {
    document: ProjectDocument,
    dirty: bool,
    selected: Option<OperationKey>,
}

impl Session {
    /// A session on the default empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session on an existing document, considered saved.
    pub fn open(document: ProjectDocument) -> Self {
        Self {
            document,
            dirty: false,
            selected: None,
        }
    }

    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    /// Mutable access for edits not covered by the session methods. Marks
    /// the session dirty.
    pub fn document_mut(&mut self) -> &mut ProjectDocument {
        self.dirty = true;
        &mut self.document
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn selected_operation(&self) -> Option<&OperationKey> {
        self.selected.as_ref()
    }

    /// Select an operation for editing. Returns `false` (and clears the
    /// selection) when no such operation exists.
    pub fn select_operation(&mut self, key: Option<OperationKey>) -> bool {
        self.selected = key.filter(|k| self.document.operation(k).is_some());
        self.selected.is_some()
    }

    /// Draft of the selected operation, ready for editing.
    pub fn selected_draft(&self) -> Option<OperationDraft> {
        let key = self.selected.as_ref()?;
        let op = self.document.operation(key)?;
        Some(OperationDraft::from_operation(key, op))
    }

    /// # Errors
    ///
    /// See [`ProjectDocument::create_operation`].
    pub fn create_operation(&mut self, draft: OperationDraft) -> Result<OperationKey, DocumentError> {
        let key = self.document.create_operation(draft)?;
        self.dirty = true;
        Ok(key)
    }

    /// Update an operation. A selection on `from` follows it to its new
    /// slot.
    ///
    /// # Errors
    ///
    /// See [`ProjectDocument::update_operation`].
    pub fn update_operation(
        &mut self,
        from: &OperationKey,
        draft: OperationDraft,
    ) -> Result<OperationKey, DocumentError> {
        let key = self.document.update_operation(from, draft)?;
        self.dirty = true;
        if self.selected.as_ref() == Some(from) {
            self.selected = Some(key.clone());
        }
        Ok(key)
    }

    /// Delete an operation, clearing the selection if it pointed there.
    pub fn delete_operation(&mut self, key: &OperationKey) -> bool {
        if self.document.delete_operation(key).is_none() {
            return false;
        }
        self.dirty = true;
        if self.selected.as_ref() == Some(key) {
            self.selected = None;
        }
        true
    }

    /// Replace the document with one read from `path`. On error the session
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// See [`loader::import_file`].
    pub fn import_file(&mut self, path: &Path, options: &ImportOptions) -> Result<(), ImportError> {
        let document = loader::import_file(path, options)?;
        self.replace(document);
        Ok(())
    }

    /// Replace the document with one decoded from `content`. On error the
    /// session is unchanged.
    ///
    /// # Errors
    ///
    /// See [`loader::import_str`].
    pub fn import_str(&mut self, content: &str, options: &ImportOptions) -> Result<(), ImportError> {
        let document = loader::import_str(content, options)?;
        self.replace(document);
        Ok(())
    }

    /// Export into `dir` and mark the session saved.
    ///
    /// # Errors
    ///
    /// See [`loader::export_to`].
    pub fn export_to(&mut self, dir: &Path, options: &ExportOptions) -> Result<PathBuf, ExportError> {
        let path = loader::export_to(&self.document, dir, options)?;
        self.dirty = false;
        Ok(path)
    }

    /// # Errors
    ///
    /// See [`loader::export_string`].
    pub fn export_string(&self, options: &ExportOptions) -> Result<String, ExportError> {
        loader::export_string(&self.document, options)
    }

    /// Start over on the default empty document.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn replace(&mut self, document: ProjectDocument) {
        self.document = document;
        self.dirty = false;
        self.selected = None;
    }
}
