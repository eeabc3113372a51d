//! Query parameter list with selection tracking.

use std::sync::Arc;

use crate::error::EditError;
use crate::mutator::{self, Edit, PARAMETER_PREFIX};
use crate::schema::{NodePath, SchemaNode};
use crate::types::Kind;

/// Ordered top-level parameters plus the index currently being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    params: Vec<Arc<SchemaNode>>,
    selected: Option<usize>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing parameters; nothing is selected.
    pub fn from_nodes(params: Vec<Arc<SchemaNode>>) -> Self {
        Self {
            params,
            selected: None,
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<SchemaNode>> {
        self.params.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SchemaNode>> {
        self.params.iter()
    }

    pub fn nodes(&self) -> &[Arc<SchemaNode>] {
        &self.params
    }

    pub fn into_nodes(self) -> Vec<Arc<SchemaNode>> {
        self.params
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&Arc<SchemaNode>> {
        self.selected.and_then(|i| self.params.get(i))
    }

    /// Append a `string` parameter with a placeholder name and select it.
    pub fn add(&mut self) -> usize {
        let name = placeholder(&self.params);
        self.push(SchemaNode::new(name, Kind::String))
    }

    /// Append a prepared parameter and select it.
    pub fn push(&mut self, node: SchemaNode) -> usize {
        self.params.push(Arc::new(node));
        let index = self.params.len() - 1;
        self.selected = Some(index);
        index
    }

    /// Remove the parameter at `index`, keeping the selection on the same
    /// logical parameter where it survives.
    pub fn remove(&mut self, index: usize) -> Option<Arc<SchemaNode>> {
        if index >= self.params.len() {
            return None;
        }
        let removed = self.params.remove(index);
        self.selected = match self.selected {
            Some(sel) if sel == index => {
                if self.params.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
        Some(removed)
    }

    /// Set the name of the parameter at `index`.
    ///
    /// Blank or unchanged names are ignored. Names are not checked against
    /// the other parameters.
    pub fn rename(&mut self, index: usize, name: &str) -> bool {
        let Some(param) = self.params.get_mut(index) else {
            return false;
        };
        if name.trim().is_empty() || param.name == name {
            return false;
        }
        let mut renamed = SchemaNode::clone(param);
        renamed.name = name.to_string();
        *param = Arc::new(renamed);
        true
    }

    /// Select a parameter, or clear the selection. Out-of-range indices
    /// clear it.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.params.len());
    }

    /// Replace the parameter at `index` with an edited version.
    pub fn replace(&mut self, index: usize, node: Arc<SchemaNode>) -> bool {
        match self.params.get_mut(index) {
            Some(slot) => {
                *slot = node;
                true
            }
            None => false,
        }
    }

    /// Apply a tree edit inside the parameter at `index`.
    ///
    /// # Errors
    ///
    /// Propagates name conflicts from the mutator; the list is unchanged.
    pub fn edit(&mut self, index: usize, path: &NodePath, edit: &Edit) -> Result<bool, EditError> {
        let Some(param) = self.params.get(index) else {
            return Ok(false);
        };
        let updated = mutator::apply(param, path, edit)?;
        if Arc::ptr_eq(param, &updated) {
            return Ok(false);
        }
        self.params[index] = updated;
        Ok(true)
    }

    /// Index of the first parameter with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

fn placeholder(params: &[Arc<SchemaNode>]) -> String {
    mutator::placeholder_name(PARAMETER_PREFIX, |candidate| {
        params.iter().any(|p| p.name == candidate)
    })
}
