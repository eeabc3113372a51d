//! Persistent edits of schema trees.
//!
//! [`apply`] never modifies the tree it is given. It rebuilds the chain of
//! ancestors from the edited node up to the root and shares every other
//! subtree with the input. An edit that changes nothing (unknown path,
//! missing child, add under a scalar) returns the input root itself, so
//! callers can detect it with [`Arc::ptr_eq`].

use std::sync::Arc;

use crate::error::EditError;
use crate::schema::{Branch, Element, NodePath, Properties, SchemaNode, Shape, Step};
use crate::types::Kind;

/// Placeholder prefix for new object properties.
pub const PROPERTY_PREFIX: &str = "prop";
/// Placeholder prefix for new array element properties.
pub const ELEMENT_PREFIX: &str = "item";
/// Placeholder prefix for new query parameters.
pub const PARAMETER_PREFIX: &str = "param";

/// A single localized edit of a schema tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert a `string` child into the addressed container. `None`
    /// generates a placeholder name.
    AddChild { name: Option<String> },
    /// Re-key a child of the addressed node, keeping its position.
    RenameChild { from: String, to: String },
    /// Remove a child of the addressed node.
    DeleteChild { name: String },
    /// Change the kind of the addressed node.
    SetKind(Kind),
    /// Change the element kind of the addressed array node.
    SetElementKind(Kind),
    SetRequired(bool),
    SetDescription(Option<String>),
}

/// Apply an edit to the node at `path` and return the new root.
///
/// # Errors
///
/// Returns `EditError::NameConflict` when an add or rename would reuse a
/// sibling's name, and `EditError::EmptyName` for blank names. The input
/// tree is unchanged in every case.
pub fn apply(
    root: &Arc<SchemaNode>,
    path: &NodePath,
    edit: &Edit,
) -> Result<Arc<SchemaNode>, EditError> {
    match rebuild(root, path.steps(), path, edit)? {
        Some(updated) => Ok(updated),
        None => {
            log::debug!("no-op edit {:?} at {}", edit, path);
            Ok(Arc::clone(root))
        }
    }
}

/// Generate `<prefix>_<millis>`, bumping the timestamp until `taken`
/// rejects it.
pub fn placeholder_name(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    loop {
        let candidate = format!("{}_{}", prefix, stamp);
        if !taken(&candidate) {
            return candidate;
        }
        stamp += 1;
    }
}

/// Whether a name still has the shape of a generated placeholder.
pub fn is_placeholder_name(name: &str) -> bool {
    [PROPERTY_PREFIX, ELEMENT_PREFIX, PARAMETER_PREFIX]
        .iter()
        .any(|prefix| {
            name.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .unwrap_or(false)
        })
}

// --- Internal implementation ---

/// Returns `None` when nothing changed below `node`.
fn rebuild(
    node: &Arc<SchemaNode>,
    steps: &[Step],
    path: &NodePath,
    edit: &Edit,
) -> Result<Option<Arc<SchemaNode>>, EditError> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(edit_node(node, path, edit)?.map(Arc::new));
    };

    let Some(child) = node
        .children(step.branch)
        .and_then(|props| props.get(&step.name))
    else {
        return Ok(None);
    };

    let Some(new_child) = rebuild(child, rest, path, edit)? else {
        return Ok(None);
    };

    // Shallow copy: siblings stay shared
    let mut parent = SchemaNode::clone(node);
    if let Some((_, props)) = parent.container_mut() {
        if let Some(slot) = props.get_mut(&step.name) {
            *slot = new_child;
        }
    }
    Ok(Some(Arc::new(parent)))
}

fn edit_node(
    node: &SchemaNode,
    path: &NodePath,
    edit: &Edit,
) -> Result<Option<SchemaNode>, EditError> {
    match edit {
        Edit::AddChild { name } => add_child(node, path, name.as_deref()),
        Edit::RenameChild { from, to } => rename_child(node, path, from, to),
        Edit::DeleteChild { name } => {
            let mut updated = node.clone();
            let removed = updated
                .container_mut()
                .and_then(|(_, props)| props.shift_remove(name.as_str()));
            Ok(removed.map(|_| updated))
        }
        Edit::SetKind(kind) => {
            if node.kind() == *kind {
                return Ok(None);
            }
            let mut updated = node.clone();
            updated.shape = Shape::empty(*kind);
            Ok(Some(updated))
        }
        Edit::SetElementKind(kind) => match &node.shape {
            Shape::Array(element) if element.kind() != *kind => {
                let mut updated = node.clone();
                updated.shape = Shape::Array(Element::empty(*kind));
                Ok(Some(updated))
            }
            _ => Ok(None),
        },
        Edit::SetRequired(required) => {
            if node.required == *required {
                return Ok(None);
            }
            let mut updated = node.clone();
            updated.required = *required;
            Ok(Some(updated))
        }
        Edit::SetDescription(description) => {
            let description = description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from);
            if node.description == description {
                return Ok(None);
            }
            let mut updated = node.clone();
            updated.description = description;
            Ok(Some(updated))
        }
    }
}

fn add_child(
    node: &SchemaNode,
    path: &NodePath,
    name: Option<&str>,
) -> Result<Option<SchemaNode>, EditError> {
    let Some((branch, props)) = node.container() else {
        return Ok(None);
    };

    let name = match name {
        Some(name) => {
            if name.trim().is_empty() {
                return Err(EditError::EmptyName {
                    path: path.to_string(),
                });
            }
            if props.contains_key(name) {
                return Err(EditError::NameConflict {
                    path: path.to_string(),
                    name: name.to_string(),
                });
            }
            name.to_string()
        }
        None => {
            let prefix = match branch {
                Branch::Property => PROPERTY_PREFIX,
                Branch::Element => ELEMENT_PREFIX,
            };
            placeholder_name(prefix, |candidate| props.contains_key(candidate))
        }
    };

    let mut updated = node.clone();
    if let Some((_, props)) = updated.container_mut() {
        let child = SchemaNode::new(name.clone(), Kind::String);
        props.insert(name, Arc::new(child));
    }
    Ok(Some(updated))
}

fn rename_child(
    node: &SchemaNode,
    path: &NodePath,
    from: &str,
    to: &str,
) -> Result<Option<SchemaNode>, EditError> {
    let Some((_, props)) = node.container() else {
        return Ok(None);
    };
    if !props.contains_key(from) || from == to {
        return Ok(None);
    }
    if to.trim().is_empty() {
        return Err(EditError::EmptyName {
            path: path.to_string(),
        });
    }
    if props.contains_key(to) {
        return Err(EditError::NameConflict {
            path: path.to_string(),
            name: to.to_string(),
        });
    }

    let renamed: Properties = props
        .iter()
        .map(|(key, child)| {
            if key == from {
                let mut child = SchemaNode::clone(child);
                child.name = to.to_string();
                (to.to_string(), Arc::new(child))
            } else {
                (key.clone(), Arc::clone(child))
            }
        })
        .collect();

    let mut updated = node.clone();
    if let Some((_, props)) = updated.container_mut() {
        *props = renamed;
    }
    Ok(Some(updated))
}
