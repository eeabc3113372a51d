//! Schema node model - the recursive field definitions behind parameters,
//! request bodies and reusable models.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::EditError;
use crate::types::Kind;

/// Child nodes keyed by name, in insertion order.
///
/// Children are shared by `Arc`: an edit rebuilds only the ancestors of the
/// node it changes and reuses every other subtree.
pub type Properties = IndexMap<String, Arc<SchemaNode>>;

/// Kind of a node together with the data only that kind carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    String,
    Number,
    Boolean,
    Integer,
    Array(Element),
    Object(Properties),
}

impl Shape {
    /// Fresh shape for a kind: empty properties for objects, string elements
    /// for arrays.
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::String => Shape::String,
            Kind::Number => Shape::Number,
            Kind::Boolean => Shape::Boolean,
            Kind::Integer => Shape::Integer,
            Kind::Array => Shape::Array(Element::String),
            Kind::Object => Shape::Object(Properties::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Shape::String => Kind::String,
            Shape::Number => Kind::Number,
            Shape::Boolean => Kind::Boolean,
            Shape::Integer => Kind::Integer,
            Shape::Array(_) => Kind::Array,
            Shape::Object(_) => Kind::Object,
        }
    }
}

/// Element type of an array node.
///
/// Only object elements describe their shape further; an array of arrays
/// leaves the inner element unspecified.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    String,
    Number,
    Boolean,
    Integer,
    Array,
    Object(Properties),
}

impl Element {
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::String => Element::String,
            Kind::Number => Element::Number,
            Kind::Boolean => Element::Boolean,
            Kind::Integer => Element::Integer,
            Kind::Array => Element::Array,
            Kind::Object => Element::Object(Properties::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Element::String => Kind::String,
            Element::Number => Kind::Number,
            Element::Boolean => Kind::Boolean,
            Element::Integer => Kind::Integer,
            Element::Array => Kind::Array,
            Element::Object(_) => Kind::Object,
        }
    }
}

/// Which child mapping of a node a path step descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// `properties` of an object node.
    Property,
    /// Properties of the elements of an array-of-objects node.
    Element,
}

/// One typed field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Equal to the key the node is stored under in its parent.
    pub name: String,
    pub shape: Shape,
    pub required: bool,
    pub description: Option<String>,
}

impl SchemaNode {
    /// A new optional node of the given kind with empty kind data.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            shape: Shape::empty(kind),
            required: false,
            description: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a child to the node's container. Silently ignored on scalar
    /// nodes; use the mutator for checked edits.
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        if let Some((_, props)) = self.container_mut() {
            props.insert(child.name.clone(), Arc::new(child));
        }
        self
    }

    pub fn kind(&self) -> Kind {
        self.shape.kind()
    }

    /// Element kind of an array node.
    pub fn element_kind(&self) -> Option<Kind> {
        match &self.shape {
            Shape::Array(element) => Some(element.kind()),
            _ => None,
        }
    }

    /// Properties of an object node.
    pub fn properties(&self) -> Option<&Properties> {
        match &self.shape {
            Shape::Object(props) => Some(props),
            _ => None,
        }
    }

    /// Element properties of an array-of-objects node.
    pub fn element_properties(&self) -> Option<&Properties> {
        match &self.shape {
            Shape::Array(Element::Object(props)) => Some(props),
            _ => None,
        }
    }

    /// The child mapping on the given branch, if the node has one.
    pub fn children(&self, branch: Branch) -> Option<&Properties> {
        match branch {
            Branch::Property => self.properties(),
            Branch::Element => self.element_properties(),
        }
    }

    /// The node's only child mapping, together with its branch.
    pub fn container(&self) -> Option<(Branch, &Properties)> {
        match &self.shape {
            Shape::Object(props) => Some((Branch::Property, props)),
            Shape::Array(Element::Object(props)) => Some((Branch::Element, props)),
            _ => None,
        }
    }

    pub(crate) fn container_mut(&mut self) -> Option<(Branch, &mut Properties)> {
        match &mut self.shape {
            Shape::Object(props) => Some((Branch::Property, props)),
            Shape::Array(Element::Object(props)) => Some((Branch::Element, props)),
            _ => None,
        }
    }

    /// Follow a path from this node.
    pub fn get(&self, path: &NodePath) -> Option<&SchemaNode> {
        let mut current = self;
        for step in path.steps() {
            let child = current.children(step.branch)?.get(&step.name)?;
            current = child.as_ref();
        }
        Some(current)
    }

    /// Check that every child is stored under its own name, at every depth.
    pub fn is_consistent(&self) -> bool {
        match self.container() {
            Some((_, props)) => props
                .iter()
                .all(|(key, child)| *key == child.name && child.is_consistent()),
            None => true,
        }
    }

    /// Visit this node and all descendants, depth first, parents before
    /// children.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&NodePath, &SchemaNode),
    {
        self.walk_inner(&NodePath::root(), f);
    }

    fn walk_inner<F>(&self, path: &NodePath, f: &mut F)
    where
        F: FnMut(&NodePath, &SchemaNode),
    {
        f(path, self);
        if let Some((branch, props)) = self.container() {
            for (name, child) in props {
                child.walk_inner(&path.child(branch, name.clone()), f);
            }
        }
    }
}

/// One step of a [`NodePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub branch: Branch,
    pub name: String,
}

/// Address of a node inside a tree, as a sequence of named steps.
///
/// The text form is a JSON Pointer over the exported schema layout, e.g.
/// `/properties/orders/items/properties/id`. `/` is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath {
    steps: Vec<Step>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Path extended by one step.
    pub fn child(&self, branch: Branch, name: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step {
            branch,
            name: name.into(),
        });
        Self { steps }
    }

    /// Path extended into an object property.
    pub fn property(&self, name: impl Into<String>) -> Self {
        self.child(Branch::Property, name)
    }

    /// Path extended into an array element property.
    pub fn element(&self, name: impl Into<String>) -> Self {
        self.child(Branch::Element, name)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.steps.split_last()?;
        Some(Self {
            steps: rest.to_vec(),
        })
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            let prefix = match step.branch {
                Branch::Property => "/properties/",
                Branch::Element => "/items/properties/",
            };
            // JSON Pointer encoding (~ = ~0, / = ~1)
            write!(
                f,
                "{}{}",
                prefix,
                step.name.replace('~', "~0").replace('/', "~1")
            )?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| EditError::InvalidPath {
            path: s.to_string(),
            message: message.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(NodePath::root());
        }
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Err(invalid("must start with '/'"));
        };

        let mut steps = Vec::new();
        let mut parts = rest.split('/');
        while let Some(part) = parts.next() {
            let branch = match part {
                "properties" => Branch::Property,
                "items" => {
                    if parts.next() != Some("properties") {
                        return Err(invalid("expected 'properties' after 'items'"));
                    }
                    Branch::Element
                }
                other => {
                    return Err(invalid(&format!(
                        "expected 'properties' or 'items', got '{}'",
                        other
                    )))
                }
            };
            let name = parts
                .next()
                .ok_or_else(|| invalid("missing property name"))?;
            // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
            steps.push(Step {
                branch,
                name: name.replace("~1", "/").replace("~0", "~"),
            });
        }
        Ok(NodePath { steps })
    }
}
