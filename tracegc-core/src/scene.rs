//! Scene Model
//!
//! The scene is the external supplier of nodes. It is a hierarchy of game
//! objects, each owning one [`Transform`] (its position in the hierarchy)
//! and any number of other elements. Every element is a node of the usage
//! graph.
//!
//! Elements describe their reference-valued fields through
//! [`Element::references`]. That is all the generic fallback rule can see of
//! an element whose type has no registered rule.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::TraceError;
use crate::graph::NodeId;

/// Identity of a game object in the scene hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Create an object id from a raw index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`.
    pub fn new(index: usize) -> Self {
        Self::try_new(index).unwrap_or_else(|| panic!("object index {index} out of range"))
    }

    /// Create an object id from a raw index, or `None` if it does not fit.
    pub fn try_new(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Activation state of an object or element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
    /// Active, and nothing changes that at run time.
    #[default]
    Active,
    /// Inactive, and nothing changes that at run time.
    Inactive,
    /// Toggled at run time, so it may be either.
    Animated,
}

impl Activation {
    /// Whether this state can ever be "on".
    pub fn can_be_active(self) -> bool {
        !matches!(self, Activation::Inactive)
    }
}

/// A reference held by an element field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    /// A reference to a game object. Resolves to the object's transform.
    Object(ObjectId),
    /// A reference to another element.
    Element(NodeId),
}

/// Upcast helper so element trait objects can be downcast to their type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Something that can be attached to a game object.
pub trait Element: AsAny {
    /// Every object reference stored in this element's fields.
    ///
    /// Unset references are simply left out.
    fn references(&self) -> SmallVec<[ObjectRef; 4]> {
        SmallVec::new()
    }
}

/// Downcast an element to its concrete type.
pub fn downcast_element<T: Element>(element: &dyn Element) -> Option<&T> {
    AsAny::as_any(element).downcast_ref::<T>()
}

/// The hierarchy node every game object owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform;

impl Element for Transform {}

/// A renderer deformed by a skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkinnedMeshRenderer {
    /// Bone transforms, in the order the mesh's bone weights index them.
    pub bones: Vec<Option<NodeId>>,
    /// The transform the bounds are computed relative to.
    pub root_bone: Option<NodeId>,
}

impl Element for SkinnedMeshRenderer {
    fn references(&self) -> SmallVec<[ObjectRef; 4]> {
        self.root_bone
            .iter()
            .chain(self.bones.iter().flatten())
            .map(|&node| ObjectRef::Element(node))
            .collect()
    }
}

/// A game object in the hierarchy.
#[derive(Debug)]
pub struct GameObject {
    name: String,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    activation: Activation,
    transform: NodeId,
    elements: Vec<NodeId>,
}

impl GameObject {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// The object's own transform.
    pub fn transform(&self) -> NodeId {
        self.transform
    }

    /// Every element attached to this object, transform first.
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }
}

/// An element attached to a game object, with its run-time type.
pub struct ElementEntry {
    object: ObjectId,
    type_id: TypeId,
    type_name: &'static str,
    activation: Activation,
    element: Box<dyn Element>,
}

impl ElementEntry {
    /// The object this element is attached to.
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Exact run-time type of the element.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the element's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn element(&self) -> &dyn Element {
        self.element.as_ref()
    }

    pub fn is_transform(&self) -> bool {
        self.type_id == TypeId::of::<Transform>()
    }
}

impl fmt::Debug for ElementEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementEntry")
            .field("object", &self.object)
            .field("type_name", &self.type_name)
            .field("activation", &self.activation)
            .finish_non_exhaustive()
    }
}

/// The scene hierarchy and every element attached to it.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: Vec<GameObject>,
    elements: Vec<ElementEntry>,
}

impl SceneGraph {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a game object under `parent` (or at the root).
    ///
    /// The object starts active and owns a fresh [`Transform`].
    pub fn add_object(
        &mut self,
        name: impl Into<String>,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, TraceError> {
        if let Some(parent) = parent {
            self.object(parent).ok_or(TraceError::UnknownObject(parent))?;
        }

        let id = ObjectId::try_new(self.objects.len()).ok_or(TraceError::CapacityExceeded { what: "objects" })?;
        let transform = self.push_element(id, Transform)?;
        self.objects.push(GameObject {
            name: name.into(),
            parent,
            children: Vec::new(),
            activation: Activation::Active,
            transform,
            elements: vec![transform],
        });

        if let Some(parent) = parent {
            self.objects[parent.index()].children.push(id);
        }

        Ok(id)
    }

    /// Attach `element` to `object`.
    pub fn add_element<T: Element>(&mut self, object: ObjectId, element: T) -> Result<NodeId, TraceError> {
        self.object(object).ok_or(TraceError::UnknownObject(object))?;
        let node = self.push_element(object, element)?;
        self.objects[object.index()].elements.push(node);
        Ok(node)
    }

    fn push_element<T: Element>(&mut self, object: ObjectId, element: T) -> Result<NodeId, TraceError> {
        let node = NodeId::try_new(self.elements.len()).ok_or(TraceError::CapacityExceeded { what: "elements" })?;
        self.elements.push(ElementEntry {
            object,
            type_id: TypeId::of::<T>(),
            type_name: short_type_name(type_name::<T>()),
            activation: Activation::Active,
            element: Box::new(element),
        });
        Ok(node)
    }

    /// Change the activation of an object.
    pub fn set_object_activation(&mut self, object: ObjectId, activation: Activation) -> Result<(), TraceError> {
        let entry = self
            .objects
            .get_mut(object.index())
            .ok_or(TraceError::UnknownObject(object))?;
        entry.activation = activation;
        Ok(())
    }

    /// Change the activation of an element.
    pub fn set_element_activation(&mut self, node: NodeId, activation: Activation) -> Result<(), TraceError> {
        let entry = self
            .elements
            .get_mut(node.index())
            .ok_or(TraceError::UnknownNode(node))?;
        entry.activation = activation;
        Ok(())
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id.index())
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementEntry> {
        self.elements.get(node.index())
    }

    /// Get an element as its concrete type.
    pub fn element_as<T: Element>(&self, node: NodeId) -> Option<&T> {
        self.element(node).and_then(|entry| downcast_element(entry.element()))
    }

    /// Iterate every object id.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        (0..self.objects.len()).map(ObjectId::new)
    }

    /// Iterate every element node, in the order they were added.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.elements.len()).map(NodeId::new)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Find the first object with the given name.
    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|object| object.name == name)
            .map(ObjectId::new)
    }

    /// The transform of `object`.
    pub fn transform_of(&self, object: ObjectId) -> Option<NodeId> {
        self.object(object).map(GameObject::transform)
    }

    /// The object `node` is attached to.
    pub fn owner_of(&self, node: NodeId) -> Option<ObjectId> {
        self.element(node).map(ElementEntry::object)
    }

    /// The transform of the parent of the object owning `node`.
    pub fn parent_transform(&self, node: NodeId) -> Option<NodeId> {
        let owner = self.owner_of(node)?;
        let parent = self.object(owner)?.parent?;
        self.transform_of(parent)
    }

    /// Resolve a field reference to the node it points at.
    pub fn resolve(&self, reference: ObjectRef) -> Option<NodeId> {
        match reference {
            ObjectRef::Object(object) => self.transform_of(object),
            ObjectRef::Element(node) => self.element(node).map(|_| node),
        }
    }

    /// Check whether `object` is `root` or one of its descendants.
    pub fn is_in_subtree(&self, object: ObjectId, root: ObjectId) -> bool {
        let mut current = Some(object);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.object(id).and_then(GameObject::parent);
        }
        false
    }
}

/// Strip the module path from a type name, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
