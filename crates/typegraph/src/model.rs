//! The model graph: one [`ModelDescriptor`] per composite type, linked by
//! [`Relation`]s.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitOr;
use std::sync::{Arc, OnceLock, Weak};

use crate::cache::TypeGraphCache;
use crate::error::Error;
use crate::reflect::{Reflect, TypeDesc};
use crate::tags::{Tag, TagError, Tags};

/// Type identity used to deduplicate models. Equality ignores the name.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub(crate) fn new(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    pub fn of<T: Reflect>() -> Self {
        T::type_desc().key()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural classification of a field. Bits combine freely.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldFlags(u16);

impl FieldFlags {
    pub const EMBEDDED: Self = Self(1 << 0);
    pub const POINTER: Self = Self(1 << 1);
    pub const COMPOSITE: Self = Self(1 << 2);
    pub const COLLECTION: Self = Self(1 << 3);
    pub const MAP: Self = Self(1 << 4);
    pub const TIME_LIKE: Self = Self(1 << 5);
    pub const INTERFACE: Self = Self(1 << 6);
    pub const RELATION: Self = Self(1 << 7);
    pub const SELF_REFERENCE: Self = Self(1 << 8);

    const LINK_BITS: u16 = Self::RELATION.0 | Self::SELF_REFERENCE.0;

    const NAMES: [(Self, &'static str); 9] = [
        (Self::EMBEDDED, "embedded"),
        (Self::POINTER, "pointer"),
        (Self::COMPOSITE, "composite"),
        (Self::COLLECTION, "collection"),
        (Self::MAP, "map"),
        (Self::TIME_LIKE, "time_like"),
        (Self::INTERFACE, "interface"),
        (Self::RELATION, "relation"),
        (Self::SELF_REFERENCE, "self_reference"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets classification bits. Relation bits are only ever set by
    /// [`FieldDescriptor::link`] and are masked out here.
    pub(crate) fn insert(&mut self, other: Self) {
        self.0 |= other.0 & !Self::LINK_BITS;
    }

    pub fn is_embedded(self) -> bool {
        self.contains(Self::EMBEDDED)
    }

    pub fn is_pointer(self) -> bool {
        self.contains(Self::POINTER)
    }

    pub fn is_composite(self) -> bool {
        self.contains(Self::COMPOSITE)
    }

    pub fn is_collection(self) -> bool {
        self.contains(Self::COLLECTION)
    }

    pub fn is_map(self) -> bool {
        self.contains(Self::MAP)
    }

    pub fn is_time_like(self) -> bool {
        self.contains(Self::TIME_LIKE)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    pub fn is_relation(self) -> bool {
        self.contains(Self::RELATION)
    }

    pub fn is_self_reference(self) -> bool {
        self.contains(Self::SELF_REFERENCE)
    }

    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for FieldFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("FieldFlags(empty)");
        }
        f.write_str("FieldFlags(")?;
        for (index, name) in self.names().enumerate() {
            if index > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        f.write_str(")")
    }
}

/// Non-owning link from a field to the model of the type it refers to.
#[derive(Clone)]
pub struct Relation {
    key: TypeKey,
    model: Weak<ModelDescriptor>,
}

impl Relation {
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The model linked during classification, if it is still alive.
    pub fn model(&self) -> Option<Arc<ModelDescriptor>> {
        self.model.upgrade()
    }

    /// The visited model for the target type.
    ///
    /// When a concurrent scan published its own model for the target first,
    /// the linked instance is discarded and the cached one is returned.
    pub fn resolve(&self, cache: &TypeGraphCache) -> Option<Arc<ModelDescriptor>> {
        self.model()
            .filter(|model| model.is_visited())
            .or_else(|| cache.get(&self.key))
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Relation").field(&self.key).finish()
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    ty: TypeDesc,
    tags: Tags,
    flags: FieldFlags,
    relation: Option<Relation>,
}

impl FieldDescriptor {
    pub(crate) fn new(name: &'static str, ty: TypeDesc, tags: Tags) -> Self {
        Self {
            name,
            ty,
            tags,
            flags: FieldFlags::empty(),
            relation: None,
        }
    }

    pub(crate) fn insert(&mut self, flags: FieldFlags) {
        self.flags.insert(flags);
    }

    /// Attaches the relation. The only writer of the relation bits.
    pub(crate) fn link(&mut self, target: &Arc<ModelDescriptor>, owner: TypeKey) {
        let key = target.key();
        self.flags.0 |= FieldFlags::RELATION.0;
        if key == owner {
            self.flags.0 |= FieldFlags::SELF_REFERENCE.0;
        }
        self.relation = Some(Relation {
            key,
            model: Arc::downgrade(target),
        });
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> TypeDesc {
        self.ty
    }

    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Result<&Tag, TagError> {
        self.tags.get(key)
    }

    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    pub fn relation(&self) -> Option<&Relation> {
        self.relation.as_ref()
    }
}

/// A field dropped because it could not be classified.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedField {
    pub name: &'static str,
    pub error: Error,
}

#[derive(Debug)]
pub(crate) struct ModelBody {
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) skipped: Vec<SkippedField>,
    pub(crate) incomplete: Option<Error>,
}

/// The modeled shape of one composite type.
///
/// The field list is built inside a single traversal and published once; a
/// model is visited exactly when its body has been published.
pub struct ModelDescriptor {
    desc: TypeDesc,
    depth: usize,
    body: OnceLock<ModelBody>,
}

impl ModelDescriptor {
    pub(crate) fn new(desc: TypeDesc, depth: usize) -> Self {
        Self {
            desc,
            depth,
            body: OnceLock::new(),
        }
    }

    pub(crate) fn publish(&self, body: ModelBody) {
        if self.body.set(body).is_err() {
            tracing::warn!(model = self.type_name(), "model body already published");
        }
    }

    pub fn key(&self) -> TypeKey {
        self.desc.key()
    }

    pub fn desc(&self) -> TypeDesc {
        self.desc
    }

    pub fn type_name(&self) -> &'static str {
        self.desc.name()
    }

    /// Nesting depth at which the type was first reached. Diagnostic only.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_visited(&self) -> bool {
        self.body.get().is_some()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        match self.body.get() {
            Some(body) => &body.fields,
            None => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|field| field.name == name)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&FieldDescriptor, &Relation)> {
        self.fields()
            .iter()
            .filter_map(|field| field.relation().map(|relation| (field, relation)))
    }

    pub fn skipped_fields(&self) -> &[SkippedField] {
        match self.body.get() {
            Some(body) => &body.skipped,
            None => &[],
        }
    }

    /// `false` when inspection stopped early; the fields gathered so far are kept.
    pub fn is_complete(&self) -> bool {
        self.body.get().is_some_and(|body| body.incomplete.is_none())
    }

    pub fn incomplete_reason(&self) -> Option<&Error> {
        self.body.get().and_then(|body| body.incomplete.as_ref())
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("type", &self.type_name())
            .field("depth", &self.depth)
            .field("visited", &self.is_visited())
            .field("fields", &self.fields())
            .finish()
    }
}
