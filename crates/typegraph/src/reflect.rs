//! The describable-composite seam.
//!
//! Every type the scanner can walk implements [`Reflect`], which hands out a
//! static [`TypeDesc`] (what the type looks like) and a [`Value`] handle
//! (where a live instance of it lives). Composite types normally get their
//! implementation from `#[derive(Reflect)]`; the standard containers, scalars
//! and time types are covered in [`crate::impls`].
//!
//! Nested types are referenced through `fn() -> TypeDesc` pointers rather
//! than by value, so recursive definitions such as
//! `struct Node { next: Option<Box<Node>> }` describe themselves lazily and
//! never recurse while a description is being built.

use std::any::TypeId;
use std::fmt;

use crate::kind::Kind;
use crate::model::TypeKey;
use crate::value::Value;

/// A type whose shape can be described at runtime.
///
/// # Example
///
/// ```
/// use typegraph::{FieldDesc, Reflect, TypeDesc, Value};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl Reflect for Person {
///     fn type_desc() -> TypeDesc {
///         TypeDesc::composite::<Self>(|index| match index {
///             0 => Some(FieldDesc::new("name", <String as Reflect>::type_desc)),
///             1 => Some(FieldDesc::new("age", <u32 as Reflect>::type_desc)),
///             _ => None,
///         })
///     }
///
///     fn as_value(&self) -> Value<'_> {
///         Value::composite(self)
///     }
///
///     fn field_value(&self, index: usize) -> Option<Value<'_>> {
///         match index {
///             0 => Some(self.name.as_value()),
///             1 => Some(self.age.as_value()),
///             _ => None,
///         }
///     }
/// }
///
/// let desc = Person::type_desc();
/// assert_eq!(desc.field_count(), 2);
/// ```
pub trait Reflect: 'static {
    fn type_desc() -> TypeDesc
    where
        Self: Sized;

    fn as_value(&self) -> Value<'_>;

    /// Live value of the `index`-th declared field. Only composites override this.
    fn field_value(&self, index: usize) -> Option<Value<'_>> {
        let _ = index;
        None
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Shape {
    Opaque,
    Dynamic,
    Indirect(fn() -> TypeDesc),
    Sequence(fn() -> TypeDesc),
    Array(fn() -> TypeDesc, usize),
    Map(fn() -> TypeDesc, fn() -> TypeDesc),
    Struct {
        field: fn(usize) -> Option<FieldDesc>,
        time_like: bool,
    },
}

/// Static description of one type: identity, kind, and kind-specific shape.
#[derive(Clone, Copy)]
pub struct TypeDesc {
    name: fn() -> &'static str,
    id: fn() -> TypeId,
    kind: Kind,
    shape: Shape,
}

fn no_fields(_: usize) -> Option<FieldDesc> {
    None
}

impl TypeDesc {
    fn of<T: ?Sized + 'static>(kind: Kind, shape: Shape) -> Self {
        Self {
            name: std::any::type_name::<T>,
            id: TypeId::of::<T>,
            kind,
            shape,
        }
    }

    /// Leaf type with no inner structure (scalars, channels, functions, raw pointers).
    pub fn scalar<T: ?Sized + 'static>(kind: Kind) -> Self {
        Self::of::<T>(kind, Shape::Opaque)
    }

    /// One nullable level of indirection to `P`.
    pub fn pointer<T: ?Sized + 'static, P: Reflect>() -> Self {
        Self::of::<T>(Kind::Pointer, Shape::Indirect(P::type_desc))
    }

    /// Indirection whose target type is only known from a live value.
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::of::<T>(Kind::Interface, Shape::Dynamic)
    }

    pub fn slice<T: ?Sized + 'static, E: Reflect>() -> Self {
        Self::of::<T>(Kind::Slice, Shape::Sequence(E::type_desc))
    }

    pub fn array<T: ?Sized + 'static, E: Reflect>(len: usize) -> Self {
        Self::of::<T>(Kind::Array, Shape::Array(E::type_desc, len))
    }

    pub fn map<T: ?Sized + 'static, K: Reflect, V: Reflect>() -> Self {
        Self::of::<T>(Kind::Map, Shape::Map(K::type_desc, V::type_desc))
    }

    /// Struct-like composite; `field` returns the `index`-th declared field.
    pub fn composite<T: ?Sized + 'static>(field: fn(usize) -> Option<FieldDesc>) -> Self {
        Self::of::<T>(
            Kind::Struct,
            Shape::Struct {
                field,
                time_like: false,
            },
        )
    }

    /// Timestamp-like struct: terminal for classification, never a relation.
    pub fn time_like<T: ?Sized + 'static>() -> Self {
        Self::of::<T>(
            Kind::Struct,
            Shape::Struct {
                field: no_fields,
                time_like: true,
            },
        )
    }

    /// Overrides the display name. Identity is unaffected.
    pub fn with_name(mut self, name: fn() -> &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        (self.name)()
    }

    pub fn id(&self) -> TypeId {
        (self.id)()
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.id(), self.name())
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Pointee, slice element, or array element.
    pub fn elem(&self) -> Option<TypeDesc> {
        match self.shape {
            Shape::Indirect(elem) | Shape::Sequence(elem) | Shape::Array(elem, _) => Some(elem()),
            _ => None,
        }
    }

    /// Strips every statically known pointer layer.
    pub fn deref_all(&self) -> TypeDesc {
        let mut current = *self;
        while let Shape::Indirect(elem) = current.shape {
            current = elem();
        }
        current
    }

    pub fn map_types(&self) -> Option<(TypeDesc, TypeDesc)> {
        match self.shape {
            Shape::Map(key, value) => Some((key(), value())),
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        match self.shape {
            Shape::Array(_, len) => Some(len),
            _ => None,
        }
    }

    pub fn field(&self, index: usize) -> Option<FieldDesc> {
        match self.shape {
            Shape::Struct { field, .. } => field(index),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDesc> + '_ {
        (0..).map_while(move |index| self.field(index))
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    pub fn is_time_like(&self) -> bool {
        matches!(self.shape, Shape::Struct { time_like: true, .. })
    }

    /// A struct with named members, as opposed to a timestamp-like leaf.
    pub fn is_composite(&self) -> bool {
        matches!(self.shape, Shape::Struct { time_like: false, .. })
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TypeDesc {}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("name", &self.name())
            .field("kind", &self.kind)
            .finish()
    }
}

/// One declared member of a composite.
#[derive(Clone, Copy)]
pub struct FieldDesc {
    name: &'static str,
    ty: fn() -> TypeDesc,
    tag: &'static str,
    embedded: bool,
}

impl FieldDesc {
    pub const fn new(name: &'static str, ty: fn() -> TypeDesc) -> Self {
        Self {
            name,
            ty,
            tag: "",
            embedded: false,
        }
    }

    /// Raw `key:"value"` annotation, decoded when the field is classified.
    pub const fn with_tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    /// Marks the field anonymous: its members are flattened into the owner.
    pub const fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> TypeDesc {
        (self.ty)()
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }
}

impl fmt::Debug for FieldDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDesc")
            .field("name", &self.name)
            .field("ty", &self.ty().name())
            .field("tag", &self.tag)
            .field("embedded", &self.embedded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deref_all_strips_nested_pointers() {
        let desc = <Option<Box<Vec<u8>>> as Reflect>::type_desc();
        assert_eq!(desc.kind(), Kind::Pointer);
        let inner = desc.deref_all();
        assert_eq!(inner.kind(), Kind::Slice);
        assert_eq!(inner.elem().map(|e| e.kind()), Some(Kind::Uint8));
    }

    #[test]
    fn with_name_keeps_identity() {
        let renamed = u32::type_desc().with_name(|| "Count");
        assert_eq!(renamed.name(), "Count");
        assert_eq!(renamed, u32::type_desc());
    }

    #[test]
    fn time_like_is_struct_but_not_composite() {
        let desc = <std::time::SystemTime as Reflect>::type_desc();
        assert_eq!(desc.kind(), Kind::Struct);
        assert!(desc.is_time_like());
        assert!(!desc.is_composite());
        assert_eq!(desc.field_count(), 0);
    }
}
