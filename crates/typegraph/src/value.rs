//! Borrowed handles to live values (or to the zero value of a type).

use std::fmt;

use crate::kind::Kind;
use crate::reflect::{Reflect, TypeDesc};

/// Element access for slice- and array-kind containers.
pub trait ListAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn elements(&self) -> Box<dyn Iterator<Item = Value<'_>> + '_>;
}

/// Entry access for map-kind containers.
pub trait MapAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (Value<'_>, Value<'_>)> + '_>;
}

#[derive(Clone, Copy)]
enum Repr<'a> {
    Zero,
    Leaf,
    Indirect(Option<&'a dyn Reflect>),
    List(&'a dyn ListAccess),
    Map(&'a dyn MapAccess),
    Composite(&'a dyn Reflect),
}

/// Opaque, copyable handle the scanner walks.
///
/// A handle either borrows a live value or stands for the zero value of its
/// type. Zero values behave like freshly declared ones: pointers are nil,
/// slices and maps are empty, arrays hold `len` zero elements, and struct
/// fields are themselves zero.
#[derive(Clone, Copy)]
pub struct Value<'a> {
    desc: TypeDesc,
    repr: Repr<'a>,
}

impl<'a> Value<'a> {
    pub fn zero(desc: TypeDesc) -> Self {
        Self {
            desc,
            repr: Repr::Zero,
        }
    }

    /// A value with no inner structure to walk.
    pub fn leaf(desc: TypeDesc) -> Self {
        Self {
            desc,
            repr: Repr::Leaf,
        }
    }

    /// A pointer or interface; `None` is nil.
    pub fn indirect(desc: TypeDesc, target: Option<&'a dyn Reflect>) -> Self {
        Self {
            desc,
            repr: Repr::Indirect(target),
        }
    }

    pub fn list(desc: TypeDesc, list: &'a dyn ListAccess) -> Self {
        Self {
            desc,
            repr: Repr::List(list),
        }
    }

    pub fn map(desc: TypeDesc, map: &'a dyn MapAccess) -> Self {
        Self {
            desc,
            repr: Repr::Map(map),
        }
    }

    pub fn composite<T: Reflect>(value: &'a T) -> Self {
        Self {
            desc: T::type_desc(),
            repr: Repr::Composite(value),
        }
    }

    pub fn desc(&self) -> TypeDesc {
        self.desc
    }

    pub fn kind(&self) -> Kind {
        self.desc.kind()
    }

    pub fn type_name(&self) -> &'static str {
        self.desc.name()
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.repr, Repr::Zero)
    }

    pub fn is_nil(&self) -> bool {
        match self.repr {
            Repr::Indirect(target) => target.is_none(),
            Repr::Zero => self.kind().is_indirect(),
            _ => false,
        }
    }

    /// Follows one level of indirection. `None` for nil or non-indirect values.
    pub fn elem(&self) -> Option<Value<'a>> {
        match self.repr {
            Repr::Indirect(Some(target)) => Some(target.as_value()),
            _ => None,
        }
    }

    pub fn field(&self, index: usize) -> Option<Value<'a>> {
        match self.repr {
            Repr::Composite(value) => value.field_value(index),
            Repr::Zero => self.desc.field(index).map(|field| Value::zero(field.ty())),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self.repr {
            Repr::List(list) => list.len(),
            Repr::Map(map) => map.len(),
            Repr::Zero => self.desc.array_len().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn elements(&self) -> Box<dyn Iterator<Item = Value<'a>> + 'a> {
        match self.repr {
            Repr::List(list) => list.elements(),
            Repr::Zero => match (self.desc.elem(), self.desc.array_len()) {
                (Some(elem), Some(len)) => Box::new(std::iter::repeat_n(Value::zero(elem), len)),
                _ => Box::new(std::iter::empty()),
            },
            _ => Box::new(std::iter::empty()),
        }
    }

    pub fn entries(&self) -> Box<dyn Iterator<Item = (Value<'a>, Value<'a>)> + 'a> {
        match self.repr {
            Repr::Map(map) => map.entries(),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.repr {
            Repr::Zero => "zero",
            Repr::Leaf => "leaf",
            Repr::Indirect(None) => "nil",
            Repr::Indirect(Some(_)) => "indirect",
            Repr::List(_) => "list",
            Repr::Map(_) => "map",
            Repr::Composite(_) => "composite",
        };
        f.debug_struct("Value")
            .field("type", &self.type_name())
            .field("kind", &self.kind())
            .field("state", &state)
            .finish()
    }
}
