//! [`Reflect`] implementations for standard library and ecosystem types.
//!
//! Nullable smart pointers (`Option`, `Box`, `Rc`, `Arc`) report the pointer
//! kind, sequence containers report the slice kind, and associative
//! containers report the map kind. Timestamp types are time-like structs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::time::SystemTime;

use indexmap::IndexMap;

use crate::kind::Kind;
use crate::reflect::{Reflect, TypeDesc};
use crate::value::{ListAccess, MapAccess, Value};

macro_rules! impl_leaf {
    ($($ty:ty => $desc:expr),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_desc() -> TypeDesc {
                    $desc
                }

                fn as_value(&self) -> Value<'_> {
                    Value::leaf(Self::type_desc())
                }
            }
        )*
    };
}

impl_leaf! {
    bool => TypeDesc::scalar::<Self>(Kind::Bool),
    i8 => TypeDesc::scalar::<Self>(Kind::Int8),
    i16 => TypeDesc::scalar::<Self>(Kind::Int16),
    i32 => TypeDesc::scalar::<Self>(Kind::Int32),
    i64 => TypeDesc::scalar::<Self>(Kind::Int64),
    i128 => TypeDesc::scalar::<Self>(Kind::Int128),
    isize => TypeDesc::scalar::<Self>(Kind::Int),
    u8 => TypeDesc::scalar::<Self>(Kind::Uint8),
    u16 => TypeDesc::scalar::<Self>(Kind::Uint16),
    u32 => TypeDesc::scalar::<Self>(Kind::Uint32),
    u64 => TypeDesc::scalar::<Self>(Kind::Uint64),
    u128 => TypeDesc::scalar::<Self>(Kind::Uint128),
    usize => TypeDesc::scalar::<Self>(Kind::Uint),
    f32 => TypeDesc::scalar::<Self>(Kind::Float32),
    f64 => TypeDesc::scalar::<Self>(Kind::Float64),
    char => TypeDesc::scalar::<Self>(Kind::Char),
    String => TypeDesc::scalar::<Self>(Kind::String),
    &'static str => TypeDesc::scalar::<Self>(Kind::String),
    () => TypeDesc::scalar::<Self>(Kind::Invalid),
    SystemTime => TypeDesc::time_like::<Self>(),
}

#[cfg(feature = "time")]
impl_leaf! {
    time::OffsetDateTime => TypeDesc::time_like::<Self>(),
    time::PrimitiveDateTime => TypeDesc::time_like::<Self>(),
    time::Date => TypeDesc::time_like::<Self>(),
}

#[cfg(feature = "chrono")]
impl_leaf! {
    chrono::NaiveDateTime => TypeDesc::time_like::<Self>(),
    chrono::NaiveDate => TypeDesc::time_like::<Self>(),
}

#[cfg(feature = "chrono")]
impl<Tz> Reflect for chrono::DateTime<Tz>
where
    Tz: chrono::TimeZone + 'static,
    Tz::Offset: 'static,
{
    fn type_desc() -> TypeDesc {
        TypeDesc::time_like::<Self>()
    }

    fn as_value(&self) -> Value<'_> {
        Value::leaf(Self::type_desc())
    }
}

impl<T: ?Sized + 'static> Reflect for PhantomData<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::scalar::<Self>(Kind::Invalid)
    }

    fn as_value(&self) -> Value<'_> {
        Value::leaf(Self::type_desc())
    }
}

impl<T: ?Sized + 'static> Reflect for *const T {
    fn type_desc() -> TypeDesc {
        TypeDesc::scalar::<Self>(Kind::UnsafePointer)
    }

    fn as_value(&self) -> Value<'_> {
        Value::leaf(Self::type_desc())
    }
}

impl<T: ?Sized + 'static> Reflect for *mut T {
    fn type_desc() -> TypeDesc {
        TypeDesc::scalar::<Self>(Kind::UnsafePointer)
    }

    fn as_value(&self) -> Value<'_> {
        Value::leaf(Self::type_desc())
    }
}

macro_rules! impl_chan {
    ($($chan:ident),*) => {
        $(
            impl<T: 'static> Reflect for $chan<T> {
                fn type_desc() -> TypeDesc {
                    TypeDesc::scalar::<Self>(Kind::Chan)
                }

                fn as_value(&self) -> Value<'_> {
                    Value::leaf(Self::type_desc())
                }
            }
        )*
    };
}

impl_chan!(Sender, SyncSender, Receiver);

macro_rules! impl_func {
    ($(($($arg:ident),*)),* $(,)?) => {
        $(
            impl<R: 'static, $($arg: 'static),*> Reflect for fn($($arg),*) -> R {
                fn type_desc() -> TypeDesc {
                    TypeDesc::scalar::<Self>(Kind::Func)
                }

                fn as_value(&self) -> Value<'_> {
                    Value::leaf(Self::type_desc())
                }
            }
        )*
    };
}

impl_func!((), (A), (A, B), (A, B, C));

macro_rules! impl_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Reflect> Reflect for $ptr<T> {
                fn type_desc() -> TypeDesc {
                    TypeDesc::pointer::<Self, T>()
                }

                fn as_value(&self) -> Value<'_> {
                    let target: &T = self;
                    Value::indirect(Self::type_desc(), Some(target as &dyn Reflect))
                }
            }
        )*
    };
}

impl_pointer!(Box, Rc, Arc);

impl<T: Reflect> Reflect for Option<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::pointer::<Self, T>()
    }

    fn as_value(&self) -> Value<'_> {
        Value::indirect(Self::type_desc(), self.as_ref().map(|v| v as &dyn Reflect))
    }
}

/// A value whose concrete type is only known at runtime.
///
/// This is the interface kind: the scanner unwraps it like a pointer, but the
/// declared type says nothing about what sits behind it.
pub struct Dynamic(Option<Box<dyn Reflect>>);

impl Dynamic {
    pub fn new<T: Reflect>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    pub fn nil() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&dyn Reflect> {
        self.0.as_deref()
    }
}

impl Default for Dynamic {
    fn default() -> Self {
        Self::nil()
    }
}

impl Reflect for Dynamic {
    fn type_desc() -> TypeDesc {
        TypeDesc::interface::<Self>()
    }

    fn as_value(&self) -> Value<'_> {
        Value::indirect(Self::type_desc(), self.get())
    }
}

macro_rules! impl_list {
    ($($list:ident $(: $bound:path)?),*) => {
        $(
            impl<T: Reflect $(+ $bound)?> ListAccess for $list<T> {
                fn len(&self) -> usize {
                    $list::len(self)
                }

                fn elements(&self) -> Box<dyn Iterator<Item = Value<'_>> + '_> {
                    Box::new(self.iter().map(Reflect::as_value))
                }
            }

            impl<T: Reflect $(+ $bound)?> Reflect for $list<T> {
                fn type_desc() -> TypeDesc {
                    TypeDesc::slice::<Self, T>()
                }

                fn as_value(&self) -> Value<'_> {
                    Value::list(Self::type_desc(), self)
                }
            }
        )*
    };
}

impl_list!(Vec, VecDeque, BTreeSet);

impl<T: Reflect, S: 'static> ListAccess for HashSet<T, S> {
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn elements(&self) -> Box<dyn Iterator<Item = Value<'_>> + '_> {
        Box::new(self.iter().map(Reflect::as_value))
    }
}

impl<T: Reflect, S: 'static> Reflect for HashSet<T, S> {
    fn type_desc() -> TypeDesc {
        TypeDesc::slice::<Self, T>()
    }

    fn as_value(&self) -> Value<'_> {
        Value::list(Self::type_desc(), self)
    }
}

impl<T: Reflect, const N: usize> ListAccess for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn elements(&self) -> Box<dyn Iterator<Item = Value<'_>> + '_> {
        Box::new(self.iter().map(Reflect::as_value))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_desc() -> TypeDesc {
        TypeDesc::array::<Self, T>(N)
    }

    fn as_value(&self) -> Value<'_> {
        Value::list(Self::type_desc(), self)
    }
}

macro_rules! impl_map {
    ($($map:ident $(, $state:ident)?);* $(;)?) => {
        $(
            impl<K: Reflect, V: Reflect $(, $state: 'static)?> MapAccess for $map<K, V $(, $state)?> {
                fn len(&self) -> usize {
                    $map::len(self)
                }

                fn entries(&self) -> Box<dyn Iterator<Item = (Value<'_>, Value<'_>)> + '_> {
                    Box::new(self.iter().map(|(k, v)| (k.as_value(), v.as_value())))
                }
            }

            impl<K: Reflect, V: Reflect $(, $state: 'static)?> Reflect for $map<K, V $(, $state)?> {
                fn type_desc() -> TypeDesc {
                    TypeDesc::map::<Self, K, V>()
                }

                fn as_value(&self) -> Value<'_> {
                    Value::map(Self::type_desc(), self)
                }
            }
        )*
    };
}

impl_map! {
    HashMap, S;
    IndexMap, S;
    BTreeMap;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::int(i64::type_desc(), Kind::Int64)]
    #[case::string(String::type_desc(), Kind::String)]
    #[case::unit(<()>::type_desc(), Kind::Invalid)]
    #[case::boxed(<Box<u8>>::type_desc(), Kind::Pointer)]
    #[case::option(<Option<u8>>::type_desc(), Kind::Pointer)]
    #[case::deque(<VecDeque<u8>>::type_desc(), Kind::Slice)]
    #[case::array(<[u8; 4]>::type_desc(), Kind::Array)]
    #[case::index_map(<IndexMap<String, u8>>::type_desc(), Kind::Map)]
    #[case::sender(<Sender<u8>>::type_desc(), Kind::Chan)]
    #[case::func(<fn(u8) -> bool>::type_desc(), Kind::Func)]
    #[case::raw(<*const u8>::type_desc(), Kind::UnsafePointer)]
    #[case::dynamic(Dynamic::type_desc(), Kind::Interface)]
    fn reports_kind(#[case] desc: TypeDesc, #[case] kind: Kind) {
        assert_eq!(desc.kind(), kind);
    }

    #[test]
    fn map_reports_key_and_value_types() {
        let (key, value) = <BTreeMap<String, Vec<u8>>>::type_desc()
            .map_types()
            .expect("map shape");
        assert_eq!(key.kind(), Kind::String);
        assert_eq!(value.kind(), Kind::Slice);
    }

    #[test]
    fn dynamic_unwraps_to_concrete_value() {
        let value = Dynamic::new(vec![1u8, 2, 3]);
        let inner = value.as_value().elem().expect("not nil");
        assert_eq!(inner.kind(), Kind::Slice);
        assert_eq!(inner.len(), 3);
        assert!(Dynamic::nil().as_value().is_nil());
    }

    #[cfg(feature = "time")]
    #[test]
    fn offset_date_time_is_time_like() {
        assert!(time::OffsetDateTime::type_desc().is_time_like());
    }
}
