//! Runtime type-graph introspection.
//!
//! [`Scanner::scan`] takes composite values, walks their type descriptions,
//! and builds one [`ModelDescriptor`] per composite or slice element type reachable from
//! them: field names, declared types, tags, embedding, and [`Relation`]s to
//! other models. Models are memoized in a shared [`TypeGraphCache`], which
//! is also what stops the walk on self- and mutually-referential types.
//!
//! ```
//! use std::sync::Arc;
//! use typegraph::{Reflect, Scanner, TypeGraphCache};
//!
//! #[derive(Reflect)]
//! struct Node {
//!     val: i64,
//!     next: Option<Box<Node>>,
//! }
//!
//! let cache = Arc::new(TypeGraphCache::new());
//! let scanner = Scanner::builder().cache(cache.clone()).build();
//! scanner.scan(&[&Node { val: 1, next: None }]).unwrap();
//!
//! let node = cache.get_of::<Node>().unwrap();
//! let next = node.field("next").unwrap();
//! assert!(next.flags().is_pointer());
//! assert!(next.flags().is_self_reference());
//! assert_eq!(cache.len(), 1);
//! ```

extern crate self as typegraph;

mod cache;
mod classify;
mod error;
mod impls;
mod inspect;
mod kind;
mod model;
mod reflect;
mod scanner;
mod snapshot;
mod tags;
mod trace;
mod value;

pub mod telemetry;

pub use cache::TypeGraphCache;
pub use error::{Error, Result};
pub use impls::Dynamic;
pub use kind::Kind;
pub use model::{FieldDescriptor, FieldFlags, ModelDescriptor, Relation, SkippedField, TypeKey};
pub use reflect::{FieldDesc, Reflect, TypeDesc};
pub use scanner::{Scanner, TRACE_ENV, scan};
pub use snapshot::{FieldSnapshot, GraphSnapshot, ModelSnapshot, SkippedSnapshot};
pub use tags::{Tag, TagError, Tags};
pub use trace::Phase;
pub use value::{ListAccess, MapAccess, Value};

#[cfg(feature = "derive")]
pub use typegraph_derive::Reflect;
