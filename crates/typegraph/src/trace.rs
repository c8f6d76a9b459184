//! Optional human-readable traversal trace.
//!
//! Lines go out as `tracing` events on the `typegraph::trace` target at
//! `TRACE` level, and only when the scanner was built with tracing on.

use std::fmt;

use crate::model::ModelDescriptor;

/// Traversal step a trace line was emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Visit,
    Inspect,
    Struct,
    StructField,
    Slice,
    SliceElem,
    Array,
    ArrayElem,
    Map,
    MapKey,
    MapValue,
    Relation,
    Skip,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Visit => "visit",
            Phase::Inspect => "inspect",
            Phase::Struct => "struct",
            Phase::StructField => "struct field",
            Phase::Slice => "slice",
            Phase::SliceElem => "slice elem",
            Phase::Array => "array",
            Phase::ArrayElem => "array elem",
            Phase::Map => "map",
            Phase::MapKey => "map key",
            Phase::MapValue => "map value",
            Phase::Relation => "relation",
            Phase::Skip => "skip",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Tracer {
    enabled: bool,
}

impl Tracer {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub(crate) fn emit(&self, phase: Phase, model: &ModelDescriptor, subject: &str) {
        if !self.enabled {
            return;
        }
        let depth = model.depth();
        let line = format!(
            "{:indent$}[{phase}] {} :: {subject}",
            "",
            model.type_name(),
            indent = depth * 2,
        );
        tracing::trace!(
            target: "typegraph::trace",
            phase = phase.as_str(),
            model = model.type_name(),
            depth,
            subject,
            "{line}"
        );
    }
}
