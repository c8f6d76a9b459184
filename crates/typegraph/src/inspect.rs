//! Value unwrapper and the kind-specific composite inspectors.

use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::model::SkippedField;
use crate::reflect::{FieldDesc, TypeDesc};
use crate::scanner::{Frame, Session};
use crate::trace::Phase;
use crate::value::Value;

/// Strips pointer and interface layers. Returns `None` when a nil layer is hit.
pub(crate) fn unwrap(mut value: Value<'_>) -> Option<Value<'_>> {
    while value.kind().is_indirect() {
        value = value.elem()?;
    }
    Some(value)
}

/// Fails for a container member type that no inspector accepts.
///
/// Checked against the declared type, through nested containers, so an
/// empty container and a populated one classify the same way. Structs and
/// interfaces end the check.
pub(crate) fn check_member(desc: TypeDesc) -> Result<()> {
    let target = desc.deref_all();
    match target.kind() {
        Kind::UnsafePointer => Err(Error::UnsupportedKind {
            type_name: target.name(),
            kind: target.kind(),
        }),
        Kind::Slice | Kind::Array => target.elem().map_or(Ok(()), check_member),
        Kind::Map => match target.map_types() {
            Some((key, item)) => check_member(key).and_then(|()| check_member(item)),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

/// Follows pointer layers, substituting the pointee's zero value for nil.
pub(crate) fn deref_or_zero(mut value: Value<'_>) -> Value<'_> {
    while value.kind() == Kind::Pointer {
        value = match (value.elem(), value.desc().elem()) {
            (Some(inner), _) => inner,
            (None, Some(desc)) => Value::zero(desc),
            (None, None) => break,
        };
    }
    value
}

impl<'v> Session<'_, 'v> {
    /// Resolves indirection and dispatches to the matching inspector.
    ///
    /// Struct instances are never walked here. Their types are modeled from
    /// declarations by the classifier, so live data cannot change a model.
    pub(crate) fn inspect(&mut self, frame: &Frame, value: Value<'v>) -> Result<()> {
        let Some(value) = unwrap(value) else {
            return Ok(());
        };
        self.tracer.emit(Phase::Inspect, &frame.model, value.type_name());

        match value.kind() {
            kind if kind.is_scalar_like() => Ok(()),
            Kind::Map => self.inspect_map(frame, value),
            Kind::Slice => self.inspect_list(frame, value, Phase::Slice, Phase::SliceElem),
            Kind::Array => self.inspect_list(frame, value, Phase::Array, Phase::ArrayElem),
            Kind::Struct => Ok(()),
            kind => Err(Error::UnsupportedKind {
                type_name: value.type_name(),
                kind,
            }),
        }
    }

    fn inspect_list(
        &mut self,
        frame: &Frame,
        value: Value<'v>,
        phase: Phase,
        elem_phase: Phase,
    ) -> Result<()> {
        self.tracer.emit(phase, &frame.model, value.type_name());
        if let Some(elem) = value.desc().elem() {
            check_member(elem)?;
        }
        for elem in value.elements() {
            self.tracer.emit(elem_phase, &frame.model, elem.type_name());
            self.inspect(frame, elem)?;
        }
        Ok(())
    }

    fn inspect_map(&mut self, frame: &Frame, value: Value<'v>) -> Result<()> {
        self.tracer.emit(Phase::Map, &frame.model, value.type_name());
        if let Some((key, item)) = value.desc().map_types() {
            check_member(key)?;
            check_member(item)?;
        }
        for (key, item) in value.entries() {
            self.tracer.emit(Phase::MapKey, &frame.model, key.type_name());
            self.inspect(frame, key)?;
            self.tracer.emit(Phase::MapValue, &frame.model, item.type_name());
            self.inspect(frame, item)?;
        }
        Ok(())
    }

    /// Classifies every declared field of `value` into `frame`.
    ///
    /// A field that fails classification is dropped and recorded as skipped.
    /// Embedding is flattened one level deep; an embedded field that itself
    /// embeds aborts the struct, keeping the fields gathered so far.
    pub(crate) fn inspect_struct(&mut self, frame: &mut Frame, value: Value<'v>) -> Result<()> {
        let desc = value.desc();
        self.tracer.emit(Phase::Struct, &frame.model, desc.name());

        for (index, field) in desc.fields().enumerate() {
            let field_value = value.field(index).unwrap_or_else(|| Value::zero(field.ty()));
            if field.is_embedded() && field.ty().kind() != Kind::Invalid {
                self.inspect_embedded(frame, &field, field_value)?;
            } else {
                self.push_field(frame, &field, field_value, false);
            }
        }
        Ok(())
    }

    fn inspect_embedded(
        &mut self,
        frame: &mut Frame,
        field: &FieldDesc,
        value: Value<'v>,
    ) -> Result<()> {
        let inner = deref_or_zero(value);
        let desc = inner.desc();

        if desc.is_time_like() {
            // Opaque timestamps have nothing to flatten.
            self.push_field(frame, field, value, true);
            return Ok(());
        }
        if !desc.is_composite() {
            return Err(Error::EmbeddedNotComposite {
                owner: frame.model.type_name(),
                field: field.name(),
                kind: desc.kind(),
            });
        }

        for (index, sub) in desc.fields().enumerate() {
            if sub.is_embedded() {
                return Err(Error::NestedAnonymity {
                    owner: frame.model.type_name(),
                    embedded: field.name(),
                    nested: sub.name(),
                });
            }
            let sub_value = inner.field(index).unwrap_or_else(|| Value::zero(sub.ty()));
            self.push_field(frame, &sub, sub_value, true);
        }
        Ok(())
    }

    fn push_field(&mut self, frame: &mut Frame, field: &FieldDesc, value: Value<'v>, embedded: bool) {
        if field.ty().kind() == Kind::Invalid {
            self.tracer.emit(Phase::Skip, &frame.model, field.name());
            return;
        }
        match self.classify(frame, field, value, embedded) {
            Ok(descriptor) => frame.fields.push(descriptor),
            Err(error) => {
                tracing::debug!(
                    model = frame.model.type_name(),
                    field = field.name(),
                    %error,
                    "dropping field"
                );
                self.tracer.emit(Phase::Skip, &frame.model, field.name());
                frame.skipped.push(SkippedField {
                    name: field.name(),
                    error,
                });
            }
        }
    }
}
