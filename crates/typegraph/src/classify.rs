//! Field classification.

use crate::error::Result;
use crate::inspect::deref_or_zero;
use crate::kind::Kind;
use crate::model::{FieldDescriptor, FieldFlags};
use crate::reflect::{FieldDesc, TypeDesc};
use crate::scanner::{Frame, Session};
use crate::tags::Tags;
use crate::trace::Phase;
use crate::value::Value;

impl<'v> Session<'_, 'v> {
    /// Builds the descriptor for one declared field of `frame.model`.
    ///
    /// Pointer fields are classified by their pointee after every pointer
    /// layer is stripped. Struct and pointer-to-struct fields become
    /// relations, and so does every slice, to its element type. Timestamps
    /// stay terminal. Other kinds are handed to the unwrapper, whose errors
    /// propagate.
    pub(crate) fn classify(
        &mut self,
        frame: &Frame,
        field: &FieldDesc,
        value: Value<'v>,
        embedded: bool,
    ) -> Result<FieldDescriptor> {
        self.tracer.emit(Phase::StructField, &frame.model, field.name());

        let tags = Tags::parse(field.tag())?;
        let declared = field.ty();
        let mut descriptor = FieldDescriptor::new(field.name(), declared, tags);
        if embedded || field.is_embedded() {
            descriptor.insert(FieldFlags::EMBEDDED);
        }

        let through_pointer = declared.kind() == Kind::Pointer;
        if through_pointer {
            descriptor.insert(FieldFlags::POINTER);
        }
        let target = declared.deref_all();
        let target_value = deref_or_zero(value);

        match target.kind() {
            Kind::Struct if target.is_time_like() => descriptor.insert(FieldFlags::TIME_LIKE),
            Kind::Struct => {
                descriptor.insert(FieldFlags::COMPOSITE);
                // Pointees are modeled from their zero value, not the live one.
                let template = if through_pointer {
                    Value::zero(target)
                } else {
                    value
                };
                self.relate(frame, &mut descriptor, target, template);
            }
            Kind::Slice => {
                descriptor.insert(FieldFlags::COLLECTION);
                // Walk first: a dropped field must not leave a pending model.
                self.inspect(frame, target_value)?;
                if let Some(elem) = target.elem() {
                    self.classify_elem(frame, &mut descriptor, elem);
                }
            }
            Kind::Map => {
                descriptor.insert(FieldFlags::MAP);
                self.inspect(frame, target_value)?;
            }
            Kind::Interface => {
                descriptor.insert(FieldFlags::INTERFACE);
                self.inspect(frame, target_value)?;
            }
            kind if kind.is_primitive() => {}
            _ => self.inspect(frame, target_value)?,
        }

        Ok(descriptor)
    }

    fn classify_elem(&mut self, frame: &Frame, descriptor: &mut FieldDescriptor, elem: TypeDesc) {
        if elem.kind() == Kind::Pointer {
            descriptor.insert(FieldFlags::POINTER);
        }
        let elem = elem.deref_all();
        if elem.is_time_like() {
            descriptor.insert(FieldFlags::TIME_LIKE);
        }
        self.relate(frame, descriptor, elem, Value::zero(elem));
    }

    /// Links `descriptor` to the model for `target`: the owner itself, a
    /// cached model, one already pending in this scan, or a new one.
    fn relate(
        &mut self,
        frame: &Frame,
        descriptor: &mut FieldDescriptor,
        target: TypeDesc,
        template: Value<'v>,
    ) {
        let model = self.relation_target(&frame.model, target, template);
        descriptor.link(&model, frame.model.key());
    }
}
