//! Scan entry points and the model-building visitor.

use std::collections::HashMap;
use std::sync::Arc;

use bon::Builder;
use tracing::debug;

use crate::cache::TypeGraphCache;
use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::model::{FieldDescriptor, ModelBody, ModelDescriptor, SkippedField, TypeKey};
use crate::reflect::{Reflect, TypeDesc};
use crate::trace::{Phase, Tracer};
use crate::value::Value;

/// Environment switch for the traversal trace (`1`, `true`, `on` or `yes`).
pub const TRACE_ENV: &str = "TYPEGRAPH_TRACE";

fn trace_from_env() -> bool {
    std::env::var(TRACE_ENV).is_ok_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        )
    })
}

/// Builds models for composite values into a [`TypeGraphCache`].
///
/// ```
/// use std::sync::Arc;
/// use typegraph::{Reflect, Scanner, TypeGraphCache};
///
/// #[derive(Reflect)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let cache = Arc::new(TypeGraphCache::new());
/// let scanner = Scanner::builder().cache(cache.clone()).build();
///
/// let model = scanner
///     .scan_one(&Person { name: "Ada".into(), age: 36 })
///     .unwrap();
/// assert_eq!(model.fields().len(), 2);
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct Scanner {
    #[builder(default = TypeGraphCache::global())]
    cache: Arc<TypeGraphCache>,
    /// Emit traversal trace lines. Defaults to the `TYPEGRAPH_TRACE` variable.
    #[builder(default = trace_from_env())]
    trace: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &Arc<TypeGraphCache> {
        &self.cache
    }

    /// Models every root and everything reachable from it.
    ///
    /// Roots must be composites. Scanning stops at the first root that is
    /// not, leaving the roots before it modeled.
    #[tracing::instrument(name = "typegraph.scan", level = "debug", skip_all, fields(roots = roots.len()))]
    pub fn scan(&self, roots: &[&dyn Reflect]) -> Result<()> {
        let mut session = Session::new(&self.cache, Tracer::new(self.trace));
        for root in roots {
            session.scan_root(root.as_value())?;
        }
        Ok(())
    }

    /// Scans one root and returns its cached model.
    pub fn scan_one<T: Reflect>(&self, root: &T) -> Result<Arc<ModelDescriptor>> {
        let mut session = Session::new(&self.cache, Tracer::new(self.trace));
        session.scan_root(root.as_value())
    }
}

/// Scans `roots` into the process-wide cache.
pub fn scan(roots: &[&dyn Reflect]) -> Result<()> {
    Scanner::new().scan(roots)
}

struct Pending<'v> {
    model: Arc<ModelDescriptor>,
    template: Value<'v>,
}

/// State for one scan call.
///
/// Relation targets created but not yet visited are kept in `pending` with
/// the value their fields will be read from, so every relation to a type
/// within the scan shares one model instance.
pub(crate) struct Session<'s, 'v> {
    cache: &'s TypeGraphCache,
    pub(crate) tracer: Tracer,
    pending: HashMap<TypeKey, Pending<'v>>,
}

/// Fields collected for the model being inspected.
pub(crate) struct Frame {
    pub(crate) model: Arc<ModelDescriptor>,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) skipped: Vec<SkippedField>,
}

impl Frame {
    fn new(model: Arc<ModelDescriptor>) -> Self {
        Self {
            model,
            fields: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn finish(self, incomplete: Option<Error>) -> ModelBody {
        ModelBody {
            fields: self.fields,
            skipped: self.skipped,
            incomplete,
        }
    }
}

impl<'s, 'v> Session<'s, 'v> {
    fn new(cache: &'s TypeGraphCache, tracer: Tracer) -> Self {
        Self {
            cache,
            tracer,
            pending: HashMap::new(),
        }
    }

    fn scan_root(&mut self, value: Value<'v>) -> Result<Arc<ModelDescriptor>> {
        let desc = value.desc();
        if desc.kind() != Kind::Struct {
            return Err(Error::UnsupportedRootKind {
                type_name: desc.name(),
                kind: desc.kind(),
            });
        }

        let key = desc.key();
        let model = match self.cache.get(&key) {
            Some(model) => model,
            None => Arc::new(ModelDescriptor::new(desc, 0)),
        };
        self.visit(&model, value)?;
        Ok(self.cache.get(&key).unwrap_or(model))
    }

    /// Inspects `model`, publishes it, then visits its unvisited relations.
    ///
    /// The cache check comes first and the insert happens before relations
    /// are followed, so a cycle leads back to a cached entry and stops.
    fn visit(&mut self, model: &Arc<ModelDescriptor>, value: Value<'v>) -> Result<()> {
        let key = model.key();
        if self.cache.contains(&key) {
            self.pending.remove(&key);
            return Ok(());
        }
        self.tracer.emit(Phase::Visit, model, model.type_name());

        let mut frame = Frame::new(Arc::clone(model));
        // Slice element types that are not plain structs get an empty model.
        let inspected = if value.kind() == Kind::Struct && !value.desc().is_time_like() {
            self.inspect_struct(&mut frame, value)
        } else {
            Ok(())
        };
        if let Err(err) = &inspected {
            debug!(model = model.type_name(), error = %err, "model inspection stopped early");
        }

        model.publish(frame.finish(inspected.as_ref().err().cloned()));
        if self.cache.insert(Arc::clone(model)).is_some() {
            debug!(model = model.type_name(), "replaced a concurrently built model");
        }
        self.pending.remove(&key);

        let targets: Vec<Arc<ModelDescriptor>> = model
            .relations()
            .filter_map(|(_, relation)| relation.model())
            .filter(|target| !target.is_visited())
            .collect();

        let mut outcome = inspected;
        for target in targets {
            if target.is_visited() {
                continue;
            }
            let template = self
                .pending
                .get(&target.key())
                .map_or_else(|| Value::zero(target.desc()), |pending| pending.template);
            self.tracer.emit(Phase::Relation, model, target.type_name());
            let visited = self.visit(&target, template);
            if outcome.is_ok() {
                outcome = visited;
            }
        }
        outcome
    }

    /// Model for a relation target, created at `depth + 1` on first sight.
    pub(crate) fn relation_target(
        &mut self,
        owner: &Arc<ModelDescriptor>,
        desc: TypeDesc,
        template: Value<'v>,
    ) -> Arc<ModelDescriptor> {
        let key = desc.key();
        if key == owner.key() {
            return Arc::clone(owner);
        }
        if let Some(model) = self.cache.get(&key) {
            return model;
        }
        if let Some(pending) = self.pending.get(&key) {
            return Arc::clone(&pending.model);
        }
        let model = Arc::new(ModelDescriptor::new(desc, owner.depth() + 1));
        self.pending.insert(
            key,
            Pending {
                model: Arc::clone(&model),
                template,
            },
        );
        model
    }
}
