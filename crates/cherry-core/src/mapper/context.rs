//! The visited set threaded through one conversion pass.

use std::{
  any::{Any, TypeId},
  collections::HashMap,
  fmt,
  sync::{Arc, Weak},
};

/// Sources are keyed by allocation, never by value: two equal documents are
/// still two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SourceKey {
  type_id: TypeId,
  address: usize,
}

impl SourceKey {
  fn of<S: 'static>(source: &Arc<S>) -> Self {
    Self {
      type_id: TypeId::of::<S>(),
      address: Arc::as_ptr(source) as *const () as usize,
    }
  }
}

enum Known<T> {
  /// Registered before its children are converted; not yet reachable.
  Building(Weak<T>),
  Built(Arc<T>),
}

/// A visited source, pinned so its address cannot be handed to another
/// allocation while the context lives, plus its `Known<T>` target.
struct Visit {
  _source: Arc<dyn Any + Send + Sync>,
  target:  Box<dyn Any + Send>,
}

/// Records, for one conversion pass, which sources have been converted and
/// into what.
///
/// Create one per top-level conversion and drop it when done. Every source
/// visited and every target produced during the pass is kept alive until
/// then, so back-references between targets stay attached while the caller
/// holds any of them.
#[derive(Default)]
pub struct MappingContext {
  known: HashMap<SourceKey, Visit>,
}

impl MappingContext {
  pub fn new() -> Self { Self::default() }

  /// Number of sources visited so far.
  pub fn len(&self) -> usize { self.known.len() }

  pub fn is_empty(&self) -> bool { self.known.is_empty() }

  /// The target already produced for `source` in this pass.
  pub fn mapped<S, T>(&self, source: &Arc<S>) -> Option<Arc<T>>
  where
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
  {
    match self.entry::<S, T>(source)? {
      Known::Building(target) => target.upgrade(),
      Known::Built(target) => Some(target.clone()),
    }
  }

  /// A non-owning pointer to the target for `source`, usable even while the
  /// target is still being built.
  pub(crate) fn link<S, T>(&self, source: &Arc<S>) -> Option<Weak<T>>
  where
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
  {
    match self.entry::<S, T>(source)? {
      Known::Building(target) => Some(target.clone()),
      Known::Built(target) => Some(Arc::downgrade(target)),
    }
  }

  pub(crate) fn building<S, T>(&mut self, source: &Arc<S>, target: Weak<T>)
  where
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
  {
    self.visit(source, Known::Building(target));
  }

  pub(crate) fn built<S, T>(&mut self, source: &Arc<S>, target: Arc<T>)
  where
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
  {
    self.visit(source, Known::Built(target));
  }

  fn visit<S, T>(&mut self, source: &Arc<S>, known: Known<T>)
  where
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
  {
    let visit = Visit {
      _source: source.clone(),
      target:  Box::new(known),
    };
    self.known.insert(SourceKey::of(source), visit);
  }

  fn entry<S, T>(&self, source: &Arc<S>) -> Option<&Known<T>>
  where
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
  {
    self.known.get(&SourceKey::of(source))?.target.downcast_ref::<Known<T>>()
  }
}

impl fmt::Debug for MappingContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MappingContext")
      .field("visited", &self.known.len())
      .finish()
  }
}
