use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::scope::meaning::Meaning;
use crate::syntax::{position::Position, shared_interner::SharedInterner, symbol::Name};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("duplicate declaration of {name} in the current scope")]
    Duplicate {
        name: Name,
        namespace: Option<Name>,
        /// The binding that is already in the frame.
        existing: Meaning,
        previous: Option<Position>,
    },
}

/// One live binding: what the name means and where it was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub meaning: Meaning,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BindingKey {
    namespace: Option<Name>,
    name: Name,
}

#[derive(Debug, Clone, Default)]
struct Frame {
    bindings: FxHashMap<BindingKey, Binding>,
    // Declaration order, for dumps and suggestions.
    order: Vec<BindingKey>,
}

/// A stack of lexical scopes binding `(namespace, name)` keys to meanings.
///
/// Bindings go into the innermost frame only, and a key may be bound at most
/// once per frame. Lookups walk from the innermost frame outwards, so the
/// most recently entered frame that still is open wins. Qualified and
/// unqualified bindings never see each other: an unqualified lookup only
/// finds bindings made without a namespace, a qualified one needs the exact
/// namespace.
///
/// The stack starts empty; the caller pushes the module frame itself.
#[derive(Debug, Clone, Default)]
pub struct ScopeResolver {
    frames: Vec<Frame>,
}

impl ScopeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(Frame::default());
        tracing::trace!(depth = self.frames.len(), "enter scope");
    }

    /// Pops the innermost frame and every binding made in it.
    ///
    /// # Panics
    ///
    /// Panics if no frame is open; enter and leave calls must nest.
    pub fn leave_scope(&mut self) {
        let frame = self
            .frames
            .pop()
            .unwrap_or_else(|| panic!("internal inconsistency: leave_scope with no open scope"));
        tracing::trace!(
            depth = self.frames.len(),
            dropped = frame.order.len(),
            "leave scope"
        );
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn define(
        &mut self,
        name: Name,
        namespace: Option<Name>,
        meaning: Meaning,
    ) -> Result<(), ScopeError> {
        self.insert(name, namespace, Binding { meaning, position: None })
    }

    pub fn define_unqualified(&mut self, name: Name, meaning: Meaning) -> Result<(), ScopeError> {
        self.define(name, None, meaning)
    }

    /// Like [`define`](Self::define), remembering where the declaration was
    /// so a later duplicate can point back at it.
    pub fn define_at(
        &mut self,
        name: Name,
        namespace: Option<Name>,
        meaning: Meaning,
        position: Position,
    ) -> Result<(), ScopeError> {
        self.insert(
            name,
            namespace,
            Binding {
                meaning,
                position: Some(position),
            },
        )
    }

    /// Removes a binding from the innermost frame. Absent keys are ignored.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn undefine(&mut self, name: Name, namespace: Option<Name>) {
        let frame = self
            .frames
            .last_mut()
            .unwrap_or_else(|| panic!("internal inconsistency: undefine with no open scope"));
        let key = BindingKey { namespace, name };
        if frame.bindings.remove(&key).is_some() {
            frame.order.retain(|k| *k != key);
        }
    }

    /// Unqualified lookup in the innermost frame only.
    pub fn lookup_local(&self, name: Name) -> Option<Meaning> {
        let key = BindingKey {
            namespace: None,
            name,
        };
        self.frames
            .last()
            .and_then(|frame| frame.bindings.get(&key))
            .map(|binding| binding.meaning)
    }

    /// Innermost-first lookup requiring an exact namespace match.
    ///
    /// `namespace == None` is the same as [`lookup_unqualified`].
    ///
    /// [`lookup_unqualified`]: Self::lookup_unqualified
    pub fn lookup(&self, name: Name, namespace: Option<Name>) -> Option<Meaning> {
        self.lookup_binding(name, namespace).map(|binding| binding.meaning)
    }

    pub fn lookup_unqualified(&self, name: Name) -> Option<Meaning> {
        self.lookup(name, None)
    }

    pub fn lookup_binding(&self, name: Name, namespace: Option<Name>) -> Option<&Binding> {
        let key = BindingKey { namespace, name };
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(&key))
    }

    /// Every `(namespace, name)` a lookup could currently reach, innermost
    /// frame first, each key once.
    pub fn visible_names(&self) -> Vec<(Option<Name>, Name)> {
        let mut seen = Vec::new();
        for frame in self.frames.iter().rev() {
            for key in &frame.order {
                let pair = (key.namespace, key.name);
                if !seen.contains(&pair) {
                    seen.push(pair);
                }
            }
        }
        seen
    }

    /// One line per live binding, outermost frame first, indented by depth.
    pub fn dump_lines(&self, interner: &SharedInterner) -> Vec<String> {
        let mut lines = Vec::new();
        for (depth, frame) in self.frames.iter().enumerate() {
            lines.push(format!("{}scope {}", "  ".repeat(depth), depth));
            for key in &frame.order {
                let binding = &frame.bindings[key];
                let name = interner.text_of(key.name);
                let qualified = match key.namespace {
                    Some(ns) => format!("{}.{}", interner.text_of(ns), name),
                    None => name,
                };
                lines.push(format!(
                    "{}{} => {}",
                    "  ".repeat(depth + 1),
                    qualified,
                    binding.meaning
                ));
            }
        }
        lines
    }

    /// Logs every live binding at debug level.
    pub fn dump(&self, interner: &SharedInterner) {
        for line in self.dump_lines(interner) {
            tracing::debug!(target: "modscript::scope", "{}", line);
        }
    }

    fn insert(
        &mut self,
        name: Name,
        namespace: Option<Name>,
        binding: Binding,
    ) -> Result<(), ScopeError> {
        let frame = self
            .frames
            .last_mut()
            .unwrap_or_else(|| panic!("internal inconsistency: define with no open scope"));
        let key = BindingKey { namespace, name };

        if let Some(existing) = frame.bindings.get(&key) {
            return Err(ScopeError::Duplicate {
                name,
                namespace,
                existing: existing.meaning,
                previous: existing.position,
            });
        }

        frame.bindings.insert(key, binding);
        frame.order.push(key);
        Ok(())
    }
}
