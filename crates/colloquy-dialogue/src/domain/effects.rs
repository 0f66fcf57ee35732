//! Choice actions: pure transformations of the variable store.

use std::fmt;

use colloquy_core::error::ContentError;
use colloquy_core::value::Value;
use colloquy_core::variables::{StoreUpdate, VariableStore};

/// A store transformation attached to a choice.
///
/// Any [`StoreUpdate`] that is also `Send + Sync + Debug` qualifies.
pub trait Action: StoreUpdate + Send + Sync + fmt::Debug {}

impl<T> Action for T where T: StoreUpdate + Send + Sync + fmt::Debug {}

/// Data-driven store edits.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Set a variable, replacing any previous value.
    Set(String, Value),
    /// Add to a numeric variable; unset starts at zero. Integer deltas keep
    /// integers integral, float deltas produce floats.
    Increment(String, Value),
    /// Flip a boolean variable; unset becomes `true`.
    Toggle(String),
    /// Remove a variable.
    Remove(String),
    /// Apply edits left to right; the first failure aborts the whole sequence.
    Sequence(Vec<Effect>),
}

impl Effect {
    #[allow(clippy::cast_precision_loss)]
    fn incremented(key: &str, current: Option<&Value>, delta: &Value) -> Result<Value, ContentError> {
        let current = current.unwrap_or(&Value::Int(0));
        match (current, delta) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.saturating_add(*b))),
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(*a as f64 + b)),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(a + *b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::Int(_) | Value::Float(_), other) => Err(ContentError::TypeMismatch {
                key: key.to_owned(),
                expected: "number",
                found: other.kind(),
            }),
            (other, _) => Err(ContentError::TypeMismatch {
                key: key.to_owned(),
                expected: "number",
                found: other.kind(),
            }),
        }
    }
}

impl StoreUpdate for Effect {
    fn apply(&self, store: &VariableStore) -> Result<VariableStore, ContentError> {
        match self {
            Self::Set(key, value) => Ok(store.with(key.clone(), value.clone())),
            Self::Increment(key, delta) => {
                let next = Self::incremented(key, store.get(key), delta)?;
                Ok(store.with(key.clone(), next))
            }
            Self::Toggle(key) => match store.get(key) {
                None => Ok(store.with(key.clone(), true)),
                Some(Value::Bool(b)) => Ok(store.with(key.clone(), !b)),
                Some(other) => Err(ContentError::TypeMismatch {
                    key: key.clone(),
                    expected: "bool",
                    found: other.kind(),
                }),
            },
            Self::Remove(key) => Ok(store.without(key)),
            Self::Sequence(effects) => effects
                .iter()
                .try_fold(store.clone(), |acc, effect| effect.apply(&acc)),
        }
    }
}

/// Adapts a closure into an [`Action`].
pub struct FnAction<F> {
    label: &'static str,
    f: F,
}

impl<F> FnAction<F>
where
    F: Fn(&VariableStore) -> Result<VariableStore, ContentError> + Send + Sync,
{
    /// Wraps `f`; `label` identifies it in debug output.
    pub fn new(label: &'static str, f: F) -> Self {
        Self { label, f }
    }
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnAction").field(&self.label).finish()
    }
}

impl<F> StoreUpdate for FnAction<F>
where
    F: Fn(&VariableStore) -> Result<VariableStore, ContentError> + Send + Sync,
{
    fn apply(&self, store: &VariableStore) -> Result<VariableStore, ContentError> {
        (self.f)(store)
    }
}
