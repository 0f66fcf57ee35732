//! Choice conditions: pure predicates over the variable store.

use std::fmt;

use colloquy_core::error::ContentError;
use colloquy_core::value::Value;
use colloquy_core::variables::VariableStore;

/// A pure predicate deciding whether a choice is shown.
///
/// Implementations must be total and deterministic and must not have side
/// effects. Evaluation problems are reported as [`ContentError`].
pub trait Condition: Send + Sync + fmt::Debug {
    /// Evaluates the predicate against `store`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the predicate cannot be evaluated.
    fn evaluate(&self, store: &VariableStore) -> Result<bool, ContentError>;
}

/// Data-driven predicates covering the common gating patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// The variable has any value.
    IsSet(String),
    /// The variable is set and truthy.
    IsTruthy(String),
    /// The variable equals the value. Unset never equals.
    Equals(String, Value),
    /// The variable is unset or differs from the value.
    NotEquals(String, Value),
    /// The numeric variable is `>=` the bound. Unset counts as zero.
    AtLeast(String, f64),
    /// The numeric variable is `<=` the bound. Unset counts as zero.
    AtMost(String, f64),
    /// Negation.
    Not(Box<Predicate>),
    /// Every inner predicate holds (vacuously true when empty).
    All(Vec<Predicate>),
    /// At least one inner predicate holds.
    Any(Vec<Predicate>),
}

impl Predicate {
    fn number(store: &VariableStore, key: &str) -> Result<f64, ContentError> {
        match store.get(key) {
            None => Ok(0.0),
            Some(value) => value.as_f64().ok_or_else(|| ContentError::TypeMismatch {
                key: key.to_owned(),
                expected: "number",
                found: value.kind(),
            }),
        }
    }
}

impl Condition for Predicate {
    fn evaluate(&self, store: &VariableStore) -> Result<bool, ContentError> {
        match self {
            Self::IsSet(key) => Ok(store.contains(key)),
            Self::IsTruthy(key) => Ok(store.get(key).is_some_and(Value::is_truthy)),
            Self::Equals(key, expected) => Ok(store.get(key) == Some(expected)),
            Self::NotEquals(key, expected) => Ok(store.get(key) != Some(expected)),
            Self::AtLeast(key, bound) => Ok(Self::number(store, key)? >= *bound),
            Self::AtMost(key, bound) => Ok(Self::number(store, key)? <= *bound),
            Self::Not(inner) => Ok(!inner.evaluate(store)?),
            Self::All(inner) => {
                for predicate in inner {
                    if !predicate.evaluate(store)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any(inner) => {
                for predicate in inner {
                    if predicate.evaluate(store)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

/// Adapts a closure into a [`Condition`].
pub struct FnCondition<F> {
    label: &'static str,
    f: F,
}

impl<F> FnCondition<F>
where
    F: Fn(&VariableStore) -> Result<bool, ContentError> + Send + Sync,
{
    /// Wraps `f`; `label` identifies it in debug output.
    pub fn new(label: &'static str, f: F) -> Self {
        Self { label, f }
    }
}

impl<F> fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnCondition").field(&self.label).finish()
    }
}

impl<F> Condition for FnCondition<F>
where
    F: Fn(&VariableStore) -> Result<bool, ContentError> + Send + Sync,
{
    fn evaluate(&self, store: &VariableStore) -> Result<bool, ContentError> {
        (self.f)(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VariableStore {
        VariableStore::new()
            .with("gold", 12)
            .with("name", "Ayla")
            .with("met_mira", true)
    }

    #[test]
    fn test_numeric_bounds_treat_unset_as_zero() {
        // Arrange
        let store = store();

        // Act / Assert
        assert!(Predicate::AtLeast("gold".into(), 10.0).evaluate(&store).unwrap());
        assert!(!Predicate::AtLeast("gold".into(), 13.0).evaluate(&store).unwrap());
        assert!(Predicate::AtMost("debt".into(), 0.0).evaluate(&store).unwrap());
    }

    #[test]
    fn test_numeric_bound_on_text_is_type_mismatch() {
        // Act
        let result = Predicate::AtLeast("name".into(), 1.0).evaluate(&store());

        // Assert
        assert_eq!(
            result,
            Err(ContentError::TypeMismatch {
                key: "name".into(),
                expected: "number",
                found: "text",
            })
        );
    }

    #[test]
    fn test_composites_short_circuit() {
        // Arrange
        let store = store();
        let failing = Predicate::AtLeast("name".into(), 1.0);

        // Act
        let any = Predicate::Any(vec![Predicate::IsTruthy("met_mira".into()), failing.clone()]);
        let all = Predicate::All(vec![Predicate::IsSet("missing".into()), failing]);

        // Assert
        assert_eq!(any.evaluate(&store), Ok(true));
        assert_eq!(all.evaluate(&store), Ok(false));
    }

    #[test]
    fn test_equality_against_unset_variable() {
        let store = VariableStore::new();
        assert!(!Predicate::Equals("mood".into(), Value::from("calm")).evaluate(&store).unwrap());
        assert!(Predicate::NotEquals("mood".into(), Value::from("calm")).evaluate(&store).unwrap());
        assert!(Predicate::Not(Box::new(Predicate::IsSet("mood".into()))).evaluate(&store).unwrap());
    }

    #[test]
    fn test_fn_condition_delegates_to_closure() {
        // Arrange
        let condition = FnCondition::new("has_name", |s: &VariableStore| Ok(s.contains("name")));

        // Act / Assert
        assert_eq!(condition.evaluate(&store()), Ok(true));
        assert_eq!(format!("{condition:?}"), "FnCondition(\"has_name\")");
    }
}
