//! Identity-keyed conditional expressions.
//!
//! A [`CaseExpr`] is the structured form of
//! `CASE WHEN pk = ? THEN ? ... ELSE NULL END`: an ordered list of
//! `(identifier, value)` branches. Backends either evaluate it directly or
//! render it with one bound parameter per identifier and value.

use crate::error::{AnnotateError, Result};
use annotatable_model::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseExpr {
    branches: Vec<(Value, Value)>,
    index: HashMap<Value, usize>,
}

impl CaseExpr {
    /// Expression without branches; evaluates to `NULL` for every row.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(identifier, value)` pairs in order.
    ///
    /// A repeated identifier keeps the position of its first branch and the
    /// value of its last one, so every identifier appears exactly once.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let pairs = pairs.into_iter();
        let mut branches = Vec::with_capacity(pairs.size_hint().0);
        let mut index = HashMap::with_capacity(pairs.size_hint().0);

        for (pk, value) in pairs {
            match index.entry(pk) {
                Entry::Occupied(slot) => branches[*slot.get()] = (slot.key().clone(), value),
                Entry::Vacant(slot) => {
                    branches.push((slot.key().clone(), value));
                    slot.insert(branches.len() - 1);
                }
            }
        }

        Self { branches, index }
    }

    /// Rank expression: each identifier maps to its position in `ordered`.
    pub fn ranks<I>(ordered: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::from_pairs(
            ordered
                .into_iter()
                .enumerate()
                .map(|(rank, pk)| (pk, Value::Int(rank as i64))),
        )
    }

    /// Value selected for the row with identifier `pk`.
    pub fn evaluate(&self, pk: &Value) -> Value {
        self.index
            .get(pk)
            .map(|&i| self.branches[i].1.clone())
            .unwrap_or(Value::Null)
    }

    pub fn branches(&self) -> &[(Value, Value)] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Reject identifiers or values that cannot travel as a single bound
    /// parameter.
    pub fn ensure_bindable(&self, field: &str) -> Result<()> {
        for (pk, value) in &self.branches {
            if !pk.is_scalar() || !value.is_scalar() {
                return Err(AnnotateError::UnrepresentableValue {
                    field: field.to_string(),
                    pk: pk.clone(),
                });
            }
        }
        Ok(())
    }
}
