use crate::{
    config::{AnnotateConfig, DEFAULT_MAX_BRANCHES},
    error::{AnnotateError, Result},
    query::expression::CaseExpr,
};
use tracing::{debug, warn};

/// Guard that enforces expression size limits before a computed field is
/// attached to a collection.
#[derive(Debug, Clone)]
pub struct ExpressionGuard {
    max_branches: usize,
}

impl ExpressionGuard {
    /// Create a guard with the default branch limit
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_BRANCHES)
    }

    pub fn with_limit(max_branches: usize) -> Self {
        Self { max_branches }
    }

    pub fn from_config(config: &AnnotateConfig) -> Self {
        Self::with_limit(config.max_branches)
    }

    pub fn max_branches(&self) -> usize {
        self.max_branches
    }

    /// Check an expression destined for `field`
    pub fn check(&self, field: &str, expr: &CaseExpr) -> Result<()> {
        debug!(
            "Expression check: field={}, branches={}, limit={}",
            field,
            expr.len(),
            self.max_branches
        );

        if expr.len() > self.max_branches {
            warn!(
                "Expression for {} exceeds branch limit: {} > {}",
                field,
                expr.len(),
                self.max_branches
            );
            return Err(AnnotateError::TooManyBranches {
                count: expr.len(),
                limit: self.max_branches,
            });
        }

        expr.ensure_bindable(field)
    }
}

impl Default for ExpressionGuard {
    fn default() -> Self {
        Self::new()
    }
}
