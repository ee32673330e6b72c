pub mod annotate;
pub mod complexity_guard;
pub mod expression;
pub mod filtering;
pub mod key;

pub use annotate::{AnnotatableExt, Annotator};
pub use complexity_guard::ExpressionGuard;
pub use expression::CaseExpr;
pub use filtering::{Lookup, Predicate};
pub use key::{Annotation, KeyFn, KeySpec};
