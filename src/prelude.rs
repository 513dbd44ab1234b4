//! Module exporting the types most users of this library need.
pub use crate::adt::{AdtNode, AdtProp, AdtValue, AdtValueKind};
pub use crate::base::DevTree;
pub use crate::error::DevTreeError;
pub use crate::query::PathMatch;
