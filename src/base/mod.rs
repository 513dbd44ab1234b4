//! Decoding of the flattened (FDT) wire format: header validation, region
//! slicing and token parsing. The output of this module is still flat; see
//! [`convert`](crate::convert) for reconstruction into the logical tree.

pub mod iters;
pub mod parse;
pub mod tree;

pub use iters::*;
pub use parse::*;
pub use tree::*;
