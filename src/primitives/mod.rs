//! Tensor Primitives
//!
//! Device selection and slice/tensor helpers shared by the projection code.
//!
//! ## Submodules
//!
//! - [`tensor_ops`]: device selection, uploads, norms, batched row dot products

mod tensor_ops;

pub use tensor_ops::*;
