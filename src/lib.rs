//! # RaggedRS
//!
//! Columnar containers for irregular data: ragged (jagged) arrays whose rows
//! vary in length, tagged-union arrays whose elements come from heterogeneous
//! sub-arrays, and a recursive indexing engine that applies multi-dimensional
//! index expressions (integers, slices, boolean masks, integer arrays, in any
//! combination and order) to these structures while reproducing, element for
//! element, the advanced-indexing semantics of dense rectangular arrays.
//!
//! ```
//! use raggedrs::{Array, FlatBuffer, IndexTerm, JaggedArray, Slice3};
//!
//! // [[0, 1, 2], [], [3, 4]]
//! let content = Array::Flat(FlatBuffer::from(vec![0i64, 1, 2, 3, 4]));
//! let rows = JaggedArray::new(vec![0, 3, 3], vec![3, 3, 5], content).unwrap();
//! let array = Array::Jagged(rows);
//!
//! // array[::-1] reverses the rows without touching the content block
//! let reversed = array
//!     .index(&[IndexTerm::Slice(Slice3::new(None, None, Some(-1)))])
//!     .unwrap();
//! assert_eq!(reversed.as_array().unwrap().len(), 3);
//! ```

// Core module with error, element-type and scalar definitions
pub mod core;

// The flat-buffer primitive
pub mod buffer;

// Ragged and tagged-union containers
pub mod array;

// Index terms and the recursive indexing engine
pub mod indexing;

// Re-export the public surface
pub use crate::array::{Array, Item, JaggedArray, UnionArray};
pub use crate::buffer::FlatBuffer;
pub use crate::core::dtype::DType;
pub use crate::core::error::{Error, Result};
pub use crate::core::scalar::Scalar;
pub use crate::indexing::{IndexTerm, Slice3};
