//! The array structures the indexing engine operates on.

mod jagged;
mod union;

pub use jagged::JaggedArray;
pub use union::UnionArray;

use crate::buffer::FlatBuffer;
use crate::core::dtype::DType;
use crate::core::error::{Error, Result};
use crate::core::scalar::Scalar;
use crate::indexing::{self, IndexTerm};

/// Any of the three structure kinds understood by the indexing engine
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    /// Dense typed block
    Flat(FlatBuffer),
    /// Variable-length rows over shared content
    Jagged(JaggedArray),
    /// Per-element dispatch over heterogeneous contents
    Union(UnionArray),
}

/// The result of an index request: a bare element when every dimension was
/// consumed, an array otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Scalar(Scalar),
    Array(Array),
}

impl Item {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Item::Scalar(scalar) => Some(scalar),
            Item::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Item::Scalar(_) => None,
            Item::Array(array) => Some(array),
        }
    }
}

impl Array {
    /// Returns the length along the leading axis
    pub fn len(&self) -> usize {
        match self {
            Array::Flat(buffer) => buffer.len(),
            Array::Jagged(array) => array.len(),
            Array::Union(union) => union.len(),
        }
    }

    /// Returns whether the leading axis is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element type
    pub fn dtype(&self) -> DType {
        match self {
            Array::Flat(buffer) => buffer.dtype(),
            Array::Jagged(array) => array.content().dtype(),
            Array::Union(union) => union.dtype(),
        }
    }

    /// Returns the rectangular shape, as far as one is defined; ragged
    /// structures report their leading length only
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Array::Flat(buffer) => vec![buffer.len()],
            Array::Jagged(array) => vec![array.len()],
            Array::Union(union) => union.shape(),
        }
    }

    /// The shape beyond the leading axis, when it is uniform
    pub(crate) fn trailing_shape(&self) -> Option<Vec<usize>> {
        match self {
            Array::Flat(_) => Some(Vec::new()),
            Array::Jagged(_) => None,
            Array::Union(union) => {
                let shape = union.shape();
                Some(shape[1..].to_vec())
            }
        }
    }

    /// Applies a multi-term index expression with dense-array semantics.
    ///
    /// A union target resolves an integer leading term through its tag/offset
    /// tables; slice- or array-valued leading terms on a union are not
    /// supported.
    pub fn index(&self, terms: &[IndexTerm]) -> Result<Item> {
        match self {
            Array::Union(union) => match terms.split_first() {
                None => Ok(Item::Array(self.clone())),
                Some((IndexTerm::Int(i), tail)) => union.get_with(*i, tail),
                Some(_) => Err(Error::unsupported(
                    "slice or array indexing at the leading position of a union array",
                )),
            },
            _ => indexing::apply(self, terms),
        }
    }

    /// Single-position read
    pub fn get(&self, index: i64) -> Result<Item> {
        self.index(&[IndexTerm::Int(index)])
    }

    /// Exported column names of record-like contents; this crate's structure
    /// kinds expose none themselves, so only unions can forward an
    /// intersection
    pub fn columns(&self) -> Option<Vec<String>> {
        match self {
            Array::Union(union) => union.columns(),
            _ => None,
        }
    }

    /// Like `columns`, over the full column sets
    pub fn all_columns(&self) -> Option<Vec<String>> {
        match self {
            Array::Union(union) => union.all_columns(),
            _ => None,
        }
    }

    /// Gathers leading-axis elements by position
    pub(crate) fn take(&self, positions: &[i64]) -> Result<Array> {
        match self {
            Array::Flat(buffer) => buffer.take(positions).map(Array::Flat),
            Array::Jagged(array) => array.take(positions).map(Array::Jagged),
            Array::Union(union) => union.take(positions).map(Array::Union),
        }
    }

    /// Contiguous leading-axis range
    pub(crate) fn slice_range(&self, start: usize, stop: usize) -> Result<Array> {
        match self {
            Array::Flat(buffer) => buffer.slice_range(start, stop).map(Array::Flat),
            Array::Jagged(array) => array.slice_rows(start, stop).map(Array::Jagged),
            Array::Union(union) => union.slice_positions(start, stop).map(Array::Union),
        }
    }
}

impl From<FlatBuffer> for Array {
    fn from(buffer: FlatBuffer) -> Self {
        Array::Flat(buffer)
    }
}

impl From<JaggedArray> for Array {
    fn from(array: JaggedArray) -> Self {
        Array::Jagged(array)
    }
}

impl From<UnionArray> for Array {
    fn from(union: UnionArray) -> Self {
        Array::Union(union)
    }
}
