//! The flat-buffer primitive: a dense, rectangular, typed block of elements.
//!
//! Buffers are the terminal storage of every array structure in this crate.
//! They support native slicing, integer-array gathering and boolean masking,
//! and are never mutated in place; every operation returns a new buffer,
//! cheaply sharing nothing or copying as needed.

use std::sync::Arc;

use num_complex::Complex;

use crate::core::dtype::DType;
use crate::core::error::{Error, Result};
use crate::core::scalar::Scalar;
use crate::indexing::{IndexTerm, Slice3};

/// Dense typed block with one variant per supported element type
#[derive(Debug, Clone, PartialEq)]
pub enum FlatBuffer {
    Bool(Arc<[bool]>),
    Int8(Arc<[i8]>),
    Int16(Arc<[i16]>),
    Int32(Arc<[i32]>),
    Int64(Arc<[i64]>),
    UInt8(Arc<[u8]>),
    UInt16(Arc<[u16]>),
    UInt32(Arc<[u32]>),
    UInt64(Arc<[u64]>),
    Float32(Arc<[f32]>),
    Float64(Arc<[f64]>),
    Complex64(Arc<[Complex<f32>]>),
    Complex128(Arc<[Complex<f64>]>),
    Str(Arc<[String]>),
}

/// Runs an expression against the payload slice of whichever variant is live
macro_rules! dispatch_ref {
    ($self:expr, $data:ident => $body:expr) => {
        match $self {
            FlatBuffer::Bool($data) => $body,
            FlatBuffer::Int8($data) => $body,
            FlatBuffer::Int16($data) => $body,
            FlatBuffer::Int32($data) => $body,
            FlatBuffer::Int64($data) => $body,
            FlatBuffer::UInt8($data) => $body,
            FlatBuffer::UInt16($data) => $body,
            FlatBuffer::UInt32($data) => $body,
            FlatBuffer::UInt64($data) => $body,
            FlatBuffer::Float32($data) => $body,
            FlatBuffer::Float64($data) => $body,
            FlatBuffer::Complex64($data) => $body,
            FlatBuffer::Complex128($data) => $body,
            FlatBuffer::Str($data) => $body,
        }
    };
}

/// Like `dispatch_ref!`, but rewraps the produced `Vec` in the same variant
macro_rules! dispatch_map {
    ($self:expr, $data:ident => $body:expr) => {
        match $self {
            FlatBuffer::Bool($data) => FlatBuffer::Bool(($body).into()),
            FlatBuffer::Int8($data) => FlatBuffer::Int8(($body).into()),
            FlatBuffer::Int16($data) => FlatBuffer::Int16(($body).into()),
            FlatBuffer::Int32($data) => FlatBuffer::Int32(($body).into()),
            FlatBuffer::Int64($data) => FlatBuffer::Int64(($body).into()),
            FlatBuffer::UInt8($data) => FlatBuffer::UInt8(($body).into()),
            FlatBuffer::UInt16($data) => FlatBuffer::UInt16(($body).into()),
            FlatBuffer::UInt32($data) => FlatBuffer::UInt32(($body).into()),
            FlatBuffer::UInt64($data) => FlatBuffer::UInt64(($body).into()),
            FlatBuffer::Float32($data) => FlatBuffer::Float32(($body).into()),
            FlatBuffer::Float64($data) => FlatBuffer::Float64(($body).into()),
            FlatBuffer::Complex64($data) => FlatBuffer::Complex64(($body).into()),
            FlatBuffer::Complex128($data) => FlatBuffer::Complex128(($body).into()),
            FlatBuffer::Str($data) => FlatBuffer::Str(($body).into()),
        }
    };
}

impl FlatBuffer {
    /// Returns the number of elements in the buffer
    pub fn len(&self) -> usize {
        dispatch_ref!(self, data => data.len())
    }

    /// Returns whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element type of the buffer
    pub fn dtype(&self) -> DType {
        match self {
            FlatBuffer::Bool(_) => DType::Bool,
            FlatBuffer::Int8(_) => DType::Int8,
            FlatBuffer::Int16(_) => DType::Int16,
            FlatBuffer::Int32(_) => DType::Int32,
            FlatBuffer::Int64(_) => DType::Int64,
            FlatBuffer::UInt8(_) => DType::UInt8,
            FlatBuffer::UInt16(_) => DType::UInt16,
            FlatBuffer::UInt32(_) => DType::UInt32,
            FlatBuffer::UInt64(_) => DType::UInt64,
            FlatBuffer::Float32(_) => DType::Float32,
            FlatBuffer::Float64(_) => DType::Float64,
            FlatBuffer::Complex64(_) => DType::Complex64,
            FlatBuffer::Complex128(_) => DType::Complex128,
            FlatBuffer::Str(_) => DType::Object,
        }
    }

    /// Reads the element at `index`, normalizing a negative position
    pub fn scalar_at(&self, index: i64) -> Result<Scalar> {
        let i = normalize_position(index, self.len())?;
        Ok(match self {
            FlatBuffer::Bool(data) => Scalar::Bool(data[i]),
            FlatBuffer::Int8(data) => Scalar::Int8(data[i]),
            FlatBuffer::Int16(data) => Scalar::Int16(data[i]),
            FlatBuffer::Int32(data) => Scalar::Int32(data[i]),
            FlatBuffer::Int64(data) => Scalar::Int64(data[i]),
            FlatBuffer::UInt8(data) => Scalar::UInt8(data[i]),
            FlatBuffer::UInt16(data) => Scalar::UInt16(data[i]),
            FlatBuffer::UInt32(data) => Scalar::UInt32(data[i]),
            FlatBuffer::UInt64(data) => Scalar::UInt64(data[i]),
            FlatBuffer::Float32(data) => Scalar::Float32(data[i]),
            FlatBuffer::Float64(data) => Scalar::Float64(data[i]),
            FlatBuffer::Complex64(data) => Scalar::Complex64(data[i]),
            FlatBuffer::Complex128(data) => Scalar::Complex128(data[i]),
            FlatBuffer::Str(data) => Scalar::Str(data[i].clone()),
        })
    }

    /// Slices with dense (start, stop, step) semantics: a zero step errors,
    /// out-of-range bounds clip silently
    pub fn slice3(&self, slice: &Slice3) -> Result<FlatBuffer> {
        let (start, stop, step) = slice.normalize(self.len() as i64)?;
        Ok(dispatch_map!(self, data => slice_step(data, start, stop, step)))
    }

    /// Gathered copy at the given positions; negative positions normalize
    /// against the buffer length, anything still out of range errors
    pub fn take(&self, positions: &[i64]) -> Result<FlatBuffer> {
        let resolved = resolve_positions(positions, self.len())?;
        Ok(dispatch_map!(self, data => {
            resolved.iter().map(|&i| data[i].clone()).collect::<Vec<_>>()
        }))
    }

    /// Compacts the elements at true positions of a same-length mask
    pub fn mask(&self, keep: &[bool]) -> Result<FlatBuffer> {
        if keep.len() != self.len() {
            return Err(Error::Index(format!(
                "boolean mask length ({}) does not match buffer length ({})",
                keep.len(),
                self.len()
            )));
        }
        Ok(dispatch_map!(self, data => {
            data.iter()
                .zip(keep)
                .filter(|(_, &kept)| kept)
                .map(|(value, _)| value.clone())
                .collect::<Vec<_>>()
        }))
    }

    /// Contiguous sub-buffer for `start..stop`
    pub(crate) fn slice_range(&self, start: usize, stop: usize) -> Result<FlatBuffer> {
        if start > stop || stop > self.len() {
            return Err(Error::Index(format!(
                "range {}..{} is out of bounds for buffer of length {}",
                start,
                stop,
                self.len()
            )));
        }
        Ok(dispatch_map!(self, data => data[start..stop].to_vec()))
    }

    /// Terminal case of the recursive engine.
    ///
    /// By the time recursion reaches a buffer, every structural dimension has
    /// been consumed at a ragged level above it, so any term still pending
    /// over-indexes the structure.
    pub(crate) fn index_terms(&self, terms: &[IndexTerm]) -> Result<FlatBuffer> {
        if terms.is_empty() {
            return Ok(self.clone());
        }
        Err(Error::Index(format!(
            "too many indices: {} terms remain beyond a rank-1 buffer",
            terms.len()
        )))
    }
}

/// Resolves one possibly-negative position against a length
pub(crate) fn normalize_position(index: i64, len: usize) -> Result<usize> {
    let n = len as i64;
    let normalized = if index < 0 { index + n } else { index };
    if normalized < 0 || normalized >= n {
        return Err(Error::IndexOutOfBounds { index, size: len });
    }
    Ok(normalized as usize)
}

/// Resolves a whole position array against a length
pub(crate) fn resolve_positions(positions: &[i64], len: usize) -> Result<Vec<usize>> {
    positions
        .iter()
        .map(|&position| normalize_position(position, len))
        .collect()
}

fn slice_step<T: Clone>(data: &[T], start: i64, stop: i64, step: i64) -> Vec<T> {
    let mut out = Vec::new();
    let mut j = start;
    while (step > 0 && j < stop) || (step < 0 && j > stop) {
        out.push(data[j as usize].clone());
        j += step;
    }
    out
}

macro_rules! impl_from_vec {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl From<Vec<$ty>> for FlatBuffer {
            fn from(data: Vec<$ty>) -> Self {
                FlatBuffer::$variant(data.into())
            }
        })*
    };
}

impl_from_vec!(
    Bool => bool,
    Int8 => i8,
    Int16 => i16,
    Int32 => i32,
    Int64 => i64,
    UInt8 => u8,
    UInt16 => u16,
    UInt32 => u32,
    UInt64 => u64,
    Float32 => f32,
    Float64 => f64,
    Complex64 => Complex<f32>,
    Complex128 => Complex<f64>,
    Str => String,
);
