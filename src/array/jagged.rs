use std::sync::Arc;

use crate::array::Array;
use crate::buffer::{normalize_position, resolve_positions};
use crate::core::error::{Error, Result};

/// List-of-variable-length-lists over a shared content block.
///
/// Row `i` denotes `content[starts[i]..stops[i]]`. Rows may be empty and need
/// not be adjacent or ordered within the content. `starts[i] <= stops[i] <=
/// content.len()` is a validity requirement surfaced by bounds checks when a
/// row is read, not at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct JaggedArray {
    starts: Arc<[i64]>,
    stops: Arc<[i64]>,
    content: Arc<Array>,
}

impl JaggedArray {
    pub fn new(starts: Vec<i64>, stops: Vec<i64>, content: Array) -> Result<Self> {
        if starts.len() != stops.len() {
            return Err(Error::Construction(format!(
                "starts length ({}) does not match stops length ({})",
                starts.len(),
                stops.len()
            )));
        }
        Ok(Self {
            starts: starts.into(),
            stops: stops.into(),
            content: Arc::new(content),
        })
    }

    pub(crate) fn from_parts(starts: Arc<[i64]>, stops: Arc<[i64]>, content: Array) -> Self {
        debug_assert_eq!(starts.len(), stops.len());
        Self {
            starts,
            stops,
            content: Arc::new(content),
        }
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Returns whether the array has no rows
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn starts(&self) -> &[i64] {
        &self.starts
    }

    pub fn stops(&self) -> &[i64] {
        &self.stops
    }

    pub fn content(&self) -> &Array {
        &self.content
    }

    /// Per-row lengths
    pub fn counts(&self) -> Vec<i64> {
        self.starts
            .iter()
            .zip(self.stops.iter())
            .map(|(&start, &stop)| stop - start)
            .collect()
    }

    /// Reads row `index` as a new array sharing the underlying content
    pub fn row(&self, index: i64) -> Result<Array> {
        let i = normalize_position(index, self.len())?;
        let (start, stop) = (self.starts[i], self.stops[i]);
        if start < 0 || stop < start {
            return Err(Error::Validity(format!(
                "row {} has invalid bounds [{}, {})",
                i, start, stop
            )));
        }
        self.content.slice_range(start as usize, stop as usize)
    }

    /// Gathers whole rows by position, sharing the content block
    pub(crate) fn take(&self, positions: &[i64]) -> Result<JaggedArray> {
        let resolved = resolve_positions(positions, self.len())?;
        let starts: Vec<i64> = resolved.iter().map(|&i| self.starts[i]).collect();
        let stops: Vec<i64> = resolved.iter().map(|&i| self.stops[i]).collect();
        Ok(Self {
            starts: starts.into(),
            stops: stops.into(),
            content: self.content.clone(),
        })
    }

    /// Contiguous row range, sharing the content block
    pub(crate) fn slice_rows(&self, start: usize, stop: usize) -> Result<JaggedArray> {
        if start > stop || stop > self.len() {
            return Err(Error::Index(format!(
                "row range {}..{} is out of bounds for {} rows",
                start,
                stop,
                self.len()
            )));
        }
        Ok(Self {
            starts: self.starts[start..stop].to_vec().into(),
            stops: self.stops[start..stop].to_vec().into(),
            content: self.content.clone(),
        })
    }
}
