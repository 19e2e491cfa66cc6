//! The recursive indexing engine.
//!
//! Applies a multi-term index expression to a ragged structure and produces
//! the result a dense rectangular array indexed the same way would produce,
//! without ever materializing that dense array. One term is consumed per
//! recursion level; an advanced-index context is threaded through the levels
//! to decide whether array-valued terms broadcast per row (outer semantics)
//! or pair up with an earlier array term (vectorized semantics).

use crate::array::{Array, Item, JaggedArray};
use crate::core::error::{Error, Result};

/// One term of a multi-dimensional index expression
#[derive(Debug, Clone, PartialEq)]
pub enum IndexTerm {
    /// Bare integer, consuming one dimension
    Int(i64),
    /// (start, stop, step) slice with dense-array semantics
    Slice(Slice3),
    /// Integer-array "fancy" index
    IntArray(Vec<i64>),
    /// Boolean mask, converted to the positions of its true entries
    BoolMask(Vec<bool>),
}

impl From<i64> for IndexTerm {
    fn from(value: i64) -> Self {
        IndexTerm::Int(value)
    }
}

impl From<Slice3> for IndexTerm {
    fn from(value: Slice3) -> Self {
        IndexTerm::Slice(value)
    }
}

impl From<Vec<i64>> for IndexTerm {
    fn from(value: Vec<i64>) -> Self {
        IndexTerm::IntArray(value)
    }
}

impl From<Vec<bool>> for IndexTerm {
    fn from(value: Vec<bool>) -> Self {
        IndexTerm::BoolMask(value)
    }
}

/// A 3-term slice descriptor; `None` fields take their direction's default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice3 {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice3 {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// The full slice `::`
    pub fn all() -> Self {
        Self::new(None, None, None)
    }

    /// The slice `start:stop`
    pub fn range(start: i64, stop: i64) -> Self {
        Self::new(Some(start), Some(stop), None)
    }

    /// The slice `start::step`
    pub fn stepped(start: i64, step: i64) -> Self {
        Self::new(Some(start), None, Some(step))
    }

    /// Normalizes against a length following dense-array rules: defaults by
    /// direction, negative bounds offset by the length, then silent clamping.
    pub(crate) fn normalize(&self, length: i64) -> Result<(i64, i64, i64)> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(Error::ZeroSliceStep);
        }
        let mut start = match self.start {
            Some(a) if a < 0 => a + length,
            Some(a) => a,
            None if step > 0 => 0,
            None => length - 1,
        };
        let mut stop = match self.stop {
            Some(b) if b < 0 => b + length,
            Some(b) => b,
            None if step > 0 => length,
            None => -1,
        };
        if step > 0 {
            if stop <= start {
                start = 0;
                stop = 0;
            }
            start = start.clamp(0, length);
            stop = stop.clamp(0, length);
        } else {
            if start <= stop {
                start = 0;
                stop = 0;
            }
            start = start.clamp(-1, length - 1);
            stop = stop.clamp(-1, length - 1);
        }
        Ok((start, stop, step))
    }
}

/// Entry routine: normalizes the raw terms, wraps the target as a single
/// synthetic row, runs the recursive core, and strips the wrapper again.
pub(crate) fn apply(target: &Array, terms: &[IndexTerm]) -> Result<Item> {
    if terms.is_empty() {
        return Ok(Item::Array(target.clone()));
    }
    log::trace!(
        "applying {} index terms to an array of length {}",
        terms.len(),
        target.len()
    );

    let broadcast_len = terms
        .iter()
        .map(|term| match term {
            IndexTerm::BoolMask(mask) => mask.iter().filter(|&&bit| bit).count(),
            IndexTerm::IntArray(values) => values.len(),
            _ => 0,
        })
        .max()
        .unwrap_or(0);

    let normalized: Vec<IndexTerm> = terms
        .iter()
        .map(|term| match term {
            IndexTerm::BoolMask(mask) => IndexTerm::IntArray(true_positions(mask)),
            IndexTerm::Int(h) if broadcast_len != 0 => {
                IndexTerm::IntArray(vec![*h; broadcast_len])
            }
            IndexTerm::IntArray(values) if values.len() == 1 && broadcast_len != 0 => {
                IndexTerm::IntArray(vec![values[0]; broadcast_len])
            }
            other => other.clone(),
        })
        .collect();

    let wrapped = Array::Jagged(JaggedArray::from_parts(
        vec![0].into(),
        vec![target.len() as i64].into(),
        target.clone(),
    ));
    let out = apply_terms(&wrapped, &normalized, None)?;
    unwrap_synthetic(out)
}

/// Strips the synthetic top-level row from the engine's result
fn unwrap_synthetic(out: Array) -> Result<Item> {
    match out {
        Array::Flat(buffer) => buffer.scalar_at(0).map(Item::Scalar),
        Array::Jagged(array) => {
            let start = array.starts().first().copied().unwrap_or(0);
            let stop = array.stops().last().copied().unwrap_or(0);
            array
                .content()
                .slice_range(start as usize, stop as usize)
                .map(Item::Array)
        }
        Array::Union(union) => union.get(0),
    }
}

/// Recursive core: consumes the head term against the current structure
fn apply_terms(target: &Array, terms: &[IndexTerm], advanced: Option<&[i64]>) -> Result<Array> {
    if terms.is_empty() {
        return Ok(target.clone());
    }
    match target {
        Array::Flat(buffer) => buffer.index_terms(terms).map(Array::Flat),
        Array::Union(_) => Err(Error::unsupported(
            "slice or array indexing through a union array",
        )),
        Array::Jagged(array) => {
            let tail = &terms[1..];
            match &terms[0] {
                IndexTerm::Int(h) => apply_integer(array, *h, tail, advanced),
                IndexTerm::Slice(s) => apply_slice(array, s, tail, advanced),
                IndexTerm::IntArray(values) => apply_index_array(array, values, tail, advanced),
                IndexTerm::BoolMask(mask) => {
                    apply_index_array(array, &true_positions(mask), tail, advanced)
                }
            }
        }
    }
}

/// Integer term: one absolute position per row, dimension consumed
fn apply_integer(
    array: &JaggedArray,
    head: i64,
    tail: &[IndexTerm],
    advanced: Option<&[i64]>,
) -> Result<Array> {
    let mut positions = Vec::with_capacity(array.len());
    for i in 0..array.len() {
        let row_start = array.starts()[i];
        let length = array.stops()[i] - row_start;
        let norm = if head < 0 { head + length } else { head };
        if norm < 0 || norm >= length {
            return Err(Error::Index(format!(
                "integer index {} is beyond the bounds of row {} (length {})",
                head, i, length
            )));
        }
        positions.push(row_start + norm);
    }
    let gathered = array.content().take(&positions)?;
    apply_terms(&gathered, tail, advanced)
}

/// Slice term: per-row normalization, positions enumerated exactly, result
/// re-wrapped as a ragged level; context entries replicate per produced
/// position
fn apply_slice(
    array: &JaggedArray,
    slice: &Slice3,
    tail: &[IndexTerm],
    advanced: Option<&[i64]>,
) -> Result<Array> {
    let mut starts = Vec::with_capacity(array.len());
    let mut stops = Vec::with_capacity(array.len());
    let mut positions: Vec<i64> = Vec::new();
    for i in 0..array.len() {
        let row_start = array.starts()[i];
        let length = array.stops()[i] - row_start;
        if length < 0 {
            return Err(Error::Validity(format!(
                "row {} has invalid bounds [{}, {})",
                i,
                row_start,
                array.stops()[i]
            )));
        }
        let (a, b, c) = slice.normalize(length)?;
        starts.push(positions.len() as i64);
        let mut j = a;
        while (c > 0 && j < b) || (c < 0 && j > b) {
            positions.push(row_start + j);
            j += c;
        }
        stops.push(positions.len() as i64);
    }
    let spread = replicate_context(&starts, &stops, advanced);
    let gathered = array.content().take(&positions)?;
    let next = apply_terms(&gathered, tail, spread.as_deref())?;
    Ok(Array::Jagged(JaggedArray::from_parts(
        starts.into(),
        stops.into(),
        next,
    )))
}

/// Integer-array term, dispatching on whether an advanced context is live
fn apply_index_array(
    array: &JaggedArray,
    head: &[i64],
    tail: &[IndexTerm],
    advanced: Option<&[i64]>,
) -> Result<Array> {
    match advanced {
        None => {
            // Outer semantics: a full sweep of the term per row, and the new
            // context records which term entry produced each position.
            let mut starts = Vec::with_capacity(array.len());
            let mut stops = Vec::with_capacity(array.len());
            let mut positions = Vec::with_capacity(array.len() * head.len());
            let mut context = Vec::with_capacity(array.len() * head.len());
            for i in 0..array.len() {
                let row_start = array.starts()[i];
                let length = array.stops()[i] - row_start;
                starts.push(positions.len() as i64);
                for (j, &raw) in head.iter().enumerate() {
                    let norm = if raw < 0 { raw + length } else { raw };
                    if norm < 0 || norm >= length {
                        return Err(Error::Index(format!(
                            "index {} is out of bounds for row {} (length {})",
                            raw, i, length
                        )));
                    }
                    positions.push(row_start + norm);
                    context.push(j as i64);
                }
                stops.push(positions.len() as i64);
            }
            let gathered = array.content().take(&positions)?;
            let next = apply_terms(&gathered, tail, Some(&context))?;
            Ok(Array::Jagged(JaggedArray::from_parts(
                starts.into(),
                stops.into(),
                next,
            )))
        }
        Some(context) => {
            // Vectorized semantics: each row pairs with the term entry its
            // context value selects; dimension consumed, no ragged wrapper.
            debug_assert_eq!(context.len(), array.len());
            let mut positions = Vec::with_capacity(context.len());
            let mut next_context = Vec::with_capacity(context.len());
            for (i, &slot) in context.iter().enumerate() {
                let row_start = array.starts()[i];
                let length = array.stops()[i] - row_start;
                if slot < 0 || slot as usize >= head.len() {
                    return Err(Error::Index(format!(
                        "advanced index of length {} does not match context value {}",
                        head.len(),
                        slot
                    )));
                }
                let raw = head[slot as usize];
                let norm = if raw < 0 { raw + length } else { raw };
                if norm < 0 || norm >= length {
                    return Err(Error::Index(format!(
                        "index {} is out of bounds for row {} (length {})",
                        raw, i, length
                    )));
                }
                positions.push(row_start + norm);
                next_context.push(i as i64);
            }
            let gathered = array.content().take(&positions)?;
            apply_terms(&gathered, tail, Some(&next_context))
        }
    }
}

/// Re-expands a context across a slice level: each newly produced position
/// inherits its source row's context value
fn replicate_context(starts: &[i64], stops: &[i64], advanced: Option<&[i64]>) -> Option<Vec<i64>> {
    advanced.map(|context| {
        debug_assert_eq!(starts.len(), context.len());
        let mut next = Vec::with_capacity(stops.last().copied().unwrap_or(0) as usize);
        for (i, &value) in context.iter().enumerate() {
            let count = (stops[i] - starts[i]) as usize;
            next.extend(std::iter::repeat(value).take(count));
        }
        next
    })
}

fn true_positions(mask: &[bool]) -> Vec<i64> {
    mask.iter()
        .enumerate()
        .filter(|(_, &bit)| bit)
        .map(|(i, _)| i as i64)
        .collect()
}
