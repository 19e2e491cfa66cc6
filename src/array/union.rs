use std::cell::Cell;
use std::sync::Arc;

use crate::array::{Array, Item};
use crate::buffer::{normalize_position, resolve_positions};
use crate::core::dtype::DType;
use crate::core::error::{Error, Result};
use crate::indexing::IndexTerm;

/// Array whose elements are drawn from K heterogeneous content arrays,
/// selected per element by a tag and a content-local offset.
///
/// Element `i` is `contents[tags[i]][index[i]]`. Tag/offset consistency
/// against the contents is checked lazily before the first read and cached
/// until the next attribute replacement; the cache lives in a `Cell`, which
/// keeps the container single-threaded by construction.
#[derive(Debug, Clone)]
pub struct UnionArray {
    tags: Arc<[i64]>,
    index: Arc<[i64]>,
    contents: Arc<[Array]>,
    validated: Cell<bool>,
}

impl PartialEq for UnionArray {
    fn eq(&self, other: &Self) -> bool {
        self.tags == other.tags && self.index == other.index && self.contents == other.contents
    }
}

fn check_tags(tags: &[i64]) -> Result<()> {
    if tags.iter().any(|&tag| tag < 0) {
        return Err(Error::Construction(
            "tags must be a non-negative array".to_string(),
        ));
    }
    Ok(())
}

fn check_index(index: &[i64]) -> Result<()> {
    if index.iter().any(|&offset| offset < 0) {
        return Err(Error::Construction(
            "index must be a non-negative array".to_string(),
        ));
    }
    Ok(())
}

fn check_contents(contents: &[Array]) -> Result<()> {
    if contents.is_empty() {
        return Err(Error::Construction(
            "contents must be a non-empty collection".to_string(),
        ));
    }
    Ok(())
}

impl UnionArray {
    /// Builds a union from explicit tags, offsets and contents.
    ///
    /// Only the local invariants are checked here (non-negative tags and
    /// offsets, non-empty contents); cross-structure consistency is deferred
    /// to the first read.
    pub fn new(tags: Vec<i64>, index: Vec<i64>, contents: Vec<Array>) -> Result<Self> {
        check_tags(&tags)?;
        check_index(&index)?;
        check_contents(&contents)?;
        Ok(Self {
            tags: tags.into(),
            index: index.into(),
            contents: contents.into(),
            validated: Cell::new(false),
        })
    }

    /// Builds the offsets from a tag assignment alone: positions carrying the
    /// same tag are numbered sequentially in order of appearance
    pub fn from_tags(tags: Vec<i64>, contents: Vec<Array>) -> Result<Self> {
        check_tags(&tags)?;
        check_contents(&contents)?;
        if let Some(&max_tag) = tags.iter().max() {
            if max_tag as usize >= contents.len() {
                return Err(Error::Construction(format!(
                    "maximum tag is {} but there are only {} contents arrays",
                    max_tag,
                    contents.len()
                )));
            }
        }
        let mut counters = vec![0i64; contents.len()];
        let mut index = Vec::with_capacity(tags.len());
        for &tag in tags.iter() {
            index.push(counters[tag as usize]);
            counters[tag as usize] += 1;
        }
        Ok(Self {
            tags: tags.into(),
            index: index.into(),
            contents: contents.into(),
            validated: Cell::new(false),
        })
    }

    /// Returns the number of elements
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns whether the union has no elements
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[i64] {
        &self.tags
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn contents(&self) -> &[Array] {
        &self.contents
    }

    /// Replaces the tag array; fails eagerly and leaves the previous state
    /// untouched on violation
    pub fn set_tags(&mut self, tags: Vec<i64>) -> Result<()> {
        check_tags(&tags)?;
        self.tags = tags.into();
        self.validated.set(false);
        Ok(())
    }

    /// Replaces the offset array; fails eagerly and leaves the previous state
    /// untouched on violation
    pub fn set_index(&mut self, index: Vec<i64>) -> Result<()> {
        check_index(&index)?;
        self.index = index.into();
        self.validated.set(false);
        Ok(())
    }

    /// Replaces the contents; fails eagerly and leaves the previous state
    /// untouched on violation
    pub fn set_contents(&mut self, contents: Vec<Array>) -> Result<()> {
        check_contents(&contents)?;
        self.contents = contents.into();
        self.validated.set(false);
        Ok(())
    }

    /// Cross-structure consistency check, run lazily before any read and
    /// cached until the next mutation.
    ///
    /// Check order is fixed: length/dimensionality, then tag range, then
    /// per-position offset range.
    pub fn validate(&self) -> Result<()> {
        if self.validated.get() {
            return Ok(());
        }
        log::debug!("validating union array of length {}", self.len());
        if self.index.len() < self.tags.len() {
            return Err(Error::Validity(format!(
                "index length ({}) must be at least tags length ({})",
                self.index.len(),
                self.tags.len()
            )));
        }
        if let Some(&max_tag) = self.tags.iter().max() {
            if max_tag as usize >= self.contents.len() {
                return Err(Error::Validity(format!(
                    "maximum tag is {} but there are only {} contents arrays",
                    max_tag,
                    self.contents.len()
                )));
            }
        }
        for i in 0..self.tags.len() {
            let tag = self.tags[i] as usize;
            let offset = self.index[i];
            let content_len = self.contents[tag].len();
            if offset as usize >= content_len {
                return Err(Error::Validity(format!(
                    "index {} at position {} must be less than the length of contents[{}] ({})",
                    offset, i, tag, content_len
                )));
            }
        }
        self.validated.set(true);
        Ok(())
    }

    /// Element type under the promotion lattice
    pub fn dtype(&self) -> DType {
        DType::promote_all(self.contents.iter().map(|content| content.dtype()))
    }

    /// `[len] ++ trailing` when every content shares an identical trailing
    /// shape and none is opaque; `[len]` otherwise
    pub fn shape(&self) -> Vec<usize> {
        if self.dtype() == DType::Object {
            return vec![self.len()];
        }
        if let Some(trailing) = self.contents[0].trailing_shape() {
            if self
                .contents
                .iter()
                .skip(1)
                .all(|content| content.trailing_shape().as_ref() == Some(&trailing))
            {
                let mut shape = vec![self.len()];
                shape.extend(trailing);
                return shape;
            }
        }
        vec![self.len()]
    }

    /// Reads a single position
    pub fn get(&self, index: i64) -> Result<Item> {
        self.get_with(index, &[])
    }

    /// Reads a single position, composing further index terms onto the
    /// selected element through the same engine used for ragged arrays
    pub fn get_with(&self, index: i64, tail: &[IndexTerm]) -> Result<Item> {
        self.validate()?;
        let i = normalize_position(index, self.len())?;
        let tag = self.tags[i] as usize;
        let mut terms = Vec::with_capacity(tail.len() + 1);
        terms.push(IndexTerm::Int(self.index[i]));
        terms.extend_from_slice(tail);
        self.contents[tag].index(&terms)
    }

    /// Iterates every position after a single up-front validation
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<Item>> + '_> {
        self.validate()?;
        Ok((0..self.len()).map(move |i| self.get(i as i64)))
    }

    /// Ordered intersection of the contents' exported column names,
    /// preserving the first content's order; `None` while any content does
    /// not expose columns
    pub fn columns(&self) -> Option<Vec<String>> {
        let mut out = self.contents.first()?.columns()?;
        for content in self.contents.iter().skip(1) {
            let cols = content.columns()?;
            out.retain(|name| cols.contains(name));
        }
        Some(out)
    }

    /// Like `columns`, over the full (nested-inclusive) column sets
    pub fn all_columns(&self) -> Option<Vec<String>> {
        let mut out = self.contents.first()?.all_columns()?;
        for content in self.contents.iter().skip(1) {
            let cols = content.all_columns()?;
            out.retain(|name| cols.contains(name));
        }
        Some(out)
    }

    /// Gathers elements by position, sharing the contents; the validity cache
    /// carries over since a gathered subset cannot invalidate it
    pub(crate) fn take(&self, positions: &[i64]) -> Result<UnionArray> {
        let resolved = resolve_positions(positions, self.len())?;
        let tags: Vec<i64> = resolved.iter().map(|&i| self.tags[i]).collect();
        let index: Vec<i64> = resolved.iter().map(|&i| self.index[i]).collect();
        Ok(Self {
            tags: tags.into(),
            index: index.into(),
            contents: self.contents.clone(),
            validated: Cell::new(self.validated.get()),
        })
    }

    /// Contiguous element range, sharing the contents
    pub(crate) fn slice_positions(&self, start: usize, stop: usize) -> Result<UnionArray> {
        if start > stop || stop > self.len() {
            return Err(Error::Index(format!(
                "range {}..{} is out of bounds for {} elements",
                start,
                stop,
                self.len()
            )));
        }
        Ok(Self {
            tags: self.tags[start..stop].to_vec().into(),
            index: self.index[start..stop].to_vec().into(),
            contents: self.contents.clone(),
            validated: Cell::new(self.validated.get()),
        })
    }

    /// Concatenation is not defined for union arrays
    pub fn concat(_first: &UnionArray, _rest: &[UnionArray]) -> Result<UnionArray> {
        Err(Error::unsupported("concatenation of union arrays"))
    }

    /// Reduction is not defined for union arrays
    pub fn any(&self) -> Result<bool> {
        Err(Error::unsupported("reduction (any) over a union array"))
    }

    /// Reduction is not defined for union arrays
    pub fn all(&self) -> Result<bool> {
        Err(Error::unsupported("reduction (all) over a union array"))
    }

    /// Column assignment cannot reach through a union array
    pub fn set_column(&mut self, _name: &str, _value: Array) -> Result<()> {
        Err(Error::unsupported(
            "assigning columns through a union array",
        ))
    }

    /// Column deletion cannot reach through a union array
    pub fn delete_column(&mut self, _name: &str) -> Result<()> {
        Err(Error::unsupported("deleting columns through a union array"))
    }

    /// Elementwise/broadcast operator dispatch boundary: always fails rather
    /// than attempting a best-effort computation
    pub fn elementwise(&self, op: &str) -> Result<Array> {
        Err(Error::Unsupported(format!(
            "elementwise operator '{}' on a union array",
            op
        )))
    }

    /// Structural copy-with-overrides is not defined for union arrays
    pub fn copy_with(
        &self,
        _index: Option<Vec<i64>>,
        _contents: Option<Vec<Array>>,
    ) -> Result<UnionArray> {
        Err(Error::unsupported("copying a union array with overrides"))
    }

    /// Shape-preserving constructors are not defined for union arrays
    pub fn empty_like(&self) -> Result<UnionArray> {
        Err(Error::unsupported("empty_like on a union array"))
    }

    /// Shape-preserving constructors are not defined for union arrays
    pub fn zeros_like(&self) -> Result<UnionArray> {
        Err(Error::unsupported("zeros_like on a union array"))
    }

    /// Shape-preserving constructors are not defined for union arrays
    pub fn ones_like(&self) -> Result<UnionArray> {
        Err(Error::unsupported("ones_like on a union array"))
    }

    /// A union array has no base buffer
    pub fn base(&self) -> Result<&Array> {
        Err(Error::unsupported("union arrays have no base"))
    }
}
