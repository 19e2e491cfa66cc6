//! Shared test support: a dense row-major reference tensor implementing
//! rectangular advanced-indexing semantics, and converters that flatten both
//! the reference results and the engine results into a comparable nested form.

use raggedrs::{Array, FlatBuffer, IndexTerm, Item, JaggedArray, Scalar, Slice3};

/// Nested list-of-lists value for structural comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Leaf(i64),
    List(Vec<Nested>),
}

/// Row-major dense tensor of i64, the reference the engine is checked against
pub struct DenseTensor {
    pub shape: Vec<usize>,
    pub data: Vec<i64>,
}

enum Sel {
    At(usize),
    Span(Vec<usize>),
    Fancy(Vec<usize>),
}

enum Dim {
    Axis(usize),
    Advanced,
}

impl DenseTensor {
    pub fn arange(shape: &[usize]) -> Self {
        let total: usize = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            data: (0..total as i64).collect(),
        }
    }

    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.shape.len()];
        for axis in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.shape[axis + 1];
        }
        strides
    }

    /// Equivalent nested ragged structure over a flat Int64 block
    pub fn to_ragged(&self) -> Array {
        let mut content = Array::Flat(FlatBuffer::from(self.data.clone()));
        let mut count = self.data.len();
        for &dim in self.shape.iter().skip(1).rev() {
            let rows = count / dim;
            let starts: Vec<i64> = (0..rows).map(|i| (i * dim) as i64).collect();
            let stops: Vec<i64> = (0..rows).map(|i| ((i + 1) * dim) as i64).collect();
            content = Array::Jagged(JaggedArray::new(starts, stops, content).unwrap());
            count = rows;
        }
        content
    }

    /// Reference advanced indexing.
    ///
    /// Integer terms become broadcast advanced indices as soon as any array
    /// term is present; the advanced group contributes one result dimension,
    /// surfacing at the position of the first array-valued axis.
    pub fn index(&self, terms: &[IndexTerm]) -> Nested {
        assert!(terms.len() <= self.shape.len(), "too many terms");
        let broadcast_len = terms
            .iter()
            .map(|term| match term {
                IndexTerm::BoolMask(mask) => mask.iter().filter(|&&bit| bit).count(),
                IndexTerm::IntArray(values) => values.len(),
                _ => 0,
            })
            .max()
            .unwrap_or(0);

        let mut sels: Vec<Sel> = Vec::with_capacity(self.shape.len());
        for (axis, term) in terms.iter().enumerate() {
            let n = self.shape[axis];
            let sel = match term {
                IndexTerm::Int(h) if broadcast_len == 0 => Sel::At(norm(*h, n)),
                IndexTerm::Int(h) => Sel::Fancy(vec![norm(*h, n); broadcast_len]),
                IndexTerm::Slice(s) => Sel::Span(span_positions(s, n)),
                IndexTerm::IntArray(values) if values.len() == 1 => {
                    Sel::Fancy(vec![norm(values[0], n); broadcast_len])
                }
                IndexTerm::IntArray(values) => {
                    Sel::Fancy(values.iter().map(|&v| norm(v, n)).collect())
                }
                IndexTerm::BoolMask(mask) => {
                    assert_eq!(mask.len(), n, "mask length must match the axis");
                    Sel::Fancy(
                        mask.iter()
                            .enumerate()
                            .filter(|(_, &bit)| bit)
                            .map(|(i, _)| i)
                            .collect(),
                    )
                }
            };
            sels.push(sel);
        }
        for axis in terms.len()..self.shape.len() {
            sels.push(Sel::Span((0..self.shape[axis]).collect()));
        }
        for sel in &sels {
            if let Sel::Fancy(fancy) = sel {
                assert_eq!(fancy.len(), broadcast_len, "mismatched fancy lengths");
            }
        }

        let mut dims = Vec::new();
        let mut fancy_seen = false;
        for (axis, sel) in sels.iter().enumerate() {
            match sel {
                Sel::Span(_) => dims.push(Dim::Axis(axis)),
                Sel::Fancy(_) if !fancy_seen => {
                    fancy_seen = true;
                    dims.push(Dim::Advanced);
                }
                _ => {}
            }
        }

        let strides = self.strides();
        let mut choices = vec![0usize; sels.len()];
        self.emit(&dims, &sels, &strides, broadcast_len, &mut choices, 0)
    }

    fn emit(
        &self,
        dims: &[Dim],
        sels: &[Sel],
        strides: &[usize],
        advanced_len: usize,
        choices: &mut Vec<usize>,
        advanced: usize,
    ) -> Nested {
        match dims.split_first() {
            None => {
                let offset: usize = sels
                    .iter()
                    .enumerate()
                    .map(|(axis, sel)| {
                        let position = match sel {
                            Sel::At(p) => *p,
                            Sel::Span(positions) => positions[choices[axis]],
                            Sel::Fancy(fancy) => fancy[advanced],
                        };
                        position * strides[axis]
                    })
                    .sum();
                Nested::Leaf(self.data[offset])
            }
            Some((Dim::Axis(axis), rest)) => {
                let span_len = match &sels[*axis] {
                    Sel::Span(positions) => positions.len(),
                    _ => unreachable!(),
                };
                let mut out = Vec::with_capacity(span_len);
                for choice in 0..span_len {
                    choices[*axis] = choice;
                    out.push(self.emit(rest, sels, strides, advanced_len, choices, advanced));
                }
                Nested::List(out)
            }
            Some((Dim::Advanced, rest)) => {
                let mut out = Vec::with_capacity(advanced_len);
                for k in 0..advanced_len {
                    out.push(self.emit(rest, sels, strides, advanced_len, choices, k));
                }
                Nested::List(out)
            }
        }
    }
}

fn norm(value: i64, n: usize) -> usize {
    let v = if value < 0 { value + n as i64 } else { value };
    assert!(v >= 0 && (v as usize) < n, "index {} out of range", value);
    v as usize
}

fn span_positions(slice: &Slice3, n: usize) -> Vec<usize> {
    let len = n as i64;
    let step = slice.step.unwrap_or(1);
    assert_ne!(step, 0);
    let (default_start, default_stop, lo, hi) = if step > 0 {
        (0, len, 0, len)
    } else {
        (len - 1, -1, -1, len - 1)
    };
    let resolve = |value: Option<i64>, default: i64| -> i64 {
        match value {
            None => default,
            Some(v) => {
                let v = if v < 0 { v + len } else { v };
                v.clamp(lo, hi)
            }
        }
    };
    let start = resolve(slice.start, default_start);
    let stop = resolve(slice.stop, default_stop);
    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        out.push(i as usize);
        i += step;
    }
    out
}

/// Flattens an engine result for comparison with the reference
pub fn item_to_nested(item: &Item) -> Nested {
    match item {
        Item::Scalar(scalar) => Nested::Leaf(scalar.as_i64().expect("integer scalar")),
        Item::Array(array) => array_to_nested(array),
    }
}

pub fn array_to_nested(array: &Array) -> Nested {
    match array {
        Array::Flat(buffer) => Nested::List(
            (0..buffer.len())
                .map(|i| match buffer.scalar_at(i as i64).unwrap() {
                    Scalar::Int64(v) => Nested::Leaf(v),
                    other => panic!("unexpected scalar {:?}", other),
                })
                .collect(),
        ),
        Array::Jagged(rows) => Nested::List(
            (0..rows.len())
                .map(|i| array_to_nested(&rows.row(i as i64).unwrap()))
                .collect(),
        ),
        Array::Union(_) => panic!("union arrays do not appear in these tests"),
    }
}

/// The mixed index-term pool the equivalence grid draws from
pub fn term_pool() -> Vec<IndexTerm> {
    vec![
        IndexTerm::Int(2),
        IndexTerm::Slice(Slice3::all()),
        IndexTerm::Slice(Slice3::range(2, 4)),
        IndexTerm::Slice(Slice3::stepped(1, 2)),
        IndexTerm::Slice(Slice3::new(None, None, Some(-1))),
        IndexTerm::IntArray(vec![2, 0, 0]),
        IndexTerm::IntArray(vec![3, 1, 2]),
        IndexTerm::BoolMask(vec![true, false, true, true]),
        IndexTerm::BoolMask(vec![true, true, true, false]),
    ]
}
