use serde::{Deserialize, Serialize};

/// Enum identifying the element type of a buffer or array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Opaque element type for anything outside the numeric lattice
    Object,
}

impl DType {
    pub fn is_signed(&self) -> bool {
        matches!(self, DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64
        )
    }

    pub fn is_integer(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    fn bit_width(&self) -> u32 {
        match self {
            DType::Bool => 1,
            DType::Int8 | DType::UInt8 => 8,
            DType::Int16 | DType::UInt16 => 16,
            DType::Int32 | DType::UInt32 => 32,
            DType::Int64 | DType::UInt64 => 64,
            DType::Float32 | DType::Complex64 => 32,
            DType::Float64 | DType::Complex128 => 64,
            DType::Object => 0,
        }
    }

    fn signed_with_width(bits: u32) -> DType {
        match bits {
            8 => DType::Int8,
            16 => DType::Int16,
            32 => DType::Int32,
            _ => DType::Int64,
        }
    }

    fn unsigned_with_width(bits: u32) -> DType {
        match bits {
            8 => DType::UInt8,
            16 => DType::UInt16,
            32 => DType::UInt32,
            _ => DType::UInt64,
        }
    }

    /// Least upper bound of two element types under the promotion lattice.
    ///
    /// Booleans only unify with themselves; widths widen within a kind;
    /// signed/unsigned mixes widen to the covering signed type, falling out
    /// to `Float64` once `UInt64` is involved; any integer/float mix is
    /// `Float64`; any complex/real mix is `Complex128`; `Object` absorbs
    /// everything else.
    pub fn promote(self, other: DType) -> DType {
        use DType::*;
        if self == other {
            return self;
        }
        match (self, other) {
            (Object, _) | (_, Object) => Object,
            (Bool, _) | (_, Bool) => Object,
            (a, b) if a.is_complex() || b.is_complex() => Complex128,
            (a, b) if a.is_float() || b.is_float() => Float64,
            (a, b) if a.is_signed() && b.is_signed() => {
                Self::signed_with_width(a.bit_width().max(b.bit_width()))
            }
            (a, b) if a.is_unsigned() && b.is_unsigned() => {
                Self::unsigned_with_width(a.bit_width().max(b.bit_width()))
            }
            (a, b) => {
                let (signed, unsigned) = if a.is_signed() { (a, b) } else { (b, a) };
                if unsigned.bit_width() >= 64 {
                    Float64
                } else {
                    Self::signed_with_width(signed.bit_width().max(unsigned.bit_width() * 2))
                }
            }
        }
    }

    /// Folds `promote` over a set of element types; `Object` for an empty set.
    pub fn promote_all<I>(types: I) -> DType
    where
        I: IntoIterator<Item = DType>,
    {
        types
            .into_iter()
            .reduce(DType::promote)
            .unwrap_or(DType::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_within_kind_takes_wider_width() {
        assert_eq!(DType::Int8.promote(DType::Int8), DType::Int8);
        assert_eq!(DType::Int8.promote(DType::Int32), DType::Int32);
        assert_eq!(DType::UInt16.promote(DType::UInt64), DType::UInt64);
        assert_eq!(DType::Float32.promote(DType::Float64), DType::Float64);
        assert_eq!(DType::Complex64.promote(DType::Complex128), DType::Complex128);
    }

    #[test]
    fn promote_mixed_signedness_widens_to_signed() {
        assert_eq!(DType::Int8.promote(DType::UInt8), DType::Int16);
        assert_eq!(DType::Int32.promote(DType::UInt8), DType::Int32);
        assert_eq!(DType::Int16.promote(DType::UInt32), DType::Int64);
        assert_eq!(DType::Int64.promote(DType::UInt64), DType::Float64);
    }

    #[test]
    fn promote_across_kinds() {
        assert_eq!(DType::Int32.promote(DType::Float64), DType::Float64);
        assert_eq!(DType::Int8.promote(DType::Float32), DType::Float64);
        assert_eq!(DType::Complex64.promote(DType::Float32), DType::Complex128);
        assert_eq!(DType::UInt64.promote(DType::Complex64), DType::Complex128);
    }

    #[test]
    fn bool_and_object_sit_outside_the_numeric_chain() {
        assert_eq!(DType::Bool.promote(DType::Bool), DType::Bool);
        assert_eq!(DType::Bool.promote(DType::Int8), DType::Object);
        assert_eq!(DType::Object.promote(DType::Float64), DType::Object);
    }

    #[test]
    fn promote_all_folds_in_order() {
        let types = [DType::UInt8, DType::Int8, DType::UInt32];
        assert_eq!(DType::promote_all(types), DType::Int64);
        assert_eq!(DType::promote_all([]), DType::Object);
    }
}
