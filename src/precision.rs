//! Runtime tags for the numeric scalar types a field can carry
//!
//! A field erases the concrete type of its values behind a [`Precision`]. Consumers that need
//! the concrete type back go through [`Precision::visit`] (or the [`match_each_precision`]
//! macro inside this crate), which is the only place where the erasure is undone.

use crate::field::ExportTarget;
use crate::prelude::*;
use num_traits::AsPrimitive;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// The closed set of scalar types that can be stored in a [`Serialization`]
///
/// The `Display` output matches the type names used by `.vtk` xml files (`Float64`, `UInt8`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Precision {
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
}

/// Generic callback that receives the concrete type behind a [`Precision`]
pub trait PrecisionVisitor {
    type Output;

    fn visit<T: Scalar>(self, precision: Precision) -> Self::Output;
}

/// Expands `$body` once per precision with `$t` aliased to the matching rust type.
macro_rules! match_each_precision {
    ($self:expr, | $t:ident | $body:block) => {{
        use $crate::Precision;
        match $self {
            Precision::Int8 => {
                type $t = i8;
                $body
            }
            Precision::Int16 => {
                type $t = i16;
                $body
            }
            Precision::Int32 => {
                type $t = i32;
                $body
            }
            Precision::Int64 => {
                type $t = i64;
                $body
            }
            Precision::UInt8 => {
                type $t = u8;
                $body
            }
            Precision::UInt16 => {
                type $t = u16;
                $body
            }
            Precision::UInt32 => {
                type $t = u32;
                $body
            }
            Precision::UInt64 => {
                type $t = u64;
                $body
            }
            Precision::Float32 => {
                type $t = f32;
                $body
            }
            Precision::Float64 => {
                type $t = f64;
                $body
            }
        }
    }};
}

pub(crate) use match_each_precision;

impl Precision {
    pub const ALL: [Precision; 10] = [
        Precision::Int8,
        Precision::Int16,
        Precision::Int32,
        Precision::Int64,
        Precision::UInt8,
        Precision::UInt16,
        Precision::UInt32,
        Precision::UInt64,
        Precision::Float32,
        Precision::Float64,
    ];

    /// the precision tag of a rust scalar type
    pub fn of<T: Scalar>() -> Self {
        T::PRECISION
    }

    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    pub fn is_integral(&self) -> bool {
        !self.is_float()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_signed(&self) -> bool {
        !matches!(
            self,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64
        )
    }

    /// number of decimal digits the type can represent without change
    pub fn digits10(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 2,
            Self::Int16 | Self::UInt16 => 4,
            Self::Int32 | Self::UInt32 => 9,
            Self::Int64 => 18,
            Self::UInt64 => 19,
            Self::Float32 => 6,
            Self::Float64 => 15,
        }
    }

    /// Call `visitor` with the rust type that corresponds to this tag
    pub fn visit<V: PrecisionVisitor>(self, visitor: V) -> V::Output {
        match_each_precision!(self, |T| { visitor.visit::<T>(self) })
    }
}

/// A rust scalar type that can back a [`Precision`]
///
/// Every scalar converts to every other scalar with `as` semantics through [`Scalar::cast_from`],
/// and can be viewed as raw bytes without copying.
pub trait Scalar:
    Copy
    + PartialEq
    + PartialOrd
    + Default
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
    + ExportTarget
    + FromBytes
    + IntoBytes
    + Immutable
    + KnownLayout
    + AsPrimitive<i8>
    + AsPrimitive<i16>
    + AsPrimitive<i32>
    + AsPrimitive<i64>
    + AsPrimitive<u8>
    + AsPrimitive<u16>
    + AsPrimitive<u32>
    + AsPrimitive<u64>
    + AsPrimitive<f32>
    + AsPrimitive<f64>
{
    const PRECISION: Precision;
    const ZERO: Self;

    fn cast_from<S: Scalar>(value: S) -> Self;

    fn to_i64(self) -> i64 {
        AsPrimitive::<i64>::as_(self)
    }

    fn to_u64(self) -> u64 {
        AsPrimitive::<u64>::as_(self)
    }

    fn to_f64(self) -> f64 {
        AsPrimitive::<f64>::as_(self)
    }
}

macro_rules! impl_scalar {
    ($($t:ty => $precision:ident, $zero:expr);* $(;)?) => {
        $(
            impl Scalar for $t {
                const PRECISION: Precision = Precision::$precision;
                const ZERO: Self = $zero;

                fn cast_from<S: Scalar>(value: S) -> Self {
                    AsPrimitive::<$t>::as_(value)
                }
            }
        )*
    };
}

impl_scalar! {
    i8 => Int8, 0;
    i16 => Int16, 0;
    i32 => Int32, 0;
    i64 => Int64, 0;
    u8 => UInt8, 0;
    u16 => UInt16, 0;
    u32 => UInt32, 0;
    u64 => UInt64, 0;
    f32 => Float32, 0.0;
    f64 => Float64, 0.0;
}
