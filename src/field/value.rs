use crate::prelude::*;

/// A single value of a field: a scalar or a (possibly nested) collection of scalars
///
/// The extents of a value describe its structure, for example `[3]` for a vector in 3D
/// and `[3, 3]` for a tensor. Scalars have no extents.
pub trait FieldValue {
    /// the scalar type stored in this value
    type Element: Scalar;

    fn extents(&self) -> Vec<usize>;

    /// Extents shared by every value of this type, if the type fixes them
    ///
    /// Used for the layout of empty collections, which have no value to inspect.
    fn static_extents() -> Option<Vec<usize>> {
        None
    }

    /// append all scalars of this value in row-major order, cast to `T`
    fn push_scalars<T: Scalar>(&self, out: &mut Vec<T>);

    /// `false` if nested collections inside this value differ in length
    fn is_uniform(&self) -> bool {
        true
    }
}

macro_rules! impl_scalar_value {
    ($($t:ty),*) => {
        $(
            impl FieldValue for $t {
                type Element = $t;

                fn extents(&self) -> Vec<usize> {
                    Vec::new()
                }

                fn static_extents() -> Option<Vec<usize>> {
                    Some(Vec::new())
                }

                fn push_scalars<T: Scalar>(&self, out: &mut Vec<T>) {
                    out.push(T::cast_from(*self));
                }
            }
        )*
    };
}

impl_scalar_value!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl<V: FieldValue, const N: usize> FieldValue for [V; N] {
    type Element = V::Element;

    fn extents(&self) -> Vec<usize> {
        nested_extents(N, self.first())
    }

    fn static_extents() -> Option<Vec<usize>> {
        V::static_extents().map(|inner| std::iter::once(N).chain(inner).collect())
    }

    fn push_scalars<T: Scalar>(&self, out: &mut Vec<T>) {
        self.iter().for_each(|v| v.push_scalars(out));
    }

    fn is_uniform(&self) -> bool {
        is_uniform(self)
    }
}

impl<V: FieldValue> FieldValue for Vec<V> {
    type Element = V::Element;

    fn extents(&self) -> Vec<usize> {
        nested_extents(self.len(), self.first())
    }

    fn push_scalars<T: Scalar>(&self, out: &mut Vec<T>) {
        self.iter().for_each(|v| v.push_scalars(out));
    }

    fn is_uniform(&self) -> bool {
        is_uniform(self)
    }
}

impl<V: FieldValue + ?Sized> FieldValue for &V {
    type Element = V::Element;

    fn extents(&self) -> Vec<usize> {
        (**self).extents()
    }

    fn static_extents() -> Option<Vec<usize>> {
        V::static_extents()
    }

    fn push_scalars<T: Scalar>(&self, out: &mut Vec<T>) {
        (**self).push_scalars(out)
    }

    fn is_uniform(&self) -> bool {
        (**self).is_uniform()
    }
}

/// `len` followed by the extents of `first`, or of `V` itself when there is no first value
pub(crate) fn nested_extents<V: FieldValue>(len: usize, first: Option<&V>) -> Vec<usize> {
    let mut extents = vec![len];
    match first {
        Some(first) => extents.extend(first.extents()),
        None => extents.extend(V::static_extents().unwrap_or_default()),
    }
    extents
}

/// `true` if every value has the same structure as the first one
pub(crate) fn is_uniform<V: FieldValue>(values: &[V]) -> bool {
    let Some(first) = values.first() else {
        return true;
    };
    let expected = first.extents();
    values
        .iter()
        .all(|v| v.is_uniform() && v.extents() == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extents_of_nested_values() {
        assert!(1.5f64.extents().is_empty());
        assert_eq!([1u8, 2, 3].extents(), vec![3]);
        assert_eq!([[0i32; 2]; 3].extents(), vec![3, 2]);
        assert_eq!(vec![vec![1.0f32; 4]; 2].extents(), vec![2, 4]);
    }

    #[test]
    fn extents_without_a_value() {
        assert_eq!(f32::static_extents(), Some(vec![]));
        assert_eq!(<[[u8; 2]; 3]>::static_extents(), Some(vec![3, 2]));
        assert_eq!(<&[f64; 3]>::static_extents(), Some(vec![3]));
        assert_eq!(<Vec<f64>>::static_extents(), None);
        assert_eq!(Vec::<[f64; 3]>::new().extents(), vec![0, 3]);
        assert_eq!(nested_extents::<Vec<u8>>(0, None), vec![0]);
    }

    #[test]
    fn ragged_values_are_detected() {
        assert!(is_uniform(&[vec![1, 2], vec![3, 4]]));
        assert!(!is_uniform(&[vec![1, 2], vec![3]]));
        assert!(!is_uniform(&[vec![vec![1], vec![2, 3]]]));
        assert!(!is_uniform(&[vec![vec![1], vec![2, 3], vec![]]]));
    }

    #[test]
    fn scalars_are_cast() {
        let mut out: Vec<u8> = Vec::new();
        [[1.9f64, 2.1], [3.0, 4.5]].push_scalars(&mut out);
        assert_eq!(out, vec![1, 2, 3, 4]);
    }
}
