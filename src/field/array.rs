use super::Field;
use crate::prelude::*;
use ndarray::{Array, Dimension};

/// A field over an `ndarray` array
///
/// The layout is the shape of the array. Values are serialized in logical row-major order, no
/// matter how the array is laid out in memory, so transposed or sliced views serialize the way
/// they index.
///
/// ```ignore
/// let rho = ndarray::Array3::<f64>::zeros((nx, ny, nz));
/// let field = ArrayField::new(rho);
/// ```
#[derive(Constructor, Deref, DerefMut, Into, Debug, Clone)]
pub struct ArrayField<A, D: Dimension>(Array<A, D>);

impl<A: Scalar, D: Dimension> Field for ArrayField<A, D> {
    fn layout(&self) -> Layout {
        Layout::from(self.0.shape())
    }

    fn precision(&self) -> Precision {
        A::PRECISION
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        match self.0.as_slice() {
            Some(contiguous) => Ok(Serialization::from_values(contiguous)),
            None => {
                let values: Vec<A> = self.0.iter().copied().collect();
                Ok(Serialization::from_values(&values))
            }
        }
    }
}
