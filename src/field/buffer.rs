use super::Field;
use crate::prelude::*;

/// A field over a flat buffer of values with an explicit layout
#[derive(Debug, Clone, PartialEq)]
pub struct BufferField<T> {
    values: Vec<T>,
    layout: Layout,
}

impl<T: Scalar> BufferField<T> {
    /// Fails with [`Error::Size`] if the number of values does not match the layout
    pub fn new<L: Into<Layout>>(values: Vec<T>, layout: L) -> Result<Self> {
        let layout = layout.into();
        if values.len() != layout.number_of_entries() {
            return Err(Error::size(format!(
                "{} values cannot be shaped as {layout}",
                values.len()
            )));
        }
        Ok(Self { values, layout })
    }

    /// a one-dimensional field over `values`
    pub fn flat(values: Vec<T>) -> Self {
        let layout = Layout::from([values.len()]);
        Self { values, layout }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl<T: Scalar> Field for BufferField<T> {
    fn layout(&self) -> Layout {
        self.layout.clone()
    }

    fn precision(&self) -> Precision {
        T::PRECISION
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        Ok(Serialization::from_values(&self.values))
    }
}
