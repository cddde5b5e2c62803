use super::Field;
use crate::prelude::*;

/// A field with a fixed layout and precision that serializes a source object on demand
///
/// The callback is invoked on every call to [`Field::serialized`], and its output is checked
/// against the declared layout and precision.
pub struct LazyField<S, F> {
    source: S,
    layout: Layout,
    precision: Precision,
    serializer: F,
}

impl<S, F> LazyField<S, F>
where
    F: Fn(&S) -> Result<Serialization>,
{
    pub fn new(source: S, layout: Layout, precision: Precision, serializer: F) -> Self {
        Self {
            source,
            layout,
            precision,
            serializer,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, F> Field for LazyField<S, F>
where
    F: Fn(&S) -> Result<Serialization>,
{
    fn layout(&self) -> Layout {
        self.layout.clone()
    }

    fn precision(&self) -> Precision {
        self.precision
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        (self.serializer)(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldExt;

    #[test]
    fn serializes_on_demand() {
        let field = LazyField::new(
            vec![1u32, 2, 3, 4],
            Layout::from([2, 2]),
            Precision::UInt32,
            |source| Ok(Serialization::from_values(source)),
        );
        assert_eq!(field.export_vec::<u32>().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(field.source().len(), 4);
    }

    #[test]
    fn declared_layout_is_enforced() {
        let field = LazyField::new(
            vec![1u32, 2, 3],
            Layout::from([2, 2]),
            Precision::UInt32,
            |source| Ok(Serialization::from_values(source)),
        );
        assert!(matches!(field.serialized(), Err(Error::Size(_))));
    }
}
