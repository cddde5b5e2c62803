use super::value::{nested_extents, FieldValue};
use super::Field;
use crate::prelude::*;
use std::marker::PhantomData;

/// A field whose values are computed by a closure over grid entities (points or cells)
///
/// The layout is `[number_of_entities, extents of a value...]`, where the extents are taken from
/// the value of the first entity. The closure is called again on every serialization.
///
/// ```ignore
/// let points: Vec<[f64; 2]> = grid.points();
/// let distance = EntityField::new(&points, |p| (p[0] * p[0] + p[1] * p[1]).sqrt());
/// ```
pub struct EntityField<'a, E, F, V, T = <V as FieldValue>::Element> {
    entities: &'a [E],
    value_of: F,
    precision: PhantomData<fn() -> (V, T)>,
}

impl<'a, E, F, V> EntityField<'a, E, F, V>
where
    F: Fn(&E) -> V,
    V: FieldValue,
{
    pub fn new(entities: &'a [E], value_of: F) -> Self {
        Self::with_precision(entities, value_of)
    }
}

impl<'a, E, F, V, T> EntityField<'a, E, F, V, T>
where
    F: Fn(&E) -> V,
    V: FieldValue,
    T: Scalar,
{
    /// a field whose values are cast to `T`
    pub fn with_precision(entities: &'a [E], value_of: F) -> Self {
        Self {
            entities,
            value_of,
            precision: PhantomData,
        }
    }

    pub fn number_of_entities(&self) -> usize {
        self.entities.len()
    }
}

impl<'a, E, F, V, T> Field for EntityField<'a, E, F, V, T>
where
    F: Fn(&E) -> V,
    V: FieldValue,
    T: Scalar,
{
    fn layout(&self) -> Layout {
        let first = self.entities.first().map(&self.value_of);
        Layout::new(nested_extents(self.entities.len(), first.as_ref()))
    }

    fn precision(&self) -> Precision {
        T::PRECISION
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        let layout = self.layout();
        let per_entity = match layout.dimension() {
            1 => 1,
            _ => layout.number_of_entries_from(1)?,
        };
        let mut scalars: Vec<T> = Vec::with_capacity(layout.number_of_entries());
        for (i, entity) in self.entities.iter().enumerate() {
            let value = (self.value_of)(entity);
            let before = scalars.len();
            value.push_scalars(&mut scalars);
            if !value.is_uniform() || scalars.len() - before != per_entity {
                return Err(Error::size(format!(
                    "entity {i} produced {} values, expected {per_entity}",
                    scalars.len() - before
                )));
            }
        }
        Ok(Serialization::from_values(&scalars))
    }
}
