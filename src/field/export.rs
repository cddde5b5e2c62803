use crate::prelude::*;

/// A container that the values of a field can be copied into
///
/// Elements with a fixed number of scalars (scalars and arrays of them) report it through
/// [`ExportTarget::ARITY`]. Growable containers report `None` and are resized when filled.
pub trait ExportTarget: Sized {
    /// number of scalars held by one value of this type, `None` if it is growable
    const ARITY: Option<usize>;

    /// an empty value used when growing a container
    fn blank() -> Self;

    /// Overwrite `self` with `values`, which are shaped as `layout`
    fn fill<S: Scalar>(&mut self, layout: &Layout, values: &[S]) -> Result<()>;
}

macro_rules! impl_scalar_target {
    ($($t:ty),*) => {
        $(
            impl ExportTarget for $t {
                const ARITY: Option<usize> = Some(1);

                fn blank() -> Self {
                    <$t as Scalar>::ZERO
                }

                fn fill<S: Scalar>(&mut self, _layout: &Layout, values: &[S]) -> Result<()> {
                    match values {
                        [value] => {
                            *self = <$t as Scalar>::cast_from(*value);
                            Ok(())
                        }
                        _ => Err(Error::type_error(format!(
                            "cannot export {} values into a single scalar",
                            values.len()
                        ))),
                    }
                }
            }
        )*
    };
}

impl_scalar_target!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

const fn times(arity: Option<usize>, n: usize) -> Option<usize> {
    match arity {
        Some(arity) => Some(arity * n),
        None => None,
    }
}

impl<E: ExportTarget, const N: usize> ExportTarget for [E; N] {
    const ARITY: Option<usize> = times(E::ARITY, N);

    fn blank() -> Self {
        std::array::from_fn(|_| E::blank())
    }

    fn fill<S: Scalar>(&mut self, layout: &Layout, values: &[S]) -> Result<()> {
        match E::ARITY {
            Some(arity) => {
                if values.len() != arity * N {
                    return Err(Error::type_error(format!(
                        "cannot export {} values into an array of {N} elements with {arity} values each",
                        values.len()
                    )));
                }
                let element_layout = Layout::from([arity]);
                for (element, chunk) in self.iter_mut().zip(values.chunks(arity.max(1))) {
                    element.fill(&element_layout, chunk)?;
                }
                Ok(())
            }
            None => {
                let (extent, sub_layout) = split_outer(layout)?;
                if extent != N {
                    return Err(Error::type_error(format!(
                        "cannot export {extent} sub-ranges into an array of {N} elements"
                    )));
                }
                fill_nested(self.iter_mut(), &sub_layout, values)
            }
        }
    }
}

impl<E: ExportTarget> ExportTarget for Vec<E> {
    const ARITY: Option<usize> = None;

    fn blank() -> Self {
        Vec::new()
    }

    fn fill<S: Scalar>(&mut self, layout: &Layout, values: &[S]) -> Result<()> {
        match E::ARITY {
            Some(0) => Err(Error::type_error(
                "cannot export values into elements without components",
            )),
            Some(arity) => {
                if values.len() % arity != 0 {
                    return Err(Error::type_error(format!(
                        "{} values cannot be split into elements of {arity} values",
                        values.len()
                    )));
                }
                resize_blank(self, values.len() / arity);
                let element_layout = Layout::from([arity]);
                for (element, chunk) in self.iter_mut().zip(values.chunks(arity)) {
                    element.fill(&element_layout, chunk)?;
                }
                Ok(())
            }
            None => {
                let (extent, sub_layout) = split_outer(layout)?;
                resize_blank(self, extent);
                fill_nested(self.iter_mut(), &sub_layout, values)
            }
        }
    }
}

fn resize_blank<E: ExportTarget>(target: &mut Vec<E>, len: usize) {
    target.truncate(len);
    let missing = len - target.len();
    target.extend((0..missing).map(|_| E::blank()));
}

/// the outer extent and the layout of each sub-range for a nested container
fn split_outer(layout: &Layout) -> Result<(usize, Layout)> {
    if layout.dimension() < 2 {
        return Err(Error::type_error(format!(
            "nested container needs more dimensions than provided by layout {layout}"
        )));
    }
    Ok((layout.extent(0)?, layout.sub_layout(1)?))
}

fn fill_nested<'a, E, I, S>(targets: I, sub_layout: &Layout, values: &[S]) -> Result<()>
where
    E: ExportTarget + 'a,
    I: Iterator<Item = &'a mut E>,
    S: Scalar,
{
    let step = sub_layout.number_of_entries();
    for (i, target) in targets.enumerate() {
        let chunk = values.get(i * step..(i + 1) * step).ok_or_else(|| {
            Error::size(format!(
                "{} values are too few for sub-range {i} of layout {sub_layout}",
                values.len()
            ))
        })?;
        target.fill(sub_layout, chunk)?;
    }
    Ok(())
}
