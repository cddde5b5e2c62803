//! Common traits and types that are useful for working with `gridfield`
#![allow(unused_imports)]

pub use crate::compression::{BlockCodec, HeaderType};
pub use crate::encoding::{EncodedStream, Encoder};
pub use crate::field::{ExportTarget, Field, FieldExt, FieldValue, ValuesVisitor};
pub use crate::{Layout, Precision, PrecisionVisitor, Scalar, Serialization};

pub(crate) use crate::{Error, Result};
pub(crate) use std::io::Write;

pub(crate) use derive_more::{Constructor, Deref, DerefMut, Display, From, Into};
