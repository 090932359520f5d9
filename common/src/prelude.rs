pub use crate::ext::{ExtendF32, ExtendPoint2, ExtendPoint3, ExtendVector2, ExtendVector3};
