pub use crate::Tensor;
pub use crate::activation::*;
pub use crate::error::*;
pub use crate::layer::*;
pub use crate::loss::*;
pub use crate::metric::*;
pub use crate::model::*;
pub use crate::optimizer::*;
pub use crate::traits::*;
