use std::fmt::Debug;

use num_traits::{Num, NumCast};

/// Numeric scalar usable as a coordinate and as an area measure.
pub trait GeometryNum: Num + NumCast + PartialOrd + Copy + Debug + Send + Sync {}

impl<T: Num + NumCast + PartialOrd + Copy + Debug + Send + Sync> GeometryNum for T {}
