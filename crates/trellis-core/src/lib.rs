mod guard;
mod layout;
mod shape;
mod shape_list;
mod strides;

pub use guard::*;
pub use layout::*;
pub use shape::*;
pub use shape_list::*;
pub use strides::*;

use smallvec::SmallVec;

/// Hard ceiling on the number of axes a descriptor may carry.
pub const MAX_RANK: usize = 8;

/// Inline per-axis array. Rank is bounded by [`MAX_RANK`], so axis data
/// never leaves the stack.
pub type RVec<T> = SmallVec<[T; MAX_RANK]>;

//https://github.com/sonos/tract/blob/main/data/src/macros.rs#L2
#[macro_export]
macro_rules! rvec {
    (@one $x:expr) => (1usize);
    ($elem:expr; $n:expr) => ({
        $crate::RVec::from_elem($elem, $n)
    });
    ($($x:expr),*$(,)*) => ({
        let count = 0usize $(+ rvec![@one $x])*;
        #[allow(unused_mut)]
        let mut vec = $crate::RVec::new();
        if count <= vec.inline_size() {
            $(vec.push($x);)*
            vec
        } else {
            $crate::RVec::from_vec(vec![$($x,)*])
        }
    });
}

#[macro_export]
macro_rules! shape {
    ($($x:expr),*$(,)*) => ({
        use $crate::rvec;
        $crate::Shape::new(rvec![$($x,)*])
    });
}

pub mod prelude {
    pub use crate::{rvec, shape, Layout, Shape, ShapeList, Strides};
}
