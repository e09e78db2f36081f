use crate::{Layout, Shape, ShapeList, Strides, MAX_RANK};

/// Every violated invariant in this crate is a caller bug, not a runtime
/// condition: the transform layer formats one of these and panics. The
/// [`Guard`] checks below are public so hot-loop callers can validate
/// inputs up front instead of paying for it per call.
#[derive(Debug, thiserror::Error)]
pub enum InvariantError {
    #[error("rank {requested} exceeds the maximum rank {max}")]
    RankOverflow { requested: usize, max: usize },
    #[error("axis {axis} out of range for rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },
    #[error("index {index} out of bounds for axis {axis} of size {size}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
    },
    #[error("window [{start}, {start}+{len}) exceeds axis {axis} of size {size}")]
    WindowOutOfBounds {
        axis: usize,
        start: usize,
        len: usize,
        size: usize,
    },
    #[error("sub-range [{start}, {start}+{len}) out of bounds in collection of {size}")]
    RangeOutOfBounds {
        start: usize,
        len: usize,
        size: usize,
    },
    #[error("rank mismatch, expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },
    #[error("{perm:?} is not a permutation of 0..{rank}")]
    InvalidPermutation { perm: Vec<usize>, rank: usize },
    #[error("layout {shape:?} with strides {strides:?} is not contiguous")]
    NonContiguous { shape: Shape, strides: Strides },
    #[error("window {window} with step {step} does not tile axis {axis} of size {size}")]
    UnfoldMisfit {
        axis: usize,
        window: usize,
        step: usize,
        size: usize,
    },
    #[error("cannot {op} a scalar layout")]
    ScalarLayout { op: &'static str },
    #[error("dimension size must be nonzero at position {pos}")]
    ZeroDim { pos: usize },
    #[error("zero-size axis before position {pos} in {shape:?}")]
    EmptyAxisBefore { pos: usize, shape: Shape },
    #[error("expected all present shapes to be equal in {0:?}")]
    ShapeListMismatch(ShapeList),
}

/// Guard checks common invariants on layouts and shapes.
pub struct Guard;

impl Guard {
    pub fn rank_within(requested: usize) -> Result<(), InvariantError> {
        if requested > MAX_RANK {
            return Err(InvariantError::RankOverflow {
                requested,
                max: MAX_RANK,
            });
        }
        Ok(())
    }

    pub fn axis(rank: usize, axis: usize) -> Result<(), InvariantError> {
        if axis >= rank {
            return Err(InvariantError::AxisOutOfRange { axis, rank });
        }
        Ok(())
    }

    pub fn index(layout: &Layout, axis: usize, index: usize) -> Result<(), InvariantError> {
        Self::axis(layout.rank(), axis)?;
        let size = layout.size(axis);
        if index >= size {
            return Err(InvariantError::IndexOutOfBounds { axis, index, size });
        }
        Ok(())
    }

    pub fn window(
        layout: &Layout,
        axis: usize,
        start: usize,
        len: usize,
    ) -> Result<(), InvariantError> {
        Self::axis(layout.rank(), axis)?;
        let size = layout.size(axis);
        if len < 1 {
            return Err(InvariantError::ZeroDim { pos: axis });
        }
        if start + len > size {
            return Err(InvariantError::WindowOutOfBounds {
                axis,
                start,
                len,
                size,
            });
        }
        Ok(())
    }

    pub fn same_rank(expected: usize, actual: usize) -> Result<(), InvariantError> {
        if expected != actual {
            return Err(InvariantError::RankMismatch { expected, actual });
        }
        Ok(())
    }

    pub fn permutation(perm: &[usize], rank: usize) -> Result<(), InvariantError> {
        let mut seen = [false; MAX_RANK];
        let valid = perm.len() == rank
            && perm
                .iter()
                .all(|&p| p < rank && !std::mem::replace(&mut seen[p], true));
        if !valid {
            return Err(InvariantError::InvalidPermutation {
                perm: perm.to_vec(),
                rank,
            });
        }
        Ok(())
    }

    pub fn contiguous(layout: &Layout) -> Result<(), InvariantError> {
        if !layout.is_contiguous() {
            return Err(InvariantError::NonContiguous {
                shape: layout.shape().clone(),
                strides: layout.strides().clone(),
            });
        }
        Ok(())
    }

    pub fn not_scalar(layout: &Layout, op: &'static str) -> Result<(), InvariantError> {
        if layout.rank() == 0 {
            return Err(InvariantError::ScalarLayout { op });
        }
        Ok(())
    }

    pub fn unfold(
        layout: &Layout,
        axis: usize,
        window: usize,
        step: usize,
    ) -> Result<(), InvariantError> {
        Self::not_scalar(layout, "unfold")?;
        Self::axis(layout.rank(), axis)?;
        Self::rank_within(layout.rank() + 1)?;
        let size = layout.size(axis);
        let misfit = InvariantError::UnfoldMisfit {
            axis,
            window,
            step,
            size,
        };
        if window < 1 || step < 1 || window > size {
            return Err(misfit);
        }
        let extent = 1 + (size - window) / step;
        if size != step * (extent - 1) + window {
            return Err(misfit);
        }
        Ok(())
    }
}
