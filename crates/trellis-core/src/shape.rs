use std::hash::{Hash, Hasher};
use std::ops::RangeTo;

use num_traits::AsPrimitive;

use crate::{Guard, InvariantError, Layout, RVec};

/// Shape-only descriptor: per-axis sizes plus optional per-axis offsets
/// describing a bounding box inside the shape. Carries no stride
/// information, so two differently-strided views of the same logical shape
/// produce equal values. Used to plan allocations and communicate extents
/// between pipeline stages.
#[derive(Clone, Default)]
pub struct Shape {
    dims: RVec<usize>,
    offsets: Option<RVec<usize>>,
}

impl Shape {
    #[track_caller]
    pub fn new(dims: RVec<usize>) -> Self {
        if let Err(e) = Guard::rank_within(dims.len()) {
            panic!("shape: {e}");
        }
        Self {
            dims,
            offsets: None,
        }
    }

    /// Build from any numeric size type, narrowing or widening to `usize`.
    #[track_caller]
    pub fn from_slice<T: AsPrimitive<usize>>(dims: &[T]) -> Self {
        Self::new(dims.iter().map(|&d| d.as_()).collect())
    }

    pub fn get(&self, axis: usize) -> Option<&usize> {
        self.dims.get(axis)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.dims
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.dims.iter()
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn maxdim(&self) -> usize {
        self.dims.iter().copied().max().unwrap_or(0)
    }

    #[track_caller]
    pub fn push(&mut self, size: usize) {
        if let Err(e) = Guard::rank_within(self.dims.len() + 1) {
            panic!("push: {e}");
        }
        self.dims.push(size);
        if let Some(offsets) = &mut self.offsets {
            offsets.push(0);
        }
    }

    /// Resize an existing axis. The rank cannot grow through this call.
    #[track_caller]
    pub fn set_dim(&mut self, axis: usize, size: usize) {
        if let Err(e) = Guard::axis(self.dims.len(), axis) {
            panic!("set_dim: {e}");
        }
        self.dims[axis] = size;
    }

    /// Set every axis to the same size.
    pub fn set_all(&mut self, size: usize) {
        for dim in self.dims.iter_mut() {
            *dim = size;
        }
    }

    /// Grow the rank by one, shifting axes at and after `pos` up a slot.
    /// Every axis strictly before `pos` must already have a nonzero size.
    #[track_caller]
    pub fn insert_dim(&mut self, pos: usize, size: usize) {
        if let Err(e) = self.check_insert(pos, size) {
            panic!("insert_dim: {e}");
        }
        self.dims.insert(pos, size);
        if let Some(offsets) = &mut self.offsets {
            offsets.insert(pos, 0);
        }
    }

    fn check_insert(&self, pos: usize, size: usize) -> Result<(), InvariantError> {
        Guard::rank_within(self.dims.len() + 1)?;
        if size == 0 {
            return Err(InvariantError::ZeroDim { pos });
        }
        if pos > self.dims.len() {
            return Err(InvariantError::AxisOutOfRange {
                axis: pos,
                rank: self.dims.len(),
            });
        }
        if self.dims[..pos].iter().any(|&d| d == 0) {
            return Err(InvariantError::EmptyAxisBefore {
                pos,
                shape: self.clone(),
            });
        }
        Ok(())
    }

    /// Drop the axis at `pos`, returning its size.
    #[track_caller]
    pub fn remove_dim(&mut self, pos: usize) -> usize {
        if let Err(e) = Guard::axis(self.dims.len(), pos) {
            panic!("remove_dim: {e}");
        }
        if let Some(offsets) = &mut self.offsets {
            offsets.remove(pos);
        }
        self.dims.remove(pos)
    }

    /// Pop the last axis while its size is 1.
    pub fn strip_trailing_unit_dims(&mut self) {
        while self.dims.last() == Some(&1) {
            self.remove_dim(self.dims.len() - 1);
        }
    }

    /// Move axis `d` to position `pos`, keeping the relative order of the
    /// other axes. Offsets travel with their axis.
    #[track_caller]
    pub fn shift_dim(&mut self, d: usize, pos: usize) {
        if let Err(e) = Guard::axis(self.dims.len(), d).and(Guard::axis(self.dims.len(), pos)) {
            panic!("shift_dim: {e}");
        }
        let dim = self.dims.remove(d);
        self.dims.insert(pos, dim);
        if let Some(offsets) = &mut self.offsets {
            let offset = offsets.remove(d);
            offsets.insert(pos, offset);
        }
    }

    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.dims.swap(a, b);
        if let Some(offsets) = &mut self.offsets {
            offsets.swap(a, b);
        }
    }

    /// Set the bounding-box offset of one axis. The offset array is
    /// allocated on first use; absent offsets read as 0.
    #[track_caller]
    pub fn set_offset(&mut self, axis: usize, offset: usize) {
        if let Err(e) = Guard::axis(self.dims.len(), axis) {
            panic!("set_offset: {e}");
        }
        let offsets = self
            .offsets
            .get_or_insert_with(|| RVec::from_elem(0, self.dims.len()));
        offsets[axis] = offset;
    }

    #[track_caller]
    pub fn offset(&self, axis: usize) -> usize {
        if let Err(e) = Guard::axis(self.dims.len(), axis) {
            panic!("offset: {e}");
        }
        self.offsets.as_ref().map_or(0, |offsets| offsets[axis])
    }

    pub fn has_offsets(&self) -> bool {
        self.offsets.is_some()
    }

    pub fn clear_offsets(&mut self) {
        self.offsets = None;
    }

    /// Per-axis maximum of two equal-rank shapes.
    #[track_caller]
    pub fn set_max(&mut self, other: &Shape) {
        if let Err(e) = Guard::same_rank(self.rank(), other.rank()) {
            panic!("set_max: {e}");
        }
        for (dim, &theirs) in self.dims.iter_mut().zip(other.dims.iter()) {
            *dim = (*dim).max(theirs);
        }
    }

    /// True when every axis is <= the corresponding axis of `other`.
    #[track_caller]
    pub fn each_le(&self, other: &Shape) -> bool {
        if let Err(e) = Guard::same_rank(self.rank(), other.rank()) {
            panic!("each_le: {e}");
        }
        self.dims.iter().zip(other.dims.iter()).all(|(a, b)| a <= b)
    }

    /// True when every axis is >= the corresponding axis of `other`.
    #[track_caller]
    pub fn each_ge(&self, other: &Shape) -> bool {
        if let Err(e) = Guard::same_rank(self.rank(), other.rank()) {
            panic!("each_ge: {e}");
        }
        self.dims.iter().zip(other.dims.iter()).all(|(a, b)| a >= b)
    }

    /// Scale sizes (and offsets, when present) by a float factor,
    /// truncating toward zero.
    pub fn scale(&self, factor: f64) -> Shape {
        let mut out = self.clone();
        for dim in out.dims.iter_mut() {
            *dim = (*dim as f64 * factor) as usize;
        }
        if let Some(offsets) = &mut out.offsets {
            for offset in offsets.iter_mut() {
                *offset = (*offset as f64 * factor) as usize;
            }
        }
        out
    }
}

/// Equality compares rank and sizes only; offsets are ignored.
impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dims.hash(state);
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dims.is_empty() {
            return write!(f, "[]");
        }
        let mut repr = format!("[{}", self.dims[0]);
        for dim in self.dims.iter().skip(1) {
            repr.push_str(&format!("x{}", dim));
        }
        write!(f, "{}]", repr)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dims.is_empty() {
            return write!(f, "<empty>");
        }
        if let Some(offsets) = &self.offsets {
            if offsets.iter().any(|&o| o != 0) {
                write!(f, "({}", offsets[0])?;
                for offset in offsets.iter().skip(1) {
                    write!(f, ",{}", offset)?;
                }
                write!(f, ")")?;
            }
        }
        write!(f, "{}", self.dims[0])?;
        for dim in self.dims.iter().skip(1) {
            write!(f, "x{}", dim)?;
        }
        Ok(())
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = usize;

    fn index(&self, axis: usize) -> &Self::Output {
        &self.dims[axis]
    }
}

impl std::ops::IndexMut<usize> for Shape {
    fn index_mut(&mut self, axis: usize) -> &mut Self::Output {
        &mut self.dims[axis]
    }
}

impl std::ops::Index<RangeTo<usize>> for Shape {
    type Output = [usize];

    fn index(&self, range: RangeTo<usize>) -> &Self::Output {
        &self.dims[range]
    }
}

impl From<&Layout> for Shape {
    fn from(layout: &Layout) -> Self {
        layout.shape().clone()
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.into())
    }
}

impl<T: AsPrimitive<usize>> From<Vec<T>> for Shape {
    fn from(dims: Vec<T>) -> Self {
        Shape::from_slice(&dims)
    }
}

/// Elementwise product; present offsets on the left are scaled by the
/// right-hand sizes in lock-step.
impl std::ops::Mul for &Shape {
    type Output = Shape;

    #[track_caller]
    fn mul(self, rhs: &Shape) -> Shape {
        if let Err(e) = Guard::same_rank(self.rank(), rhs.rank()) {
            panic!("shape mul: {e}");
        }
        let mut out = self.clone();
        for (axis, &theirs) in rhs.dims.iter().enumerate() {
            out.dims[axis] *= theirs;
        }
        if let Some(offsets) = &mut out.offsets {
            for (axis, &theirs) in rhs.dims.iter().enumerate() {
                offsets[axis] *= theirs;
            }
        }
        out
    }
}

impl std::ops::Add for &Shape {
    type Output = Shape;

    #[track_caller]
    fn add(self, rhs: &Shape) -> Shape {
        if let Err(e) = Guard::same_rank(self.rank(), rhs.rank()) {
            panic!("shape add: {e}");
        }
        let mut out = self.clone();
        for (axis, &theirs) in rhs.dims.iter().enumerate() {
            out.dims[axis] += theirs;
        }
        out
    }
}

impl std::ops::Mul<usize> for &Shape {
    type Output = Shape;

    fn mul(self, factor: usize) -> Shape {
        let mut out = self.clone();
        for dim in out.dims.iter_mut() {
            *dim *= factor;
        }
        if let Some(offsets) = &mut out.offsets {
            for offset in offsets.iter_mut() {
                *offset *= factor;
            }
        }
        out
    }
}

impl std::ops::Add<usize> for &Shape {
    type Output = Shape;

    fn add(self, term: usize) -> Shape {
        let mut out = self.clone();
        for dim in out.dims.iter_mut() {
            *dim += term;
        }
        out
    }
}

macro_rules! impl_try_into_for_shape {
    ($($N:expr),*) => {
        $(
            impl TryInto<[usize; $N]> for &Shape {
                type Error = anyhow::Error;

                fn try_into(self) -> Result<[usize; $N], Self::Error> {
                    if self.dims.len() == $N {
                        let mut arr = [0; $N];
                        for (i, &dim) in self.dims.iter().enumerate().take($N) {
                            arr[i] = dim;
                        }
                        Ok(arr)
                    } else {
                        Err(anyhow::anyhow!("Shape has length {} but expected {}", self.dims.len(), $N))
                    }
                }
            }
        )*
    };
}

impl_try_into_for_shape!(0, 1, 2, 3, 4, 5, 6, 7, 8);
