use crate::{Guard, RVec, Shape, Strides};

/// Strided-view descriptor: a storage offset plus per-axis sizes and
/// strides, mapping a multi-index to `offset + Σ index[i] * stride[i]`.
/// It never owns or touches element data; any number of layouts may
/// describe overlapping views of the same buffer. Embedded by value in
/// whatever type owns the storage.
///
/// Every transform is a pure function returning a new layout, with an
/// `*_in_place` wrapper assigning the result back to `self`. Violated
/// preconditions abort with an [`crate::InvariantError`]; callers in hot
/// loops are expected to validate through [`Guard`] up front.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Layout {
    offset: isize,
    shape: Shape,
    strides: Strides,
}

impl Default for Layout {
    fn default() -> Self {
        Self::scalar(0)
    }
}

impl Layout {
    /// Row-major layout of `shape` at offset 0.
    pub fn new(shape: Shape) -> Self {
        Self::with_offset(0, shape)
    }

    /// Row-major layout of `shape` at an explicit storage offset.
    pub fn with_offset(offset: isize, mut shape: Shape) -> Self {
        shape.clear_offsets();
        let strides = Strides::from(&shape);
        Self {
            offset,
            shape,
            strides,
        }
    }

    /// Layout from an explicit (size, stride) pair per axis.
    #[track_caller]
    pub fn from_parts(offset: isize, mut shape: Shape, strides: Strides) -> Self {
        if let Err(e) = Guard::same_rank(shape.rank(), strides.len()) {
            panic!("layout: {e}");
        }
        shape.clear_offsets();
        Self {
            offset,
            shape,
            strides,
        }
    }

    /// Rank-0 layout addressing the single element at `offset`.
    pub fn scalar(offset: isize) -> Self {
        Self {
            offset,
            shape: Shape::default(),
            strides: Strides::default(),
        }
    }

    pub fn offset(&self) -> isize {
        self.offset
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    #[track_caller]
    pub fn size(&self, axis: usize) -> usize {
        if let Err(e) = Guard::axis(self.rank(), axis) {
            panic!("size: {e}");
        }
        self.shape[axis]
    }

    #[track_caller]
    pub fn stride(&self, axis: usize) -> isize {
        if let Err(e) = Guard::axis(self.rank(), axis) {
            panic!("stride: {e}");
        }
        self.strides[axis]
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    /// Shift the whole view by `delta` elements of backing storage.
    pub fn add_offset(&mut self, delta: isize) {
        self.offset += delta;
    }

    /// One past the highest linear position this layout can address.
    /// An owning tensor checks this against its buffer length before
    /// trusting the descriptor.
    pub fn footprint(&self) -> isize {
        let mut last = self.offset + 1;
        for axis in 0..self.rank() {
            last += self.strides[axis] * (self.shape[axis] as isize - 1);
        }
        last
    }

    /// Number of elements addressed, the product of all sizes.
    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    /// True when strides exactly match row-major packing of the sizes:
    /// scanning axes last to first, `stride[last] == 1` and
    /// `stride[i] == size[i+1] * stride[i+1]`.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1isize;
        for axis in (0..self.rank()).rev() {
            if self.strides[axis] != expected {
                return false;
            }
            expected *= self.shape[axis] as isize;
        }
        true
    }

    /// Index of the highest axis with size > 1, plus one. Trailing unit
    /// axes do not count, so a (10,1,1) layout reads as one-dimensional.
    pub fn effective_rank(&self) -> usize {
        self.shape
            .as_slice()
            .iter()
            .rposition(|&size| size > 1)
            .map_or(0, |axis| axis + 1)
    }

    /// Rank and sizes match, ignoring strides and offset. The
    /// compatibility check for elementwise kernels.
    pub fn same_shape(&self, other: &Layout) -> bool {
        self.shape == other.shape
    }

    /// Linear storage position of a full multi-index.
    #[track_caller]
    pub fn position(&self, index: &[usize]) -> isize {
        if let Err(e) = Guard::same_rank(self.rank(), index.len()) {
            panic!("position: {e}");
        }
        let mut position = self.offset;
        for (axis, &i) in index.iter().enumerate() {
            if let Err(e) = Guard::index(self, axis, i) {
                panic!("position: {e}");
            }
            position += i as isize * self.strides[axis];
        }
        position
    }

    /// Drop `axis`, fixing it at `index`. Remaining axes keep their
    /// relative order; the offset absorbs `index` steps along `axis`.
    #[track_caller]
    pub fn select(&self, axis: usize, index: usize) -> Layout {
        if let Err(e) =
            Guard::not_scalar(self, "select").and_then(|_| Guard::index(self, axis, index))
        {
            panic!("select: {e}");
        }
        let sizes: RVec<usize> = self
            .shape
            .iter()
            .enumerate()
            .filter(|&(a, _)| a != axis)
            .map(|(_, &size)| size)
            .collect();
        let strides: RVec<isize> = self
            .strides
            .iter()
            .enumerate()
            .filter(|&(a, _)| a != axis)
            .map(|(_, &stride)| stride)
            .collect();
        Layout {
            offset: self.offset + index as isize * self.strides[axis],
            shape: Shape::new(sizes),
            strides: Strides::new(strides),
        }
    }

    #[track_caller]
    pub fn select_in_place(&mut self, axis: usize, index: usize) {
        *self = self.select(axis, index);
    }

    /// Shrink `axis` to `len` elements starting at `start`. Rank is
    /// unchanged; the offset absorbs `start` steps along `axis`.
    #[track_caller]
    pub fn narrow(&self, axis: usize, len: usize, start: usize) -> Layout {
        if let Err(e) =
            Guard::not_scalar(self, "narrow").and_then(|_| Guard::window(self, axis, start, len))
        {
            panic!("narrow: {e}");
        }
        let mut out = self.clone();
        out.shape.set_dim(axis, len);
        out.offset += start as isize * self.strides[axis];
        out
    }

    #[track_caller]
    pub fn narrow_in_place(&mut self, axis: usize, len: usize, start: usize) {
        *self = self.narrow(axis, len, start);
    }

    /// Swap two axes; the offset is unchanged.
    #[track_caller]
    pub fn transpose(&self, a: usize, b: usize) -> Layout {
        if let Err(e) = Guard::axis(self.rank(), a).and(Guard::axis(self.rank(), b)) {
            panic!("transpose: {e}");
        }
        let mut out = self.clone();
        out.shape.swap(a, b);
        out.strides.swap(a, b);
        out
    }

    #[track_caller]
    pub fn transpose_in_place(&mut self, a: usize, b: usize) {
        *self = self.transpose(a, b);
    }

    /// Reorder all axes at once: axis `i` of the result is axis `perm[i]`
    /// of `self`. The pairs are gathered into fresh axis arrays before
    /// anything is written, so assigning the result back over `self`
    /// cannot clobber entries mid-permutation.
    #[track_caller]
    pub fn permute(&self, perm: &[usize]) -> Layout {
        if let Err(e) = Guard::permutation(perm, self.rank()) {
            panic!("permute: {e}");
        }
        let sizes: RVec<usize> = perm.iter().map(|&p| self.shape[p]).collect();
        let strides: RVec<isize> = perm.iter().map(|&p| self.strides[p]).collect();
        Layout {
            offset: self.offset,
            shape: Shape::new(sizes),
            strides: Strides::new(strides),
        }
    }

    #[track_caller]
    pub fn permute_in_place(&mut self, perm: &[usize]) {
        *self = self.permute(perm);
    }

    /// Sliding window along `axis`: appends a trailing window axis of
    /// size `window` whose stride is the original stride of `axis`, then
    /// shrinks `axis` to the window count and dilates its stride by
    /// `step`. The window/step pair must tile the axis exactly:
    /// `size == step * (extent - 1) + window`.
    #[track_caller]
    pub fn unfold(&self, axis: usize, window: usize, step: usize) -> Layout {
        if let Err(e) = Guard::unfold(self, axis, window, step) {
            panic!("unfold: {e}");
        }
        let extent = 1 + (self.shape[axis] - window) / step;
        let mut out = self.clone();
        out.shape.push(window);
        out.strides.push(self.strides[axis]);
        out.shape.set_dim(axis, extent);
        out.strides[axis] = self.strides[axis] * step as isize;
        out
    }

    #[track_caller]
    pub fn unfold_in_place(&mut self, axis: usize, window: usize, step: usize) {
        *self = self.unfold(axis, window, step);
    }

    /// Recompute row-major strides for `sizes`, keeping rank and offset.
    /// Refused on a non-contiguous layout. Returns the new footprint.
    #[track_caller]
    pub fn resize(&mut self, sizes: &Shape) -> isize {
        if let Err(e) =
            Guard::contiguous(self).and_then(|_| Guard::same_rank(self.rank(), sizes.rank()))
        {
            panic!("resize: {e}");
        }
        log::trace!("resize {} -> {}", self, sizes);
        self.shape = Shape::from(sizes.as_slice());
        self.strides = Strides::from(&self.shape);
        self.numel() as isize + self.offset
    }

    #[track_caller]
    pub fn resized(&self, sizes: &Shape) -> Layout {
        let mut out = self.clone();
        out.resize(sizes);
        out
    }

    /// Resize a single axis of a contiguous layout, propagating the
    /// recomputed stride to every lower-indexed axis so the result stays
    /// contiguous. Returns the new footprint.
    #[track_caller]
    pub fn resize_axis(&mut self, axis: usize, size: usize) -> isize {
        if let Err(e) = Guard::contiguous(self).and_then(|_| Guard::axis(self.rank(), axis)) {
            panic!("resize_axis: {e}");
        }
        log::trace!("resize axis {} of {} -> {}", axis, self, size);
        self.shape.set_dim(axis, size);
        for i in (0..axis).rev() {
            self.strides[i] = self.shape[i + 1] as isize * self.strides[i + 1];
        }
        self.strides[0] * self.shape[0] as isize + self.offset
    }

    #[track_caller]
    pub fn resized_axis(&self, axis: usize, size: usize) -> Layout {
        let mut out = self.clone();
        out.resize_axis(axis, size);
        out
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.rank() == 0 {
            return write!(f, "<scalar>");
        }
        write!(f, "{}", self.shape[0])?;
        for size in self.shape.iter().skip(1) {
            write!(f, "x{}", size)?;
        }
        Ok(())
    }
}

impl From<&Shape> for Layout {
    fn from(shape: &Shape) -> Self {
        Layout::new(shape.clone())
    }
}
