use crate::{RVec, Shape};

/// Per-axis steps, in elements, between consecutive indices along each axis.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Strides(RVec<isize>);

impl Strides {
    pub fn new(strides: RVec<isize>) -> Self {
        Self(strides)
    }

    pub fn to_vec(&self) -> Vec<isize> {
        self.0.to_vec()
    }

    pub fn as_slice(&self) -> &[isize] {
        &self.0
    }

    pub fn get(&self, axis: usize) -> Option<&isize> {
        self.0.get(axis)
    }

    pub fn iter(&self) -> impl Iterator<Item = &isize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, stride: isize) {
        self.0.push(stride);
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }
}

impl std::fmt::Debug for Strides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut repr = format!("[{}", self.0.first().unwrap_or(&0));
        for stride in self.0.iter().skip(1) {
            repr.push_str(&format!("x{}", stride));
        }
        write!(f, "{}]", repr)
    }
}

/// Row-major packing of a shape.
impl From<&Shape> for Strides {
    fn from(shape: &Shape) -> Self {
        let mut stride = 1isize;
        let mut strides: RVec<isize> = shape
            .as_slice()
            .iter()
            .rev()
            .map(|&size| {
                let current = stride;
                stride *= size as isize;
                current
            })
            .collect();
        strides.reverse();
        Self(strides)
    }
}

impl std::ops::Index<usize> for Strides {
    type Output = isize;

    fn index(&self, axis: usize) -> &Self::Output {
        &self.0[axis]
    }
}

impl std::ops::IndexMut<usize> for Strides {
    fn index_mut(&mut self, axis: usize) -> &mut Self::Output {
        &mut self.0[axis]
    }
}

#[cfg(test)]
mod tests {
    use crate::shape;

    #[test]
    fn row_major_from_shape() {
        use super::*;
        let shape = shape![2, 3, 4];
        let strides = Strides::from(&shape);
        assert_eq!(strides.to_vec(), vec![12, 4, 1]);
    }

    #[test]
    fn scalar_shape_has_no_strides() {
        use super::*;
        let strides = Strides::from(&shape![]);
        assert!(strides.is_empty());
    }
}
