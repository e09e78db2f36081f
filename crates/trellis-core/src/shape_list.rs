use crate::{InvariantError, Shape};

/// Ordered collection of shape descriptors where any slot may be an
/// explicit hole. Pipeline stages with several parallel branches use one
/// of these to describe every branch's tensor shape at once.
#[derive(Clone, Default, PartialEq)]
pub struct ShapeList(Vec<Option<Shape>>);

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, shape: Shape) {
        self.0.push(Some(shape));
    }

    pub fn push_hole(&mut self) {
        self.0.push(None);
    }

    /// Shape at slot `i`; `None` for a hole or an out-of-range slot.
    pub fn get(&self, i: usize) -> Option<&Shape> {
        self.0.get(i).and_then(|slot| slot.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Shape>> {
        self.0.iter().map(|slot| slot.as_ref())
    }

    /// Copy-append every slot of `other`, holes included.
    pub fn append(&mut self, other: &ShapeList) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Copy of the `len` slots starting at `start`, holes included.
    #[track_caller]
    pub fn narrow(&self, len: usize, start: usize) -> ShapeList {
        if start + len > self.0.len() {
            panic!(
                "narrow: {}",
                InvariantError::RangeOutOfBounds {
                    start,
                    len,
                    size: self.0.len(),
                }
            );
        }
        ShapeList(self.0[start..start + len].to_vec())
    }

    /// Collapse to a single-element list holding the first present shape.
    /// Every present element must equal it; an empty or all-hole list
    /// collapses to an empty one.
    #[track_caller]
    pub fn merge_all(&self) -> ShapeList {
        let mut merged = ShapeList::new();
        let Some(first) = self.0.iter().flatten().next() else {
            return merged;
        };
        for shape in self.0.iter().flatten() {
            if shape != first {
                panic!("merge_all: {}", InvariantError::ShapeListMismatch(self.clone()));
            }
        }
        merged.push(first.clone());
        merged
    }
}

impl From<Shape> for ShapeList {
    fn from(shape: Shape) -> Self {
        ShapeList(vec![Some(shape)])
    }
}

impl std::fmt::Debug for ShapeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ ")?;
        for slot in self.0.iter() {
            match slot {
                Some(shape) => write!(f, "{} ", shape)?,
                None => write!(f, "null ")?,
            }
        }
        write!(f, "]")
    }
}

impl std::fmt::Display for ShapeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    #[test]
    fn holes_are_preserved() {
        let mut branches = ShapeList::new();
        branches.push(shape![3, 4]);
        branches.push_hole();
        branches.push(shape![5]);
        assert_eq!(branches.len(), 3);
        assert_eq!(branches.get(0), Some(&shape![3, 4]));
        assert_eq!(branches.get(1), None);
        assert_eq!(branches.get(2), Some(&shape![5]));
        assert_eq!(branches.get(9), None);

        let mut merged = ShapeList::from(shape![1]);
        merged.append(&branches);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.get(2), None);
    }

    #[test]
    fn narrow_copies_a_sub_range() {
        let mut branches = ShapeList::new();
        branches.push(shape![3, 4]);
        branches.push_hole();
        branches.push(shape![5]);
        let tail = branches.narrow(2, 1);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.get(0), None);
        assert_eq!(tail.get(1), Some(&shape![5]));
    }

    #[test]
    #[should_panic(expected = "out of bounds in collection")]
    fn narrow_rejects_overflow() {
        ShapeList::from(shape![3]).narrow(2, 0);
    }

    #[test]
    fn merge_all_skips_holes() {
        let mut branches = ShapeList::new();
        branches.push_hole();
        branches.push(shape![3, 4]);
        branches.push_hole();
        branches.push(shape![3, 4]);
        let merged = branches.merge_all();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get(0), Some(&shape![3, 4]));
    }

    #[test]
    fn merge_all_of_nothing_is_empty() {
        assert!(ShapeList::new().merge_all().is_empty());
        let mut holes = ShapeList::new();
        holes.push_hole();
        assert!(holes.merge_all().is_empty());
    }

    #[test]
    #[should_panic(expected = "expected all present shapes to be equal")]
    fn merge_all_rejects_mismatched_shapes() {
        let mut branches = ShapeList::new();
        branches.push(shape![3, 4]);
        branches.push(shape![4, 3]);
        branches.merge_all();
    }
}
