use crate::error::{JvmError, Result};

/// A reference into the [`Heap`]: a non-negative index, valid for the
/// lifetime of the heap that produced it. References are never reused.
pub type HeapRef = usize;

/// An append-only collection of owned integer arrays (spec §3 "Heap",
/// §4.2).
///
/// Each stored array keeps its logical length in slot 0; user-visible
/// elements occupy slots `1..=n`. There is no garbage collector: arrays
/// are created by `newarray` and released all at once when the heap is
/// dropped, per spec's Non-goals ("the heap is monotonic for the
/// program's lifetime").
#[derive(Debug, Default)]
pub struct Heap {
    arrays: Vec<Vec<i32>>,
}

impl Heap {
    /// Creates a new, empty heap.
    pub fn new() -> Self {
        Self { arrays: Vec::new() }
    }

    /// Allocates a zero-filled integer array of the given length and
    /// returns its heap reference. `add` is O(1) amortized.
    pub fn new_array(&mut self, len: i32) -> Result<HeapRef> {
        if len < 0 {
            return Err(JvmError::NegativeArrayLength(len));
        }
        let mut storage = Vec::with_capacity(len as usize + 1);
        storage.push(len);
        storage.resize(len as usize + 1, 0);
        let reference = self.arrays.len();
        self.arrays.push(storage);
        Ok(reference)
    }

    fn slots(&self, r: HeapRef) -> Result<&Vec<i32>> {
        self.arrays.get(r).ok_or(JvmError::BadHeapRef(r))
    }

    fn slots_mut(&mut self, r: HeapRef) -> Result<&mut Vec<i32>> {
        self.arrays.get_mut(r).ok_or(JvmError::BadHeapRef(r))
    }

    /// The logical length of the array at `r` (`arraylength`).
    pub fn length(&self, r: HeapRef) -> Result<i32> {
        Ok(self.slots(r)?[0])
    }

    /// Reads element `index` of the array at `r` (`iaload`).
    pub fn load(&self, r: HeapRef, index: i32) -> Result<i32> {
        let storage = self.slots(r)?;
        let len = storage[0];
        if index < 0 || index >= len {
            return Err(JvmError::BadArrayIndex { index, len });
        }
        Ok(storage[index as usize + 1])
    }

    /// Writes `value` into element `index` of the array at `r` (`iastore`).
    pub fn store(&mut self, r: HeapRef, index: i32, value: i32) -> Result<()> {
        let storage = self.slots_mut(r)?;
        let len = storage[0];
        if index < 0 || index >= len {
            return Err(JvmError::BadArrayIndex { index, len });
        }
        storage[index as usize + 1] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_array_is_zero_filled() {
        let mut heap = Heap::new();
        let r = heap.new_array(3).unwrap();
        assert_eq!(heap.length(r).unwrap(), 3);
        assert_eq!(heap.load(r, 0).unwrap(), 0);
        assert_eq!(heap.load(r, 2).unwrap(), 0);
    }

    #[test]
    fn store_then_load_round_trips() {
        let mut heap = Heap::new();
        let r = heap.new_array(3).unwrap();
        heap.store(r, 1, 20).unwrap();
        assert_eq!(heap.load(r, 1).unwrap(), 20);
    }

    #[test]
    fn out_of_range_index_errors() {
        let mut heap = Heap::new();
        let r = heap.new_array(2).unwrap();
        assert!(heap.load(r, 2).is_err());
        assert!(heap.store(r, -1, 0).is_err());
    }

    #[test]
    fn bad_reference_errors() {
        let heap = Heap::new();
        assert!(matches!(heap.length(0), Err(JvmError::BadHeapRef(0))));
    }

    #[test]
    fn references_are_never_reused() {
        let mut heap = Heap::new();
        let a = heap.new_array(1).unwrap();
        let b = heap.new_array(1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn negative_length_errors() {
        let mut heap = Heap::new();
        assert!(matches!(
            heap.new_array(-1),
            Err(JvmError::NegativeArrayLength(-1))
        ));
    }
}
