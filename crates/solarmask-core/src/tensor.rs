//! Dense `f32` tensors with tracked, scoped release.
//!
//! Every [`Tensor`] is allocated through a [`TensorLedger`] and
//! decrements the ledger's live count when it is dropped or
//! [disposed](Tensor::dispose). A prediction therefore releases all of
//! its intermediate buffers on every exit path, including `?` early
//! returns, and tests can assert `ledger.live() == 0` afterwards.
//!
//! The ledger uses `Rc<Cell<_>>` counters: the browser main thread is
//! the only thread that ever touches tensors.

use std::cell::Cell;
use std::rc::Rc;

use crate::types::ModelError;

/// Allocation counters shared by all tensors created from one ledger.
#[derive(Debug, Clone, Default)]
pub struct TensorLedger {
    live: Rc<Cell<usize>>,
    allocated: Rc<Cell<u64>>,
}

impl TensorLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tensors currently alive.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Number of tensors ever allocated from this ledger.
    #[must_use]
    pub fn total_allocated(&self) -> u64 {
        self.allocated.get()
    }

    /// Wrap `data` in a tensor of the given `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if `data.len()` is not the
    /// product of `shape`.
    pub fn tensor(&self, shape: Vec<usize>, data: Vec<f32>) -> Result<Tensor, ModelError> {
        let expected = element_count(&shape);
        if expected != data.len() {
            return Err(ModelError::ShapeMismatch {
                expected: shape,
                actual: vec![data.len()],
            });
        }
        Ok(self.track(shape, data))
    }

    /// Allocate a zero-filled tensor.
    #[cfg(test)]
    #[must_use]
    pub fn zeros(&self, shape: Vec<usize>) -> Tensor {
        let len = element_count(&shape);
        self.track(shape, vec![0.0; len])
    }

    fn track(&self, shape: Vec<usize>, data: Vec<f32>) -> Tensor {
        self.live.set(self.live.get() + 1);
        self.allocated.set(self.allocated.get() + 1);
        Tensor {
            shape,
            data,
            ledger: self.clone(),
        }
    }
}

fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// A row-major `f32` tensor whose lifetime is recorded in a
/// [`TensorLedger`].
#[derive(Debug)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
    ledger: TensorLedger,
}

impl Tensor {
    /// The tensor's shape, outermost axis first.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flat row-major element buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The ledger this tensor was allocated from. Models use it to
    /// allocate their outputs so those are tracked too.
    #[must_use]
    pub const fn ledger(&self) -> &TensorLedger {
        &self.ledger
    }

    /// Apply `f` to every element, producing a new tracked tensor of
    /// the same shape.
    #[must_use]
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        let data = self.data.iter().copied().map(f).collect();
        self.ledger.track(self.shape.clone(), data)
    }

    /// Drop a leading batch axis of size 1.
    ///
    /// Reuses the buffer; the ledger count is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if the tensor has no axes
    /// or its first axis is not 1.
    pub fn squeeze_batch(mut self) -> Result<Self, ModelError> {
        if self.shape.first() != Some(&1) {
            let mut expected = vec![1];
            expected.extend(self.shape.iter().skip(1));
            return Err(ModelError::ShapeMismatch {
                expected,
                actual: self.shape.clone(),
            });
        }
        self.shape.remove(0);
        Ok(self)
    }

    /// Release the buffer now. Dropping the tensor has the same effect.
    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for Tensor {
    fn drop(&mut self) {
        let live = &self.ledger.live;
        live.set(live.get().saturating_sub(1));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn live_count_follows_drops() {
        let ledger = TensorLedger::new();
        let a = ledger.zeros(vec![2, 3]);
        let b = a.map(|v| v + 1.0);
        assert_eq!(ledger.live(), 2);
        a.dispose();
        assert_eq!(ledger.live(), 1);
        drop(b);
        assert_eq!(ledger.live(), 0);
        assert_eq!(ledger.total_allocated(), 2);
    }

    #[test]
    fn mismatched_data_is_rejected_without_allocating() {
        let ledger = TensorLedger::new();
        let result = ledger.tensor(vec![2, 2], vec![0.0; 3]);
        assert!(matches!(result, Err(ModelError::ShapeMismatch { .. })));
        assert_eq!(ledger.total_allocated(), 0);
    }

    #[test]
    fn squeeze_batch_keeps_buffer() {
        let ledger = TensorLedger::new();
        let t = ledger.tensor(vec![1, 2, 2, 1], vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let s = t.squeeze_batch().unwrap();
        assert_eq!(s.shape(), &[2, 2, 1]);
        assert_eq!(s.data(), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(ledger.live(), 1);
    }

    #[test]
    fn squeeze_batch_rejects_real_batch() {
        let ledger = TensorLedger::new();
        let t = ledger.zeros(vec![2, 4, 4, 1]);
        let err = t.squeeze_batch().unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));
        // The rejected tensor was consumed and released.
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn map_preserves_shape() {
        let ledger = TensorLedger::new();
        let t = ledger.tensor(vec![3], vec![0.0, 0.5, 1.0]).unwrap();
        let scaled = t.map(|v| v * 255.0);
        assert_eq!(scaled.shape(), &[3]);
        assert_eq!(scaled.data(), &[0.0, 127.5, 255.0]);
    }
}
