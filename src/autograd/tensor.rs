//! Parameter tensor with an attached gradient buffer

use ndarray::Array1;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Flat parameter buffer with a shared gradient cell
///
/// Clones share the gradient cell but own their data, so a network can hand
/// out cheap handles to the same gradient while the optimizer mutates values
/// in place. Gradients accumulate until [`Tensor::zero_grad`] clears them.
#[derive(Clone)]
pub struct Tensor {
    data: Array1<f32>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a tensor from raw values
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::from_array(Array1::from(data), requires_grad)
    }

    /// Create a tensor from an existing array
    pub fn from_array(data: Array1<f32>, requires_grad: bool) -> Self {
        Self { data, grad: Rc::new(RefCell::new(None)), requires_grad }
    }

    /// Create a zero-filled tensor
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::from_array(Array1::zeros(len), requires_grad)
    }

    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Snapshot of the accumulated gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add `delta` to the gradient buffer
    ///
    /// No-op for tensors that do not require gradients.
    pub fn accumulate_grad(&self, delta: &Array1<f32>) {
        if !self.requires_grad {
            return;
        }
        assert_eq!(delta.len(), self.data.len(), "Gradient length must match parameter length");
        let mut grad = self.grad.borrow_mut();
        match grad.as_mut() {
            Some(existing) => *existing += delta,
            None => *grad = Some(delta.clone()),
        }
    }

    /// Drop the accumulated gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("len", &self.data.len())
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}
