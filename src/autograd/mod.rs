//! Parameter storage for hand-differentiated networks
//!
//! Networks in this crate derive their gradients analytically and push them
//! into [`Tensor`] gradient cells; optimizers then read and clear those cells.

mod tensor;

pub use tensor::Tensor;
