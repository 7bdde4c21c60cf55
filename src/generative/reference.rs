//! Small reference networks implementing the collaborator traits
//!
//! Real architectures live outside this crate. These closed-form networks
//! have exact hand-written derivatives (including the critic's second-order
//! term), which makes them suitable for smoke runs and for checking the
//! trainer's numerical invariants.

use ndarray::{Array1, Array2, Array3, Array4, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Critic, Encoder, Generator, Validity};
use crate::Tensor;

fn uniform_init(rng: &mut StdRng, len: usize, scale: f32) -> Tensor {
    let data: Vec<f32> = (0..len).map(|_| (rng.random::<f32>() * 2.0 - 1.0) * scale).collect();
    Tensor::from_vec(data, true)
}

/// Row-major copy of a batch as `(batch, features)`
fn flatten_batch(images: &Array4<f32>) -> Array2<f32> {
    let n = images.len_of(Axis(0));
    let d = images.len() / n.max(1);
    let mut flat = Array2::zeros((n, d));
    for (mut row, image) in flat.outer_iter_mut().zip(images.outer_iter()) {
        row.iter_mut().zip(image.iter()).for_each(|(out, &v)| *out = v);
    }
    flat
}

fn unflatten_batch(flat: &Array2<f32>, shape: (usize, usize, usize, usize)) -> Array4<f32> {
    let mut images = Array4::zeros(shape);
    for (mut image, row) in images.outer_iter_mut().zip(flat.outer_iter()) {
        image.iter_mut().zip(row.iter()).for_each(|(out, &v)| *out = v);
    }
    images
}

/// Per-sample gradient from the first validity scale
fn per_sample(grad_output: &Validity, n: usize) -> Array1<f32> {
    let scale = &grad_output.scales()[0];
    assert_eq!(scale.len(), n, "Critic gradient must hold one value per sample");
    scale.iter().copied().collect()
}

/// `tanh(W·r + b)` reshaped to `(channels, height, width)`
pub struct AffineGenerator {
    params: Vec<Tensor>,
    repr_dim: usize,
    image_shape: (usize, usize, usize),
}

impl AffineGenerator {
    pub fn new(repr_dim: usize, image_shape: (usize, usize, usize), seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = image_shape.0 * image_shape.1 * image_shape.2;
        let scale = 1.0 / (repr_dim.max(1) as f32).sqrt();
        let weight = uniform_init(&mut rng, out * repr_dim, scale);
        let bias = Tensor::zeros(out, true);
        Self { params: vec![weight, bias], repr_dim, image_shape }
    }

    pub fn image_shape(&self) -> (usize, usize, usize) {
        self.image_shape
    }

    fn out_dim(&self) -> usize {
        self.image_shape.0 * self.image_shape.1 * self.image_shape.2
    }

    fn activations(&self, conditioning: &Array2<f32>) -> Array2<f32> {
        assert_eq!(conditioning.ncols(), self.repr_dim, "Representation width mismatch");
        let flat = self.params[0].data();
        let repr_dim = self.repr_dim;
        let weight = Array2::from_shape_fn((self.out_dim(), repr_dim), |(i, j)| {
            flat[i * repr_dim + j]
        });
        let mut pre = conditioning.dot(&weight.t());
        pre += self.params[1].data();
        pre.mapv_inplace(f32::tanh);
        pre
    }
}

impl Generator for AffineGenerator {
    fn forward(&self, conditioning: &Array2<f32>, _epoch: usize) -> Array4<f32> {
        let n = conditioning.nrows();
        let (c, h, w) = self.image_shape;
        unflatten_batch(&self.activations(conditioning), (n, c, h, w))
    }

    fn backward(&mut self, conditioning: &Array2<f32>, _epoch: usize, grad_output: &Array4<f32>) {
        let y = self.activations(conditioning);
        let upstream = flatten_batch(grad_output);
        assert_eq!(upstream.dim(), y.dim(), "Gradient shape must match generator output");

        let d_pre = &upstream * &y.mapv(|v| 1.0 - v * v);
        let d_weight = d_pre.t().dot(conditioning);
        let d_bias = d_pre.sum_axis(Axis(0));

        self.params[0].accumulate_grad(&d_weight.iter().copied().collect());
        self.params[1].accumulate_grad(&d_bias);
    }

    fn parameters(&self) -> &[Tensor] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [Tensor] {
        &mut self.params
    }
}

/// `D(x) = a·x + ½c‖x‖² + b`, one score per sample
///
/// The quadratic term gives the critic an input-dependent gradient
/// `∇ₓD = a + c·x`, so gradient penalties are not constant.
pub struct QuadraticCritic {
    params: Vec<Tensor>,
}

impl QuadraticCritic {
    pub fn new(input_dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let scale = 1.0 / (input_dim.max(1) as f32).sqrt();
        let linear = uniform_init(&mut rng, input_dim, scale);
        Self::from_tensors(linear, 0.1, 0.0)
    }

    /// Critic with explicit coefficients
    pub fn from_parts(linear: Vec<f32>, curvature: f32, bias: f32) -> Self {
        Self::from_tensors(Tensor::from_vec(linear, true), curvature, bias)
    }

    fn from_tensors(linear: Tensor, curvature: f32, bias: f32) -> Self {
        Self {
            params: vec![
                linear,
                Tensor::from_vec(vec![curvature], true),
                Tensor::from_vec(vec![bias], true),
            ],
        }
    }

    fn linear(&self) -> &Array1<f32> {
        self.params[0].data()
    }

    fn curvature(&self) -> f32 {
        self.params[1].data()[0]
    }

    fn bias(&self) -> f32 {
        self.params[2].data()[0]
    }
}

impl Critic for QuadraticCritic {
    fn forward(&self, images: &Array4<f32>) -> Validity {
        let x = flatten_batch(images);
        let c = self.curvature();
        let scores: Vec<f32> = x
            .outer_iter()
            .map(|row| row.dot(self.linear()) + 0.5 * c * row.dot(&row) + self.bias())
            .collect();
        Validity::Single(Array1::from(scores).insert_axis(Axis(1)).into_dyn())
    }

    fn backward(&mut self, images: &Array4<f32>, grad_output: &Validity) {
        let x = flatten_batch(images);
        let g = per_sample(grad_output, x.nrows());

        let d_linear = x.t().dot(&g);
        let d_curvature: f32 =
            x.outer_iter().zip(g.iter()).map(|(row, &gi)| gi * 0.5 * row.dot(&row)).sum();
        let d_bias = g.sum();

        self.params[0].accumulate_grad(&d_linear);
        self.params[1].accumulate_grad(&Array1::from_elem(1, d_curvature));
        self.params[2].accumulate_grad(&Array1::from_elem(1, d_bias));
    }

    fn input_gradient(&self, images: &Array4<f32>, grad_output: &Validity) -> Array4<f32> {
        let x = flatten_batch(images);
        let g = per_sample(grad_output, x.nrows());
        let c = self.curvature();

        let mut dx = x * c;
        dx += self.linear();
        for (mut row, &gi) in dx.outer_iter_mut().zip(g.iter()) {
            row *= gi;
        }
        unflatten_batch(&dx, images.dim())
    }

    fn backward_input_gradient(&mut self, images: &Array4<f32>, direction: &Array4<f32>) {
        // ⟨∇ₓΣD, v⟩ = Σ_i ⟨a + c·x_i, v_i⟩
        let x = flatten_batch(images);
        let v = flatten_batch(direction);

        let d_linear = v.sum_axis(Axis(0));
        let d_curvature: f32 = (&x * &v).sum();

        self.params[0].accumulate_grad(&d_linear);
        self.params[1].accumulate_grad(&Array1::from_elem(1, d_curvature));
    }

    fn parameters(&self) -> &[Tensor] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [Tensor] {
        &mut self.params
    }
}

/// Frozen encoder: time-average of each channel
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanPoolEncoder;

impl Encoder for MeanPoolEncoder {
    fn represent(&self, signals: &Array3<f32>) -> Array2<f32> {
        signals.mean_axis(Axis(1)).unwrap_or_else(|| {
            Array2::zeros((signals.len_of(Axis(0)), signals.len_of(Axis(2))))
        })
    }
}
