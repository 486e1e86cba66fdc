use burn::{prelude::*, tensor::BasicOps};

use crate::{
    algo::tabular::QTable,
    approx::{TileCodedQ, TileCoder},
    ds::PriorityTable,
};

/// A trait for converting learned state to tensors
///
/// Used to hand tables and weights to `burn` for inspection, plotting or further training
pub trait ToTensor<B: Backend, const D: usize, K: BasicOps<B>> {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, D, K>;
}

fn float_tensor<B: Backend, const D: usize>(
    values: &[f32],
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    Tensor::from_data(Data::new(values.to_vec(), Shape::new(shape)).convert(), device)
}

/// `[n_states, n_actions]`
impl<B: Backend> ToTensor<B, 2, Float> for &QTable {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2> {
        let (n_states, n_actions) = self.shape();
        float_tensor(self.values(), [n_states, n_actions], device)
    }
}

/// `[n_states, n_actions]`
impl<B: Backend> ToTensor<B, 2, Float> for &PriorityTable {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2> {
        let (n_states, n_actions) = self.shape();
        float_tensor(self.priorities(), [n_states, n_actions], device)
    }
}

/// `[n_tilings, tiles_per_tiling]`
impl<B: Backend> ToTensor<B, 2, Float> for &TileCoder {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2> {
        float_tensor(
            self.weights(),
            [self.n_tilings(), self.tiles_per_tiling()],
            device,
        )
    }
}

/// `[n_tilings, tiles_per_tiling, n_actions]`
impl<B: Backend> ToTensor<B, 3, Float> for &TileCodedQ {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 3> {
        float_tensor(
            self.weights(),
            [self.n_tilings(), self.tiles_per_tiling(), self.n_actions()],
            device,
        )
    }
}
