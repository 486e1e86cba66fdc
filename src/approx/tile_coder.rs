use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    util,
};

use super::Tiling;

/// Configuration for a [`TileCoder`] or [`TileCodedQ`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileCoderConfig {
    /// Lower bound of the domain in every dimension
    pub low: Vec<f32>,
    /// Upper bound of the domain in every dimension
    pub high: Vec<f32>,
    /// Bins per dimension, shared by every tiling
    pub n_bins: usize,
    /// Displacement of each tiling, one vector of length `n_dims` per tiling
    pub offsets: Vec<Vec<f32>>,
}

impl TileCoderConfig {
    /// `n_tilings` tilings displaced from each other by an equal fraction of a bin width
    ///
    /// Tiling `i` is shifted by `i / n_tilings` of a bin in every dimension, so the first tiling
    /// is aligned with `low`.
    pub fn uniform(low: Vec<f32>, high: Vec<f32>, n_bins: usize, n_tilings: usize) -> Self {
        let offsets = (0..n_tilings)
            .map(|i| {
                low.iter()
                    .zip(&high)
                    .map(|(&lo, &hi)| (hi - lo) / n_bins.max(1) as f32 * i as f32 / n_tilings as f32)
                    .collect()
            })
            .collect();
        Self {
            low,
            high,
            n_bins,
            offsets,
        }
    }

    fn build(&self) -> Result<Tilings> {
        if self.offsets.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "a tile coder needs at least one tiling".into(),
            });
        }
        let tilings = self
            .offsets
            .iter()
            .map(|offset| Tiling::new(&self.low, &self.high, offset, self.n_bins))
            .collect::<Result<Vec<_>>>()?;
        let tiles_per_tiling = tilings[0].n_tiles();
        let tilings = Tilings {
            tilings,
            tiles_per_tiling,
        };
        tilings.n_weights(1)?;
        Ok(tilings)
    }
}

/// A stack of equally shaped tilings over the same domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TilingsData")]
struct Tilings {
    tilings: Vec<Tiling>,
    tiles_per_tiling: usize,
}

#[derive(Deserialize)]
struct TilingsData {
    tilings: Vec<Tiling>,
    tiles_per_tiling: usize,
}

impl TryFrom<TilingsData> for Tilings {
    type Error = Error;

    fn try_from(data: TilingsData) -> Result<Self> {
        let Some(first) = data.tilings.first() else {
            return Err(Error::Inconsistent {
                what: "tile coder",
                message: "no tilings".into(),
            });
        };
        let n_dims = first.n_dims();
        if data
            .tilings
            .iter()
            .any(|t| t.n_dims() != n_dims || t.n_tiles() != data.tiles_per_tiling)
        {
            return Err(Error::Inconsistent {
                what: "tile coder",
                message: format!(
                    "tilings do not all have {n_dims} dimensions and {} tiles",
                    data.tiles_per_tiling
                ),
            });
        }
        let tilings = Self {
            tilings: data.tilings,
            tiles_per_tiling: data.tiles_per_tiling,
        };
        tilings.n_weights(1)?;
        Ok(tilings)
    }
}

impl Tilings {
    /// Global index `t * tiles_per_tiling + tile` of the tile containing `point`, for each tiling `t`
    fn active<'a>(&'a self, point: &'a [f32]) -> impl Iterator<Item = usize> + 'a {
        self.tilings
            .iter()
            .enumerate()
            .map(move |(t, tiling)| t * self.tiles_per_tiling + tiling.locate(point))
    }

    fn len(&self) -> usize {
        self.tilings.len()
    }

    /// Number of weights needed to store `per_tile` values in every tile
    fn n_weights(&self, per_tile: usize) -> Result<usize> {
        self.len()
            .checked_mul(self.tiles_per_tiling)
            .and_then(|n| n.checked_mul(per_tile))
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!(
                    "{} tilings of {} tiles with {per_tile} values each overflow the weight table",
                    self.len(),
                    self.tiles_per_tiling
                ),
            })
    }

    fn check_weights(&self, per_tile: usize, len: usize) -> Result<()> {
        let expected = self.n_weights(per_tile)?;
        if expected == len {
            Ok(())
        } else {
            Err(Error::Inconsistent {
                what: "tile coder",
                message: format!("{len} weights, expected {expected}"),
            })
        }
    }
}

/// Additive tile-coding approximation of a state-value function over a bounded continuous domain
///
/// Every tiling contributes the weight of the one tile containing a point, so a read costs one
/// lookup per tiling and nearby points that share tiles share what is learned about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TileCoderData")]
pub struct TileCoder {
    tilings: Tilings,
    weights: Vec<f32>,
}

#[derive(Deserialize)]
struct TileCoderData {
    tilings: Tilings,
    weights: Vec<f32>,
}

impl TryFrom<TileCoderData> for TileCoder {
    type Error = Error;

    fn try_from(data: TileCoderData) -> Result<Self> {
        data.tilings.check_weights(1, data.weights.len())?;
        Ok(Self {
            tilings: data.tilings,
            weights: data.weights,
        })
    }
}

impl TileCoder {
    /// Build the tilings described by `config` with every weight zero
    pub fn new(config: &TileCoderConfig) -> Result<Self> {
        let tilings = config.build()?;
        let weights = vec![0.0; tilings.n_weights(1)?];
        Ok(Self { tilings, weights })
    }

    pub fn n_tilings(&self) -> usize {
        self.tilings.len()
    }

    pub fn tiles_per_tiling(&self) -> usize {
        self.tilings.tiles_per_tiling
    }

    /// Weights laid out as `[tiling][tile]`
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Sum of the weights of the tiles containing `point`, one per tiling
    pub fn read(&self, point: &[f32]) -> f32 {
        self.tilings.active(point).map(|ix| self.weights[ix]).sum()
    }

    /// Shift the tiles containing `point` so that `read(point)` becomes `value`
    ///
    /// The required change is split equally across the tilings.
    pub fn write(&mut self, point: &[f32], value: f32) {
        let delta = (value - self.read(point)) / self.n_tilings() as f32;
        for ix in self.tilings.active(point) {
            self.weights[ix] += delta;
        }
    }
}

/// Tile-coded action-value function, with one weight per action in every tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TileCodedQData")]
pub struct TileCodedQ {
    tilings: Tilings,
    n_actions: usize,
    weights: Vec<f32>,
}

#[derive(Deserialize)]
struct TileCodedQData {
    tilings: Tilings,
    n_actions: usize,
    weights: Vec<f32>,
}

impl TryFrom<TileCodedQData> for TileCodedQ {
    type Error = Error;

    fn try_from(data: TileCodedQData) -> Result<Self> {
        if data.n_actions == 0 {
            return Err(Error::Inconsistent {
                what: "tile coder",
                message: "no actions".into(),
            });
        }
        data.tilings.check_weights(data.n_actions, data.weights.len())?;
        Ok(Self {
            tilings: data.tilings,
            n_actions: data.n_actions,
            weights: data.weights,
        })
    }
}

impl TileCodedQ {
    /// Build the tilings described by `config` with every weight zero
    pub fn new(config: &TileCoderConfig, n_actions: usize) -> Result<Self> {
        if n_actions == 0 {
            return Err(Error::InvalidConfiguration {
                message: "an action-value tile coder needs at least one action".into(),
            });
        }
        let tilings = config.build()?;
        let weights = vec![0.0; tilings.n_weights(n_actions)?];
        Ok(Self {
            tilings,
            n_actions,
            weights,
        })
    }

    pub fn n_tilings(&self) -> usize {
        self.tilings.len()
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn tiles_per_tiling(&self) -> usize {
        self.tilings.tiles_per_tiling
    }

    /// Weights laid out as `[tiling][tile][action]`
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    fn check_action(&self, action: usize) {
        assert!(
            action < self.n_actions,
            "action {action} out of range for {} actions",
            self.n_actions
        );
    }

    /// Estimated value of taking `action` at `point`
    pub fn read(&self, point: &[f32], action: usize) -> f32 {
        self.check_action(action);
        self.tilings
            .active(point)
            .map(|ix| self.weights[ix * self.n_actions + action])
            .sum()
    }

    /// Shift the tiles containing `point` so that `read(point, action)` becomes `value`
    pub fn write(&mut self, point: &[f32], action: usize, value: f32) {
        let delta = (value - self.read(point, action)) / self.n_tilings() as f32;
        for ix in self.tilings.active(point) {
            self.weights[ix * self.n_actions + action] += delta;
        }
    }

    /// Estimated value of every action at `point`
    pub fn action_values(&self, point: &[f32]) -> Vec<f32> {
        let mut values = vec![0.0; self.n_actions];
        for ix in self.tilings.active(point) {
            let tile = &self.weights[ix * self.n_actions..(ix + 1) * self.n_actions];
            for (v, w) in values.iter_mut().zip(tile) {
                *v += w;
            }
        }
        values
    }

    /// Action with the highest estimated value at `point`, ties broken uniformly at random
    pub fn argmax_action<R: Rng + ?Sized>(&self, point: &[f32], rng: &mut R) -> usize {
        util::argmax(&self.action_values(point), rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::util::tests::assert_close;

    fn two_tilings() -> TileCoderConfig {
        TileCoderConfig {
            low: vec![0.0],
            high: vec![1.0],
            n_bins: 2,
            offsets: vec![vec![0.0], vec![0.25]],
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut rng = StdRng::seed_from_u64(11);
        for n_tilings in 1..5 {
            for n_bins in 1..6 {
                let config =
                    TileCoderConfig::uniform(vec![-1.0, 0.0], vec![1.0, 10.0], n_bins, n_tilings);
                let mut coder = TileCoder::new(&config).unwrap();
                for _ in 0..20 {
                    let point: [f32; 2] = [rng.gen_range(-1.0..=1.0), rng.gen_range(0.0..=10.0)];
                    let value: f32 = rng.gen_range(-5.0..5.0);
                    coder.write(&point, value);
                    assert_close(coder.read(&point), value, "read returns the written value");
                }
            }
        }
    }

    #[test]
    fn writes_generalize_by_shared_tiles() {
        let mut coder = TileCoder::new(&two_tilings()).unwrap();
        // edges: tiling 0 at 0.5, tiling 1 at 0.75
        let p = [0.1];
        let q = [0.6]; // shares tiling 1 only
        let r = [0.9]; // shares nothing

        coder.write(&p, 1.0);
        assert_close(coder.read(&p), 1.0, "written point");
        assert_close(coder.read(&q), 0.5, "one of two tiles shared");
        assert_close(coder.read(&r), 0.0, "no tiles shared");
    }

    #[test]
    fn reads_start_at_zero() {
        let coder = TileCoder::new(&TileCoderConfig::uniform(vec![0.0], vec![1.0], 4, 3)).unwrap();
        assert_eq!(coder.n_tilings(), 3);
        assert_eq!(coder.tiles_per_tiling(), 4);
        assert_eq!(coder.read(&[0.3]), 0.0);
    }

    #[test]
    fn uniform_offsets_spread_over_one_bin() {
        let config = TileCoderConfig::uniform(vec![0.0, 0.0], vec![1.0, 2.0], 4, 4);
        assert_eq!(config.offsets.len(), 4);
        assert_eq!(config.offsets[0], [0.0, 0.0]);
        assert_eq!(config.offsets[2], [0.125, 0.25]);
    }

    #[test]
    fn out_of_bounds_points_still_round_trip() {
        let mut coder = TileCoder::new(&two_tilings()).unwrap();
        coder.write(&[-3.0], 2.0);
        assert_close(coder.read(&[-3.0]), 2.0, "clamped into the edge tiles");
        assert_close(coder.read(&[0.0]), 2.0, "shares both edge tiles");
    }

    #[test]
    fn action_values_are_independent() {
        let mut q = TileCodedQ::new(&two_tilings(), 3).unwrap();
        q.write(&[0.1], 2, 4.0);
        assert_close(q.read(&[0.1], 2), 4.0, "written action");
        assert_eq!(q.read(&[0.1], 0), 0.0, "other actions untouched");
        assert_eq!(q.action_values(&[0.1]), [0.0, 0.0, 4.0]);
        assert_close(q.read(&[0.6], 2), 2.0, "generalizes within the action");

        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(q.argmax_action(&[0.1], &mut rng), 2);
    }

    #[test]
    fn argmax_action_breaks_ties_randomly() {
        let q = TileCodedQ::new(&two_tilings(), 3).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = [false; 3];
        for _ in 0..100 {
            seen[q.argmax_action(&[0.4], &mut rng)] = true;
        }
        assert_eq!(seen, [true; 3], "all-zero values tie across every action");
    }

    #[test]
    fn tile_coder_rejects_empty_config() {
        let config = TileCoderConfig {
            offsets: vec![],
            ..two_tilings()
        };
        assert!(TileCoder::new(&config).is_err());
        assert!(TileCodedQ::new(&two_tilings(), 0).is_err());
    }

    #[test]
    fn oversized_configs_are_errors() {
        let config = TileCoderConfig::uniform(vec![0.0; 16], vec![1.0; 16], 64, 2);
        assert!(matches!(
            TileCoder::new(&config),
            Err(Error::InvalidConfiguration { .. })
        ));

        // 2^48 tiles per tiling fit in usize, 2^64 weights do not
        let config = TileCoderConfig::uniform(vec![0.0; 48], vec![1.0; 48], 2, 1 << 8);
        assert!(matches!(
            TileCodedQ::new(&config, 1 << 8),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "coordinates")]
    fn read_rejects_wrong_dimension() {
        TileCoder::new(&two_tilings()).unwrap().read(&[0.1, 0.2]);
    }
}
