use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One grid partition of a bounded continuous domain
///
/// Each dimension `d` is split into `n_bins` bins by `n_bins - 1` interior edges spaced evenly
/// over `[low[d], high[d]]` and shifted by `offset[d]`. A value is assigned the bin whose index
/// is its insertion point among the sorted edges, so a value lying exactly on an edge belongs to
/// the upper bin. Values beyond the outermost edges fall in the first or last bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TilingData")]
pub struct Tiling {
    edges: Vec<Vec<f32>>,
    n_bins: usize,
}

impl Tiling {
    pub fn new(low: &[f32], high: &[f32], offset: &[f32], n_bins: usize) -> Result<Self> {
        check_len("high bound", low.len(), high.len())?;
        check_len("tiling offset", low.len(), offset.len())?;
        if n_bins == 0 {
            return Err(Error::InvalidConfiguration {
                message: "tilings need at least one bin per dimension".into(),
            });
        }

        let edges = low
            .iter()
            .zip(high)
            .zip(offset)
            .enumerate()
            .map(|(dim, ((&lo, &hi), &off))| {
                if !(lo < hi) {
                    return Err(Error::InvalidBounds { dim, low: lo, high: hi });
                }
                let width = (hi - lo) / n_bins as f32;
                Ok((1..n_bins).map(|k| lo + width * k as f32 + off).collect())
            })
            .collect::<Result<Vec<Vec<f32>>>>()?;

        let tiling = Self { edges, n_bins };
        tiling.checked_n_tiles()?;
        Ok(tiling)
    }

    fn checked_n_tiles(&self) -> Result<usize> {
        u32::try_from(self.n_dims())
            .ok()
            .and_then(|dims| self.n_bins.checked_pow(dims))
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!(
                    "{} bins over {} dimensions is too many tiles",
                    self.n_bins,
                    self.n_dims()
                ),
            })
    }

    /// Number of dimensions of the domain
    pub fn n_dims(&self) -> usize {
        self.edges.len()
    }

    /// Number of tiles, `n_bins ^ n_dims`
    pub fn n_tiles(&self) -> usize {
        self.n_bins.pow(self.n_dims() as u32)
    }

    /// Bin of a single coordinate along dimension `dim`
    pub fn bin(&self, dim: usize, value: f32) -> usize {
        self.edges[dim].partition_point(|&edge| edge <= value)
    }

    /// Row-major index of the tile containing `point`
    ///
    /// **Panics** if `point` does not have `n_dims` coordinates
    pub fn locate(&self, point: &[f32]) -> usize {
        assert_eq!(
            point.len(),
            self.n_dims(),
            "point has {} coordinates, tiling has {} dimensions",
            point.len(),
            self.n_dims()
        );
        point
            .iter()
            .enumerate()
            .fold(0, |ix, (dim, &x)| ix * self.n_bins + self.bin(dim, x))
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            what,
            expected,
            got,
        })
    }
}

#[derive(Deserialize)]
struct TilingData {
    edges: Vec<Vec<f32>>,
    n_bins: usize,
}

impl TryFrom<TilingData> for Tiling {
    type Error = Error;

    fn try_from(data: TilingData) -> Result<Self> {
        let inconsistent = |message: String| Error::Inconsistent {
            what: "tiling",
            message,
        };
        if data.n_bins == 0 {
            return Err(inconsistent("no bins".into()));
        }
        for (dim, edges) in data.edges.iter().enumerate() {
            if edges.len() != data.n_bins - 1 {
                return Err(inconsistent(format!(
                    "{} edges in dimension {dim} for {} bins",
                    edges.len(),
                    data.n_bins
                )));
            }
            if edges.windows(2).any(|w| !(w[0] < w[1])) {
                return Err(inconsistent(format!("edges in dimension {dim} are not sorted")));
            }
        }
        let tiling = Self {
            edges: data.edges,
            n_bins: data.n_bins,
        };
        tiling.checked_n_tiles()?;
        Ok(tiling)
    }
}
