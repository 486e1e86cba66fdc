mod tile_coder;
mod tiling;

pub use tile_coder::{TileCodedQ, TileCoder, TileCoderConfig};
pub use tiling::Tiling;
