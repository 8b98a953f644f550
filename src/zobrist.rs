use crate::board::{TILE_KINDS, Tile};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 0x123456789abcdef0;

/// Zobrist hash for board states.
///
/// Every (cell, tile kind) pair gets one random word; the hash of a state is
/// the XOR of the words for the tile in each cell. The table is drawn from a
/// fixed-seed ChaCha8 stream, so two tables for the same number of cells are
/// identical and hashes are stable between runs.
pub struct Zobrist {
    tile_hashes: Vec<[u64; TILE_KINDS]>,
}

impl Zobrist {
    pub fn new(cells: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        let tile_hashes = (0..cells)
            .map(|_| std::array::from_fn(|_| rng.next_u64()))
            .collect();
        Zobrist { tile_hashes }
    }

    pub fn cells(&self) -> usize {
        self.tile_hashes.len()
    }

    /// Get hash value for a tile in a specific cell
    pub fn tile_hash(&self, index: usize, tile: Tile) -> u64 {
        self.tile_hashes[index][tile.kind()]
    }

    /// Compute the hash of a full tile sequence
    pub fn compute_hash(&self, tiles: &[Tile]) -> u64 {
        debug_assert_eq!(tiles.len(), self.cells());
        tiles
            .iter()
            .enumerate()
            .fold(0u64, |hash, (index, &tile)| hash ^ self.tile_hash(index, tile))
    }

    /// Hash after replacing the tile in one cell.
    pub fn update(&self, hash: u64, index: usize, old: Tile, new: Tile) -> u64 {
        hash ^ self.tile_hash(index, old) ^ self.tile_hash(index, new)
    }
}
