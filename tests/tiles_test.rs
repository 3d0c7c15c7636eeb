// Tile addressing: Hilbert curve and packed tile coordinates
use std::cmp::Reverse;

use tile_geometry::tiles::{index_to_xy, xy_to_index, TileCoord, MAX_ZOOM};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hilbert_round_trip_levels_1_to_10() {
        for level in 1..=10u32 {
            let cells = 1u64 << (2 * level);
            let step = (cells / 4096).max(1);
            let mut i = 0;
            while i < cells {
                let (x, y) = index_to_xy(level, i).unwrap();
                assert!(x < 1 << level && y < 1 << level);
                assert_eq!(xy_to_index(level, x, y).unwrap(), i, "level {} index {}", level, i);
                i += step;
            }
        }
    }

    #[test]
    fn test_tile_order_matches_zoom_x_descending_y() {
        let mut tiles = Vec::new();
        for z in [0, 1, 3, 7, 8, 12, MAX_ZOOM] {
            let max = (1u32 << z) - 1;
            for (x, y) in [(0, 0), (max, max), (max / 2, 0), (0, max / 3), (max / 3, max / 2)] {
                tiles.push(TileCoord::of_xyz(x, y, z).unwrap());
            }
        }
        tiles.dedup();

        let mut by_ord = tiles.clone();
        by_ord.sort();
        let mut by_key = tiles.clone();
        by_key.sort_by_key(|t| (t.z(), t.x(), Reverse(t.y())));
        assert_eq!(by_ord, by_key);

        let mut by_encoded = tiles;
        by_encoded.sort_by_key(|t| t.encoded());
        assert_eq!(by_encoded, by_key);
    }

    #[test]
    fn test_tile_round_trips() {
        for z in 0..=MAX_ZOOM {
            let max = (1u32 << z) - 1;
            for (x, y) in [(0, 0), (max, 0), (max / 5, max / 7), (max, max)] {
                let tile = TileCoord::of_xyz(x, y, z).unwrap();
                assert_eq!(TileCoord::decode(tile.encoded()).unwrap(), tile);
                assert_eq!(TileCoord::decode_hilbert(tile.hilbert_encoded()).unwrap(), tile);
                assert_eq!(tile.to_string().parse::<TileCoord>().unwrap(), tile);
            }
        }
    }

    #[test]
    fn test_hilbert_ids_are_dense() {
        // every id below the zoom-3 total maps to a distinct tile
        let total = (1..=3).map(|z| 1u64 << (2 * z)).sum::<u64>() + 1;
        let mut seen = std::collections::HashSet::new();
        for id in 0..total {
            let tile = TileCoord::decode_hilbert(id).unwrap();
            assert_eq!(tile.hilbert_encoded(), id);
            assert!(seen.insert(tile));
        }
    }

    #[test]
    fn test_archive_stream() {
        let tiles: Vec<TileCoord> = vec![
            TileCoord::of_xyz(0, 0, 0).unwrap(),
            TileCoord::of_xyz(100, 2000, 12).unwrap(),
            TileCoord::of_xyz(1, 1, 1).unwrap(),
        ];
        let mut bytes = Vec::new();
        for tile in &tiles {
            tile.write_to(&mut bytes).unwrap();
        }
        assert_eq!(bytes.len(), 12);

        let mut reader = bytes.as_slice();
        let read: Vec<TileCoord> = (0..3).map(|_| TileCoord::read_from(&mut reader).unwrap()).collect();
        assert_eq!(read, tiles);
        assert!(TileCoord::read_from(&mut reader).is_err());
    }
}
