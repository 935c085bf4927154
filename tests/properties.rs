use proptest::prelude::*;
use voxel_world::{
    Block, BlockBank, BlockSide, BlockType, Chunk, Color, CulledMesher, Mesher, NoNeighbors,
    StupidMesher,
};

fn bank() -> BlockBank {
    let mut bank = BlockBank::new();
    bank.add_type(BlockType::colored(1, Color::TEAL));
    bank
}

fn chunk_from(cells: &[(i32, i32, i32)]) -> Chunk {
    let mut chunk = Chunk::new(cgmath::Point3::new(0, 0, 0));
    for &(x, y, z) in cells {
        chunk.set(x, y, z, Block::new(1, true));
    }
    chunk
}

fn exposed_faces(chunk: &Chunk) -> usize {
    chunk
        .iter_active()
        .map(|(position, _)| {
            BlockSide::all()
                .iter()
                .filter(|side| {
                    let offset = side.offset();
                    !chunk
                        .get(
                            position.x as i32 + offset.x,
                            position.y as i32 + offset.y,
                            position.z as i32 + offset.z,
                        )
                        .active()
                })
                .count()
        })
        .sum()
}

proptest! {
    #[test]
    fn test_out_of_range_reads_are_nil(x in -64i32..64, y in -64i32..64, z in -64i32..64) {
        let mut chunk = Chunk::new(cgmath::Point3::new(0, 0, 0));
        chunk.blocks_mut().fill(Block::new(1, true));

        let inside = Chunk::in_bounds(x, y, z);
        prop_assert_eq!(chunk.get(x, y, z).active(), inside);
        prop_assert_eq!(chunk.set(x, y, z, Block::NIL), inside);
    }

    #[test]
    fn test_index_matches_layout(x in 0usize..16, y in 0usize..16, z in 0usize..16) {
        let mut chunk = Chunk::new(cgmath::Point3::new(0, 0, 0));
        chunk.set(x as i32, y as i32, z as i32, Block::new(5, true));

        prop_assert_eq!(Chunk::index_at(x, y, z), x + z * 16 + y * 256);
        prop_assert_eq!(chunk.blocks()[Chunk::index_at(x, y, z)].type_id(), 5);
        prop_assert_eq!(chunk.active_count(), 1);
    }

    #[test]
    fn test_block_packing(type_id in any::<u8>(), active in any::<bool>()) {
        let block = Block::new(type_id, active);
        prop_assert_eq!(block.type_id(), type_id & 0x7F);
        prop_assert_eq!(block.active(), active);
        prop_assert_eq!(Block::from_bits(block.bits()), block);

        let toggled = block.activate(true);
        prop_assert!(toggled.active());
        prop_assert_eq!(toggled.type_id(), block.type_id());
        prop_assert!(block.activate(false).is_nil());
    }

    #[test]
    fn test_culled_faces_match_exposure(
        cells in proptest::collection::vec((0i32..16, 0i32..16, 0i32..16), 0..96)
    ) {
        let chunk = chunk_from(&cells);
        let mesh = CulledMesher::new().generate(&chunk, &NoNeighbors, &bank());

        match mesh {
            None => prop_assert_eq!(exposed_faces(&chunk), 0),
            Some(mesh) => {
                prop_assert_eq!(mesh.face_count(), exposed_faces(&chunk));
                prop_assert_eq!(mesh.vertex_count(), mesh.face_count() * 4);
                prop_assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
            }
        }
    }

    #[test]
    fn test_stupid_mesh_size(
        cells in proptest::collection::vec((0i32..16, 0i32..16, 0i32..16), 1..48)
    ) {
        let chunk = chunk_from(&cells);
        let mesh = StupidMesher::new().generate(&chunk, &NoNeighbors, &bank()).unwrap();

        prop_assert_eq!(mesh.vertex_count(), chunk.active_count() * 8);
        prop_assert_eq!(mesh.indices.len(), chunk.active_count() * 36);
    }
}
