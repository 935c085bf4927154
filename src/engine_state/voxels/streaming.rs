//! # Chunk Streaming
//!
//! Keeps a square window of chunks loaded around a moving reference point.
//! Only x and z stream; every chunk lives on one fixed y layer.
//!
//! The first update generates the whole window. After that, an update in a new
//! chunk removes what fell out of range and generates only the slabs the move
//! exposed, so a step of one chunk costs `2R + 1` generations rather than
//! `(2R + 1)^2`.

use cgmath::Point3;

use super::chunk::{chunk_position_of, ChunkPosition};
use super::world::World;

/// What one streaming update changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingUpdate {
    pub generated: Vec<ChunkPosition>,
    pub removed: Vec<ChunkPosition>,
}

impl StreamingUpdate {
    pub fn is_empty(&self) -> bool {
        self.generated.is_empty() && self.removed.is_empty()
    }
}

/// Streams chunks in and out of a [`World`] around a reference position.
#[derive(Clone, Debug)]
pub struct StreamingController {
    radius: i32,
    vertical_layer: i32,
    current: Option<ChunkPosition>,
}

impl StreamingController {
    /// Negative radii are treated as 0.
    pub fn new(radius: i32, vertical_layer: i32) -> Self {
        StreamingController {
            radius: radius.max(0),
            vertical_layer,
            current: None,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn vertical_layer(&self) -> i32 {
        self.vertical_layer
    }

    /// The window center after the last update, `None` before the first.
    pub fn current_position(&self) -> Option<ChunkPosition> {
        self.current
    }

    /// Forgets the window; the next update generates it from scratch.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Re-centers the window on the chunk containing `reference`.
    pub fn update(&mut self, reference: Point3<f32>, world: &mut World) -> StreamingUpdate {
        let chunk = chunk_position_of(reference);
        let center = Point3::new(chunk.x, self.vertical_layer, chunk.z);

        let Some(previous) = self.current else {
            self.current = Some(center);
            let mut update = StreamingUpdate::default();
            self.generate_range(
                world,
                center.x - self.radius..=center.x + self.radius,
                center.z - self.radius..=center.z + self.radius,
                &mut update,
            );
            log::info!(
                "Streaming window initialized at {:?}: {} chunks requested",
                center,
                update.generated.len()
            );
            return update;
        };

        if previous == center {
            return StreamingUpdate::default();
        }
        self.current = Some(center);

        let mut update = StreamingUpdate::default();
        self.remove_out_of_range(world, center, &mut update);

        let diameter = 2 * self.radius + 1;
        let x_range = center.x - self.radius..=center.x + self.radius;
        let z_range = center.z - self.radius..=center.z + self.radius;

        let dx = center.x - previous.x;
        if dx != 0 {
            let width = dx.abs().min(diameter);
            let slab = if dx > 0 {
                center.x + self.radius - width + 1..=center.x + self.radius
            } else {
                center.x - self.radius..=center.x - self.radius + width - 1
            };
            self.generate_range(world, slab, z_range.clone(), &mut update);
        }

        let dz = center.z - previous.z;
        if dz != 0 {
            let width = dz.abs().min(diameter);
            let slab = if dz > 0 {
                center.z + self.radius - width + 1..=center.z + self.radius
            } else {
                center.z - self.radius..=center.z - self.radius + width - 1
            };
            self.generate_range(world, x_range, slab, &mut update);
        }

        log::debug!(
            "Streaming moved {:?} -> {:?}: {} generated, {} removed",
            previous,
            center,
            update.generated.len(),
            update.removed.len()
        );
        update
    }

    fn in_range(&self, center: ChunkPosition, position: ChunkPosition) -> bool {
        (position.x - center.x).abs() <= self.radius && (position.z - center.z).abs() <= self.radius
    }

    fn remove_out_of_range(&self, world: &mut World, center: ChunkPosition, update: &mut StreamingUpdate) {
        let stale: Vec<ChunkPosition> = world
            .chunk_positions()
            .filter(|&position| !self.in_range(center, position))
            .collect();
        for position in stale {
            if world.remove_chunk(position) {
                update.removed.push(position);
            }
        }

        let abandoned: Vec<ChunkPosition> = world
            .pending_generation_positions()
            .filter(|&position| !self.in_range(center, position))
            .collect();
        for position in abandoned {
            world.cancel_generation(position);
        }
    }

    fn generate_range(
        &self,
        world: &mut World,
        xs: std::ops::RangeInclusive<i32>,
        zs: std::ops::RangeInclusive<i32>,
        update: &mut StreamingUpdate,
    ) {
        for x in xs {
            for z in zs.clone() {
                let position = Point3::new(x, self.vertical_layer, z);
                if world.contains_chunk(position) || world.is_pending_generation(position) {
                    continue;
                }
                if world.generate_new_chunk(position) {
                    update.generated.push(position);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::rendering::meshing::MesherKind;
    use crate::engine_state::voxels::block::block_bank::BlockBank;
    use crate::engine_state::voxels::block::block_type::{BlockType, Color};
    use crate::engine_state::voxels::generation::StaircaseGenerator;
    use crate::engine_state::voxels::world::WorldSettings;

    fn world() -> World {
        let mut bank = BlockBank::new();
        bank.add_type(BlockType::colored(1, Color::GREEN));
        World::new(
            bank,
            Arc::new(StaircaseGenerator),
            MesherKind::Culled.build(),
            WorldSettings::default(),
        )
        .unwrap()
    }

    fn world_point(chunk_x: i32, chunk_z: i32) -> Point3<f32> {
        Point3::new(chunk_x as f32 * 16.0 + 8.0, 40.0, chunk_z as f32 * 16.0 + 8.0)
    }

    #[test]
    fn test_first_update_fills_window() {
        let mut world = world();
        let mut streaming = StreamingController::new(2, 0);

        let update = streaming.update(world_point(0, 0), &mut world);
        assert_eq!(update.generated.len(), 25);
        assert!(update.removed.is_empty());
        assert_eq!(world.chunk_count(), 25);
        assert!(world.chunk_positions().all(|p| p.y == 0));
        assert_eq!(streaming.current_position(), Some(Point3::new(0, 0, 0)));
    }

    #[test]
    fn test_staying_in_chunk_does_nothing() {
        let mut world = world();
        let mut streaming = StreamingController::new(1, 0);
        streaming.update(world_point(0, 0), &mut world);

        let update = streaming.update(Point3::new(15.0, 0.0, 0.5), &mut world);
        assert!(update.is_empty());
    }

    #[test]
    fn test_step_generates_one_slab() {
        let mut world = world();
        let mut streaming = StreamingController::new(2, 0);
        streaming.update(world_point(0, 0), &mut world);

        let update = streaming.update(world_point(1, 0), &mut world);
        assert_eq!(update.generated.len(), 5);
        assert!(update.generated.iter().all(|p| p.x == 3));
        assert_eq!(update.removed.len(), 5);
        assert!(update.removed.iter().all(|p| p.x == -2));
        assert_eq!(world.chunk_count(), 25);
    }

    #[test]
    fn test_diagonal_step_covers_corner_once() {
        let mut world = world();
        let mut streaming = StreamingController::new(2, 0);
        streaming.update(world_point(0, 0), &mut world);

        let update = streaming.update(world_point(-1, -1), &mut world);
        let unique: HashSet<_> = update.generated.iter().copied().collect();
        assert_eq!(unique.len(), update.generated.len());
        assert_eq!(update.generated.len(), 9);
        assert_eq!(world.chunk_count(), 25);
    }

    #[test]
    fn test_teleport_replaces_window() {
        let mut world = world();
        let mut streaming = StreamingController::new(1, 0);
        streaming.update(world_point(0, 0), &mut world);

        let update = streaming.update(world_point(100, -100), &mut world);
        assert_eq!(update.removed.len(), 9);
        assert_eq!(update.generated.len(), 9);
        for x in 99..=101 {
            for z in -101..=-99 {
                assert!(world.contains_chunk(Point3::new(x, 0, z)));
            }
        }
    }

    #[test]
    fn test_negative_reference_uses_floor() {
        let mut world = world();
        let mut streaming = StreamingController::new(0, 3);
        streaming.update(Point3::new(-0.5, 0.0, -16.5), &mut world);

        assert_eq!(streaming.current_position(), Some(Point3::new(-1, 3, -2)));
        assert!(world.contains_chunk(Point3::new(-1, 3, -2)));
    }

    #[test]
    fn test_never_touches_wrong_chunks_on_a_walk() {
        let mut world = world();
        let mut streaming = StreamingController::new(2, 0);
        let mut rng = fastrand::Rng::with_seed(7);
        let (mut x, mut z) = (0, 0);

        for _ in 0..60 {
            let before: HashSet<_> = world.chunk_positions().collect();
            let update = streaming.update(world_point(x, z), &mut world);

            assert!(update.generated.iter().all(|p| !before.contains(p)));
            assert!(update.removed.iter().all(|p| before.contains(p)));
            assert_eq!(world.chunk_count(), 25);

            x += rng.i32(-2..=2);
            z += rng.i32(-2..=2);
        }
    }

    #[test]
    fn test_reset_regenerates_missing_chunks_only() {
        let mut world = world();
        let mut streaming = StreamingController::new(1, 0);
        streaming.update(world_point(0, 0), &mut world);
        world.remove_chunk(Point3::new(1, 0, 1));

        streaming.reset();
        let update = streaming.update(world_point(0, 0), &mut world);
        assert_eq!(update.generated, vec![Point3::new(1, 0, 1)]);
    }
}
