use std::collections::HashSet;

use cgmath::Point3;
use voxel_world::{
    sandbox_bank, EngineConfig, EngineState, GeneratorConfig, HeadlessRenderer, MesherKind,
};

fn config(worker_threads: usize) -> EngineConfig {
    EngineConfig {
        streaming_radius: 3,
        worker_threads,
        max_uploads_per_frame: 8,
        generator: GeneratorConfig::Flat,
        mesher: MesherKind::Culled,
        ..EngineConfig::default()
    }
}

fn settle(engine: &mut EngineState<HeadlessRenderer>, reference: Point3<f32>) {
    for _ in 0..10_000 {
        engine.tick(reference);
        if engine.world().is_idle() {
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    panic!("engine never settled: {:?}", engine.world().stats());
}

fn window(center_x: i32, center_z: i32, radius: i32) -> HashSet<Point3<i32>> {
    (center_x - radius..=center_x + radius)
        .flat_map(|x| (center_z - radius..=center_z + radius).map(move |z| Point3::new(x, 0, z)))
        .collect()
}

#[test]
fn test_window_follows_viewpoint() {
    for worker_threads in [0, 3] {
        let mut engine =
            EngineState::new(sandbox_bank(), &config(worker_threads), HeadlessRenderer::new())
                .unwrap();

        let path = [(0, 0), (1, 0), (2, 1), (-5, 4), (-5, 4), (10, -10)];
        for (x, z) in path {
            let reference = Point3::new(x as f32 * 16.0 + 3.0, 50.0, z as f32 * 16.0 + 3.0);
            settle(&mut engine, reference);

            let loaded: HashSet<_> = engine.world().chunk_positions().collect();
            assert_eq!(loaded, window(x, z, 3));
            let renderable: HashSet<_> = engine.world().renderable_positions().collect();
            assert_eq!(renderable, loaded);
            assert_eq!(engine.renderer().live_count(), loaded.len());
        }

        let renderer = engine.into_renderer();
        assert_eq!(renderer.live_count(), 0);
    }
}

#[test]
fn test_quick_moves_never_leak_meshes() {
    let mut engine =
        EngineState::new(sandbox_bank(), &config(2), HeadlessRenderer::new()).unwrap();

    // Move every frame so generations are routinely abandoned mid-flight.
    for frame in 0..40 {
        let x = (frame % 7) as f32 * 16.0 * 3.0;
        engine.tick(Point3::new(x, 0.0, frame as f32 * 8.0));
    }
    let last = Point3::new(0.0, 0.0, 0.0);
    settle(&mut engine, last);

    assert_eq!(engine.world().chunk_count(), 49);
    assert_eq!(engine.renderer().live_count(), 49);
    let live_positions: HashSet<_> = engine.world().renderable_positions().collect();
    assert_eq!(live_positions, window(0, 0, 3));
}
