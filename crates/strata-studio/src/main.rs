use std::rc::Rc;

use strata_engine::cache::{ContextOf, GeometryCache};
use strata_engine::device::{CanvasLease, DeviceCanvas, DeviceInit, GpuDevice, HostDevice, WgpuDevice};
use strata_engine::geometry::MeshData;
use strata_engine::logging::{LoggingConfig, init_logging};
use strata_engine::memory::RetryScope;
use strata_engine::render::{BindState, ResolvedGeometry};

/// Device budget for the demo: large enough for the scene, small enough that
/// the extra churn geometry forces evictions.
const DEMO_BUDGET: u64 = 4 * 1024;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let init = DeviceInit {
        memory_budget: Some(DEMO_BUDGET),
        ..DeviceInit::default()
    };
    match pollster::block_on(WgpuDevice::new_headless(init)) {
        Ok(device) => {
            log::info!("running on wgpu device");
            run(Rc::new(device))
        }
        Err(err) => {
            log::warn!("no wgpu adapter ({err:#}); falling back to host device");
            run(Rc::new(HostDevice::with_budget(DEMO_BUDGET)))
        }
    }
}

fn run<D: GpuDevice>(device: Rc<D>) -> anyhow::Result<()> {
    let lease = CanvasLease::new();
    let canvas = DeviceCanvas::new(lease.presence(), Rc::clone(&device));

    let mut cache = GeometryCache::default();
    let mut ctx = ContextOf::<DeviceCanvas<D>>::new();
    let mut scope = RetryScope::default();

    cache.activate_canvas(&mut ctx, canvas.clone());

    // Composite mesh: one vertex package shared by index-only parts.
    let grid = grid_vertices(8);
    cache.create(&ctx, Some("hull"), &grid, &mut scope)?;
    cache.create(&ctx, Some("hull/outline"), &part_indices(0, 8, "line_strip"), &mut scope)?;
    cache.create(&ctx, Some("hull/panel"), &part_indices(8, 24, "triangles"), &mut scope)?;
    let loose = cache.create(&ctx, None, &standalone_triangle(), &mut scope)?;

    let mut bind = BindState::new();
    for frame in 0..3 {
        cache.tick();
        cache.begin_traversal(&mut ctx);
        cache.activate_canvas(&mut ctx, canvas.clone());
        log::info!("traversal {frame} at {}", cache.now());

        let mut binder = |view: &ResolvedGeometry<D::Buffer>| {
            let changes = bind.update(view);
            log::info!(
                "draw {:?} as {:?} (vertex from {:?}, rebound {:?})",
                view.key(),
                view.primitive(),
                view.vertex_source().unwrap_or(view.key()),
                changes,
            );
        };

        cache.push(&mut ctx, "hull", &mut binder)?;
        cache.push(&mut ctx, "hull/outline", &mut binder)?;
        cache.pop(&mut ctx);
        cache.push(&mut ctx, "hull/panel", &mut binder)?;
        cache.pop(&mut ctx);
        cache.pop(&mut ctx);

        // The loose triangle is only drawn on the first frame and ages out.
        if frame == 0 {
            cache.push(&mut ctx, &loose, &mut binder)?;
            cache.pop(&mut ctx);
        }
        cache.deactivate_canvas(&mut ctx);
    }

    cache.activate_canvas(&mut ctx, canvas.clone());
    log::info!("before churn: {:?}", cache.stats());

    // Fill the budget; the retry scope evicts the least recently used geometry.
    for _ in 0..16 {
        cache.tick();
        cache.create(&ctx, None, &grid_vertices(6), &mut scope)?;
    }
    log::info!(
        "after churn: {:?}, {loose:?} evicted: {}, hull live: {}",
        cache.stats(),
        cache.was_evicted(&ctx, &loose),
        cache.exists(&ctx, "hull"),
    );

    while cache.try_evict_one() {}
    log::info!("after draining: {:?}", cache.stats());

    cache.reset(&mut ctx);
    Ok(())
}

/// `n` x `n` grid of positions, normals and UVs in the unit square.
fn grid_vertices(n: u32) -> MeshData {
    let step = 1.0 / (n - 1) as f32;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uv = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let (u, v) = (x as f32 * step, y as f32 * step);
            positions.extend_from_slice(&[u, v, 0.0]);
            normals.extend_from_slice(&[0.0, 0.0, 1.0]);
            uv.extend_from_slice(&[u, v]);
        }
    }
    MeshData::new()
        .with_primitive("triangles")
        .with_positions(positions)
        .with_normals(normals)
        .with_uv(uv)
}

/// Index-only part referencing vertices `first..first + count`.
fn part_indices(first: u32, count: u32, primitive: &str) -> MeshData {
    MeshData::new()
        .with_primitive(primitive)
        .with_indices((first..first + count).collect())
}

fn standalone_triangle() -> MeshData {
    MeshData::new()
        .with_primitive("triangles")
        .with_positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        .with_indices(vec![0, 1, 2])
}
