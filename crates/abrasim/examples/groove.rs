//! Single straight lapping pass: cuts a groove and prints its profile.

use abrasim::{LinearPath, Material, Round, SimulationBuilder, SurfaceDomain, WorkpieceSurface};

fn main() {
    let domain = SurfaceDomain::centered(30.0, 20.0, 0.25).unwrap();
    let surface = WorkpieceSurface::flat(domain);

    // 5 mm radius pad dragged 16 mm across the plate under 10 N.
    let mut engine = SimulationBuilder::new()
        .surface(surface)
        .tool(Round::new(5.0).unwrap())
        .trajectory(LinearPath::new([-8.0, 0.0], [8.0, 0.0], 2.0).unwrap())
        .material(Material::new(1.0e-3))
        .load(10.0)
        .duration(2.0, 0.05)
        .build()
        .unwrap();

    let summary = engine.run().unwrap();
    let surface = engine.surface();

    println!("steps:    {}", summary.steps);
    println!("volume:   {:.4e}", summary.cumulative_volume);
    println!("deepest:  {:.4e}", -surface.min_height());

    // Cross-section through the groove at x = 0.
    let mid_x = surface.domain().nx() / 2;
    println!("profile at x = 0:");
    for iy in (0..surface.domain().ny()).step_by(4) {
        let (_, y) = surface.domain().xy_at(mid_x, iy);
        let h = surface.height_at(mid_x, iy);
        println!("  y = {y:6.2}   h = {h:10.3e}");
    }
}
