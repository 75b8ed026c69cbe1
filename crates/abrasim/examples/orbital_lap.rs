//! Orbital lapping with a crowned pad on an elastic backing.
//!
//! The pad dithers along X while the orbital head spins it, and the load
//! ramps up over the run. The crowned face concentrates pressure at the
//! centre, so the cut is deepest there.

use abrasim::{
    ElasticFoundation, LoadProfile, Material, OscillatingPath, Round, SimulationBuilder, Spindle,
    SurfaceDomain, WorkpieceSurface,
};

fn main() {
    // 200 mm square plate at 2 mm resolution, dimensions in metres.
    let domain = SurfaceDomain::centered(0.2, 0.2, 0.002).unwrap();
    let surface = WorkpieceSurface::flat(domain);

    // 80 mm radius pad with a gentle crown, dithering 20 mm either way.
    let pad = Round::new(0.08).unwrap().with_crown(0.05, 0.05).unwrap();
    let path = OscillatingPath::new([0.0, 0.0], [0.02, 0.0], 1.0, 30.0)
        .unwrap()
        .with_spindle(Spindle::Orbital {
            eccentricity: 0.01,
            orbital_speed: 40.0,
            pad_speed: 6.0,
        })
        .unwrap();

    let mut engine = SimulationBuilder::new()
        .surface(surface)
        .tool(pad)
        .pressure(ElasticFoundation::new(5.0e6).unwrap())
        .trajectory(path)
        .material(Material::new(2.0e-9))
        .load_profile(LoadProfile::Ramp {
            start: 5.0,
            end: 20.0,
        })
        .duration(30.0, 0.05)
        .build()
        .unwrap();

    let summary = engine.run().unwrap();
    let surface = engine.surface();

    let centre = surface.interpolate(0.0, 0.0).unwrap();
    let edge = surface.interpolate(0.08, 0.0).unwrap();
    println!("steps:           {}", summary.steps);
    println!("removed volume:  {:.3e}", summary.cumulative_volume);
    println!("deepest cut:     {:.3e}", -surface.min_height());
    println!("centre vs edge:  {:.3e}", edge - centre);
}
