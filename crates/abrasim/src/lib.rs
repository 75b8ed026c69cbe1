#![warn(missing_docs)]

//! abrasim: abrasive material-removal simulation.
//!
//! Simulates lapping, polishing and grinding: a tool face pressed onto a
//! workpiece under a normal load, sliding along a trajectory and wearing
//! material away where it touches. The workpiece is a 2D height field;
//! each step scans the tool's contact footprint, solves the pressure
//! sharing the load over that footprint, applies a removal law such as
//! Preston's `rate = kp * p * v`, and subtracts the removed depth from
//! the surface.
//!
//! The components are pluggable at every seam: tool shapes, pressure
//! distributions, removal laws and trajectories are all traits, and the
//! [`SimulationBuilder`] wires any combination into a ready-to-run
//! [`SimulationEngine`].
//!
//! # Example
//!
//! ```
//! use abrasim::{
//!     LinearPath, Material, Round, SimulationBuilder, Spindle, SurfaceDomain,
//!     WorkpieceSurface,
//! };
//!
//! // A 10 x 10 plate lapped by a spinning round pad sweeping across it.
//! let domain = SurfaceDomain::centered(10.0, 10.0, 0.25)?;
//! let mut engine = SimulationBuilder::new()
//!     .surface(WorkpieceSurface::flat(domain))
//!     .tool(Round::new(2.0)?)
//!     .trajectory(
//!         LinearPath::new([-2.0, 0.0], [2.0, 0.0], 2.0)?
//!             .with_spindle(Spindle::Rotary { angular_speed: 30.0 })?,
//!     )
//!     .material(Material::new(5.0e-4))
//!     .load(12.0)
//!     .duration(2.0, 0.1)
//!     .build()?;
//!
//! let summary = engine.run()?;
//! assert!(summary.cumulative_volume > 0.0);
//! # Ok::<(), abrasim::SimulationError>(())
//! ```

pub use abrasim_contact;
pub use abrasim_engine;
pub use abrasim_math;
pub use abrasim_motion;
pub use abrasim_surface;
pub use abrasim_tool;

pub use abrasim_contact::{
    ContactError, ElasticFoundation, PressureDistribution, PressureField, RigidPad, Uniform,
};
pub use abrasim_engine::{
    LoadProfile, Material, PowerLaw, Preston, Process, RemovalModel, RemovalRateField, RunStatus,
    RunSummary, SimSettings, SimulationEngine, SimulationError, SimulationSetup, SimulationState,
    StepPolicy, StepTrace, Steps, ThresholdPreston, TraceBuffer, VelocityField,
};
pub use abrasim_math::{GeometryError, NumericalError, Point2, Tolerance, Vec2};
pub use abrasim_motion::{
    LinearPath, OscillatingPath, RangeError, SlidingVelocity, Spindle, ToolPose, Trajectory,
    WaypointPath,
};
pub use abrasim_surface::{GridWindow, RemovalCell, SurfaceDomain, WorkpieceSurface};
pub use abrasim_tool::{
    ContactFootprint, Crown, FootprintCell, Rectangular, Round, SectionProperties, ToolShape,
};

/// Assembles a [`SimulationEngine`] from parts, with sensible defaults.
///
/// Required: a surface, a tool, a trajectory, a material, a load and the
/// run duration. The pressure distribution defaults to [`Uniform`] and
/// the removal law to [`Preston`].
#[derive(Debug)]
pub struct SimulationBuilder {
    surface: Option<WorkpieceSurface>,
    shape: Option<Box<dyn ToolShape>>,
    pressure: Box<dyn PressureDistribution>,
    model: Box<dyn RemovalModel>,
    trajectory: Option<Box<dyn Trajectory>>,
    material: Option<Material>,
    load: Option<LoadProfile>,
    settings: Option<SimSettings>,
}

impl SimulationBuilder {
    /// Empty builder with the default pressure and removal models.
    pub fn new() -> Self {
        Self {
            surface: None,
            shape: None,
            pressure: Box::new(Uniform),
            model: Box::new(Preston),
            trajectory: None,
            material: None,
            load: None,
            settings: None,
        }
    }

    /// Workpiece surface to simulate on.
    pub fn surface(mut self, surface: WorkpieceSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Tool cross-section and face.
    pub fn tool(mut self, shape: impl ToolShape + 'static) -> Self {
        self.shape = Some(Box::new(shape));
        self
    }

    /// Contact pressure model, replacing the default [`Uniform`].
    pub fn pressure(mut self, model: impl PressureDistribution + 'static) -> Self {
        self.pressure = Box::new(model);
        self
    }

    /// Removal law, replacing the default [`Preston`].
    pub fn removal(mut self, model: impl RemovalModel + 'static) -> Self {
        self.model = Box::new(model);
        self
    }

    /// Tool motion over the run.
    pub fn trajectory(mut self, trajectory: impl Trajectory + 'static) -> Self {
        self.trajectory = Some(Box::new(trajectory));
        self
    }

    /// Workpiece material response.
    pub fn material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Constant normal load for the whole run.
    pub fn load(mut self, newtons: f64) -> Self {
        self.load = Some(LoadProfile::constant(newtons));
        self
    }

    /// Load schedule over the run.
    pub fn load_profile(mut self, profile: LoadProfile) -> Self {
        self.load = Some(profile);
        self
    }

    /// Run duration and fixed step, with default tolerances.
    pub fn duration(mut self, duration: f64, dt: f64) -> Self {
        self.settings = Some(SimSettings::new(duration, dt));
        self
    }

    /// Full run settings, replacing [`SimulationBuilder::duration`].
    pub fn settings(mut self, settings: SimSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Builds and validates the engine.
    pub fn build(self) -> Result<SimulationEngine, SimulationError> {
        let missing = |what: &str| {
            SimulationError::from(GeometryError::InvalidParameter(format!(
                "simulation builder: {what} not set"
            )))
        };
        let surface = self.surface.ok_or_else(|| missing("workpiece surface"))?;
        let shape = self.shape.ok_or_else(|| missing("tool shape"))?;
        let trajectory = self.trajectory.ok_or_else(|| missing("trajectory"))?;
        let material = self.material.ok_or_else(|| missing("material"))?;
        let load = self.load.ok_or_else(|| missing("load profile"))?;
        let settings = self.settings.ok_or_else(|| missing("run duration"))?;

        SimulationEngine::new(
            surface,
            SimulationSetup {
                shape,
                pressure: self.pressure,
                model: self.model,
                trajectory,
                process: Process::new(load, material),
                settings,
            },
        )
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate() -> WorkpieceSurface {
        let domain = SurfaceDomain::centered(10.0, 10.0, 0.5).unwrap();
        WorkpieceSurface::flat(domain)
    }

    #[test]
    fn test_builder_assembles_a_running_engine() {
        let mut engine = SimulationBuilder::new()
            .surface(plate())
            .tool(Round::new(2.0).unwrap())
            .trajectory(
                LinearPath::new([0.0, 0.0], [0.0, 0.0], 1.0)
                    .unwrap()
                    .with_spindle(Spindle::Belt { surface_speed: 1.0 })
                    .unwrap(),
            )
            .material(Material::new(1e-3))
            .load(10.0)
            .duration(1.0, 0.25)
            .build()
            .unwrap();

        let summary = engine.run().unwrap();
        assert_eq!(summary.steps, 4);
        assert!(summary.cumulative_volume > 0.0);
        assert_eq!(*engine.state().status(), RunStatus::Completed);
    }

    #[test]
    fn test_builder_reports_the_missing_part() {
        let err = SimulationBuilder::new()
            .surface(plate())
            .trajectory(LinearPath::new([0.0, 0.0], [1.0, 0.0], 1.0).unwrap())
            .material(Material::new(1e-3))
            .load(10.0)
            .duration(1.0, 0.25)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("tool shape"));
    }

    #[test]
    fn test_builder_accepts_alternate_models() {
        let engine = SimulationBuilder::new()
            .surface(plate())
            .tool(Rectangular::square(3.0).unwrap())
            .pressure(RigidPad::with_torque(0.0, 1.0))
            .removal(ThresholdPreston::new(0.1).unwrap())
            .trajectory(LinearPath::new([-1.0, 0.0], [2.0, 0.0], 1.0).unwrap())
            .material(Material::new(1e-3))
            .load_profile(LoadProfile::Ramp {
                start: 2.0,
                end: 8.0,
            })
            .duration(1.0, 0.1)
            .build();
        assert!(engine.is_ok());
    }
}
