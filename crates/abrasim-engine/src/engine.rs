//! The simulation engine.
//!
//! [`SimulationEngine`] owns the workpiece surface and the process
//! components, and advances the run one step at a time. Each step samples
//! the trajectory, scans the contact footprint, solves the pressure
//! field, evaluates the removal law and integrates the result into the
//! surface. Failures latch the engine into a terminal state with the last
//! valid surface retained.

use abrasim_contact::{PressureDistribution, PressureField};
use abrasim_math::{GeometryError, NumericalError, Tolerance};
use abrasim_motion::{RangeError, Trajectory};
use abrasim_surface::{RemovalCell, WorkpieceSurface};
use abrasim_tool::{ContactFootprint, ToolShape};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::{RemovalModel, RemovalRateField, VelocityField};
use crate::process::Process;
use crate::trace::{StepTrace, TraceBuffer};

/// Smallest adaptive step, as a fraction of the configured maximum.
const MIN_STEP_FRACTION: f64 = 1e-9;

// =============================================================================
// Settings
// =============================================================================

/// Time-stepping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StepPolicy {
    /// March at a fixed step, shortening only the final step.
    Fixed {
        /// Step length.
        dt: f64,
    },
    /// Shrink the step whenever the peak removal rate would cut deeper
    /// than `max_step_depth` in one step.
    Adaptive {
        /// Largest allowed step.
        max_dt: f64,
        /// Depth cap per step at the fastest-cutting cell.
        max_step_depth: f64,
    },
}

impl StepPolicy {
    /// Step length before any rate-based refinement.
    pub fn base_dt(&self) -> f64 {
        match *self {
            Self::Fixed { dt } => dt,
            Self::Adaptive { max_dt, .. } => max_dt,
        }
    }

    /// Step length for the given peak removal rate.
    pub fn refine(&self, peak_rate: f64) -> f64 {
        match *self {
            Self::Fixed { dt } => dt,
            Self::Adaptive {
                max_dt,
                max_step_depth,
            } => {
                if peak_rate > 0.0 && peak_rate * max_dt > max_step_depth {
                    (max_step_depth / peak_rate).max(max_dt * MIN_STEP_FRACTION)
                } else {
                    max_dt
                }
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), GeometryError> {
        let check = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(GeometryError::InvalidParameter(format!(
                    "{name} must be finite and positive, got {value}"
                )))
            }
        };
        match *self {
            Self::Fixed { dt } => check("fixed step", dt),
            Self::Adaptive {
                max_dt,
                max_step_depth,
            } => {
                check("adaptive max step", max_dt)?;
                check("adaptive depth cap", max_step_depth)
            }
        }
    }
}

/// Run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSettings {
    /// Total simulated time.
    pub duration: f64,
    /// Time-stepping strategy.
    pub policy: StepPolicy,
    /// Numerical acceptance thresholds.
    pub tolerance: Tolerance,
    /// Trace retention; zero disables tracing.
    pub trace_capacity: usize,
}

impl SimSettings {
    /// Fixed-step settings with default tolerances and trace retention.
    pub fn new(duration: f64, dt: f64) -> Self {
        Self {
            duration,
            policy: StepPolicy::Fixed { dt },
            tolerance: Tolerance::DEFAULT,
            trace_capacity: 1024,
        }
    }

    /// Checks duration, stepping and tolerance parameters.
    pub fn validate(&self) -> std::result::Result<(), GeometryError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "run duration must be finite and positive, got {}",
                self.duration
            )));
        }
        self.policy.validate()?;
        if !(self.tolerance.force_rel.is_finite() && self.tolerance.force_rel > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "force tolerance must be finite and positive, got {}",
                self.tolerance.force_rel
            )));
        }
        if !(self.tolerance.time_eps.is_finite() && self.tolerance.time_eps >= 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "time epsilon must be finite and non-negative, got {}",
                self.tolerance.time_eps
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Run state
// =============================================================================

/// Lifecycle of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunStatus {
    /// Constructed, not yet stepped.
    Idle,
    /// Mid-run.
    Running,
    /// Reached the configured duration.
    Completed,
    /// A step failed; the state before the failing step is retained.
    Failed {
        /// Rendered error that stopped the run.
        reason: String,
    },
}

impl RunStatus {
    /// True once the run can no longer advance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}

/// Snapshot of an engine mid-run or after it finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    time: f64,
    steps: usize,
    surface: WorkpieceSurface,
    cumulative_volume: f64,
    status: RunStatus,
}

impl SimulationState {
    fn new(surface: WorkpieceSurface) -> Self {
        Self {
            time: 0.0,
            steps: 0,
            surface,
            cumulative_volume: 0.0,
            status: RunStatus::Idle,
        }
    }

    /// Simulated time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of executed steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Current workpiece surface.
    pub fn surface(&self) -> &WorkpieceSurface {
        &self.surface
    }

    /// Total removed volume.
    pub fn cumulative_volume(&self) -> f64 {
        self.cumulative_volume
    }

    /// Run lifecycle state.
    pub fn status(&self) -> &RunStatus {
        &self.status
    }
}

/// Final figures of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps executed.
    pub steps: usize,
    /// Simulated time at the end of the run.
    pub final_time: f64,
    /// Total removed volume.
    pub cumulative_volume: f64,
}

// =============================================================================
// Engine
// =============================================================================

/// Everything a run needs besides the workpiece itself.
#[derive(Debug, Clone)]
pub struct SimulationSetup {
    /// Tool cross-section and face.
    pub shape: Box<dyn ToolShape>,
    /// Contact pressure model.
    pub pressure: Box<dyn PressureDistribution>,
    /// Removal physics.
    pub model: Box<dyn RemovalModel>,
    /// Tool motion over the run.
    pub trajectory: Box<dyn Trajectory>,
    /// Load schedule and material.
    pub process: Process,
    /// Run settings.
    pub settings: SimSettings,
}

/// Steps a material-removal process over a workpiece surface.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    shape: Box<dyn ToolShape>,
    pressure: Box<dyn PressureDistribution>,
    model: Box<dyn RemovalModel>,
    trajectory: Box<dyn Trajectory>,
    process: Process,
    settings: SimSettings,
    state: SimulationState,
    trace: TraceBuffer,
}

impl SimulationEngine {
    /// Builds an engine over `surface`, validating the setup.
    ///
    /// The trajectory must cover the whole run: its span has to start at
    /// or before zero and end at or after the configured duration.
    pub fn new(surface: WorkpieceSurface, setup: SimulationSetup) -> Result<Self> {
        let SimulationSetup {
            shape,
            pressure,
            model,
            trajectory,
            process,
            settings,
        } = setup;

        settings.validate()?;
        process.validate()?;
        let (start, end) = trajectory.time_span();
        let eps = settings.tolerance.time_eps;
        if start > eps || end < settings.duration - eps {
            return Err(RangeError::SpanTooShort {
                start,
                end,
                required: settings.duration,
            }
            .into());
        }

        let trace = TraceBuffer::new(settings.trace_capacity);
        Ok(Self {
            shape,
            pressure,
            model,
            trajectory,
            process,
            settings,
            state: SimulationState::new(surface),
            trace,
        })
    }

    /// Current run state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Current workpiece surface.
    pub fn surface(&self) -> &WorkpieceSurface {
        &self.state.surface
    }

    /// Settings the engine was built with.
    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Retained step traces.
    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    /// Removes and returns the retained step traces, oldest first.
    pub fn drain_trace(&mut self) -> Vec<StepTrace> {
        self.trace.drain()
    }

    /// True once the run completed or failed.
    pub fn is_finished(&self) -> bool {
        self.state.status.is_terminal()
    }

    /// Consumes the engine, returning the final state.
    pub fn into_state(self) -> SimulationState {
        self.state
    }

    /// Advances the run by one step.
    ///
    /// Returns the step's trace, or `Ok(None)` once the run is terminal.
    /// On error the engine latches into [`RunStatus::Failed`] with the
    /// surface from before the failing step, and every later call
    /// returns `Ok(None)`.
    pub fn step(&mut self) -> Result<Option<StepTrace>> {
        match self.state.status {
            RunStatus::Completed | RunStatus::Failed { .. } => return Ok(None),
            RunStatus::Idle => self.state.status = RunStatus::Running,
            RunStatus::Running => {}
        }

        match self.advance() {
            Ok(trace) => {
                self.trace.push(trace);
                if self
                    .settings
                    .tolerance
                    .time_reached(self.state.time, self.settings.duration)
                {
                    self.state.status = RunStatus::Completed;
                }
                Ok(Some(trace))
            }
            Err(err) => {
                self.state.status = RunStatus::Failed {
                    reason: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Runs to completion, returning the final figures.
    pub fn run(&mut self) -> Result<RunSummary> {
        while self.step()?.is_some() {}
        Ok(RunSummary {
            steps: self.state.steps,
            final_time: self.state.time,
            cumulative_volume: self.state.cumulative_volume,
        })
    }

    /// Per-step iterator over the rest of the run.
    ///
    /// Yields each step's trace, then one `Err` if a step fails, then
    /// `None`.
    pub fn steps(&mut self) -> Steps<'_> {
        Steps { engine: self }
    }

    fn advance(&mut self) -> Result<StepTrace> {
        let t = self.state.time;
        let remaining = self.settings.duration - t;

        let pose = self.trajectory.pose_at(t)?;
        let velocity = self.trajectory.velocity_at(t)?;
        let footprint = self.shape.footprint(&pose, &self.state.surface)?;

        let load = self.process.load.at(t, self.settings.duration);
        if !load.is_finite() {
            return Err(NumericalError::NonFinite {
                quantity: "applied load",
                detail: format!("at t = {t}"),
            }
            .into());
        }

        // Off the workpiece with nothing pressing down: advance quietly.
        if footprint.is_empty() && load <= 0.0 {
            let dt = self.settings.policy.base_dt().min(remaining);
            self.state.time = t + dt;
            self.state.steps += 1;
            return Ok(StepTrace {
                step: self.state.steps,
                time: t,
                dt,
                contact_area: 0.0,
                contact_cells: 0,
                peak_pressure: 0.0,
                volume_removed: 0.0,
                cumulative_volume: self.state.cumulative_volume,
            });
        }

        let field = self.pressure.pressure(&footprint, load)?;
        self.check_pressure(&footprint, &field, load)?;

        let speeds = VelocityField::new(
            footprint
                .cells()
                .iter()
                .map(|c| velocity.speed_at(c.lx, c.ly))
                .collect(),
        );
        let rates = self.model.removal_rate(&field, &speeds, &self.process.material);
        let peak_rate = self.check_rates(&footprint, &rates)?;

        let dt = self.settings.policy.refine(peak_rate).min(remaining);
        let cells: Vec<RemovalCell> = footprint
            .cells()
            .iter()
            .zip(rates.values())
            .map(|(cell, rate)| RemovalCell {
                index: cell.index,
                depth: rate * cell.coverage * dt,
            })
            .collect();
        let volume = self.state.surface.apply_removal(&cells)?;

        let previous = self.state.cumulative_volume;
        self.state.cumulative_volume += volume;
        if self.state.cumulative_volume < previous {
            return Err(NumericalError::VolumeRegression {
                previous,
                current: self.state.cumulative_volume,
            }
            .into());
        }

        self.state.time = t + dt;
        self.state.steps += 1;
        Ok(StepTrace {
            step: self.state.steps,
            time: t,
            dt,
            contact_area: footprint.covered_area(),
            contact_cells: footprint.len(),
            peak_pressure: field.peak(),
            volume_removed: volume,
            cumulative_volume: self.state.cumulative_volume,
        })
    }

    fn check_pressure(
        &self,
        footprint: &ContactFootprint,
        field: &PressureField,
        load: f64,
    ) -> Result<()> {
        if field.len() != footprint.len() {
            return Err(GeometryError::InvalidParameter(format!(
                "pressure model returned {} samples for {} footprint cells",
                field.len(),
                footprint.len()
            ))
            .into());
        }
        for (index, (cell, p)) in footprint.cells().iter().zip(field.values()).enumerate() {
            if !p.is_finite() {
                return Err(NumericalError::NonFinite {
                    quantity: "pressure",
                    detail: format!("cell ({}, {})", cell.ix, cell.iy),
                }
                .into());
            }
            if *p < 0.0 {
                return Err(NumericalError::NegativePressure { value: *p, index }.into());
            }
        }
        let integrated = field.integrate(footprint);
        if !self.settings.tolerance.force_balanced(integrated, load) {
            return Err(NumericalError::ForceImbalance {
                integrated,
                applied: load,
            }
            .into());
        }
        Ok(())
    }

    fn check_rates(&self, footprint: &ContactFootprint, rates: &RemovalRateField) -> Result<f64> {
        if rates.len() != footprint.len() {
            return Err(GeometryError::InvalidParameter(format!(
                "removal model returned {} rates for {} footprint cells",
                rates.len(),
                footprint.len()
            ))
            .into());
        }
        let mut peak = 0.0_f64;
        for (cell, rate) in footprint.cells().iter().zip(rates.values()) {
            if !rate.is_finite() {
                return Err(NumericalError::NonFinite {
                    quantity: "removal rate",
                    detail: format!("cell ({}, {})", cell.ix, cell.iy),
                }
                .into());
            }
            if *rate < 0.0 {
                return Err(NumericalError::NegativeRemoval {
                    amount: *rate,
                    ix: cell.ix,
                    iy: cell.iy,
                }
                .into());
            }
            peak = peak.max(*rate);
        }
        Ok(peak)
    }
}

/// Per-step iterator returned by [`SimulationEngine::steps`].
pub struct Steps<'a> {
    engine: &'a mut SimulationEngine,
}

impl Iterator for Steps<'_> {
    type Item = Result<StepTrace>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.engine.step() {
            Ok(Some(trace)) => Some(Ok(trace)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Material, Preston};
    use crate::process::LoadProfile;
    use abrasim_contact::{ContactError, Uniform};
    use abrasim_motion::{LinearPath, Spindle, ToolPose};
    use abrasim_surface::SurfaceDomain;
    use abrasim_tool::Round;
    use approx::assert_relative_eq;

    const KP: f64 = 1e-3;
    const BELT_SPEED: f64 = 2.0;

    fn flat_surface(size: f64, resolution: f64) -> WorkpieceSurface {
        let domain = SurfaceDomain::centered(size, size, resolution).unwrap();
        WorkpieceSurface::flat(domain)
    }

    /// Stationary round pad with a belt-driven abrasive, uniform
    /// pressure, Preston wear. Every covered cell cuts at the same rate.
    fn lapping_setup(duration: f64, dt: f64, load: f64) -> SimulationSetup {
        let shape = Round::new(2.0).unwrap().with_antialias(0.0).unwrap();
        let trajectory = LinearPath::new([0.0, 0.0], [0.0, 0.0], duration)
            .unwrap()
            .with_spindle(Spindle::Belt {
                surface_speed: BELT_SPEED,
            })
            .unwrap();
        SimulationSetup {
            shape: Box::new(shape),
            pressure: Box::new(Uniform),
            model: Box::new(Preston),
            trajectory: Box::new(trajectory),
            process: Process::constant(load, Material::new(KP)),
            settings: SimSettings::new(duration, dt),
        }
    }

    /// Setup whose trajectory never reaches the workpiece.
    fn off_surface_setup(duration: f64, dt: f64, load: f64) -> SimulationSetup {
        let mut setup = lapping_setup(duration, dt, load);
        setup.trajectory = Box::new(
            LinearPath::new([50.0, 50.0], [0.0, 0.0], duration)
                .unwrap()
                .with_spindle(Spindle::Belt {
                    surface_speed: BELT_SPEED,
                })
                .unwrap(),
        );
        setup
    }

    fn probe_covered_area(surface: &WorkpieceSurface) -> f64 {
        Round::new(2.0)
            .unwrap()
            .with_antialias(0.0)
            .unwrap()
            .footprint(&ToolPose::new(0.0, 0.0), surface)
            .unwrap()
            .covered_area()
    }

    #[test]
    fn test_stationary_lapping_removes_expected_volume() {
        let surface = flat_surface(10.0, 0.5);
        let covered_area = probe_covered_area(&surface);
        let mut engine =
            SimulationEngine::new(surface, lapping_setup(2.0, 0.25, 10.0)).unwrap();
        let summary = engine.run().unwrap();

        // Uniform pressure makes the volume independent of the discrete
        // contact area: volume = kp * load * speed * duration.
        assert_relative_eq!(
            summary.cumulative_volume,
            KP * 10.0 * BELT_SPEED * 2.0,
            max_relative = 1e-9
        );
        assert_eq!(summary.steps, 8);
        assert_relative_eq!(summary.final_time, 2.0, epsilon = 1e-9);
        assert_eq!(*engine.state().status(), RunStatus::Completed);

        let expected_depth = KP * (10.0 / covered_area) * BELT_SPEED * 2.0;
        assert_relative_eq!(
            engine.surface().min_height(),
            -expected_depth,
            max_relative = 1e-9
        );
        assert_relative_eq!(engine.surface().max_height(), 0.0);
    }

    #[test]
    fn test_linear_pass_cuts_a_straight_groove() {
        let domain = SurfaceDomain::new(121, 81, [-15.0, -10.0, 15.0, 10.0]).unwrap();
        let surface = WorkpieceSurface::flat(domain);

        let shape = Round::new(5.0).unwrap();
        let trajectory = LinearPath::new([-2.0, 0.0], [2.0, 0.0], 2.0).unwrap();
        let setup = SimulationSetup {
            shape: Box::new(shape),
            pressure: Box::new(Uniform),
            model: Box::new(Preston),
            trajectory: Box::new(trajectory),
            process: Process::constant(10.0, Material::new(KP)),
            settings: SimSettings::new(2.0, 0.1),
        };
        let mut engine = SimulationEngine::new(surface, setup).unwrap();
        engine.run().unwrap();
        let surface = engine.surface();

        // The groove centre stays in contact for the whole pass, so its
        // depth approaches kp * (load / area) * speed * duration.
        let expected = KP * (10.0 / (std::f64::consts::PI * 25.0)) * 2.0 * 2.0;
        let centre = surface.interpolate(0.0, 0.0).unwrap();
        assert!(
            (-centre - expected).abs() / expected < 0.02,
            "centre depth {centre} vs expected {expected}"
        );

        // Material outside the swept band is untouched; inside it is cut.
        assert_eq!(surface.interpolate(0.0, 6.0), Some(0.0));
        assert_eq!(surface.interpolate(0.0, -6.0), Some(0.0));
        assert!(surface.interpolate(0.0, 4.75).unwrap() < 0.0);
        assert!(surface.interpolate(-1.0, -4.75).unwrap() < 0.0);
    }

    #[test]
    fn test_loaded_tool_off_the_workpiece_fails() {
        let surface = flat_surface(10.0, 0.5);
        let mut engine =
            SimulationEngine::new(surface, off_surface_setup(1.0, 0.25, 5.0)).unwrap();

        let err = engine.step().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Contact(ContactError::NoContact { .. })
        ));
        assert!(matches!(
            engine.state().status(),
            RunStatus::Failed { reason } if !reason.is_empty()
        ));

        // The failing step left no mark.
        assert_eq!(engine.state().steps(), 0);
        assert_eq!(engine.state().time(), 0.0);
        assert_eq!(engine.state().cumulative_volume(), 0.0);
        assert_eq!(engine.surface().min_height(), 0.0);

        // Terminal states absorb later calls.
        assert!(engine.step().unwrap().is_none());
        assert!(engine.is_finished());
    }

    #[test]
    fn test_zero_load_run_completes_without_removal() {
        let surface = flat_surface(10.0, 0.5);
        let mut engine = SimulationEngine::new(surface, lapping_setup(1.0, 0.25, 0.0)).unwrap();
        let summary = engine.run().unwrap();

        assert_eq!(summary.steps, 4);
        assert_eq!(summary.cumulative_volume, 0.0);
        assert_eq!(*engine.state().status(), RunStatus::Completed);
        assert_eq!(engine.surface().min_height(), 0.0);
        for trace in engine.trace().iter() {
            assert!(trace.contact_cells > 0);
            assert_eq!(trace.peak_pressure, 0.0);
            assert_eq!(trace.volume_removed, 0.0);
        }
    }

    #[test]
    fn test_unloaded_tool_off_the_workpiece_idles_to_completion() {
        let surface = flat_surface(10.0, 0.5);
        let mut engine =
            SimulationEngine::new(surface, off_surface_setup(1.0, 0.25, 0.0)).unwrap();
        let summary = engine.run().unwrap();

        assert_eq!(summary.steps, 4);
        assert_eq!(summary.cumulative_volume, 0.0);
        assert_eq!(*engine.state().status(), RunStatus::Completed);
        for trace in engine.trace().iter() {
            assert_eq!(trace.contact_cells, 0);
            assert_eq!(trace.contact_area, 0.0);
            assert_eq!(trace.volume_removed, 0.0);
        }
    }

    #[test]
    fn test_final_step_is_clamped_to_the_duration() {
        let surface = flat_surface(10.0, 0.5);
        let mut engine = SimulationEngine::new(surface, lapping_setup(1.05, 0.5, 10.0)).unwrap();
        let summary = engine.run().unwrap();

        assert_eq!(summary.steps, 3);
        assert_relative_eq!(summary.final_time, 1.05, epsilon = 1e-9);
        let last = engine.trace().latest().unwrap();
        assert_relative_eq!(last.dt, 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_steps_iterator_yields_each_trace_then_fuses() {
        let surface = flat_surface(10.0, 0.5);
        let mut engine = SimulationEngine::new(surface, lapping_setup(1.0, 0.5, 10.0)).unwrap();
        {
            let mut steps = engine.steps();
            assert_eq!(steps.next().unwrap().unwrap().step, 1);
            assert_eq!(steps.next().unwrap().unwrap().step, 2);
            assert!(steps.next().is_none());
            assert!(steps.next().is_none());
        }
        assert_eq!(*engine.state().status(), RunStatus::Completed);

        let surface = flat_surface(10.0, 0.5);
        let mut engine =
            SimulationEngine::new(surface, off_surface_setup(1.0, 0.5, 5.0)).unwrap();
        let mut steps = engine.steps();
        assert!(steps.next().unwrap().is_err());
        assert!(steps.next().is_none());
    }

    #[test]
    fn test_adaptive_policy_caps_per_step_depth() {
        let surface = flat_surface(10.0, 0.5);
        let covered_area = probe_covered_area(&surface);
        let rate = KP * (10.0 / covered_area) * BELT_SPEED;
        let max_step_depth = rate * 0.1;

        let mut setup = lapping_setup(0.35, 0.5, 10.0);
        setup.settings.policy = StepPolicy::Adaptive {
            max_dt: 0.5,
            max_step_depth,
        };
        let mut engine = SimulationEngine::new(surface, setup).unwrap();
        let summary = engine.run().unwrap();

        // The depth cap refines 0.5 down to 0.1; the last step clamps to
        // the remaining 0.05.
        assert_eq!(summary.steps, 4);
        assert_relative_eq!(summary.final_time, 0.35, epsilon = 1e-9);
        for trace in engine.trace().iter() {
            let step_depth = KP * trace.peak_pressure * BELT_SPEED * trace.dt;
            assert!(step_depth <= max_step_depth * (1.0 + 1e-9));
        }
    }

    #[test]
    fn test_trace_buffer_keeps_only_the_most_recent_steps() {
        let surface = flat_surface(10.0, 0.5);
        let mut setup = lapping_setup(2.0, 0.25, 10.0);
        setup.settings.trace_capacity = 3;
        let mut engine = SimulationEngine::new(surface, setup).unwrap();
        engine.run().unwrap();

        assert_eq!(engine.trace().len(), 3);
        assert_eq!(engine.trace().dropped(), 5);
        assert_eq!(engine.trace().latest().map(|t| t.step), Some(8));

        let drained = engine.drain_trace();
        let steps: Vec<usize> = drained.iter().map(|t| t.step).collect();
        assert_eq!(steps, vec![6, 7, 8]);
        assert!(engine.trace().is_empty());
    }

    #[test]
    fn test_construction_rejects_bad_inputs() {
        // Trajectory shorter than the run.
        let surface = flat_surface(10.0, 0.5);
        let mut setup = lapping_setup(2.0, 0.25, 10.0);
        setup.trajectory = Box::new(LinearPath::new([0.0, 0.0], [0.0, 0.0], 1.0).unwrap());
        let err = SimulationEngine::new(surface, setup).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Range(RangeError::SpanTooShort { .. })
        ));

        // Non-positive step.
        let surface = flat_surface(10.0, 0.5);
        let setup = lapping_setup(2.0, 0.0, 10.0);
        assert!(matches!(
            SimulationEngine::new(surface, setup),
            Err(SimulationError::Geometry(_))
        ));

        // Negative Preston coefficient.
        let surface = flat_surface(10.0, 0.5);
        let mut setup = lapping_setup(2.0, 0.25, 10.0);
        setup.process = Process::constant(10.0, Material::new(-1e-3));
        assert!(matches!(
            SimulationEngine::new(surface, setup),
            Err(SimulationError::Geometry(_))
        ));

        // Negative load.
        let surface = flat_surface(10.0, 0.5);
        let mut setup = lapping_setup(2.0, 0.25, 10.0);
        setup.process.load = LoadProfile::constant(-5.0);
        assert!(matches!(
            SimulationEngine::new(surface, setup),
            Err(SimulationError::Geometry(_))
        ));
    }

    /// Pressure model that only carries half the applied load.
    #[derive(Debug, Clone)]
    struct HalfLoad;

    impl PressureDistribution for HalfLoad {
        fn pressure(
            &self,
            footprint: &ContactFootprint,
            normal_load: f64,
        ) -> std::result::Result<PressureField, ContactError> {
            let p = normal_load / (2.0 * footprint.covered_area());
            Ok(PressureField::new(vec![p; footprint.len()]))
        }

        fn clone_box(&self) -> Box<dyn PressureDistribution> {
            Box::new(self.clone())
        }
    }

    /// Pressure model that claims tension on every cell.
    #[derive(Debug, Clone)]
    struct Tension;

    impl PressureDistribution for Tension {
        fn pressure(
            &self,
            footprint: &ContactFootprint,
            _normal_load: f64,
        ) -> std::result::Result<PressureField, ContactError> {
            Ok(PressureField::new(vec![-1.0; footprint.len()]))
        }

        fn clone_box(&self) -> Box<dyn PressureDistribution> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_unbalanced_pressure_field_is_rejected() {
        let surface = flat_surface(10.0, 0.5);
        let mut setup = lapping_setup(1.0, 0.25, 10.0);
        setup.pressure = Box::new(HalfLoad);
        let mut engine = SimulationEngine::new(surface, setup).unwrap();

        let err = engine.step().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Numerical(NumericalError::ForceImbalance { .. })
        ));
        assert!(engine.is_finished());
        assert_eq!(engine.surface().min_height(), 0.0);
    }

    #[test]
    fn test_negative_pressure_field_is_rejected() {
        let surface = flat_surface(10.0, 0.5);
        let mut setup = lapping_setup(1.0, 0.25, 10.0);
        setup.pressure = Box::new(Tension);
        let mut engine = SimulationEngine::new(surface, setup).unwrap();

        let err = engine.step().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Numerical(NumericalError::NegativePressure { .. })
        ));
        assert!(engine.is_finished());
    }

    #[test]
    fn test_status_progresses_from_idle_to_completed() {
        let surface = flat_surface(10.0, 0.5);
        let mut engine = SimulationEngine::new(surface, lapping_setup(1.0, 0.25, 10.0)).unwrap();
        assert_eq!(*engine.state().status(), RunStatus::Idle);
        assert!(!engine.is_finished());

        let trace = engine.step().unwrap().unwrap();
        assert_eq!(trace.step, 1);
        assert_eq!(trace.time, 0.0);
        assert_eq!(*engine.state().status(), RunStatus::Running);

        engine.run().unwrap();
        assert_eq!(*engine.state().status(), RunStatus::Completed);
        assert!(engine.step().unwrap().is_none());
    }

    #[test]
    fn test_volume_ledger_matches_the_surface_deficit() {
        let domain = SurfaceDomain::centered(16.0, 8.0, 0.25).unwrap();
        let surface = WorkpieceSurface::flat(domain);
        let shape = Round::new(2.0).unwrap();
        let trajectory = LinearPath::new([-3.0, 0.0], [3.0, 0.0], 2.0).unwrap();
        let setup = SimulationSetup {
            shape: Box::new(shape),
            pressure: Box::new(Uniform),
            model: Box::new(Preston),
            trajectory: Box::new(trajectory),
            process: Process::constant(8.0, Material::new(KP)),
            settings: SimSettings::new(2.0, 0.1),
        };
        let mut engine = SimulationEngine::new(surface, setup).unwrap();

        let mut stepped_volume = 0.0;
        for step in engine.steps() {
            stepped_volume += step.unwrap().volume_removed;
        }
        let total = engine.state().cumulative_volume();
        assert_relative_eq!(stepped_volume, total, max_relative = 1e-12);
        assert!(total > 0.0);

        let surface = engine.surface();
        let deficit: f64 = surface.heights().iter().map(|h| -h).sum::<f64>()
            * surface.domain().cell_area();
        assert_relative_eq!(deficit, total, max_relative = 1e-9);
        assert!(surface.heights().iter().all(|h| *h <= 0.0));
    }

    #[test]
    fn test_ramped_load_removes_the_time_average() {
        let surface = flat_surface(10.0, 0.5);
        let mut setup = lapping_setup(2.0, 0.01, 10.0);
        setup.process.load = LoadProfile::Ramp {
            start: 0.0,
            end: 10.0,
        };
        let mut engine = SimulationEngine::new(surface, setup).unwrap();
        let summary = engine.run().unwrap();

        // Start-of-step sampling of the ramp underestimates the exact
        // integral by half a step.
        let exact = KP * 5.0 * BELT_SPEED * 2.0;
        assert_relative_eq!(summary.cumulative_volume, exact, max_relative = 0.01);
        assert!(summary.cumulative_volume < exact);
    }

    #[test]
    fn test_state_serde_round_trip() {
        let surface = flat_surface(10.0, 0.5);
        let mut engine = SimulationEngine::new(surface, lapping_setup(1.0, 0.5, 10.0)).unwrap();
        engine.run().unwrap();

        let json = serde_json::to_string(engine.state()).unwrap();
        let back: SimulationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.steps(), engine.state().steps());
        assert_eq!(back.time(), engine.state().time());
        assert_eq!(back.cumulative_volume(), engine.state().cumulative_volume());
        assert_eq!(back.status(), engine.state().status());
        assert_eq!(
            back.surface().min_height(),
            engine.state().surface().min_height()
        );
    }
}
