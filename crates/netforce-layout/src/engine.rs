//! Shared simulation loop.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::force::ForceModel;
use crate::parameters::SimulationParameters;
use crate::quadtree::Quadtree;
use crate::setup::Setup;
use crate::{LayoutContext, LayoutError, Point, Result, Vector2D, VertexId};

/// Current state of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    /// Points have not been placed yet.
    Uninitialized,
    /// Stepping.
    Running,
    /// Kinetic energy fell to the threshold.
    Converged,
    /// Stopped by the iteration cap or the timeout, or nothing could move.
    Stopped,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Converged,
    MaxIterations,
    Timeout,
    NothingToMove,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutStats {
    pub iterations: usize,
    pub stop_reason: StopReason,
    /// Kinetic energy after the last step.
    pub energy: f64,
    pub elapsed: Duration,
}

/// Force-directed layout over a [`LayoutContext`].
///
/// One step resets forces, rebuilds a quadtree over the movable points,
/// accumulates repulsion, edge attraction and centering, then lets the
/// model integrate. Fixed points act as force sources only.
pub struct ForceLayout<V, M> {
    context: LayoutContext<V>,
    model: M,
    params: SimulationParameters,
    state: LayoutState,
    iteration: usize,
    energy: f64,
    stop_reason: Option<StopReason>,
    started: Option<Instant>,
    /// Reused traversal stack.
    stack: Vec<usize>,
}

impl<V: VertexId, M: ForceModel> ForceLayout<V, M> {
    pub fn new(context: LayoutContext<V>, model: M, params: SimulationParameters) -> Self {
        Self {
            context,
            model,
            params,
            state: LayoutState::Uninitialized,
            iteration: 0,
            energy: 0.0,
            stop_reason: None,
            started: None,
            stack: Vec::new(),
        }
    }

    /// Place unpositioned points and get ready to step.
    pub fn init<S: Setup>(&mut self, setup: &mut S) -> Result<()> {
        self.params.validate()?;
        setup.run(&mut self.context)?;
        self.start();
        Ok(())
    }

    /// Start stepping with positions already in place.
    pub fn start(&mut self) {
        self.state = LayoutState::Running;
        self.iteration = 0;
        self.energy = 0.0;
        self.stop_reason = None;
        self.started = Some(Instant::now());
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn context(&self) -> &LayoutContext<V> {
        &self.context
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_context(self) -> LayoutContext<V> {
        self.context
    }

    /// Run one iteration. Returns the stop reason once the run has ended.
    pub fn step(&mut self) -> Result<Option<StopReason>> {
        match self.state {
            LayoutState::Uninitialized => return Err(LayoutError::NotInitialized),
            LayoutState::Converged | LayoutState::Stopped => return Ok(self.stop_reason),
            LayoutState::Running => {}
        }

        if let Some(reason) = self.precheck() {
            return Ok(Some(self.finish(reason)));
        }

        self.apply_forces();

        let mut points: Vec<&mut Point> = self.context.moving_points_mut().values_mut().collect();
        self.energy = self.model.integrate(&mut points);
        self.iteration += 1;
        trace!(iteration = self.iteration, energy = self.energy, "step");

        Ok(self.postcheck().map(|reason| self.finish(reason)))
    }

    /// Step until a stop condition is met.
    pub fn run(&mut self) -> Result<LayoutStats> {
        if self.state == LayoutState::Uninitialized {
            return Err(LayoutError::NotInitialized);
        }

        info!(
            model = self.model.name(),
            vertices = self.context.vertex_count(),
            edges = self.context.edge_count(),
            fixed = self.context.fixed_points().len(),
            "layout started"
        );

        if !self.model.honours_timeout() && self.params.timeout_seconds.is_some() {
            warn!(
                model = self.model.name(),
                "timeout is ignored by this model; the run ends on energy or max_iterations"
            );
        }

        let stop_reason = loop {
            if let Some(reason) = self.step()? {
                break reason;
            }
        };

        let stats = LayoutStats {
            iterations: self.iteration,
            stop_reason,
            energy: self.energy,
            elapsed: self.started.map(|s| s.elapsed()).unwrap_or_default(),
        };
        info!(
            iterations = stats.iterations,
            stop_reason = ?stats.stop_reason,
            energy = stats.energy,
            elapsed = ?stats.elapsed,
            "layout finished"
        );
        Ok(stats)
    }

    /// Conditions that end the run before any work is done.
    fn precheck(&self) -> Option<StopReason> {
        if self.context.moving_points().is_empty() {
            Some(StopReason::NothingToMove)
        } else if self.iteration >= self.params.max_iterations {
            Some(StopReason::MaxIterations)
        } else {
            None
        }
    }

    fn postcheck(&self) -> Option<StopReason> {
        if self.energy <= self.params.min_energy_threshold {
            return Some(StopReason::Converged);
        }
        if self.iteration >= self.params.max_iterations {
            return Some(StopReason::MaxIterations);
        }
        if self.model.honours_timeout() {
            if let (Some(timeout), Some(started)) = (self.params.timeout(), self.started) {
                if started.elapsed() >= timeout {
                    return Some(StopReason::Timeout);
                }
            }
        }
        None
    }

    fn finish(&mut self, reason: StopReason) -> StopReason {
        debug!(?reason, iteration = self.iteration, "stopping");
        self.state = match reason {
            StopReason::Converged => LayoutState::Converged,
            _ => LayoutState::Stopped,
        };
        self.stop_reason = Some(reason);
        reason
    }

    fn apply_forces(&mut self) {
        let model = &self.model;
        let params = &self.params;
        let center = self.context.center();

        // Snapshot of the movable points; positions do not change until
        // integration, so the tree and the snapshot agree for the whole step.
        let snapshot: Vec<Point> = self.context.moving_points().values().cloned().collect();
        let tree = Quadtree::build(&snapshot, |p| model.mass(p));
        let fixed: Vec<(Vector2D, f64)> = if params.repulsion_from_fixed_points {
            self.context
                .fixed_points()
                .values()
                .map(|p| (p.position(), model.mass(p)))
                .collect()
        } else {
            Vec::new()
        };

        let stack = &mut self.stack;
        for (i, point) in self.context.moving_points_mut().values_mut().enumerate() {
            point.reset_forces();
            let position = point.position();
            let mass = model.mass(point);

            point.apply_force(far_field(model, &tree, &snapshot, i, params.opening_angle, stack));
            for &(source, source_mass) in &fixed {
                point.apply_force(model.repulsion(position, mass, source, source_mass));
            }
            if params.center_attraction_enabled {
                point.apply_force(model.centering(position, mass, center));
            }
        }

        let edges: Vec<_> = self.context.edges().collect();
        for (a, b) in edges {
            let (Some(pa), Some(pb)) = (
                self.context.point_at(a).map(Point::position),
                self.context.point_at(b).map(Point::position),
            ) else {
                continue;
            };
            let moving = self.context.moving_points_mut();
            if let Some(point) = moving.get_mut(&a) {
                point.apply_force(model.attraction(pa, pb));
            }
            if let Some(point) = moving.get_mut(&b) {
                point.apply_force(model.attraction(pb, pa));
            }
        }
    }
}

/// Barnes-Hut repulsion on snapshot point `target` from every other movable
/// point. Leaves are always resolved point by point; the cell holding the
/// target itself is never approximated.
fn far_field<M: ForceModel>(
    model: &M,
    tree: &Quadtree,
    snapshot: &[Point],
    target: usize,
    opening_angle: f64,
    stack: &mut Vec<usize>,
) -> Vector2D {
    let Some(root) = tree.root() else {
        return Vector2D::ZERO;
    };
    let position = snapshot[target].position();
    let mass = model.mass(&snapshot[target]);
    let mut force = Vector2D::ZERO;

    stack.clear();
    stack.push(root);
    while let Some(idx) = stack.pop() {
        let node = tree.node(idx);
        if node.is_leaf() {
            for &other in tree.points_in(idx) {
                if other != target {
                    let source = &snapshot[other];
                    force += model.repulsion(position, mass, source.position(), model.mass(source));
                }
            }
            continue;
        }

        let barycenter = tree.barycenter(idx);
        let distance = position.distance_to(&barycenter.position);
        if !tree.contains_point(idx, target) && node.size() < opening_angle * distance {
            force += model.repulsion(position, mass, barycenter.position, barycenter.mass);
        } else {
            stack.extend(node.child_indices());
        }
    }
    force
}
