//! Multi-component runs.
//!
//! A scalar potential and the components of its vector potential obey the
//! same wave equation, so they can share one [`Solver`] (and its workspace)
//! while each keeps its own time levels.

use serde::Serialize;

use crate::solver::integrator::{Integrator, StepReport};
use crate::solver::{Solver, SolverError};

/// One named field advanced by the simulation.
pub struct Component {
    name: String,
    integrator: Integrator,
}

impl Component {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }
}

/// Step summary for one component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub component: String,
    #[serde(flatten)]
    pub report: StepReport,
}

/// A solver plus the fields it advances.
pub struct Simulation {
    solver: Solver,
    components: Vec<Component>,
}

impl Simulation {
    pub fn new(solver: Solver) -> Self {
        Self {
            solver,
            components: Vec::new(),
        }
    }

    /// Register a field from its initial value and time derivative.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        u0: Vec<f64>,
        v0: Vec<f64>,
    ) -> Result<(), SolverError> {
        let integrator = Integrator::new(self.solver.config(), u0, v0)?;
        self.components.push(Component {
            name: name.into(),
            integrator,
        });
        Ok(())
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Advance every component by one time level.
    pub fn step(&mut self) -> Result<Vec<ComponentReport>, SolverError> {
        let solver = &mut self.solver;
        self.components
            .iter_mut()
            .map(|c| {
                let report = c.integrator.step(solver)?;
                Ok(ComponentReport {
                    component: c.name.clone(),
                    report,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, GridParams};
    use crate::fields::gaussian;

    #[test]
    fn test_components_advance_independently() {
        let config = GridConfig::new(GridParams::cube(4, 2, 0.25)).unwrap();
        let n = config.mesh_len();
        let pulse = gaussian(&config, [2.0, 2.0, 2.0], 1.0, 1.0);

        let mut sim = Simulation::new(Solver::sequential(config.clone()).unwrap());
        sim.add_component("phi", pulse.clone(), vec![0.0; n]).unwrap();
        sim.add_component("ax", vec![0.0; n], vec![0.0; n]).unwrap();

        let reports = sim.step().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].component, "phi");
        assert!(reports[0].report.max_abs > 0.0);
        assert_eq!(reports[1].report.max_abs, 0.0);

        // The same pulse stepped alone gives the same level.
        let mut solver = Solver::sequential(config.clone()).unwrap();
        let mut alone = Integrator::new(&config, pulse, vec![0.0; n]).unwrap();
        alone.step(&mut solver).unwrap();
        let phi = sim.component("phi").unwrap().integrator().current();
        assert_eq!(phi, alone.current());
        assert!(sim.component("az").is_none());
    }
}
