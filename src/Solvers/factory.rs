use super::command_solver::CommandSolver;
use super::solver_api::{ExternalSolver, SolverBackend};
use super::solver_error::SolverError;
use std::collections::HashMap;

/// Solvers registered under string keys
pub struct SolverFactory {
    solvers: HashMap<String, SolverBackend>,
}

impl SolverFactory {
    pub fn new() -> Self {
        SolverFactory {
            solvers: HashMap::new(),
        }
    }

    /// one command-line backend per `key -> executable` entry
    pub fn from_executables<'a, I>(executables: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut factory = SolverFactory::new();
        for (key, exe) in executables {
            factory.register(key, CommandSolver::new(key, exe.as_str()));
        }
        factory
    }

    /// registers (or replaces) a backend
    pub fn register(&mut self, key: &str, solver: impl Into<SolverBackend>) {
        self.solvers.insert(key.to_string(), solver.into());
    }

    pub fn register_custom<S: ExternalSolver + 'static>(&mut self, key: &str, solver: S) {
        let boxed: Box<dyn ExternalSolver> = Box::new(solver);
        self.register(key, boxed);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.solvers.contains_key(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut SolverBackend, SolverError> {
        self.solvers
            .get_mut(key)
            .ok_or_else(|| SolverError::UnknownSolver(key.to_string()))
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.solvers.keys().map(|k| k.as_str()).collect();
        keys.sort();
        keys
    }
}

impl Default for SolverFactory {
    fn default() -> Self {
        Self::new()
    }
}
