//! Scenario files: observations, laws and queries in one TOML document.
//!
//! ```toml
//! [config.discovery]
//! min_k = 0.9
//!
//! [[observation]]
//! values = [20, 10, 2, 1]
//! labels = ["F", "m", "a", "1"]
//!
//! [[law]]
//! name = "energy split"
//! parts = ["KE", "PE"]
//! total = "E"
//!
//! [[query]]
//! target = "F"
//! inputs = { m = 10, a = 2 }
//! ```
//!
//! Running a scenario discovers every observation in file order, registers
//! the laws, then answers each query against the resulting graph.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::additive::AdditiveLaw;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{ConfigError, GraphError, TriadicResult};
use crate::infer::SolveReport;
use crate::triad::{ObservedValue, Quadruple};

/// One raw observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub values: Vec<ObservedValue>,
    pub labels: Vec<String>,
}

impl Observation {
    pub fn to_quadruple(&self) -> TriadicResult<Quadruple> {
        if self.labels.len() != 4 {
            return Err(GraphError::LabelArity {
                expected: 4,
                actual: self.labels.len(),
            }
            .into());
        }
        Ok(Quadruple::from_observed(&self.values, &self.labels)?)
    }
}

/// A solve request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub target: String,
    #[serde(default)]
    pub inputs: HashMap<String, f64>,
    /// Overrides `inference.max_steps`.
    #[serde(default)]
    pub max_steps: Option<usize>,
}

/// A parsed scenario document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Engine settings embedded in the scenario, if any.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default, rename = "observation")]
    pub observations: Vec<Observation>,
    #[serde(default, rename = "law")]
    pub laws: Vec<AdditiveLaw>,
    #[serde(default, rename = "query")]
    pub queries: Vec<Query>,
}

/// What happened to one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationOutcome {
    pub labels: Vec<String>,
    pub status: &'static str,
    pub equation: Option<String>,
    pub simplicity: Option<String>,
}

/// Results of running a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub observations: Vec<ObservationOutcome>,
    pub answers: Vec<SolveReport>,
}

impl ScenarioReport {
    pub fn accepted(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| matches!(o.status, "accepted" | "replaced"))
            .count()
    }
}

impl Scenario {
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let scenario: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        if let Some(config) = &scenario.config {
            config.validate()?;
        }
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// An engine for this scenario: the embedded config wins over `fallback`.
    pub fn engine(&self, fallback: EngineConfig) -> TriadicResult<Engine> {
        Engine::new(self.config.clone().unwrap_or(fallback))
    }

    /// Discover, register laws, answer queries.
    pub fn run(&self, engine: &Engine) -> TriadicResult<ScenarioReport> {
        let quadruples = self
            .observations
            .iter()
            .map(Observation::to_quadruple)
            .collect::<TriadicResult<Vec<_>>>()?;
        let verdicts = engine.discover_batch(&quadruples);

        let observations = quadruples
            .iter()
            .zip(&verdicts)
            .map(|(q, verdict)| ObservationOutcome {
                labels: q.labels().to_vec(),
                status: verdict.status(),
                equation: verdict.relation().map(|r| r.equation()),
                simplicity: verdict.relation().map(|r| r.simplicity().to_string()),
            })
            .collect();

        for law in &self.laws {
            engine.register_law(law.clone())?;
        }

        let answers = self
            .queries
            .iter()
            .map(|q| engine.solve_traced(&q.inputs, &q.target, q.max_steps))
            .collect();

        Ok(ScenarioReport {
            observations,
            answers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::SolveOutcome;

    const MECHANICS: &str = r#"
[[observation]]
values = [20, 10, 2, 1]
labels = ["F", "m", "a", "1"]

[[observation]]
values = [50, 5, 10, 1]
labels = ["W", "F", "d", "1"]

[[observation]]
values = [12, 18, 7, 30]
labels = ["w", "x", "y", "z"]

[[query]]
target = "W"
inputs = { m = 10, a = 2.0, d = 5 }

[[query]]
target = "z"
inputs = { w = 1.0 }
max_steps = 3
"#;

    #[test]
    fn parses_and_runs_mechanics() {
        let scenario = Scenario::from_toml_str(MECHANICS, "<test>").unwrap();
        assert_eq!(scenario.observations.len(), 3);
        assert!(scenario.config.is_none());

        let engine = scenario.engine(EngineConfig::default()).unwrap();
        let report = scenario.run(&engine).unwrap();
        assert_eq!(report.accepted(), 2);
        assert_eq!(report.observations[2].status, "below_threshold");

        assert_eq!(report.answers[0].value, Some(100.0));
        assert_eq!(report.answers[1].value, None);
        assert_eq!(report.answers[1].outcome, SolveOutcome::Stalled);
    }

    #[test]
    fn embedded_config_wins() {
        let text = format!("[config.discovery]\nmin_k = 0.001\n{MECHANICS}");
        let scenario = Scenario::from_toml_str(&text, "<test>").unwrap();
        let engine = scenario.engine(EngineConfig::default()).unwrap();
        assert_eq!(engine.config().discovery.min_k, 0.001);
        let report = scenario.run(&engine).unwrap();
        assert_eq!(report.accepted(), 3);
    }

    #[test]
    fn laws_are_registered_before_queries() {
        let text = r#"
[[law]]
name = "split"
parts = ["left", "right"]
total = "whole"

[[query]]
target = "right"
inputs = { whole = 10, left = 4 }
"#;
        let scenario = Scenario::from_toml_str(text, "<test>").unwrap();
        let engine = scenario.engine(EngineConfig::default()).unwrap();
        let report = scenario.run(&engine).unwrap();
        assert_eq!(report.answers[0].value, Some(6.0));
    }

    #[test]
    fn bad_observation_is_an_error() {
        let text = "[[observation]]\nvalues = [1, -2, 3, 4]\nlabels = [\"a\", \"b\", \"c\", \"d\"]\n";
        let scenario = Scenario::from_toml_str(text, "<test>").unwrap();
        let engine = scenario.engine(EngineConfig::default()).unwrap();
        assert!(scenario.run(&engine).is_err());

        let text = "[[observation]]\nvalues = [1, 2, 3, 4]\nlabels = [\"a\", \"b\"]\n";
        let scenario = Scenario::from_toml_str(text, "<test>").unwrap();
        assert!(scenario.run(&engine).is_err());
    }
}
