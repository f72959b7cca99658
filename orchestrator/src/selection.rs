use serde::{Deserialize, Serialize};

use colmap_neural_components::Stage;

/// Whether pluggable components are used at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeuralPolicy {
    #[default]
    Enabled,
    /// Skip every stage and use the engine only
    Disabled,
}

/// Which component, if any, serves each stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSelection {
    pub policy: NeuralPolicy,
    pub extractor: Option<String>,
    pub matcher: Option<String>,
    pub densifier: Option<String>,
}

impl StageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing configured, engine only
    pub fn disabled() -> Self {
        Self {
            policy: NeuralPolicy::Disabled,
            ..Self::default()
        }
    }

    pub fn with_extractor(mut self, name: impl Into<String>) -> Self {
        self.extractor = Some(name.into());
        self
    }

    pub fn with_matcher(mut self, name: impl Into<String>) -> Self {
        self.matcher = Some(name.into());
        self
    }

    pub fn with_densifier(mut self, name: impl Into<String>) -> Self {
        self.densifier = Some(name.into());
        self
    }

    pub fn with_policy(mut self, policy: NeuralPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.policy == NeuralPolicy::Enabled
    }

    /// Component selected for `stage`. Always `None` when disabled.
    pub fn component_for(&self, stage: Stage) -> Option<&str> {
        if !self.is_enabled() {
            return None;
        }
        match stage {
            Stage::Extraction => self.extractor.as_deref(),
            Stage::Matching => self.matcher.as_deref(),
            Stage::DenseReconstruction => self.densifier.as_deref(),
        }
    }

    /// Stages that will be attempted, in execution order
    pub fn configured_stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.component_for(*stage).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_stages_keep_order() {
        let selection = StageSelection::new()
            .with_densifier("mvsnet")
            .with_extractor("superpoint");
        assert_eq!(
            selection.configured_stages(),
            vec![Stage::Extraction, Stage::DenseReconstruction]
        );
        assert_eq!(selection.component_for(Stage::Matching), None);
    }

    #[test]
    fn test_disabled_policy_hides_names() {
        let selection = StageSelection::new()
            .with_extractor("superpoint")
            .with_policy(NeuralPolicy::Disabled);
        assert!(selection.configured_stages().is_empty());
        assert_eq!(selection.component_for(Stage::Extraction), None);
        assert_eq!(StageSelection::disabled().policy, NeuralPolicy::Disabled);
    }
}
