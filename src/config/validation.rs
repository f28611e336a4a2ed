//! Structural validation of a parsed configuration.
//!
//! Checks the shape of the file only. Whether layers overlap in a concrete
//! graph is decided later, when rules are evaluated.

use anyhow::Result;
use std::collections::HashSet;

use super::{ArchitectureConfig, OperandConfig, RuleConfig};
use crate::module::ModulePath;

impl ArchitectureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            anyhow::bail!("project.name must not be empty");
        }

        if let Some(focus) = &self.graph.focus {
            if let Err(e) = ModulePath::parse(focus) {
                anyhow::bail!("graph.focus is not a module path: {}", e);
            }
        }

        let mut layer_names = HashSet::new();
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.name.trim().is_empty() {
                anyhow::bail!("layers[{}] has no name", index);
            }
            if !layer_names.insert(layer.name.as_str()) {
                anyhow::bail!("Layer {} already exists.", layer.name);
            }
            if layer.modules.is_empty() && layer.exact.is_empty() && layer.pattern.is_none() {
                anyhow::bail!(
                    "layers[{}] ({}) needs `modules`, `exact` or `pattern`",
                    index,
                    layer.name
                );
            }
        }

        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate(&layer_names)
                .map_err(|e| anyhow::anyhow!("{}: {}", rule_label(index, rule), e))?;
        }

        for (index, diagram) in self.diagrams.iter().enumerate() {
            if let Some(base) = &diagram.base_module {
                if let Err(e) = ModulePath::parse(base) {
                    anyhow::bail!("diagrams[{}].base_module is not a module path: {}", index, e);
                }
            }
        }

        Ok(())
    }
}

fn rule_label(index: usize, rule: &RuleConfig) -> String {
    match &rule.name {
        Some(name) => format!("rules[{}] ({})", index, name),
        None => format!("rules[{}]", index),
    }
}

impl RuleConfig {
    fn validate(&self, layers: &HashSet<&str>) -> Result<()> {
        let objects = [self.object.is_some(), self.any, self.except.is_some()]
            .iter()
            .filter(|given| **given)
            .count();
        if objects != 1 {
            anyhow::bail!("needs exactly one of `object`, `any` or `except`");
        }

        self.subject.validate("subject", layers)?;
        if let Some(object) = &self.object {
            object.validate("object", layers)?;
        }
        if let Some(except) = &self.except {
            except.validate("except", layers)?;
        }
        Ok(())
    }
}

impl OperandConfig {
    fn validate(&self, field: &str, layers: &HashSet<&str>) -> Result<()> {
        match (self.names_layers(), self.names_modules()) {
            (true, true) => anyhow::bail!("{} names both layers and modules", field),
            (false, false) => anyhow::bail!("{} names no layer and no module", field),
            _ => {}
        }
        for name in &self.layers {
            if !layers.contains(name.as_str()) {
                anyhow::bail!("{} references unknown layer {}", field, name);
            }
        }
        Ok(())
    }
}
