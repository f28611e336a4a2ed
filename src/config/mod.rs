//! Declarative architecture configuration.
//!
//! The configuration lives in `.strata/architecture.md`: a markdown file whose
//! YAML frontmatter names the dependency manifest, graph options, layers,
//! rules and diagrams. The markdown body is free-form documentation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diagram::DiagramRule;
use crate::error::ConfigurationError;
use crate::filter::ModuleFilter;
use crate::graph::GraphOptions;
use crate::layer::{LayerMapping, LayeredArchitecture};
use crate::module::ModulePath;
use crate::paths;
use crate::rule::{Behavior, Direction, ObjectScope, Operand, Rule};
use crate::source::DependencySource;

pub mod validation;

#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    #[serde(default)]
    pub diagrams: Vec<DiagramConfig>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Dependency manifest (YAML or JSON), relative to the config file.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("dependencies.yaml")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub include_external: bool,
    #[serde(default)]
    pub level_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

/// One side of a rule: layers, or module filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperandConfig {
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorConfig {
    Should,
    ShouldOnly,
    ShouldNot,
}

impl From<BehaviorConfig> for Behavior {
    fn from(value: BehaviorConfig) -> Self {
        match value {
            BehaviorConfig::Should => Behavior::MustAccess,
            BehaviorConfig::ShouldOnly => Behavior::MustOnlyAccess,
            BehaviorConfig::ShouldNot => Behavior::MustNotAccess,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessConfig {
    #[default]
    Imports,
    ImportedBy,
}

impl From<AccessConfig> for Direction {
    fn from(value: AccessConfig) -> Self {
        match value {
            AccessConfig::Imports => Direction::Imports,
            AccessConfig::ImportedBy => Direction::ImportedBy,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub subject: OperandConfig,
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub object: Option<OperandConfig>,
    #[serde(default)]
    pub any: bool,
    #[serde(default)]
    pub except: Option<OperandConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagramConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub base_module: Option<String>,
    #[serde(default)]
    pub should_only: bool,
}

/// A configured rule and the label it is reported under.
#[derive(Debug, Clone)]
pub struct NamedRule {
    pub name: String,
    pub rule: Rule,
}

impl ArchitectureConfig {
    /// Load `.strata/architecture.md` from the current directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(paths::CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config.base_dir = config_base_dir(path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let (frontmatter, _body) = split_frontmatter(content);
        let frontmatter = frontmatter.context("Failed to extract frontmatter from config")?;

        let config: ArchitectureConfig =
            serde_yaml::from_str(&frontmatter).context("Failed to parse config frontmatter")?;

        config.validate()?;

        Ok(config)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve_path(&self.project.manifest)
    }

    pub fn load_source(&self) -> Result<DependencySource> {
        DependencySource::load(&self.manifest_path())
    }

    pub fn graph_options(&self) -> Result<GraphOptions, ConfigurationError> {
        let mut options = GraphOptions::new().include_external(self.graph.include_external);
        if let Some(focus) = &self.graph.focus {
            options = options.with_focus(ModulePath::parse(focus)?);
        }
        if let Some(level_limit) = self.graph.level_limit {
            options = options.with_level_limit(level_limit);
        }
        Ok(options)
    }

    /// Declare and populate every configured layer, in file order.
    pub fn architecture(&self) -> Result<LayeredArchitecture, ConfigurationError> {
        let mut architecture = LayeredArchitecture::new();
        for layer in &self.layers {
            architecture
                .layer(&layer.name)?
                .containing(layer.filters()?)?;
        }
        Ok(architecture)
    }

    pub fn rules(&self, mapping: &Arc<LayerMapping>) -> Result<Vec<NamedRule>, ConfigurationError> {
        self.rules
            .iter()
            .map(|config| {
                let rule = config.to_rule(mapping)?;
                let name = config.name.clone().unwrap_or_else(|| rule.to_string());
                Ok(NamedRule { name, rule })
            })
            .collect()
    }

    pub fn diagrams(&self) -> Result<Vec<DiagramRule>> {
        self.diagrams
            .iter()
            .map(|config| {
                let path = self.resolve_path(&config.path);
                let mut diagram = DiagramRule::from_file(&path)
                    .with_context(|| format!("Failed to load diagram {}", path.display()))?;
                if let Some(base) = &config.base_module {
                    diagram = diagram.base_module(base)?;
                }
                if config.should_only {
                    diagram = diagram.should_only();
                }
                Ok(diagram)
            })
            .collect()
    }
}

fn config_base_dir(path: &Path) -> PathBuf {
    // `.strata/architecture.md` describes the directory containing `.strata`.
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    match parent.file_name() {
        Some(name) if name == paths::STRATA_DIR => {
            parent.parent().unwrap_or_else(|| Path::new("")).to_path_buf()
        }
        _ => parent.to_path_buf(),
    }
}

impl LayerConfig {
    pub fn filters(&self) -> Result<Vec<ModuleFilter>, ConfigurationError> {
        collect_filters(&self.modules, &self.exact, self.pattern.as_deref())
    }
}

fn collect_filters(
    modules: &[String],
    exact: &[String],
    pattern: Option<&str>,
) -> Result<Vec<ModuleFilter>, ConfigurationError> {
    let mut filters = Vec::new();
    for module in modules {
        filters.push(ModuleFilter::named(module)?);
    }
    for module in exact {
        filters.push(ModuleFilter::exact(module)?);
    }
    if let Some(pattern) = pattern {
        filters.push(ModuleFilter::matching(pattern)?);
    }
    Ok(filters)
}

impl OperandConfig {
    pub fn names_layers(&self) -> bool {
        !self.layers.is_empty()
    }

    pub fn names_modules(&self) -> bool {
        !self.modules.is_empty() || !self.exact.is_empty() || self.pattern.is_some()
    }

    pub fn to_operand(&self, mapping: &Arc<LayerMapping>) -> Result<Operand, ConfigurationError> {
        if self.names_layers() {
            if let Some(unknown) = self.layers.iter().find(|name| !mapping.contains(name)) {
                return Err(ConfigurationError::UnknownLayer(unknown.clone()));
            }
            return Ok(Operand::Layers {
                names: self.layers.clone(),
                mapping: Arc::clone(mapping),
            });
        }
        let filters = collect_filters(&self.modules, &self.exact, self.pattern.as_deref())?;
        if filters.is_empty() {
            return Err(ConfigurationError::Invalid(
                "A rule operand needs at least one module.".to_string(),
            ));
        }
        Ok(Operand::Modules(filters))
    }
}

impl RuleConfig {
    pub fn to_rule(&self, mapping: &Arc<LayerMapping>) -> Result<Rule, ConfigurationError> {
        let subject = self.subject.to_operand(mapping)?;
        let object = match (&self.object, self.any, &self.except) {
            (Some(object), false, None) => ObjectScope::Named(object.to_operand(mapping)?),
            (None, true, None) => ObjectScope::Any,
            (None, false, Some(except)) => ObjectScope::Except(except.to_operand(mapping)?),
            _ => {
                return Err(ConfigurationError::Invalid(
                    "A rule needs exactly one of `object`, `any` or `except`.".to_string(),
                ))
            }
        };
        Ok(Rule::new(
            subject,
            self.behavior.into(),
            self.access.into(),
            object,
        ))
    }
}

/// Split `---` delimited YAML frontmatter from the markdown body.
pub fn split_frontmatter(content: &str) -> (Option<String>, &str) {
    let content = content.trim_start();

    let Some(rest) = content.strip_prefix("---") else {
        return (None, content);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if offset > 0 && line.trim_end() == "---" {
            let frontmatter = rest[..offset].to_string();
            let body = rest[offset + line.len()..].trim_start();
            return (Some(frontmatter), body);
        }
        offset += line.len();
    }
    (None, content)
}
