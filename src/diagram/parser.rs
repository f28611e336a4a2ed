//! PlantUML component diagram parsing.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::module::{ModulePath, ModulePathError};
use crate::source::DependencySource;

const START_TAG: &str = "@startuml";
const END_TAG: &str = "@enduml";

#[derive(Debug, Error)]
pub enum DiagramParseError {
    #[error("PUML file needs a start and an end tag.")]
    MissingTags,

    #[error("Failed to read diagram {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Modules and declared dependencies read from a diagram, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDependencies {
    pub all_modules: BTreeSet<String>,
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl ParsedDependencies {
    pub fn new(
        all_modules: BTreeSet<String>,
        dependencies: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            all_modules,
            dependencies,
        }
    }

    /// Modules `module` has an arrow to.
    pub fn dependencies_of(&self, module: &str) -> BTreeSet<String> {
        self.dependencies.get(module).cloned().unwrap_or_default()
    }

    fn add_dependency(&mut self, importer: &str, imported: &str) {
        self.all_modules.insert(importer.to_string());
        self.all_modules.insert(imported.to_string());
        self.dependencies
            .entry(importer.to_string())
            .or_default()
            .insert(imported.to_string());
    }

    /// The diagram as a dependency source, so it can be checked like code.
    pub fn into_source(self) -> Result<DependencySource, ModulePathError> {
        let mut source = DependencySource::new();
        for module in &self.all_modules {
            source.add_module(ModulePath::parse(module)?);
        }
        for (importer, targets) in &self.dependencies {
            let importer = ModulePath::parse(importer)?;
            for imported in targets {
                source.add_import(importer.clone(), ModulePath::parse(imported)?);
            }
        }
        Ok(source.with_ancestors())
    }
}

fn arrow_regex() -> &'static Regex {
    static ARROW: OnceLock<Regex> = OnceLock::new();
    ARROW.get_or_init(|| {
        Regex::new(
            r"^(?P<left>\[[^\]]+\]|\w+(?:\.\w+)*)\s*(?P<arrow><?[-.]+(?:(?:left|right|up|down|le|ri|do|l|r|u|d)[-.]+)?>?)\s*(?P<right>\[[^\]]+\]|\w+(?:\.\w+)*)\s*(?::.*)?$",
        )
        .expect("arrow pattern is valid")
    })
}

fn component_regex() -> &'static Regex {
    static COMPONENT: OnceLock<Regex> = OnceLock::new();
    COMPONENT.get_or_init(|| {
        Regex::new(
            r"^(?:component\s+(?P<named>\[[^\]]+\]|\w+(?:\.\w+)*)|(?P<bracketed>\[[^\]]+\]))(?:\s+as\s+(?P<alias>\w+))?\s*$",
        )
        .expect("component pattern is valid")
    })
}

fn strip_brackets(token: &str) -> &str {
    token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(token)
        .trim()
}

/// Reads component diagrams: `[A] --> [B]` means A depends on B.
#[derive(Debug, Default, Clone, Copy)]
pub struct PumlParser;

impl PumlParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path) -> Result<ParsedDependencies, DiagramParseError> {
        let content = fs::read_to_string(path).map_err(|source| DiagramParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&content)
    }

    pub fn parse_str(&self, content: &str) -> Result<ParsedDependencies, DiagramParseError> {
        let body = diagram_body(content)?;

        // Components first, so arrows may use aliases declared further down.
        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut parsed = ParsedDependencies::default();
        for line in &body {
            if let Some(caps) = component_regex().captures(line) {
                let token = caps
                    .name("named")
                    .or_else(|| caps.name("bracketed"))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                let name = strip_brackets(token).to_string();
                if let Some(alias) = caps.name("alias") {
                    aliases.insert(alias.as_str().to_string(), name.clone());
                }
                parsed.all_modules.insert(name);
            }
        }

        let resolve = |token: &str| -> String {
            let name = strip_brackets(token);
            aliases
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string())
        };

        for line in &body {
            let Some(caps) = arrow_regex().captures(line) else {
                continue;
            };
            let arrow = &caps["arrow"];
            let left = resolve(&caps["left"]);
            let right = resolve(&caps["right"]);
            if arrow.ends_with('>') {
                parsed.add_dependency(&left, &right);
            }
            if arrow.starts_with('<') {
                parsed.add_dependency(&right, &left);
            }
        }

        tracing::debug!(
            modules = parsed.all_modules.len(),
            importers = parsed.dependencies.len(),
            "parsed diagram"
        );
        Ok(parsed)
    }
}

/// Trimmed, non-comment lines between the start and end tags.
fn diagram_body(content: &str) -> Result<Vec<&str>, DiagramParseError> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();
    let start = lines
        .iter()
        .position(|line| line.starts_with(START_TAG))
        .ok_or(DiagramParseError::MissingTags)?;
    let end = lines[start..]
        .iter()
        .position(|line| line.starts_with(END_TAG))
        .map(|offset| start + offset)
        .ok_or(DiagramParseError::MissingTags)?;

    Ok(lines[start + 1..end]
        .iter()
        .copied()
        .filter(|line| !line.is_empty() && !line.starts_with('\''))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_start_tag() {
        let err = PumlParser::new().parse_str("[A] --> [B]\n@enduml").unwrap_err();
        assert_eq!(err.to_string(), "PUML file needs a start and an end tag.");
    }

    #[test]
    fn test_missing_end_tag() {
        let err = PumlParser::new().parse_str("@startuml\n[A] --> [B]\n").unwrap_err();
        assert!(matches!(err, DiagramParseError::MissingTags));
    }

    #[test]
    fn test_simple_dependency() {
        let parsed = PumlParser::new()
            .parse_str("@startuml\n[M_A] --> [M_B]\n@enduml\n")
            .unwrap();
        assert_eq!(parsed.all_modules, set(&["M_A", "M_B"]));
        assert_eq!(parsed.dependencies_of("M_A"), set(&["M_B"]));
        assert!(parsed.dependencies_of("M_B").is_empty());
    }

    #[test]
    fn test_arrow_variants_and_labels() {
        let diagram = "\
@startuml
title Components
' a comment --> [ignored]
component [runtime]
component util
[services] as svc
svc ..> [model] : reads
[model] <- [persistence]
runtime -down-> util
[exporter] -> [model]
skinparam componentStyle rectangle
@enduml
text after the diagram --> ignored
";
        let parsed = PumlParser::new().parse_str(diagram).unwrap();
        assert_eq!(
            parsed.all_modules,
            set(&["exporter", "model", "persistence", "runtime", "services", "util"])
        );
        assert_eq!(parsed.dependencies_of("services"), set(&["model"]));
        assert_eq!(parsed.dependencies_of("persistence"), set(&["model"]));
        assert_eq!(parsed.dependencies_of("runtime"), set(&["util"]));
        assert_eq!(parsed.dependencies_of("exporter"), set(&["model"]));
        assert!(!parsed.all_modules.contains("svc"));
    }

    #[test]
    fn test_into_source_adds_ancestors() {
        let parsed = PumlParser::new()
            .parse_str("@startuml\n[app.ui] --> [app.core]\n@enduml")
            .unwrap();
        let source = parsed.into_source().unwrap();
        assert!(source.is_internal(&ModulePath::parse("app").unwrap()));
        assert_eq!(source.imports.len(), 1);
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let err = PumlParser::new()
            .parse(Path::new("/nonexistent/diagram.puml"))
            .unwrap_err();
        assert!(matches!(err, DiagramParseError::Io { .. }));
    }
}
