//! Staged rule builder.
//!
//! Each stage is its own type, so a rule cannot be finished before subject,
//! behavior, direction and object have all been given, and module operands
//! cannot be mixed with layer operands. `K` is [`Modules`] or [`Layers`].

use std::sync::Arc;

use super::{Behavior, Direction, ObjectScope, Operand, Rule};
use crate::error::ConfigurationError;
use crate::filter::ModuleFilter;
use crate::layer::LayerMapping;

/// Operand kind: dotted module paths and patterns.
#[derive(Debug, Clone, Copy)]
pub struct Modules;

/// Operand kind: layer names of one mapping.
#[derive(Debug, Clone)]
pub struct Layers {
    mapping: Arc<LayerMapping>,
}

impl Layers {
    pub(crate) fn new(mapping: Arc<LayerMapping>) -> Self {
        Self { mapping }
    }

    fn operand<I, S>(&self, names: I) -> Result<Operand, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        if names.is_empty() {
            return Err(ConfigurationError::Invalid(
                "A rule operand needs at least one layer.".to_string(),
            ));
        }
        for name in &names {
            if !self.mapping.contains(name) {
                return Err(ConfigurationError::UnknownLayer(name.clone()));
            }
        }
        Ok(Operand::Layers {
            names,
            mapping: Arc::clone(&self.mapping),
        })
    }
}

fn named_modules<I, S>(
    modules: I,
    filter: fn(&str) -> Result<ModuleFilter, ConfigurationError>,
) -> Result<Operand, ConfigurationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let filters = modules
        .into_iter()
        .map(|m| filter(m.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    if filters.is_empty() {
        return Err(ConfigurationError::Invalid(
            "A rule operand needs at least one module.".to_string(),
        ));
    }
    Ok(Operand::Modules(filters))
}

fn matching(pattern: &str) -> Result<Operand, ConfigurationError> {
    Ok(Operand::Modules(vec![ModuleFilter::matching(pattern)?]))
}

/// First stage: who the rule is about.
#[derive(Debug, Clone)]
pub struct RuleSubject<K> {
    kind: K,
}

impl<K> RuleSubject<K> {
    pub(crate) fn new(kind: K) -> Self {
        Self { kind }
    }

    fn then(self, subject: Operand) -> RuleBehavior<K> {
        RuleBehavior {
            kind: self.kind,
            subject,
        }
    }
}

impl RuleSubject<Modules> {
    /// Modules named like this, including their submodules.
    pub fn are_named<I, S>(self, modules: I) -> Result<RuleBehavior<Modules>, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subject = named_modules(modules, ModuleFilter::named)?;
        Ok(self.then(subject))
    }

    /// Exactly these modules, without submodules.
    pub fn are_exactly_named<I, S>(
        self,
        modules: I,
    ) -> Result<RuleBehavior<Modules>, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subject = named_modules(modules, ModuleFilter::exact)?;
        Ok(self.then(subject))
    }

    pub fn have_name_matching(
        self,
        pattern: &str,
    ) -> Result<RuleBehavior<Modules>, ConfigurationError> {
        let subject = matching(pattern)?;
        Ok(self.then(subject))
    }

    /// Subject built from ready-made filters.
    pub fn are(self, filters: Vec<ModuleFilter>) -> Result<RuleBehavior<Modules>, ConfigurationError> {
        if filters.is_empty() {
            return Err(ConfigurationError::Invalid(
                "A rule operand needs at least one module.".to_string(),
            ));
        }
        Ok(self.then(Operand::Modules(filters)))
    }
}

impl RuleSubject<Layers> {
    pub fn are_named<I, S>(self, layers: I) -> Result<RuleBehavior<Layers>, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subject = self.kind.operand(layers)?;
        Ok(self.then(subject))
    }
}

/// Second stage: should, should only, should not.
#[derive(Debug, Clone)]
pub struct RuleBehavior<K> {
    kind: K,
    subject: Operand,
}

impl<K> RuleBehavior<K> {
    fn with(self, behavior: Behavior) -> RuleAccess<K> {
        RuleAccess {
            kind: self.kind,
            subject: self.subject,
            behavior,
        }
    }

    pub fn should(self) -> RuleAccess<K> {
        self.with(Behavior::MustAccess)
    }

    pub fn should_only(self) -> RuleAccess<K> {
        self.with(Behavior::MustOnlyAccess)
    }

    pub fn should_not(self) -> RuleAccess<K> {
        self.with(Behavior::MustNotAccess)
    }
}

/// Third stage: direction of the dependency and the shape of the object.
#[derive(Debug, Clone)]
pub struct RuleAccess<K> {
    kind: K,
    subject: Operand,
    behavior: Behavior,
}

impl<K> RuleAccess<K> {
    fn object(self, direction: Direction, except: bool) -> RuleObject<K> {
        RuleObject {
            kind: self.kind,
            subject: self.subject,
            behavior: self.behavior,
            direction,
            except,
        }
    }

    fn anything(self, direction: Direction) -> Rule {
        Rule::new(self.subject, self.behavior, direction, ObjectScope::Any)
    }
}

impl RuleAccess<Modules> {
    pub fn import_modules_that(self) -> RuleObject<Modules> {
        self.object(Direction::Imports, false)
    }

    pub fn import_modules_except_modules_that(self) -> RuleObject<Modules> {
        self.object(Direction::Imports, true)
    }

    pub fn import_anything(self) -> Rule {
        self.anything(Direction::Imports)
    }

    pub fn be_imported_by_modules_that(self) -> RuleObject<Modules> {
        self.object(Direction::ImportedBy, false)
    }

    pub fn be_imported_by_modules_except_modules_that(self) -> RuleObject<Modules> {
        self.object(Direction::ImportedBy, true)
    }

    pub fn be_imported_by_anything(self) -> Rule {
        self.anything(Direction::ImportedBy)
    }
}

impl RuleAccess<Layers> {
    pub fn access_layers_that(self) -> RuleObject<Layers> {
        self.object(Direction::Imports, false)
    }

    pub fn access_layers_except_layers_that(self) -> RuleObject<Layers> {
        self.object(Direction::Imports, true)
    }

    pub fn access_any_layer(self) -> Rule {
        self.anything(Direction::Imports)
    }

    pub fn be_accessed_by_layers_that(self) -> RuleObject<Layers> {
        self.object(Direction::ImportedBy, false)
    }

    pub fn be_accessed_by_layers_except_layers_that(self) -> RuleObject<Layers> {
        self.object(Direction::ImportedBy, true)
    }

    pub fn be_accessed_by_any_layer(self) -> Rule {
        self.anything(Direction::ImportedBy)
    }
}

/// Final stage: the object operand. Completing it yields the [`Rule`].
#[derive(Debug, Clone)]
pub struct RuleObject<K> {
    kind: K,
    subject: Operand,
    behavior: Behavior,
    direction: Direction,
    except: bool,
}

impl<K> RuleObject<K> {
    fn finish(self, object: Operand) -> Rule {
        let scope = if self.except {
            ObjectScope::Except(object)
        } else {
            ObjectScope::Named(object)
        };
        Rule::new(self.subject, self.behavior, self.direction, scope)
    }
}

impl RuleObject<Modules> {
    pub fn are_named<I, S>(self, modules: I) -> Result<Rule, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let object = named_modules(modules, ModuleFilter::named)?;
        Ok(self.finish(object))
    }

    pub fn are_exactly_named<I, S>(self, modules: I) -> Result<Rule, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let object = named_modules(modules, ModuleFilter::exact)?;
        Ok(self.finish(object))
    }

    pub fn have_name_matching(self, pattern: &str) -> Result<Rule, ConfigurationError> {
        let object = matching(pattern)?;
        Ok(self.finish(object))
    }

    pub fn are(self, filters: Vec<ModuleFilter>) -> Result<Rule, ConfigurationError> {
        if filters.is_empty() {
            return Err(ConfigurationError::Invalid(
                "A rule operand needs at least one module.".to_string(),
            ));
        }
        Ok(self.finish(Operand::Modules(filters)))
    }
}

impl RuleObject<Layers> {
    pub fn are_named<I, S>(self, layers: I) -> Result<Rule, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let object = self.kind.operand(layers)?;
        Ok(self.finish(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayeredArchitecture;

    fn mapping() -> Arc<LayerMapping> {
        let mut arch = LayeredArchitecture::new();
        arch.layer("core").unwrap().containing_modules(["app.core"]).unwrap();
        arch.layer("ui").unwrap().containing_modules(["app.ui"]).unwrap();
        arch.mapping().unwrap()
    }

    #[test]
    fn test_module_rule_description() {
        let rule = Rule::modules_that()
            .are_named(["app.core"])
            .unwrap()
            .should_not()
            .import_modules_that()
            .are_named(["app.ui"])
            .unwrap();
        assert_eq!(rule.behavior(), Behavior::MustNotAccess);
        assert_eq!(rule.direction(), Direction::Imports);
        assert_eq!(
            rule.to_string(),
            "modules [app.core] should not import modules [app.ui]"
        );
    }

    #[test]
    fn test_except_and_anything_scopes() {
        let rule = Rule::modules_that()
            .have_name_matching(r".*\.tests")
            .unwrap()
            .should_only()
            .be_imported_by_modules_except_modules_that()
            .are_exactly_named(["app"])
            .unwrap();
        assert_eq!(rule.direction(), Direction::ImportedBy);
        assert!(matches!(rule.object(), ObjectScope::Except(_)));
        assert_eq!(
            rule.to_string(),
            r"modules [/.*\.tests/] should only be imported by any modules except modules [app (exactly)]"
        );

        let rule = Rule::modules_that()
            .are_named(["app"])
            .unwrap()
            .should()
            .import_anything();
        assert_eq!(rule.object(), &ObjectScope::Any);
    }

    #[test]
    fn test_layer_rule() {
        let mapping = mapping();
        let rule = Rule::layers_that(&mapping)
            .are_named(["core"])
            .unwrap()
            .should_not()
            .access_layers_that()
            .are_named(["ui"])
            .unwrap();
        assert_eq!(rule.to_string(), "layers [core] should not access layers [ui]");
        assert!(rule.subject().layer_mapping().is_some());
    }

    #[test]
    fn test_unknown_layer_is_rejected() {
        let mapping = mapping();
        let err = Rule::layers_that(&mapping).are_named(["data"]).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownLayer(ref name) if name == "data"));
    }

    #[test]
    fn test_empty_operand_is_rejected() {
        let err = Rule::modules_that()
            .are_named(Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(_)));
    }

    #[test]
    fn test_invalid_module_name_is_rejected() {
        assert!(Rule::modules_that().are_named(["app..core"]).is_err());
    }
}
