//! API difference detection engine
//!
//! Selects checks from the registry according to a [`CheckConfig`], resolves
//! the localized messages once, and runs every selected check over element
//! pairs.

use crate::compat::categories::CheckCategory;
use crate::compat::messages::{default_registry, DirectoryMessages, Locale, MessageSource, Messages};
use crate::compat::registry::{self, CheckDescriptor};
use crate::compat::types::{CheckContext, Difference};
use crate::error::{Error, Result};
use crate::model::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

fn default_locale() -> String {
    Locale::default().as_str().to_string()
}

/// Configuration for API difference detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Categories to enable (if empty, all categories run)
    #[serde(default)]
    pub use_categories: Vec<String>,
    /// Specific checks to enable (overrides categories if specified)
    #[serde(default)]
    pub use_checks: Vec<String>,
    /// Checks to explicitly disable
    #[serde(default)]
    pub except_checks: Vec<String>,
    /// Difference codes dropped from the report
    #[serde(default)]
    pub ignore_codes: Vec<String>,
    /// Locale of the difference names and descriptions
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Directory with `messages*.yaml` bundles replacing the embedded one
    #[serde(default)]
    pub messages_dir: Option<PathBuf>,
}

impl CheckConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        #[derive(serde::Deserialize)]
        struct ConfigFile {
            #[allow(dead_code)]
            version: Option<String>,
            checks: Option<CheckConfig>,
        }

        let config_file: ConfigFile = serde_yaml::from_str(yaml)?;
        Ok(config_file.checks.unwrap_or_default())
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            use_categories: CheckCategory::all().iter().map(|c| c.id().to_string()).collect(),
            use_checks: Vec::new(),
            except_checks: Vec::new(),
            ignore_codes: Vec::new(),
            locale: default_locale(),
            messages_dir: None,
        }
    }
}

/// Result of running the engine over one or more element pairs
#[derive(Debug, Serialize)]
pub struct CheckReport<'u> {
    /// All differences found, in pair order
    pub differences: Vec<Difference<'u>>,
    /// Whether any difference is breaking in some dimension
    pub has_breaking_changes: bool,
    /// Number of differences per code
    pub summary: BTreeMap<String, usize>,
    /// Checks that ran without failure
    pub executed_checks: Vec<String>,
    /// Checks that failed on at least one pair
    pub failed_checks: Vec<String>,
}

impl<'u> CheckReport<'u> {
    pub fn new() -> Self {
        Self {
            differences: Vec::new(),
            has_breaking_changes: false,
            summary: BTreeMap::new(),
            executed_checks: Vec::new(),
            failed_checks: Vec::new(),
        }
    }

    /// Add differences to the report
    pub fn add_differences(&mut self, differences: Vec<Difference<'u>>) {
        for difference in &differences {
            self.has_breaking_changes |= difference.is_breaking();
            *self.summary.entry(difference.code.clone()).or_insert(0) += 1;
        }
        self.differences.extend(differences);
    }

    pub fn mark_check_executed(&mut self, check_id: &str) {
        self.executed_checks.push(check_id.to_string());
    }

    pub fn mark_check_failed(&mut self, check_id: &str) {
        self.failed_checks.push(check_id.to_string());
    }
}

impl Default for CheckReport<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Main engine for API difference detection
#[derive(Debug)]
pub struct CheckEngine {
    context: CheckContext,
    checks: Vec<&'static CheckDescriptor>,
    ignore_codes: HashSet<String>,
}

impl CheckEngine {
    /// Resolve messages for the configured locale and select the checks to run.
    pub fn new(config: &CheckConfig) -> Result<Self> {
        let locale = Locale::new(config.locale.as_str());
        let messages = match &config.messages_dir {
            Some(dir) => Arc::new(DirectoryMessages::new(dir).load(&locale)?),
            None => default_registry().messages(&locale)?,
        };
        Self::with_messages(config, messages)
    }

    /// Like [`CheckEngine::new`] with already resolved messages
    pub fn with_messages(config: &CheckConfig, messages: Arc<Messages>) -> Result<Self> {
        let checks = select_checks(config)?;
        tracing::debug!(
            locale = %messages.locale(),
            checks = checks.len(),
            "Check engine ready"
        );
        Ok(Self {
            context: CheckContext::new(messages),
            checks,
            ignore_codes: config.ignore_codes.iter().cloned().collect(),
        })
    }

    pub fn context(&self) -> &CheckContext {
        &self.context
    }

    /// Ids of the selected checks, in registry order
    pub fn selected_checks(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|c| c.id)
    }

    /// Run every selected check on a single pair
    pub fn check_pair<'u>(&self, old: ElementRef<'u>, new: Option<ElementRef<'u>>) -> CheckReport<'u> {
        self.check_pairs([(old, new)])
    }

    /// Run every selected check on each pair
    pub fn check_pairs<'u, I>(&self, pairs: I) -> CheckReport<'u>
    where
        I: IntoIterator<Item = (ElementRef<'u>, Option<ElementRef<'u>>)>,
    {
        let mut report = CheckReport::new();
        let mut failed = BTreeSet::new();

        for (old, new) in pairs {
            for check in &self.checks {
                match (check.run)(&self.context, old, new) {
                    Ok(Some(differences)) => {
                        let kept = differences
                            .into_iter()
                            .filter(|d| !self.ignore_codes.contains(&d.code))
                            .collect();
                        report.add_differences(kept);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(
                            check = check.id,
                            element = %old,
                            error = %e,
                            "Check failed"
                        );
                        failed.insert(check.id);
                    }
                }
            }
        }

        for check in &self.checks {
            if failed.contains(check.id) {
                report.mark_check_failed(check.id);
            } else {
                report.mark_check_executed(check.id);
            }
        }

        report
    }

    /// Get check count from the registry
    pub fn get_check_count(&self) -> usize {
        registry::get_check_count()
    }

    /// Verify registry integrity
    pub fn verify_checks(&self) -> std::result::Result<(), String> {
        registry::verify_checks()
    }
}

fn select_checks(config: &CheckConfig) -> Result<Vec<&'static CheckDescriptor>> {
    for id in config.use_checks.iter().chain(&config.except_checks) {
        if registry::find_check(id).is_none() {
            return Err(Error::UnknownCheck(id.clone()));
        }
    }

    let categories = config
        .use_categories
        .iter()
        .map(|id| CheckCategory::from_id(id).ok_or_else(|| Error::UnknownCheck(format!("category {id}"))))
        .collect::<Result<Vec<_>>>()?;

    Ok(registry::get_check_registry()
        .iter()
        .filter(|check| !config.except_checks.iter().any(|id| id == check.id))
        .filter(|check| {
            if !config.use_checks.is_empty() {
                config.use_checks.iter().any(|id| id == check.id)
            } else {
                categories.is_empty() || categories.contains(&check.category)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, AnnotationValue, Literal, Universe};

    fn annotated(value: i32) -> (Universe, crate::model::ElementId) {
        let mut universe = Universe::new();
        let package = universe.package("com.acme");
        let class = universe.class(package, "Widget");
        let ann_type = universe.declared("com.acme.Limit", &[]);
        let annotation = universe.annotate(
            class,
            ann_type,
            vec![Attribute {
                name: "max".to_string(),
                value: AnnotationValue::Literal(Literal::Int(value)),
            }],
        );
        (universe, annotation)
    }

    #[test]
    fn test_default_config() {
        let config = CheckConfig::default();
        assert_eq!(config.use_categories.len(), CheckCategory::all().len());
        assert_eq!(config.locale, "en");
        assert!(config.except_checks.is_empty());
    }

    #[test]
    fn test_engine_creation() {
        let engine = CheckEngine::new(&CheckConfig::default()).unwrap();
        assert_eq!(engine.selected_checks().count(), engine.get_check_count());
        assert!(engine.verify_checks().is_ok());
    }

    #[test]
    fn test_check_exclusion() {
        let config = CheckConfig {
            except_checks: vec!["CLASS_KIND".to_string()],
            ..CheckConfig::default()
        };
        let engine = CheckEngine::new(&config).unwrap();
        assert!(!engine.selected_checks().any(|id| id == "CLASS_KIND"));
    }

    #[test]
    fn test_use_checks_overrides_categories() {
        let config = CheckConfig {
            use_categories: vec!["CLASS".to_string()],
            use_checks: vec!["FIELD_TYPE".to_string()],
            ..CheckConfig::default()
        };
        let engine = CheckEngine::new(&config).unwrap();
        assert_eq!(engine.selected_checks().collect::<Vec<_>>(), vec!["FIELD_TYPE"]);
    }

    #[test]
    fn test_unknown_check_is_rejected() {
        let config = CheckConfig {
            use_checks: vec!["NOT_A_CHECK".to_string()],
            ..CheckConfig::default()
        };
        assert!(matches!(CheckEngine::new(&config), Err(Error::UnknownCheck(_))));
    }

    #[test]
    fn test_changed_attribute_is_reported() {
        let (old, old_ann) = annotated(1);
        let (new, new_ann) = annotated(2);
        let engine = CheckEngine::new(&CheckConfig::default()).unwrap();

        let report = engine.check_pair(old.element_ref(old_ann), Some(new.element_ref(new_ann)));

        assert_eq!(report.differences.len(), 1);
        assert_eq!(report.differences[0].code, "java.annotation.attributeValueChanged");
        assert_eq!(report.summary.get("java.annotation.attributeValueChanged"), Some(&1));
        assert!(report.failed_checks.is_empty());
        assert_eq!(report.executed_checks.len(), engine.get_check_count());
    }

    #[test]
    fn test_ignored_codes_are_dropped() {
        let (old, old_ann) = annotated(1);
        let (new, new_ann) = annotated(2);
        let config = CheckConfig {
            ignore_codes: vec!["java.annotation.attributeValueChanged".to_string()],
            ..CheckConfig::default()
        };
        let engine = CheckEngine::new(&config).unwrap();

        let report = engine.check_pair(old.element_ref(old_ann), Some(new.element_ref(new_ann)));

        assert!(report.differences.is_empty());
        assert!(!report.has_breaking_changes);
    }

    #[test]
    fn test_missing_message_marks_check_failed() {
        let (old, old_ann) = annotated(1);
        let (new, new_ann) = annotated(2);
        let messages = Arc::new(Messages::new(Locale::default(), Default::default()));
        let engine = CheckEngine::with_messages(&CheckConfig::default(), messages).unwrap();

        let report = engine.check_pair(old.element_ref(old_ann), Some(new.element_ref(new_ann)));

        assert!(report.differences.is_empty());
        assert_eq!(report.failed_checks, vec!["ANNOTATION_ATTRIBUTES"]);
    }
}
