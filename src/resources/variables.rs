use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::{Resource, ResourceChange, ResourceState};
use crate::config::{FileRules, VariableRule};
use crate::logging::{Log, MemoryLog};
use crate::text::{TextProcessor, VariableChange};

/// The `NAME = VALUE` variables one config file must define.
pub struct ConfigVariables {
    /// The config file.
    pub path: PathBuf,
    /// Variables in form order.
    pub rules: Vec<VariableRule>,
    /// Backup extension for the rewritten file.
    pub backup: Option<String>,
    log: Arc<dyn Log>,
}

impl std::fmt::Debug for ConfigVariables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigVariables")
            .field("path", &self.path)
            .field("rules", &self.rules)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

impl ConfigVariables {
    /// Create a resource for `path`.
    #[must_use]
    pub const fn new(
        path: PathBuf,
        rules: Vec<VariableRule>,
        backup: Option<String>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            path,
            rules,
            backup,
            log,
        }
    }

    /// Create from the rules of one form file.
    #[must_use]
    pub fn from_rules(file: FileRules, backup: Option<String>, log: Arc<dyn Log>) -> Self {
        Self::new(file.path, file.rules, backup, log)
    }

    fn load(&self, log: Arc<dyn Log>) -> Result<TextProcessor> {
        let mut processor = TextProcessor::new(log);
        let found = processor
            .read_file(&self.path, false)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if !found {
            processor.set_content("");
        }
        Ok(processor)
    }
}

impl Resource for ConfigVariables {
    fn description(&self) -> String {
        format!("{} ({} variable(s))", self.path.display(), self.rules.len())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.path.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.path.display()),
            });
        }
        if !self.path.exists() {
            return Ok(ResourceState::Missing);
        }
        let mut processor = self.load(Arc::new(MemoryLog::new()))?;
        let differ = self
            .rules
            .iter()
            .filter(|rule| {
                !matches!(
                    processor.adapt_variable(&rule.name, &rule.value),
                    Some(VariableChange::Unchanged)
                )
            })
            .count();
        if differ == 0 {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("{differ} variable(s) differ"),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut processor = self.load(Arc::clone(&self.log))?;
        for rule in &self.rules {
            if processor.adapt_variable(&rule.name, &rule.value).is_none() {
                let line = format!("{}={}", rule.name, rule.value);
                processor.insert_by_anchor(rule.anchor.as_ref(), &line, false);
                self.log.info(&format!("added: {line}"));
            }
        }
        if !processor.has_changed() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        processor
            .write_file(None, self.backup.as_deref())
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::Level;

    const FPM: &str = "; any value\nmemory_limit = 128M\n[Session]\nsession.save_handler = files\n[opcache]\n[Debug]\n";

    fn rules(specs: &[&str]) -> Vec<VariableRule> {
        specs
            .iter()
            .map(|rule| VariableRule::parse(rule, "fpm.ini").unwrap())
            .collect()
    }

    fn resource(
        dir: &tempfile::TempDir,
        content: Option<&str>,
        specs: &[&str],
    ) -> (ConfigVariables, Arc<MemoryLog>) {
        let path = dir.path().join("fpm.ini");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        let log = Arc::new(MemoryLog::new());
        let resource = ConfigVariables::new(path, rules(specs), Some("bak".to_string()), log.clone());
        (resource, log)
    }

    #[test]
    fn counts_differing_variables() {
        let dir = tempfile::tempdir().unwrap();
        let (res, _) = resource(
            &dir,
            Some(FPM),
            &["memory_limit|128M", "session.save_handler|redis", "opcache.enable|1"],
        );
        assert_eq!(
            res.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "2 variable(s) differ".to_string()
            }
        );
    }

    #[test]
    fn matching_file_is_correct() {
        let dir = tempfile::tempdir().unwrap();
        let (res, _) = resource(&dir, Some(FPM), &["memory_limit|128M"]);
        assert_eq!(res.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(res.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn crlf_file_with_matching_values_is_correct() {
        let dir = tempfile::tempdir().unwrap();
        let (res, _) = resource(
            &dir,
            Some("memory_limit = 128M\r\nx = 1\r\n"),
            &["memory_limit|128M", "x|1"],
        );
        assert_eq!(res.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(res.apply().unwrap(), ResourceChange::AlreadyCorrect);
        assert!(!dir.path().join("fpm.bak").exists());
    }

    #[test]
    fn missing_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (res, _) = resource(&dir, None, &["a|1"]);
        assert_eq!(res.current_state().unwrap(), ResourceState::Missing);
        let log = Arc::new(MemoryLog::new());
        let res = ConfigVariables::new(dir.path().to_path_buf(), rules(&["a|1"]), None, log);
        assert!(matches!(res.current_state().unwrap(), ResourceState::Invalid { .. }));
    }

    #[test]
    fn apply_changes_and_inserts_below_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let (res, log) = resource(
            &dir,
            Some(FPM),
            &[
                "memory_limit|2048M",
                "session.save_handler|redis|^\\[Session\\]",
                "opcache.enable|1|^\\[opcache\\]",
                "upload_max_files|30",
            ],
        );
        assert_eq!(res.apply().unwrap(), ResourceChange::Applied);
        let written = std::fs::read_to_string(&res.path).unwrap();
        insta::assert_snapshot!(written.trim_end(), @r"
        ; any value
        memory_limit = 2048M
        [Session]
        session.save_handler = redis
        [opcache]
        opcache.enable=1
        [Debug]
        upload_max_files=30
        ");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("fpm.bak")).unwrap(),
            FPM
        );
        assert_eq!(
            log.messages(Level::Info)
                .into_iter()
                .filter(|m| !m.starts_with("renaming"))
                .collect::<Vec<_>>(),
            vec![
                "memory_limit: 128M -> 2048M",
                "session.save_handler: files -> redis",
                "added: opcache.enable=1",
                "added: upload_max_files=30",
            ]
        );
        assert_eq!(res.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn apply_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (res, _) = resource(&dir, None, &["a|1", "b|2"]);
        assert_eq!(res.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_to_string(&res.path).unwrap(), "a=1\nb=2\n");
    }
}
