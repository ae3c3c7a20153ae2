//! Idempotent resource primitives (check + apply pattern).
/// Variable-assignment resources.
pub mod variables;

use anyhow::Result;

use crate::logging::{EditStatus, Log};

/// State of a resource (a config file, a set of variables, ...).
///
/// # Examples
///
/// ```
/// use sysedit_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "2 variable(s) differ".into() };
/// let skip = ResourceState::Invalid { reason: "target is a directory".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// Summary of the current difference.
        current: String,
    },
    /// Resource cannot be applied.
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Interface for resources that can be checked and applied.
///
/// ```ignore
/// let state = resource.current_state()?;
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Bring the resource into the desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read or written.
    fn apply(&self) -> Result<ResourceChange>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

/// Check one resource and apply it unless `dry_run`.
///
/// `verb` names the change in log lines ("would {verb} ..."). Returns the
/// edit status and an optional message for the summary.
///
/// # Errors
///
/// Returns an error if the current state cannot be determined.
pub fn process_resource<R: Resource + ?Sized>(
    resource: &R,
    log: &dyn Log,
    dry_run: bool,
    verb: &str,
) -> Result<(EditStatus, Option<String>)> {
    let desc = resource.description();
    let state = resource.current_state()?;
    match state {
        ResourceState::Correct => {
            log.debug(&format!("ok: {desc}"));
            Ok((EditStatus::Unchanged, None))
        }
        ResourceState::Invalid { reason } => {
            log.warn(&format!("skipping {desc}: {reason}"));
            Ok((EditStatus::Failed, Some(reason)))
        }
        state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) if dry_run => {
            let msg = if let ResourceState::Incorrect { ref current } = state {
                format!("would {verb} {desc} (currently {current})")
            } else {
                format!("would {verb}: {desc}")
            };
            log.dry_run(&msg);
            Ok((EditStatus::DryRun, Some(msg)))
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => match resource.apply() {
            Ok(ResourceChange::Applied) => {
                log.debug(&format!("{verb}: {desc}"));
                Ok((EditStatus::Changed, None))
            }
            Ok(ResourceChange::AlreadyCorrect) => Ok((EditStatus::Unchanged, None)),
            Ok(ResourceChange::Skipped { reason }) => {
                log.warn(&format!("failed to {verb} {desc}: {reason}"));
                Ok((EditStatus::Failed, Some(reason)))
            }
            Err(e) => {
                log.warn(&format!("failed to {verb} {desc}: {e:#}"));
                Ok((EditStatus::Failed, Some(format!("{e:#}"))))
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{Level, MemoryLog};
    use std::cell::Cell;

    struct TestResource {
        state: ResourceState,
        change: Result<ResourceChange, String>,
        applied: Cell<bool>,
    }

    impl TestResource {
        fn new(state: ResourceState) -> Self {
            Self {
                state,
                change: Ok(ResourceChange::Applied),
                applied: Cell::new(false),
            }
        }
    }

    impl Resource for TestResource {
        fn description(&self) -> String {
            "test resource".to_string()
        }

        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.state.clone())
        }

        fn apply(&self) -> Result<ResourceChange> {
            self.applied.set(true);
            self.change.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    // ------------------------------------------------------------------
    // needs_change
    // ------------------------------------------------------------------

    #[test]
    fn needs_change_for_missing_and_incorrect() {
        assert!(TestResource::new(ResourceState::Missing).needs_change().unwrap());
        let wrong = ResourceState::Incorrect {
            current: "wrong".to_string(),
        };
        assert!(TestResource::new(wrong).needs_change().unwrap());
    }

    #[test]
    fn no_change_for_correct_or_invalid() {
        assert!(!TestResource::new(ResourceState::Correct).needs_change().unwrap());
        let invalid = ResourceState::Invalid {
            reason: "directory".to_string(),
        };
        assert!(!TestResource::new(invalid).needs_change().unwrap());
    }

    // ------------------------------------------------------------------
    // process_resource
    // ------------------------------------------------------------------

    #[test]
    fn correct_resource_is_not_applied() {
        let log = MemoryLog::new();
        let resource = TestResource::new(ResourceState::Correct);
        let (status, message) = process_resource(&resource, &log, false, "adapt").unwrap();
        assert_eq!(status, EditStatus::Unchanged);
        assert!(message.is_none());
        assert!(!resource.applied.get());
        assert!(log.contains(Level::Debug, "ok: test resource"));
    }

    #[test]
    fn dry_run_reports_without_applying() {
        let log = MemoryLog::new();
        let resource = TestResource::new(ResourceState::Incorrect {
            current: "1 variable(s) differ".to_string(),
        });
        let (status, message) = process_resource(&resource, &log, true, "adapt").unwrap();
        assert_eq!(status, EditStatus::DryRun);
        assert_eq!(
            message.as_deref(),
            Some("would adapt test resource (currently 1 variable(s) differ)")
        );
        assert!(!resource.applied.get());
    }

    #[test]
    fn missing_resource_is_applied() {
        let log = MemoryLog::new();
        let resource = TestResource::new(ResourceState::Missing);
        let (status, _) = process_resource(&resource, &log, false, "adapt").unwrap();
        assert_eq!(status, EditStatus::Changed);
        assert!(resource.applied.get());
    }

    #[test]
    fn apply_error_becomes_failed_entry() {
        let log = MemoryLog::new();
        let mut resource = TestResource::new(ResourceState::Missing);
        resource.change = Err("disk full".to_string());
        let (status, message) = process_resource(&resource, &log, false, "adapt").unwrap();
        assert_eq!(status, EditStatus::Failed);
        assert_eq!(message.as_deref(), Some("disk full"));
        assert!(log.contains(Level::Warn, "failed to adapt test resource"));
    }

    #[test]
    fn invalid_resource_is_skipped_as_failure() {
        let log = MemoryLog::new();
        let resource = TestResource::new(ResourceState::Invalid {
            reason: "is a directory".to_string(),
        });
        let (status, _) = process_resource(&resource, &log, false, "adapt").unwrap();
        assert_eq!(status, EditStatus::Failed);
        assert!(!resource.applied.get());
    }
}
