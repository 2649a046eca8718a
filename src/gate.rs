//! Test-before-save gate for object storage settings
//!
//! A [`ConfigChangeGate`] is an explicit value owned by whoever handles
//! a configuration-change request (one per admin session or per save
//! workflow), not ambient global state. A successful connection test
//! binds the gate to the fingerprint of the exact settings that were
//! tested; a save of changed connection settings is allowed only while
//! the gate holds a matching fingerprint. Every successful save
//! consumes the gate, so a past pass never approves a future, different
//! save.

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum GateState {
    #[default]
    Untested,
    Tested {
        fingerprint: String,
        tested_at: DateTime<Utc>,
    },
}

/// Per-session save gate for connection-relevant settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigChangeGate {
    state: GateState,
}

impl ConfigChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tested(&self) -> bool {
        matches!(self.state, GateState::Tested { .. })
    }

    /// When the current test pass was recorded, if any.
    pub fn tested_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            GateState::Tested { tested_at, .. } => Some(*tested_at),
            GateState::Untested => None,
        }
    }

    /// Record a successful connection test against the given settings
    /// fingerprint.
    pub fn record_test_pass(&mut self, fingerprint: String) {
        self.state = GateState::Tested {
            fingerprint,
            tested_at: Utc::now(),
        };
    }

    /// Drop any recorded pass. For owners that track edits to
    /// connection-relevant fields between the test and the save;
    /// `evaluate_save` catches a stale pass regardless via the
    /// fingerprint comparison.
    pub fn invalidate(&mut self) {
        self.state = GateState::Untested;
    }

    /// Reset after a successful save. A gate pass approves exactly one
    /// save.
    pub fn consume(&mut self) {
        self.state = GateState::Untested;
    }

    /// Whether saving `posted` over `persisted` requires a passed test.
    ///
    /// A test is required when object storage fields were posted and
    /// the save either enables storage or changes the connection
    /// fingerprint while storage stays enabled. Disabling never
    /// requires a test.
    pub fn requires_test(
        posted: &StorageConfig,
        persisted: &StorageConfig,
        fields_posted: bool,
    ) -> bool {
        if !fields_posted {
            return false;
        }
        let currently_enabled = persisted.enabled;
        let post_enabled = posted.enabled;

        if currently_enabled && !post_enabled {
            false
        } else if !currently_enabled && post_enabled {
            true
        } else if post_enabled {
            posted.fingerprint() != persisted.fingerprint()
        } else {
            false
        }
    }

    /// Decide whether a save may proceed.
    ///
    /// When a test is required, the save is allowed only if this gate
    /// holds a pass whose fingerprint equals the fingerprint of the
    /// posted settings; otherwise a validation error is returned and
    /// the caller must leave the persisted settings untouched.
    pub fn evaluate_save(
        &self,
        posted: &StorageConfig,
        persisted: &StorageConfig,
        fields_posted: bool,
    ) -> Result<()> {
        if !Self::requires_test(posted, persisted, fields_posted) {
            return Ok(());
        }

        let posted_fp = posted.fingerprint();
        match &self.state {
            GateState::Tested { fingerprint, .. } if *fingerprint == posted_fp => Ok(()),
            _ => Err(StorageError::Validation(
                "object storage test must pass before saving; run the connection test \
                 against these exact settings and try again"
                    .to_string(),
            )),
        }
    }
}
