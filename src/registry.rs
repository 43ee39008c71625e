//! Phase registry for the bootstrap driver.
//!
//! A [`PhaseRegistry`] holds the total, fixed, ordered set of phases for a
//! run: (ordinal, name, action) triples. It is built once, synchronously,
//! before any phase executes, and is read-only afterwards. The sequence
//! returned by [`PhaseRegistry::ordered_phases`] is the single source of
//! truth for execution order.

use anyhow::Result;

use crate::config::BootstrapConfig;
use crate::errors::RegistryError;

/// The operation bound to a phase. Opaque to the engine: it either
/// completes or fails with an error the runner stringifies.
pub type PhaseAction = Box<dyn Fn(&BootstrapConfig) -> Result<()>>;

/// A single named, ordered unit of work.
pub struct Phase {
    /// 1-based position; defines execution order and display numbering.
    pub ordinal: u32,
    /// Symbolic name, unique within a run.
    pub name: String,
    action: PhaseAction,
}

impl Phase {
    /// Run the bound action.
    pub fn invoke(&self, config: &BootstrapConfig) -> Result<()> {
        (self.action)(config)
    }

    /// Zero-padded ordinal for display (e.g. "01").
    pub fn label(&self) -> String {
        format!("{:02}", self.ordinal)
    }
}

impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phase")
            .field("ordinal", &self.ordinal)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of phases with collision-rejecting registration.
#[derive(Debug, Default)]
pub struct PhaseRegistry {
    // Kept sorted by ordinal at insertion time.
    phases: Vec<Phase>,
}

impl PhaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a phase. Fails if the ordinal or the name collides with an
    /// already-registered phase; no other side effects.
    pub fn register(
        &mut self,
        ordinal: u32,
        name: &str,
        action: PhaseAction,
    ) -> Result<&Phase, RegistryError> {
        if let Some(existing) = self.phases.iter().find(|p| p.ordinal == ordinal) {
            return Err(RegistryError::DuplicateOrdinal {
                ordinal,
                existing: existing.name.clone(),
            });
        }
        if let Some(existing) = self.phases.iter().find(|p| p.name == name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
                existing: existing.ordinal,
            });
        }

        let insert_at = self
            .phases
            .partition_point(|p| p.ordinal < ordinal);
        self.phases.insert(
            insert_at,
            Phase {
                ordinal,
                name: name.to_string(),
                action,
            },
        );
        Ok(&self.phases[insert_at])
    }

    /// All phases, strictly in ordinal order. Pure; calling it repeatedly
    /// yields an identical sequence.
    pub fn ordered_phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}
