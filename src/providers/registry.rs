// src/providers/registry.rs
//
// Explicit provider registry, passed to the services that need it.
//
// Answers three questions only:
// - does this indexer have a scene mapping origin?
// - is this show enrolled with the mapping service?
// - what is the indexer called (for logs)?

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::config::{NumberingConfig, ProviderSettings};
use crate::domain::ProviderKind;

pub trait ProviderRegistry: Send + Sync {
    /// Mapping-service field name for this indexer's numbering, if supported
    fn scene_origin(&self, kind: ProviderKind) -> Option<String>;

    fn is_enrolled_for_mapping(&self, kind: ProviderKind, show_id: u64) -> bool;

    fn display_name(&self, kind: ProviderKind) -> String;
}

/// Registry backed by configuration plus a replaceable enrollment list.
pub struct StaticProviderRegistry {
    providers: HashMap<ProviderKind, ProviderSettings>,
    enrollment: RwLock<HashMap<ProviderKind, HashSet<u64>>>,
}

impl StaticProviderRegistry {
    pub fn new(providers: Vec<ProviderSettings>) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.kind, p)).collect(),
            enrollment: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &NumberingConfig) -> Self {
        let registry = Self::new(config.providers.clone());
        for list in &config.enrollment {
            registry.enroll(list.kind, list.show_ids.iter().copied());
        }
        registry
    }

    /// Add shows to the enrollment list of a provider
    pub fn enroll<I>(&self, kind: ProviderKind, show_ids: I)
    where
        I: IntoIterator<Item = u64>,
    {
        let mut enrollment = self
            .enrollment
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        enrollment.entry(kind).or_default().extend(show_ids);
    }

    /// Replace the enrollment list of a provider (e.g. after re-fetching it)
    pub fn replace_enrollment<I>(&self, kind: ProviderKind, show_ids: I)
    where
        I: IntoIterator<Item = u64>,
    {
        let mut enrollment = self
            .enrollment
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        enrollment.insert(kind, show_ids.into_iter().collect());
    }
}

impl ProviderRegistry for StaticProviderRegistry {
    fn scene_origin(&self, kind: ProviderKind) -> Option<String> {
        self.providers
            .get(&kind)
            .and_then(|p| p.scene_origin.clone())
            .filter(|origin| !origin.is_empty())
    }

    fn is_enrolled_for_mapping(&self, kind: ProviderKind, show_id: u64) -> bool {
        let enrollment = self
            .enrollment
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        enrollment
            .get(&kind)
            .map(|ids| ids.contains(&show_id))
            .unwrap_or(false)
    }

    fn display_name(&self, kind: ProviderKind) -> String {
        self.providers
            .get(&kind)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("indexer {}", kind))
    }
}
