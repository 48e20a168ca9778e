// src/services/repair_service.rs
//
// Provider numbering repair
//
// Walks a show's catalog episodes in native order and fills holes and
// regressions in the four numbering fields by carrying the last good value
// forward (+1). Each field is tracked independently.

use log::debug;
use std::sync::Arc;

use crate::domain::{EpisodeFieldUpdate, NumberingField, ShowIdentity};
use crate::error::AppResult;
use crate::events::{EventBus, ProviderNumberingRepaired};
use crate::repositories::CatalogRepository;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub episodes_scanned: usize,
    pub writes: usize,
}

pub struct RepairService {
    catalog: Arc<dyn CatalogRepository>,
    event_bus: Arc<EventBus>,
}

impl RepairService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, event_bus: Arc<EventBus>) -> Self {
        Self { catalog, event_bus }
    }

    /// Repair one show. A read failure aborts before anything is written.
    pub fn fix_provider_numbering(&self, show: &ShowIdentity) -> AppResult<RepairReport> {
        debug!("Fixing scene mapping issues for show {}", show);

        let episodes = self.catalog.get_episodes(show)?;

        let mut last_good: [Option<u32>; 4] = [None; 4];
        let mut updates = Vec::new();

        for episode in &episodes {
            for (slot, field) in NumberingField::ALL.iter().enumerate() {
                let current = episode.field(*field);
                let corrected = corrected_value(*field, current, last_good[slot]);

                if corrected != current {
                    updates.push(EpisodeFieldUpdate::new(
                        *show,
                        episode.native(),
                        *field,
                        corrected,
                    ));
                }
                // last good never moves backwards
                last_good[slot] = last_good[slot].max(corrected);
            }
        }

        let writes = if updates.is_empty() {
            0
        } else {
            self.catalog.batch_apply(&updates)?;
            updates.len()
        };

        debug!(
            "Repaired show {}: {} episodes scanned, {} fields corrected",
            show,
            episodes.len(),
            writes
        );

        if writes > 0 {
            self.event_bus
                .emit(ProviderNumberingRepaired::new(*show, episodes.len(), writes));
        }

        Ok(RepairReport {
            episodes_scanned: episodes.len(),
            writes,
        })
    }
}

/// Carry-forward rule for one field.
///
/// Unset after a good value becomes last + 1. A value below the last good
/// one becomes last + 1; absolute numbers also may not repeat.
/// When last + 1 does not fit, the field is left as it is.
fn corrected_value(field: NumberingField, current: Option<u32>, last_good: Option<u32>) -> Option<u32> {
    let (last, next) = match last_good {
        Some(last) => match last.checked_add(1) {
            Some(next) => (last, next),
            None => return current,
        },
        None => return current,
    };

    match current {
        None => Some(next),
        Some(value) if value < last => Some(next),
        Some(value) if field.is_absolute() && value == last => Some(next),
        Some(value) => Some(value),
    }
}
