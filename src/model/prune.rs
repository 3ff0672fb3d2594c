use std::collections::BTreeMap;

use tracing::warn;

use crate::{model::data::MotionCatalog, scenario::normalize::NormalizedScenario};

/// Motion and expression names each costume is asked to play, sorted and deduplicated.
pub fn used_motions(script: &NormalizedScenario) -> BTreeMap<String, MotionCatalog> {
    let mut used: BTreeMap<String, MotionCatalog> = BTreeMap::new();
    let requests = script
        .entries
        .iter()
        .flat_map(|e| e.actions.iter())
        .flat_map(|a| a.motion_requests());
    for (costume, motion, expression) in requests {
        let names = used.entry(costume.to_owned()).or_default();
        if !motion.is_empty() && !names.has_motion(motion) {
            names.motions.push(motion.to_owned());
        }
        if !expression.is_empty() && !names.has_expression(expression) {
            names.expressions.push(expression.to_owned());
        }
    }
    for names in used.values_mut() {
        names.motions.sort();
        names.expressions.sort();
    }
    used
}

/// Keep only catalog entries `used` names, sorted; used names missing from the catalog are reported.
pub fn prune_catalog(costume: &str, catalog: &MotionCatalog, used: &MotionCatalog) -> MotionCatalog {
    for name in used.motions.iter().filter(|m| !catalog.has_motion(m)) {
        warn!(costume, motion = %name, "motion not in catalog");
    }
    for name in used
        .expressions
        .iter()
        .filter(|e| !catalog.has_expression(e))
    {
        warn!(costume, expression = %name, "expression not in catalog");
    }
    let mut pruned = MotionCatalog {
        motions: catalog
            .motions
            .iter()
            .filter(|m| used.has_motion(m))
            .cloned()
            .collect(),
        expressions: catalog
            .expressions
            .iter()
            .filter(|e| used.has_expression(e))
            .cloned()
            .collect(),
    };
    pruned.motions.sort();
    pruned.expressions.sort();
    pruned
}

#[cfg(test)]
#[path = "../../tests/unit/model/prune.rs"]
mod tests;
