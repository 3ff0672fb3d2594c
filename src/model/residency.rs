use crate::scenario::normalize::NormalizedScenario;

pub const DEFAULT_QUEUE_MAX: usize = 2;

/// Precompute which costumes are resident at every entry.
///
/// The window is least-recently-referenced first. Costumes the current entry needs are never
/// evicted for it unless the entry alone needs more than `queue_max`, in which case its
/// oldest references give way.
pub fn residency_queue(script: &NormalizedScenario, queue_max: usize) -> Vec<Vec<String>> {
    let queue_max = queue_max.max(1);
    let mut window: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(script.len());
    for entry in &script.entries {
        let required = entry.costumes();
        for costume in &required {
            window.retain(|c| c != costume);
            window.push((*costume).to_owned());
        }
        while window.len() > queue_max {
            let victim = window
                .iter()
                .position(|c| !required.contains(&c.as_str()))
                .unwrap_or(0);
            window.remove(victim);
        }
        out.push(window.clone());
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/model/residency.rs"]
mod tests;
