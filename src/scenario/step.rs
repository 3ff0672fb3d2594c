use crate::scenario::{model::ProgressBehavior, normalize::NormalizedScenario};

/// Entries executed by one `step_until_checkpoint` call, in script order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepPlan {
    pub entries: Vec<usize>,
}

impl StepPlan {
    /// Index reported to the host once the step completes.
    pub fn checkpoint(&self) -> usize {
        self.entries.last().copied().unwrap_or_default()
    }
}

/// Group the entries that follow `current` into the next step.
///
/// `opening` seeds the setup entry as the step's first member. Returns `None` when nothing is
/// left to run.
pub fn plan_step(script: &NormalizedScenario, current: usize, opening: bool) -> Option<StepPlan> {
    let len = script.len();
    let mut entries = Vec::new();
    if opening && current == 0 && len > 0 {
        entries.push(0);
    }

    let mut k = current + 1;
    while k < len {
        entries.push(k);
        if script.entries[k].is_blocking() {
            break;
        }
        k += 1;
    }

    // Trailing pull: a blocking line followed by Immediate entries keeps them in the same beat.
    if let Some(&last) = entries.last() {
        let mut k = last;
        while k + 1 < len && script.entries[k].progress == ProgressBehavior::Immediate {
            k += 1;
            entries.push(k);
        }
    }

    if entries.is_empty() {
        None
    } else {
        Some(StepPlan { entries })
    }
}

/// Every step the script splits into when played from the start.
pub fn plan_all(script: &NormalizedScenario) -> Vec<StepPlan> {
    let mut out = Vec::new();
    let mut current = 0;
    let mut opening = true;
    while let Some(plan) = plan_step(script, current, opening) {
        current = plan.checkpoint();
        opening = false;
        out.push(plan);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/step.rs"]
mod tests;
