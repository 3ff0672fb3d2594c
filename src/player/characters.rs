use std::{cell::RefCell, collections::HashMap, time::Duration};

use tokio::time::Instant;

/// Runtime state of one character slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterState {
    pub costume: String,
    /// When the slot's model last became visible.
    pub appear_time: Option<Instant>,
    /// Persistent effects attached to the slot.
    pub animations: Vec<String>,
}

/// Slot id to runtime record. Records live until the interpreter is torn down.
#[derive(Debug, Default)]
pub struct CharacterRegistry {
    slots: RefCell<HashMap<i32, CharacterState>>,
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i32) -> Option<CharacterState> {
        self.slots.borrow().get(&id).cloned()
    }

    pub fn costume(&self, id: i32) -> Option<String> {
        self.slots
            .borrow()
            .get(&id)
            .map(|s| s.costume.clone())
            .filter(|c| !c.is_empty())
    }

    /// Apply `f` to the slot's record, creating it on first use.
    pub fn update<R>(&self, id: i32, f: impl FnOnce(&mut CharacterState) -> R) -> R {
        f(self.slots.borrow_mut().entry(id).or_default())
    }

    pub fn set_costume(&self, id: i32, costume: &str) {
        self.update(id, |s| s.costume = costume.to_owned());
    }

    pub fn mark_appeared(&self, id: i32) {
        self.update(id, |s| s.appear_time = Some(Instant::now()));
    }

    /// Time still owed before a slot that appeared at `appear_time` may be cleared.
    pub fn remaining_dwell(&self, id: i32, min_dwell: Duration) -> Duration {
        match self.get(id).and_then(|s| s.appear_time) {
            Some(t) => min_dwell.saturating_sub(t.elapsed()),
            None => Duration::ZERO,
        }
    }

    pub fn add_animation(&self, id: i32, name: &str) {
        self.update(id, |s| {
            if !s.animations.iter().any(|a| a == name) {
                s.animations.push(name.to_owned());
            }
        });
    }

    /// Remove and return every animation of the slot.
    pub fn take_animations(&self, id: i32) -> Vec<String> {
        self.update(id, |s| std::mem::take(&mut s.animations))
    }

    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/characters.rs"]
mod tests;
