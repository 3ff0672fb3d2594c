//! Sound output capability. The engine never decodes audio itself; it asks a mixer to play
//! prepared clips on one of three owned channels.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    time::Duration,
};

use tokio::time::Instant;

use crate::assets::store::PreparedSound;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundChannel {
    Bgm,
    Se,
    Voice,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayOptions {
    /// Final volume in `0..=1`, user settings already applied.
    pub volume: f64,
    pub looped: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            looped: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackId(pub u64);

pub trait SoundMixer: fmt::Debug {
    fn play(
        &self,
        channel: SoundChannel,
        key: &str,
        sound: &PreparedSound,
        opts: PlayOptions,
    ) -> PlaybackId;
    fn stop(&self, id: PlaybackId);
    /// Stop every playback of `key` on `channel`.
    fn stop_sound(&self, channel: SoundChannel, key: &str);
    fn stop_channel(&self, channel: SoundChannel);
    fn is_playing(&self, id: PlaybackId) -> bool;

    fn stop_all(&self) {
        for channel in [SoundChannel::Bgm, SoundChannel::Se, SoundChannel::Voice] {
            self.stop_channel(channel);
        }
    }
}

/// Discards everything; playbacks finish instantly.
#[derive(Debug, Default)]
pub struct NullMixer {
    next: Cell<u64>,
}

impl SoundMixer for NullMixer {
    fn play(&self, _: SoundChannel, _: &str, _: &PreparedSound, _: PlayOptions) -> PlaybackId {
        let id = self.next.get() + 1;
        self.next.set(id);
        PlaybackId(id)
    }

    fn stop(&self, _: PlaybackId) {}

    fn stop_sound(&self, _: SoundChannel, _: &str) {}

    fn stop_channel(&self, _: SoundChannel) {}

    fn is_playing(&self, _: PlaybackId) -> bool {
        false
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MixerEvent {
    Play {
        id: PlaybackId,
        channel: SoundChannel,
        key: String,
        opts: PlayOptions,
    },
    Stop(PlaybackId),
    StopSound {
        channel: SoundChannel,
        key: String,
    },
    StopChannel(SoundChannel),
}

#[derive(Debug)]
struct Playback {
    channel: SoundChannel,
    key: String,
    ends_at: Option<Instant>,
}

/// Records every call and simulates clip lengths on the tokio clock.
#[derive(Debug, Default)]
pub struct RecordingMixer {
    next: Cell<u64>,
    events: RefCell<Vec<MixerEvent>>,
    lengths: RefCell<HashMap<String, Duration>>,
    live: RefCell<HashMap<PlaybackId, Playback>>,
}

impl RecordingMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips played under `key` report playing for `length` (forever when looped).
    pub fn set_length(&self, key: impl Into<String>, length: Duration) {
        self.lengths.borrow_mut().insert(key.into(), length);
    }

    pub fn events(&self) -> Vec<MixerEvent> {
        self.events.borrow().clone()
    }

    /// Keys played on `channel`, in call order.
    pub fn played(&self, channel: SoundChannel) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                MixerEvent::Play { channel: c, key, .. } if *c == channel => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl SoundMixer for RecordingMixer {
    fn play(
        &self,
        channel: SoundChannel,
        key: &str,
        _sound: &PreparedSound,
        opts: PlayOptions,
    ) -> PlaybackId {
        let id = PlaybackId(self.next.get() + 1);
        self.next.set(id.0);
        let length = self.lengths.borrow().get(key).copied().unwrap_or_default();
        // A length past the clock's range never ends, like a loop.
        let ends_at = if opts.looped {
            None
        } else {
            Instant::now().checked_add(length)
        };
        self.live.borrow_mut().insert(
            id,
            Playback {
                channel,
                key: key.to_owned(),
                ends_at,
            },
        );
        self.events.borrow_mut().push(MixerEvent::Play {
            id,
            channel,
            key: key.to_owned(),
            opts,
        });
        id
    }

    fn stop(&self, id: PlaybackId) {
        self.live.borrow_mut().remove(&id);
        self.events.borrow_mut().push(MixerEvent::Stop(id));
    }

    fn stop_sound(&self, channel: SoundChannel, key: &str) {
        self.live
            .borrow_mut()
            .retain(|_, p| !(p.channel == channel && p.key == key));
        self.events.borrow_mut().push(MixerEvent::StopSound {
            channel,
            key: key.to_owned(),
        });
    }

    fn stop_channel(&self, channel: SoundChannel) {
        self.live.borrow_mut().retain(|_, p| p.channel != channel);
        self.events
            .borrow_mut()
            .push(MixerEvent::StopChannel(channel));
    }

    fn is_playing(&self, id: PlaybackId) -> bool {
        match self.live.borrow().get(&id) {
            Some(p) => p.ends_at.is_none_or(|end| Instant::now() < end),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mixer.rs"]
mod tests;
