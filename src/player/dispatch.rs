//! Per-instruction dispatch. Nothing here fails: missing assets and unsupported kinds are
//! logged and skipped so playback keeps moving.

use std::time::Duration;

use futures::future::{join, join_all};
use tracing::{debug, warn};

use crate::{
    animation::{curve::Curve, signal::AbortSignal},
    assets::store::AssetKind,
    audio::mixer::{PlayOptions, PlaybackId, SoundChannel},
    foundation::{core::Rgba8, math::positive_seconds},
    model::{
        position::{move_duration, side_position},
        registry::MotionKind,
    },
    player::controller::{DIALOG_FADE, ScenarioController},
    scenario::{
        model::{LayoutType, SoundData, SoundPlayMode, SpecialEffectData, SpecialEffectType},
        normalize::{Action, LayoutAction, TalkAction},
    },
    stage::{layer::Layer, sekai::SekaiDirection, stack::AmbientColor, wipe::WipeDirection},
};

const COLOR_FADE: Duration = Duration::from_secs(1);
const LAYER_FADE: Duration = Duration::from_millis(300);
const MODEL_FADE: Duration = Duration::from_millis(300);
const SHAKE: Duration = Duration::from_millis(800);
const WIPE: Duration = Duration::from_millis(500);
const SEKAI: Duration = Duration::from_millis(1500);

/// Script seconds, or `default` when unset.
fn seconds_or(v: f64, default: Duration) -> Duration {
    positive_seconds(v).unwrap_or(default)
}

fn wipe_of(effect: SpecialEffectType) -> Option<(WipeDirection, bool)> {
    use SpecialEffectType as E;
    Some(match effect {
        E::BlackWipeInLeft => (WipeDirection::Left, false),
        E::BlackWipeOutLeft => (WipeDirection::Left, true),
        E::BlackWipeInRight => (WipeDirection::Right, false),
        E::BlackWipeOutRight => (WipeDirection::Right, true),
        E::BlackWipeInTop => (WipeDirection::Top, false),
        E::BlackWipeOutTop => (WipeDirection::Top, true),
        E::BlackWipeInBottom => (WipeDirection::Bottom, false),
        E::BlackWipeOutBottom => (WipeDirection::Bottom, true),
        _ => return None,
    })
}

fn sekai_of(effect: SpecialEffectType) -> Option<(SekaiDirection, bool)> {
    use SpecialEffectType as E;
    Some(match effect {
        E::SekaiIn => (SekaiDirection::In, false),
        E::SekaiOut => (SekaiDirection::Out, false),
        E::SekaiInCenter => (SekaiDirection::In, true),
        E::SekaiOutCenter => (SekaiDirection::Out, true),
        _ => return None,
    })
}

impl ScenarioController {
    /// Execute one instruction to completion (or to its terminal state on abort).
    pub async fn apply_action(&self, signal: &AbortSignal, action: &Action) {
        match action {
            Action::Talk(talk) => self.talk(signal, talk).await,
            Action::Layout(layout) => self.layout(signal, layout).await,
            Action::Motion(layout) => {
                let data = &layout.data;
                self.play_motion(signal, &layout.costume, &data.motion_name, &data.facial_name)
                    .await;
            }
            Action::Effect(effect) => self.special_effect(signal, effect).await,
            Action::Sound(sound) => self.sound(sound),
            Action::Unknown { action, reference } => {
                warn!(?action, reference, "unsupported instruction skipped");
            }
        }
    }

    fn slot_costume(&self, id: i32) -> Option<String> {
        self.characters
            .costume(id)
            .or_else(|| self.scenario.initial_costume(id).map(str::to_owned))
    }

    fn play_sound(
        &self,
        channel: SoundChannel,
        kind: AssetKind,
        name: &str,
        opts: PlayOptions,
    ) -> Option<PlaybackId> {
        let Some(sound) = self.ctx.store.sound(kind, name) else {
            warn!(sound = name, ?channel, "sound not preloaded");
            return None;
        };
        Some(self.mixer.play(channel, &kind.key(name), sound, opts))
    }

    async fn play_motion(&self, signal: &AbortSignal, costume: &str, motion: &str, expression: &str) {
        join(
            self.models
                .update_motion(signal, MotionKind::Motion, costume, motion),
            self.models
                .update_motion(signal, MotionKind::Expression, costume, expression),
        )
        .await;
    }

    async fn talk(&self, signal: &AbortSignal, talk: &TalkAction) {
        let stack = &self.stack;
        if stack.telop.core().is_shown() {
            stack.telop.core().hide(signal, LAYER_FADE, false).await;
        }
        stack.dialog.draw(&talk.data.window_display_name, &talk.data.body);
        stack.dialog.core().show(signal, DIALOG_FADE, false).await;

        let motions = join_all(
            talk.motions
                .iter()
                .map(|m| self.play_motion(signal, &m.costume, &m.motion, &m.expression)),
        );
        let voice_volume = self.ctx.settings.voice_volume;
        for cue in &talk.voices {
            let Some(sound) = self.ctx.store.sound(AssetKind::Voice, &cue.voice_id) else {
                warn!(voice = %cue.voice_id, "voice not preloaded");
                continue;
            };
            let key = AssetKind::Voice.key(&cue.voice_id);
            let volume = cue.volume * voice_volume;
            let through_model = cue
                .costume
                .as_deref()
                .and_then(|c| self.models.speak(c, &key, sound, volume));
            if through_model.is_none() {
                let opts = PlayOptions {
                    volume,
                    looped: false,
                };
                let id = self.mixer.play(SoundChannel::Voice, &key, sound, opts);
                self.voices.borrow_mut().push(id);
            }
        }
        join(stack.dialog.animate_text(signal), motions).await;

        if talk.data.when_finish_close_window {
            stack.dialog.core().hide(signal, DIALOG_FADE, false).await;
        }
    }

    async fn layout(&self, signal: &AbortSignal, layout: &LayoutAction) {
        let data = &layout.data;
        let costume = layout.costume.as_str();
        let id = data.character2d_id;
        if costume.is_empty() {
            warn!(character = id, "layout on a slot without a costume");
            return;
        }
        let Some(model) = self.models.find(costume) else {
            warn!(costume, "layout on a model that is not resident");
            return;
        };
        let time = move_duration(data.move_speed_type);
        let to = side_position(data.side_to, data.side_to_offset_x);

        match data.layout_type {
            LayoutType::Motion => {
                let movement = async {
                    if let Some(to) = to {
                        self.models.move_model(signal, costume, None, to, time).await;
                    }
                };
                join(
                    self.play_motion(signal, costume, &data.motion_name, &data.facial_name),
                    movement,
                )
                .await;
            }
            LayoutType::Appear => {
                self.characters.set_costume(id, costume);
                let animations = self
                    .characters
                    .get(id)
                    .map(|s| s.animations)
                    .unwrap_or_default();
                for name in animations {
                    self.models.add_effect(costume, &name);
                }
                // Settle the end pose while hidden, then replay the timed motion once visible.
                self.models
                    .apply_pose(costume, &data.motion_name, &data.facial_name);
                let to = to.unwrap_or_else(|| model.position());
                let from = side_position(data.side_from, data.side_from_offset_x).unwrap_or(to);
                self.models.set_position(costume, from);
                self.characters.mark_appeared(id);
                join(
                    self.models.show_model(signal, costume, MODEL_FADE),
                    self.models.move_model(signal, costume, Some(from), to, time),
                )
                .await;
                self.play_motion(signal, costume, &data.motion_name, &data.facial_name)
                    .await;
            }
            LayoutType::Clear => {
                if let Some(to) = to
                    && to != model.position()
                {
                    self.models.move_model(signal, costume, None, to, time).await;
                }
                let dwell = self
                    .characters
                    .remaining_dwell(id, self.ctx.settings.min_dwell());
                self.ctx.animation.delay(signal, dwell).await;
                self.models.hide_model(signal, costume, MODEL_FADE).await;
            }
            other => warn!(layout = ?other, costume, "unsupported layout skipped"),
        }
    }

    fn sound(&self, sound: &SoundData) {
        let settings = &self.ctx.settings;
        let stop = sound.play_mode == SoundPlayMode::Stop;
        if sound.bgm.is_empty() && sound.se.is_empty() {
            if stop {
                self.mixer.stop_channel(SoundChannel::Bgm);
            }
            return;
        }
        if !sound.bgm.is_empty() {
            self.mixer.stop_channel(SoundChannel::Bgm);
            if !stop {
                let opts = PlayOptions {
                    volume: sound.volume * settings.bgm_volume,
                    looped: true,
                };
                self.play_sound(SoundChannel::Bgm, AssetKind::Bgm, &sound.bgm, opts);
            }
        }
        if !sound.se.is_empty() {
            let volume = sound.volume * settings.se_volume;
            match sound.play_mode {
                SoundPlayMode::Stop => self
                    .mixer
                    .stop_sound(SoundChannel::Se, &AssetKind::Se.key(&sound.se)),
                SoundPlayMode::SpecialSePlay => {
                    let opts = PlayOptions {
                        volume,
                        looped: true,
                    };
                    self.play_sound(SoundChannel::Se, AssetKind::Se, &sound.se, opts);
                }
                SoundPlayMode::CrossFade | SoundPlayMode::Stack | SoundPlayMode::Other(_) => {
                    let opts = PlayOptions {
                        volume,
                        looped: false,
                    };
                    self.play_sound(SoundChannel::Se, AssetKind::Se, &sound.se, opts);
                }
            }
        }
    }

    async fn special_effect(&self, signal: &AbortSignal, effect: &SpecialEffectData) {
        use SpecialEffectType as E;
        let stack = &self.stack;
        let kind = effect.effect_type;
        if let Some((direction, cover)) = wipe_of(kind) {
            let time = seconds_or(effect.duration, WIPE);
            stack.wipe.wipe(signal, direction, cover, time).await;
            return;
        }
        if let Some((direction, centered)) = sekai_of(kind) {
            let time = seconds_or(effect.duration, SEKAI);
            stack.sekai.play(signal, direction, centered, time).await;
            return;
        }
        match kind {
            E::BlackIn | E::WhiteIn => {
                let color = if kind == E::BlackIn {
                    Rgba8::BLACK
                } else {
                    Rgba8::WHITE
                };
                stack.full_color.draw(color);
                let time = seconds_or(effect.duration, COLOR_FADE);
                stack.full_color.core().hide(signal, time, true).await;
            }
            E::BlackOut | E::WhiteOut => {
                let color = if kind == E::BlackOut {
                    Rgba8::BLACK
                } else {
                    Rgba8::WHITE
                };
                stack.full_color.draw(color);
                let time = seconds_or(effect.duration, COLOR_FADE);
                stack.full_color.core().show(signal, time, true).await;
            }
            E::ShakeScreen | E::ShakeWindow => {
                let target = if kind == E::ShakeScreen {
                    &stack.world
                } else {
                    stack.dialog.core()
                };
                let amplitude = self.ctx.stage_size().height * 0.015;
                let time = seconds_or(effect.duration, SHAKE);
                let x = Curve::shake(amplitude, 8, 0.0);
                let y = Curve::shake(amplitude * 0.6, 6, 0.25);
                target.shake(signal, x, y, time).await;
            }
            E::StopShakeScreen => stack.world.stop_shake(),
            E::StopShakeWindow => stack.dialog.core().stop_shake(),
            E::ChangeBackground | E::ChangeBackgroundStill | E::ChangeCardStill => {
                stack.background.draw(&effect.string_val);
            }
            E::Telop | E::PlaceInfo => {
                stack.telop.draw(&effect.string_val);
                stack.telop.core().show(signal, LAYER_FADE, false).await;
            }
            E::FlashbackIn => {
                stack.flashback.draw();
                stack.flashback.core().show(signal, LAYER_FADE, false).await;
            }
            E::FlashbackOut => stack.flashback.core().hide(signal, LAYER_FADE, false).await,
            E::AmbientColorNormal => stack.set_ambient(AmbientColor::Normal),
            E::AmbientColorEvening => stack.set_ambient(AmbientColor::Evening),
            E::AmbientColorNight => stack.set_ambient(AmbientColor::Night),
            E::PlayScenarioEffect => stack.scene_effect.play(&effect.string_val),
            E::StopScenarioEffect => {
                if !stack.scene_effect.stop(&effect.string_val) {
                    debug!(effect = %effect.string_val, "scene effect was not playing");
                }
            }
            E::AttachCharacterShader => self.attach_shader(effect),
            E::FullScreenText => {
                let layer = &stack.fullscreen_text;
                layer.draw(&effect.string_val);
                layer.core().show(signal, LAYER_FADE, false).await;
                if !effect.string_val_sub.is_empty() {
                    let opts = PlayOptions {
                        volume: self.ctx.settings.voice_volume,
                        looped: false,
                    };
                    let played = self.play_sound(
                        SoundChannel::Voice,
                        AssetKind::Voice,
                        &effect.string_val_sub,
                        opts,
                    );
                    if let Some(id) = played {
                        self.voices.borrow_mut().push(id);
                    }
                }
                layer.animate_text(signal).await;
            }
            E::FullScreenTextShow => {
                stack.fullscreen_text.core().show(signal, LAYER_FADE, false).await;
            }
            E::FullScreenTextHide => {
                stack.fullscreen_text.core().hide(signal, LAYER_FADE, false).await;
            }
            other => warn!(effect = ?other, "unsupported special effect skipped"),
        }
    }

    /// `string_val` names the effect, `int_val` the character slot. An empty or `"none"` name
    /// detaches everything the slot carries.
    fn attach_shader(&self, effect: &SpecialEffectData) {
        let id = effect.int_val;
        let Some(costume) = self.slot_costume(id) else {
            warn!(character = id, "shader on an unknown character");
            return;
        };
        let name = effect.string_val.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            for animation in self.characters.take_animations(id) {
                self.models.remove_effect(&costume, &animation);
            }
            return;
        }
        self.characters.add_animation(id, name);
        if !self.models.add_effect(&costume, name) {
            debug!(costume = %costume, effect = name, "shader deferred until the model is resident");
        }
    }
}
