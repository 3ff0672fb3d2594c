use std::{sync::Arc, time::Duration};

use tokio::time::Instant;

use super::*;
use crate::{
    assets::fetch::{IdentityVoiceLocator, MemoryFetcher, PrefixResolver},
    audio::mixer::RecordingMixer,
    scenario::model::{
        ProgressBehavior, Scenario, Snippet, SnippetAction, SpecialEffectData,
        SpecialEffectType, TalkData,
    },
};

fn scenario() -> Scenario {
    let talk = |body: &str| TalkData {
        body: body.into(),
        ..TalkData::default()
    };
    let snippet = |action, reference| Snippet {
        action,
        reference_index: reference,
        progress_behavior: ProgressBehavior::WaitUntilFinished,
        ..Snippet::default()
    };
    Scenario {
        scenario_id: "host".into(),
        talk_data: vec![talk("one"), talk("two")],
        special_effect_data: vec![SpecialEffectData {
            effect_type: SpecialEffectType::Telop,
            string_val: "Day 1".into(),
            ..SpecialEffectData::default()
        }],
        snippets: vec![
            snippet(SnippetAction::Talk, 0),
            snippet(SnippetAction::SpecialEffect, 0),
            snippet(SnippetAction::Talk, 1),
        ],
        ..Scenario::default()
    }
}

fn host(settings: PlayerSettings) -> PlaybackHost {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("story.json", serde_json::to_vec(&scenario()).unwrap());
    let preloader = Preloader::new(
        Arc::new(fetcher),
        Arc::new(PrefixResolver::default()),
        Arc::new(IdentityVoiceLocator),
        &settings,
    );
    PlaybackHost::new(
        preloader,
        Rc::new(RecordingMixer::new()),
        settings,
        StageSize::default(),
    )
}

fn story(url: &str) -> StoryRef {
    StoryRef {
        scenario_url: url.into(),
        ..StoryRef::default()
    }
}

#[tokio::test(start_paused = true)]
async fn load_then_advance_through_checkpoints() {
    let host = host(PlayerSettings::default());
    assert_eq!(host.state(), PlayerState::Ready);
    host.load(&story("story.json")).await.unwrap();
    assert_eq!(host.state(), PlayerState::Loaded);
    assert!(!host.is_finished());

    assert_eq!(host.advance().await.unwrap(), 1);
    assert_eq!(host.current_step(), 1);
    assert_eq!(host.state(), PlayerState::Loaded);
    assert_eq!(host.advance().await.unwrap(), 2);
    assert_eq!(host.advance().await.unwrap(), 3);
    assert!(host.is_finished());
    assert_eq!(host.advance().await.unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn play_to_end_pauses_between_checkpoints() {
    let settings = PlayerSettings {
        autoplay_delay_ms: 1000,
        typewriter: false,
        ..PlayerSettings::default()
    };
    let host = host(settings);
    host.load(&story("story.json")).await.unwrap();
    let mut seen = Vec::new();
    let start = Instant::now();
    let last = host.play_to_end(|step| seen.push(step)).await.unwrap();
    assert_eq!(last, 3);
    assert_eq!(seen, vec![1, 2, 3]);
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn failed_load_returns_to_ready() {
    let host = host(PlayerSettings::default());
    let err = host.load(&story("missing.json")).await.unwrap_err();
    assert!(matches!(err, StageError::Scenario(_)));
    assert_eq!(host.state(), PlayerState::Ready);
    assert!(host.controller().is_none());
    assert!(host.advance().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn load_story_goes_through_the_resolver() {
    let host = host(PlayerSettings::default());
    let key = StoryKey {
        story_type: "event".into(),
        story_id: "1".into(),
        region: "jp".into(),
    };
    let resolver = |key: &StoryKey| -> StageResult<StoryRef> {
        if key.region == "jp" {
            Ok(story("story.json"))
        } else {
            Err(StageError::scenario("unknown region"))
        }
    };
    host.load_story(&resolver, &key).await.unwrap();
    assert_eq!(host.state(), PlayerState::Loaded);

    let other = StoryKey {
        region: "xx".into(),
        ..key
    };
    assert!(host.load_story(&resolver, &other).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn resize_fits_sixteen_by_nine_and_unload_resets() {
    let host = host(PlayerSettings::default());
    host.load(&story("story.json")).await.unwrap();
    let stage = host.resize(Size::new(1000.0, 1000.0)).unwrap();
    assert!((stage.width - 1000.0).abs() < 1e-9);
    assert!((stage.height - 562.5).abs() < 1e-9);
    assert_eq!(host.controller().unwrap().stage_size(), stage);
    assert!(host.resize(Size::new(0.0, 10.0)).is_err());

    host.unload();
    assert_eq!(host.state(), PlayerState::Ready);
    assert!(host.controller().is_none());
}
