use super::*;

#[test]
fn parses_pascal_case_script_with_defaults() {
    let json = serde_json::json!({
        "ScenarioId": "event_01_01",
        "AppearCharacters": [{ "Character2dId": 7, "CostumeType": "v2_07ichika_normal" }],
        "FirstBgm": "bgm00001",
        "Snippets": [
            { "Action": 1, "ProgressBehavior": 1, "ReferenceIndex": 0, "Delay": 0.5 }
        ],
        "TalkData": [{
            "WindowDisplayName": "Ichika",
            "Body": "Hello",
            "Voices": [{ "Character2dId": 7, "VoiceId": "voice_01", "Volume": 1.0 }],
            "RequirePlaySound": 1,
            "WhenFinishCloseWindow": true
        }]
    });
    let scenario: Scenario = serde_json::from_value(json).unwrap();
    assert_eq!(scenario.scenario_id, "event_01_01");
    assert_eq!(scenario.first_background, "");
    assert_eq!(scenario.snippets[0].action, SnippetAction::Talk);
    assert_eq!(
        scenario.snippets[0].progress_behavior,
        ProgressBehavior::WaitUntilFinished
    );
    let talk = &scenario.talk_data[0];
    assert!(talk.require_play_sound);
    assert!(!talk.require_play_effect);
    assert!(talk.when_finish_close_window);
    assert_eq!(talk.voices[0].voice_id, "voice_01");
    assert_eq!(scenario.initial_costume(7), Some("v2_07ichika_normal"));
    assert_eq!(scenario.initial_costume(8), None);
}

#[test]
fn unknown_codes_survive_parsing() {
    let json = serde_json::json!({
        "Snippets": [{ "Action": 42 }],
        "SpecialEffectData": [{ "EffectType": 99 }],
        "LayoutData": [{ "Type": 2, "SideTo": 3, "MoveSpeedType": 2 }]
    });
    let scenario: Scenario = serde_json::from_value(json).unwrap();
    assert_eq!(scenario.snippets[0].action, SnippetAction::Other(42));
    assert_eq!(
        scenario.special_effect_data[0].effect_type,
        SpecialEffectType::Other(99)
    );
    let layout = &scenario.layout_data[0];
    assert_eq!(layout.layout_type, LayoutType::Appear);
    assert_eq!(layout.side_to, LayoutSide::Right);
    assert_eq!(layout.move_speed_type, MoveSpeed::Slow);
}

#[test]
fn codes_serialize_back_to_integers() {
    let v = serde_json::to_value(SpecialEffectType::SekaiOutCenter).unwrap();
    assert_eq!(v, serde_json::json!(38));
    let v = serde_json::to_value(SnippetAction::Other(12)).unwrap();
    assert_eq!(v, serde_json::json!(12));
}

#[test]
fn malformed_script_is_a_serde_error() {
    let err = Scenario::from_json_slice(b"{ not json").unwrap_err();
    assert!(matches!(err, StageError::Serde(_)));
}
