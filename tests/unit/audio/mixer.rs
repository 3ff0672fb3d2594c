use std::sync::Arc;

use super::*;

fn clip() -> PreparedSound {
    PreparedSound {
        url: "x.mp3".into(),
        bytes: Arc::new(Vec::new()),
    }
}

#[tokio::test(start_paused = true)]
async fn recording_mixer_tracks_lengths_on_the_tokio_clock() {
    let m = RecordingMixer::new();
    m.set_length("voice:v1", Duration::from_secs(2));
    let id = m.play(SoundChannel::Voice, "voice:v1", &clip(), PlayOptions::default());
    assert!(m.is_playing(id));
    tokio::time::advance(Duration::from_millis(1999)).await;
    assert!(m.is_playing(id));
    tokio::time::advance(Duration::from_millis(2)).await;
    assert!(!m.is_playing(id));
}

#[tokio::test(start_paused = true)]
async fn looped_clips_play_until_stopped() {
    let m = RecordingMixer::new();
    let opts = PlayOptions {
        volume: 0.5,
        looped: true,
    };
    let a = m.play(SoundChannel::Bgm, "bgm:a", &clip(), opts);
    let b = m.play(SoundChannel::Se, "se:b", &clip(), opts);
    tokio::time::advance(Duration::from_secs(60)).await;
    assert!(m.is_playing(a) && m.is_playing(b));

    m.stop_channel(SoundChannel::Bgm);
    assert!(!m.is_playing(a));
    m.stop_sound(SoundChannel::Se, "se:b");
    assert!(!m.is_playing(b));

    assert_eq!(m.played(SoundChannel::Bgm), vec!["bgm:a"]);
    assert_eq!(
        m.events().last(),
        Some(&MixerEvent::StopSound {
            channel: SoundChannel::Se,
            key: "se:b".into()
        })
    );
}

#[test]
fn stop_all_covers_every_channel() {
    let m = RecordingMixer::new();
    m.stop_all();
    assert_eq!(
        m.events(),
        vec![
            MixerEvent::StopChannel(SoundChannel::Bgm),
            MixerEvent::StopChannel(SoundChannel::Se),
            MixerEvent::StopChannel(SoundChannel::Voice),
        ]
    );
}

#[test]
fn null_mixer_hands_out_distinct_finished_ids() {
    let m = NullMixer::default();
    let a = m.play(SoundChannel::Se, "a", &clip(), PlayOptions::default());
    let b = m.play(SoundChannel::Se, "a", &clip(), PlayOptions::default());
    assert_ne!(a, b);
    assert!(!m.is_playing(a));
}
