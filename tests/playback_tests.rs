// Integration tests for the synchronized audio player
//
// Playback-clock tests run on a paused tokio clock. Fixtures are small WAV
// clips written with hound and delivered as inline base64 payloads, the
// same way the webhook attaches audio.

use base64::Engine;
use job_discovery::config::PlaybackConfig;
use job_discovery::playback::{AudioSource, PlaybackError, SyncedPlayer};
use std::time::Duration;
use tempfile::TempDir;

/// Write a silent WAV clip and return it as an inline base64 source.
fn inline_wav(duration_secs: f64, sample_rate: u32) -> anyhow::Result<AudioSource> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("fixture.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec)?;
    let sample_count = (duration_secs * f64::from(sample_rate)) as usize;
    for _ in 0..sample_count {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;

    let bytes = std::fs::read(&path)?;
    Ok(AudioSource::Inline(
        base64::engine::general_purpose::STANDARD.encode(bytes),
    ))
}

fn player() -> SyncedPlayer {
    SyncedPlayer::new(&PlaybackConfig::default())
}

#[tokio::test]
async fn test_play_before_load_fails_and_stays_stopped() {
    let player = player();

    let err = player.play().await.expect_err("play must fail");
    assert!(matches!(err, PlaybackError::NotLoaded));

    let state = player.state().await;
    assert!(!state.is_playing);
    assert_eq!(state.current_time_seconds, 0.0);
}

#[tokio::test]
async fn test_load_reports_clip_duration() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(0.5, 16000)?).await?;

    let state = player.state().await;
    assert!((state.duration_seconds - 0.5).abs() < 1e-6);
    assert!(!state.is_playing);

    let clip = player.clip().await.expect("clip should be held");
    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.channels, 1);
    assert_eq!(clip.samples.len(), 8000);

    Ok(())
}

#[tokio::test]
async fn test_second_load_is_a_no_op() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(0.5, 16000)?).await?;
    player.load(&inline_wav(2.0, 16000)?).await?;

    // The first clip stays loaded.
    let state = player.state().await;
    assert!((state.duration_seconds - 0.5).abs() < 1e-6);

    Ok(())
}

#[tokio::test]
async fn test_seek_clamps_into_track_bounds() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(30.0, 8000)?).await?;

    assert_eq!(player.seek(-5.0).await, 0.0);
    assert_eq!(player.state().await.current_time_seconds, 0.0);

    let clamped = player.seek(999.0).await;
    assert!((clamped - 30.0).abs() < 1e-6);
    assert!((player.state().await.current_time_seconds - 30.0).abs() < 1e-6);

    Ok(())
}

#[tokio::test]
async fn test_seek_notifies_subscribers_immediately() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(10.0, 8000)?).await?;

    let mut times = player.subscribe();
    player.seek(4.2).await;

    // No clock tick has run; the seek itself must have pushed the value.
    assert!((*times.borrow_and_update() - 4.2).abs() < 1e-6);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_clock_advances_while_playing() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(10.0, 8000)?).await?;

    player.play().await?;
    assert!(player.state().await.is_playing);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let state = player.state().await;
    assert!(
        (state.current_time_seconds - 0.3).abs() < 0.02,
        "clock should sit near 0.3s, got {}",
        state.current_time_seconds
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_the_clock() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(10.0, 8000)?).await?;

    player.play().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    player.pause().await;

    let frozen = player.state().await.current_time_seconds;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let state = player.state().await;
    assert!(!state.is_playing);
    assert!((state.current_time_seconds - frozen).abs() < 1e-6);

    // Pausing again is safe.
    player.pause().await;

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_resets_position_to_start() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(10.0, 8000)?).await?;

    player.play().await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    player.stop().await;

    let state = player.state().await;
    assert!(!state.is_playing);
    assert_eq!(state.current_time_seconds, 0.0);

    let mut times = player.subscribe();
    assert_eq!(*times.borrow_and_update(), 0.0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_track_end_resets_to_not_playing_at_start() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(0.5, 16000)?).await?;

    player.play().await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let state = player.state().await;
    assert!(!state.is_playing);
    assert_eq!(state.current_time_seconds, 0.0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_time_updates_flow_to_subscribers() -> anyhow::Result<()> {
    let player = player();
    player.load(&inline_wav(10.0, 8000)?).await?;

    let mut times = player.subscribe();
    player.play().await?;

    tokio::time::sleep(Duration::from_millis(250)).await;

    let latest = *times.borrow_and_update();
    assert!(latest > 0.0, "ticks should have pushed time, got {latest}");

    Ok(())
}

#[tokio::test]
async fn test_oversized_inline_payload_is_rejected_before_decode() -> anyhow::Result<()> {
    let config = PlaybackConfig {
        max_inline_audio_bytes: 64,
        ..PlaybackConfig::default()
    };
    let player = SyncedPlayer::new(&config);

    let source = inline_wav(1.0, 16000)?;
    let err = player.load(&source).await.expect_err("load must fail");
    assert!(matches!(
        err,
        PlaybackError::UnsupportedFormat { limit: 64, .. }
    ));

    // The failure leaves the player safely unloaded.
    assert!(matches!(
        player.play().await,
        Err(PlaybackError::NotLoaded)
    ));

    Ok(())
}

#[tokio::test]
async fn test_invalid_base64_payload_fails_to_load() {
    let player = player();
    let err = player
        .load(&AudioSource::Inline("not!!base64??".to_string()))
        .await
        .expect_err("load must fail");
    assert!(matches!(err, PlaybackError::Load(_)));
}

#[tokio::test]
async fn test_undecodable_payload_fails_to_load() {
    let player = player();
    let garbage = base64::engine::general_purpose::STANDARD.encode([0u8; 256]);
    let err = player
        .load(&AudioSource::Inline(garbage))
        .await
        .expect_err("load must fail");
    assert!(matches!(err, PlaybackError::Load(_)));
}
