use std::time::Duration;

use algoscope_steps::sorting::SortAlgorithm;
use algoscope_vis::{AppState, PlaybackMode, RunRequest, VisConfig};

fn sorting(input: &[i64]) -> RunRequest {
    RunRequest::Sorting { algorithm: SortAlgorithm::Selection, input: input.to_vec() }
}

#[tokio::test(start_paused = true)]
async fn run_play_and_replace_mid_playback() {
    let state = AppState::new(VisConfig::default());
    let player = state.player();

    let loaded = state.run(&sorting(&[6, 5, 4, 3, 2, 1])).await.unwrap();
    let first_generation = loaded.generation;
    player.play().await;
    tokio::time::sleep(Duration::from_millis(650)).await;
    assert_eq!(player.status().await.cursor, 3);

    // A new run replaces the stream and strands the old timer.
    let replaced = state.run(&sorting(&[2, 1])).await.unwrap();
    assert!(replaced.generation > first_generation);
    assert_eq!(replaced.mode, PlaybackMode::Ready);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(player.status().await.cursor, 0);

    player.set_speed(50).await;
    player.play().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    let status = player.status().await;
    assert_eq!(status.mode, PlaybackMode::Finished);
    assert_eq!(status.cursor, status.total_steps);
}

#[tokio::test(start_paused = true)]
async fn seek_while_playing_keeps_running() {
    let state = AppState::new(VisConfig::default());
    let player = state.player();
    state.run(&sorting(&[9, 8, 7, 6, 5, 4, 3, 2, 1])).await.unwrap();

    player.play().await;
    player.seek(4).await;
    tokio::time::sleep(Duration::from_millis(250)).await;
    let status = player.status().await;
    assert_eq!(status.cursor, 5);
    assert_eq!(status.mode, PlaybackMode::Playing);
}
