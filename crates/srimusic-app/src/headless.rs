use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use srimusic_playback::{PlaybackBackend, PlaybackDriver};
use srimusic_score::{pitch_name, DisplayModel};
use tracing::info;

/// Plain-text overview of a derived model.
pub fn summarize(model: &DisplayModel) -> String {
    let mut out = String::new();
    if model.is_empty() {
        out.push_str("Score is empty.\n");
        return out;
    }
    let rows: Vec<String> = model
        .visible_pitches
        .iter()
        .map(|&pitch| pitch_name(pitch))
        .collect();
    let _ = writeln!(
        out,
        "{} notes over {:.2} beats, {} rows: {}",
        model.notes.len(),
        model.total_beats(),
        rows.len(),
        rows.join(" ")
    );
    for note in &model.notes {
        let _ = writeln!(
            out,
            "  {:<4} at {:>6.2} for {:.2} beats ({:?})",
            pitch_name(note.pitch),
            note.offset,
            note.duration,
            note.category()
        );
    }
    if !model.drum_pitches.is_empty() {
        let drums: Vec<String> = model.drum_pitches.iter().map(|&p| pitch_name(p)).collect();
        let _ = writeln!(out, "Drums: {}", drums.join(" "));
    }
    if model.intervals.is_empty() {
        out.push_str("No scale intervals.\n");
    } else {
        out.push_str("Intervals:\n");
        for interval in &model.intervals {
            let _ = writeln!(out, "  {}", interval.describe());
        }
    }
    out
}

/// Prints the summary and, when `play` is set, runs the playhead to the end
/// of the score (or until Ctrl+C).
pub fn run(
    model: &DisplayModel,
    bpm: f64,
    play: bool,
    backend: &PlaybackBackend,
    tick: Duration,
) -> anyhow::Result<()> {
    print!("{}", summarize(model));
    info!(
        notes = model.notes.len(),
        intervals = model.intervals.len(),
        bpm,
        "headless summary printed"
    );
    if !play || model.is_empty() {
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    let mut driver = PlaybackDriver::new(tick);
    driver
        .play(backend.create_player(), model.total_beats(), bpm)
        .context("failed to start playback")?;
    println!(
        "Playing {:.2} beats at {:.1} BPM via {} - press Ctrl+C to stop.",
        model.total_beats(),
        bpm,
        backend.describe()
    );

    let mut last_beat = None;
    while running.load(Ordering::SeqCst) {
        let playhead = driver.poll();
        let whole = playhead.current_beat.floor() as i64;
        if playhead.is_playing && last_beat != Some(whole) {
            last_beat = Some(whole);
            println!("  beat {whole}");
        }
        if !driver.state().is_active() {
            break;
        }
        std::thread::sleep(driver.tick_interval());
    }
    driver.stop();
    if let Some(status) = driver.status() {
        println!("{status}");
    }
    Ok(())
}
