//! Synthesizer facade integration tests: debounced editing, change tracking
//! and rendering through the public API.

use std::time::Duration;

use sinecord::audio::{RenderProgress, Renderer};
use sinecord::instrument::{DeviceCall, RecordingDevice};
use sinecord::synth::{ManualClock, PlotUpdate, Synthesizer, Track};

fn synth() -> (Synthesizer, ManualClock) {
    let clock = ManualClock::new();
    let synth = Synthesizer::new(4)
        .with_clock(clock.clone())
        .with_duration(2.0)
        .with_renderer(Renderer::new(1000));
    (synth, clock)
}

#[test]
fn typing_burst_recompiles_once() {
    let (mut s, clock) = synth();
    let mut recompiles = 0;

    for text in ["s", "si", "sin", "sin(", "sin(x", "sin(x)"] {
        s.set_formula(0, text);
        clock.advance(Duration::from_millis(100));
        recompiles += s.update().len();
    }
    assert_eq!(recompiles, 0);

    clock.advance(Duration::from_millis(650));
    let updates = s.update();
    recompiles += updates.len();
    assert_eq!(updates, vec![PlotUpdate::Redraw(0)]);

    clock.advance(Duration::from_secs(5));
    recompiles += s.update().len();
    assert_eq!(recompiles, 1);
}

#[test]
fn has_changes_round_trip() {
    let (mut s, clock) = synth();
    assert!(s.take_program().is_some());
    assert!(!s.has_changes());

    s.set_volume(1, 0.5);
    assert!(s.has_changes());
    assert!(s.take_program().is_some());
    assert!(!s.has_changes());

    s.set_formula(0, "x");
    s.take_program();
    clock.advance(Duration::from_secs(1));
    assert_eq!(s.update().len(), 1);
    assert!(s.has_changes(), "successful recompile marks the program changed");

    s.mark_rendered();
    s.set_period(0, "1");
    assert!(s.has_changes(), "set_period");

    s.mark_rendered();
    s.set_enabled(0, true);
    assert!(s.has_changes(), "set_enabled");

    s.mark_rendered();
    s.set_voice(0, 3);
    assert!(s.has_changes(), "set_voice");

    s.mark_rendered();
    assert!(s.set_voice_by_name(2, "Tuba"));
    assert!(s.has_changes(), "set_voice_by_name");
}

#[test]
fn cleared_formula_is_silent_before_recompile() {
    let (mut s, clock) = synth();
    s.set_formula(0, "x");
    s.set_period(0, "1");
    s.set_enabled(0, true);
    clock.advance(Duration::from_secs(1));
    s.update();
    assert_eq!(s.create_program().instruments.len(), 1);

    s.set_formula(0, "");
    assert!(s.is_pending());
    assert!(s.create_program().instruments.is_empty());
    let program = s.take_program().unwrap();
    assert!(program.instruments.is_empty());
}

#[test]
fn invalid_edit_keeps_previous_sound() {
    let (mut s, clock) = synth();
    s.set_formula(0, "1");
    s.set_period(0, "1");
    s.set_enabled(0, true);
    clock.advance(Duration::from_secs(1));
    s.update();

    s.set_formula(0, "1 +");
    clock.advance(Duration::from_secs(1));
    match s.update().as_slice() {
        [PlotUpdate::Invalid { id: 0, error }] => assert!(error.to_string().contains("1:")),
        other => panic!("unexpected updates: {other:?}"),
    }

    let program = s.create_program();
    assert_eq!(program.instruments.len(), 1);
    assert_eq!(program.instruments[0].formula.eval(0.0), 1.0);
}

#[test]
fn clearing_a_formula_drops_the_instrument() {
    let (mut s, _) = synth();
    s.import_track(&Track::session_default());
    assert_eq!(s.create_program().instruments.len(), 2);

    s.set_formula(1, "");
    assert_eq!(s.flush(), vec![PlotUpdate::Clear(1)]);
    assert_eq!(s.create_program().instruments.len(), 1);
}

#[test]
fn render_if_changed_drives_the_device() {
    let (mut s, _) = synth();
    s.import_track(&Track::session_default());
    s.set_volume(1, 0.5);
    s.flush();

    let mut device = RecordingDevice::new();
    let progress = RenderProgress::new();
    let buffer = s
        .render_if_changed(&mut device, &progress)
        .expect("changes pending")
        .expect("render failed");

    assert_eq!(buffer.len(), 2000);
    assert_eq!(progress.fraction(), 1.0);
    assert!(device
        .calls
        .contains(&DeviceCall::SetVolume { channel: 1, volume: 64 }));
    assert!(!device.notes().is_empty());
    assert!(s.render_if_changed(&mut device, &progress).is_none());
}

#[test]
fn disabled_instruments_stay_silent() {
    let (mut s, _) = synth();
    s.import_track(&Track::session_default());
    s.set_enabled(0, false);
    s.set_enabled(1, false);
    let program = s.take_program().unwrap();
    assert!(program.is_empty());
}
