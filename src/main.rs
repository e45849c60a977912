//! Sinecord CLI: evaluate formulas, inspect schedules and render tracks.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use sinecord::audio::{Player, RenderProgress, Renderer};
use sinecord::config::Config;
use sinecord::event::schedule;
use sinecord::expr::{Compiler, Evaluator};
use sinecord::instrument::{formula_note, note_name, ToneDevice, VOICES};
use sinecord::synth::{load_track, PlotUpdate, SynthProgram, Synthesizer, Track};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "sinecord")]
#[command(version, about = "Formula-driven music synthesis", long_about = None)]
struct Cli {
    /// Config file (default: ~/.sinecord/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a formula and print its values
    Eval {
        formula: String,

        /// First x value
        #[arg(long, default_value = "0")]
        from: f64,

        /// Last x value
        #[arg(long, default_value = "6.283185307179586")]
        to: f64,

        /// Distance between x values
        #[arg(long, default_value = "0.5")]
        step: f64,
    },
    /// Print the merged note onsets of a track
    Schedule {
        /// Track file (.yaml, .yml or .json); the starter session if omitted
        track: Option<PathBuf>,
    },
    /// Render a track to audio
    Render {
        /// Track file (.yaml, .yml or .json); the starter session if omitted
        track: Option<PathBuf>,

        /// Write a 16-bit stereo WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write raw interleaved 16-bit little-endian PCM
        #[arg(long)]
        pcm: Option<PathBuf>,

        /// Play the result on the default output device
        #[arg(long)]
        play: bool,
    },
    /// List the available voices
    Voices,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path).ok_or_else(|| {
            format!("cannot read config {}", path.display())
        })?,
        None => Config::load(),
    };

    match cli.command {
        Commands::Eval {
            formula,
            from,
            to,
            step,
        } => eval(&formula, from, to, step),
        Commands::Schedule { track } => {
            let program = build_program(&config, track.as_deref())?;
            print_schedule(&program);
            Ok(())
        }
        Commands::Render {
            track,
            output,
            pcm,
            play,
        } => {
            let program = build_program(&config, track.as_deref())?;
            render(&config, program, output.as_deref(), pcm.as_deref(), play)
        }
        Commands::Voices => {
            for (index, voice) in VOICES.iter().enumerate() {
                println!("{index:>2}  {:<18} {:?}", voice.name, voice.kind);
            }
            Ok(())
        }
    }
}

fn eval(formula: &str, from: f64, to: f64, step: f64) -> Result<(), Box<dyn Error>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(format!("step must be positive, got {step}").into());
    }
    let program = Compiler::compile(formula)?;
    if !program.functions().is_empty() {
        println!("uses: {}", program.functions().join(", "));
    }

    let mut evaluator = Evaluator::new();
    let mut k = 0u64;
    loop {
        let x = from + k as f64 * step;
        if x > to + 1e-9 {
            break;
        }
        println!("{x:>10.4}  {:>12.6}", evaluator.run(&program, x));
        k += 1;
    }
    Ok(())
}

fn build_program(config: &Config, track: Option<&Path>) -> Result<SynthProgram, Box<dyn Error>> {
    let track = match track {
        Some(path) => load_track(path)?,
        None => Track::session_default(),
    };

    let mut synth = Synthesizer::from_config(config);
    for update in synth.import_track(&track) {
        if let PlotUpdate::Invalid { id, error } = update {
            warn!(id, "instrument keeps no program: {error}");
        }
    }
    let program = synth.create_program();
    info!(
        track = %track.name,
        instruments = program.instruments.len(),
        duration = program.duration,
        "program ready"
    );
    Ok(program)
}

fn print_schedule(program: &SynthProgram) {
    let mut evaluator = Evaluator::new();
    for event in schedule(&program.schedule_input(), program.duration) {
        let inst = &program.instruments[event.index];
        let y = evaluator.run(&inst.formula, event.time);
        let note = formula_note(y).map_or_else(|| "rest".to_string(), note_name);
        println!("{:>9.4}  #{}  {:>10.4}  {}", event.time, event.id, y, note);
    }
}

fn render(
    config: &Config,
    program: SynthProgram,
    output: Option<&Path>,
    pcm: Option<&Path>,
    play: bool,
) -> Result<(), Box<dyn Error>> {
    let progress = RenderProgress::new();
    let stop = Arc::new(AtomicBool::new(false));
    {
        let progress = progress.clone();
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            progress.cancel();
            stop.store(true, Ordering::SeqCst);
        })?;
    }

    let worker = {
        let progress = progress.clone();
        let mut device =
            ToneDevice::new(config.sample_rate, config.seed).with_master_volume(config.master_volume);
        let mut renderer = Renderer::new(config.sample_rate).with_velocity(config.note_velocity);
        thread::spawn(move || renderer.render(&program, &mut device, &progress))
    };

    while !worker.is_finished() {
        thread::sleep(PROGRESS_INTERVAL);
        info!("rendering: {:.0}%", progress.fraction() * 100.0);
    }
    let buffer = worker
        .join()
        .map_err(|_| "render thread panicked")??;
    info!(
        seconds = buffer.duration(),
        peak = buffer.peak(),
        "render complete"
    );

    if let Some(path) = output {
        buffer.write_wav(path)?;
        info!(path = %path.display(), "wrote WAV");
    }
    if let Some(path) = pcm {
        std::fs::write(path, buffer.to_pcm16_le())?;
        info!(path = %path.display(), "wrote PCM");
    }

    if play {
        let mut player = Player::new(buffer.sample_rate)?;
        player.play(&buffer)?;
        info!("playing, Ctrl-C to stop");
        while !player.is_finished() && !stop.load(Ordering::SeqCst) {
            thread::sleep(PROGRESS_INTERVAL);
        }
        if stop.load(Ordering::SeqCst) {
            player.stop()?;
            info!("playback stopped");
        }
    }
    Ok(())
}
