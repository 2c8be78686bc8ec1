use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};
use clap::Parser;
use handmouse::{
    config::{AuxiliaryButton, Config},
    controller::GestureController,
    gesture::ClickMode,
    input::{LogSink, PointerSink},
    pipeline::{FrameSource, HandDetector, RunOptions, recognizer::replay, run_loop},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Move the mouse with your hand", long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Camera index
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// Replay recorded landmarks (JSON lines) instead of using the camera
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Pointer speed multiplier
    #[arg(short, long)]
    sensitivity: Option<f32>,

    /// Smoothing factor in (0, 1]; lower is smoother
    #[arg(long)]
    smoothing: Option<f32>,

    /// Click mode: level (repeat while pinched) or edge (once per pinch)
    #[arg(long)]
    click_mode: Option<ClickMode>,

    /// Log pointer effects instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// List cameras and exit
    #[arg(long)]
    list_cameras: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(filter));

    if args.list_cameras {
        return list_cameras();
    }

    let config = load_config(&args)?;
    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    let controller = GestureController::from_config(&config);
    let mut sink = build_sink(&config)?;
    let options = RunOptions {
        max_frames: args.max_frames,
    };

    log::info!("press Ctrl+C to stop");

    let stats = if let Some(path) = &args.replay {
        let (mut source, mut detector) = replay::open(path)?;
        run(&mut source, &mut detector, sink.as_mut(), &controller, &stop, options)?
    } else {
        run_camera(&args, &config, sink.as_mut(), &controller, &stop, options)?
    };

    log::info!(
        "stopped after {} frames ({} with a hand): {} moves, {} clicks, {} sink failures, {} detector failures",
        stats.frames,
        stats.tracked_frames,
        stats.moves,
        stats.clicks,
        stats.sink_failures,
        stats.detector_failures
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            Config::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(sensitivity) = args.sensitivity {
        config.motion.sensitivity = sensitivity;
    }
    if let Some(smoothing) = args.smoothing {
        config.motion.smoothing_factor = smoothing;
    }
    if let Some(mode) = args.click_mode {
        config.gestures.click_mode = mode;
    }
    if args.dry_run {
        config.input.dry_run = true;
    }

    config.validate()?;
    if config.gestures.right == config.gestures.auxiliary
        && config.input.auxiliary_button != AuxiliaryButton::None
    {
        log::warn!("auxiliary and right click share the same pinch; both buttons will fire together");
    }
    Ok(config)
}

fn run(
    source: &mut dyn FrameSource,
    detector: &mut dyn HandDetector,
    sink: &mut dyn PointerSink,
    controller: &GestureController,
    stop: &AtomicBool,
    options: RunOptions,
) -> Result<handmouse::pipeline::RunStats> {
    let mut last_label = String::new();
    run_loop(source, detector, sink, controller, stop, options, |_frame, report| {
        let label = report.label();
        if label != last_label {
            log::debug!("{label}");
            last_label = label;
        }
    })
}

#[cfg(feature = "input-enigo")]
fn build_sink(config: &Config) -> Result<Box<dyn PointerSink>> {
    if config.input.dry_run {
        return Ok(Box::new(LogSink));
    }
    let sink = handmouse::input::enigo::EnigoSink::new(config.input.auxiliary_button)?;
    Ok(Box::new(sink))
}

#[cfg(not(feature = "input-enigo"))]
fn build_sink(config: &Config) -> Result<Box<dyn PointerSink>> {
    if !config.input.dry_run {
        log::warn!("built without input-enigo; pointer effects are only logged");
    }
    Ok(Box::new(LogSink))
}

#[cfg(all(feature = "camera-nokhwa", feature = "backend-ort"))]
fn run_camera(
    args: &Args,
    config: &Config,
    sink: &mut dyn PointerSink,
    controller: &GestureController,
    stop: &AtomicBool,
    options: RunOptions,
) -> Result<handmouse::pipeline::RunStats> {
    use handmouse::{
        model_download::{
            default_handpose_estimator_model_path, ensure_handpose_estimator_model_ready,
            progress_bar_reporter,
        },
        pipeline::{ChannelSource, camera, recognizer::ort::OrtHandDetector},
    };
    use nokhwa::utils::CameraIndex;

    let model_path = config
        .detector
        .model_path
        .clone()
        .unwrap_or_else(default_handpose_estimator_model_path);
    ensure_handpose_estimator_model_ready(&model_path, progress_bar_reporter())?;
    let mut detector = OrtHandDetector::new(&model_path, config.detector.min_confidence)?;

    let (stream, frame_rx) = camera::start_camera_stream(CameraIndex::Index(args.camera))
        .with_context(|| format!("failed to open camera #{}", args.camera))?;
    let mut source = ChannelSource::new(frame_rx);

    let stats = run(&mut source, &mut detector, sink, controller, stop, options);
    stream.stop();
    stats
}

#[cfg(not(all(feature = "camera-nokhwa", feature = "backend-ort")))]
fn run_camera(
    _args: &Args,
    _config: &Config,
    _sink: &mut dyn PointerSink,
    _controller: &GestureController,
    _stop: &AtomicBool,
    _options: RunOptions,
) -> Result<handmouse::pipeline::RunStats> {
    anyhow::bail!("live capture needs the camera-nokhwa and backend-ort features; use --replay")
}

#[cfg(feature = "camera-nokhwa")]
fn list_cameras() -> Result<()> {
    let cameras = handmouse::pipeline::camera::available_cameras()?;
    if cameras.is_empty() {
        println!("no cameras found");
    }
    for camera in cameras {
        println!("{}", camera.label);
    }
    Ok(())
}

#[cfg(not(feature = "camera-nokhwa"))]
fn list_cameras() -> Result<()> {
    anyhow::bail!("built without camera support")
}
