use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

pub const HANDPOSE_ESTIMATOR_URL: &str = "https://github.com/opencv/opencv_zoo/raw/main/models/handpose_estimation_mediapipe/handpose_estimation_mediapipe_2023feb.onnx";
const HANDPOSE_ESTIMATOR_FILE: &str = "handpose_estimation_mediapipe_2023feb.onnx";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadEvent {
    Started { total: Option<u64> },
    Progress { downloaded: u64 },
    Finished,
}

pub fn default_handpose_estimator_model_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("handmouse")
        .join(HANDPOSE_ESTIMATOR_FILE)
}

/// Downloads the handpose model unless it is already on disk.
pub fn ensure_handpose_estimator_model_ready<F>(path: &Path, on_event: F) -> Result<()>
where
    F: FnMut(DownloadEvent),
{
    if path.is_file() {
        return Ok(());
    }
    log::info!("handpose model missing, downloading to {}", path.display());
    download(HANDPOSE_ESTIMATOR_URL, path, on_event)
}

fn download<F>(url: &str, path: &Path, mut on_event: F) -> Result<()>
where
    F: FnMut(DownloadEvent),
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("failed to fetch {url}"))?;
    on_event(DownloadEvent::Started {
        total: response.content_length(),
    });

    // An interrupted download must never sit at the model path.
    let partial = path.with_extension("onnx.part");
    let mut file = fs::File::create(&partial)
        .with_context(|| format!("failed to create {}", partial.display()))?;

    let mut buffer = [0u8; 64 * 1024];
    let mut downloaded = 0u64;
    loop {
        let read = response.read(&mut buffer).context("model download interrupted")?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])?;
        downloaded += read as u64;
        on_event(DownloadEvent::Progress { downloaded });
    }
    file.flush()?;
    drop(file);

    fs::rename(&partial, path)
        .with_context(|| format!("failed to move model into {}", path.display()))?;
    on_event(DownloadEvent::Finished);
    log::info!("downloaded {downloaded} bytes to {}", path.display());
    Ok(())
}

/// Terminal progress bar for `ensure_handpose_estimator_model_ready`.
pub fn progress_bar_reporter() -> impl FnMut(DownloadEvent) {
    let mut bar: Option<ProgressBar> = None;
    move |event| match event {
        DownloadEvent::Started { total } => {
            let pb = match total {
                Some(len) => ProgressBar::new(len),
                None => ProgressBar::new_spinner(),
            };
            if let Ok(style) = ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message("handpose model");
            bar = Some(pb);
        }
        DownloadEvent::Progress { downloaded } => {
            if let Some(pb) = &bar {
                pb.set_position(downloaded);
            }
        }
        DownloadEvent::Finished => {
            if let Some(pb) = bar.take() {
                pb.finish_with_message("handpose model ready");
            }
        }
    }
}
