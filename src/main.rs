use clap::Parser;
use log::error;
use miniature::{config::PipelineConfig, output, process};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        let dirty = if env!("GIT_DIRTY") == "true" { "+dirty" } else { "" };
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}{dirty}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "miniature")]
#[command(about = "Dated JPEG thumbnails for a folder of videos")]
#[command(long_about = "\
Dated JPEG thumbnails for a folder of videos

Every video directly inside DIR gets a thumbnail made from its first frame,
with the capture date drawn in the top-left corner and written to the EXIF
DateTimeOriginal/DateTimeDigitized fields:

  Holiday/
  ├── beach.mp4
  ├── dinner.MOV
  └── Miniature/                   # created if missing
      ├── beach.jpg
      └── dinner.jpg

Capture date (first available wins):
  container metadata (recorded, creation, encoded, tagged date)
  → file modification time → current time

Recognized extensions: mp4 avi mov mkv flv wmv webm mpeg mpg m4v 3gp
Requires ffmpeg and ffprobe on PATH. Set RUST_LOG=info for per-file logs.")]
#[command(version = version_string())]
struct Cli {
    /// Folder containing the videos
    dir: PathBuf,

    /// Print the final report as JSON instead of the text summary
    #[arg(long)]
    json: bool,
}

/// Ctrl-C sets the returned flag; the batch stops before the next video.
fn setup_stop_signal() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupted, finishing the current video...");
    })?;
    Ok(stop)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let stop = setup_stop_signal()?;
    let config = PipelineConfig::default();

    let result = if cli.json {
        process::process_directory(&cli.dir, &config, None, Some(stop.as_ref()))?
    } else {
        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                for line in output::format_process_event(&event) {
                    println!("{}", line);
                }
            }
        });
        let result = process::process_directory(&cli.dir, &config, Some(tx), Some(stop.as_ref()));
        printer
            .join()
            .map_err(|_| "progress printer thread panicked")?;
        result?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        output::print_summary(&result);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
