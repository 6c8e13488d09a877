use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;

use roadcount::dataset::aggregate::{format_thai_datetime, hourly_buckets, total};
use roadcount::log::Log;
use roadcount::models::class_summary;
use roadcount::render::{self, OverlayRenderer, format_confidence};
use roadcount::{Dataset, DateFilter, DetectionClient, IdFilter, RecordFilter, SelectedImage, Settings};

#[derive(Parser)]
#[command(name = "roadcount")]
#[command(about = "Vehicle detection client and statistics dashboard")]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE", env = "ROADCOUNT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    log: Log,

    /// Defaults to `gui`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the desktop dashboard
    Gui,

    /// Upload an image, print its detections and export the annotated PNG
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Detection API base URL
        #[arg(long, env = "ROADCOUNT_DETECTION_ENDPOINT")]
        endpoint: Option<String>,

        /// Directory for detection_result.png
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Print the raw detections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the detection API's /health endpoint
    Health {
        #[arg(long, env = "ROADCOUNT_DETECTION_ENDPOINT")]
        endpoint: Option<String>,
    },

    /// Query the stream service's GPU status
    Gpu {
        #[arg(long, env = "ROADCOUNT_STREAM_ENDPOINT")]
        endpoint: Option<String>,
    },

    /// Print dashboard statistics for the built-in dataset
    Stats {
        /// `all` or YYYY-MM-DD
        #[arg(long, default_value = "all")]
        date: DateFilter,

        /// `all` or a camera id
        #[arg(long, default_value = "all")]
        camera: IdFilter,

        /// `all` or a vehicle type id
        #[arg(long = "type", default_value = "all")]
        vehicle_type: IdFilter,
    },

    /// Save frames from the live annotated stream
    Stream {
        #[arg(long, env = "ROADCOUNT_STREAM_ENDPOINT")]
        endpoint: Option<String>,

        /// Number of frames to capture
        #[arg(long, default_value_t = 1)]
        frames: usize,

        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    args.log.init();

    let settings = Settings::load_or_default(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(settings),
        command => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_command(command, settings))
        }
    }
}

#[cfg(feature = "gui")]
fn run_gui(settings: Settings) -> anyhow::Result<()> {
    roadcount::gui::run(settings)
}

#[cfg(not(feature = "gui"))]
fn run_gui(_settings: Settings) -> anyhow::Result<()> {
    anyhow::bail!("roadcount was built without the `gui` feature")
}

async fn run_command(command: Command, settings: Settings) -> anyhow::Result<()> {
    match command {
        Command::Gui => anyhow::bail!("the GUI must be started outside the async runtime"),
        Command::Detect {
            image_path,
            endpoint,
            out_dir,
            json,
        } => {
            let endpoint = endpoint.unwrap_or_else(|| settings.detection_endpoint.clone());
            let out_dir = out_dir.unwrap_or_else(|| settings.export_dir.clone());
            detect(&settings, &endpoint, image_path, &out_dir, json).await
        }
        Command::Health { endpoint } => {
            let endpoint = endpoint.unwrap_or(settings.detection_endpoint);
            let client = DetectionClient::new()?;
            let status = client.check_health(&endpoint).await?;
            println!("{endpoint}: {status:?}");
            if !status.is_healthy() {
                anyhow::bail!("API reports {status:?}");
            }
            Ok(())
        }
        Command::Gpu { endpoint } => {
            let endpoint = endpoint.unwrap_or(settings.stream_endpoint);
            let client = DetectionClient::new()?;
            let gpu = client.gpu_status(&endpoint).await?;
            println!("GPU available: {}", gpu.gpu_available);
            if let Some(name) = &gpu.gpu_name {
                println!("Name: {name}");
            }
            if let Some(allocated) = gpu.allocated_mb() {
                println!("Memory Allocated: {allocated}");
            }
            if let Some(reserved) = gpu.reserved_mb() {
                println!("Memory Reserved: {reserved}");
            }
            Ok(())
        }
        Command::Stats {
            date,
            camera,
            vehicle_type,
        } => {
            let dataset = Dataset::builtin()?;
            print_stats(
                &dataset,
                &RecordFilter {
                    date,
                    camera,
                    vehicle_type,
                },
            );
            Ok(())
        }
        Command::Stream {
            endpoint,
            frames,
            out_dir,
        } => {
            let endpoint = endpoint.unwrap_or(settings.stream_endpoint);
            capture_frames(&endpoint, frames, &out_dir).await
        }
    }
}

async fn detect(
    settings: &Settings,
    endpoint: &str,
    image_path: PathBuf,
    out_dir: &Path,
    json: bool,
) -> anyhow::Result<()> {
    tracing::info!("Loading image: {:?}", image_path);
    let selected = SelectedImage::open(image_path).await?;
    tracing::info!(
        "Image loaded: {}x{}",
        selected.image.width(),
        selected.image.height()
    );

    let client = DetectionClient::new()?;
    let detections = client
        .submit_image(endpoint, &selected.file_name, selected.bytes.to_vec())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detections)?);
    } else {
        println!("\n=== Detection Results ===");
        println!("Total detections: {}", detections.len());
        for (name, count) in class_summary(&detections) {
            println!("  {name}: {count}");
        }
        for det in &detections {
            println!(
                "  {} {} at {}",
                det.class_name,
                format_confidence(det.confidence),
                det.rounded_bbox()
            );
        }
    }

    let mut renderer = OverlayRenderer::from_settings(settings);
    let raster = renderer.render(&selected.image, &detections, None);
    let path = render::export_png(&raster, out_dir)?;
    println!("Annotated image written to {}", path.display());
    Ok(())
}

fn print_stats(dataset: &Dataset, filter: &RecordFilter) {
    let cards = dataset.metric_cards(filter);
    println!("รวมวันนี้: {}", cards.daily_total);
    println!("รวมสัปดาห์นี้: {}", cards.weekly_total);
    println!("บันทึกรถ (หลังกรอง): {}", cards.filtered_records);

    if let Some(counts) = filter.date.date().and_then(|d| dataset.daily_counts(d)) {
        println!("\n=== Daily share ===");
        for (name, count) in counts {
            println!("  {name}: {count}");
        }
    }
    if let Some(counts) = dataset.weekly_counts() {
        println!("\n=== Weekly ({}) ===", total(counts));
        for (name, count) in counts {
            println!("  {name}: {count}");
        }
    }

    let records = filter.apply(&dataset.records);
    println!("\n=== Hourly ===");
    for bucket in hourly_buckets(records.iter().copied()) {
        println!("  {} {}", bucket.label(), bucket.count);
    }

    println!("\n=== Records ===");
    for record in records {
        println!(
            "  #{} {} | {} | {} | {}",
            record.id,
            format_thai_datetime(record.timestamp),
            dataset.camera_name(record.camera_id),
            dataset.vehicle_type_name(record.vehicle_type_id),
            format_confidence(record.confidence)
        );
    }
}

async fn capture_frames(endpoint: &str, count: usize, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {:?}", out_dir))?;
    let client = DetectionClient::new()?;
    let frames = client.video_frames(endpoint).await?;
    let mut frames = std::pin::pin!(frames.take(count));

    let mut saved = 0;
    while let Some(frame) = frames.next().await {
        let frame = frame?;
        saved += 1;
        let path = out_dir.join(format!("frame_{saved:04}.jpg"));
        tokio::fs::write(&path, &frame)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        tracing::info!(?path, bytes = frame.len(), "saved frame");
    }
    if saved < count {
        tracing::warn!(saved, requested = count, "stream ended early");
    }
    Ok(())
}
