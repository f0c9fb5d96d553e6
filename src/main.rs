//! # Stocklabel CLI
//!
//! Command-line interface for warehouse label printing.
//!
//! ## Usage
//!
//! ```bash
//! # Print a shelf label
//! stocklabel print --device 00:11:62:AA:BB:CC --barcode 4006381333931 --caption "Hex bolt M8"
//!
//! # Print a shipping label from a PDF
//! stocklabel print-pdf --device /dev/rfcomm0 --url https://example.com/label.pdf \
//!     --width-mm 100 --height-mm 150
//!
//! # Show the commands a label would send
//! stocklabel preview --barcode A-17 --caption "Return" --compact
//!
//! # Ask the printer whether it can print
//! stocklabel status --device 00:11:62:AA:BB:CC
//!
//! # Run the HTTP server
//! stocklabel serve --listen 0.0.0.0:8080 --device 00:11:62:AA:BB:CC
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use stocklabel::{
    LabelError,
    label::{LabelJob, LabelStyle, RasterSource, builder},
    printer::LabelProfile,
    render::page::default_renderer,
    server::{self, AppState, ServerConfig},
    transport::{PrintService, PrinterDevice, Readiness, RfcommConnector, StaticPermissions},
};

/// Stocklabel - Warehouse label printer utility
#[derive(Parser, Debug)]
#[command(name = "stocklabel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Label profile (JSON) to use instead of the built-in 58 x 40 mm one
    #[arg(long, global = true, value_name = "FILE")]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FixedTextArgs {
    /// Code 128 barcode content
    #[arg(long)]
    barcode: String,

    /// Caption printed under the barcode
    #[arg(long)]
    caption: Option<String>,

    /// Use the compact (returns) layout
    #[arg(long)]
    compact: bool,
}

impl FixedTextArgs {
    fn into_job(self) -> LabelJob {
        LabelJob::FixedText {
            barcode: self.barcode,
            caption: self.caption,
            style: if self.compact {
                LabelStyle::Compact
            } else {
                LabelStyle::Standard
            },
        }
    }
}

#[derive(Args, Debug)]
struct RasterArgs {
    /// Document URL or local path
    #[arg(long)]
    url: String,

    /// Label width in millimeters
    #[arg(long)]
    width_mm: f32,

    /// Label height in millimeters
    #[arg(long)]
    height_mm: f32,

    /// Printer resolution
    #[arg(long, default_value = "203")]
    dpi: u16,
}

impl RasterArgs {
    fn into_job(self) -> LabelJob {
        LabelJob::RasterImage {
            pdf_url: self.url,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
            dpi: self.dpi,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a barcode label
    Print {
        /// Printer MAC address or RFCOMM device path
        #[arg(long)]
        device: String,

        #[command(flatten)]
        label: FixedTextArgs,
    },

    /// Print a document (PDF or image) as a raster label
    PrintPdf {
        /// Printer MAC address or RFCOMM device path
        #[arg(long)]
        device: String,

        #[command(flatten)]
        label: RasterArgs,
    },

    /// Show the commands a label would send, without printing
    Preview {
        #[command(subcommand)]
        label: PreviewLabel,

        /// Save the label bitmap as PNG (raster labels only)
        #[arg(long, value_name = "FILE", global = true)]
        png: Option<PathBuf>,

        /// Write the exact bytes that would be sent
        #[arg(long, value_name = "FILE", global = true)]
        raw: Option<PathBuf>,
    },

    /// Ask the printer whether it is ready
    Status {
        /// Printer MAC address or RFCOMM device path
        #[arg(long)]
        device: String,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Printer used when a request names none
        #[arg(long)]
        device: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum PreviewLabel {
    /// Barcode label
    Barcode(FixedTextArgs),
    /// Document label
    Pdf(RasterArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();

    let profile = match &cli.profile {
        Some(path) => LabelProfile::load(path)?,
        None => LabelProfile::default(),
    };
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Print { device, label } => {
            print_job(profile, &runtime, &device, label.into_job())
        }
        Commands::PrintPdf { device, label } => {
            print_job(profile, &runtime, &device, label.into_job())
        }
        Commands::Preview { label, png, raw } => {
            let job = match label {
                PreviewLabel::Barcode(args) => args.into_job(),
                PreviewLabel::Pdf(args) => args.into_job(),
            };
            let source = RasterSource::new(default_renderer())?;
            let label = runtime.block_on(job.resolve(&source))?;
            let stream = builder::build(&label, &profile)?;

            print!("{}", stream);

            if let Some(path) = png {
                match &label {
                    stocklabel::Label::Raster { raster, .. } => {
                        raster.save_png(&path)?;
                        eprintln!("Saved bitmap to {}", path.display());
                    }
                    stocklabel::Label::FixedText { .. } => {
                        return Err(LabelError::InvalidJob(
                            "PNG preview is only available for raster labels".to_string(),
                        ));
                    }
                }
            }
            if let Some(path) = raw {
                let bytes = stream.to_bytes();
                std::fs::write(&path, &bytes)?;
                eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
            }
            Ok(())
        }
        Commands::Status { device } => {
            let service = print_service(profile);
            match service.status(&PrinterDevice::new(device))? {
                Readiness::Ready => println!("ready"),
                Readiness::NotReady(reason) => println!("not ready: {}", reason),
            }
            Ok(())
        }
        Commands::Serve { listen, device } => {
            let config = ServerConfig {
                listen_addr: listen,
                default_device: device.map(PrinterDevice::new),
            };
            let source = RasterSource::new(default_renderer())?;
            let state = AppState::new(config, print_service(profile), source);
            runtime.block_on(server::serve(state))
        }
    }
}

fn print_service(profile: LabelProfile) -> PrintService<RfcommConnector> {
    PrintService::new(
        RfcommConnector::default(),
        Arc::new(StaticPermissions::granted()),
        profile,
    )
}

fn print_job(
    profile: LabelProfile,
    runtime: &tokio::runtime::Runtime,
    device: &str,
    job: LabelJob,
) -> Result<(), LabelError> {
    let source = RasterSource::new(default_renderer())?;
    let label = runtime.block_on(job.resolve(&source))?;

    let service = print_service(profile);
    let bytes = service.print(&PrinterDevice::new(device), &label)?;
    println!("Printed {} ({} bytes)", label.summary(), bytes);
    Ok(())
}
