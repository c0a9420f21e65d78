//! # labelkit CLI
//!
//! Command-line interface for FBA label rendering and printing.
//!
//! ## Usage
//!
//! ```bash
//! # Render a label to PNG (with the safe-zone guide)
//! labelkit render --fnsku X001234567 --title "Silicone Spatula Set" \
//!     --condition "Used - Good" --sku ABC-1 --safe-zone -o label.png
//!
//! # Print the label saved by the web editor
//! labelkit print --from-store
//!
//! # Print to a CUPS queue instead of a raw device
//! labelkit print --fnsku X001234567 --size 2.25x1.25 --target lp:Zebra
//!
//! # Run the web editor
//! labelkit serve --listen 0.0.0.0:8080 --device /dev/usb/lp0
//!
//! # List label sizes
//! labelkit sizes
//! ```
//!
//! Every option also reads from `LABELKIT_*` environment variables (see
//! `labelkit::config`); flags win.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use labelkit::{
    LabelKitError,
    canvas::{self, MAX_DPI, MIN_DPI, RenderMode},
    config::AppConfig,
    label::{Condition, IdentifierAdvisory, LabelRecord, LabelSize},
    preview::LivePreview,
    print::{self, PrintTarget},
    server,
    storage::{FileStore, LabelStore},
};

/// labelkit - FBA label designer for thermal label printers
#[derive(Parser, Debug)]
#[command(name = "labelkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a label to a PNG file
    Render {
        #[command(flatten)]
        label: LabelArgs,

        /// Output PNG file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Draw the dashed safe-zone guide
        #[arg(long)]
        safe_zone: bool,
    },

    /// Print a label
    Print {
        #[command(flatten)]
        label: LabelArgs,

        /// Print target: device path, `lp:<printer>` or `png:<file>`
        #[arg(long)]
        target: Option<PrintTarget>,
    },

    /// Run the web editor
    Serve {
        /// Address to listen on
        #[arg(long)]
        listen: Option<String>,

        /// Printer device path (or any print target string)
        #[arg(long)]
        device: Option<String>,

        /// Print through this spooler queue instead of a device
        #[arg(long)]
        printer: Option<String>,

        /// File holding the persisted label
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        /// Storage layout: `blob` or `per_field`
        #[arg(long)]
        layout: Option<String>,

        /// Require sign-in before the editor is usable
        #[arg(long)]
        require_sign_in: bool,

        /// Allow only this email to sign in (repeatable)
        #[arg(long = "allowed-email", value_name = "EMAIL")]
        allowed_emails: Vec<String>,
    },

    /// List supported label sizes
    Sizes,
}

/// Label content for `render` and `print`.
#[derive(Args, Debug)]
struct LabelArgs {
    /// Start from the label saved by the web editor
    #[arg(long)]
    from_store: bool,

    /// FNSKU to encode
    #[arg(long)]
    fnsku: Option<String>,

    /// Product title
    #[arg(long)]
    title: Option<String>,

    /// Item condition, e.g. "New" or "Used - Good"
    #[arg(long)]
    condition: Option<String>,

    /// Merchant SKU
    #[arg(long)]
    sku: Option<String>,

    /// Label size: 4x6 or 2.25x1.25
    #[arg(long)]
    size: Option<String>,

    /// Printer resolution in dots per inch (100-600)
    #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_DPI as i64..=MAX_DPI as i64))]
    dpi: Option<u32>,
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

fn run() -> Result<(), LabelKitError> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    config.validate()?;

    match cli.command {
        Commands::Render {
            label,
            output,
            safe_zone,
        } => {
            let dpi = label.dpi.unwrap_or(config.dpi);
            let record = label.record(&config)?;
            let canvas = compose(&record, dpi, RenderMode::Preview { safe_zone })?;
            std::fs::write(&output, canvas.to_png()?)?;
            println!(
                "Wrote {} ({}x{} dots, {})",
                output.display(),
                canvas.width(),
                canvas.height(),
                record.label_size.display_name()
            );
            Ok(())
        }

        Commands::Print { label, target } => {
            let dpi = label.dpi.unwrap_or(config.dpi);
            let record = label.record(&config)?;
            let target = match target {
                Some(target) => target,
                None => config.print_target()?,
            };

            let canvas = LivePreview::new(dpi).print_canvas(&record)?;
            print::print(&canvas, &target)?;
            println!("Printed {} to {}", record.identifier, target);
            Ok(())
        }

        Commands::Serve {
            listen,
            device,
            printer,
            store,
            layout,
            require_sign_in,
            allowed_emails,
        } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(device) = device {
                config.device = device;
            }
            if printer.is_some() {
                config.printer = printer;
            }
            if let Some(store) = store {
                config.store_path = store;
            }
            if let Some(layout) = layout {
                config.storage_layout = layout;
            }
            if require_sign_in {
                config.require_sign_in = true;
            }
            if !allowed_emails.is_empty() {
                config.allowed_emails = allowed_emails;
            }

            config.validate()?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }

        Commands::Sizes => {
            println!("{:<10} {:<26} {:>14}", "TAG", "NAME", "DOTS");
            for size in LabelSize::ALL {
                let (w, h) = size.dots(config.dpi);
                println!(
                    "{:<10} {:<26} {:>14}",
                    size.tag(),
                    size.display_name(),
                    format!("{}x{} @{}", w, h, config.dpi)
                );
            }
            Ok(())
        }
    }
}

impl LabelArgs {
    fn record(&self, config: &AppConfig) -> Result<LabelRecord, LabelKitError> {
        let mut record = if self.from_store {
            let store = LabelStore::new(FileStore::new(&config.store_path), config.layout()?);
            store.load()
        } else {
            LabelRecord::default()
        };

        if let Some(fnsku) = &self.fnsku {
            record.set_identifier(fnsku);
        }
        if let Some(title) = &self.title {
            record.set_title(title);
        }
        if let Some(sku) = &self.sku {
            record.set_sku(sku);
        }
        if let Some(condition) = &self.condition
            && !record.set_condition_str(condition)
        {
            let known: Vec<_> = Condition::ALL.iter().map(Condition::label).collect();
            return Err(LabelKitError::Config(format!(
                "Unknown condition '{}'. Use one of: {}",
                condition,
                known.join(", ")
            )));
        }
        if let Some(size) = &self.size {
            record.set_label_size(size.parse().map_err(LabelKitError::Config)?);
        }

        if let IdentifierAdvisory::TooShort { len } = record.advisory() {
            tracing::warn!(fnsku = %record.identifier, len, "FNSKU is usually 10 characters");
        }
        Ok(record)
    }
}

/// Compose for file output. An identifier that does not encode is an error
/// here; there is no previous symbol to fall back on.
fn compose(record: &LabelRecord, dpi: u32, mode: RenderMode) -> Result<canvas::Canvas, LabelKitError> {
    let symbol = if record.has_identifier() {
        Some(canvas::label_symbol(record, dpi)?)
    } else {
        None
    };
    Ok(canvas::compose(record, symbol.as_ref(), dpi, mode))
}
