use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use shiplabel_model::{
    convert, ConversionOutcome, ConversionReport, ConvertError, ConvertOptions, LabelLayout,
    LabelRecord, LeadingZeroGuard, MissingNamePolicy, SkuAllowList,
};

mod logging;

#[derive(Parser)]
#[command(
    name = "shiplabel",
    about = "Extract allow-listed SKUs from an order CSV and reformat them as a shipping-label list."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an order export into a label list.
    Convert(ConvertArgs),
    /// Print the effective SKU allow-list.
    Skus {
        /// JSON options file.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    /// Postal code, address, phone and name.
    Shipping,
    /// Postal code, address and name.
    Basic,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MissingNameArg {
    Concatenate,
    Review,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Order export (CSV in Shift_JIS, UTF-8 or CP932).
    input: PathBuf,

    /// Where to write the converted list. Overrides `--out-dir`.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Directory for the converted list, named after the layout.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// JSON options file. Flags below override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// SKU to extract (repeatable). Replaces the configured allow-list.
    #[arg(long = "sku", value_name = "CODE")]
    skus: Vec<String>,

    /// What to write when surname or given name is missing.
    #[arg(long, value_enum)]
    missing_name: Option<MissingNameArg>,

    /// Honorific appended to recipient names.
    #[arg(long)]
    honorific: Option<String>,

    /// Write zero-prefixed numbers as `="0…"` so spreadsheets keep them as text.
    #[arg(long)]
    excel_guard: bool,

    /// Print the converted rows.
    #[arg(long)]
    preview: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    status: &'static str,
    encoding: &'a str,
    rows_read: usize,
    matched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    labels: &'a [LabelRecord],
}

fn main() {
    logging::init("warn");

    if let Err(err) = run(Cli::parse()) {
        eprintln!("エラー: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Skus { config } => {
            let options = match config.as_deref() {
                Some(path) => ConvertOptions::from_json_file(path)
                    .with_context(|| format!("load options {}", path.display()))?,
                None => ConvertOptions::default(),
            };
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for sku in options.allowed_skus.iter() {
                writeln!(out, "{sku}")?;
            }
            Ok(())
        }
    }
}

/// The options file (if any) with command-line overrides applied, validated once.
fn effective_options(args: &ConvertArgs) -> Result<ConvertOptions> {
    let mut options = match args.config.as_deref() {
        Some(path) => ConvertOptions::read_json_file(path)
            .with_context(|| format!("load options {}", path.display()))?,
        None => ConvertOptions::default(),
    };
    if let Some(layout) = args.layout {
        options.layout = match layout {
            LayoutArg::Shipping => LabelLayout::Shipping,
            LayoutArg::Basic => LabelLayout::Basic,
        };
    }
    if !args.skus.is_empty() {
        options.allowed_skus = SkuAllowList::new(&args.skus);
    }
    if let Some(policy) = args.missing_name {
        options.missing_name = match policy {
            MissingNameArg::Concatenate => MissingNamePolicy::Concatenate,
            MissingNameArg::Review => MissingNamePolicy::FlagForReview,
        };
    }
    if let Some(honorific) = &args.honorific {
        options.honorific = honorific.clone();
    }
    if args.excel_guard {
        options.leading_zero_guard = LeadingZeroGuard::ExcelFormula;
    }
    options.validate()?;
    Ok(options)
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let options = effective_options(&args)?;
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;

    tracing::debug!(input = %args.input.display(), bytes = bytes.len(), "converting");

    let report = convert(&bytes, &options).map_err(|err| match err {
        ConvertError::Load(err) => {
            anyhow::Error::new(err).context("ファイルの読み込みに失敗しました")
        }
        ConvertError::Export(err) => anyhow::Error::new(err),
    })?;

    let written = match &report.outcome {
        ConversionOutcome::Converted { artifact, .. } => {
            let dest = args
                .output
                .clone()
                .unwrap_or_else(|| args.out_dir.join(&artifact.file_name));
            write_atomically(&dest, &artifact.bytes)
                .with_context(|| format!("write {}", dest.display()))?;
            tracing::info!(output = %dest.display(), rows = report.matched(), "wrote label list");
            Some(dest)
        }
        ConversionOutcome::NoMatches => {
            eprintln!("警告: 対象の品番（SKU）が見つかりませんでした。");
            None
        }
    };

    match args.format {
        OutputFormat::Text => {
            print_text(&report, written.as_deref(), args.preview, options.layout)
        }
        OutputFormat::Json => print_json(&report, written.as_deref()),
    }
}

fn print_text(
    report: &ConversionReport,
    written: Option<&Path>,
    preview: bool,
    layout: LabelLayout,
) -> Result<()> {
    let Some(dest) = written else {
        return Ok(());
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "{}件のデータを抽出・整形しました。 ({} / {}行, {})",
        report.matched(),
        report.encoding,
        report.rows_read,
        dest.display()
    )?;

    if preview {
        writeln!(out)?;
        writeln!(out, "{}", layout.header().join("\t"))?;
        for label in report.labels() {
            let row = layout.row(label);
            writeln!(out, "{}", row.join("\t"))?;
        }
    }
    Ok(())
}

fn print_json(report: &ConversionReport, written: Option<&Path>) -> Result<()> {
    let json = JsonReport {
        status: match report.outcome {
            ConversionOutcome::Converted { .. } => "converted",
            ConversionOutcome::NoMatches => "no_matches",
        },
        encoding: report.encoding.label(),
        rows_read: report.rows_read,
        matched: report.matched(),
        output: written.map(|p| p.display().to_string()),
        labels: report.labels(),
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, &json)?;
    handle.write_all(b"\n")?;
    Ok(())
}

/// Write via a temp file in the destination directory, then rename into place, so a
/// failed run never leaves a truncated list behind.
fn write_atomically(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|err| err.error)?;
    Ok(())
}
