// student-labels: Generate printable A4 label sheets for students

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use std::path::Path;
use student_labels::config::DEFAULT_EMAIL_DOMAIN;
use student_labels::export::{save_pdf, save_png};
use student_labels::{
    resolve_styles, GridPosition, LabelError, LabelRenderer, LayoutConfig, SheetCompositor,
    SheetGeometry, StudentRecord,
};
use thiserror::Error;

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error(transparent)]
    Label(#[from] LabelError),
}

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Pdf,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a printable A4 sheet with one student label")]
struct Args {
    /// Student last name (printed upper-case)
    #[arg(short, long)]
    name: String,

    /// Student first name (printed capitalized)
    #[arg(short, long)]
    first_name: String,

    /// Class (printed upper-case)
    #[arg(short, long)]
    class: String,

    /// Option / course of study
    #[arg(long)]
    option: String,

    /// E-mail prefix (before @domain) or full e-mail address
    #[arg(short, long)]
    email: String,

    /// Domain appended to a bare e-mail prefix
    #[arg(long, default_value = DEFAULT_EMAIL_DOMAIN)]
    domain: String,

    /// Label position on the sheet (1-24, row-major)
    #[arg(short, long, default_value = "1")]
    position: u32,

    /// Output filename (defaults to labels-{date}-{name}.{format})
    #[arg(short, long)]
    output: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "png")]
    format: OutputFormat,

    /// TrueType font file (falls back to common system fonts, then a built-in face)
    #[arg(long)]
    font: Option<String>,

    /// Layout configuration file (JSON)
    #[arg(long)]
    config: Option<String>,

    /// Also write a PNG preview of the grid with the chosen position highlighted
    #[arg(long)]
    grid_preview: Option<String>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    // Validate form input before doing any work
    let email = full_email(&args.email, &args.domain);
    let record = StudentRecord::from_form(&args.name, &args.first_name, &args.class, &args.option, &email);
    if let Some(field) = record.first_missing_field() {
        return Err(AppError::MissingField(field.to_string()));
    }
    let position = GridPosition::new(args.position)?;

    // Load layout
    let layout = match &args.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    let sheet_geometry = SheetGeometry::from_config(&layout);
    if !sheet_geometry.fits() {
        eprintln!("Warning: the label grid does not fit on the sheet; edge labels will be clipped");
    }

    // Resolve text styles, degrading to the built-in face
    let (styles, fallback) = resolve_styles(args.font.as_deref().map(Path::new), layout.font_sizes);
    if let Some(reason) = fallback {
        eprintln!("Warning: {}. Using the built-in bitmap font.", reason);
    }

    // Render
    let renderer = LabelRenderer::from_config(&layout, styles);
    let label = renderer.render(&record)?;
    let compositor = SheetCompositor::new(sheet_geometry);
    let sheet = compositor.compose_single(position, &label);

    // Determine output filename
    let output_file = args
        .output
        .unwrap_or_else(|| default_output_name(&record.name, &Local::now().date_naive(), args.format));

    match args.format {
        OutputFormat::Png => save_png(&sheet, &output_file)?,
        OutputFormat::Pdf => save_pdf(&sheet, layout.dpi, &output_file)?,
    }

    if let Some(preview) = &args.grid_preview {
        save_png(&compositor.render_grid(position), preview)?;
    }

    println!("✓ Generated: {}", output_file);
    println!("  Student: {} {}", record.name, record.first_name);
    println!("  Email: {}", record.email);
    println!("  Position: {}", position);
    if let Some(preview) = &args.grid_preview {
        println!("  Grid preview: {}", preview);
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn full_email(input: &str, domain: &str) -> String {
    let input = input.trim();
    if input.is_empty() || input.contains('@') {
        input.to_string()
    } else {
        format!("{}@{}", input, domain.trim_start_matches('@'))
    }
}

fn default_output_name(name: &str, date: &NaiveDate, format: OutputFormat) -> String {
    let sanitized_name = name
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect::<String>();
    format!(
        "labels-{}-{}.{}",
        date.format("%Y-%m-%d"),
        sanitized_name,
        format.extension()
    )
}
