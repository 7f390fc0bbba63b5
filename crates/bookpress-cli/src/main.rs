use anyhow::{Context, Result};
use bookpress_pipeline::{
    BookPackage, JobOptions, OutputMode, Pipeline, RenderConfig, SheetSize, TrimSize, WkRenderer,
    mm_to_pt,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bookpress", about = "Book package to print-ready PDF", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a book or booklet PDF
    Book {
        #[command(flatten)]
        common: CommonArgs,

        /// Trim size of the bound page
        #[arg(long, default_value = "comic-book", value_enum)]
        trim: TrimArg,

        /// Custom trim width in mm (with --trim custom)
        #[arg(long, requires = "trim_height_mm")]
        trim_width_mm: Option<f32>,

        /// Custom trim height in mm (with --trim custom)
        #[arg(long, requires = "trim_width_mm")]
        trim_height_mm: Option<f32>,

        /// Trim, gutter-shift and split for bound printing
        #[arg(long)]
        booklet: bool,

        /// Binding gutter in mm (derived from the trim width if omitted)
        #[arg(long)]
        gutter_mm: Option<f32>,
    },

    /// Produce N-up newspaper sheets
    Newspaper {
        #[command(flatten)]
        common: CommonArgs,

        /// Output sheet size
        #[arg(long, default_value = "a2-broadsheet", value_enum)]
        sheet: SheetArg,

        /// Column width in mm
        #[arg(long, default_value = "130.0")]
        column_width_mm: f32,

        /// Columns imposed side by side on one sheet
        #[arg(long, default_value = "4")]
        columns: usize,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Book package directory (book.json + chapter files)
    #[arg(short, long)]
    package: PathBuf,

    /// Output PDF file
    #[arg(short, long)]
    output: PathBuf,

    /// Rotate the final document 180° for reversed binding
    #[arg(long)]
    rotate: bool,

    /// Options JSON file; command-line flags override its values
    #[arg(long)]
    options: Option<PathBuf>,

    /// HTML renderer executable
    #[arg(long, default_value = "wkhtmltopdf")]
    renderer: PathBuf,

    /// Per-render timeout in seconds
    #[arg(long, default_value = "120")]
    render_timeout: u64,

    /// Run the renderer under its own virtual display
    #[arg(long)]
    virtual_display: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TrimArg {
    ComicBook,
    Pocket,
    UsLetter,
    UsTrade,
    Digest,
    A5,
    A4,
    Custom,
}

#[derive(Clone, Copy, ValueEnum)]
enum SheetArg {
    A3Tabloid,
    A2Broadsheet,
    Berliner,
}

impl From<SheetArg> for SheetSize {
    fn from(arg: SheetArg) -> Self {
        match arg {
            SheetArg::A3Tabloid => Self::A3Tabloid,
            SheetArg::A2Broadsheet => Self::A2Broadsheet,
            SheetArg::Berliner => Self::Berliner,
        }
    }
}

fn trim_size(arg: TrimArg, width_mm: Option<f32>, height_mm: Option<f32>) -> Result<TrimSize> {
    Ok(match arg {
        TrimArg::ComicBook => TrimSize::ComicBook,
        TrimArg::Pocket => TrimSize::Pocket,
        TrimArg::UsLetter => TrimSize::UsLetter,
        TrimArg::UsTrade => TrimSize::UsTrade,
        TrimArg::Digest => TrimSize::Digest,
        TrimArg::A5 => TrimSize::A5,
        TrimArg::A4 => TrimSize::A4,
        TrimArg::Custom => {
            let (w, h) = width_mm
                .zip(height_mm)
                .context("--trim custom needs --trim-width-mm and --trim-height-mm")?;
            TrimSize::Custom {
                width_pt: mm_to_pt(w),
                height_pt: mm_to_pt(h),
            }
        }
    })
}

async fn base_options(common: &CommonArgs) -> Result<JobOptions> {
    match &common.options {
        Some(path) => JobOptions::load(path)
            .await
            .with_context(|| format!("loading options from {}", path.display())),
        None => Ok(JobOptions::default()),
    }
}

async fn run_job(common: &CommonArgs, options: JobOptions) -> Result<()> {
    let package = BookPackage::load(&common.package)
        .await
        .with_context(|| format!("loading package from {}", common.package.display()))?;

    let render_config = RenderConfig {
        command: common.renderer.clone(),
        timeout: Duration::from_secs(common.render_timeout),
        virtual_display: common.virtual_display,
        ..Default::default()
    };
    let renderer = WkRenderer::spawn(render_config).await?;

    let pipeline = Pipeline::new(renderer, options)?;
    let artifact = pipeline.run(&package, &common.output).await?;

    println!(
        "{} pages ({:?}) → {}",
        artifact.pages,
        artifact.format,
        artifact.path.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Book {
            common,
            trim,
            trim_width_mm,
            trim_height_mm,
            booklet,
            gutter_mm,
        } => {
            let mut options = base_options(&common).await?;
            options.mode = if booklet {
                OutputMode::Booklet
            } else {
                OutputMode::Book
            };
            options.trim = trim_size(trim, trim_width_mm, trim_height_mm)?;
            if let Some(gutter) = gutter_mm {
                options.gutter_pt = Some(mm_to_pt(gutter));
            }
            options.reversed = common.rotate;

            run_job(&common, options).await
        }

        Commands::Newspaper {
            common,
            sheet,
            column_width_mm,
            columns,
        } => {
            let mut options = base_options(&common).await?;
            options.mode = OutputMode::Newspaper;
            options.sheet = sheet.into();
            options.columns_per_sheet = columns;
            // Newspaper columns reuse the trim slot as the column size;
            // the height is nominal since columns flow to the sheet.
            let sheet_dims = options.sheet.dimensions();
            options.trim = TrimSize::Custom {
                width_pt: mm_to_pt(column_width_mm),
                height_pt: sheet_dims.height_pt,
            };
            options.reversed = common.rotate;

            run_job(&common, options).await
        }
    }
}
