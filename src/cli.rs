use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formshift")]
#[command(author, version, about = "Batch converter for video, audio, images, documents and PDFs")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a batch of files of one media kind
    Convert {
        /// Media kind (video, audio, image, document, pdf, pdf-to-image, image-to-pdf)
        #[arg(short, long)]
        kind: String,

        /// Target format or "from → to" label applied to every file
        #[arg(short, long)]
        to: Option<String>,

        /// Render resolution for pdf-to-image (auto, 72, 96, 150, 300, 600)
        #[arg(long, default_value = "auto")]
        dpi: String,

        /// Page size for image-to-pdf (A4, A3, A5)
        #[arg(long, default_value = "A4")]
        page_size: String,

        /// Render document images in grayscale when producing PDFs
        #[arg(long)]
        grayscale: bool,

        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the conversions offered for a media kind
    Formats {
        /// Media kind
        kind: String,
    },

    /// Inspect or change the page/image edit state of a source
    Edit {
        #[command(subcommand)]
        action: EditAction,
    },

    /// Assemble images into one PDF, honoring their edit state
    Merge {
        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,

        /// Page size (A4, A3, A5)
        #[arg(long, default_value = "A4")]
        page_size: String,

        /// Images in page order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Show or change the UI theme
    Theme {
        /// New theme (dark or light); omit to show the current one
        theme: Option<String>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Source files an edit command works on: one PDF or document, or an image set.
#[derive(Args)]
pub struct EditTarget {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Subcommand)]
pub enum EditAction {
    /// Show pages, rotations and deletions
    Show {
        #[command(flatten)]
        target: EditTarget,
    },

    /// Rotate one page by 90 degrees
    Rotate {
        /// 1-based page number
        #[arg(short, long)]
        page: usize,

        #[arg(short, long, value_enum, default_value = "left")]
        direction: Direction,

        #[command(flatten)]
        target: EditTarget,
    },

    /// Delete one page from the output
    Delete {
        /// 1-based page number
        #[arg(short, long)]
        page: usize,

        #[command(flatten)]
        target: EditTarget,
    },

    /// Restore every deleted page
    Restore {
        #[command(flatten)]
        target: EditTarget,
    },

    /// Print the page shown after the given one
    Next {
        /// 1-based page number to start from
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Walk backwards instead
        #[arg(long)]
        back: bool,

        #[command(flatten)]
        target: EditTarget,
    },
}
