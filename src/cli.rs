use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::vocabulary::{ENGLISH, POLISH, Vocabulary};

#[derive(Parser, Debug)]
#[command(
    name = "quizmerge",
    version,
    about = "Consolidate quiz review pages into deduplicated answer documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered source files with sizes and SHA-256 digests.
    Inventory(InventoryArgs),
    /// Extract question records from saved review pages into interchange JSON.
    Extract(ExtractArgs),
    /// Extract, merge and render review pages in one pass.
    Build(BuildArgs),
    /// Merge and render an interchange JSON file.
    Render(RenderArgs),
    /// Re-merge previously rendered quiz PDFs.
    MergePdf(MergePdfArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Locale {
    En,
    Pl,
}

impl Locale {
    pub fn vocabulary(self) -> Vocabulary {
        match self {
            Self::En => ENGLISH,
            Self::Pl => POLISH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pl => "pl",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SourceKind {
    Markup,
    Pdf,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Pdf => "pdf",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Markup => &["html", "htm"],
            Self::Pdf => &["pdf"],
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TextStrategy {
    Pattern,
    Scan,
}

impl TextStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Scan => "scan",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "quizzes")]
    pub source_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = SourceKind::Markup)]
    pub kind: SourceKind,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = "quizzes")]
    pub source_dir: PathBuf,

    #[arg(long, default_value = "output/quiz_records.json")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub locale: Locale,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

/// Options shared by every command that renders the two partition documents.
#[derive(Args, Debug, Clone)]
pub struct RenderOutputArgs {
    #[arg(long, default_value = "output/quiz_identified.pdf")]
    pub identified_output: PathBuf,

    #[arg(long, default_value = "output/quiz_unidentified.pdf")]
    pub unidentified_output: PathBuf,

    #[arg(long)]
    pub style_config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub locale: Locale,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(long, default_value = "quizzes")]
    pub source_dir: PathBuf,

    /// Also write the raw extracted records as interchange JSON.
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    #[command(flatten)]
    pub render: RenderOutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long, default_value = "output/quiz_records.json")]
    pub input: PathBuf,

    #[command(flatten)]
    pub render: RenderOutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct MergePdfArgs {
    #[arg(long, default_value = "pdfs")]
    pub source_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = TextStrategy::Pattern)]
    pub strategy: TextStrategy,

    /// Run pdftotext in layout mode.
    #[arg(long, default_value_t = false)]
    pub layout: bool,

    #[command(flatten)]
    pub render: RenderOutputArgs,
}
