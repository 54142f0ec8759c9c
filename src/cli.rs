use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "purchase-extract",
    version,
    about = "Extract purchase records from saved purchase-history pages"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Config file (defaults to config.json, config.yaml or config.yml in the working directory)"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Labels(LabelsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(
        long = "input",
        required = true,
        help = "Saved listing pages, or directories of .html/.htm files, in page order"
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(long, env = "EBAY_YEAR")]
    pub year: Option<i32>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub csv_path: Option<PathBuf>,

    #[arg(long)]
    pub html_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_csv: bool,

    #[arg(long, default_value_t = false)]
    pub no_html: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Treat the first page without records as the end of the listing"
    )]
    pub stop_on_empty_page: bool,

    #[arg(long, default_value_t = 1)]
    pub jobs: usize,
}

#[derive(Args, Debug, Clone)]
pub struct LabelsArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
