#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;

use pindex::io::{load_interaction_matrix, read_score_group, write_pindex};
use pindex::kruskal;
use pindex::popularity::{self, PIndexProgress};

#[derive(Parser)]
#[command(
    name = "pindex",
    about = "Popularity-index and rank-significance analyses over user-item interaction data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the p-index of every user in an interaction matrix
    Pindex {
        /// CSV file with header item,user,plays
        matrix: PathBuf,

        /// Output file, one p-index per line in user order
        #[arg(short, long, default_value = "pIndices.txt")]
        output: PathBuf,
    },
    /// Kruskal-Wallis significance test over three score group files
    Kwtest {
        /// Text file with one score per line
        group1: PathBuf,
        group2: PathBuf,
        group3: PathBuf,
    },
}

/// Drives an indicatif bar from the per-user progress callbacks.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::with_template(
            "> [{bar:40.cyan/blue}] {pos}/{len} users ({eta})",
        )
        .expect("Internal Error: Invalid progress bar template string.");
        bar.set_style(style);
        Self { bar }
    }
}

impl PIndexProgress for BarProgress {
    fn on_start(&self, total_users: usize) {
        self.bar.set_length(total_users as u64);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn on_user_complete(&self, completed_users: usize, _total_users: usize) {
        self.bar.set_position(completed_users as u64);
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn run_pindex(matrix_path: &PathBuf, output: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let matrix = load_interaction_matrix(matrix_path)?;
    let values = popularity::compute_all(&matrix, &BarProgress::new())?;
    write_pindex(output, &values)?;
    println!("Wrote {} p-indices to {}.", values.len(), output.display());
    Ok(())
}

fn run_kwtest(
    group1: &PathBuf,
    group2: &PathBuf,
    group3: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let g1 = read_score_group(group1)?;
    let g2 = read_score_group(group2)?;
    let g3 = read_score_group(group3)?;
    let report = kruskal::test(g1.view(), g2.view(), g3.view())?;
    println!("{report}");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Pindex { matrix, output } => run_pindex(matrix, output),
        Commands::Kwtest {
            group1,
            group2,
            group3,
        } => run_kwtest(group1, group2, group3),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
