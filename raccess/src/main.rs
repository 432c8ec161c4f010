use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{error, info, Level};
use std::path::PathBuf;

use raccess::io::{fasta, table};
use raccess::model::{ModelMeta, ProfileModel};
use raccess::pipeline::{self, PredictOpt, DEFAULT_BATCH_SIZE};
use raccess::train::{self, TrainOpt, DEFAULT_KMER, DEFAULT_VAL_EVERY};
use raccess::window::WindowGeometry;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "raccess", author, version, about = "Per-nucleotide RNA accessibility prediction", arg_required_else_help = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict accessibility for every sequence of a FASTA file
    Predict {
        /// Input sequences (FASTA)
        #[arg(short = 's', long = "seqfile")]
        seqfile: String,
        /// Output CSV, one row per sequence
        #[arg(short = 'o', long = "outfile")]
        outfile: String,
        /// Trained model file
        #[arg(short = 'm', long = "model", default_value = "profile.model")]
        model: String,
        #[arg(short = 'b', long = "batch", default_value_t = DEFAULT_BATCH_SIZE)]
        batch: usize,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Drop padding and write scores in input orientation
        #[arg(long = "trim-padding")]
        trim_padding: bool,
    },
    /// Train a profile model from paired sequence / accessibility files
    Train {
        /// FASTA files or directories, paired in order with --acc
        #[arg(short = 's', long = "seqs", required = true, num_args = 1.., value_delimiter = ',')]
        seqs: Vec<PathBuf>,
        /// Accessibility CSV files or directories
        #[arg(short = 'a', long = "acc", required = true, num_args = 1.., value_delimiter = ',')]
        acc: Vec<PathBuf>,
        /// Output name; the model is written to <NAME>.model (default: start timestamp)
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 'k', long = "kmer", default_value_t = DEFAULT_KMER)]
        kmer: usize,
        /// Every N-th example is held out for validation (0 disables)
        #[arg(long = "val-every", default_value_t = DEFAULT_VAL_EVERY)]
        val_every: usize,
        #[arg(short = 'b', long = "batch", default_value_t = DEFAULT_BATCH_SIZE)]
        batch: usize,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
}

fn main() {
    let start = std::time::Instant::now();
    let cli = Cli::parse();
    let level = if cli.verbose { Level::Debug } else { Level::Info };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("cannot initialise logger: {}", e);
    }

    if let Err(e) = run(cli.command) {
        error!("{:#}", e);
        std::process::exit(1);
    }
    info!("Elapsed time: {:?}", start.elapsed());
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Predict { seqfile, outfile, model, batch, threads, trim_padding } => {
            init_threads(threads)?;
            let opt = PredictOpt { batch_size: batch, geometry: WindowGeometry::default() };
            run_predict(&seqfile, &outfile, &model, opt, trim_padding)
        }
        Commands::Train { seqs, acc, name, kmer, val_every, batch, threads } => {
            init_threads(threads)?;
            let opt = TrainOpt { kmer, val_every, batch_size: batch, geometry: WindowGeometry::default() };
            let name = name.unwrap_or_else(|| chrono::Local::now().format("%Y%m%d_%H%M%S").to_string());
            run_train(&seqs, &acc, &name, opt)
        }
    }
}

fn init_threads(threads: usize) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| anyhow!("cannot start thread pool: {}", e))
}

fn run_predict(seqfile: &str, outfile: &str, model_path: &str, opt: PredictOpt, trim_padding: bool) -> Result<()> {
    let model = ProfileModel::load_from_file(model_path)
        .map_err(|e| anyhow!("cannot load model '{}': {}", model_path, e))?;
    let records = fasta::read_records(seqfile)?;
    if records.is_empty() {
        anyhow::bail!("FASTA file '{}' contains no sequences", seqfile);
    }
    info!("sequences: {}", records.len());

    let preds = pipeline::predict_records(&model, &records, &opt)?;
    let rows: Vec<Vec<f32>> = if trim_padding {
        preds.iter().map(pipeline::Prediction::oriented).collect()
    } else {
        preds.into_iter().map(|p| p.scores).collect()
    };
    table::write_matrix_file(outfile, &rows)?;
    info!("accessibility written: {}", outfile);
    Ok(())
}

/// 目录展开为其中按名称排序的文件
fn expand_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for p in paths {
        if p.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(p)
                .map_err(|e| anyhow!("cannot read directory '{}': {}", p.display(), e))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|e| e.is_file())
                .collect();
            entries.sort();
            out.extend(entries);
        } else {
            out.push(p.clone());
        }
    }
    Ok(out)
}

fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

fn run_train(seqs: &[PathBuf], acc: &[PathBuf], name: &str, opt: TrainOpt) -> Result<()> {
    let seq_files = expand_inputs(seqs)?;
    let acc_files = expand_inputs(acc)?;
    info!("sequence files: {}, accessibility files: {}", seq_files.len(), acc_files.len());

    let mut records = Vec::new();
    for f in &seq_files {
        records.extend(fasta::read_records(f)?);
    }
    let mut targets = Vec::new();
    for f in &acc_files {
        targets.extend(table::read_accessibility_file(f)?);
    }

    let examples = train::prepare_examples(&records, &targets, &opt.geometry)?;
    let (mut model, report) = train::train(examples, &opt)?;
    info!("trained on {} examples, validated on {}", report.n_train, report.n_val);

    let mut training_files = display_paths(&seq_files);
    training_files.extend(display_paths(&acc_files));
    model.set_meta(ModelMeta {
        training_files,
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });

    let out_path = format!("{}.model", name);
    model
        .save_to_file(&out_path)
        .map_err(|e| anyhow!("cannot write model to '{}': {}", out_path, e))?;
    info!("model saved: {}", out_path);
    Ok(())
}
