mod config;

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use env_logger::Env;
use log::{LevelFilter, debug, info};
use rand::Rng;
use snowball_core::io::build_output_path;
use snowball_core::model::corpus_tables::CorpusTables;
use snowball_core::model::generator::{BatchReport, PoemBatchGenerator};
use snowball_core::model::seed::SeedPhrase;

fn main() -> Result<()> {
    let config = Config::parse();
    init_logger(&config);

    let generation = config.generation_config().context("invalid generation options")?;
    let seeds = read_seed_phrases(&config)?;

    let cache = cache_path(&config)?;
    let tables = CorpusTables::load_or_build(&config.corpus, cache.as_deref(), !config.no_expand)
        .context("cannot load the snowball corpus")?;

    let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
    debug!("random seed {}", base_seed);

    let reports = PoemBatchGenerator::new(&tables, &generation)
        .generate_all(&seeds, base_seed)
        .context("cannot generate snowball poems")?;

    if config.stdout {
        print_poems(&reports)
    } else {
        write_poem_files(&reports)
    }
}

/// `-q` silences everything, `-v`/`-vv` raise the level; otherwise
/// `RUST_LOG` decides, defaulting to info.
fn init_logger(config: &Config) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = log_level(config) {
        builder.filter_level(level);
    }
    builder.init();
}

/// Level forced by `-q`/`-v`, if any.
fn log_level(config: &Config) -> Option<LevelFilter> {
    if config.quiet {
        return Some(LevelFilter::Off);
    }
    match config.verbose {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Seed phrases from `-s` or `-i`. Blank phrases are skipped.
fn read_seed_phrases(config: &Config) -> Result<Vec<SeedPhrase>> {
    let phrases: Vec<String> = if let Some(path) = &config.seed_file {
        fs::read_to_string(path)
            .with_context(|| format!("cannot read seed phrase file {}", path.display()))?
            .lines()
            .map(str::to_owned)
            .collect()
    } else if let Some(delimiter) = config.stdin_delimiter {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).context("cannot read seed phrases from stdin")?;
        input.split(delimiter).map(|phrase| phrase.replace('\n', " ")).collect()
    } else {
        return Ok(Vec::new());
    };

    let seeds: Vec<SeedPhrase> = phrases.iter().filter_map(|phrase| SeedPhrase::parse(phrase)).collect();
    debug!("{} seed phrase(s)", seeds.len());
    Ok(seeds)
}

/// `--cache FILE`, or `--cache` alone for `<first corpus>.bin`.
fn cache_path(config: &Config) -> Result<Option<PathBuf>> {
    match &config.cache {
        None => Ok(None),
        Some(Some(path)) => Ok(Some(path.clone())),
        Some(None) => {
            let first = config.corpus.first().context("no corpus file given")?;
            let path = build_output_path(first.path(), "bin")
                .with_context(|| format!("cannot derive a cache path from {}", first.path().display()))?;
            Ok(Some(path))
        }
    }
}

fn print_poems(reports: &[BatchReport]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for poem in reports.iter().flat_map(|report| &report.poems) {
        writeln!(out, "{}", poem)?;
    }
    out.flush()?;
    Ok(())
}

/// One `output-snowballPoems-<time>[-[seed]].txt` file per batch.
fn write_poem_files(reports: &[BatchReport]) -> Result<()> {
    let time = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
    for report in reports {
        let file_name = output_file_name(time, report.seed.as_ref());
        let mut contents = report.poems.join("\n");
        contents.push('\n');
        fs::write(&file_name, contents).with_context(|| format!("cannot write {}", file_name))?;
        info!("{}", file_name);
    }
    Ok(())
}

fn output_file_name(time: u64, seed: Option<&SeedPhrase>) -> String {
    match seed {
        Some(seed) => format!("output-snowballPoems-{}-[{}].txt", time, seed),
        None => format!("output-snowballPoems-{}.txt", time),
    }
}
