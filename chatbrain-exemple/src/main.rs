use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chatbrain_core::{Brain, BrainConfig, ContentFilter, DoubleMarkovBrain, MarkovBrain, Persist};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser, Debug)]
#[command(author, version, about = "Markov chat brain playground", long_about = None)]
struct Cli {
	/// Increase verbosity (-v, -vv)
	#[arg(short = 'v', long, global = true, action = ArgAction::Count)]
	verbose: u8,

	/// Decrease verbosity (-q, -qq)
	#[arg(short = 'q', long, global = true, action = ArgAction::Count)]
	quiet: u8,

	/// Training corpus, one example per line (cached as a .bin next to it)
	#[arg(short, long, value_name = "PATH")]
	corpus: Option<PathBuf>,

	/// Load a previously saved brain instead of training one
	#[arg(short, long, value_name = "PATH", conflicts_with = "corpus")]
	load: Option<PathBuf>,

	/// Save the brain once trained (.json for JSON, anything else for binary)
	#[arg(short, long, value_name = "PATH")]
	save: Option<PathBuf>,

	/// Number of preceding tokens used as context
	#[arg(long, default_value_t = 1)]
	order: usize,

	/// Maximum number of tokens in a reply
	#[arg(long, default_value_t = 32)]
	length: usize,

	/// Use a single forward chain instead of the bidirectional brain
	#[arg(long)]
	single: bool,

	/// Stopword file, one word per line (replaces the built-in list)
	#[arg(long, value_name = "PATH")]
	stopwords: Option<PathBuf>,

	/// Disallowed words file, one word per line
	#[arg(long, value_name = "PATH")]
	deny: Option<PathBuf>,

	/// Seed for reproducible replies
	#[arg(long, value_name = "SEED")]
	seed: Option<u64>,

	/// Prompts to answer (answers the empty prompt when none given)
	prompts: Vec<String>,
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	let config = build_config(&cli)?;
	if cli.single {
		let brain = match (&cli.load, &cli.corpus) {
			(Some(path), _) => MarkovBrain::load(path, config)?,
			(None, Some(corpus)) => MarkovBrain::from_corpus_file(corpus, cli.order, cli.length, config)?,
			(None, None) => bail!("either --corpus or --load is required"),
		};
		run(&brain, &cli)
	} else {
		let brain = match (&cli.load, &cli.corpus) {
			(Some(path), _) => DoubleMarkovBrain::load(path, config)?,
			(None, Some(corpus)) => DoubleMarkovBrain::from_corpus_file(corpus, cli.order, cli.length, config)?,
			(None, None) => bail!("either --corpus or --load is required"),
		};
		run(&brain, &cli)
	}
}

fn build_config(cli: &Cli) -> Result<BrainConfig> {
	let mut config = BrainConfig::default();
	if let Some(path) = &cli.stopwords {
		config = config
			.with_stopwords_file(path)
			.with_context(|| format!("reading stopwords from {}", path.display()))?;
	}
	if let Some(path) = &cli.deny {
		let filter = ContentFilter::deny_list_file(path)
			.with_context(|| format!("reading deny list from {}", path.display()))?;
		config = config.with_filter(filter);
	}
	Ok(config)
}

fn run<B: Brain + Persist>(brain: &B, cli: &Cli) -> Result<()> {
	info!("Brain ready (order {}, length limit {})", brain.order(), brain.length_limit());

	if let Some(path) = &cli.save {
		brain.save(path).with_context(|| format!("saving brain to {}", path.display()))?;
	}

	let mut rng = match cli.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};

	let prompts = if cli.prompts.is_empty() {
		vec![String::new()]
	} else {
		cli.prompts.clone()
	};
	for prompt in &prompts {
		let reply = brain.generate_with(prompt, &mut rng)?;
		println!("> {prompt}\n{reply}");
	}

	Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
	use log::LevelFilter;

	let level = if quiet > 0 {
		match quiet {
			1 => LevelFilter::Warn,
			_ => LevelFilter::Error,
		}
	} else {
		match verbose {
			0 => LevelFilter::Info,
			1 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	};

	let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
	builder.format_timestamp_millis();
	builder.filter_level(level);
	let _ = builder.try_init();
}
