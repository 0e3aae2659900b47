use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod context;
mod domains;
mod util;

use crate::context::{Context, OutputFormat};
use crate::domains::{catalog, listen, record};

#[derive(Parser, Debug)]
#[command(name = "sip-and-smoke", about = "Sip and Smoke consumable tracker")]
struct Cli {
	/// Path to the tracker data directory
	#[arg(long, env = sst_config::DATA_DIR_ENV)]
	data_dir: Option<PathBuf>,

	/// Output format
	#[arg(long, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// List the supported categories
	Categories,
	/// Show the form fields of a category
	Fields(catalog::FieldsArgs),
	/// Add a new item
	Add(record::AddArgs),
	/// List tracked items
	List,
	/// Show every attribute of an item
	Show(record::RecordArgs),
	/// Set one attribute, addressed by its entity id
	Update(record::UpdateArgs),
	/// Stop tracking an item and delete it
	Remove(record::RecordArgs),
	/// Apply update events read line by line from stdin
	Listen,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	// Catalog commands only read the static schema
	match &cli.command {
		Commands::Categories => return catalog::categories(cli.format),
		Commands::Fields(args) => return catalog::fields(cli.format, args),
		_ => {}
	}

	let data_dir = match cli.data_dir {
		Some(dir) => sst_config::ensure_dir(dir)?,
		None => sst_core::config::default_data_dir()?,
	};
	let mut ctx = Context::start(&data_dir, cli.format).await?;

	let result = match cli.command {
		Commands::Categories | Commands::Fields(_) => Ok(()),
		Commands::Add(args) => record::add(&mut ctx, args).await,
		Commands::List => record::list(&ctx),
		Commands::Show(args) => record::show(&ctx, &args),
		Commands::Update(args) => record::update(&mut ctx, args).await,
		Commands::Remove(args) => record::remove(&mut ctx, &args).await,
		Commands::Listen => listen::run(&mut ctx).await,
	};

	ctx.shutdown();
	result
}
