use clap::{Args, Parser, Subcommand};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use twr_filter::{Filter, FilterOptions, IgnoredRange, TryWithResourcesFilter};
use twr_ir::{MethodNode, NodeKind};

#[derive(Parser)]
#[command(name = "twr", about = "Find compiler-generated try-with-resources code in JVM methods")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ignored ranges of every method in a listing
    Filter {
        /// Path to the YAML method listing
        input: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Print a listing with ignored nodes marked by `-`
    Annotate {
        /// Path to the YAML method listing
        input: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(Args)]
struct OptionArgs {
    /// YAML file with filter options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,
    /// Do not recognize javac output
    #[arg(long)]
    no_javac: bool,
    /// Do not recognize ecj output
    #[arg(long)]
    no_ecj: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Filter { input, options } => cmd_filter(&input, &options),
        Commands::Annotate { input, options } => cmd_annotate(&input, &options),
    }
}

fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn load_options(args: &OptionArgs) -> Result<FilterOptions, String> {
    let mut options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
            serde_yaml::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?
        }
        None => FilterOptions::default(),
    };
    if args.no_javac {
        options.javac = false;
    }
    if args.no_ecj {
        options.ecj = false;
    }
    Ok(options)
}

fn run(input: &Path, args: &OptionArgs) -> Vec<(MethodNode, Vec<IgnoredRange>)> {
    let filter = TryWithResourcesFilter::with_options(or_exit(load_options(args)));
    log::debug!("filter options: {:?}", filter.options());
    let methods = or_exit(twr_ir::listing::open(input));
    methods
        .into_iter()
        .map(|method| {
            let mut ranges = Vec::new();
            filter.filter(&method, &mut ranges);
            (method, ranges)
        })
        .collect()
}

fn cmd_filter(input: &Path, args: &OptionArgs) {
    for (method, ranges) in run(input, args) {
        println!("{}{}: {} ignored range(s)", method.name, method.desc, ranges.len());
        for range in &ranges {
            println!("  {}", format_range(&method, range));
        }
    }
}

fn cmd_annotate(input: &Path, args: &OptionArgs) {
    let mut first = true;
    for (method, ranges) in run(input, args) {
        if !first {
            println!();
        }
        first = false;
        println!("{}{}", method.name, method.desc);
        for line in annotate(&method, &ranges) {
            println!("{line}");
        }
    }
}

fn format_range(method: &MethodNode, range: &IgnoredRange) -> String {
    format!(
        "{}..={} ({} nodes, {} .. {})",
        range.first,
        range.last,
        range.node_count(),
        method.render_node(range.first),
        method.render_node(range.last)
    )
}

/// One line per node; labels are flush left, everything else is indented.
fn annotate(method: &MethodNode, ranges: &[IgnoredRange]) -> Vec<String> {
    method
        .insns
        .iter()
        .map(|(id, node)| {
            let mark = if ranges.iter().any(|r| r.contains(id)) { '-' } else { ' ' };
            let indent = if node.kind() == NodeKind::LabelMarker { "" } else { "    " };
            format!("{mark} {indent}{}", method.render_node(id))
        })
        .collect()
}
