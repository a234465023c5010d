//! codegraph-slice CLI - wiring, not product
//!
//! Thin wrapper over the three library surfaces. Not part of the crate's
//! contract (spec §6); a convenience for driving the library from a shell.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use codegraph_ir::{
    construct_cdg, construct_cfg, construct_ddg, construct_pdg, parameter_analysis,
    slice_by_function_call, slice_by_variable, Config, Language,
};

#[derive(Parser)]
#[command(name = "codegraph-slice")]
#[command(about = "Intraprocedural C/C++ dependence-graph analysis and slicing")]
#[command(version)]
struct Cli {
    /// Source file to analyze.
    file: PathBuf,

    /// Source language. Inferred from the file extension when omitted.
    #[arg(short, long)]
    language: Option<CliLanguage>,

    /// Function to analyze. Defaults to the first function in the file.
    #[arg(short, long)]
    function: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a graph as JSON.
    Graph {
        #[arg(value_enum)]
        kind: GraphKind,
    },
    /// Slice by every call site of a callee function.
    SliceCall {
        callee: String,
    },
    /// Slice by every statement that touches a variable.
    SliceVariable {
        variable: String,
    },
    /// Run the parameter-interaction analysis.
    Parameters,
}

#[derive(Clone, Copy, ValueEnum)]
enum GraphKind {
    Cfg,
    Cdg,
    Ddg,
    Pdg,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliLanguage {
    C,
    Cpp,
}

impl From<CliLanguage> for Language {
    fn from(value: CliLanguage) -> Self {
        match value {
            CliLanguage::C => Language::C,
            CliLanguage::Cpp => Language::Cpp,
        }
    }
}

fn infer_language(path: &PathBuf) -> Language {
    match path.extension().and_then(|e| e.to_str()) {
        Some("cpp") | Some("cc") | Some("cxx") | Some("hpp") => Language::Cpp,
        _ => Language::C,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.file).unwrap_or_else(|e| {
        eprintln!("error: failed to read {}: {e}", cli.file.display());
        process::exit(1);
    });

    let language = cli
        .language
        .map(Language::from)
        .unwrap_or_else(|| infer_language(&cli.file));
    let function_name = cli.function.as_deref();
    let config = Config::default();

    let result = match cli.command {
        Commands::Graph { kind } => run_graph(&source, language, function_name, &config, kind),
        Commands::SliceCall { callee } => run_slice_call(&source, language, &callee),
        Commands::SliceVariable { variable } => run_slice_variable(&source, language, &variable),
        Commands::Parameters => run_parameters(&source, language, function_name),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run_graph(
    source: &str,
    language: Language,
    function_name: Option<&str>,
    config: &Config,
    kind: GraphKind,
) -> codegraph_ir::Result<()> {
    let graph = match kind {
        GraphKind::Cfg => construct_cfg(source, language, function_name)?,
        GraphKind::Cdg => construct_cdg(source, language, function_name, config)?,
        GraphKind::Ddg => construct_ddg(source, language, function_name)?,
        GraphKind::Pdg => construct_pdg(source, language, function_name, config)?,
    };
    println!("{graph:#?}");
    Ok(())
}

fn run_slice_call(source: &str, language: Language, callee: &str) -> codegraph_ir::Result<()> {
    match slice_by_function_call(source, language, callee)? {
        Some(text) => println!("{text}"),
        None => println!("// no call site found for {callee}"),
    }
    Ok(())
}

fn run_slice_variable(source: &str, language: Language, variable: &str) -> codegraph_ir::Result<()> {
    let text = slice_by_variable(source, language, variable)?;
    if text.is_empty() {
        println!("// no statements touch {variable}");
    } else {
        println!("{text}");
    }
    Ok(())
}

fn run_parameters(source: &str, language: Language, function_name: Option<&str>) -> codegraph_ir::Result<()> {
    let result = parameter_analysis(source, language, function_name)?;
    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| codegraph_ir::CodegraphError::internal(format!("failed to serialize result: {e}")))?;
    println!("{json}");
    Ok(())
}
