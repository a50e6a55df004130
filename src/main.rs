use anyhow::{Context, Result};
use clap::Parser;
use scc_test::backend::{DEFAULT_TOOL, ExternalTool};
use scc_test::engine::Runner;
use scc_test::junit::{DEFAULT_REPORT_FILE, XmlReporter};
use scc_test::report::{ConsoleReporter, Reporter};
use scc_test::types::Summary;
use scc_test::workdir::WorkingDirectoryContext;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Runs the test*.json cases in a directory against the scc statechart compiler"
)]
struct Cli {
    // Compiler executable, looked up on PATH unless it is a path
    #[arg(
        long,
        value_name = "CMD",
        env = "SCCLOC",
        default_value = DEFAULT_TOOL,
        help = "Compiler to invoke for every test case"
    )]
    tool: String,

    // Start directory: specs are discovered and logs are written here
    #[arg(
        short = 'C',
        long = "dir",
        value_name = "DIR",
        help = "Directory to discover test cases in [default: current directory]"
    )]
    dir: Option<PathBuf>,

    #[arg(
        short = 'r',
        long = "report",
        value_name = "FILE",
        default_value = DEFAULT_REPORT_FILE,
        help = "Where to write the XML report, relative to the start directory"
    )]
    report: PathBuf,

    #[arg(
        short = 'q',
        long = "silent",
        help = "Do not echo the compiler output of each test case"
    )]
    silent: bool,

    #[arg(long = "no-color", help = "Disable colored output")]
    no_color: bool,

    #[arg(short = 'v', long = "verbose", help = "Log progress to stderr")]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // With -v show INFO and above; RUST_LOG always wins
    let filter = if cli.verbose {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "scc_test=info".to_string())
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "scc_test=warn".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let workdir = match &cli.dir {
        Some(dir) => WorkingDirectoryContext::new(dir),
        None => WorkingDirectoryContext::from_process(),
    }
    .context("cannot use the start directory")?;

    let tool = ExternalTool::new(cli.tool.trim());
    info!(
        tool = %tool.resolved_path(),
        start = %workdir.start().display(),
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let report_path = workdir.start().join(&cli.report);
    let mut runner = Runner::new(tool, workdir).echo_logs(!cli.silent);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let cases = runner.run(&mut out)?;

    let mut console = ConsoleReporter::new().colored(!cli.no_color && out.is_terminal());
    console.add_tests(&cases);
    let mut xml = XmlReporter::new(report_path);
    xml.add_tests(&cases);

    writeln!(out, "{}", console.render()?)?;
    writeln!(out, "{}", xml.render()?)?;

    let summary = Summary::from_cases(&cases);
    Ok(ExitCode::from(summary.exit_status()))
}
