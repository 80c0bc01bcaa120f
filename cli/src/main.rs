mod delivery;
mod test_runner;

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::{error, info, info_span};
use tracing_subscriber::EnvFilter;

use interpreter::{CommandSet, Outcome};

use crate::delivery::{CommandSink, ServerSink, WriterSink};

const SUBCOMMANDS: &[&str] = &["run", "test", "help"];

#[derive(Parser)]
#[command(name = "mcml", version, about = "Command block markup interpreter")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interpret files and place their command blocks
    Run(RunArgs),

    /// Run .test.mcml fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Files to be interpreted, in order
    files: Vec<PathBuf>,

    /// Server .jar file
    #[arg(long, default_value = "minecraft_server.jar")]
    jar: PathBuf,

    /// Stop the server after placing the command blocks
    #[arg(short, long)]
    close_server: bool,

    /// Write commands to stdout instead of starting a server
    #[arg(long)]
    print: bool,

    /// Interpret only, deliver nothing (exit 0 if every file is valid)
    #[arg(long)]
    check: bool,

    /// Print every registered section and its anchor
    #[arg(long)]
    list_sections: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.mcml file or a directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `mcml file.mcml` works like `mcml run file.mcml`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().skip(1).position(|a| !a.starts_with('-')) {
        if !SUBCOMMANDS.contains(&args[pos + 1].as_str()) {
            args.insert(pos + 1, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    match cli.command {
        Command::Run(run_args) => process::exit(do_run(run_args, cli.no_color)),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn open_sink(args: &RunArgs) -> io::Result<Option<Box<dyn CommandSink>>> {
    if args.check || args.list_sections {
        return Ok(None);
    }
    if args.print {
        return Ok(Some(Box::new(WriterSink::new(io::stdout()))));
    }
    Ok(Some(Box::new(ServerSink::spawn(&args.jar, args.close_server)?)))
}

/// Interpret every file in order. An aborted file is reported and skipped;
/// a fatal error or a failed delivery ends the run.
fn do_run(args: RunArgs, no_color: bool) -> i32 {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let mut files = SimpleFiles::new();

    let mut sink = match open_sink(&args) {
        Ok(sink) => sink,
        Err(e) => {
            error!(error = %e, "cannot start server");
            return 1;
        }
    };

    let mut skipped = 0usize;
    for path in &args.files {
        let span = info_span!("file", path = %path.display());
        let _enter = span.enter();
        info!("interpreting file");

        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "cannot read file, skipping");
                skipped += 1;
                continue;
            }
        };
        let file_id = files.add(path.display().to_string(), source.clone());

        match Outcome::from(interpreter::interpret(&source, file_id)) {
            Outcome::Interpreted(set) => {
                info!("done interpreting file");
                log_output(&set);
                if args.list_sections {
                    for (name, anchor) in &set.sections {
                        println!("{}: {}", name, anchor);
                    }
                }
                if let Some(sink) = sink.as_mut() {
                    if let Err(e) = sink.deliver(&set) {
                        error!(error = %e, "command delivery failed, shutting down");
                        return 1;
                    }
                }
            }
            Outcome::Skipped(e) => {
                let diagnostic = e.to_diagnostic();
                let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
                error!("aborting interpretation of file, skipping");
                skipped += 1;
            }
            Outcome::Halted(e) => {
                let diagnostic = e.to_diagnostic();
                let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
                error!(error = %e, "unexpected fatal error, shutting down");
                return 1;
            }
        }
    }

    if let Some(sink) = sink {
        if let Err(e) = sink.close() {
            error!(error = %e, "cannot close command output");
            return 1;
        }
    }

    info!(files = args.files.len(), skipped, "done");
    if skipped == 0 { 0 } else { 1 }
}

fn log_output(set: &CommandSet) {
    info!("command output:");
    for (name, commands) in set.arrays() {
        info!("{}:", name);
        for command in commands {
            info!("{}", command);
        }
    }
}
