use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::process::ExitCode;
use thumbgal::cli::Cli;
use thumbgal::tools::ExternalTools;
use thumbgal::{config, output, pipeline};
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<OsString> = std::env::args_os().collect();
    if args.len() <= 1 {
        let program = output::program_name(args.first().and_then(|a| a.to_str()));
        output::print_banner();
        output::print_lines(&output::format_usage_hint(&program));
        return ExitCode::from(1);
    }

    match Cli::try_parse_from(&args) {
        Ok(cli) => ExitCode::from(run(cli)),
        Err(e) => command_line_error(e),
    }
}

/// Version requests succeed; help and every parse error exit with 1.
fn command_line_error(e: clap::Error) -> ExitCode {
    match e.kind() {
        ErrorKind::DisplayVersion => {
            let _ = e.print();
            ExitCode::SUCCESS
        }
        ErrorKind::DisplayHelp => {
            output::print_banner();
            let _ = e.print();
            ExitCode::from(1)
        }
        _ => {
            let _ = e.print();
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> u8 {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return 0;
    }

    let mut options = match config::load_options(cli.config.as_deref()) {
        Ok(options) => options,
        Err(e) => {
            output::print_error(&e);
            return e.exit_code();
        }
    };
    cli.apply(&mut options);

    if !options.quiet {
        output::print_banner();
    }

    let mut warnings = Vec::new();
    let validated = options.validate(&mut warnings);
    output::print_warnings(&warnings);
    let settings = match validated {
        Ok(settings) => settings,
        Err(e) => {
            output::print_error(&e);
            return e.exit_code();
        }
    };

    let tools = ExternalTools::new(settings.tools.clone());
    match pipeline::run(&tools, &settings) {
        Ok(_) => 0,
        Err(e) => {
            output::print_error(&e);
            e.exit_code()
        }
    }
}
