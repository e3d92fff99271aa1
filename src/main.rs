//! regex-filter - ordered regex rewrite rules for chat-bot replies
//!
//! Stand-in host for the plugin: runs chat commands against a rules file and
//! runs the rewrite hooks over JSON events.
//!
//! # Usage
//!
//! ```bash
//! # Manage rules
//! regex-filter regex_add 'colou?r' hue
//! regex-filter regex_list
//!
//! # As a hook (reads one JSON event from stdin, writes it back rewritten)
//! echo '{"hook":"llm_response","completion_text":"red colour"}' | regex-filter hook
//! ```

use std::env;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use tracing::error;

use regex_filter::{
    config::{self, ConfigHandle},
    logging, Command, HookEvent, RegexFilter,
};

/// Print version information
fn print_version() {
    println!("regex-filter {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"regex-filter - ordered regex rewrite rules for chat-bot replies

USAGE:
    regex-filter [OPTIONS] <COMMAND> [ARGS...]
    regex-filter [OPTIONS] hook < event.json

OPTIONS:
    -h, --help              Print this help message
    -v, --version           Print version information
    -c, --config PATH       Rules file (.toml or .json)
        --verbose           Debug logging (RUST_LOG overrides)

COMMANDS:
    regex_add [--replace|--delete|--append|--prepend] <pattern> [text]
    regex_list
    regex_remove <index>
    regex_test <text>
    regex_listen_all        Toggle rewriting of every outgoing message
    regex_toggle            Enable or disable the filter
    hook                    Rewrite one JSON hook event from stdin

HOOK EVENTS:
    {{"hook":"llm_response","completion_text":"..."}}
    {{"hook":"decorating_result","chain":[{{"type":"Plain","text":"..."}}]}}
"#
    );
}

/// Parse command line arguments
struct Args {
    help: bool,
    version: bool,
    verbose: bool,
    config_path: Option<String>,
    rest: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut result = Args {
            help: false,
            version: false,
            verbose: false,
            config_path: None,
            rest: Vec::new(),
        };

        let mut i = 1;
        while i < args.len() {
            if !result.rest.is_empty() {
                result.rest.push(args[i].clone());
                i += 1;
                continue;
            }
            match args[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "--verbose" => result.verbose = true,
                "-c" | "--config" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.config_path = Some(args[i].clone());
                    }
                }
                arg if arg.starts_with("--config=") => {
                    let path = arg.trim_start_matches("--config=");
                    result.config_path = Some(path.to_string());
                }
                arg => result.rest.push(arg.to_string()),
            }
            i += 1;
        }

        result
    }
}

fn run_hook(filter: &mut RegexFilter) -> ExitCode {
    let mut input_json = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input_json) {
        error!(error = %e, "failed to read stdin");
        return ExitCode::FAILURE;
    }

    let mut event = match HookEvent::from_json(&input_json) {
        Ok(event) => event,
        Err(e) => {
            eprintln!("Error: Failed to parse hook event: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match &mut event {
        HookEvent::LlmResponse(response) => {
            filter.on_llm_response(response);
        }
        HookEvent::DecoratingResult { chain } => {
            filter.on_decorating_result(chain);
        }
    }

    match write_event(io::stdout().lock(), &event) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "failed to write hook event");
            ExitCode::FAILURE
        }
    }
}

fn write_event(mut out: impl Write, event: &HookEvent) -> io::Result<()> {
    writeln!(out, "{}", event.to_json())?;
    out.flush()
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Handle help and version
    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    if args.help || args.rest.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    logging::init(args.verbose);

    let path = args
        .config_path
        .as_deref()
        .map(config::expand_path)
        .unwrap_or_else(config::default_path);

    let handle = match ConfigHandle::open(path) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut filter = RegexFilter::load(handle);

    let code = if args.rest[0] == "hook" {
        run_hook(&mut filter)
    } else {
        match Command::from_args(&args.rest) {
            Ok(command) => {
                println!("{}", filter.execute(command));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        }
    };

    filter.shutdown();
    code
}
