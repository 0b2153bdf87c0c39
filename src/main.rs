use clap::error::ErrorKind;
use clap::{Arg, Command};
use std::env;
use std::ffi::OsString;
use std::process::ExitCode;

use dirmirror::config::Config;
use dirmirror::logging::{self, LogFile};
use dirmirror::scheduler::Scheduler;
use dirmirror::utils::{setup_signal_handlers, Cancellation};
use tracing::{error, info};

const REMARKS: &str = "\
Relative directories are supported, but should be used with care.
A valid interval is any floating point value greater than 0.

Remarks:
  If a file in the destination directory is modified after the sync, it will not be
  overwritten unless the source file changes or the program is restarted.
  The synchronization time is not counted towards the interval, so in practice the
  real interval is (synchronization time) + interval.
  Access denied on the source side is logged and skipped; if access is denied on the
  destination side the program exits with an error.";

fn cli() -> Command {
	Command::new("dirmirror")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Synchronize files from a source directory to a destination directory (one way)")
		.after_help(REMARKS)
		.arg(Arg::new("source").value_name("SOURCE").required(true).help("Directory to mirror from"))
		.arg(
			Arg::new("destination")
				.value_name("DESTINATION")
				.required(true)
				.help("Directory to mirror into"),
		)
		.arg(
			Arg::new("interval")
				.value_name("INTERVAL")
				.required(true)
				.allow_negative_numbers(true)
				.help("Seconds to wait between synchronizations"),
		)
		.arg(Arg::new("log-file").value_name("LOG_FILE").help("Also write log output to this file"))
}

/// No arguments, or a lone `help`, shows usage like `--help` does
fn wants_help(args: &[OsString]) -> bool {
	match args.len() {
		1 => true,
		2 => args[1].to_str().map(|a| a.eq_ignore_ascii_case("help")).unwrap_or(false),
		_ => false,
	}
}

#[tokio::main]
async fn main() -> ExitCode {
	let args: Vec<OsString> = env::args_os().collect();
	if wants_help(&args) {
		let _ = cli().print_help();
		println!();
		return ExitCode::SUCCESS;
	}

	let matches = match cli().try_get_matches_from(&args) {
		Ok(matches) => matches,
		Err(e) => {
			let _ = e.print();
			return match e.kind() {
				ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
				_ => ExitCode::from(1),
			};
		}
	};

	println!("Starting dirmirror with arguments:");
	for arg in args.iter().skip(1) {
		println!("{}", arg.to_string_lossy());
	}
	println!();

	let get = |name: &str| matches.get_one::<String>(name).map(String::as_str);
	let config = match Config::from_args(
		get("source").unwrap_or_default(),
		get("destination").unwrap_or_default(),
		get("interval").unwrap_or_default(),
		get("log-file"),
	) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("{}", e);
			return ExitCode::from(1);
		}
	};

	let log_file = match &config.log_file {
		Some(path) => match LogFile::create(path) {
			Ok(log) => Some(log),
			Err(e) => {
				eprintln!("{}", e);
				return ExitCode::from(1);
			}
		},
		None => None,
	};
	logging::init_tracing(log_file.clone());
	if let Some(log) = &log_file {
		info!("Outputting logs to {}", log.path().display());
	}

	if let Err(e) = config.verify_directories() {
		error!("{}", e);
		return ExitCode::from(e.exit_code() as u8);
	}

	let cancel = Cancellation::new();
	setup_signal_handlers(cancel.clone());

	let mut scheduler = Scheduler::new(config, cancel).with_log_file(log_file);
	match scheduler.run().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => ExitCode::from(e.exit_code() as u8),
	}
}

// vim: ts=4
