use ptrace_inject::cli::Opt;
use ptrace_inject::commands::inject_command::InjectCommand;
use ptrace_inject::commands::InjectorCommand;
use ptrace_inject::flags::RuntimeConfig;
use std::process::ExitCode;
use std::time::Duration;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let opt = Opt::from_args();
    init_tracing(opt.verbose);

    RuntimeConfig::set(RuntimeConfig {
        wait_deadline: opt.timeout_ms.map(Duration::from_millis),
        ..RuntimeConfig::default()
    });

    let mut command = InjectCommand::new(opt.process_cmdline.into_bytes(), opt.library_path);

    match command.run() {
        Ok(()) => {
            println!("Info: operation completed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
