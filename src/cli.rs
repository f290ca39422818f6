//! CLI surface (spec section 6: `-p <cmdline_literal>` and
//! `-l <library_path>`, both required). `structopt` matches the teacher's
//! own CLI dependency choice.

use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "ptrace-inject",
    about = "Injects a shared library into a running Linux process via ptrace."
)]
pub struct Opt {
    /// Literal bytes to match against a target's /proc/<pid>/cmdline.
    #[structopt(short = "p", long = "process")]
    pub process_cmdline: String,

    /// Path to the shared library to load into the target.
    #[structopt(short = "l", long = "library")]
    pub library_path: String,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: u8,

    /// Optional deadline, in milliseconds, on the remote-call wait loop.
    /// Unset means block indefinitely, matching the original behavior.
    #[structopt(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,
}
