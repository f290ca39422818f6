//! The Driver's fixed sequence (spec section 4.6): locate, attach,
//! `malloc` a scratch buffer, write the library path, `dlopen` it, `free`
//! the buffer, detach. Grounded directly in
//! `examples/original_source/src/Main.c` and `Memory.c`.

use crate::commands::InjectorCommand;
use crate::engine::remote_call;
use crate::error::{InjectError, Result};
use crate::memory;
use crate::process;
use crate::session::TargetSession;
use tracing::info;

const RTLD_NOW: u64 = libc::RTLD_NOW as u64;
const RTLD_GLOBAL: u64 = libc::RTLD_GLOBAL as u64;
const SCRATCH_SIZE: u64 = 256;

pub struct InjectCommand {
    cmdline_literal: Vec<u8>,
    library_path: String,
}

impl InjectCommand {
    pub fn new(cmdline_literal: Vec<u8>, library_path: String) -> InjectCommand {
        InjectCommand {
            cmdline_literal,
            library_path,
        }
    }
}

impl InjectorCommand for InjectCommand {
    fn run(&mut self) -> Result<()> {
        let pid = process::locate(&self.cmdline_literal)?;
        println!("Info: found target process, pid {pid}");

        let session = TargetSession::attach(pid)?;
        println!("Info: attached to target");

        let outcome = inject(&session, &self.library_path);

        // The driver detaches regardless of how injection went (spec
        // section 8 scenario 4: "still attempts the free and detach").
        session.detach()?;
        println!("Info: detached from target");

        outcome
    }
}

fn inject(session: &TargetSession, library_path: &str) -> Result<()> {
    let scratch = match remote_call(session, libc::malloc as u64, &[SCRATCH_SIZE]) {
        Ok(addr) if addr != 0 => addr,
        Ok(_) => return Err(InjectError::Debugger("remote malloc returned NULL".into())),
        Err(e) => return Err(e),
    };
    info!(scratch = %format!("{scratch:#x}"), "allocated remote scratch buffer");

    let path_bytes = {
        let mut bytes = library_path.as_bytes().to_vec();
        bytes.push(0); // NUL-terminate for dlopen
        bytes
    };

    let write_result = memory::write_remote(session.pid(), scratch, &path_bytes);
    let dlopen_result = write_result.and_then(|()| {
        println!("Info: library path written to target");
        dlopen_remote(session, scratch)
    });

    // free the scratch buffer regardless of whether dlopen succeeded
    // (spec section 4.6 step 6), but don't let a successful free mask an
    // earlier failure.
    let free_result = remote_call(session, libc::free as u64, &[scratch]).map(|_| ());
    match &free_result {
        Ok(()) => println!("Info: remote buffer freed"),
        Err(e) => eprintln!("Error: remote free failed: {e}"),
    }

    dlopen_result.and(free_result)
}

fn dlopen_remote(session: &TargetSession, path_addr: u64) -> Result<()> {
    let handle = remote_call(
        session,
        libc::dlopen as u64,
        &[path_addr, RTLD_NOW | RTLD_GLOBAL],
    )?;

    if handle != 0 {
        println!("Info: library successfully loaded (handle {handle:#x})");
        return Ok(());
    }

    // dlopen returned NULL: fetch dlerror()'s message before reporting
    // failure (spec section 8 scenario 4).
    let error_addr = remote_call(session, libc::dlerror as u64, &[])?;
    if error_addr == 0 {
        return Err(InjectError::Debugger(
            "dlopen failed and dlerror() returned NULL".into(),
        ));
    }

    let message = memory::read_c_string(session.pid(), error_addr, 512)?;
    eprintln!("Error: dlopen failed with error:\n\t{message}");
    Err(InjectError::Debugger(format!("dlopen failed: {message}")))
}
