//! Injection payload fixture, a Rust equivalent of `Test/TestLib.c`.
//!
//! `#[ctor]` runs the moment the dynamic linker finishes loading this
//! `cdylib`, exactly the hook `dlopen`'s caller is waiting to observe. It
//! appends a line to `./injected.log` on a background thread so the
//! end-to-end test can poll for the side effect without holding the
//! target stopped.

use std::fs::OpenOptions;
use std::io::Write;
use std::thread;
use std::time::Duration;

#[ctor::ctor]
fn on_load() {
    thread::spawn(log_loop);
}

fn log_loop() {
    loop {
        if let Ok(mut f) = OpenOptions::new()
            .create(true)
            .append(true)
            .open("injected.log")
        {
            let _ = writeln!(f, "inject-lib has been loaded!");
            let _ = f.flush();
        }
        thread::sleep(Duration::from_secs(1));
    }
}
