//! Injection target fixture, a Rust equivalent of `Test/TestBin.c`.
//!
//! Spawns a background thread and then sleeps forever. Used by
//! `tests/injection.rs` as the live process the injector attaches to; its
//! `cmdline` is matched with an explicit `-p "target-process\0"` argument.

use std::thread;
use std::time::Duration;

fn print_loop() {
    loop {
        thread::sleep(Duration::from_secs(10));
        println!("target-process: still running");
    }
}

fn main() {
    thread::spawn(print_loop);
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
