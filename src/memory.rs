//! Cross-Process Memory I/O (spec section 4.3): bulk reads and writes
//! between address spaces via `process_vm_readv`/`process_vm_writev`,
//! chosen over word-at-a-time `PTRACE_PEEKDATA`/`PTRACE_POKEDATA` because
//! the driver moves library-path strings of tens to hundreds of bytes and
//! even the engine's single-word sentinel write benefits from not forcing
//! a ptrace round trip.

use crate::error::{InjectError, Result};
use nix::sys::uio::{process_vm_readv, process_vm_writev, RemoteIoVec};
use nix::unistd::Pid;
use std::io::{IoSlice, IoSliceMut};

/// Reads exactly `buf.len()` bytes from `remote_addr` in `pid` into `buf`.
/// Any count other than `buf.len()` is `ShortTransfer`, never silently
/// accepted as a partial read.
pub fn read_remote(pid: Pid, remote_addr: u64, buf: &mut [u8]) -> Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    let len = buf.len();
    let mut local = [IoSliceMut::new(buf)];
    let remote = [RemoteIoVec {
        base: remote_addr as usize,
        len,
    }];
    let moved = process_vm_readv(pid, &mut local, &remote).map_err(InjectError::from)?;
    check_full_transfer(moved, len)
}

/// Writes all of `buf` to `remote_addr` in `pid`.
pub fn write_remote(pid: Pid, remote_addr: u64, buf: &[u8]) -> Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    let local = [IoSlice::new(buf)];
    let remote = [RemoteIoVec {
        base: remote_addr as usize,
        len: buf.len(),
    }];
    let moved = process_vm_writev(pid, &local, &remote).map_err(InjectError::from)?;
    check_full_transfer(moved, buf.len())
}

/// Writes a single machine word (little-endian, native `u64`) — the shape
/// the remote-call engine needs for planting the sentinel return address.
pub fn write_word(pid: Pid, remote_addr: u64, value: u64) -> Result<()> {
    write_remote(pid, remote_addr, &value.to_ne_bytes())
}

/// Reads a NUL-terminated C string from the target, one page-sized chunk
/// at a time, capped at `max_len` bytes to bound a runaway read against a
/// corrupted or adversarial pointer.
pub fn read_c_string(pid: Pid, remote_addr: u64, max_len: usize) -> Result<String> {
    const CHUNK: usize = 256;
    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset < max_len {
        let want = CHUNK.min(max_len - offset);
        let mut chunk = vec![0u8; want];
        read_remote(pid, remote_addr + offset as u64, &mut chunk)?;
        match chunk.iter().position(|&b| b == 0) {
            Some(nul_idx) => {
                out.extend_from_slice(&chunk[..nul_idx]);
                return Ok(String::from_utf8_lossy(&out).into_owned());
            }
            None => {
                out.extend_from_slice(&chunk);
                offset += want;
            }
        }
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn check_full_transfer(moved: usize, expected: usize) -> Result<()> {
    if moved == expected {
        Ok(())
    } else {
        Err(InjectError::ShortTransfer {
            expected,
            actual: moved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::getpid;

    #[test]
    fn round_trips_bytes_against_self() {
        let pid = getpid();
        let original = b"the quick brown fox jumps over the lazy dog".to_vec();
        let mut local_buf = original.clone();
        write_remote(pid, local_buf.as_ptr() as u64, &original).unwrap();

        let mut read_back = vec![0u8; original.len()];
        read_remote(pid, local_buf.as_mut_ptr() as u64, &mut read_back).unwrap();
        assert_eq!(read_back, original);
    }

    #[test]
    fn reads_a_c_string_from_self() {
        let pid = getpid();
        let text = b"hello, injector\0extra-garbage-past-the-nul";
        let s = read_c_string(pid, text.as_ptr() as u64, text.len()).unwrap();
        assert_eq!(s, "hello, injector");
    }

    #[test]
    fn empty_buffers_are_a_no_op() {
        let pid = getpid();
        assert!(read_remote(pid, 0, &mut []).is_ok());
        assert!(write_remote(pid, 0, &[]).is_ok());
    }
}
