//! Seqpacket control channel with deadline-bounded, partial-I/O-aware I/O.

use crate::types::{ExchangeError, SetupError};
use log::warn;
use nix::sys::socket::{
    accept, bind, listen, recv, send, socket, AddressFamily, Backlog, MsgFlags, SockFlag,
    SockType, UnixAddr,
};
use std::fs;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the socket file inside the per-bot directory.
pub const SOCKET_FILE: &str = "socket";

/// Listening endpoint plus the single accepted peer.
pub struct ControlChannel {
    listener: OwnedFd,
    peer: Option<OwnedFd>,
    path: PathBuf,
}

impl ControlChannel {
    /// Binds a SOCK_SEQPACKET listener at `<dir>/socket` with backlog one.
    /// A stale socket file from a previous run is removed first.
    pub fn bind(dir: &Path) -> Result<Self, SetupError> {
        let path = dir.join(SOCKET_FILE);

        if fs::remove_file(&path).is_ok() {
            warn!("removed stale {} before recreating it", path.display());
        }

        let listener = socket(
            AddressFamily::Unix,
            SockType::SeqPacket,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(|e| SetupError::Channel(errno_io(e)))?;

        let addr = UnixAddr::new(&path).map_err(|e| SetupError::Channel(errno_io(e)))?;
        bind(listener.as_raw_fd(), &addr).map_err(|e| SetupError::Channel(errno_io(e)))?;

        let backlog = Backlog::new(1).map_err(|e| SetupError::Channel(errno_io(e)))?;
        listen(&listener, backlog).map_err(|e| SetupError::Channel(errno_io(e)))?;

        Ok(Self {
            listener,
            peer: None,
            path,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    /// Blocks for an incoming connection, bounded by `timeout`. Accepts the
    /// one and only peer this channel will ever have.
    pub fn accept_within(&mut self, timeout: Duration) -> Result<(), SetupError> {
        match wait_readable(self.listener.as_raw_fd(), timeout) {
            Ok(true) => {}
            Ok(false) => return Err(SetupError::ConnectTimeout),
            Err(e) => return Err(SetupError::Accept(e)),
        }

        let raw = accept(self.listener.as_raw_fd()).map_err(|e| SetupError::Accept(errno_io(e)))?;
        self.peer = Some(unsafe { OwnedFd::from_raw_fd(raw) });
        Ok(())
    }

    /// One send, one message. Confirms immediate writability with a
    /// zero-timeout poll first; a non-writable channel or a short write is a
    /// failure, never a blocking wait.
    pub fn send_exact(&self, data: &[u8]) -> Result<(), ExchangeError> {
        let fd = self.peer_fd()?;

        match writable_now(fd) {
            Ok(true) => {}
            Ok(false) => return Err(ExchangeError::NotWritable),
            Err(e) => return Err(ExchangeError::Io(e)),
        }

        let sent = send(fd, data, MsgFlags::empty()).map_err(|e| ExchangeError::Io(errno_io(e)))?;
        if sent != data.len() {
            return Err(ExchangeError::ShortWrite {
                sent,
                expected: data.len(),
            });
        }
        Ok(())
    }

    /// One receive, one message, bounded by `timeout`. A timeout or a short
    /// read is a failure.
    pub fn recv_exact(&self, buf: &mut [u8], timeout: Duration) -> Result<(), ExchangeError> {
        let fd = self.peer_fd()?;

        match wait_readable(fd, timeout) {
            Ok(true) => {}
            Ok(false) => return Err(ExchangeError::Timeout(timeout)),
            Err(e) => return Err(ExchangeError::Io(e)),
        }

        let got = recv(fd, buf, MsgFlags::empty()).map_err(|e| ExchangeError::Io(errno_io(e)))?;
        if got != buf.len() {
            return Err(ExchangeError::ShortRead {
                got,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    fn peer_fd(&self) -> Result<RawFd, ExchangeError> {
        self.peer
            .as_ref()
            .map(|fd| fd.as_raw_fd())
            .ok_or(ExchangeError::NotOnline("control channel not connected"))
    }
}

impl Drop for ControlChannel {
    fn drop(&mut self) {
        // unlink so the path can be bound again next match
        let _ = fs::remove_file(&self.path);
    }
}

fn errno_io(e: nix::errno::Errno) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

fn wait_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    poll_one(fd, libc::POLLIN, clamp_millis(timeout))
}

fn writable_now(fd: RawFd) -> io::Result<bool> {
    poll_one(fd, libc::POLLOUT, 0)
}

fn clamp_millis(timeout: Duration) -> libc::c_int {
    timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int
}

fn poll_one(fd: RawFd, events: libc::c_short, timeout_ms: libc::c_int) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events,
        revents: 0,
    };

    loop {
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if rc == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(rc > 0);
    }
}
