use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use interpreter::CommandSet;
use tracing::info;

/// Where interpreted commands go.
pub trait CommandSink {
    /// Deliver every array of one file, in order.
    fn deliver(&mut self, set: &CommandSet) -> io::Result<()>;

    /// Called once after the last file.
    fn close(self: Box<Self>) -> io::Result<()>;
}

fn write_commands<W: Write>(out: &mut W, set: &CommandSet) -> io::Result<()> {
    for (_, commands) in set.arrays() {
        for command in commands {
            writeln!(out, "{}", command)?;
        }
    }
    out.flush()
}

/// Writes commands to any writer, one per line.
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        WriterSink { out }
    }
}

impl<W: Write> CommandSink for WriterSink<W> {
    fn deliver(&mut self, set: &CommandSet) -> io::Result<()> {
        write_commands(&mut self.out, set)
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.out.flush()
    }
}

/// A game server running as a child process; commands go to its console.
pub struct ServerSink {
    child: Child,
    stdin: ChildStdin,
    stop_on_close: bool,
}

impl ServerSink {
    pub fn spawn(jar: &Path, stop_on_close: bool) -> io::Result<Self> {
        info!(jar = %jar.display(), "starting server");
        let mut child = Command::new("java")
            .args(["-Xms1G", "-Xmx1G", "-jar"])
            .arg(jar)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("server console is not piped"))?;
        Ok(ServerSink {
            child,
            stdin,
            stop_on_close,
        })
    }

    /// Block until the operator presses enter.
    fn confirm() -> io::Result<()> {
        eprint!(
            "Press enter whenever ready to place the command blocks. \
             (The player has to be in the area!)..."
        );
        io::stderr().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        eprintln!("->");
        Ok(())
    }
}

impl CommandSink for ServerSink {
    fn deliver(&mut self, set: &CommandSet) -> io::Result<()> {
        Self::confirm()?;
        write_commands(&mut self.stdin, set)
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        if !self.stop_on_close {
            info!("leaving server running");
            return Ok(());
        }
        info!("stopping server");
        writeln!(self.stdin, "stop")?;
        self.stdin.flush()?;
        let status = self.child.wait()?;
        info!(%status, "server exited");
        Ok(())
    }
}
