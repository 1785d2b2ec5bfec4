use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use super::error::ProbeError;
use super::types::{SmtpReply, SmtpStage};

// RFC 5321 caps reply lines at 512 octets; leave room for sloppy servers.
const MAX_REPLY_LINE: usize = 4096;

/// Client side of one SMTP connection, bounded by a single deadline.
///
/// The socket is owned here and closed when the session is dropped.
pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    deadline: Instant,
    transcript: Vec<String>,
}

impl SmtpSession {
    pub(crate) fn open(host: &str, port: u16, deadline: Instant) -> Result<Self, ProbeError> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|err| ProbeError::dial(host, err))?
            .collect();
        Self::connect(host, &addrs, deadline)
    }

    pub(crate) fn connect(
        host: &str,
        addrs: &[SocketAddr],
        deadline: Instant,
    ) -> Result<Self, ProbeError> {
        let mut last_err = None;
        for addr in addrs {
            let remaining = remaining(deadline)
                .ok_or_else(|| ProbeError::timeout(host, SmtpStage::Connect))?;
            match TcpStream::connect_timeout(addr, remaining) {
                Ok(stream) => {
                    tracing::trace!(host, %addr, "connected");
                    let reader = stream
                        .try_clone()
                        .map(BufReader::new)
                        .map_err(|err| ProbeError::dial(host, err))?;
                    return Ok(Self {
                        host: host.to_string(),
                        stream,
                        reader,
                        deadline,
                        transcript: Vec::new(),
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::TimedOut => {
                    last_err = Some(ProbeError::timeout(host, SmtpStage::Connect));
                }
                Err(err) => last_err = Some(ProbeError::dial(host, err)),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            ProbeError::dial(
                host,
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no socket address available",
                ),
            )
        }))
    }

    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    pub(crate) fn into_transcript(self) -> Vec<String> {
        self.transcript
    }

    /// Sends `command` and waits for its reply.
    pub(crate) fn command(
        &mut self,
        command: &str,
        stage: SmtpStage,
    ) -> Result<SmtpReply, ProbeError> {
        self.record("C", command);
        let remaining = self.arm(stage)?;
        self.stream
            .set_write_timeout(Some(remaining))
            .map_err(|err| ProbeError::io(&self.host, stage, &err))?;
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream
            .write_all(&line)
            .and_then(|()| self.stream.flush())
            .map_err(|err| ProbeError::io(&self.host, stage, &err))?;
        self.read_reply(stage)
    }

    pub(crate) fn read_reply(&mut self, stage: SmtpStage) -> Result<SmtpReply, ProbeError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            let Some(mut raw) = self.read_line(stage)? else {
                return Err(ProbeError::protocol(
                    &self.host,
                    stage,
                    "connection closed while reading reply",
                ));
            };
            if raw.ends_with('\n') {
                raw.pop();
                if raw.ends_with('\r') {
                    raw.pop();
                }
            }

            let parsed_code = raw
                .get(..3)
                .and_then(|part| part.parse::<u16>().ok())
                .ok_or_else(|| {
                    ProbeError::protocol(&self.host, stage, format!("invalid SMTP reply: '{raw}'"))
                })?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(ProbeError::protocol(
                        &self.host,
                        stage,
                        format!("inconsistent SMTP reply codes: {existing} vs {parsed_code}"),
                    ));
                }
            } else {
                code = Some(parsed_code);
            }
            let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
            message_lines.push(raw.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
        }
        let reply = SmtpReply {
            code: code.unwrap_or_default(),
            message: message_lines.join("\n"),
        };
        self.record_reply(&reply);
        Ok(reply)
    }

    /// Reads one reply line. Every socket read is re-armed against the
    /// session deadline, so a server trickling bytes cannot outlive it.
    /// `None` means the peer closed before sending anything.
    fn read_line(&mut self, stage: SmtpStage) -> Result<Option<String>, ProbeError> {
        let mut line = Vec::new();
        loop {
            self.arm(stage)?;
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProbeError::io(&self.host, stage, &err)),
            };
            if available.is_empty() {
                if line.is_empty() {
                    return Ok(None);
                }
                break;
            }
            let (consumed, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(idx) => (idx + 1, true),
                None => (available.len(), false),
            };
            line.extend_from_slice(&available[..consumed]);
            self.reader.consume(consumed);
            if line.len() > MAX_REPLY_LINE {
                return Err(ProbeError::protocol(
                    &self.host,
                    stage,
                    format!("reply line exceeds {MAX_REPLY_LINE} bytes"),
                ));
            }
            if complete {
                break;
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    // Re-arms the read timeout with whatever is left of the session budget.
    fn arm(&mut self, stage: SmtpStage) -> Result<Duration, ProbeError> {
        let remaining =
            remaining(self.deadline).ok_or_else(|| ProbeError::timeout(&self.host, stage))?;
        self.reader
            .get_ref()
            .set_read_timeout(Some(remaining))
            .map_err(|err| ProbeError::io(&self.host, stage, &err))?;
        Ok(remaining)
    }

    fn record(&mut self, direction: &str, message: &str) {
        tracing::trace!(host = %self.host, "{direction}: {message}");
        self.transcript
            .push(format!("[{}] {direction}: {message}", self.host));
    }

    fn record_reply(&mut self, reply: &SmtpReply) {
        if reply.message.is_empty() {
            self.record("S", &reply.code.to_string());
        } else {
            for line in reply.message.lines() {
                self.record("S", &format!("{} {}", reply.code, line));
            }
        }
    }
}

fn remaining(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
}
