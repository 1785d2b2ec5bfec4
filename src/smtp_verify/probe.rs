use std::time::Instant;

use crate::validator::EmailAddress;

use super::error::ProbeError;
use super::options::ProbeOptions;
use super::session::SmtpSession;
use super::types::{ProbeOutcome, SmtpReply, SmtpStage};

/// Checks one mail exchanger for one recipient.
pub trait MailboxProbe {
    fn probe(&self, host: &str, address: &EmailAddress) -> ProbeOutcome;
}

impl<F> MailboxProbe for F
where
    F: Fn(&str, &EmailAddress) -> ProbeOutcome,
{
    fn probe(&self, host: &str, address: &EmailAddress) -> ProbeOutcome {
        self(host, address)
    }
}

/// [`MailboxProbe`] speaking SMTP over plain TCP.
#[derive(Debug, Clone, Default)]
pub struct SmtpProber {
    options: ProbeOptions,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }
}

impl MailboxProbe for SmtpProber {
    fn probe(&self, host: &str, address: &EmailAddress) -> ProbeOutcome {
        probe_host(host, address, &self.options)
    }
}

/// Runs `EHLO` (or `HELO`), `MAIL FROM` and `RCPT TO` against `host` and
/// reports whether the recipient was accepted.
///
/// The whole session shares one deadline of `options.timeout()`. No message
/// body is sent and the session is never closed with `QUIT`: once the `RCPT`
/// verdict is known the connection is dropped. Server logs will show the
/// client disconnecting after `RCPT TO`; that is the probe working as
/// intended, not a broken client.
pub fn probe_host(host: &str, address: &EmailAddress, options: &ProbeOptions) -> ProbeOutcome {
    let deadline = Instant::now() + options.timeout();
    let (result, transcript) = match SmtpSession::open(host, options.port, deadline) {
        Ok(mut session) => {
            let result = run_dialogue(&mut session, address, options);
            (result, session.into_transcript())
        }
        Err(err) => (Err(err), Vec::new()),
    };

    match result {
        Ok(reply) => {
            tracing::debug!(host, code = reply.code, "recipient accepted");
            ProbeOutcome::accepted(host).with_transcript(transcript)
        }
        Err(err) => {
            tracing::debug!(host, error = %err, "probe failed");
            ProbeOutcome::failed(host, &err).with_transcript(transcript)
        }
    }
}

fn run_dialogue(
    session: &mut SmtpSession,
    address: &EmailAddress,
    options: &ProbeOptions,
) -> Result<SmtpReply, ProbeError> {
    let host = session.host().to_string();
    let greeting = session.read_reply(SmtpStage::Greeting)?;
    if greeting.code != 220 {
        return Err(ProbeError::Rejected {
            host,
            stage: SmtpStage::Greeting,
            reply: greeting,
        });
    }

    let helo = options.helo_name();
    let ehlo = session.command(&format!("EHLO {helo}"), SmtpStage::Ehlo)?;
    if ehlo.is_permanent_failure() {
        // Pre-ESMTP servers answer 500/502 to EHLO.
        let reply = session.command(&format!("HELO {helo}"), SmtpStage::Helo)?;
        expect_positive(&host, SmtpStage::Helo, reply)?;
    } else {
        expect_positive(&host, SmtpStage::Ehlo, ehlo)?;
    }

    let mail_from = format!("MAIL FROM:<{}>", options.probe_sender);
    let reply = session.command(&mail_from, SmtpStage::MailFrom)?;
    expect_positive(&host, SmtpStage::MailFrom, reply)?;

    let rcpt_to = format!("RCPT TO:<{address}>");
    let reply = session.command(&rcpt_to, SmtpStage::RcptTo)?;
    expect_positive(&host, SmtpStage::RcptTo, reply)
}

fn expect_positive(
    host: &str,
    stage: SmtpStage,
    reply: SmtpReply,
) -> Result<SmtpReply, ProbeError> {
    if reply.is_positive_completion() {
        Ok(reply)
    } else {
        Err(ProbeError::Rejected {
            host: host.to_string(),
            stage,
            reply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smtp_verify::ProbeErrorKind;
    use std::io::{self, BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    type Script = Vec<(&'static str, &'static str)>;

    /// Serves one scripted session, then reports whether the client hung up
    /// without sending anything else.
    fn spawn_mock_server(script: Script) -> (u16, thread::JoinHandle<bool>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            handle_session(&mut stream, script).expect("mock session")
        });
        (port, handle)
    }

    fn handle_session(stream: &mut TcpStream, script: Script) -> io::Result<bool> {
        let mut reader = BufReader::new(stream.try_clone()?);
        stream.write_all(b"220 mock.smtp.test ESMTP\r\n")?;
        stream.flush()?;
        for (expected, response) in script {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            assert!(
                line.starts_with(expected),
                "expected command starting with '{expected}', got '{line}'"
            );
            stream.write_all(response.as_bytes())?;
            stream.flush()?;
        }
        let mut trailing = String::new();
        Ok(matches!(reader.read_line(&mut trailing), Ok(0) | Err(_)))
    }

    fn options(port: u16) -> ProbeOptions {
        ProbeOptions {
            port,
            timeout_ms: 2_000,
            ..ProbeOptions::default()
        }
    }

    fn target() -> EmailAddress {
        EmailAddress::parse("user@example.com").expect("address")
    }

    #[test]
    fn accepts_on_rcpt_250_and_hangs_up() {
        let (port, handle) = spawn_mock_server(vec![
            ("EHLO localhost", "250-mock.example\r\n250-PIPELINING\r\n250 SIZE\r\n"),
            ("MAIL FROM:<test@example.com>", "250 2.1.0 Ok\r\n"),
            ("RCPT TO:<user@example.com>", "250 2.1.5 Ok\r\n"),
        ]);
        let outcome = probe_host("127.0.0.1", &target(), &options(port));
        assert!(outcome.accepted, "{:?}", outcome.diagnostic);
        assert_eq!(outcome.diagnostic, None);
        assert!(
            outcome
                .transcript
                .iter()
                .any(|line| line == "[127.0.0.1] S: 250 PIPELINING")
        );
        let closed_without_quit = handle.join().expect("server thread");
        assert!(closed_without_quit, "client sent a command after RCPT TO");
    }

    #[test]
    fn rcpt_rejection_is_protocol_failure() {
        let (port, handle) = spawn_mock_server(vec![
            ("EHLO", "250 mock.example\r\n"),
            ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
            ("RCPT TO:", "550 5.1.1 User unknown\r\n"),
        ]);
        let outcome = probe_host("127.0.0.1", &target(), &options(port));
        assert!(!outcome.accepted);
        assert_eq!(outcome.error_kind, Some(ProbeErrorKind::SmtpProtocol));
        assert_eq!(
            outcome.diagnostic.as_deref(),
            Some("SMTP RCPT TO error (127.0.0.1): 550 5.1.1 User unknown")
        );
        assert!(handle.join().expect("server thread"));
    }

    #[test]
    fn falls_back_to_helo() {
        let (port, handle) = spawn_mock_server(vec![
            ("EHLO", "502 5.5.2 Command not recognized\r\n"),
            ("HELO localhost", "250 mock.example\r\n"),
            ("MAIL FROM:", "250 Ok\r\n"),
            ("RCPT TO:", "251 User not local; will forward\r\n"),
        ]);
        let outcome = probe_host("127.0.0.1", &target(), &options(port));
        assert!(outcome.accepted, "{:?}", outcome.diagnostic);
        assert!(handle.join().expect("server thread"));
    }

    #[test]
    fn mail_from_temp_failure_stops_before_rcpt() {
        let (port, handle) = spawn_mock_server(vec![
            ("EHLO", "250 mock.example\r\n"),
            ("MAIL FROM:", "451 4.7.1 Greylisted\r\n"),
        ]);
        let outcome = probe_host("127.0.0.1", &target(), &options(port));
        assert!(!outcome.accepted);
        let diagnostic = outcome.diagnostic.expect("diagnostic");
        assert!(diagnostic.contains("MAIL FROM"), "{diagnostic}");
        assert!(diagnostic.contains("451"), "{diagnostic}");
        assert!(handle.join().expect("server thread"));
    }

    #[test]
    fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let (_stream, _) = listener.accept().expect("accept");
            done_rx.recv_timeout(Duration::from_secs(5)).ok();
        });

        let opts = ProbeOptions {
            timeout_ms: 200,
            ..options(port)
        };
        let started = Instant::now();
        let outcome = probe_host("127.0.0.1", &target(), &opts);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!outcome.accepted);
        assert_eq!(outcome.error_kind, Some(ProbeErrorKind::SmtpTimeout));
        assert_eq!(
            outcome.diagnostic.as_deref(),
            Some("SMTP greeting timed out (127.0.0.1)")
        );

        done_tx.send(()).ok();
        handle.join().expect("server thread");
    }

    #[test]
    fn trickling_server_cannot_outlive_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            for byte in b"220 slow.example ESMTP\r\n" {
                if stop_rx.try_recv().is_ok() || stream.write_all(&[*byte]).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(150));
            }
        });

        let opts = ProbeOptions {
            timeout_ms: 300,
            ..options(port)
        };
        let started = Instant::now();
        let outcome = probe_host("127.0.0.1", &target(), &opts);
        let elapsed = started.elapsed();
        stop_tx.send(()).ok();
        handle.join().expect("server thread");

        assert!(elapsed < Duration::from_secs(1), "session lived {elapsed:?}");
        assert!(!outcome.accepted);
        assert_eq!(outcome.error_kind, Some(ProbeErrorKind::SmtpTimeout));
        assert_eq!(
            outcome.diagnostic.as_deref(),
            Some("SMTP greeting timed out (127.0.0.1)")
        );
    }

    #[test]
    fn oversized_reply_line_is_protocol_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut greeting = b"220 ".to_vec();
            greeting.extend(std::iter::repeat_n(b'a', 8_192));
            greeting.extend_from_slice(b"\r\n");
            stream.write_all(&greeting).ok();
        });

        let outcome = probe_host("127.0.0.1", &target(), &options(port));
        handle.join().expect("server thread");

        assert!(!outcome.accepted);
        assert_eq!(outcome.error_kind, Some(ProbeErrorKind::SmtpProtocol));
        assert_eq!(
            outcome.diagnostic.as_deref(),
            Some("SMTP greeting protocol error (127.0.0.1): reply line exceeds 4096 bytes")
        );
    }

    #[test]
    fn refused_connection_is_dial_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let outcome = probe_host("127.0.0.1", &target(), &options(port));
        assert!(!outcome.accepted);
        assert_eq!(outcome.error_kind, Some(ProbeErrorKind::SmtpDial));
        assert!(outcome.transcript.is_empty());
    }
}
