//! HTTP document source
//!
//! A live view of one URL: `navigate` loads the page, `current_snapshot`
//! reads what is loaded, `refresh` loads it again.

use pagewatch_core::errors::{ExError, ExErrorKind, Result};
use pagewatch_core::{DocumentSource, Snapshot, SourceFault};
use reqwest::blocking::Client;
use std::time::Duration;

pub struct HttpDocumentSource {
    client: Client,
    url: String,
    loaded: Option<Snapshot>,
    closed: bool,
}

impl HttpDocumentSource {
    /// # Errors
    ///
    /// `Internal` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("build_http_client")
                    .with_target(&url)
                    .with_message(e.to_string())
            })?;
        Ok(Self {
            client,
            url,
            loaded: None,
            closed: false,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Load the page and return what was loaded.
    pub fn navigate(&mut self) -> std::result::Result<Snapshot, SourceFault> {
        self.ensure_open()?;
        let snapshot = self.load()?;
        self.loaded = Some(snapshot.clone());
        Ok(snapshot)
    }

    fn ensure_open(&self) -> std::result::Result<(), SourceFault> {
        if self.closed {
            return Err(SourceFault::closed_by_user(format!(
                "source for {} was closed",
                self.url
            )));
        }
        Ok(())
    }

    fn load(&self) -> std::result::Result<Snapshot, SourceFault> {
        tracing::debug!(url = %self.url, "loading page");
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        let body = response.text().map_err(classify)?;
        Ok(Snapshot::from_html(body))
    }
}

impl DocumentSource for HttpDocumentSource {
    fn current_snapshot(&mut self) -> std::result::Result<Snapshot, SourceFault> {
        self.ensure_open()?;
        match &self.loaded {
            Some(snapshot) => Ok(snapshot.clone()),
            None => self.navigate(),
        }
    }

    fn refresh(&mut self) -> std::result::Result<(), SourceFault> {
        self.navigate().map(|_| ())
    }

    fn close(&mut self) {
        self.closed = true;
        self.loaded = None;
    }
}

fn classify(err: reqwest::Error) -> SourceFault {
    if err.is_connect() || err.is_timeout() || err.is_status() {
        SourceFault::unavailable(err.to_string())
    } else {
        SourceFault::unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewatch_core::FaultKind;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Serves one canned response per connection, in order.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/page", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                read_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });
        (url, handle)
    }

    fn read_request(stream: &mut TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
    }

    fn source(url: &str) -> HttpDocumentSource {
        HttpDocumentSource::new(url, Duration::from_secs(5), "pagewatch-test").unwrap()
    }

    #[test]
    fn test_navigate_extracts_body_text() {
        let (url, server) = serve(vec![(
            200,
            "<html><head><title>t</title></head><body><p>Price: $10</p></body></html>",
        )]);
        let mut source = source(&url);

        let snapshot = source.navigate().unwrap();

        assert_eq!(snapshot.text(), "Price: $10");
        assert!(snapshot.payload().contains("<title>t</title>"));
        server.join().unwrap();
    }

    #[test]
    fn test_current_snapshot_reads_loaded_page_until_refresh() {
        let (url, server) = serve(vec![
            (200, "<body>first</body>"),
            (200, "<body>second</body>"),
        ]);
        let mut source = source(&url);

        source.navigate().unwrap();
        assert_eq!(source.current_snapshot().unwrap().text(), "first");
        assert_eq!(source.current_snapshot().unwrap().text(), "first");

        source.refresh().unwrap();
        assert_eq!(source.current_snapshot().unwrap().text(), "second");
        server.join().unwrap();
    }

    #[test]
    fn test_error_status_is_unavailable() {
        let (url, server) = serve(vec![(503, "down")]);
        let mut source = source(&url);

        let fault = source.navigate().unwrap_err();

        assert_eq!(fault.kind(), FaultKind::Unavailable);
        assert!(fault.summary().contains("503"));
        server.join().unwrap();
    }

    #[test]
    fn test_refused_connection_is_unavailable() {
        let url = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}/", listener.local_addr().unwrap())
        };
        let mut source = source(&url);

        let fault = source.current_snapshot().unwrap_err();

        assert_eq!(fault.kind(), FaultKind::Unavailable);
    }

    #[test]
    fn test_closed_source_reports_closed_by_user() {
        let (url, server) = serve(vec![(200, "<body>page</body>")]);
        let mut source = source(&url);
        source.navigate().unwrap();

        source.close();

        assert_eq!(
            source.current_snapshot().unwrap_err().kind(),
            FaultKind::ClosedByUser
        );
        assert_eq!(
            source.refresh().unwrap_err().kind(),
            FaultKind::ClosedByUser
        );
        server.join().unwrap();
    }
}
