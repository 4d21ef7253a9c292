// sprox-rs/sprox/src/transport/mock.rs

use crate::Result;
use crate::transport::traits::Transport;

/// Mock transport for unit tests. It records sent frames and returns queued
/// responses in order.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sent: Vec<Vec<u8>>,
    pub responses: Vec<Vec<u8>>,
    /// Testing hook: number of receive calls that should fail with Timeout
    pub receive_failures: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many subsequent receive calls should fail (for tests).
    pub fn set_receive_failures(&mut self, n: usize) {
        self.receive_failures = n;
    }

    pub fn push_response(&mut self, resp: Vec<u8>) {
        self.responses.push(resp);
    }

    pub fn pop_sent(&mut self) -> Option<Vec<u8>> {
        self.sent.pop()
    }

    /// Number of request frames sent so far.
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.sent.push(data.to_vec());
        Ok(())
    }

    fn receive(&mut self, _timeout_ms: u64) -> Result<Vec<u8>> {
        if self.receive_failures > 0 {
            self.receive_failures -= 1;
            return Err(crate::Error::Timeout);
        }
        if self.responses.is_empty() {
            Err(crate::Error::Timeout)
        } else {
            Ok(self.responses.remove(0))
        }
    }

    fn reset(&mut self) -> Result<()> {
        // Reset clears recorded sent frames but preserves queued responses
        // so unit tests can pre-seed expected replies (firmware answer,
        // select frames) before handing the transport to a Reader.
        self.sent.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
