//! In-memory [`Transport`] used by the session integration tests.
use std::collections::HashMap;
use std::sync::Mutex as StdMutex;

use crate::transport::Transport;

/// Records every write-with-response call and lets tests script failures.
pub(crate) struct MockTransport {
    writes: StdMutex<HashMap<u16, heapless::Vec<u8, 32>>>,
    subscribed: StdMutex<HashMap<u16, bool>>,
    fail_next_write: StdMutex<Option<MockError>>,
}

/// A scripted failure: either a lower-level transport error or a provider
/// write-response status.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MockError {
    Disconnected,
    ProviderStatus(u8),
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            writes: StdMutex::new(HashMap::new()),
            subscribed: StdMutex::new(HashMap::new()),
            fail_next_write: StdMutex::new(None),
        }
    }

    pub(crate) fn last_write(&self, handle: u16) -> Option<heapless::Vec<u8, 32>> {
        self.writes.lock().unwrap().get(&handle).cloned()
    }

    pub(crate) fn is_subscribed(&self, handle: u16) -> bool {
        *self.subscribed.lock().unwrap().get(&handle).unwrap_or(&false)
    }

    #[allow(dead_code)]
    pub(crate) fn fail_next_write_with(&self, error: MockError) {
        *self.fail_next_write.lock().unwrap() = Some(error);
    }
}

impl Transport for MockTransport {
    type Error = MockError;
    type Handle = u16;

    async fn write_with_response(&self, handle: Self::Handle, data: &[u8]) -> Result<(), Self::Error> {
        if let Some(err) = self.fail_next_write.lock().unwrap().take() {
            return Err(err);
        }
        let buf = heapless::Vec::from_slice(data).expect("test payload fits in 32 bytes");
        self.writes.lock().unwrap().insert(handle, buf);
        Ok(())
    }

    async fn subscribe(&self, handle: Self::Handle) -> Result<(), Self::Error> {
        self.subscribed.lock().unwrap().insert(handle, true);
        Ok(())
    }

    async fn unsubscribe(&self, handle: Self::Handle) -> Result<(), Self::Error> {
        self.subscribed.lock().unwrap().insert(handle, false);
        Ok(())
    }

    fn provider_status(error: &Self::Error) -> Option<u8> {
        match error {
            MockError::ProviderStatus(code) => Some(*code),
            MockError::Disconnected => None,
        }
    }
}
