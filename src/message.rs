use crate::error::{Error, Result};
use crate::wire::Reader;

use byteorder::LE;

/// A marshalled message body and the signature it was written with.
/// Headers and framing belong to the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub data: Vec<u8>,
    pub signature: String,
}

impl Message {
    pub fn new(data: Vec<u8>, signature: impl Into<String>) -> Self {
        Self {
            data,
            signature: signature.into(),
        }
    }

    pub fn body_reader(&self) -> Reader<'_, LE> {
        Reader::new(&self.data)
    }

    /// A reader over the body, provided the message carries `expected`.
    pub fn body_reader_for(&self, expected: &str) -> Result<Reader<'_, LE>> {
        if self.signature != expected {
            return Err(Error::ProtocolMismatch {
                expected: expected.to_owned(),
                found: self.signature.clone(),
            });
        }
        Ok(self.body_reader())
    }
}
