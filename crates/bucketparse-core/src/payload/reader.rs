use super::error::PayloadError;

pub struct PayloadReader<'a> {
    payload: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), PayloadError> {
        if self.payload.len() < needed {
            return Err(PayloadError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], PayloadError> {
        self.payload
            .get(range.clone())
            .ok_or(PayloadError::TooShort {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    pub fn read_i16_be(&self, range: std::ops::Range<usize>) -> Result<i16, PayloadError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(PayloadError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }
}
