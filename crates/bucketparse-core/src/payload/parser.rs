use super::error::PayloadError;
use super::layout;
use super::reader::PayloadReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceReading {
    pub distance_mm: i16,
}

pub fn parse_distance(payload: &[u8]) -> Result<DistanceReading, PayloadError> {
    let reader = PayloadReader::new(payload);
    reader.require_len(layout::MIN_LEN)?;

    let distance_mm = reader.read_i16_be(layout::DISTANCE_RANGE.clone())?;
    Ok(DistanceReading { distance_mm })
}
