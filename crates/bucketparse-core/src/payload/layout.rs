pub const DISTANCE_RANGE: std::ops::Range<usize> = 0..2;

pub const MIN_LEN: usize = DISTANCE_RANGE.end;
