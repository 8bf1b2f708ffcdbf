//! Static lookup tables for MPEG audio frame headers.

/// Bit rates in kbps for MPEG-1, indexed by `[layer row][bitrate index]`.
///
/// Rows are Layer I, Layer II, Layer III. Index 0 is the free-format rate.
pub(crate) const BIT_RATES_V1: [[u16; 15]; 3] = [
    [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448],
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],
];

/// Bit rates in kbps for MPEG-2 and MPEG-2.5.
///
/// Rows are Layer I and the combined Layer II/III row.
pub(crate) const BIT_RATES_V2: [[u16; 15]; 2] = [
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
];

/// MPEG-1 sampling rates in Hz by sample-rate index. Index 3 is reserved.
pub(crate) const SAMPLING_RATES: [u32; 4] = [44100, 48000, 32000, 0];

/// Highest usable bit-rate index; 15 is the forbidden value.
pub(crate) const MAX_BITRATE_INDEX: u8 = 14;
