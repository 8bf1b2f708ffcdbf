//! MPEG audio frame header decoding and encoding.

use std::fmt;
use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader};

use super::tables::{BIT_RATES_V1, BIT_RATES_V2, MAX_BITRATE_INDEX, SAMPLING_RATES};

/// The 11-bit frame sync pattern.
pub const FRAME_SYNC: u32 = 0x7FF;

/// Size of the frame header word in bytes.
pub const HEADER_SIZE: usize = 4;

/// MPEG audio version, from the 2-bit version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Version {
    Mpeg25,
    Reserved,
    Mpeg2,
    Mpeg1,
}

impl Version {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Version::Mpeg25,
            1 => Version::Reserved,
            2 => Version::Mpeg2,
            _ => Version::Mpeg1,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Version::Mpeg25 => 0,
            Version::Reserved => 1,
            Version::Mpeg2 => 2,
            Version::Mpeg1 => 3,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Mpeg25 => write!(f, "MPEG-2.5"),
            Version::Reserved => write!(f, "reserved"),
            Version::Mpeg2 => write!(f, "MPEG-2"),
            Version::Mpeg1 => write!(f, "MPEG-1"),
        }
    }
}

/// MPEG audio layer, from the 2-bit layer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Layer {
    Reserved,
    Layer3,
    Layer2,
    Layer1,
}

impl Layer {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Layer::Reserved,
            1 => Layer::Layer3,
            2 => Layer::Layer2,
            _ => Layer::Layer1,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Layer::Reserved => 0,
            Layer::Layer3 => 1,
            Layer::Layer2 => 2,
            Layer::Layer1 => 3,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Reserved => write!(f, "reserved"),
            Layer::Layer3 => write!(f, "Layer III"),
            Layer::Layer2 => write!(f, "Layer II"),
            Layer::Layer1 => write!(f, "Layer I"),
        }
    }
}

/// Channel mode, from the 2-bit channel-mode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        }
    }

    fn bits(self) -> u32 {
        match self {
            ChannelMode::Stereo => 0,
            ChannelMode::JointStereo => 1,
            ChannelMode::DualChannel => 2,
            ChannelMode::Mono => 3,
        }
    }
}

/// A decoded 32-bit MPEG audio frame header.
///
/// Only the raw fields are stored. Samples per frame, sampling rate, bit
/// rate and frame size are derived on demand from the lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct FrameHeader {
    pub version: Version,
    pub layer: Layer,
    /// True when a 16-bit CRC follows the header (protection bit is 0).
    pub crc_protected: bool,
    pub bitrate_index: u8,
    pub sample_rate_index: u8,
    pub padding: bool,
    pub private: bool,
    pub channel_mode: ChannelMode,
    pub mode_extension: u8,
    pub copyright: bool,
    pub original: bool,
    pub emphasis: u8,
}

impl FrameHeader {
    /// Decode a header from four big-endian bytes.
    ///
    /// Returns `None` if the top 11 bits are not the frame sync pattern.
    /// A header with sync but unusable fields is still returned; check
    /// [`is_bad`](Self::is_bad).
    pub fn decode(word: [u8; 4]) -> Option<Self> {
        if u32::from_be_bytes(word) >> 21 != FRAME_SYNC {
            return None;
        }
        Self::read_fields(&word).ok()
    }

    fn read_fields(word: &[u8; 4]) -> io::Result<Self> {
        let mut reader = BitReader::endian(&word[..], BigEndian);

        reader.skip(11)?; // sync
        let version = Version::from_bits(reader.read::<u8>(2)?);
        let layer = Layer::from_bits(reader.read::<u8>(2)?);
        let crc_protected = !reader.read_bit()?;
        let bitrate_index = reader.read::<u8>(4)?;
        let sample_rate_index = reader.read::<u8>(2)?;
        let padding = reader.read_bit()?;
        let private = reader.read_bit()?;
        let channel_mode = ChannelMode::from_bits(reader.read::<u8>(2)?);
        let mode_extension = reader.read::<u8>(2)?;
        let copyright = reader.read_bit()?;
        let original = reader.read_bit()?;
        let emphasis = reader.read::<u8>(2)?;

        Ok(Self {
            version,
            layer,
            crc_protected,
            bitrate_index,
            sample_rate_index,
            padding,
            private,
            channel_mode,
            mode_extension,
            copyright,
            original,
            emphasis,
        })
    }

    /// Encode the header back into its four big-endian bytes.
    pub fn encode(&self) -> [u8; 4] {
        let word = (FRAME_SYNC << 21)
            | (self.version.bits() << 19)
            | (self.layer.bits() << 17)
            | ((!self.crc_protected as u32) << 16)
            | ((self.bitrate_index as u32 & 0xF) << 12)
            | ((self.sample_rate_index as u32 & 0x3) << 10)
            | ((self.padding as u32) << 9)
            | ((self.private as u32) << 8)
            | (self.channel_mode.bits() << 6)
            | ((self.mode_extension as u32 & 0x3) << 4)
            | ((self.copyright as u32) << 3)
            | ((self.original as u32) << 2)
            | (self.emphasis as u32 & 0x3);
        word.to_be_bytes()
    }

    /// Number of PCM samples one frame decodes to: 384, 576 or 1152.
    ///
    /// Zero for a reserved layer or version.
    pub fn samples_per_frame(&self) -> u32 {
        if self.version == Version::Reserved {
            return 0;
        }
        match self.layer {
            Layer::Layer1 => 384,
            Layer::Layer2 => 1152,
            Layer::Layer3 if self.version == Version::Mpeg1 => 1152,
            Layer::Layer3 => 576,
            Layer::Reserved => 0,
        }
    }

    /// Sampling rate in Hz, or zero for a reserved index or version.
    pub fn sampling_rate(&self) -> u32 {
        let rate = SAMPLING_RATES[(self.sample_rate_index & 0x3) as usize];
        match self.version {
            Version::Mpeg1 => rate,
            Version::Mpeg2 => rate >> 1,
            Version::Mpeg25 => rate >> 2,
            Version::Reserved => 0,
        }
    }

    /// Bit rate in bits per second for this header's bit-rate index.
    pub fn bit_rate(&self) -> u32 {
        self.bit_rate_for_index(self.bitrate_index)
    }

    fn bit_rate_for_index(&self, index: u8) -> u32 {
        if index > MAX_BITRATE_INDEX {
            return 0;
        }
        let kbps = match (self.version, self.layer) {
            (_, Layer::Reserved) | (Version::Reserved, _) => 0,
            (Version::Mpeg1, Layer::Layer1) => BIT_RATES_V1[0][index as usize],
            (Version::Mpeg1, Layer::Layer2) => BIT_RATES_V1[1][index as usize],
            (Version::Mpeg1, Layer::Layer3) => BIT_RATES_V1[2][index as usize],
            (_, Layer::Layer1) => BIT_RATES_V2[0][index as usize],
            (_, Layer::Layer2 | Layer::Layer3) => BIT_RATES_V2[1][index as usize],
        };
        kbps as u32 * 1000
    }

    /// True when the frame cannot be sized: forbidden bit-rate index, or a
    /// zero bit rate or sampling rate.
    pub fn is_bad(&self) -> bool {
        self.bitrate_index > MAX_BITRATE_INDEX || self.bit_rate() == 0 || self.sampling_rate() == 0
    }

    /// Frame length in bytes including the header. Zero for a bad frame.
    pub fn frame_size(&self) -> u32 {
        if self.is_bad() {
            return 0;
        }
        self.frame_size_for(self.bit_rate(), self.padding)
    }

    /// Largest frame this layer/version can produce: highest bit-rate entry
    /// with padding, independent of the stream's actual content.
    pub fn max_frame_size(&self) -> u32 {
        if self.is_bad() {
            return 0;
        }
        self.frame_size_for(self.bit_rate_for_index(MAX_BITRATE_INDEX), true)
    }

    fn frame_size_for(&self, bit_rate: u32, padding: bool) -> u32 {
        let sampling_rate = self.sampling_rate();
        if bit_rate == 0 || sampling_rate == 0 {
            return 0;
        }

        let constant: u64 = match (self.layer, self.version) {
            (Layer::Layer1, _) => 12,
            // MPEG-2/2.5 Layer III frames carry 576 samples, not 1152
            (Layer::Layer3, Version::Mpeg2 | Version::Mpeg25) => 72,
            _ => 144,
        };

        let mut slots = (constant * bit_rate as u64 / sampling_rate as u64) as u32;
        if padding {
            slots += 1;
        }
        slots * self.slot_size()
    }

    fn slot_size(&self) -> u32 {
        if self.layer == Layer::Layer1 {
            4
        } else {
            1
        }
    }

    /// Copy of this header at the highest bit rate, padded, without CRC.
    ///
    /// Its frame size equals [`max_frame_size`](Self::max_frame_size).
    pub fn at_max_bitrate(&self) -> Self {
        Self {
            bitrate_index: MAX_BITRATE_INDEX,
            padding: true,
            crc_protected: false,
            ..*self
        }
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} kbps {} Hz",
            self.version,
            self.layer,
            self.bit_rate() / 1000,
            self.sampling_rate()
        )
    }
}
