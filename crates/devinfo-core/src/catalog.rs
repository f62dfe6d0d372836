//! Compiled-in catalogs: codec support and storage unit descriptions.

use crate::platform::Volume;
use serde::Serialize;

/// Audio codec capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioCodec {
    pub comp_formats: &'static str,
    pub encode: bool,
    pub decode: bool,
}

/// Video codec capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCodec {
    pub comp_formats: &'static str,
    pub container_formats: &'static [&'static str],
    pub hw_accel: bool,
    pub profiles: &'static [&'static str],
    pub frame_types: &'static [&'static str],
    pub rate_types: &'static [&'static str],
}

/// Response record for the `avcodecs` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvCodecs {
    pub audio_codecs: &'static [AudioCodec],
    pub video_codecs: &'static [VideoCodec],
}

const fn decode_only(comp_formats: &'static str) -> AudioCodec {
    AudioCodec {
        comp_formats,
        encode: false,
        decode: true,
    }
}

const fn video(comp_formats: &'static str, container_formats: &'static [&'static str]) -> VideoCodec {
    VideoCodec {
        comp_formats,
        container_formats,
        hw_accel: true,
        profiles: &[],
        frame_types: &[],
        rate_types: &[],
    }
}

static AUDIO_CODECS: [AudioCodec; 9] = [
    decode_only("AAC LC/LTP"),
    decode_only("HE-AACv1 (AAC+)"),
    decode_only("HE-AACv2 (enhanced AAC+)"),
    AudioCodec {
        comp_formats: "AMR-NB",
        encode: true,
        decode: true,
    },
    decode_only("AMR-WB"),
    decode_only("MP3"),
    decode_only("MIDI"),
    decode_only("Ogg Vorbis"),
    decode_only("PCM/WAVE"),
];

static VIDEO_CODECS: [VideoCodec; 3] = [
    video("video/H263", &["3GPP", "MPEG-4"]),
    video("video/h264", &["3GPP", "MPEG-4"]),
    video("video/mp4", &["3GPP"]),
];

/// Returns the supported audio and video codecs.
pub fn codecs() -> AvCodecs {
    AvCodecs {
        audio_codecs: &AUDIO_CODECS,
        video_codecs: &VIDEO_CODECS,
    }
}

/// Storage unit kind, serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StorageType {
    Unknown = 0,
    HardDisk = 1,
    FloppyDisk = 2,
    Optical = 3,
    Flash = 4,
}

impl StorageType {
    /// Classifies a volume by its backing device and filesystem.
    pub fn of(volume: &Volume) -> Self {
        let device = volume
            .device
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let fs_type = volume.fs_type.to_lowercase();

        if device.starts_with("sr") || fs_type == "iso9660" || fs_type == "udf" {
            StorageType::Optical
        } else if device.starts_with("fd") {
            StorageType::FloppyDisk
        } else if device.starts_with("mmcblk") || (volume.removable && is_block_device(&volume.device)) {
            StorageType::Flash
        } else if is_block_device(&volume.device) {
            StorageType::HardDisk
        } else {
            StorageType::Unknown
        }
    }
}

impl Serialize for StorageType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

fn is_block_device(device: &str) -> bool {
    device.starts_with("/dev/")
}

/// One entry of the `storage` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUnit {
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    pub is_writable: bool,
    pub capacity: u64,
    pub available_capacity: u64,
    pub is_removeable: bool,
}

impl From<&Volume> for StorageUnit {
    fn from(volume: &Volume) -> Self {
        Self {
            storage_type: StorageType::of(volume),
            is_writable: !volume.read_only,
            capacity: volume.capacity,
            available_capacity: volume.available,
            is_removeable: volume.removable,
        }
    }
}
