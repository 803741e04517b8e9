//! Optional settings for job creation.
//!
//! [`JobOptions`] is the single place that decides which keys reach the
//! create payload: it is serialized once, and the `skip_serializing_if`
//! predicates drop everything the caller did not explicitly ask for.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::error::{ClientError, Result};

/// Highest accepted CRF value
pub const MAX_VIDEO_QUALITY: u8 = 51;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Mp4,
    Mkv,
    Webm,
    Mov,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    Copy,
    H264,
    H265,
    Vp9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Copy,
    Aac,
    Opus,
    Mp3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum AudioBitrate {
    #[serde(rename = "64k")]
    #[value(name = "64k")]
    K64,
    #[serde(rename = "128k")]
    #[value(name = "128k")]
    K128,
    #[serde(rename = "192k")]
    #[value(name = "192k")]
    K192,
    #[serde(rename = "256k")]
    #[value(name = "256k")]
    K256,
    #[serde(rename = "320k")]
    #[value(name = "320k")]
    K320,
}

/// Resolution cap; `Best` means "no cap" and is never sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum MaxResolution {
    #[default]
    #[serde(rename = "best")]
    #[value(name = "best")]
    Best,
    #[serde(rename = "2160")]
    #[value(name = "2160")]
    P2160,
    #[serde(rename = "1440")]
    #[value(name = "1440")]
    P1440,
    #[serde(rename = "1080")]
    #[value(name = "1080")]
    P1080,
    #[serde(rename = "720")]
    #[value(name = "720")]
    P720,
    #[serde(rename = "480")]
    #[value(name = "480")]
    P480,
    #[serde(rename = "360")]
    #[value(name = "360")]
    P360,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
}

/// Options shared by single and bulk job creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct JobOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<VideoCodec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<AudioCodec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate: Option<AudioBitrate>,
    /// CRF 0-51, lower is better; 0 is a real value and is sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_quality: Option<u8>,
    #[serde(skip_serializing_if = "is_unset_resolution")]
    pub max_resolution: Option<MaxResolution>,
    #[builder(into)]
    #[serde(skip_serializing_if = "is_empty")]
    pub filename: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "is_empty")]
    pub folder: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "is_empty")]
    pub webhook_url: Option<String>,
    #[builder(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub audio_only: bool,
    #[builder(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub download_subtitles: bool,
    #[builder(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub download_thumbnail: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_preset: Option<QualityPreset>,
    /// Clip start marker, e.g. "00:01:30"
    #[builder(into)]
    #[serde(skip_serializing_if = "is_empty")]
    pub clip_start: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "is_empty")]
    pub clip_end: Option<String>,
    #[builder(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub live_recording: bool,
    #[builder(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub live_from_start: bool,
    /// Seconds; 0 means unlimited and is not sent
    #[serde(skip_serializing_if = "is_unset_duration")]
    pub max_duration: Option<u32>,
    #[builder(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub wait_for_video: bool,
    #[builder(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub enable_progress_webhook: bool,
}

impl JobOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(quality) = self.video_quality {
            if quality > MAX_VIDEO_QUALITY {
                return Err(ClientError::Validation(format!(
                    "video_quality must be between 0 and {}, got {}",
                    MAX_VIDEO_QUALITY, quality
                )));
            }
        }
        Ok(())
    }
}

/// Only `None` and `""` are unset; any other text is the caller's choice
fn is_empty(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_unset_resolution(value: &Option<MaxResolution>) -> bool {
    matches!(value, None | Some(MaxResolution::Best))
}

fn is_unset_duration(value: &Option<u32>) -> bool {
    value.is_none_or(|secs| secs == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn keys(options: &JobOptions) -> Vec<String> {
        match serde_json::to_value(options).unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_default_options_serialize_empty() {
        assert_eq!(serde_json::to_value(JobOptions::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_set_fields_are_sent() {
        let options = JobOptions::builder()
            .format(Format::Mkv)
            .video_codec(VideoCodec::H265)
            .audio_codec(AudioCodec::Opus)
            .audio_bitrate(AudioBitrate::K192)
            .video_quality(23)
            .max_resolution(MaxResolution::P1080)
            .filename("episode-1")
            .folder("podcasts/2024")
            .webhook_url("https://hooks.example/tornado")
            .quality_preset(QualityPreset::High)
            .clip_start("00:00:10")
            .clip_end("00:01:00")
            .max_duration(3600)
            .build();

        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "format": "mkv",
                "video_codec": "h265",
                "audio_codec": "opus",
                "audio_bitrate": "192k",
                "video_quality": 23,
                "max_resolution": "1080",
                "filename": "episode-1",
                "folder": "podcasts/2024",
                "webhook_url": "https://hooks.example/tornado",
                "quality_preset": "high",
                "clip_start": "00:00:10",
                "clip_end": "00:01:00",
                "max_duration": 3600
            })
        );
    }

    #[test]
    fn test_flags_only_sent_when_true() {
        let options = JobOptions::builder()
            .audio_only(true)
            .download_subtitles(false)
            .download_thumbnail(true)
            .live_recording(false)
            .wait_for_video(true)
            .build();

        let mut sent = keys(&options);
        sent.sort();
        assert_eq!(sent, vec!["audio_only", "download_thumbnail", "wait_for_video"]);
    }

    #[test]
    fn test_sentinels_are_dropped() {
        let options = JobOptions::builder()
            .max_resolution(MaxResolution::Best)
            .max_duration(0)
            .filename("")
            .clip_end("")
            .build();

        assert!(keys(&options).is_empty());
    }

    #[test]
    fn test_whitespace_strings_are_sent() {
        let options = JobOptions::builder().folder("   ").filename(" take 2 ").build();
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"filename": " take 2 ", "folder": "   "})
        );
    }

    #[test]
    fn test_zero_quality_is_sent() {
        let options = JobOptions::builder().video_quality(0).build();
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({"video_quality": 0}));
    }

    #[test]
    fn test_quality_range_validated() {
        assert!(JobOptions::builder().video_quality(51).build().validate().is_ok());

        let err = JobOptions::builder().video_quality(52).build().validate().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: JobOptions =
            serde_json::from_value(json!({"format": "webm", "audio_only": true})).unwrap();

        assert_eq!(options.format, Some(Format::Webm));
        assert!(options.audio_only);
        assert!(options.filename.is_none());
    }
}
