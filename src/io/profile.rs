use std::fmt;
use std::str::FromStr;

use crate::foundation::error::BakeError;

/// Video codec profile for movie output.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Profile {
    /// Let the plugin choose (H.264 for FFmpeg).
    #[default]
    None,
    H264,
    #[serde(rename = "ProRes")]
    ProRes,
    #[serde(rename = "ProRes_Proxy")]
    ProResProxy,
    #[serde(rename = "ProRes_LT")]
    ProResLt,
    #[serde(rename = "ProRes_HQ")]
    ProResHq,
    #[serde(rename = "ProRes_4444")]
    ProRes4444,
    #[serde(rename = "ProRes_XQ")]
    ProResXq,
    #[serde(rename = "DNxHD")]
    DnxHd,
    #[serde(rename = "DNxHR_LB")]
    DnxHrLb,
    #[serde(rename = "DNxHR_SQ")]
    DnxHrSq,
    #[serde(rename = "DNxHR_HQ")]
    DnxHrHq,
    #[serde(rename = "DNxHR_HQX")]
    DnxHrHqx,
    #[serde(rename = "DNxHR_444")]
    DnxHr444,
    #[serde(rename = "VP9")]
    Vp9,
    Cineform,
    #[serde(rename = "AV1")]
    Av1,
    #[serde(rename = "HAP")]
    Hap,
}

impl Profile {
    /// Every profile, in menu order.
    pub const ALL: [Profile; 18] = [
        Self::None,
        Self::H264,
        Self::ProRes,
        Self::ProResProxy,
        Self::ProResLt,
        Self::ProResHq,
        Self::ProRes4444,
        Self::ProResXq,
        Self::DnxHd,
        Self::DnxHrLb,
        Self::DnxHrSq,
        Self::DnxHrHq,
        Self::DnxHrHqx,
        Self::DnxHr444,
        Self::Vp9,
        Self::Cineform,
        Self::Av1,
        Self::Hap,
    ];

    /// Option label, as stored under `FFmpeg/WriteProfile`.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::H264 => "H264",
            Self::ProRes => "ProRes",
            Self::ProResProxy => "ProRes_Proxy",
            Self::ProResLt => "ProRes_LT",
            Self::ProResHq => "ProRes_HQ",
            Self::ProRes4444 => "ProRes_4444",
            Self::ProResXq => "ProRes_XQ",
            Self::DnxHd => "DNxHD",
            Self::DnxHrLb => "DNxHR_LB",
            Self::DnxHrSq => "DNxHR_SQ",
            Self::DnxHrHq => "DNxHR_HQ",
            Self::DnxHrHqx => "DNxHR_HQX",
            Self::DnxHr444 => "DNxHR_444",
            Self::Vp9 => "VP9",
            Self::Cineform => "Cineform",
            Self::Av1 => "AV1",
            Self::Hap => "HAP",
        }
    }

    /// `true` for the ProRes family.
    pub fn is_prores(self) -> bool {
        self.label().starts_with("ProRes")
    }

    /// Extension the container must have for this profile, given the requested one.
    ///
    /// Returns `None` when `extension` (lowercase, with dot) is already acceptable.
    pub fn corrected_extension(self, extension: &str) -> Option<&'static str> {
        let ext = extension.to_ascii_lowercase();
        match self {
            p if p.is_prores() && ext != ".mov" => Some(".mov"),
            Self::Vp9 if !matches!(ext.as_str(), ".mp4" | ".webm" | ".mkv") => Some(".mp4"),
            Self::Av1 if !matches!(ext.as_str(), ".mp4" | ".mkv") => Some(".mp4"),
            Self::Cineform if ext != ".mkv" => Some(".mkv"),
            Self::Hap if ext != ".mov" => Some(".mov"),
            _ => None,
        }
    }

    /// Human-readable reason logged when [`Profile::corrected_extension`] applies.
    pub fn extension_hint(self) -> &'static str {
        match self {
            p if p.is_prores() => "ProRes profiles need a .mov movie extension",
            Self::Vp9 => "VP9 profile needs a .mp4, .mkv or .webm movie extension",
            Self::Av1 => "AV1 profile needs a .mp4 or .mkv movie extension",
            Self::Cineform => "GoPro Cineform profile needs a .mkv movie extension",
            Self::Hap => "HAP profile needs a .mov extension",
            _ => "",
        }
    }

    /// `ffmpeg` encoder arguments for this profile.
    pub fn codec_args(self, hardware: bool) -> Vec<String> {
        let args: &[&str] = match self {
            Self::None | Self::H264 if hardware => {
                if cfg!(target_os = "macos") {
                    &["-c:v", "h264_videotoolbox"]
                } else {
                    &["-c:v", "h264_nvenc"]
                }
            }
            Self::None | Self::H264 => &["-c:v", "libx264", "-profile:v", "high"],
            Self::ProRes => &["-c:v", "prores_ks", "-profile:v", "standard"],
            Self::ProResProxy => &["-c:v", "prores_ks", "-profile:v", "proxy"],
            Self::ProResLt => &["-c:v", "prores_ks", "-profile:v", "lt"],
            Self::ProResHq => &["-c:v", "prores_ks", "-profile:v", "hq"],
            Self::ProRes4444 => &["-c:v", "prores_ks", "-profile:v", "4444"],
            Self::ProResXq => &["-c:v", "prores_ks", "-profile:v", "4444xq"],
            Self::DnxHd => &["-c:v", "dnxhd", "-b:v", "44M"],
            Self::DnxHrLb => &["-c:v", "dnxhd", "-profile:v", "dnxhr_lb"],
            Self::DnxHrSq => &["-c:v", "dnxhd", "-profile:v", "dnxhr_sq"],
            Self::DnxHrHq => &["-c:v", "dnxhd", "-profile:v", "dnxhr_hq"],
            Self::DnxHrHqx => &["-c:v", "dnxhd", "-profile:v", "dnxhr_hqx"],
            Self::DnxHr444 => &["-c:v", "dnxhd", "-profile:v", "dnxhr_444"],
            Self::Vp9 => &["-c:v", "libvpx-vp9"],
            Self::Cineform => &["-c:v", "cfhd"],
            Self::Av1 => &["-c:v", "libaom-av1"],
            Self::Hap => &["-c:v", "hap"],
        };
        args.iter().map(|s| (*s).to_owned()).collect()
    }

    /// Output pixel format used when none is requested explicitly.
    pub fn default_pix_fmt(self, has_alpha: bool) -> &'static str {
        match self {
            Self::ProRes4444 | Self::ProResXq if has_alpha => "yuva444p10le",
            Self::ProRes4444 | Self::ProResXq => "yuv444p10le",
            p if p.is_prores() => "yuv422p10le",
            Self::DnxHd | Self::DnxHrLb | Self::DnxHrSq | Self::DnxHrHq => "yuv422p",
            Self::DnxHrHqx => "yuv422p10le",
            Self::DnxHr444 => "yuv444p10le",
            Self::Cineform => "yuv422p10le",
            Self::Hap => "rgba",
            _ => "yuv420p",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Profile {
    type Err = BakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| BakeError::validation(format!("unknown codec profile '{s}'")))
    }
}

/// Audio codec for movie and audio output.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AudioCodec {
    /// No audio stream.
    None,
    #[default]
    #[serde(rename = "AAC")]
    Aac,
    #[serde(rename = "AC3")]
    Ac3,
    #[serde(rename = "True_HD")]
    TrueHd,
    #[serde(rename = "MP2")]
    Mp2,
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "OPUS")]
    Opus,
    #[serde(rename = "VORBIS")]
    Vorbis,
    #[serde(rename = "PCM_S16LE")]
    PcmS16le,
}

impl AudioCodec {
    /// Every codec, in menu order.
    pub const ALL: [AudioCodec; 9] = [
        Self::None,
        Self::Aac,
        Self::Ac3,
        Self::TrueHd,
        Self::Mp2,
        Self::Mp3,
        Self::Opus,
        Self::Vorbis,
        Self::PcmS16le,
    ];

    /// Option label, as stored under `FFmpeg/AudioCodec`.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Aac => "AAC",
            Self::Ac3 => "AC3",
            Self::TrueHd => "True_HD",
            Self::Mp2 => "MP2",
            Self::Mp3 => "MP3",
            Self::Opus => "OPUS",
            Self::Vorbis => "VORBIS",
            Self::PcmS16le => "PCM_S16LE",
        }
    }

    /// `ffmpeg` encoder name, `None` for [`AudioCodec::None`].
    pub fn encoder(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Aac => Some("aac"),
            Self::Ac3 => Some("ac3"),
            Self::TrueHd => Some("truehd"),
            Self::Mp2 => Some("mp2"),
            Self::Mp3 => Some("libmp3lame"),
            Self::Opus => Some("libopus"),
            Self::Vorbis => Some("libvorbis"),
            Self::PcmS16le => Some("pcm_s16le"),
        }
    }

    /// Codec actually usable in a container with `extension`.
    ///
    /// `.wav` only takes PCM, MP3 or AAC and `.aiff` only PCM; anything else is swapped.
    pub fn for_container(self, extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            ".wav" if !matches!(self, Self::PcmS16le | Self::Mp3 | Self::Aac) => Self::Aac,
            ".aiff" if self != Self::PcmS16le => Self::PcmS16le,
            _ => self,
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AudioCodec {
    type Err = BakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| BakeError::validation(format!("unknown audio codec '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/profile.rs"]
mod tests;
