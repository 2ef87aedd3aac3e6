//! Stream Concatenator - 同格式音频拼接
//!
//! - MP3 / OGG / Opus: 帧流按字节首尾相接
//! - WAV: 解析 RIFF 头，校验 fmt 一致后合并 data chunk 并重写单一头部

use crate::application::ports::{AudioConcatenatorPort, ConcatError};
use crate::domain::voice::AudioFormat;

/// WAV fmt chunk 中拼接需要一致的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// 16-bit 单声道 PCM
    pub fn pcm_mono(sample_rate: u32) -> Self {
        Self {
            audio_format: 1,
            num_channels: 1,
            sample_rate,
            bits_per_sample: 16,
        }
    }

    fn block_align(&self) -> u16 {
        self.num_channels * (self.bits_per_sample / 8)
    }

    fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

#[derive(Debug)]
struct WavClip<'a> {
    format: WavFormat,
    samples: &'a [u8],
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StreamConcatenator;

impl StreamConcatenator {
    pub fn new() -> Self {
        Self
    }

    fn concat_wav(&self, clips: &[&[u8]]) -> Result<Vec<u8>, ConcatError> {
        let parsed = clips
            .iter()
            .map(|clip| parse_wav(clip))
            .collect::<Result<Vec<_>, _>>()?;

        let format = parsed[0].format;
        if let Some(other) = parsed.iter().find(|clip| clip.format != format) {
            return Err(ConcatError::Incompatible(format!(
                "{:?} vs {:?}",
                format, other.format
            )));
        }

        let mut samples = Vec::with_capacity(parsed.iter().map(|c| c.samples.len()).sum());
        for clip in &parsed {
            samples.extend_from_slice(clip.samples);
        }
        Ok(encode_wav(format, &samples))
    }
}

impl AudioConcatenatorPort for StreamConcatenator {
    fn concat(&self, format: AudioFormat, clips: &[&[u8]]) -> Result<Vec<u8>, ConcatError> {
        if clips.is_empty() {
            return Err(ConcatError::Empty);
        }

        let output = match format {
            AudioFormat::Wav => self.concat_wav(clips)?,
            AudioFormat::Mp3 | AudioFormat::Ogg | AudioFormat::Opus => clips.concat(),
        };

        tracing::debug!(
            format = %format,
            clips = clips.len(),
            size = output.len(),
            "Audio clips concatenated"
        );
        Ok(output)
    }
}

/// 解析 WAV 文件头，返回格式与 PCM 数据
fn parse_wav(data: &[u8]) -> Result<WavClip<'_>, ConcatError> {
    if data.len() < 44 {
        return Err(ConcatError::InvalidInput("WAV data too short".to_string()));
    }
    if &data[0..4] != b"RIFF" {
        return Err(ConcatError::InvalidInput(
            "Invalid WAV: missing RIFF header".to_string(),
        ));
    }
    if &data[8..12] != b"WAVE" {
        return Err(ConcatError::InvalidInput(
            "Invalid WAV: missing WAVE identifier".to_string(),
        ));
    }

    let mut pos = 12;
    let mut format: Option<WavFormat> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size =
            u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                as usize;
        let body_start = pos + 8;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || body_start + 16 > data.len() {
                    return Err(ConcatError::InvalidInput(
                        "Invalid fmt chunk size".to_string(),
                    ));
                }
                let fmt = &data[body_start..body_start + 16];
                format = Some(WavFormat {
                    audio_format: u16::from_le_bytes([fmt[0], fmt[1]]),
                    num_channels: u16::from_le_bytes([fmt[2], fmt[3]]),
                    sample_rate: u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]),
                    bits_per_sample: u16::from_le_bytes([fmt[14], fmt[15]]),
                });
            }
            b"data" => {
                let format = format.ok_or_else(|| {
                    ConcatError::InvalidInput("Invalid WAV: missing fmt chunk".to_string())
                })?;
                // 流式写出的文件 data 长度可能不准确，以实际长度为上限
                let end = (body_start + chunk_size).min(data.len());
                return Ok(WavClip {
                    format,
                    samples: &data[body_start..end],
                });
            }
            _ => {}
        }

        pos = body_start + chunk_size + (chunk_size % 2);
    }

    Err(ConcatError::InvalidInput(
        "Invalid WAV: missing data chunk".to_string(),
    ))
}

/// 生成带 44 字节头部的 WAV 文件
pub fn encode_wav(format: WavFormat, samples: &[u8]) -> Vec<u8> {
    let data_size = samples.len() as u32;
    let mut wav = Vec::with_capacity(44 + samples.len());

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&format.audio_format.to_le_bytes());
    wav.extend_from_slice(&format.num_channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&format.block_align().to_le_bytes());
    wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(samples);

    wav
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_streams_are_chained() {
        let concat = StreamConcatenator::new();
        let out = concat
            .concat(AudioFormat::Mp3, &[b"ID3a".as_slice(), b"ID3b".as_slice()])
            .unwrap();
        assert_eq!(out, b"ID3aID3b");
    }

    #[test]
    fn test_empty_input_is_error() {
        let concat = StreamConcatenator::new();
        assert!(matches!(
            concat.concat(AudioFormat::Ogg, &[]),
            Err(ConcatError::Empty)
        ));
    }

    #[test]
    fn test_wav_clips_merge_into_single_header() {
        let format = WavFormat::pcm_mono(16000);
        let a = encode_wav(format, &[1, 0, 2, 0]);
        let b = encode_wav(format, &[3, 0]);

        let out = StreamConcatenator::new()
            .concat(AudioFormat::Wav, &[a.as_slice(), b.as_slice()])
            .unwrap();

        assert_eq!(out.len(), 44 + 6);
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([out[4], out[5], out[6], out[7]]), 36 + 6);
        assert_eq!(u32::from_le_bytes([out[40], out[41], out[42], out[43]]), 6);
        assert_eq!(&out[44..], &[1, 0, 2, 0, 3, 0]);

        let parsed = parse_wav(&out).unwrap();
        assert_eq!(parsed.format, format);
    }

    #[test]
    fn test_wav_format_mismatch_is_rejected() {
        let a = encode_wav(WavFormat::pcm_mono(16000), &[0, 0]);
        let b = encode_wav(WavFormat::pcm_mono(22050), &[0, 0]);
        assert!(matches!(
            StreamConcatenator::new().concat(AudioFormat::Wav, &[a.as_slice(), b.as_slice()]),
            Err(ConcatError::Incompatible(_))
        ));
    }

    #[test]
    fn test_invalid_wav() {
        assert!(parse_wav(b"not a wav").is_err());
        let mut bad = encode_wav(WavFormat::pcm_mono(8000), &[0, 0]);
        bad[0..4].copy_from_slice(b"RIFX");
        assert!(parse_wav(&bad).is_err());
    }
}
