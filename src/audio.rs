//! Procedural "pop" sound: synthesised once, WAV-encoded in memory, and played
//! through a small round-robin pool of audio elements so overlapping pops don't
//! cut each other off.

use js_sys::{Array, Uint8Array};
use rand::Rng;
use std::f64::consts::TAU;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, Blob, BlobPropertyBag, HtmlAudioElement, Url};

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::error::{GameError, js_to_string};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct Tone {
    pub freq_hz: f64,
    pub gain: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct SoundTuning {
    pub duration_s: f64,
    /// Exponential envelope rate: amplitude = e^(-decay * t).
    pub decay: f64,
    pub tones: Vec<Tone>,
    /// Gain of the uniform [0, 1) noise component.
    pub noise: f64,
    pub volume: f64,
    pub voices: usize,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            freq_hz: 440.0,
            gain: 0.0,
        }
    }
}

impl Default for SoundTuning {
    fn default() -> Self {
        Self {
            duration_s: 0.08,
            decay: 60.0,
            tones: vec![
                Tone {
                    freq_hz: 400.0,
                    gain: 0.5,
                },
                Tone {
                    freq_hz: 800.0,
                    gain: 0.3,
                },
            ],
            noise: 0.2,
            volume: 0.4,
            voices: 10,
        }
    }
}

/// Mono samples in roughly [-1, 1] for one pop.
pub fn synthesize_pop<R: Rng + ?Sized>(
    sample_rate: u32,
    tuning: &SoundTuning,
    rng: &mut R,
) -> Vec<f32> {
    let n = (sample_rate as f64 * tuning.duration_s).floor() as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let envelope = (-t * tuning.decay).exp();
            let tonal: f64 = tuning
                .tones
                .iter()
                .map(|tone| tone.gain * (TAU * tone.freq_hz * t).sin())
                .sum();
            let noise = tuning.noise * rng.gen_range(0.0..1.0);
            (envelope * (tonal + noise)) as f32
        })
        .collect()
}

const WAV_HEADER_LEN: usize = 44;

/// 16-bit PCM mono RIFF/WAVE.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = (samples.len() * block_align as usize) as u32;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(WAV_HEADER_LEN as u32 - 8 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for &s in samples {
        out.extend_from_slice(&pcm16(s).to_le_bytes());
    }
    out
}

/// Asymmetric scaling so both -1.0 and 1.0 land exactly on the i16 limits.
fn pcm16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Fixed set of voices handed out round-robin.
pub struct VoicePool<T> {
    voices: Vec<T>,
    cursor: usize,
}

impl<T> VoicePool<T> {
    pub fn new(voices: Vec<T>) -> Self {
        Self { voices, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn next_voice(&mut self) -> Option<&T> {
        if self.voices.is_empty() {
            return None;
        }
        let idx = self.cursor;
        self.cursor = (self.cursor + 1) % self.voices.len();
        self.voices.get(idx)
    }
}

pub struct PopSound {
    pool: VoicePool<HtmlAudioElement>,
    url: String,
    // Swallows autoplay-policy rejections from `play()`.
    on_reject: Closure<dyn FnMut(JsValue)>,
}

impl PopSound {
    /// Build the clip and voice pool. Any failure here means "no sound".
    pub fn init<R: Rng + ?Sized>(tuning: &SoundTuning, rng: &mut R) -> Result<Self, GameError> {
        let ctx = AudioContext::new().map_err(audio_err)?;
        let sample_rate = ctx.sample_rate() as u32;
        // Only needed for the device sample rate.
        let _ = ctx.close();

        let samples = synthesize_pop(sample_rate, tuning, rng);
        let url = wav_object_url(&encode_wav(&samples, sample_rate))?;

        let mut voices = Vec::with_capacity(tuning.voices.max(1));
        for _ in 0..tuning.voices.max(1) {
            let voice = HtmlAudioElement::new_with_src(&url).map_err(audio_err)?;
            voice.set_volume(tuning.volume.clamp(0.0, 1.0));
            voice.set_preload("auto");
            voices.push(voice);
        }
        log::info!(
            "pop sound ready: {} samples @ {} Hz, {} voices",
            samples.len(),
            sample_rate,
            voices.len()
        );

        Ok(Self {
            pool: VoicePool::new(voices),
            url,
            on_reject: Closure::wrap(Box::new(|_err: JsValue| {}) as Box<dyn FnMut(JsValue)>),
        })
    }

    /// Fire and forget.
    pub fn play(&mut self) {
        let Some(voice) = self.pool.next_voice() else {
            return;
        };
        voice.set_current_time(0.0);
        if let Ok(promise) = voice.play() {
            let _ = promise.catch(&self.on_reject);
        }
    }
}

impl Drop for PopSound {
    fn drop(&mut self) {
        let _ = Url::revoke_object_url(&self.url);
    }
}

fn audio_err(value: JsValue) -> GameError {
    GameError::Audio(js_to_string(&value))
}

fn wav_object_url(bytes: &[u8]) -> Result<String, GameError> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes).into());
    let options = BlobPropertyBag::new();
    options.set_type("audio/wav");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(audio_err)?;
    Url::create_object_url_with_blob(&blob).map_err(audio_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn u16_at(b: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([b[at], b[at + 1]])
    }

    fn u32_at(b: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
    }

    #[test]
    fn pop_length_and_envelope() {
        let mut rng = StdRng::seed_from_u64(9);
        let samples = synthesize_pop(44_100, &SoundTuning::default(), &mut rng);
        assert_eq!(samples.len(), 3528);
        // Peak amplitude bounded by sum of gains (0.5 + 0.3 + 0.2).
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
        let head: f32 = samples[..200].iter().map(|s| s.abs()).sum();
        let tail: f32 = samples[samples.len() - 200..].iter().map(|s| s.abs()).sum();
        assert!(tail < head * 0.05, "head {} tail {}", head, tail);
    }

    #[test]
    fn silent_tuning_yields_silence() {
        let tuning = SoundTuning {
            tones: Vec::new(),
            noise: 0.0,
            ..SoundTuning::default()
        };
        let samples = synthesize_pop(8_000, &tuning, &mut StdRng::seed_from_u64(0));
        assert_eq!(samples.len(), 640);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn wav_header_layout() {
        let wav = encode_wav(&[0.0, 0.5, -0.5], 48_000);
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 42);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 48_000);
        assert_eq!(u32_at(&wav, 28), 96_000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 6);
    }

    #[test]
    fn pcm_conversion_clamps_and_scales() {
        assert_eq!(pcm16(0.0), 0);
        assert_eq!(pcm16(1.0), i16::MAX);
        assert_eq!(pcm16(-1.0), i16::MIN);
        assert_eq!(pcm16(3.0), i16::MAX);
        assert_eq!(pcm16(-3.0), i16::MIN);
        assert_eq!(pcm16(0.5), 16383);
        assert_eq!(pcm16(-0.5), -16384);
    }

    #[test]
    fn voice_pool_round_robin() {
        let mut pool = VoicePool::new(vec!['a', 'b', 'c']);
        let order: Vec<char> = (0..7).filter_map(|_| pool.next_voice().copied()).collect();
        assert_eq!(order, vec!['a', 'b', 'c', 'a', 'b', 'c', 'a']);
        assert_eq!(pool.len(), 3);

        let mut empty: VoicePool<char> = VoicePool::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.next_voice(), None);
    }
}
