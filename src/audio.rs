//! Sound sink for simulation sound requests
//!
//! Every sound is a single oscillator with a short exponential fade; on web
//! it goes through the Web Audio API, elsewhere it is silently dropped.
//! Audio failures never reach the game.

use crate::sim::SoundRequest;
#[cfg(target_arch = "wasm32")]
use crate::sim::Waveform;

/// Starting gain of every sound before volume scaling
pub const PEAK_GAIN: f32 = 0.1;
/// Gain the envelope decays to
pub const FLOOR_GAIN: f32 = 0.01;

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<web_sys::AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = web_sys::AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Apply volume and mute preferences
    pub fn configure(&mut self, settings: &crate::Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Volume multiplier applied to [`PEAK_GAIN`]
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play one sound request
    #[cfg(target_arch = "wasm32")]
    pub fn play(&self, sound: &SoundRequest) {
        use web_sys::{AudioContextState, OscillatorType};

        let vol = self.effective_volume();
        if vol <= 0.0 || sound.duration <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let kind = match sound.waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        };

        let played = (|| -> Option<()> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(kind);
            osc.frequency().set_value(sound.frequency);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let t = ctx.current_time();
            let end = t + sound.duration as f64;
            gain.gain().set_value_at_time(PEAK_GAIN * vol, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(FLOOR_GAIN * vol, end)
                .ok()?;
            osc.start_with_when(t).ok()?;
            osc.stop_with_when(end).ok()
        })();
        if played.is_none() {
            log::debug!("Dropped sound at {} Hz", sound.frequency);
        }
    }

    /// Native builds have no audio backend
    #[cfg(not(target_arch = "wasm32"))]
    pub fn play(&self, sound: &SoundRequest) {
        if self.effective_volume() > 0.0 {
            log::trace!(
                "sound {:?} {} Hz for {} s",
                sound.waveform,
                sound.frequency,
                sound.duration
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::sounds;

    #[test]
    fn test_volume_controls() {
        let mut audio = AudioManager::new();
        assert!((audio.effective_volume() - 0.8).abs() < 1e-6);
        audio.set_sfx_volume(0.5);
        audio.set_master_volume(3.0);
        assert!((audio.effective_volume() - 0.5).abs() < 1e-6);
        audio.set_muted(true);
        assert_eq!(audio.effective_volume(), 0.0);
        // Playing while muted is a no-op, never a failure
        audio.play(&sounds::BOMB);
    }

    #[test]
    fn test_configure_from_settings() {
        let mut audio = AudioManager::new();
        audio.configure(&crate::Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Default::default()
        });
        assert!((audio.effective_volume() - 0.25).abs() < 1e-6);
    }
}
