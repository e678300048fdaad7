//! Audio system using Web Audio API
//!
//! Background music is a procedural pad; cues are short oscillator blips.
//! Nothing is loaded from files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Block landed with an overhang
    Place,
    /// Block landed exactly on the one below
    Perfect,
    /// Block slid past the tower
    Miss,
}

/// Looping music voices and the gain they share
struct Music {
    voices: Vec<OscillatorNode>,
    gain: GainNode,
}

/// Minor-seventh pad, low to high (Hz)
const PAD_NOTES: [f32; 4] = [110.0, 130.81, 164.81, 196.0];

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music_volume: f32,
    sfx_volume: f32,
    music: Option<Music>,
    /// Consecutive perfect placements, raises the perfect cue's pitch
    streak: u32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            music_volume: settings.effective_music_volume(),
            sfx_volume: settings.effective_sfx_volume(),
            music: None,
            streak: 0,
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.music_volume = settings.effective_music_volume();
        self.sfx_volume = settings.effective_sfx_volume();
        if let (Some(ctx), Some(music)) = (&self.ctx, &self.music) {
            music
                .gain
                .gain()
                .set_value_at_time(self.music_volume, ctx.current_time())
                .ok();
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.is_some()
    }

    /// Browsers keep the context suspended until a user gesture
    fn resume(&self) -> Option<&AudioContext> {
        let ctx = self.ctx.as_ref()?;
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    /// Start the music loop if it is not already playing
    pub fn start_music(&mut self) {
        if self.music.is_some() {
            return;
        }
        let Some(ctx) = self.resume() else { return };
        let Ok(gain) = ctx.create_gain() else { return };
        if gain.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }
        let t = ctx.current_time();
        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(self.music_volume, t + 1.5)
            .ok();

        let mut voices = Vec::with_capacity(PAD_NOTES.len());
        for (i, freq) in PAD_NOTES.iter().enumerate() {
            let Ok(osc) = ctx.create_oscillator() else {
                continue;
            };
            osc.set_type(if i == 0 {
                OscillatorType::Triangle
            } else {
                OscillatorType::Sine
            });
            osc.frequency().set_value(*freq);
            // Slight detune so the pad beats slowly
            osc.detune().set_value(i as f32 * 3.0 - 4.0);
            if osc.connect_with_audio_node(&gain).is_err() {
                continue;
            }
            osc.start().ok();
            voices.push(osc);
        }

        log::debug!("Music started ({} voices)", voices.len());
        self.music = Some(Music { voices, gain });
    }

    pub fn stop_music(&mut self) {
        let Some(music) = self.music.take() else {
            return;
        };
        let Some(ctx) = &self.ctx else { return };
        let t = ctx.current_time();
        music.gain.gain().set_value_at_time(self.music_volume, t).ok();
        music.gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.3).ok();
        for voice in &music.voices {
            voice.stop_with_when(t + 0.35).ok();
        }
        log::debug!("Music stopped");
    }

    /// Play a sound cue
    pub fn play(&mut self, cue: Cue) {
        self.streak = match cue {
            Cue::Perfect => self.streak + 1,
            _ => 0,
        };

        let vol = self.sfx_volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = self.resume() else { return };

        match cue {
            Cue::Place => self.play_place(ctx, vol),
            Cue::Perfect => self.play_perfect(ctx, vol, self.streak),
            Cue::Miss => self.play_miss(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Place - wooden knock
    fn play_place(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(90.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Perfect - bright chime, one semitone higher per streak step
    fn play_perfect(&self, ctx: &AudioContext, vol: f32, streak: u32) {
        let step = streak.saturating_sub(1).min(12) as f32;
        let base = 523.25 * 2f32.powf(step / 12.0);
        for (i, ratio) in [1.0, 1.5].iter().enumerate() {
            let delay = i as f64 * 0.05;
            if let Some((osc, gain)) = self.create_osc(ctx, base * ratio, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }

    /// Miss - falling buzz
    fn play_miss(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.6)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(40.0, t + 0.6)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.7).ok();
    }
}
