//! Fire-and-forget playback of the synthesized cues. If the audio device or
//! context cannot be opened the failure is logged and every call becomes a
//! no-op; the game keeps running silently.

use cfg_if::cfg_if;

pub mod synth;

pub use synth::{OUTPUT_GAIN, SAMPLE_RATE};

/// The fixed cues the game plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Laser,
    Engine,
    Boost,
}

/// Identifies a looping cue so it can be stopped later. One-shot cues are
/// fire-and-forget and never produce a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(u32);

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        use std::collections::HashMap;
        use wasm_bindgen::JsValue;
        use web_sys::{AudioBuffer, AudioBufferSourceNode, AudioContext};

        /// Web Audio backend: cues are pre-rendered into `AudioBuffer`s and
        /// started as buffer source nodes through a shared gain.
        pub struct SoundManager {
            ctx: Option<AudioContext>,
            cues: HashMap<SoundCue, AudioBuffer>,
            looping: HashMap<SoundHandle, AudioBufferSourceNode>,
            next_id: u32,
        }

        impl SoundManager {
            pub fn new() -> Self {
                match Self::init() {
                    Ok(manager) => manager,
                    Err(err) => {
                        tracing::warn!("audio unavailable, running silent: {err:?}");
                        Self {
                            ctx: None,
                            cues: HashMap::new(),
                            looping: HashMap::new(),
                            next_id: 0,
                        }
                    }
                }
            }

            fn init() -> Result<Self, JsValue> {
                let ctx = AudioContext::new()?;
                let rate = ctx.sample_rate();

                let mut cues = HashMap::new();
                let rendered = [
                    (SoundCue::Laser, synth::laser_samples(rate as u32)),
                    (SoundCue::Engine, synth::engine_samples(rate as u32)),
                    (SoundCue::Boost, synth::boost_samples(rate as u32)),
                ];
                for (cue, mut samples) in rendered {
                    let buffer = ctx.create_buffer(1, samples.len() as u32, rate)?;
                    buffer.copy_to_channel(&mut samples, 0)?;
                    cues.insert(cue, buffer);
                }

                Ok(Self {
                    ctx: Some(ctx),
                    cues,
                    looping: HashMap::new(),
                    next_id: 0,
                })
            }

            pub fn play(&mut self, cue: SoundCue) {
                if let Err(err) = self.start(cue, false) {
                    tracing::warn!("sound playback failed: {err:?}");
                }
            }

            pub fn play_looping(&mut self, cue: SoundCue) -> Option<SoundHandle> {
                match self.start(cue, true) {
                    Ok(handle) => handle,
                    Err(err) => {
                        tracing::warn!("sound playback failed: {err:?}");
                        None
                    }
                }
            }

            pub fn stop(&mut self, handle: SoundHandle) {
                if let Some(source) = self.looping.remove(&handle) {
                    let _ = source.stop();
                }
            }

            fn start(&mut self, cue: SoundCue, looping: bool) -> Result<Option<SoundHandle>, JsValue> {
                let Some(ctx) = &self.ctx else { return Ok(None) };
                let Some(buffer) = self.cues.get(&cue) else { return Ok(None) };

                let source = ctx.create_buffer_source()?;
                source.set_buffer(Some(buffer));
                source.set_loop(looping);

                let gain = ctx.create_gain()?;
                gain.gain().set_value(OUTPUT_GAIN);
                source.connect_with_audio_node(&gain)?;
                gain.connect_with_audio_node(&ctx.destination())?;
                source.start()?;

                if looping {
                    let handle = SoundHandle(self.next_id);
                    self.next_id = self.next_id.wrapping_add(1);
                    self.looping.insert(handle, source);
                    Ok(Some(handle))
                } else {
                    Ok(None)
                }
            }
        }
    } else {
        use std::collections::HashMap;
        use rodio::buffer::SamplesBuffer;
        use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

        /// Rodio backend: one-shot cues play on detached sinks, looping cues
        /// keep their sink around so they can be stopped.
        pub struct SoundManager {
            // the stream must stay alive or playback dies with it
            _stream: Option<OutputStream>,
            handle: Option<OutputStreamHandle>,
            cues: HashMap<SoundCue, Vec<f32>>,
            looping: HashMap<SoundHandle, Sink>,
            next_id: u32,
        }

        impl SoundManager {
            pub fn new() -> Self {
                match OutputStream::try_default() {
                    Ok((stream, handle)) => {
                        let cues = HashMap::from([
                            (SoundCue::Laser, synth::laser_samples(SAMPLE_RATE)),
                            (SoundCue::Engine, synth::engine_samples(SAMPLE_RATE)),
                            (SoundCue::Boost, synth::boost_samples(SAMPLE_RATE)),
                        ]);
                        Self {
                            _stream: Some(stream),
                            handle: Some(handle),
                            cues,
                            looping: HashMap::new(),
                            next_id: 0,
                        }
                    }
                    Err(err) => {
                        tracing::warn!("audio unavailable, running silent: {err}");
                        Self {
                            _stream: None,
                            handle: None,
                            cues: HashMap::new(),
                            looping: HashMap::new(),
                            next_id: 0,
                        }
                    }
                }
            }

            pub fn play(&mut self, cue: SoundCue) {
                let Some(handle) = &self.handle else { return };
                let Some(samples) = self.cues.get(&cue) else { return };
                match Sink::try_new(handle) {
                    Ok(sink) => {
                        sink.set_volume(OUTPUT_GAIN);
                        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.clone()));
                        sink.detach();
                    }
                    Err(err) => tracing::warn!("sound playback failed: {err}"),
                }
            }

            pub fn play_looping(&mut self, cue: SoundCue) -> Option<SoundHandle> {
                let stream_handle = self.handle.as_ref()?;
                let samples = self.cues.get(&cue)?;
                let sink = match Sink::try_new(stream_handle) {
                    Ok(sink) => sink,
                    Err(err) => {
                        tracing::warn!("sound playback failed: {err}");
                        return None;
                    }
                };
                sink.set_volume(OUTPUT_GAIN);
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.clone()).repeat_infinite());

                let handle = SoundHandle(self.next_id);
                self.next_id = self.next_id.wrapping_add(1);
                self.looping.insert(handle, sink);
                Some(handle)
            }

            pub fn stop(&mut self, handle: SoundHandle) {
                if let Some(sink) = self.looping.remove(&handle) {
                    sink.stop();
                }
            }
        }
    }
}

impl Default for SoundManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn silent_manager_is_harmless() {
        // With or without an audio device this must never panic.
        let mut manager = SoundManager::new();
        manager.play(SoundCue::Laser);
        let handle = manager.play_looping(SoundCue::Engine);
        if let Some(handle) = handle {
            manager.stop(handle);
        }
        // stopping twice is a no-op
        if let Some(handle) = handle {
            manager.stop(handle);
        }
    }
}
