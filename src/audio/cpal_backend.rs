use crate::audio::AudioBackend;
use crate::synth::engine::AudioEngine;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, Stream, StreamConfig, SupportedBufferSize};

/// Owns the cpal output stream. The engine moves into the callback closure
/// when the stream is built; after that the backend only starts and stops.
pub struct CpalBackend {
    engine: Option<AudioEngine>,
    stream: Option<Stream>,
    buffer_frames: usize,
    reported_failure: bool,
}

impl CpalBackend {
    pub fn new(engine: AudioEngine, buffer_frames: usize) -> Self {
        Self {
            engine: Some(engine),
            stream: None,
            buffer_frames,
            reported_failure: false,
        }
    }

    fn build_stream(&mut self) -> Result<Stream, Box<dyn std::error::Error>> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("no output device available")?;
        println!("Output device: {}", device.name().unwrap_or_default());

        let supported = device.default_output_config()?;
        if supported.sample_format() != SampleFormat::F32 {
            return Err("unsupported sample format".into());
        }

        let requested = self.buffer_frames as u32;
        let buffer_size = match supported.buffer_size() {
            SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&requested) => {
                BufferSize::Fixed(requested)
            }
            _ => {
                eprintln!("Fixed buffer size {requested} unsupported; using device default");
                BufferSize::Default
            }
        };

        let mut config: StreamConfig = supported.into();
        config.channels = 2;
        config.buffer_size = buffer_size;

        let mut engine = self.engine.take().ok_or("engine already consumed")?;
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                engine.process_block(data);
            },
            // Underflow/overflow is logged and playback continues.
            |err| eprintln!("Stream error: {err}"),
            None,
        )?;

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(err) = stream.play() {
                eprintln!("Failed to resume stream: {err}");
            }
            return;
        }
        match self.build_stream() {
            Ok(stream) => {
                if let Err(err) = stream.play() {
                    eprintln!("Failed to start stream: {err}");
                }
                self.stream = Some(stream);
            }
            Err(err) => {
                // Audio stays silent; the rest of the instrument keeps going.
                if !self.reported_failure {
                    eprintln!("Audio init failed: {err}");
                    self.reported_failure = true;
                }
            }
        }
    }

    fn stop(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(err) = stream.pause() {
                eprintln!("Failed to stop stream: {err}");
            }
        }
    }
}
