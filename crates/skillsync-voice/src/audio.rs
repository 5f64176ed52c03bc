//! Audio capture and playback adapters using CPAL and Rodio.
//!
//! Both devices are driven from dedicated threads so the ports handed to the
//! session are `Send`: CPAL streams and Rodio output streams must live on the
//! thread that created them. Echo cancellation and noise suppression are
//! whatever the platform input pipeline provides for the default device.

use crate::error::{VoiceError, VoiceResult};
use crate::pcm;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use rodio::buffer::SamplesBuffer;
use rodio::OutputStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Sample-format parameters for one interview session.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Microphone sample rate in Hz (wire input).
    pub input_sample_rate: u32,

    /// Agent speech sample rate in Hz (wire output).
    pub output_sample_rate: u32,

    /// Number of channels (mono).
    pub channels: u16,

    /// Capture frame size in samples.
    pub frame_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 24_000,
            output_sample_rate: 16_000,
            channels: 1,
            frame_size: 4096,
        }
    }
}

/// Running capture stream. `stop` releases the device; dropping does too.
pub trait CaptureHandle: Send + std::fmt::Debug {
    fn stop(&mut self);
}

/// Microphone acquisition seam. Frames are encoded 16-bit LE PCM and are
/// forwarded on `frame_tx` only while `live` is set.
pub trait CapturePort: Send {
    fn start(
        &mut self,
        config: &AudioConfig,
        frame_tx: mpsc::UnboundedSender<Vec<u8>>,
        live: Arc<AtomicBool>,
    ) -> VoiceResult<Box<dyn CaptureHandle>>;
}

/// Speech playback seam. Fire-and-forget: overlapping calls start independent
/// playback, nothing is queued.
pub trait PlaybackPort: Send + Sync {
    fn play(&self, pcm: &[u8], sample_rate: u32) -> VoiceResult<()>;
}

/// Microphone capture via CPAL on a dedicated thread.
#[derive(Debug, Default)]
pub struct MicCapture;

impl MicCapture {
    pub fn new() -> Self {
        Self
    }
}

impl CapturePort for MicCapture {
    fn start(
        &mut self,
        config: &AudioConfig,
        frame_tx: mpsc::UnboundedSender<Vec<u8>>,
        live: Arc<AtomicBool>,
    ) -> VoiceResult<Box<dyn CaptureHandle>> {
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<VoiceResult<()>>(1);
        let (stop_tx, stop_rx) = std::sync::mpsc::channel::<()>();
        let config = config.clone();

        let join = thread::Builder::new()
            .name("skillsync-mic".to_string())
            .spawn(move || {
                let stream = match build_input_stream(&config, frame_tx, live) {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // Hold the stream until stop is signalled or the handle drops.
                let _ = stop_rx.recv();
                drop(stream);
                info!("🎤 Microphone released");
            })
            .map_err(|e| VoiceError::AudioDevice(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(MicHandle {
                stop_tx: Some(stop_tx),
                join: Some(join),
            })),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(_) => Err(VoiceError::AudioDevice(
                "capture thread exited before reporting readiness".to_string(),
            )),
        }
    }
}

fn build_input_stream(
    config: &AudioConfig,
    frame_tx: mpsc::UnboundedSender<Vec<u8>>,
    live: Arc<AtomicBool>,
) -> VoiceResult<cpal::Stream> {
    let device = cpal::default_host()
        .default_input_device()
        .ok_or_else(|| VoiceError::PermissionDenied("no input device available".to_string()))?;
    info!(
        "🎤 Using input device: {} ({}Hz mono)",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        config.input_sample_rate
    );

    let stream_config = StreamConfig {
        channels: config.channels,
        sample_rate: SampleRate(config.input_sample_rate),
        buffer_size: BufferSize::Default,
    };

    let frame_size = config.frame_size;
    let mut sample_buffer: Vec<f32> = Vec::with_capacity(frame_size);
    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            for &sample in data {
                sample_buffer.push(sample);
                if sample_buffer.len() >= frame_size {
                    if live.load(Ordering::SeqCst) {
                        if frame_tx.send(pcm::encode_frame(&sample_buffer)).is_err() {
                            warn!("capture frame receiver dropped");
                        }
                    }
                    sample_buffer.clear();
                }
            }
        },
        move |err| {
            warn!("Audio input stream error: {}", err);
        },
        None,
    )?;
    stream.play()?;
    Ok(stream)
}

#[derive(Debug)]
struct MicHandle {
    stop_tx: Option<std::sync::mpsc::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl CaptureHandle for MicHandle {
    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for MicHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Speaker playback via Rodio on a dedicated thread.
pub struct SpeakerPlayback {
    cmd_tx: mpsc::UnboundedSender<(Vec<f32>, u32)>,
}

impl SpeakerPlayback {
    pub fn new() -> VoiceResult<Self> {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<(Vec<f32>, u32)>();
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<VoiceResult<()>>(1);

        thread::Builder::new()
            .name("skillsync-speaker".to_string())
            .spawn(move || {
                let (stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => {
                        let _ = ready_tx.send(Ok(()));
                        pair
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(VoiceError::Playback(e.to_string())));
                        return;
                    }
                };
                while let Some((samples, sample_rate)) = cmd_rx.blocking_recv() {
                    let source = SamplesBuffer::new(1, sample_rate, samples);
                    if let Err(e) = handle.play_raw(source) {
                        warn!("Audio playback failed: {}", e);
                    }
                }
                drop(stream);
                info!("🔊 Speaker released");
            })
            .map_err(|e| VoiceError::Playback(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { cmd_tx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(VoiceError::Playback(
                "playback thread exited before reporting readiness".to_string(),
            )),
        }
    }
}

impl PlaybackPort for SpeakerPlayback {
    fn play(&self, pcm_bytes: &[u8], sample_rate: u32) -> VoiceResult<()> {
        if pcm_bytes.is_empty() {
            return Ok(());
        }
        let samples = pcm::decode_frame(pcm_bytes);
        self.cmd_tx
            .send((samples, sample_rate))
            .map_err(|_| VoiceError::Playback("playback thread stopped".to_string()))
    }
}

/// Capture double: emits any preloaded frames immediately, acquires nothing.
#[derive(Default)]
pub struct NullCapture {
    frames: Vec<Vec<u8>>,
    stopped: Arc<AtomicBool>,
}

impl NullCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(frames: Vec<Vec<u8>>) -> Self {
        Self {
            frames,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set when the capture handle is stopped; for release assertions.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }
}

impl CapturePort for NullCapture {
    fn start(
        &mut self,
        _config: &AudioConfig,
        frame_tx: mpsc::UnboundedSender<Vec<u8>>,
        _live: Arc<AtomicBool>,
    ) -> VoiceResult<Box<dyn CaptureHandle>> {
        for frame in self.frames.drain(..) {
            let _ = frame_tx.send(frame);
        }
        Ok(Box::new(NullCaptureHandle {
            stopped: Arc::clone(&self.stopped),
        }))
    }
}

#[derive(Debug)]
struct NullCaptureHandle {
    stopped: Arc<AtomicBool>,
}

impl CaptureHandle for NullCaptureHandle {
    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Capture double that always fails like a denied microphone.
#[derive(Debug, Default)]
pub struct DeniedCapture;

impl CapturePort for DeniedCapture {
    fn start(
        &mut self,
        _config: &AudioConfig,
        _frame_tx: mpsc::UnboundedSender<Vec<u8>>,
        _live: Arc<AtomicBool>,
    ) -> VoiceResult<Box<dyn CaptureHandle>> {
        Err(VoiceError::PermissionDenied(
            "microphone access denied".to_string(),
        ))
    }
}

/// Playback double: records every buffer instead of rendering it.
#[derive(Default)]
pub struct SinkPlayback {
    played: Mutex<Vec<(Vec<u8>, u32)>>,
}

impl SinkPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<(Vec<u8>, u32)> {
        self.played.lock().expect("playback log lock").clone()
    }
}

impl PlaybackPort for SinkPlayback {
    fn play(&self, pcm_bytes: &[u8], sample_rate: u32) -> VoiceResult<()> {
        self.played
            .lock()
            .expect("playback log lock")
            .push((pcm_bytes.to_vec(), sample_rate));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_config_defaults() {
        let config = AudioConfig::default();
        assert_eq!(config.input_sample_rate, 24_000);
        assert_eq!(config.output_sample_rate, 16_000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.frame_size, 4096);
    }

    #[test]
    fn null_capture_emits_preloaded_frames_and_tracks_stop() {
        let mut capture = NullCapture::with_frames(vec![vec![1, 2], vec![3, 4]]);
        let stop_flag = capture.stop_flag();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = capture
            .start(
                &AudioConfig::default(),
                tx,
                Arc::new(AtomicBool::new(true)),
            )
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), vec![1, 2]);
        assert_eq!(rx.try_recv().unwrap(), vec![3, 4]);
        assert!(!stop_flag.load(Ordering::SeqCst));
        handle.stop();
        assert!(stop_flag.load(Ordering::SeqCst));
    }

    #[test]
    fn sink_playback_records_buffers() {
        let playback = SinkPlayback::new();
        playback.play(&[0, 1, 2, 3], 16_000).unwrap();
        let played = playback.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].1, 16_000);
    }

    #[test]
    fn denied_capture_reports_permission_denied() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = DeniedCapture
            .start(
                &AudioConfig::default(),
                tx,
                Arc::new(AtomicBool::new(false)),
            )
            .unwrap_err();
        assert!(matches!(err, VoiceError::PermissionDenied(_)));
    }
}
