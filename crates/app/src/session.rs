//! Pipeline Orchestrator: owns the stage queues, task lifecycles, stop
//! signaling, and the transcript log.
//!
//! Stage graph: Capture -> Segmenter -> Transcriber -> Assembler -> Glossary
//! -> Translator -> Assembler -> Synthesizer -> Sink. Capture and Sink block
//! on device I/O and run on dedicated threads (Capture: a raw OS thread, per
//! [`voxrelay_audio::AudioCaptureThread`]; Sink: tokio's blocking-thread
//! pool via `spawn_blocking`, since `AudioSink::play` polls for completion).
//! Every other stage is a cooperative tokio task. Start order follows §4.6:
//! build consumers before producers so no frame is produced before someone
//! can read it; stop joins tasks in the reverse order.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use voxrelay_assembler::TextBuffer;
use voxrelay_audio::{
    AudioCaptureThread, AudioChunker, AudioRingBuffer, AudioSink, ChunkerConfig, DeviceManager,
    FrameReader, ResamplerQuality, SharedAudioFrame,
};
use voxrelay_foundation::{AudioConfig, HealthMonitor, HealthStatus, ShutdownHandle, VoxRelayError};
use voxrelay_stt::StreamingStt;
use voxrelay_telemetry::{PipelineMetrics, PipelineStage, TtsMetrics};
use voxrelay_translate::{Glossary, Translator};
use voxrelay_tts::TtsEngine;
use voxrelay_vad::{EnergyThresholdConfig, Segmenter, UnifiedVadConfig, VadMode, Utterance};

use crate::pcm::bytes_to_pcm16;
use crate::settings::Cli;
use crate::transcript_log::TranscriptLog;
use crate::{stt_factory, translator_factory, tts_factory};

const CHUNK_SAMPLES: usize = 1024;
const STAGE_QUEUE_DEPTH: usize = 8;

struct SourceLine {
    utterance_id: u64,
    text: String,
}

struct TargetLine {
    utterance_id: u64,
    text: String,
}

struct AudioOut {
    utterance_id: u64,
    pcm: Vec<i16>,
    rate: u32,
    channels: u16,
}

/// Owns every stage task and the shared shutdown/metrics/log handles. The
/// Session is the sole owner of the stage queues (§3 ownership rule).
pub struct Session {
    shutdown: ShutdownHandle,
    pub metrics: Arc<PipelineMetrics>,
    pub transcript_log: Arc<TranscriptLog>,
    pub health: HealthMonitor,
    capture: AudioCaptureThread,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    pub async fn start(cli: &Cli, transcript_log: Arc<TranscriptLog>) -> Result<Self, VoxRelayError> {
        let shutdown = ShutdownHandle::new();
        let metrics = Arc::new(PipelineMetrics::default());
        let health = HealthMonitor::new();

        let glossary = match &cli.dictionary {
            Some(path) => Glossary::load(path).map_err(VoxRelayError::Config)?,
            None => Glossary::empty(),
        };

        let translator = translator_factory::build_translator(cli)?;
        let tts_engine = if cli.tts {
            Some(tts_factory::build_tts_engine(cli).await?)
        } else {
            None
        };
        let transcriber = stt_factory::build_transcriber(cli).await?;

        let sink_metrics = Arc::new(TtsMetrics::new());
        let audio_sink = Arc::new(
            AudioSink::new(cli.output_device.clone(), sink_metrics).with_health(health.clone()),
        );

        // Stage queues, built consumer-first (§4.6 start order).
        let (sink_tx, sink_rx) = mpsc::channel::<AudioOut>(STAGE_QUEUE_DEPTH);
        let (synth_tx, synth_rx) = mpsc::channel::<TargetLine>(STAGE_QUEUE_DEPTH);
        let (translate_tx, translate_rx) = mpsc::channel::<SourceLine>(STAGE_QUEUE_DEPTH);
        let (utterance_tx, utterance_rx) = mpsc::channel::<Utterance>(STAGE_QUEUE_DEPTH);
        let (frame_tx, _) = broadcast::channel::<SharedAudioFrame>(32);

        let mut tasks = Vec::new();

        if let Some(engine) = tts_engine {
            tasks.push(spawn_sink_stage(sink_rx, audio_sink, shutdown.clone(), metrics.clone()));
            tasks.push(spawn_synth_stage(
                synth_rx,
                sink_tx,
                engine,
                cli.voice.clone(),
                shutdown.clone(),
                metrics.clone(),
                health.clone(),
            ));
        } else {
            // TTS disabled: drain target lines without synthesizing so the
            // translator stage never blocks on a full queue.
            tasks.push(spawn_drain_stage(synth_rx));
        }

        tasks.push(spawn_translate_stage(
            translate_rx,
            synth_tx,
            translator,
            glossary,
            transcript_log.clone(),
            cli.input_language.clone(),
            cli.target_language.clone(),
            cli.topic.clone(),
            cli.history,
            cli.temperature,
            shutdown.clone(),
            metrics.clone(),
            health.clone(),
        ));

        tasks.push(spawn_transcribe_stage(
            utterance_rx,
            translate_tx,
            transcriber,
            shutdown.clone(),
            metrics.clone(),
            health.clone(),
        ));

        tasks.push(spawn_segment_stage(
            frame_tx.subscribe(),
            utterance_tx,
            cli,
            shutdown.clone(),
            metrics.clone(),
        ));

        // Capture last: no frames are produced before every consumer exists.
        let audio_config = AudioConfig::default();
        let ring = AudioRingBuffer::new(audio_config.capture_buffer_samples);
        let (producer, consumer) = ring.split();
        let (capture, device_cfg, device_cfg_rx) =
            AudioCaptureThread::spawn(audio_config, producer, cli.input_device.clone())
                .map_err(VoxRelayError::Audio)?;

        let frame_reader = FrameReader::new(
            consumer,
            device_cfg.sample_rate,
            device_cfg.channels,
            CHUNK_SAMPLES * 4,
            Some(metrics.clone()),
        );
        let chunker = AudioChunker::new(
            frame_reader,
            frame_tx,
            ChunkerConfig {
                frame_size_samples: voxrelay_vad::FRAME_SIZE_SAMPLES,
                sample_rate_hz: voxrelay_vad::SAMPLE_RATE_HZ,
                resampler_quality: ResamplerQuality::Balanced,
            },
        )
        .with_metrics(metrics.clone())
        .with_device_config(device_cfg_rx);
        tasks.push(chunker.spawn());

        Ok(Self {
            shutdown,
            metrics,
            transcript_log,
            health,
            capture,
            tasks,
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal stop and join every stage in reverse dependency order. After
    /// this returns, no stage holds a device handle or a live connection.
    pub async fn stop(self) {
        self.shutdown.signal();
        self.capture.stop();
        for task in self.tasks.into_iter().rev() {
            let _ = task.await;
        }
    }
}

pub fn list_input_devices() -> Result<(), VoxRelayError> {
    let dm = DeviceManager::new().map_err(VoxRelayError::Audio)?;
    println!("Input devices (host: {:?}):", dm.host_id());
    for d in dm.enumerate_devices() {
        let def = if d.is_default { " (default)" } else { "" };
        println!("- {}{}", d.name, def);
    }
    Ok(())
}

/// Segmenter stage: folds the chunker's frame broadcast into discrete
/// Utterances. Drops buffered silence frames rather than blocking when the
/// downstream transcriber queue is saturated (§4.6 backpressure policy);
/// speech frames already belong to a buffered-but-not-yet-finalized
/// Utterance, so there is nothing to drop there short of the utterance
/// itself.
fn spawn_segment_stage(
    mut frames: broadcast::Receiver<SharedAudioFrame>,
    utterance_tx: mpsc::Sender<Utterance>,
    cli: &Cli,
    shutdown: ShutdownHandle,
    metrics: Arc<PipelineMetrics>,
) -> JoinHandle<()> {
    let cfg = UnifiedVadConfig {
        mode: VadMode::EnergyThreshold,
        energy: EnergyThresholdConfig {
            silence_debounce_ms: (cli.pause_threshold * 1000.0) as u32,
            ..EnergyThresholdConfig::default()
        },
        min_speech_ms: 100,
        max_utterance_ms: (cli.phrase_time_limit * 1000.0) as u32,
        ambient_calibration_ms: (cli.ambient_duration * 1000.0) as u32,
        frame_size_samples: voxrelay_vad::FRAME_SIZE_SAMPLES,
        sample_rate_hz: voxrelay_vad::SAMPLE_RATE_HZ,
    };

    tokio::spawn(async move {
        let mut segmenter = Segmenter::new(cfg);
        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                frame = frames.recv() => {
                    let frame = match frame {
                        Ok(f) => f,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    };
                    metrics.mark_stage_active(PipelineStage::Vad);
                    match segmenter.process_frame(&frame.samples) {
                        Ok(Some(utterance)) => {
                            if utterance_tx.try_send(utterance).is_err() {
                                tracing::warn!("transcriber queue saturated; utterance dropped");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("segmenter error: {e}"),
                    }
                }
            }
        }
        // Stop mid-utterance: force-finalize whatever is buffered rather
        // than silently discarding it (§8 scenario 6).
        if let Some(utterance) = segmenter.flush(0) {
            let _ = utterance_tx.send(utterance).await;
        }
    })
}

/// Transcriber stage: drives `StreamingStt` per Utterance and folds its
/// delta/done events through a source-side `TextBuffer`.
fn spawn_transcribe_stage(
    mut utterances: mpsc::Receiver<Utterance>,
    translate_tx: mpsc::Sender<SourceLine>,
    mut transcriber: Box<dyn StreamingStt>,
    shutdown: ShutdownHandle,
    metrics: Arc<PipelineMetrics>,
    health: HealthMonitor,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer = TextBuffer::new();
        loop {
            let utterance = tokio::select! {
                _ = shutdown.wait() => break,
                u = utterances.recv() => match u {
                    Some(u) => u,
                    None => break,
                },
            };
            metrics.mark_stage_active(PipelineStage::Transcribe);
            transcriber.reset().await;

            let mut finalized = None;
            let mut errored = false;
            for chunk in utterance.samples.chunks(CHUNK_SAMPLES) {
                if let Some(event) = transcriber.on_speech_frame(chunk).await {
                    if let Some(line) = apply_transcript_event(&mut buffer, event, &mut errored) {
                        finalized = Some(line);
                    }
                }
            }
            if let Some(event) = transcriber.on_speech_end().await {
                if let Some(line) = apply_transcript_event(&mut buffer, event, &mut errored) {
                    finalized = Some(line);
                }
            }

            if errored {
                health.report(
                    "transcriber",
                    HealthStatus::Degraded { reason: "transcription error, utterance dropped".into() },
                );
            } else {
                health.report("transcriber", HealthStatus::Healthy);
            }

            if let Some(text) = finalized {
                let line = SourceLine { utterance_id: utterance.id, text };
                if translate_tx.try_send(line).is_err() {
                    tracing::warn!(
                        "translator queue saturated; coalescing utterance {} into the next",
                        utterance.id
                    );
                }
            }
        }
    })
}

fn apply_transcript_event(
    buffer: &mut TextBuffer,
    event: voxrelay_stt::TranscriptionEvent,
    errored: &mut bool,
) -> Option<String> {
    use voxrelay_stt::TranscriptionEvent;
    match event {
        TranscriptionEvent::Partial { text, .. } => buffer.feed(&text, false),
        TranscriptionEvent::Final { text, .. } => buffer.feed(&text, true),
        TranscriptionEvent::Error { code, message } => {
            tracing::warn!(code, message, "transcriber error; utterance dropped");
            *errored = true;
            None
        }
    }
}

/// Translator stage: applies the glossary rewrite, calls the translator
/// with rolling history, folds its delta/done events through a target-side
/// `TextBuffer`, writes the transcript log, and forwards to synthesis.
/// On translator failure falls back to echoing the source line (§4.4/§7).
#[allow(clippy::too_many_arguments)]
fn spawn_translate_stage(
    mut lines: mpsc::Receiver<SourceLine>,
    synth_tx: mpsc::Sender<TargetLine>,
    translator: Arc<dyn Translator>,
    glossary: Glossary,
    transcript_log: Arc<TranscriptLog>,
    source_language: String,
    target_language: String,
    topic_hint: Option<String>,
    history_len: usize,
    temperature: f32,
    shutdown: ShutdownHandle,
    metrics: Arc<PipelineMetrics>,
    health: HealthMonitor,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut history: VecDeque<(String, String)> = VecDeque::with_capacity(history_len.max(1));
        let mut buffer = TextBuffer::new();

        loop {
            let line = tokio::select! {
                _ = shutdown.wait() => break,
                l = lines.recv() => match l {
                    Some(l) => l,
                    None => break,
                },
            };
            metrics.mark_stage_active(PipelineStage::Translate);

            let rewritten = glossary.apply(&line.text);
            let request = voxrelay_translate::TranslationRequest {
                source_line: rewritten.clone(),
                source_language: source_language.clone(),
                target_language: target_language.clone(),
                history: history.iter().cloned().collect(),
                topic_hint: topic_hint.clone(),
                glossary_hint: glossary.target_hint(),
                temperature,
            };

            let (events_tx, mut events_rx) = mpsc::channel(8);
            let target_text = match translator.translate(request, events_tx).await {
                Ok(()) => {
                    let mut finalized = None;
                    while let Some(event) = events_rx.recv().await {
                        match event {
                            voxrelay_translate::TranslationEvent::Partial { text } => {
                                buffer.feed(&text, false);
                            }
                            voxrelay_translate::TranslationEvent::Final { text } => {
                                finalized = buffer.feed(&text, true);
                            }
                            voxrelay_translate::TranslationEvent::Error { code, message } => {
                                tracing::warn!(code, message, "translator reported an error");
                            }
                        }
                    }
                    health.report("translator", HealthStatus::Healthy);
                    finalized.unwrap_or_else(|| rewritten.clone())
                }
                Err(e) => {
                    tracing::warn!(error = %e, "translator failed; echoing source line");
                    health.report(
                        "translator",
                        HealthStatus::Degraded { reason: format!("falling back to source echo: {e}") },
                    );
                    rewritten.clone()
                }
            };

            transcript_log.record(
                line.utterance_id,
                &source_language,
                &line.text,
                &target_language,
                &target_text,
            );

            while history.len() >= history_len {
                history.pop_front();
            }
            if history_len > 0 {
                history.push_back((rewritten, target_text.clone()));
            }

            let target = TargetLine { utterance_id: line.utterance_id, text: target_text };
            if synth_tx.try_send(target).is_err() {
                tracing::warn!("synthesizer queue saturated; target line dropped");
            }
        }
    })
}

fn spawn_drain_stage(mut lines: mpsc::Receiver<TargetLine>) -> JoinHandle<()> {
    tokio::spawn(async move { while lines.recv().await.is_some() {} })
}

/// Synthesizer stage: calls the TTS engine with bounded retry for
/// transient/network failures, converts its raw byte payload to PCM16, and
/// forwards to the sink. A persistent failure skips audio for the
/// utterance; the text has already been printed (§7).
fn spawn_synth_stage(
    mut lines: mpsc::Receiver<TargetLine>,
    sink_tx: mpsc::Sender<AudioOut>,
    mut engine: Box<dyn TtsEngine>,
    voice: Option<String>,
    shutdown: ShutdownHandle,
    metrics: Arc<PipelineMetrics>,
    health: HealthMonitor,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        const MAX_ATTEMPTS: u32 = 3;
        loop {
            let line = tokio::select! {
                _ = shutdown.wait() => break,
                l = lines.recv() => match l {
                    Some(l) => l,
                    None => break,
                },
            };
            metrics.mark_stage_active(PipelineStage::Synthesize);
            if line.text.trim().is_empty() {
                continue;
            }

            let options = voice.as_ref().map(|v| voxrelay_tts::SynthesisOptions {
                voice: Some(v.clone()),
                ..Default::default()
            });

            let mut backoff_ms = 250u64;
            let mut result = None;
            for attempt in 1..=MAX_ATTEMPTS {
                match engine.synthesize(&line.text, options.clone()).await {
                    Ok(event) => {
                        result = Some(event);
                        break;
                    }
                    Err(e) if attempt == MAX_ATTEMPTS => {
                        tracing::warn!(error = %e, utterance_id = line.utterance_id, "synthesis failed; skipping audio");
                        health.report(
                            "synthesizer",
                            HealthStatus::Degraded { reason: format!("synthesis exhausted retries: {e}") },
                        );
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, attempt, "synthesis attempt failed, retrying");
                        tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                        backoff_ms = (backoff_ms * 2).min(4_000);
                    }
                }
            }

            let Some(event) = result else { continue };
            match event {
                voxrelay_tts::SynthesisEvent::AudioData { data, sample_rate, channels, .. } => {
                    health.report("synthesizer", HealthStatus::Healthy);
                    let pcm = bytes_to_pcm16(&data);
                    let out = AudioOut { utterance_id: line.utterance_id, pcm, rate: sample_rate, channels };
                    if sink_tx.send(out).await.is_err() {
                        break;
                    }
                }
                voxrelay_tts::SynthesisEvent::Failed { error, .. } => {
                    tracing::warn!(error, "synthesis reported failure; skipping audio");
                    health.report("synthesizer", HealthStatus::Degraded { reason: error });
                }
                _ => {}
            }
        }
    })
}

/// Sink stage: plays each utterance's audio in FIFO order by utterance id
/// (§5 ordering guarantee), running the blocking device write on tokio's
/// blocking-thread pool.
fn spawn_sink_stage(
    mut audio: mpsc::Receiver<AudioOut>,
    sink: Arc<AudioSink>,
    shutdown: ShutdownHandle,
    metrics: Arc<PipelineMetrics>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let out = tokio::select! {
                _ = shutdown.wait() => break,
                o = audio.recv() => match o {
                    Some(o) => o,
                    None => break,
                },
            };
            metrics.mark_stage_active(PipelineStage::Output);
            let sink = sink.clone();
            let _ = tokio::task::spawn_blocking(move || sink.play(&out.pcm, out.rate, out.channels)).await;
        }
    })
}
