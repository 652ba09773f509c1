use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candle_core::pickle::PthTensors;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::application::ports::{ModelLoader, TranscriptionEngine, TranscriptionError};

use super::audio_decoder::decode_audio_to_pcm;

const MEL_FILTERS_REPO: &str = "FL33TW00D-HF/whisper-base";
const MAX_DECODE_TOKENS: usize = 224;

/// Where the non-weight model files come from and how the weights are keyed.
#[derive(Debug, Clone)]
pub struct WhisperLoadOptions {
    /// Hugging Face repo holding `config.json` and `tokenizer.json`.
    pub assets_repo: String,
    /// Entry of a pickled checkpoint that holds the state dict, if nested.
    pub state_dict_key: Option<String>,
}

struct WhisperAssets {
    config: Config,
    tokenizer: Tokenizer,
    mel_filters: Vec<f32>,
}

/// Whisper on candle. The decoder keeps a KV cache, so inference runs one request
/// at a time behind a mutex on a blocking thread.
pub struct CandleWhisperEngine {
    model: Arc<Mutex<m::model::Whisper>>,
    tokenizer: Arc<Tokenizer>,
    config: Arc<Config>,
    mel_filters: Arc<Vec<f32>>,
    device: Device,
}

impl CandleWhisperEngine {
    pub fn load(weights_path: &Path, options: &WhisperLoadOptions) -> Result<Self, TranscriptionError> {
        let device = Device::Cpu;

        tracing::info!(
            device = ?device,
            weights = %weights_path.display(),
            assets = %options.assets_repo,
            "Initializing Candle Whisper engine"
        );

        let assets = fetch_assets(&options.assets_repo)?;
        let vb = weights_builder(weights_path, options.state_dict_key.as_deref(), &device)?;

        let model = m::model::Whisper::load(&vb, assets.config.clone())
            .map_err(load_failed("model"))?;

        tracing::info!("Candle Whisper engine loaded");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            tokenizer: Arc::new(assets.tokenizer),
            config: Arc::new(assets.config),
            mel_filters: Arc::new(assets.mel_filters),
            device,
        })
    }
}

#[async_trait]
impl TranscriptionEngine for CandleWhisperEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        let data = tokio::fs::read(audio_path).await?;
        let extension = audio_path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);

        let model = Arc::clone(&self.model);
        let tokenizer = Arc::clone(&self.tokenizer);
        let config = Arc::clone(&self.config);
        let mel_filters = Arc::clone(&self.mel_filters);
        let device = self.device.clone();

        tokio::task::spawn_blocking(move || -> Result<String, TranscriptionError> {
            let pcm = decode_audio_to_pcm(data, extension.as_deref())?;
            let mels = mel_windows(&pcm, &config, &mel_filters, &device)?;

            let mut model = model.lock().map_err(|_| {
                TranscriptionError::TranscriptionFailed("model lock poisoned".to_string())
            })?;

            let mut segments = Vec::with_capacity(mels.len());
            for (i, mel) in mels.iter().enumerate() {
                tracing::debug!(segment = i, "Transcribing audio segment");
                let text = decode_segment(&mut model, &tokenizer, &device, mel)?;
                if !text.is_empty() {
                    segments.push(text);
                }
            }

            let transcript = segments.join(" ");
            tracing::info!(
                segments = segments.len(),
                chars = transcript.len(),
                "Audio transcription completed"
            );
            Ok(transcript)
        })
        .await
        .map_err(inference_failed("inference task"))?
    }
}

/// Loads artifacts as [`CandleWhisperEngine`]s.
pub struct CandleWhisperLoader {
    options: WhisperLoadOptions,
}

impl CandleWhisperLoader {
    pub fn new(options: WhisperLoadOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ModelLoader for CandleWhisperLoader {
    async fn load(
        &self,
        artifact_path: &Path,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        let path: PathBuf = artifact_path.to_path_buf();
        let options = self.options.clone();

        let engine = tokio::task::spawn_blocking(move || CandleWhisperEngine::load(&path, &options))
            .await
            .map_err(load_failed("loader task"))??;

        Ok(Arc::new(engine))
    }
}

fn fetch_assets(assets_repo: &str) -> Result<WhisperAssets, TranscriptionError> {
    let api = Api::new().map_err(load_failed("hub"))?;
    let repo = api.repo(Repo::new(assets_repo.to_string(), RepoType::Model));

    let config_path = repo.get("config.json").map_err(load_failed("config.json"))?;
    let tokenizer_path = repo
        .get("tokenizer.json")
        .map_err(load_failed("tokenizer.json"))?;

    let config: Config = serde_json::from_str(
        &std::fs::read_to_string(&config_path).map_err(load_failed("read config"))?,
    )
    .map_err(load_failed("parse config"))?;

    let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(load_failed("tokenizer"))?;

    let mel_file = match config.num_mel_bins {
        128 => "melfilters128.bytes",
        _ => "melfilters.bytes",
    };
    let mel_path = api
        .repo(Repo::new(MEL_FILTERS_REPO.to_string(), RepoType::Model))
        .get(mel_file)
        .map_err(load_failed(mel_file))?;
    let mel_bytes = std::fs::read(&mel_path).map_err(load_failed("mel filters"))?;
    let mel_filters = read_mel_filters(&mel_bytes, &config)?;

    Ok(WhisperAssets {
        config,
        tokenizer,
        mel_filters,
    })
}

fn weights_builder(
    path: &Path,
    state_dict_key: Option<&str>,
    device: &Device,
) -> Result<VarBuilder<'static>, TranscriptionError> {
    if path.extension().is_some_and(|ext| ext == "safetensors") {
        // SAFETY: safetensors files are memory-mapped read-only
        return unsafe { VarBuilder::from_mmaped_safetensors(&[path], m::DTYPE, device) }
            .map_err(load_failed("safetensors weights"));
    }

    let tensors = PthTensors::new(path, state_dict_key).map_err(load_failed("pickle weights"))?;
    Ok(VarBuilder::from_backend(
        Box::new(tensors),
        m::DTYPE,
        device.clone(),
    ))
}

/// Log-mel spectrogram of the whole clip cut into encoder windows of
/// `m::N_FRAMES` frames. `pcm_to_mel` pads the tail, so a window starting inside
/// the audio always has a full `N_FRAMES` behind it.
pub fn mel_windows(
    pcm: &[f32],
    config: &Config,
    mel_filters: &[f32],
    device: &Device,
) -> Result<Vec<Tensor>, TranscriptionError> {
    let n_mel = config.num_mel_bins;
    let mel = m::audio::pcm_to_mel(config, pcm, mel_filters);
    let total_frames = mel.len() / n_mel;
    let mel = Tensor::from_vec(mel, (1, n_mel, total_frames), device)
        .map_err(inference_failed("mel"))?;

    let content_frames = pcm.len().div_ceil(m::HOP_LENGTH).min(total_frames);
    (0..content_frames)
        .step_by(m::N_FRAMES)
        .map(|offset| {
            let len = m::N_FRAMES.min(total_frames - offset);
            mel.narrow(2, offset, len)
                .map_err(inference_failed("mel window"))
        })
        .collect()
}

fn decode_segment(
    model: &mut m::model::Whisper,
    tokenizer: &Tokenizer,
    device: &Device,
    mel: &Tensor,
) -> Result<String, TranscriptionError> {
    let sot_token = token_id(tokenizer, m::SOT_TOKEN)?;
    let transcribe_token = token_id(tokenizer, m::TRANSCRIBE_TOKEN)?;
    let no_timestamps_token = token_id(tokenizer, m::NO_TIMESTAMPS_TOKEN)?;
    let eot_token = token_id(tokenizer, m::EOT_TOKEN)?;

    let audio_features = model
        .encoder
        .forward(mel, true)
        .map_err(inference_failed("encoder"))?;

    let mut tokens = vec![sot_token, transcribe_token, no_timestamps_token];
    let prompt_len = tokens.len();
    let mut decoded = Vec::new();

    for _ in 0..MAX_DECODE_TOKENS {
        let token_tensor = Tensor::new(tokens.as_slice(), device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference_failed("tokens"))?;

        let hidden = model
            .decoder
            .forward(&token_tensor, &audio_features, tokens.len() == prompt_len)
            .map_err(inference_failed("decoder"))?;

        let logits = hidden
            .squeeze(0)
            .and_then(|h| model.decoder.final_linear(&h))
            .map_err(inference_failed("projection"))?;

        let next_token = logits
            .dim(0)
            .and_then(|len| logits.get(len - 1))
            .and_then(|last| last.argmax(0))
            .and_then(|idx| idx.to_scalar::<u32>())
            .map_err(inference_failed("argmax"))?;

        if next_token == eot_token {
            break;
        }
        tokens.push(next_token);
        decoded.push(next_token);
    }

    model.reset_kv_cache();

    let text = tokenizer
        .decode(&decoded, true)
        .map_err(inference_failed("detokenize"))?;
    Ok(text.trim().to_string())
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, TranscriptionError> {
    tokenizer.token_to_id(token).ok_or_else(|| {
        TranscriptionError::TranscriptionFailed(format!("token not found: {}", token))
    })
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, TranscriptionError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(TranscriptionError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn load_failed<E: Display>(what: &'static str) -> impl Fn(E) -> TranscriptionError {
    move |e| TranscriptionError::ModelLoadFailed(format!("{what}: {e}"))
}

fn inference_failed<E: Display>(what: &'static str) -> impl Fn(E) -> TranscriptionError {
    move |e| TranscriptionError::TranscriptionFailed(format!("{what}: {e}"))
}
