pub mod audio_decoder;
mod candle_whisper_engine;

pub use candle_whisper_engine::{
    CandleWhisperEngine, CandleWhisperLoader, WhisperLoadOptions, mel_windows,
};
