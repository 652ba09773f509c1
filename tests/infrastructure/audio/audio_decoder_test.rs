use vosyn_transcriber::application::ports::TranscriptionError;
use vosyn_transcriber::infrastructure::audio::audio_decoder::decode_audio_to_pcm;

fn build_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let data_size = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

#[test]
fn given_16khz_mono_wav_when_decoding_then_sample_count_is_preserved() {
    let wav = build_wav(16_000, 1, &vec![1000i16; 1600]);

    let pcm = decode_audio_to_pcm(wav, Some("wav")).unwrap();

    assert_eq!(pcm.len(), 1600);
}

#[test]
fn given_stereo_wav_when_decoding_then_downmixes_to_mono() {
    let frames: Vec<i16> = (0..800).flat_map(|_| [16_384i16, -16_384i16]).collect();
    let wav = build_wav(16_000, 2, &frames);

    let pcm = decode_audio_to_pcm(wav, Some("wav")).unwrap();

    assert_eq!(pcm.len(), 800);
    assert!(pcm.iter().all(|s| s.abs() < 1e-3));
}

#[test]
fn given_8khz_wav_when_decoding_then_resamples_to_16khz() {
    let wav = build_wav(8_000, 1, &vec![0i16; 1600]);

    let pcm = decode_audio_to_pcm(wav, None).unwrap();

    assert_eq!(pcm.len(), 3200);
}

#[test]
fn given_garbage_bytes_when_decoding_then_reports_unsupported_format() {
    let result = decode_audio_to_pcm(b"definitely not audio".to_vec(), Some("wav"));

    assert!(matches!(result, Err(TranscriptionError::UnsupportedFormat(_))));
}

fn mean(samples: &[f32]) -> f32 {
    samples.iter().sum::<f32>() / samples.len() as f32
}

#[test]
fn given_8khz_step_signal_when_resampling_then_edges_stay_in_place() {
    // 100 ms of half-scale DC, then 100 ms of silence.
    let mut samples = vec![16_384i16; 800];
    samples.extend(vec![0i16; 800]);
    let wav = build_wav(8_000, 1, &samples);

    let pcm = decode_audio_to_pcm(wav, Some("wav")).unwrap();

    assert_eq!(pcm.len(), 3200);
    let head = mean(&pcm[100..300]);
    let before_step = mean(&pcm[1300..1500]);
    let after_step = mean(&pcm[1700..1900]);
    let tail = mean(&pcm[3000..3200]);
    assert!((head - 0.5).abs() < 0.05, "head = {head}");
    assert!((before_step - 0.5).abs() < 0.05, "before step = {before_step}");
    assert!(after_step.abs() < 0.05, "after step = {after_step}");
    assert!(tail.abs() < 0.05, "tail = {tail}");
}
