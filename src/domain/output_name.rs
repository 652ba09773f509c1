use super::blob_location::base_name;

pub const TRANSCRIPT_SUFFIX: &str = "_transcribed";
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Transcript file name for an input audio path: `clips/talk.wav` -> `talk_transcribed.txt`.
///
/// Only the final extension is stripped. A leading dot does not start an extension,
/// so `.hidden` keeps its name.
pub fn transcript_file_name(input_audio_path: &str) -> String {
    let base = base_name(input_audio_path);
    format!(
        "{}{}.{}",
        file_stem(base),
        TRANSCRIPT_SUFFIX,
        TRANSCRIPT_EXTENSION
    )
}

/// Object path of the transcript inside the output bucket.
pub fn transcript_object_path(output_folder: &str, input_audio_path: &str) -> String {
    format!(
        "{}/{}",
        output_folder.trim_end_matches('/'),
        transcript_file_name(input_audio_path)
    )
}

/// Final extension of a path's base name, without the dot.
pub fn extension(path: &str) -> Option<&str> {
    let base = base_name(path);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&base[idx + 1..]).filter(|ext| !ext.is_empty()),
    }
}

fn file_stem(base: &str) -> &str {
    match base.rfind('.') {
        Some(0) | None => base,
        Some(idx) => &base[..idx],
    }
}
