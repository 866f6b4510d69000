//! WAV export

use std::path::Path;

use sonocare_core::SpeechAudio;

use crate::PipelineError;

/// Write 16-bit mono PCM as a WAV file
pub fn write_wav(path: &Path, audio: &SpeechAudio) -> Result<(), PipelineError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| PipelineError::Audio(format!("Failed to create WAV file: {}", e)))?;

    for sample in audio.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| PipelineError::Audio(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| PipelineError::Audio(format!("Failed to finalize WAV file: {}", e)))?;

    Ok(())
}
