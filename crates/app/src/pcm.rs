//! Byte-level PCM helpers bridging [`voxrelay_tts::SynthesisEvent::AudioData`]
//! (raw bytes, provider-declared) to the `&[i16]` the audio sink consumes.

/// Turn a synthesizer's raw byte payload into mono-channel i16 samples.
///
/// Providers disagree on framing: `espeak --stdout` emits a RIFF/WAVE file
/// (header + `data` subchunk), while the OpenAI `pcm` response format is
/// headerless little-endian PCM16. Detect the RIFF signature and skip to the
/// `data` subchunk when present; otherwise treat the whole payload as raw
/// PCM16.
pub fn bytes_to_pcm16(data: &[u8]) -> Vec<i16> {
    let body = strip_wav_header(data);
    body.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

fn strip_wav_header(data: &[u8]) -> &[u8] {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return data;
    }
    let mut pos = 12;
    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size =
            u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                as usize;
        let chunk_start = pos + 8;
        if chunk_id == b"data" {
            let end = (chunk_start + chunk_size).min(data.len());
            return &data[chunk_start..end];
        }
        pos = chunk_start + chunk_size + (chunk_size % 2);
    }
    // No `data` subchunk found; fall back to treating the whole body as raw.
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_pcm_without_header_round_trips() {
        let samples: Vec<i16> = vec![1, -1, 32000, -32000, 0];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(bytes_to_pcm16(&bytes), samples);
    }

    #[test]
    fn wav_header_is_skipped() {
        let samples: Vec<i16> = vec![100, -100, 200];
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&[0u8; 4]); // overall size, unused by the parser
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&[0u8; 16]); // fmt body, unused
        wav.extend_from_slice(b"data");
        let data_bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        wav.extend_from_slice(&(data_bytes.len() as u32).to_le_bytes());
        wav.extend_from_slice(&data_bytes);

        assert_eq!(bytes_to_pcm16(&wav), samples);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(bytes_to_pcm16(&[]).is_empty());
    }
}
