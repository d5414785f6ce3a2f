use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

/// Loads a single-channel recording as `f64` samples.
///
/// Audio containers are decoded through symphonia and down-mixed to mono.
/// `.csv` and `.txt` files are read as one sample per line (first
/// comma-separated field), in which case `sample_rate` must be supplied since
/// the file carries none. For decoded audio a supplied rate overrides the
/// container's.
pub fn load_signal<P: AsRef<Path>>(path: P, sample_rate: Option<u32>) -> Result<(Vec<f64>, u32)> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if ext == "csv" || ext == "txt" {
        let rate = sample_rate
            .context("Text input carries no sample rate; pass --sample-rate")?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let samples = parse_plain_text(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded {} samples from text at {} Hz", samples.len(), rate);
        return Ok((samples, rate));
    }

    let (samples, native_rate) = decode_audio(path)?;
    let rate = match sample_rate {
        Some(r) if r != native_rate => {
            warn!("Overriding container sample rate {} Hz with {} Hz", native_rate, r);
            r
        }
        _ => native_rate,
    };
    Ok((samples, rate))
}

/// One sample per line; blank lines and `#` comments skipped; lines with
/// multiple comma-separated columns contribute their first column.
pub(crate) fn parse_plain_text(content: &str) -> Result<Vec<f64>> {
    let mut samples = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field = line.split(',').next().unwrap_or("").trim();
        let value: f64 = field
            .parse()
            .with_context(|| format!("Invalid sample '{}' on line {}", field, lineno + 1))?;
        samples.push(value);
    }
    if samples.is_empty() {
        bail!("No samples found in text input");
    }
    Ok(samples)
}

fn decode_audio(path: &Path) -> Result<(Vec<f64>, u32)> {
    info!("Decoding audio from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(ReadOnlySource::new(BufReader::new(file))),
        Default::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No supported audio tracks found")?;
    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    debug!("Container sample rate: {} Hz", sample_rate);

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::ResetRequired) => continue,
            Err(_) => break,
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let duration = decoded.capacity() as u64;
                if duration == 0 {
                    continue;
                }
                let channels = spec.channels.count();
                let mut sample_buf = SampleBuffer::<f64>::new(duration, spec);
                sample_buf.copy_interleaved_ref(decoded);
                if channels > 1 {
                    samples.extend(
                        sample_buf
                            .samples()
                            .chunks(channels)
                            .map(|frame| frame.iter().sum::<f64>() / channels as f64),
                    );
                } else {
                    samples.extend_from_slice(sample_buf.samples());
                }
            }
            Err(symphonia::core::errors::Error::DecodeError(_))
            | Err(symphonia::core::errors::Error::ResetRequired) => {
                debug!("Skipping undecodable packet");
                continue;
            }
            Err(e) => bail!("Decode error: {}", e),
        }
    }

    if samples.is_empty() {
        bail!("Decoded zero samples from {}", path.display());
    }
    info!("Decoded {} samples", samples.len());
    Ok((samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let parsed = parse_plain_text("1.0\n-0.5\n0.25\n").unwrap();
        assert_eq!(parsed, vec![1.0, -0.5, 0.25]);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let parsed = parse_plain_text("# header\n\n1.0\n\n# trailing\n2.0\n").unwrap();
        assert_eq!(parsed, vec![1.0, 2.0]);
    }

    #[test]
    fn test_parse_takes_first_column() {
        let parsed = parse_plain_text("0.1, 9.9\n0.2, 8.8\n").unwrap();
        assert_eq!(parsed, vec![0.1, 0.2]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_plain_text("1.0\nnot-a-number\n").is_err());
        assert!(parse_plain_text("").is_err());
        assert!(parse_plain_text("# only comments\n").is_err());
    }

    #[test]
    fn test_text_input_requires_sample_rate() {
        // extension routing happens before any file I/O for the rate check
        assert!(load_signal("missing.csv", None).is_err());
    }
}
