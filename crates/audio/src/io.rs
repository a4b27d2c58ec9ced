use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use crate::buffer::AudioBuffer;
use crate::error::AudioError;

pub struct AudioDecoder;

impl AudioDecoder {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<AudioBuffer, AudioError> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)?;
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }
        info!("decoding audio file {:?}", path_ref);
        Self::decode(Box::new(file), hint)
    }

    /// Decodes an in-memory container such as an uploaded MP3.
    pub fn from_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioBuffer, AudioError> {
        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }
        debug!(len = bytes.len(), "decoding audio bytes");
        Self::decode(Box::new(Cursor::new(bytes)), hint)
    }

    fn decode(source: Box<dyn MediaSource>, hint: Hint) -> Result<AudioBuffer, AudioError> {
        let mss = MediaSourceStream::new(source, Default::default());
        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| AudioError::decode("no default track found"))?;
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16);
        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(err) => {
                    use symphonia::core::errors::Error as SymphError;
                    match err {
                        SymphError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                            break;
                        }
                        SymphError::ResetRequired => break,
                        _ => return Err(err.into()),
                    }
                }
            };
            if packet.track_id() != track_id {
                continue;
            }
            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);
                    channels.get_or_insert(spec.channels.count() as u16);
                    let mut out = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    out.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(out.samples());
                }
                // skip undecodable packet
                Err(symphonia::core::errors::Error::DecodeError(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let buffer = AudioBuffer::new(
            samples,
            sample_rate.ok_or_else(|| AudioError::decode("stream has no sample rate"))?,
            channels.ok_or_else(|| AudioError::decode("stream has no channel layout"))?,
        )?;
        debug!(
            sample_rate = buffer.sample_rate,
            channels = buffer.channels,
            frames = buffer.frames(),
            "decoded audio"
        );
        Ok(buffer)
    }
}

fn wav_spec(buffer: &AudioBuffer) -> WavSpec {
    WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

fn write_samples<W: Write + Seek>(writer: W, buffer: &AudioBuffer) -> Result<(), AudioError> {
    buffer.validate()?;
    let mut wav = WavWriter::new(writer, wav_spec(buffer))?;
    for sample in &buffer.samples {
        wav.write_sample(*sample)?;
    }
    wav.finalize()?;
    Ok(())
}

/// Writes the buffer as 32-bit float WAV.
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &AudioBuffer) -> Result<(), AudioError> {
    let path_ref = path.as_ref();
    let file = std::io::BufWriter::new(File::create(path_ref)?);
    write_samples(file, buffer)?;
    info!(
        frames = buffer.frames(),
        channels = buffer.channels,
        "wrote wav {:?}",
        path_ref
    );
    Ok(())
}

pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, AudioError> {
    let mut bytes = Vec::new();
    write_samples(Cursor::new(&mut bytes), buffer)?;
    Ok(bytes)
}
