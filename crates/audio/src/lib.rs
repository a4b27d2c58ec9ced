pub mod buffer;
pub mod click;
pub mod dsp;
pub mod error;
pub mod io;
pub mod speed;

pub use buffer::AudioBuffer;
pub use click::{ClickSettings, ClickSynthesizer, ClickTrackSpec};
pub use dsp::{normalize_peak, PeakLevel};
pub use error::AudioError;
pub use io::{encode_wav, write_wav, AudioDecoder};
pub use speed::rescale;
