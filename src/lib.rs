#![forbid(unsafe_code)]

pub mod blur;
pub mod buffer;
pub mod effect;
pub mod error;
pub mod io;
pub mod kernel;
pub mod parallel;
pub mod settings;
pub mod timing;

pub use blur::{GaussianBlur, convolve_pixel};
pub use buffer::PixelBuffer;
pub use effect::{Effect, EffectState, FilterKind, create_effect};
pub use error::{BlurError, BlurResult};
pub use kernel::{GaussianKernel, KernelSize};
pub use parallel::{BandLayout, ColumnBand, column_bands, for_each_column_band};
pub use settings::{DEFAULT_THREADS, EngineSettings};
pub use timing::Stopwatch;
