use serde::{Deserialize, Serialize};

use crate::{
    blur::GaussianBlur,
    buffer::PixelBuffer,
    error::BlurResult,
    kernel::KernelSize,
    settings::EngineSettings,
};

/// A whole-image filter: run it with [`Effect::apply`], read the result with
/// [`Effect::get`].
pub trait Effect {
    /// Blocks until the output buffer has been fully rewritten.
    fn apply(&mut self) -> BlurResult<()>;

    /// Output buffer in its current state. Before the first `apply` this is an
    /// untouched copy of the input.
    fn get(&self) -> &PixelBuffer;

    fn state(&self) -> EffectState;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectState {
    Unapplied,
    Applied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    GaussianBlur { kernel_size: KernelSize },
}

pub fn create_effect<'a>(
    kind: FilterKind,
    input: &'a PixelBuffer,
    settings: &EngineSettings,
) -> BlurResult<Box<dyn Effect + 'a>> {
    match kind {
        FilterKind::GaussianBlur { kernel_size } => Ok(Box::new(GaussianBlur::with_settings(
            input,
            kernel_size,
            settings,
        )?)),
    }
}
