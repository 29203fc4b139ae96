use crate::{
    buffer::PixelBuffer,
    effect::{Effect, EffectState},
    error::BlurResult,
    kernel::{GaussianKernel, KernelSize},
    parallel::{ColumnBand, for_each_column_band},
    settings::EngineSettings,
};

/// Full 2D Gaussian blur, parallelized over column bands.
///
/// Kernel taps that fall outside the image are dropped, but every pixel is
/// still divided by the full kernel total, so borders come out darker than
/// the interior. Columns past `threads * (width / threads)` are left as they
/// were in the input.
#[derive(Debug)]
pub struct GaussianBlur<'a> {
    input: &'a PixelBuffer,
    output: PixelBuffer,
    kernel_size: KernelSize,
    threads: usize,
    kernel: Option<GaussianKernel>,
}

impl<'a> GaussianBlur<'a> {
    pub fn new(input: &'a PixelBuffer, kernel_size: KernelSize) -> Self {
        Self {
            input,
            output: input.clone(),
            kernel_size,
            threads: EngineSettings::default().threads,
            kernel: None,
        }
    }

    pub fn with_settings(
        input: &'a PixelBuffer,
        kernel_size: KernelSize,
        settings: &EngineSettings,
    ) -> BlurResult<Self> {
        settings.validate()?;
        Ok(Self {
            threads: settings.threads,
            ..Self::new(input, kernel_size)
        })
    }

    pub fn kernel_size(&self) -> KernelSize {
        self.kernel_size
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Kernel built by the most recent `apply`.
    pub fn kernel(&self) -> Option<&GaussianKernel> {
        self.kernel.as_ref()
    }

    pub fn into_output(self) -> PixelBuffer {
        self.output
    }
}

impl Effect for GaussianBlur<'_> {
    #[tracing::instrument(
        skip(self),
        fields(
            kernel_size = %self.kernel_size,
            width = self.input.width(),
            height = self.input.height(),
            threads = self.threads,
        )
    )]
    fn apply(&mut self) -> BlurResult<()> {
        // Built before any worker starts; workers only ever read it.
        let kernel = GaussianKernel::new(self.kernel_size);
        let input = self.input;
        for_each_column_band(&mut self.output, self.threads, |band| {
            blur_band(input, &kernel, band)
        })?;
        self.kernel = Some(kernel);
        Ok(())
    }

    fn get(&self) -> &PixelBuffer {
        &self.output
    }

    fn state(&self) -> EffectState {
        if self.kernel.is_some() {
            EffectState::Applied
        } else {
            EffectState::Unapplied
        }
    }
}

fn blur_band(input: &PixelBuffer, kernel: &GaussianKernel, band: &mut ColumnBand<'_>) {
    for x in band.columns() {
        for y in 0..band.height() {
            let px = convolve_pixel(input, kernel, x, y);
            if let Some(dst) = band.pixel_mut(x, y) {
                *dst = px;
            }
        }
    }
}

/// Weighted average around `(x, y)`: in-bounds taps only, divided by the
/// full kernel total, truncated toward zero.
pub fn convolve_pixel(input: &PixelBuffer, kernel: &GaussianKernel, x: u32, y: u32) -> [u8; 4] {
    let hk = kernel.half_width();
    let (x, y) = (i64::from(x), i64::from(y));

    let mut acc = [0.0f64; 4];
    for dx in -hk..=hk {
        for dy in -hk..=hk {
            let Some(src) = input.pixel_at(x + dx, y + dy) else {
                continue;
            };
            let w = kernel.weight(dx, dy);
            for (a, &s) in acc.iter_mut().zip(src) {
                *a += f64::from(s) * w;
            }
        }
    }

    let total = kernel.total();
    acc.map(|a| (a / total).clamp(0.0, 255.0) as u8)
}
