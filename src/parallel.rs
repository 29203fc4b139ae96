//! Column-band decomposition of a [`PixelBuffer`] and a parallel-for over the
//! bands.
//!
//! A band is assembled from one `&mut` row segment per image row, so every
//! worker owns its slice of the output outright and no two workers can touch
//! the same byte.

use std::ops::Range;

use crate::{
    buffer::PixelBuffer,
    error::{BlurError, BlurResult},
};

/// Exclusive view over the columns `[start, end)` of every row of a buffer.
#[derive(Debug)]
pub struct ColumnBand<'a> {
    index: usize,
    columns: Range<u32>,
    rows: Vec<&'a mut [u8]>,
}

impl ColumnBand<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn columns(&self) -> Range<u32> {
        self.columns.clone()
    }

    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Pixel at absolute image coordinates; `None` if `(x, y)` is outside the band.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8; 4]> {
        if !self.columns.contains(&x) {
            return None;
        }
        let row = self.rows.get_mut(y as usize)?;
        let off = (x - self.columns.start) as usize * PixelBuffer::CHANNELS;
        <&mut [u8; 4]>::try_from(row.get_mut(off..off + PixelBuffer::CHANNELS)?).ok()
    }
}

/// How the image width is split among workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandLayout {
    pub bands: usize,
    pub band_width: u32,
}

impl BandLayout {
    /// `bands` equal bands of `width / bands` columns each.
    pub fn new(width: u32, bands: usize) -> BlurResult<Self> {
        if bands == 0 {
            return Err(BlurError::validation("worker count must be >= 1"));
        }
        let band_width = u32::try_from(bands).map(|n| width / n).unwrap_or(0);
        Ok(Self { bands, band_width })
    }

    pub fn covered_columns(&self) -> u32 {
        self.band_width.saturating_mul(self.bands as u32)
    }

    /// Trailing columns no band owns; they are never written.
    pub fn uncovered(&self, width: u32) -> Range<u32> {
        self.covered_columns().min(width)..width
    }

    pub fn band_columns(&self, index: usize) -> Range<u32> {
        let start = self.band_width * index as u32;
        start..start + self.band_width
    }
}

/// Splits `buf` into `layout.bands` disjoint column bands.
pub fn column_bands(buf: &mut PixelBuffer, layout: BandLayout) -> Vec<ColumnBand<'_>> {
    let height = buf.height() as usize;
    let band_bytes = layout.band_width as usize * PixelBuffer::CHANNELS;

    let mut bands: Vec<ColumnBand<'_>> = (0..layout.bands)
        .map(|index| ColumnBand {
            index,
            columns: layout.band_columns(index),
            rows: Vec::with_capacity(height),
        })
        .collect();

    if band_bytes == 0 {
        return bands;
    }

    for row in buf.rows_mut() {
        let mut rest = row;
        for band in bands.iter_mut() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(band_bytes);
            band.rows.push(head);
            rest = tail;
        }
    }
    bands
}

/// Runs `f` once per column band on a fresh pool of `threads` workers and
/// returns only after every band has finished.
pub fn for_each_column_band<F>(buf: &mut PixelBuffer, threads: usize, f: F) -> BlurResult<()>
where
    F: Fn(&mut ColumnBand<'_>) + Sync,
{
    let layout = BandLayout::new(buf.width(), threads)?;
    let uncovered = layout.uncovered(buf.width());
    if !uncovered.is_empty() {
        tracing::warn!(
            width = buf.width(),
            threads,
            columns = ?uncovered,
            "width not divisible by worker count; trailing columns left untouched"
        );
    }
    tracing::debug!(
        bands = layout.bands,
        band_width = layout.band_width,
        "dispatching column bands"
    );

    let pool = build_thread_pool(threads)?;
    let bands = column_bands(buf, layout);
    let f = &f;
    pool.scope(|s| {
        for mut band in bands {
            s.spawn(move |_| f(&mut band));
        }
    });
    Ok(())
}

fn build_thread_pool(threads: usize) -> BlurResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("gblur-band-{i}"))
        .build()
        .map_err(|e| BlurError::execution(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_rejects_zero_workers() {
        assert!(matches!(
            BandLayout::new(10, 0),
            Err(BlurError::Validation(_))
        ));
    }

    #[test]
    fn layout_leaves_remainder_uncovered() {
        let layout = BandLayout::new(9, 8).unwrap();
        assert_eq!(layout.band_width, 1);
        assert_eq!(layout.covered_columns(), 8);
        assert_eq!(layout.uncovered(9), 8..9);
        assert_eq!(layout.band_columns(3), 3..4);

        let even = BandLayout::new(16, 4).unwrap();
        assert!(even.uncovered(16).is_empty());
    }

    #[test]
    fn narrow_image_has_empty_bands() {
        let layout = BandLayout::new(3, 8).unwrap();
        assert_eq!(layout.band_width, 0);
        assert_eq!(layout.uncovered(3), 0..3);

        let mut buf = PixelBuffer::blank(3, 2).unwrap();
        let bands = column_bands(&mut buf, layout);
        assert_eq!(bands.len(), 8);
        assert!(bands.iter().all(|b| b.height() == 0));
    }

    #[test]
    fn bands_are_disjoint_and_address_absolute_columns() {
        let mut buf = PixelBuffer::blank(6, 3).unwrap();
        let layout = BandLayout::new(6, 3).unwrap();
        let mut bands = column_bands(&mut buf, layout);
        assert_eq!(bands[1].columns(), 2..4);
        assert!(bands[1].pixel_mut(1, 0).is_none());
        assert!(bands[1].pixel_mut(4, 0).is_none());
        assert!(bands[1].pixel_mut(2, 3).is_none());
        *bands[1].pixel_mut(3, 2).unwrap() = [1, 2, 3, 4];
        drop(bands);
        assert_eq!(buf.pixel(3, 2), Some(&[1, 2, 3, 4]));
    }

    #[test]
    fn parallel_for_writes_every_covered_pixel() {
        let mut buf = PixelBuffer::blank(10, 4).unwrap();
        for_each_column_band(&mut buf, 4, |band| {
            let tag = band.index() as u8 + 1;
            for x in band.columns() {
                for y in 0..band.height() {
                    if let Some(px) = band.pixel_mut(x, y) {
                        *px = [tag; 4];
                    }
                }
            }
        })
        .unwrap();

        for y in 0..4 {
            for x in 0..8 {
                let expected = (x / 2) as u8 + 1;
                assert_eq!(buf.pixel(x, y), Some(&[expected; 4]));
            }
            assert_eq!(buf.pixel(8, y), Some(&[0; 4]));
            assert_eq!(buf.pixel(9, y), Some(&[0; 4]));
        }
    }
}
