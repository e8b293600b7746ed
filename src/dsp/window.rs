//! The single analysis window the ring buffer multiplies snapshots by.
//! Window *selection* is not a host-facing parameter, so this is a
//! construction-time choice rather than something `FxParameters` carries.

use crate::constants::{
    BARTLETT_WINDOW_COMPENSATION, HAMMING_WINDOW_COMPENSATION, HANN_WINDOW_COMPENSATION,
};
use crate::dsp::wavetable::WaveTable;
use crate::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisWindow {
    Hann,
    Hamming,
    Bartlett,
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        AnalysisWindow::Hann
    }
}

impl AnalysisWindow {
    /// Pre-gain compensation restoring unity passband gain at 50% overlap
    /// under this window. Treated as a per-window attribute rather than a
    /// global.
    pub fn compensation(self) -> Scalar {
        match self {
            AnalysisWindow::Hann => HANN_WINDOW_COMPENSATION,
            AnalysisWindow::Hamming => HAMMING_WINDOW_COMPENSATION,
            AnalysisWindow::Bartlett => BARTLETT_WINDOW_COMPENSATION,
        }
    }

    pub fn table(self, size: usize) -> WaveTable<Scalar> {
        match self {
            AnalysisWindow::Hann => WaveTable::hann(size),
            AnalysisWindow::Hamming => WaveTable::hamming(size),
            AnalysisWindow::Bartlett => WaveTable::bartlett(size),
        }
    }
}
