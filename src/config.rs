//! Responsivity thresholds.
//!
//! [`ResponsivityConfig`] holds the cut-offs used to call a cell
//! non-responsive.  The defaults are the conventional Brain Observatory
//! values.

/// Thresholds for the responsivity classifier.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use ophys::ResponsivityConfig;
///
/// let cfg = ResponsivityConfig {
///     p_value_max: 0.01,   // stricter significance
///     ..ResponsivityConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsivityConfig {
    /// A family's response is non-significant when its p-value exceeds this.
    ///
    /// Default: `0.05`.
    pub p_value_max: f64,

    /// A family's response is too small when its peak dF/F (percent) is below
    /// this.
    ///
    /// Default: `3.0`.
    pub min_peak_dff: f64,

    /// A cell has no receptive field when the locally-sparse-noise chi-square
    /// p-value exceeds this.
    ///
    /// Default: `0.05`.
    pub rf_chi2_max: f64,
}

impl Default for ResponsivityConfig {
    fn default() -> Self {
        Self {
            p_value_max: 0.05,
            min_peak_dff: 3.0,
            rf_chi2_max: 0.05,
        }
    }
}
