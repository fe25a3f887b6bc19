//! Normalized signal readings and the raw-measurement normalizer.

/// Configuration for raw signal normalization.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// dBm level mapped to strength 0.0.
    pub dbm_floor: f64,
    /// dBm span above the floor mapped onto [0, 1].
    pub dbm_range: f64,
    /// Multiplicative confidence discount applied per unavailable
    /// auxiliary sensor.
    pub sensor_discount: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            dbm_floor: -100.0,
            dbm_range: 70.0,
            sensor_discount: 0.5,
        }
    }
}

/// A raw radio measurement before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawSignal {
    /// dBm-scale measurement (typically -100..-30 indoors).
    Dbm(f64),
    /// Already-fractional measurement in [0, 1]; clamped on normalization.
    Fraction(f64),
}

/// Availability flags for the auxiliary sensors consulted during capture.
///
/// A missing sensor does not fail a capture; it only discounts the
/// confidence attached to the resulting reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxiliarySensors {
    /// Barometer available (altitude deltas trustworthy).
    pub barometer: bool,
    /// Compass available (headings trustworthy).
    pub compass: bool,
}

impl AuxiliarySensors {
    /// All auxiliary sensors reporting.
    pub const fn all_available() -> Self {
        Self {
            barometer: true,
            compass: true,
        }
    }

    /// Number of unavailable sensors.
    pub fn missing_count(&self) -> u32 {
        u32::from(!self.barometer) + u32::from(!self.compass)
    }
}

impl Default for AuxiliarySensors {
    fn default() -> Self {
        Self::all_available()
    }
}

/// A bounded signal measurement: strength and confidence, both in [0, 1].
///
/// Both fields are clamped at construction and are never NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalReading {
    strength: f64,
    confidence: f64,
}

impl SignalReading {
    /// Create a reading, clamping both fields into [0, 1].
    ///
    /// Non-finite inputs collapse to 0.0.
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength: clamp_unit(strength),
            confidence: clamp_unit(confidence),
        }
    }

    /// Normalize a raw measurement into a reading.
    ///
    /// dBm input maps through `(raw - dbm_floor) / dbm_range` and is
    /// clamped; fractional input is passthrough-clamped. Confidence starts
    /// at 1.0 and is discounted once per unavailable auxiliary sensor.
    ///
    /// Returns `None` when the radio sample itself is missing (non-finite
    /// raw value); callers surface that as a capture failure.
    pub fn from_raw(
        raw: RawSignal,
        sensors: AuxiliarySensors,
        config: &NormalizerConfig,
    ) -> Option<Self> {
        let strength = match raw {
            RawSignal::Dbm(dbm) => {
                if !dbm.is_finite() {
                    return None;
                }
                (dbm - config.dbm_floor) / config.dbm_range
            }
            RawSignal::Fraction(f) => {
                if !f.is_finite() {
                    return None;
                }
                f
            }
        };

        let confidence = config
            .sensor_discount
            .powi(sensors.missing_count() as i32);

        Some(Self::new(strength, confidence))
    }

    /// Normalized strength in [0, 1].
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Measurement confidence in [0, 1].
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Whether this reading falls below the given weak-signal threshold.
    pub fn is_weak(&self, threshold: f64) -> bool {
        self.strength < threshold
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_clamps_at_construction() {
        let reading = SignalReading::new(1.5, -0.2);
        assert!((reading.strength() - 1.0).abs() < f64::EPSILON);
        assert!(reading.confidence().abs() < f64::EPSILON);
    }

    #[test]
    fn test_nan_collapses_to_zero() {
        let reading = SignalReading::new(f64::NAN, f64::INFINITY);
        assert!(reading.strength().abs() < f64::EPSILON);
        assert!(reading.confidence().abs() < f64::EPSILON);
    }

    #[test]
    fn test_dbm_normalization_endpoints() {
        let config = NormalizerConfig::default();

        // -100 dBm is the floor, -30 dBm saturates.
        let floor = SignalReading::from_raw(
            RawSignal::Dbm(-100.0),
            AuxiliarySensors::all_available(),
            &config,
        )
        .unwrap();
        assert!(floor.strength().abs() < 1e-9);

        let strong = SignalReading::from_raw(
            RawSignal::Dbm(-30.0),
            AuxiliarySensors::all_available(),
            &config,
        )
        .unwrap();
        assert!((strong.strength() - 1.0).abs() < 1e-9);

        // Below the floor and above saturation clamp.
        let below = SignalReading::from_raw(
            RawSignal::Dbm(-120.0),
            AuxiliarySensors::all_available(),
            &config,
        )
        .unwrap();
        assert!(below.strength().abs() < 1e-9);
    }

    #[test]
    fn test_dbm_midpoint() {
        let config = NormalizerConfig::default();
        let mid = SignalReading::from_raw(
            RawSignal::Dbm(-65.0),
            AuxiliarySensors::all_available(),
            &config,
        )
        .unwrap();
        assert!((mid.strength() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fraction_passthrough_clamp() {
        let config = NormalizerConfig::default();
        let reading = SignalReading::from_raw(
            RawSignal::Fraction(1.4),
            AuxiliarySensors::all_available(),
            &config,
        )
        .unwrap();
        assert!((reading.strength() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_sensors_discount_confidence() {
        let config = NormalizerConfig::default();

        let full = SignalReading::from_raw(
            RawSignal::Fraction(0.5),
            AuxiliarySensors::all_available(),
            &config,
        )
        .unwrap();
        assert!((full.confidence() - 1.0).abs() < 1e-9);

        let no_compass = SignalReading::from_raw(
            RawSignal::Fraction(0.5),
            AuxiliarySensors {
                barometer: true,
                compass: false,
            },
            &config,
        )
        .unwrap();
        assert!((no_compass.confidence() - 0.5).abs() < 1e-9);

        let none = SignalReading::from_raw(
            RawSignal::Fraction(0.5),
            AuxiliarySensors {
                barometer: false,
                compass: false,
            },
            &config,
        )
        .unwrap();
        assert!((none.confidence() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_missing_radio_sample_is_none() {
        let config = NormalizerConfig::default();
        let result = SignalReading::from_raw(
            RawSignal::Dbm(f64::NAN),
            AuxiliarySensors::all_available(),
            &config,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_weak_threshold() {
        let reading = SignalReading::new(0.3, 1.0);
        assert!(reading.is_weak(0.4));
        assert!(!reading.is_weak(0.2));
    }
}
