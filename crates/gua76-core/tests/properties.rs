//! Property-based tests for gua76-core DSP primitives.
//!
//! Filter stability, saturator bounds, meter ballistics and the Mid/Side
//! matrix under randomized input.

use proptest::prelude::*;
use gua76_core::{
    ENVELOPE_FLOOR, EnvelopeDetector, FilterCascade, FilterKind, METER_FLOOR_DB, OversampleFactor,
    Oversampler, SmoothedParam, TimeRange, decode_mid_side, encode_mid_side, meter_db, saturate,
    saturation_threshold, update_peak,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Cascades stay finite for any cutoff, including above Nyquist and below 1 Hz.
    #[test]
    fn cascade_stability(
        cutoff in 0.0f32..40000.0f32,
        q in 0.0f32..10.0f32,
        highpass in any::<bool>(),
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let kind = if highpass { FilterKind::Highpass } else { FilterKind::Lowpass };
        let mut cascade = FilterCascade::new();
        cascade.configure(kind, cutoff, q, 48000.0);

        for _ in 0..32 {
            for &sample in &input {
                let out = cascade.process(sample);
                prop_assert!(
                    out.is_finite(),
                    "{:?} (cutoff={}, q={}) produced {} for input {}",
                    kind, cutoff, q, out, sample
                );
            }
        }
    }

    /// Decoding an encoded pair returns the original within float precision.
    #[test]
    fn mid_side_roundtrip(left in -1.0f32..=1.0f32, right in -1.0f32..=1.0f32) {
        let (mid, side) = encode_mid_side(left, right);
        let (l, r) = decode_mid_side(mid, side);
        prop_assert!((l - left).abs() <= 1e-6, "left {} -> {}", left, l);
        prop_assert!((r - right).abs() <= 1e-6, "right {} -> {}", right, r);
    }

    /// The saturator never leaves [-1, 1] and is transparent below its threshold.
    #[test]
    fn saturator_bounds(x in -100.0f32..100.0f32, drive in 0.0f32..2.0f32) {
        let y = saturate(x, drive);
        prop_assert!((-1.0..=1.0).contains(&y), "saturate({}, {}) = {}", x, drive, y);
        if x.abs() <= saturation_threshold(drive) {
            prop_assert_eq!(y, x);
        }
        prop_assert_eq!(y.is_sign_negative(), x.is_sign_negative());
    }

    /// An impulse anywhere in the block is fully captured by the peak update.
    #[test]
    fn peak_captures_impulse(
        position in 0usize..256,
        amplitude in -1.0f32..=1.0f32,
        held in 0.0f32..0.5f32,
        alpha in 0.0f32..1.0f32,
    ) {
        let mut block = [0.0f32; 256];
        block[position] = amplitude;
        let peak = update_peak(&block, held, alpha);
        prop_assert!(peak >= amplitude.abs());
        prop_assert!(peak <= amplitude.abs().max(held));
    }

    /// Meter readings stay between the floor and 0 dB for sub-unity levels.
    #[test]
    fn meter_db_range(linear in 0.0f32..=1.0f32) {
        let db = meter_db(linear);
        prop_assert!((METER_FLOOR_DB..=0.0).contains(&db), "meter_db({}) = {}", linear, db);
    }

    /// The envelope stays finite and never drops under its floor.
    #[test]
    fn envelope_respects_floor(
        attack in 0.0f32..=1.0f32,
        release in 0.0f32..=1.0f32,
        input in prop::array::uniform32(-4.0f32..=4.0f32),
    ) {
        let mut detector = EnvelopeDetector::new(192000.0);
        detector.set_times(TimeRange::ATTACK.time_at(attack), TimeRange::RELEASE.time_at(release));
        for &sample in input.iter().chain([0.0f32; 32].iter()) {
            let env = detector.process(sample);
            prop_assert!(env.is_finite());
            prop_assert!(env >= ENVELOPE_FLOOR);
            prop_assert!(env <= 4.0);
        }
    }

    /// SmoothedParam converges to any target.
    #[test]
    fn smoothed_param_converges(start in -2.0f32..2.0f32, target in -2.0f32..2.0f32) {
        let mut param = SmoothedParam::with_config(start, 48000.0, 5.0);
        param.set_target(target);
        for _ in 0..4800 {
            param.advance();
        }
        prop_assert!((param.get() - target).abs() < 1e-3);
    }

    /// Oversampling a bounded block yields a bounded, finite host-rate block.
    #[test]
    fn oversampler_output_bounded(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        eight in any::<bool>(),
    ) {
        let factor = if eight { OversampleFactor::X8 } else { OversampleFactor::X4 };
        let mut os = Oversampler::new(factor, 48000.0, 32);
        let block = os.stage(input.len()).ok_or_else(|| TestCaseError::fail("block should fit"))?;
        block.signal_left.copy_from_slice(&input);
        block.signal_right.copy_from_slice(&input);
        block.sidechain_left.copy_from_slice(&input);
        block.sidechain_right.copy_from_slice(&input);
        let up = os.upsample(input.len());
        prop_assert_eq!(up.signal_left.len(), input.len() * factor.as_usize());

        let mut left = [0.0f32; 32];
        let mut right = [0.0f32; 32];
        os.downsample(input.len(), &mut left, &mut right);
        for (&l, &r) in left.iter().zip(right.iter()) {
            prop_assert!(l.is_finite() && l.abs() < 4.0);
            prop_assert_eq!(l, r);
        }
    }
}
