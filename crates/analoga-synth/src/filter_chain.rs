//! Per-voice filter and drive chain.
//!
//! ```text
//!              ┌──────────────── oversampled (1×, 2× or 4×) ───────────────┐
//! osc ─► up ─► │ gain ─► ladder(mode, drive) ─► shaper                      │ ─► down ─► out
//!              │ svf lowpass                      (models 2, 3, 6)            │
//!              └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The voicing comes from [`model_profile`] and is only reapplied when the
//! model index changes. The SVF path runs the filter alone, without the
//! profile's gain or shaper. Both filters track cutoff and resonance at all times
//! so a model switch between paths starts from current settings.

use analoga_core::{
    Effect, LadderFilter, LadderMode, Oversampler, OversamplingMode, StateVariableFilter,
    SvfOutput,
};

use crate::profile::{FilterPath, ModelProfile, model_profile};

/// Filter cutoff the chain starts at.
pub const DEFAULT_CUTOFF: f32 = 20000.0;
/// Filter resonance the chain starts at.
pub const DEFAULT_RESONANCE: f32 = 0.7;

/// Gain, filter and shaper for one voice, inside an oversampler.
#[derive(Debug, Clone)]
pub struct FilterChain {
    oversampler: Oversampler,
    ladder: LadderFilter,
    svf: StateVariableFilter,
    profile: ModelProfile,
    model: Option<i32>,
    sample_rate: f32,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl FilterChain {
    /// Chain at `sample_rate` with no model applied yet.
    ///
    /// Until the first [`apply_model_profile`](Self::apply_model_profile)
    /// the ladder runs `Lpf24` at the default drive with unity gain and no
    /// shaping.
    pub fn new(sample_rate: f32) -> Self {
        let mut ladder = LadderFilter::new(sample_rate);
        ladder.set_mode(LadderMode::Lpf24);
        ladder.set_cutoff_immediate(DEFAULT_CUTOFF);
        ladder.set_resonance_immediate(DEFAULT_RESONANCE);

        let mut svf = StateVariableFilter::new(sample_rate);
        svf.set_output_type(SvfOutput::Lowpass);
        svf.set_cutoff_immediate(DEFAULT_CUTOFF);
        svf.set_resonance(DEFAULT_RESONANCE);

        let profile = ModelProfile {
            gain: 1.0,
            path: FilterPath::Ladder,
            mode: LadderMode::Lpf24,
            drive: ladder.drive(),
            shaper: crate::profile::Shaper::Identity,
        };

        Self {
            oversampler: Oversampler::new(OversamplingMode::Off),
            ladder,
            svf,
            profile,
            model: None,
            sample_rate,
        }
    }

    /// Apply the voicing of `model` if it differs from the current one.
    /// Returns `true` when the profile was (re)applied.
    pub fn apply_model_profile(&mut self, model: i32) -> bool {
        if self.model == Some(model) {
            return false;
        }
        self.model = Some(model);
        self.profile = model_profile(model);
        self.ladder.set_mode(self.profile.mode);
        self.ladder.set_drive(self.profile.drive);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            model,
            path = ?self.profile.path,
            mode = ?self.profile.mode,
            drive = self.profile.drive,
            "voice model profile applied"
        );
        true
    }

    /// Model whose voicing is active.
    pub fn model(&self) -> Option<i32> {
        self.model
    }

    /// Active voicing.
    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    /// Block-rate cutoff (Hz) and resonance (0.1..0.95). The ladder ramps to
    /// the new values per sample; the SVF takes the resonance as its Q.
    pub fn apply_smoothed_filter_params(&mut self, cutoff: f32, resonance: f32) {
        self.ladder.set_cutoff(cutoff);
        self.ladder.set_resonance(resonance);
        self.svf.set_cutoff(cutoff);
        self.svf.set_resonance(resonance);
    }

    /// Switch oversampling and re-rate both filters to `sr · factor`.
    /// Clears filter state; only call on a silent voice.
    pub fn set_oversampling(&mut self, mode: OversamplingMode) {
        if mode == self.oversampler.mode() {
            return;
        }
        self.oversampler.set_mode(mode);
        self.rerate();
        self.ladder.reset();
        self.svf.reset();
    }

    /// Active oversampling mode.
    pub fn oversampling(&self) -> OversamplingMode {
        self.oversampler.mode()
    }

    fn rerate(&mut self) {
        let rate = self.sample_rate * self.oversampler.factor() as f32;
        self.ladder.set_sample_rate(rate);
        self.svf.set_sample_rate(rate);
    }
}

impl Effect for FilterChain {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let profile = self.profile;
        match profile.path {
            FilterPath::Ladder => {
                let ladder = &mut self.ladder;
                self.oversampler.process_with(input, |x| {
                    profile.shaper.apply(ladder.process(x * profile.gain))
                })
            }
            FilterPath::Svf => {
                let svf = &mut self.svf;
                self.oversampler.process_with(input, |x| svf.process(x))
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.rerate();
    }

    fn reset(&mut self) {
        self.oversampler.reset();
        self.ladder.reset();
        self.svf.reset();
    }

    fn latency_samples(&self) -> usize {
        self.oversampler.latency_samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;
    use libm::sinf;

    const SR: f32 = 48000.0;

    fn peak(chain: &mut FilterChain, freq: f32) -> f32 {
        let mut p = 0.0f32;
        for i in 0..24000 {
            let y = chain.process(0.1 * sinf(TAU * freq * i as f32 / SR));
            if i > 12000 {
                p = p.max(y.abs());
            }
        }
        p
    }

    #[test]
    fn model_profile_is_edge_triggered() {
        let mut chain = FilterChain::new(SR);
        assert!(chain.apply_model_profile(0));
        assert!(!chain.apply_model_profile(0));
        assert!(chain.apply_model_profile(3));
        assert_eq!(chain.profile().path, FilterPath::Svf);
        assert!(chain.apply_model_profile(0));
        assert_eq!(chain.model(), Some(0));
    }

    #[test]
    fn lowpass_models_attenuate_highs() {
        for model in [3, 75] {
            let mut chain = FilterChain::new(SR);
            chain.apply_model_profile(model);
            chain.apply_smoothed_filter_params(500.0, 0.1);
            chain.reset();
            let low = peak(&mut chain, 100.0);
            chain.reset();
            let high = peak(&mut chain, 8000.0);
            assert!(high < low * 0.1, "model {model}: low {low} high {high}");
        }
    }

    #[test]
    fn svf_models_run_the_filter_unshaped() {
        for model in [2, 3, 6] {
            let mut chain = FilterChain::new(SR);
            chain.apply_model_profile(model);
            chain.apply_smoothed_filter_params(1200.0, 0.7);
            let mut svf = StateVariableFilter::new(SR);
            svf.set_output_type(SvfOutput::Lowpass);
            svf.set_cutoff_immediate(DEFAULT_CUTOFF);
            svf.set_resonance(DEFAULT_RESONANCE);
            svf.set_cutoff(1200.0);
            svf.set_resonance(0.7);
            for i in 0..4800 {
                let x = 0.9 * sinf(TAU * 110.0 * i as f32 / SR);
                let expected = svf.process(x);
                let y = chain.process(x);
                assert!(
                    (y - expected).abs() < 1e-6,
                    "model {model} sample {i}: {y} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn oversampling_rerates_and_stays_stable() {
        let modes = [
            OversamplingMode::Iir2x,
            OversamplingMode::Iir4x,
            OversamplingMode::Fir2x,
            OversamplingMode::Fir4x,
            OversamplingMode::Off,
        ];
        let mut chain = FilterChain::new(SR);
        chain.apply_model_profile(1);
        chain.apply_smoothed_filter_params(2000.0, 0.9);
        for mode in modes {
            chain.set_oversampling(mode);
            assert_eq!(chain.oversampling(), mode);
            for i in 0..4800 {
                let y = chain.process(0.5 * sinf(TAU * 220.0 * i as f32 / SR));
                assert!(y.is_finite() && y.abs() < 4.0, "{mode:?}: {y}");
            }
        }
    }

    #[test]
    fn fir_modes_report_latency() {
        let mut chain = FilterChain::new(SR);
        assert_eq!(chain.latency_samples(), 0);
        chain.set_oversampling(OversamplingMode::Fir2x);
        assert!(chain.latency_samples() > 0);
    }
}
