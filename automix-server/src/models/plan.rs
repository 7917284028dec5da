use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Requested mixing character. Affects style selection and morph length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixMode {
    Festival,
    ClubSmooth,
    #[default]
    Neutral,
}

/// Transition shape selected by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    HardDownbeat,
    EqMorph,
    BassSwap,
    VocalAware,
    StutterEntry,
}

/// Transition effect kinds, named as they appear in plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FxKind {
    Sweep,
    ReverseVerb,
    TapeStop,
    Stutter,
}

/// One scheduled effect. `at_beat` is relative to the transition start and
/// may be negative (pre-roll). Parameters are an ordered map so serialized
/// plans are byte-identical for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxEvent {
    pub kind: FxKind,
    pub at_beat: f64,
    pub params: BTreeMap<String, f64>,
}

impl FxEvent {
    pub fn new(kind: FxKind, at_beat: f64, params: &[(&str, f64)]) -> Self {
        Self {
            kind,
            at_beat,
            params: params
                .iter()
                .map(|&(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    pub fn param(&self, key: &str) -> Option<f64> {
        self.params.get(key).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackRef {
    A,
    B,
}

/// Advisory tempo adjustment; the renderer may skip realization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoOp {
    pub track: TrackRef,
    pub stretch_percent: f64,
}

/// Advisory pitch adjustment; the renderer may skip realization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchOp {
    pub track: TrackRef,
    pub semitones: i32,
    pub formant_preserve: bool,
}

/// Concrete transition recipe handed from the planner to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPlan {
    pub style: TransitionStyle,
    /// Bar offset into track A where the transition starts.
    pub start_bar_a: usize,
    pub start_bar_b: usize,
    /// Transition length: 4, 8 or 16 bars.
    pub length_bars: u32,
    pub tempo_ops: Vec<TempoOp>,
    pub pitch_ops: Vec<PitchOp>,
    pub fx: Vec<FxEvent>,
}

/// Partial plan whose present fields replace computed ones field-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanOverride {
    pub style: Option<TransitionStyle>,
    pub start_bar_a: Option<usize>,
    pub start_bar_b: Option<usize>,
    pub length_bars: Option<u32>,
    pub tempo_ops: Option<Vec<TempoOp>>,
    pub pitch_ops: Option<Vec<PitchOp>>,
    pub fx: Option<Vec<FxEvent>>,
}

impl PlanOverride {
    /// Apply this override on top of a computed plan.
    pub fn apply(self, mut plan: TransitionPlan) -> TransitionPlan {
        if let Some(style) = self.style {
            plan.style = style;
        }
        if let Some(start_bar_a) = self.start_bar_a {
            plan.start_bar_a = start_bar_a;
        }
        if let Some(start_bar_b) = self.start_bar_b {
            plan.start_bar_b = start_bar_b;
        }
        if let Some(length_bars) = self.length_bars {
            plan.length_bars = length_bars;
        }
        if let Some(tempo_ops) = self.tempo_ops {
            plan.tempo_ops = tempo_ops;
        }
        if let Some(pitch_ops) = self.pitch_ops {
            plan.pitch_ops = pitch_ops;
        }
        if let Some(fx) = self.fx {
            plan.fx = fx;
        }
        plan
    }
}
