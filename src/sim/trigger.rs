//! Trigger registry
//!
//! One-shot and hysteresis-gated conditions evaluated against a `Probe` of
//! the current frame. Each trigger carries an effect payload that is handed
//! back when it fires; the registry never interprets it.

use serde::{Deserialize, Serialize};

use super::mode::ModeKind;

/// The slice of game state a trigger may look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub x: f32,
    /// Balloon offset from its mooring while riding one
    pub altitude: Option<f32>,
    pub mode: ModeKind,
    /// Transition applied during this tick, if any
    pub transition: Option<(ModeKind, ModeKind)>,
}

impl Probe {
    pub fn at(x: f32, mode: ModeKind) -> Self {
        Self {
            x,
            altitude: None,
            mode,
            transition: None,
        }
    }
}

/// When a trigger is satisfied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Activation {
    /// `|x - target| < radius`
    Near { target: f32, radius: f32 },
    /// `x > at`
    PastX { at: f32 },
    /// `min < x < max`
    BetweenX { min: f32, max: f32 },
    /// Riding a balloon whose offset is below `below`
    AltitudeBelow { below: f32 },
    InMode { mode: ModeKind },
    /// The tick's transition went `from -> to`
    Transition { from: ModeKind, to: ModeKind },
}

impl Activation {
    pub fn is_met(&self, probe: &Probe) -> bool {
        match *self {
            Activation::Near { target, radius } => (probe.x - target).abs() < radius,
            Activation::PastX { at } => probe.x > at,
            Activation::BetweenX { min, max } => probe.x > min && probe.x < max,
            Activation::AltitudeBelow { below } => probe.altitude.is_some_and(|a| a < below),
            Activation::InMode { mode } => probe.mode == mode,
            Activation::Transition { from, to } => probe.transition == Some((from, to)),
        }
    }

    /// Whether the subject is far enough away for a fired trigger to re-arm
    fn has_cleared(&self, probe: &Probe, margin: f32) -> bool {
        match *self {
            Activation::Near { target, radius } => (probe.x - target).abs() > radius + margin,
            _ => !self.is_met(probe),
        }
    }
}

/// How a fired trigger becomes armed again
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rearm {
    Never,
    /// Re-arm once the subject is `margin` beyond the activation region
    Beyond { margin: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger<E> {
    pub id: String,
    pub activation: Activation,
    pub rearm: Rearm,
    /// Only evaluated (fire or re-arm) while this mode is active
    pub only_in: Option<ModeKind>,
    pub effect: E,
    armed: bool,
    fire_count: u32,
}

impl<E> Trigger<E> {
    pub fn new(id: impl Into<String>, activation: Activation, rearm: Rearm, effect: E) -> Self {
        Self {
            id: id.into(),
            activation,
            rearm,
            only_in: None,
            effect,
            armed: true,
            fire_count: 0,
        }
    }

    pub fn only_in(mut self, mode: ModeKind) -> Self {
        self.only_in = Some(mode);
        self
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }
}

/// Ordered set of triggers; evaluation order is registration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRegistry<E> {
    triggers: Vec<Trigger<E>>,
}

impl<E> Default for TriggerRegistry<E> {
    fn default() -> Self {
        Self {
            triggers: Vec::new(),
        }
    }
}

impl<E: Clone> TriggerRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trigger; returns false (and keeps the original) on a duplicate id
    pub fn register(&mut self, trigger: Trigger<E>) -> bool {
        if self.get(&trigger.id).is_some() {
            return false;
        }
        self.triggers.push(trigger);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Trigger<E>> {
        self.triggers.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Whether `id` has fired and not re-armed since
    pub fn is_fired(&self, id: &str) -> bool {
        self.get(id).is_some_and(|t| !t.armed)
    }

    /// Fire `id` directly, bypassing its activation. Returns `None` if it is
    /// unknown or already fired.
    pub fn fire(&mut self, id: &str) -> Option<E> {
        let trigger = self.triggers.iter_mut().find(|t| t.id == id)?;
        if !trigger.armed {
            return None;
        }
        trigger.armed = false;
        trigger.fire_count += 1;
        Some(trigger.effect.clone())
    }

    /// Evaluate every trigger against `probe` and collect the effects that
    /// fired, in registration order
    pub fn evaluate(&mut self, probe: &Probe) -> Vec<E> {
        let mut fired = Vec::new();
        for trigger in &mut self.triggers {
            if trigger.only_in.is_some_and(|mode| mode != probe.mode) {
                continue;
            }
            if trigger.armed {
                if trigger.activation.is_met(probe) {
                    trigger.armed = false;
                    trigger.fire_count += 1;
                    log::debug!("Trigger {} fired at x={:.0}", trigger.id, probe.x);
                    fired.push(trigger.effect.clone());
                }
            } else if let Rearm::Beyond { margin } = trigger.rearm {
                if trigger.activation.has_cleared(probe, margin) {
                    trigger.armed = true;
                }
            }
        }
        fired
    }

    /// Re-arm everything (run restart)
    pub fn reset(&mut self) {
        for trigger in &mut self.triggers {
            trigger.armed = true;
            trigger.fire_count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn near(id: &str, target: f32) -> Trigger<&'static str> {
        Trigger::new(
            id,
            Activation::Near {
                target,
                radius: 300.0,
            },
            Rearm::Beyond { margin: 200.0 },
            "hello",
        )
    }

    #[test]
    fn test_near_fires_once_per_approach() {
        let mut reg = TriggerRegistry::new();
        reg.register(near("d_start", 1000.0));

        assert!(reg.evaluate(&Probe::at(500.0, ModeKind::FreeRun)).is_empty());
        assert_eq!(reg.evaluate(&Probe::at(800.0, ModeKind::FreeRun)), vec!["hello"]);
        // Still inside, and inside the hysteresis band
        assert!(reg.evaluate(&Probe::at(1000.0, ModeKind::FreeRun)).is_empty());
        assert!(reg.evaluate(&Probe::at(1450.0, ModeKind::FreeRun)).is_empty());
        assert!(reg.evaluate(&Probe::at(1000.0, ModeKind::FreeRun)).is_empty());
        // Leave past radius + margin, then come back
        assert!(reg.evaluate(&Probe::at(1501.0, ModeKind::FreeRun)).is_empty());
        assert_eq!(reg.evaluate(&Probe::at(1200.0, ModeKind::FreeRun)), vec!["hello"]);
        assert_eq!(reg.get("d_start").map(|t| t.fire_count()), Some(2));
    }

    #[test]
    fn test_never_rearm_is_strict_one_shot() {
        let mut reg = TriggerRegistry::new();
        reg.register(Trigger::new("summary", Activation::PastX { at: 2910.0 }, Rearm::Never, 0u8));
        assert_eq!(reg.evaluate(&Probe::at(3000.0, ModeKind::FreeRun)), vec![0]);
        assert!(reg.evaluate(&Probe::at(0.0, ModeKind::FreeRun)).is_empty());
        assert!(reg.evaluate(&Probe::at(3000.0, ModeKind::FreeRun)).is_empty());
        assert!(reg.is_fired("summary"));
    }

    #[test]
    fn test_mode_gate_blocks_fire_and_rearm() {
        let mut reg = TriggerRegistry::new();
        reg.register(near("gated", 0.0).only_in(ModeKind::FreeRun));

        assert!(reg.evaluate(&Probe::at(0.0, ModeKind::CarDrive)).is_empty());
        assert_eq!(reg.evaluate(&Probe::at(0.0, ModeKind::FreeRun)).len(), 1);
        // Far away, but gated: must not re-arm
        reg.evaluate(&Probe::at(5000.0, ModeKind::CarDrive));
        assert!(reg.is_fired("gated"));
        reg.evaluate(&Probe::at(5000.0, ModeKind::FreeRun));
        assert!(!reg.is_fired("gated"));
    }

    #[test]
    fn test_altitude_needs_a_ride() {
        let mut reg = TriggerRegistry::new();
        reg.register(Trigger::new(
            "high",
            Activation::AltitudeBelow { below: -2550.0 },
            Rearm::Never,
            (),
        ));
        let mut probe = Probe::at(8250.0, ModeKind::VehicleCruise);
        assert!(reg.evaluate(&probe).is_empty());
        probe.altitude = Some(-2000.0);
        assert!(reg.evaluate(&probe).is_empty());
        probe.altitude = Some(-2600.0);
        assert_eq!(reg.evaluate(&probe).len(), 1);
    }

    #[test]
    fn test_transition_activation() {
        let mut reg = TriggerRegistry::new();
        reg.register(Trigger::new(
            "landed",
            Activation::Transition {
                from: ModeKind::BallisticFall,
                to: ModeKind::FreeRun,
            },
            Rearm::Never,
            3usize,
        ));
        let mut probe = Probe::at(10_400.0, ModeKind::FreeRun);
        assert!(reg.evaluate(&probe).is_empty());
        probe.transition = Some((ModeKind::BallisticFall, ModeKind::FreeRun));
        assert_eq!(reg.evaluate(&probe), vec![3]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut reg = TriggerRegistry::new();
        assert!(reg.register(near("a", 0.0)));
        assert!(!reg.register(near("a", 10.0)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_manual_fire_and_reset() {
        let mut reg = TriggerRegistry::new();
        reg.register(near("a", 0.0));
        assert_eq!(reg.fire("a"), Some("hello"));
        assert_eq!(reg.fire("a"), None);
        assert_eq!(reg.fire("missing"), None);
        reg.reset();
        assert!(!reg.is_fired("a"));
    }

    proptest! {
        #[test]
        fn prop_near_never_fires_twice_without_leaving(xs in prop::collection::vec(-2000.0f32..2000.0, 1..200)) {
            let mut reg = TriggerRegistry::new();
            reg.register(near("t", 0.0));
            let mut left_since_fire = true;
            for x in xs {
                let fired = !reg.evaluate(&Probe::at(x, ModeKind::FreeRun)).is_empty();
                if fired {
                    prop_assert!(left_since_fire);
                    left_since_fire = false;
                }
                if x.abs() > 500.0 {
                    left_since_fire = true;
                }
            }
        }
    }
}
