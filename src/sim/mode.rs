//! Locomotion modes and the transition table
//!
//! Exactly one `Mode` is active. Each variant carries only its own scratch
//! state, which is built fresh on entry. `next_mode` is the whole transition
//! table; `apply` runs it and performs the entry actions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Scenario;
use super::state::{Attachment, GameEvent, GameState, VehicleKind};
use crate::consts::{PLAYER_H, PLAYER_W};

/// Index into `GameState::vehicles`
pub type VehicleId = usize;

/// Balloon ride scratch state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ascent {
    pub vehicle: VehicleId,
    /// Offset from the mooring (negative is up)
    pub offset: f32,
    pub velocity: f32,
    /// Buffered scroll, consumed on the next tick
    pub scroll: f32,
}

impl Ascent {
    pub fn new(vehicle: VehicleId) -> Self {
        Self {
            vehicle,
            offset: 0.0,
            velocity: 0.0,
            scroll: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterPhase {
    Swoop,
    Hazard,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    FreeRun,
    VerticalCorridor {
        corridor_x: f32,
    },
    VehicleRising {
        ride: Ascent,
    },
    VehicleCruise {
        ride: Ascent,
    },
    ScriptedEncounter {
        vehicle: VehicleId,
        phase: EncounterPhase,
        timer: u32,
    },
    BallisticFall {
        /// Seconds since the basket gave way
        timer: f32,
        balloon: VehicleId,
    },
    ScriptedTrack {
        vehicle: VehicleId,
    },
    PortalTransit {
        vehicle: VehicleId,
        timer: u32,
    },
    CarDrive {
        vehicle: VehicleId,
        scroll: f32,
        /// Backing up far enough from here leaves the car
        boarded_x: f32,
    },
}

/// Fieldless mirror of `Mode` for logs, snapshots and trigger gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeKind {
    FreeRun,
    VerticalCorridor,
    VehicleRising,
    VehicleCruise,
    ScriptedEncounter,
    BallisticFall,
    ScriptedTrack,
    PortalTransit,
    CarDrive,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::FreeRun => ModeKind::FreeRun,
            Mode::VerticalCorridor { .. } => ModeKind::VerticalCorridor,
            Mode::VehicleRising { .. } => ModeKind::VehicleRising,
            Mode::VehicleCruise { .. } => ModeKind::VehicleCruise,
            Mode::ScriptedEncounter { .. } => ModeKind::ScriptedEncounter,
            Mode::BallisticFall { .. } => ModeKind::BallisticFall,
            Mode::ScriptedTrack { .. } => ModeKind::ScriptedTrack,
            Mode::PortalTransit { .. } => ModeKind::PortalTransit,
            Mode::CarDrive { .. } => ModeKind::CarDrive,
        }
    }

    /// The vehicle the player is riding or was last thrown from
    pub fn vehicle(&self) -> Option<VehicleId> {
        match *self {
            Mode::VehicleRising { ride } | Mode::VehicleCruise { ride } => Some(ride.vehicle),
            Mode::ScriptedEncounter { vehicle, .. }
            | Mode::ScriptedTrack { vehicle }
            | Mode::PortalTransit { vehicle, .. }
            | Mode::CarDrive { vehicle, .. } => Some(vehicle),
            Mode::BallisticFall { balloon, .. } => Some(balloon),
            Mode::FreeRun | Mode::VerticalCorridor { .. } => None,
        }
    }
}

impl ModeKind {
    /// Free-run variants where scroll applies immediately
    pub fn is_free(self) -> bool {
        matches!(self, ModeKind::FreeRun | ModeKind::VerticalCorridor)
    }

    pub fn is_balloon(self) -> bool {
        matches!(self, ModeKind::VehicleRising | ModeKind::VehicleCruise)
    }

    /// Modes with the fast, unclamped camera
    pub fn is_cinematic(self) -> bool {
        matches!(
            self,
            ModeKind::VehicleRising
                | ModeKind::VehicleCruise
                | ModeKind::ScriptedEncounter
                | ModeKind::BallisticFall
                | ModeKind::ScriptedTrack
                | ModeKind::PortalTransit
        )
    }

    /// Modes in which the balloon altitude still drives titles
    pub fn tracks_altitude(self) -> bool {
        self.is_balloon() || matches!(self, ModeKind::ScriptedEncounter | ModeKind::BallisticFall)
    }
}

/// Everything that can move the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeEvent {
    VehicleReached {
        vehicle: VehicleId,
        kind: VehicleKind,
        x: f32,
    },
    CorridorEntered {
        corridor_x: f32,
    },
    CorridorLeft,
    CruiseAltitude,
    AscentComplete,
    PhaseElapsed,
    Landed,
    TrackReached,
    Dismounted,
    TrackEnd,
    PortalElapsed,
}

/// The transition table. `None` means the event is ignored in this mode.
pub fn next_mode(mode: &Mode, event: &ModeEvent) -> Option<Mode> {
    use ModeEvent as E;

    let next = match (*mode, *event) {
        (
            Mode::FreeRun,
            E::VehicleReached {
                vehicle,
                kind: VehicleKind::Balloon,
                ..
            },
        ) => Mode::VehicleRising {
            ride: Ascent::new(vehicle),
        },
        (
            Mode::FreeRun,
            E::VehicleReached {
                vehicle,
                kind: VehicleKind::Car,
                x,
            },
        ) => Mode::CarDrive {
            vehicle,
            scroll: 0.0,
            boarded_x: x,
        },
        (Mode::FreeRun, E::CorridorEntered { corridor_x }) => Mode::VerticalCorridor { corridor_x },
        (Mode::VerticalCorridor { .. }, E::CorridorLeft) => Mode::FreeRun,
        (Mode::VehicleRising { ride }, E::CruiseAltitude) => Mode::VehicleCruise { ride },
        (Mode::VehicleRising { ride } | Mode::VehicleCruise { ride }, E::AscentComplete) => {
            Mode::ScriptedEncounter {
                vehicle: ride.vehicle,
                phase: EncounterPhase::Swoop,
                timer: 0,
            }
        }
        (Mode::ScriptedEncounter { vehicle, phase, .. }, E::PhaseElapsed) => match phase {
            EncounterPhase::Swoop => Mode::ScriptedEncounter {
                vehicle,
                phase: EncounterPhase::Hazard,
                timer: 0,
            },
            EncounterPhase::Hazard => Mode::ScriptedEncounter {
                vehicle,
                phase: EncounterPhase::Collapse,
                timer: 0,
            },
            EncounterPhase::Collapse => Mode::BallisticFall {
                timer: 0.0,
                balloon: vehicle,
            },
        },
        (Mode::BallisticFall { .. }, E::Landed) => Mode::FreeRun,
        (Mode::CarDrive { vehicle, .. }, E::TrackReached) => Mode::ScriptedTrack { vehicle },
        (Mode::CarDrive { .. }, E::Dismounted) => Mode::FreeRun,
        (Mode::ScriptedTrack { vehicle }, E::TrackEnd) => Mode::PortalTransit { vehicle, timer: 0 },
        (Mode::PortalTransit { .. }, E::PortalElapsed) => Mode::FreeRun,
        _ => return None,
    };
    Some(next)
}

/// Run `event` through the table; on a transition perform the entry actions,
/// publish `ModeChanged` and record it for this tick's triggers
pub fn apply(state: &mut GameState, scenario: &Scenario, event: ModeEvent) -> bool {
    let Some(next) = next_mode(&state.mode, &event) else {
        log::debug!("Ignoring {:?} in {:?}", event, state.mode.kind());
        return false;
    };
    let from = state.mode;
    enter(state, scenario, &from, &next);

    let (from_kind, to_kind) = (from.kind(), next.kind());
    if from_kind != to_kind {
        log::info!(
            "Mode {:?} -> {:?} at x={:.0}",
            from_kind,
            to_kind,
            state.player.pos.x
        );
        state.events.push(GameEvent::ModeChanged {
            from: from_kind,
            to: to_kind,
        });
        state.transition = Some((from_kind, to_kind));
    } else {
        log::debug!("{:?} advanced: {:?}", to_kind, next);
    }
    state.mode = next;
    true
}

fn enter(state: &mut GameState, scenario: &Scenario, from: &Mode, next: &Mode) {
    let tuning = &scenario.tuning;
    let story = &scenario.story;

    match (*from, *next) {
        (Mode::FreeRun, Mode::VehicleRising { ride }) => {
            let scale = state.player.scale;
            let Some(balloon) = state.vehicles.get_mut(ride.vehicle) else {
                return;
            };
            balloon.active = true;
            balloon.near = true;
            let offset = Vec2::new(
                -PLAYER_W * scale / 2.0,
                tuning.balloon.basket_floor * balloon.scale - PLAYER_H * scale,
            );
            state.player.attach(Attachment {
                vehicle: ride.vehicle,
                offset,
            });
            state.player.facing = 1.0;
            state.proximity_cooldown = tuning.balloon.cooldown_ticks;
            state.events.push(GameEvent::Popup {
                icon: "🎈".to_owned(),
                title: "UP AND AWAY!".to_owned(),
                desc: "To the new adventure".to_owned(),
            });
        }
        (Mode::FreeRun, Mode::CarDrive { vehicle, .. }) => {
            let Some(car) = state.vehicles.get_mut(vehicle) else {
                return;
            };
            car.active = true;
            car.near = true;
            car.vel = Vec2::ZERO;
            state.player.pos.x = car.pos.x;
            state.player.attach(Attachment {
                vehicle,
                offset: Vec2::new(0.0, -tuning.vehicle.car_seat_height),
            });
        }
        (Mode::FreeRun, Mode::VerticalCorridor { .. }) => {
            state.player.vel = Vec2::ZERO;
        }
        (_, Mode::ScriptedEncounter { .. }) => {
            state.player.vel = Vec2::ZERO;
        }
        (Mode::ScriptedEncounter { .. }, Mode::BallisticFall { balloon, .. }) => {
            if let Some(v) = state.vehicles.get_mut(balloon) {
                v.burning = true;
                v.active = false;
            }
            state.player.detach();
            let drift = (story.landing_x - state.player.pos.x) / tuning.cinematic.fall_drift_ticks;
            state.player.vel = Vec2::new(drift, tuning.cinematic.fall_launch_vy);
        }
        (Mode::BallisticFall { balloon, .. }, Mode::FreeRun) => {
            if let Some(v) = state.vehicles.get_mut(balloon) {
                v.burning = false;
            }
        }
        (Mode::CarDrive { .. }, Mode::ScriptedTrack { vehicle }) => {
            if let Some(car) = state.vehicles.get_mut(vehicle) {
                car.pos.y = story.track.track_y(car.pos.x);
            }
            state.player.attach(Attachment {
                vehicle,
                offset: Vec2::new(0.0, -tuning.vehicle.track_seat_height),
            });
        }
        (Mode::CarDrive { vehicle, .. }, Mode::FreeRun) => {
            if let Some(car) = state.vehicles.get_mut(vehicle) {
                car.active = false;
                car.vel = Vec2::ZERO;
            }
            state.player.detach();
            state.player.vel = Vec2::ZERO;
        }
        (Mode::ScriptedTrack { vehicle }, Mode::PortalTransit { .. }) => {
            if let Some(car) = state.vehicles.get_mut(vehicle) {
                car.vel = Vec2::ZERO;
            }
            state.player.vel = Vec2::ZERO;
        }
        (Mode::PortalTransit { vehicle, .. }, Mode::FreeRun) => {
            if let Some(car) = state.vehicles.get_mut(vehicle) {
                car.active = false;
                car.visible = false;
            }
            let teleport = story.teleport;
            state.player.detach();
            state.player.pos = Vec2::new(teleport.x, teleport.y);
            state.player.scale = teleport.scale;
            state.player.vel = Vec2::ZERO;
            log::info!("Teleported to ({}, {})", teleport.x, teleport.y);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Scenario;

    fn balloon_reached() -> ModeEvent {
        ModeEvent::VehicleReached {
            vehicle: 0,
            kind: VehicleKind::Balloon,
            x: 8250.0,
        }
    }

    #[test]
    fn test_table_free_run_entries() {
        assert!(matches!(
            next_mode(&Mode::FreeRun, &balloon_reached()),
            Some(Mode::VehicleRising { ride }) if ride.offset == 0.0 && ride.velocity == 0.0
        ));
        let car = ModeEvent::VehicleReached {
            vehicle: 1,
            kind: VehicleKind::Car,
            x: 14_200.0,
        };
        assert!(matches!(
            next_mode(&Mode::FreeRun, &car),
            Some(Mode::CarDrive { vehicle: 1, boarded_x, .. }) if boarded_x == 14_200.0
        ));
        assert!(matches!(
            next_mode(&Mode::FreeRun, &ModeEvent::CorridorEntered { corridor_x: 300.0 }),
            Some(Mode::VerticalCorridor { corridor_x }) if corridor_x == 300.0
        ));
    }

    #[test]
    fn test_table_ignores_invalid_events() {
        // Vehicle trigger while already riding
        let rising = Mode::VehicleRising {
            ride: Ascent::new(0),
        };
        assert_eq!(next_mode(&rising, &balloon_reached()), None);
        assert_eq!(next_mode(&Mode::FreeRun, &ModeEvent::Landed), None);
        assert_eq!(next_mode(&Mode::FreeRun, &ModeEvent::PortalElapsed), None);
        assert_eq!(
            next_mode(&Mode::ScriptedTrack { vehicle: 0 }, &ModeEvent::Dismounted),
            None
        );
        assert_eq!(
            next_mode(&Mode::VehicleCruise { ride: Ascent::new(0) }, &ModeEvent::CruiseAltitude),
            None
        );
    }

    #[test]
    fn test_encounter_phases_in_order() {
        let mut mode = Mode::VehicleCruise {
            ride: Ascent::new(0),
        };
        mode = next_mode(&mode, &ModeEvent::AscentComplete).unwrap();
        assert_eq!(
            mode,
            Mode::ScriptedEncounter {
                vehicle: 0,
                phase: EncounterPhase::Swoop,
                timer: 0
            }
        );
        mode = next_mode(&mode, &ModeEvent::PhaseElapsed).unwrap();
        assert!(matches!(
            mode,
            Mode::ScriptedEncounter {
                phase: EncounterPhase::Hazard,
                ..
            }
        ));
        mode = next_mode(&mode, &ModeEvent::PhaseElapsed).unwrap();
        assert!(matches!(
            mode,
            Mode::ScriptedEncounter {
                phase: EncounterPhase::Collapse,
                ..
            }
        ));
        mode = next_mode(&mode, &ModeEvent::PhaseElapsed).unwrap();
        assert_eq!(
            mode,
            Mode::BallisticFall {
                timer: 0.0,
                balloon: 0
            }
        );
        assert_eq!(next_mode(&mode, &ModeEvent::Landed), Some(Mode::FreeRun));
    }

    #[test]
    fn test_car_chain() {
        let drive = Mode::CarDrive {
            vehicle: 1,
            scroll: 0.0,
            boarded_x: 14_200.0,
        };
        let track = next_mode(&drive, &ModeEvent::TrackReached).unwrap();
        assert_eq!(track, Mode::ScriptedTrack { vehicle: 1 });
        let portal = next_mode(&track, &ModeEvent::TrackEnd).unwrap();
        assert_eq!(portal, Mode::PortalTransit { vehicle: 1, timer: 0 });
        assert_eq!(next_mode(&portal, &ModeEvent::PortalElapsed), Some(Mode::FreeRun));
        assert_eq!(next_mode(&drive, &ModeEvent::Dismounted), Some(Mode::FreeRun));
    }

    #[test]
    fn test_apply_records_transition_and_event() {
        let scenario = Scenario::nepal();
        let mut state = GameState::new(&scenario, 1);
        let balloon = state
            .vehicles
            .iter()
            .position(|v| v.kind == VehicleKind::Balloon)
            .unwrap();
        let event = ModeEvent::VehicleReached {
            vehicle: balloon,
            kind: VehicleKind::Balloon,
            x: 8250.0,
        };
        assert!(apply(&mut state, &scenario, event));
        assert_eq!(state.mode.kind(), ModeKind::VehicleRising);
        assert_eq!(
            state.transition,
            Some((ModeKind::FreeRun, ModeKind::VehicleRising))
        );
        assert!(state.events.contains(&GameEvent::ModeChanged {
            from: ModeKind::FreeRun,
            to: ModeKind::VehicleRising,
        }));
        assert_eq!(state.proximity_cooldown, 120);
        assert!(state.player.attachment.is_some());

        // A second trigger is ignored
        assert!(!apply(&mut state, &scenario, event));
    }
}
