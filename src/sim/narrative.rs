//! Narrative sequencer
//!
//! Feeds the frame's probe to the beat registry and applies whatever fired:
//! dialogue, floating labels, chapter summary boards and the story door.

use glam::Vec2;

use super::Scenario;
use super::mode::ModeKind;
use super::state::{FloatingLabel, GameEvent, GameState, SummaryBoard};
use super::story::{BeatEffect, BoardEntry};
use super::trigger::Probe;
use super::world::CollectibleKind;
use crate::consts::*;

/// Count down dialogue, evaluate beats, then refresh board visibility
pub fn update(state: &mut GameState, scenario: &Scenario) {
    if let Some(dialogue) = state.dialogue.as_mut() {
        dialogue.remaining = dialogue.remaining.saturating_sub(1);
        if dialogue.remaining == 0 {
            state.dialogue = None;
        }
    }

    let probe = Probe {
        x: state.player.pos.x,
        altitude: state.altitude(),
        mode: state.mode.kind(),
        transition: state.transition,
    };
    for effect in state.beats.evaluate(&probe) {
        apply(state, scenario, effect);
    }

    let kind = state.mode.kind();
    let cinematic = kind.is_balloon() || kind == ModeKind::BallisticFall;
    let x = state.player.pos.x;
    for board in state.boards.iter_mut() {
        let passed = scenario
            .story
            .chapter(board.chapter)
            .and_then(|c| c.hide_past_x)
            .is_some_and(|hide| x > hide);
        board.hidden = passed || cinematic;
    }
}

fn apply(state: &mut GameState, scenario: &Scenario, effect: BeatEffect) {
    match effect {
        BeatEffect::Dialogue { text, ticks } => state.show_dialogue(&text, ticks),
        BeatEffect::Label { text, color } => {
            let pos = Vec2::new(state.player.pos.x, state.player.pos.y - 100.0);
            state.labels.push(FloatingLabel {
                pos,
                text,
                color,
                life: 2.0,
            });
        }
        BeatEffect::Summary { chapter, board_x } => {
            if let Some(board) = compose_summary(state, scenario, chapter, board_x) {
                log::info!("Chapter {} summary: {}/{} items", chapter, board.items.len(), board.total_items);
                state.boards.push(board);
                state.events.push(GameEvent::SummaryOpened { chapter });
            }
        }
        BeatEffect::Door {
            exit_x,
            camera_center_x,
            text,
            ticks,
        } => {
            log::info!("Door from x={:.0} to x={:.0}", state.player.pos.x, exit_x);
            state.player.pos.x = exit_x;
            state.player.vel.x = 0.0;
            state.camera.pos.x = camera_center_x - VIEW_W / 2.0;
            state.show_dialogue(&text, ticks);
        }
    }
}

/// Build the recap board for `chapter` from what has been collected so far
pub fn compose_summary(
    state: &GameState,
    scenario: &Scenario,
    chapter: usize,
    board_x: f32,
) -> Option<SummaryBoard> {
    let Some(rules) = scenario.story.chapter(chapter) else {
        log::warn!("No chapter {} in the story; summary skipped", chapter);
        return None;
    };
    let owned: Vec<_> = scenario
        .world
        .collectibles
        .iter()
        .filter(|c| rules.owns(c.x))
        .collect();
    let total_items = owned.len();
    let collected: Vec<_> = owned
        .into_iter()
        .filter(|c| state.collected.contains(&c.id))
        .collect();

    let entry = |c: &super::world::Collectible| BoardEntry {
        skill: c.skill.clone(),
        label: c.label.clone(),
        desc: c.desc.clone(),
        kind: Some(c.kind),
    };
    let items: Vec<BoardEntry> = collected.iter().map(|&c| entry(c)).collect();
    let (skills, certificates) = match &rules.showcase {
        Some(showcase) => (showcase.clone(), Vec::new()),
        None => (
            collected
                .iter()
                .filter(|c| c.skill.is_some())
                .map(|&c| entry(c))
                .collect(),
            collected
                .iter()
                .filter(|&&c| {
                    c.kind == CollectibleKind::Scroll
                        || (c.kind == CollectibleKind::Gem && c.skill.is_none())
                })
                .map(|&c| entry(c))
                .collect(),
        ),
    };

    let world_y = if state.mode.kind().is_balloon() {
        state.player.pos.y - 400.0
    } else {
        state.camera.pos.y + 120.0
    };

    Some(SummaryBoard {
        chapter,
        name: rules.name.clone(),
        world_x: board_x,
        world_y,
        items,
        total_items,
        skills,
        certificates,
        spawn_time: state.time,
        hidden: false,
    })
}

/// HUD chapter title for the current frame
pub fn chapter_title<'a>(state: &GameState, scenario: &'a Scenario) -> &'a str {
    scenario
        .story
        .titles
        .title_for(state.player.pos.x, state.mode.kind(), state.altitude())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mode::{Ascent, Mode};
    use crate::sim::state::RunPhase;

    fn playing() -> (Scenario, GameState) {
        let scenario = Scenario::nepal();
        let mut state = GameState::new(&scenario, 11);
        state.run = RunPhase::Playing;
        (scenario, state)
    }

    #[test]
    fn test_opening_dialogue_and_countdown() {
        let (scenario, mut state) = playing();
        update(&mut state, &scenario);
        let dialogue = state.dialogue.clone().expect("opening line");
        assert!(dialogue.text.starts_with("Welcome"));
        assert_eq!(dialogue.remaining, 240);
        for _ in 0..240 {
            update(&mut state, &scenario);
        }
        assert!(state.dialogue.is_none());
    }

    #[test]
    fn test_summary_counts_only_chapter_items() {
        let (scenario, mut state) = playing();
        // Two skill-world items and one from Makura
        state.collected.extend([1, 3, 5]);
        let board = compose_summary(&state, &scenario, 0, 2910.0).expect("chapter 0");
        assert_eq!(board.items.len(), 2);
        assert_eq!(board.total_items, 5);
        assert_eq!(board.skills.len(), 1);
        assert_eq!(board.certificates.len(), 1);
        assert_eq!(board.world_x, 2910.0);
        assert_eq!(board.world_y, 120.0);
    }

    #[test]
    fn test_showcase_chapter_replaces_skills() {
        let (scenario, mut state) = playing();
        state.collected.extend(0..23);
        let board = compose_summary(&state, &scenario, 3, 10_400.0).expect("chapter 3");
        assert!(board.certificates.is_empty());
        assert_eq!(
            Some(&board.skills),
            scenario.story.chapters[3].showcase.as_ref()
        );
    }

    #[test]
    fn test_unknown_chapter_is_skipped() {
        let (scenario, state) = playing();
        assert!(compose_summary(&state, &scenario, 99, 0.0).is_none());
    }

    #[test]
    fn test_summary_milestone_fires_once() {
        let (scenario, mut state) = playing();
        state.player.pos.x = 3000.0;
        update(&mut state, &scenario);
        assert_eq!(state.boards.len(), 1);
        assert!(state.events.contains(&GameEvent::SummaryOpened { chapter: 0 }));
        state.player.pos.x = 100.0;
        update(&mut state, &scenario);
        state.player.pos.x = 3000.0;
        update(&mut state, &scenario);
        assert_eq!(state.boards.len(), 1);
    }

    #[test]
    fn test_boards_hide_in_balloon_and_past_chapter() {
        let (scenario, mut state) = playing();
        state.player.pos.x = 3000.0;
        update(&mut state, &scenario);
        assert!(!state.boards[0].hidden);

        state.mode = Mode::VehicleRising {
            ride: Ascent::new(0),
        };
        update(&mut state, &scenario);
        assert!(state.boards[0].hidden);

        state.mode = Mode::FreeRun;
        state.player.pos.x = 4200.0;
        update(&mut state, &scenario);
        assert!(state.boards[0].hidden);
        // Still present, only hidden
        assert_eq!(state.boards.len(), 1);
    }

    #[test]
    fn test_door_moves_player_and_camera() {
        let (scenario, mut state) = playing();
        state.player.pos.x = 4095.0;
        update(&mut state, &scenario);
        assert_eq!(state.player.pos.x, 4400.0);
        assert_eq!(state.camera.pos.x, 4965.0 - VIEW_W / 2.0);
        assert!(state
            .dialogue
            .as_ref()
            .is_some_and(|d| d.text.starts_with("Time to Learn")));
    }

    #[test]
    fn test_fall_landing_opens_design_manager_board() {
        let (scenario, mut state) = playing();
        state.player.pos.x = 10_400.0;
        state.transition = Some((ModeKind::BallisticFall, ModeKind::FreeRun));
        update(&mut state, &scenario);
        assert!(state.boards.iter().any(|b| b.chapter == 3 && b.world_x == 10_400.0));
    }

    #[test]
    fn test_knowledge_label_beat() {
        let (scenario, mut state) = playing();
        state.player.pos = Vec2::new(52_100.0, 520.0);
        update(&mut state, &scenario);
        assert!(state
            .labels
            .iter()
            .any(|l| l.text.starts_with("ABSORBING") && l.life == 2.0));
    }

    #[test]
    fn test_title_follows_mode() {
        let (scenario, mut state) = playing();
        state.mode = Mode::ScriptedTrack { vehicle: 1 };
        assert_eq!(chapter_title(&state, &scenario), "BARAHI ROLLER COASTER");
    }
}
