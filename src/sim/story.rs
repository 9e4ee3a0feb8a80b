//! Story timeline
//!
//! Every world-position threshold the narrative depends on lives here rather
//! than inline in the update code: dialogue beats, chapter milestones, title
//! bands, the coaster track shape and the teleport target.

use serde::{Deserialize, Serialize};

use super::mode::ModeKind;
use super::trigger::{Activation, Rearm, Trigger};
use super::world::CollectibleKind;
use crate::consts::{GROUND_Y, SURFACE_LIP};
use crate::error::ConfigError;

/// What a beat does when its trigger fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BeatEffect {
    Dialogue { text: String, ticks: u32 },
    /// Floating label above the player
    Label { text: String, color: u32 },
    /// Open a chapter summary board at `board_x`
    Summary { chapter: usize, board_x: f32 },
    /// Step through a door: move the player, snap the camera, speak
    Door {
        exit_x: f32,
        camera_center_x: f32,
        text: String,
        ticks: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub id: String,
    pub activation: Activation,
    pub rearm: Rearm,
    #[serde(default)]
    pub only_in: Option<ModeKind>,
    pub effect: BeatEffect,
}

impl Beat {
    pub fn to_trigger(&self) -> Trigger<BeatEffect> {
        let trigger = Trigger::new(self.id.clone(), self.activation, self.rearm, self.effect.clone());
        match self.only_in {
            Some(mode) => trigger.only_in(mode),
            None => trigger,
        }
    }
}

/// A line on a summary board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    #[serde(default)]
    pub skill: Option<String>,
    pub label: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub kind: Option<CollectibleKind>,
}

/// A chapter's summary composition rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub name: String,
    /// Half-open authored x-ranges whose items belong to this chapter
    pub ranges: Vec<(f32, f32)>,
    /// Board is hidden once the player passes this x
    #[serde(default)]
    pub hide_past_x: Option<f32>,
    /// Fixed skill list replacing the collected ones (and no certificates)
    #[serde(default)]
    pub showcase: Option<Vec<BoardEntry>>,
}

impl Chapter {
    pub fn owns(&self, x: f32) -> bool {
        self.ranges.iter().any(|&(start, end)| x >= start && x < end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleBand {
    /// Applies while x is below this bound
    pub until_x: f32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeTitle {
    /// Applies while the balloon offset is below this
    pub below: f32,
    pub title: String,
}

/// HUD chapter titles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Titles {
    pub bands: Vec<TitleBand>,
    /// Past the last band
    pub last: String,
    pub by_mode: Vec<(ModeKind, String)>,
    /// Altitude titles only apply above this offset
    pub altitude_from: f32,
    /// Checked in order; `altitude_default` if none match
    pub by_altitude: Vec<AltitudeTitle>,
    pub altitude_default: String,
}

impl Titles {
    pub fn title_for(&self, x: f32, mode: ModeKind, altitude: Option<f32>) -> &str {
        if let Some(alt) = altitude.filter(|&a| a < self.altitude_from) {
            return self
                .by_altitude
                .iter()
                .find(|t| alt < t.below)
                .map(|t| t.title.as_str())
                .unwrap_or(&self.altitude_default);
        }
        if let Some((_, title)) = self.by_mode.iter().find(|(m, _)| *m == mode) {
            return title;
        }
        self.bands
            .iter()
            .find(|b| x < b.until_x)
            .map(|b| b.title.as_str())
            .unwrap_or(&self.last)
    }
}

/// The on-rails roller-coaster profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub start_x: f32,
    pub end_x: f32,
    /// Past this x the ride brakes toward the portal
    pub brake_x: f32,
    pub baseline: f32,
    pub ramp_len: f32,
    pub lift: f32,
    pub wave_freq: f32,
    pub wave_amp: f32,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            start_x: 20_000.0,
            end_x: 35_000.0,
            brake_x: 34_000.0,
            baseline: GROUND_Y - SURFACE_LIP,
            ramp_len: 800.0,
            lift: 100.0,
            wave_freq: 0.006,
            wave_amp: 80.0,
        }
    }
}

impl Track {
    /// Rail height at `x`
    pub fn track_y(&self, x: f32) -> f32 {
        if x < self.start_x {
            return self.baseline;
        }
        let rel = x - self.start_x;
        let ramp = (rel / self.ramp_len).min(1.0);
        let y = self.baseline - self.lift * ramp + (rel * self.wave_freq).sin() * self.wave_amp * ramp;
        y.min(self.baseline)
    }

    /// Rail angle at `x` (positive is downhill to the right)
    pub fn slope(&self, x: f32) -> f32 {
        (self.track_y(x + 10.0) - self.track_y(x)).atan2(10.0)
    }
}

/// Where the portal drops the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Teleport {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// Leftward camera cap before the first door
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraHold {
    pub until_x: f32,
    pub max_center_x: f32,
}

/// Words streamed at the player in one stretch of the void
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBand {
    pub start: f32,
    pub end: f32,
    pub words: Vec<String>,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryTimeline {
    pub beats: Vec<Beat>,
    pub chapters: Vec<Chapter>,
    pub titles: Titles,
    pub track: Track,
    pub teleport: Teleport,
    pub camera_hold: CameraHold,
    /// Lower speed cap from here on
    pub heavy_from_x: f32,
    /// Giant base scale and flat camera from here on
    pub giant_from_x: f32,
    /// Only items authored left of this grow the player
    pub growth_before_x: f32,
    /// Where the fall lands
    pub landing_x: f32,
    pub landing_y: f32,
    /// Crossing this ends the run
    pub end_x: f32,
    pub knowledge: Vec<KnowledgeBand>,
}

impl StoryTimeline {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let story: StoryTimeline = serde_json::from_str(json)?;
        story.validate()?;
        Ok(story)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::BTreeSet::new();
        for beat in &self.beats {
            if !seen.insert(beat.id.as_str()) {
                return Err(ConfigError::DuplicateBeat(beat.id.clone()));
            }
        }
        Ok(())
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn knowledge_band(&self, x: f32) -> Option<&KnowledgeBand> {
        self.knowledge.iter().find(|b| x >= b.start && x <= b.end)
    }

    /// The Nepal journey
    pub fn nepal() -> Self {
        let mut beats = Vec::new();

        for (id, text, x) in [
            ("d_start", "Welcome to the story\nof my portfolio!", 200.0),
            ("d_journey", "Its an 11 year journey -\nkeep scrolling till the end", 2108.0),
            ("d_chasing", "Learn Hard. Work Harder.\nChase the dream", 5540.0),
            ("d_growth", "I need growth.\nTime to soar for new heights", 7705.0),
        ] {
            beats.push(Beat {
                only_in: Some(ModeKind::FreeRun),
                ..near(id, text, x)
            });
        }

        for (id, text, below) in [
            ("d_dream_close", "I can see it.\nI am close to achieve my dream", -2550.0),
            ("d_almost_there", "almost there,\ni can almost catch it", -3670.0),
            ("d_grab_it", "Here it is!\nI will grab it any moment now", -4420.0),
        ] {
            beats.push(once(id, Activation::AltitudeBelow { below }, dialogue(text, 240)));
        }

        beats.push(once(
            "summary_background",
            Activation::PastX { at: 2910.0 },
            BeatEffect::Summary {
                chapter: 0,
                board_x: 2910.0,
            },
        ));
        beats.push(once(
            "summary_creative",
            Activation::PastX { at: 7000.0 },
            BeatEffect::Summary {
                chapter: 1,
                board_x: 7050.0,
            },
        ));
        beats.push(once(
            "summary_design_manager",
            Activation::Transition {
                from: ModeKind::BallisticFall,
                to: ModeKind::FreeRun,
            },
            BeatEffect::Summary {
                chapter: 3,
                board_x: 10_400.0,
            },
        ));
        beats.push(once(
            "d_huh",
            Activation::InMode {
                mode: ModeKind::BallisticFall,
            },
            dialogue("HUH????????", 180),
        ));

        for (id, text, x) in [
            ("cb_m1", "HUH?? I was right there.\nI was this close,", 10_450.0),
            ("cb_m2", "My dream was just within\nmy arms length.", 10_950.0),
            ("cb_m3", "Now I don't know where I am\nor how to reach there back again.", 11_450.0),
            ("cb_m4", "It has been delayed again.", 11_950.0),
            ("cb_m5", "Should I go abroad?\nShould I start something?....", 12_450.0),
            ("cb_m6", "I know what i should do.\nI should not stay doing nothing.", 12_950.0),
            ("cb_m7", "I will hop on any opportunity\nI get and start fresh.", 13_450.0),
        ] {
            // The fall pins the player over the first of these
            beats.push(Beat {
                only_in: Some(ModeKind::FreeRun),
                ..near(id, text, x)
            });
        }

        for (id, text, x) in [
            (
                "cb_barahi_intro",
                "Hospitality & Service - I wonder how this\nindustry is. Its exciting! Lets gooo!",
                15_000.0,
            ),
            ("d_barahi_work", "Not so different than how\ni was working.", 17_600.0),
            ("d_barahi_places", "I got to go to Pokhara and\nchitwan. Nice places", 18_700.0),
            ("d_barahi_comfort", "I am getting comfortable in\nthis new industry", 19_500.0),
        ] {
            beats.push(near(id, text, x));
        }

        beats.push(once(
            "d_coaster_shock",
            Activation::BetweenX {
                min: 26_000.0,
                max: 30_000.0,
            },
            dialogue("!!!!!!!! Whats happening!!!!!!!!\nNOT AGAIN !!!!!!", 180),
        ));

        for (id, text, at, color) in [
            ("k1", "ABSORBING: PROGRAMMING...", 52_000.0, 0x00ffff),
            ("k2", "ABSORBING: GEN AI...", 53_000.0, 0xff00ff),
            ("k3", "ABSORBING: DEVELOPMENT...", 54_000.0, 0xffff00),
        ] {
            beats.push(once(
                id,
                Activation::PastX { at },
                BeatEffect::Label {
                    text: text.to_owned(),
                    color,
                },
            ));
        }

        for (id, text, at, ticks) in [
            ("ai_m1", "Where am I? What is this place?\nWhat is this... thing coming towards me?", 52_550.0, 480),
            ("ai_m2", "Move me faster. Scroll. Scroll faster!\nGet these things away from me!", 53_200.0, 400),
            ("ai_m3", "...Wait. These things. I know them.\nMy 5% programming knowledge... it’s pulsing.", 53_900.0, 480),
            ("ai_m4", "It’s getting stronger. Are these... codes?\nThe skills I neglected are surging, evolving.", 54_700.0, 480),
            ("ai_m5", "I can not only design now,\nI can bring it to life.", 55_600.0, 480),
            ("ai_m6", "The possibilities are truly endless.\nThis power. This knowledge.", 56_500.0, 400),
            ("ai_m7", "So, all that time choosing design over\ncoding was the right path all along?", 57_200.0, 480),
            ("ai_m8", "The world has changed. I should too.\nI’m going to explore this new AI age.", 58_000.0, 480),
            ("ai_m9", "Am i now a designer ? Or a developer?\nI think I have become both.", 58_800.0, 400),
            ("ai_m10", "AI is as terrifying as it is exciting.", 59_500.0, 400),
            (
                "ai_m10b",
                "Anthropic’s CEO claims developers will be obsolete\nin 6 to 12 months; Elon says coding as we know it is dying...",
                59_850.0,
                550,
            ),
            ("ai_m11", "The future is not about writing lines,\nit’s about bringing ideas to functional reality.", 60_200.0, 600),
            ("ai_m12", "Thank you for staying with me until the end.", 60_850.0, 300),
        ] {
            beats.push(once(id, Activation::PastX { at }, dialogue(text, ticks)));
        }

        beats.push(once(
            "makura_door",
            Activation::BetweenX {
                min: 4090.0,
                max: 4400.0,
            },
            BeatEffect::Door {
                exit_x: 4400.0,
                camera_center_x: 4965.0,
                text: "Time to Learn and\ngain Experience".to_owned(),
                ticks: 240,
            },
        ));

        let chapters = vec![
            Chapter {
                name: "Background".to_owned(),
                ranges: vec![(f32::MIN, 4000.0)],
                hide_past_x: Some(4100.0),
                showcase: None,
            },
            Chapter {
                name: "Creative Designer".to_owned(),
                ranges: vec![(4000.0, 8200.0)],
                hide_past_x: Some(8400.0),
                showcase: None,
            },
            Chapter {
                name: "2018 - Daraz - Sr. Graphics Designer".to_owned(),
                ranges: vec![(8200.0, 10_400.0)],
                hide_past_x: Some(14_000.0),
                showcase: None,
            },
            Chapter {
                name: "Design Manager".to_owned(),
                ranges: vec![(10_400.0, 16_400.0), (8100.0, 8400.0)],
                hide_past_x: None,
                showcase: Some(
                    [
                        ("ps", "Photoshop"),
                        ("ai", "Illustrator"),
                        ("ae", "After effects"),
                        ("pr", "Premiere Pro"),
                        ("xd", "Figma"),
                        ("code", "Programming"),
                    ]
                    .into_iter()
                    .map(|(skill, label)| BoardEntry {
                        skill: Some(skill.to_owned()),
                        label: label.to_owned(),
                        desc: String::new(),
                        kind: None,
                    })
                    .collect(),
                ),
            },
            Chapter {
                name: "AI Horizon".to_owned(),
                ranges: vec![(51_000.0, 1.0e9)],
                hide_past_x: None,
                showcase: None,
            },
        ];

        let bands = [
            (4000.0, "2015 - BSc. CSIT Student"),
            (5580.0, "2015 - Intern - Makura Creations"),
            (6380.0, "2016 - Graphics Designer"),
            (7705.0, "2017 - Creative Designer"),
            (8400.0, "2018 - Creative Designer"),
            (10_400.0, "2018 - Daraz - Sr. Graphics Designer"),
            (17_000.0, "Career Break - Finding Purpose"),
            (19_760.0, "2024 - Barahi Hospitality & Leisure"),
            (35_000.0, "2025 - Barahi Hospitality & Leisure"),
        ]
        .into_iter()
        .map(|(until_x, title)| TitleBand {
            until_x,
            title: title.to_owned(),
        })
        .collect();

        let titles = Titles {
            bands,
            last: "2026 - AI & Future".to_owned(),
            by_mode: vec![
                (ModeKind::ScriptedTrack, "BARAHI ROLLER COASTER".to_owned()),
                (ModeKind::PortalTransit, "AI VENTURE".to_owned()),
            ],
            altitude_from: -600.0,
            by_altitude: vec![
                AltitudeTitle {
                    below: -4420.0,
                    title: "2024 - Design Manager".to_owned(),
                },
                AltitudeTitle {
                    below: -2200.0,
                    title: "2022 - Design Manager".to_owned(),
                },
            ],
            altitude_default: "2018 - Daraz - Sr. Graphics Designer".to_owned(),
        };

        let words = |list: &[&str]| list.iter().map(|w| (*w).to_owned()).collect();
        let knowledge = vec![
            KnowledgeBand {
                start: 52_000.0,
                end: 53_500.0,
                words: words(&[
                    "Python", "JS", "Rust", "C++", "DataStruct", "Algo", "Binary", "{ }", "API", "Code",
                ]),
                color: 0x00ffff,
            },
            KnowledgeBand {
                start: 53_500.0,
                end: 54_500.0,
                words: words(&[
                    "LLM", "GPT-4", "RAG", "Transformer", "FineTune", "Prompt", "Token", "Vector", "AI",
                ]),
                color: 0xff00ff,
            },
            KnowledgeBand {
                start: 54_500.0,
                end: 200_000.0,
                words: words(&[
                    "Next.js",
                    "React",
                    "Cloud",
                    "K8s",
                    "Docker",
                    "Scale",
                    "Postgres",
                    "API",
                    "Deploy",
                    "System Design",
                    "Architecture",
                    "DevOps",
                    "CI/CD",
                ]),
                color: 0xffff00,
            },
        ];

        Self {
            beats,
            chapters,
            titles,
            track: Track::default(),
            teleport: Teleport {
                x: 52_500.0,
                y: 520.0,
                scale: 3.2,
            },
            camera_hold: CameraHold {
                until_x: 4100.0,
                max_center_x: 3450.0,
            },
            heavy_from_x: 10_400.0,
            giant_from_x: 25_000.0,
            growth_before_x: 4000.0,
            landing_x: 10_400.0,
            landing_y: 790.0,
            end_x: 62_000.0,
            knowledge,
        }
    }
}

fn dialogue(text: &str, ticks: u32) -> BeatEffect {
    BeatEffect::Dialogue {
        text: text.to_owned(),
        ticks,
    }
}

/// Re-arming proximity beat with the default radius and margin
fn near(id: &str, text: &str, target: f32) -> Beat {
    Beat {
        id: id.to_owned(),
        activation: Activation::Near {
            target,
            radius: 300.0,
        },
        rearm: Rearm::Beyond { margin: 200.0 },
        only_in: None,
        effect: dialogue(text, 240),
    }
}

fn once(id: &str, activation: Activation, effect: BeatEffect) -> Beat {
    Beat {
        id: id.to_owned(),
        activation,
        rearm: Rearm::Never,
        only_in: None,
        effect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nepal_story_is_valid() {
        let story = StoryTimeline::nepal();
        assert!(story.validate().is_ok());
        assert_eq!(story.chapters.len(), 5);
    }

    #[test]
    fn test_duplicate_beat_rejected() {
        let mut story = StoryTimeline::nepal();
        let copy = story.beats[0].clone();
        story.beats.push(copy);
        assert!(matches!(story.validate(), Err(ConfigError::DuplicateBeat(id)) if id == "d_start"));
    }

    #[test]
    fn test_story_json_round_trips() {
        let story = StoryTimeline::nepal();
        let json = serde_json::to_string(&story).unwrap();
        let back = StoryTimeline::from_json(&json).unwrap();
        assert_eq!(back.beats.len(), story.beats.len());
        assert_eq!(back.beats[0], story.beats[0]);
    }

    #[test]
    fn test_track_flat_before_start_and_capped() {
        let track = Track::default();
        assert_eq!(track.track_y(10_000.0), 834.0);
        assert_eq!(track.track_y(19_999.0), 834.0);
        for i in 0..2000 {
            let x = 20_000.0 + i as f32 * 7.5;
            assert!(track.track_y(x) <= 834.0);
        }
    }

    #[test]
    fn test_titles() {
        let titles = StoryTimeline::nepal().titles;
        assert_eq!(titles.title_for(200.0, ModeKind::FreeRun, None), "2015 - BSc. CSIT Student");
        assert_eq!(titles.title_for(12_000.0, ModeKind::FreeRun, None), "Career Break - Finding Purpose");
        assert_eq!(titles.title_for(40_000.0, ModeKind::FreeRun, None), "2026 - AI & Future");
        assert_eq!(titles.title_for(30_000.0, ModeKind::ScriptedTrack, None), "BARAHI ROLLER COASTER");
        assert_eq!(
            titles.title_for(8250.0, ModeKind::VehicleCruise, Some(-300.0)),
            "2018 - Creative Designer"
        );
        assert_eq!(
            titles.title_for(8250.0, ModeKind::VehicleCruise, Some(-1000.0)),
            "2018 - Daraz - Sr. Graphics Designer"
        );
        assert_eq!(
            titles.title_for(8250.0, ModeKind::VehicleCruise, Some(-3000.0)),
            "2022 - Design Manager"
        );
        assert_eq!(
            titles.title_for(8250.0, ModeKind::ScriptedEncounter, Some(-5100.0)),
            "2024 - Design Manager"
        );
    }

    #[test]
    fn test_chapter_ownership() {
        let story = StoryTimeline::nepal();
        assert!(story.chapters[0].owns(650.0));
        assert!(!story.chapters[0].owns(4800.0));
        assert!(story.chapters[3].owns(8250.0));
        assert!(story.chapters[3].owns(12_000.0));
        assert!(story.chapters[4].owns(60_000.0));
    }

    proptest! {
        #[test]
        fn prop_track_is_deterministic(x in 0.0f32..40_000.0) {
            let track = Track::default();
            prop_assert_eq!(track.track_y(x), track.track_y(x));
            prop_assert_eq!(track.slope(x), track.slope(x));
        }

        #[test]
        fn prop_track_slope_is_continuous(x in 20_000.0f32..35_000.0) {
            let track = Track::default();
            let a = track.slope(x);
            let b = track.slope(x + 10.0);
            // The end of the ramp is the only kink in the profile
            prop_assert!((a - b).abs() < 0.35);
        }
    }
}
