//! Static world layout
//!
//! Platforms, collectibles, decorations and zones along the single scroll
//! axis. A `World` is read-only once built; anything that moves at runtime
//! (vehicles, magnetised items) is copied into `GameState`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::GROUND_Y;
use crate::error::ConfigError;

/// Solid axis-aligned block (y grows downward, `y` is the top)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Platform {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Whether a box starting at `x` with width `w` overlaps horizontally
    #[inline]
    pub fn overlaps_x(&self, x: f32, w: f32) -> bool {
        x + w > self.x && x < self.right()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    Coin,
    Scroll,
    Gem,
}

/// A pickup, collected at most once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    /// Assigned in authored order when the world is built
    #[serde(default)]
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: CollectibleKind,
    #[serde(default)]
    pub skill: Option<String>,
    pub label: String,
    pub desc: String,
}

impl Collectible {
    fn new(x: f32, y: f32, kind: CollectibleKind, skill: Option<&str>, label: &str, desc: &str) -> Self {
        Self {
            id: 0,
            x,
            y,
            kind,
            skill: skill.map(str::to_owned),
            label: label.to_owned(),
            desc: desc.to_owned(),
        }
    }

    /// Floating label text shown on pickup
    pub fn pickup_text(&self) -> String {
        match (&self.skill, self.kind) {
            (Some(skill), _) => format!("+{}", skill_name(skill)),
            (None, CollectibleKind::Gem) => "+💖".to_owned(),
            (None, _) => "+📜".to_owned(),
        }
    }

    /// Popup icon for the UI collaborator
    pub fn icon(&self) -> &'static str {
        match self.kind {
            CollectibleKind::Coin => "🎨",
            CollectibleKind::Scroll => "📜",
            CollectibleKind::Gem => "💎",
        }
    }

    /// Particle/label colour (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self.kind {
            CollectibleKind::Gem => 0xff4466,
            _ => 0xf5c842,
        }
    }
}

/// Human-readable name for a skill tag
pub fn skill_name(tag: &str) -> &str {
    match tag {
        "ps" => "Photoshop",
        "ai" => "Illustrator",
        "ae" => "After Effects",
        "id" => "InDesign",
        "fi" => "Figma",
        "pr" => "Premiere",
        "js" => "JavaScript",
        "react" => "React",
        "py" => "Python",
        "node" => "Node.js",
        "gemini" => "Gemini AI",
        "grok" => "Grok AI",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationKind {
    Rhododendron,
    Temple,
    Wizard,
    Torch,
    Cloud,
    Balloon,
    Car,
}

impl DecorationKind {
    /// Decorations that spawn a rideable vehicle
    pub fn is_vehicle(self) -> bool {
        matches!(self, DecorationKind::Balloon | DecorationKind::Car)
    }
}

fn one() -> f32 {
    1.0
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub x: f32,
    pub y: f32,
    #[serde(default = "one")]
    pub scale: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "yes")]
    pub bobbing: bool,
}

impl Decoration {
    const fn at(kind: DecorationKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            scale: 1.0,
            rotation: 0.0,
            bobbing: true,
        }
    }
}

/// Locomotion style of a zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum ZoneStyle {
    Normal,
    /// Horizontal input climbs a shaft pinned at `corridor_x`
    VerticalCorridor { corridor_x: f32 },
    /// Interior levels where the camera follows the climb
    Underground,
    /// Zero-gravity drift
    Void,
}

impl ZoneStyle {
    /// Whether the camera tracks the player's height here
    pub fn is_climbing(&self) -> bool {
        matches!(self, ZoneStyle::Underground | ZoneStyle::VerticalCorridor { .. })
    }
}

/// Half-open x-range `[start, end)` with a locomotion style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub start: f32,
    pub end: f32,
    #[serde(flatten)]
    pub style: ZoneStyle,
    /// Once the player reaches this x, scrolling back past it is blocked
    #[serde(default)]
    pub ratchet: Option<f32>,
}

impl Zone {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.start && x < self.end
    }
}

/// The complete, immutable world description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub name: String,
    pub x_start: f32,
    pub x_end: f32,
    pub platforms: Vec<Platform>,
    pub collectibles: Vec<Collectible>,
    pub decorations: Vec<Decoration>,
    /// Sorted, non-overlapping
    pub zones: Vec<Zone>,
}

impl World {
    /// Parse a JSON layout, assign collectible ids and validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut world: World = serde_json::from_str(json)?;
        world.assign_ids();
        world.validate()?;
        Ok(world)
    }

    /// Number collectibles in authored order
    pub fn assign_ids(&mut self) {
        for (id, item) in self.collectibles.iter_mut().enumerate() {
            item.id = id as u32;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.x_end <= self.x_start {
            return Err(ConfigError::EmptyWorld {
                x_start: self.x_start,
                x_end: self.x_end,
            });
        }
        for (index, p) in self.platforms.iter().enumerate() {
            if p.w <= 0.0 || p.h <= 0.0 {
                return Err(ConfigError::DegeneratePlatform {
                    index,
                    w: p.w,
                    h: p.h,
                });
            }
        }
        let mut ids = BTreeSet::new();
        for item in &self.collectibles {
            if !ids.insert(item.id) {
                return Err(ConfigError::DuplicateCollectible(item.id));
            }
        }
        let mut previous_end = f32::NEG_INFINITY;
        for (index, zone) in self.zones.iter().enumerate() {
            if zone.end <= zone.start {
                return Err(ConfigError::EmptyZone {
                    index,
                    start: zone.start,
                    end: zone.end,
                });
            }
            if zone.start < previous_end {
                return Err(ConfigError::OverlappingZones {
                    index,
                    start: zone.start,
                    previous_end,
                });
            }
            if let Some(ratchet) = zone.ratchet {
                if !zone.contains(ratchet) {
                    return Err(ConfigError::RatchetOutsideZone {
                        index,
                        ratchet,
                        start: zone.start,
                        end: zone.end,
                    });
                }
            }
            previous_end = zone.end;
        }
        Ok(())
    }

    /// Zone containing `x`, if any
    pub fn zone_at(&self, x: f32) -> Option<&Zone> {
        let idx = self.zones.partition_point(|z| z.end <= x);
        self.zones.get(idx).filter(|z| z.contains(x))
    }

    /// Style at `x` (gaps between zones behave as `Normal`)
    pub fn style_at(&self, x: f32) -> ZoneStyle {
        self.zone_at(x).map(|z| z.style).unwrap_or(ZoneStyle::Normal)
    }

    /// Highest ratchet the player at `x` has reached
    pub fn ratchet_for(&self, x: f32) -> Option<f32> {
        self.zones
            .iter()
            .filter_map(|z| z.ratchet)
            .filter(|&r| x >= r)
            .reduce(f32::max)
    }

    /// The single continuous Nepal journey
    pub fn nepal() -> Self {
        use CollectibleKind::*;
        use DecorationKind::*;
        const G: f32 = GROUND_Y;

        let platforms = vec![
            // Skills
            Platform::new(0.0, G, 3220.0, 120.0),
            Platform::new(500.0, G - 100.0, 300.0, 100.0),
            Platform::new(1000.0, G - 160.0, 240.0, 80.0),
            Platform::new(1700.0, G - 120.0, 280.0, 80.0),
            Platform::new(3220.0, G, 1220.0, 120.0),
            // Dividing wall with the temple gate between its halves
            Platform::new(4000.0, 0.0, 400.0, G - 260.0),
            Platform::new(4000.0, G, 400.0, 600.0),
            // Makura stairway
            Platform::new(4400.0, G, 200.0, 120.0),
            Platform::new(4600.0, G, 400.0, 120.0),
            Platform::new(5000.0, G - 120.0, 400.0, 240.0),
            Platform::new(5400.0, G - 240.0, 400.0, 360.0),
            Platform::new(5800.0, G - 360.0, 400.0, 480.0),
            Platform::new(6200.0, G - 480.0, 400.0, 600.0),
            Platform::new(6600.0, G - 600.0, 400.0, 720.0),
            Platform::new(7000.0, G - 720.0, 1500.0, 840.0),
            // Career break through the coaster
            Platform::new(9200.0, G, 41_800.0, 120.0),
        ];

        let collectibles = vec![
            Collectible::new(650.0, G - 180.0, Gem, None, "Inventory", "MSI Laptop"),
            Collectible::new(1120.0, G - 240.0, Coin, Some("ps"), "Photoshop", "Somewhat knowledge"),
            Collectible::new(1500.0, G - 100.0, Coin, Some("pr"), "Video Editing", "Somewhat knowledge"),
            Collectible::new(1850.0, G - 200.0, Scroll, None, "Achievement", "Created Rap Music video for friend"),
            Collectible::new(2400.0, G - 100.0, Coin, Some("code"), "Programming", "Early learning"),
            Collectible::new(4800.0, G - 100.0, Coin, Some("ps"), "Photoshop", "Expertise"),
            Collectible::new(5200.0, G - 220.0, Coin, Some("ai"), "Illustrator", "Vector Art"),
            Collectible::new(5500.0, G - 340.0, Coin, Some("ae"), "After Effects", "Motion Graphics"),
            Collectible::new(5800.0, G - 460.0, Coin, Some("id"), "InDesign", "Editorial Layout"),
            Collectible::new(6100.0, G - 580.0, Coin, Some("pr"), "Premiere Pro", "Video Editing"),
            Collectible::new(6300.0, G - 700.0, Coin, Some("xd"), "Adobe XD", "Prototyping"),
            Collectible::new(6500.0, G - 700.0, Coin, Some("code"), "Programming", "5% still"),
            Collectible::new(6650.0, G - 720.0, Scroll, None, "Achievement", "Miss Nepal 2018 Branding & Graphics Design"),
            Collectible::new(6800.0, G - 720.0, Scroll, None, "Academics", "Completed Bsc. CSIT"),
            // Sky column above the balloon mooring
            Collectible::new(8250.0, G - 1000.0, Coin, Some("code"), "Ecommerce Ad design", "Campaign Focus"),
            Collectible::new(8200.0, G - 2000.0, Coin, Some("uiux"), "Product Design", "User Experience"),
            Collectible::new(8300.0, G - 3000.0, Coin, Some("ai"), "Social Media Designs", "Digital Presence"),
            Collectible::new(8150.0, G - 4000.0, Coin, Some("ae"), "Motion Graphics", "Dynamic Content"),
            Collectible::new(8250.0, G - 5000.0, Coin, Some("ps"), "Branding", "Visual Identity"),
            // Hospitality run-up to the coaster
            Collectible::new(16_700.0, G - 150.0, Coin, Some("ps"), "Hotel Branding", "Identity Design"),
            Collectible::new(17_500.0, G - 250.0, Coin, Some("id"), "Magazine Ads & Design", "Print Media"),
            Collectible::new(18_300.0, G - 150.0, Gem, None, "Hotel PMS", "System Management"),
            Collectible::new(19_100.0, G - 200.0, Scroll, None, "Marketing Strategies", "Campaign Planning"),
        ];

        let mut decorations = Vec::new();
        for x in [400.0, 800.0, 1200.0, 2000.0, 2800.0] {
            decorations.push(Decoration::at(Rhododendron, x, G));
        }
        decorations.push(Decoration::at(Temple, 4000.0, G));
        decorations.push(Decoration::at(Wizard, 3800.0, G));
        for (x, y) in [(4020.0, G - 100.0), (4320.0, G - 100.0)] {
            decorations.push(Decoration::at(Torch, x, y));
        }
        for (x, y) in [
            (300.0, 150.0),
            (600.0, 100.0),
            (1000.0, 180.0),
            (1500.0, 120.0),
            (2200.0, 150.0),
            (3000.0, 80.0),
        ] {
            decorations.push(Decoration::at(Cloud, x, y));
        }
        for (x, y) in [
            (4950.0, G - 240.0),
            (5550.0, G - 360.0),
            (6350.0, G - 600.0),
            (7150.0, G - 840.0),
        ] {
            decorations.push(Decoration::at(Torch, x, y));
        }
        for (x, y) in [
            (7900.0, G - 1500.0),
            (8600.0, G - 2000.0),
            (7800.0, G - 3000.0),
            (8700.0, G - 4000.0),
            (8000.0, G - 5000.0),
            (8500.0, G - 6000.0),
        ] {
            decorations.push(Decoration::at(Cloud, x, y));
        }
        decorations.push(Decoration {
            scale: 2.0,
            bobbing: false,
            ..Decoration::at(Balloon, 8250.0, G - 742.0)
        });
        for x in [
            9300.0, 9600.0, 9900.0, 10_200.0, 10_500.0, 11_200.0, 12_000.0, 13_000.0,
        ] {
            decorations.push(Decoration::at(Rhododendron, x, G));
        }
        for (x, y) in [
            (9400.0, 150.0),
            (9800.0, 220.0),
            (10_100.0, 200.0),
            (10_500.0, 120.0),
            (10_800.0, 100.0),
            (11_200.0, 180.0),
            (11_500.0, 150.0),
            (12_500.0, 100.0),
        ] {
            decorations.push(Decoration::at(Cloud, x, y));
        }
        decorations.push(Decoration::at(Car, 14_200.0, G));
        for x in [
            16_000.0, 17_500.0, 19_000.0, 20_500.0, 22_000.0, 23_500.0, 28_000.0, 33_000.0,
        ] {
            decorations.push(Decoration::at(Rhododendron, x, G));
        }
        for (x, y) in [
            (16_500.0, 150.0),
            (18_500.0, 220.0),
            (21_000.0, 180.0),
            (22_500.0, 150.0),
            (24_500.0, 220.0),
            (27_000.0, 150.0),
            (31_000.0, 220.0),
            (30_000.0, 200.0),
        ] {
            decorations.push(Decoration::at(Cloud, x, y));
        }

        let zones = vec![
            Zone {
                name: "Skills".to_owned(),
                start: 0.0,
                end: 4000.0,
                style: ZoneStyle::Normal,
                ratchet: None,
            },
            Zone {
                name: "Makura".to_owned(),
                start: 4000.0,
                end: 9200.0,
                style: ZoneStyle::Underground,
                ratchet: Some(4400.0),
            },
            Zone {
                name: "Career Break".to_owned(),
                start: 9200.0,
                end: 20_000.0,
                style: ZoneStyle::Normal,
                ratchet: Some(10_400.0),
            },
            Zone {
                name: "Barahi".to_owned(),
                start: 20_000.0,
                end: 52_000.0,
                style: ZoneStyle::Normal,
                ratchet: Some(26_225.0),
            },
            Zone {
                name: "AI World".to_owned(),
                start: 52_000.0,
                end: 75_000.0,
                style: ZoneStyle::Void,
                ratchet: Some(52_500.0),
            },
        ];

        let mut world = Self {
            name: "Nepal Quest".to_owned(),
            x_start: 0.0,
            x_end: 75_000.0,
            platforms,
            collectibles,
            decorations,
            zones,
        };
        world.assign_ids();
        world
    }
}
