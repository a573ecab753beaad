//! Read-only content catalog supplied to the engine.
//!
//! The engine never mutates catalog data; it only looks definitions up by id.
//! All collections deserialize with per-field defaults so older documents
//! keep loading as the schema grows.

use serde::{Deserialize, Serialize};

use crate::events::Effect;
use crate::incidents::IncidentKind;
use crate::weather::WeatherConfig;

/// A stockable sub-inventory within a floor type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub max_stock: u32,
    pub stock_cost: i64,
    pub stock_time_ms: i64,
    pub earning_rate: i64,
}

/// Structural family of a floor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FloorKind {
    #[default]
    Standard,
    Utility,
}

/// A purchasable floor definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorTypeDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: FloorKind,
    pub cost: i64,
    pub build_time_ms: i64,
    #[serde(default = "default_staff_slots")]
    pub staff_slots: u32,
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
}

const fn default_staff_slots() -> u32 {
    3
}

/// Responsibility of a staff type, used for incident fixing and cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Shelver,
    Janitor,
    Engineer,
    Security,
    Greeter,
}

/// A hireable staff definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffTypeDef {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
    pub hire_cost: i64,
    /// Staff already required on the floor before this type may be hired.
    #[serde(default)]
    pub requires_staff: u32,
}

/// A visitor archetype with spawn weight and floor preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderArchetypeDef {
    pub id: String,
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub preferred_floor_types: Vec<String>,
    #[serde(default = "default_books_min")]
    pub books_min: u32,
    #[serde(default = "default_books_max")]
    pub books_max: u32,
}

fn default_weight() -> u32 {
    5
}

const fn default_books_min() -> u32 {
    1
}

const fn default_books_max() -> u32 {
    3
}

/// Special ability carried by a VIP guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VipAbility {
    /// The target floor earns boosted rewards for a while.
    DoubleEarnings,
    /// All categories on the target floor refill instantly.
    InstantRestock,
    /// The target floor's trash is swept to zero.
    TrashSweep,
    /// The next reader spawn window is shortened.
    CrowdDraw,
}

/// A VIP sub-type. Weights are fractions of one roll and sum to below 1;
/// the remainder falls back to the first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VipTypeDef {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub ability: VipAbility,
}

/// A bonus active only while a combination of floor types coexists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyDef {
    pub id: String,
    pub name: String,
    pub required_floor_types: Vec<String>,
    pub multiplier: f64,
}

/// A purchasable permanent perk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerkDef {
    pub id: String,
    pub name: String,
    pub cost_gems: i64,
    #[serde(default)]
    pub earning_bonus: f64,
    #[serde(default)]
    pub build_speed_bonus: f64,
}

/// A purchasable decoration contributing to tower mood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationDef {
    pub id: String,
    pub name: String,
    pub cost_stars: i64,
    pub mood_bonus: i32,
}

/// A cosmetic theme unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDef {
    pub id: String,
    pub name: String,
    pub cost_gems: i64,
}

/// A purchasable tower upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub cost_gems: i64,
    #[serde(default)]
    pub bonus_offline_hours: u32,
    #[serde(default)]
    pub spawn_rate_bonus: f64,
}

/// One-way unlock driven by a monotonic stat counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    pub stat_key: String,
    pub requirement: u64,
    pub reward_stars: i64,
}

/// A calendar holiday with a reward multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayDef {
    pub id: String,
    pub name: String,
    pub multiplier: f64,
}

/// A donation source granting stars when drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationSourceDef {
    pub id: String,
    pub name: String,
    pub stars: i64,
}

/// A findable item for find-missions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionItemDef {
    pub id: String,
    pub name: String,
}

/// Per-kind incident tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentDef {
    pub kind: IncidentKind,
    /// Base probability per scheduler pass on an eligible floor.
    pub chance: f64,
    pub fix_time_ms: i64,
    pub fixer: StaffRole,
}

/// A floor-scoped timed event with a star bonus and completion effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallEventDef {
    pub id: String,
    pub name: String,
    pub duration_ms: i64,
    pub bonus_mult: f64,
    pub target_checkouts: u32,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// A global star-multiplier event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarEventDef {
    pub id: String,
    pub name: String,
    pub multiplier: f64,
    pub duration_ms: i64,
}

/// Tower-wide structural settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerSettings {
    #[serde(default = "default_max_floors")]
    pub max_floors: usize,
    #[serde(default = "default_basement_type")]
    pub basement_type: String,
}

fn default_max_floors() -> usize {
    50
}

fn default_basement_type() -> String {
    String::from("basement")
}

impl Default for TowerSettings {
    fn default() -> Self {
        Self {
            max_floors: default_max_floors(),
            basement_type: default_basement_type(),
        }
    }
}

/// Complete read-only content catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub floor_types: Vec<FloorTypeDef>,
    #[serde(default)]
    pub staff_types: Vec<StaffTypeDef>,
    #[serde(default)]
    pub reader_archetypes: Vec<ReaderArchetypeDef>,
    #[serde(default)]
    pub vip_types: Vec<VipTypeDef>,
    #[serde(default)]
    pub synergies: Vec<SynergyDef>,
    #[serde(default)]
    pub perks: Vec<PerkDef>,
    #[serde(default)]
    pub decorations: Vec<DecorationDef>,
    #[serde(default)]
    pub themes: Vec<ThemeDef>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeDef>,
    #[serde(default)]
    pub achievements: Vec<AchievementDef>,
    #[serde(default)]
    pub holidays: Vec<HolidayDef>,
    #[serde(default)]
    pub donation_sources: Vec<DonationSourceDef>,
    #[serde(default)]
    pub mission_items: Vec<MissionItemDef>,
    #[serde(default)]
    pub incidents: Vec<IncidentDef>,
    #[serde(default)]
    pub hall_events: Vec<HallEventDef>,
    #[serde(default)]
    pub star_events: Vec<StarEventDef>,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub settings: TowerSettings,
}

impl Catalog {
    /// Load and validate a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let catalog: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate structural consistency of the catalog.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.floor_types.is_empty() {
            return Err(String::from("catalog has no floor types"));
        }
        for floor_type in &self.floor_types {
            if floor_type.id.is_empty() {
                return Err(String::from("floor type with empty id"));
            }
            if floor_type.kind == FloorKind::Standard
                && floor_type.categories.len() > floor_type.staff_slots as usize
            {
                return Err(format!(
                    "floor type {} has more categories than staff slots",
                    floor_type.id
                ));
            }
        }
        let basement = &self.settings.basement_type;
        match self.floor_type(basement) {
            None => return Err(format!("basement type {basement} missing from floor types")),
            Some(def) if def.kind != FloorKind::Utility => {
                return Err(format!("basement type {basement} must be a utility floor"));
            }
            Some(_) => {}
        }
        if self.reader_archetypes.iter().all(|a| a.weight == 0) && !self.reader_archetypes.is_empty()
        {
            return Err(String::from("all reader archetype weights are zero"));
        }
        for archetype in &self.reader_archetypes {
            if archetype.books_min == 0 || archetype.books_min > archetype.books_max {
                return Err(format!("archetype {} has invalid book range", archetype.id));
            }
        }
        let vip_total: f64 = self.vip_types.iter().map(|v| v.weight).sum();
        if vip_total >= 1.0 {
            return Err(String::from("vip weights must sum below 1.0"));
        }
        for incident in &self.incidents {
            if !(0.0..1.0).contains(&incident.chance) {
                return Err(format!("incident {:?} chance out of range", incident.kind));
            }
        }
        self.weather.validate()?;
        Ok(())
    }

    /// Look up a floor type by id.
    #[must_use]
    pub fn floor_type(&self, id: &str) -> Option<&FloorTypeDef> {
        self.floor_types.iter().find(|def| def.id == id)
    }

    /// Look up a staff type by id.
    #[must_use]
    pub fn staff_type(&self, id: &str) -> Option<&StaffTypeDef> {
        self.staff_types.iter().find(|def| def.id == id)
    }

    /// Look up a reader archetype by id.
    #[must_use]
    pub fn reader_archetype(&self, id: &str) -> Option<&ReaderArchetypeDef> {
        self.reader_archetypes.iter().find(|def| def.id == id)
    }

    /// Look up a VIP type by id.
    #[must_use]
    pub fn vip_type(&self, id: &str) -> Option<&VipTypeDef> {
        self.vip_types.iter().find(|def| def.id == id)
    }

    /// Look up a perk by id.
    #[must_use]
    pub fn perk(&self, id: &str) -> Option<&PerkDef> {
        self.perks.iter().find(|def| def.id == id)
    }

    /// Look up a decoration by id.
    #[must_use]
    pub fn decoration(&self, id: &str) -> Option<&DecorationDef> {
        self.decorations.iter().find(|def| def.id == id)
    }

    /// Look up a theme by id.
    #[must_use]
    pub fn theme(&self, id: &str) -> Option<&ThemeDef> {
        self.themes.iter().find(|def| def.id == id)
    }

    /// Look up an upgrade by id.
    #[must_use]
    pub fn upgrade(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|def| def.id == id)
    }

    /// Look up a holiday by id.
    #[must_use]
    pub fn holiday(&self, id: &str) -> Option<&HolidayDef> {
        self.holidays.iter().find(|def| def.id == id)
    }

    /// Look up incident tuning by kind.
    #[must_use]
    pub fn incident(&self, kind: IncidentKind) -> Option<&IncidentDef> {
        self.incidents.iter().find(|def| def.kind == kind)
    }

    /// Built-in compact catalog used for fresh installs and tests.
    #[must_use]
    pub fn default_catalog() -> Self {
        default_catalog()
    }
}

fn category(name: &str, max_stock: u32, stock_cost: i64, stock_time_ms: i64, rate: i64) -> CategoryDef {
    CategoryDef {
        name: name.to_string(),
        max_stock,
        stock_cost,
        stock_time_ms,
        earning_rate: rate,
    }
}

fn standard_floor(id: &str, name: &str, cost: i64, build_time_ms: i64, categories: Vec<CategoryDef>) -> FloorTypeDef {
    FloorTypeDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: FloorKind::Standard,
        cost,
        build_time_ms,
        staff_slots: 3,
        categories,
    }
}

#[allow(clippy::too_many_lines)]
fn default_catalog() -> Catalog {
    Catalog {
        floor_types: vec![
            FloorTypeDef {
                id: String::from("basement"),
                name: String::from("Basement"),
                kind: FloorKind::Utility,
                cost: 0,
                build_time_ms: 0,
                staff_slots: 3,
                categories: Vec::new(),
            },
            FloorTypeDef {
                id: String::from("restroom"),
                name: String::from("Restroom"),
                kind: FloorKind::Utility,
                cost: 250,
                build_time_ms: 20_000,
                staff_slots: 1,
                categories: Vec::new(),
            },
            standard_floor(
                "board_books",
                "Board Books",
                100,
                30_000,
                vec![
                    category("Picture Books", 40, 30, 45_000, 2),
                    category("Pop-Up Books", 50, 40, 60_000, 3),
                    category("Bedtime Stories", 60, 55, 75_000, 4),
                ],
            ),
            standard_floor(
                "poetry",
                "Poetry",
                400,
                60_000,
                vec![
                    category("Sonnets", 40, 35, 50_000, 3),
                    category("Free Verse", 50, 45, 65_000, 4),
                    category("Anthologies", 60, 60, 80_000, 5),
                ],
            ),
            standard_floor(
                "mystery",
                "Mystery",
                900,
                90_000,
                vec![
                    category("Whodunits", 45, 40, 55_000, 4),
                    category("Noir", 55, 50, 70_000, 5),
                    category("Cold Cases", 65, 65, 85_000, 6),
                ],
            ),
            standard_floor(
                "sci_fi",
                "Science Fiction",
                1_600,
                120_000,
                vec![
                    category("Space Opera", 45, 45, 60_000, 5),
                    category("Cyberpunk", 55, 55, 75_000, 6),
                    category("First Contact", 65, 70, 90_000, 7),
                ],
            ),
            standard_floor(
                "cookbooks",
                "Cookbooks",
                2_500,
                150_000,
                vec![
                    category("Baking", 50, 50, 65_000, 6),
                    category("World Cuisine", 60, 60, 80_000, 7),
                    category("Preserving", 70, 75, 95_000, 8),
                ],
            ),
        ],
        staff_types: vec![
            StaffTypeDef {
                id: String::from("shelver"),
                name: String::from("Shelver"),
                role: StaffRole::Shelver,
                hire_cost: 150,
                requires_staff: 0,
            },
            StaffTypeDef {
                id: String::from("archivist"),
                name: String::from("Archivist"),
                role: StaffRole::Shelver,
                hire_cost: 300,
                requires_staff: 1,
            },
            StaffTypeDef {
                id: String::from("curator"),
                name: String::from("Curator"),
                role: StaffRole::Shelver,
                hire_cost: 600,
                requires_staff: 2,
            },
            StaffTypeDef {
                id: String::from("janitor"),
                name: String::from("Janitor"),
                role: StaffRole::Janitor,
                hire_cost: 200,
                requires_staff: 0,
            },
            StaffTypeDef {
                id: String::from("engineer"),
                name: String::from("Engineer"),
                role: StaffRole::Engineer,
                hire_cost: 350,
                requires_staff: 0,
            },
            StaffTypeDef {
                id: String::from("security_guard"),
                name: String::from("Security Guard"),
                role: StaffRole::Security,
                hire_cost: 300,
                requires_staff: 0,
            },
        ],
        reader_archetypes: vec![
            ReaderArchetypeDef {
                id: String::from("casual_reader"),
                name: String::from("Casual Reader"),
                weight: 55,
                preferred_floor_types: Vec::new(),
                books_min: 1,
                books_max: 3,
            },
            ReaderArchetypeDef {
                id: String::from("student"),
                name: String::from("Student"),
                weight: 25,
                preferred_floor_types: vec![String::from("mystery"), String::from("sci_fi")],
                books_min: 2,
                books_max: 4,
            },
            ReaderArchetypeDef {
                id: String::from("toddler_parent"),
                name: String::from("Toddler Parent"),
                weight: 12,
                preferred_floor_types: vec![String::from("board_books")],
                books_min: 1,
                books_max: 2,
            },
            ReaderArchetypeDef {
                id: String::from("poet"),
                name: String::from("Poet"),
                weight: 8,
                preferred_floor_types: vec![String::from("poetry")],
                books_min: 1,
                books_max: 2,
            },
        ],
        vip_types: vec![
            VipTypeDef {
                id: String::from("celebrity_author"),
                name: String::from("Celebrity Author"),
                weight: 0.12,
                ability: VipAbility::CrowdDraw,
            },
            VipTypeDef {
                id: String::from("book_collector"),
                name: String::from("Book Collector"),
                weight: 0.10,
                ability: VipAbility::DoubleEarnings,
            },
            VipTypeDef {
                id: String::from("philanthropist"),
                name: String::from("Philanthropist"),
                weight: 0.05,
                ability: VipAbility::InstantRestock,
            },
            VipTypeDef {
                id: String::from("city_inspector"),
                name: String::from("City Inspector"),
                weight: 0.03,
                ability: VipAbility::TrashSweep,
            },
        ],
        synergies: vec![
            SynergyDef {
                id: String::from("story_time"),
                name: String::from("Story Time"),
                required_floor_types: vec![String::from("board_books"), String::from("poetry")],
                multiplier: 1.05,
            },
            SynergyDef {
                id: String::from("genre_row"),
                name: String::from("Genre Row"),
                required_floor_types: vec![String::from("mystery"), String::from("sci_fi")],
                multiplier: 1.15,
            },
            SynergyDef {
                id: String::from("cozy_corner"),
                name: String::from("Cozy Corner"),
                required_floor_types: vec![String::from("poetry"), String::from("cookbooks")],
                multiplier: 1.1,
            },
        ],
        perks: vec![
            PerkDef {
                id: String::from("swift_scaffolds"),
                name: String::from("Swift Scaffolds"),
                cost_gems: 3,
                earning_bonus: 0.0,
                build_speed_bonus: 0.25,
            },
            PerkDef {
                id: String::from("golden_bookmarks"),
                name: String::from("Golden Bookmarks"),
                cost_gems: 5,
                earning_bonus: 0.1,
                build_speed_bonus: 0.0,
            },
            PerkDef {
                id: String::from("friendly_fines"),
                name: String::from("Friendly Fines"),
                cost_gems: 2,
                earning_bonus: 0.05,
                build_speed_bonus: 0.0,
            },
        ],
        decorations: vec![
            DecorationDef {
                id: String::from("potted_fern"),
                name: String::from("Potted Fern"),
                cost_stars: 200,
                mood_bonus: 2,
            },
            DecorationDef {
                id: String::from("reading_lamp"),
                name: String::from("Reading Lamp"),
                cost_stars: 350,
                mood_bonus: 3,
            },
            DecorationDef {
                id: String::from("lobby_mural"),
                name: String::from("Lobby Mural"),
                cost_stars: 800,
                mood_bonus: 5,
            },
        ],
        themes: vec![
            ThemeDef {
                id: String::from("oak_classic"),
                name: String::from("Oak Classic"),
                cost_gems: 2,
            },
            ThemeDef {
                id: String::from("neon_noir"),
                name: String::from("Neon Noir"),
                cost_gems: 3,
            },
        ],
        upgrades: vec![
            UpgradeDef {
                id: String::from("night_drop_box"),
                name: String::from("Night Drop Box"),
                cost_gems: 4,
                bonus_offline_hours: 2,
                spawn_rate_bonus: 0.0,
            },
            UpgradeDef {
                id: String::from("revolving_door"),
                name: String::from("Revolving Door"),
                cost_gems: 3,
                bonus_offline_hours: 0,
                spawn_rate_bonus: 0.1,
            },
        ],
        achievements: vec![
            AchievementDef {
                id: String::from("first_foundation"),
                name: String::from("First Foundation"),
                stat_key: String::from(crate::constants::STAT_FLOORS_BUILT),
                requirement: 1,
                reward_stars: 50,
            },
            AchievementDef {
                id: String::from("bookworm_magnet"),
                name: String::from("Bookworm Magnet"),
                stat_key: String::from(crate::constants::STAT_READERS_SERVED),
                requirement: 100,
                reward_stars: 250,
            },
            AchievementDef {
                id: String::from("shelf_master"),
                name: String::from("Shelf Master"),
                stat_key: String::from(crate::constants::STAT_FLOORS_BUILT),
                requirement: 10,
                reward_stars: 500,
            },
            AchievementDef {
                id: String::from("star_collector"),
                name: String::from("Star Collector"),
                stat_key: String::from(crate::constants::STAT_STARS_EARNED),
                requirement: 10_000,
                reward_stars: 400,
            },
            AchievementDef {
                id: String::from("fixer_upper"),
                name: String::from("Fixer Upper"),
                stat_key: String::from(crate::constants::STAT_INCIDENTS_FIXED),
                requirement: 5,
                reward_stars: 300,
            },
        ],
        holidays: vec![
            HolidayDef {
                id: String::from("founders_day"),
                name: String::from("Founders Day"),
                multiplier: 1.25,
            },
            HolidayDef {
                id: String::from("winter_festival"),
                name: String::from("Winter Festival"),
                multiplier: 1.5,
            },
        ],
        donation_sources: vec![
            DonationSourceDef {
                id: String::from("local_school"),
                name: String::from("Local School"),
                stars: 40,
            },
            DonationSourceDef {
                id: String::from("estate_sale"),
                name: String::from("Estate Sale"),
                stars: 120,
            },
            DonationSourceDef {
                id: String::from("anonymous_patron"),
                name: String::from("Anonymous Patron"),
                stars: 75,
            },
        ],
        mission_items: vec![
            MissionItemDef {
                id: String::from("first_edition_atlas"),
                name: String::from("First Edition Atlas"),
            },
            MissionItemDef {
                id: String::from("signed_manuscript"),
                name: String::from("Signed Manuscript"),
            },
            MissionItemDef {
                id: String::from("misprinted_almanac"),
                name: String::from("Misprinted Almanac"),
            },
        ],
        incidents: vec![
            IncidentDef {
                kind: IncidentKind::Leak,
                chance: 0.002,
                fix_time_ms: 90_000,
                fixer: StaffRole::Engineer,
            },
            IncidentDef {
                kind: IncidentKind::PowerOutage,
                chance: 0.001,
                fix_time_ms: 120_000,
                fixer: StaffRole::Engineer,
            },
            IncidentDef {
                kind: IncidentKind::RowdyPatron,
                chance: 0.003,
                fix_time_ms: 60_000,
                fixer: StaffRole::Security,
            },
        ],
        hall_events: vec![
            HallEventDef {
                id: String::from("author_signing"),
                name: String::from("Author Signing"),
                duration_ms: 180_000,
                bonus_mult: 1.5,
                target_checkouts: 10,
                effects: vec![Effect::grant_stars(300), Effect::mood_boost(10)],
            },
            HallEventDef {
                id: String::from("poetry_slam"),
                name: String::from("Poetry Slam"),
                duration_ms: 240_000,
                bonus_mult: 1.25,
                target_checkouts: 8,
                effects: vec![Effect::grant_stars(200), Effect::grant_gems(1)],
            },
        ],
        star_events: vec![
            StarEventDef {
                id: String::from("double_star_weekend"),
                name: String::from("Double Star Weekend"),
                multiplier: 2.0,
                duration_ms: 300_000,
            },
            StarEventDef {
                id: String::from("meteor_shower"),
                name: String::from("Meteor Shower"),
                multiplier: 3.0,
                duration_ms: 120_000,
            },
        ],
        weather: WeatherConfig::default_config(),
        settings: TowerSettings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_validates() {
        let catalog = Catalog::default_catalog();
        catalog.validate().unwrap();
    }

    #[test]
    fn board_books_matches_expected_tuning() {
        let catalog = Catalog::default_catalog();
        let def = catalog.floor_type("board_books").unwrap();
        assert_eq!(def.cost, 100);
        assert_eq!(def.build_time_ms, 30_000);
        assert_eq!(def.categories.len(), 3);
    }

    #[test]
    fn from_json_rejects_missing_basement() {
        let doc = r#"{"floor_types":[{"id":"poetry","name":"Poetry","cost":10,"build_time_ms":1000}]}"#;
        let err = Catalog::from_json(doc).unwrap_err();
        assert!(err.contains("basement"));
    }

    #[test]
    fn from_json_rejects_vip_weights_at_or_above_one() {
        let mut catalog = Catalog::default_catalog();
        catalog.vip_types[0].weight = 0.95;
        let doc = serde_json::to_string(&catalog).unwrap();
        let err = Catalog::from_json(&doc).unwrap_err();
        assert!(err.contains("vip weights"));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let doc = r#"{"floor_types":[{"id":"basement","name":"B","kind":"utility","cost":0,"build_time_ms":0}]}"#;
        let catalog = Catalog::from_json(doc).unwrap();
        assert_eq!(catalog.settings.max_floors, 50);
        assert!(catalog.staff_types.is_empty());
    }
}
