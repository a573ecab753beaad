//! Weather and season system.
//!
//! Weather transitions on stored timers via the shared weighted-choice
//! primitive with season-adjusted weight tables. Weather contributes a
//! visitor spawn-rate multiplier and a daily mood drift.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    LOG_SEASON_CHANGED, LOG_WEATHER_CHANGED, SEASON_LENGTH_MS, WEATHER_MAX_SPELL_MS,
    WEATHER_MIN_SPELL_MS,
};
use crate::spawn::choose_weighted;
use crate::state::GameState;

/// Weather conditions that affect spawn rate and mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Storm,
    Snow,
    Heatwave,
}

impl Weather {
    /// Get i18n key for weather state name.
    #[must_use]
    pub const fn i18n_key(self) -> &'static str {
        match self {
            Self::Clear => "weather.states.Clear",
            Self::Rain => "weather.states.Rain",
            Self::Storm => "weather.states.Storm",
            Self::Snow => "weather.states.Snow",
            Self::Heatwave => "weather.states.Heatwave",
        }
    }
}

const WEATHER_ORDER: [Weather; 5] = [
    Weather::Clear,
    Weather::Rain,
    Weather::Storm,
    Weather::Snow,
    Weather::Heatwave,
];

/// Calendar seasons on a fixed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// The season following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Fall,
            Self::Fall => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }
}

const SEASON_ORDER: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

/// Ongoing effects of a weather condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffect {
    /// Multiplier on the reader spawn interval (above 1.0 slows arrivals).
    pub spawn_interval_mult: f64,
    /// Mood drift applied while the weather holds.
    pub mood_delta: i32,
}

/// Complete weather system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub effects: HashMap<Weather, WeatherEffect>,
    pub weights: HashMap<Season, HashMap<Weather, u32>>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Weather state tracking the current spell and season timers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeatherState {
    pub today: Weather,
    pub season: Season,
    #[serde(default)]
    pub next_weather_ms: i64,
    #[serde(default)]
    pub next_season_ms: i64,
}

fn weather_weight(weights: &HashMap<Weather, u32>, weather: Weather) -> u32 {
    *weights.get(&weather).unwrap_or(&0)
}

impl WeatherConfig {
    /// Validate configuration completeness.
    ///
    /// # Errors
    ///
    /// Returns a description of the first missing entry.
    pub fn validate(&self) -> Result<(), String> {
        for weather in WEATHER_ORDER {
            if !self.effects.contains_key(&weather) {
                return Err(format!("Missing effect for weather: {weather:?}"));
            }
        }
        for season in SEASON_ORDER {
            let Some(season_weights) = self.weights.get(&season) else {
                return Err(format!("Missing weights for season: {season:?}"));
            };
            if WEATHER_ORDER
                .iter()
                .all(|weather| weather_weight(season_weights, *weather) == 0)
            {
                return Err(format!("All weights zero for season: {season:?}"));
            }
        }
        Ok(())
    }

    /// Built-in default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        let effects = HashMap::from([
            (
                Weather::Clear,
                WeatherEffect {
                    spawn_interval_mult: 1.0,
                    mood_delta: 1,
                },
            ),
            (
                Weather::Rain,
                WeatherEffect {
                    spawn_interval_mult: 1.2,
                    mood_delta: 0,
                },
            ),
            (
                Weather::Storm,
                WeatherEffect {
                    spawn_interval_mult: 1.6,
                    mood_delta: -2,
                },
            ),
            (
                Weather::Snow,
                WeatherEffect {
                    spawn_interval_mult: 1.4,
                    mood_delta: -1,
                },
            ),
            (
                Weather::Heatwave,
                WeatherEffect {
                    spawn_interval_mult: 1.3,
                    mood_delta: -1,
                },
            ),
        ]);
        let weights = HashMap::from([
            (
                Season::Spring,
                HashMap::from([
                    (Weather::Clear, 50),
                    (Weather::Rain, 30),
                    (Weather::Storm, 10),
                    (Weather::Snow, 0),
                    (Weather::Heatwave, 5),
                ]),
            ),
            (
                Season::Summer,
                HashMap::from([
                    (Weather::Clear, 45),
                    (Weather::Rain, 15),
                    (Weather::Storm, 15),
                    (Weather::Snow, 0),
                    (Weather::Heatwave, 25),
                ]),
            ),
            (
                Season::Fall,
                HashMap::from([
                    (Weather::Clear, 40),
                    (Weather::Rain, 35),
                    (Weather::Storm, 15),
                    (Weather::Snow, 5),
                    (Weather::Heatwave, 0),
                ]),
            ),
            (
                Season::Winter,
                HashMap::from([
                    (Weather::Clear, 30),
                    (Weather::Rain, 10),
                    (Weather::Storm, 10),
                    (Weather::Snow, 45),
                    (Weather::Heatwave, 0),
                ]),
            ),
        ]);
        Self { effects, weights }
    }

    /// Current spawn-interval multiplier for the given weather.
    #[must_use]
    pub fn spawn_interval_mult(&self, weather: Weather) -> f64 {
        self.effects
            .get(&weather)
            .map_or(1.0, |effect| effect.spawn_interval_mult.max(0.1))
    }

    /// Mood drift for the given weather.
    #[must_use]
    pub fn mood_delta(&self, weather: Weather) -> i32 {
        self.effects.get(&weather).map_or(0, |effect| effect.mood_delta)
    }
}

/// Select weather for the current season using the shared weighted primitive.
#[must_use]
pub fn select_weather<R: Rng>(cfg: &WeatherConfig, season: Season, rng: &mut R) -> Weather {
    let Some(season_weights) = cfg.weights.get(&season) else {
        return Weather::Clear;
    };
    choose_weighted(rng, &WEATHER_ORDER, |weather| {
        f64::from(weather_weight(season_weights, *weather))
    })
    .copied()
    .unwrap_or(Weather::Clear)
}

/// Advance season and weather timers, rolling transitions when due.
pub fn process_weather<R: Rng>(gs: &mut GameState, cfg: &WeatherConfig, rng: &mut R, now_ms: i64) {
    if now_ms >= gs.weather.next_season_ms {
        let season = gs.weather.season.next();
        gs.weather.season = season;
        gs.weather.next_season_ms = now_ms + SEASON_LENGTH_MS;
        gs.logs.push(String::from(LOG_SEASON_CHANGED));
    }

    if now_ms >= gs.weather.next_weather_ms {
        let picked = select_weather(cfg, gs.weather.season, rng);
        if picked != gs.weather.today {
            gs.weather.today = picked;
            gs.notifications.weather_changed = Some(picked);
            gs.logs.push(String::from(LOG_WEATHER_CHANGED));
        }
        let spell = rng.gen_range(WEATHER_MIN_SPELL_MS..=WEATHER_MAX_SPELL_MS);
        gs.weather.next_weather_ms = now_ms + spell;
    }
}
