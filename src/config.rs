//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and convergence parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Weather source parameters.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Household occupancy profile parameters.
    #[serde(default)]
    pub occupancy: OccupancyConfig,
    /// Heat pump parameters.
    #[serde(default)]
    pub heat_pump: HeatPumpConfig,
    /// Heat pump controller parameters.
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Hot water storage parameters.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Simulation timing and convergence parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Timestep length in seconds (must divide 86400).
    pub seconds_per_timestep: u32,
    /// Master random seed.
    pub seed: u64,
    /// Convergence iteration cap per timestep (must be > 0).
    pub max_iterations: usize,
    /// Convergence tolerance on slot deltas (must be > 0).
    pub tolerance: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 1,
            seconds_per_timestep: 900,
            seed: 42,
            max_iterations: 11,
            tolerance: 1e-3,
        }
    }
}

/// Weather source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Yearly mean outdoor temperature (°C).
    pub annual_mean_c: f32,
    /// Seasonal swing around the mean (°C).
    pub annual_amplitude_c: f32,
    /// Day/night swing (°C).
    pub daily_amplitude_c: f32,
    /// Gaussian noise standard deviation (°C).
    pub noise_std_c: f32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            annual_mean_c: 9.0,
            annual_amplitude_c: 10.0,
            daily_amplitude_c: 4.0,
            noise_std_c: 0.8,
        }
    }
}

/// Household occupancy profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OccupancyConfig {
    /// Always-on plug load (W).
    pub base_load_w: f32,
    /// Additional peak-hour plug load (W).
    pub peak_load_w: f32,
    /// Peak hot water heat draw (W thermal).
    pub hot_water_peak_w: f32,
    /// Gaussian noise standard deviation (W).
    pub noise_std_w: f32,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            base_load_w: 150.0,
            peak_load_w: 900.0,
            hot_water_peak_w: 1500.0,
            noise_std_w: 40.0,
        }
    }
}

/// Heat pump parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatPumpConfig {
    /// Thermal output at the rating point (W).
    pub rated_thermal_power_w: f32,
    /// Fraction of the Carnot COP achieved (0..1).
    pub carnot_efficiency: f32,
    /// Enforce minimum running/idle times.
    pub cycling_mode: bool,
    /// Minimum running time (s); required when `cycling_mode` is set.
    pub minimum_running_time_s: Option<u32>,
    /// Minimum idle time (s); required when `cycling_mode` is set.
    pub minimum_idle_time_s: Option<u32>,
}

impl Default for HeatPumpConfig {
    fn default() -> Self {
        Self {
            rated_thermal_power_w: 8000.0,
            carnot_efficiency: 0.4,
            cycling_mode: true,
            minimum_running_time_s: Some(600),
            minimum_idle_time_s: Some(600),
        }
    }
}

/// Heat pump controller parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Controller mode: 1 = heating/off, 2 = heating/cooling/off.
    pub mode: u8,
    /// Target storage water temperature (°C).
    pub set_flow_temperature_c: f32,
    /// Hysteresis half-band (°C, must be > 0).
    pub offset_c: f32,
    /// Daily average above which heating is blocked (°C); omit to disable.
    pub heating_threshold_c: Option<f32>,
    /// Daily average below which cooling is blocked (°C); omit to disable.
    pub cooling_threshold_c: Option<f32>,
    /// Heat distribution is floor heating; required for mode 2 cooling.
    pub floor_heating: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode: 1,
            set_flow_temperature_c: 48.0,
            offset_c: 5.0,
            heating_threshold_c: Some(16.0),
            cooling_threshold_c: Some(20.0),
            floor_heating: false,
        }
    }
}

/// Hot water storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Tank volume in liters (must be > 0).
    pub volume_l: f32,
    /// Water temperature at simulation start (°C).
    pub initial_temperature_c: f32,
    /// Room temperature for standing losses (°C).
    pub ambient_temperature_c: f32,
    /// Standing loss coefficient (W/K, must be >= 0).
    pub loss_w_per_k: f32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            volume_l: 500.0,
            initial_temperature_c: 50.0,
            ambient_temperature_c: 20.0,
            loss_w_per_k: 3.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.days"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: a mid-size household with a cycling
    /// heat pump on a winter day.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            weather: WeatherConfig::default(),
            occupancy: OccupancyConfig::default(),
            heat_pump: HeatPumpConfig::default(),
            controller: ControllerConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    /// Returns the passive-house preset: small heat pump, low flow
    /// temperature, floor heating with cooling enabled.
    pub fn passive_house() -> Self {
        Self {
            heat_pump: HeatPumpConfig {
                rated_thermal_power_w: 3000.0,
                carnot_efficiency: 0.45,
                ..HeatPumpConfig::default()
            },
            controller: ControllerConfig {
                mode: 2,
                set_flow_temperature_c: 35.0,
                offset_c: 3.0,
                floor_heating: true,
                ..ControllerConfig::default()
            },
            occupancy: OccupancyConfig {
                base_load_w: 120.0,
                peak_load_w: 700.0,
                hot_water_peak_w: 1200.0,
                ..OccupancyConfig::default()
            },
            storage: StorageConfig {
                volume_l: 300.0,
                initial_temperature_c: 38.0,
                ..StorageConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the cold-snap preset: severe winter, oversized demand.
    pub fn cold_snap() -> Self {
        Self {
            weather: WeatherConfig {
                annual_mean_c: 2.0,
                annual_amplitude_c: 14.0,
                daily_amplitude_c: 6.0,
                ..WeatherConfig::default()
            },
            heat_pump: HeatPumpConfig {
                rated_thermal_power_w: 12000.0,
                ..HeatPumpConfig::default()
            },
            occupancy: OccupancyConfig {
                hot_water_peak_w: 2200.0,
                ..OccupancyConfig::default()
            },
            storage: StorageConfig {
                volume_l: 800.0,
                loss_w_per_k: 4.0,
                ..StorageConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "passive_house", "cold_snap"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "passive_house" => Ok(Self::passive_house()),
            "cold_snap" => Ok(Self::cold_snap()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.days == 0 {
            errors.push(ConfigError {
                field: "simulation.days".into(),
                message: "must be > 0".into(),
            });
        }
        if s.seconds_per_timestep == 0 || 86400 % s.seconds_per_timestep != 0 {
            errors.push(ConfigError {
                field: "simulation.seconds_per_timestep".into(),
                message: "must be > 0 and divide 86400".into(),
            });
        }
        if s.max_iterations == 0 {
            errors.push(ConfigError {
                field: "simulation.max_iterations".into(),
                message: "must be > 0".into(),
            });
        }
        if s.tolerance <= 0.0 {
            errors.push(ConfigError {
                field: "simulation.tolerance".into(),
                message: "must be > 0".into(),
            });
        }

        let hp = &self.heat_pump;
        if hp.rated_thermal_power_w <= 0.0 {
            errors.push(ConfigError {
                field: "heat_pump.rated_thermal_power_w".into(),
                message: "must be > 0".into(),
            });
        }
        if hp.carnot_efficiency <= 0.0 || hp.carnot_efficiency > 1.0 {
            errors.push(ConfigError {
                field: "heat_pump.carnot_efficiency".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if hp.cycling_mode
            && (hp.minimum_running_time_s.is_none() || hp.minimum_idle_time_s.is_none())
        {
            errors.push(ConfigError {
                field: "heat_pump.cycling_mode".into(),
                message: "requires minimum_running_time_s and minimum_idle_time_s".into(),
            });
        }

        let c = &self.controller;
        if c.mode != 1 && c.mode != 2 {
            errors.push(ConfigError {
                field: "controller.mode".into(),
                message: format!("must be 1 or 2, got {}", c.mode),
            });
        }
        if c.mode == 2 && !c.floor_heating {
            errors.push(ConfigError {
                field: "controller.mode".into(),
                message: "mode 2 (cooling) requires controller.floor_heating".into(),
            });
        }
        if c.offset_c <= 0.0 {
            errors.push(ConfigError {
                field: "controller.offset_c".into(),
                message: "must be > 0".into(),
            });
        }

        let st = &self.storage;
        if st.volume_l <= 0.0 {
            errors.push(ConfigError {
                field: "storage.volume_l".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..=100.0).contains(&st.initial_temperature_c) {
            errors.push(ConfigError {
                field: "storage.initial_temperature_c".into(),
                message: "must be in [0.0, 100.0]".into(),
            });
        }
        if st.loss_w_per_k < 0.0 {
            errors.push(ConfigError {
                field: "storage.loss_w_per_k".into(),
                message: "must be >= 0".into(),
            });
        }

        let o = &self.occupancy;
        if o.base_load_w < 0.0 || o.peak_load_w < 0.0 || o.hot_water_peak_w < 0.0 {
            errors.push(ConfigError {
                field: "occupancy".into(),
                message: "load levels must be >= 0".into(),
            });
        }

        errors
    }
}
