// SPDX-License-Identifier: MIT

//! Config document: a single TOML file with nested groups, each
//! field-level-defaulted so a partial `jitrealm.toml` is valid.
//! Environment variables (`JITREALM_<GROUP>_<FIELD>`, upper-cased)
//! override the file; CLI flags (`cli.rs`) override both.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ServerGroup {
    pub port: u16,
    pub max_connections: usize,
    pub welcome_message: String,
    pub mud_name: String,
    pub version: String,
}

impl Default for ServerGroup {
    fn default() -> Self {
        Self {
            port: 4000,
            max_connections: 100,
            welcome_message: "Welcome to JitRealm.".to_string(),
            mud_name: "JitRealm".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PathsGroup {
    pub world_directory: PathBuf,
    pub save_directory: PathBuf,
    pub players_directory: PathBuf,
    pub save_file_name: String,
    pub start_room: String,
    pub player_blueprint: String,
}

impl Default for PathsGroup {
    fn default() -> Self {
        Self {
            world_directory: PathBuf::from("World"),
            save_directory: PathBuf::from("save"),
            players_directory: PathBuf::from("players"),
            save_file_name: "world.json".to_string(),
            start_room: "rooms/start".to_string(),
            player_blueprint: "players/default".to_string(),
        }
    }
}

impl PathsGroup {
    pub fn save_path(&self) -> PathBuf {
        self.save_directory.join(&self.save_file_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GameLoopGroup {
    pub loop_delay_ms: u64,
    pub default_heartbeat_seconds: u64,
    pub auto_save_enabled: bool,
    pub auto_save_interval_minutes: u64,
}

impl Default for GameLoopGroup {
    fn default() -> Self {
        Self {
            loop_delay_ms: 100,
            default_heartbeat_seconds: 10,
            auto_save_enabled: true,
            auto_save_interval_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CombatGroup {
    pub round_interval_seconds: u64,
    pub flee_chance_percent: u8,
}

impl Default for CombatGroup {
    fn default() -> Self {
        Self {
            round_interval_seconds: 2,
            flee_chance_percent: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SecurityGroup {
    pub hook_timeout_ms: u64,
    pub heartbeat_timeout_ms: u64,
}

impl Default for SecurityGroup {
    fn default() -> Self {
        Self {
            hook_timeout_ms: 50,
            heartbeat_timeout_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PlayerGroup {
    #[serde(rename = "StartingHP")]
    pub starting_hp: i64,
    pub carry_capacity: i64,
    pub regen_per_heartbeat: i64,
    pub xp_multiplier: f64,
    pub base_xp_per_level: i64,
}

impl Default for PlayerGroup {
    fn default() -> Self {
        Self {
            starting_hp: 20,
            carry_capacity: 100,
            regen_per_heartbeat: 1,
            xp_multiplier: 1.0,
            base_xp_per_level: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PerformanceGroup {
    pub force_gc_on_unload: bool,
    pub force_gc_every_n_unloads: u32,
}

/// Parsed but never consulted by core logic — threaded through to the
/// external collaborators that actually care about it. The driver treats
/// its presence/absence as opaque.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LlmGroup {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
}

/// Same opaqueness as `LlmGroup`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MemoryGroup {
    pub enabled: bool,
    pub connection_string: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(rename = "Server")]
    pub server: ServerGroup,
    #[serde(rename = "Paths")]
    pub paths: PathsGroup,
    #[serde(rename = "GameLoop")]
    pub game_loop: GameLoopGroup,
    #[serde(rename = "Combat")]
    pub combat: CombatGroup,
    #[serde(rename = "Security")]
    pub security: SecurityGroup,
    #[serde(rename = "Player")]
    pub player: PlayerGroup,
    #[serde(rename = "Performance")]
    pub performance: PerformanceGroup,
    #[serde(rename = "Llm")]
    pub llm: LlmGroup,
    #[serde(rename = "Memory")]
    pub memory: MemoryGroup,
}

/// Loads `jitrealm.toml` from `path` if it exists (a missing file is not an
/// error — every group field-defaults), then applies `JITREALM_*`
/// environment overrides.
pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
    let mut config = if path.exists() {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)?
    } else {
        AppConfig::default()
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Applies `JITREALM_<GROUP>_<FIELD>` overrides. Only the fields an
/// operator would plausibly want to flip from the environment without
/// editing the TOML file are covered here; anything more exotic belongs in
/// the config file itself.
fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(v) = env_u16("JITREALM_SERVER_PORT") {
        config.server.port = v;
    }
    if let Some(v) = env_string("JITREALM_SERVER_MUDNAME") {
        config.server.mud_name = v;
    }
    if let Some(v) = env_string("JITREALM_SERVER_WELCOMEMESSAGE") {
        config.server.welcome_message = v;
    }
    if let Some(v) = env_usize("JITREALM_SERVER_MAXCONNECTIONS") {
        config.server.max_connections = v;
    }
    if let Some(v) = env_path("JITREALM_PATHS_WORLDDIRECTORY") {
        config.paths.world_directory = v;
    }
    if let Some(v) = env_path("JITREALM_PATHS_SAVEDIRECTORY") {
        config.paths.save_directory = v;
    }
    if let Some(v) = env_path("JITREALM_PATHS_PLAYERSDIRECTORY") {
        config.paths.players_directory = v;
    }
    if let Some(v) = env_string("JITREALM_PATHS_STARTROOM") {
        config.paths.start_room = v;
    }
    if let Some(v) = env_u64("JITREALM_GAMELOOP_LOOPDELAYMS") {
        config.game_loop.loop_delay_ms = v;
    }
    if let Some(v) = env_u64("JITREALM_SECURITY_HOOKTIMEOUTMS") {
        config.security.hook_timeout_ms = v;
    }
    if let Some(v) = env_u64("JITREALM_SECURITY_HEARTBEATTIMEOUTMS") {
        config.security.heartbeat_timeout_ms = v;
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

fn env_u16(key: &str) -> Option<u16> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_string(key).and_then(|v| v.parse().ok())
}
