//! Domain types and DTOs

pub mod settings;

pub use settings::{
    SettingsEditable, SettingsUpdate, UpdateSettingsRequest, UserSettings, UserSettingsResponse,
};
