//! 配置流程模块：API 密钥校验、配置条目创建，以及语音配置的增删改。
//!
//! Configuration flow. The host drives the steps; this module holds the
//! validation and bookkeeping behind them.

mod config_flow;
mod entry;
mod options_flow;

pub use config_flow::{validate_api_key, ConfigFlow};
pub use entry::{unique_id_for, ConfigEntry, EntryOptions};
pub use options_flow::{OptionsAction, OptionsFlow, ProfileForm};
