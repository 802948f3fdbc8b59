//! 语音列表模块：远端语音目录的数据结构与按类别、关键词的过滤。

mod filter;
mod types;

pub use filter::{filter, VoiceFilter};
pub use types::VoiceSummary;
pub(crate) use types::VoicesResponse;
