//! 语音配置模块：命名配置的存储，以及默认值、配置与调用参数的分层合并。
//!
//! Voice profiles: the named-profile store and the resolver that layers
//! defaults, a selected profile and per-call overrides into the final
//! synthesis parameters.

mod resolver;
mod store;
mod types;

pub use resolver::{resolve, resolve_traced, ResolutionBase};
pub use store::ProfileStore;
pub use types::{
    ResolvedParameters, StoredProfile, SynthesisRequest, TextNormalization, VoiceOverrides,
    VoiceProfile,
};
