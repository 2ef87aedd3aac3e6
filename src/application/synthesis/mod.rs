//! Synthesis - 合成后端
//!
//! 签名 → 查缓存 → 未命中时获取 → 写缓存

mod backend;
mod error;
mod factory;
mod human_voice;
mod machine_voice;
mod retry;

pub use backend::{SegmentRequest, SynthesisBackend, SynthesisResult};
pub use error::SynthesisError;
pub use factory::SynthesisBackendFactory;
pub use human_voice::{HumanVoiceBackend, HUMAN_API};
pub use machine_voice::{MachineVoiceBackend, API_VERSION, CONCAT_API};
pub use retry::RetryPolicy;
