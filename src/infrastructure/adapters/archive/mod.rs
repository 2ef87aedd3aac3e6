//! Archive Adapter - 真人录音归档客户端

mod fake_archive_client;
mod http_archive_client;

pub use fake_archive_client::FakeArchiveClient;
pub use http_archive_client::{HttpArchiveClient, HttpArchiveClientConfig};
