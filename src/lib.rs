use async_trait::async_trait;

mod block;
mod config;
mod data;
mod error;
mod fetcher;
mod host;
pub mod html;
#[cfg(feature = "logging")]
mod logging;
mod machine;
mod utils;
pub mod view;

pub use block::{BlockParams, LinkPreviewBlock};
pub use config::{BlockConfig, PasteConfig, DEFAULT_PATTERN_KEY};
pub use data::{BlockData, LinkMeta, MetaImage, PartialBlockData};
pub use error::{FetchFailure, PreviewError};
pub use fetcher::{EndpointResponse, Fetcher, FetcherConfig, MetadataSource};
pub use host::{HostApi, Notification, NotificationStyle, TracingHost, DEFAULT_BLOCK_STYLE};
#[cfg(feature = "logging")]
pub use logging::{format_block_card, log_block_card, log_error_card, setup_logging, LogConfig};
pub use machine::{BlockMachine, BlockState, FetchOutcome, FetchTicket};
pub use utils::{clip_width, link_label};
pub use view::BlockView;

/// What a host editor needs from a block. The host constructs the block,
/// renders it, forwards claimed pastes and finally saves or drops it
/// depending on `validate`.
#[async_trait]
pub trait Block: Send + Sync {
    fn render(&self) -> BlockView;

    fn save(&self) -> BlockData;

    /// False means the block holds nothing worth keeping.
    fn validate(&self) -> bool;

    async fn on_paste_url(&self, url: &str) -> FetchOutcome;

    fn paste_config(&self) -> &PasteConfig;

    fn is_read_only_supported(&self) -> bool {
        true
    }

    /// Whether the host may insert line breaks inside the block instead of
    /// splitting it.
    fn enable_line_breaks(&self) -> bool {
        true
    }
}
