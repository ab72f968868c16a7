//! 提取模块：页面快照及其构建（HTML标签提取、可选的远程拉取）
pub mod html_extractor;
pub mod snapshot;
#[cfg(feature = "fetch")]
pub mod fetch;

pub use self::html_extractor::{ExtractedTags, HtmlExtractor};
pub use self::snapshot::{PageSnapshot, PageSnapshotBuilder};
#[cfg(feature = "fetch")]
pub use self::fetch::fetch_snapshot;
