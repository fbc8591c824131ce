//! Configuration module

mod site;

pub use site::parse_bool_flag;
pub use site::ChatConfig;
pub use site::FeedConfig;
pub use site::HighlightConfig;
pub use site::RobotsConfig;
pub use site::SiteConfig;
pub use site::DRAFT_ENV_VARS;
