pub mod video;

pub use video::{VideoRequest, VideoResponse, VideoStatus};
