pub mod analyser;
pub mod arena;
pub mod blob;
pub mod config;
pub mod frame_meta;
pub mod frame_times;
pub mod mobility;
pub mod overlay;
pub mod palette;
pub mod report;
pub mod segmentation;
pub mod tracker;
pub mod video_meta;
