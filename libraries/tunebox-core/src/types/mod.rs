mod format;
mod song;
mod track;

pub use format::{format_position, sanitize_file_stem};
pub use song::DownloadedSong;
pub use track::{Track, TrackInfo};
