pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{
    is_valid_url, matches_url_shape, normalize_link, origin_prefix, video_id_from_url,
};
