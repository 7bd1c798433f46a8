mod io_utils;
mod math;
mod readers;
mod util;

pub use io_utils::create_writer;
pub use math::median_in_place;
pub use readers::open_text_reader;
pub use util::{handle_error_and_exit, sample_name_from_path, Result};
