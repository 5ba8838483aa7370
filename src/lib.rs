pub mod catalog;
pub mod config;
pub mod content;
pub mod lint;
pub mod logger;
pub mod post_list;
pub mod report;
pub mod text_utils;
pub mod util;
#[cfg(test)]
mod test_data;
