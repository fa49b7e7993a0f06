//! `divert check` – evaluate the interception rules for one download.

use divert_core::config::DivertConfig;
use divert_core::events::DownloadItem;
use divert_core::policy::{self, InterceptDecision};

pub fn run_check(cfg: &DivertConfig, filename: &str, size: i64, referrer: Option<&str>) {
    let item = DownloadItem {
        id: 0,
        filename: filename.to_string(),
        url: String::new(),
        final_url: None,
        file_size: size,
        referrer: referrer.map(str::to_string),
    };
    match policy::decide(&item, cfg) {
        InterceptDecision::Intercept => println!("intercept: {filename}"),
        InterceptDecision::Skip(reason) => println!("skip: {reason}"),
    }
}
