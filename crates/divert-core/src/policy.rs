//! Interception decision: a pure function of the download and the config.

use std::fmt;

use crate::config::DivertConfig;
use crate::events::DownloadItem;
use crate::filename;

/// Why a download was left to the native download manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    TooSmall { size: u64, min: u64 },
    BlacklistedReferrer { host: String, domain: String },
    UnparseableReferrer { referrer: String },
    ExtensionNotMonitored { extension: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "interception disabled"),
            SkipReason::TooSmall { size, min } => {
                write!(f, "file too small: {} < {}", size, min)
            }
            SkipReason::BlacklistedReferrer { host, domain } => {
                write!(f, "referrer {} matches blacklisted domain {}", host, domain)
            }
            SkipReason::UnparseableReferrer { referrer } => {
                write!(f, "referrer has no hostname: {:?}", referrer)
            }
            SkipReason::ExtensionNotMonitored { extension } => {
                write!(f, "extension not monitored: {:?}", extension)
            }
        }
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptDecision {
    Intercept,
    Skip(SkipReason),
}

impl InterceptDecision {
    pub fn is_intercept(&self) -> bool {
        matches!(self, InterceptDecision::Intercept)
    }
}

/// Lower-cased text after the last `.` of `filename`, or "" when there is no dot.
///
/// Only the final path component is considered, so a dot in a directory name
/// never counts.
pub fn file_extension(filename: &str) -> String {
    match filename::basename(filename).rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Hostname of a referrer URL; `None` when it does not parse or has no host.
pub fn referrer_host(referrer: &str) -> Option<String> {
    url::Url::parse(referrer)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

/// Evaluate the interception rules in order, stopping at the first failure:
/// enabled flag, minimum size (inclusive), referrer blacklist, extension.
///
/// A referrer that is present but yields no hostname cannot be checked
/// against the blacklist, so the download is left alone.
pub fn decide(item: &DownloadItem, cfg: &DivertConfig) -> InterceptDecision {
    if !cfg.enabled {
        return InterceptDecision::Skip(SkipReason::Disabled);
    }

    let size = item.declared_size();
    if size < cfg.min_file_size {
        return InterceptDecision::Skip(SkipReason::TooSmall {
            size,
            min: cfg.min_file_size,
        });
    }

    if let Some(referrer) = item.referrer() {
        let Some(host) = referrer_host(referrer) else {
            return InterceptDecision::Skip(SkipReason::UnparseableReferrer {
                referrer: referrer.to_string(),
            });
        };
        if let Some(domain) = cfg.blacklisted_domain_in(&host) {
            return InterceptDecision::Skip(SkipReason::BlacklistedReferrer {
                domain: domain.to_string(),
                host,
            });
        }
    }

    let extension = file_extension(&item.filename);
    if !cfg.monitors_extension(&extension) {
        return InterceptDecision::Skip(SkipReason::ExtensionNotMonitored { extension });
    }

    InterceptDecision::Intercept
}
