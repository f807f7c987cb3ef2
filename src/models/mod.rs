use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub mod playlist;

pub use playlist::*;

/// Which category view of the iptv-org data a pipeline run produces.
///
/// The first three read one index playlist whose `#EXTINF` lines carry a
/// `group-title`. `Streams` lists the per-country stream files and groups by
/// the two-letter prefix of each filename.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Genre,
    Language,
    Country,
    Streams,
}
