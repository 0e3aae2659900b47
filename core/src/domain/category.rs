//! Consumable categories

use crate::common::errors::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed set of consumable types a record can belong to
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	EnumIter,
	AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
	Whisky,
	Rum,
	Wine,
	Cigar,
	Coffee,
}

impl Category {
	/// Every category, in the order the collector offers them
	pub fn all() -> impl Iterator<Item = Category> {
		Self::iter()
	}

	/// Parse a category name, case insensitively
	pub fn parse(name: &str) -> Result<Self> {
		Self::from_str(name.trim()).map_err(|_| TrackerError::UnknownCategory(name.to_string()))
	}
}
