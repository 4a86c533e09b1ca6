// crates/phgeo-core/src/choices.rs

//! # Choices
//!
//! The closed classification sets used by the hierarchy. Every variant has a
//! one-character storage code (what fixtures and snapshots carry) and a
//! display label. Both are part of the public contract: consumers compare
//! against `"1ST"`, never `"1st"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Island group where a region is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IslandGroup {
    #[serde(rename = "L")]
    Luzon,
    #[serde(rename = "V")]
    Visayas,
    #[serde(rename = "M")]
    Mindanao,
}

impl IslandGroup {
    pub const ALL: [IslandGroup; 3] = [
        IslandGroup::Luzon,
        IslandGroup::Visayas,
        IslandGroup::Mindanao,
    ];

    /// `(code, label)` pairs in declaration order.
    pub const CHOICES: [(&'static str, &'static str); 3] =
        [("L", "LUZON"), ("V", "VISAYAS"), ("M", "MINDANAO")];

    pub fn code(self) -> &'static str {
        match self {
            IslandGroup::Luzon => "L",
            IslandGroup::Visayas => "V",
            IslandGroup::Mindanao => "M",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IslandGroup::Luzon => "LUZON",
            IslandGroup::Visayas => "VISAYAS",
            IslandGroup::Mindanao => "MINDANAO",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }
}

/// Income classification for provinces and municipalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncomeClass {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "4")]
    Fourth,
    #[serde(rename = "5")]
    Fifth,
    #[serde(rename = "6")]
    Sixth,
    #[serde(rename = "S")]
    Special,
}

impl IncomeClass {
    pub const ALL: [IncomeClass; 7] = [
        IncomeClass::First,
        IncomeClass::Second,
        IncomeClass::Third,
        IncomeClass::Fourth,
        IncomeClass::Fifth,
        IncomeClass::Sixth,
        IncomeClass::Special,
    ];

    pub const CHOICES: [(&'static str, &'static str); 7] = [
        ("1", "1ST"),
        ("2", "2ND"),
        ("3", "3RD"),
        ("4", "4TH"),
        ("5", "5TH"),
        ("6", "6TH"),
        ("S", "SPECIAL"),
    ];

    pub fn code(self) -> &'static str {
        Self::CHOICES[self as usize].0
    }

    pub fn label(self) -> &'static str {
        Self::CHOICES[self as usize].1
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

/// Legal classification of a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CityClass {
    #[serde(rename = "C")]
    ComponentCity,
    #[serde(rename = "I")]
    IndependentComponentCity,
    #[serde(rename = "H")]
    HighlyUrbanizedCity,
}

impl CityClass {
    pub const ALL: [CityClass; 3] = [
        CityClass::ComponentCity,
        CityClass::IndependentComponentCity,
        CityClass::HighlyUrbanizedCity,
    ];

    pub const CHOICES: [(&'static str, &'static str); 3] =
        [("C", "CC"), ("I", "ICC"), ("H", "HUC")];

    pub fn code(self) -> &'static str {
        Self::CHOICES[self as usize].0
    }

    pub fn label(self) -> &'static str {
        Self::CHOICES[self as usize].1
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_label!(IslandGroup, IncomeClass, CityClass);

/// Names a choice table so field descriptors can refer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceSet {
    IslandGroup,
    IncomeClass,
    CityClass,
}

impl ChoiceSet {
    pub fn choices(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ChoiceSet::IslandGroup => &IslandGroup::CHOICES,
            ChoiceSet::IncomeClass => &IncomeClass::CHOICES,
            ChoiceSet::CityClass => &CityClass::CHOICES,
        }
    }

    pub fn contains(self, code: &str) -> bool {
        self.choices().iter().any(|(c, _)| *c == code)
    }
}
