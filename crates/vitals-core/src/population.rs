// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::VitalsError;
use std::collections::HashSet;

/// Number of columns in the metadata table: user_id, age, gender.
pub const METADATA_COLUMNS: usize = 3;

/// Binary gender code carried in the metadata table.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
    Male = 0,
    Female = 1,
}

impl Gender {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, VitalsError> {
        match code {
            0 => Ok(Self::Male),
            1 => Ok(Self::Female),
            _ => Err(VitalsError::invalid_input(format!(
                "gender code must be 0 or 1, got {code}"
            ))),
        }
    }
}

/// One metadata row.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: u32,
    pub age: u8,
    pub gender: Gender,
}

/// Metadata table. Row `i` describes user `i` on the tensor's user axis.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Population {
    profiles: Vec<UserProfile>,
}

impl Population {
    pub fn new(profiles: Vec<UserProfile>) -> Result<Self, VitalsError> {
        if profiles.is_empty() {
            return Err(VitalsError::invalid_input("population must contain >= 1 user"));
        }
        let mut seen = HashSet::with_capacity(profiles.len());
        for profile in &profiles {
            if !seen.insert(profile.user_id) {
                return Err(VitalsError::invalid_input(format!(
                    "duplicate user_id {} in population",
                    profile.user_id
                )));
            }
        }
        Ok(Self { profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> &[UserProfile] {
        &self.profiles
    }

    /// User id at a position on the user axis.
    pub fn user_id(&self, position: usize) -> Option<u32> {
        self.profiles.get(position).map(|p| p.user_id)
    }

    pub fn user_ids(&self) -> Vec<u32> {
        self.profiles.iter().map(|p| p.user_id).collect()
    }

    pub fn ages(&self) -> Vec<f64> {
        self.profiles.iter().map(|p| f64::from(p.age)).collect()
    }

    /// `(rows, columns)` of the metadata table.
    pub fn shape(&self) -> (usize, usize) {
        (self.profiles.len(), METADATA_COLUMNS)
    }

    /// Rows as `[user_id, age, gender_code]`.
    pub fn as_rows(&self) -> Vec<[u32; METADATA_COLUMNS]> {
        self.profiles
            .iter()
            .map(|p| [p.user_id, u32::from(p.age), u32::from(p.gender.code())])
            .collect()
    }
}
