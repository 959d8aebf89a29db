// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Personal settings of a user, stored on the user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Daily calorie target in kcal.
    #[serde(default = "default_calorie_target")]
    pub calorie_target: u32,

    /// Body weight in kilograms, zero if unknown.
    #[serde(default)]
    pub weight: u32,
}

/// Calorie target used until the user configures one.
pub const DEFAULT_CALORIE_TARGET: u32 = 2100;

const fn default_calorie_target() -> u32 {
    DEFAULT_CALORIE_TARGET
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calorie_target: DEFAULT_CALORIE_TARGET,
            weight: 0,
        }
    }
}

impl Settings {
    /// Returns the settings with the given changes applied.
    ///
    /// Zero and unchanged values are ignored, a calorie target or weight of
    /// zero is never a meaningful input.
    #[must_use]
    pub fn with(self, calorie_target: Option<u32>, weight: Option<u32>) -> Self {
        Self {
            calorie_target: calorie_target
                .filter(|&a| a != 0)
                .unwrap_or(self.calorie_target),
            weight: weight.filter(|&a| a != 0).unwrap_or(self.weight),
        }
    }
}
