//! Core types for brewer cloud records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProfileValidationError;

/// Fields assigned by the cloud service that must never be sent back when
/// creating a profile (e.g. when restoring a backup).
pub const SERVER_FIELDS: &[&str] = &[
    "id",
    "createdAt",
    "deletedAt",
    "lastUsedTime",
    "sharedFrom",
    "isDefaultProfile",
    "instantBrew",
    "folder",
    "duration",
    "lastGBQuantity",
];

/// Session information from authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
}

/// Brewing parameters for one profile, as accepted by the cloud API.
///
/// Core settings (ratio, bloom) are shared between single-serve and batch
/// brews; pulse settings are independent per mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeProfile {
    /// 0 = standard pour-over profile.
    pub profile_type: i64,
    pub title: String,
    /// Coffee-to-water ratio, 14.0..=20.0 in 0.5 steps.
    pub ratio: f64,
    pub bloom_enabled: bool,
    /// Bloom water multiplier, 1.0..=3.0 in 0.5 steps.
    pub bloom_ratio: f64,
    /// Bloom phase length in seconds, 1..=120.
    pub bloom_duration: u32,
    /// Bloom water temperature in celsius, 50.0..=99.0.
    pub bloom_temperature: f64,
    pub ss_pulses_enabled: bool,
    /// Single-serve pour count, 1..=10.
    pub ss_pulse_count: u32,
    /// Seconds between single-serve pours, 5..=60.
    pub ss_pulse_time: u32,
    /// One temperature per single-serve pulse, each 50.0..=99.0.
    pub ss_pulse_temperatures: Vec<f64>,
    pub batch_pulses_enabled: bool,
    /// Batch pour count, 1..=10.
    pub batch_pulse_count: u32,
    /// Seconds between batch pours, 5..=60.
    pub batch_pulse_time: u32,
    /// One temperature per batch pulse, each 50.0..=99.0.
    pub batch_pulse_temperatures: Vec<f64>,
}

/// A profile as returned by the cloud service: brew parameters plus the
/// server-assigned bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    #[serde(flatten)]
    pub profile: CoffeeProfile,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    /// Millisecond timestamp of the last brew with this profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_from: Option<String>,
    #[serde(default)]
    pub is_default_profile: bool,
    /// Any server fields this client does not model explicitly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// True if `v` lands on a 0.5 increment.
fn is_half_step(v: f64) -> bool {
    let doubled = v * 2.0;
    (doubled - doubled.round()).abs() < 1e-9
}

impl CoffeeProfile {
    /// Validate ranges and step increments before sending to the cloud.
    ///
    /// The cloud service enforces the same limits; validating locally keeps
    /// bad values from ever leaving the process and gives better messages.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.title.trim().is_empty() {
            return Err(ProfileValidationError::EmptyTitle);
        }

        if !(14.0..=20.0).contains(&self.ratio) || !is_half_step(self.ratio) {
            return Err(ProfileValidationError::Ratio(self.ratio));
        }

        if !(1.0..=3.0).contains(&self.bloom_ratio) || !is_half_step(self.bloom_ratio) {
            return Err(ProfileValidationError::BloomRatio(self.bloom_ratio));
        }

        if !(1..=120).contains(&self.bloom_duration) {
            return Err(ProfileValidationError::BloomDuration(self.bloom_duration));
        }

        if !(50.0..=99.0).contains(&self.bloom_temperature) {
            return Err(ProfileValidationError::BloomTemperature(
                self.bloom_temperature,
            ));
        }

        Self::validate_pulses(
            "single-serve",
            self.ss_pulse_count,
            self.ss_pulse_time,
            &self.ss_pulse_temperatures,
        )?;
        Self::validate_pulses(
            "batch",
            self.batch_pulse_count,
            self.batch_pulse_time,
            &self.batch_pulse_temperatures,
        )?;

        Ok(())
    }

    fn validate_pulses(
        mode: &'static str,
        count: u32,
        seconds: u32,
        temps: &[f64],
    ) -> Result<(), ProfileValidationError> {
        if !(1..=10).contains(&count) {
            return Err(ProfileValidationError::PulseCount { mode, count });
        }

        if !(5..=60).contains(&seconds) {
            return Err(ProfileValidationError::PulseInterval { mode, seconds });
        }

        if temps.len() != count as usize {
            return Err(ProfileValidationError::PulseTemperatureCount {
                mode,
                count,
                temps: temps.len(),
            });
        }

        for &temp in temps {
            if !(50.0..=99.0).contains(&temp) {
                return Err(ProfileValidationError::PulseTemperature { mode, temp });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_profile() -> CoffeeProfile {
        CoffeeProfile {
            profile_type: 0,
            title: "Fruit Cake".to_string(),
            ratio: 16.0,
            bloom_enabled: true,
            bloom_ratio: 3.0,
            bloom_duration: 60,
            bloom_temperature: 87.5,
            ss_pulses_enabled: true,
            ss_pulse_count: 2,
            ss_pulse_time: 25,
            ss_pulse_temperatures: vec![95.0, 92.5],
            batch_pulses_enabled: true,
            batch_pulse_count: 2,
            batch_pulse_time: 25,
            batch_pulse_temperatures: vec![95.0, 92.5],
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(valid_profile().validate().is_ok());
    }

    #[test]
    fn ratio_must_be_half_step() {
        let mut p = valid_profile();
        p.ratio = 16.3;
        assert!(matches!(
            p.validate(),
            Err(ProfileValidationError::Ratio(_))
        ));

        p.ratio = 16.5;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn ratio_range_enforced() {
        let mut p = valid_profile();
        p.ratio = 13.5;
        assert!(p.validate().is_err());
        p.ratio = 20.5;
        assert!(p.validate().is_err());
        p.ratio = 20.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn pulse_temperatures_must_match_count() {
        let mut p = valid_profile();
        p.ss_pulse_count = 3;
        assert!(matches!(
            p.validate(),
            Err(ProfileValidationError::PulseTemperatureCount { .. })
        ));
    }

    #[test]
    fn pulse_interval_range_enforced() {
        let mut p = valid_profile();
        p.batch_pulse_time = 4;
        assert!(matches!(
            p.validate(),
            Err(ProfileValidationError::PulseInterval { mode: "batch", .. })
        ));
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Every half-step ratio in range validates; every off-step
            // value in range is rejected.
            #[test]
            fn half_step_ratios_validate(step in 28u32..=40) {
                let mut p = valid_profile();
                p.ratio = f64::from(step) / 2.0;
                prop_assert!(p.validate().is_ok());
            }

            #[test]
            fn off_step_ratios_rejected(step in 28u32..40, off in 0.01f64..0.49) {
                let mut p = valid_profile();
                p.ratio = f64::from(step) / 2.0 + off;
                prop_assert!(p.validate().is_err());
            }

            #[test]
            fn bloom_temperature_range_is_sharp(temp in 0.0f64..150.0) {
                let mut p = valid_profile();
                p.bloom_temperature = temp;
                prop_assert_eq!(
                    p.validate().is_ok(),
                    (50.0..=99.0).contains(&temp)
                );
            }
        }
    }

    #[test]
    fn stored_profile_roundtrip_keeps_unknown_fields() {
        let raw = serde_json::json!({
            "id": "p-123",
            "profileType": 0,
            "title": "Morning",
            "ratio": 16.0,
            "bloomEnabled": true,
            "bloomRatio": 2.5,
            "bloomDuration": 30,
            "bloomTemperature": 93.5,
            "ssPulsesEnabled": true,
            "ssPulseCount": 3,
            "ssPulseTime": 20,
            "ssPulseTemperatures": [92.0, 92.0, 90.5],
            "batchPulsesEnabled": true,
            "batchPulseCount": 1,
            "batchPulseTime": 20,
            "batchPulseTemperatures": [92.0],
            "lastUsedTime": 1736000000000i64,
            "instantBrew": false,
            "folder": "favorites"
        });

        let stored: StoredProfile = serde_json::from_value(raw).unwrap();
        assert_eq!(stored.id, "p-123");
        assert_eq!(stored.profile.title, "Morning");
        assert_eq!(stored.last_used_time, Some(1736000000000));
        // Unmodeled server fields survive a roundtrip
        let back = serde_json::to_value(&stored).unwrap();
        assert_eq!(back["folder"], "favorites");
    }
}
