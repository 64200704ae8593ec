//! Brain activity and the mood classifier.
//!
//! Activity is a reading for each of six fixed regions. The classifier picks
//! the most active region and maps it to a mood tag:
//!
//! | Region     | Mood  |
//! |------------|-------|
//! | prefrontal | alpha |
//! | limbic     | gamma |
//! | visual     | beta  |
//! | auditory   | delta |
//! | motor      | theta |
//! | sensory    | theta |

use data_loader::MoodTag;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum jitter applied around a region's baseline when simulating
pub const SIMULATION_JITTER: f32 = 0.2;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown brain region: {0}")]
pub struct UnknownRegion(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainRegion {
    Prefrontal,
    Motor,
    Sensory,
    Visual,
    Auditory,
    Limbic,
}

impl BrainRegion {
    /// Every region, in classification order (earlier wins ties)
    pub const ALL: [BrainRegion; 6] = [
        BrainRegion::Prefrontal,
        BrainRegion::Motor,
        BrainRegion::Sensory,
        BrainRegion::Visual,
        BrainRegion::Auditory,
        BrainRegion::Limbic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BrainRegion::Prefrontal => "prefrontal",
            BrainRegion::Motor => "motor",
            BrainRegion::Sensory => "sensory",
            BrainRegion::Visual => "visual",
            BrainRegion::Auditory => "auditory",
            BrainRegion::Limbic => "limbic",
        }
    }

    /// Resting activity used as the center of simulated readings
    pub fn baseline(&self) -> f32 {
        match self {
            BrainRegion::Prefrontal => 0.5,
            BrainRegion::Motor => 0.3,
            BrainRegion::Sensory => 0.4,
            BrainRegion::Visual => 0.7,
            BrainRegion::Auditory => 0.2,
            BrainRegion::Limbic => 0.6,
        }
    }

    pub fn mood(&self) -> MoodTag {
        match self {
            BrainRegion::Prefrontal => MoodTag::Alpha,
            BrainRegion::Limbic => MoodTag::Gamma,
            BrainRegion::Visual => MoodTag::Beta,
            BrainRegion::Auditory => MoodTag::Delta,
            BrainRegion::Motor | BrainRegion::Sensory => MoodTag::Theta,
        }
    }
}

impl fmt::Display for BrainRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrainRegion {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        BrainRegion::ALL
            .into_iter()
            .find(|region| region.name() == lower)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

/// Activity intensity per region
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainActivity {
    pub prefrontal: f32,
    pub motor: f32,
    pub sensory: f32,
    pub visual: f32,
    pub auditory: f32,
    pub limbic: f32,
}

impl BrainActivity {
    /// Every region at its baseline
    pub fn baseline() -> Self {
        let mut activity = Self::default();
        for region in BrainRegion::ALL {
            activity.set(region, region.baseline());
        }
        activity
    }

    /// Baselines jittered by up to `SIMULATION_JITTER`, clamped to [0, 1]
    pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut activity = Self::default();
        for region in BrainRegion::ALL {
            let jitter = rng.random_range(-SIMULATION_JITTER..=SIMULATION_JITTER);
            activity.set(region, (region.baseline() + jitter).clamp(0.0, 1.0));
        }
        activity
    }

    /// Build from named readings; regions left out stay at zero
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, UnknownRegion>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut activity = Self::default();
        for (name, value) in pairs {
            activity.set(name.parse()?, value);
        }
        Ok(activity)
    }

    pub fn get(&self, region: BrainRegion) -> f32 {
        match region {
            BrainRegion::Prefrontal => self.prefrontal,
            BrainRegion::Motor => self.motor,
            BrainRegion::Sensory => self.sensory,
            BrainRegion::Visual => self.visual,
            BrainRegion::Auditory => self.auditory,
            BrainRegion::Limbic => self.limbic,
        }
    }

    pub fn set(&mut self, region: BrainRegion, value: f32) {
        let slot = match region {
            BrainRegion::Prefrontal => &mut self.prefrontal,
            BrainRegion::Motor => &mut self.motor,
            BrainRegion::Sensory => &mut self.sensory,
            BrainRegion::Visual => &mut self.visual,
            BrainRegion::Auditory => &mut self.auditory,
            BrainRegion::Limbic => &mut self.limbic,
        };
        *slot = value;
    }

    /// Readings in classification order
    pub fn iter(&self) -> impl Iterator<Item = (BrainRegion, f32)> + '_ {
        BrainRegion::ALL.into_iter().map(|region| (region, self.get(region)))
    }
}

/// The most active region; the first in `BrainRegion::ALL` wins ties
///
/// NaN readings never win.
pub fn dominant_region(activity: &BrainActivity) -> BrainRegion {
    let mut best = BrainRegion::ALL[0];
    let mut best_value = activity.get(best);
    for (region, value) in activity.iter().skip(1) {
        if value > best_value || (best_value.is_nan() && !value.is_nan()) {
            best = region;
            best_value = value;
        }
    }
    best
}

pub fn mood_for_region(region: BrainRegion) -> MoodTag {
    region.mood()
}

/// Mood tag for a reading
pub fn classify(activity: &BrainActivity) -> MoodTag {
    mood_for_region(dominant_region(activity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_prefrontal_peak_is_alpha() {
        let activity = BrainActivity::from_pairs([
            ("prefrontal", 0.9),
            ("motor", 0.1),
            ("sensory", 0.1),
            ("visual", 0.1),
            ("auditory", 0.1),
            ("limbic", 0.1),
        ])
        .unwrap();
        assert_eq!(dominant_region(&activity), BrainRegion::Prefrontal);
        assert_eq!(classify(&activity), MoodTag::Alpha);
    }

    #[test]
    fn test_each_region_maps_to_its_mood() {
        let expected = [
            (BrainRegion::Prefrontal, MoodTag::Alpha),
            (BrainRegion::Motor, MoodTag::Theta),
            (BrainRegion::Sensory, MoodTag::Theta),
            (BrainRegion::Visual, MoodTag::Beta),
            (BrainRegion::Auditory, MoodTag::Delta),
            (BrainRegion::Limbic, MoodTag::Gamma),
        ];
        for (region, mood) in expected {
            let mut activity = BrainActivity::default();
            activity.set(region, 0.8);
            assert_eq!(classify(&activity), mood, "region {}", region);
        }
    }

    #[test]
    fn test_ties_resolve_in_region_order() {
        let mut activity = BrainActivity::default();
        activity.set(BrainRegion::Limbic, 0.7);
        activity.set(BrainRegion::Visual, 0.7);
        assert_eq!(dominant_region(&activity), BrainRegion::Visual);

        // All equal: the first region wins
        assert_eq!(dominant_region(&BrainActivity::default()), BrainRegion::Prefrontal);
    }

    #[test]
    fn test_nan_never_wins() {
        let mut activity = BrainActivity::default();
        activity.prefrontal = f32::NAN;
        activity.auditory = 0.3;
        assert_eq!(dominant_region(&activity), BrainRegion::Auditory);
    }

    #[test]
    fn test_baseline_favors_visual() {
        assert_eq!(classify(&BrainActivity::baseline()), MoodTag::Beta);
    }

    #[test]
    fn test_simulation_stays_near_baseline() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let activity = BrainActivity::simulate(&mut rng);
            for (region, value) in activity.iter() {
                assert!((0.0..=1.0).contains(&value));
                assert!((value - region.baseline()).abs() <= SIMULATION_JITTER + 1e-6);
            }
        }
    }

    #[test]
    fn test_region_parsing() {
        assert_eq!("Limbic".parse::<BrainRegion>(), Ok(BrainRegion::Limbic));
        assert_eq!(
            "cerebellum".parse::<BrainRegion>(),
            Err(UnknownRegion("cerebellum".to_string()))
        );
        assert!(BrainActivity::from_pairs([("hippocampus", 1.0)]).is_err());
    }

    #[test]
    fn test_activity_serializes_by_region_name() {
        let json = serde_json::to_value(BrainActivity::baseline()).unwrap();
        assert_eq!(json["visual"], serde_json::json!(0.7_f32));
        assert_eq!(json.as_object().unwrap().len(), 6);
    }
}
