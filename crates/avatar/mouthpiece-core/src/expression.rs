//! Facial expressions and the driver that points their channels at 0 or 1.

use serde::{Deserialize, Serialize};

use crate::ids::ChannelHandle;
use crate::registry::{ChannelResolver, MorphChannelRegistry};

/// Discrete emotions; each one owns a morph channel of the same name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FacialExpression {
    Shock,
    Wonder,
    Alertness,
    Melancholy,
    Sadness,
    Laughter,
    Joy,
    Satisfaction,
    Terror,
    Fear,
    Disgust,
    Anger,
}

impl FacialExpression {
    pub const ALL: [FacialExpression; 12] = [
        FacialExpression::Shock,
        FacialExpression::Wonder,
        FacialExpression::Alertness,
        FacialExpression::Melancholy,
        FacialExpression::Sadness,
        FacialExpression::Laughter,
        FacialExpression::Joy,
        FacialExpression::Satisfaction,
        FacialExpression::Terror,
        FacialExpression::Fear,
        FacialExpression::Disgust,
        FacialExpression::Anger,
    ];

    pub fn channel_name(self) -> &'static str {
        match self {
            FacialExpression::Shock => "Shock",
            FacialExpression::Wonder => "Wonder",
            FacialExpression::Alertness => "Alertness",
            FacialExpression::Melancholy => "Melancholy",
            FacialExpression::Sadness => "Sadness",
            FacialExpression::Laughter => "Laughter",
            FacialExpression::Joy => "Joy",
            FacialExpression::Satisfaction => "Satisfaction",
            FacialExpression::Terror => "Terror",
            FacialExpression::Fear => "Fear",
            FacialExpression::Disgust => "Disgust",
            FacialExpression::Anger => "Anger",
        }
    }

    /// Exact, case-sensitive match on the channel name. Anything else is neutral.
    pub fn from_name(name: &str) -> Option<FacialExpression> {
        Self::ALL.iter().copied().find(|e| e.channel_name() == name)
    }
}

/// Expression channels present on the mounted mesh.
#[derive(Clone, Debug, Default)]
pub struct ExpressionDriver {
    channels: Vec<(FacialExpression, ChannelHandle)>,
}

impl ExpressionDriver {
    /// Bind every known expression the resolver can find; missing ones are skipped.
    pub fn bind(resolver: &dyn ChannelResolver) -> Self {
        let channels = FacialExpression::ALL
            .iter()
            .filter_map(|e| resolver.resolve(e.channel_name()).map(|h| (*e, h)))
            .collect();
        Self { channels }
    }

    pub fn channels(&self) -> &[(FacialExpression, ChannelHandle)] {
        &self.channels
    }

    /// Selected expression's channel targets 1, every other one 0.
    pub fn drive(
        &self,
        selected: Option<FacialExpression>,
        registry: &mut MorphChannelRegistry,
        rate: f32,
    ) {
        for (expr, handle) in &self.channels {
            let target = if Some(*expr) == selected { 1.0 } else { 0.0 };
            registry.set_target(*handle, target, rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> MorphChannelRegistry {
        let mut reg = MorphChannelRegistry::new();
        let targets: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        reg.register_mesh("Face", &targets, &[]);
        reg
    }

    #[test]
    fn names_round_trip() {
        for e in FacialExpression::ALL {
            assert_eq!(FacialExpression::from_name(e.channel_name()), Some(e));
        }
        assert_eq!(FacialExpression::from_name("joy"), None);
        assert_eq!(FacialExpression::from_name(""), None);
    }

    #[test]
    fn binds_only_present_channels() {
        let reg = registry_with(&["Joy", "Anger", "viseme_PP"]);
        let driver = ExpressionDriver::bind(&reg);
        let bound: Vec<_> = driver.channels().iter().map(|(e, _)| *e).collect();
        assert_eq!(bound, vec![FacialExpression::Joy, FacialExpression::Anger]);
    }

    #[test]
    fn selection_targets_one_channel() {
        let mut reg = registry_with(&["Joy", "Anger", "Fear"]);
        let driver = ExpressionDriver::bind(&reg);

        driver.drive(Some(FacialExpression::Joy), &mut reg, 0.1);
        assert_eq!(reg.target_by_name("Joy"), Some(1.0));
        assert_eq!(reg.target_by_name("Anger"), Some(0.0));
        assert_eq!(reg.target_by_name("Fear"), Some(0.0));

        driver.drive(None, &mut reg, 0.1);
        assert_eq!(reg.target_by_name("Joy"), Some(0.0));
    }

    #[test]
    fn selection_missing_from_mesh_is_neutral() {
        let mut reg = registry_with(&["Joy"]);
        let driver = ExpressionDriver::bind(&reg);
        driver.drive(Some(FacialExpression::Terror), &mut reg, 0.1);
        assert_eq!(reg.target_by_name("Joy"), Some(0.0));
    }
}
