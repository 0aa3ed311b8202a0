//! Volume and mute state
//!
//! Volume level and mute are independent flags. The level handed to the
//! output device is `0.0` while muted, otherwise the stored level.

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to 0.0-1.0
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_level(level),
            muted: false,
        }
    }

    /// Set volume level
    ///
    /// Raising the level above zero while muted also unmutes: moving the
    /// slider up means the listener wants to hear audio. Setting zero never
    /// toggles the mute flag.
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
        if self.level > 0.0 && self.muted {
            self.muted = false;
        }
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level the output device should use
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.7)
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
        assert!(!vol.is_muted());
        assert_eq!(Volume::default().level(), 0.7);
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = Volume::new(0.5);

        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);

        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn raising_volume_unmutes() {
        let mut vol = Volume::new(0.7);
        vol.toggle_mute();
        assert!(vol.is_muted());

        vol.set_level(0.4);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.4);
    }

    #[test]
    fn zero_volume_does_not_mute() {
        let mut vol = Volume::new(0.7);
        vol.set_level(0.0);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.0);
    }

    #[test]
    fn zero_volume_keeps_existing_mute() {
        let mut vol = Volume::new(0.7);
        vol.toggle_mute();
        vol.set_level(0.0);
        assert!(vol.is_muted());
    }

    #[test]
    fn muted_effective_level_is_zero() {
        let mut vol = Volume::new(0.8);
        assert_eq!(vol.effective(), 0.8);

        vol.toggle_mute();
        assert_eq!(vol.effective(), 0.0);
        assert_eq!(vol.level(), 0.8); // Level preserved

        vol.toggle_mute();
        assert_eq!(vol.effective(), 0.8);
    }
}
