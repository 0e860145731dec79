use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Run configuration. Dimensions and worker count are fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub turns: usize,
    pub threads: usize,
    pub image_width: usize,
    pub image_height: usize,
    /// How often the alive cell count is reported.
    pub tick_interval: Duration,
    /// Emit a `CellFlipped` event for every changed cell.
    pub track_flips: bool,
}

impl Params {
    pub fn new(image_width: usize, image_height: usize, turns: usize, threads: usize) -> Self {
        Params {
            turns,
            threads,
            image_width,
            image_height,
            tick_interval: DEFAULT_TICK_INTERVAL,
            track_flips: false,
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_flip_tracking(mut self, track_flips: bool) -> Self {
        self.track_flips = track_flips;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.image_height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.threads == 0 || self.threads > self.image_height {
            return Err(ConfigError::Threads { threads: self.threads, height: self.image_height });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }

    /// Stem of the input image, height first: a 64 wide, 32 high grid is
    /// read from `32x64`.
    pub fn image_name(&self) -> String {
        format!("{}x{}", self.image_height, self.image_width)
    }

    /// Stem used for an output image after `turn` turns, width first: `64x32x100`.
    pub fn output_name(&self, turn: usize) -> String {
        format!("{}x{}x{}", self.image_width, self.image_height, turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_threads_up_to_height() {
        assert!(Params::new(16, 16, 0, 1).validate().is_ok());
        assert!(Params::new(16, 16, 10, 16).validate().is_ok());
    }

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(Params::new(0, 16, 1, 1).validate(), Err(ConfigError::ZeroWidth));
        assert_eq!(Params::new(16, 0, 1, 1).validate(), Err(ConfigError::ZeroHeight));
        assert_eq!(
            Params::new(16, 16, 1, 0).validate(),
            Err(ConfigError::Threads { threads: 0, height: 16 })
        );
        assert_eq!(
            Params::new(16, 4, 1, 5).validate(),
            Err(ConfigError::Threads { threads: 5, height: 4 })
        );
        assert_eq!(
            Params::new(16, 16, 1, 1).with_tick_interval(Duration::ZERO).validate(),
            Err(ConfigError::ZeroTickInterval)
        );
    }

    #[test]
    fn square_names_read_the_same_either_way() {
        let params = Params::new(512, 512, 100, 8);
        assert_eq!(params.image_name(), "512x512");
        assert_eq!(params.output_name(100), "512x512x100");
    }

    #[test]
    fn names() {
        let params = Params::new(64, 32, 100, 4);
        assert_eq!(params.image_name(), "32x64");
        assert_eq!(params.output_name(100), "64x32x100");
    }
}
