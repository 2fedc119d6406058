//! Clap-triggered track rotation

use crate::mode::AudioMode;
use crate::ramp::VolumeRamp;
use crate::tracks::{FilterSink, Track, TrackSet};
use tracing::debug;

/// Advances to the next track while the microphone level exceeds a threshold.
///
/// With `debounce_ticks == 0` it fires on every tick the level is above the
/// threshold. Otherwise that many ticks are skipped after each trigger.
#[derive(Debug, Clone)]
pub struct TrackRotator {
    threshold: f32,
    debounce_ticks: u32,
    cooldown: u32,
}

impl TrackRotator {
    /// Rotator firing above `threshold`
    pub fn new(threshold: f32, debounce_ticks: u32) -> Self {
        Self {
            threshold,
            debounce_ticks,
            cooldown: 0,
        }
    }

    /// Feed one volume sample. Returns the new track index when it rotated.
    pub fn update<T: Track>(
        &mut self,
        level: f32,
        mode: AudioMode,
        ramp: &VolumeRamp,
        tracks: &mut TrackSet<T>,
    ) -> Option<usize> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }
        if level <= self.threshold {
            return None;
        }
        self.cooldown = self.debounce_ticks;

        let prev_volume = ramp.current();
        {
            let old = tracks.current_mut();
            if old.is_playing() {
                old.stop();
            }
        }
        let index = tracks.advance();
        let track = tracks.current_mut();
        track.route_to(FilterSink::for_mode(mode));
        track.play();
        track.set_gain(prev_volume);

        debug!(
            "Clap at level {:.3}: switched to '{}' (#{}) at volume {:.3}",
            level,
            track.name(),
            index,
            prev_volume
        );
        Some(index)
    }

    /// Trigger level
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::VirtualTrack;

    fn tracks(n: usize) -> TrackSet<VirtualTrack> {
        let mut set =
            TrackSet::new((0..n).map(|i| VirtualTrack::new(format!("t{}", i))).collect()).unwrap();
        set.current_mut().play();
        set
    }

    #[test]
    fn test_below_threshold_does_nothing() {
        let mut rotator = TrackRotator::new(0.1, 0);
        let mut set = tracks(3);
        let ramp = VolumeRamp::new(0.02);
        assert_eq!(rotator.update(0.1, AudioMode::BassOnly, &ramp, &mut set), None);
        assert_eq!(set.current_index(), 0);
    }

    #[test]
    fn test_trigger_switches_and_preserves_volume() {
        let mut rotator = TrackRotator::new(0.1, 0);
        let mut set = tracks(3);
        let mut ramp = VolumeRamp::new(0.5);
        ramp.set_target(1.0);
        ramp.step();

        assert_eq!(rotator.update(0.5, AudioMode::Full, &ramp, &mut set), Some(1));
        let old = set.iter().next().unwrap();
        assert!(!old.is_playing());
        let new = set.current();
        assert!(new.is_playing());
        assert_eq!(new.route(), Some(FilterSink::Full));
        assert_eq!(new.gain(), 0.5);
        assert_eq!(set.playing_count(), 1);
    }

    #[test]
    fn test_fires_every_tick_without_debounce() {
        let mut rotator = TrackRotator::new(0.1, 0);
        let mut set = tracks(3);
        let ramp = VolumeRamp::new(0.02);
        for expected in [1, 2, 0, 1] {
            assert_eq!(
                rotator.update(0.9, AudioMode::BassOnly, &ramp, &mut set),
                Some(expected)
            );
        }
    }

    #[test]
    fn test_debounce_skips_ticks() {
        let mut rotator = TrackRotator::new(0.1, 2);
        let mut set = tracks(3);
        let ramp = VolumeRamp::new(0.02);
        assert_eq!(rotator.update(0.9, AudioMode::BassOnly, &ramp, &mut set), Some(1));
        assert_eq!(rotator.update(0.9, AudioMode::BassOnly, &ramp, &mut set), None);
        assert_eq!(rotator.update(0.9, AudioMode::BassOnly, &ramp, &mut set), None);
        assert_eq!(rotator.update(0.9, AudioMode::BassOnly, &ramp, &mut set), Some(2));
    }

    #[test]
    fn test_single_track_restarts_itself() {
        let mut rotator = TrackRotator::new(0.1, 0);
        let mut set = tracks(1);
        let ramp = VolumeRamp::new(0.02);
        assert_eq!(rotator.update(0.9, AudioMode::BassOnly, &ramp, &mut set), Some(0));
        assert!(set.current().is_playing());
        assert_eq!(set.current().play_count(), 2);
    }
}
