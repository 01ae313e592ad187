//! Wait hook shared by everything that has to pause.
//!
//! A pause must keep draining the GPS serial stream, so components that
//! introduce a delay (EEPROM settle time, the tracking interval) never sleep
//! directly. They hand the delay to an [`Idle`] implementation instead.

use async_trait::async_trait;
use std::time::Duration;

/// Something that can spend a delay usefully
#[async_trait]
pub trait Idle: Send {
    /// Return no earlier than `duration` from now
    async fn idle(&mut self, duration: Duration);
}

#[cfg(test)]
pub mod mocks {
    use super::*;

    /// Idle hook that records requested delays without sleeping
    #[derive(Debug, Default)]
    pub struct RecordingIdle {
        pub waits: Vec<Duration>,
    }

    impl RecordingIdle {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl Idle for RecordingIdle {
        async fn idle(&mut self, duration: Duration) {
            self.waits.push(duration);
        }
    }
}
