//! Randomized pacing between outbound requests.

use std::time::Duration;

use rand::Rng;
use trolley_core::{AppConfig, DelayRange, PauseReason, ScrapeEvent, ScrapeObserver};

/// Jittered sleep schedule applied before each request class.
///
/// Every pause samples uniformly inside its configured range so request
/// timing never settles into a fixed rhythm. Detail-page pauses dwarf
/// search pauses on purpose.
#[derive(Debug, Clone)]
pub struct Pacing {
    search: DelayRange,
    detail: DelayRange,
    cooldown: DelayRange,
}

impl Pacing {
    /// Take pause bounds from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            search: config.search_delay,
            detail: config.detail_delay,
            cooldown: config.cooldown_delay,
        }
    }

    fn range(&self, reason: PauseReason) -> DelayRange {
        match reason {
            PauseReason::Search => self.search,
            PauseReason::Detail => self.detail,
            PauseReason::Cooldown => self.cooldown,
        }
    }

    /// Sleep for a random duration drawn from the range for `reason`.
    pub async fn pause(&self, reason: PauseReason, observer: &dyn ScrapeObserver) {
        let seconds = sample_seconds(self.range(reason));
        observer.on_event(ScrapeEvent::Pausing { seconds, reason });
        tracing::debug!(?reason, seconds, "pausing before request");
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
    }
}

fn sample_seconds(range: DelayRange) -> f64 {
    if range.max_secs <= range.min_secs {
        return range.min_secs;
    }
    rand::thread_rng().gen_range(range.min_secs..=range.max_secs)
}
