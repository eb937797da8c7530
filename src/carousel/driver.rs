//! Autoplay timer and key listener for a mounted carousel

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{Carousel, CarouselView, Direction, Key, AUTOPLAY_INTERVAL};

/// Carousel state shared between the driver tasks and request handlers
pub type SharedCarousel = Arc<Mutex<Carousel>>;

/// Lock the shared state; a panicked writer leaves the index valid, so poisoning is ignored
fn lock(state: &SharedCarousel) -> MutexGuard<'_, Carousel> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Settings that determine which subscriptions are held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselSettings {
    pub autoplay: bool,
    pub direction: Direction,
    pub interval: Duration,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            autoplay: true,
            direction: Direction::Up,
            interval: AUTOPLAY_INTERVAL,
        }
    }
}

/// The autoplay timer and key listener, held together and released together
pub struct Subscriptions {
    timer: Option<JoinHandle<()>>,
    listener: JoinHandle<()>,
}

impl Subscriptions {
    /// Spawn the listener, and the timer when autoplay is on
    fn acquire(
        state: &SharedCarousel,
        settings: &CarouselSettings,
        keys: broadcast::Receiver<Key>,
    ) -> Self {
        let timer = settings
            .autoplay
            .then(|| tokio::spawn(autoplay(state.clone(), settings.interval)));
        let listener = tokio::spawn(listen(state.clone(), keys));
        tracing::debug!("Carousel subscriptions acquired (autoplay: {})", timer.is_some());
        Self { timer, listener }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.listener.abort();
        tracing::debug!("Carousel subscriptions released");
    }
}

/// Advance every `period`; manual navigation does not reset the schedule
async fn autoplay(state: SharedCarousel, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        lock(&state).next();
    }
}

async fn listen(state: SharedCarousel, mut keys: broadcast::Receiver<Key>) {
    loop {
        match keys.recv().await {
            Ok(key) => {
                lock(&state).handle_key(key);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Carousel listener skipped {} key events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Current settings and the subscriptions acquired for them
struct Mounted {
    settings: CarouselSettings,
    subscriptions: Option<Subscriptions>,
}

/// A mounted carousel. Dropping it (or calling [`CarouselDriver::unmount`])
/// stops the timer and the key listener.
pub struct CarouselDriver {
    state: SharedCarousel,
    keys: broadcast::Sender<Key>,
    mounted: Mutex<Mounted>,
}

impl CarouselDriver {
    /// Mount the carousel; must be called from within a tokio runtime
    pub fn mount(state: SharedCarousel, settings: CarouselSettings) -> Self {
        let (keys, _) = broadcast::channel(32);
        let subscriptions = Subscriptions::acquire(&state, &settings, keys.subscribe());
        Self {
            state,
            keys,
            mounted: Mutex::new(Mounted {
                settings,
                subscriptions: Some(subscriptions),
            }),
        }
    }

    fn mounted(&self) -> MutexGuard<'_, Mounted> {
        self.mounted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forward a key press to the listener; false when nothing is listening
    pub fn send_key(&self, key: Key) -> bool {
        self.keys.send(key).is_ok()
    }

    /// Swap subscriptions for new settings, releasing the old pair first.
    /// Returns false when the settings are unchanged.
    pub fn reconfigure(&self, autoplay: bool, direction: Direction) -> bool {
        let mut mounted = self.mounted();
        let settings = CarouselSettings {
            autoplay,
            direction,
            ..mounted.settings
        };
        if settings == mounted.settings {
            return false;
        }

        mounted.subscriptions = None;
        mounted.subscriptions = Some(Subscriptions::acquire(
            &self.state,
            &settings,
            self.keys.subscribe(),
        ));
        mounted.settings = settings;
        true
    }

    pub fn settings(&self) -> CarouselSettings {
        self.mounted().settings
    }

    pub fn is_autoplaying(&self) -> bool {
        self.mounted()
            .subscriptions
            .as_ref()
            .map(Subscriptions::has_timer)
            .unwrap_or(false)
    }

    /// Current state for rendering
    pub fn view(&self) -> CarouselView {
        let direction = self.settings().direction;
        lock(&self.state).view(direction)
    }

    /// Swap in new carousel state, typically once preloading has settled
    pub fn replace(&self, carousel: Carousel) {
        *lock(&self.state) = carousel;
    }

    /// Tear down explicitly
    pub fn unmount(self) {
        self.mounted().subscriptions = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::ImageProbe;
    use async_trait::async_trait;

    struct AlwaysLoads;

    #[async_trait]
    impl ImageProbe for AlwaysLoads {
        async fn probe(&self, _url: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    async fn shared(n: usize) -> SharedCarousel {
        let images = (0..n).map(|i| format!("/images/{}.jpg", i)).collect();
        let mut carousel = Carousel::new(images);
        carousel.preload(&AlwaysLoads).await;
        Arc::new(Mutex::new(carousel))
    }

    fn index(state: &SharedCarousel) -> usize {
        lock(state).index()
    }

    /// Let spawned tasks drain their queues
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_advances_every_interval() {
        let state = shared(3).await;
        let driver = CarouselDriver::mount(state.clone(), CarouselSettings::default());
        assert!(driver.is_autoplaying());

        tokio::time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(index(&state), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(index(&state), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_move_without_resetting_timer() {
        let state = shared(4).await;
        let driver = CarouselDriver::mount(state.clone(), CarouselSettings::default());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(driver.send_key(Key::ArrowRight));
        settle().await;
        assert_eq!(index(&state), 1);

        // timer still fires at t=5s, not t=8s
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(index(&state), 2);

        assert!(driver.send_key(Key::ArrowLeft));
        settle().await;
        assert_eq!(index(&state), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_releases_timer_and_listener() {
        let state = shared(3).await;
        let driver = CarouselDriver::mount(state.clone(), CarouselSettings::default());
        let keys = driver.keys.clone();
        driver.unmount();
        settle().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(index(&state), 0);
        assert_eq!(keys.receiver_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_does_not_duplicate_timers() {
        let state = shared(10).await;
        let driver = CarouselDriver::mount(state.clone(), CarouselSettings::default());

        assert!(driver.reconfigure(true, Direction::Down));
        assert!(!driver.reconfigure(true, Direction::Down));
        assert_eq!(driver.settings().direction, Direction::Down);
        driver.reconfigure(true, Direction::Up);
        settle().await;
        assert_eq!(driver.keys.receiver_count(), 1);

        tokio::time::sleep(Duration::from_millis(5_010)).await;
        assert_eq!(index(&state), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_disables_autoplay() {
        let state = shared(3).await;
        let driver = CarouselDriver::mount(state.clone(), CarouselSettings::default());
        driver.reconfigure(false, Direction::Up);
        assert!(!driver.is_autoplaying());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(index(&state), 0);

        assert!(driver.send_key(Key::ArrowRight));
        settle().await;
        assert_eq!(index(&state), 1);
        assert_eq!(driver.view().exit_class, "slide-exit-up");
    }
}
