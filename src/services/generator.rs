//! Simulated event source.
//!
//! Cycles through a fixed template list on a timer. Every emitted event is a
//! fresh clone of a template, so consumers never share state with the
//! generator.

use log::{debug, info};
use pulse_bus::{Event, EventBus};
use pulse_clock::Ticker;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::templates::Dashboard;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Generator needs at least one template")]
    NoTemplates,
}

/// How the next template is picked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    RoundRobin,
    Random,
}

enum Selector {
    RoundRobin { next: usize },
    Random(StdRng),
}

/// Anything the generator can hand events to.
pub trait EventSink {
    fn emit(&self, event: Event);
}

impl EventSink for EventBus {
    fn emit(&self, event: Event) {
        self.publish(&event);
    }
}

pub struct EventGenerator {
    templates: Vec<Event>,
    selector: Selector,
    emitted: u64,
}

impl EventGenerator {
    /// `seed` only matters for [`SelectionMode::Random`]; `None` seeds from
    /// the OS.
    pub fn new(
        templates: Vec<Event>,
        mode: SelectionMode,
        seed: Option<u64>,
    ) -> Result<Self, GeneratorError> {
        if templates.is_empty() {
            return Err(GeneratorError::NoTemplates);
        }

        let selector = match mode {
            SelectionMode::RoundRobin => Selector::RoundRobin { next: 0 },
            SelectionMode::Random => Selector::Random(match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            }),
        };

        Ok(Self {
            templates,
            selector,
            emitted: 0,
        })
    }

    pub fn for_dashboard(
        dashboard: Dashboard,
        mode: SelectionMode,
        seed: Option<u64>,
    ) -> Result<Self, GeneratorError> {
        Self::new(dashboard.templates(), mode, seed)
    }

    /// Pick the next template and return a copy of it.
    pub fn tick(&mut self) -> Event {
        let len = self.templates.len();
        let index = match &mut self.selector {
            Selector::RoundRobin { next } => {
                let index = *next % len;
                *next = (index + 1) % len;
                index
            }
            Selector::Random(rng) => rng.gen_range(0..len),
        };

        self.emitted += 1;
        let event = self.templates[index].clone();
        debug!("Generated #{} ({})", self.emitted, event.kind());
        event
    }

    /// Generate and publish in one step. Returns the delivery count.
    pub fn tick_into(&mut self, bus: &EventBus) -> usize {
        let event = self.tick();
        bus.publish(&event)
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Emit one event per tick until `shutdown` flips to true, the sender
    /// goes away, or `limit` events have been emitted. Returns how many
    /// events this call emitted.
    pub async fn run<T, S>(
        &mut self,
        ticker: &mut T,
        sink: &S,
        mut shutdown: watch::Receiver<bool>,
        limit: Option<u64>,
    ) -> u64
    where
        T: Ticker,
        S: EventSink + ?Sized,
    {
        info!("Event generator running every {:?}", ticker.period());
        let mut emitted = 0;

        loop {
            if *shutdown.borrow() || limit.is_some_and(|max| emitted >= max) {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    sink.emit(self.tick());
                    emitted += 1;
                }
            }
        }

        info!("Event generator stopped after {} events", emitted);
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_bus::EventKind;
    use pulse_clock::ManualTicker;
    use std::cell::RefCell;
    use std::time::Duration;

    struct Recorder(RefCell<Vec<EventKind>>);

    impl EventSink for Recorder {
        fn emit(&self, event: Event) {
            self.0.borrow_mut().push(event.kind());
        }
    }

    #[test]
    fn test_rejects_empty_template_list() {
        assert!(matches!(
            EventGenerator::new(Vec::new(), SelectionMode::RoundRobin, None),
            Err(GeneratorError::NoTemplates)
        ));
    }

    #[test]
    fn test_round_robin_wraps() {
        let mut generator =
            EventGenerator::for_dashboard(Dashboard::Delegate, SelectionMode::RoundRobin, None)
                .unwrap();

        let kinds: Vec<EventKind> = (0..6).map(|_| generator.tick().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::AgentActivity,
                EventKind::TaskUpdate,
                EventKind::MeetingScheduled,
                EventKind::EmailProcessed,
                EventKind::AgentActivity,
                EventKind::TaskUpdate,
            ]
        );
        assert_eq!(generator.emitted(), 6);
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let dashboard = Dashboard::MeetingAssassin;
        let mut a = EventGenerator::for_dashboard(dashboard, SelectionMode::Random, Some(11)).unwrap();
        let mut b = EventGenerator::for_dashboard(dashboard, SelectionMode::Random, Some(11)).unwrap();

        for _ in 0..20 {
            let event = a.tick();
            assert!(dashboard.kinds().contains(&event.kind()));
            assert_eq!(event, b.tick());
        }
    }

    #[test]
    fn test_tick_into_publishes() {
        let bus = EventBus::new();
        let hits = std::rc::Rc::new(std::cell::Cell::new(0));
        let h = hits.clone();
        let _sub = bus
            .subscribe(EventKind::AgentActivity, move |_| h.set(h.get() + 1))
            .unwrap();

        let mut generator =
            EventGenerator::for_dashboard(Dashboard::Delegate, SelectionMode::RoundRobin, None)
                .unwrap();
        assert_eq!(generator.tick_into(&bus), 1);
        assert_eq!(generator.tick_into(&bus), 0);
        assert_eq!(hits.get(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_at_limit() {
        let (mut ticker, handle) = ManualTicker::new(Duration::from_secs(4));
        let (_tx, rx) = watch::channel(false);
        let sink = Recorder(RefCell::new(Vec::new()));
        let mut generator =
            EventGenerator::for_dashboard(Dashboard::Delegate, SelectionMode::RoundRobin, None)
                .unwrap();

        handle.advance(10);
        let emitted = generator.run(&mut ticker, &sink, rx, Some(3)).await;

        assert_eq!(emitted, 3);
        assert_eq!(sink.0.borrow().len(), 3);
        assert_eq!(handle.pending(), 7);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (mut ticker, handle) = ManualTicker::new(Duration::from_secs(4));
        let (tx, rx) = watch::channel(false);
        let sink = Recorder(RefCell::new(Vec::new()));
        let mut generator =
            EventGenerator::for_dashboard(Dashboard::Delegate, SelectionMode::RoundRobin, None)
                .unwrap();

        handle.advance(2);
        tx.send(true).unwrap();
        let emitted = generator.run(&mut ticker, &sink, rx, None).await;

        assert_eq!(emitted, 0);
        assert!(sink.0.borrow().is_empty());
    }
}
