//! Flow-facing `send_*` operations.
//!
//! Each call builds one event and dispatches it immediately. Delivery
//! problems are logged by the bus and never reach the caller, so the flow
//! keeps going whether or not anyone is listening.

use crate::bus::EventBus;
use crate::event::FlowEvent;
use crate::types::{ButtonClick, DocumentVerificationResponse, FlowExit, NavigationUpdate};
use stepflow_core::StepDescriptor;

impl EventBus {
    pub fn send_verification_update_event(&self, response: DocumentVerificationResponse) {
        self.dispatch(FlowEvent::verification_update(response));
    }

    pub fn send_flow_complete_event(&self) {
        self.dispatch(FlowEvent::flow_complete());
    }

    pub fn send_navigation_update_event(&self, step: &StepDescriptor) {
        self.dispatch(FlowEvent::navigation_update(NavigationUpdate::from_step(step)));
    }

    pub fn send_navigation_transition_event(
        &self,
        current: &StepDescriptor,
        previous: Option<&StepDescriptor>,
    ) {
        self.dispatch(FlowEvent::navigation_update(NavigationUpdate::transition(
            current, previous,
        )));
    }

    pub fn send_button_click_event(&self, click: ButtonClick) {
        self.dispatch(FlowEvent::button_click(click));
    }

    pub fn send_flow_exit_event(&self, exit: FlowExit) {
        self.dispatch(FlowEvent::flow_exit(exit));
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::{EventBus, EventListener};
    use crate::event::{EventPayload, FlowEvent, EVENT_CHANNEL};
    use crate::types::*;
    use std::sync::{Arc, Mutex};
    use stepflow_core::{ComponentRef, StepDescriptor, StepName};

    #[derive(Default)]
    struct Collector {
        events: Mutex<Vec<FlowEvent>>,
    }

    impl Collector {
        fn take(&self) -> Vec<FlowEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl EventListener for Collector {
        fn on_event(&self, event: &FlowEvent) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn bus_with_collector() -> (EventBus, Arc<Collector>) {
        let bus = EventBus::new();
        let collector = Arc::new(Collector::default());
        bus.subscribe(Arc::clone(&collector));
        (bus, collector)
    }

    #[test]
    fn every_send_dispatches_one_event_of_its_kind() {
        let (bus, collector) = bus_with_collector();
        let step = StepDescriptor::new(StepName::Welcome, ComponentRef::new("Welcome"));

        bus.send_verification_update_event(DocumentVerificationResponse::new(
            VerificationStatus::Pending,
            ActionName::AutoReview,
        ));
        bus.send_flow_complete_event();
        bus.send_navigation_update_event(&step);
        bus.send_button_click_event(ButtonClick::new("start").unwrap());
        bus.send_flow_exit_event(FlowExit::new());

        let kinds: Vec<EventKind> = collector.take().iter().map(FlowEvent::kind).collect();
        assert_eq!(kinds, EventKind::ALL.to_vec());
    }

    #[test]
    fn verification_update_carries_status_and_action() {
        let (bus, collector) = bus_with_collector();
        let response = DocumentVerificationResponse::parse("approved", "manual_review").unwrap();
        bus.send_verification_update_event(response);

        let events = collector.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::VerificationUpdate);
        assert_eq!(events[0].name(), EVENT_CHANNEL);
        match events[0].payload() {
            EventPayload::VerificationUpdate(resp) => {
                assert_eq!(resp.status(), VerificationStatus::Approved);
                assert_eq!(resp.action(), ActionName::ManualReview);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn flow_complete_twice_is_two_dispatches() {
        let (bus, collector) = bus_with_collector();
        bus.send_flow_complete_event();
        bus.send_flow_complete_event();
        assert_eq!(collector.take().len(), 2);
        assert_eq!(bus.stats().total_sent, 2);
    }

    #[test]
    fn invalid_status_fails_before_dispatch() {
        let (bus, collector) = bus_with_collector();
        let result = DocumentVerificationResponse::parse("unknown", "close");
        assert!(matches!(result, Err(crate::EventError::UnknownStatus(_))));
        if let Ok(response) = result {
            bus.send_verification_update_event(response);
        }
        assert!(collector.take().is_empty());
        assert_eq!(bus.stats().total_sent, 0);
    }

    #[test]
    fn unsubscribed_listener_receives_nothing() {
        let bus = EventBus::new();
        let kept = Arc::new(Collector::default());
        let removed = Arc::new(Collector::default());
        bus.subscribe(Arc::clone(&kept));
        let token = bus.subscribe(Arc::clone(&removed));

        bus.send_flow_complete_event();
        assert_eq!(removed.take().len(), 1);

        assert!(bus.unsubscribe(token));
        bus.send_flow_exit_event(FlowExit::with_reason("user_cancelled").unwrap());
        assert!(removed.take().is_empty());
        assert_eq!(kept.take().len(), 2);
    }

    #[test]
    fn navigation_transition_reports_previous_step() {
        let (bus, collector) = bus_with_collector();
        let first = StepDescriptor::new(StepName::SelfieStart, ComponentRef::new("SelfieStart"));
        let second = StepDescriptor::new(StepName::Selfie, ComponentRef::new("Selfie"));
        bus.send_navigation_transition_event(&second, Some(&first));

        let events = collector.take();
        match events[0].payload() {
            EventPayload::NavigationUpdate(nav) => {
                assert_eq!(nav.current, StepName::Selfie);
                assert_eq!(nav.previous, Some(StepName::SelfieStart));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
