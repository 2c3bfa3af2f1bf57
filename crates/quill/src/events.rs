//! Node event listeners.
//!
//! Handlers subscribe to one kind of event on one node. [`EventBus::dispatch`]
//! runs the matching handlers synchronously, in subscription order.

use std::{fmt, str::FromStr};

use log::trace;

use quill_core::geometry::Point;

use crate::node::NodeId;

/// The events a node can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseEnter,
    MouseLeave,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Click => "click",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
        })
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "click" => Ok(Self::Click),
            "mousedown" => Ok(Self::MouseDown),
            "mouseup" => Ok(Self::MouseUp),
            "mousemove" => Ok(Self::MouseMove),
            "mouseenter" | "mouseover" => Ok(Self::MouseEnter),
            "mouseleave" | "mouseout" => Ok(Self::MouseLeave),
            other => Err(format!("unknown event `{other}`")),
        }
    }
}

/// An event delivered to handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    kind: EventKind,
    position: Point,
}

impl Event {
    /// Creates an event at `position` in canvas coordinates.
    pub fn new(kind: EventKind, position: Point) -> Self {
        Self { kind, position }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

/// Identifies a subscription for [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// A callback receiving the node the event was dispatched to.
pub type Handler = Box<dyn FnMut(NodeId, &Event)>;

struct Subscription {
    id: SubscriptionId,
    node: NodeId,
    kind: EventKind,
    handler: Handler,
}

/// Subscriptions of every node in a scene.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: usize,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, node: NodeId, kind: EventKind, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            node,
            kind,
            handler,
        });
        id
    }

    /// Removes a subscription. Returns `false` when it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    /// Runs the handlers of `node` for `event`. Returns how many ran.
    pub fn dispatch(&mut self, node: NodeId, event: &Event) -> usize {
        let mut handled = 0;
        for subscription in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.node == node && s.kind == event.kind())
        {
            (subscription.handler)(node, event);
            handled += 1;
        }
        trace!(node:% = node, event:% = event.kind(), handled; "Dispatched event");
        handled
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::node::{NodeKind, Scene};
    use quill_core::geometry::Rect;

    fn two_nodes() -> (NodeId, NodeId) {
        let mut scene = Scene::new();
        (
            scene.add(NodeKind::Group, Rect::default()),
            scene.add(NodeKind::Group, Rect::default()),
        )
    }

    #[test]
    fn test_dispatch_in_subscription_order() {
        let (node, other) = two_nodes();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(
                node,
                EventKind::Click,
                Box::new(move |_, _| log.borrow_mut().push(name)),
            );
        }
        let log_other = Rc::clone(&log);
        bus.subscribe(
            other,
            EventKind::Click,
            Box::new(move |_, _| log_other.borrow_mut().push("other")),
        );

        let click = Event::new(EventKind::Click, Point::new(1.0, 2.0));
        assert_eq!(bus.dispatch(node, &click), 2);
        assert_eq!(*log.borrow(), vec!["first", "second"]);

        let enter = Event::new(EventKind::MouseEnter, Point::default());
        assert_eq!(bus.dispatch(node, &enter), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let (node, _) = two_nodes();
        let mut bus = EventBus::new();
        let id = bus.subscribe(node, EventKind::MouseDown, Box::new(|_, _| {}));

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        let down = Event::new(EventKind::MouseDown, Point::default());
        assert_eq!(bus.dispatch(node, &down), 0);
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!("mouseover".parse::<EventKind>(), Ok(EventKind::MouseEnter));
        assert_eq!(EventKind::MouseLeave.to_string(), "mouseleave");
        assert!("scroll".parse::<EventKind>().is_err());
    }
}
