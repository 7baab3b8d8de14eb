pub mod bus;
mod emit;
pub mod envelope;
pub mod error;
pub mod event;
pub mod forward;
pub mod host;
pub mod types;

pub use bus::{BusStats, DeliveryFailure, DispatchReport, EventBus, EventListener, SubscriptionToken};
pub use envelope::{decode_message, Envelope};
pub use error::{EventError, EventResult};
pub use event::{EventPayload, FlowEvent, EVENT_CHANNEL};
pub use forward::{ForwardStats, HttpForwarder};
pub use host::{FrameListener, HostFrame, WriterFrame};
pub use types::{
    ActionName, ButtonClick, DocumentVerificationResponse, EventKind, FlowExit, NavigationUpdate,
    VerificationStatus,
};
