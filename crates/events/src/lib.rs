//! Domain events: the event contract, the per-aggregate buffer, and the
//! mechanics used to distribute events after commit.

pub mod buffer;
pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use buffer::EventBuffer;
pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
