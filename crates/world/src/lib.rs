// SPDX-License-Identifier: MIT

//! Object manager, containment/equipment registry, heartbeat + callout
//! schedulers, combat subsystem, and message queue.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod callout;
pub mod combat;
pub mod containment;
pub mod equipment;
pub mod heartbeat;
pub mod host_state;
pub mod instance;
pub mod manager;
pub mod message;
pub mod metrics;
pub mod source;
pub mod world;

pub use callout::{Callout, CalloutScheduler};
pub use combat::{CombatRegistry, FleeOutcome};
pub use containment::ContainmentRegistry;
pub use equipment::EquipmentRegistry;
pub use heartbeat::HeartbeatScheduler;
pub use host_state::{HostState, PendingCallout, RoomEventFrame};
pub use instance::Instance;
pub use manager::{CallResult, GcPolicy, ManagerError, ObjectManager};
pub use metrics::Metrics;
pub use message::{message_queue, recipients_for, MessageReceiver, MessageSender};
pub use source::{FsSourceProvider, MemorySourceProvider, SourceProvider};
pub use world::WorldState;
