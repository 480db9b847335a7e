//! Controller notifications.
//!
//! The controller never prints. Every state change it makes is described by a
//! `ControllerEvent` handed to an `EventSink`; the binary forwards them to the
//! `log` facade and tests record them.

use serde::Serialize;
use std::fmt;

use crate::flow::Priority;
use crate::routing::Path;
use crate::topology::{NodeId, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    NodeAdded {
        node: NodeId,
    },
    NodeRemoved {
        node: NodeId,
        removed_links: usize,
    },
    LinkAdded {
        src: NodeId,
        dst: NodeId,
        weight: Weight,
    },
    LinkWeightUpdated {
        src: NodeId,
        dst: NodeId,
        old: Weight,
        new: Weight,
    },
    LinkRemoved {
        src: NodeId,
        dst: NodeId,
    },
    LinkFailed {
        src: NodeId,
        dst: NodeId,
    },
    FailureTargetMissing {
        src: NodeId,
        dst: NodeId,
    },
    FlowInstalled {
        src: NodeId,
        dst: NodeId,
        path: Path,
        priority: Priority,
        backup: bool,
    },
    NoPath {
        src: NodeId,
        dst: NodeId,
    },
    NoBackupPath {
        src: NodeId,
        dst: NodeId,
    },
    StaleFlowsPurged {
        count: usize,
    },
    FlowTableCleared {
        removed: usize,
    },
}

impl ControllerEvent {
    /// Events that describe a request that did not fully succeed
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::NoPath { .. } | Self::NoBackupPath { .. } | Self::FailureTargetMissing { .. }
        )
    }

    /// Level `LogSink` logs at: warn for warnings, debug otherwise
    pub fn log_level(&self) -> log::Level {
        if self.is_warning() {
            log::Level::Warn
        } else {
            log::Level::Debug
        }
    }
}

impl fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeAdded { node } => write!(f, "Node {} added.", node),
            Self::NodeRemoved { node, removed_links } => {
                write!(f, "Node {} removed ({} links).", node, removed_links)
            }
            Self::LinkAdded { src, dst, weight } => {
                write!(f, "Link {}-{} added (weight {}).", src, dst, weight)
            }
            Self::LinkWeightUpdated { src, dst, old, new } => {
                write!(f, "Link {}-{} weight changed from {} to {}.", src, dst, old, new)
            }
            Self::LinkRemoved { src, dst } => write!(f, "Link {}-{} removed.", src, dst),
            Self::LinkFailed { src, dst } => write!(f, "Simulating failure on link {}-{}", src, dst),
            Self::FailureTargetMissing { src, dst } => {
                write!(f, "Link {}-{} does not exist; nothing to fail", src, dst)
            }
            Self::FlowInstalled {
                src,
                dst,
                path,
                priority,
                backup,
            } => {
                if *backup {
                    write!(f, "Backup path installed: {} (priority {})", path, priority)
                } else {
                    write!(
                        f,
                        "Installing flow for {} -> {} via path: {} (priority {})",
                        src, dst, path, priority
                    )
                }
            }
            Self::NoPath { src, dst } => write!(f, "No path between {} and {}", src, dst),
            Self::NoBackupPath { src, dst } => {
                write!(f, "No backup path available for {} -> {}", src, dst)
            }
            Self::StaleFlowsPurged { count } => write!(f, "Purged {} stale flow entries", count),
            Self::FlowTableCleared { removed } => {
                write!(f, "Flow table cleared ({} entries removed)", removed)
            }
        }
    }
}

/// Receiver of controller notifications
pub trait EventSink {
    fn emit(&mut self, event: ControllerEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: ControllerEvent) {
        log::log!(event.log_level(), "{}", event);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<ControllerEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ControllerEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the sink empty
    pub fn drain(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: ControllerEvent) {
        self.events.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: ControllerEvent) {
        (**self).emit(event);
    }
}
