// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Externally originated mutations, buffered until a tick boundary.
//!
//! Hosts (pointer handlers, spawn buttons) enqueue commands at any time; the
//! loop driver drains the buffer at the start of the next tick, so a tick
//! never observes a half-applied edit.

use std::collections::VecDeque;

use gridphase_geom::{ObjectId, PhysicsObject};
use tracing::debug;

use crate::Bounds;

/// A mutation requested from outside the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append an object.
    Spawn(PhysicsObject),
    /// Remove the object with this id.
    Remove(ObjectId),
    /// Move an object's top-left corner (clamped into bounds) and stop it.
    Drag {
        /// Target object.
        id: ObjectId,
        /// Requested left edge.
        x: f64,
        /// Requested top edge.
        y: f64,
    },
    /// Replace the whole collection.
    ReplaceAll(Vec<PhysicsObject>),
}

/// FIFO of pending commands.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    queue: VecDeque<Command>,
}

impl CommandBuffer {
    /// Queues a command for the next tick boundary.
    pub fn push(&mut self, cmd: Command) {
        self.queue.push_back(cmd);
    }

    /// Number of commands waiting.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Applies every queued command in FIFO order and returns how many took
    /// effect. Commands naming an unknown id are dropped.
    pub fn apply(&mut self, objects: &mut Vec<PhysicsObject>, bounds: Bounds) -> usize {
        let mut applied = 0;
        while let Some(cmd) = self.queue.pop_front() {
            let hit = match cmd {
                Command::Spawn(obj) => {
                    objects.push(obj);
                    true
                }
                Command::Remove(id) => {
                    let before = objects.len();
                    objects.retain(|o| o.id != id);
                    objects.len() != before
                }
                Command::Drag { id, x, y } => match objects.iter_mut().find(|o| o.id == id) {
                    Some(obj) => {
                        drag(obj, x, y, bounds);
                        true
                    }
                    None => false,
                },
                Command::ReplaceAll(next) => {
                    *objects = next;
                    true
                }
            };
            if hit {
                applied += 1;
            } else {
                debug!("dropped command for unknown object");
            }
        }
        applied
    }
}

fn drag(obj: &mut PhysicsObject, x: f64, y: f64, bounds: Bounds) {
    if !(x.is_finite() && y.is_finite()) {
        return;
    }
    let max_x = (bounds.width - obj.aabb().width()).max(0.0);
    let max_y = (bounds.height - obj.aabb().height()).max(0.0);
    obj.set_position(x.clamp(0.0, max_x), y.clamp(0.0, max_y));
    obj.vx = 0.0;
    obj.vy = 0.0;
}
