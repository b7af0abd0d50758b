//! Room collaboration: ordered inbound handling, last-writer-wins merge of
//! remote elements, participant presence and outbound local edits.

use crate::canvas::{Canvas, LocalChange};
use crate::history::Scene;
use crate::shapes::{Element, ElementId, TextMeasurer};
use crate::sync::{ClientMessage, ServerMessage, Transport, TransportError, decode_server_message};
use kurbo::Point;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::VecDeque;

/// Another participant in the room.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub user_id: String,
    pub name: String,
    pub color: String,
    /// Last reported pointer position in scene units.
    pub position: Point,
}

/// Outcome of merging staged remote elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Existing elements overwritten in place.
    pub replaced: usize,
    /// Elements new to the scene, appended at the end.
    pub appended: usize,
    /// Remote elements that could not be parsed.
    pub skipped: usize,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.replaced == 0 && self.appended == 0 && self.skipped == 0
    }
}

/// What processing inbound messages changed.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Remote elements were merged into the scene
    ElementsMerged(MergeReport),
    /// Remote participant removed elements
    ElementsErased(Vec<ElementId>),
    /// The room snapshot replaced the scene; `skipped` elements could not be
    /// parsed
    JoinedRoom { element_count: usize, skipped: usize },
    /// A participant's pointer moved (or they appeared)
    ParticipantMoved { user_id: String },
    /// A participant left
    ParticipantLeft { user_id: String },
}

/// Synchronizes one [`Canvas`] with a room over a [`Transport`].
///
/// Inbound messages are queued as they arrive and applied strictly in arrival
/// order by [`SyncEngine::process_inbound`]; each message is fully applied
/// before the next one starts. Remote elements always overwrite the local
/// element with the same id, whatever the local edit state.
pub struct SyncEngine<T: Transport> {
    transport: T,
    inbound: VecDeque<String>,
    staged: Vec<Element>,
    skipped: usize,
    participants: Vec<Participant>,
    room: Option<String>,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            inbound: VecDeque::new(),
            staged: Vec::new(),
            skipped: 0,
            participants: Vec::new(),
            room: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Get the current room ID.
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn is_in_room(&self) -> bool {
        self.room.is_some()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    // --- Room membership ---

    pub fn join_room(&mut self, room_id: &str, name: &str, color: &str) {
        info!("Joining room {}", room_id);
        self.send(ClientMessage::JoinRoom {
            room_id: room_id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        });
        self.room = Some(room_id.to_string());
    }

    pub fn leave_room(&mut self) {
        let Some(room_id) = self.room.take() else {
            return;
        };
        info!("Leaving room {}", room_id);
        self.send(ClientMessage::LeaveRoom { room_id });
        self.participants.clear();
    }

    // --- Outbound ---

    /// Send every local edit recorded by the canvas since the last flush.
    /// Outside a room the edits are discarded.
    pub fn flush_local(&mut self, canvas: &mut Canvas) -> usize {
        let changes = canvas.take_changes();
        if self.room.is_none() {
            return 0;
        }
        let mut sent = 0;
        for change in changes {
            let message = match change {
                LocalChange::Upsert(element) => ClientMessage::DrawingElement { element },
                LocalChange::Erase(ids) => ClientMessage::EraseElements { ids },
            };
            if self.send(message) {
                sent += 1;
            }
        }
        sent
    }

    /// Report the local pointer position (scene units) to the room.
    pub fn send_pointer(&mut self, position: Point) -> bool {
        if self.room.is_none() {
            return false;
        }
        self.send(ClientMessage::MousePosition {
            x: position.x,
            y: position.y,
        })
    }

    fn send(&mut self, message: ClientMessage) -> bool {
        match self.transport.send(&message) {
            Ok(()) => true,
            Err(TransportError::Disconnected) => {
                warn!("Dropping {}: not connected", message_kind(&message));
                false
            }
            Err(e) => {
                warn!("Failed to send {}: {}", message_kind(&message), e);
                false
            }
        }
    }

    // --- Inbound ---

    /// Queue a raw inbound message. Nothing is applied until
    /// [`process_inbound`](Self::process_inbound).
    pub fn receive(&mut self, text: impl Into<String>) {
        self.inbound.push_back(text.into());
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Apply every queued message in arrival order.
    ///
    /// Consecutive `draw-element` messages are staged and merged in one pass;
    /// anything else flushes the stage first so ordering is preserved.
    /// Malformed and unknown messages are logged and skipped.
    pub fn process_inbound(&mut self, canvas: &mut Canvas) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Some(text) = self.inbound.pop_front() {
            let message = match decode_server_message(&text) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Skipping inbound message: {}", e);
                    continue;
                }
            };
            if let ServerMessage::DrawElement { new_element } = message {
                self.stage(new_element);
                continue;
            }
            self.push_merge(canvas, &mut events);
            self.apply(message, canvas, &mut events);
        }
        self.push_merge(canvas, &mut events);
        events
    }

    fn push_merge(&mut self, canvas: &mut Canvas, events: &mut Vec<SyncEvent>) {
        let report = self.merge_staged(canvas);
        if !report.is_empty() {
            events.push(SyncEvent::ElementsMerged(report));
        }
    }

    fn apply(&mut self, message: ServerMessage, canvas: &mut Canvas, events: &mut Vec<SyncEvent>) {
        match message {
            ServerMessage::DrawElement { new_element } => {
                self.stage(new_element);
                self.push_merge(canvas, events);
            }
            ServerMessage::EraseElements { ids } => {
                let scene: Scene = canvas
                    .scene()
                    .iter()
                    .filter(|e| !ids.iter().any(|id| id == e.id()))
                    .cloned()
                    .collect();
                if scene.len() != canvas.scene().len() {
                    canvas.apply_remote_scene(scene);
                }
                debug!("Remote erase of {} element(s)", ids.len());
                events.push(SyncEvent::ElementsErased(ids));
            }
            ServerMessage::ParticipantPosition {
                user_id,
                x,
                y,
                color,
                name,
            } => {
                let participant = Participant {
                    user_id: user_id.clone(),
                    name,
                    color,
                    position: Point::new(x, y),
                };
                match self.participants.iter_mut().find(|p| p.user_id == user_id) {
                    Some(existing) => *existing = participant,
                    None => self.participants.push(participant),
                }
                events.push(SyncEvent::ParticipantMoved { user_id });
            }
            ServerMessage::RemoveParticipant { user_id } => {
                self.participants.retain(|p| p.user_id != user_id);
                info!("Participant {} left", user_id);
                events.push(SyncEvent::ParticipantLeft { user_id });
            }
            ServerMessage::RoomJoined {
                elements,
                scale,
                pan_offset,
            } => {
                let mut scene = Scene::new();
                let mut skipped = 0;
                for raw in elements {
                    match parse_element(raw) {
                        Some(element) => {
                            upsert(&mut scene, prepare(element, canvas.measurer()));
                        }
                        None => skipped += 1,
                    }
                }
                let element_count = scene.len();
                canvas.reset_scene(scene);
                let camera = canvas.camera_mut();
                camera.set_zoom(scale);
                camera.offset = pan_offset;
                info!("Joined room with {} element(s), {} skipped", element_count, skipped);
                events.push(SyncEvent::JoinedRoom { element_count, skipped });
            }
        }
    }

    /// Stage a remote element for the next merge. Returns `false` if it could
    /// not be parsed.
    pub fn stage(&mut self, raw: Value) -> bool {
        match parse_element(raw) {
            Some(element) => {
                self.staged.push(element);
                true
            }
            None => {
                self.skipped += 1;
                false
            }
        }
    }

    pub fn staged(&self) -> &[Element] {
        &self.staged
    }

    /// Merge staged elements into the canvas scene in one pass.
    ///
    /// Each element is normalized (and text laid out with local metrics),
    /// then replaces the element with the same id in place or is appended.
    /// No ordering metadata is consulted: the last merge applied wins.
    pub fn merge_staged(&mut self, canvas: &mut Canvas) -> MergeReport {
        let mut report = MergeReport {
            skipped: std::mem::take(&mut self.skipped),
            ..MergeReport::default()
        };
        if self.staged.is_empty() {
            return report;
        }
        let mut scene = canvas.scene().to_vec();
        for element in self.staged.drain(..) {
            if upsert(&mut scene, prepare(element, canvas.measurer())) {
                report.replaced += 1;
            } else {
                report.appended += 1;
            }
        }
        canvas.apply_remote_scene(scene);
        debug!(
            "Merged remote elements: {} replaced, {} appended",
            report.replaced, report.appended
        );
        report
    }
}

fn parse_element(raw: Value) -> Option<Element> {
    match serde_json::from_value(raw) {
        Ok(element) => Some(element),
        Err(e) => {
            warn!("Skipping malformed remote element: {}", e);
            None
        }
    }
}

/// Redo what the author's client did at commit time with local metrics.
fn prepare(element: Element, measurer: &dyn TextMeasurer) -> Element {
    match element.normalized() {
        Element::Text(t) => Element::Text(t.relayout(measurer)),
        other => other,
    }
}

/// Replace the element with the same id, or append. Returns whether an
/// element was replaced.
fn upsert(scene: &mut Scene, element: Element) -> bool {
    match scene.iter_mut().find(|e| e.id() == element.id()) {
        Some(slot) => {
            *slot = element;
            true
        }
        None => {
            scene.push(element);
            false
        }
    }
}

fn message_kind(message: &ClientMessage) -> &'static str {
    match message {
        ClientMessage::DrawingElement { .. } => "drawing-element",
        ClientMessage::MousePosition { .. } => "mouse-position",
        ClientMessage::JoinRoom { .. } => "join-room",
        ClientMessage::LeaveRoom { .. } => "leave-room",
        ClientMessage::EraseElements { .. } => "erase-elements",
    }
}
