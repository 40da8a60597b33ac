use crossbeam_channel::Sender;
use gpui::prelude::*;
use gpui::{FocusHandle, KeyDownEvent, Subscription, Window, canvas, div};

use crate::backend::{Event, Key, WindowEventKind, WindowId};

use super::paint::paint_frame;
use super::window::FrameSlot;

/// A GPUI view that shows the frames a graph presents into its window.
///
/// The view never draws on its own initiative: the bridge notifies it after
/// serving requests, and it repaints whatever frame was published last.
/// Keystrokes, close requests, and activation changes are forwarded to the
/// dispatcher as [`Event`]s.
pub struct StripChartView {
    id: WindowId,
    slot: FrameSlot,
    events: Sender<Event>,
    focus: FocusHandle,
    _activation: Subscription,
}

impl StripChartView {
    pub(crate) fn new(
        id: WindowId,
        slot: FrameSlot,
        events: Sender<Event>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let focus = cx.focus_handle();
        window.focus(&focus);

        let close_events = events.clone();
        window.on_window_should_close(cx, move |_, _| {
            let _ = close_events.send(Event::Window {
                window: id,
                kind: WindowEventKind::Close,
            });
            // The window is removed when its graph is destroyed.
            false
        });

        let activation = cx.observe_window_activation(window, |this, window, _| {
            let kind = if window.is_window_active() {
                WindowEventKind::FocusGained
            } else {
                WindowEventKind::FocusLost
            };
            this.send(Event::Window {
                window: this.id,
                kind,
            });
        });

        Self {
            id,
            slot,
            events,
            focus,
            _activation: activation,
        }
    }

    /// Identifier of the window this view fills.
    pub fn window_id(&self) -> WindowId {
        self.id
    }

    fn send(&self, event: Event) {
        let _ = self.events.send(event);
    }

    fn on_key_down(&mut self, ev: &KeyDownEvent) {
        let key = map_key(&ev.keystroke.key);
        self.send(Event::Key {
            window: Some(self.id),
            key,
        });
    }
}

fn map_key(name: &str) -> Key {
    if name == "escape" {
        return Key::Escape;
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Key::Char(ch),
        _ => Key::Other,
    }
}

impl Render for StripChartView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let slot = self.slot.clone();

        div()
            .size_full()
            .track_focus(&self.focus)
            .on_key_down(cx.listener(|this, ev, _, _| {
                this.on_key_down(ev);
            }))
            .child(
                canvas(
                    move |_, _, _| slot.snapshot(),
                    move |bounds, frame, window, cx| {
                        paint_frame(&frame, bounds, window, cx);
                    },
                )
                .size_full(),
            )
    }
}
