//! Pipeline event system for async event handling.
//!
//! Bus messages are translated into [`PipelineEvent`]s and broadcast to any
//! number of async receivers, so callers can await end-of-stream without
//! blocking a thread on the bus themselves.

use gst::prelude::*;
use std::fmt;
use std::thread;
use tokio::sync::broadcast;

/// Events emitted by the pipeline during execution.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Top-level pipeline state has changed.
    StateChanged {
        /// Previous state.
        from: gst::State,
        /// New state.
        to: gst::State,
    },

    /// End of stream reached.
    Eos,

    /// An element posted an error.
    Error {
        /// The error message.
        message: String,
        /// The element that posted the error (if known).
        node: Option<String>,
        /// Additional debug information.
        debug: Option<String>,
    },

    /// Warning (non-fatal issue).
    Warning {
        /// The warning message.
        message: String,
        /// The element that posted the warning (if known).
        node: Option<String>,
    },
}

impl PipelineEvent {
    /// Translate a bus message.
    ///
    /// `pipeline` is used to keep only state changes of the top-level
    /// pipeline; child elements post their own state changes too.
    /// Messages without an event counterpart yield `None`.
    pub fn from_message(msg: &gst::Message, pipeline: &gst::Pipeline) -> Option<Self> {
        let node = msg.src().map(|s| s.path_string().to_string());
        match msg.view() {
            gst::MessageView::Eos(..) => Some(PipelineEvent::Eos),
            gst::MessageView::Error(err) => Some(PipelineEvent::Error {
                message: err.error().to_string(),
                node,
                debug: err.debug().map(|d| d.to_string()),
            }),
            gst::MessageView::Warning(warn) => Some(PipelineEvent::Warning {
                message: warn.error().to_string(),
                node,
            }),
            gst::MessageView::StateChanged(change)
                if msg.src() == Some(pipeline.upcast_ref::<gst::Object>()) =>
            {
                Some(PipelineEvent::StateChanged {
                    from: change.old(),
                    to: change.current(),
                })
            }
            _ => None,
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Eos | PipelineEvent::Error { .. })
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::StateChanged { from, to } => {
                write!(f, "StateChanged: {:?} -> {:?}", from, to)
            }
            PipelineEvent::Eos => write!(f, "EOS"),
            PipelineEvent::Error { message, node, .. } => {
                if let Some(n) = node {
                    write!(f, "Error in {}: {}", n, message)
                } else {
                    write!(f, "Error: {}", message)
                }
            }
            PipelineEvent::Warning { message, node } => {
                if let Some(n) = node {
                    write!(f, "Warning in {}: {}", n, message)
                } else {
                    write!(f, "Warning: {}", message)
                }
            }
        }
    }
}

/// Sender for pipeline events.
#[derive(Clone)]
pub struct EventSender {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventSender {
    /// Create a new event sender with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send an event.
    ///
    /// Returns the number of receivers that received the event.
    /// Returns 0 if there are no receivers (which is fine).
    pub fn send(&self, event: PipelineEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Create a receiver for events.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for EventSender {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Receiver for pipeline events.
///
/// Multiple receivers can be created from a single sender.
pub struct EventReceiver {
    receiver: broadcast::Receiver<PipelineEvent>,
}

impl EventReceiver {
    /// Receive the next event.
    ///
    /// Returns `None` if the sender has been dropped.
    pub async fn recv(&mut self) -> Option<PipelineEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!("event receiver lagged by {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Wait for EOS or an error.
    ///
    /// Returns `Ok(())` on EOS, `Err(message)` on error.
    pub async fn wait_eos(&mut self) -> Result<(), String> {
        while let Some(event) = self.recv().await {
            match event {
                PipelineEvent::Eos => return Ok(()),
                PipelineEvent::Error { message, node, .. } => {
                    let full_msg = if let Some(n) = node {
                        format!("Error in {}: {}", n, message)
                    } else {
                        message
                    };
                    return Err(full_msg);
                }
                _ => continue,
            }
        }
        Err("Event channel closed unexpectedly".to_string())
    }
}

/// A stream adapter for receiving events.
///
/// Implements `Stream` for use with async iteration.
pub struct EventStream {
    receiver: EventReceiver,
}

impl EventStream {
    /// Create a new event stream from a receiver.
    pub fn new(receiver: EventReceiver) -> Self {
        Self { receiver }
    }
}

impl futures::Stream for EventStream {
    type Item = PipelineEvent;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let fut = self.receiver.recv();
        tokio::pin!(fut);
        fut.poll(cx)
    }
}

impl EventSender {
    /// Create a stream of events.
    pub fn stream(&self) -> EventStream {
        EventStream::new(self.subscribe())
    }
}

/// Pump the pipeline's bus into `sender` on a background thread.
///
/// The thread ends after a terminal event, or when the bus starts flushing
/// (the pipeline went back to NULL). Subscribe before the pipeline starts
/// to avoid missing early events.
pub fn watch_bus(
    pipeline: &gst::Pipeline,
    sender: EventSender,
) -> crate::Result<thread::JoinHandle<()>> {
    let bus = pipeline.bus().ok_or(crate::Error::NoBus)?;
    let pipeline = pipeline.clone();
    let handle = thread::Builder::new()
        .name("bus-watch".to_string())
        .spawn(move || {
            for msg in bus.iter_timed(gst::ClockTime::NONE) {
                let Some(event) = PipelineEvent::from_message(&msg, &pipeline) else {
                    continue;
                };
                tracing::trace!("bus event: {}", event);
                let terminal = event.is_terminal();
                sender.send(event);
                if terminal {
                    break;
                }
            }
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_event_send_recv() {
        let sender = EventSender::new(16);
        let mut receiver = sender.subscribe();

        sender.send(PipelineEvent::Eos);

        let event = receiver.recv().await.unwrap();
        assert!(matches!(event, PipelineEvent::Eos));
    }

    #[tokio::test]
    async fn test_multiple_receivers() {
        let sender = EventSender::new(16);
        let mut receiver1 = sender.subscribe();
        let mut receiver2 = sender.subscribe();

        sender.send(PipelineEvent::StateChanged {
            from: gst::State::Paused,
            to: gst::State::Playing,
        });

        let e1 = receiver1.recv().await.unwrap();
        let e2 = receiver2.recv().await.unwrap();

        assert!(matches!(e1, PipelineEvent::StateChanged { .. }));
        assert!(matches!(e2, PipelineEvent::StateChanged { .. }));
    }

    #[tokio::test]
    async fn test_wait_eos() {
        let sender = EventSender::new(16);
        let mut receiver = sender.subscribe();

        let sender_clone = sender.clone();
        tokio::spawn(async move {
            sender_clone.send(PipelineEvent::StateChanged {
                from: gst::State::Ready,
                to: gst::State::Paused,
            });
            sender_clone.send(PipelineEvent::Warning {
                message: "late buffer".to_string(),
                node: None,
            });
            sender_clone.send(PipelineEvent::Eos);
        });

        let result = receiver.wait_eos().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_eos_error() {
        let sender = EventSender::new(16);
        let mut receiver = sender.subscribe();

        let sender_clone = sender.clone();
        tokio::spawn(async move {
            sender_clone.send(PipelineEvent::Error {
                message: "Internal data stream error".to_string(),
                node: Some("/pipeline0/src".to_string()),
                debug: None,
            });
        });

        let result = receiver.wait_eos().await;
        assert_eq!(
            result.unwrap_err(),
            "Error in /pipeline0/src: Internal data stream error"
        );
    }

    #[tokio::test]
    async fn test_wait_eos_closed_channel() {
        let sender = EventSender::new(4);
        let mut receiver = sender.subscribe();
        drop(sender);
        assert!(receiver.wait_eos().await.is_err());
    }

    #[tokio::test]
    async fn test_stream_yields_events() {
        let sender = EventSender::new(4);
        let mut stream = sender.stream();
        sender.send(PipelineEvent::Eos);
        assert!(matches!(stream.next().await, Some(PipelineEvent::Eos)));
    }

    #[test]
    fn test_only_pipeline_state_changes_map() {
        gst::init().unwrap();
        let pipeline = gst::Pipeline::new();
        let child = gst::ElementFactory::make("identity").build().unwrap();
        pipeline.add(&child).unwrap();

        let changed = |src: &gst::Object| {
            gst::message::StateChanged::builder(
                gst::State::Ready,
                gst::State::Paused,
                gst::State::VoidPending,
            )
            .src(src)
            .build()
        };

        let own = changed(pipeline.upcast_ref());
        assert!(matches!(
            PipelineEvent::from_message(&own, &pipeline),
            Some(PipelineEvent::StateChanged {
                from: gst::State::Ready,
                to: gst::State::Paused,
            })
        ));
        let other = changed(child.upcast_ref());
        assert!(PipelineEvent::from_message(&other, &pipeline).is_none());
    }

    #[test]
    fn test_event_display() {
        let event = PipelineEvent::Error {
            message: "test error".to_string(),
            node: Some("node1".to_string()),
            debug: None,
        };
        assert_eq!(format!("{}", event), "Error in node1: test error");

        let event = PipelineEvent::Eos;
        assert_eq!(format!("{}", event), "EOS");
        assert!(event.is_terminal());

        let event = PipelineEvent::Warning {
            message: "slow".to_string(),
            node: None,
        };
        assert_eq!(format!("{}", event), "Warning: slow");
        assert!(!event.is_terminal());
    }
}
